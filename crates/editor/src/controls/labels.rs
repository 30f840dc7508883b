//! Length and angle labels of the attached shape.
//!
//! Labels live in the shape's local frame. Length labels sit beside each
//! edge on the side away from the vertex centroid; angle labels sit on an
//! arc drawn inside the corner the shape occupies. Closed outlines sweep the
//! full interior angle, so reflex corners get arcs longer than a half turn.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::config::{
    ANGLE_ARC_RADIUS, ANGLE_ARC_SEGMENTS, ANGLE_LABEL_SCALE, LABEL_INITIAL_OFFSET,
    LABEL_OFFSET_BASE, LABEL_OFFSET_DIVISOR, LABEL_PRECISION, LABEL_SCALE,
};

use super::edit::{angle_neighbors, angle_vertices, flatten, interior_angle, interior_winding, vertex_angle};
use crate::core::{Shape3D, VertexStore};

/// Angle labels sit this far out along the arc's bisector, in arc radii
const ANGLE_LABEL_DISTANCE: f32 = 1.6;

/// Which label an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "index")]
pub enum LabelTarget {
    /// Length label of edge `i`
    Edge(usize),
    /// Angle label of vertex `i`
    Vertex(usize),
}

/// Text state shared by both label kinds
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelField {
    /// Formatted measurement shown while no value is typed
    pub placeholder: String,
    /// User-typed text, `None` when blank
    pub value: Option<String>,
    /// Locked fields ignore typing until unlocked
    pub locked: bool,
}

impl LabelField {
    fn new(placeholder: String) -> Self {
        Self {
            placeholder,
            value: None,
            locked: true,
        }
    }

    /// Text the host should render
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.placeholder)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LengthLabel {
    pub edge: usize,
    /// 3D distance between the edge endpoints
    pub length: f32,
    pub field: LabelField,
    pub position: Vec3,
    /// Euler XYZ rotation aligning the label with its edge
    pub rotation: Vec3,
    pub scale: f32,
}

/// Arc marking the measured corner
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AngleArc {
    /// Azimuth of the first arc point
    pub start: f32,
    /// Signed sweep (radians)
    pub sweep: f32,
    pub radius: f32,
    pub points: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AngleLabel {
    pub vertex: usize,
    pub degrees: f32,
    pub field: LabelField,
    pub position: Vec3,
    pub scale: f32,
    pub arc: AngleArc,
}

/// Ground-plane azimuth, increasing with rotation about +Y
fn azimuth(v: Vec3) -> f32 {
    (-v.z).atan2(v.x)
}

fn direction(phi: f32) -> Vec3 {
    Vec3::new(phi.cos(), 0.0, -phi.sin())
}

fn turn_sign(a: Vec3, b: Vec3) -> f32 {
    if a.cross(b).y < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Arc at `cur` between the edges to `prev` and `next`, drawn on the side
/// holding `centroid`.
pub fn angle_arc(prev: Vec3, cur: Vec3, next: Vec3, centroid: Vec3, radius: f32) -> Option<AngleArc> {
    let a = flatten(prev - cur);
    let b = flatten(next - cur);
    let theta = vertex_angle(prev, cur, next)?.to_radians();

    let side = turn_sign(a, b);
    let c = flatten(centroid - cur);
    let inside = c.length_squared() > 1e-12 && turn_sign(a, c) == side && turn_sign(c, b) == side;

    let mut start = azimuth(a);
    if !inside {
        start += PI;
    }
    Some(AngleArc::sweep(cur, start, side * theta, radius))
}

/// Arc at `cur` of a closed outline, starting on the edge to `prev` and
/// sweeping the interior angle `degrees` towards the edge to `next`.
pub fn interior_arc(prev: Vec3, cur: Vec3, winding: f32, degrees: f32, radius: f32) -> Option<AngleArc> {
    let a = flatten(prev - cur);
    if a.length_squared() < 1e-12 {
        return None;
    }
    Some(AngleArc::sweep(cur, azimuth(a), winding * degrees.to_radians(), radius))
}

/// Measured angle and arc at `vertex`
fn corner(store: &VertexStore, vertex: usize, closed: bool, centroid: Vec3) -> Option<(f32, AngleArc)> {
    let (p, c, n) = angle_neighbors(store.len(), vertex, closed).ok()?;
    let verts = store.as_slice();
    match interior_winding(store, closed) {
        Some(w) => {
            let degrees = interior_angle(verts[p], verts[c], verts[n], w)?;
            Some((degrees, interior_arc(verts[p], verts[c], w, degrees, ANGLE_ARC_RADIUS)?))
        }
        None => {
            let degrees = vertex_angle(verts[p], verts[c], verts[n])?;
            Some((degrees, angle_arc(verts[p], verts[c], verts[n], centroid, ANGLE_ARC_RADIUS)?))
        }
    }
}

impl AngleArc {
    fn sweep(center: Vec3, start: f32, sweep: f32, radius: f32) -> Self {
        let points = (0..=ANGLE_ARC_SEGMENTS)
            .map(|k| {
                let phi = start + sweep * k as f32 / ANGLE_ARC_SEGMENTS as f32;
                center + direction(phi) * radius
            })
            .collect();
        Self {
            start,
            sweep,
            radius,
            points,
        }
    }

    /// Point on the arc's bisector at `distance` from the vertex
    pub fn bisector_point(&self, center: Vec3, distance: f32) -> Vec3 {
        center + direction(self.start + self.sweep * 0.5) * distance
    }
}

/// Placement of a length label for edge `a → b`
fn length_label_placement(a: Vec3, b: Vec3, centroid: Vec3, offset: f32) -> (Vec3, Vec3) {
    let mid = (a + b) * 0.5;
    let d = b - a;

    let mut perp = Vec3::Y.cross(d).normalize_or_zero();
    if (mid - perp - centroid).length() > (mid + perp - centroid).length() {
        perp = -perp;
    }
    let position = mid + perp * offset;

    let mut r = d.z.atan2(d.x).to_degrees();
    if (r - 180.0).abs() < 1e-4 {
        r = 0.0;
    }
    let rotation = Vec3::new(-FRAC_PI_2, 0.0, -r.to_radians());
    (position, rotation)
}

/// Owns every label of the attached shape
#[derive(Debug)]
pub struct LabelsManager {
    pub show_length: bool,
    pub show_angle: bool,
    /// Decimal places in placeholders
    pub precision: usize,
    offset: f32,
    lengths: Vec<LengthLabel>,
    angles: Vec<AngleLabel>,
    regenerations: u64,
}

impl Default for LabelsManager {
    fn default() -> Self {
        Self {
            show_length: true,
            show_angle: true,
            precision: LABEL_PRECISION,
            offset: LABEL_INITIAL_OFFSET,
            lengths: Vec::new(),
            angles: Vec::new(),
            regenerations: 0,
        }
    }
}

impl LabelsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every label and build new ones from the current vertices.
    pub fn regenerate(&mut self, shape: &Shape3D) {
        self.lengths.clear();
        self.angles.clear();
        self.regenerations += 1;

        let store = shape.vertex_store();
        let closed = shape.is_closed();
        let centroid = store.centroid();

        if self.show_length {
            let edges = (1..=store.len()).filter(|&i| store.is_valid_edge(i, closed));
            for edge in edges {
                if let Ok((a, b)) = store.edge(edge, closed) {
                    let length = (b - a).length();
                    let (position, rotation) = length_label_placement(a, b, centroid, self.offset);
                    let field = LabelField::new(self.format_length(length));
                    self.lengths.push(LengthLabel {
                        edge,
                        length,
                        field,
                        position,
                        rotation,
                        scale: LABEL_SCALE,
                    });
                }
            }
        }

        if self.show_angle {
            for vertex in angle_vertices(store.len(), closed) {
                if let Some(label) = self.angle_label(store, vertex, closed, centroid) {
                    self.angles.push(label);
                }
            }
        }
    }

    /// Recompute measurements and placement of the existing labels. Typed
    /// values and lock states are kept.
    pub fn refresh(&mut self, shape: &Shape3D) {
        let store = shape.vertex_store();
        let closed = shape.is_closed();
        let centroid = store.centroid();
        let offset = self.offset;
        let precision = self.precision;

        for label in self.lengths.iter_mut() {
            if let Ok((a, b)) = store.edge(label.edge, closed) {
                label.length = (b - a).length();
                label.field.placeholder = format!("{:.*}m", precision, label.length);
                (label.position, label.rotation) = length_label_placement(a, b, centroid, offset);
            }
        }

        for label in self.angles.iter_mut() {
            let Some((degrees, arc)) = corner(store, label.vertex, closed, centroid) else {
                continue;
            };
            let Some(cur) = store.get(label.vertex) else {
                continue;
            };
            label.position = arc.bisector_point(cur, ANGLE_ARC_RADIUS * ANGLE_LABEL_DISTANCE);
            label.arc = arc;
            label.degrees = degrees;
            label.field.placeholder = format!("{:.*}°", precision, degrees);
        }
    }

    /// Per-frame placement: the perpendicular offset grows with the camera
    /// distance to the shape.
    pub fn update(&mut self, shape: &Shape3D, camera_position: Vec3) {
        let center = shape.world_matrix().transform_point3(shape.vertex_center());
        self.offset = center.distance(camera_position) / LABEL_OFFSET_DIVISOR + LABEL_OFFSET_BASE;
        self.refresh(shape);
    }

    pub fn clear(&mut self) {
        self.lengths.clear();
        self.angles.clear();
    }

    fn angle_label(&self, store: &VertexStore, vertex: usize, closed: bool, centroid: Vec3) -> Option<AngleLabel> {
        let (degrees, arc) = corner(store, vertex, closed, centroid)?;
        let cur = store.get(vertex)?;
        Some(AngleLabel {
            vertex,
            degrees,
            field: LabelField::new(format!("{:.*}°", self.precision, degrees)),
            position: arc.bisector_point(cur, ANGLE_ARC_RADIUS * ANGLE_LABEL_DISTANCE),
            scale: ANGLE_LABEL_SCALE,
            arc,
        })
    }

    fn format_length(&self, length: f32) -> String {
        format!("{:.*}m", self.precision, length)
    }

    // ── Editing ──────────────────────────────────────────────

    fn field_mut(&mut self, target: LabelTarget) -> Option<&mut LabelField> {
        match target {
            LabelTarget::Edge(edge) => self.lengths.iter_mut().find(|l| l.edge == edge).map(|l| &mut l.field),
            LabelTarget::Vertex(vertex) => {
                self.angles.iter_mut().find(|l| l.vertex == vertex).map(|l| &mut l.field)
            }
        }
    }

    pub fn field(&self, target: LabelTarget) -> Option<&LabelField> {
        match target {
            LabelTarget::Edge(edge) => self.lengths.iter().find(|l| l.edge == edge).map(|l| &l.field),
            LabelTarget::Vertex(vertex) => self.angles.iter().find(|l| l.vertex == vertex).map(|l| &l.field),
        }
    }

    /// Unlock a label for typing (double-click). Returns false if the label
    /// does not exist.
    pub fn unlock(&mut self, target: LabelTarget) -> bool {
        match self.field_mut(target) {
            Some(field) => {
                field.locked = false;
                true
            }
            None => false,
        }
    }

    /// Store typed text. Locked labels ignore it.
    pub fn set_value(&mut self, target: LabelTarget, text: &str) -> bool {
        match self.field_mut(target) {
            Some(field) if !field.locked => {
                field.value = Some(text.to_string());
                true
            }
            _ => false,
        }
    }

    /// Take the typed text for commit and lock the label again.
    pub fn take_value(&mut self, target: LabelTarget) -> Option<String> {
        let field = self.field_mut(target)?;
        field.locked = true;
        field.value.take()
    }

    /// Revert a label to its placeholder.
    pub fn reset(&mut self, target: LabelTarget) {
        if let Some(field) = self.field_mut(target) {
            field.value = None;
            field.locked = true;
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn lengths(&self) -> &[LengthLabel] {
        &self.lengths
    }

    pub fn angles(&self) -> &[AngleLabel] {
        &self.angles
    }

    pub fn length_label(&self, edge: usize) -> Option<&LengthLabel> {
        self.lengths.iter().find(|l| l.edge == edge)
    }

    pub fn angle_label_at(&self, vertex: usize) -> Option<&AngleLabel> {
        self.angles.iter().find(|l| l.vertex == vertex)
    }

    /// Current perpendicular offset of length labels
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ResourcePool;
    use shared::{ShapeKind, ShapeOptions};

    fn shape(points: &[[f32; 3]], kind: ShapeKind) -> Shape3D {
        let mut s = Shape3D::new(
            &ResourcePool::new(),
            ShapeOptions {
                vertices: points.to_vec(),
                ..Default::default()
            },
        );
        s.set_shape_kind(kind);
        s
    }

    const SQUARE: [[f32; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [4.0, 0.0, 0.0],
        [4.0, 0.0, 4.0],
        [0.0, 0.0, 4.0],
    ];

    #[test]
    fn test_label_counts() {
        let mut labels = LabelsManager::new();
        labels.regenerate(&shape(&SQUARE, ShapeKind::Line));
        assert_eq!(labels.lengths().len(), 3);
        assert_eq!(labels.angles().len(), 2);

        labels.regenerate(&shape(&SQUARE, ShapeKind::Area));
        assert_eq!(labels.lengths().len(), 4);
        assert_eq!(labels.angles().len(), 4);
        assert_eq!(labels.regenerations(), 2);
    }

    #[test]
    fn test_toggles() {
        let mut labels = LabelsManager::new();
        labels.show_angle = false;
        labels.regenerate(&shape(&SQUARE, ShapeKind::Area));
        assert!(labels.angles().is_empty());
        labels.show_length = false;
        labels.regenerate(&shape(&SQUARE, ShapeKind::Area));
        assert!(labels.lengths().is_empty());
    }

    #[test]
    fn test_length_label_outside_shape() {
        let mut labels = LabelsManager::new();
        labels.regenerate(&shape(&SQUARE, ShapeKind::Area));
        let first = labels.length_label(1).unwrap();
        assert_eq!(first.field.placeholder, "4.00m");
        // Edge along +X at z=0; centroid at z=2, label goes to z<0
        assert!((first.position - Vec3::new(2.0, 0.0, -LABEL_INITIAL_OFFSET)).length() < 1e-5);
        assert_eq!(first.scale, LABEL_SCALE);

        let closing = labels.length_label(4).unwrap();
        assert!((closing.position - Vec3::new(-LABEL_INITIAL_OFFSET, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_length_label_rotation() {
        let (_, rot) = length_label_placement(Vec3::X, Vec3::ZERO, Vec3::new(0.5, 0.0, 1.0), 1.0);
        // Pointing along -X reads as 0 degrees
        assert_eq!(rot, Vec3::new(-FRAC_PI_2, 0.0, 0.0));
        let (_, rot) = length_label_placement(Vec3::ZERO, Vec3::Z, Vec3::X, 1.0);
        assert!((rot.z + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_offset_follows_camera() {
        let s = shape(&SQUARE, ShapeKind::Area);
        let mut labels = LabelsManager::new();
        labels.regenerate(&s);
        labels.update(&s, Vec3::new(2.0, 100.0, 2.0));
        assert!((labels.offset() - 1.8).abs() < 1e-5);
        let first = labels.length_label(1).unwrap();
        assert!((first.position.z + 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_square_corner_arc_inside() {
        let mut labels = LabelsManager::new();
        labels.regenerate(&shape(&SQUARE, ShapeKind::Area));
        for label in labels.angles() {
            assert!((label.degrees - 90.0).abs() < 1e-3);
            assert_eq!(label.arc.points.len(), ANGLE_ARC_SEGMENTS + 1);
            assert_eq!(label.field.placeholder, "90.00°");
            // Label sits inside the square
            assert!(label.position.x > 0.0 && label.position.x < 4.0);
            assert!(label.position.z > 0.0 && label.position.z < 4.0);
        }
    }

    #[test]
    fn test_arc_endpoints_on_edges() {
        let prev = Vec3::new(4.0, 0.0, 0.0);
        let cur = Vec3::ZERO;
        let next = Vec3::new(0.0, 0.0, 4.0);
        let arc = angle_arc(prev, cur, next, Vec3::new(1.0, 0.0, 1.0), 1.0).unwrap();
        let first = arc.points.first().unwrap();
        let last = arc.points.last().unwrap();
        assert!((*first - Vec3::X).length() < 1e-5);
        assert!((*last - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_arc_flips_away_from_outside_centroid() {
        let prev = Vec3::new(4.0, 0.0, 0.0);
        let cur = Vec3::ZERO;
        let next = Vec3::new(0.0, 0.0, 4.0);
        let arc = angle_arc(prev, cur, next, Vec3::new(-1.0, 0.0, -1.0), 1.0).unwrap();
        let mid = arc.bisector_point(cur, 1.0);
        assert!(mid.x < 0.0 && mid.z < 0.0);
    }

    const L_SHAPE: [[f32; 3]; 6] = [
        [0.0, 0.0, 0.0],
        [3.0, 0.0, 0.0],
        [3.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 0.0, 3.0],
        [0.0, 0.0, 3.0],
    ];

    #[test]
    fn test_reflex_corner_label() {
        let mut labels = LabelsManager::new();
        labels.regenerate(&shape(&L_SHAPE, ShapeKind::Area));
        let reflex = labels.angle_label_at(3).unwrap();
        assert!((reflex.degrees - 270.0).abs() < 1e-3);
        assert_eq!(reflex.field.placeholder, "270.00°");
        assert!((reflex.arc.sweep.abs() - 1.5 * PI).abs() < 1e-4);

        let cur = Vec3::new(1.0, 0.0, 1.0);
        let first = reflex.arc.points.first().unwrap();
        let last = reflex.arc.points.last().unwrap();
        assert!((*first - (cur + Vec3::X * ANGLE_ARC_RADIUS)).length() < 1e-5);
        assert!((*last - (cur + Vec3::Z * ANGLE_ARC_RADIUS)).length() < 1e-5);
        // Bisector points into the material, away from the notch
        assert!(reflex.position.x < 1.0 && reflex.position.z < 1.0);

        for label in labels.angles().iter().filter(|l| l.vertex != 3) {
            assert_eq!(label.field.placeholder, "90.00°");
        }

        // As an open line the same corner reads between its edges
        labels.regenerate(&shape(&L_SHAPE, ShapeKind::Line));
        assert_eq!(labels.angle_label_at(3).unwrap().field.placeholder, "90.00°");
    }

    #[test]
    fn test_interior_arc_follows_winding() {
        let prev = Vec3::new(4.0, 0.0, 0.0);
        let cur = Vec3::ZERO;
        let ccw = interior_arc(prev, cur, 1.0, 90.0, 1.0).unwrap();
        let cw = interior_arc(prev, cur, -1.0, 90.0, 1.0).unwrap();
        assert!((*ccw.points.last().unwrap() - Vec3::NEG_Z).length() < 1e-5);
        assert!((*cw.points.last().unwrap() - Vec3::Z).length() < 1e-5);
        assert!(interior_arc(cur, cur, 1.0, 90.0, 1.0).is_none());
    }

    #[test]
    fn test_edit_flow() {
        let mut labels = LabelsManager::new();
        labels.regenerate(&shape(&SQUARE, ShapeKind::Area));
        let target = LabelTarget::Edge(2);
        assert!(!labels.set_value(target, "10"));
        assert!(labels.unlock(target));
        assert!(labels.set_value(target, "10"));
        assert_eq!(labels.field(target).unwrap().text(), "10");
        assert_eq!(labels.take_value(target).as_deref(), Some("10"));
        assert!(labels.field(target).unwrap().locked);
        assert_eq!(labels.field(target).unwrap().text(), "4.00m");
        assert!(!labels.unlock(LabelTarget::Edge(9)));
    }

    #[test]
    fn test_refresh_keeps_typed_value() {
        let mut s = shape(&SQUARE, ShapeKind::Area);
        let mut labels = LabelsManager::new();
        labels.regenerate(&s);
        labels.unlock(LabelTarget::Vertex(1));
        labels.set_value(LabelTarget::Vertex(1), "45");
        s.update_vertex_at(2, Vec3::new(8.0, 0.0, 4.0)).unwrap();
        labels.refresh(&s);
        assert_eq!(labels.field(LabelTarget::Vertex(1)).unwrap().value.as_deref(), Some("45"));
        assert_eq!(labels.length_label(2).unwrap().field.placeholder, "5.66m");
        assert_eq!(labels.regenerations(), 1);
    }
}
