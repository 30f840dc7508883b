//! The shape entity: one vertex store, one kind, the builders for that kind.
//!
//! Every successful mutation runs exactly one [`Shape3D::rebuild`] and then
//! emits one [`ShapeEvent`]. Builders are disposed and recreated on each
//! rebuild, never patched.

use glam::{Mat4, Vec3};
use shared::{Appearance, ColorHex, ColorLayer, ShapeKind, ShapeOptions, ShapeStyle};

use super::error::{ShapeError, ShapeResult};
use super::events::{EventHub, ListenerId, ShapeEvent};
use super::vertex_store::VertexStore;
use super::ShapeId;
use crate::builders::{builders_for, BuildContext, ShapeBuilder};
use crate::scene::{Renderable, ResourcePool, SceneNode};

/// Parametric line, area or volume defined by its boundary vertices
#[derive(Debug)]
pub struct Shape3D {
    id: ShapeId,
    vertices: VertexStore,
    kind: ShapeKind,
    close_line: bool,
    style: ShapeStyle,
    appearance: Appearance,
    ghost: bool,
    /// Kind a ghost preview grows into once it has enough vertices
    ghost_kind: Option<ShapeKind>,
    builders: Vec<Box<dyn ShapeBuilder>>,
    /// Local transform relative to the parent
    pub node: SceneNode,
    pool: ResourcePool,
    events: EventHub,
    rebuild_count: u64,
    disposed: bool,
}

impl Shape3D {
    /// Create a Line shape from `options` and build it once.
    pub fn new(pool: &ResourcePool, options: ShapeOptions) -> Self {
        let mut shape = Self {
            id: ShapeId::new(),
            vertices: VertexStore::new(options.vertices.iter().map(|v| Vec3::from(*v)).collect()),
            kind: ShapeKind::Line,
            close_line: options.close_line,
            style: options.style,
            appearance: options.appearance,
            ghost: options.ghost,
            ghost_kind: None,
            builders: builders_for(ShapeKind::Line),
            node: SceneNode::default(),
            pool: pool.clone(),
            events: EventHub::default(),
            rebuild_count: 0,
            disposed: false,
        };
        shape.rebuild();
        shape
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Vec3] {
        self.vertices.as_slice()
    }

    pub fn vertex_store(&self) -> &VertexStore {
        &self.vertices
    }

    pub fn vertex(&self, index: usize) -> Option<Vec3> {
        self.vertices.get(index)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The raw close-line flag
    pub fn close_line(&self) -> bool {
        self.close_line
    }

    /// Closed either explicitly or because the kind is Area/Volume
    pub fn is_closed(&self) -> bool {
        self.close_line || self.kind.is_implicitly_closed()
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost
    }

    pub fn ghost_kind(&self) -> Option<ShapeKind> {
        self.ghost_kind
    }

    /// Number of rebuild passes run so far
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Arithmetic mean of all vertices, in local space
    pub fn vertex_center(&self) -> Vec3 {
        self.vertices.centroid()
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.node.world_matrix()
    }

    /// Active builders in render order
    pub fn builders(&self) -> impl Iterator<Item = &dyn ShapeBuilder> {
        self.builders.iter().map(|b| b.as_ref())
    }

    pub fn builder(&self, layer: ColorLayer) -> Option<&dyn ShapeBuilder> {
        self.builders().find(|b| b.layer() == layer)
    }

    /// Renderables produced by the last rebuild, including hidden ones
    pub fn renderables(&self) -> impl Iterator<Item = &Renderable> {
        self.builders.iter().filter_map(|b| b.renderable())
    }

    // ── Mutations ────────────────────────────────────────────

    /// Replace the vertex list. A Line may be cleared to a blank shape;
    /// every other count must meet the kind's minimum.
    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) -> ShapeResult<()> {
        let required = self.kind.min_vertices();
        let blank_line = vertices.is_empty() && self.kind == ShapeKind::Line;
        if !blank_line && vertices.len() < required {
            let err = ShapeError::NotEnoughVertices {
                kind: self.kind,
                required,
                actual: vertices.len(),
            };
            tracing::warn!("set_vertices rejected: {}", err);
            return Err(err);
        }
        self.vertices.replace(vertices);
        self.commit(ShapeEvent::VerticesChanged);
        Ok(())
    }

    pub fn update_vertex_at(&mut self, index: usize, vertex: Vec3) -> ShapeResult<()> {
        self.vertices.set(index, vertex)?;
        self.commit(ShapeEvent::VertexUpdated { index });
        Ok(())
    }

    /// Split edge `edge_index` at its midpoint. Returns the inserted vertex.
    pub fn insert_midpoint_at(&mut self, edge_index: usize) -> ShapeResult<Vec3> {
        let midpoint = match self.vertices.midpoint(edge_index, self.is_closed()) {
            Ok(m) => m,
            Err(err) => {
                tracing::warn!("insert_midpoint_at rejected: {}", err);
                return Err(err);
            }
        };
        self.vertices.insert(edge_index, midpoint);
        self.commit(ShapeEvent::EdgeSplit { index: edge_index });
        Ok(midpoint)
    }

    pub fn remove_vertex_at(&mut self, index: usize) -> ShapeResult<Vec3> {
        let len = self.vertices.len();
        let required = self.kind.min_vertices();
        let check = if index >= len {
            Err(ShapeError::IndexOutOfRange { index, len })
        } else if len - 1 < required {
            Err(ShapeError::NotEnoughVertices {
                kind: self.kind,
                required,
                actual: len - 1,
            })
        } else {
            Ok(())
        };
        if let Err(err) = check {
            tracing::warn!("remove_vertex_at rejected: {}", err);
            return Err(err);
        }

        let removed = self.vertices.remove(index)?;
        self.commit(ShapeEvent::VertexRemoved { index });
        Ok(removed)
    }

    /// Append a vertex at the end. Returns its index.
    pub fn add_point(&mut self, vertex: Vec3) -> usize {
        self.vertices.push(vertex);
        let index = self.vertices.len() - 1;
        self.commit(ShapeEvent::PointAdded { index });
        index
    }

    /// Switch the active kind. Returns the kind in effect afterwards, which
    /// is the old kind when the vertex count is below the new minimum.
    pub fn set_shape_kind(&mut self, kind: ShapeKind) -> ShapeKind {
        let required = kind.min_vertices();
        if self.vertices.len() < required {
            tracing::warn!(
                "{}",
                ShapeError::NotEnoughVertices {
                    kind,
                    required,
                    actual: self.vertices.len(),
                }
            );
            return self.kind;
        }
        self.activate(kind);
        self.commit(ShapeEvent::KindChanged { kind });
        self.kind
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.close_line = closed;
        self.commit(ShapeEvent::ClosedChanged { closed });
    }

    pub fn set_color(&mut self, layer: ColorLayer, color: ColorHex) {
        self.style.set_color(layer, color);
        self.commit(ShapeEvent::StyleChanged);
    }

    /// Signed extrusion height of the volume layer
    pub fn set_volume_height(&mut self, height: f32) -> ShapeResult<()> {
        if !height.is_finite() {
            let err = ShapeError::InvalidValue {
                what: "volume height",
                value: height as f64,
            };
            tracing::warn!("{}", err);
            return Err(err);
        }
        self.style.volume_height = height;
        self.commit(ShapeEvent::StyleChanged);
        Ok(())
    }

    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.appearance = appearance;
        self.commit(ShapeEvent::StyleChanged);
    }

    /// Atomic kind + vertex swap for ghost previews. Falls back to Line while
    /// the preview has fewer vertices than `kind` needs. One rebuild.
    pub(crate) fn reconfigure(&mut self, kind: ShapeKind, vertices: Vec<Vec3>) {
        let effective = if vertices.len() >= kind.min_vertices() {
            kind
        } else {
            ShapeKind::Line
        };
        self.vertices.replace(vertices);
        if effective != self.kind {
            self.activate(effective);
        }
        self.commit(ShapeEvent::VerticesChanged);
    }

    /// Apply a whole option set with one rebuild. Invalid parts (a
    /// non-finite height, a vertex list too short for `kind`) are logged and
    /// the old values kept. A kind the vertices cannot carry is kept too,
    /// except on ghosts, which fall back to Line. One event per changed
    /// attribute fires after the rebuild. Returns the kind in effect.
    pub(crate) fn apply_options(&mut self, kind: ShapeKind, options: ShapeOptions) -> ShapeKind {
        let mut events = Vec::new();

        if options.style != self.style {
            if options.style.volume_height.is_finite() {
                self.style = options.style;
                events.push(ShapeEvent::StyleChanged);
            } else {
                tracing::warn!(
                    "{}",
                    ShapeError::InvalidValue {
                        what: "volume height",
                        value: options.style.volume_height as f64,
                    }
                );
            }
        }
        if options.appearance != self.appearance {
            self.appearance = options.appearance;
            if !events.contains(&ShapeEvent::StyleChanged) {
                events.push(ShapeEvent::StyleChanged);
            }
        }
        if options.close_line != self.close_line {
            self.close_line = options.close_line;
            events.push(ShapeEvent::ClosedChanged {
                closed: options.close_line,
            });
        }

        if self.ghost {
            self.ghost_kind = Some(kind);
        }
        let required = kind.min_vertices();
        if !options.vertices.is_empty() {
            if options.vertices.len() >= required || self.ghost {
                self.vertices
                    .replace(options.vertices.into_iter().map(Vec3::from).collect());
                events.push(ShapeEvent::VerticesChanged);
            } else {
                tracing::warn!(
                    "{} vertices are too few for {}, vertices kept",
                    options.vertices.len(),
                    kind
                );
            }
        }

        let effective = if self.vertices.len() >= required {
            kind
        } else if self.ghost {
            ShapeKind::Line
        } else {
            tracing::warn!(
                "{}",
                ShapeError::NotEnoughVertices {
                    kind,
                    required,
                    actual: self.vertices.len(),
                }
            );
            self.kind
        };
        if effective != self.kind {
            self.activate(effective);
            events.push(ShapeEvent::KindChanged { kind: effective });
        }

        if !events.is_empty() {
            self.rebuild();
            for event in &events {
                self.notify_ref(event);
            }
        }
        self.kind
    }

    pub(crate) fn mark_ghost(&mut self, target: ShapeKind) {
        self.ghost = true;
        self.ghost_kind = Some(target);
    }

    pub(crate) fn notify(&mut self, event: ShapeEvent) {
        self.notify_ref(&event);
    }

    fn notify_ref(&mut self, event: &ShapeEvent) {
        self.events.emit(self.id, event);
    }

    // ── Rebuild ──────────────────────────────────────────────

    /// Regenerate every active builder from the current vertex store and
    /// reapply layer visibility.
    pub fn rebuild(&mut self) {
        let closed = self.is_closed();
        for builder in self.builders.iter_mut() {
            let ctx = BuildContext {
                owner: self.id,
                vertices: &self.vertices,
                closed,
                style: &self.style,
                ghost: self.ghost,
                pool: &self.pool,
            };
            match builder.build(&ctx) {
                Ok(()) => assert!(
                    self.vertices.len() < builder.min_vertices() || builder.renderable().is_some(),
                    "{:?} builder produced no renderable for {} vertices",
                    builder.layer(),
                    self.vertices.len()
                ),
                Err(err) => {
                    tracing::warn!("{:?} layer of shape {} not built: {}", builder.layer(), self.id.short(), err)
                }
            }
        }

        for builder in self.builders.iter_mut() {
            let visible = layer_visible(self.kind, builder.layer(), self.appearance);
            builder.set_visible(visible);
        }
        self.rebuild_count += 1;
    }

    // ── Events ───────────────────────────────────────────────

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(ShapeId, &ShapeEvent) + 'static,
    ) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }

    /// Release all builder resources and detach every listener.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for builder in self.builders.iter_mut() {
            builder.dispose();
        }
        self.builders.clear();
        self.events.clear();
        self.disposed = true;
        tracing::debug!("Disposed shape {}", self.id.short());
    }

    // ── Helpers ──────────────────────────────────────────────

    fn activate(&mut self, kind: ShapeKind) {
        for builder in self.builders.iter_mut() {
            builder.dispose();
        }
        self.builders = builders_for(kind);
        self.kind = kind;
    }

    fn commit(&mut self, event: ShapeEvent) {
        self.rebuild();
        self.notify(event);
    }
}

/// Layer visibility for a kind: the kind's own layer is always shown, lower
/// layers follow the appearance flags.
fn layer_visible(kind: ShapeKind, layer: ColorLayer, appearance: Appearance) -> bool {
    match (kind, layer) {
        (ShapeKind::Area, ColorLayer::Line) | (ShapeKind::Volume, ColorLayer::Line) => {
            appearance.always_show_line
        }
        (ShapeKind::Volume, ColorLayer::Area) => appearance.always_show_area,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn shape_with(points: &[[f32; 3]]) -> (ResourcePool, Shape3D) {
        let pool = ResourcePool::new();
        let shape = Shape3D::new(
            &pool,
            ShapeOptions {
                vertices: points.to_vec(),
                ..Default::default()
            },
        );
        (pool, shape)
    }

    const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [5.0, 0.0, 5.0], [0.0, 0.0, 5.0]];

    fn record(shape: &mut Shape3D) -> Rc<RefCell<Vec<ShapeEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        shape.subscribe(move |_, e| sink.borrow_mut().push(e.clone()));
        log
    }

    #[test]
    fn test_min_vertex_guard_for_every_count() {
        for n in 0..6 {
            let points: Vec<[f32; 3]> = (0..n).map(|i| [i as f32, 0.0, (i * i) as f32]).collect();
            for &kind in ShapeKind::all() {
                let (_pool, mut shape) = shape_with(&points);
                let result = shape.set_shape_kind(kind);
                if n >= kind.min_vertices() {
                    assert_eq!(result, kind);
                } else {
                    assert_eq!(result, ShapeKind::Line, "n={} kind={}", n, kind);
                    assert_eq!(shape.kind(), ShapeKind::Line);
                }
                assert_eq!(shape.len(), n);
            }
        }
    }

    #[test]
    fn test_rebuild_idempotent() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        shape.set_shape_kind(ShapeKind::Volume);
        let before: Vec<_> = shape.renderables().map(|r| r.primitive.clone()).collect();
        shape.rebuild();
        let after: Vec<_> = shape.renderables().map(|r| r.primitive.clone()).collect();
        assert_eq!(before.len(), 3);
        assert_eq!(before, after);
    }

    #[test]
    fn test_one_rebuild_per_mutation() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        let start = shape.rebuild_count();
        shape.update_vertex_at(0, Vec3::ONE).unwrap();
        shape.insert_midpoint_at(1).unwrap();
        shape.remove_vertex_at(1).unwrap();
        shape.set_shape_kind(ShapeKind::Area);
        shape.add_point(Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(shape.rebuild_count() - start, 5);
    }

    #[test]
    fn test_edge_split_inserts_mean() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        let mid = shape.insert_midpoint_at(1).unwrap();
        assert_eq!(mid, Vec3::new(2.5, 0.0, 2.5));
        assert_eq!(shape.len(), 4);
        assert_eq!(shape.vertex(0), Some(Vec3::ZERO));
        assert_eq!(shape.vertex(1), Some(mid));
        assert_eq!(shape.vertex(2), Some(Vec3::new(5.0, 0.0, 5.0)));
        assert_eq!(shape.vertex(3), Some(Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_closing_edge_split_only_when_closed() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        assert!(shape.insert_midpoint_at(3).is_err());
        assert_eq!(shape.len(), 3);

        shape.set_closed(true);
        let mid = shape.insert_midpoint_at(3).unwrap();
        assert_eq!(mid, Vec3::new(0.0, 0.0, 2.5));
        assert_eq!(shape.vertex(3), Some(mid));
    }

    #[test]
    fn test_removal_guard() {
        let (_pool, mut line) = shape_with(&[[0.0; 3], [1.0, 0.0, 0.0]]);
        assert!(matches!(
            line.remove_vertex_at(0),
            Err(ShapeError::NotEnoughVertices { .. })
        ));
        assert_eq!(line.len(), 2);

        let (_pool, mut area) = shape_with(&TRIANGLE);
        area.set_shape_kind(ShapeKind::Area);
        assert!(area.remove_vertex_at(2).is_err());
        assert_eq!(area.vertices(), &TRIANGLE.map(Vec3::from)[..]);
    }

    #[test]
    fn test_update_vertex_out_of_range() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        assert_eq!(
            shape.update_vertex_at(3, Vec3::ZERO),
            Err(ShapeError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_set_vertices_guard() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        shape.set_shape_kind(ShapeKind::Area);
        let rebuilds = shape.rebuild_count();
        assert!(shape.set_vertices(vec![Vec3::ZERO, Vec3::X]).is_err());
        assert_eq!(
            shape.set_vertices(Vec::new()),
            Err(ShapeError::NotEnoughVertices {
                kind: ShapeKind::Area,
                required: 3,
                actual: 0,
            })
        );
        assert_eq!(shape.kind(), ShapeKind::Area);
        assert_eq!(shape.vertices(), &TRIANGLE.map(Vec3::from)[..]);
        assert_eq!(shape.rebuild_count(), rebuilds);
    }

    #[test]
    fn test_set_vertices_clears_line() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        assert_eq!(shape.kind(), ShapeKind::Line);
        assert!(shape.set_vertices(vec![Vec3::ZERO]).is_err());
        assert!(shape.set_vertices(Vec::new()).is_ok());
        assert!(shape.is_empty());
        assert_eq!(shape.renderables().count(), 0);
    }

    #[test]
    fn test_events_fire_after_rebuild() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        let log = record(&mut shape);
        shape.set_closed(true);
        shape.insert_midpoint_at(1).unwrap();
        shape.set_shape_kind(ShapeKind::Volume);
        shape.set_shape_kind(ShapeKind::Line);
        assert_eq!(
            *log.borrow(),
            vec![
                ShapeEvent::ClosedChanged { closed: true },
                ShapeEvent::EdgeSplit { index: 1 },
                ShapeEvent::KindChanged {
                    kind: ShapeKind::Volume
                },
                ShapeEvent::KindChanged {
                    kind: ShapeKind::Line
                },
            ]
        );
    }

    #[test]
    fn test_rejected_mutation_emits_nothing() {
        let (_pool, mut shape) = shape_with(&[[0.0; 3], [1.0, 0.0, 0.0]]);
        let log = record(&mut shape);
        shape.set_shape_kind(ShapeKind::Volume);
        let _ = shape.remove_vertex_at(0);
        let _ = shape.insert_midpoint_at(5);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_closed_line_segments() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        let segments = |s: &Shape3D| {
            s.builder(ColorLayer::Line)
                .and_then(|b| b.renderable())
                .and_then(|r| r.primitive.as_lines())
                .map(|l| l.segment_count())
        };
        assert_eq!(segments(&shape), Some(2));
        shape.set_closed(true);
        assert_eq!(segments(&shape), Some(3));
    }

    #[test]
    fn test_appearance_controls_lower_layers() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        shape.set_shape_kind(ShapeKind::Volume);
        let visible = |s: &Shape3D, layer| {
            s.builder(layer)
                .and_then(|b| b.renderable())
                .map(|r| r.visible)
        };
        assert_eq!(visible(&shape, ColorLayer::Line), Some(true));
        assert_eq!(visible(&shape, ColorLayer::Area), Some(true));

        shape.set_appearance(Appearance {
            always_show_line: false,
            always_show_area: false,
        });
        assert_eq!(visible(&shape, ColorLayer::Line), Some(false));
        assert_eq!(visible(&shape, ColorLayer::Area), Some(false));
        assert_eq!(visible(&shape, ColorLayer::Volume), Some(true));
    }

    #[test]
    fn test_resources_stable_across_rebuilds() {
        let (pool, mut shape) = shape_with(&TRIANGLE);
        shape.set_shape_kind(ShapeKind::Volume);
        let live = pool.live();
        assert_eq!(live, 6);
        for i in 0..100 {
            shape
                .update_vertex_at(1, Vec3::new(5.0 + i as f32 * 0.1, 0.0, 5.0))
                .unwrap();
        }
        assert_eq!(pool.live(), live);
        shape.dispose();
        assert_eq!(pool.live(), 0);
        assert_eq!(shape.listener_count(), 0);
    }

    #[test]
    fn test_volume_height_rejects_nan() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        assert!(shape.set_volume_height(f32::NAN).is_err());
        assert!(shape.set_volume_height(-2.0).is_ok());
        assert_eq!(shape.style().volume_height, -2.0);
    }

    #[test]
    fn test_renderables_tagged_with_owner() {
        let (_pool, mut shape) = shape_with(&TRIANGLE);
        shape.set_shape_kind(ShapeKind::Area);
        assert!(shape.renderables().all(|r| r.owner() == Some(shape.id())));
    }

    #[test]
    fn test_reconfigure_falls_back_to_line() {
        let (_pool, mut shape) = shape_with(&[]);
        shape.reconfigure(ShapeKind::Area, vec![Vec3::ZERO, Vec3::X]);
        assert_eq!(shape.kind(), ShapeKind::Line);
        shape.reconfigure(ShapeKind::Area, vec![Vec3::ZERO, Vec3::X, Vec3::Z]);
        assert_eq!(shape.kind(), ShapeKind::Area);
    }
}
