//! Integration tests for shape entities: kind guards, edge splits, removal
//! guards, rebuild stability and the builder layers of each kind.

use glam::Vec3;
use shape3d_lib::core::{Shape3D, ShapeError, ShapeEvent};
use shape3d_lib::factory;
use shape3d_lib::fixtures::*;
use shape3d_lib::scene::{Primitive, ResourcePool, Side};
use shape3d_lib::validation::{LineValidator, MeshValidator, ShapeValidator};
use shared::{Appearance, ColorLayer, ShapeKind, ShapeOptions};
use std::cell::RefCell;
use std::rc::Rc;

fn ring(n: usize) -> Vec<[f32; 3]> {
    (0..n)
        .map(|i| {
            let a = i as f32 / n.max(1) as f32 * std::f32::consts::TAU;
            [a.cos() * 3.0, 0.0, a.sin() * 3.0]
        })
        .collect()
}

fn primitives(shape: &Shape3D) -> Vec<Primitive> {
    shape.renderables().map(|r| r.primitive.clone()).collect()
}

fn record(shape: &mut Shape3D) -> Rc<RefCell<Vec<ShapeEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    shape.subscribe(move |_, e| sink.borrow_mut().push(e.clone()));
    events
}

#[test]
fn test_rebuild_idempotent_for_every_kind() {
    let pool = ResourcePool::new();
    for &kind in ShapeKind::all() {
        let mut shape = l_shape(&pool, kind);
        let before = primitives(&shape);
        shape.rebuild();
        shape.rebuild();
        assert_eq!(primitives(&shape), before, "{} rebuild changed geometry", kind);
    }
}

#[test]
fn test_minimum_vertex_guard() {
    let pool = ResourcePool::new();
    for n in 0..6 {
        for &kind in ShapeKind::all() {
            let mut shape = Shape3D::new(&pool, options_with(ring(n)));
            let before = shape.vertices().to_vec();
            let result = shape.set_shape_kind(kind);
            if n >= kind.min_vertices() {
                assert_eq!(result, kind, "n={} kind={}", n, kind);
            } else {
                assert_eq!(result, ShapeKind::Line, "n={} kind={}", n, kind);
                assert_eq!(shape.kind(), ShapeKind::Line);
            }
            assert_eq!(shape.vertices(), before.as_slice());
        }
    }
}

#[test]
fn test_edge_split_inserts_mean() {
    let pool = ResourcePool::new();
    let mut shape = l_shape(&pool, ShapeKind::Area);
    let events = record(&mut shape);
    let original = shape.vertices().to_vec();

    let mid = shape.insert_midpoint_at(3).unwrap();
    assert_eq!(mid, (original[2] + original[3]) * 0.5);
    assert_eq!(shape.len(), original.len() + 1);
    assert_eq!(shape.vertex(3), Some(mid));

    let mut without = shape.vertices().to_vec();
    without.remove(3);
    assert_eq!(without, original);
    assert_eq!(events.borrow().as_slice(), &[ShapeEvent::EdgeSplit { index: 3 }]);
}

#[test]
fn test_closing_edge_split_appends() {
    let pool = ResourcePool::new();
    let mut shape = square_area(&pool, 4.0);
    let mid = shape.insert_midpoint_at(4).unwrap();
    assert_eq!(mid, Vec3::new(0.0, 0.0, 2.0));
    assert_eq!(shape.vertex(4), Some(mid));

    // An open line has no closing edge
    let mut line = open_triangle_line(&pool);
    assert_eq!(
        line.insert_midpoint_at(3),
        Err(ShapeError::IndexOutOfRange { index: 3, len: 3 })
    );
    assert_eq!(line.insert_midpoint_at(0), Err(ShapeError::IndexOutOfRange { index: 0, len: 3 }));
}

#[test]
fn test_removal_guard() {
    let pool = ResourcePool::new();
    let mut line = factory::create(&pool, ShapeKind::Line, options_with(triangle_vertices()[..2].to_vec()));
    let before = line.vertices().to_vec();
    assert!(matches!(line.remove_vertex_at(0), Err(ShapeError::NotEnoughVertices { .. })));
    assert_eq!(line.vertices(), before.as_slice());

    let mut area = square_area(&pool, 2.0);
    assert!(area.remove_vertex_at(1).is_ok());
    let before = area.vertices().to_vec();
    assert!(matches!(area.remove_vertex_at(0), Err(ShapeError::NotEnoughVertices { .. })));
    assert_eq!(area.vertices(), before.as_slice());
    assert!(matches!(area.remove_vertex_at(7), Err(ShapeError::IndexOutOfRange { .. })));
}

#[test]
fn test_update_vertex_out_of_range_is_error() {
    let pool = ResourcePool::new();
    let mut shape = open_triangle_line(&pool);
    assert_eq!(
        shape.update_vertex_at(3, Vec3::ONE),
        Err(ShapeError::IndexOutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn test_scenario_open_line() {
    let mut h = shape3d_lib::EditorHarness::new();
    let id = h.create(ShapeKind::Line, &triangle_vertices());
    h.select(id).unwrap();
    h.frame();

    let v = h.validate_shape(id).unwrap();
    assert!(v.validate_all().is_empty(), "{:?}", v.validate_all());
    assert_eq!(v.line_segment_count(), 2);
    assert_eq!(h.controls.handles().count(shape3d_lib::controls::HandleRole::Vertex), 3);
    assert_eq!(h.controls.handles().count(shape3d_lib::controls::HandleRole::Midpoint), 2);
}

#[test]
fn test_scenario_line_to_area() {
    let pool = ResourcePool::new();
    let mut shape = open_triangle_line(&pool);
    assert_eq!(shape.set_shape_kind(ShapeKind::Area), ShapeKind::Area);

    let area = shape.builder(ColorLayer::Area).and_then(|b| b.renderable()).unwrap();
    let mesh = area.primitive.as_mesh().unwrap();
    assert_eq!(MeshValidator::new(mesh).triangle_count(), 1);
    assert_eq!(area.material.side, Side::Back);

    let line = shape.builder(ColorLayer::Line).and_then(|b| b.renderable()).unwrap();
    assert!(line.visible);
    // Area closes the boundary even though close_line is false
    let lines = line.primitive.as_lines().unwrap();
    assert_eq!(LineValidator::new(lines).segment_count(), 3);
    assert!(LineValidator::new(lines).is_closed_loop(1e-6));

    shape.set_appearance(Appearance {
        always_show_line: false,
        always_show_area: true,
    });
    let line = shape.builder(ColorLayer::Line).and_then(|b| b.renderable()).unwrap();
    assert!(!line.visible);
}

#[test]
fn test_scenario_volume_rejected_on_two_vertices() {
    let pool = ResourcePool::new();
    let mut shape = Shape3D::new(&pool, options_with(triangle_vertices()[..2].to_vec()));
    let events = record(&mut shape);
    assert_eq!(shape.set_shape_kind(ShapeKind::Volume), ShapeKind::Line);
    assert_eq!(shape.kind(), ShapeKind::Line);
    assert_eq!(shape.len(), 2);
    assert!(events.borrow().is_empty());
}

#[test]
fn test_closed_kinds_reject_empty_vertex_list() {
    let pool = ResourcePool::new();
    for kind in [ShapeKind::Area, ShapeKind::Volume] {
        let mut shape = l_shape(&pool, kind);
        let before = shape.vertices().to_vec();
        let renderables = shape.renderables().count();
        let events = record(&mut shape);

        assert_eq!(
            shape.set_vertices(Vec::new()),
            Err(ShapeError::NotEnoughVertices {
                kind,
                required: 3,
                actual: 0
            })
        );
        assert_eq!(shape.kind(), kind);
        assert_eq!(shape.vertices(), before.as_slice());
        assert_eq!(shape.renderables().count(), renderables);
        assert!(events.borrow().is_empty());
    }

    let mut line = open_triangle_line(&pool);
    line.set_vertices(Vec::new()).unwrap();
    assert_eq!(line.kind(), ShapeKind::Line);
    assert_eq!(line.renderables().count(), 0);
}

#[test]
fn test_volume_height_and_layers() {
    let pool = ResourcePool::new();
    let mut shape = volume_with_height(&pool, square_vertices(2.0), 3.0);
    let v = ShapeValidator::new(&shape);
    assert!(v.validate_all().is_empty(), "{:?}", v.validate_all());
    let volume = shape.builder(ColorLayer::Volume).and_then(|b| b.renderable()).unwrap();
    let dims = MeshValidator::new(volume.primitive.as_mesh().unwrap()).dimensions();
    assert!((dims[1] - 3.0).abs() < 1e-4);

    shape.set_volume_height(-2.0).unwrap();
    let volume = shape.builder(ColorLayer::Volume).and_then(|b| b.renderable()).unwrap();
    let aabb = MeshValidator::new(volume.primitive.as_mesh().unwrap()).aabb();
    assert!(aabb.max.y < 0.1);
    assert!((aabb.min.y + 2.0).abs() < 0.1);

    assert!(shape.set_volume_height(f32::NAN).is_err());
}

#[test]
fn test_resources_stable_across_rebuilds() {
    let pool = ResourcePool::new();
    let mut shape = l_shape(&pool, ShapeKind::Volume);
    let live = pool.live();
    for i in 0..50 {
        shape
            .update_vertex_at(0, Vec3::new(-(i as f32) * 0.01, 0.0, 0.0))
            .unwrap();
    }
    shape.set_closed(true);
    shape.set_color(ColorLayer::Area, 0x336699);
    assert_eq!(pool.live(), live);

    shape.set_shape_kind(ShapeKind::Line);
    assert!(pool.live() < live);
    shape.dispose();
    assert_eq!(pool.live(), 0);
}

#[test]
fn test_each_mutation_rebuilds_once_then_notifies() {
    let pool = ResourcePool::new();
    let mut shape = square_area(&pool, 2.0);
    let events = record(&mut shape);
    let rebuilds = shape.rebuild_count();

    shape.add_point(Vec3::new(-1.0, 0.0, 1.0));
    shape.set_closed(true);
    shape.set_color(ColorLayer::Line, 0x00ff00);
    let names: Vec<&str> = events.borrow().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["point-added", "closed-changed", "style-changed"]);
    assert_eq!(shape.rebuild_count(), rebuilds + 3);
}

#[test]
fn test_factory_keeps_close_flag() {
    let pool = ResourcePool::new();
    let mut shape = factory::create(
        &pool,
        ShapeKind::Area,
        ShapeOptions {
            vertices: square_vertices(1.0),
            close_line: true,
            ..Default::default()
        },
    );
    let events = record(&mut shape);
    assert!(shape.is_closed());
    assert!(events.borrow().is_empty());
}
