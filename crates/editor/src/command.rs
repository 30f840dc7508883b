//! JSON command protocol for scripted editing.
//!
//! Every command runs against an [`EditorHarness`] and is followed by one
//! controls frame, so handles and labels reflect the command's effect.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{ShapeKind, ShapeOptions, TransformMode, Vertex};

use crate::controls::{HandleRole, LabelTarget};
use crate::core::{ShapeError, ShapeId};
use crate::harness::EditorHarness;
use crate::validation::ShapeValidator;
use crate::viewport::input::{Key, PointerButton};

/// A command a script can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    /// Create a shape through the factory
    CreateShape {
        kind: ShapeKind,
        #[serde(flatten)]
        options: ShapeOptions,
    },
    /// Remove and dispose a shape
    DeleteShape { id: ShapeId },
    SetVertices { id: ShapeId, vertices: Vec<Vertex> },
    UpdateVertex {
        id: ShapeId,
        index: usize,
        vertex: Vertex,
    },
    /// Insert the midpoint of edge `edge`
    SplitEdge { id: ShapeId, edge: usize },
    RemoveVertex { id: ShapeId, index: usize },
    SetKind { id: ShapeId, kind: ShapeKind },
    SetClosed { id: ShapeId, closed: bool },
    SetVolumeHeight { id: ShapeId, height: f32 },
    /// Select a shape and attach the controls
    Select { id: ShapeId },
    Deselect,
    SetMode { mode: TransformMode },
    /// Pointer pressed over a world point
    PointerDown {
        point: Vertex,
        #[serde(default)]
        button: PointerButton,
    },
    PointerMove { point: Vertex },
    PointerUp {
        point: Vertex,
        #[serde(default)]
        button: PointerButton,
    },
    Key { key: Key },
    /// Set the length of an edge of the attached shape
    SetEdgeLength { edge: usize, length: f32 },
    /// Set the angle at a vertex of the attached shape
    SetVertexAngle { vertex: usize, degrees: f32 },
    /// Type into a label and commit it, as a user would
    LabelInput { target: LabelTarget, text: String },
    /// Remove every shape
    Clear,
    /// Describe the scene and the controls
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }

    fn from_result<T>(result: Result<T, ShapeError>, data: impl FnOnce(T) -> serde_json::Value) -> Self {
        match result {
            Ok(v) => Self::ok_with_data(data(v)),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut EditorHarness, cmd: EditorCommand) -> CommandResponse {
    let response = dispatch(harness, cmd);
    harness.frame();
    response
}

fn dispatch(harness: &mut EditorHarness, cmd: EditorCommand) -> CommandResponse {
    match cmd {
        EditorCommand::CreateShape { kind, options } => {
            let id = harness.create_shape(kind, options);
            let actual = harness.shape(id).map(|s| s.kind()).unwrap_or(kind);
            CommandResponse::ok_with_data(serde_json::json!({ "id": id, "kind": actual }))
        }

        EditorCommand::DeleteShape { id } => {
            let removed = harness.remove_shape(id);
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }

        EditorCommand::SetVertices { id, vertices } => {
            let result = harness
                .shape_mut(id)
                .and_then(|s| s.set_vertices(vertices.into_iter().map(Vec3::from).collect()));
            CommandResponse::from_result(result, |_| serde_json::json!({ "vertex_count": vertex_count(harness, id) }))
        }

        EditorCommand::UpdateVertex { id, index, vertex } => {
            let result = harness
                .shape_mut(id)
                .and_then(|s| s.update_vertex_at(index, Vec3::from(vertex)));
            CommandResponse::from_result(result, |_| serde_json::json!({ "index": index }))
        }

        EditorCommand::SplitEdge { id, edge } => {
            let result = harness.shape_mut(id).and_then(|s| s.insert_midpoint_at(edge));
            CommandResponse::from_result(result, |mid| serde_json::json!({ "inserted": mid.to_array() }))
        }

        EditorCommand::RemoveVertex { id, index } => {
            let result = harness.shape_mut(id).and_then(|s| s.remove_vertex_at(index));
            CommandResponse::from_result(result, |v| serde_json::json!({ "removed": v.to_array() }))
        }

        EditorCommand::SetKind { id, kind } => match harness.shape_mut(id) {
            Ok(shape) => {
                let actual = shape.set_shape_kind(kind);
                if actual == kind {
                    CommandResponse::ok_with_data(serde_json::json!({ "kind": actual }))
                } else {
                    CommandResponse::err(
                        ShapeError::NotEnoughVertices {
                            kind,
                            required: kind.min_vertices(),
                            actual: shape.len(),
                        }
                        .to_string(),
                    )
                }
            }
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::SetClosed { id, closed } => match harness.shape_mut(id) {
            Ok(shape) => {
                shape.set_closed(closed);
                CommandResponse::ok_with_data(serde_json::json!({ "closed": shape.is_closed() }))
            }
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::SetVolumeHeight { id, height } => {
            let result = harness.shape_mut(id).and_then(|s| s.set_volume_height(height));
            CommandResponse::from_result(result, |_| serde_json::json!({ "height": height }))
        }

        EditorCommand::Select { id } => {
            let result = harness.select(id);
            CommandResponse::from_result(result, |_| serde_json::json!({ "selected": id }))
        }

        EditorCommand::Deselect => {
            harness.deselect();
            CommandResponse::ok()
        }

        EditorCommand::SetMode { mode } => {
            harness.controls.set_mode(mode);
            CommandResponse::ok_with_data(serde_json::json!({ "mode": mode }))
        }

        EditorCommand::PointerDown { point, button } => {
            let ndc = harness.ndc_of(Vec3::from(point));
            let consumed = harness.pointer_down(ndc, button);
            CommandResponse::ok_with_data(serde_json::json!({
                "consumed": consumed,
                "dragging": harness.controls.is_dragging(),
            }))
        }

        EditorCommand::PointerMove { point } => {
            let ndc = harness.ndc_of(Vec3::from(point));
            harness.pointer_move(ndc);
            CommandResponse::ok_with_data(serde_json::json!({ "cursor": harness.controls.cursor() }))
        }

        EditorCommand::PointerUp { point, button } => {
            let ndc = harness.ndc_of(Vec3::from(point));
            harness.pointer_up(ndc, button);
            CommandResponse::ok()
        }

        EditorCommand::Key { key } => {
            harness.key(key);
            CommandResponse::ok_with_data(serde_json::json!({
                "mode": harness.controls.mode(),
                "space": harness.controls.space(),
            }))
        }

        EditorCommand::SetEdgeLength { edge, length } => {
            let result = harness.controls.set_edge_length(&mut harness.scene, edge, length);
            CommandResponse::from_result(result, |_| serde_json::json!({ "edge": edge, "length": length }))
        }

        EditorCommand::SetVertexAngle { vertex, degrees } => {
            let result = harness.controls.set_vertex_angle(&mut harness.scene, vertex, degrees);
            CommandResponse::from_result(result, |_| serde_json::json!({ "vertex": vertex, "degrees": degrees }))
        }

        EditorCommand::LabelInput { target, text } => {
            if !harness.controls.unlock_label(target) || !harness.controls.type_label(target, &text) {
                return CommandResponse::err(format!("No label for {:?}", target));
            }
            if harness.controls.commit_label(&mut harness.scene, target) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("Input '{}' rejected", text))
            }
        }

        EditorCommand::Clear => {
            harness.clear();
            CommandResponse::ok()
        }

        EditorCommand::Inspect => CommandResponse::ok_with_data(inspect(harness)),
    }
}

fn vertex_count(harness: &EditorHarness, id: ShapeId) -> usize {
    harness.shape(id).map_or(0, |s| s.len())
}

/// Snapshot of the scene and the controls
fn inspect(harness: &EditorHarness) -> serde_json::Value {
    let selected = harness.selected();
    let shapes: Vec<serde_json::Value> = harness
        .scene
        .iter()
        .map(|shape| {
            let vertices: Vec<[f32; 3]> = shape.vertices().iter().map(|v| v.to_array()).collect();
            serde_json::json!({
                "id": shape.id(),
                "kind": shape.kind(),
                "vertices": vertices,
                "closed": shape.is_closed(),
                "ghost": shape.is_ghost(),
                "selected": selected == Some(shape.id()),
                "volume_height": shape.style().volume_height,
                "segments": ShapeValidator::new(shape).line_segment_count(),
                "position": shape.node.position.to_array(),
            })
        })
        .collect();

    let controls = &harness.controls;
    let lengths: Vec<serde_json::Value> = controls
        .labels()
        .lengths()
        .iter()
        .map(|l| serde_json::json!({ "edge": l.edge, "text": l.field.text() }))
        .collect();
    let angles: Vec<serde_json::Value> = controls
        .labels()
        .angles()
        .iter()
        .map(|a| serde_json::json!({ "vertex": a.vertex, "text": a.field.text() }))
        .collect();

    serde_json::json!({
        "shape_count": shapes.len(),
        "shapes": shapes,
        "selected": selected,
        "controls": {
            "attached": controls.attached(),
            "mode": controls.mode(),
            "space": controls.space(),
            "cursor": controls.cursor(),
            "dragging": controls.is_dragging(),
            "vertex_handles": controls.handles().count(HandleRole::Vertex),
            "midpoint_handles": controls.handles().count(HandleRole::Midpoint),
            "length_labels": lengths,
            "angle_labels": angles,
        },
        "live_resources": harness.live_resources(),
    })
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut EditorHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: EditorCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut EditorHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<EditorCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
