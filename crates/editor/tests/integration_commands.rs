//! Integration tests for the EditorCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use shape3d_lib::command::{execute_json, execute_json_batch};
use shape3d_lib::EditorHarness;

fn create(h: &mut EditorHarness, json: &str) -> String {
    let resp = execute_json(h, json).unwrap();
    assert!(resp.success, "{:?}", resp.error);
    resp.data.unwrap()["id"].as_str().unwrap().to_string()
}

fn inspect(h: &mut EditorHarness) -> serde_json::Value {
    let resp = execute_json(h, r#"{"command": "inspect"}"#).unwrap();
    assert!(resp.success);
    resp.data.unwrap()
}

fn run(h: &mut EditorHarness, json: &str) -> shape3d_lib::command::CommandResponse {
    execute_json(h, json).unwrap()
}

const TRIANGLE_LINE: &str =
    r#"{"command": "create_shape", "kind": "line", "vertices": [[0,0,0],[5,0,5],[0,0,5]]}"#;

#[test]
fn test_command_create_with_style() {
    let mut h = EditorHarness::new();
    let json = r#"{"command": "create_shape", "kind": "volume",
        "vertices": [[0,0,0],[2,0,0],[2,0,2],[0,0,2]],
        "style": {"line_color": 16711680, "volume_height": 4.0}}"#;
    create(&mut h, json);

    let data = inspect(&mut h);
    assert_eq!(data["shape_count"], 1);
    let shape = &data["shapes"][0];
    assert_eq!(shape["kind"], "volume");
    assert_eq!(shape["volume_height"], 4.0);
    assert_eq!(shape["closed"], true);
    assert_eq!(shape["segments"], 4);
}

#[test]
fn test_command_create_falls_back_to_line() {
    let mut h = EditorHarness::new();
    let resp = run(&mut h, r#"{"command": "create_shape", "kind": "area", "vertices": [[0,0,0],[1,0,0]]}"#);
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["kind"], "line");
}

#[test]
fn test_command_vertex_editing() {
    let mut h = EditorHarness::new();
    let id = create(&mut h, TRIANGLE_LINE);

    let resp = run(&mut h, &format!(r#"{{"command": "split_edge", "id": "{id}", "edge": 1}}"#));
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["inserted"], serde_json::json!([2.5, 0.0, 2.5]));

    let resp = run(&mut h, &format!(r#"{{"command": "remove_vertex", "id": "{id}", "index": 9}}"#));
    assert!(!resp.success);

    let resp = run(
        &mut h,
        &format!(r#"{{"command": "update_vertex", "id": "{id}", "index": 0, "vertex": [-1, 0, 0]}}"#),
    );
    assert!(resp.success);

    let data = inspect(&mut h);
    assert_eq!(data["shapes"][0]["vertices"].as_array().unwrap().len(), 4);
    assert_eq!(data["shapes"][0]["vertices"][0], serde_json::json!([-1.0, 0.0, 0.0]));
}

#[test]
fn test_command_kind_and_closure() {
    let mut h = EditorHarness::new();
    let id = create(&mut h, TRIANGLE_LINE);

    let resp = run(&mut h, &format!(r#"{{"command": "set_closed", "id": "{id}", "closed": true}}"#));
    assert_eq!(resp.data.unwrap()["closed"], true);
    assert_eq!(inspect(&mut h)["shapes"][0]["segments"], 3);

    let resp = run(&mut h, &format!(r#"{{"command": "set_kind", "id": "{id}", "kind": "volume"}}"#));
    assert!(resp.success);
    let resp = run(&mut h, &format!(r#"{{"command": "set_volume_height", "id": "{id}", "height": 2.5}}"#));
    assert!(resp.success);
    let data = inspect(&mut h);
    assert_eq!(data["shapes"][0]["kind"], "volume");
    assert_eq!(data["shapes"][0]["volume_height"], 2.5);
}

#[test]
fn test_command_unknown_shape() {
    let mut h = EditorHarness::new();
    let resp = run(
        &mut h,
        r#"{"command": "select", "id": "00000000-0000-0000-0000-000000000000"}"#,
    );
    assert!(!resp.success);
    assert!(resp.error.is_some());
}

#[test]
fn test_command_pointer_drag_script() {
    let mut h = EditorHarness::new();
    let id = create(&mut h, TRIANGLE_LINE);
    let script = format!(
        r#"[
            {{"command": "select", "id": "{id}"}},
            {{"command": "pointer_down", "point": [5, 0, 5]}},
            {{"command": "pointer_move", "point": [8, 0, 5]}},
            {{"command": "pointer_move", "point": [10, 0, 5]}},
            {{"command": "pointer_up", "point": [10, 0, 5]}}
        ]"#
    );
    let responses = execute_json_batch(&mut h, &script).unwrap();
    assert!(responses.iter().all(|r| r.success));
    let down = responses[1].data.as_ref().unwrap();
    assert_eq!(down["consumed"], true);
    assert_eq!(down["dragging"], true);
    assert_eq!(responses[2].data.as_ref().unwrap()["cursor"], "none");

    let data = inspect(&mut h);
    let moved = data["shapes"][0]["vertices"][1].as_array().unwrap();
    assert!((moved[0].as_f64().unwrap() - 10.0).abs() < 1e-2);
    assert!((moved[2].as_f64().unwrap() - 5.0).abs() < 1e-2);
    assert_eq!(data["controls"]["dragging"], false);
    assert_eq!(data["controls"]["vertex_handles"], 3);
}

#[test]
fn test_command_label_input() {
    let mut h = EditorHarness::new();
    let id = create(&mut h, TRIANGLE_LINE);
    run(&mut h, &format!(r#"{{"command": "select", "id": "{id}"}}"#));

    let resp = run(
        &mut h,
        r#"{"command": "label_input", "target": {"type": "edge", "index": 2}, "text": "10"}"#,
    );
    assert!(resp.success, "{:?}", resp.error);
    let data = inspect(&mut h);
    assert_eq!(data["shapes"][0]["vertices"][2], serde_json::json!([-5.0, 0.0, 5.0]));
    let labels = data["controls"]["length_labels"].as_array().unwrap();
    assert!(labels.iter().any(|l| l["edge"] == 2 && l["text"] == "10.00m"));

    for text in ["-3", "abc"] {
        let json = format!(
            r#"{{"command": "label_input", "target": {{"type": "edge", "index": 2}}, "text": "{text}"}}"#
        );
        assert!(!run(&mut h, &json).success);
    }
    let after = inspect(&mut h);
    assert_eq!(after["shapes"][0]["vertices"], data["shapes"][0]["vertices"]);

    let resp = run(
        &mut h,
        r#"{"command": "label_input", "target": {"type": "edge", "index": 7}, "text": "1"}"#,
    );
    assert!(!resp.success);
}

#[test]
fn test_command_angle_and_mode() {
    let mut h = EditorHarness::new();
    let id = create(
        &mut h,
        r#"{"command": "create_shape", "kind": "area", "vertices": [[0,0,0],[4,0,0],[4,0,4],[0,0,4]]}"#,
    );
    run(&mut h, &format!(r#"{{"command": "select", "id": "{id}"}}"#));

    let resp = run(&mut h, r#"{"command": "set_vertex_angle", "vertex": 1, "degrees": 45}"#);
    assert!(resp.success);
    let data = inspect(&mut h);
    let angles = data["controls"]["angle_labels"].as_array().unwrap();
    assert!(angles.iter().any(|a| a["vertex"] == 1 && a["text"] == "45.00°"));

    let resp = run(&mut h, r#"{"command": "key", "key": "e"}"#);
    assert_eq!(resp.data.unwrap()["mode"], "rotate");
    let resp = run(&mut h, r#"{"command": "set_mode", "mode": "scale"}"#);
    assert!(resp.success);
    assert_eq!(inspect(&mut h)["controls"]["mode"], "scale");
}

#[test]
fn test_command_escape_and_delete() {
    let mut h = EditorHarness::new();
    let id = create(&mut h, TRIANGLE_LINE);
    run(&mut h, &format!(r#"{{"command": "select", "id": "{id}"}}"#));
    run(&mut h, r#"{"command": "key", "key": "escape"}"#);
    let data = inspect(&mut h);
    assert!(data["selected"].is_null());
    assert!(data["controls"]["attached"].is_null());

    let resp = run(&mut h, &format!(r#"{{"command": "delete_shape", "id": "{id}"}}"#));
    assert_eq!(resp.data.unwrap()["removed"], true);
    let data = inspect(&mut h);
    assert_eq!(data["shape_count"], 0);
    assert_eq!(data["live_resources"], 0);
}

#[test]
fn test_command_batch_continues_after_failure() {
    let mut h = EditorHarness::new();
    let json = r#"[
        {"command": "create_shape", "kind": "line", "vertices": [[0,0,0],[1,0,0]]},
        {"command": "set_edge_length", "edge": 1, "length": 3},
        {"command": "create_shape", "kind": "area", "vertices": [[0,0,0],[1,0,0],[1,0,1]]},
        {"command": "clear"},
        {"command": "inspect"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 5);
    assert!(responses[0].success);
    assert!(!responses[1].success);
    assert!(responses[2].success);
    assert_eq!(responses[4].data.as_ref().unwrap()["shape_count"], 0);
}

#[test]
fn test_command_invalid_json() {
    let mut h = EditorHarness::new();
    assert!(execute_json(&mut h, "not json").is_err());
    assert!(execute_json(&mut h, r#"{"command": "explode"}"#).is_err());
    assert!(execute_json_batch(&mut h, r#"{"command": "inspect"}"#).is_err());
}
