//! File-based replay tests.

use std::io::Write;

use overlay_replay::{replay, ReplayConfig, ReplayError};

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

const SESSION: &str = r##"{
    "steps": [
        {"action": "load_image", "mime": "image/jpeg", "src": "data:image/jpeg;base64,AAAA", "width": 1080, "height": 1920, "name": "portrait.jpg"},
        {"action": "add_text"},
        {"action": "begin_text_edit", "target": "active"},
        {"action": "edit_text", "text": "Weekend vibes"},
        {"action": "end_text_edit"},
        {"action": "add_text"},
        {"action": "update", "target": {"index": 1}, "patch": {"fill": "#FF00AA", "fontFamily": "Pacifico"}},
        {"action": "select", "target": {"index": 0}}
    ]
}"##;

#[test]
fn replays_session_from_file() {
    let script = write_temp(SESSION);
    let outcome = replay(&ReplayConfig::new(script.path())).expect("replay succeeds");

    assert!(outcome.skipped.is_empty(), "skipped: {:?}", outcome.skipped);
    let doc = &outcome.document;
    assert_eq!((doc.canvas_width, doc.canvas_height), (394, 700));
    assert_eq!(doc.objects.len(), 2);

    let first = doc.objects[0].as_text().expect("text");
    assert_eq!(first.content, "Weekend vibes");
    let second = doc.objects[1].as_text().expect("text");
    assert_eq!(second.fill, "#ff00aa");
    assert_eq!(second.font_family, "Pacifico");
    assert_eq!(doc.active_object_id, Some(doc.objects[0].id));
}

#[test]
fn config_file_overrides_defaults() {
    let script = write_temp(r#"[{"action": "load_image", "mime": "image/png", "src": "a.png", "width": 2000, "height": 1000}]"#);
    let config_file = write_temp(r#"{"max_canvas_width": 1000, "max_canvas_height": 1000}"#);

    let mut config = ReplayConfig::new(script.path());
    config.config = Some(config_file.path().to_path_buf());
    let outcome = replay(&config).expect("replay succeeds");

    assert_eq!(outcome.document.canvas_width, 1000);
    assert_eq!(outcome.document.canvas_height, 500);
}

#[test]
fn zero_scale_sensitivity_is_rejected() {
    let script = write_temp(r#"[{"action": "add_text"}]"#);
    let config_file = write_temp(r#"{"gesture": {"scale_sensitivity": 0.0}}"#);

    let mut config = ReplayConfig::new(script.path());
    config.config = Some(config_file.path().to_path_buf());
    let err = replay(&config).expect_err("should fail");
    assert!(matches!(
        err,
        ReplayError::Editor(overlay_core::OverlayError::InvalidConfig(_))
    ));
}

#[test]
fn malformed_script_is_parse_error() {
    let script = write_temp("{ nope");
    let err = replay(&ReplayConfig::new(script.path())).expect_err("should fail");
    assert!(matches!(err, ReplayError::Parse { .. }));
}

#[test]
fn outcome_json_is_parseable() {
    let script = write_temp(SESSION);
    let outcome = replay(&ReplayConfig::new(script.path())).expect("replay succeeds");
    let json = outcome.to_json(true, true).expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(value["document"]["objects"].as_array().map(Vec::len), Some(2));
    assert!(value["scene"].is_object());
}
