use super::*;

const FULL: &str = r#"
[[models]]
id = "allam-13b"
url = "https://inference.example/v1/chat/completions"
kind = "text"

[[models]]
id = "allam-vision"
url = "https://inference.example/vision/chat/completions"
kind = "image"
model = "allam"

[upload]
url = "http://files.internal:9898/upload/"
image_base_url = "http://files.internal:9898"

[sampling]
temperature = 0.5
top_p = 0.9

[history]
max_turns = 3
"#;

const MINIMAL: &str = r#"
[[models]]
id = "allam-13b"
url = "https://inference.example/v1/chat/completions"
kind = "text"

[upload]
url = "http://files.internal:9898/upload/"
image_base_url = "http://files.internal:9898"
"#;

#[test]
fn full_config_parses() {
    let config = AppConfig::parse(FULL).unwrap();
    assert_eq!(config.model_ids(), vec!["allam-13b", "allam-vision"]);
    assert!((config.sampling.temperature - 0.5).abs() < f32::EPSILON);
    assert!((config.sampling.top_p - 0.9).abs() < f32::EPSILON);
    assert_eq!(config.history.max_turns, 3);

    let vision = config.endpoint("allam-vision").unwrap();
    assert!(vision.supports_images());
    assert_eq!(vision.payload_model(), "allam");
}

#[test]
fn minimal_config_applies_defaults() {
    let config = AppConfig::parse(MINIMAL).unwrap();
    assert!((config.sampling.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
    assert!((config.sampling.top_p - DEFAULT_TOP_P).abs() < f32::EPSILON);
    assert_eq!(config.history.max_turns, DEFAULT_MAX_TURNS);

    let text = config.endpoint("allam-13b").unwrap();
    assert!(!text.supports_images());
    assert_eq!(text.payload_model(), "allam-13b");
}

#[test]
fn unknown_endpoint_lookup_returns_none() {
    let config = AppConfig::parse(MINIMAL).unwrap();
    assert!(config.endpoint("missing").is_none());
}

#[test]
fn empty_model_table_is_rejected() {
    let raw = r#"
models = []

[upload]
url = "http://files.internal:9898/upload/"
image_base_url = "http://files.internal:9898"
"#;
    let err = AppConfig::parse(raw).unwrap_err().to_string();
    assert!(err.contains("at least one model"));
}

#[test]
fn duplicate_model_ids_are_rejected() {
    let raw = r#"
[[models]]
id = "dup"
url = "https://a.example"
kind = "text"

[[models]]
id = "dup"
url = "https://b.example"
kind = "text"

[upload]
url = "http://files.internal:9898/upload/"
image_base_url = "http://files.internal:9898"
"#;
    let err = AppConfig::parse(raw).unwrap_err().to_string();
    assert!(err.contains("duplicate model id"));
}

#[test]
fn empty_url_is_rejected() {
    let raw = r#"
[[models]]
id = "m"
url = ""
kind = "text"

[upload]
url = "http://files.internal:9898/upload/"
image_base_url = "http://files.internal:9898"
"#;
    let err = AppConfig::parse(raw).unwrap_err().to_string();
    assert!(err.contains("empty url"));
}

#[test]
fn load_missing_file_reports_path() {
    let err = AppConfig::load("/nonexistent/chatarena.toml").unwrap_err().to_string();
    assert!(err.contains("/nonexistent/chatarena.toml"));
}
