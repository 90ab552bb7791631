use super::*;
use crate::config::AppConfig;

const CONFIG: &str = r#"
[[models]]
id = "text-model"
url = "https://inference.example/v1/chat/completions"
kind = "text"

[[models]]
id = "vision-model"
url = "https://inference.example/vision/chat/completions"
kind = "image"
model = "allam"

[upload]
url = "http://files.internal:9898/upload/"
image_base_url = "http://files.internal:9898"
"#;

fn config() -> Arc<AppConfig> {
    Arc::new(AppConfig::parse(CONFIG).unwrap())
}

fn seeded_conversation() -> Conversation {
    let mut conversation = Conversation::new(5, "test");
    conversation.append_turn_pair("earlier question", "earlier answer");
    conversation
}

// =============================================================================
// build_request
// =============================================================================

#[test]
fn text_model_gets_plain_content_even_with_pending_image() {
    let config = config();
    let endpoint = config.endpoint("text-model").unwrap();
    let request = build_request(
        endpoint,
        "hello",
        seeded_conversation().snapshot(),
        Some("/files/cat.png"),
        &config.upload.image_base_url,
        config.sampling,
    );

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "text-model");
    assert_eq!(json["stream"], true);
    assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert!((json["top_p"].as_f64().unwrap() - 0.95).abs() < 1e-6);

    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["content"], "earlier question");
    assert_eq!(messages[1]["content"], "earlier answer");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["content"], "hello");
}

#[test]
fn image_model_with_pending_image_gets_multimodal_content() {
    let config = config();
    let endpoint = config.endpoint("vision-model").unwrap();
    let request = build_request(
        endpoint,
        "what is this?",
        Vec::new(),
        Some("/files/cat.png"),
        &config.upload.image_base_url,
        config.sampling,
    );

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "allam");

    let content = json["messages"][0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["type"], "image_url");
    assert_eq!(content[0]["image_url"]["url"], "http://files.internal:9898/files/cat.png");
    assert_eq!(content[1]["type"], "text");
    assert_eq!(content[1]["text"], "what is this?");
}

#[test]
fn image_model_without_pending_image_gets_plain_content() {
    let config = config();
    let endpoint = config.endpoint("vision-model").unwrap();
    let request = build_request(
        endpoint,
        "no image here",
        Vec::new(),
        None,
        &config.upload.image_base_url,
        config.sampling,
    );

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["messages"][0]["content"], "no image here");
}

// =============================================================================
// stream_chat
// =============================================================================

#[test]
fn unknown_model_fails_fast_with_zero_yields() {
    let client = InferenceClient::new(reqwest::Client::new(), config());
    let conversation = Conversation::new(5, "test");

    let result = client.stream_chat("missing-model", "hi", &conversation);
    match result {
        Err(LlmError::UnknownModel(model)) => assert_eq!(model, "missing-model"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected unknown model to fail before streaming"),
    }
}
