//! Tool dispatch end to end: model-shaped calls in, tool-shaped JSON out.

use crate::integration::mock_server::{MockServerFixture, IMAGE_URL};
use senpai_vision::render::AnnotationSet;
use senpai_vision::types::ToolCall;
use senpai_vision::{VisionResult, VisionToolset};
use serde_json::json;
use std::sync::Arc;

fn toolset(fixture: &MockServerFixture) -> VisionToolset {
    VisionToolset::new(Arc::new(fixture.client())).unwrap()
}

#[tokio::test]
async fn test_detect_tool_result_is_camel_case() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_success(
            "/detect",
            json!({"image_url": IMAGE_URL, "object": "mug"}),
            json!({
                "objects": [
                    {"x_min": 0.1, "y_min": 0.1, "x_max": 0.2, "y_max": 0.2},
                    {"x_min": 0.4, "y_min": 0.4, "x_max": 0.5, "y_max": 0.5},
                    {"x_min": 0.7, "y_min": 0.7, "x_max": 0.8, "y_max": 0.8}
                ],
                "request_id": "req-t1"
            }),
        )
        .await;

    let result = toolset(&fixture)
        .execute(&ToolCall::new(
            "call_1",
            "moondreamDetect",
            json!({"imageUrl": IMAGE_URL, "object": "mug"}),
        ))
        .await;

    assert!(!result.is_error);
    assert_eq!(result.tool_use_id, "call_1");
    let content = &result.content;
    assert_eq!(content["count"], 3);
    assert_eq!(content["objects"].as_array().unwrap().len(), 3);
    assert_eq!(content["imageUrl"], IMAGE_URL);
    assert_eq!(content["object"], "mug");
    assert_eq!(content["requestId"], "req-t1");
    assert_eq!(content["visualizationType"], "bounding-boxes");
}

#[tokio::test]
async fn test_string_encoded_arguments_are_accepted() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_success(
            "/query",
            json!({"question": "How many mugs?"}),
            json!({"answer": "Two.", "request_id": "req-t2"}),
        )
        .await;

    let arguments = json!({"imageUrl": IMAGE_URL, "question": "How many mugs?"}).to_string();
    let result = toolset(&fixture)
        .execute(&ToolCall::new("call_2", "moondreamQuery", json!(arguments)))
        .await;

    mock.assert_async().await;
    assert!(!result.is_error);
    assert_eq!(result.content, json!({"answer": "Two.", "requestId": "req-t2"}));
}

#[tokio::test]
async fn test_upstream_failure_becomes_error_content() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_raw("/caption", 429, r#"{"error":"rate limited"}"#)
        .await;

    let result = toolset(&fixture)
        .execute(&ToolCall::new(
            "call_3",
            "moondreamCaption",
            json!({"imageUrl": IMAGE_URL, "length": "long"}),
        ))
        .await;

    assert!(result.is_error);
    assert_eq!(
        result.content,
        json!({"error": r#"Moondream API error (429): {"error":"rate limited"}"#})
    );
}

#[tokio::test]
async fn test_schema_rejects_before_network() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_untouched("/point").await;
    let tools = toolset(&fixture);

    for arguments in [
        json!({"imageUrl": IMAGE_URL}),
        json!({"imageUrl": IMAGE_URL, "object": ""}),
        json!({"imageUrl": 42, "object": "kettle"}),
    ] {
        let result = tools
            .execute(&ToolCall::new("call_4", "moondreamPoint", arguments))
            .await;
        assert!(result.is_error);
        assert!(result.error_message().unwrap().starts_with("Validation error"));
    }

    let bad_length = tools
        .execute(&ToolCall::new(
            "call_5",
            "moondreamCaption",
            json!({"imageUrl": IMAGE_URL, "length": "epic"}),
        ))
        .await;
    assert!(bad_length.is_error);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_point_result_feeds_annotations() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_success(
            "/point",
            json!({"object": "kettle"}),
            json!({"points": [{"x": 0.5, "y": 0.25}, {"x": 0.1, "y": 0.9}], "request_id": "req-t3"}),
        )
        .await;

    let result = toolset(&fixture)
        .invoke(&ToolCall::new(
            "call_6",
            "moondreamPoint",
            json!({"imageUrl": IMAGE_URL, "object": "kettle"}),
        ))
        .await
        .unwrap();

    let VisionResult::Point(ref point) = result else {
        panic!("expected a point result, got {:?}", result);
    };
    assert_eq!(point.count, point.points.len());

    let annotations = AnnotationSet::from_result(&result).unwrap();
    assert_eq!(annotations.label, "kettle");
    assert_eq!(annotations.points.len(), 2);
    assert!(annotations.boxes.is_empty());
}

#[tokio::test]
async fn test_non_ascii_image_reference_becomes_error_content() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_untouched("/detect").await;
    let tools = toolset(&fixture);

    for image_url in ["照片abc", "图片.jpg"] {
        let result = tools
            .execute(&ToolCall::new(
                "call_7",
                "moondreamDetect",
                json!({"imageUrl": image_url, "object": "cat"}),
            ))
            .await;
        assert!(result.is_error);
        assert!(result.error_message().unwrap().starts_with("Validation error"));
    }

    mock.assert_async().await;
}
