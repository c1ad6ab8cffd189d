//! Typed vision operations: payload shape, result re-keying, and upstream failures.

use crate::integration::mock_server::{MockServerFixture, IMAGE_URL};
use senpai_vision::vision::{
    CaptionArgs, CaptionLength, DetectArgs, NormalizedBox, NormalizedPoint, PointArgs, QueryArgs,
    VisionService, VisualizationType,
};
use senpai_vision::Error;
use serde_json::json;

#[tokio::test]
async fn test_query_sends_snake_case_and_returns_answer() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_success(
            "/query",
            json!({"image_url": IMAGE_URL, "question": "What is on the counter?"}),
            json!({"answer": "A kettle and two mugs.", "request_id": "req-q1"}),
        )
        .await;

    let out = fixture
        .client()
        .query(&QueryArgs {
            image_url: IMAGE_URL.into(),
            question: "What is on the counter?".into(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out.answer, "A kettle and two mugs.");
    assert_eq!(out.request_id, "req-q1");
    assert_eq!(
        serde_json::to_value(&out).unwrap(),
        json!({"answer": "A kettle and two mugs.", "requestId": "req-q1"})
    );
}

#[tokio::test]
async fn test_detect_rekeys_boxes_and_counts() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_success(
            "/detect",
            json!({"image_url": IMAGE_URL, "object": "mug"}),
            json!({
                "objects": [
                    {"x_min": 0.1, "y_min": 0.2, "x_max": 0.3, "y_max": 0.4},
                    {"x_min": 0.5, "y_min": 0.5, "x_max": 0.7, "y_max": 0.9}
                ],
                "request_id": "req-d1"
            }),
        )
        .await;

    let out = fixture
        .client()
        .detect(&DetectArgs {
            image_url: IMAGE_URL.into(),
            object: "mug".into(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out.count, 2);
    assert_eq!(out.objects[1], NormalizedBox::new(0.5, 0.5, 0.7, 0.9));
    assert_eq!(out.visualization_type, VisualizationType::BoundingBoxes);
    assert_eq!(out.object, "mug");
    assert_eq!(out.image_url, IMAGE_URL);

    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["objects"][0]["xMin"], 0.1);
    assert_eq!(value["visualizationType"], "bounding-boxes");
    assert_eq!(value["requestId"], "req-d1");
}

#[tokio::test]
async fn test_detect_with_no_matches() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_success(
            "/detect",
            json!({"object": "giraffe"}),
            json!({"objects": [], "request_id": "req-d2"}),
        )
        .await;

    let out = fixture
        .client()
        .detect(&DetectArgs {
            image_url: IMAGE_URL.into(),
            object: "giraffe".into(),
        })
        .await
        .unwrap();

    assert_eq!(out.count, 0);
    assert!(out.objects.is_empty());
}

#[tokio::test]
async fn test_point_returns_points() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_success(
            "/point",
            json!({"image_url": IMAGE_URL, "object": "kettle"}),
            json!({"points": [{"x": 0.42, "y": 0.37}], "request_id": "req-p1"}),
        )
        .await;

    let out = fixture
        .client()
        .point(&PointArgs {
            image_url: IMAGE_URL.into(),
            object: "kettle".into(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out.count, 1);
    assert_eq!(out.points, vec![NormalizedPoint::new(0.42, 0.37)]);
    assert_eq!(out.visualization_type, VisualizationType::Points);
    assert_eq!(serde_json::to_value(&out).unwrap()["visualizationType"], "points");
}

#[tokio::test]
async fn test_caption_defaults_to_normal_without_stream() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_success(
            "/caption",
            json!({"image_url": IMAGE_URL, "length": "normal", "stream": false}),
            json!({
                "caption": "A bright kitchen with a kettle on the stove.",
                "metrics": {
                    "input_tokens": 735.0,
                    "output_tokens": 12.0,
                    "prefill_time_ms": 51.2,
                    "decode_time_ms": 120.5,
                    "ttft_ms": 60.1
                },
                "finish_reason": "stop"
            }),
        )
        .await;

    let out = fixture
        .client()
        .caption(&CaptionArgs {
            image_url: IMAGE_URL.into(),
            length: None,
            stream: None,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out.finish_reason, "stop");
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["finishReason"], "stop");
    assert_eq!(value["metrics"]["inputTokens"], 735.0);
    assert_eq!(value["metrics"]["ttftMs"], 60.1);
}

#[tokio::test]
async fn test_caption_forwards_length_and_stream_flag() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_success(
            "/caption",
            json!({"length": "short", "stream": true}),
            json!({"caption": "A kitchen.", "finish_reason": "stop"}),
        )
        .await;

    let out = fixture
        .client()
        .caption(&CaptionArgs {
            image_url: IMAGE_URL.into(),
            length: Some(CaptionLength::Short),
            stream: Some(true),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out.caption, "A kitchen.");
    assert!(out.metrics.is_none());
    assert!(serde_json::to_value(&out).unwrap().get("metrics").is_none());
}

#[tokio::test]
async fn test_non_success_status_reports_status_and_body() {
    let fixture = MockServerFixture::new().await;
    let body = r#"{"error":"Invalid API key"}"#;
    let _mock = fixture.mock_raw("/query", 401, body).await;

    let err = fixture
        .client()
        .query(&QueryArgs {
            image_url: IMAGE_URL.into(),
            question: "anything?".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.upstream_status(), Some(401));
    assert_eq!(
        err.to_string(),
        format!("Moondream API error (401): {}", body)
    );
}

#[tokio::test]
async fn test_server_error_body_is_verbatim_text() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_raw("/detect", 503, "upstream overloaded").await;

    let err = fixture
        .client()
        .detect(&DetectArgs {
            image_url: IMAGE_URL.into(),
            object: "mug".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 503, .. }));
    let message = err.to_string();
    assert!(message.contains("503"));
    assert!(message.contains("upstream overloaded"));
}

#[tokio::test]
async fn test_point_client_error_reports_status_and_body() {
    let fixture = MockServerFixture::new().await;
    let body = r#"{"error":"object must be a noun phrase"}"#;
    let _mock = fixture.mock_raw("/point", 422, body).await;

    let err = fixture
        .client()
        .point(&PointArgs {
            image_url: IMAGE_URL.into(),
            object: "kettle".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.upstream_status(), Some(422));
    assert_eq!(
        err.to_string(),
        format!("Moondream API error (422): {}", body)
    );
}

#[tokio::test]
async fn test_malformed_success_body_is_labelled_failure() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_raw("/point", 200, "<html>not json</html>").await;

    let err = fixture
        .client()
        .point(&PointArgs {
            image_url: IMAGE_URL.into(),
            object: "kettle".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().starts_with("Moondream Point failed: "));
}

#[tokio::test]
async fn test_invalid_image_never_reaches_network() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_untouched("/caption").await;

    let err = fixture
        .client()
        .caption(&CaptionArgs {
            image_url: "ftp://images.example.com/kitchen.jpg".into(),
            length: None,
            stream: None,
        })
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(err.is_rejected_locally());
}

#[tokio::test]
async fn test_data_uri_passes_through_untouched() {
    let data_uri = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_success(
            "/query",
            json!({"image_url": data_uri}),
            json!({"answer": "A single pixel.", "request_id": "req-q2"}),
        )
        .await;

    let out = fixture
        .client()
        .query(&QueryArgs {
            image_url: data_uri.into(),
            question: "What is this?".into(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(out.answer, "A single pixel.");
}
