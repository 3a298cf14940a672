mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{
    body_json, build_test_app, build_test_app_with_log, json_request, multipart_request,
    test_config, unreachable_prediction_log, Part,
};

const HEADER: &str = "heart_rate,temperature,spo2,motion\n";

fn csv(rows: &[&str]) -> Vec<u8> {
    let mut out = HEADER.to_string();
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out.into_bytes()
}

#[tokio::test]
async fn test_health_check() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["expected_features"], 4);
    assert_eq!(json["transport"], "email");
    assert_eq!(json["prediction_log"], "disabled");
}

#[tokio::test]
async fn test_upload_normal_vitals() {
    let app = build_test_app(test_config());
    let content = csv(&["60,36.5,98,0.1"]);

    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[
                Part::File {
                    name: "file",
                    filename: "vitals.csv",
                    content: &content,
                },
                Part::Text {
                    name: "user",
                    value: "alice",
                },
            ],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json, json!({ "predictions": ["No Seizure Detected"] }));
}

#[tokio::test]
async fn test_upload_batch_preserves_row_order() {
    let app = build_test_app(test_config());
    let content = csv(&["140,38.9,88,0.95", "60,36.5,98,0.1", "150,39.2,85,1.0"]);

    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[Part::File {
                name: "file",
                filename: "batch.csv",
                content: &content,
            }],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(
        json["predictions"],
        json!(["Seizure Detected", "No Seizure Detected", "Seizure Detected"])
    );
}

#[tokio::test]
async fn test_upload_header_only_returns_empty_predictions() {
    let app = build_test_app(test_config());
    let content = csv(&[]);

    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[Part::File {
                name: "file",
                filename: "empty.csv",
                content: &content,
            }],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json, json!({ "predictions": [] }));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[Part::Text {
                name: "user",
                value: "alice",
            }],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json, json!({ "error": "No file provided" }));
}

#[tokio::test]
async fn test_upload_wrong_column_count() {
    let app = build_test_app(test_config());
    let content = b"heart_rate,temperature,spo2\n60,36.5,98\n".to_vec();

    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[Part::File {
                name: "file",
                filename: "three.csv",
                content: &content,
            }],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json, json!({ "error": "Expected 4 features, got 3" }));
}

#[tokio::test]
async fn test_upload_non_numeric_cell() {
    let app = build_test_app(test_config());
    let content = csv(&["60,warm,98,0.1"]);

    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[Part::File {
                name: "file",
                filename: "bad.csv",
                content: &content,
            }],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("could not convert string to float"), "got: {error}");
    assert!(error.contains("warm"));
}

#[tokio::test]
async fn test_upload_empty_file() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[Part::File {
                name: "file",
                filename: "nothing.csv",
                content: b"",
            }],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json, json!({ "error": "Uploaded file is empty" }));
}

#[tokio::test]
async fn test_emergency_without_email_credentials() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(json_request(
            "/emergency",
            &json!({ "user": "alice", "lat": 51.5, "lon": -0.12 }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    let error = json["error"].as_str().unwrap();
    assert!(error.starts_with("Missing credentials"), "got: {error}");
    assert!(error.contains("sender_email"));
    assert!(!error.contains("doctor_email"));
}

#[tokio::test]
async fn test_emergency_without_recipient_is_still_received() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(json_request(
            "/emergency",
            &json!({
                "user": "alice",
                "lat": 1,
                "lon": 2,
                "sender_email": "a@example.com",
                "sender_password": "pw"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "Emergency Received");
    assert_eq!(json["delivery"]["status"], "failed");
    assert_eq!(json["delivery"]["detail"], "no recipient (doctor_email)");
    assert_eq!(json["maps_link"], "https://www.google.com/maps?q=1,2");
}

#[tokio::test]
async fn test_emergency_null_user_is_unknown() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(json_request(
            "/emergency",
            &json!({
                "user": null,
                "lat": 1,
                "lon": 2,
                "sender_email": "a@example.com",
                "sender_password": "pw"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "Emergency Received");
    assert_eq!(json["maps_link"], "https://www.google.com/maps?q=1,2");
}

#[tokio::test]
async fn test_emergency_received_even_when_email_fails() {
    let mut config = test_config();
    config.smtp_host = "127.0.0.1".into();
    config.smtp_port = common::closed_port();
    let app = build_test_app(config);

    let resp = app
        .oneshot(json_request(
            "/emergency",
            &json!({
                "user": "alice",
                "lat": 51.5,
                "lon": -0.12,
                "doctor_email": "doctor@example.com",
                "sender_email": "alice@example.com",
                "sender_password": "app-password",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "Emergency Received");
    assert_eq!(json["location"], json!({ "lat": 51.5, "lon": -0.12 }));
    assert_eq!(json["maps_link"], "https://www.google.com/maps?q=51.5,-0.12");
    assert_eq!(json["delivery"]["status"], "failed");
    assert!(json["time"].as_str().unwrap().len() == "2024-01-01 00:00:00".len());
}

#[tokio::test]
async fn test_emergency_defaults_user_and_passes_coordinates_through() {
    let mut config = test_config();
    config.smtp_host = "127.0.0.1".into();
    config.smtp_port = common::closed_port();
    config.default_sender_email = Some("alerts@example.com".into());
    config.default_sender_password = Some("server-secret".into());
    let app = build_test_app(config);

    let resp = app
        .oneshot(json_request(
            "/emergency",
            &json!({ "lat": "unknown", "doctor_email": "doctor@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "Emergency Received");
    assert_eq!(json["location"], json!({ "lat": "unknown", "lon": null }));
    assert_eq!(json["maps_link"], "https://www.google.com/maps?q=unknown,");
}

#[tokio::test]
async fn test_emergency_rejects_malformed_json() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/emergency")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_emergency_sms_without_credentials() {
    let mut config = test_config();
    config.alert_transport = seizure_alert::config::TransportKind::Sms;
    let app = build_test_app(config);

    let resp = app
        .oneshot(json_request("/emergency", &json!({ "user": "alice" })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("TWILIO_ACCOUNT_SID"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("upload_requests_total"), "metrics: {text}");
    assert!(text.contains("alerts_received_total"), "metrics: {text}");
}

#[tokio::test]
async fn test_upload_over_size_limit() {
    let mut config = test_config();
    config.max_upload_bytes = 1024;
    let app = build_test_app(config);

    let rows: Vec<String> = (0..200).map(|_| "60,36.5,98,0.1".to_string()).collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let content = csv(&rows);

    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[Part::File {
                name: "file",
                filename: "big.csv",
                content: &content,
            }],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(resp).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_upload_succeeds_when_prediction_log_is_down() {
    let app = build_test_app_with_log(test_config(), Some(unreachable_prediction_log()));

    let content = csv(&["60,36.5,98,0.1"]);
    let resp = app
        .oneshot(multipart_request(
            "/upload",
            &[Part::File {
                name: "file",
                filename: "vitals.csv",
                content: &content,
            }],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["predictions"], json!(["No Seizure Detected"]));
}
