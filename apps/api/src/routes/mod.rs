pub mod health;

use axum::{routing::get, Router};

use crate::drill::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Drill API
        .route("/api/v1/drills/:style", get(handlers::handle_drill_pdf))
        .route(
            "/api/v1/drills/:style/answers",
            get(handlers::handle_drill_answers),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::render::assets::NoAssets;

    fn app() -> Router {
        build_router(AppState::new(Config::default(), Arc::new(NoAssets)))
    }

    async fn get_uri(uri: &str) -> (StatusCode, axum::http::HeaderMap, bytes::Bytes) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    fn error_code(body: &[u8]) -> String {
        let json: Value = serde_json::from_slice(body).unwrap();
        json["error"]["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get_uri("/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "mathdrill-api");
    }

    #[tokio::test]
    async fn test_column_method_pdf() {
        let (status, headers, body) = get_uri("/api/v1/drills/column-method?operation=add").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("inline"));
        assert!(body.starts_with(b"%PDF-"));

        let document = lopdf::Document::load_mem(&body).unwrap();
        assert_eq!(document.get_pages().len(), 2);
    }

    #[tokio::test]
    async fn test_long_division_answers_json() {
        let (status, _, body) = get_uri("/api/v1/drills/long-division/answers?pages=2").await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        let questions = json["questions"].as_array().unwrap();
        let answers = json["answers"].as_array().unwrap();
        assert_eq!(questions.len(), 32);
        assert_eq!(answers.len(), 32);
        // Two question pages, one answer page.
        assert_eq!(json["page_count"], 3);

        for (q, a) in questions.iter().zip(answers) {
            let dividend = q["operand_a"].as_i64().unwrap();
            let divisor = q["operand_b"].as_i64().unwrap();
            assert_eq!(q["operator"], "divide");
            assert_eq!(dividend % divisor, 0);
            assert_eq!(a["index"], q["index"]);
            assert_eq!(a["answer"].as_i64().unwrap(), dividend / divisor);
        }
    }

    #[tokio::test]
    async fn test_invalid_query_is_400() {
        let (status, _, body) = get_uri("/api/v1/drills/column-method?rows=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");

        let (status, _, _) = get_uri("/api/v1/drills/long-division?operation=add").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Eight rows of column-method questions do not fit on A4.
        let (status, _, body) = get_uri("/api/v1/drills/column-method?rows=8").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_seed_replays_the_same_drill() {
        let (status, headers, _) = get_uri("/api/v1/drills/column-method?seed=42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-drill-seed"], "42");

        let uri = "/api/v1/drills/column-method/answers?seed=42";
        let (_, _, first) = get_uri(uri).await;
        let (_, _, second) = get_uri(uri).await;
        let first: Value = serde_json::from_slice(&first).unwrap();
        let second: Value = serde_json::from_slice(&second).unwrap();
        assert_eq!(first["seed"], 42);
        assert_eq!(first["questions"], second["questions"]);
        assert_eq!(first["answers"], second["answers"]);

        // Without a seed one is drawn and reported, and it replays too.
        let (_, _, fresh) = get_uri("/api/v1/drills/column-method/answers").await;
        let fresh: Value = serde_json::from_slice(&fresh).unwrap();
        let seed = fresh["seed"].as_u64().unwrap();
        let replay_uri = format!("/api/v1/drills/column-method/answers?seed={seed}");
        let (_, _, replay) = get_uri(&replay_uri).await;
        let replay: Value = serde_json::from_slice(&replay).unwrap();
        assert_eq!(fresh["questions"], replay["questions"]);
    }

    #[tokio::test]
    async fn test_plus_sign_in_query_selects_addition() {
        let (status, _, body) = get_uri("/api/v1/drills/column-method/answers?operation=+").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["spec"]["operator"], "add");
    }

    #[tokio::test]
    async fn test_unknown_style_is_404() {
        let (status, _, body) = get_uri("/api/v1/drills/fractions").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&body), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unreachable_constraint_is_422() {
        let (status, _, body) =
            get_uri("/api/v1/drills/long-division/answers?first_digits=1&second_digits=2").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&body), "UNPROCESSABLE_ENTITY");
    }
}
