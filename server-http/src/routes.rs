use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use shared::config::Config;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build and configure the application router
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        // Health check
        .route("/health", get(handlers::health_check))
        // FAQ routes, also served under /api
        .merge(faq_routes())
        .nest("/api", faq_routes())
        // Middleware
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router wrapped in trailing-slash normalization. The rewrite has to run
/// before routing, so it wraps the router instead of being a route layer.
pub fn build_app(state: AppState, config: &Config) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(build_router(state, config))
}

fn faq_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/faqs",
            get(handlers::list_faqs).post(handlers::create_faq),
        )
        .route(
            "/faqs/{id}",
            get(handlers::get_faq)
                .put(handlers::update_faq)
                .delete(handlers::delete_faq),
        )
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin '{}'", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use lingua::{
        CacheLayer, CacheOptions, FaqService, Language, SledFaqRepository, TranslationGateway,
        Translator,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use storage_engine::MokaCacheStore;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct EchoTranslator;

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, target: Language) -> shared::Result<String> {
            Ok(format!("[{}] {}", target, text))
        }
    }

    fn app() -> (TempDir, NormalizePath<Router>) {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(SledFaqRepository::new(dir.path().join("faqs.sled")).unwrap());
        let cache = CacheLayer::new(
            Arc::new(MokaCacheStore::new("test", None)),
            CacheOptions::default(),
        );
        let translations = TranslationGateway::new(Arc::new(EchoTranslator), Duration::from_secs(1));
        let state = AppState::new(Arc::new(FaqService::new(repository, translations, cache)));

        let config = Config::from_lookup(|_| None);
        (dir, build_app(state, &config))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &NormalizePath<Router>, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_create_then_list_in_hindi() {
        let (_dir, app) = app();

        let (status, created) = send(
            &app,
            json_request(
                "POST",
                "/faqs",
                json!({"question": "What is X?", "answer": "<p>X is Y.</p>"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["translations"]["hi"]["question"], "[hi] What is X?");
        assert_eq!(created["translations"]["bn"]["answer"], "[bn] <p>X is Y.</p>");

        let (status, listing) = send(&app, empty_request("GET", "/faqs?lang=hi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            listing,
            json!([{
                "id": created["id"],
                "question": "[hi] What is X?",
                "answer": "[hi] <p>X is Y.</p>",
            }])
        );
    }

    #[tokio::test]
    async fn test_api_prefix_and_trailing_slash() {
        let (_dir, app) = app();

        let (status, _) = send(
            &app,
            json_request("POST", "/api/faqs/", json!({"question": "Q?", "answer": "A"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, listing) = send(&app, empty_request("GET", "/api/faqs")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing[0]["question"], "Q?");

        let (status, listing) = send(&app, empty_request("GET", "/faqs/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let (_dir, app) = app();

        let (status, body) =
            send(&app, json_request("POST", "/faqs", json!({"question": "Q?"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Error creating FAQ");

        let (status, _) = send(
            &app,
            json_request("POST", "/faqs", json!({"question": "Q?", "answer": "<p></p>"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let malformed = Request::builder()
            .method("POST")
            .uri("/faqs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, listing) = send(&app, empty_request("GET", "/faqs")).await;
        assert_eq!(listing, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let (_dir, app) = app();

        let (status, body) = send(
            &app,
            json_request("PUT", "/faqs/missing", json!({"question": "Q?", "answer": "A"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "FAQ not found");

        let (status, _) = send(&app, empty_request("GET", "/faqs/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, empty_request("DELETE", "/faqs/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_dir, app) = app();
        let (_, created) = send(
            &app,
            json_request("POST", "/faqs", json!({"question": "Q?", "answer": "A"})),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        // Warm the cache before writing
        send(&app, empty_request("GET", "/faqs?lang=bn")).await;

        let (status, updated) = send(
            &app,
            json_request(
                "PUT",
                &format!("/faqs/{}", id),
                json!({"question": "Q2?", "answer": "A2"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["question"], "Q2?");

        let (_, listing) = send(&app, empty_request("GET", "/faqs?lang=bn")).await;
        assert_eq!(listing[0]["question"], "[bn] Q2?");

        let (status, body) = send(&app, empty_request("DELETE", &format!("/faqs/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "FAQ deleted successfully"}));

        let (_, listing) = send(&app, empty_request("GET", "/faqs?lang=bn")).await;
        assert_eq!(listing, json!([]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deletes() {
        let (_dir, app) = app();
        let (_, created) = send(
            &app,
            json_request("POST", "/faqs", json!({"question": "Q?", "answer": "A"})),
        )
        .await;
        let uri = format!("/faqs/{}", created["id"].as_str().unwrap());

        let (first, second) = tokio::join!(
            send(&app, empty_request("DELETE", &uri)),
            send(&app, empty_request("DELETE", &uri)),
        );

        let mut statuses = vec![first.0.as_u16(), second.0.as_u16()];
        statuses.sort();
        assert_eq!(statuses, vec![200, 404]);

        let (_, listing) = send(&app, empty_request("GET", "/faqs")).await;
        assert_eq!(listing, json!([]));
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let (_dir, app) = app();

        let response = app.clone().oneshot(empty_request("GET", "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"FAQ API is running");

        let (status, body) = send(&app, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "OK");
    }
}
