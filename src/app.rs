use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::gateway::auth_gateway;
use crate::state::AppState;
use crate::{auth, files, folders};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(files::router())
        .merge(folders::router())
        .route("/health", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_gateway))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod gateway_tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRef,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::jwt::TokenCodec;

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let res = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_authorization_header_is_rejected() {
        let app = build_app(AppState::fake());
        let res = app.oneshot(get("/me")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn malformed_authorization_scheme_is_rejected() {
        let app = build_app(AppState::fake());
        let req = Request::builder()
            .uri("/me")
            .header("authorization", "Token abc")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_bearer_token_is_rejected() {
        let app = build_app(AppState::fake());
        let req = Request::builder()
            .uri("/me")
            .header("authorization", "Bearer not.a.jwt")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn verified_identity_reaches_the_handler() {
        let state = AppState::fake();
        let codec = TokenCodec::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = codec.issue(user_id, "a@x.com").unwrap();

        let app = build_app(state);
        let req = Request::builder()
            .uri("/me")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["user"]["id"], user_id.to_string());
        assert_eq!(body["user"]["email"], "a@x.com");
    }

    #[tokio::test]
    async fn init_upload_without_token_short_circuits() {
        // The fake state's pool never connects; a 401 here proves the
        // request was rejected before any handler or persistence logic.
        let app = build_app(AppState::fake());
        let req = post_json(
            "/files/init-upload",
            r#"{"folder_id":"5f0f87e6-8a33-4c76-9cbe-e0a659a1b1c2",
                "files":[{"name":"a.png","size":10,"type":"image/png"}]}"#,
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn init_upload_validates_descriptors_before_side_effects() {
        let state = AppState::fake();
        let codec = TokenCodec::from_ref(&state);
        let token = codec.issue(Uuid::new_v4(), "a@x.com").unwrap();

        let app = build_app(state);
        let mut req = post_json(
            "/files/init-upload",
            r#"{"folder_id":"5f0f87e6-8a33-4c76-9cbe-e0a659a1b1c2",
                "files":[{"name":"a.png","size":-1,"type":"image/png"}]}"#,
        );
        req.headers_mut().insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn init_upload_rejects_malformed_body_with_400() {
        let state = AppState::fake();
        let codec = TokenCodec::from_ref(&state);
        let token = codec.issue(Uuid::new_v4(), "a@x.com").unwrap();

        let app = build_app(state);
        let mut req = post_json("/files/init-upload", r#"{"folder_id": 42}"#);
        req.headers_mut().insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn signup_rejects_missing_fields_before_any_side_effect() {
        let app = build_app(AppState::fake());
        let res = app
            .clone()
            .oneshot(post_json("/auth/signup", "{}"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["error"], "missing_field");

        let res = app
            .oneshot(post_json("/auth/signup", r#"{"email":"a@x.com"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["error"], "missing_field");
        assert_eq!(body["message"], "password is required");
    }

    #[tokio::test]
    async fn signup_rejects_invalid_email() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(post_json(
                "/auth/signup",
                r#"{"email":"not-an-email","password":"pw123456"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["error"], "validation_failed");
    }
}
