//! HTTP routes.
//!
//! Three routes, matching the process the engine was built for:
//!
//! - `GET /oauth/auth` - authorization endpoint
//! - `POST /oauth/token` - token endpoint
//! - `GET /devices` - bearer-protected demo resource
//!
//! Handlers hand the raw request URI or body to the engine's adapters and
//! render the returned [`ProviderResponse`] verbatim.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use tessera_auth::{AuthorizationProvider, ProviderResponse, ResourceProvider};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The protocol engine.
    pub provider: Arc<AuthorizationProvider>,

    /// Bearer validation for resource routes.
    pub resources: Arc<ResourceProvider>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/oauth/auth", get(authorize))
        .route("/oauth/token", post(token))
        .route("/devices", get(devices))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn authorize(State(state): State<AppState>, uri: Uri) -> Response {
    render(state.provider.authorize_from_uri(&uri.to_string()).await)
}

async fn token(State(state): State<AppState>, body: String) -> Response {
    render(state.provider.token_from_form(&body).await)
}

async fn devices(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let auth = match state.resources.authorize_header(header).await {
        Ok(auth) => auth,
        Err(err) => {
            tracing::error!(error = %err, "bearer validation failed");
            return render(ProviderResponse::json_error(&err));
        }
    };
    if let Err(err) = auth.ensure_valid() {
        return render(ProviderResponse::json_error(&err));
    }

    let body = serde_json::json!({
        "devices": [],
        "client_id": auth.client_id,
        "expires_in": auth.expires_in,
    });
    render(ProviderResponse::json(200, &body))
}

/// Renders an engine response descriptor as an HTTP response.
fn render(response: ProviderResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        AppendHeaders(response.headers),
        Body::from(response.body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use tessera_auth::{Client, MemoryStorage, ProviderConfig};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let store = Arc::new(MemoryStorage::new());
        store.register_client(Client::new(
            "app123",
            "s3cr3t",
            "https://client.example/cb",
            "read",
        ));
        let provider = Arc::new(AuthorizationProvider::new(
            store.clone(),
            store.clone(),
            ProviderConfig::default(),
        ));
        let resources = Arc::new(ResourceProvider::new(store));
        router(AppState {
            provider,
            resources,
        })
    }

    #[tokio::test]
    async fn test_authorize_redirects_with_code() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri(
                        "/oauth/auth?response_type=code&client_id=app123\
                         &redirect_uri=https://client.example/cb&scope=read",
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("https://client.example/cb?code="));
    }

    #[tokio::test]
    async fn test_token_missing_parameters() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/oauth/token")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("grant_type=authorization_code&client_id=app123"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["cache-control"].to_str().unwrap(),
            "no-store"
        );
    }

    #[tokio::test]
    async fn test_devices_requires_bearer() {
        let response = test_router()
            .oneshot(Request::builder().uri("/devices").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_full_exchange_over_http() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(
                        "/oauth/auth?response_type=code&client_id=app123\
                         &redirect_uri=https://client.example/cb&scope=read",
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let location = response.headers()["location"].to_str().unwrap();
        let code = location
            .split("code=")
            .nth(1)
            .unwrap()
            .split('&')
            .next()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/oauth/token")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(format!(
                        "grant_type=authorization_code&client_id=app123\
                         &client_secret=s3cr3t&redirect_uri=https://client.example/cb\
                         &code={code}"
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let access_token = body["access_token"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/devices")
                    .header("authorization", format!("Bearer {access_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
