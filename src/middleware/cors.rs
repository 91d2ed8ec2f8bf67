use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Credentialed CORS for the SPA origin; falls back to a permissive layer
/// when the configured origin is not a valid header value.
pub fn client_cors(client_url: &str) -> CorsLayer {
    match HeaderValue::from_str(client_url.trim_end_matches('/')) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]),
        Err(_) => {
            tracing::warn!("CLIENT_URL is not a valid origin, using permissive CORS");
            permissive_cors()
        }
    }
}

pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any)
}
