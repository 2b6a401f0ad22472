//! OpenAPI specification generation
//!
//! Generates the OpenAPI document from route annotations using utoipa.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PawMe Connect API",
        description = "Social platform connections and read-only proxies for the PawMe admin dashboard"
    ),
    paths(
        crate::routes::auth::connect,
        crate::routes::auth::callback,
        crate::routes::auth::status,
        crate::routes::auth::disconnect,
        crate::routes::auth::refresh,
        crate::routes::proxy::provider_proxy,
        crate::health_check,
    ),
    components(schemas(
        crate::routes::error::ErrorBody,
        crate::routes::auth::StatusResponse,
        crate::routes::auth::DisconnectResponse,
        crate::routes::auth::RefreshResponse,
    )),
    tags(
        (name = "auth", description = "Provider connection lifecycle"),
        (name = "proxy", description = "Read-only pass-through to provider APIs"),
        (name = "system", description = "Health and documentation")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("/api/auth/{provider}/connect"));
        assert!(json.contains("/api/{provider}"));
        assert!(json.contains("StatusResponse"));
    }
}
