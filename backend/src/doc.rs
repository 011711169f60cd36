//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every users endpoint and the shared schema types
//! into one document, served as raw JSON at `/api-docs/openapi.json`
//! for external tooling.

use actix_web::{HttpResponse, get, web};
use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, PatchOperation};
use crate::inbound::http::users::{UserResponse, UserWriteRequest};

/// OpenAPI document for the users REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "CRUD interface for the users collection with JSON and XML representations.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::head_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::patch_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::users_options,
    ),
    components(schemas(UserResponse, UserWriteRequest, PatchOperation, Error, ErrorCode)),
    tags(
        (name = "users", description = "Operations on the users collection")
    )
)]
pub struct ApiDoc;

/// Serve the generated document as JSON.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Register the documentation endpoint on an application scope.
pub fn configure(config: &mut web::ServiceConfig) {
    config.service(openapi_json);
}
