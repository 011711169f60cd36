//! Users resource handlers.
//!
//! ```text
//! GET     /api/v1/users/{userId}
//! HEAD    /api/v1/users/{userId}
//! POST    /api/v1/users
//! PUT     /api/v1/users/{userId}
//! PATCH   /api/v1/users/{userId}
//! DELETE  /api/v1/users/{userId}
//! GET     /api/v1/users?pageNumber=2&pageSize=10
//! OPTIONS /api/v1/users
//! ```
//!
//! Read endpoints honour the `Accept` header (JSON or XML); error
//! payloads are always JSON via the shared `ResponseError` impl.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, route, web};
use pagination::{PageMetadata, PageRequest, X_PAGINATION};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, PatchDocument, PatchOperation, ReplaceOutcome, UserInput, UserRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::negotiation::{Representation, negotiate, respond};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_payload_error, parse_user_id};

/// External path of the users collection, used for `Location` and
/// pagination links.
pub(crate) const USERS_COLLECTION_PATH: &str = "/api/v1/users";

/// Methods advertised on the collection via `OPTIONS`.
const USERS_COLLECTION_ALLOW: &str = "GET, POST, OPTIONS";

/// One user as presented to clients.
///
/// `fullName` is derived from the stored name parts; the parts
/// themselves are not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Server-assigned identifier.
    pub id: Uuid,
    /// Unique login name.
    pub login: String,
    /// `"{lastName} {firstName}"`.
    pub full_name: String,
    /// Number of games played.
    pub games_played: u32,
    /// Game currently in progress; serialised as an explicit `null`
    /// when absent.
    pub current_game_id: Option<Uuid>,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        let full_name = record.full_name();
        Self {
            id: record.id,
            login: record.login,
            full_name,
            games_played: record.games_played,
            current_game_id: record.current_game_id,
        }
    }
}

/// Write payload for create and full replace.
///
/// Fields are optional at the transport layer so that missing-field
/// violations surface as 422 with field details rather than a
/// deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWriteRequest {
    /// Login, required and `[A-Za-z0-9]+`.
    pub login: Option<String>,
    /// Given name, required.
    pub first_name: Option<String>,
    /// Family name, required.
    pub last_name: Option<String>,
}

impl From<UserWriteRequest> for UserInput {
    fn from(value: UserWriteRequest) -> Self {
        Self {
            login: value.login,
            first_name: value.first_name,
            last_name: value.last_name,
        }
    }
}

/// Query parameters for the collection listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// 1-indexed page number; values below 1 floor to 1.
    pub page_number: Option<i64>,
    /// Records per page; clamped into `[1, 20]`, default 10.
    pub page_size: Option<i64>,
}

/// XML envelope for a page of users.
///
/// `quick_xml` renders the repeated field as one `<user>` element per
/// record under the `<users>` document root.
#[derive(Serialize)]
struct UserListDocument<'a> {
    user: &'a [UserResponse],
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 406, description = "Unsupported representation", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{user_id}")]
pub async fn get_user(
    request: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let representation = negotiate(request.headers())?;
    let id = parse_user_id(&path.into_inner())?;
    let record = state.users.get(id).await?;
    respond(
        HttpResponse::Ok(),
        representation,
        "user",
        &UserResponse::from(record),
    )
}

/// Existence probe for one user.
///
/// Mirrors `GET` status semantics with an empty body; the
/// `Content-Type` header reflects the negotiated representation.
#[utoipa::path(
    head,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "User exists"),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 406, description = "Unsupported representation", body = Error)
    ),
    tags = ["users"],
    operation_id = "headUser"
)]
#[route("/users/{user_id}", method = "HEAD")]
pub async fn head_user(
    request: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let representation = negotiate(request.headers())?;
    let id = parse_user_id(&path.into_inner())?;
    state.users.get(id).await?;
    Ok(HttpResponse::Ok()
        .content_type(representation.content_type())
        .finish())
}

/// Create a user under a server-assigned identifier.
///
/// Responds `201` with a `Location` header and the bare identifier as
/// the body.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserWriteRequest,
    responses(
        (status = 201, description = "User created", headers(("Location" = String, description = "URL of the new user"))),
        (status = 400, description = "Missing or malformed body", body = Error),
        (status = 406, description = "Unsupported representation", body = Error),
        (status = 422, description = "Validation failed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    request: HttpRequest,
    state: web::Data<HttpState>,
    payload: Option<web::Json<UserWriteRequest>>,
) -> ApiResult<HttpResponse> {
    let representation = negotiate(request.headers())?;
    let payload = payload.ok_or_else(missing_payload_error)?;
    let record = state.users.create(payload.into_inner().into()).await?;
    created_response(representation, record.id)
}

/// Replace a user, creating it when absent.
///
/// An unknown identifier yields `201` with the record created under
/// exactly that identifier; an existing one yields `204` with its
/// gameplay fields preserved.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User identifier (UUID)")),
    request_body = UserWriteRequest,
    responses(
        (status = 201, description = "User created at the supplied identifier", headers(("Location" = String, description = "URL of the new user"))),
        (status = 204, description = "User replaced"),
        (status = 400, description = "Malformed identifier or body", body = Error),
        (status = 406, description = "Unsupported representation", body = Error),
        (status = 422, description = "Validation failed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{user_id}")]
pub async fn update_user(
    request: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: Option<web::Json<UserWriteRequest>>,
) -> ApiResult<HttpResponse> {
    let representation = negotiate(request.headers())?;
    let id = parse_user_id(&path.into_inner())?;
    let payload = payload.ok_or_else(missing_payload_error)?;
    match state.users.replace(id, payload.into_inner().into()).await? {
        ReplaceOutcome::Created(id) => created_response(representation, id),
        ReplaceOutcome::Replaced => Ok(HttpResponse::NoContent().finish()),
    }
}

/// Apply a patch document to an existing user.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User identifier (UUID)")),
    request_body = Vec<PatchOperation>,
    responses(
        (status = 204, description = "User patched"),
        (status = 400, description = "Malformed identifier or body", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 422, description = "Malformed operation or validation failure", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "patchUser"
)]
#[patch("/users/{user_id}")]
pub async fn patch_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: Option<web::Json<PatchDocument>>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner())?;
    let payload = payload.ok_or_else(missing_payload_error)?;
    state.users.patch(id, &payload.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete one user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{user_id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner())?;
    state.users.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List one page of users.
///
/// Page metadata, including navigation links, travels in the
/// `X-Pagination` header; the body is the bare array of users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = [UserResponse],
            headers(("X-Pagination" = String, description = "Page metadata with navigation links"))),
        (status = 406, description = "Unsupported representation", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    request: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<HttpResponse> {
    let representation = negotiate(request.headers())?;
    let page = PageRequest::from_raw(query.page_number, query.page_size);
    let users_page = state.users.list(page).await?;

    let metadata = PageMetadata::new(USERS_COLLECTION_PATH, page, users_page.total_count);
    let header_value = metadata
        .to_header_value()
        .map_err(|err| Error::internal(format!("failed to serialise page metadata: {err}")))?;

    let records: Vec<UserResponse> = users_page
        .records
        .into_iter()
        .map(UserResponse::from)
        .collect();

    let mut builder = HttpResponse::Ok();
    builder.insert_header((X_PAGINATION, header_value));
    match representation {
        Representation::Json => Ok(builder.json(&records)),
        Representation::Xml => respond(builder, representation, "users", &UserListDocument {
            user: &records,
        }),
    }
}

/// Advertise the methods supported by the users collection.
#[utoipa::path(
    options,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Supported methods", headers(("Allow" = String, description = "Comma-separated method list")))
    ),
    tags = ["users"],
    operation_id = "usersOptions"
)]
#[route("/users", method = "OPTIONS")]
pub async fn users_options() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::ALLOW, USERS_COLLECTION_ALLOW))
        .finish()
}

/// `201 Created` with a `Location` header and the bare identifier as
/// the negotiated body.
fn created_response(representation: Representation, id: Uuid) -> ApiResult<HttpResponse> {
    let mut builder = HttpResponse::Created();
    builder.insert_header((
        header::LOCATION,
        format!("{USERS_COLLECTION_PATH}/{id}"),
    ));
    respond(builder, representation, "id", &id)
}

#[cfg(test)]
mod tests;
