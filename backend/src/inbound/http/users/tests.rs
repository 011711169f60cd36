//! End-to-end tests for the users resource handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;
use crate::domain::UserDraft;
use crate::domain::ports::UserRepository;
use crate::outbound::persistence::InMemoryUserRepository;

fn test_app(
    repository: Arc<InMemoryUserRepository>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(repository)))
        .service(
            web::scope("/api/v1")
                .service(list_users)
                .service(users_options)
                .service(create_user)
                .service(get_user)
                .service(head_user)
                .service(update_user)
                .service(patch_user)
                .service(delete_user),
        )
}

fn empty_repository() -> Arc<InMemoryUserRepository> {
    Arc::new(InMemoryUserRepository::default())
}

async fn seed_user(
    repository: &Arc<InMemoryUserRepository>,
    login: &str,
    first_name: &str,
    last_name: &str,
) -> UserRecord {
    repository
        .insert(UserDraft {
            login: login.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
        })
        .await
        .expect("seed user")
}

fn write_body(login: &str, first_name: &str, last_name: &str) -> Value {
    json!({ "login": login, "firstName": first_name, "lastName": last_name })
}

async fn read_json(response: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

#[actix_web::test]
async fn created_users_round_trip_through_get() {
    let app = actix_test::init_service(test_app(empty_repository())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(write_body("alovelace", "Ada", "Lovelace"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("Location header");
    let id: Uuid = read_json(response)
        .await
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .expect("bare identifier body");
    assert_eq!(location, format!("/api/v1/users/{id}"));

    let request = actix_test::TestRequest::get().uri(&location).to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body.get("login").and_then(Value::as_str), Some("alovelace"));
    assert_eq!(
        body.get("fullName").and_then(Value::as_str),
        Some("Lovelace Ada")
    );
    assert_eq!(body.get("gamesPlayed").and_then(Value::as_u64), Some(0));
    // The key is present with an explicit null, never omitted.
    assert_eq!(body.get("currentGameId"), Some(&Value::Null));
    assert!(body.get("firstName").is_none());
}

#[rstest]
#[case(json!({ "firstName": "Ada", "lastName": "Lovelace" }), "login")]
#[case(json!({ "login": "ada byron", "firstName": "Ada", "lastName": "Lovelace" }), "login")]
#[case(json!({ "login": "ada", "lastName": "Lovelace" }), "firstName")]
#[case(json!({ "login": "ada", "firstName": "Ada" }), "lastName")]
#[actix_web::test]
async fn invalid_writes_are_unprocessable(#[case] payload: Value, #[case] field: &str) {
    let app = actix_test::init_service(test_app(empty_repository())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("validation_failed")
    );
    let details = body
        .get("details")
        .and_then(|value| value.as_object())
        .expect("details present");
    assert_eq!(details.get("field").and_then(Value::as_str), Some(field));
}

#[rstest]
fn read_shape_keeps_a_null_game_id_key() {
    let record = UserDraft {
        login: "abc123".to_owned(),
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
    }
    .into_record(Uuid::new_v4());

    let value = serde_json::to_value(UserResponse::from(record)).expect("serialise response");
    assert_eq!(value.get("currentGameId"), Some(&Value::Null));
}

#[actix_web::test]
async fn missing_body_is_a_bad_request() {
    let app = actix_test::init_service(test_app(empty_repository())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("invalid_request")
    );
}

#[actix_web::test]
async fn malformed_identifiers_are_bad_requests() {
    let app = actix_test::init_service(test_app(empty_repository())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/not-a-uuid")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn put_creates_under_the_supplied_identifier() {
    let app = actix_test::init_service(test_app(empty_repository())).await;
    let id = Uuid::new_v4();

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(write_body("gbyron", "George", "Byron"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(format!("/api/v1/users/{id}").as_str())
    );
    let body = read_json(response).await;
    assert_eq!(body.as_str(), Some(id.to_string().as_str()));

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn put_preserves_gameplay_fields_on_replace() {
    let repository = empty_repository();
    let mut record = seed_user(&repository, "alovelace", "Ada", "Lovelace").await;
    record.games_played = 9;
    record.current_game_id = Some(Uuid::new_v4());
    let game_id = record.current_game_id;
    let id = record.id;
    repository
        .update_or_insert(record)
        .await
        .expect("seed gameplay fields");

    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(write_body("abyron", "Ada", "Byron"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{id}"))
        .to_request();
    let body = read_json(actix_test::call_service(&app, request).await).await;
    assert_eq!(body.get("login").and_then(Value::as_str), Some("abyron"));
    assert_eq!(body.get("fullName").and_then(Value::as_str), Some("Byron Ada"));
    assert_eq!(body.get("gamesPlayed").and_then(Value::as_u64), Some(9));
    assert_eq!(
        body.get("currentGameId").and_then(Value::as_str),
        game_id.map(|value| value.to_string()).as_deref()
    );
}

#[actix_web::test]
async fn patch_never_creates() {
    let app = actix_test::init_service(test_app(empty_repository())).await;

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{}", Uuid::new_v4()))
        .set_json(json!([
            { "op": "replace", "path": "/login", "value": "newlogin" }
        ]))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case(json!([{ "op": "replace", "path": "/login", "value": "bad login" }]))]
#[case(json!([{ "op": "replace", "path": "/nickname", "value": "ada" }]))]
#[case(json!([{ "op": "remove", "path": "/firstName" }]))]
#[case(json!([{ "op": "move", "path": "/login", "value": "ada" }]))]
#[actix_web::test]
async fn malformed_patches_are_unprocessable(#[case] document: Value) {
    let repository = empty_repository();
    let record = seed_user(&repository, "alovelace", "Ada", "Lovelace").await;

    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{}", record.id))
        .set_json(document)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn patches_apply_in_document_order() {
    let repository = empty_repository();
    let record = seed_user(&repository, "alovelace", "Ada", "Lovelace").await;

    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{}", record.id))
        .set_json(json!([
            { "op": "replace", "path": "/lastName", "value": "King" },
            { "op": "replace", "path": "/lastName", "value": "Byron" }
        ]))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", record.id))
        .to_request();
    let body = read_json(actix_test::call_service(&app, request).await).await;
    assert_eq!(body.get("fullName").and_then(Value::as_str), Some("Byron Ada"));
}

#[actix_web::test]
async fn delete_is_not_idempotent() {
    let repository = empty_repository();
    let record = seed_user(&repository, "alovelace", "Ada", "Lovelace").await;
    let uri = format!("/api/v1/users/{}", record.id);

    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::delete().uri(&uri).to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = actix_test::TestRequest::delete().uri(&uri).to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn head_reports_existence_without_a_body() {
    let repository = empty_repository();
    let record = seed_user(&repository, "alovelace", "Ada", "Lovelace").await;

    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri(&format!("/api/v1/users/{}", record.id))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
    let body = actix_test::read_body(response).await;
    assert!(body.is_empty());

    let request = actix_test::TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri(&format!("/api/v1/users/{}", Uuid::new_v4()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn options_advertises_collection_methods() {
    let app = actix_test::init_service(test_app(empty_repository())).await;

    let request = actix_test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/v1/users")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ALLOW)
            .and_then(|value| value.to_str().ok()),
        Some("GET, POST, OPTIONS")
    );
}

#[actix_web::test]
async fn listing_pages_with_metadata_header() {
    let repository = empty_repository();
    for index in 0..25 {
        seed_user(&repository, &format!("user{index}"), "First", "Last").await;
    }

    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users?pageNumber=2&pageSize=10")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let metadata: Value = response
        .headers()
        .get(X_PAGINATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| serde_json::from_str(raw).ok())
        .expect("pagination header");
    assert_eq!(metadata.get("totalCount").and_then(Value::as_u64), Some(25));
    assert_eq!(metadata.get("pageSize").and_then(Value::as_u64), Some(10));
    assert_eq!(metadata.get("currentPage").and_then(Value::as_u64), Some(2));
    assert_eq!(metadata.get("totalPages").and_then(Value::as_u64), Some(3));
    assert_eq!(
        metadata.get("previousPageLink").and_then(Value::as_str),
        Some("/api/v1/users?pageNumber=1&pageSize=10")
    );
    assert_eq!(
        metadata.get("nextPageLink").and_then(Value::as_str),
        Some("/api/v1/users?pageNumber=3&pageSize=10")
    );

    let body = read_json(response).await;
    let records = body.as_array().expect("array body");
    assert_eq!(records.len(), 10);
    assert_eq!(
        records
            .first()
            .and_then(|record| record.get("login"))
            .and_then(Value::as_str),
        Some("user10")
    );
}

#[actix_web::test]
async fn out_of_range_page_parameters_are_clamped() {
    let app = actix_test::init_service(test_app(empty_repository())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users?pageNumber=0&pageSize=100")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let metadata: Value = response
        .headers()
        .get(X_PAGINATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| serde_json::from_str(raw).ok())
        .expect("pagination header");
    assert_eq!(metadata.get("currentPage").and_then(Value::as_u64), Some(1));
    assert_eq!(metadata.get("pageSize").and_then(Value::as_u64), Some(20));
    assert!(metadata.get("previousPageLink").is_none());
}

#[actix_web::test]
async fn xml_is_served_on_request() {
    let repository = empty_repository();
    let record = seed_user(&repository, "alovelace", "Ada", "Lovelace").await;

    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", record.id))
        .insert_header((header::ACCEPT, "application/xml"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/xml")
    );
    let body = actix_test::read_body(response).await;
    let text = String::from_utf8(body.to_vec()).expect("UTF-8 body");
    assert!(text.starts_with("<user>"));
    assert!(text.contains("<login>alovelace</login>"));

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header((header::ACCEPT, "text/xml"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = actix_test::read_body(response).await;
    let text = String::from_utf8(body.to_vec()).expect("UTF-8 body");
    assert!(text.starts_with("<users>"));
}

#[actix_web::test]
async fn unsupported_representations_are_rejected() {
    let repository = empty_repository();
    let record = seed_user(&repository, "alovelace", "Ada", "Lovelace").await;

    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", record.id))
        .insert_header((header::ACCEPT, "text/csv"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

    let body = read_json(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("not_acceptable")
    );
}
