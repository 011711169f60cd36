//! Backend entry-point: wires the users REST endpoints and OpenAPI docs.

use std::env;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{
    create_user, delete_user, get_user, head_user, list_users, patch_user, update_user,
    users_options,
};
use backend::outbound::persistence::InMemoryUserRepository;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let bind = env::var("USERS_API_BIND").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let repository = Arc::new(InMemoryUserRepository::default());
    let state = web::Data::new(HttpState::new(repository));

    info!(%bind, "starting users API");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(backend::doc::configure)
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
    })
    .bind(bind)?
    .run()
    .await
}
