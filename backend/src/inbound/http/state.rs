//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they
//! only depend on the domain service and stay testable without real I/O.

use std::sync::Arc;

use crate::domain::UsersService;
use crate::domain::ports::UserRepository;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Resource semantics for the users collection.
    pub users: Arc<UsersService>,
}

impl HttpState {
    /// Construct state over a store port implementation.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::FixtureUserRepository;
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureUserRepository));
    /// let _users = state.users.clone();
    /// ```
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self {
            users: Arc::new(UsersService::new(repository)),
        }
    }
}
