//! HTTP inbound adapter exposing the users REST endpoints.

pub mod error;
pub mod negotiation;
pub mod state;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;
