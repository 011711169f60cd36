//! Domain ports for the hexagonal boundary.

mod user_repository;

#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    FixtureUserRepository, UpsertOutcome, UserRepository, UserRepositoryError,
};
