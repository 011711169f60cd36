//! Persistence adapters for the user store port.

mod memory;

pub use memory::InMemoryUserRepository;
