//! Repositories for database operations

pub mod principal;

pub use principal::PrincipalRepository;
