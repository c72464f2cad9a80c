//! Authentication service models

pub mod principal;

// Re-export for convenience
pub use principal::{Principal, PrincipalStatus};
