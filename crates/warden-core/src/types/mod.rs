//! Validated session types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod backend_url;
mod email;
mod role;

pub use backend_url::BackendUrl;
pub use email::Email;
pub use role::Role;
