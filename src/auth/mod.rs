//! Access gate: credential hashing, bearer tokens and caller identity.

mod caller;
mod jwt;
mod password;

pub use caller::Caller;
pub use jwt::{Claims, TokenService};
pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
