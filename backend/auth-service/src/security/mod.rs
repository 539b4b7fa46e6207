//! Security primitives for the auth core.

pub mod password;

pub use password::{hash_password, verify_password};
