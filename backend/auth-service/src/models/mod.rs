//! Data models for the auth core.

pub mod principal;
pub mod requests;
pub mod token_pair;

pub use principal::{CustomerRow, Principal, PrincipalKind, PrincipalProfile, UserRow};
pub use token_pair::{TokenPair, TokenPairRecord};
