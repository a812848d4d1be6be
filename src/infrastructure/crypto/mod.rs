//! Cryptographic primitives: password hashing and JWT tokens

pub mod jwt;
pub mod password;
