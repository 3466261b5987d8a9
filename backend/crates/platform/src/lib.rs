//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, Base64, constant-time compare)
//! - Password hashing (Argon2id)
//! - Cookie management
//! - Client identification (IP address, device name)
//! - Rate limiting infrastructure

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
