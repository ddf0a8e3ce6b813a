//! Password hashing for the local auth-user store.
//!
//! Stored values are Argon2id PHC strings (`$argon2id$v=19$...`). Only the
//! SQLite backend stores passwords; the hosted backend hashes them
//! server-side.

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{AppError, Result};

const SALT_SIZE: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| AppError::Internal(format!("Invalid password salt: {e}")))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}
