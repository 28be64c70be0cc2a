//! Password credentials: Argon2id PHC strings with a random salt.

use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use sha2::{Digest, Sha256};

use super::errors::WorldError;

fn hasher(params: Option<&Params>) -> Argon2<'static> {
    match params {
        Some(p) => Argon2::new(Algorithm::Argon2id, Version::V0x13, p.clone()),
        None => Argon2::default(),
    }
}

pub fn hash_password(password: &str, params: Option<&Params>) -> Result<String, WorldError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = hasher(params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| WorldError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verification reads its cost parameters from the stored hash. A corrupt hash never matches.
pub fn verify_password(stored: &str, password: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("corrupt password hash: {}", e);
            false
        }
    }
}

/// Hex SHA-256 of the stored credential; changes whenever the password does.
pub fn fingerprint(stored: &str) -> String {
    format!("{:x}", Sha256::digest(stored.as_bytes()))
}
