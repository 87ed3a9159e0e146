use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing itself failed; only expected on resource exhaustion.
    #[error("password hashing failed: {0}")]
    Hash(String),
    /// The stored digest is not a parsable PHC string.
    #[error("malformed password digest: {0}")]
    MalformedDigest(String),
}

/// Argon2id with a fresh random salt, encoded as a PHC string.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            PasswordError::Hash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on mismatch; `Err` only when `digest` cannot be parsed.
pub fn verify_password(plain: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        PasswordError::MalformedDigest(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Well-formed digest with default Argon2id parameters that no password matches.
const UNKNOWN_ACCOUNT_DIGEST: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c2t5YXV0aC11bmtub3duIQ$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Spends the same Argon2 work as a real verification, for accounts that do not exist.
pub fn verify_unknown_account(plain: &str) {
    let _ = verify_password(plain, UNKNOWN_ACCOUNT_DIGEST);
}
