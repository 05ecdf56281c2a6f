use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use tracing::{error, warn};

lazy_static! {
    // verified on the malformed-digest path so its timing matches a normal
    // mismatch
    static ref REFERENCE_DIGEST: String =
        hash_password("reference-password").expect("reference digest");
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// A digest that fails to parse counts as a mismatch, not an error, and
/// still burns a real verification first.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "malformed password digest");
            burn_verification(plain);
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Runs a throwaway verification against a fixed digest. Used wherever the
/// real digest is unavailable (unknown email, malformed digest) so those
/// paths cost the same as a wrong password.
pub fn burn_verification(plain: &str) {
    if let Ok(parsed) = PasswordHash::new(&REFERENCE_DIGEST) {
        let _ = Argon2::default().verify_password(plain.as_bytes(), &parsed);
    }
}
