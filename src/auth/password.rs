//! Password hashing with bcrypt.

use crate::errors::Result;

/// Hashes `password` with the given bcrypt work factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(Into::into)
}

/// Checks `password` against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch rather than an error, so callers
/// report it the same way as a wrong password.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
