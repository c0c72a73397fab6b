/// bcrypt cost factor for newly hashed passwords.
const BCRYPT_COST: u32 = 10;

pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, BCRYPT_COST)
}

/// One-way verification against a stored hash. A malformed stored hash
/// counts as a mismatch rather than an error, so callers cannot leak
/// anything about the stored value.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}
