use bcrypt::BcryptError;

/// Work factor for stored password hashes.
const BCRYPT_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, BcryptError> {
    bcrypt::verify(password, stored_hash)
}
