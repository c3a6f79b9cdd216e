// Sqlauth - Hashing Module
//
// The password hashing capability used by the store. Digests are
// self-describing strings (bcrypt `$2b$...` or Argon2 PHC `$argon2id$...`)
// stored as raw bytes. The store never compares digests directly.

mod error;
mod provider;

pub use error::HashError;
pub use provider::{
    Argon2Hasher, BcryptHasher, CredentialHasher, HashAlgorithm, HashingConfig,
    BCRYPT_MAX_PASSWORD_LEN,
};
