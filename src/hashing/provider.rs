// Sqlauth - Password Hashing Providers
//
// Two interchangeable implementations of `CredentialHasher`:
//   - `BcryptHasher`: bcrypt with a configurable cost (default 12)
//   - `Argon2Hasher`: Argon2id v0x13 with PHC-encoded output
//
// `verify` separates a plain mismatch (`Ok(false)`) from a digest the
// primitive cannot interpret or a backend fault (`Err`).

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::HashError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// bcrypt only consumes the first 72 bytes of its input.
pub const BCRYPT_MAX_PASSWORD_LEN: usize = 72;

const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;

// Argon2id parameters: m=65536 (64 MiB), t=3 (3 iterations), p=4 (4 lanes)
const ARGON2_M_COST: u32 = 65536;
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

/// Salt length in bytes for Argon2 digests.
const ARGON2_SALT_LEN: usize = 16;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the password hashing primitive.
///
/// Implementations must be thread-safe, the store calls them from many
/// threads at once.
pub trait CredentialHasher: Send + Sync {
    /// Produce a salted digest of `password`.
    fn hash(&self, password: &str) -> Result<Vec<u8>, HashError>;

    /// Check `password` against a digest previously produced by `hash`.
    /// Returns `Ok(false)` on mismatch.
    fn verify(&self, digest: &[u8], password: &str) -> Result<bool, HashError>;
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Bcrypt,
    #[value(name = "argon2id")]
    Argon2id,
}

/// Selects and parameterizes the hashing primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub algorithm: HashAlgorithm,
    /// bcrypt work factor (log2 rounds), 4..=31.
    pub bcrypt_cost: u32,
    /// Argon2 memory cost in KiB.
    pub argon2_m_cost: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Bcrypt,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            argon2_m_cost: ARGON2_M_COST,
            argon2_t_cost: ARGON2_T_COST,
            argon2_p_cost: ARGON2_P_COST,
        }
    }
}

impl HashingConfig {
    pub fn bcrypt(cost: u32) -> Self {
        Self {
            algorithm: HashAlgorithm::Bcrypt,
            bcrypt_cost: cost,
            ..Self::default()
        }
    }

    pub fn argon2id(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            algorithm: HashAlgorithm::Argon2id,
            argon2_m_cost: m_cost,
            argon2_t_cost: t_cost,
            argon2_p_cost: p_cost,
            ..Self::default()
        }
    }

    /// Build the configured hasher, validating its parameters.
    pub fn build(&self) -> Result<Box<dyn CredentialHasher>, HashError> {
        match self.algorithm {
            HashAlgorithm::Bcrypt => Ok(Box::new(BcryptHasher::new(self.bcrypt_cost)?)),
            HashAlgorithm::Argon2id => Ok(Box::new(Argon2Hasher::new(
                self.argon2_m_cost,
                self.argon2_t_cost,
                self.argon2_p_cost,
            )?)),
        }
    }
}

// ─── bcrypt ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Result<Self, HashError> {
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&cost) {
            return Err(HashError::InvalidParams(format!(
                "bcrypt cost must be between {} and {}, got {}",
                BCRYPT_MIN_COST, BCRYPT_MAX_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<Vec<u8>, HashError> {
        // Refuse instead of silently hashing a truncated password. The
        // `non_truncating_*` functions count the NUL terminator and would
        // turn away a 72-byte password, so the bound is checked here.
        if password.len() > BCRYPT_MAX_PASSWORD_LEN {
            return Err(HashError::InputTooLong {
                len: password.len(),
                max: BCRYPT_MAX_PASSWORD_LEN,
            });
        }

        let digest = bcrypt::hash(password, self.cost)
            .map_err(|e| HashError::Backend(format!("bcrypt hash failed: {}", e)))?;
        Ok(digest.into_bytes())
    }

    fn verify(&self, digest: &[u8], password: &str) -> Result<bool, HashError> {
        let digest = std::str::from_utf8(digest)
            .map_err(|_| HashError::MalformedDigest("bcrypt digest is not valid UTF-8".into()))?;

        match bcrypt::verify(password, digest) {
            Ok(matched) => Ok(matched),
            Err(
                e @ (bcrypt::BcryptError::InvalidHash(_) | bcrypt::BcryptError::CostNotAllowed(_)),
            ) => Err(HashError::MalformedDigest(e.to_string())),
            Err(e) => Err(HashError::Backend(format!("bcrypt verify failed: {}", e))),
        }
    }
}

// ─── Argon2id ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, HashError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| HashError::InvalidParams(format!("invalid Argon2 params: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn generate_salt() -> Result<SaltString, HashError> {
        let mut bytes = [0u8; ARGON2_SALT_LEN];
        rand::rng().fill_bytes(&mut bytes);
        SaltString::encode_b64(&bytes)
            .map_err(|e| HashError::Backend(format!("salt encoding failed: {}", e)))
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<Vec<u8>, HashError> {
        let salt = Self::generate_salt()?;
        let phc = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashError::Backend(format!("Argon2id hash failed: {}", e)))?;
        Ok(phc.to_string().into_bytes())
    }

    fn verify(&self, digest: &[u8], password: &str) -> Result<bool, HashError> {
        let digest = std::str::from_utf8(digest)
            .map_err(|_| HashError::MalformedDigest("PHC string is not valid UTF-8".into()))?;
        let parsed =
            PasswordHash::new(digest).map_err(|e| HashError::MalformedDigest(e.to_string()))?;

        // Parameters are read back from the PHC string, not from `self`.
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Backend(format!("Argon2id verify failed: {}", e))),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_bcrypt() -> BcryptHasher {
        BcryptHasher::new(4).unwrap()
    }

    fn fast_argon2() -> Argon2Hasher {
        Argon2Hasher::new(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_bcrypt_hash_and_verify() {
        let hasher = fast_bcrypt();
        let digest = hasher.hash("correct-horse").unwrap();

        assert!(digest.starts_with(b"$2"), "bcrypt digests carry a $2x$ prefix");
        assert!(hasher.verify(&digest, "correct-horse").unwrap());
        assert!(!hasher.verify(&digest, "wrong").unwrap());
    }

    #[test]
    fn test_bcrypt_digests_are_salted() {
        let hasher = fast_bcrypt();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b, "Two hashes of the same password must differ by salt");
    }

    #[test]
    fn test_bcrypt_rejects_overlong_password() {
        let hasher = fast_bcrypt();
        let long = "x".repeat(BCRYPT_MAX_PASSWORD_LEN + 1);

        match hasher.hash(&long) {
            Err(HashError::InputTooLong { len, max }) => {
                assert_eq!(len, BCRYPT_MAX_PASSWORD_LEN + 1);
                assert_eq!(max, BCRYPT_MAX_PASSWORD_LEN);
            }
            other => panic!("Expected InputTooLong, got {:?}", other),
        }

        let exact = "x".repeat(BCRYPT_MAX_PASSWORD_LEN);
        assert!(hasher.hash(&exact).is_ok());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        assert!(BcryptHasher::new(3).is_err());
        assert!(BcryptHasher::new(32).is_err());
        assert_eq!(BcryptHasher::new(4).unwrap().cost(), 4);
        assert_eq!(BcryptHasher::default().cost(), bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_bcrypt_malformed_digest_is_an_error() {
        let hasher = fast_bcrypt();

        let result = hasher.verify(b"not-a-bcrypt-digest", "anything");
        assert!(
            matches!(result, Err(HashError::MalformedDigest(_))),
            "Garbage digest must not look like a mismatch: {:?}",
            result
        );

        let result = hasher.verify(&[0xff, 0xfe, 0x00], "anything");
        assert!(matches!(result, Err(HashError::MalformedDigest(_))));
    }

    #[test]
    fn test_bcrypt_out_of_range_cost_in_digest_is_malformed() {
        let hasher = fast_bcrypt();
        let mut digest = hasher.hash("pw").unwrap();
        // "$2b$04$..." -> "$2b$99$..."
        digest[4] = b'9';
        digest[5] = b'9';

        let result = hasher.verify(&digest, "pw");
        assert!(
            matches!(result, Err(HashError::MalformedDigest(_))),
            "A digest with an impossible cost must not read as a mismatch: {:?}",
            result
        );
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hasher = fast_argon2();
        let digest = hasher.hash("correct-horse").unwrap();

        assert!(digest.starts_with(b"$argon2id$v=19$"));
        assert!(hasher.verify(&digest, "correct-horse").unwrap());
        assert!(!hasher.verify(&digest, "wrong").unwrap());
    }

    #[test]
    fn test_argon2_verifies_with_params_from_digest() {
        let digest = fast_argon2().hash("pw").unwrap();
        // A hasher with different parameters still verifies older digests.
        let other = Argon2Hasher::new(2048, 2, 1).unwrap();
        assert!(other.verify(&digest, "pw").unwrap());
    }

    #[test]
    fn test_argon2_malformed_digest_is_an_error() {
        let hasher = fast_argon2();
        let result = hasher.verify(b"argon2id-not-a-phc-string", "pw");
        assert!(matches!(result, Err(HashError::MalformedDigest(_))));
    }

    #[test]
    fn test_argon2_invalid_params_rejected() {
        assert!(matches!(
            Argon2Hasher::new(1024, 0, 1),
            Err(HashError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_config_builds_selected_algorithm() {
        let bcrypt = HashingConfig::bcrypt(4).build().unwrap();
        assert!(bcrypt.hash("pw").unwrap().starts_with(b"$2"));

        let argon = HashingConfig::argon2id(1024, 1, 1).build().unwrap();
        assert!(argon.hash("pw").unwrap().starts_with(b"$argon2id$"));

        assert!(HashingConfig::bcrypt(99).build().is_err());
    }

    #[test]
    fn test_config_defaults_to_vetted_cost() {
        let config = HashingConfig::default();
        assert_eq!(config.algorithm, HashAlgorithm::Bcrypt);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.argon2_m_cost, ARGON2_M_COST);
    }
}
