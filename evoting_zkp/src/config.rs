use crate::*;
use digest::Digest;
use std::env::var;
use std::str::FromStr;

/// Environment variable selecting the challenge hash
pub const HASH_ALGORITHM_VAR: &str = "EVOTING_ZKP_HASH_ALGORITHM";

/// Hash function used to derive Fiat-Shamir challenges
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub(crate) fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => sha2::Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha512 => sha2::Sha512::digest(data).to_vec(),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown hash algorithm '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        };
        write!(f, "{}", name)
    }
}

/// Cryptographic policy shared by provers and verifiers.
///
/// A proof only verifies under the same policy it was generated with.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    pub hash_algorithm: HashAlgorithm,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            hash_algorithm: HashAlgorithm::Sha256,
        }
    }
}

impl Policy {
    pub fn from_env() -> Result<Self, Error> {
        let hash_algorithm = match var(HASH_ALGORITHM_VAR) {
            Ok(val) => val.parse()?,
            Err(_e) => Policy::default().hash_algorithm,
        };

        Ok(Policy { hash_algorithm })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hash_algorithm_parse() {
        assert_eq!(
            "SHA256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            " sha-512 ".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha512
        );
        assert!(matches!(
            "md5".parse::<HashAlgorithm>(),
            Err(Error::InvalidConfiguration(_))
        ));

        let name = HashAlgorithm::Sha512.to_string();
        assert_eq!(name.parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
    }

    #[test]
    fn test_policy_from_env() {
        // Only this test touches the variable
        std::env::remove_var(HASH_ALGORITHM_VAR);
        assert_eq!(Policy::from_env().unwrap(), Policy::default());

        std::env::set_var(HASH_ALGORITHM_VAR, "sha512");
        assert_eq!(
            Policy::from_env().unwrap().hash_algorithm,
            HashAlgorithm::Sha512
        );

        std::env::set_var(HASH_ALGORITHM_VAR, "whirlpool");
        assert!(Policy::from_env().is_err());

        std::env::remove_var(HASH_ALGORITHM_VAR);
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(HashAlgorithm::Sha256.digest(b"abc").len(), 32);
        assert_eq!(HashAlgorithm::Sha512.digest(b"abc").len(), 64);
    }
}
