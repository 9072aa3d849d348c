use aakit_state::constants::SIGNATURE_LEN;
use aakit_state::signature::{address_of, sign_digest};
use aakit_state::{keccak256, Address};
use async_trait::async_trait;
use libsecp256k1::SecretKey;
use rand::RngCore;

/// Abstraction for an entity that can sign digests.
/// Lets the SDK work with local keys as well as remote signers that only
/// hand back signatures.
#[async_trait]
pub trait OperationSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Signs a 32-byte digest, returning `r ‖ s ‖ v`.
    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN], String>;
}

/// secp256k1 key held in memory.
#[derive(Clone)]
pub struct LocalSigner {
    secret: SecretKey,
}

impl LocalSigner {
    pub fn new(secret: SecretKey) -> Self {
        Self { secret }
    }

    /// Deterministic key derived from `label`, for tests and demos.
    pub fn from_label(label: &str) -> Result<Self, String> {
        SecretKey::parse(&keccak256(label.as_bytes()))
            .map(Self::new)
            .map_err(|e| format!("invalid key for {label}: {e:?}"))
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            // out-of-range scalars are vanishingly rare
            if let Ok(secret) = SecretKey::parse(&bytes) {
                return Self::new(secret);
            }
        }
    }
}

#[async_trait]
impl OperationSigner for LocalSigner {
    fn address(&self) -> Address {
        address_of(&self.secret)
    }

    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN], String> {
        Ok(sign_digest(&self.secret, digest))
    }
}
