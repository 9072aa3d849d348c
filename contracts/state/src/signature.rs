//! secp256k1 signing and signer recovery over 32-byte digests.

use aakit_assertions::check_exact_len;
use libsecp256k1::{Message, PublicKey, RecoveryId, SecretKey, Signature};

use crate::address::Address;
use crate::constants::SIGNATURE_LEN;
use crate::error::SignatureError;

/// Recovers the address that produced `signature` (`r ‖ s ‖ v`) over `digest`.
///
/// `v` may be given as 27/28 or as the raw recovery id 0/1. Signatures with a
/// high `s` value are rejected so a signature has exactly one valid encoding.
pub fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> Result<Address, SignatureError> {
    check_exact_len(
        signature,
        SIGNATURE_LEN,
        SignatureError::InvalidLength(signature.len()),
    )?;

    let v = signature[64];
    let recovery_id = match v {
        27 | 28 => v - 27,
        0 | 1 => v,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    let parsed =
        Signature::parse_standard_slice(&signature[..64]).map_err(|_| SignatureError::Malformed)?;
    if parsed.s.is_high() {
        return Err(SignatureError::HighS);
    }
    let recovery_id =
        RecoveryId::parse(recovery_id).map_err(|_| SignatureError::InvalidRecoveryId(v))?;

    let public_key = libsecp256k1::recover(&Message::parse(digest), &parsed, &recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(Address::from_public_key(&public_key))
}

/// Signs `digest`, returning `r ‖ s ‖ v` with `v` in {27, 28}.
pub fn sign_digest(secret: &SecretKey, digest: &[u8; 32]) -> [u8; SIGNATURE_LEN] {
    let (signature, recovery_id) = libsecp256k1::sign(&Message::parse(digest), secret);
    let mut out = [0u8; SIGNATURE_LEN];
    out[..64].copy_from_slice(&signature.serialize());
    out[64] = recovery_id.serialize() + 27;
    out
}

pub fn address_of(secret: &SecretKey) -> Address {
    Address::from_public_key(&PublicKey::from_secret_key(secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::keccak256;
    use assert_matches::assert_matches;
    use rand::RngCore;

    fn random_key() -> SecretKey {
        let mut rng = rand::thread_rng();
        loop {
            let mut raw = [0u8; 32];
            rng.fill_bytes(&mut raw);
            if let Ok(key) = SecretKey::parse(&raw) {
                return key;
            }
        }
    }

    #[test]
    fn test_sign_then_recover_yields_signer() {
        let key = random_key();
        let digest = keccak256(b"operation");
        let signature = sign_digest(&key, &digest);
        assert_eq!(recover_signer(&digest, &signature).unwrap(), address_of(&key));
    }

    #[test]
    fn test_raw_recovery_id_is_accepted() {
        let key = random_key();
        let digest = keccak256(b"raw v");
        let mut signature = sign_digest(&key, &digest);
        signature[64] -= 27;
        assert_eq!(recover_signer(&digest, &signature).unwrap(), address_of(&key));
    }

    #[test]
    fn test_other_digest_recovers_someone_else() {
        let key = random_key();
        let signature = sign_digest(&key, &keccak256(b"a"));
        let recovered = recover_signer(&keccak256(b"b"), &signature);
        assert!(recovered.map(|a| a != address_of(&key)).unwrap_or(true));
    }

    #[test]
    fn test_rejects_bad_layouts() {
        let digest = keccak256(b"x");
        assert_matches!(
            recover_signer(&digest, &[0u8; 64]),
            Err(SignatureError::InvalidLength(64))
        );
        let mut signature = sign_digest(&random_key(), &digest);
        signature[64] = 5;
        assert_matches!(
            recover_signer(&digest, &signature),
            Err(SignatureError::InvalidRecoveryId(5))
        );
    }

    #[test]
    fn test_rejects_high_s() {
        let key = random_key();
        let digest = keccak256(b"malleable");
        let signature = sign_digest(&key, &digest);
        let mut parsed = Signature::parse_standard_slice(&signature[..64]).unwrap();
        parsed.s = -parsed.s;
        let mut flipped = [0u8; 65];
        flipped[..64].copy_from_slice(&parsed.serialize());
        flipped[64] = ((signature[64] - 27) ^ 1) + 27;
        assert_matches!(
            recover_signer(&digest, &flipped),
            Err(SignatureError::HighS)
        );
    }
}
