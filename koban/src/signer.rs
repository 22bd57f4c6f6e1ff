//! Off-chain signature generation for user operation hashes.
//!
//! Signing is pure and local: no I/O, no shared state. The operation
//! hash returned by the transaction builder is hex-decoded, wrapped
//! with the EIP-191 personal-message prefix, and signed with the
//! secp256k1 key. Output is deterministic in `(key, hash)` (RFC 6979
//! nonces) and always `0x`-prefixed.

use alloy::primitives::hex;
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;

use crate::error::SignerError;

fn format_signature(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a user operation hash into raw bytes.
///
/// Accepts hex with or without a `0x` prefix.
///
/// # Errors
///
/// Returns [`SignerError::Decoding`] when the hash is empty, has odd
/// length, or contains non-hex characters.
pub fn decode_operation_hash(operation_hash: &str) -> Result<Vec<u8>, SignerError> {
    let digits = operation_hash.strip_prefix("0x").unwrap_or(operation_hash);
    if digits.is_empty() {
        return Err(SignerError::decoding("empty operation hash"));
    }
    hex::decode(digits)
        .map_err(|e| SignerError::decoding(format!("invalid operation hash hex: {e}")))
}

/// Sign a user operation hash with an EIP-191 personal-message signature.
///
/// The private key may carry a `0x` prefix. Returns the `0x`-prefixed
/// hex-encoded 65-byte signature.
///
/// # Errors
///
/// - [`SignerError::Decoding`] when the hash is not valid hex.
/// - [`SignerError::KeyFormat`] when the key does not parse as a
///   secp256k1 private key.
/// - [`SignerError::Signing`] when the signing operation itself fails.
pub fn sign_operation_hash(private_key: &str, operation_hash: &str) -> Result<String, SignerError> {
    let message = decode_operation_hash(operation_hash)?;

    let key = private_key.strip_prefix("0x").unwrap_or(private_key);
    let signer: PrivateKeySigner = key
        .parse()
        .map_err(|e| SignerError::key_format(format!("invalid private key: {e}")))?;

    let signature = signer
        .sign_message_sync(&message)
        .map_err(|e| SignerError::signing(format!("sign_message_sync failed: {e}")))?;

    Ok(format_signature(&signature.as_bytes()))
}

/// Derive the EVM address controlled by a private key.
///
/// # Errors
///
/// Returns [`SignerError::KeyFormat`] when the key does not parse.
pub fn signer_address(private_key: &str) -> Result<String, SignerError> {
    let key = private_key.strip_prefix("0x").unwrap_or(private_key);
    let signer: PrivateKeySigner = key
        .parse()
        .map_err(|e| SignerError::key_format(format!("invalid private key: {e}")))?;
    Ok(signer.address().to_checksum(None))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    // Well-known Anvil/Hardhat development key, account 0.
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const HASH: &str = "0x7c9fb5b5cbcb2fd531a5bdae5b7ea03b6c4045b3a1f90cf979ab95a1052a925d";

    mod decode {
        use super::*;

        #[test]
        fn accepts_prefixed_and_bare() {
            let prefixed = decode_operation_hash(HASH).unwrap();
            let bare = decode_operation_hash(&HASH[2..]).unwrap();
            assert_eq!(prefixed, bare);
            assert_eq!(prefixed.len(), 32);
        }

        #[test]
        fn empty_hash_is_decoding_error() {
            assert!(matches!(
                decode_operation_hash("").unwrap_err(),
                SignerError::Decoding(_)
            ));
            assert!(matches!(
                decode_operation_hash("0x").unwrap_err(),
                SignerError::Decoding(_)
            ));
        }

        #[test]
        fn odd_length_hash_is_decoding_error() {
            assert!(matches!(
                decode_operation_hash("0xabc").unwrap_err(),
                SignerError::Decoding(_)
            ));
        }

        #[test]
        fn non_hex_hash_is_decoding_error() {
            assert!(matches!(
                decode_operation_hash("0xzzzz").unwrap_err(),
                SignerError::Decoding(_)
            ));
        }
    }

    mod sign {
        use super::*;

        #[test]
        fn is_deterministic() {
            let first = sign_operation_hash(KEY, HASH).unwrap();
            let second = sign_operation_hash(KEY, HASH).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn output_is_prefixed_65_byte_hex() {
            let sig = sign_operation_hash(KEY, HASH).unwrap();
            assert!(sig.starts_with("0x"));
            assert_eq!(sig.len(), 2 + 65 * 2);
            assert!(sig[2..].bytes().all(|b| b.is_ascii_hexdigit()));
        }

        #[test]
        fn prefix_on_hash_does_not_change_signature() {
            let prefixed = sign_operation_hash(KEY, HASH).unwrap();
            let bare = sign_operation_hash(KEY, &HASH[2..]).unwrap();
            assert_eq!(prefixed, bare);
        }

        #[test]
        fn one_bit_hash_change_changes_signature() {
            let mut flipped = String::from(HASH);
            let last = flipped.pop().unwrap();
            flipped.push(if last == 'd' { 'c' } else { 'd' });

            let original = sign_operation_hash(KEY, HASH).unwrap();
            let changed = sign_operation_hash(KEY, &flipped).unwrap();
            assert_ne!(original, changed);
        }

        #[test]
        fn matches_direct_alloy_signing_and_recovers() {
            let message = decode_operation_hash(HASH).unwrap();
            let signer: PrivateKeySigner = KEY[2..].parse().unwrap();
            let signature = signer.sign_message_sync(&message).unwrap();

            let ours = sign_operation_hash(KEY, HASH).unwrap();
            assert_eq!(ours, format!("0x{}", hex::encode(signature.as_bytes())));

            let recovered = signature.recover_address_from_msg(&message[..]).unwrap();
            assert_eq!(recovered, signer.address());
        }

        #[test]
        fn malformed_key_is_key_format_error() {
            assert!(matches!(
                sign_operation_hash("0x1234", HASH).unwrap_err(),
                SignerError::KeyFormat(_)
            ));
            assert!(matches!(
                sign_operation_hash("", HASH).unwrap_err(),
                SignerError::KeyFormat(_)
            ));
        }

        #[test]
        fn hash_is_decoded_before_key_is_parsed() {
            // A bad hash with a bad key reports the hash problem.
            assert!(matches!(
                sign_operation_hash("not-a-key", "0xzz").unwrap_err(),
                SignerError::Decoding(_)
            ));
        }
    }

    mod address {
        use super::*;

        #[test]
        fn derives_checksummed_address() {
            assert_eq!(signer_address(KEY).unwrap(), ADDRESS);
            assert_eq!(signer_address(&KEY[2..]).unwrap(), ADDRESS);
        }

        #[test]
        fn malformed_key_is_key_format_error() {
            assert!(matches!(
                signer_address("xyz").unwrap_err(),
                SignerError::KeyFormat(_)
            ));
        }
    }
}
