pub mod ip;

use tracing::debug;

use crate::errors::{Result, ShortgateError};
use crate::storage::Collection;

/// Attempts before code minting gives up and reports a storage error.
const MINT_MAX_ATTEMPTS: usize = 8;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// Mint a short code that is not yet present in the given namespace.
///
/// The random namespace is large enough that collisions are rare; the loop
/// re-rolls on collision and gives up after a bounded number of attempts so
/// a misbehaving backend cannot spin forever.
pub async fn mint_unique_code<T>(collection: &dyn Collection<T>, length: usize) -> Result<String>
where
    T: Clone + Send + Sync + 'static,
{
    for attempt in 0..MINT_MAX_ATTEMPTS {
        let code = generate_random_code(length);
        if collection.get(&code).await?.is_none() {
            return Ok(code);
        }
        debug!("Short code collision on attempt {}: {}", attempt + 1, code);
    }
    Err(ShortgateError::storage_operation(format!(
        "Could not mint a unique short code after {} attempts",
        MINT_MAX_ATTEMPTS
    )))
}

/// Minimal hex encoder; avoids pulling in a crate for one call site.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code_length() {
        for len in [1, 6, 12, 32] {
            assert_eq!(generate_random_code(len).len(), len);
        }
    }

    #[test]
    fn test_generate_random_code_charset() {
        let code = generate_random_code(64);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_random_code_distinct() {
        // Not a collision proof, just a sanity check on the generator.
        let a = generate_random_code(12);
        let b = generate_random_code(12);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[]), "");
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
        assert_eq!(hex_encode(b"abc"), "616263");
    }
}
