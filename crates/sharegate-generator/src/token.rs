use rand::rngs::OsRng;
use rand::RngCore;
use sharegate_core::ShareToken;

/// Number of random bytes behind a share token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Draws a fresh share token from the operating system CSPRNG.
pub fn generate_token() -> ShareToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    ShareToken::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_distinct() {
        let first = generate_token();
        let second = generate_token();
        assert_ne!(first.as_str(), second.as_str());
    }

    #[test]
    fn tokens_are_url_safe() {
        let token = generate_token();
        // base58 of 32 bytes is at least 32 characters even with leading zero bytes
        assert!(token.as_str().len() >= 32);
        assert!(token.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
