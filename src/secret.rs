//! Representation of a shared secret, either "raw" bytes or a base32 string.
//!
//! Secrets arriving through provisioning URIs are opaque base32 text and are
//! kept encoded at rest; decoding happens at code-generation time and is
//! deliberately lenient: characters outside the RFC 4648 alphabet are
//! dropped (case-insensitively) before decoding, and any trailing group of
//! fewer than 8 bits is discarded. Malformed input therefore yields a
//! best-effort, possibly shorter, byte sequence instead of an error.
//!
//! # Examples
//!
//! ```
//! use totp_codex::Secret;
//!
//! let spaced = Secret::Encoded("jbsw y3dp ehpk 3pxp".to_string());
//! let plain = Secret::Encoded("JBSWY3DPEHPK3PXP".to_string());
//! assert_eq!(spaced.to_bytes(), plain.to_bytes());
//! ```

use base32::{self, Alphabet};
use constant_time_eq::constant_time_eq;

/// Shared secret a code is generated from.
#[derive(Debug, Clone, Eq)]
pub enum Secret {
    /// Non-encoded "raw" secret.
    Raw(Vec<u8>),
    /// Base32 encoded secret, as carried by provisioning URIs.
    Encoded(String),
}

impl PartialEq for Secret {
    /// Compares the decoded byte values, so a `Raw` secret can equal an
    /// `Encoded` one.
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.to_bytes(), &other.to_bytes())
    }
}

/// Uppercase `input` and drop everything outside `A-Z2-7`.
fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_uppercase() || ('2'..='7').contains(c))
        .collect()
}

impl Secret {
    /// Decode into raw bytes. Lenient: invalid characters are ignored and
    /// incomplete trailing bit groups dropped, so this never fails.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Secret::Raw(bytes) => bytes.clone(),
            Secret::Encoded(s) => {
                // The sanitized string only contains alphabet characters,
                // so the strict decoder cannot reject it.
                base32::decode(Alphabet::Rfc4648 { padding: false }, &sanitize(s))
                    .unwrap_or_default()
            }
        }
    }

    /// Transform into a `Secret::Raw`.
    pub fn to_raw(&self) -> Self {
        Secret::Raw(self.to_bytes())
    }

    /// Transform into a canonical (uppercase, unpadded) `Secret::Encoded`.
    pub fn to_encoded(&self) -> Self {
        Secret::Encoded(base32::encode(
            Alphabet::Rfc4648 { padding: false },
            &self.to_bytes(),
        ))
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::Raw(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Secret::Encoded(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Secret;

    const BASE32: &str = "OBWGC2LOFVZXI4TJNZTS243FMNZGK5BNGEZDG";
    const BYTES: [u8; 23] = [
        0x70, 0x6c, 0x61, 0x69, 0x6e, 0x2d, 0x73, 0x74, 0x72, 0x69, 0x6e, 0x67, 0x2d, 0x73, 0x65,
        0x63, 0x72, 0x65, 0x74, 0x2d, 0x31, 0x32, 0x33,
    ];

    #[test]
    fn decodes_canonical_base32() {
        assert_eq!(Secret::Encoded(BASE32.to_string()).to_bytes(), BYTES);
    }

    #[test]
    fn decode_is_case_insensitive() {
        let lower = Secret::Encoded(BASE32.to_ascii_lowercase());
        assert_eq!(lower.to_bytes(), BYTES);
    }

    #[test]
    fn decode_skips_foreign_characters() {
        let noisy = Secret::Encoded("OBWG C2LO-FVZX I4TJ NZTS 243F MNZG K5BN GEZD G!".to_string());
        assert_eq!(noisy.to_bytes(), BYTES);
    }

    #[test]
    fn decode_never_fails() {
        assert_eq!(Secret::Encoded("".to_string()).to_bytes(), Vec::<u8>::new());
        assert_eq!(
            Secret::Encoded("!!!018989".to_string()).to_bytes(),
            Vec::<u8>::new()
        );
        // A single alphabet character carries 5 bits, not enough for a byte.
        assert_eq!(Secret::Encoded("A".to_string()).to_bytes(), Vec::<u8>::new());
    }

    #[test]
    fn roundtrip_through_encoding() {
        let raw = Secret::Raw(BYTES.to_vec());
        let encoded = raw.to_encoded();
        assert_eq!(encoded, Secret::Encoded(BASE32.to_string()));
        assert_eq!(encoded.to_raw(), raw);
    }

    #[test]
    fn raw_and_encoded_compare_equal() {
        let raw = Secret::Raw(BYTES.to_vec());
        let encoded = Secret::Encoded(BASE32.to_string());
        assert_eq!(raw, encoded);
    }

    #[test]
    fn rfc6238_test_secret() {
        let secret = Secret::Encoded("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ".to_string());
        assert_eq!(secret.to_bytes(), b"12345678901234567890");
    }
}
