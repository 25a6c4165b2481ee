//! TOTP code generation per [rfc-6238](https://tools.ietf.org/html/rfc6238)
//! paired with a collection game: every generated code can be tested against
//! an ordered pattern catalog, interesting codes are recorded in a durable
//! collection ledger, and achievements unlock as the collection grows.
//!
//! Entries are created by parsing standard `otpauth://totp/...` provisioning
//! URIs and carry everything generation needs: the base32 secret, digest
//! algorithm, digit count and step period. Persistence goes through an
//! injected [`KeyValueStore`] handle, so hosts decide where state lives and
//! tests run against isolated in-memory stores.
//!
//! # Examples
//!
//! Generate a code for a provisioned entry:
//!
//! ```rust
//! use totp_codex::Entry;
//!
//! let entry = Entry::from_uri(
//!     "otpauth://totp/Example:alice@example.com?secret=JBSWY3DPEHPK3PXP&issuer=Example",
//! ).unwrap();
//! let code = entry.generate(1_700_000_000);
//! assert_eq!(code.len(), 6);
//! ```
//!
//! Record a special code and watch achievements unlock:
//!
//! ```rust
//! use totp_codex::{Ledger, MemoryStore, Rarity};
//!
//! let mut ledger = Ledger::open(MemoryStore::new());
//! let recorded = ledger.record("123456").clone();
//! assert_eq!(recorded.rarity, Rarity::Legendary);
//! assert!(ledger
//!     .achievements()
//!     .iter()
//!     .any(|a| a.id == "ultimate-sequence" && a.unlocked));
//! ```

mod achievements;
pub mod clock;
mod collection;
mod entries;
mod rules;
mod secret;
mod store;
mod uri;
mod url_error;

pub use achievements::{Achievement, AchievementSpec, Condition, CATALOG};
pub use collection::{CollectedSequence, CollectionStats, Ledger};
pub use entries::EntryList;
pub use rules::{classify, is_special, Pattern, Rarity, Rule, RULES};
pub use secret::Secret;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use url_error::UriError;

use constant_time_eq::constant_time_eq;
use hmac::Mac;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};
use uuid::Uuid;

use core::fmt;

type HmacSha1 = hmac::Hmac<sha1::Sha1>;
type HmacSha256 = hmac::Hmac<sha2::Sha256>;
type HmacSha512 = hmac::Hmac<sha2::Sha512>;

/// Number of digits in a generated code when the URI does not say otherwise.
pub const DEFAULT_DIGITS: usize = 6;

/// Steps of clock skew tolerated either side when checking a token.
const CHECK_SKEW: u64 = 1;

/// HMAC digest declared by an entry, as per the
/// [reference implementation](https://tools.ietf.org/html/rfc6238#appendix-A).
///
/// The declared algorithm is the one generation actually uses; an entry
/// provisioned as `SHA256` will not silently fall back to `SHA1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    SHA1,
    SHA256,
    SHA512,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::SHA1
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::SHA1 => f.write_str("SHA1"),
            Algorithm::SHA256 => f.write_str("SHA256"),
            Algorithm::SHA512 => f.write_str("SHA512"),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHA1" => Ok(Algorithm::SHA1),
            "SHA256" => Ok(Algorithm::SHA256),
            "SHA512" => Ok(Algorithm::SHA512),
            _ => Err(UriError::Algorithm(s.to_string())),
        }
    }
}

impl Algorithm {
    fn hash<D>(mut digest: D, data: &[u8]) -> Vec<u8>
    where
        D: Mac,
    {
        digest.update(data);
        digest.finalize().into_bytes().to_vec()
    }

    fn sign(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::SHA1 => Algorithm::hash(HmacSha1::new_from_slice(key).unwrap(), data),
            Algorithm::SHA256 => Algorithm::hash(HmacSha256::new_from_slice(key).unwrap(), data),
            Algorithm::SHA512 => Algorithm::hash(HmacSha512::new_from_slice(key).unwrap(), data),
        }
    }
}

fn system_time() -> Result<u64, SystemTimeError> {
    let t = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    Ok(t)
}

fn default_digits() -> usize {
    DEFAULT_DIGITS
}

fn default_period() -> u64 {
    clock::DEFAULT_PERIOD
}

/// A provisioned account: everything needed to generate codes for it.
///
/// Created by [`Entry::from_uri`] and immutable afterwards; the owning list
/// ([`EntryList`]) round-trips it through JSON under camelCase field names.
/// The [secret](Entry::secret) is sensitive data, treat it accordingly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Opaque unique identifier, minted at parse time.
    pub id: Uuid,
    /// The "Github" part of "Github:alice@example.com". Must not contain a
    /// colon.
    pub issuer: String,
    /// The "alice@example.com" part. Must not contain a colon.
    pub account_name: String,
    /// Base32 encoded secret, kept encoded at rest and decoded leniently at
    /// generation time.
    pub secret: String,
    /// Digest the code is computed with.
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Number of digits in a generated code, 6 to 8 per
    /// [rfc-4226](https://tools.ietf.org/html/rfc4226#section-5.3).
    #[serde(default = "default_digits")]
    pub digits: usize,
    /// Step duration in seconds.
    #[serde(default = "default_period")]
    pub period: u64,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "digits: {}; period: {}; alg: {}; issuer: <{}>({})",
            self.digits, self.period, self.algorithm, self.issuer, self.account_name
        )
    }
}

impl Entry {
    /// Create an entry with a freshly minted id.
    ///
    /// # Errors
    ///
    /// Fails when `digits` leaves the 6..=8 range or issuer/account name
    /// contain a colon, which would corrupt the provisioning label.
    pub fn new(
        issuer: String,
        account_name: String,
        secret: String,
        algorithm: Algorithm,
        digits: usize,
        period: u64,
    ) -> Result<Entry, UriError> {
        if !(6..=8).contains(&digits) {
            return Err(UriError::DigitsRange(digits));
        }
        if issuer.contains(':') {
            return Err(UriError::Issuer(issuer));
        }
        if account_name.contains(':') {
            return Err(UriError::AccountName(account_name));
        }
        Ok(Entry {
            id: Uuid::new_v4(),
            issuer,
            account_name,
            secret,
            algorithm,
            digits,
            period,
        })
    }

    /// Decoded secret bytes, via the lenient base32 policy of [`Secret`].
    pub fn secret_bytes(&self) -> Vec<u8> {
        Secret::Encoded(self.secret.clone()).to_bytes()
    }

    /// HMAC over the big-endian counter derived from `time`.
    pub fn sign(&self, time: u64) -> Vec<u8> {
        self.algorithm.sign(
            &self.secret_bytes(),
            clock::counter(time, self.period).to_be_bytes().as_ref(),
        )
    }

    /// Generate the code for the step containing `time`: dynamic truncation
    /// of the HMAC, reduced modulo `10^digits` and left-padded with zeroes.
    pub fn generate(&self, time: u64) -> String {
        let mac = self.sign(time);
        let offset = (mac.last().unwrap() & 0x0f) as usize;
        let value = u32::from_be_bytes(mac[offset..offset + 4].try_into().unwrap()) & 0x7fff_ffff;
        format!(
            "{1:00$}",
            self.digits,
            value % 10_u32.pow(self.digits as u32)
        )
    }

    /// Generate a code from the current system time.
    pub fn generate_current(&self) -> Result<String, SystemTimeError> {
        let t = system_time()?;
        Ok(self.generate(t))
    }

    /// Whether `token` is valid at `time`, tolerating one step of skew
    /// either side.
    pub fn check(&self, token: &str, time: u64) -> bool {
        let period = clock::effective_period(self.period);
        let basestep = clock::counter(time, period).saturating_sub(CHECK_SKEW);
        for i in 0..=CHECK_SKEW * 2 {
            let step_time = (basestep + i) * period;
            if constant_time_eq(self.generate(step_time).as_bytes(), token.as_bytes()) {
                return true;
            }
        }
        false
    }

    /// Whether `token` is valid right now.
    pub fn check_current(&self, token: &str) -> Result<bool, SystemTimeError> {
        let t = system_time()?;
        Ok(self.check(token, t))
    }

    /// Seconds the current code remains valid.
    pub fn ttl(&self) -> Result<u64, SystemTimeError> {
        let t = system_time()?;
        Ok(clock::seconds_remaining(t, self.period))
    }

    /// Fraction of the current step already elapsed, for countdown
    /// rendering.
    pub fn progress(&self) -> Result<f64, SystemTimeError> {
        let t = system_time()?;
        Ok(clock::progress(t, self.period))
    }

    /// Canonical (uppercase, unpadded) base32 form of the secret.
    pub fn secret_base32(&self) -> String {
        match Secret::Encoded(self.secret.clone()).to_encoded() {
            Secret::Encoded(s) => s,
            Secret::Raw(_) => unreachable!(),
        }
    }
}
