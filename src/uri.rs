//! Parsing and rendering of `otpauth://totp/...` provisioning URIs.
//!
//! Grammar: `otpauth://totp/[<issuer>:]<account>?secret=<base32>&...`.
//! The scheme and the `totp` host are matched case-sensitively, per the
//! de-facto standard. The path label is split on its first colon; when no
//! issuer is present there, the `issuer` query parameter is used, and
//! failing that the literal `"Unknown"`. `secret` is required and kept as
//! an opaque base32 string (decoding is lenient and happens at generation
//! time). Non-numeric `digits`/`period` values fail the parse rather than
//! falling back to defaults.

use std::str::FromStr;

use url::{Host, Url};

use crate::{clock, Algorithm, Entry, UriError, DEFAULT_DIGITS};

impl Entry {
    /// Parse a provisioning URI into an entry with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a typed [`UriError`] for every structural violation: wrong
    /// scheme or host, missing `secret`, unknown algorithm, unparsable
    /// numbers, colons in labels. Malformed user text never panics.
    pub fn from_uri<S: AsRef<str>>(uri: S) -> Result<Entry, UriError> {
        let url = Url::parse(uri.as_ref()).map_err(UriError::Url)?;
        if url.scheme() != "otpauth" {
            return Err(UriError::Scheme(url.scheme().to_string()));
        }
        if url.host() != Some(Host::Domain("totp")) {
            return Err(UriError::Host(
                url.host().map(|h| h.to_string()).unwrap_or_default(),
            ));
        }

        let mut algorithm = Algorithm::SHA1;
        let mut digits = DEFAULT_DIGITS;
        let mut period = clock::DEFAULT_PERIOD;
        let mut secret = String::new();
        let mut path_issuer: Option<String> = None;
        let mut param_issuer: Option<String> = None;

        let path = url.path().trim_start_matches('/');
        let account_name = match path.split_once(':') {
            Some((issuer_part, account_part)) => {
                path_issuer = Some(
                    urlencoding::decode(issuer_part)
                        .map_err(|_| UriError::IssuerDecoding(issuer_part.to_string()))?
                        .to_string(),
                );
                account_part.trim_start_matches(':').to_owned()
            }
            None => path.to_owned(),
        };
        let account_name = urlencoding::decode(&account_name)
            .map_err(|_| UriError::AccountNameDecoding(account_name.to_string()))?
            .to_string();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "algorithm" => algorithm = Algorithm::from_str(value.as_ref())?,
                "digits" => {
                    digits = value
                        .parse::<usize>()
                        .map_err(|_| UriError::Digits(value.to_string()))?;
                }
                "period" => {
                    period = value
                        .parse::<u64>()
                        .map_err(|_| UriError::Period(value.to_string()))?;
                }
                "secret" => secret = value.to_string(),
                "issuer" => param_issuer = Some(value.to_string()),
                _ => {}
            }
        }

        if secret.is_empty() {
            return Err(UriError::MissingSecret);
        }

        let issuer = match (path_issuer, param_issuer) {
            (Some(from_path), Some(from_param)) => {
                if from_path != from_param {
                    return Err(UriError::IssuerMismatch(from_path, from_param));
                }
                from_path
            }
            (Some(from_path), None) => from_path,
            (None, Some(from_param)) => from_param,
            (None, None) => "Unknown".to_string(),
        };

        Entry::new(issuer, account_name, secret, algorithm, digits, period)
    }

    /// Render the provisioning URI for this entry, with issuer and account
    /// name percent-encoded and the secret in canonical base32.
    pub fn to_uri(&self) -> String {
        let account_name = urlencoding::encode(&self.account_name).to_string();
        let mut label = format!("{}?", account_name);
        if !self.issuer.is_empty() {
            let issuer = urlencoding::encode(&self.issuer).to_string();
            label = format!("{0}:{1}?issuer={0}&", issuer, account_name);
        }

        format!(
            "otpauth://totp/{}secret={}&digits={}&algorithm={}&period={}",
            label,
            self.secret_base32(),
            self.digits,
            self.algorithm,
            self.period,
        )
    }
}
