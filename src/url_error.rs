use url::ParseError;

/// Why a provisioning URI (or entry construction) was rejected.
///
/// Every malformed user-supplied URI maps to one of these values; parsing
/// never panics.
#[derive(Debug, Eq, PartialEq)]
pub enum UriError {
    /// The string is not a URI at all.
    Url(ParseError),
    /// Scheme was not `otpauth`.
    Scheme(String),
    /// Host was not `totp`.
    Host(String),
    /// The required `secret` query parameter was absent or empty.
    MissingSecret,
    /// Unknown `algorithm` value.
    Algorithm(String),
    /// `digits` did not parse as a number.
    Digits(String),
    /// `digits` parsed but left the 6..=8 range.
    DigitsRange(usize),
    /// `period` did not parse as a number.
    Period(String),
    /// Issuer contains a colon.
    Issuer(String),
    /// Issuer was not valid percent-encoded text.
    IssuerDecoding(String),
    /// Issuer appears in both path and query with different values.
    IssuerMismatch(String, String),
    /// Account name contains a colon.
    AccountName(String),
    /// Account name was not valid percent-encoded text.
    AccountNameDecoding(String),
}

impl std::error::Error for UriError {}

impl std::fmt::Display for UriError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UriError::Url(e) => write!(f, "Error parsing URI: {}", e),
            UriError::Scheme(scheme) => {
                write!(f, "Scheme should be otpauth, not \"{}\"", scheme)
            }
            UriError::Host(host) => write!(f, "Host should be totp, not \"{}\"", host),
            UriError::MissingSecret => {
                write!(f, "The secret query parameter is required")
            }
            UriError::Algorithm(algo) => write!(
                f,
                "Algorithm can only be SHA1, SHA256 or SHA512, not \"{}\"",
                algo
            ),
            UriError::Digits(digits) => {
                write!(f, "Could not parse digits \"{}\" as a number", digits)
            }
            UriError::DigitsRange(digits) => write!(
                f,
                "Codes are 6 to 8 digits long; {} digits is not allowed",
                digits
            ),
            UriError::Period(period) => {
                write!(f, "Could not parse period \"{}\" as a number", period)
            }
            UriError::Issuer(issuer) => write!(
                f,
                "Issuer can't contain a colon. \"{}\" contains a colon",
                issuer
            ),
            UriError::IssuerDecoding(issuer) => {
                write!(f, "Couldn't URL decode \"{}\"", issuer)
            }
            UriError::IssuerMismatch(path_issuer, param_issuer) => write!(
                f,
                "The path carries issuer \"{}\" but the issuer query parameter says \"{}\"",
                path_issuer, param_issuer
            ),
            UriError::AccountName(name) => write!(
                f,
                "Account name can't contain a colon. \"{}\" contains a colon",
                name
            ),
            UriError::AccountNameDecoding(name) => {
                write!(f, "Couldn't URL decode \"{}\"", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UriError;

    #[test]
    fn scheme() {
        let error = UriError::Scheme("https".to_string());
        assert_eq!(
            error.to_string(),
            "Scheme should be otpauth, not \"https\""
        );
    }

    #[test]
    fn host() {
        let error = UriError::Host("hotp".to_string());
        assert_eq!(error.to_string(), "Host should be totp, not \"hotp\"");
    }

    #[test]
    fn missing_secret() {
        assert_eq!(
            UriError::MissingSecret.to_string(),
            "The secret query parameter is required"
        );
    }

    #[test]
    fn algorithm() {
        let error = UriError::Algorithm("MD5".to_string());
        assert_eq!(
            error.to_string(),
            "Algorithm can only be SHA1, SHA256 or SHA512, not \"MD5\""
        );
    }

    #[test]
    fn digits() {
        let error = UriError::Digits("six".to_string());
        assert_eq!(
            error.to_string(),
            "Could not parse digits \"six\" as a number"
        );
    }

    #[test]
    fn digits_range() {
        let error = UriError::DigitsRange(5);
        assert_eq!(
            error.to_string(),
            "Codes are 6 to 8 digits long; 5 digits is not allowed"
        );
    }

    #[test]
    fn issuer_mismatch() {
        let error = UriError::IssuerMismatch("Google".to_string(), "Github".to_string());
        assert_eq!(
            error.to_string(),
            "The path carries issuer \"Google\" but the issuer query parameter says \"Github\""
        );
    }

    #[test]
    fn url() {
        let error = UriError::Url(url::ParseError::EmptyHost);
        assert_eq!(error.to_string(), "Error parsing URI: empty host");
    }
}
