//! Indian mobile phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains characters other than digits and separators.
    #[error("phone number contains an invalid character: {0}")]
    InvalidCharacter(char),
    /// The number is not a 10-digit Indian mobile number.
    #[error("phone number must be a 10-digit mobile number")]
    InvalidLength,
    /// Indian mobile numbers start with 6-9.
    #[error("mobile numbers must start with 6, 7, 8, or 9")]
    InvalidPrefix,
}

/// A normalized Indian mobile phone number.
///
/// Accepts the forms customers actually type - with spaces or dashes, with a
/// leading `0`, or with a `+91`/`91` country prefix - and stores the bare
/// 10-digit national number. OTP delivery and customer lookup on the backend
/// key off this normalized form.
///
/// ## Examples
///
/// ```
/// use farmferry_core::Phone;
///
/// let phone = Phone::parse("+91 98765 43210").unwrap();
/// assert_eq!(phone.as_str(), "9876543210");
/// assert_eq!(Phone::parse("098765-43210").unwrap(), phone);
///
/// assert!(Phone::parse("12345").is_err());      // too short
/// assert!(Phone::parse("5876543210").is_err()); // bad leading digit
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from a string, normalizing separators and prefixes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits/spaces/dashes/a leading `+`, or does not normalize to a
    /// 10-digit number starting with 6-9.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let mut digits = String::with_capacity(12);
        for (i, c) in trimmed.chars().enumerate() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '(' | ')' => {}
                '+' if i == 0 => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        // Strip country code or trunk prefix down to the national number
        let national = if digits.len() == 12 && digits.starts_with("91") {
            digits.get(2..).unwrap_or("")
        } else if digits.len() == 11 && digits.starts_with('0') {
            digits.get(1..).unwrap_or("")
        } else {
            digits.as_str()
        };

        if national.len() != 10 {
            return Err(PhoneError::InvalidLength);
        }

        if !matches!(national.chars().next(), Some('6'..='9')) {
            return Err(PhoneError::InvalidPrefix);
        }

        Ok(Self(national.to_owned()))
    }

    /// Returns the normalized 10-digit number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the number in E.164 form with the Indian country code.
    #[must_use]
    pub fn to_e164(&self) -> String {
        format!("+91{}", self.0)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Phone {
    type Error = PhoneError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_number() {
        let phone = Phone::parse("9876543210").expect("valid phone");
        assert_eq!(phone.as_str(), "9876543210");
        assert_eq!(phone.to_e164(), "+919876543210");
    }

    #[test]
    fn test_parse_with_country_code() {
        assert_eq!(
            Phone::parse("+91 98765 43210").expect("valid phone").as_str(),
            "9876543210"
        );
        assert_eq!(
            Phone::parse("919876543210").expect("valid phone").as_str(),
            "9876543210"
        );
    }

    #[test]
    fn test_parse_with_trunk_zero() {
        assert_eq!(
            Phone::parse("09876543210").expect("valid phone").as_str(),
            "9876543210"
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
        assert!(matches!(
            Phone::parse("98765abcde"),
            Err(PhoneError::InvalidCharacter('a'))
        ));
        assert!(matches!(
            Phone::parse("12345"),
            Err(PhoneError::InvalidLength)
        ));
        assert!(matches!(
            Phone::parse("5876543210"),
            Err(PhoneError::InvalidPrefix)
        ));
    }

    #[test]
    fn test_serde_transparent() {
        let phone = Phone::parse("9876543210").expect("valid phone");
        let json = serde_json::to_string(&phone).expect("serialize");
        assert_eq!(json, "\"9876543210\"");
    }
}
