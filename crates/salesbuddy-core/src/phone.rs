//! Mobile number format rules for the OTP step.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Allowed national-number lengths (inclusive) per country calling code.
const LENGTH_RULES: &[(&str, usize, usize)] = &[
  ("+1", 10, 10),
  ("+44", 10, 11),
  ("+91", 10, 10),
  ("+86", 11, 11),
  ("+49", 10, 12),
  ("+33", 9, 10),
  ("+81", 10, 11),
  ("+61", 9, 9),
];

/// Bounds for country codes without a specific rule.
const DEFAULT_LENGTH: (usize, usize) = (7, 15);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileNumber {
  pub country_code:  String,
  pub mobile_number: String,
}

impl MobileNumber {
  pub fn new(country_code: &str, mobile_number: &str) -> Self {
    Self {
      country_code:  country_code.into(),
      mobile_number: mobile_number.into(),
    }
  }

  /// The national number with every non-digit removed.
  pub fn digits(&self) -> String {
    self
      .mobile_number
      .chars()
      .filter(char::is_ascii_digit)
      .collect()
  }

  /// `<country_code><digits>`, the form handed to collaborators.
  pub fn formatted(&self) -> String {
    format!("{}{}", self.country_code.trim(), self.digits())
  }

  pub fn validate(&self) -> Result<()> {
    let len = self.digits().len();
    let (min, max) = LENGTH_RULES
      .iter()
      .find(|(code, ..)| *code == self.country_code.trim())
      .map_or(DEFAULT_LENGTH, |&(_, min, max)| (min, max));
    if !(min..=max).contains(&len) {
      return Err(Error::InvalidPhone(
        "invalid phone number format for the selected country".into(),
      ));
    }
    Ok(())
  }
}

/// One-time codes are exactly six ASCII digits.
pub fn validate_otp(code: &str) -> Result<()> {
  let code = code.trim();
  if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
    return Err(Error::InvalidOtp);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn us_numbers_need_ten_digits() {
    assert!(MobileNumber::new("+1", "(415) 555-0100").validate().is_ok());
    assert!(MobileNumber::new("+1", "415-555-010").validate().is_err());
  }

  #[test]
  fn ranges_per_country() {
    assert!(MobileNumber::new("+44", "07700 900123").validate().is_ok());
    assert!(MobileNumber::new("+61", "412345678").validate().is_ok());
    assert!(MobileNumber::new("+61", "0412345678").validate().is_err());
    assert!(MobileNumber::new("+33", "612345678").validate().is_ok());
  }

  #[test]
  fn unknown_country_uses_default_bounds() {
    assert!(MobileNumber::new("+999", "1234567").validate().is_ok());
    assert!(MobileNumber::new("+999", "123456").validate().is_err());
    assert!(MobileNumber::new("+999", "1234567890123456").validate().is_err());
  }

  #[test]
  fn formatted_strips_punctuation() {
    let number = MobileNumber::new("+91", "98765 43210");
    assert_eq!(number.formatted(), "+919876543210");
  }

  #[test]
  fn otp_shape() {
    assert!(validate_otp("123456").is_ok());
    assert!(validate_otp("12345").is_err());
    assert!(validate_otp("12a456").is_err());
  }
}
