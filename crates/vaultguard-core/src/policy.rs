//! Presentation-layer input rules.
//!
//! The session core only rejects empty fields. Front ends check these rules
//! before registering an account, so users get every problem at once instead
//! of a bare server rejection.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::Credentials;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 12;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// A violated input rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyViolation {
    InvalidEmail,
    TooShort,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSymbol,
}

impl PolicyViolation {
    /// User-facing message for the violation.
    pub fn message(&self) -> &'static str {
        match self {
            PolicyViolation::InvalidEmail => "Invalid email address",
            PolicyViolation::TooShort => "Password must be at least 12 characters",
            PolicyViolation::MissingUppercase => "Include an uppercase letter",
            PolicyViolation::MissingLowercase => "Include a lowercase letter",
            PolicyViolation::MissingDigit => "Include a number",
            PolicyViolation::MissingSymbol => "Include a special character",
        }
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Returns true if `email` looks like a deliverable address.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Which password rules are met, and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub length: bool,
    pub upper: bool,
    pub lower: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl PasswordStrength {
    pub const MAX_SCORE: u8 = 5;

    pub fn evaluate(password: &str) -> Self {
        Self {
            length: password.chars().count() >= MIN_PASSWORD_LENGTH,
            upper: password.chars().any(|c| c.is_ascii_uppercase()),
            lower: password.chars().any(|c| c.is_ascii_lowercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
            // Anything outside [A-Za-z0-9] counts, including non-ASCII.
            symbol: password.chars().any(|c| !c.is_ascii_alphanumeric()),
        }
    }

    /// Number of rules met, from 0 to [`PasswordStrength::MAX_SCORE`].
    pub fn score(&self) -> u8 {
        [self.length, self.upper, self.lower, self.digit, self.symbol]
            .iter()
            .filter(|met| **met)
            .count() as u8
    }

    pub fn is_acceptable(&self) -> bool {
        self.score() == Self::MAX_SCORE
    }

    /// The rules not met, in display order.
    pub fn violations(&self) -> Vec<PolicyViolation> {
        [
            (self.length, PolicyViolation::TooShort),
            (self.upper, PolicyViolation::MissingUppercase),
            (self.lower, PolicyViolation::MissingLowercase),
            (self.digit, PolicyViolation::MissingDigit),
            (self.symbol, PolicyViolation::MissingSymbol),
        ]
        .into_iter()
        .filter(|(met, _)| !met)
        .map(|(_, violation)| violation)
        .collect()
    }
}

/// Check registration input against every rule.
///
/// # Errors
///
/// Returns all violated rules, email first.
pub fn validate_registration(credentials: &Credentials) -> Result<(), Vec<PolicyViolation>> {
    let mut violations = Vec::new();
    if !validate_email(credentials.email()) {
        violations.push(PolicyViolation::InvalidEmail);
    }
    violations.extend(PasswordStrength::evaluate(credentials.password()).violations());

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
