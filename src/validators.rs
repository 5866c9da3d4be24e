//! Pure predicates used to check contact answers and to evaluate conditions.
//!
//! Document numbers follow the Brazilian registries: document A is the 11-digit
//! individual taxpayer number (CPF) and document B the 14-digit company number (CNPJ).
//! Both accept the usual `.`, `-`, `/` and space separators.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;
use tracing::{debug, warn};

const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// What to do when a user-authored pattern does not compile.
///
/// | Call site                              | Policy       |
/// |----------------------------------------|--------------|
/// | Question answer validation             | `FailOpen`   |
/// | Conditional `regex` operator           | `FailClosed` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegexPolicy {
    /// Treat the answer as valid so a broken pattern cannot block a live flow.
    FailOpen,
    /// Treat the match as false so a broken pattern cannot steer routing.
    FailClosed,
}

/// Compiles `pattern` for this call only and matches it against `text`.
pub fn regex_matches(pattern: &str, text: &str, policy: RegexPolicy) -> bool {
    match RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
    {
        Ok(re) => re.is_match(text),
        Err(e) => match policy {
            RegexPolicy::FailOpen => {
                warn!(pattern, error = %e, "Validation regex does not compile, accepting answer");
                true
            }
            RegexPolicy::FailClosed => {
                debug!(pattern, error = %e, "Condition regex does not compile, evaluating to false");
                false
            }
        },
    }
}

/// Extracts the digits of a formatted document number, rejecting foreign characters.
fn document_digits(input: &str) -> Option<Vec<u32>> {
    let mut digits = Vec::with_capacity(14);
    for c in input.trim().chars() {
        match c {
            '0'..='9' => digits.push(c as u32 - '0' as u32),
            '.' | '-' | '/' | ' ' => {}
            _ => return None,
        }
    }
    Some(digits)
}

fn all_identical(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Validates an 11-digit individual document number (CPF) by its two check digits.
pub fn is_valid_document_a(input: &str) -> bool {
    let Some(digits) = document_digits(input) else {
        return false;
    };
    if digits.len() != 11 || all_identical(&digits) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 { 0 } else { rest }
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// Validates a 14-digit company document number (CNPJ) by its two check digits.
pub fn is_valid_document_b(input: &str) -> bool {
    const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let Some(digits) = document_digits(input) else {
        return false;
    };
    if digits.len() != 14 || all_identical(&digits) {
        return false;
    }

    let check = |weights: &[u32]| -> u32 {
        let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
        let rest = sum % 11;
        if rest < 2 { 0 } else { 11 - rest }
    };

    check(&FIRST_WEIGHTS) == digits[12] && check(&SECOND_WEIGHTS) == digits[13]
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is a valid regex")
    })
}

pub fn is_valid_email(input: &str) -> bool {
    email_pattern().is_match(input.trim())
}

/// Accepts 10 to 13 digits once common phone formatting is removed.
pub fn is_valid_phone(input: &str) -> bool {
    let trimmed = input.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut count = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => count += 1,
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return false,
        }
    }
    (10..=13).contains(&count)
}

/// Parses a number, accepting a decimal comma as well as a decimal point.
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let parsed = match trimmed.parse::<f64>() {
        Ok(n) => n,
        Err(_) if trimmed.matches(',').count() == 1 && !trimmed.contains('.') => {
            trimmed.replace(',', ".").parse().ok()?
        }
        Err(_) => return None,
    };
    parsed.is_finite().then_some(parsed)
}

pub fn is_valid_number(input: &str) -> bool {
    parse_number(input).is_some()
}
