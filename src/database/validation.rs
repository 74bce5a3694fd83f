//! Field-level validation helpers shared by the entity validators.
//!
//! Every helper fails with a [`DomainError::Validation`] carrying the caller's
//! message, so entity validators read as a fail-fast list of checks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DomainError;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern compiles"));

/// Non-blank after trimming whitespace
pub fn required(value: &str, message: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(message));
    }
    Ok(())
}

/// At most `max` characters (not bytes)
pub fn max_chars(value: &str, max: usize, message: &str) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(message));
    }
    Ok(())
}

pub fn no_markup(value: &str, message: &str) -> Result<(), DomainError> {
    if value.contains('<') || value.contains('>') {
        return Err(DomainError::validation(message));
    }
    Ok(())
}

pub fn non_negative(value: i32, message: &str) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::validation(message));
    }
    Ok(())
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

/// Accepts a bare `local@domain` address or a display form `Name <local@domain>`.
pub fn is_valid_email(input: &str) -> bool {
    let input = input.trim();
    let address = match (input.find('<'), input.ends_with('>')) {
        (Some(open), true) => &input[open + 1..input.len() - 1],
        (None, false) => input,
        _ => return false,
    };
    is_valid_addr_spec(address)
}

fn is_valid_addr_spec(address: &str) -> bool {
    let Some((local, domain)) = address.rsplit_once('@') else {
        return false;
    };
    is_dot_atom(local) && is_dot_atom(domain)
}

// RFC 5322 dot-atom: atext runs separated by single dots
fn is_dot_atom(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('.')
            .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c) || (!c.is_ascii() && !c.is_whitespace())
}
