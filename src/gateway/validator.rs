//! Field validators.
//!
//! Pure, total predicates over untrusted strings. Invalid input yields
//! `false`, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").unwrap());

static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").unwrap());

/// Symbols allowed in passwords besides ASCII alphanumerics.
const PASSWORD_SYMBOLS: &str = "@$!%*#?&";

/// Check whether a string is a plausibly shaped email address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Check whether a string is a valid username: 3-20 word characters.
pub fn is_valid_username(username: &str) -> bool {
    USERNAME.is_match(username)
}

/// Check whether a string is an acceptable password: at least 8 characters,
/// at least one letter and one digit, drawn only from ASCII alphanumerics
/// and `@$!%*#?&`.
pub fn is_valid_password(password: &str) -> bool {
    password.len() >= 8
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c))
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Check whether a filename is free of traversal material.
///
/// The cheap lexical gate in front of canonicalization: any `..` or `/`
/// anywhere in the name is rejected.
pub fn is_valid_filename(filename: &str) -> bool {
    !filename.is_empty() && !filename.contains("..") && !filename.contains('/')
}
