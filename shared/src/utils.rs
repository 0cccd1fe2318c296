//! Utility functions and helpers

use uuid::Uuid;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Sanitize text input
pub fn sanitize_text(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Number formatting for display values
pub mod format {
    /// Inserts `,` every three digits of the integer part of a numeric string.
    ///
    /// A leading sign and any fractional suffix (`.` and everything after it)
    /// are kept as-is. Inputs whose integer part is not purely ASCII digits are
    /// returned unchanged.
    pub fn group_thousands(input: &str) -> String {
        let (sign, unsigned) = match input.as_bytes().first() {
            Some(b'-') | Some(b'+') => input.split_at(1),
            _ => ("", input),
        };

        let (integer, fraction) = match unsigned.find('.') {
            Some(dot) => unsigned.split_at(dot),
            None => (unsigned, ""),
        };

        if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
            return input.to_string();
        }

        let digits = integer.len();
        let mut grouped = String::with_capacity(input.len() + digits / 3);
        grouped.push_str(sign);
        for (i, ch) in integer.chars().enumerate() {
            if i > 0 && (digits - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        grouped.push_str(fraction);
        grouped
    }

    /// Grouped rendering of any displayable number.
    pub fn format_count<T: std::fmt::Display>(value: T) -> String {
        group_thousands(&value.to_string())
    }
}

/// Validation utilities
pub mod validation {
    use crate::{error::AppError, Result};

    pub const MIN_DEFAULT_BALANCE: i64 = 0;
    pub const MAX_DEFAULT_BALANCE: i64 = 1_000_000;

    /// Bounds check for the `default-upvotes` setting.
    pub fn validate_default_balance(value: i64) -> Result<i64> {
        if value < MIN_DEFAULT_BALANCE {
            return Err(AppError::validation("Users should have more than 0 $UPV."));
        }
        if value > MAX_DEFAULT_BALANCE {
            return Err(AppError::validation("Users should have less than 1,000,000 $UPV."));
        }
        Ok(value)
    }

    /// Reddit usernames: ASCII letters, digits, `_` and `-`.
    pub fn is_valid_username(username: &str) -> bool {
        !username.is_empty()
            && username.len() <= 64
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    /// Subreddit names: ASCII letters, digits and `_`, at most 21 characters.
    pub fn is_valid_community_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= 21
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Trims a community name typed by a user and drops a leading `r/` or
    /// `/r/` in either case.
    pub fn normalize_community_name(raw: &str) -> String {
        let trimmed = raw.trim();
        let unrooted = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let without_prefix = match unrooted.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("r/") => &unrooted[2..],
            _ => trimmed,
        };
        without_prefix.trim_end_matches('/').to_string()
    }
}
