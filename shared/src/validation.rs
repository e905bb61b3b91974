//! Input validation and sanitisation
//!
//! Everything here runs before any backend call, so a rejected input never
//! reaches the identity provider or the store.

use rust_decimal::Decimal;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::order::money::{MAX_PRICE, round_money};

// ── Length limits ───────────────────────────────────────────────────

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MIN_RESTAURANT_NAME_LEN: usize = 2;
pub const MAX_RESTAURANT_NAME_LEN: usize = 100;

/// Menu item names and category labels
pub const MAX_ITEM_NAME_LEN: usize = 100;

/// Menu descriptions, restaurant description
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Table identifiers
pub const MAX_TABLE_LEN: usize = 32;

/// Decline reasons
pub const MAX_REASON_LEN: usize = 500;

// ── Sanitisation ────────────────────────────────────────────────────

/// Trim and strip markup-ish fragments: `<`, `>`, `javascript:` and
/// `on<word>=` handler prefixes (case-insensitive).
pub fn sanitize_string(input: &str) -> String {
    let stripped: String = input.trim().chars().filter(|c| *c != '<' && *c != '>').collect();
    let without_js = remove_ascii_case_insensitive(&stripped, "javascript:");
    strip_event_handlers(&without_js)
}

fn remove_ascii_case_insensitive(input: &str, needle: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    while let Some(pos) = lower[cursor..].find(needle) {
        out.push_str(&input[cursor..cursor + pos]);
        cursor += pos + needle.len();
    }
    out.push_str(&input[cursor..]);
    out
}

/// Drop every `on` + word characters + `=` run.
fn strip_event_handlers(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut copied_to = 0;
    while i + 1 < bytes.len() {
        if bytes[i].eq_ignore_ascii_case(&b'o') && bytes[i + 1].eq_ignore_ascii_case(&b'n') {
            let mut j = i + 2;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            if j > i + 2 && j < bytes.len() && bytes[j] == b'=' {
                out.push_str(&input[copied_to..i]);
                i = j + 1;
                copied_to = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&input[copied_to..]);
    out
}

// ── Field validators ────────────────────────────────────────────────

/// Returns the sanitised, lowercased address.
pub fn validate_email(email: &str) -> AppResult<String> {
    let sanitized = sanitize_string(email).to_lowercase();
    if sanitized.len() > MAX_EMAIL_LEN || !looks_like_email(&sanitized) {
        return Err(AppError::new(ErrorCode::InvalidEmail).with_detail("field", "email"));
    }
    Ok(sanitized)
}

/// `local@domain.tld` with no whitespace and no second `@`
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Every failed rule is reported in the `errors` detail.
pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    let mut errors: Vec<String> = Vec::new();
    if len < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number".into());
    }
    if len > MAX_PASSWORD_LEN {
        errors.push(format!(
            "Password must be less than {MAX_PASSWORD_LEN} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::with_message(ErrorCode::WeakPassword, errors.join(" "))
            .with_detail("errors", errors))
    }
}

/// Returns the sanitised name.
pub fn validate_restaurant_name(name: &str) -> AppResult<String> {
    let sanitized = sanitize_string(name);
    let len = sanitized.chars().count();
    let mut errors: Vec<String> = Vec::new();
    if len < MIN_RESTAURANT_NAME_LEN {
        errors.push(format!(
            "Restaurant name must be at least {MIN_RESTAURANT_NAME_LEN} characters"
        ));
    }
    if len > MAX_RESTAURANT_NAME_LEN {
        errors.push(format!(
            "Restaurant name must be less than {MAX_RESTAURANT_NAME_LEN} characters"
        ));
    }
    if len > 0 && !sanitized.chars().all(is_name_char) {
        errors.push("Restaurant name contains invalid characters".into());
    }

    if errors.is_empty() {
        Ok(sanitized)
    } else {
        Err(
            AppError::with_message(ErrorCode::InvalidRestaurantName, errors.join(" "))
                .with_detail("errors", errors),
        )
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || "-'&.,()".contains(c)
}

/// Non-negative, at most 10000, at most two decimal places.
pub fn validate_price(price: Decimal) -> AppResult<()> {
    let mut errors: Vec<&str> = Vec::new();
    if price.is_sign_negative() && !price.is_zero() {
        errors.push("Price cannot be negative");
    }
    if price > MAX_PRICE {
        errors.push("Price seems unreasonably high");
    }
    if round_money(price) != price {
        errors.push("Price can only have up to 2 decimal places");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::with_message(ErrorCode::InvalidPrice, errors.join(" "))
            .with_detail("errors", errors))
    }
}

/// Non-empty after trimming and within `max_len` characters.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        )
        .with_detail("field", field));
    }
    validate_max_len(value, field, max_len)
}

/// If present, within `max_len` characters.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    match value {
        Some(v) => validate_max_len(v, field, max_len),
        None => Ok(()),
    }
}

fn validate_max_len(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_detail("field", field));
    }
    Ok(())
}
