//! Client-side validation rules.
//!
//! These run before any remote call; a draft that fails here never reaches
//! the backend.

use crate::constants::{LAST4_LEN, MAX_AGE, MAX_PHOTOS, MIN_AGE, MIN_PHOTOS};

pub const AGE_MESSAGE: &str = "Please enter a valid age between 18 and 120";
pub const DISPLAY_NAME_MESSAGE: &str = "Please enter your name";
pub const PHOTOS_MESSAGE: &str = "Please select at least one photo";

/// Parse and range-check an age typed as text.
pub fn parse_age(text: &str) -> Result<u32, &'static str> {
    let age: u32 = text.trim().parse().map_err(|_| AGE_MESSAGE)?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(AGE_MESSAGE);
    }
    Ok(age)
}

pub fn validate_display_name(name: &str) -> Result<&str, &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DISPLAY_NAME_MESSAGE);
    }
    Ok(trimmed)
}

pub fn validate_photo_count(count: usize) -> Result<(), &'static str> {
    if !(MIN_PHOTOS..=MAX_PHOTOS).contains(&count) {
        return Err(PHOTOS_MESSAGE);
    }
    Ok(())
}

/// Strip non-digits from typed input and cap it at four characters.
pub fn sanitize_last4(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(LAST4_LEN)
        .collect()
}

pub fn is_valid_last4(value: &str) -> bool {
    value.len() == LAST4_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

/// `MM/YYYY`
pub fn format_expiry(month: u8, year: i32) -> String {
    format!("{month:02}/{year}")
}

/// Split a stored `MM/YYYY` expiry back into month and year.
pub fn split_expiry(expiry: &str) -> Option<(u8, i32)> {
    let (month, year) = expiry.split_once('/')?;
    let month: u8 = month.trim().parse().ok()?;
    let year: i32 = year.trim().parse().ok()?;
    (1..=12).contains(&month).then_some((month, year))
}

/// Up to two upper-cased initials from the first letters of the name's words.
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}
