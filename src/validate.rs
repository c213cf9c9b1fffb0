//! Form checks that run before anything is sent to the backend. Messages are user-facing and
//! written in Indonesian.

use crate::error::{typed, ErrorType};
use crate::model::Amount;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern")
});

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+62|62|0)[0-9]{9,12}$").expect("phone pattern")
});

/// Fails when `value` is empty or whitespace.
pub fn required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(typed(ErrorType::Validation, format!("{field} wajib diisi")));
    }
    Ok(())
}

pub fn positive_amount(amount: Amount) -> Result<()> {
    if !amount.is_positive() {
        return Err(typed(ErrorType::Validation, "Jumlah harus lebih dari 0"));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<()> {
    required(value, "Email")?;
    if !EMAIL.is_match(value.trim()) {
        return Err(typed(ErrorType::Validation, "Format email tidak valid"));
    }
    Ok(())
}

/// Indonesian phone numbers: `+62`, `62` or `0` followed by 9 to 12 digits. Spaces are ignored.
pub fn phone(value: &str) -> Result<()> {
    required(value, "Nomor kontak")?;
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if !PHONE.is_match(&compact) {
        return Err(typed(
            ErrorType::Validation,
            "Format nomor kontak tidak valid (contoh: 081234567890)",
        ));
    }
    Ok(())
}

pub fn password_confirmation(password: &str, confirmation: &str) -> Result<()> {
    required(password, "Password")?;
    if password != confirmation {
        return Err(typed(ErrorType::Validation, "Konfirmasi password tidak cocok"));
    }
    Ok(())
}
