//! Indonesian display formatting for money and dates.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Formats a value as whole rupiah with `.` as the thousands separator, e.g. `1.000.000`.
/// Fractions are rounded half away from zero. No currency symbol is added.
pub fn currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    match rounded.to_i64() {
        Some(n) if n.unsigned_abs() <= F64_EXACT => {
            format_num::format_num!(",.0", n as f64).replace(',', ".")
        }
        _ => {
            let grouped = group_thousands(&rounded.abs().trunc().to_string());
            if rounded.is_sign_negative() {
                format!("-{grouped}")
            } else {
                grouped
            }
        }
    }
}

/// Integers up to 2^53 survive the trip through `f64` unchanged.
const F64_EXACT: u64 = 1 << 53;

/// Inserts `.` between groups of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Like [`currency`] with the `Rp ` prefix. Negative values put the sign before the prefix.
pub fn rupiah(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-Rp {}", currency(rounded.abs()))
    } else {
        format!("Rp {}", currency(rounded.abs()))
    }
}

/// `DD/MM/YYYY`, or an empty string when there is no date.
pub fn date_dmy(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// Day and Indonesian month name, e.g. `15 Januari`. Empty when there is no date.
pub fn day_month(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{} {}", d.day(), month_name(d.month())),
        None => String::new(),
    }
}

/// The Indonesian name of a 1-based month. Out of range months give an empty string.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_currency_grouping() {
        assert_eq!(currency(dec("1000000")), "1.000.000");
        assert_eq!(currency(dec("999")), "999");
        assert_eq!(currency(dec("0")), "0");
        assert_eq!(currency(dec("-25000")), "-25.000");
    }

    #[test]
    fn test_currency_beyond_f64_precision() {
        assert_eq!(
            currency(Decimal::from(12_345_678_901_234_567i64)),
            "12.345.678.901.234.567"
        );
        assert_eq!(
            currency(dec("-9007199254740993")),
            "-9.007.199.254.740.993"
        );
        assert_eq!(currency(dec("9007199254740992")), "9.007.199.254.740.992");
        assert_eq!(
            rupiah(Decimal::MAX),
            "Rp 79.228.162.514.264.337.593.543.950.335"
        );
    }

    #[test]
    fn test_currency_rounds_half_away_from_zero() {
        assert_eq!(currency(dec("1499.5")), "1.500");
        assert_eq!(currency(dec("1499.49")), "1.499");
        assert_eq!(currency(dec("-0.5")), "-1");
    }

    #[test]
    fn test_rupiah() {
        assert_eq!(rupiah(dec("2500000")), "Rp 2.500.000");
        assert_eq!(rupiah(dec("-7500")), "-Rp 7.500");
        assert_eq!(rupiah(dec("-0.2")), "Rp 0");
    }

    #[test]
    fn test_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(date_dmy(d), "15/01/2024");
        assert_eq!(day_month(d), "15 Januari");
        assert_eq!(date_dmy(None), "");
        assert_eq!(day_month(None), "");
    }

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(12), "Desember");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
    }
}
