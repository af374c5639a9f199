//! Shared building blocks for the HTML document generators.
//!
//! Every user-supplied value reaches the markup through [`escape_html`],
//! either directly or via [`field`] / [`date_field`].

use bigdecimal::{BigDecimal, RoundingMode, Signed};
use chrono::{Datelike, NaiveDate};

/// Script appended to receipts so the browser opens the print dialog.
pub const PRINT_ON_LOAD: &str =
    "<script>window.onload = function () { window.print(); };</script>";

const GROUP_SEPARATOR: char = '\u{a0}';

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Underscore run standing in for an empty field on a printed form.
pub fn blank(width: usize) -> String {
    "_".repeat(width)
}

/// Escaped value, or a `width`-long blank when the value is empty.
pub fn field(value: &str, width: usize) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        blank(width)
    } else {
        escape_html(trimmed)
    }
}

pub fn field_opt(value: Option<&str>, width: usize) -> String {
    field(value.unwrap_or_default(), width)
}

pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// `2026-10-19` → `19.10.2026`. Other non-empty text is kept as typed.
pub fn date_field(value: &str, width: usize) -> String {
    match parse_iso_date(value) {
        Some(date) => date.format("%d.%m.%Y").to_string(),
        None => field(value, width),
    }
}

/// `«19» октября 2026 г.`, the header form used on contracts.
pub fn long_date(value: &str) -> String {
    match parse_iso_date(value) {
        Some(date) => format!(
            "«{:02}» {} {} г.",
            date.day(),
            MONTHS_GENITIVE[date.month0() as usize],
            date.year()
        ),
        None if value.trim().is_empty() => format!("«{}» {} 20{} г.", blank(3), blank(12), blank(3)),
        None => escape_html(value.trim()),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3 * 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(c);
    }
    out
}

/// Russian number grouping with up to two fraction digits: `1 234,5`.
pub fn format_amount(amount: &BigDecimal) -> String {
    let rounded = amount.with_scale_round(2, RoundingMode::HalfUp);
    let sign = if rounded.is_negative() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{},{}", sign, group_thousands(int_part), frac_part)
    }
}

/// [`format_amount`] followed by the ruble sign.
pub fn format_rub(amount: &BigDecimal) -> String {
    format!("{} ₽", format_amount(amount))
}

/// Complete standalone page.
pub fn page(title: &str, style: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ru\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        style,
        body
    )
}
