//! Field-level text cleaning and fallback extraction
//!
//! Listing sites render the same text with arbitrary whitespace, duplicated
//! amount tokens, and loosely-formatted dates. Everything extracted from a
//! detail page passes through here before landing in a record.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Collapses all whitespace runs to single spaces and trims the ends
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A single currency amount token, e.g. `$80,000`, `$95k`, `$38.50`
static AMOUNT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?[kK]?$").expect("amount pattern is valid")
});

/// First currency amount anywhere in a text
static FIRST_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?[kK]?").expect("amount pattern is valid")
});

/// Extracts a salary string from a cleaned description
///
/// Used as a fallback when the detail page has no explicit salary field.
/// Starting at the first currency amount, consecutive amount tokens, range
/// separators, and a trailing period qualifier ("per annum", "p.a.", "/hr")
/// are collected; exact duplicate amount tokens are dropped, since sites
/// frequently render the same figure twice in adjacent markup.
pub fn salary_from_description(description: &str) -> Option<String> {
    let start = FIRST_AMOUNT.find(description)?.start();

    let mut seen_amounts: Vec<&str> = Vec::new();
    let mut collected: Vec<&str> = Vec::new();
    let mut tokens = description[start..].split_whitespace().peekable();

    while let Some(&token) = tokens.peek() {
        let trimmed = token.trim_end_matches(['.', ',', ';', ')']);

        if AMOUNT_TOKEN.is_match(trimmed) {
            tokens.next();
            if seen_amounts.contains(&trimmed) {
                continue;
            }
            seen_amounts.push(trimmed);
            collected.push(trimmed);
        } else if is_range_separator(token) {
            tokens.next();
            // Keep the separator only when another amount actually follows.
            let followed = tokens
                .peek()
                .map(|next| AMOUNT_TOKEN.is_match(next.trim_end_matches(['.', ',', ';', ')'])))
                .unwrap_or(false);
            if followed {
                collected.push(token);
            } else {
                break;
            }
        } else if token.eq_ignore_ascii_case("per") {
            tokens.next();
            match tokens.peek() {
                Some(&qualifier) if is_period_word(qualifier) => {
                    collected.push("per");
                    collected.push(qualifier.trim_end_matches(['.', ',', ';']));
                }
                _ => {}
            }
            break;
        } else if is_standalone_qualifier(trimmed) {
            collected.push(trimmed);
            break;
        } else {
            break;
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join(" "))
    }
}

fn is_range_separator(token: &str) -> bool {
    matches!(token, "-" | "–" | "—") || token.eq_ignore_ascii_case("to")
}

fn is_period_word(token: &str) -> bool {
    let word = token.trim_end_matches(['.', ',', ';']);
    ["annum", "year", "hour", "week", "day"]
        .iter()
        .any(|known| word.eq_ignore_ascii_case(known))
}

fn is_standalone_qualifier(token: &str) -> bool {
    ["p.a", "pa", "/hr", "/hour", "/yr", "/year"]
        .iter()
        .any(|known| token.eq_ignore_ascii_case(known))
}

/// Normalizes a scraped listing date to ISO `YYYY-MM-DD` where possible
///
/// Sites render dates as "Listed 4 Aug 2026", "04/08/2026", or already in
/// ISO form. Unrecognized text is kept cleaned rather than dropped, since a
/// raw date is still more useful downstream than none.
pub fn normalize_listed_date(raw: &str) -> Option<String> {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return None;
    }

    let text = cleaned
        .strip_prefix("Listed on ")
        .or_else(|| cleaned.strip_prefix("Listed "))
        .unwrap_or(&cleaned);

    const FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%d %B %Y", "%d/%m/%Y"];
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    Some(cleaned)
}
