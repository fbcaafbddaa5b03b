//! Price extraction: ordered currency patterns, then a period table.

use std::sync::LazyLock;

use regex::Regex;
use rentifier_common::PricePeriod;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceExtraction {
    pub amount: i64,
    pub currency: String,
    pub period: Option<PricePeriod>,
    pub confidence: f32,
}

/// Ordered currency patterns. ILS first — the reference marketplace is
/// Israeli and a bare `5,500 ₪` is the dominant form.
static CURRENCY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "ILS",
            Regex::new(r#"([\d][\d,]{2,8})\s*(?:₪|ש"ח|שח|שקלים|שקל)"#).unwrap(),
        ),
        (
            "ILS",
            Regex::new(r#"(?:₪|ש"ח)\s*([\d][\d,]{2,8})"#).unwrap(),
        ),
        ("USD", Regex::new(r"\$\s*([\d][\d,]{2,8})").unwrap()),
        ("USD", Regex::new(r"([\d][\d,]{2,8})\s*\$").unwrap()),
        ("EUR", Regex::new(r"€\s*([\d][\d,]{2,8})").unwrap()),
        ("EUR", Regex::new(r"([\d][\d,]{2,8})\s*€").unwrap()),
    ]
});

/// Period keyword table, matched case-insensitively on the raw text.
const PERIOD_KEYWORDS: &[(PricePeriod, &[&str])] = &[
    (
        PricePeriod::Monthly,
        &["לחודש", "בחודש", "per month", "/month", "monthly"],
    ),
    (
        PricePeriod::Weekly,
        &["לשבוע", "בשבוע", "per week", "weekly"],
    ),
    (
        PricePeriod::Daily,
        &["ללילה", "ליום", "per night", "per day", "daily"],
    ),
];

/// Extract the first price found by the ordered pattern table.
/// An explicit period boosts confidence from 0.7 to 0.9.
pub fn extract_price(text: &str) -> Option<PriceExtraction> {
    for (currency, pattern) in CURRENCY_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let raw = caps.get(1)?.as_str().replace(',', "");
        let amount: i64 = match raw.parse() {
            Ok(n) if n > 0 => n,
            _ => continue,
        };
        let period = detect_period(text);
        let confidence = if period.is_some() { 0.9 } else { 0.7 };
        return Some(PriceExtraction {
            amount,
            currency: (*currency).to_string(),
            period,
            confidence,
        });
    }
    None
}

fn detect_period(text: &str) -> Option<PricePeriod> {
    let lower = text.to_lowercase();
    for (period, keywords) in PERIOD_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return Some(*period);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shekel_symbol_after_amount() {
        let price = extract_price("דירת 3 חדרים, 5,500 ₪").unwrap();
        assert_eq!(price.amount, 5500);
        assert_eq!(price.currency, "ILS");
        assert_eq!(price.period, None);
        assert!((price.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn shekel_word_form() {
        let price = extract_price("שכירות 4200 שח לחודש").unwrap();
        assert_eq!(price.amount, 4200);
        assert_eq!(price.currency, "ILS");
        assert_eq!(price.period, Some(PricePeriod::Monthly));
        assert!((price.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn shekel_symbol_before_amount() {
        let price = extract_price("מחיר: ₪ 6,000").unwrap();
        assert_eq!(price.amount, 6000);
        assert_eq!(price.currency, "ILS");
    }

    #[test]
    fn usd_dollar_sign() {
        let price = extract_price("asking $1,800 per month").unwrap();
        assert_eq!(price.amount, 1800);
        assert_eq!(price.currency, "USD");
        assert_eq!(price.period, Some(PricePeriod::Monthly));
    }

    #[test]
    fn eur_sign() {
        let price = extract_price("€950 monthly").unwrap();
        assert_eq!(price.amount, 950);
        assert_eq!(price.currency, "EUR");
    }

    #[test]
    fn ils_wins_over_usd_by_order() {
        // Both currencies present: the ILS table entry is checked first.
        let price = extract_price("5,000 ₪ (about $1,350)").unwrap();
        assert_eq!(price.currency, "ILS");
        assert_eq!(price.amount, 5000);
    }

    #[test]
    fn daily_period_hebrew() {
        let price = extract_price("צימר 450 ₪ ללילה").unwrap();
        assert_eq!(price.period, Some(PricePeriod::Daily));
        assert!((price.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn no_price_in_plain_text() {
        assert!(extract_price("דירה מקסימה ליד הים").is_none());
    }

    #[test]
    fn short_numbers_are_not_prices() {
        // Amounts under three digits are noise, not rent.
        assert!(extract_price("קומה 3, ללא מעלית").is_none());
        assert!(extract_price("עמלה 50 ₪").is_none());
    }
}
