//! Room-count extraction. Hebrew listings count rooms, not bedrooms, and
//! half rooms are common ("3.5 חדרים").

use std::sync::LazyLock;

use regex::Regex;

static ROOM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(\d{1,2}(?:\.\d)?)\s*(?:חדרים|חדרי|חד')").unwrap(),
        Regex::new(r"(?i)(\d{1,2}(?:\.\d)?)\s*(?:rooms?|bedrooms?|br\b)").unwrap(),
    ]
});

static STUDIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)סטודיו|studio").unwrap());

/// Extract a room count. Studio apartments count as 0.
pub fn extract_rooms(text: &str) -> Option<f64> {
    for pattern in ROOM_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Ok(rooms) = caps[1].parse::<f64>() {
                return Some(rooms);
            }
        }
    }
    if STUDIO.is_match(text) {
        return Some(0.0);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hebrew_rooms() {
        assert_eq!(extract_rooms("דירת 3 חדרים בפלורנטין"), Some(3.0));
    }

    #[test]
    fn half_rooms() {
        assert_eq!(extract_rooms("2.5 חדרים משופצת"), Some(2.5));
    }

    #[test]
    fn abbreviated_hebrew() {
        assert_eq!(extract_rooms("4 חד' עם מרפסת"), Some(4.0));
    }

    #[test]
    fn english_bedrooms() {
        assert_eq!(extract_rooms("spacious 2 bedroom flat"), Some(2.0));
        assert_eq!(extract_rooms("3br near the beach"), Some(3.0));
    }

    #[test]
    fn studio_is_zero() {
        assert_eq!(extract_rooms("סטודיו מרוהט בלב העיר"), Some(0.0));
        assert_eq!(extract_rooms("cozy Studio with balcony"), Some(0.0));
    }

    #[test]
    fn explicit_count_beats_studio_mention() {
        // "2 rooms, used to be a studio" — the number wins.
        assert_eq!(extract_rooms("2 חדרים, לשעבר סטודיו"), Some(2.0));
    }

    #[test]
    fn no_rooms_mentioned() {
        assert_eq!(extract_rooms("חניה כפולה ומחסן"), None);
    }
}
