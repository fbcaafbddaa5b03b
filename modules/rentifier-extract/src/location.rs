//! City and neighborhood extraction against a curated variant table.
//!
//! The canonical form is always the Hebrew name as the marketplaces spell
//! it; filters compare against canonical names case-sensitively.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationExtraction {
    pub city: String,
    pub neighborhood: Option<String>,
    pub confidence: f32,
}

struct CityEntry {
    canonical: &'static str,
    variants: &'static [&'static str],
    neighborhoods: &'static [&'static str],
}

/// Curated Hebrew + English variants per city. Variants are matched as
/// substrings of free text and as whole strings in `normalize_city`.
const CITIES: &[CityEntry] = &[
    CityEntry {
        canonical: "תל אביב",
        variants: &["תל אביב", "תל-אביב", "ת\"א", "תא יפו", "tel aviv", "tlv"],
        neighborhoods: &[
            "פלורנטין",
            "נווה צדק",
            "הצפון הישן",
            "הצפון החדש",
            "לב העיר",
            "כרם התימנים",
            "שפירא",
            "רמת אביב",
            "יפו",
        ],
    },
    CityEntry {
        canonical: "ירושלים",
        variants: &["ירושלים", "jerusalem"],
        neighborhoods: &["נחלאות", "רחביה", "קטמון", "בקעה", "טלביה", "גילה", "רמות"],
    },
    CityEntry {
        canonical: "חיפה",
        variants: &["חיפה", "haifa"],
        neighborhoods: &["הדר", "מרכז הכרמל", "נווה שאנן", "בת גלים", "אחוזה"],
    },
    CityEntry {
        canonical: "רמת גן",
        variants: &["רמת גן", "רמת-גן", "ramat gan"],
        neighborhoods: &["הבורסה", "מרום נווה", "תל בנימין"],
    },
    CityEntry {
        canonical: "גבעתיים",
        variants: &["גבעתיים", "givatayim"],
        neighborhoods: &["בורוכוב", "גבעת רמב\"ם"],
    },
    CityEntry {
        canonical: "באר שבע",
        variants: &["באר שבע", "באר-שבע", "beer sheva", "be'er sheva"],
        neighborhoods: &["העיר העתיקה", "רמות", "שכונה ד"],
    },
    CityEntry {
        canonical: "פתח תקווה",
        variants: &["פתח תקווה", "פתח-תקווה", "פ\"ת", "petah tikva"],
        neighborhoods: &["כפר גנים", "אם המושבות", "מרכז העיר"],
    },
    CityEntry {
        canonical: "ראשון לציון",
        variants: &["ראשון לציון", "ראשל\"צ", "rishon lezion"],
        neighborhoods: &["נחלת יהודה", "רמת אליהו"],
    },
    CityEntry {
        canonical: "הרצליה",
        variants: &["הרצליה", "herzliya"],
        neighborhoods: &["הרצליה פיתוח", "נוף ים"],
    },
    CityEntry {
        canonical: "בת ים",
        variants: &["בת ים", "בת-ים", "bat yam"],
        neighborhoods: &["רמת יוסף", "עמידר"],
    },
    CityEntry {
        canonical: "חולון",
        variants: &["חולון", "holon"],
        neighborhoods: &["קרית שרת", "נאות רחל"],
    },
    CityEntry {
        canonical: "נתניה",
        variants: &["נתניה", "netanya"],
        neighborhoods: &["עיר ימים", "מרכז העיר", "קרית השרון"],
    },
    CityEntry {
        canonical: "רעננה",
        variants: &["רעננה", "ra'anana", "raanana"],
        neighborhoods: &["לב הפארק", "קרית שרת"],
    },
    CityEntry {
        canonical: "כפר סבא",
        variants: &["כפר סבא", "כפר-סבא", "kfar saba"],
        neighborhoods: &["הירוקה", "מרכז העיר"],
    },
    CityEntry {
        canonical: "אשדוד",
        variants: &["אשדוד", "ashdod"],
        neighborhoods: &["הסיטי", "רובע יא"],
    },
];

/// Normalize a city string to its canonical Hebrew name.
///
/// Used by connectors on structured city fields as well as by free-text
/// extraction. Unknown cities return `None` and emit an `unknown_city`
/// event for operator review.
pub fn normalize_city(raw: &str) -> Option<&'static str> {
    let needle = raw.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    for entry in CITIES {
        if entry.variants.iter().any(|v| v.to_lowercase() == needle) {
            return Some(entry.canonical);
        }
    }
    tracing::debug!(city = %raw, "unknown_city");
    None
}

/// Scan free text for a known city, then for a neighborhood scoped to that
/// city. City alone scores 0.8; city + neighborhood scores 0.9.
pub fn extract_location(text: &str) -> Option<LocationExtraction> {
    let lower = text.to_lowercase();
    let entry = CITIES
        .iter()
        .find(|e| e.variants.iter().any(|v| lower.contains(&v.to_lowercase())))?;

    let neighborhood = entry
        .neighborhoods
        .iter()
        .find(|n| text.contains(*n))
        .map(|n| (*n).to_string());

    let confidence = if neighborhood.is_some() { 0.9 } else { 0.8 };
    Some(LocationExtraction {
        city: entry.canonical.to_string(),
        neighborhood,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_hebrew_variant() {
        assert_eq!(normalize_city("תל-אביב"), Some("תל אביב"));
        assert_eq!(normalize_city("ת\"א"), Some("תל אביב"));
    }

    #[test]
    fn normalize_english_variant() {
        assert_eq!(normalize_city("Tel Aviv"), Some("תל אביב"));
        assert_eq!(normalize_city("HAIFA"), Some("חיפה"));
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_city("  ירושלים "), Some("ירושלים"));
    }

    #[test]
    fn normalize_unknown_city_is_none() {
        assert_eq!(normalize_city("עטלף"), None);
        assert_eq!(normalize_city(""), None);
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["תל אביב", "ramat gan", "באר-שבע"] {
            let once = normalize_city(raw).unwrap();
            assert_eq!(normalize_city(once), Some(once));
        }
    }

    #[test]
    fn extract_city_only() {
        let loc = extract_location("דירה שקטה בחיפה ליד הים").unwrap();
        assert_eq!(loc.city, "חיפה");
        assert_eq!(loc.neighborhood, None);
        assert!((loc.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn extract_city_and_neighborhood() {
        let loc = extract_location("3 חדרים בפלורנטין תל אביב").unwrap();
        assert_eq!(loc.city, "תל אביב");
        assert_eq!(loc.neighborhood.as_deref(), Some("פלורנטין"));
        assert!((loc.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn neighborhood_scoped_to_matched_city() {
        // "רמות" exists in both ירושלים and באר שבע; the matched city wins.
        let loc = extract_location("דירה ברמות, באר שבע").unwrap();
        assert_eq!(loc.city, "באר שבע");
        assert_eq!(loc.neighborhood.as_deref(), Some("רמות"));
    }

    #[test]
    fn extract_no_city() {
        assert_eq!(extract_location("דירה מהממת ליד הפארק"), None);
    }
}
