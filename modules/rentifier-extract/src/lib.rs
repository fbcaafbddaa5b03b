//! Rule-based enrichment for listing text. Pure and synchronous: the same
//! title + description always produce the same extraction.

pub mod location;
pub mod price;
pub mod rooms;
pub mod tags;

pub use location::{extract_location, normalize_city, LocationExtraction};
pub use price::{extract_price, PriceExtraction};
pub use rooms::extract_rooms;
pub use tags::extract_tags;

use serde::{Deserialize, Serialize};

/// Everything the rule tables could read out of a listing's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub price: Option<PriceExtraction>,
    pub rooms: Option<f64>,
    pub tags: Vec<String>,
    pub location: Option<LocationExtraction>,
    /// `min` of the price and location confidences over the signals that are
    /// present; 0 when both are absent. Rooms and tags don't contribute.
    pub overall_confidence: f32,
}

/// Run every rule table over `title + ' ' + description`.
pub fn extract_all(title: &str, description: &str) -> Extraction {
    let text = format!("{title} {description}");
    let price = extract_price(&text);
    let rooms = extract_rooms(&text);
    let tags = extract_tags(&text);
    let location = extract_location(&text);

    let confidences: Vec<f32> = [
        price.as_ref().map(|p| p.confidence),
        location.as_ref().map(|l| l.confidence),
    ]
    .into_iter()
    .flatten()
    .collect();
    let overall_confidence = confidences
        .into_iter()
        .fold(None::<f32>, |acc, c| Some(acc.map_or(c, |a| a.min(c))))
        .unwrap_or(0.0);

    Extraction {
        price,
        rooms,
        tags,
        location,
        overall_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentifier_common::PricePeriod;

    const LISTING: &str = "דירת 3.5 חדרים בפלורנטין תל אביב";
    const DETAILS: &str = "5,500 ₪ לחודש, מרוהטת, חניה בטאבו, כניסה מיידית";

    #[test]
    fn full_listing_extraction() {
        let extraction = extract_all(LISTING, DETAILS);

        let price = extraction.price.expect("price");
        assert_eq!(price.amount, 5500);
        assert_eq!(price.currency, "ILS");
        assert_eq!(price.period, Some(PricePeriod::Monthly));

        assert_eq!(extraction.rooms, Some(3.5));
        assert_eq!(
            extraction.tags,
            vec!["parking", "furnished", "immediate"]
        );

        let location = extraction.location.expect("location");
        assert_eq!(location.city, "תל אביב");
        assert_eq!(location.neighborhood.as_deref(), Some("פלורנטין"));

        // min(price 0.9, location 0.9)
        assert!((extraction.overall_confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn confidence_is_min_of_present_signals() {
        // Price without period (0.7), city without neighborhood (0.8).
        let extraction = extract_all("דירה בחולון", "שכירות 4,000 ₪");
        assert!((extraction.overall_confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn confidence_with_location_only() {
        let extraction = extract_all("דירה בנתניה", "");
        assert!((extraction.overall_confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn confidence_zero_when_no_signals() {
        let extraction = extract_all("מציאה אמיתית", "צרו קשר עוד היום");
        assert_eq!(extraction.overall_confidence, 0.0);
        assert!(extraction.price.is_none());
        assert!(extraction.location.is_none());
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = extract_all(LISTING, DETAILS);
        let b = extract_all(LISTING, DETAILS);
        assert_eq!(a, b);
    }
}
