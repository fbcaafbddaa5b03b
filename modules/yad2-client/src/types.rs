//! Wire types for the legacy feed-search endpoint, kept tolerant: every
//! field the connector doesn't strictly need is defaulted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub data: SearchData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchData {
    pub feed: Feed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub feed_items: Vec<FeedItem>,
    #[serde(default)]
    pub total_pages: Option<i32>,
    #[serde(default)]
    pub current_page: Option<i32>,
}

/// One classified ad as the feed returns it. `price` is a display string
/// ("5,500 ₪"), `floor` is a display string ("3", "קרקע").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(default)]
    pub ad_number: Option<i64>,
    #[serde(default)]
    pub title_1: Option<String>,
    #[serde(default)]
    pub title_2: Option<String>,
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub rooms: Option<f64>,
    #[serde(default)]
    pub square_meters: Option<f64>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub link_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl FeedItem {
    /// Public item page, when the feed handed us a link token.
    pub fn item_url(&self) -> Option<String> {
        self.link_token
            .as_deref()
            .map(|token| format!("https://www.yad2.co.il/item/{token}"))
    }

    /// The stable marketplace-side identity of this ad.
    pub fn order_id(&self) -> String {
        match self.ad_number {
            Some(n) => n.to_string(),
            None => self.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": {
            "feed": {
                "feed_items": [
                    {
                        "id": "abc123",
                        "ad_number": 99001122,
                        "title_1": "רוטשילד 12",
                        "title_2": "דירה להשכרה",
                        "price": "6,200 ₪",
                        "rooms": 3.5,
                        "square_meters": 82,
                        "floor": "קרקע",
                        "city": "תל אביב",
                        "neighborhood": "לב העיר",
                        "street": "רוטשילד",
                        "house_number": "12",
                        "property_type": "דירה",
                        "condition": "משופץ",
                        "coordinates": {"latitude": 32.063, "longitude": 34.774},
                        "images": ["https://img.yad2.co.il/Pic/1.jpg"],
                        "date_added": "2026-07-30 09:15:00",
                        "link_token": "abc123"
                    },
                    {"id": "sparse"}
                ],
                "total_pages": 4,
                "current_page": 1
            }
        }
    }"#;

    #[test]
    fn deserializes_full_and_sparse_items() {
        let resp: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let items = &resp.data.feed.feed_items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].rooms, Some(3.5));
        assert_eq!(items[0].coordinates.unwrap().latitude, 32.063);
        assert_eq!(items[1].price, None);
        assert!(items[1].images.is_empty());
    }

    #[test]
    fn order_id_prefers_ad_number() {
        let resp: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(resp.data.feed.feed_items[0].order_id(), "99001122");
        assert_eq!(resp.data.feed.feed_items[1].order_id(), "sparse");
    }

    #[test]
    fn item_url_from_link_token() {
        let resp: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(
            resp.data.feed.feed_items[0].item_url().unwrap(),
            "https://www.yad2.co.il/item/abc123"
        );
        assert_eq!(resp.data.feed.feed_items[1].item_url(), None);
    }
}
