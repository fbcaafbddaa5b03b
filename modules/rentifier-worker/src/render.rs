//! Message rendering for chat delivery (HTML parse mode).

use rentifier_common::types::Listing;

/// Build the notification body: bold title, price, rooms, address with a
/// map link, and the listing URL. Also used as the photo caption.
pub fn render_message(listing: &Listing) -> String {
    let mut lines = vec![format!("<b>{}</b>", escape_html(&listing.title))];

    if let Some(price) = listing.price {
        let currency = listing.currency.as_deref().unwrap_or("ILS");
        lines.push(format!("💰 {} {}", format_price(price), currency_symbol(currency)));
    }
    if let Some(rooms) = listing.bedrooms {
        lines.push(format!("🛏 {} חדרים", format_rooms(rooms)));
    }
    if let Some(address) = address_line(listing) {
        match map_url(listing) {
            Some(url) => lines.push(format!(
                "📍 <a href=\"{url}\">{}</a>",
                escape_html(&address)
            )),
            None => lines.push(format!("📍 {}", escape_html(&address))),
        }
    }
    lines.push(format!("🔗 {}", listing.url));

    lines.join("\n")
}

/// "5000" → "5,000".
pub fn format_price(price: i64) -> String {
    let digits = price.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if price < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Half rooms keep one decimal, whole rooms drop it.
fn format_rooms(rooms: f64) -> String {
    if rooms.fract() == 0.0 {
        format!("{}", rooms as i64)
    } else {
        format!("{rooms:.1}")
    }
}

fn currency_symbol(currency: &str) -> &str {
    match currency {
        "ILS" => "₪",
        "USD" => "$",
        "EUR" => "€",
        other => other,
    }
}

fn address_line(listing: &Listing) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(street) = &listing.street {
        match &listing.house_number {
            Some(number) => parts.push(format!("{street} {number}")),
            None => parts.push(street.clone()),
        }
    }
    if let Some(neighborhood) = &listing.neighborhood {
        parts.push(neighborhood.clone());
    }
    if let Some(city) = &listing.city {
        parts.push(city.clone());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Google Maps query URL for the listing's address, when there is one.
fn map_url(listing: &Listing) -> Option<String> {
    let address = address_line(listing)?;
    Some(format!(
        "https://maps.google.com/?q={}",
        urlencode(&address)
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn urlencode(text: &str) -> String {
    let mut out = String::new();
    for byte in text.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(*byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{listing_with, ListingSpec};

    #[test]
    fn price_thousands_separator() {
        assert_eq!(format_price(500), "500");
        assert_eq!(format_price(5000), "5,000");
        assert_eq!(format_price(1234567), "1,234,567");
    }

    #[test]
    fn rooms_formatting() {
        assert_eq!(format_rooms(3.0), "3");
        assert_eq!(format_rooms(2.5), "2.5");
    }

    #[test]
    fn message_contains_all_blocks() {
        let listing = listing_with(ListingSpec {
            title: "דירה בלב העיר",
            price: Some(5500),
            bedrooms: Some(3.5),
            city: Some("תל אביב"),
            street: Some("רוטשילד"),
            house_number: Some("12"),
            ..Default::default()
        });
        let message = render_message(&listing);

        assert!(message.contains("<b>דירה בלב העיר</b>"));
        assert!(message.contains("5,500 ₪"));
        assert!(message.contains("3.5 חדרים"));
        assert!(message.contains("maps.google.com"));
        assert!(message.contains(&listing.url));
    }

    #[test]
    fn title_html_is_escaped() {
        let listing = listing_with(ListingSpec {
            title: "2 rooms <br> & more",
            ..Default::default()
        });
        let message = render_message(&listing);
        assert!(message.contains("2 rooms &lt;br&gt; &amp; more"));
    }

    #[test]
    fn no_address_no_map_link() {
        let listing = listing_with(ListingSpec::default());
        let message = render_message(&listing);
        assert!(!message.contains("maps.google.com"));
    }

    #[test]
    fn map_url_is_percent_encoded() {
        let listing = listing_with(ListingSpec {
            city: Some("תל אביב"),
            street: Some("רוטשילד"),
            house_number: Some("12"),
            ..Default::default()
        });
        let url = map_url(&listing).unwrap();
        assert!(url.starts_with("https://maps.google.com/?q="));
        assert!(!url.contains(' '));
        assert!(url.contains('%'));
    }
}
