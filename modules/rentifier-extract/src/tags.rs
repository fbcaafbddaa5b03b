//! Keyword → tag mapping. Multiple keywords per tag; the first hit adds the
//! tag, later keywords for the same tag are skipped.

/// Tag vocabulary shared with the filter matcher. Tags are stable slugs;
/// keywords cover both Hebrew and English listing styles.
const TAG_KEYWORDS: &[(&str, &[&str])] = &[
    ("parking", &["חניה", "חנייה", "parking"]),
    ("balcony", &["מרפסת", "balcony"]),
    (
        "pets",
        &["חיות מחמד", "בעלי חיים", "pet friendly", "pets allowed"],
    ),
    ("furnished", &["מרוהטת", "מרוהט", "ריהוט מלא", "furnished"]),
    (
        "immediate",
        &["כניסה מיידית", "פינוי מיידי", "immediate entry", "available now"],
    ),
    ("long_term", &["לטווח ארוך", "טווח ארוך", "long term"]),
    (
        "accessible",
        &["נגיש", "נגישות", "גישה לנכים", "wheelchair accessible"],
    ),
    (
        "air_conditioning",
        &["מזגן", "מיזוג", "air conditioning", "a/c"],
    ),
];

/// Collect every tag whose keyword list hits the text. Output order follows
/// the table, so results are deterministic.
pub fn extract_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tags = Vec::new();
    for (tag, keywords) in TAG_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            tags.push((*tag).to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hebrew_keywords() {
        let tags = extract_tags("דירה עם חניה ומרפסת שמש, מזגן בכל חדר");
        assert_eq!(tags, vec!["parking", "balcony", "air_conditioning"]);
    }

    #[test]
    fn english_keywords_case_insensitive() {
        let tags = extract_tags("Fully FURNISHED, Pets Allowed");
        assert_eq!(tags, vec!["pets", "furnished"]);
    }

    #[test]
    fn one_tag_per_concept() {
        // Two parking keywords still produce a single tag.
        let tags = extract_tags("חניה בטאבו, parking spot");
        assert_eq!(tags, vec!["parking"]);
    }

    #[test]
    fn empty_text_no_tags() {
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn table_order_is_stable() {
        let a = extract_tags("מרפסת וגם חניה");
        let b = extract_tags("חניה וגם מרפסת");
        assert_eq!(a, b);
        assert_eq!(a, vec!["parking", "balcony"]);
    }
}
