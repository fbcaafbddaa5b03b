//! Filter evaluation. Dimensions are ANDed; a dimension with no constraint
//! passes trivially. Pure — same listing and filter always agree.

use rentifier_common::types::{Filter, Listing};

pub fn matches(listing: &Listing, filter: &Filter) -> bool {
    in_range(listing.price.map(|p| p as f64), filter.min_price.map(|p| p as f64), filter.max_price.map(|p| p as f64))
        && in_range(listing.bedrooms, filter.min_bedrooms, filter.max_bedrooms)
        && member_of(listing.city.as_deref(), &filter.cities)
        && member_of(listing.neighborhood.as_deref(), &filter.neighborhoods)
        && keyword_hit(listing, &filter.keywords)
        && filter.must_have_tags.iter().all(|t| listing.has_tag(t))
        && !filter.exclude_tags.iter().any(|t| listing.has_tag(t))
}

/// Closed interval with optional bounds. A missing listing value fails as
/// soon as either bound is set.
fn in_range(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
}

/// Membership in a canonical-name list, case-sensitive. An empty list is
/// no constraint; a missing listing value fails a non-empty list.
fn member_of(value: Option<&str>, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match value {
        Some(v) => allowed.iter().any(|a| a == v),
        None => false,
    }
}

/// OR over keywords, case-insensitive substring of title or description.
fn keyword_hit(listing: &Listing, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let haystack = format!(
        "{} {}",
        listing.title,
        listing.description.as_deref().unwrap_or("")
    )
    .to_lowercase();
    keywords.iter().any(|k| haystack.contains(&k.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{listing_with, ListingSpec};
    use uuid::Uuid;

    fn base_listing() -> Listing {
        listing_with(ListingSpec {
            price: Some(5000),
            bedrooms: Some(3.0),
            city: Some("תל אביב"),
            tags: &["parking"],
            ..Default::default()
        })
    }

    fn base_filter() -> Filter {
        Filter {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "center".to_string(),
            enabled: true,
            created_at: chrono::Utc::now(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches(&base_listing(), &base_filter()));
    }

    #[test]
    fn full_match_across_dimensions() {
        let filter = Filter {
            min_price: Some(4000),
            max_price: Some(6000),
            cities: vec!["תל אביב".to_string()],
            must_have_tags: vec!["parking".to_string()],
            exclude_tags: vec!["ground_floor".to_string()],
            ..base_filter()
        };
        assert!(matches(&base_listing(), &filter));
    }

    #[test]
    fn wrong_city_fails() {
        let filter = Filter {
            min_price: Some(4000),
            max_price: Some(6000),
            cities: vec!["חיפה".to_string()],
            must_have_tags: vec!["parking".to_string()],
            ..base_filter()
        };
        assert!(!matches(&base_listing(), &filter));
    }

    #[test]
    fn missing_price_fails_bounded_filter() {
        let listing = listing_with(ListingSpec {
            price: None,
            ..Default::default()
        });
        let filter = Filter {
            min_price: Some(3000),
            ..base_filter()
        };
        assert!(!matches(&listing, &filter));
    }

    #[test]
    fn missing_price_passes_unbounded_filter() {
        let listing = listing_with(ListingSpec {
            price: None,
            ..Default::default()
        });
        assert!(matches(&listing, &base_filter()));
    }

    #[test]
    fn bedroom_bounds_are_closed() {
        let filter = Filter {
            min_bedrooms: Some(3.0),
            max_bedrooms: Some(3.0),
            ..base_filter()
        };
        assert!(matches(&base_listing(), &filter));

        let too_small = Filter {
            min_bedrooms: Some(3.5),
            ..base_filter()
        };
        assert!(!matches(&base_listing(), &too_small));
    }

    #[test]
    fn empty_cities_list_passes_trivially() {
        let listing = listing_with(ListingSpec {
            city: None,
            ..Default::default()
        });
        assert!(matches(&listing, &base_filter()));
    }

    #[test]
    fn missing_city_fails_city_list() {
        let listing = listing_with(ListingSpec {
            city: None,
            ..Default::default()
        });
        let filter = Filter {
            cities: vec!["תל אביב".to_string()],
            ..base_filter()
        };
        assert!(!matches(&listing, &filter));
    }

    #[test]
    fn keywords_are_or_and_case_insensitive() {
        let listing = listing_with(ListingSpec {
            title: "Sunny flat near Dizengoff",
            ..Default::default()
        });
        let filter = Filter {
            keywords: vec!["balcony".to_string(), "dizengoff".to_string()],
            ..base_filter()
        };
        assert!(matches(&listing, &filter));
    }

    #[test]
    fn must_have_tags_are_and() {
        let filter = Filter {
            must_have_tags: vec!["parking".to_string(), "balcony".to_string()],
            ..base_filter()
        };
        assert!(!matches(&base_listing(), &filter), "missing balcony tag");
    }

    #[test]
    fn exclude_tags_reject() {
        let listing = listing_with(ListingSpec {
            tags: &["parking", "ground_floor"],
            ..Default::default()
        });
        let filter = Filter {
            exclude_tags: vec!["ground_floor".to_string()],
            ..base_filter()
        };
        assert!(!matches(&listing, &filter));
    }

    #[test]
    fn empty_tag_set_passes_exclusions() {
        let listing = listing_with(ListingSpec::default());
        let filter = Filter {
            exclude_tags: vec!["ground_floor".to_string()],
            ..base_filter()
        };
        assert!(matches(&listing, &filter));
    }

    /// Weakening any single matching constraint keeps the match.
    #[test]
    fn weakening_a_constraint_preserves_match() {
        let listing = base_listing();
        let strict = Filter {
            min_price: Some(4000),
            max_price: Some(6000),
            min_bedrooms: Some(2.0),
            max_bedrooms: Some(4.0),
            cities: vec!["תל אביב".to_string()],
            must_have_tags: vec!["parking".to_string()],
            exclude_tags: vec!["ground_floor".to_string()],
            ..base_filter()
        };
        assert!(matches(&listing, &strict));

        let weakened: Vec<Filter> = vec![
            Filter { min_price: None, ..strict.clone() },
            Filter { max_price: None, ..strict.clone() },
            Filter { min_bedrooms: None, ..strict.clone() },
            Filter { max_bedrooms: None, ..strict.clone() },
            Filter { cities: vec![], ..strict.clone() },
            Filter { must_have_tags: vec![], ..strict.clone() },
            Filter { exclude_tags: vec![], ..strict.clone() },
        ];
        for (i, filter) in weakened.iter().enumerate() {
            assert!(matches(&listing, filter), "weakened dimension {i}");
        }
    }
}
