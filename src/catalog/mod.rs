//! Catalog filter and sort engine.
//!
//! Pure functions over an in-memory product sequence. Filtering is
//! conjunctive: each criterion is ANDed in, and an unset criterion is
//! skipped entirely. Sorting is stable, so re-sorting with the same key
//! never reorders elements that compare equal.

use serde::Deserialize;
use std::cmp::Ordering;

use crate::db::Product;

/// Client-declared filter state. All criteria optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    /// Free-text query, matched case-insensitively against name OR
    /// description. Plain substring matching, no ranking.
    pub query: Option<String>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_rating.is_none()
            && self.query.as_deref().map_or(true, str::is_empty)
    }

    fn matches(&self, product: &Product) -> bool {
        if let Some(ref category) = self.category {
            if product.category != *category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            if product.rating < min {
                return false;
            }
        }
        if let Some(ref query) = self.query {
            if !query.is_empty() {
                let query = query.to_lowercase();
                let in_name = product.name.to_lowercase().contains(&query);
                let in_description = product.description.to_lowercase().contains(&query);
                if !in_name && !in_description {
                    return false;
                }
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Price,
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Apply the filter to a product sequence, preserving input order.
/// An all-unset filter returns the input unchanged.
pub fn apply_filter(products: &[Product], filter: &ProductFilter) -> Vec<Product> {
    products
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

/// Sort in place by one key. Stable: ties keep their input order, so
/// sorting twice with the same key is a no-op.
pub fn sort_products(products: &mut [Product], key: SortKey, direction: SortDirection) {
    products.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a.name.cmp(&b.name),
            // Prices and ratings are finite, NaN never enters the store
            SortKey::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
            SortKey::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, description: &str, category: &str, price: f64, rating: f64) -> Product {
        Product {
            id: format!("id-{}", name),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            price,
            rating,
            image: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("Kettle", "Electric kettle for tea", "home", 24.99, 4.2),
            product("Mixer", "Stand mixer", "kitchen", 149.00, 4.8),
            product("Lamp", "Desk lamp with USB port", "home", 18.50, 3.9),
            product("Teapot", "Ceramic TEA pot", "kitchen", 24.99, 4.2),
        ]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let products = sample();
        let filtered = apply_filter(&products, &ProductFilter::default());
        assert_eq!(names(&filtered), names(&products));
    }

    #[test]
    fn test_category_exact_match() {
        let filtered = apply_filter(
            &sample(),
            &ProductFilter {
                category: Some("home".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(names(&filtered), vec!["Kettle", "Lamp"]);
    }

    #[test]
    fn test_price_bounds_each_side_optional() {
        let products = sample();

        let min_only = apply_filter(
            &products,
            &ProductFilter {
                min_price: Some(24.99),
                ..Default::default()
            },
        );
        assert_eq!(names(&min_only), vec!["Kettle", "Mixer", "Teapot"]);

        let max_only = apply_filter(
            &products,
            &ProductFilter {
                max_price: Some(24.99),
                ..Default::default()
            },
        );
        assert_eq!(names(&max_only), vec!["Kettle", "Lamp", "Teapot"]);

        let both = apply_filter(
            &products,
            &ProductFilter {
                min_price: Some(20.0),
                max_price: Some(100.0),
                ..Default::default()
            },
        );
        assert_eq!(names(&both), vec!["Kettle", "Teapot"]);
    }

    #[test]
    fn test_min_rating() {
        let filtered = apply_filter(
            &sample(),
            &ProductFilter {
                min_rating: Some(4.2),
                ..Default::default()
            },
        );
        assert_eq!(names(&filtered), vec!["Kettle", "Mixer", "Teapot"]);
    }

    #[test]
    fn test_query_matches_name_or_description_case_insensitive() {
        let filtered = apply_filter(
            &sample(),
            &ProductFilter {
                query: Some("tea".to_string()),
                ..Default::default()
            },
        );
        // "tea" in Kettle's description, "Teapot" name, "TEA" in Teapot description
        assert_eq!(names(&filtered), vec!["Kettle", "Teapot"]);

        let empty_query = apply_filter(
            &sample(),
            &ProductFilter {
                query: Some(String::new()),
                ..Default::default()
            },
        );
        assert_eq!(empty_query.len(), 4);
    }

    #[test]
    fn test_criteria_are_conjunctive() {
        let filtered = apply_filter(
            &sample(),
            &ProductFilter {
                category: Some("kitchen".to_string()),
                max_price: Some(50.0),
                query: Some("tea".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(names(&filtered), vec!["Teapot"]);
    }

    #[test]
    fn test_sort_by_price_both_directions() {
        let mut products = sample();
        sort_products(&mut products, SortKey::Price, SortDirection::Asc);
        assert_eq!(names(&products), vec!["Lamp", "Kettle", "Teapot", "Mixer"]);

        sort_products(&mut products, SortKey::Price, SortDirection::Desc);
        assert_eq!(names(&products), vec!["Mixer", "Kettle", "Teapot", "Lamp"]);
    }

    #[test]
    fn test_sort_is_stable_under_ties() {
        // Kettle and Teapot tie on both price and rating; input order holds
        let mut products = sample();
        sort_products(&mut products, SortKey::Price, SortDirection::Asc);
        let kettle = products.iter().position(|p| p.name == "Kettle").unwrap();
        let teapot = products.iter().position(|p| p.name == "Teapot").unwrap();
        assert!(kettle < teapot);

        let mut products = sample();
        sort_products(&mut products, SortKey::Rating, SortDirection::Asc);
        let kettle = products.iter().position(|p| p.name == "Kettle").unwrap();
        let teapot = products.iter().position(|p| p.name == "Teapot").unwrap();
        assert!(kettle < teapot);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut once = sample();
        sort_products(&mut once, SortKey::Rating, SortDirection::Desc);
        let mut twice = once.clone();
        sort_products(&mut twice, SortKey::Rating, SortDirection::Desc);
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn test_sort_by_name() {
        let mut products = sample();
        sort_products(&mut products, SortKey::Name, SortDirection::Asc);
        assert_eq!(names(&products), vec!["Kettle", "Lamp", "Mixer", "Teapot"]);
    }

    #[test]
    fn test_filter_is_side_effect_free() {
        let products = sample();
        let _ = apply_filter(&products, &ProductFilter::default());
        let _ = apply_filter(&products, &ProductFilter::default());
        assert_eq!(products.len(), 4);
        assert_eq!(names(&products), vec!["Kettle", "Mixer", "Lamp", "Teapot"]);
    }
}
