//! Category alignment between the two catalogs.
//!
//! Sephora uses coarse categories (Skincare, Makeup, Hair, Fragrance, ...),
//! the Skincare catalog uses fine-grained ones (Moisturizer, Cleanser, ...).
//! Fine-grained categories are folded into Sephora's vocabulary before the
//! two sides are joined. Anything not listed passes through unchanged.

use std::collections::BTreeMap;

use crate::models::analytics::{CatalogComparison, CategoryStats};

/// Fine-grained category -> coarse category.
pub const CATEGORY_MAP: &[(&str, &str)] = &[
    ("Moisturizer", "Skincare"),
    ("Cleanser", "Skincare"),
    ("Treatment", "Skincare"),
    ("Eye Cream", "Skincare"),
    ("Face Mask", "Skincare"),
    ("Sun Protect", "Skincare"),
];

/// Total: every input maps to exactly one coarse category.
pub fn coarse_category(fine: &str) -> &str {
    CATEGORY_MAP
        .iter()
        .find(|(f, _)| *f == fine)
        .map(|(_, coarse)| *coarse)
        .unwrap_or(fine)
}

/// Folds raw per-type counters into coarse categories by summing them.
/// Groups without a product type are dropped: they cannot join anything.
pub fn merge_into_coarse(stats: &[CategoryStats]) -> BTreeMap<String, CategoryStats> {
    let mut merged: BTreeMap<String, CategoryStats> = BTreeMap::new();
    for s in stats {
        let Some(fine) = s.product_type.as_deref() else {
            continue;
        };
        let coarse = coarse_category(fine).to_string();
        let entry = merged.entry(coarse.clone()).or_insert_with(|| CategoryStats {
            product_type: Some(coarse),
            total: 0,
            restricted: 0,
            price_sum: 0.0,
            priced: 0,
        });
        entry.total += s.total;
        entry.restricted += s.restricted;
        entry.price_sum += s.price_sum;
        entry.priced += s.priced;
    }
    merged
}

/// Inner join of the Sephora categories with the coarse-mapped Skincare
/// categories, ordered by Sephora restricted share (desc) then name.
pub fn compare(sephora: &[CategoryStats], skincare: &[CategoryStats]) -> Vec<CatalogComparison> {
    let skincare = merge_into_coarse(skincare);

    let mut rows: Vec<CatalogComparison> = sephora
        .iter()
        .filter_map(|s| {
            let category = s.product_type.as_deref()?;
            let sk = skincare.get(category)?;
            Some(CatalogComparison {
                category: category.to_string(),
                total_sephora: s.total,
                pct_restricted_sephora: percentage(s.restricted, s.total),
                avg_price_sephora: average(s.price_sum, s.priced),
                total_skincare: sk.total,
                pct_restricted_skincare: percentage(sk.restricted, sk.total),
                avg_price_skincare: average(sk.price_sum, sk.priced),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.pct_restricted_sephora
            .total_cmp(&a.pct_restricted_sephora)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

fn percentage(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 * 100.0 / total as f64, 1)
}

fn average(sum: f64, n: i64) -> Option<f64> {
    (n > 0).then(|| round_to(sum / n as f64, 2))
}

fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(t: &str, total: i64, restricted: i64, price_sum: f64, priced: i64) -> CategoryStats {
        CategoryStats {
            product_type: Some(t.to_string()),
            total,
            restricted,
            price_sum,
            priced,
        }
    }

    #[test]
    fn test_mapping_is_total() {
        for (fine, coarse) in CATEGORY_MAP {
            assert_eq!(coarse_category(fine), *coarse);
        }
        for passthrough in ["Makeup", "Hair", "Skincare", "", "moisturizer"] {
            assert_eq!(coarse_category(passthrough), passthrough);
        }
    }

    #[test]
    fn test_fine_categories_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (fine, _) in CATEGORY_MAP {
            assert!(seen.insert(*fine), "{} mapped twice", fine);
        }
    }

    #[test]
    fn test_merge_sums_counters() {
        let merged = merge_into_coarse(&[
            stats("Moisturizer", 10, 5, 300.0, 10),
            stats("Cleanser", 30, 3, 600.0, 20),
            stats("Makeup", 4, 1, 40.0, 4),
        ]);
        assert_eq!(merged.len(), 2);
        let skincare = &merged["Skincare"];
        assert_eq!(skincare.total, 40);
        assert_eq!(skincare.restricted, 8);
        assert_eq!(skincare.priced, 30);
        assert_eq!(merged["Makeup"].total, 4);
    }

    #[test]
    fn test_compare_percentages_use_merged_totals() {
        let rows = compare(
            &[stats("Skincare", 200, 50, 10_000.0, 200)],
            &[
                stats("Moisturizer", 10, 5, 300.0, 10),
                stats("Cleanser", 30, 3, 600.0, 20),
            ],
        );
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.category, "Skincare");
        assert_eq!(r.pct_restricted_sephora, 25.0);
        assert_eq!(r.avg_price_sephora, Some(50.0));
        assert_eq!(r.total_skincare, 40);
        // 8 / 40, not the mean of 50% and 10%
        assert_eq!(r.pct_restricted_skincare, 20.0);
        assert_eq!(r.avg_price_skincare, Some(30.0));
    }

    #[test]
    fn test_compare_keeps_every_shared_category() {
        let sephora = [
            stats("Skincare", 10, 1, 100.0, 10),
            stats("Makeup", 10, 5, 100.0, 10),
            stats("Fragrance", 10, 9, 100.0, 10),
        ];
        let skincare = [
            stats("Face Mask", 3, 0, 30.0, 3),
            stats("Makeup", 2, 1, 20.0, 2),
            stats("Body", 7, 7, 70.0, 7),
        ];
        let rows = compare(&sephora, &skincare);
        let names: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, ["Makeup", "Skincare"]);
    }

    #[test]
    fn test_compare_ties_break_on_name_and_untyped_groups_drop() {
        let sephora = [
            stats("B", 10, 5, 0.0, 0),
            stats("A", 10, 5, 0.0, 0),
            CategoryStats {
                product_type: None,
                total: 1,
                restricted: 1,
                price_sum: 0.0,
                priced: 0,
            },
        ];
        let skincare = [stats("A", 1, 0, 0.0, 0), stats("B", 1, 0, 0.0, 0)];
        let rows = compare(&sephora, &skincare);
        assert_eq!(rows[0].category, "A");
        assert_eq!(rows[1].category, "B");
        assert_eq!(rows[0].avg_price_sephora, None);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(average(10.0, 3), Some(3.33));
    }
}
