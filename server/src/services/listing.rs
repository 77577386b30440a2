//! Listing filters
//!
//! Search, category filter, sort and low-stock filter over the full item
//! list, plus the inventory summary shown alongside it.

use crate::database::StockItemWithPhotos;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Name,
    Qty,
    Recent,
}

/// Query parameters accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: SortMode,
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub low_stock: usize,
    pub categories: Vec<CategoryCount>,
}

/// Filter and sort items. Input is expected in name order, which also
/// breaks ties for the other sort modes.
pub fn apply(items: Vec<StockItemWithPhotos>, query: &ListQuery) -> Vec<StockItemWithPhotos> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut filtered: Vec<StockItemWithPhotos> = items
        .into_iter()
        .filter(|entry| {
            let item = &entry.item;
            let matches_search = needle.as_deref().map_or(true, |needle| {
                [&item.name, &item.category, &item.location, &item.notes]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle))
            });
            let matches_category = category.map_or(true, |c| item.category == c);
            let matches_low = !query.low_stock || item.is_low_stock();

            matches_search && matches_category && matches_low
        })
        .collect();

    match query.sort {
        SortMode::Name => {}
        SortMode::Qty => filtered.sort_by_key(|entry| entry.item.qty),
        SortMode::Recent => {
            filtered.sort_by(|a, b| b.item.updated_at.cmp(&a.item.updated_at))
        }
    }

    filtered
}

/// Totals over the whole inventory, independent of any filter
pub fn summarize(items: &[StockItemWithPhotos]) -> Summary {
    let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in items {
        if !entry.item.category.is_empty() {
            *categories.entry(entry.item.category.as_str()).or_default() += 1;
        }
    }

    Summary {
        total: items.len(),
        low_stock: items.iter().filter(|e| e.item.is_low_stock()).count(),
        categories: categories
            .into_iter()
            .map(|(name, count)| CategoryCount {
                name: name.to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StockItem;
    use chrono::{Duration, Utc};

    fn entry(name: &str, category: &str, qty: i64, min_qty: i64, age_minutes: i64) -> StockItemWithPhotos {
        let at = Utc::now() - Duration::minutes(age_minutes);
        StockItemWithPhotos {
            item: StockItem {
                id: name.to_string(),
                name: name.to_string(),
                category: category.to_string(),
                qty,
                min_qty,
                location: "Depósito 2".to_string(),
                notes: String::new(),
                created_at: at,
                updated_at: at,
            },
            photos: Vec::new(),
        }
    }

    fn inventory() -> Vec<StockItemWithPhotos> {
        vec![
            entry("Capacitor 25µF", "Componentes Elétricos", 15, 5, 30),
            entry("Correia A-42", "Correias", 12, 5, 10),
            entry("Correia A-55", "Correias", 3, 5, 20),
            entry("Motor Ventilador 1/2 CV", "Motores", 0, 1, 5),
        ]
    }

    fn names(items: &[StockItemWithPhotos]) -> Vec<&str> {
        items.iter().map(|e| e.item.name.as_str()).collect()
    }

    #[test]
    fn test_default_query_keeps_name_order() {
        let result = apply(inventory(), &ListQuery::default());
        assert_eq!(result.len(), 4);
        assert_eq!(result[0].item.name, "Capacitor 25µF");
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let query = ListQuery {
            search: Some("  CORREIA ".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&apply(inventory(), &query)), vec!["Correia A-42", "Correia A-55"]);

        let query = ListQuery {
            search: Some("depósito".to_string()),
            ..Default::default()
        };
        assert_eq!(apply(inventory(), &query).len(), 4);
    }

    #[test]
    fn test_category_and_low_stock_filters() {
        let query = ListQuery {
            category: Some("Correias".to_string()),
            low_stock: true,
            ..Default::default()
        };
        assert_eq!(names(&apply(inventory(), &query)), vec!["Correia A-55"]);
    }

    #[test]
    fn test_sort_modes() {
        let by_qty = ListQuery {
            sort: SortMode::Qty,
            ..Default::default()
        };
        assert_eq!(
            names(&apply(inventory(), &by_qty)),
            vec!["Motor Ventilador 1/2 CV", "Correia A-55", "Correia A-42", "Capacitor 25µF"]
        );

        let recent = ListQuery {
            sort: SortMode::Recent,
            ..Default::default()
        };
        assert_eq!(
            names(&apply(inventory(), &recent)),
            vec!["Motor Ventilador 1/2 CV", "Correia A-42", "Correia A-55", "Capacitor 25µF"]
        );
    }

    #[test]
    fn test_summary() {
        let summary = summarize(&inventory());

        assert_eq!(summary.total, 4);
        assert_eq!(summary.low_stock, 2);
        assert_eq!(
            summary.categories,
            vec![
                CategoryCount { name: "Componentes Elétricos".to_string(), count: 1 },
                CategoryCount { name: "Correias".to_string(), count: 2 },
                CategoryCount { name: "Motores".to_string(), count: 1 },
            ]
        );
    }
}
