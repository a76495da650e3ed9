use std::collections::BTreeMap;

use crate::model::inventory::{CategoryStats, InventoryItem};

/// Groups items by category and totals count, quantity and value.
///
/// Rows come out ordered by category name, matching `ORDER BY category` on
/// the SQL side. Categories without items are omitted.
pub fn summarize<'a, I>(items: I) -> Vec<CategoryStats>
where
    I: IntoIterator<Item = &'a InventoryItem>,
{
    let mut totals: BTreeMap<&'a str, (u64, u64, f64)> = BTreeMap::new();

    for item in items {
        let (count, in_stock, value) = totals.entry(item.category.as_ref()).or_default();
        *count += 1;
        *in_stock += u64::from(item.quantity);
        *value += item.total_value();
    }

    totals
        .into_iter()
        .map(|(name, (count, in_stock, value))| CategoryStats::new(name, count, in_stock, value))
        .collect()
}
