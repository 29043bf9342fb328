use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::reports::portfolio::Holding;

/// Portfolio value grouped by sector
#[derive(Debug, Clone, Serialize)]
pub struct SectorAllocation {
    pub sector: String,
    pub value: Decimal,
    pub allocation_pct: Decimal,
}

/// Aggregate holdings by sector, largest value first.
///
/// Symbols absent from the sector map fall under "Unknown", matching the
/// price-source contract.
pub fn sector_allocation(
    holdings: &[Holding],
    sectors: &HashMap<String, String>,
) -> Vec<SectorAllocation> {
    let mut buckets: HashMap<&str, (Decimal, Decimal)> = HashMap::new();

    for holding in holdings {
        let sector = sectors
            .get(&holding.symbol)
            .map(String::as_str)
            .unwrap_or("Unknown");
        let bucket = buckets.entry(sector).or_default();
        bucket.0 += holding.current_value;
        bucket.1 += holding.allocation_pct;
    }

    let mut allocations: Vec<SectorAllocation> = buckets
        .into_iter()
        .map(|(sector, (value, allocation_pct))| SectorAllocation {
            sector: sector.to_string(),
            value,
            allocation_pct,
        })
        .collect();

    allocations.sort_by(|a, b| b.value.cmp(&a.value));
    allocations
}
