//! Medal proportions by prestige category.
//!
//! For every country this computes the share of its medals won in Low,
//! Medium and High prestige games.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{column, AnalysisError};
use crate::models::{CategoryCounts, MedalRecord, MedalTable, PrestigeCategory};

/// Category breakdown of one country's medals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryProportions {
    pub country: String,
    /// Medals over all games.
    pub total: f64,
    /// Medals per prestige category.
    pub by_category: CategoryCounts<f64>,
    /// Medals from games without a category.
    pub uncategorized: f64,
    /// `by_category / total`, or 0 when the country has no medals.
    pub proportions: CategoryCounts<f64>,
}

/// Proportion rows, one per country, in the order requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionTable {
    pub rows: Vec<CountryProportions>,
}

impl ProportionTable {
    /// Row for a country.
    #[allow(dead_code)] // Lookup utility
    pub fn get(&self, country: &str) -> Option<&CountryProportions> {
        self.rows.iter().find(|r| r.country == country)
    }
}

/// Group records by prestige category. Uncategorized records are dropped.
pub fn group_by_category(records: &[MedalRecord]) -> BTreeMap<PrestigeCategory, Vec<&MedalRecord>> {
    let mut grouped: BTreeMap<PrestigeCategory, Vec<&MedalRecord>> = BTreeMap::new();

    for record in records {
        if let Some(category) = record.prestige_category {
            grouped.entry(category).or_default().push(record);
        }
    }

    grouped
}

/// Share of `part` in `total`, 0 when `total` is not positive.
pub fn proportion(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total
    } else {
        0.0
    }
}

/// Compute per-country medal proportions across prestige categories.
pub fn category_proportions(
    table: &MedalTable,
    countries: &[String],
) -> Result<ProportionTable, AnalysisError> {
    let groups = group_by_category(&table.records);

    let rows = countries
        .iter()
        .map(|country| -> Result<CountryProportions, AnalysisError> {
            let idx = column(table, country)?;
            let total: f64 = table.records.iter().map(|r| r.medals_at(idx)).sum();

            let by_category = CategoryCounts::from_fn(|category| {
                groups
                    .get(&category)
                    .map(|records| records.iter().map(|r| r.medals_at(idx)).sum::<f64>())
                    .unwrap_or(0.0)
            });
            let proportions =
                CategoryCounts::from_fn(|category| proportion(by_category.get(category), total));

            Ok(CountryProportions {
                country: country.clone(),
                total,
                uncategorized: (total - by_category.sum()).max(0.0),
                by_category,
                proportions,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProportionTable { rows })
}
