//! Country drill-down: the games where one country won medals.

use serde::Serialize;
use std::cmp::Ordering;

use super::{column, AnalysisError};
use crate::models::{CategoryCounts, MedalTable, PrestigeCategory};

/// A medal-winning game for the drill-down country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillDownRow<'a> {
    pub index: usize,
    pub game: &'a str,
    pub prestige_score: Option<f64>,
    pub medals: f64,
    pub prestige_category: Option<PrestigeCategory>,
}

/// Read-only view over the games where `country` won at least one medal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillDown<'a> {
    pub country: String,
    /// Rows in source order.
    pub rows: Vec<DrillDownRow<'a>>,
    /// Number of rows per prestige category.
    pub category_counts: CategoryCounts<usize>,
    /// Rows without a category.
    pub uncategorized: usize,
}

impl<'a> DrillDown<'a> {
    /// Number of medal-winning games.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows by prestige score, highest first. Blank scores go last.
    pub fn sorted_by_score(&self) -> Vec<&DrillDownRow<'a>> {
        let mut sorted: Vec<_> = self.rows.iter().collect();
        sorted.sort_by(|a, b| {
            b.prestige_score
                .partial_cmp(&a.prestige_score)
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }
}

/// Select the games where `country` has a strictly positive medal count.
pub fn drill_down<'a>(table: &'a MedalTable, country: &str) -> Result<DrillDown<'a>, AnalysisError> {
    let idx = column(table, country)?;

    let rows: Vec<DrillDownRow<'a>> = table
        .records
        .iter()
        .filter(|r| r.medals_at(idx) > 0.0)
        .map(|r| DrillDownRow {
            index: r.index,
            game: &r.game,
            prestige_score: r.prestige_score,
            medals: r.medals_at(idx),
            prestige_category: r.prestige_category,
        })
        .collect();

    let category_counts = CategoryCounts::from_fn(|category| {
        rows.iter()
            .filter(|r| r.prestige_category == Some(category))
            .count()
    });
    let uncategorized = rows.iter().filter(|r| r.prestige_category.is_none()).count();

    Ok(DrillDown {
        country: country.to_string(),
        rows,
        category_counts,
        uncategorized,
    })
}
