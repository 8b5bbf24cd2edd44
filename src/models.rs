//! Data models for the medal report.
//!
//! This module contains the core data structures shared by the loader,
//! the analysis pipelines and the report generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::{Comparison, DrillDown, ProportionTable};

/// Bin edges for prestige scores. Each bin is right-open.
pub const PRESTIGE_BIN_EDGES: [f64; 4] = [0.0, 0.05, 0.15, 0.3];

/// Prestige bucket of a game, derived from its prestige score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrestigeCategory {
    /// Score in `[0, 0.05)`
    Low,
    /// Score in `[0.05, 0.15)`
    Medium,
    /// Score in `[0.15, 0.3)`
    High,
}

impl fmt::Display for PrestigeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrestigeCategory::Low => write!(f, "Low"),
            PrestigeCategory::Medium => write!(f, "Medium"),
            PrestigeCategory::High => write!(f, "High"),
        }
    }
}

impl PrestigeCategory {
    /// All categories, lowest first.
    pub const ALL: [PrestigeCategory; 3] = [
        PrestigeCategory::Low,
        PrestigeCategory::Medium,
        PrestigeCategory::High,
    ];

    /// Bin a prestige score.
    ///
    /// Returns `None` for scores outside `[0, 0.3)` and for NaN.
    pub fn from_score(score: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|category| {
            let (lower, upper) = category.bounds();
            score >= lower && score < upper
        })
    }

    /// Half-open `[lower, upper)` score interval of this category.
    pub fn bounds(&self) -> (f64, f64) {
        let i = *self as usize;
        (PRESTIGE_BIN_EDGES[i], PRESTIGE_BIN_EDGES[i + 1])
    }

    /// Fill character used for this category in text charts.
    pub fn glyph(&self) -> char {
        match self {
            PrestigeCategory::Low => '░',
            PrestigeCategory::Medium => '▒',
            PrestigeCategory::High => '█',
        }
    }
}

/// One value per prestige category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCounts<T> {
    pub low: T,
    pub medium: T,
    pub high: T,
}

impl<T: Copy> CategoryCounts<T> {
    /// Value for a category.
    pub fn get(&self, category: PrestigeCategory) -> T {
        match category {
            PrestigeCategory::Low => self.low,
            PrestigeCategory::Medium => self.medium,
            PrestigeCategory::High => self.high,
        }
    }

    /// Iterate `(category, value)` pairs, lowest category first.
    pub fn iter(&self) -> impl Iterator<Item = (PrestigeCategory, T)> + '_ {
        PrestigeCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Build from a function over categories.
    pub fn from_fn(mut f: impl FnMut(PrestigeCategory) -> T) -> Self {
        Self {
            low: f(PrestigeCategory::Low),
            medium: f(PrestigeCategory::Medium),
            high: f(PrestigeCategory::High),
        }
    }
}

impl<T: Copy + std::iter::Sum<T>> CategoryCounts<T> {
    /// Sum across the three categories.
    pub fn sum(&self) -> T {
        self.iter().map(|(_, v)| v).sum()
    }
}

/// One game/event row of the source table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedalRecord {
    /// Zero-based data row index in the source (header excluded). Skipped
    /// blank rows keep their numbers, so indices can have gaps.
    pub index: usize,
    /// Game or event name.
    pub game: String,
    /// Prestige score, `None` when the cell was blank.
    pub prestige_score: Option<f64>,
    /// Derived prestige bucket.
    pub prestige_category: Option<PrestigeCategory>,
    /// Medal counts, aligned with [`MedalTable::columns`].
    pub medals: Vec<f64>,
}

impl MedalRecord {
    /// Medal count at a column position.
    pub fn medals_at(&self, column: usize) -> f64 {
        self.medals.get(column).copied().unwrap_or(0.0)
    }
}

/// The loaded record set. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedalTable {
    /// Sheet the records were read from, `None` for CSV sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Medal column names (countries and the group column).
    pub columns: Vec<String>,
    /// Records in source order.
    pub records: Vec<MedalRecord>,
}

impl MedalTable {
    /// Position of a medal column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Sum of a medal column over all records.
    pub fn column_total(&self, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        Some(self.records.iter().map(|r| r.medals_at(idx)).sum())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose score fell outside every prestige bin.
    pub fn uncategorized_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.prestige_category.is_none())
            .count()
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the data source.
    pub source: String,
    /// Sheet the data came from, if the source is a workbook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of games loaded.
    pub total_games: usize,
    /// Games without a prestige category.
    pub uncategorized_games: usize,
    /// Tool version.
    pub version: String,
}

/// The complete medal report. Views that were not selected are `None`.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proportions: Option<ProportionTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drilldown: Option<DrillDown<'a>>,
}
