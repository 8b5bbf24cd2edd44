//! Analysis pipelines over a loaded medal table.
//!
//! Each pipeline reads the shared table and builds its own view; no
//! pipeline depends on another's output.

pub mod aggregator;
pub mod comparison;
pub mod drilldown;

pub use aggregator::*;
pub use comparison::*;
pub use drilldown::*;

use crate::models::MedalTable;
use thiserror::Error;

/// Errors raised when a pipeline is pointed at data the table lacks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("column '{0}' is not present in the medal table")]
    UnknownColumn(String),
}

/// Resolve a medal column position by name.
fn column(table: &MedalTable, name: &str) -> Result<usize, AnalysisError> {
    table
        .column_index(name)
        .ok_or_else(|| AnalysisError::UnknownColumn(name.to_string()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{MedalRecord, MedalTable, PrestigeCategory};

    /// Build a table from `(score, medals)` rows over `columns`.
    pub fn table(columns: &[&str], rows: &[(f64, &[f64])]) -> MedalTable {
        MedalTable {
            sheet: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            records: rows
                .iter()
                .enumerate()
                .map(|(index, (score, medals))| MedalRecord {
                    index,
                    game: format!("Game {}", index + 1),
                    prestige_score: Some(*score),
                    prestige_category: PrestigeCategory::from_score(*score),
                    medals: medals.to_vec(),
                })
                .collect(),
        }
    }

    /// The three-game table used across pipeline tests.
    pub fn three_games() -> MedalTable {
        table(
            &["PK", "IND", "Group1"],
            &[
                (0.02, &[2.0, 0.0, 1.0]),
                (0.10, &[0.0, 3.0, 0.0]),
                (0.20, &[1.0, 1.0, 4.0]),
            ],
        )
    }
}
