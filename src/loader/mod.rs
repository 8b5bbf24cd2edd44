//! Medal table loading and caching.
//!
//! The loader reads a tabular source once, coerces and validates its
//! columns, bins prestige scores and keeps the resulting [`MedalTable`]
//! in a cache keyed by source path and modification time.

pub mod coerce;
pub mod source;

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{MedalRecord, MedalTable, PrestigeCategory};
use coerce::{coerce_or_zero, parse_count, Cell};
use source::{read_source, RawSheet};

/// Errors that prevent a medal table from being loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "unsupported data source: {} (expected csv, xlsx, xlsm, xlsb, xls or ods)",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to read CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("data source has no header row: {}", .path.display())]
    EmptySource { path: PathBuf },

    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("row {row}: column '{column}' has invalid medal count '{value}'")]
    InvalidCount {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: invalid prestige score '{value}'")]
    InvalidScore { row: usize, value: String },
}

/// Column layout the loader expects in the source.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Sheet to read from workbooks (first sheet when `None`).
    pub sheet: Option<String>,
    /// Column holding the game/event name.
    pub game_column: String,
    /// Column holding the prestige score.
    pub score_column: String,
    /// Country medal columns, parsed strictly.
    pub countries: Vec<String>,
    /// Aggregate group column, coerced leniently.
    pub group_column: String,
}

impl From<&crate::config::Config> for LoadConfig {
    fn from(config: &crate::config::Config) -> Self {
        let mut countries = config.entities.countries.clone();
        let extra = std::iter::once(&config.entities.focus).chain(&config.entities.peers);
        for name in extra {
            if !countries.contains(name) && *name != config.entities.group {
                countries.push(name.clone());
            }
        }

        Self {
            sheet: config.source.sheet.clone(),
            game_column: config.source.game_column.clone(),
            score_column: config.source.score_column.clone(),
            countries,
            group_column: config.entities.group.clone(),
        }
    }
}

struct CachedTable {
    modified: Option<SystemTime>,
    table: Arc<MedalTable>,
}

/// Loads medal tables and memoizes them per source.
pub struct DataLoader {
    config: LoadConfig,
    show_progress: bool,
    cache: Mutex<HashMap<PathBuf, CachedTable>>,
}

impl DataLoader {
    /// Create a new loader.
    pub fn new(config: LoadConfig) -> Self {
        Self {
            config,
            show_progress: false,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Show a spinner while reading sources.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Load the table for `path`, reusing the cached table when the source
    /// has not been modified since it was read.
    pub fn load(&self, path: &Path) -> Result<Arc<MedalTable>, LoadError> {
        let key = source_key(path)?;
        let modified = fs::metadata(&key).and_then(|m| m.modified()).ok();

        let mut cache = self.lock_cache();
        if let Some(cached) = cache.get(&key) {
            if cached.modified == modified {
                debug!("Using cached table for {}", key.display());
                return Ok(Arc::clone(&cached.table));
            }
            info!("{} changed on disk, reloading", key.display());
        }

        let table = Arc::new(self.read_table(&key)?);
        cache.insert(
            key,
            CachedTable {
                modified,
                table: Arc::clone(&table),
            },
        );

        Ok(table)
    }

    /// Drop the cached table for `path`. Returns whether an entry existed.
    #[allow(dead_code)] // Cache maintenance for long-lived callers
    pub fn invalidate(&self, path: &Path) -> bool {
        match source_key(path) {
            Ok(key) => self.lock_cache().remove(&key).is_some(),
            Err(_) => false,
        }
    }

    /// Re-read `path` regardless of the cache.
    #[allow(dead_code)] // Cache maintenance for long-lived callers
    pub fn reload(&self, path: &Path) -> Result<Arc<MedalTable>, LoadError> {
        self.invalidate(path);
        self.load(path)
    }

    /// Drop every cached table.
    #[allow(dead_code)] // Cache maintenance for long-lived callers
    pub fn clear(&self) {
        self.lock_cache().clear();
    }

    /// Number of cached tables.
    #[allow(dead_code)] // Cache introspection for long-lived callers
    pub fn cached_sources(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<PathBuf, CachedTable>> {
        // Entries are only ever inserted whole, so a poisoned map is still valid.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_table(&self, path: &Path) -> Result<MedalTable, LoadError> {
        let spinner = self.show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("Reading {}", path.display()));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let result = read_source(path, self.config.sheet.as_deref())
            .and_then(|raw| build_table(raw, &self.config));

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let table = result?;
        info!("Loaded {} games from {}", table.len(), path.display());
        Ok(table)
    }
}

fn source_key(path: &Path) -> Result<PathBuf, LoadError> {
    fs::canonicalize(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(idx).unwrap_or(&EMPTY)
}

/// Build a typed medal table from raw rows.
///
/// Fully blank rows are skipped. Scores outside every prestige bin leave
/// the record without a category.
pub fn build_table(raw: RawSheet, config: &LoadConfig) -> Result<MedalTable, LoadError> {
    let find = |name: &str| {
        raw.headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::MissingColumn {
                column: name.to_string(),
            })
    };

    let game_idx = find(&config.game_column)?;
    let score_idx = find(&config.score_column)?;
    let country_idx = config
        .countries
        .iter()
        .map(|c| find(c))
        .collect::<Result<Vec<_>, _>>()?;
    let group_idx = find(&config.group_column)?;

    let mut columns = config.countries.clone();
    columns.push(config.group_column.clone());

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut coerced = 0usize;

    for (i, row) in raw.rows.iter().enumerate() {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        // Header is source row 1.
        let source_row = i + 2;

        let prestige_score = match cell_at(row, score_idx) {
            Cell::Empty => None,
            cell => Some(cell.as_number().ok_or_else(|| LoadError::InvalidScore {
                row: source_row,
                value: cell.to_string(),
            })?),
        };

        let mut medals = Vec::with_capacity(columns.len());
        for (country, &idx) in config.countries.iter().zip(&country_idx) {
            let cell = cell_at(row, idx);
            let count = parse_count(cell).ok_or_else(|| LoadError::InvalidCount {
                row: source_row,
                column: country.clone(),
                value: cell.to_string(),
            })?;
            medals.push(count);
        }

        let group_cell = cell_at(row, group_idx);
        let group = coerce_or_zero(group_cell);
        if !group_cell.is_empty() && group_cell.as_number() != Some(group) {
            coerced += 1;
        }
        medals.push(group);

        records.push(MedalRecord {
            index: i,
            game: cell_at(row, game_idx).to_string(),
            prestige_score,
            prestige_category: prestige_score.and_then(PrestigeCategory::from_score),
            medals,
        });
    }

    if coerced > 0 {
        debug!(
            "Coerced {} non-numeric '{}' values to 0",
            coerced, config.group_column
        );
    }

    let table = MedalTable {
        sheet: raw.sheet,
        columns,
        records,
    };

    let uncategorized = table.uncategorized_count();
    if uncategorized > 0 {
        warn!(
            "{} games have a prestige score outside [0, 0.3) and no category",
            uncategorized
        );
    }

    Ok(table)
}
