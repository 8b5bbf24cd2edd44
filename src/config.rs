//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.medalreport.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".medalreport.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Countries and comparison entities.
    #[serde(default)]
    pub entities: EntitiesConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Spreadsheet or CSV file to load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Workbook sheet to read (first sheet when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,

    /// Column holding the game/event name.
    #[serde(default = "default_game_column")]
    pub game_column: String,

    /// Column holding the prestige score.
    #[serde(default = "default_score_column")]
    pub score_column: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            sheet: None,
            game_column: default_game_column(),
            score_column: default_score_column(),
        }
    }
}

fn default_game_column() -> String {
    "Games".to_string()
}

fn default_score_column() -> String {
    "Game Prestige Score".to_string()
}

/// Countries and comparison entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitiesConfig {
    /// Tracked country columns.
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,

    /// Country given the drill-down view.
    #[serde(default = "default_focus")]
    pub focus: String,

    /// Aggregate group column.
    #[serde(default = "default_group")]
    pub group: String,

    /// Peer countries for the comparison. Empty means every tracked
    /// country except the focus country.
    #[serde(default)]
    pub peers: Vec<String>,
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            countries: default_countries(),
            focus: default_focus(),
            group: default_group(),
            peers: Vec::new(),
        }
    }
}

fn default_countries() -> Vec<String> {
    vec!["PK", "IND", "IR", "CN", "UK", "GER", "AUS", "CAN", "USA"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_focus() -> String {
    "PK".to_string()
}

fn default_group() -> String {
    "Group1".to_string()
}

impl EntitiesConfig {
    /// Peers used by the comparison view.
    pub fn effective_peers(&self) -> Vec<String> {
        if !self.peers.is_empty() {
            return self.peers.clone();
        }

        self.countries
            .iter()
            .filter(|c| **c != self.focus)
            .cloned()
            .collect()
    }
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Report views.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Medal proportions by prestige category
    Proportions,
    /// Total medal comparison
    Comparison,
    /// Focus country drill-down
    Drilldown,
}

impl View {
    pub const ALL: [View; 3] = [View::Proportions, View::Comparison, View::Drilldown];
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Output format.
    #[serde(default)]
    pub format: ReportFormat,

    /// Views to include.
    #[serde(default = "default_views")]
    pub views: Vec<View>,

    /// Include text bar charts in Markdown reports.
    #[serde(default = "default_true")]
    pub show_charts: bool,

    /// Width of text bar charts in characters.
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: ReportFormat::default(),
            views: default_views(),
            show_charts: true,
            chart_width: default_chart_width(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("medal_report.md")
}

fn default_views() -> Vec<View> {
    View::ALL.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_chart_width() -> usize {
    40
}

impl ReportConfig {
    /// Output path, switched to a `.json` extension when JSON output is
    /// requested without an explicit path.
    pub fn output_path(&self) -> PathBuf {
        if self.format == ReportFormat::Json && self.output == default_output() {
            self.output.with_extension("json")
        } else {
            self.output.clone()
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.source.path = Some(input.clone());
        }
        if let Some(ref sheet) = args.sheet {
            self.source.sheet = Some(sheet.clone());
        }

        if let Some(ref countries) = args.countries {
            self.entities.countries = countries.clone();
        }
        if let Some(ref focus) = args.focus {
            self.entities.focus = focus.clone();
        }
        if let Some(ref group) = args.group {
            self.entities.group = group.clone();
        }

        if let Some(ref output) = args.output {
            self.report.output = output.clone();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref views) = args.view {
            self.report.views = views.clone();
        }
        // Flags always override
        if args.no_charts {
            self.report.show_charts = false;
        }
    }

    /// Check the merged configuration for inconsistencies.
    pub fn validate(&self) -> Result<()> {
        if self.entities.countries.is_empty() {
            bail!("At least one country must be tracked");
        }
        if self.entities.focus.trim().is_empty() {
            bail!("Focus country must not be empty");
        }
        if self.entities.countries.contains(&self.entities.group) {
            bail!(
                "Group column '{}' must not also be listed as a country",
                self.entities.group
            );
        }
        if self.report.views.is_empty() {
            bail!("At least one report view must be selected");
        }
        if self.report.chart_width < 10 {
            bail!("Chart width must be at least 10");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.entities.focus, "PK");
        assert_eq!(config.entities.group, "Group1");
        assert_eq!(config.entities.countries.len(), 9);
        assert_eq!(config.source.score_column, "Game Prestige Score");
        assert_eq!(config.report.views, View::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[source]
path = "data/medals.xlsx"
sheet = "Sheet2"

[entities]
countries = ["PK", "IND"]
focus = "IND"
peers = ["PK"]

[report]
format = "json"
views = ["comparison", "drilldown"]
chart_width = 60
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.source.path, Some(PathBuf::from("data/medals.xlsx")));
        assert_eq!(config.source.sheet.as_deref(), Some("Sheet2"));
        assert_eq!(config.source.game_column, "Games");
        assert_eq!(config.entities.focus, "IND");
        assert_eq!(config.entities.group, "Group1");
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.report.views, vec![View::Comparison, View::Drilldown]);
        assert_eq!(config.report.chart_width, 60);
        assert!(config.report.show_charts);
    }

    #[test]
    fn test_effective_peers() {
        let mut entities = EntitiesConfig::default();
        let peers = entities.effective_peers();
        assert_eq!(peers.len(), 8);
        assert!(!peers.contains(&"PK".to_string()));
        assert_eq!(peers[0], "IND");

        entities.peers = vec!["USA".to_string()];
        assert_eq!(entities.effective_peers(), vec!["USA"]);
    }

    #[test]
    fn test_output_path_follows_format() {
        let mut report = ReportConfig::default();
        assert_eq!(report.output_path(), PathBuf::from("medal_report.md"));

        report.format = ReportFormat::Json;
        assert_eq!(report.output_path(), PathBuf::from("medal_report.json"));

        report.output = PathBuf::from("out/custom.txt");
        assert_eq!(report.output_path(), PathBuf::from("out/custom.txt"));
    }

    #[test]
    fn test_validate_rejects_group_as_country() {
        let mut config = Config::default();
        config.entities.countries.push("Group1".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_views() {
        let mut config = Config::default();
        config.report.views.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[entities]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.entities.countries, default_countries());
    }
}
