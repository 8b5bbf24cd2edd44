//! Markdown and JSON report generation.
//!
//! This module renders the medal report from the outputs of the
//! analysis pipelines.

use anyhow::{Context, Result};
use std::path::Path;

use super::chart::{bar, stacked_bar};
use crate::analysis::{Comparison, DrillDown, EntityKind, ProportionTable};
use crate::config::ReportConfig;
use crate::models::{PrestigeCategory, Report, ReportMetadata};

/// Presentation settings for Markdown output.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub show_charts: bool,
    pub chart_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_charts: true,
            chart_width: 40,
        }
    }
}

impl From<&ReportConfig> for RenderOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            show_charts: config.show_charts,
            chart_width: config.chart_width,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# Medal Analysis Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));

    if let Some(ref proportions) = report.proportions {
        output.push_str(&generate_proportions_section(proportions, options));
    }

    if let Some(ref comparison) = report.comparison {
        output.push_str(&generate_comparison_section(comparison, options));
    }

    if let Some(ref drilldown) = report.drilldown {
        output.push_str(&generate_drilldown_section(drilldown, options));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Format a medal count, dropping the fraction for whole numbers.
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format a proportion as a percentage with two decimals.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{:.3}", s))
}

fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

fn drilldown_title(country: &str) -> String {
    format!("{} Medal Distribution", country)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data Source:** `{}`\n", metadata.source));
    if let Some(ref sheet) = metadata.sheet {
        section.push_str(&format!("- **Sheet:** {}\n", sheet));
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Total Games:** {}\n", metadata.total_games));
    if metadata.uncategorized_games > 0 {
        let (lower, _) = PrestigeCategory::Low.bounds();
        let (_, upper) = PrestigeCategory::High.bounds();
        section.push_str(&format!(
            "- **Uncategorized Games:** {} (prestige score outside [{}, {}))\n",
            metadata.uncategorized_games, lower, upper
        ));
    }
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");

    if report.proportions.is_some() {
        toc.push_str("- [Medal Proportions by Prestige](#medal-proportions-by-prestige)\n");
    }
    if report.comparison.is_some() {
        toc.push_str("- [Total Medal Comparison](#total-medal-comparison)\n");
    }
    if let Some(ref drilldown) = report.drilldown {
        let title = drilldown_title(&drilldown.country);
        toc.push_str(&format!("- [{}](#{})\n", title, anchor(&title)));
    }

    toc.push('\n');

    toc
}

/// Generate the proportions section.
fn generate_proportions_section(table: &ProportionTable, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Medal Proportions by Prestige\n\n");
    section.push_str(
        "How each country's medals are distributed across prestige levels. \
         Proportions are relative to the country's total medals.\n\n",
    );

    let show_uncategorized = table.rows.iter().any(|r| r.uncategorized > 0.0);

    section.push_str("| Country |");
    for category in PrestigeCategory::ALL {
        section.push_str(&format!(" {} |", category));
    }
    if show_uncategorized {
        section.push_str(" Uncategorized |");
    }
    section.push_str(" Total Medals |\n");

    section.push_str("|:---|");
    section.push_str(&":---:|".repeat(PrestigeCategory::ALL.len()));
    if show_uncategorized {
        section.push_str(":---:|");
    }
    section.push_str(":---:|\n");

    for row in &table.rows {
        section.push_str(&format!("| {} |", row.country));
        for (_, p) in row.proportions.iter() {
            section.push_str(&format!(" {} |", format_percent(p)));
        }
        if show_uncategorized {
            section.push_str(&format!(" {} |", format_count(row.uncategorized)));
        }
        section.push_str(&format!(" {} |\n", format_count(row.total)));
    }
    section.push('\n');

    if options.show_charts && !table.rows.is_empty() {
        let label_width = table
            .rows
            .iter()
            .map(|r| r.country.chars().count())
            .max()
            .unwrap_or(0);

        section.push_str("```text\n");
        for row in &table.rows {
            let segments: Vec<(char, f64)> = row
                .proportions
                .iter()
                .map(|(category, p)| (category.glyph(), p))
                .collect();
            section.push_str(&format!(
                "{:<width$} |{}|\n",
                row.country,
                stacked_bar(&segments, options.chart_width),
                width = label_width
            ));
        }
        let legend: Vec<String> = PrestigeCategory::ALL
            .iter()
            .map(|c| format!("{} {}", c.glyph(), c))
            .collect();
        section.push_str(&format!("\n{}\n", legend.join("   ")));
        section.push_str("```\n\n");
    }

    section
}

/// Generate the total comparison section.
fn generate_comparison_section(comparison: &Comparison, options: &RenderOptions) -> String {
    let mut section = String::new();

    let focus = comparison.first_of(EntityKind::Focus);
    let group = comparison.first_of(EntityKind::Group);

    section.push_str("## Total Medal Comparison\n\n");
    if let (Some(focus), Some(group)) = (focus, group) {
        section.push_str(&format!(
            "{} vs. {} and other countries, total medals over all games.\n\n",
            focus.entity, group.entity
        ));
    }

    for entity in [focus, group].into_iter().flatten() {
        section.push_str(&format!(
            "- **{}:** {} medals\n",
            entity.entity,
            format_count(entity.total)
        ));
    }
    if let Some(leader) = comparison.leader() {
        section.push_str(&format!(
            "- **Highest:** {}: {} medals",
            leader.entity,
            format_count(leader.total)
        ));
        let tied: Vec<&str> = comparison
            .leaders()
            .into_iter()
            .skip(1)
            .map(|e| e.entity.as_str())
            .collect();
        if !tied.is_empty() {
            section.push_str(&format!(" (tied with {})", tied.join(", ")));
        }
        section.push('\n');
    }
    section.push('\n');

    let sorted = comparison.sorted_desc();

    if options.show_charts && !sorted.is_empty() {
        let max = sorted.first().map(|e| e.total).unwrap_or(0.0);
        let label_width = sorted
            .iter()
            .map(|e| e.entity.chars().count())
            .max()
            .unwrap_or(0);

        section.push_str("```text\n");
        for entity in &sorted {
            section.push_str(&format!(
                "{:<width$} |{} {}\n",
                entity.entity,
                bar(entity.total, max, options.chart_width),
                format_count(entity.total),
                width = label_width
            ));
        }
        section.push_str("```\n\n");
    }

    section.push_str("| Entity | Total Medals |\n");
    section.push_str("|:---|:---:|\n");
    for entity in &sorted {
        section.push_str(&format!(
            "| {} | {} |\n",
            entity.entity,
            format_count(entity.total)
        ));
    }
    section.push('\n');

    section
}

/// Generate the focus country drill-down section.
fn generate_drilldown_section(drilldown: &DrillDown, options: &RenderOptions) -> String {
    let mut section = String::new();
    let country = &drilldown.country;

    section.push_str(&format!("## {}\n\n", drilldown_title(country)));
    section.push_str(&format!(
        "Number of games where {} won medals: **{}**\n\n",
        country,
        drilldown.len()
    ));

    section.push_str("### Performance Summary\n\n");
    section.push_str("| Prestige Category | Games |\n");
    section.push_str("|:---|:---:|\n");
    for (category, count) in drilldown.category_counts.iter() {
        section.push_str(&format!("| {} Prestige | {} |\n", category, count));
    }
    if drilldown.uncategorized > 0 {
        section.push_str(&format!("| Uncategorized | {} |\n", drilldown.uncategorized));
    }
    section.push('\n');

    if options.show_charts && !drilldown.is_empty() {
        let counts = &drilldown.category_counts;
        let max = counts.iter().map(|(_, n)| n).max().unwrap_or(0) as f64;

        section.push_str("```text\n");
        for (category, count) in counts.iter() {
            section.push_str(&format!(
                "{:<6} |{} {}\n",
                category.to_string(),
                bar(count as f64, max, options.chart_width),
                count
            ));
        }
        section.push_str("```\n\n");
    }

    if drilldown.is_empty() {
        section.push_str(&format!("{} has no medal-winning games.\n\n", country));
        return section;
    }

    section.push_str("### Medal-Winning Games\n\n");
    section.push_str(&format!(
        "| Game | Prestige Score | {} Medals | Prestige Category |\n",
        country
    ));
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for row in drilldown.sorted_by_score() {
        let category = row
            .prestige_category
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.game,
            format_score(row.prestige_score),
            format_count(row.medals),
            category
        ));
    }
    section.push('\n');

    if options.show_charts {
        let rows = drilldown.sorted_by_score();
        let max = rows.iter().map(|r| r.medals).fold(0.0, f64::max);
        let label_width = rows.iter().map(|r| r.game.chars().count()).max().unwrap_or(0);

        section.push_str("### Medals by Prestige Score\n\n");
        section.push_str("```text\n");
        for row in &rows {
            section.push_str(&format!(
                "{} {:<width$} |{} {}\n",
                format_score(row.prestige_score),
                row.game,
                bar(row.medals, max, options.chart_width),
                format_count(row.medals),
                width = label_width
            ));
        }
        section.push_str("```\n\n");
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by medalreport v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{table, three_games};
    use crate::analysis::{category_proportions, compare_totals, drill_down};
    use crate::models::MedalTable;
    use chrono::Utc;

    fn metadata(data: &MedalTable) -> ReportMetadata {
        ReportMetadata {
            source: "medals.xlsx".to_string(),
            sheet: Some("Sheet1".to_string()),
            generated_at: Utc::now(),
            total_games: data.len(),
            uncategorized_games: data.uncategorized_count(),
            version: "test".to_string(),
        }
    }

    fn create_test_report(data: &MedalTable) -> Report<'_> {
        let countries = vec!["PK".to_string(), "IND".to_string()];
        Report {
            metadata: metadata(data),
            proportions: Some(category_proportions(data, &countries).unwrap()),
            comparison: Some(
                compare_totals(data, "PK", "Group1", &["IND".to_string()]).unwrap(),
            ),
            drilldown: Some(drill_down(data, "PK").unwrap()),
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let data = three_games();
        let report = create_test_report(&data);
        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        assert!(markdown.contains("# Medal Analysis Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Medal Proportions by Prestige"));
        assert!(markdown.contains("## Total Medal Comparison"));
        assert!(markdown.contains("## PK Medal Distribution"));
        assert!(markdown.contains("(#pk-medal-distribution)"));
        assert!(markdown.contains("| PK | 66.67% | 0.00% | 33.33% | 3 |"));
        assert!(markdown.contains("| IND | 0.00% | 75.00% | 25.00% | 4 |"));
        assert!(markdown.contains("- **Highest:** Group1: 5 medals"));
        assert!(markdown.contains("Number of games where PK won medals: **2**"));
    }

    #[test]
    fn test_comparison_table_sorted_desc() {
        let data = three_games();
        let report = create_test_report(&data);
        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        let group = markdown.find("| Group1 | 5 |").unwrap();
        let ind = markdown.find("| IND | 4 |").unwrap();
        let pk = markdown.find("| PK | 3 |").unwrap();
        assert!(group < ind && ind < pk);
    }

    #[test]
    fn test_tied_leader_is_noted() {
        let data = table(&["PK", "IND", "Group1"], &[(0.02, &[4.0, 4.0, 1.0])]);
        let comparison = compare_totals(&data, "PK", "Group1", &["IND".to_string()]).unwrap();

        let section = generate_comparison_section(&comparison, &RenderOptions::default());

        assert!(section.contains("- **Highest:** PK: 4 medals (tied with IND)"));
    }

    #[test]
    fn test_drilldown_sorted_by_score() {
        let data = three_games();
        let section = generate_drilldown_section(
            &drill_down(&data, "PK").unwrap(),
            &RenderOptions::default(),
        );

        let high = section.find("| Game 3 | 0.200 | 1 | High |").unwrap();
        let low = section.find("| Game 1 | 0.020 | 2 | Low |").unwrap();
        assert!(high < low);
        assert!(section.contains("| Medium Prestige | 0 |"));
    }

    #[test]
    fn test_uncategorized_games_are_flagged() {
        let data = table(&["PK", "IND", "Group1"], &[(0.3, &[1.0, 0.0, 0.0])]);
        let report = Report {
            metadata: metadata(&data),
            proportions: Some(
                category_proportions(&data, &["PK".to_string()]).unwrap(),
            ),
            comparison: None,
            drilldown: Some(drill_down(&data, "PK").unwrap()),
        };

        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        assert!(markdown.contains("- **Uncategorized Games:** 1"));
        assert!(markdown.contains("| Uncategorized |"));
        assert!(!markdown.contains("## Total Medal Comparison"));
    }

    #[test]
    fn test_charts_can_be_disabled() {
        let data = three_games();
        let report = create_test_report(&data);
        let options = RenderOptions {
            show_charts: false,
            chart_width: 40,
        };

        let markdown = generate_markdown_report(&report, &options);

        assert!(!markdown.contains("```text"));
    }

    #[test]
    fn test_drilldown_charts() {
        let data = three_games();
        let drilldown = drill_down(&data, "PK").unwrap();
        let options = RenderOptions {
            show_charts: true,
            chart_width: 10,
        };

        let section = generate_drilldown_section(&drilldown, &options);

        assert!(section.contains(&format!("Low    |{} 1\n", "█".repeat(10))));
        assert!(section.contains("Medium | 0\n"));
        assert!(section.contains(&format!("High   |{} 1\n", "█".repeat(10))));
        assert!(section.contains("### Medals by Prestige Score"));

        let high = section
            .find(&format!("0.200 Game 3 |{} 1\n", "█".repeat(5)))
            .unwrap();
        let low = section
            .find(&format!("0.020 Game 1 |{} 2\n", "█".repeat(10)))
            .unwrap();
        assert!(high < low);

        let plain = generate_drilldown_section(
            &drilldown,
            &RenderOptions {
                show_charts: false,
                chart_width: 10,
            },
        );
        assert!(!plain.contains("```text"));
        assert!(!plain.contains("### Medals by Prestige Score"));
    }

    #[test]
    fn test_generate_json_report() {
        let data = three_games();
        let report = create_test_report(&data);
        let json = generate_json_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["total_games"], 3);
        assert_eq!(value["comparison"]["leader"], "Group1");
        assert_eq!(value["drilldown"]["category_counts"]["low"], 1);
        assert_eq!(value["drilldown"]["rows"][1]["prestige_category"], "High");
        assert_eq!(value["proportions"]["rows"][1]["proportions"]["medium"], 0.75);
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_count(12.0), "12");
        assert_eq!(format_count(2.5), "2.50");
        assert_eq!(format_percent(2.0 / 3.0), "66.67%");
        assert_eq!(format_score(None), "-");
        assert_eq!(anchor("PK Medal Distribution"), "pk-medal-distribution");
    }

    #[test]
    fn test_write_report() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("report.md");

        write_report("# Report\n", &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report\n");
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("out/nested/report.md");

        write_report("# Report\n", &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report\n");
    }
}
