//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a measurement value, dropping the fraction when it is whole
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Color an interference score; high scores mean heavy interference
pub fn color_score(score: f64) -> String {
    let formatted = format!("{:>5.1}", score);
    if score >= 75.0 {
        formatted.red().to_string()
    } else if score >= 40.0 {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}

/// Render a 0-100 score as a proportional bar
pub fn score_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 100.0) / 5.0).round() as usize;
    let bar = "▇".repeat(filled);
    if score >= 75.0 {
        bar.red().to_string()
    } else if score >= 40.0 {
        bar.yellow().to_string()
    } else {
        bar.green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_trims_whole_numbers() {
        assert_eq!(format_value(10.0), "10");
        assert_eq!(format_value(1.25), "1.25");
        assert_eq!(format_value(1.5), "1.50");
    }

    #[test]
    fn test_score_bar_width_tracks_score() {
        colored::control::set_override(false);
        assert_eq!(score_bar(0.0), "");
        assert_eq!(score_bar(50.0).chars().count(), 10);
        assert_eq!(score_bar(100.0).chars().count(), 20);
        assert_eq!(score_bar(250.0).chars().count(), 20);
        colored::control::unset_override();
    }
}
