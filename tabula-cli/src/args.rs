//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use simplelog::LevelFilter;
use tabula_lib::sort::{Direction, SortKey};

/// Filter, sort, page and export a JSON array of records.
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(about = "Filter, sort, page and export tabular JSON data")]
#[command(version)]
pub struct Cli {
    /// JSON file holding an array of objects
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Field holding each record's identity (defaults to the record position)
    #[arg(short, long, value_name = "FIELD")]
    pub key: Option<String>,

    /// Comma-separated columns, in order (defaults to the first record's fields)
    #[arg(short, long, value_delimiter = ',', value_name = "COLS")]
    pub columns: Vec<String>,

    /// Global filter text
    #[arg(short, long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Per-column filter, repeatable
    #[arg(long = "column-filter", value_name = "COL=TEXT", value_parser = parse_column_filter)]
    pub column_filters: Vec<(String, String)>,

    /// Match the global filter fuzzily
    #[arg(long)]
    pub fuzzy: bool,

    /// Sort key in priority order, repeatable
    #[arg(short, long, value_name = "COL[:asc|desc]", value_parser = parse_sort_key)]
    pub sort: Vec<SortKey>,

    /// Zero-based page index
    #[arg(short, long, default_value_t = 0)]
    pub page: usize,

    /// Rows per page (overrides the config file)
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Select a row by key, repeatable
    #[arg(long = "select", value_name = "KEY")]
    pub selected: Vec<String>,

    /// What to export
    #[arg(short, long, value_enum, default_value_t = ExportScope::Page)]
    pub export: ExportScope,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Run the grid against an in-process page source instead of holding every row
    #[arg(long, value_enum, default_value_t = SourceMode::Client)]
    pub mode: SourceMode,

    /// Grid configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value_t = LevelFilter::Warn)]
    pub log_level: LevelFilter,
}

/// Rows to export.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Every row passing the filters
    Filtered,
    /// Selected rows passing the filter, or every filtered row when none do
    Selected,
    /// The requested page
    Page,
}

/// Output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON array of objects
    Json,
}

/// Where the grid gets its rows.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Hold every row in the grid
    Client,
    /// Fetch pages from a page source
    Server,
}

fn parse_column_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, text)) if !column.trim().is_empty() => Ok((column.trim().to_string(), text.to_string())),
        _ => Err(format!("expected COL=TEXT, got '{s}'")),
    }
}

fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    let (column, direction) = match s.rsplit_once(':') {
        Some((column, "asc")) => (column, Direction::Asc),
        Some((column, "desc")) => (column, Direction::Desc),
        Some((_, other)) => return Err(format!("unknown sort direction '{other}', expected asc or desc")),
        None => (s, Direction::Asc),
    };
    if column.is_empty() {
        return Err("sort column is empty".to_string());
    }
    Ok(SortKey::new(column, direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_key() {
        assert_eq!(parse_sort_key("name").unwrap(), SortKey::new("name", Direction::Asc));
        assert_eq!(parse_sort_key("speed:desc").unwrap(), SortKey::new("speed", Direction::Desc));
        assert!(parse_sort_key("speed:sideways").is_err());
        assert!(parse_sort_key(":asc").is_err());
    }

    #[test]
    fn test_parse_column_filter() {
        assert_eq!(
            parse_column_filter("region=north east").unwrap(),
            ("region".to_string(), "north east".to_string())
        );
        assert!(parse_column_filter("region").is_err());
        assert!(parse_column_filter("=x").is_err());
    }

    #[test]
    fn test_full_command_line() {
        let cli = Cli::try_parse_from([
            "tabula",
            "--input",
            "links.json",
            "--key",
            "id",
            "--columns",
            "name,region",
            "--column-filter",
            "region=north",
            "--sort",
            "name:desc",
            "--sort",
            "region",
            "--select",
            "7",
            "--export",
            "selected",
            "--format",
            "json",
            "--mode",
            "server",
        ])
        .unwrap();
        assert_eq!(cli.columns, vec!["name", "region"]);
        assert_eq!(cli.sort.len(), 2);
        assert_eq!(cli.export, ExportScope::Selected);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.mode, SourceMode::Server);
        assert_eq!(cli.log_level, LevelFilter::Warn);
    }
}
