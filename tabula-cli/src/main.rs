mod args;
mod input;
mod output;

use std::fs::File;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::info;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};
use tabula_lib::config::GridConfig;
use tabula_lib::filter::FilterMode;
use tabula_lib::grid::{DataGrid, FetchOutcome, Mode};
use tabula_lib::model::RowKey;
use tabula_lib::sort::SortState;
use tabula_lib::source::MemorySource;

use crate::args::{Cli, ExportScope, SourceMode};
use crate::input::Record;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = load_config(&cli)?;
    let records = input::read_records(&cli.input)?;
    let ids = input::column_ids(&cli.columns, &records);
    let columns = input::build_columns(&ids)?;
    let rows = input::into_rows(records, cli.key.as_deref())?;
    info!("Loaded {} records with {} columns", rows.len(), columns.len());

    let mut grid = match cli.mode {
        SourceMode::Client => DataGrid::client(columns, rows, config)?,
        SourceMode::Server => {
            let source = MemorySource::new(rows, columns.clone()).with_filter_mode(config.filter_mode);
            DataGrid::server(columns, source, config)?
        }
    };

    apply(&mut grid, &cli)?;
    if grid.mode() == Mode::Server {
        fetch(&mut grid).await?;
    }
    for key in &cli.selected {
        grid.toggle_row(&RowKey::from(key))
            .with_context(|| format!("Cannot select '{}'", key))?;
    }

    let table = match cli.export {
        ExportScope::Filtered => grid.export_filtered(),
        ExportScope::Selected => grid.export_selection(),
        ExportScope::Page => grid.export_page(),
    };
    print!("{}", output::render(&table, cli.format)?);
    eprintln!(
        "{}",
        output::summary(grid.page_index(), grid.page_count(), grid.total(), grid.selected_keys().len())
    );

    grid.teardown();
    Ok(())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let installed = match &cli.log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
            WriteLogger::init(cli.log_level, Config::default(), file)
        }
        None => TermLogger::init(cli.log_level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto),
    };
    installed.map_err(|e| anyhow!("Failed to initialize logger: {}", e))
}

fn load_config(cli: &Cli) -> Result<GridConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<GridConfig>(&text).with_context(|| format!("Invalid config in {}", path.display()))?
        }
        None => GridConfig::default(),
    };
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if cli.fuzzy {
        config.filter_mode = FilterMode::Fuzzy;
    }
    config.validate()?;
    Ok(config)
}

/// Push the requested filter, sort and page into the grid.
fn apply(grid: &mut DataGrid<Record>, cli: &Cli) -> Result<()> {
    if let Some(filter) = &cli.filter {
        grid.set_global_filter(filter.as_str())?;
    }
    for (column, text) in &cli.column_filters {
        grid.set_column_filter(column, text.as_str())?;
    }

    let mut sort = SortState::new();
    for key in &cli.sort {
        sort.set(key.column_id.clone(), key.direction);
    }
    grid.set_sort(sort)?;

    grid.set_page(cli.page)?;
    Ok(())
}

async fn fetch(grid: &mut DataGrid<Record>) -> Result<()> {
    grid.fetch_if_needed()?;
    for outcome in grid.wait_idle().await {
        if let FetchOutcome::Failed(error) = outcome {
            return Err(error).context("Page fetch failed");
        }
    }
    Ok(())
}
