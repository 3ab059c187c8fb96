//! Rendering exports

use anyhow::Result;
use tabula_lib::export::ExportTable;

use crate::args::Format;

/// Render `table` in `format`.
pub fn render(table: &ExportTable, format: Format) -> Result<String> {
    Ok(match format {
        Format::Csv => table.to_delimited(b',')?,
        Format::Tsv => table.to_delimited(b'\t')?,
        Format::Json => {
            let mut out = serde_json::to_string_pretty(&table.to_json()?)?;
            out.push('\n');
            out
        }
    })
}

/// One-line status for stderr.
pub fn summary(page_index: usize, page_count: usize, total: usize, selected: usize) -> String {
    // Page numbers are shown 1-based; an empty result still reads as page 1/1
    format!(
        "page {}/{}, {} filtered, {} selected",
        page_index + 1,
        page_count.max(1),
        total,
        selected
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_lib::export::{ExportField, ExportRecord};
    use tabula_lib::model::RowKey;

    fn table() -> ExportTable {
        ExportTable {
            headers: vec!["name".into(), "region".into()],
            records: vec![ExportRecord {
                key: RowKey::from("1"),
                fields: vec![
                    ExportField {
                        header: "name".into(),
                        value: "edge-1".into(),
                    },
                    ExportField {
                        header: "region".into(),
                        value: "north".into(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_render_formats() {
        assert_eq!(render(&table(), Format::Csv).unwrap(), "name,region\nedge-1,north\n");
        assert_eq!(render(&table(), Format::Tsv).unwrap(), "name\tregion\nedge-1\tnorth\n");
        let json: serde_json::Value = serde_json::from_str(&render(&table(), Format::Json).unwrap()).unwrap();
        assert_eq!(json[0]["region"], "north");
    }

    #[test]
    fn test_summary_is_one_based() {
        assert_eq!(summary(2, 3, 45, 1), "page 3/3, 45 filtered, 1 selected");
        assert_eq!(summary(0, 0, 0, 0), "page 1/1, 0 filtered, 0 selected");
    }
}
