//! Report schema, format and option models, plus the top-level error type.

use std::error::Error as StdError;
use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::conf::{EnumFmtKey, derive_default_xlsx_format};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, deserializable from the `formats` config block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SchemaSpecification

/// One schema entry as it appears under `tabs:` in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecTabEntry {
    /// Object class identifier to query.
    #[serde(rename = "class")]
    pub class_id: String,
    /// Attribute names, also used as header text.
    pub columns: Vec<String>,
}

/// Ordered mapping of tab name to schema entry.
///
/// Iteration order is the order the tabs were declared in.
pub type SpecReportSchema = IndexMap<String, SpecTabEntry>;

/// Fully-resolved tab description handed to the tab builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTab {
    /// Requested tab name (before length/collision handling).
    pub name: String,
    /// Object class identifier to query.
    pub class_id: String,
    /// Ordered attribute names.
    pub columns: Vec<String>,
}

impl SpecTab {
    /// Build a tab description from one schema entry.
    pub fn from_entry(name: &str, entry: &SpecTabEntry) -> Self {
        Self {
            name: name.to_string(),
            class_id: entry.class_id.clone(),
            columns: entry.columns.clone(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Strategy used when a sheet name collides with an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumSheetNameCollisionRule {
    /// Append a single `-` once. A third colliding name is not resolved.
    #[default]
    Marker,
    /// Append `__2`, `__3`, ... until the name is unique.
    Numbered,
}

/// Writer-wide options controlling sheet naming and cell formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportOptions {
    /// Header row cell format.
    pub fmt_header: SpecCellFormat,
    /// Data row cell format.
    pub fmt_body: SpecCellFormat,
    /// Sheet name collision strategy.
    pub rule_name_collision: EnumSheetNameCollisionRule,
    /// Replace characters Excel rejects before truncation.
    pub if_sanitize_sheet_names: bool,
}

impl Default for SpecReportOptions {
    fn default() -> Self {
        Self {
            fmt_header: derive_default_xlsx_format(EnumFmtKey::Header),
            fmt_body: derive_default_xlsx_format(EnumFmtKey::Body),
            rule_name_collision: EnumSheetNameCollisionRule::Marker,
            if_sanitize_sheet_names: false,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Outcome of one built tab.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecTabReport {
    /// Actual sheet name in workbook.
    pub sheet_name: String,
    /// Queried class identifier.
    pub class_id: String,
    /// Number of data rows written (header excluded).
    pub n_rows: usize,
    /// Number of columns.
    pub n_cols: usize,
    /// Final `(column, width)` pairs applied to the sheet.
    pub widths: Vec<(usize, f64)>,
}

/// Per-run report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecXlsxReport {
    /// Tabs built, in workbook order.
    pub tabs: Vec<SpecTabReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Total data rows across all tabs.
    pub fn row_count(&self) -> usize {
        self.tabs.iter().map(|tab| tab.n_rows).sum()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} tabs={} rows={} warnings={}",
            self.tabs.len(),
            self.row_count(),
            self.warnings.len()
        )
    }
}

impl fmt::Display for SpecXlsxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[REPORT]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Report generation failures. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The data source failed to resolve a class query.
    #[error("query for class {class_id:?} failed: {source}")]
    DataSource {
        /// Class that was queried.
        class_id: String,
        /// Underlying data source error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// A record does not expose a requested column.
    #[error("{} of class {class_id:?} has no attribute {attribute:?}", .dn.as_deref().unwrap_or("record"))]
    MissingAttribute {
        /// Class of the offending record.
        class_id: String,
        /// Requested attribute name.
        attribute: String,
        /// Distinguished name of the record, when it carries one.
        dn: Option<String>,
    },
    /// Workbook write/save error.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// The serialized workbook could not be written to disk.
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        /// Output file path.
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Row/column index does not fit the sheet grid.
    #[error("{0}")]
    IndexOverflow(String),
    /// Write attempted after the workbook was closed.
    #[error("Cannot write after close().")]
    Closed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlays_only_set_fields() {
        let base = SpecCellFormat {
            font_name: Some("Calibri".to_string()),
            border: Some(1),
            ..Default::default()
        };
        let merged = base.merge(&SpecCellFormat {
            border: Some(2),
            bold: Some(true),
            ..Default::default()
        });

        assert_eq!(merged.font_name.as_deref(), Some("Calibri"));
        assert_eq!(merged.border, Some(2));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.italic, None);
    }

    #[test]
    fn test_report_format_sums_rows() {
        let mut report = SpecXlsxReport::default();
        for (name, n_rows) in [("Blades", 3), ("Chassis", 2)] {
            report.tabs.push(SpecTabReport {
                sheet_name: name.to_string(),
                class_id: "x".to_string(),
                n_rows,
                n_cols: 1,
                widths: vec![],
            });
        }
        report.warn("w");

        assert_eq!(report.to_string(), "[REPORT] tabs=2 rows=5 warnings=1");
    }

    #[test]
    fn test_missing_attribute_message_names_record() {
        let err = ReportError::MissingAttribute {
            class_id: "computeBlade".to_string(),
            attribute: "Status".to_string(),
            dn: Some("sys/chassis-1/blade-1".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "sys/chassis-1/blade-1 of class \"computeBlade\" has no attribute \"Status\""
        );
    }
}
