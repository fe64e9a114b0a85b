//! `ucsinv_io_xlsx` v1:
//! Schema-driven inventory workbook kernel.
//!
//! Modules:
//! - `conf`   : constants and default format presets
//! - `spec`   : schema/options/report models and errors
//! - `util`   : column width tracking and sheet name registry
//! - `source` : data source trait and records
//! - `sink`   : workbook sink trait and the XLSX sink
//! - `writer` : tab builder and report orchestration
pub mod conf;
pub mod sink;
pub mod source;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_COLLISION_MARKER, N_LEN_EXCEL_SHEET_NAME_MAX, N_WIDTH_COLUMN_SCALE,
    TUP_EXCEL_ILLEGAL,
};
pub use sink::{WorkbookSink, XlsxSink};
pub use source::{InventorySource, MemorySource, Record};
pub use spec::{
    EnumSheetNameCollisionRule, ReportError, SpecCellFormat, SpecReportOptions, SpecReportSchema,
    SpecTab, SpecTabEntry, SpecTabReport, SpecXlsxReport,
};
pub use util::{ColumnWidthTracker, TabNameRegistry, sanitize_sheet_name};
pub use writer::{XlsxReportWriter, generate_report, generate_report_into};
