//! XLSX constants and default preset factories.

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Marker appended to a sheet name that collides with an earlier tab.
pub const C_SHEET_NAME_COLLISION_MARKER: char = '-';
/// Scale applied to the widest text of a column to get its final width.
pub const N_WIDTH_COLUMN_SCALE: f64 = 1.2;

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Header row cell format.
    Header,
    /// Data row cell format.
    Body,
}

/// Build default format preset for `key`.
///
/// Header cells are bold, data cells carry a thin border on all sides.
pub fn derive_default_xlsx_format(key: EnumFmtKey) -> SpecCellFormat {
    match key {
        EnumFmtKey::Header => SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        },
        EnumFmtKey::Body => SpecCellFormat {
            border: Some(1),
            ..Default::default()
        },
    }
}
