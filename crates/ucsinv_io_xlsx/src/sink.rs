//! Workbook sink abstraction and its `rust_xlsxwriter` implementation.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};

use crate::conf::N_NROWS_EXCEL_MAX;
use crate::spec::{ReportError, SpecCellFormat};

/// Cell-level write surface the report writer drives.
///
/// Sheets are addressed by the index returned from [`WorkbookSink::add_sheet`].
pub trait WorkbookSink {
    /// Append a sheet named `sheet_name`; return its index.
    fn add_sheet(&mut self, sheet_name: &str) -> Result<usize, ReportError>;

    /// Write one header cell.
    fn write_header(
        &mut self,
        idx_sheet: usize,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), ReportError>;

    /// Write one data cell.
    fn write_body(
        &mut self,
        idx_sheet: usize,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), ReportError>;

    /// Set the display width of one column.
    fn set_column_width(
        &mut self,
        idx_sheet: usize,
        col_idx: usize,
        width: f64,
    ) -> Result<(), ReportError>;

    /// Flush and close the workbook.
    fn close(&mut self) -> Result<(), ReportError>;
}

impl<S: WorkbookSink + ?Sized> WorkbookSink for &mut S {
    fn add_sheet(&mut self, sheet_name: &str) -> Result<usize, ReportError> {
        (**self).add_sheet(sheet_name)
    }

    fn write_header(
        &mut self,
        idx_sheet: usize,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), ReportError> {
        (**self).write_header(idx_sheet, row_idx, col_idx, text)
    }

    fn write_body(
        &mut self,
        idx_sheet: usize,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), ReportError> {
        (**self).write_body(idx_sheet, row_idx, col_idx, text)
    }

    fn set_column_width(
        &mut self,
        idx_sheet: usize,
        col_idx: usize,
        width: f64,
    ) -> Result<(), ReportError> {
        (**self).set_column_width(idx_sheet, col_idx, width)
    }

    fn close(&mut self) -> Result<(), ReportError> {
        (**self).close()
    }
}

/// Workbook sink buffered in memory and written to `path_file_out` on close.
pub struct XlsxSink {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_header: Format,
    fmt_body: Format,
    n_sheets: usize,
}

impl XlsxSink {
    pub fn new(
        path_file_out: impl AsRef<Path>,
        fmt_header: &SpecCellFormat,
        fmt_body: &SpecCellFormat,
    ) -> Self {
        Self {
            path_file_out: path_file_out.as_ref().to_path_buf(),
            workbook: Workbook::new(),
            fmt_header: derive_rust_xlsx_format(fmt_header),
            fmt_body: derive_rust_xlsx_format(fmt_body),
            n_sheets: 0,
        }
    }

    /// Return output file path.
    pub fn file_out(&self) -> &Path {
        &self.path_file_out
    }
}

impl WorkbookSink for XlsxSink {
    fn add_sheet(&mut self, sheet_name: &str) -> Result<usize, ReportError> {
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;
        self.n_sheets += 1;
        Ok(self.n_sheets - 1)
    }

    fn write_header(
        &mut self,
        idx_sheet: usize,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), ReportError> {
        self.workbook
            .worksheet_from_index(idx_sheet)?
            .write_string_with_format(
                cast_row_num(row_idx)?,
                cast_col_num(col_idx)?,
                text,
                &self.fmt_header,
            )?;
        Ok(())
    }

    fn write_body(
        &mut self,
        idx_sheet: usize,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), ReportError> {
        self.workbook
            .worksheet_from_index(idx_sheet)?
            .write_string_with_format(
                cast_row_num(row_idx)?,
                cast_col_num(col_idx)?,
                text,
                &self.fmt_body,
            )?;
        Ok(())
    }

    fn set_column_width(
        &mut self,
        idx_sheet: usize,
        col_idx: usize,
        width: f64,
    ) -> Result<(), ReportError> {
        self.workbook
            .worksheet_from_index(idx_sheet)?
            .set_column_width(cast_col_num(col_idx)?, width)?;
        Ok(())
    }

    /// Serialize in memory, then write the file. A workbook rejected at save
    /// time leaves nothing at `path_file_out`.
    fn close(&mut self) -> Result<(), ReportError> {
        let l_bytes = self.workbook.save_to_buffer()?;
        std::fs::write(&self.path_file_out, l_bytes).map_err(|source| ReportError::Io {
            path: self.path_file_out.clone(),
            source,
        })?;
        Ok(())
    }
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, ReportError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(ReportError::IndexOverflow(format!(
            "row index overflow: {value} (sheet limit {N_NROWS_EXCEL_MAX})"
        )));
    }
    u32::try_from(value)
        .map_err(|_| ReportError::IndexOverflow(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, ReportError> {
    u16::try_from(value)
        .map_err(|_| ReportError::IndexOverflow(format!("column index overflow: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_row_num_rejects_rows_past_sheet_limit() {
        assert_eq!(cast_row_num(0).ok(), Some(0));
        assert!(matches!(
            cast_row_num(N_NROWS_EXCEL_MAX),
            Err(ReportError::IndexOverflow(_))
        ));
    }

    #[test]
    fn test_cast_col_num_rejects_overflow() {
        assert!(matches!(
            cast_col_num(usize::from(u16::MAX) + 1),
            Err(ReportError::IndexOverflow(_))
        ));
    }

    #[test]
    fn test_derive_format_border_falls_back_to_none() {
        assert!(matches!(derive_format_border(1), FormatBorder::Thin));
        assert!(matches!(derive_format_border(99), FormatBorder::None));
    }
}
