//! Report writer kernel: schema entries in, one populated sheet per entry out.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::conf::N_WIDTH_COLUMN_SCALE;
use crate::sink::{WorkbookSink, XlsxSink};
use crate::source::InventorySource;
use crate::spec::{
    ReportError, SpecReportOptions, SpecReportSchema, SpecTab, SpecTabReport, SpecXlsxReport,
};
use crate::util::{ColumnWidthTracker, TabNameRegistry};

/// Stateful report writer bound to one sink for one run.
///
/// Owns the run's [`TabNameRegistry`]; every tab gets its own
/// [`ColumnWidthTracker`].
pub struct XlsxReportWriter<S: WorkbookSink> {
    sink: S,
    registry: TabNameRegistry,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl<S: WorkbookSink> XlsxReportWriter<S> {
    pub fn new(sink: S, options: &SpecReportOptions) -> Self {
        Self {
            sink,
            registry: TabNameRegistry::new(
                options.rule_name_collision,
                options.if_sanitize_sheet_names,
            ),
            report: SpecXlsxReport::default(),
            if_closed: false,
        }
    }

    /// Per-tab outcomes recorded so far.
    pub fn report(&self) -> &SpecXlsxReport {
        &self.report
    }

    pub fn into_report(self) -> SpecXlsxReport {
        self.report
    }

    /// Build one tab: header row, one row per queried record, column widths.
    ///
    /// Fails on the first missing attribute or failed query; cells already
    /// written to the sheet stay there.
    pub fn write_tab<D: InventorySource>(
        &mut self,
        source: &mut D,
        tab: &SpecTab,
    ) -> Result<(), ReportError> {
        if self.if_closed {
            return Err(ReportError::Closed);
        }

        let sheet_name = self.registry.reserve(&tab.name);
        if sheet_name != tab.name {
            warn!(requested = %tab.name, resolved = %sheet_name, "sheet name adjusted");
            self.report.warn(format!(
                "Sheet name {:?} written as {sheet_name:?}.",
                tab.name
            ));
        }
        let idx_sheet = self.sink.add_sheet(&sheet_name)?;

        let mut tracker = ColumnWidthTracker::new();
        for (col_idx, c_col) in tab.columns.iter().enumerate() {
            self.sink.write_header(idx_sheet, 0, col_idx, c_col)?;
            tracker.record(col_idx, c_col);
        }

        let l_records =
            source
                .query_class(&tab.class_id)
                .map_err(|err| ReportError::DataSource {
                    class_id: tab.class_id.clone(),
                    source: Box::new(err),
                })?;
        debug!(class_id = %tab.class_id, n_records = l_records.len(), "class query resolved");

        for (n_idx_record, record) in l_records.iter().enumerate() {
            let row_idx = n_idx_record + 1;
            for (col_idx, c_col) in tab.columns.iter().enumerate() {
                let value = record.get(c_col)?;
                self.sink.write_body(idx_sheet, row_idx, col_idx, value)?;
                tracker.record(col_idx, value);
            }
        }

        let l_widths = tracker.scaled_widths(N_WIDTH_COLUMN_SCALE);
        for (col_idx, width) in &l_widths {
            self.sink.set_column_width(idx_sheet, *col_idx, *width)?;
        }

        info!(
            sheet = %sheet_name,
            class_id = %tab.class_id,
            n_rows = l_records.len(),
            "tab written"
        );
        self.report.tabs.push(SpecTabReport {
            sheet_name,
            class_id: tab.class_id.clone(),
            n_rows: l_records.len(),
            n_cols: tab.columns.len(),
            widths: l_widths,
        });
        Ok(())
    }

    /// Finalize the sink. Idempotent.
    pub fn close(&mut self) -> Result<(), ReportError> {
        if self.if_closed {
            return Ok(());
        }
        self.sink.close()?;
        self.if_closed = true;
        Ok(())
    }
}

/// Generate the workbook at `path_file_out` from `schema`.
pub fn generate_report<D: InventorySource>(
    source: &mut D,
    path_file_out: impl AsRef<Path>,
    schema: &SpecReportSchema,
    options: &SpecReportOptions,
) -> Result<SpecXlsxReport, ReportError> {
    let sink = XlsxSink::new(path_file_out, &options.fmt_header, &options.fmt_body);
    info!(file_out = %sink.file_out().display(), n_tabs = schema.len(), "generating workbook");
    generate_report_into(sink, source, schema, options)
}

/// Generate all tabs of `schema` into `sink`, in schema order, then close it once.
///
/// The first error aborts the run; the sink is not closed in that case.
pub fn generate_report_into<S: WorkbookSink, D: InventorySource>(
    sink: S,
    source: &mut D,
    schema: &SpecReportSchema,
    options: &SpecReportOptions,
) -> Result<SpecXlsxReport, ReportError> {
    let mut writer = XlsxReportWriter::new(sink, options);
    for (c_name, entry) in schema {
        writer.write_tab(source, &SpecTab::from_entry(c_name, entry))?;
    }
    writer.close()?;
    Ok(writer.into_report())
}
