//! Per-tab and per-run bookkeeping used by the report writer.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{C_SHEET_NAME_COLLISION_MARKER, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::EnumSheetNameCollisionRule;

////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidth

/// Widest text seen so far per column index, for one tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnWidthTracker {
    dict_width_by_col: BTreeMap<usize, usize>,
}

impl ColumnWidthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `max(current, len(text))` for `col_idx`.
    pub fn record(&mut self, col_idx: usize, text: &str) {
        let n_len = text.chars().count();
        self.dict_width_by_col
            .entry(col_idx)
            .and_modify(|n_width| *n_width = usize::max(*n_width, n_len))
            .or_insert(n_len);
    }

    /// Tracked widths, ordered by column index.
    pub fn widths(&self) -> &BTreeMap<usize, usize> {
        &self.dict_width_by_col
    }

    /// Tracked widths multiplied by `scale`, ordered by column index.
    pub fn scaled_widths(&self, scale: f64) -> Vec<(usize, f64)> {
        self.dict_width_by_col
            .iter()
            .map(|(col_idx, n_width)| (*col_idx, *n_width as f64 * scale))
            .collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNames

/// Sheet names handed out during one report run.
///
/// Names are compared case-insensitively, as Excel does.
#[derive(Debug, Clone, Default)]
pub struct TabNameRegistry {
    rule_collision: EnumSheetNameCollisionRule,
    if_sanitize: bool,
    set_names_lower: BTreeSet<String>,
}

impl TabNameRegistry {
    pub fn new(rule_collision: EnumSheetNameCollisionRule, if_sanitize: bool) -> Self {
        Self {
            rule_collision,
            if_sanitize,
            set_names_lower: BTreeSet::new(),
        }
    }

    /// Resolve `candidate` to the name the next sheet should use, and register it.
    ///
    /// With [`EnumSheetNameCollisionRule::Marker`] a collision is resolved by a
    /// single appended marker; a further collision on the marked name is returned
    /// as-is.
    pub fn reserve(&mut self, candidate: &str) -> String {
        let c_name_base = if self.if_sanitize {
            sanitize_sheet_name(candidate, "_")
        } else {
            candidate.to_string()
        };
        let c_name: String = c_name_base
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();

        let c_name_resolved = if !self.contains(&c_name) {
            c_name
        } else {
            match self.rule_collision {
                EnumSheetNameCollisionRule::Marker => {
                    format!("{c_name}{C_SHEET_NAME_COLLISION_MARKER}")
                }
                EnumSheetNameCollisionRule::Numbered => self.derive_numbered_name(&c_name),
            }
        };

        self.set_names_lower.insert(c_name_resolved.to_lowercase());
        c_name_resolved
    }

    /// Whether `name` is already taken (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.set_names_lower.contains(&name.to_lowercase())
    }

    /// Number of distinct registered names.
    pub fn len(&self) -> usize {
        self.set_names_lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set_names_lower.is_empty()
    }

    fn derive_numbered_name(&self, name: &str) -> String {
        let mut n_idx = 2usize;
        loop {
            let candidate = create_sheet_identifier(name, n_idx);
            if !self.contains(&candidate) {
                return candidate;
            }
            n_idx += 1;
        }
    }
}

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Create suffixed sheet name (`base__2`, `base__3`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("__{idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
