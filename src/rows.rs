//! # Row Model and Source
//!
//! One row is one unit of work. Rows live in an external tabular store
//! (a spreadsheet or equivalent); the core only reads and writes cells by
//! index through the [`RowSource`] trait, treating three columns as
//! semantically fixed: input text, eligibility flag, result.

use crate::error::{BatchError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three columns the core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetColumn {
    /// Review text to classify.
    Input,
    /// Truthy cell marks the row as wanting processing.
    Flag,
    /// Sentiment label, written back on success.
    Result,
}

impl fmt::Display for SheetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Flag => write!(f, "flag"),
            Self::Result => write!(f, "result"),
        }
    }
}

/// One unit of work, assembled from the three fixed columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 0-based index within the working set.
    pub index: usize,
    pub input_text: String,
    /// Optional dialect/category tag woven into the prompt.
    pub aux_label: Option<String>,
    /// Whether the flag cell marked this row for processing.
    pub flag: bool,
    /// Sentiment label, present once computed.
    pub result: Option<String>,
}

impl Row {
    /// A row is eligible iff it is flagged, has input, and lacks a result.
    ///
    /// Skipping ineligible rows is what makes re-running a window after a
    /// crash idempotent: already-labeled rows are never reprocessed.
    pub fn eligible(&self) -> bool {
        self.flag && !self.input_text.trim().is_empty() && self.result.is_none()
    }
}

/// Spreadsheet truthiness: any non-empty cell counts, except explicit
/// false markers.
pub fn is_truthy(cell: &str) -> bool {
    let trimmed = cell.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("false") && trimmed != "0"
}

/// External tabular store the rows live in.
pub trait RowSource: Send + Sync {
    /// Number of rows in the working set.
    fn row_count(&self) -> Result<usize>;
    /// Read cells of `column` for row indices `[from, to)`, in order.
    /// Blank cells come back as empty strings.
    fn read_column_range(&self, column: SheetColumn, from: usize, to: usize)
        -> Result<Vec<String>>;
    /// Write one cell. The runner writes results through immediately so a
    /// crash mid-batch loses at most the in-flight row.
    fn write_cell(&self, column: SheetColumn, row: usize, value: &str) -> Result<()>;
}

/// Read all three columns and assemble the flat ordered row list for one
/// tick. The snapshot is re-read every tick; results written by earlier
/// batches show up as ineligible rows here.
pub fn load_rows(source: &dyn RowSource) -> Result<Vec<Row>> {
    let count = source.row_count()?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let inputs = source.read_column_range(SheetColumn::Input, 0, count)?;
    let flags = source.read_column_range(SheetColumn::Flag, 0, count)?;
    let results = source.read_column_range(SheetColumn::Result, 0, count)?;

    let rows = inputs
        .into_iter()
        .zip(flags)
        .zip(results)
        .enumerate()
        .map(|(index, ((input, flag), result))| Row {
            index,
            input_text: input,
            aux_label: None,
            flag: is_truthy(&flag),
            result: if result.trim().is_empty() {
                None
            } else {
                Some(result)
            },
        })
        .collect();

    Ok(rows)
}

/// In-memory three-column sheet for tests and ephemeral embedding.
#[derive(Debug, Default)]
pub struct InMemorySheet {
    cells: Mutex<Vec<[String; 3]>>,
}

impl InMemorySheet {
    /// Build a sheet from `(input, flag, result)` triples.
    pub fn new(rows: &[(&str, &str, &str)]) -> Self {
        let cells = rows
            .iter()
            .map(|(input, flag, result)| {
                [input.to_string(), flag.to_string(), result.to_string()]
            })
            .collect();
        Self {
            cells: Mutex::new(cells),
        }
    }

    /// Result cell of `row`, `None` when blank. Test convenience.
    pub fn result(&self, row: usize) -> Option<String> {
        let cells = self.cells.lock();
        cells.get(row).and_then(|r| {
            if r[2].is_empty() {
                None
            } else {
                Some(r[2].clone())
            }
        })
    }

    fn column_slot(column: SheetColumn) -> usize {
        match column {
            SheetColumn::Input => 0,
            SheetColumn::Flag => 1,
            SheetColumn::Result => 2,
        }
    }
}

impl RowSource for InMemorySheet {
    fn row_count(&self) -> Result<usize> {
        Ok(self.cells.lock().len())
    }

    fn read_column_range(
        &self,
        column: SheetColumn,
        from: usize,
        to: usize,
    ) -> Result<Vec<String>> {
        let cells = self.cells.lock();
        let slot = Self::column_slot(column);
        let to = to.min(cells.len());
        if from >= to {
            return Ok(Vec::new());
        }
        Ok(cells[from..to].iter().map(|r| r[slot].clone()).collect())
    }

    fn write_cell(&self, column: SheetColumn, row: usize, value: &str) -> Result<()> {
        let mut cells = self.cells.lock();
        let len = cells.len();
        let target = cells.get_mut(row).ok_or_else(|| {
            BatchError::RowSourceError(format!("Row {row} out of bounds (rows: {len})"))
        })?;
        target[Self::column_slot(column)] = value.to_string();
        Ok(())
    }
}
