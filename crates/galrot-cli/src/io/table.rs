//! Header-driven CSV tables.
//!
//! ## Purpose
//!
//! Every table the pipeline exchanges is a comma-separated file with a
//! header row. [`Table`] reads such a file into strings and hands out
//! columns by name; [`TableWriter`] emits one with `writeln!`.
//!
//! ## Design notes
//!
//! * **By name**: Columns are located through the header, never by position,
//!   so extra columns and any column order are accepted.
//! * **Missing values**: Empty cells and `nan` parse as NaN; NaN is written
//!   as an empty cell.
//!
//! ## Non-goals
//!
//! * Quoted fields containing commas are not supported.

// External dependencies
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

// Internal dependencies
use crate::error::{PathContext, PipelineError, Result};

// ============================================================================
// Reading
// ============================================================================

/// A CSV file held as strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// File name used in error messages.
    pub file: String,

    /// Header cells.
    pub headers: Vec<String>,

    /// Data rows, each with one cell per header.
    pub rows: Vec<Vec<String>>,
}

fn split_cells(line: &str) -> Vec<String> {
    line.split(',')
        .map(|c| c.trim().trim_matches('"').to_string())
        .collect()
}

impl Table {
    /// Read and parse a CSV file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).at(path)?;
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&file, &text)
    }

    /// Parse CSV text; `file` only labels errors.
    pub fn parse(file: &str, text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let headers = match lines.next() {
            Some((_, h)) => split_cells(h.trim_start_matches('\u{feff}')),
            None => {
                return Err(PipelineError::EmptyTable {
                    file: file.to_string(),
                })
            }
        };

        let mut rows = Vec::new();
        for (i, line) in lines {
            let cells = split_cells(line);
            if cells.len() != headers.len() {
                return Err(PipelineError::Parse {
                    file: file.to_string(),
                    line: i + 1,
                    message: format!("expected {} cells, found {}", headers.len(), cells.len()),
                });
            }
            rows.push(cells);
        }

        Ok(Self {
            file: file.to_string(),
            headers,
            rows,
        })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// True when the column exists.
    pub fn has(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    /// Fail unless every named column exists.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !self.has(n))
            .map(|n| n.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::MissingColumns {
                file: self.file.clone(),
                missing,
                found: self.headers.clone(),
            })
        }
    }

    /// Fail when the table has no data rows.
    pub fn require_rows(&self) -> Result<()> {
        if self.is_empty() {
            Err(PipelineError::EmptyTable {
                file: self.file.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.index(name).ok_or_else(|| PipelineError::MissingColumns {
            file: self.file.clone(),
            missing: vec![name.to_string()],
            found: self.headers.clone(),
        })
    }

    /// A column parsed as floats.
    pub fn floats(&self, name: &str) -> Result<Vec<f64>> {
        let j = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                parse_f64(&row[j]).ok_or_else(|| PipelineError::Parse {
                    file: self.file.clone(),
                    line: i + 2,
                    message: format!("column {name}: not a number: '{}'", row[j]),
                })
            })
            .collect()
    }

    /// A column as strings.
    pub fn strings(&self, name: &str) -> Result<Vec<&str>> {
        let j = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[j].as_str()).collect())
    }

    /// First value of a broadcast metadata column.
    pub fn first_str(&self, name: &str) -> Result<&str> {
        self.require_rows()?;
        let j = self.column_index(name)?;
        Ok(self.rows[0][j].as_str())
    }

    /// First value of a broadcast numeric column.
    pub fn first_f64(&self, name: &str) -> Result<f64> {
        let s = self.first_str(name)?;
        parse_f64(s).ok_or_else(|| PipelineError::Parse {
            file: self.file.clone(),
            line: 2,
            message: format!("column {name}: not a number: '{s}'"),
        })
    }
}

/// Parse a cell; empty and `nan` cells are NaN.
pub fn parse_f64(cell: &str) -> Option<f64> {
    let s = cell.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

/// Parse a 0/1 (or true/false) flag cell.
pub fn parse_flag(cell: &str) -> Option<bool> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "1.0" => Some(true),
        "0" | "false" | "0.0" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Format a float for a CSV cell; NaN becomes an empty cell.
pub fn fmt_f64(x: f64) -> String {
    if x.is_nan() {
        String::new()
    } else if x != 0.0 && (x.abs() < 1e-4 || x.abs() >= 1e15) {
        format!("{x:e}")
    } else {
        format!("{x}")
    }
}

/// Accumulates rows and writes them as CSV.
#[derive(Debug, Clone)]
pub struct TableWriter {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableWriter {
    /// Start a table with the given header.
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have one cell per header.
    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// Number of rows pushed so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows were pushed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.headers.join(","));
        for row in &self.rows {
            let _ = writeln!(out, "{}", row.join(","));
        }
        out
    }

    /// Write the table, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).at(parent)?;
        }
        fs::write(path, self.render()).at(path)
    }
}
