//! Raw worksheet cells and their resolution against the shared string table

use crate::errors::{Error, FormatError, LookupError};

/// How the raw value of a cell must be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellKind {
    /// The raw value is the cell text
    #[default]
    Literal,
    /// The raw value is an index into the shared string table
    SharedString,
}

/// A single raw cell, as stored in the worksheet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    kind: CellKind,
    raw: String,
}

impl Cell {
    /// Creates a new `Cell`
    pub fn new(kind: CellKind, raw: impl Into<String>) -> Cell {
        Cell {
            kind,
            raw: raw.into(),
        }
    }

    /// Creates a literal cell
    pub fn literal(raw: impl Into<String>) -> Cell {
        Cell::new(CellKind::Literal, raw)
    }

    /// Creates a shared string reference
    pub fn shared(raw: impl Into<String>) -> Cell {
        Cell::new(CellKind::SharedString, raw)
    }

    /// Gets the cell discriminant
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Gets the raw value, before any shared string indirection
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Gets the effective text of this cell.
    ///
    /// Shared string references are looked up in `strings`, literal cells
    /// are returned as is.
    pub fn resolve<'a>(&'a self, strings: &'a [String]) -> Result<&'a str, Error> {
        match self.kind {
            CellKind::Literal => Ok(&self.raw),
            CellKind::SharedString => {
                let idx = atoi_simd::parse::<usize>(self.raw.trim().as_bytes()).map_err(|_| {
                    FormatError {
                        value: self.raw.clone(),
                        expected: "a shared string index",
                    }
                })?;
                strings.get(idx).map(String::as_str).ok_or_else(|| {
                    LookupError::SharedString {
                        idx,
                        len: strings.len(),
                    }
                    .into()
                })
            }
        }
    }
}

/// Resolves `cell` into an owned string, see [`Cell::resolve`]
pub fn resolve(cell: &Cell, strings: &[String]) -> Result<String, Error> {
    cell.resolve(strings).map(str::to_owned)
}
