//! Read xlsx rows into maps or typed records, write records back as a table
//!
//! # Status
//!
//! **xlshaper** reads the first (or any) worksheet of an Office Open XML
//! workbook either positionally, keyed by its header row, or straight into
//! user defined records. Records can be written back into a new workbook
//! holding a single formatted table.
//!
//! # Examples
//! ```
//! use chrono::NaiveDate;
//! use std::io::Cursor;
//! use xlshaper::{record, ReadOptions, TableWriter, Xlsx};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Employee {
//!     id: String,
//!     full_name: String,
//!     hire_date: Option<NaiveDate>,
//! }
//!
//! record!(Employee {
//!     id: String => "EEID",
//!     full_name: String => "Full Name",
//!     hire_date: Option<NaiveDate> => "Hire Date",
//! });
//!
//! let staff = vec![Employee {
//!     id: "E02002".to_string(),
//!     full_name: "Kai Le".to_string(),
//!     hire_date: NaiveDate::from_ymd_opt(2022, 2, 15),
//! }];
//!
//! // write them, dates formatted the way they are read back
//! let data = TableWriter::new()
//!     .formatter(|e: &Employee, field| match field.name() {
//!         "Hire Date" => e.hire_date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default(),
//!         _ => field.get(e).to_string(),
//!     })
//!     .write_to(Cursor::new(Vec::new()), &staff)
//!     .unwrap()
//!     .into_inner();
//!
//! // header keys are normalized: "Full Name" becomes "fullname"
//! let mut workbook = Xlsx::new(Cursor::new(data)).unwrap();
//! let rows = workbook.rows_by_header(0).unwrap();
//! assert_eq!(rows[0]["fullname"], "Kai Le");
//!
//! // or read typed records back
//! let read: Vec<Employee> = workbook.records(&ReadOptions::new()).unwrap();
//! assert_eq!(read, staff);
//! ```
#![deny(missing_docs)]

#[macro_use]
mod utils;

mod cell;
mod coerce;
mod errors;
mod extract;
mod key;
mod record;
mod writer;
mod xlsx;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use cell::{resolve, Cell, CellKind};
pub use coerce::{coerce, from_serial, CoerceError, DateFormat, Value};
pub use errors::{ConversionError, Error, FormatError, LookupError};
pub use extract::RowMapping;
pub use key::normalize;
pub use record::{materialize, Field, FieldKind, FieldType, FieldValue, PropertyMap, Record};
pub use writer::{write_records, TableWriter, SHEET_NAME};
pub use xlsx::{write_package, Table, Xlsx, XlsxError, XlsxRowReader};

/// Options of a read call
///
/// ```
/// use xlshaper::{DateFormat, ReadOptions};
///
/// let options = ReadOptions::new()
///     .sheet_index(1)
///     .date_format(DateFormat::new("yyyy-MM-dd").unwrap())
///     .empty_as_default(true);
/// assert_eq!(options.get_sheet_index(), 1);
/// assert_eq!(options.get_date_format().strftime(), "%Y-%m-%d");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    sheet_index: usize,
    date_format: DateFormat,
    empty_as_default: bool,
}

impl ReadOptions {
    /// Creates options reading the first sheet, with `dd/MM/yyyy` dates
    pub fn new() -> Self {
        ReadOptions::default()
    }

    /// Sets the zero based index of the sheet to read
    pub fn sheet_index(mut self, sheet_index: usize) -> Self {
        self.sheet_index = sheet_index;
        self
    }

    /// Sets the format of textual dates
    pub fn date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    /// Keeps the default value of non nullable fields whose cell is empty,
    /// instead of failing
    pub fn empty_as_default(mut self, empty_as_default: bool) -> Self {
        self.empty_as_default = empty_as_default;
        self
    }

    /// Gets the index of the sheet to read
    pub fn get_sheet_index(&self) -> usize {
        self.sheet_index
    }

    /// Gets the format of textual dates
    pub fn get_date_format(&self) -> &DateFormat {
        &self.date_format
    }

    /// Are empty cells read as default values
    pub fn is_empty_as_default(&self) -> bool {
        self.empty_as_default
    }
}

/// Opens a workbook from a file path
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Xlsx<BufReader<File>>, Error> {
    let file = BufReader::new(File::open(path)?);
    Ok(Xlsx::new(file)?)
}

/// Reads every row of a sheet, see [`Xlsx::rows_by_index`]
pub fn read_by_index<P: AsRef<Path>>(
    path: P,
    sheet_index: usize,
) -> Result<Vec<Vec<String>>, Error> {
    open_workbook(path)?.rows_by_index(sheet_index)
}

/// Reads every row of a sheet through `f`, see [`Xlsx::rows_by_index_with`]
pub fn read_by_index_with<P, T, F>(path: P, sheet_index: usize, f: F) -> Result<Vec<T>, Error>
where
    P: AsRef<Path>,
    F: FnMut(usize, Vec<String>) -> Option<T>,
{
    open_workbook(path)?.rows_by_index_with(sheet_index, f)
}

/// Reads the data rows of a sheet, see [`Xlsx::rows_by_header`]
pub fn read_by_header<P: AsRef<Path>>(
    path: P,
    sheet_index: usize,
) -> Result<Vec<RowMapping>, Error> {
    open_workbook(path)?.rows_by_header(sheet_index)
}

/// Reads the data rows of a sheet through `f`, see [`Xlsx::rows_by_header_with`]
pub fn read_by_header_with<P, T, F>(path: P, sheet_index: usize, f: F) -> Result<Vec<T>, Error>
where
    P: AsRef<Path>,
    F: FnMut(RowMapping) -> Option<T>,
{
    open_workbook(path)?.rows_by_header_with(sheet_index, f)
}

/// Reads the data rows of a sheet into records, see [`Xlsx::records`]
pub fn read_records<T: Record, P: AsRef<Path>>(
    path: P,
    options: &ReadOptions,
) -> Result<Vec<T>, Error> {
    open_workbook(path)?.records(options)
}
