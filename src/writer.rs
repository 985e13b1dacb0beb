//! Writing records as an Excel table

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use log::debug;

use crate::errors::Error;
use crate::record::{Field, Record};
use crate::xlsx::write_package;

/// Name of the only sheet written
pub const SHEET_NAME: &str = "Sheet1";

type Formatter<T> = Box<dyn Fn(&T, &Field<T>) -> String>;

/// A builder writing a collection of records into a new workbook
///
/// The first row holds one bold header per field, in declared order, each
/// following row holds one record. The used range is declared as a table.
///
/// ```
/// use std::io::Cursor;
/// use xlshaper::{record, TableWriter, Xlsx};
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// record!(Person { name: String => "Name", age: u32 => "Age" });
///
/// let people = [Person { name: "Ann".to_string(), age: 31 }];
/// let data = TableWriter::new()
///     .header("Name", "Full Name")
///     .write_to(Cursor::new(Vec::new()), &people)
///     .unwrap()
///     .into_inner();
///
/// let mut xlsx = Xlsx::new(Cursor::new(data)).unwrap();
/// let rows = xlsx.rows_by_index(0).unwrap();
/// assert_eq!(rows, [["Full Name", "Age"], ["Ann", "31"]]);
/// ```
pub struct TableWriter<T> {
    headers: HashMap<String, String>,
    formatter: Option<Formatter<T>>,
}

impl<T> Default for TableWriter<T> {
    fn default() -> Self {
        TableWriter {
            headers: HashMap::new(),
            formatter: None,
        }
    }
}

impl<T> fmt::Debug for TableWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableWriter")
            .field("headers", &self.headers)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl<T: Record> TableWriter<T> {
    /// Creates a new `TableWriter`
    pub fn new() -> Self {
        TableWriter::default()
    }

    /// Overrides the header label of the field named `field`
    pub fn header(mut self, field: &str, label: &str) -> Self {
        self.headers.insert(field.to_string(), label.to_string());
        self
    }

    /// Overrides several header labels, keyed by field name
    pub fn headers<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the function converting non empty field values into cell text
    pub fn formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&T, &Field<T>) -> String + 'static,
    {
        self.formatter = Some(Box::new(f));
        self
    }

    /// Gets the header row
    pub fn header_row(&self) -> Vec<String> {
        T::FIELDS
            .iter()
            .map(|f| {
                self.headers
                    .get(f.name())
                    .cloned()
                    .unwrap_or_else(|| f.name().to_string())
            })
            .collect()
    }

    /// Converts a record into its row of cells
    pub fn format_row(&self, record: &T) -> Vec<String> {
        T::FIELDS
            .iter()
            .map(|field| {
                let value = field.get(record);
                match &self.formatter {
                    _ if value.is_empty() => String::new(),
                    Some(f) => f(record, field),
                    None => value.to_string(),
                }
            })
            .collect()
    }

    /// Writes `records` into a new workbook at `path`, replacing any existing file
    pub fn write<P: AsRef<Path>>(&self, path: P, records: &[T]) -> Result<(), Error> {
        let (header, rows) = self.table(records)?;
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        let mut file = write_package(file, SHEET_NAME, &header, &rows)?;
        file.flush()?;
        debug!("wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    /// Writes `records` into `sink`, which is handed back
    pub fn write_to<W: Write + Seek>(&self, sink: W, records: &[T]) -> Result<W, Error> {
        let (header, rows) = self.table(records)?;
        Ok(write_package(sink, SHEET_NAME, &header, &rows)?)
    }

    fn table(&self, records: &[T]) -> Result<(Vec<String>, Vec<Vec<String>>), Error> {
        if T::FIELDS.is_empty() {
            return Err(Error::MissingArgument("fields"));
        }
        let rows = records.iter().map(|r| self.format_row(r)).collect();
        Ok((self.header_row(), rows))
    }
}

/// Writes `records` at `path` with default headers and formatting
pub fn write_records<T: Record, P: AsRef<Path>>(path: P, records: &[T]) -> Result<(), Error> {
    TableWriter::new().write(path, records)
}
