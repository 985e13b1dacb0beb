//! `Error` management module
//!
//! Provides all error kinds surfaced by read and write calls.

use std::fmt;

use crate::record::FieldKind;
use crate::xlsx::XlsxError;

/// A struct to handle xlshaper specific errors
#[derive(Debug)]
pub enum Error {
    /// Io error
    Io(std::io::Error),
    /// Archive error, surfaced unmodified from the xlsx layer
    Xlsx(XlsxError),
    /// A required input is missing
    MissingArgument(&'static str),
    /// Malformed cell content
    Format(FormatError),
    /// Index out of range
    Lookup(LookupError),
    /// Value cannot be coerced into a record field
    Conversion(ConversionError),
}

from_err!(std::io::Error, Error, Io);
from_err!(XlsxError, Error, Xlsx);
from_err!(FormatError, Error, Format);
from_err!(LookupError, Error, Lookup);
from_err!(ConversionError, Error, Conversion);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Xlsx(e) => write!(f, "Xlsx error: {e}"),
            Error::MissingArgument(name) => write!(f, "Missing required argument '{name}'"),
            Error::Format(e) => write!(f, "{e}"),
            Error::Lookup(e) => write!(f, "{e}"),
            Error::Conversion(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Xlsx(e) => Some(e),
            Error::Format(e) => Some(e),
            Error::Lookup(e) => Some(e),
            Error::Conversion(e) => Some(e),
            Error::MissingArgument(_) => None,
        }
    }
}

/// Cell content that does not have the expected shape
#[derive(Debug, Clone, PartialEq)]
pub struct FormatError {
    /// Raw value found in the cell
    pub value: String,
    /// What the value was expected to be
    pub expected: &'static str,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expecting {}, got '{}'", self.expected, self.value)
    }
}

impl std::error::Error for FormatError {}

/// An index that points outside of its table
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    /// Shared string index beyond the shared string table
    SharedString {
        /// Index found in the cell
        idx: usize,
        /// Number of shared strings
        len: usize,
    },
    /// Worksheet index beyond the workbook sheets
    Worksheet {
        /// Requested index
        idx: usize,
        /// Number of sheets in the workbook
        count: usize,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::SharedString { idx, len } => write!(
                f,
                "Shared string index {idx} out of range (table has {len} entries)"
            ),
            LookupError::Worksheet { idx, count } => write!(
                f,
                "Invalid worksheet index {idx} (workbook has {count} sheets)"
            ),
        }
    }
}

impl std::error::Error for LookupError {}

/// A raw value which cannot be stored into a record field
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    /// Field name, as declared by the record
    pub field: String,
    /// Raw cell text
    pub value: String,
    /// Declared kind of the field
    pub target: FieldKind,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unable to convert '{}' to {} for field '{}'",
            self.value, self.target, self.field
        )
    }
}

impl std::error::Error for ConversionError {}
