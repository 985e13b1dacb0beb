use log::warn;
use quick_xml::{
    events::{attributes::Attribute, Event},
    name::QName,
};

use super::{get_row_column, read_string, XlReader, XlsxError, MAX_COLUMNS};
use crate::cell::{Cell, CellKind};

/// A row by row reader over a worksheet part
///
/// Cells are returned raw: shared string indexes are not resolved.
pub struct XlsxRowReader {
    xml: XlReader,
    buf: Vec<u8>,
    row_buf: Vec<u8>,
    cell_buf: Vec<u8>,
    done: bool,
}

impl XlsxRowReader {
    pub(crate) fn new(mut xml: XlReader, sheet_name: &str) -> Result<Self, XlsxError> {
        let mut buf = Vec::with_capacity(1024);
        let mut sh_type = None;
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"sheetData" => break,
                    typ => {
                        if sh_type.is_none() {
                            sh_type = Some(String::from_utf8_lossy(typ).into_owned());
                        }
                    }
                },
                Event::Eof => {
                    return match sh_type {
                        Some(typ) if typ != "worksheet" => Err(XlsxError::NotAWorksheet(typ)),
                        _ => {
                            warn!("worksheet '{sheet_name}' has no sheetData");
                            Err(XlsxError::XmlEof("worksheet"))
                        }
                    };
                }
                _ => (),
            }
        }
        Ok(XlsxRowReader {
            xml,
            buf,
            row_buf: Vec::with_capacity(1024),
            cell_buf: Vec::with_capacity(1024),
            done: false,
        })
    }

    /// Reads the next row, `None` once `</sheetData>` is reached
    ///
    /// Cells skipped by their `r` reference are filled with empty literal
    /// cells, so the position of a cell in the row is its column index.
    pub fn next_row(&mut self) -> Result<Option<Vec<Cell>>, XlsxError> {
        if self.done {
            return Ok(None);
        }
        loop {
            self.buf.clear();
            match self.xml.read_event_into(&mut self.buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"row" => {
                    let row = read_row(&mut self.xml, &mut self.row_buf, &mut self.cell_buf)?;
                    return Ok(Some(row));
                }
                Event::End(e) if e.local_name().as_ref() == b"sheetData" => {
                    self.done = true;
                    return Ok(None);
                }
                Event::Eof => return Err(XlsxError::XmlEof("sheetData")),
                _ => (),
            }
        }
    }
}

fn read_row(
    xml: &mut XlReader,
    buf: &mut Vec<u8>,
    cell_buf: &mut Vec<u8>,
) -> Result<Vec<Cell>, XlsxError> {
    let mut cells = Vec::new();
    loop {
        buf.clear();
        match xml.read_event_into(buf)? {
            Event::Start(c) if c.local_name().as_ref() == b"c" => {
                let mut kind = CellKind::Literal;
                for a in c.attributes() {
                    match a? {
                        Attribute {
                            key: QName(b"r"),
                            value: v,
                        } => {
                            let (_, col) = get_row_column(&v)?;
                            if col >= MAX_COLUMNS {
                                return Err(XlsxError::ColumnOutOfRange(col));
                            }
                            let col = col as usize;
                            if col > cells.len() {
                                cells.resize(col, Cell::default());
                            }
                        }
                        Attribute {
                            key: QName(b"t"),
                            value: v,
                        } => kind = cell_kind(&v),
                        _ => (),
                    }
                }
                cells.push(read_cell(xml, cell_buf, kind)?);
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => return Ok(cells),
            Event::Eof => return Err(XlsxError::XmlEof("row")),
            _ => (),
        }
    }
}

fn cell_kind(t: &[u8]) -> CellKind {
    match t {
        b"s" => CellKind::SharedString,
        b"inlineStr" | b"str" | b"b" | b"n" | b"e" | b"d" => CellKind::Literal,
        t => {
            warn!(
                "unknown cell 't' attribute {:?}, reading value as text",
                String::from_utf8_lossy(t)
            );
            CellKind::Literal
        }
    }
}

/// Reads a cell content up to `</c>`
///
/// The raw value is the `<v>` text, or the inline string for `inlineStr`
/// cells. Formulas are ignored, only their cached value is kept.
fn read_cell(xml: &mut XlReader, buf: &mut Vec<u8>, kind: CellKind) -> Result<Cell, XlsxError> {
    let mut raw = String::new();
    let mut in_value = false;
    let mut inline = false;
    loop {
        buf.clear();
        match xml.read_event_into(buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"v" => in_value = true,
                b"is" => inline = true,
                _ => (),
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"c" => break,
                _ => (),
            },
            Event::Text(t) if in_value => raw.push_str(&t.unescape()?),
            Event::Eof => return Err(XlsxError::XmlEof("c")),
            _ => (),
        }
        if inline {
            raw = read_string(xml, b"is", buf)?;
            inline = false;
        }
    }
    if kind == CellKind::SharedString && raw.is_empty() {
        // no value, nothing to look up
        return Ok(Cell::literal(raw));
    }
    Ok(Cell::new(kind, raw))
}
