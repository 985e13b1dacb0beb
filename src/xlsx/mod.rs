//! Xlsx container access
//!
//! Opens the zip package, resolves workbook relationships, loads the shared
//! string table and hands out raw worksheet rows. The [`package`] submodule
//! writes a single sheet package.

pub mod package;
mod rows_reader;

use std::io::{Cursor, Read, Seek, SeekFrom};

use log::debug;
use quick_xml::{
    events::Event,
    name::QName,
    Reader as XmlReader,
};
use zip::read::ZipArchive;
use zip::result::ZipError;

pub use package::write_package;
pub use rows_reader::XlsxRowReader;

pub(crate) type XlReader = XmlReader<Cursor<Vec<u8>>>;

/// Maximum number of columns allowed in an xlsx file
pub const MAX_COLUMNS: u32 = 16_384;

const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const REL_TABLE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

/// Errors raised while reading or writing the package
#[derive(Debug)]
pub enum XlsxError {
    /// Io error
    Io(std::io::Error),
    /// Zip error
    Zip(zip::result::ZipError),
    /// Xml error
    Xml(quick_xml::Error),
    /// Xml attribute error
    XmlAttr(quick_xml::events::attributes::AttrError),
    /// Part ended before the named element was closed
    XmlEof(&'static str),
    /// Mandatory part missing from the archive
    FileNotFound(String),
    /// A sheet points to an unknown relationship id
    RelationshipNotFound(String),
    /// Cell reference holding a byte other than a letter or digit
    Alphanumeric(u8),
    /// Cell reference with a digit inside its column letters
    NumericColumn(u8),
    /// Cell reference without column letters
    RangeWithoutColumnComponent,
    /// Cell reference without row number
    RangeWithoutRowComponent,
    /// Cell reference beyond the last column (`XFD`)
    ColumnOutOfRange(u32),
    /// Malformed input not covered by another variant
    Unexpected(&'static str),
    /// Package is an encrypted compound file
    Password,
    /// Sheet declared by the workbook but absent, or index out of range
    WorksheetNotFound(String),
    /// Sheet part is not a worksheet (e.g. a chartsheet)
    NotAWorksheet(String),
}

from_err!(std::io::Error, XlsxError, Io);
from_err!(zip::result::ZipError, XlsxError, Zip);
from_err!(quick_xml::Error, XlsxError, Xml);
from_err!(quick_xml::events::attributes::AttrError, XlsxError, XmlAttr);

impl std::fmt::Display for XlsxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XlsxError::Io(e) => write!(f, "I/O error: {e}"),
            XlsxError::Zip(e) => write!(f, "Zip error: {e}"),
            XlsxError::Xml(e) => write!(f, "Xml error: {e}"),
            XlsxError::XmlAttr(e) => write!(f, "Xml attribute error: {e}"),
            XlsxError::XmlEof(e) => write!(f, "Part ended before '</{e}>'"),
            XlsxError::FileNotFound(e) => write!(f, "Missing package part '{e}'"),
            XlsxError::RelationshipNotFound(id) => write!(f, "Unknown relationship '{id}'"),
            XlsxError::Alphanumeric(b) => {
                write!(f, "Invalid byte 0x{b:X} in cell reference")
            }
            XlsxError::NumericColumn(b) => {
                write!(f, "Digit '{}' inside column letters", char::from(*b))
            }
            XlsxError::RangeWithoutColumnComponent => write!(f, "Cell reference has no column"),
            XlsxError::RangeWithoutRowComponent => write!(f, "Cell reference has no row"),
            XlsxError::ColumnOutOfRange(col) => write!(
                f,
                "Column {} beyond the last column ({MAX_COLUMNS})",
                u64::from(*col) + 1
            ),
            XlsxError::Unexpected(e) => write!(f, "{e}"),
            XlsxError::Password => write!(f, "Workbook is encrypted"),
            XlsxError::WorksheetNotFound(n) => write!(f, "No worksheet '{n}'"),
            XlsxError::NotAWorksheet(typ) => write!(f, "Sheet is a {typ}, not a worksheet"),
        }
    }
}

impl std::error::Error for XlsxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XlsxError::Io(e) => Some(e),
            XlsxError::Zip(e) => Some(e),
            XlsxError::Xml(e) => Some(e),
            XlsxError::XmlAttr(e) => Some(e),
            _ => None,
        }
    }
}

/// Metadata of a table part attached to a worksheet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Name displayed by spreadsheet applications
    pub display_name: String,
    /// Covered cells, e.g. `A1:C11`
    pub reference: String,
    /// Column names, in order
    pub columns: Vec<String>,
}

/// A struct representing xml zipped excel file
pub struct Xlsx<RS> {
    zip: ZipArchive<RS>,
    /// Shared strings
    strings: Vec<String>,
    /// Sheets names and paths
    sheets: Vec<(String, String)>,
}

impl<RS: Read + Seek> Xlsx<RS> {
    /// Opens a package from any seekable reader
    pub fn new(mut reader: RS) -> Result<Self, XlsxError> {
        check_for_password_protected(&mut reader)?;
        let mut xlsx = Xlsx {
            zip: ZipArchive::new(reader)?,
            strings: Vec::new(),
            sheets: Vec::new(),
        };
        xlsx.read_shared_strings()?;
        let relationships = read_relationships(&mut xlsx.zip, WORKBOOK_RELS)?
            .ok_or_else(|| XlsxError::FileNotFound(WORKBOOK_RELS.to_string()))?;
        xlsx.read_workbook(&relationships)?;
        debug!(
            "opened workbook with {} sheets and {} shared strings",
            xlsx.sheets.len(),
            xlsx.strings.len()
        );
        Ok(xlsx)
    }

    /// Gets the sheet names, in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Gets the shared string table
    pub fn shared_strings(&self) -> &[String] {
        &self.strings
    }

    /// Gets a reader over the raw rows of the sheet at `idx`
    pub fn worksheet_rows(&mut self, idx: usize) -> Result<XlsxRowReader, XlsxError> {
        let (name, path) = self
            .sheets
            .get(idx)
            .ok_or_else(|| XlsxError::WorksheetNotFound(idx.to_string()))?;
        let xml = match xml_reader(&mut self.zip, path) {
            None => return Err(XlsxError::WorksheetNotFound(name.clone())),
            Some(x) => x?,
        };
        debug!("reading worksheet '{name}' ({path})");
        XlsxRowReader::new(xml, name)
    }

    /// Gets the tables attached to the sheet at `idx`
    pub fn tables(&mut self, idx: usize) -> Result<Vec<Table>, XlsxError> {
        let path = match self.sheets.get(idx) {
            Some((_, path)) => path.clone(),
            None => return Err(XlsxError::WorksheetNotFound(idx.to_string())),
        };
        let (base_folder, file_name) = path.split_at(path.rfind('/').unwrap_or(0));
        let rels = format!("{base_folder}/_rels{file_name}.rels");
        let locations: Vec<String> = match read_relationships(&mut self.zip, &rels)? {
            None => return Ok(Vec::new()),
            Some(rels) => rels
                .into_iter()
                .filter(|rel| rel.kind == REL_TABLE)
                .map(|rel| resolve_target(base_folder, &rel.target))
                .collect(),
        };

        let mut buf = Vec::with_capacity(64);
        let mut tables = Vec::with_capacity(locations.len());
        for location in locations {
            let mut xml = match xml_reader(&mut self.zip, &location) {
                None => continue,
                Some(x) => x?,
            };
            let mut table = Table::default();
            loop {
                buf.clear();
                match xml.read_event_into(&mut buf) {
                    Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"table" => {
                        for a in e.attributes() {
                            let a = a?;
                            match a.key {
                                QName(b"name") => table.name = a.unescape_value()?.into_owned(),
                                QName(b"displayName") => {
                                    table.display_name = a.unescape_value()?.into_owned()
                                }
                                QName(b"ref") => table.reference = a.unescape_value()?.into_owned(),
                                _ => (),
                            }
                        }
                    }
                    Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"tableColumn" => {
                        for a in e.attributes() {
                            let a = a?;
                            if a.key == QName(b"name") {
                                table.columns.push(a.unescape_value()?.into_owned());
                            }
                        }
                    }
                    Ok(Event::End(ref e)) if e.local_name().as_ref() == b"table" => break,
                    Ok(Event::Eof) => return Err(XlsxError::XmlEof("table")),
                    Err(e) => return Err(XlsxError::Xml(e)),
                    _ => (),
                }
            }
            tables.push(table);
        }
        Ok(tables)
    }

    fn read_shared_strings(&mut self) -> Result<(), XlsxError> {
        let mut xml = match xml_reader(&mut self.zip, "xl/sharedStrings.xml") {
            None => return Ok(()),
            Some(x) => x?,
        };
        let mut buf = Vec::with_capacity(1024);
        let mut inner_buf = Vec::with_capacity(1024);
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"si" => {
                    // empty items still take an index
                    let s = read_string(&mut xml, e.local_name().as_ref(), &mut inner_buf)?;
                    self.strings.push(s);
                }
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sst" => break,
                Ok(Event::Eof) => return Err(XlsxError::XmlEof("sst")),
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => (),
            }
        }
        Ok(())
    }

    /// Collects the sheets declared by the workbook, with their part path
    fn read_workbook(&mut self, relationships: &[Relationship]) -> Result<(), XlsxError> {
        let mut xml = xml_reader(&mut self.zip, WORKBOOK)
            .ok_or_else(|| XlsxError::FileNotFound(WORKBOOK.to_string()))??;
        let mut buf = Vec::with_capacity(1024);
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf)? {
                Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                    let mut name = String::new();
                    let mut id = None;
                    for a in e.attributes() {
                        let a = a?;
                        match (a.key.prefix(), a.key.local_name().as_ref()) {
                            (None, b"name") => name = a.unescape_value()?.into_owned(),
                            // `r:id`, whatever the prefix bound to the relationships namespace
                            (Some(_), b"id") => id = Some(a.unescape_value()?.into_owned()),
                            _ => (),
                        }
                    }
                    let id = id.unwrap_or_default();
                    let target = relationships
                        .iter()
                        .find(|rel| rel.id == id)
                        .map(|rel| rel.target.as_str())
                        .ok_or_else(|| XlsxError::RelationshipNotFound(id.clone()))?;
                    let path = if target.starts_with("xl/") {
                        target.to_string()
                    } else {
                        resolve_target("xl", target)
                    };
                    self.sheets.push((name, path));
                }
                Event::End(ref e) if e.local_name().as_ref() == b"workbook" => return Ok(()),
                Event::Eof => return Err(XlsxError::XmlEof("workbook")),
                _ => (),
            }
        }
    }
}

/// One entry of a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
}

/// Reads the relationships stored at `path`, `None` if the part is absent
fn read_relationships<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    path: &str,
) -> Result<Option<Vec<Relationship>>, XlsxError> {
    let mut xml = match xml_reader(zip, path) {
        None => return Ok(None),
        Some(x) => x?,
    };
    let mut relationships = Vec::new();
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"Relationship" => {
                let mut rel = Relationship {
                    id: String::new(),
                    kind: String::new(),
                    target: String::new(),
                };
                for a in e.attributes() {
                    let a = a?;
                    let field = match a.key {
                        QName(b"Id") => &mut rel.id,
                        QName(b"Type") => &mut rel.kind,
                        QName(b"Target") => &mut rel.target,
                        _ => continue,
                    };
                    *field = a.unescape_value()?.into_owned();
                }
                relationships.push(rel);
            }
            Event::End(ref e) if e.local_name().as_ref() == b"Relationships" => {
                return Ok(Some(relationships))
            }
            Event::Eof => return Err(XlsxError::XmlEof("Relationships")),
            _ => (),
        }
    }
}

/// Encrypted packages are compound files instead of zip archives
fn check_for_password_protected<RS: Read + Seek>(reader: &mut RS) -> Result<(), XlsxError> {
    let mut signature = [0u8; 8];
    let is_cfb = match reader.read_exact(&mut signature) {
        Ok(()) => signature == CFB_SIGNATURE,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e.into()),
    };
    reader.seek(SeekFrom::Start(0))?;
    if is_cfb {
        return Err(XlsxError::Password);
    }
    Ok(())
}

/// Resolves a relationship target relative to the folder of its source part
fn resolve_target(base_folder: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = base_folder.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => (),
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Buffers a package part and wraps it in an xml reader
fn xml_reader<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    path: &str,
) -> Option<Result<XlReader, XlsxError>> {
    let actual_path = zip
        .file_names()
        .find(|n| n.eq_ignore_ascii_case(path))?
        .to_owned();
    let mut data = Vec::new();
    match zip.by_name(&actual_path) {
        Ok(mut f) => {
            if let Err(e) = f.read_to_end(&mut data) {
                return Some(Err(e.into()));
            }
        }
        Err(ZipError::FileNotFound) => return None,
        Err(e) => return Some(Err(e.into())),
    }
    let mut r = XmlReader::from_reader(Cursor::new(data));
    let config = r.config_mut();
    config.check_end_names = false;
    config.trim_text(false);
    config.check_comments = false;
    config.expand_empty_elements = true;
    Some(Ok(r))
}

/// Reads a plain or rich text string up to the `closing` element.
///
/// Text of all `<t>` runs is concatenated, phonetic runs (`<rPh>`) are skipped.
pub(crate) fn read_string(
    xml: &mut XlReader,
    closing: &[u8],
    buf: &mut Vec<u8>,
) -> Result<String, XlsxError> {
    let mut value = String::new();
    let mut in_text = false;
    let mut is_phonetic_text = false;
    loop {
        buf.clear();
        match xml.read_event_into(buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"rPh" => is_phonetic_text = true,
                _ => (),
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => is_phonetic_text = false,
                n if n == closing => return Ok(value),
                _ => (),
            },
            Event::Text(ref t) if in_text && !is_phonetic_text => value.push_str(&t.unescape()?),
            Event::CData(ref t) if in_text && !is_phonetic_text => {
                value.push_str(&String::from_utf8_lossy(t))
            }
            Event::Eof => return Err(XlsxError::XmlEof("si")),
            _ => (),
        }
    }
}

/// Converts a text range name into its position (row, column) (0 based index).
/// If the row or column component in the range is missing, an Error is returned.
pub(crate) fn get_row_column(range: &[u8]) -> Result<(u32, u32), XlsxError> {
    let (row, col) = get_row_and_optional_column(range)?;
    let col = col.ok_or(XlsxError::RangeWithoutColumnComponent)?;
    Ok((row, col))
}

fn get_row_and_optional_column(range: &[u8]) -> Result<(u32, Option<u32>), XlsxError> {
    let (mut row, mut col) = (0u32, 0u32);
    let mut pow = 1u32;
    let mut readrow = true;
    for c in range.iter().rev() {
        match *c {
            c @ b'0'..=b'9' => {
                if readrow {
                    row = row
                        .checked_add(((c - b'0') as u32).saturating_mul(pow))
                        .ok_or(XlsxError::Unexpected("row number overflow"))?;
                    pow = pow.saturating_mul(10);
                } else {
                    return Err(XlsxError::NumericColumn(c));
                }
            }
            c @ (b'A'..=b'Z' | b'a'..=b'z') => {
                if readrow {
                    if row == 0 {
                        return Err(XlsxError::RangeWithoutRowComponent);
                    }
                    pow = 1;
                    readrow = false;
                }
                let digit = (c.to_ascii_uppercase() - b'A') as u32 + 1;
                col = col
                    .checked_add(digit.saturating_mul(pow))
                    .ok_or(XlsxError::Unexpected("column number overflow"))?;
                pow = pow.saturating_mul(26);
            }
            _ => return Err(XlsxError::Alphanumeric(*c)),
        }
    }
    let row = row
        .checked_sub(1)
        .ok_or(XlsxError::RangeWithoutRowComponent)?;
    Ok((row, col.checked_sub(1)))
}

/// Convert the integer to Excelsheet column title.
/// If the column number not in 1~16384, an Error is returned.
pub(crate) fn column_number_to_name(num: u32) -> Result<String, XlsxError> {
    if num >= MAX_COLUMNS {
        return Err(XlsxError::Unexpected("column number overflow"));
    }
    let mut col: Vec<u8> = Vec::new();
    let mut num = num + 1;
    while num > 0 {
        let integer = ((num - 1) % 26 + 65) as u8;
        col.push(integer);
        num = (num - 1) / 26;
    }
    col.reverse();
    Ok(col.into_iter().map(char::from).collect())
}

/// Convert a cell coordinate to Excelsheet cell name.
/// If the column number not in 1~16384, an Error is returned.
pub(crate) fn coordinate_to_name(cell: (u32, u32)) -> Result<String, XlsxError> {
    Ok(format!("{}{}", column_number_to_name(cell.1)?, cell.0 + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const WORKBOOK_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="People &amp; Co" sheetId="1" r:id="rId1"/><sheet name="Second" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;

    const WORKBOOK_XML_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>
</Relationships>"#;

    const SHARED_STRINGS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<x:sst count="4" uniqueCount="4" xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <x:si><x:t>String 1</x:t></x:si>
    <x:si>
        <x:r><x:rPr><x:b/></x:rPr><x:t>Rich </x:t></x:r>
        <x:r><x:t>text</x:t></x:r>
        <x:rPh sb="0" eb="1"><x:t>phonetic</x:t></x:rPh>
    </x:si>
    <x:si/>
    <x:si><x:t xml:space="preserve"> a &lt; b </x:t></x:si>
</x:sst>"#;

    const SHEET: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row></sheetData>
</worksheet>"#;

    fn package(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip_writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in parts {
            zip_writer.start_file(*name, options).unwrap();
            zip_writer.write_all(data).unwrap();
        }
        zip_writer.finish().unwrap().into_inner()
    }

    fn workbook() -> Xlsx<Cursor<Vec<u8>>> {
        let data = package(&[
            ("xl/workbook.xml", WORKBOOK_XML),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_XML_RELS),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", SHEET),
        ]);
        Xlsx::new(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(get_row_column(b"A1").unwrap(), (0, 0));
        assert_eq!(get_row_column(b"C107").unwrap(), (106, 2));
        assert_eq!(get_row_column(b"xfd1048576").unwrap(), (1_048_575, 16_383));
        assert!(matches!(
            get_row_column(b"12"),
            Err(XlsxError::RangeWithoutColumnComponent)
        ));
        assert!(matches!(
            get_row_column(b"AB"),
            Err(XlsxError::RangeWithoutRowComponent)
        ));
        assert!(matches!(
            get_row_column(b"A1B"),
            Err(XlsxError::RangeWithoutRowComponent)
        ));
        assert!(matches!(
            get_row_column(b"1A1"),
            Err(XlsxError::NumericColumn(b'1'))
        ));
    }

    #[test]
    fn test_column_number_to_name() {
        assert_eq!(column_number_to_name(0).unwrap(), "A");
        assert_eq!(column_number_to_name(25).unwrap(), "Z");
        assert_eq!(column_number_to_name(26).unwrap(), "AA");
        assert_eq!(column_number_to_name(27).unwrap(), "AB");
        assert_eq!(column_number_to_name(MAX_COLUMNS - 1).unwrap(), "XFD");
        assert!(column_number_to_name(MAX_COLUMNS).is_err());
        assert_eq!(coordinate_to_name((0, 0)).unwrap(), "A1");
        assert_eq!(coordinate_to_name((100, 2)).unwrap(), "C101");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/worksheets", "../tables/table1.xml"),
            "xl/tables/table1.xml"
        );
        assert_eq!(
            resolve_target("xl/worksheets", "/xl/tables/table2.xml"),
            "xl/tables/table2.xml"
        );
    }

    #[test]
    fn test_read_package() {
        let mut xlsx = workbook();
        assert_eq!(xlsx.sheet_names(), ["People & Co", "Second"]);
        assert_eq!(
            xlsx.shared_strings(),
            ["String 1", "Rich text", "", " a < b "]
        );
        let mut rows = xlsx.worksheet_rows(0).unwrap();
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row[1].raw(), "1");
        assert!(rows.next_row().unwrap().is_none());
        assert!(xlsx.tables(0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_parts() {
        let mut xlsx = workbook();
        // second sheet is declared but absent from the archive
        assert!(matches!(
            xlsx.worksheet_rows(1),
            Err(XlsxError::WorksheetNotFound(n)) if n == "Second"
        ));
        assert!(matches!(
            xlsx.worksheet_rows(5),
            Err(XlsxError::WorksheetNotFound(_))
        ));

        let data = package(&[("xl/workbook.xml", WORKBOOK_XML)]);
        assert!(matches!(
            Xlsx::new(Cursor::new(data)),
            Err(XlsxError::FileNotFound(p)) if p == WORKBOOK_RELS
        ));

        let rels = br#"<Relationships><Relationship Id="rId9" Target="worksheets/sheet1.xml"/></Relationships>"#;
        let data = package(&[
            ("xl/workbook.xml", WORKBOOK_XML),
            ("xl/_rels/workbook.xml.rels", rels),
        ]);
        assert!(matches!(
            Xlsx::new(Cursor::new(data)),
            Err(XlsxError::RelationshipNotFound(id)) if id == "rId1"
        ));
    }

    #[test]
    fn test_not_a_zip() {
        let mut data = CFB_SIGNATURE.to_vec();
        data.extend_from_slice(&[0; 504]);
        assert!(matches!(
            Xlsx::new(Cursor::new(data)),
            Err(XlsxError::Password)
        ));
        assert!(matches!(
            Xlsx::new(Cursor::new(b"not a zip".to_vec())),
            Err(XlsxError::Zip(_))
        ));
    }
}
