//! Single sheet package writer
//!
//! Every cell is written as an inline string. The first row uses the bold
//! style (index 1) and the whole used range is declared as a table.

use std::io::{Seek, Write};

use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{coordinate_to_name, XlsxError};

/// Maximum number of rows allowed in an xlsx file
pub const MAX_ROWS: usize = 1_048_576;

/// Style index of header cells
pub const HEADER_STYLE: u32 = 1;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"<Override PartName="/xl/tables/table1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml"/>"#,
    r#"</Types>"#,
);

const RELS_DOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

const WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#,
);

const SHEET_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/table" Target="../tables/table1.xml"/>"#,
    r#"</Relationships>"#,
);

// xf 0 is the default style, xf 1 the bold header
const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="2">"#,
    r#"<font><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"</fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
    r#"</cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>"#,
            r#"</workbook>"#,
        ),
        quick_xml::escape::escape(sheet_name)
    )
}

/// Writes a package holding one sheet: a bold `header` row followed by `rows`,
/// all covered by a single table.
///
/// The zip is finished before returning, the sink is handed back.
pub fn write_package<W: Write + Seek>(
    sink: W,
    sheet_name: &str,
    header: &[String],
    rows: &[Vec<String>],
) -> Result<W, XlsxError> {
    if header.is_empty() {
        return Err(XlsxError::Unexpected("cannot write a table without columns"));
    }
    if sheet_name.is_empty() || sheet_name.chars().count() > 31 {
        return Err(XlsxError::Unexpected("sheet names must have 1 to 31 characters"));
    }
    if rows.len() >= MAX_ROWS {
        return Err(XlsxError::Unexpected("too many rows for a worksheet"));
    }
    let last_col = u32::try_from(header.len() - 1)
        .map_err(|_| XlsxError::Unexpected("column number overflow"))?;
    // bounded by MAX_ROWS above
    let last_row = rows.len() as u32;
    let range = format!("A1:{}", coordinate_to_name((last_row, last_col))?);

    let sheet = sheet_xml(header, rows, &range)?;
    let table = table_xml(header.len(), &range)?;
    let workbook = workbook_xml(sheet_name);

    let parts: [(&str, &[u8]); 8] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", RELS_DOT_RELS.as_bytes()),
        ("xl/workbook.xml", workbook.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/styles.xml", STYLES.as_bytes()),
        ("xl/worksheets/sheet1.xml", &sheet),
        ("xl/worksheets/_rels/sheet1.xml.rels", SHEET_RELS.as_bytes()),
        ("xl/tables/table1.xml", &table),
    ];

    let mut zip = ZipWriter::new(sink);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in parts {
        zip.start_file(name, options)?;
        zip.write_all(data)?;
    }
    debug!("wrote sheet '{sheet_name}' with {} data rows ({range})", rows.len());
    Ok(zip.finish()?)
}

fn sheet_xml(header: &[String], rows: &[Vec<String>], range: &str) -> Result<Vec<u8>, XlsxError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", NS_MAIN));
    worksheet.push_attribute(("xmlns:r", NS_REL));
    writer.write_event(Event::Start(worksheet))?;

    let mut dimension = BytesStart::new("dimension");
    dimension.push_attribute(("ref", range));
    writer.write_event(Event::Empty(dimension))?;

    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
    write_row(&mut writer, 0, header, Some(HEADER_STYLE))?;
    for (i, row) in rows.iter().enumerate() {
        write_row(&mut writer, i as u32 + 1, row, None)?;
    }
    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;

    let mut table_parts = BytesStart::new("tableParts");
    table_parts.push_attribute(("count", "1"));
    writer.write_event(Event::Start(table_parts))?;
    let mut table_part = BytesStart::new("tablePart");
    table_part.push_attribute(("r:id", "rId1"));
    writer.write_event(Event::Empty(table_part))?;
    writer.write_event(Event::End(BytesEnd::new("tableParts")))?;

    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner())
}

fn write_row(
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    cells: &[String],
    style: Option<u32>,
) -> Result<(), XlsxError> {
    let mut row_element = BytesStart::new("row");
    row_element.push_attribute(("r", (row + 1).to_string().as_str()));
    writer.write_event(Event::Start(row_element))?;
    for (col, value) in cells.iter().enumerate() {
        let col = u32::try_from(col).map_err(|_| XlsxError::Unexpected("column number overflow"))?;
        let mut c = BytesStart::new("c");
        c.push_attribute(("r", coordinate_to_name((row, col))?.as_str()));
        if let Some(s) = style {
            c.push_attribute(("s", s.to_string().as_str()));
        }
        c.push_attribute(("t", "inlineStr"));
        writer.write_event(Event::Start(c))?;
        writer.write_event(Event::Start(BytesStart::new("is")))?;
        let mut t = BytesStart::new("t");
        if value.trim() != value {
            t.push_attribute(("xml:space", "preserve"));
        }
        writer.write_event(Event::Start(t))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new("t")))?;
        writer.write_event(Event::End(BytesEnd::new("is")))?;
        writer.write_event(Event::End(BytesEnd::new("c")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn table_xml(columns: usize, range: &str) -> Result<Vec<u8>, XlsxError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    let mut table = BytesStart::new("table");
    table.push_attribute(("xmlns", NS_MAIN));
    table.push_attribute(("id", "1"));
    table.push_attribute(("name", "Table1"));
    table.push_attribute(("displayName", "Table1"));
    table.push_attribute(("ref", range));
    table.push_attribute(("totalsRowShown", "0"));
    writer.write_event(Event::Start(table))?;

    let mut table_columns = BytesStart::new("tableColumns");
    table_columns.push_attribute(("count", columns.to_string().as_str()));
    writer.write_event(Event::Start(table_columns))?;
    for id in 1..=columns {
        let mut column = BytesStart::new("tableColumn");
        column.push_attribute(("id", id.to_string().as_str()));
        column.push_attribute(("name", format!("Column{id}").as_str()));
        writer.write_event(Event::Empty(column))?;
    }
    writer.write_event(Event::End(BytesEnd::new("tableColumns")))?;

    let mut style = BytesStart::new("tableStyleInfo");
    style.push_attribute(("name", "TableStyleMedium9"));
    style.push_attribute(("showFirstColumn", "0"));
    style.push_attribute(("showLastColumn", "0"));
    style.push_attribute(("showRowStripes", "1"));
    style.push_attribute(("showColumnStripes", "0"));
    writer.write_event(Event::Empty(style))?;

    writer.write_event(Event::End(BytesEnd::new("table")))?;
    Ok(writer.into_inner())
}
