//! Row extraction, positional or keyed by the header row

use std::collections::HashMap;
use std::io::{Read, Seek};

use log::{debug, trace, warn};

use crate::errors::{Error, LookupError};
use crate::key::normalize;
use crate::record::{materialize, PropertyMap, Record};
use crate::xlsx::{Xlsx, XlsxRowReader};
use crate::ReadOptions;

/// A data row keyed by normalized header
pub type RowMapping = HashMap<String, String>;

impl<RS: Read + Seek> Xlsx<RS> {
    /// Reads every row of a sheet as strings, header row included
    pub fn rows_by_index(&mut self, sheet_index: usize) -> Result<Vec<Vec<String>>, Error> {
        self.rows_by_index_with(sheet_index, |_, row| Some(row))
    }

    /// Reads every row of a sheet through `f`, which gets the row position
    /// and its resolved cells. Rows for which `f` returns `None` are skipped.
    pub fn rows_by_index_with<T, F>(&mut self, sheet_index: usize, mut f: F) -> Result<Vec<T>, Error>
    where
        F: FnMut(usize, Vec<String>) -> Option<T>,
    {
        let mut rows = self.sheet_rows(sheet_index)?;
        let strings = self.shared_strings();
        let mut out = Vec::new();
        let mut position = 0;
        while let Some(cells) = rows.next_row()? {
            let row = cells
                .iter()
                .map(|c| c.resolve(strings).map(str::to_owned))
                .collect::<Result<Vec<_>, _>>()?;
            match f(position, row) {
                Some(v) => out.push(v),
                None => trace!("skipping row {position}"),
            }
            position += 1;
        }
        debug!("read {position} rows from sheet {sheet_index}, kept {}", out.len());
        Ok(out)
    }

    /// Reads the data rows of a sheet, keyed by the normalized header row
    ///
    /// Data rows shorter than the header have no entry for their missing cells.
    pub fn rows_by_header(&mut self, sheet_index: usize) -> Result<Vec<RowMapping>, Error> {
        self.rows_by_header_with(sheet_index, Some)
    }

    /// Reads the data rows of a sheet through `f`
    pub fn rows_by_header_with<T, F>(&mut self, sheet_index: usize, mut f: F) -> Result<Vec<T>, Error>
    where
        F: FnMut(RowMapping) -> Option<T>,
    {
        self.header_rows(sheet_index, |_, row| Ok(f(row)))
    }

    /// Reads the data rows of a sheet into typed records
    pub fn records<T: Record>(&mut self, options: &ReadOptions) -> Result<Vec<T>, Error> {
        let mut map: Option<PropertyMap<T>> = None;
        self.header_rows(options.get_sheet_index(), |headers, row| {
            let map = map.get_or_insert_with(|| PropertyMap::build(headers));
            materialize(map, &row, options).map(Some)
        })
    }

    fn sheet_rows(&mut self, sheet_index: usize) -> Result<XlsxRowReader, Error> {
        let count = self.sheet_names().len();
        if sheet_index >= count {
            return Err(LookupError::Worksheet {
                idx: sheet_index,
                count,
            }
            .into());
        }
        Ok(self.worksheet_rows(sheet_index)?)
    }

    fn header_rows<T, F>(&mut self, sheet_index: usize, mut f: F) -> Result<Vec<T>, Error>
    where
        F: FnMut(&[String], RowMapping) -> Result<Option<T>, Error>,
    {
        let mut rows = self.sheet_rows(sheet_index)?;
        let strings = self.shared_strings();
        let headers = match rows.next_row()? {
            Some(cells) => cells
                .iter()
                .map(|c| c.resolve(strings).map(normalize))
                .collect::<Result<Vec<_>, _>>()?,
            None => return Ok(Vec::new()),
        };
        for (i, h) in headers.iter().enumerate() {
            if headers[..i].contains(h) {
                warn!("duplicate header '{h}' in column {i}, keeping first column");
            }
        }

        let mut out = Vec::new();
        let mut position = 0;
        while let Some(cells) = rows.next_row()? {
            position += 1;
            if cells.len() > headers.len() {
                debug!(
                    "row {position} has {} cells beyond the header, ignoring them",
                    cells.len() - headers.len()
                );
            }
            let mut mapping = RowMapping::with_capacity(cells.len().min(headers.len()));
            for (key, cell) in headers.iter().zip(cells.iter()) {
                if !mapping.contains_key(key) {
                    mapping.insert(key.clone(), cell.resolve(strings)?.to_owned());
                }
            }
            match f(&headers, mapping)? {
                Some(v) => out.push(v),
                None => trace!("skipping row {position}"),
            }
        }
        debug!("read {position} data rows from sheet {sheet_index}, kept {}", out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::write_package;
    use std::io::Cursor;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn workbook(header: &[&str], rows: &[&[&str]]) -> Xlsx<Cursor<Vec<u8>>> {
        let rows: Vec<_> = rows.iter().map(|r| strings(r)).collect();
        let data = write_package(Cursor::new(Vec::new()), "Sheet1", &strings(header), &rows)
            .unwrap()
            .into_inner();
        Xlsx::new(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_rows_by_index() {
        let mut xlsx = workbook(&["Id", "Name"], &[&["1", "Ann"], &["2", "Bob"]]);
        let rows = xlsx.rows_by_index(0).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], ["Id", "Name"]);
        assert_eq!(rows[2], ["2", "Bob"]);

        let names = xlsx
            .rows_by_index_with(0, |i, row| (i > 0).then(|| row[1].clone()))
            .unwrap();
        assert_eq!(names, ["Ann", "Bob"]);
    }

    #[test]
    fn test_rows_by_header() {
        let mut xlsx = workbook(
            &["First Name", "AGE", "First Name"],
            &[&["Ann", "31", "shadowed"], &["Bob", "", "x"]],
        );
        let rows = xlsx.rows_by_header(0).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["firstname"], "Ann");
        assert_eq!(rows[0]["age"], "31");
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1]["age"], "");

        let adults = xlsx
            .rows_by_header_with(0, |row| {
                let age: u32 = row.get("age")?.parse().ok()?;
                (age >= 18).then(|| row["firstname"].clone())
            })
            .unwrap();
        assert_eq!(adults, ["Ann"]);
    }

    #[test]
    fn test_sheet_out_of_range() {
        let mut xlsx = workbook(&["Id"], &[]);
        assert!(xlsx.rows_by_header(0).unwrap().is_empty());
        match xlsx.rows_by_index(1) {
            Err(Error::Lookup(LookupError::Worksheet { idx, count })) => {
                assert_eq!((idx, count), (1, 1));
            }
            r => panic!("expecting a lookup error, got {r:?}"),
        }
    }
}
