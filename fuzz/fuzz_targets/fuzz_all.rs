#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use xlshaper::Xlsx;

fuzz_target!(|data: &[u8]| {
    let mut workbook = match Xlsx::new(Cursor::new(data)) {
        Ok(excel) => excel,
        Err(_) => return,
    };
    let count = workbook.sheet_names().len();
    for idx in 0..count {
        if let Ok(rows) = workbook.rows_by_index(idx) {
            rows.iter().map(|r| r.len()).sum::<usize>();
        }
        let _ = workbook.rows_by_header(idx);
        let _ = workbook.tables(idx);
    }
});
