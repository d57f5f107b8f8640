//! CSV serialization: one header line and one data row.

use crate::models::Record;
use crate::rename::csv::quote_cell;

fn write_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote_cell(cell));
    }
    out.push('\n');
}

pub fn to_csv<R: Record + ?Sized>(record: &R) -> String {
    let fields = record.csv_fields();
    let mut out = String::new();
    write_line(&mut out, fields.iter().map(|(k, _)| *k));
    write_line(&mut out, fields.iter().map(|(_, v)| *v));
    out
}
