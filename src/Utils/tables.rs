use crate::error::CompMathResult;
use csv::Writer;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

/// A row of an iteration table: column headers are shared by the row type, cells are per row.
pub trait TableRowView {
    fn headers() -> Vec<String>;
    fn cells(&self) -> Vec<String>;
}

/// Pretty table of rows, ready for `info!`.
pub fn render_table<R: TableRowView>(rows: &[R]) -> String {
    let mut builder = Builder::default();
    builder.push_record(R::headers());
    for row in rows {
        builder.push_record(row.cells());
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

/// Writes headers and rows into a csv file.
pub fn save_table_to_csv<R: TableRowView, P: AsRef<Path>>(rows: &[R], path: P) -> CompMathResult<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(R::headers())?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}

/// Tables longer than `cap` keep only their first and last row.
pub fn cap_rows<T>(mut rows: Vec<T>, cap: usize) -> Vec<T> {
    if rows.len() <= cap || rows.len() < 2 {
        return rows;
    }
    let last = rows.pop();
    rows.truncate(1);
    rows.extend(last);
    rows
}

/// Caps the rows and renders what is kept, so a long run never floods the log.
pub fn capped_table<R: TableRowView>(rows: Vec<R>, cap: usize) -> (Vec<R>, String) {
    let rows = cap_rows(rows, cap);
    let rendered = render_table(&rows);
    (rows, rendered)
}

/// At most `n` items picked at indices `linspace(0, len-1, n)` (truncated), first and last kept.
pub fn evenly_spaced_elements<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    let len = items.len();
    if len <= n {
        return items.to_vec();
    }
    match n {
        0 => vec![],
        1 => vec![items[0].clone()],
        _ => (0..n)
            .map(|i| {
                let index = (i as f64 * (len - 1) as f64 / (n - 1) as f64) as usize;
                items[index.min(len - 1)].clone()
            })
            .collect(),
    }
}

/// Number formatting used in every table cell.
pub fn fmt_num(value: f64) -> String {
    if value.is_finite() {
        format!("{:.6}", value)
    } else {
        format!("{}", value)
    }
}
