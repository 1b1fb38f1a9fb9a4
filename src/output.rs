use serde::Serialize;
use std::error::Error;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::crosstab::CrossTab;

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// A cross-tab has caller-defined columns, so it goes through the manual
/// record API instead of serde.
pub fn write_crosstab_csv(path: &str, tab: &CrossTab) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["Group".to_string()];
    header.extend(tab.columns.iter().map(|c| c.label().to_string()));
    header.push("Total".to_string());
    wtr.write_record(&header)?;
    for row in &tab.rows {
        let mut record = vec![row.key.clone()];
        record.extend(row.counts.iter().map(u64::to_string));
        record.push(row.total().to_string());
        wtr.write_record(&record)?;
    }
    if !tab.is_empty() {
        let mut footer = vec!["All".to_string()];
        footer.extend(tab.column_totals().iter().map(u64::to_string));
        footer.push(tab.total().to_string());
        wtr.write_record(&footer)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn preview_crosstab(tab: &CrossTab, max_rows: usize) {
    if tab.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    let mut header = vec!["Group".to_string()];
    header.extend(tab.columns.iter().map(|c| c.label().to_string()));
    builder.push_record(header);
    for row in tab.rows.iter().take(max_rows) {
        let mut record = vec![row.key.clone()];
        record.extend(row.counts.iter().map(u64::to_string));
        builder.push_record(record);
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
