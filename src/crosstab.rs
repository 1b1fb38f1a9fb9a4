//! Frequency tables of one categorical dimension against satisfaction.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::scale::SatisfactionLevel;
use crate::types::SurveyRecord;

#[derive(Debug, Clone, Serialize)]
pub struct CrossTab {
    pub columns: Vec<SatisfactionLevel>,
    pub rows: Vec<CrossTabRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossTabRow {
    pub key: String,
    /// Counts aligned index-for-index with `CrossTab::columns`.
    pub counts: Vec<u64>,
}

impl CrossTabRow {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Grand total: equals the number of input rows where both the
    /// dimension and a listed satisfaction label were present.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(CrossTabRow::total).sum()
    }

    pub fn column_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.columns.len()];
        for row in &self.rows {
            for (slot, count) in totals.iter_mut().zip(&row.counts) {
                *slot += count;
            }
        }
        totals
    }
}

/// Cross-tabulate a dimension against satisfaction level.
///
/// `columns` fixes which satisfaction labels appear and in what order;
/// labels outside the list are dropped, and the caller's order is kept as
/// given (not alphabetical). Rows with a missing dimension or a missing
/// satisfaction label are skipped entirely. `row_order`, when supplied,
/// both orders and filters the dimension values; values with zero rows are
/// omitted rather than zero-filled. Without it, rows come out sorted by
/// key. Empty input yields an empty table, not an error.
pub fn cross_tab<F>(
    rows: &[SurveyRecord],
    columns: &[SatisfactionLevel],
    row_order: Option<&[&str]>,
    dimension: F,
) -> CrossTab
where
    F: Fn(&SurveyRecord) -> Option<String>,
{
    let mut cells: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    for row in rows {
        let (Some(key), Some(level)) = (dimension(row), row.satisfaction) else {
            continue;
        };
        let Some(col) = columns.iter().position(|c| *c == level) else {
            continue;
        };
        cells.entry(key).or_insert_with(|| vec![0; columns.len()])[col] += 1;
    }

    let ordered: Vec<CrossTabRow> = match row_order {
        Some(order) => order
            .iter()
            .filter_map(|key| {
                cells.remove(*key).map(|counts| CrossTabRow {
                    key: (*key).to_string(),
                    counts,
                })
            })
            .collect(),
        None => cells
            .into_iter()
            .map(|(key, counts)| CrossTabRow { key, counts })
            .collect(),
    };

    CrossTab {
        columns: columns.to_vec(),
        rows: ordered,
    }
}
