//! Mean and count of a numeric score grouped by a categorical key.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::SurveyRecord;
use crate::util::mean;

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub key: String,
    /// Absent when the group contributed no defined values; never 0.0.
    pub mean: Option<f64>,
    pub count: usize,
}

/// Group rows by `key` and average `value` within each group.
///
/// Rows where either closure returns `None` are excluded from both the
/// mean and the count — an undefined score must not drag a group toward
/// zero. `order`, when supplied, both orders and filters the output;
/// categories absent from the data are omitted, not zero-filled. Without
/// it, groups come out sorted by key.
pub fn group_mean<K, V>(
    rows: &[SurveyRecord],
    key: K,
    value: V,
    order: Option<&[&str]>,
) -> Vec<GroupSummary>
where
    K: Fn(&SurveyRecord) -> Option<String>,
    V: Fn(&SurveyRecord) -> Option<f64>,
{
    let mut acc: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows {
        let (Some(k), Some(v)) = (key(row), value(row)) else {
            continue;
        };
        acc.entry(k).or_default().push(v);
    }

    let summarize = |key: String, values: Vec<f64>| GroupSummary {
        key,
        mean: mean(&values),
        count: values.len(),
    };

    match order {
        Some(order) => order
            .iter()
            .filter_map(|k| acc.remove(*k).map(|v| summarize((*k).to_string(), v)))
            .collect(),
        None => acc
            .into_iter()
            .map(|(k, v)| summarize(k, v))
            .collect(),
    }
}
