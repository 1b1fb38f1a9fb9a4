use serde::Serialize;

use crate::crosstab::{cross_tab, CrossTab};
use crate::geo::{self, BoundaryCollection, DistrictFeature, LegendEntry, SatisfactionBucket};
use crate::groupby::{group_mean, GroupSummary};
use crate::reasons::{top_reasons, ReasonCount};
use crate::scale::SATISFACTION_ORDER;
use crate::types::{
    BreakdownRow, DistrictScoreRow, GroupScoreRow, HousingSituation, ReasonRankingRow,
    SummaryStats, SurveyRecord,
};
use crate::util::{format_number, pearson};

/// Rent-burden brackets from most to least affordable, as exported by the
/// cleaning pipeline.
pub const RENT_BURDEN_ORDER: [&str; 5] = [
    "≤30% (Affordable)",
    "31-50% (Moderate)",
    "51-80% (High)",
    ">80% (Very High)",
    "Unknown",
];

pub fn situation_crosstab(data: &[SurveyRecord]) -> CrossTab {
    cross_tab(data, &SATISFACTION_ORDER, None, |r| {
        r.housing_situation.map(|h| h.label().to_string())
    })
}

pub fn income_crosstab(data: &[SurveyRecord]) -> CrossTab {
    cross_tab(data, &SATISFACTION_ORDER, None, |r| r.income_bracket.clone())
}

/// Renters only; non-renters fall out via the dimension closure.
pub fn rent_burden_crosstab(data: &[SurveyRecord]) -> CrossTab {
    cross_tab(
        data,
        &SATISFACTION_ORDER,
        Some(&RENT_BURDEN_ORDER),
        |r| match r.housing_situation {
            Some(HousingSituation::Renting) => r.rent_burden.clone(),
            _ => None,
        },
    )
}

/// Mean ordinal satisfaction score (1..5) per rent-burden bracket, renters
/// only, in bracket order.
pub fn rent_burden_scores(data: &[SurveyRecord]) -> Vec<GroupSummary> {
    group_mean(
        data,
        |r| match r.housing_situation {
            Some(HousingSituation::Renting) => r.rent_burden.clone(),
            _ => None,
        },
        |r| r.satisfaction.map(|s| f64::from(s.ordinal())),
        Some(&RENT_BURDEN_ORDER),
    )
}

/// Mean signed weight (-2..+2) per raw district name, the bar-chart feed.
pub fn district_summary(data: &[SurveyRecord]) -> Vec<GroupSummary> {
    group_mean(
        data,
        |r| r.district.clone(),
        |r| r.satisfaction.map(|s| f64::from(s.signed_weight())),
        None,
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelCount {
    pub level: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SatisfactionBreakdown {
    /// Per-level counts in canonical order, zero counts included so the
    /// shape is stable for the renderer.
    pub counts: Vec<LevelCount>,
    pub satisfied_pct: f64,
    pub dissatisfied_pct: f64,
}

/// Overall distribution of satisfaction labels, with the share of
/// (very) satisfied and (very) dissatisfied respondents among labeled
/// rows. Zero labeled rows yield zero percentages.
pub fn satisfaction_breakdown(data: &[SurveyRecord]) -> SatisfactionBreakdown {
    let counts: Vec<LevelCount> = SATISFACTION_ORDER
        .iter()
        .map(|&level| LevelCount {
            level: level.label(),
            count: data.iter().filter(|r| r.satisfaction == Some(level)).count() as u64,
        })
        .collect();

    let labeled: u64 = counts.iter().map(|c| c.count).sum();
    let pct = |n: u64| {
        if labeled == 0 {
            0.0
        } else {
            n as f64 / labeled as f64 * 100.0
        }
    };
    let satisfied = counts[0].count + counts[1].count;
    let dissatisfied = counts[3].count + counts[4].count;

    SatisfactionBreakdown {
        counts,
        satisfied_pct: pct(satisfied),
        dissatisfied_pct: pct(dissatisfied),
    }
}

/// Pearson correlation between numeric income and the ordinal satisfaction
/// score, over rows where both are defined.
pub fn income_satisfaction_correlation(data: &[SurveyRecord]) -> Option<f64> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for r in data {
        let (Some(income), Some(level)) = (r.numeric_income, r.satisfaction) else {
            continue;
        };
        xs.push(income);
        ys.push(f64::from(level.ordinal()));
    }
    pearson(&xs, &ys)
}

#[derive(Debug, Clone, Serialize)]
pub struct MapJoin {
    pub legend: Vec<LegendEntry>,
    pub features: Vec<DistrictFeature>,
}

/// District scores merged onto the boundary features, plus the legend
/// derived from the same bucket lookup.
pub fn map_join(boundaries: &BoundaryCollection, data: &[SurveyRecord]) -> MapJoin {
    let scores = geo::district_scores(data);
    MapJoin {
        legend: geo::legend(),
        features: geo::join_districts(boundaries, &scores),
    }
}

pub fn breakdown_rows(breakdown: &SatisfactionBreakdown) -> Vec<BreakdownRow> {
    let labeled: u64 = breakdown.counts.iter().map(|c| c.count).sum();
    breakdown
        .counts
        .iter()
        .map(|c| BreakdownRow {
            level: c.level.to_string(),
            count: c.count,
            share: if labeled == 0 {
                "0.0%".to_string()
            } else {
                format!("{:.1}%", c.count as f64 / labeled as f64 * 100.0)
            },
        })
        .collect()
}

pub fn reason_rows(counts: &[ReasonCount]) -> Vec<ReasonRankingRow> {
    counts
        .iter()
        .enumerate()
        .map(|(idx, c)| ReasonRankingRow {
            rank: idx + 1,
            reason: c.label.to_string(),
            count: c.count,
        })
        .collect()
}

pub fn group_rows(groups: &[GroupSummary]) -> Vec<GroupScoreRow> {
    groups
        .iter()
        .map(|g| GroupScoreRow {
            group: g.key.clone(),
            mean_score: g
                .mean
                .map_or_else(|| "n/a".to_string(), |m| format_number(m, 2)),
            responses: g.count,
        })
        .collect()
}

/// District table rows with the shared display bucket, so the bar chart
/// coloring agrees with the map.
pub fn district_rows(groups: &[GroupSummary]) -> Vec<DistrictScoreRow> {
    groups
        .iter()
        .map(|g| DistrictScoreRow {
            district: g.key.clone(),
            score: g
                .mean
                .map_or_else(|| "n/a".to_string(), |m| format_number(m, 2)),
            responses: g.count,
            bucket: SatisfactionBucket::of(g.mean).label().to_string(),
        })
        .collect()
}

pub fn generate_summary(data: &[SurveyRecord], reasons: &[ReasonCount]) -> SummaryStats {
    let breakdown = satisfaction_breakdown(data);

    let mut ranked: Vec<(String, f64)> = district_summary(data)
        .into_iter()
        .filter_map(|g| g.mean.map(|m| (g.key, m)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    SummaryStats {
        total_responses: data.len(),
        satisfied_pct: breakdown.satisfied_pct,
        dissatisfied_pct: breakdown.dissatisfied_pct,
        income_satisfaction_corr: income_satisfaction_correlation(data),
        top_reasons: top_reasons(reasons, 3),
        highest_scoring_district: ranked.first().map(|(k, _)| k.clone()),
        lowest_scoring_district: ranked.last().map(|(k, _)| k.clone()),
    }
}
