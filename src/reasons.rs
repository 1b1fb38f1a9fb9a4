//! Dissatisfaction reason indicators.
//!
//! The cleaning pipeline exports one boolean column per known reason. The
//! indicator set is a fixed dictionary rather than a column-name scan, so a
//! typo'd column cannot silently become a new category; the declaration
//! order doubles as the deterministic tie-break when ranking counts.

use serde::Serialize;

use crate::types::SurveyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    PayingTooMuch,
    LackOfSpace,
    PoorCondition,
    LivingFar,
    WantIndependence,
    FinancialDifficulties,
    FinanciallyDependent,
    FarFromTransport,
    UnsafeArea,
    SharingWithStrangers,
}

impl Reason {
    /// Dictionary declaration order; ranking ties resolve in this order.
    pub const ALL: [Reason; 10] = [
        Reason::PayingTooMuch,
        Reason::LackOfSpace,
        Reason::PoorCondition,
        Reason::LivingFar,
        Reason::WantIndependence,
        Reason::FinancialDifficulties,
        Reason::FinanciallyDependent,
        Reason::FarFromTransport,
        Reason::UnsafeArea,
        Reason::SharingWithStrangers,
    ];

    /// CSV column the indicator is read from.
    pub fn column(self) -> &'static str {
        match self {
            Self::PayingTooMuch => "reason_pago-demasiado",
            Self::LackOfSpace => "reason_falta-espaco",
            Self::PoorCondition => "reason_habitacao-mau-estado",
            Self::LivingFar => "reason_vivo-longe",
            Self::WantIndependence => "reason_quero-independecia",
            Self::FinancialDifficulties => "reason_dificuldades-financeiras",
            Self::FinanciallyDependent => "reason_financeiramente-dependente",
            Self::FarFromTransport => "reason_vivo-longe-de-transportes",
            Self::UnsafeArea => "reason_vivo-zona-insegura",
            Self::SharingWithStrangers => "reason_partilho-casa-com-desconhecidos",
        }
    }

    /// Human-readable label handed to the renderer.
    pub fn label(self) -> &'static str {
        match self {
            Self::PayingTooMuch => "Paying too much",
            Self::LackOfSpace => "Lack of space",
            Self::PoorCondition => "Poor housing condition",
            Self::LivingFar => "Living far from work/amenities",
            Self::WantIndependence => "Want independence",
            Self::FinancialDifficulties => "Financial difficulties",
            Self::FinanciallyDependent => "Financially dependent",
            Self::FarFromTransport => "Far from transportation",
            Self::UnsafeArea => "Living in unsafe area",
            Self::SharingWithStrangers => "Sharing with strangers",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReasonCount {
    pub label: &'static str,
    pub count: u64,
}

/// Sum each indicator over the row set and rank descending by count.
///
/// `indicators` is the subset of the dictionary to aggregate, normally the
/// columns the loader actually found in the CSV header (in dictionary
/// order). The sort is stable, so equal counts keep dictionary order and
/// repeated runs agree on the "top 3". An indicator that is present but
/// never flagged yields a count of 0.
pub fn reason_counts(rows: &[SurveyRecord], indicators: &[Reason]) -> Vec<ReasonCount> {
    let mut counts: Vec<ReasonCount> = indicators
        .iter()
        .map(|&reason| ReasonCount {
            label: reason.label(),
            count: rows.iter().filter(|row| row.reasons.contains(&reason)).count() as u64,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// First `n` labels of a ranked count list.
pub fn top_reasons(counts: &[ReasonCount], n: usize) -> Vec<String> {
    counts.iter().take(n).map(|c| c.label.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(reasons: &[Reason]) -> SurveyRecord {
        SurveyRecord {
            reasons: reasons.to_vec(),
            ..SurveyRecord::default()
        }
    }

    #[test]
    fn counts_rank_descending() {
        // 5 rows far from work, 3 rows paying too much, 2 empty rows.
        let mut rows = Vec::new();
        for _ in 0..3 {
            rows.push(row_with(&[Reason::PayingTooMuch, Reason::LivingFar]));
        }
        for _ in 0..2 {
            rows.push(row_with(&[Reason::LivingFar]));
        }
        rows.push(row_with(&[]));
        rows.push(row_with(&[]));

        let counts = reason_counts(&rows, &[Reason::PayingTooMuch, Reason::LivingFar]);
        assert_eq!(counts[0].label, "Living far from work/amenities");
        assert_eq!(counts[0].count, 5);
        assert_eq!(counts[1].label, "Paying too much");
        assert_eq!(counts[1].count, 3);
    }

    #[test]
    fn ties_break_by_dictionary_order() {
        let rows = vec![
            row_with(&[Reason::UnsafeArea]),
            row_with(&[Reason::LackOfSpace]),
        ];
        let counts = reason_counts(&rows, &Reason::ALL);
        // Both flagged once; LackOfSpace is declared before UnsafeArea.
        let flagged: Vec<&str> = counts
            .iter()
            .filter(|c| c.count == 1)
            .map(|c| c.label)
            .collect();
        assert_eq!(flagged, vec!["Lack of space", "Living in unsafe area"]);
    }

    #[test]
    fn ranking_is_deterministic_across_runs() {
        let rows = vec![
            row_with(&[Reason::PayingTooMuch, Reason::LivingFar]),
            row_with(&[Reason::LivingFar, Reason::PayingTooMuch]),
        ];
        let a = reason_counts(&rows, &Reason::ALL);
        let b = reason_counts(&rows, &Reason::ALL);
        let labels_a: Vec<&str> = a.iter().map(|c| c.label).collect();
        let labels_b: Vec<&str> = b.iter().map(|c| c.label).collect();
        assert_eq!(labels_a, labels_b);
    }

    #[test]
    fn absent_indicators_are_skipped() {
        let rows = vec![row_with(&[Reason::PayingTooMuch])];
        let counts = reason_counts(&rows, &[Reason::PayingTooMuch]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 1);
    }

    #[test]
    fn present_but_unflagged_indicator_counts_zero() {
        let rows = vec![row_with(&[])];
        let counts = reason_counts(&rows, &[Reason::FarFromTransport]);
        assert_eq!(counts[0].count, 0);
    }

    #[test]
    fn top_reasons_takes_the_head_of_the_ranking() {
        let rows = vec![
            row_with(&[Reason::PayingTooMuch, Reason::LivingFar, Reason::LackOfSpace]),
            row_with(&[Reason::LivingFar]),
        ];
        let counts = reason_counts(&rows, &Reason::ALL);
        let top = top_reasons(&counts, 3);
        assert_eq!(
            top,
            vec![
                "Living far from work/amenities".to_string(),
                "Paying too much".to_string(),
                "Lack of space".to_string(),
            ]
        );
    }
}
