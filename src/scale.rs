//! Satisfaction labels and their two numeric encodings.
//!
//! The survey stores satisfaction as one of five ordered labels. Downstream
//! aggregations use two fixed encodings: an ordinal 1..5 score for averages
//! and correlations, and a signed -2..+2 weight for geographic scoring.
//! Modeling the level as an enum makes the label/score bijection total by
//! construction; parsing is the single place where an unknown label turns
//! into "missing".

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SatisfactionLevel {
    #[serde(rename = "Very Satisfied")]
    VerySatisfied,
    #[serde(rename = "Satisfied")]
    Satisfied,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Dissatisfied")]
    Dissatisfied,
    #[serde(rename = "Very Dissatisfied")]
    VeryDissatisfied,
}

/// Canonical render order, most to least satisfied.
pub const SATISFACTION_ORDER: [SatisfactionLevel; 5] = [
    SatisfactionLevel::VerySatisfied,
    SatisfactionLevel::Satisfied,
    SatisfactionLevel::Neutral,
    SatisfactionLevel::Dissatisfied,
    SatisfactionLevel::VeryDissatisfied,
];

impl SatisfactionLevel {
    /// Parse a survey label. Unknown labels map to `None` so they stay out
    /// of numeric aggregates instead of silently biasing them toward a
    /// default score.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Very Satisfied" => Some(Self::VerySatisfied),
            "Satisfied" => Some(Self::Satisfied),
            "Neutral" => Some(Self::Neutral),
            "Dissatisfied" => Some(Self::Dissatisfied),
            "Very Dissatisfied" => Some(Self::VeryDissatisfied),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VerySatisfied => "Very Satisfied",
            Self::Satisfied => "Satisfied",
            Self::Neutral => "Neutral",
            Self::Dissatisfied => "Dissatisfied",
            Self::VeryDissatisfied => "Very Dissatisfied",
        }
    }

    /// Ordinal score on a 1..5 scale (Very Dissatisfied = 1).
    pub fn ordinal(self) -> u8 {
        match self {
            Self::VerySatisfied => 5,
            Self::Satisfied => 4,
            Self::Neutral => 3,
            Self::Dissatisfied => 2,
            Self::VeryDissatisfied => 1,
        }
    }

    /// Signed weight on a -2..+2 scale (Neutral = 0), used for district
    /// scoring.
    pub fn signed_weight(self) -> i8 {
        match self {
            Self::VerySatisfied => 2,
            Self::Satisfied => 1,
            Self::Neutral => 0,
            Self::Dissatisfied => -1,
            Self::VeryDissatisfied => -2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_encodings_cover_every_level() {
        let ordinals: Vec<u8> = SATISFACTION_ORDER.iter().map(|l| l.ordinal()).collect();
        let weights: Vec<i8> = SATISFACTION_ORDER.iter().map(|l| l.signed_weight()).collect();
        assert_eq!(ordinals, vec![5, 4, 3, 2, 1]);
        assert_eq!(weights, vec![2, 1, 0, -1, -2]);
    }

    #[test]
    fn label_round_trips() {
        for level in SATISFACTION_ORDER {
            assert_eq!(SatisfactionLevel::from_label(level.label()), Some(level));
        }
    }

    #[test]
    fn unknown_labels_have_no_score() {
        assert_eq!(SatisfactionLevel::from_label("Somewhat Satisfied"), None);
        assert_eq!(SatisfactionLevel::from_label(""), None);
        assert_eq!(SatisfactionLevel::from_label("very satisfied"), None);
    }

    #[test]
    fn labels_parse_with_surrounding_whitespace() {
        assert_eq!(
            SatisfactionLevel::from_label(" Very Satisfied ").map(SatisfactionLevel::ordinal),
            Some(5)
        );
        assert_eq!(
            SatisfactionLevel::from_label("Dissatisfied").map(SatisfactionLevel::signed_weight),
            Some(-1)
        );
    }
}
