use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::reasons::Reason;
use crate::scale::SatisfactionLevel;

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "housing_situation")]
    pub housing_situation: Option<String>,
    #[serde(rename = "satisfaction_level")]
    pub satisfaction_level: Option<String>,
    #[serde(rename = "rendimento-anual")]
    pub income_bracket: Option<String>,
    #[serde(rename = "rent_burden")]
    pub rent_burden: Option<String>,
    #[serde(rename = "distrito")]
    pub district: Option<String>,
    #[serde(rename = "rendimento_numerical")]
    pub numeric_income: Option<String>,
    #[serde(rename = "reason_pago-demasiado")]
    pub reason_paying_too_much: Option<String>,
    #[serde(rename = "reason_falta-espaco")]
    pub reason_lack_of_space: Option<String>,
    #[serde(rename = "reason_habitacao-mau-estado")]
    pub reason_poor_condition: Option<String>,
    #[serde(rename = "reason_vivo-longe")]
    pub reason_living_far: Option<String>,
    #[serde(rename = "reason_quero-independecia")]
    pub reason_want_independence: Option<String>,
    #[serde(rename = "reason_dificuldades-financeiras")]
    pub reason_financial_difficulties: Option<String>,
    #[serde(rename = "reason_financeiramente-dependente")]
    pub reason_financially_dependent: Option<String>,
    #[serde(rename = "reason_vivo-longe-de-transportes")]
    pub reason_far_from_transport: Option<String>,
    #[serde(rename = "reason_vivo-zona-insegura")]
    pub reason_unsafe_area: Option<String>,
    #[serde(rename = "reason_partilho-casa-com-desconhecidos")]
    pub reason_sharing_with_strangers: Option<String>,
}

impl RawRow {
    /// Raw cell for a reason indicator, keyed by the dictionary entry.
    pub fn reason_cell(&self, reason: Reason) -> Option<&str> {
        let cell = match reason {
            Reason::PayingTooMuch => &self.reason_paying_too_much,
            Reason::LackOfSpace => &self.reason_lack_of_space,
            Reason::PoorCondition => &self.reason_poor_condition,
            Reason::LivingFar => &self.reason_living_far,
            Reason::WantIndependence => &self.reason_want_independence,
            Reason::FinancialDifficulties => &self.reason_financial_difficulties,
            Reason::FinanciallyDependent => &self.reason_financially_dependent,
            Reason::FarFromTransport => &self.reason_far_from_transport,
            Reason::UnsafeArea => &self.reason_unsafe_area,
            Reason::SharingWithStrangers => &self.reason_sharing_with_strangers,
        };
        cell.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HousingSituation {
    Owning,
    Renting,
    Other,
}

impl HousingSituation {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Owning" => Some(Self::Owning),
            "Renting" => Some(Self::Renting),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Owning => "Owning",
            Self::Renting => "Renting",
            Self::Other => "Other",
        }
    }
}

/// One respondent. Every field is optional except the reason set: the
/// parsers turn unknown or empty cells into `None` so downstream
/// aggregations can exclude them instead of defaulting.
#[derive(Debug, Clone, Default)]
pub struct SurveyRecord {
    pub housing_situation: Option<HousingSituation>,
    pub satisfaction: Option<SatisfactionLevel>,
    pub income_bracket: Option<String>,
    pub rent_burden: Option<String>,
    pub district: Option<String>,
    pub numeric_income: Option<f64>,
    pub reasons: Vec<Reason>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[serde(rename = "SatisfactionLevel")]
    #[tabled(rename = "SatisfactionLevel")]
    pub level: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: u64,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ReasonRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Reason")]
    #[tabled(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: u64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GroupScoreRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "MeanScore")]
    #[tabled(rename = "MeanScore")]
    pub mean_score: String,
    #[serde(rename = "Responses")]
    #[tabled(rename = "Responses")]
    pub responses: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistrictScoreRow {
    #[serde(rename = "District")]
    #[tabled(rename = "District")]
    pub district: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "Responses")]
    #[tabled(rename = "Responses")]
    pub responses: usize,
    #[serde(rename = "Bucket")]
    #[tabled(rename = "Bucket")]
    pub bucket: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_responses: usize,
    pub satisfied_pct: f64,
    pub dissatisfied_pct: f64,
    pub income_satisfaction_corr: Option<f64>,
    pub top_reasons: Vec<String>,
    pub highest_scoring_district: Option<String>,
    pub lowest_scoring_district: Option<String>,
}
