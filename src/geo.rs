//! District name normalization and the boundary dataset join.
//!
//! Survey districts are free text; the boundary GeoJSON keys its features
//! by its own district names. The bridge is a normalization pass plus a
//! static alias table, and the result is a per-feature score with a
//! display bucket. One bucket lookup feeds both the map fill and the
//! legend so the two cannot drift apart.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::warn;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::BoundaryError;
use crate::groupby;
use crate::types::SurveyRecord;

/// Normalize a free-text district name for alias lookup: trim, lowercase,
/// decompose, strip diacritics, drop anything that is still not ASCII.
/// Idempotent, and locale-independent beyond Latin diacritics.
pub fn normalize_district(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii)
        .collect()
}

/// Normalized survey-side name → canonical boundary-feature key.
///
/// Mostly the identity for Portuguese districts; the island rows carry
/// different names on the two sides. A missing entry is the "unmatched"
/// sentinel: such districts are dropped from the join.
static DISTRICT_ALIASES: &[(&str, &str)] = &[
    ("viana do castelo", "viana do castelo"),
    ("braga", "braga"),
    ("vila real", "vila real"),
    ("braganca", "braganca"),
    ("aveiro", "aveiro"),
    ("coimbra", "coimbra"),
    ("leiria", "leiria"),
    ("lisboa", "lisboa"),
    ("porto", "porto"),
    ("setubal", "setubal"),
    ("viseu", "viseu"),
    ("guarda", "guarda"),
    ("santarem", "santarem"),
    ("beja", "beja"),
    ("castelo branco", "castelo branco"),
    ("evora", "evora"),
    ("faro", "faro"),
    ("portalegre", "portalegre"),
    ("ilha da madeira", "madeira"),
    ("acores", "acores"),
];

static CANONICAL_BY_SURVEY: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| DISTRICT_ALIASES.iter().copied().collect());

static SURVEY_BY_CANONICAL: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| DISTRICT_ALIASES.iter().map(|&(s, c)| (c, s)).collect());

/// Canonical boundary key for a raw survey district name; `None` when the
/// normalized name has no alias entry.
pub fn canonical_key(raw: &str) -> Option<&'static str> {
    CANONICAL_BY_SURVEY
        .get(normalize_district(raw).as_str())
        .copied()
}

/// Reverse lookup: normalized survey-side name for a canonical key.
pub fn survey_name(key: &str) -> Option<&'static str> {
    SURVEY_BY_CANONICAL.get(key).copied()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryCollection {
    pub features: Vec<BoundaryFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryFeature {
    pub properties: BoundaryProperties,
    pub geometry: BoundaryGeometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryProperties {
    #[serde(rename = "Distrito")]
    pub district: String,
}

/// The two geometry kinds the district file uses. Coordinates are GeoJSON
/// positions, longitude first.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryGeometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

impl BoundaryGeometry {
    /// Approximate centroid as the arithmetic mean of the outer ring's
    /// vertices (first polygon of a MultiPolygon). Not area-weighted, so
    /// it drifts on irregular shapes; good enough to anchor a marker.
    /// Returns `(lat, lon)`.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let ring = match self {
            Self::Polygon { coordinates } => coordinates.first()?,
            Self::MultiPolygon { coordinates } => coordinates.first()?.first()?,
        };
        let mut lat = 0.0;
        let mut lon = 0.0;
        let mut n = 0usize;
        for position in ring {
            if position.len() < 2 {
                continue;
            }
            lon += position[0];
            lat += position[1];
            n += 1;
        }
        if n == 0 {
            return None;
        }
        Some((lat / n as f64, lon / n as f64))
    }
}

/// Load the boundary feature collection. Read once per process by the
/// caller and cached; any failure here means the map cannot be drawn at
/// all, which is not the same as a district without responses.
pub fn load_boundaries(path: impl AsRef<Path>) -> Result<BoundaryCollection, BoundaryError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| BoundaryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| BoundaryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Display bucket for a district score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SatisfactionBucket {
    VeryLow,
    Low,
    Neutral,
    High,
    VeryHigh,
    NoData,
}

impl SatisfactionBucket {
    /// Scoring buckets in legend order, best first, with the gap state
    /// listed last.
    pub const LEGEND: [SatisfactionBucket; 6] = [
        SatisfactionBucket::VeryHigh,
        SatisfactionBucket::High,
        SatisfactionBucket::Neutral,
        SatisfactionBucket::Low,
        SatisfactionBucket::VeryLow,
        SatisfactionBucket::NoData,
    ];

    /// Bucket a mean signed weight. A score exactly on a threshold lands
    /// in the higher bucket.
    pub fn from_score(score: f64) -> Self {
        if score < -1.5 {
            Self::VeryLow
        } else if score < -0.5 {
            Self::Low
        } else if score < 0.5 {
            Self::Neutral
        } else if score < 1.5 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    /// Bucket an optional score; a missing score is the distinguished
    /// no-data bucket, never a numeric default.
    pub fn of(score: Option<f64>) -> Self {
        score.map_or(Self::NoData, Self::from_score)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High Satisfaction",
            Self::High => "High Satisfaction",
            Self::Neutral => "Neutral Satisfaction",
            Self::Low => "Low Satisfaction",
            Self::VeryLow => "Very Low Satisfaction",
            Self::NoData => "No Data",
        }
    }

    /// Fill color token for the map and the legend swatch.
    pub fn color(self) -> &'static str {
        match self {
            Self::VeryHigh => "#1a9850",
            Self::High => "#91cf60",
            Self::Neutral => "#fee08b",
            Self::Low => "#fc8d59",
            Self::VeryLow => "#d73027",
            Self::NoData => "#f7f7f7",
        }
    }

    /// Score range shown next to the legend swatch.
    pub fn range_label(self) -> &'static str {
        match self {
            Self::VeryHigh => "1.5 to 2.0",
            Self::High => "0.5 to 1.5",
            Self::Neutral => "-0.5 to 0.5",
            Self::Low => "-1.5 to -0.5",
            Self::VeryLow => "-2.0 to -1.5",
            Self::NoData => "no responses",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub bucket: SatisfactionBucket,
    pub label: &'static str,
    pub color: &'static str,
    pub range: &'static str,
}

/// Legend entries derived from the same bucket lookup as the fill colors.
pub fn legend() -> Vec<LegendEntry> {
    SatisfactionBucket::LEGEND
        .iter()
        .map(|&bucket| LegendEntry {
            bucket,
            label: bucket.label(),
            color: bucket.color(),
            range: bucket.range_label(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DistrictScore {
    pub key: String,
    pub mean_weight: f64,
    pub count: usize,
}

/// Mean signed satisfaction weight per canonical district key.
///
/// Raw district names are first aggregated as-is, then re-keyed through
/// the alias table. Names without an alias entry are dropped from the
/// join and logged — the renderer simply shows "no data" for the
/// corresponding feature. Raw spellings that collapse onto the same key
/// merge by weighted mean.
pub fn district_scores(rows: &[SurveyRecord]) -> Vec<DistrictScore> {
    let by_raw = groupby::group_mean(
        rows,
        |r| r.district.clone(),
        |r| r.satisfaction.map(|s| f64::from(s.signed_weight())),
        None,
    );

    let mut merged: BTreeMap<&'static str, (f64, usize)> = BTreeMap::new();
    for group in by_raw {
        let Some(mean) = group.mean else { continue };
        match canonical_key(&group.key) {
            Some(key) => {
                let e = merged.entry(key).or_insert((0.0, 0));
                e.0 += mean * group.count as f64;
                e.1 += group.count;
            }
            None => warn!(
                district = %group.key,
                "district has no boundary alias, dropped from join"
            ),
        }
    }

    merged
        .into_iter()
        .map(|(key, (weight_sum, count))| DistrictScore {
            key: key.to_string(),
            mean_weight: weight_sum / count as f64,
            count,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DistrictFeature {
    pub key: String,
    pub district: String,
    pub score: Option<f64>,
    pub responses: Option<usize>,
    pub bucket: SatisfactionBucket,
    pub label: &'static str,
    pub color: &'static str,
    pub centroid: Option<(f64, f64)>,
}

/// Merge computed district scores onto the boundary features.
///
/// One entry per feature; a feature whose district has no score keeps the
/// no-data bucket, so the renderer can tell a benign gap from the
/// structural failure of `load_boundaries`.
pub fn join_districts(
    boundaries: &BoundaryCollection,
    scores: &[DistrictScore],
) -> Vec<DistrictFeature> {
    let by_key: HashMap<&str, &DistrictScore> =
        scores.iter().map(|s| (s.key.as_str(), s)).collect();

    boundaries
        .features
        .iter()
        .map(|feature| {
            let key = normalize_district(&feature.properties.district);
            let hit = by_key.get(key.as_str()).copied();
            let score = hit.map(|s| s.mean_weight);
            let bucket = SatisfactionBucket::of(score);
            DistrictFeature {
                key,
                district: feature.properties.district.clone(),
                score,
                responses: hit.map(|s| s.count),
                bucket,
                label: bucket.label(),
                color: bucket.color(),
                centroid: feature.geometry.centroid(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::SatisfactionLevel;

    fn record(district: &str, label: &str) -> SurveyRecord {
        SurveyRecord {
            district: Some(district.to_string()),
            satisfaction: SatisfactionLevel::from_label(label),
            ..SurveyRecord::default()
        }
    }

    #[test]
    fn normalization_strips_diacritics_and_case() {
        assert_eq!(normalize_district("Évora"), "evora");
        assert_eq!(normalize_district("Setúbal"), "setubal");
        assert_eq!(normalize_district("  Santarém "), "santarem");
        assert_eq!(normalize_district("São João"), "sao joao");
    }

    #[test]
    fn normalization_is_idempotent() {
        for name in ["Bragança", "AÇORES", "Viana do Castelo", "Ilha da Madeira"] {
            let once = normalize_district(name);
            assert_eq!(normalize_district(&once), once);
        }
    }

    #[test]
    fn alias_table_round_trips() {
        for &(survey, canonical) in DISTRICT_ALIASES {
            assert_eq!(canonical_key(survey), Some(canonical));
            assert_eq!(survey_name(canonical), Some(survey));
        }
    }

    #[test]
    fn unmatched_names_hit_the_sentinel() {
        assert_eq!(canonical_key("Atlantis"), None);
        assert_eq!(survey_name("atlantis"), None);
    }

    #[test]
    fn island_aliases_re_key() {
        assert_eq!(canonical_key("Ilha da Madeira"), Some("madeira"));
        assert_eq!(survey_name("madeira"), Some("ilha da madeira"));
    }

    #[test]
    fn threshold_scores_land_in_the_higher_bucket() {
        assert_eq!(SatisfactionBucket::from_score(0.5), SatisfactionBucket::High);
        assert_eq!(SatisfactionBucket::from_score(-0.5), SatisfactionBucket::Neutral);
        assert_eq!(SatisfactionBucket::from_score(1.5), SatisfactionBucket::VeryHigh);
        assert_eq!(SatisfactionBucket::from_score(-1.5), SatisfactionBucket::Low);
        assert_eq!(SatisfactionBucket::from_score(-2.0), SatisfactionBucket::VeryLow);
        assert_eq!(SatisfactionBucket::from_score(0.0), SatisfactionBucket::Neutral);
    }

    #[test]
    fn missing_score_gets_the_no_data_bucket() {
        assert_eq!(SatisfactionBucket::of(None), SatisfactionBucket::NoData);
        assert_eq!(SatisfactionBucket::of(Some(2.0)), SatisfactionBucket::VeryHigh);
    }

    #[test]
    fn legend_and_fill_share_one_lookup() {
        for entry in legend() {
            assert_eq!(entry.color, entry.bucket.color());
            assert_eq!(entry.label, entry.bucket.label());
        }
    }

    #[test]
    fn district_scores_match_worked_example() {
        // Lisboa: (+2 + -1) / 2 = 0.5 → high; Porto: -2 → very low.
        let rows = vec![
            record("Lisboa", "Very Satisfied"),
            record("Lisboa", "Dissatisfied"),
            record("Porto", "Very Dissatisfied"),
        ];
        let scores = district_scores(&rows);
        let lisboa = scores.iter().find(|s| s.key == "lisboa").unwrap();
        let porto = scores.iter().find(|s| s.key == "porto").unwrap();
        assert_eq!(lisboa.mean_weight, 0.5);
        assert_eq!(lisboa.count, 2);
        assert_eq!(porto.mean_weight, -2.0);
        assert_eq!(
            SatisfactionBucket::from_score(lisboa.mean_weight),
            SatisfactionBucket::High
        );
        assert_eq!(
            SatisfactionBucket::from_score(porto.mean_weight),
            SatisfactionBucket::VeryLow
        );
    }

    #[test]
    fn unaliased_districts_are_dropped_from_the_join() {
        let rows = vec![
            record("Lisboa", "Satisfied"),
            record("Narnia", "Satisfied"),
        ];
        let scores = district_scores(&rows);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].key, "lisboa");
    }

    #[test]
    fn accented_spellings_merge_with_plain_ones() {
        let rows = vec![
            record("Setúbal", "Very Satisfied"),
            record("Setubal", "Neutral"),
        ];
        let scores = district_scores(&rows);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].key, "setubal");
        assert_eq!(scores[0].count, 2);
        assert_eq!(scores[0].mean_weight, 1.0);
    }

    fn square_feature(district: &str) -> BoundaryFeature {
        BoundaryFeature {
            properties: BoundaryProperties {
                district: district.to_string(),
            },
            geometry: BoundaryGeometry::Polygon {
                coordinates: vec![vec![
                    vec![-9.0, 38.0],
                    vec![-8.0, 38.0],
                    vec![-8.0, 39.0],
                    vec![-9.0, 39.0],
                ]],
            },
        }
    }

    #[test]
    fn polygon_centroid_is_the_vertex_mean() {
        let feature = square_feature("Lisboa");
        assert_eq!(feature.geometry.centroid(), Some((38.5, -8.5)));
    }

    #[test]
    fn multipolygon_centroid_uses_the_first_ring() {
        let geometry = BoundaryGeometry::MultiPolygon {
            coordinates: vec![
                vec![vec![vec![0.0, 0.0], vec![2.0, 0.0], vec![2.0, 2.0], vec![0.0, 2.0]]],
                vec![vec![vec![10.0, 10.0], vec![12.0, 10.0], vec![12.0, 12.0]]],
            ],
        };
        assert_eq!(geometry.centroid(), Some((1.0, 1.0)));
    }

    #[test]
    fn join_marks_features_without_scores_as_no_data() {
        let boundaries = BoundaryCollection {
            features: vec![square_feature("Lisboa"), square_feature("Faro")],
        };
        let rows = vec![
            record("Lisboa", "Very Satisfied"),
            record("Lisboa", "Dissatisfied"),
        ];
        let joined = join_districts(&boundaries, &district_scores(&rows));
        assert_eq!(joined.len(), 2);

        let lisboa = joined.iter().find(|f| f.key == "lisboa").unwrap();
        assert_eq!(lisboa.score, Some(0.5));
        assert_eq!(lisboa.responses, Some(2));
        assert_eq!(lisboa.bucket, SatisfactionBucket::High);

        let faro = joined.iter().find(|f| f.key == "faro").unwrap();
        assert_eq!(faro.score, None);
        assert_eq!(faro.responses, None);
        assert_eq!(faro.bucket, SatisfactionBucket::NoData);
        assert_eq!(faro.color, "#f7f7f7");
    }

    #[test]
    fn join_normalizes_accented_feature_names() {
        let boundaries = BoundaryCollection {
            features: vec![square_feature("Évora")],
        };
        let rows = vec![record("Évora", "Satisfied")];
        let joined = join_districts(&boundaries, &district_scores(&rows));
        assert_eq!(joined[0].key, "evora");
        assert_eq!(joined[0].score, Some(1.0));
    }

    #[test]
    fn missing_boundary_file_is_a_structural_failure() {
        let err = load_boundaries("/definitely/not/here.geojson").unwrap_err();
        assert!(matches!(err, BoundaryError::Read { .. }));
    }

    #[test]
    fn corrupt_boundary_file_is_a_structural_failure() {
        let path = std::env::temp_dir().join("corrupt_boundaries.geojson");
        fs::write(&path, "{ this is not geojson").unwrap();
        let err = load_boundaries(&path).unwrap_err();
        assert!(matches!(err, BoundaryError::Parse { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn well_formed_boundary_file_parses() {
        let path = std::env::temp_dir().join("districts_ok.geojson");
        fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"Distrito":"Lisboa"},
                 "geometry":{"type":"Polygon","coordinates":[[[-9.0,38.0],[-8.0,38.0],[-8.5,39.0]]]}},
                {"type":"Feature","properties":{"Distrito":"Madeira"},
                 "geometry":{"type":"MultiPolygon","coordinates":[[[[-17.0,32.6],[-16.8,32.6],[-16.9,32.9]]]]}}
            ]}"#,
        )
        .unwrap();
        let boundaries = load_boundaries(&path).unwrap();
        assert_eq!(boundaries.features.len(), 2);
        assert!(boundaries.features[1].geometry.centroid().is_some());
        let _ = fs::remove_file(&path);
    }
}
