use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

use crate::error::LoadError;
use crate::reasons::Reason;
use crate::scale::SatisfactionLevel;
use crate::types::{HousingSituation, RawRow, SurveyRecord};
use crate::util::{parse_f64_safe, parse_flag};

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
    /// Rows carrying a satisfaction label outside the known scale. They
    /// are kept, but excluded from every numeric aggregate.
    pub unknown_satisfaction: usize,
    /// Reason indicator columns actually present in the CSV header, in
    /// dictionary order. Columns missing from the export are skipped by
    /// the reason aggregation rather than erroring.
    pub present_reasons: Vec<Reason>,
}

pub fn load_survey(path: impl AsRef<Path>) -> Result<(Vec<SurveyRecord>, LoadReport), LoadError> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    // Validate the indicator columns once, up front, instead of scanning
    // column names during aggregation.
    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let present_reasons: Vec<Reason> = Reason::ALL
        .iter()
        .copied()
        .filter(|r| headers.iter().any(|h| h == r.column()))
        .collect();

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut unknown_satisfaction = 0usize;
    let mut records: Vec<SurveyRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = total_rows, error = %e, "skipping malformed row");
                parse_errors += 1;
                continue;
            }
        };

        let satisfaction = row
            .satisfaction_level
            .as_deref()
            .and_then(SatisfactionLevel::from_label);
        let had_label = row
            .satisfaction_level
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if had_label && satisfaction.is_none() {
            unknown_satisfaction += 1;
        }

        let housing_situation = row
            .housing_situation
            .as_deref()
            .and_then(HousingSituation::from_label);

        let reasons: Vec<Reason> = present_reasons
            .iter()
            .copied()
            .filter(|r| parse_flag(row.reason_cell(*r)))
            .collect();

        let numeric_income = parse_f64_safe(row.numeric_income.as_deref());

        records.push(SurveyRecord {
            housing_situation,
            satisfaction,
            income_bracket: clean_text(row.income_bracket),
            rent_burden: clean_text(row.rent_burden),
            district: clean_text(row.district),
            numeric_income,
            reasons,
        });
    }

    let kept_rows = records.len();
    let report = LoadReport {
        total_rows,
        kept_rows,
        parse_errors,
        unknown_satisfaction,
        present_reasons,
    };
    Ok((records, report))
}

fn clean_text(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_and_cleans_a_small_export() {
        let path = std::env::temp_dir().join("survey_loader_small.csv");
        fs::write(
            &path,
            "housing_situation,satisfaction_level,rendimento-anual,rent_burden,distrito,rendimento_numerical,reason_pago-demasiado,reason_vivo-longe\n\
             Renting,Very Satisfied,20001-35000,31-50% (Moderate),Lisboa,27500,True,False\n\
             Owning,Blissful,,,Évora,,False,True\n\
             Other,,,, , ,False,False\n",
        )
        .unwrap();

        let (records, report) = load_survey(&path).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.kept_rows, 3);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(report.unknown_satisfaction, 1);
        assert_eq!(
            report.present_reasons,
            vec![Reason::PayingTooMuch, Reason::LivingFar]
        );

        assert_eq!(records[0].housing_situation, Some(HousingSituation::Renting));
        assert_eq!(
            records[0].satisfaction,
            Some(SatisfactionLevel::VerySatisfied)
        );
        assert_eq!(records[0].numeric_income, Some(27500.0));
        assert_eq!(records[0].reasons, vec![Reason::PayingTooMuch]);

        // Unknown label stays missing rather than defaulting.
        assert_eq!(records[1].satisfaction, None);
        assert_eq!(records[1].district.as_deref(), Some("Évora"));
        assert_eq!(records[1].reasons, vec![Reason::LivingFar]);

        // Whitespace-only cells are missing.
        assert_eq!(records[2].district, None);
        assert_eq!(records[2].numeric_income, None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_survey_file_reports_the_path() {
        let err = load_survey("/definitely/not/here.csv").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not/here.csv"), "unexpected message: {msg}");
    }
}
