// Entry point and high-level console flow.
//
// The binary mirrors the data path of the original satisfaction dashboard
// without the charting:
// - Option [1] loads and parses the survey CSV, printing diagnostics.
// - Option [2] runs every aggregation, writes each table to its own
//   CSV/JSON file, and prints Markdown previews to the console.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
mod crosstab;
mod error;
mod geo;
mod groupby;
mod loader;
mod output;
mod reasons;
mod reports;
mod scale;
mod types;
mod util;

use once_cell::sync::Lazy;
use std::env;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use error::BoundaryError;
use geo::BoundaryCollection;
use loader::LoadReport;
use types::SurveyRecord;

// Simple in-memory app state: the survey is loaded once but reports can be
// generated multiple times in a single run, and the boundary file is read
// on first use and kept for the rest of the process.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        boundaries: None,
    })
});

struct AppState {
    data: Option<(Vec<SurveyRecord>, LoadReport)>,
    boundaries: Option<BoundaryCollection>,
}

fn survey_path() -> String {
    env::var("SURVEY_CSV").unwrap_or_else(|_| "housing_survey.csv".to_string())
}

fn boundary_path() -> String {
    env::var("BOUNDARY_GEOJSON").unwrap_or_else(|_| "distrito_all_s.geojson".to_string())
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt. The prompt is reused for the main menu and simple inputs.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load and parse the survey CSV.
///
/// On success we store the rows and the load report in `APP_STATE` and
/// print a short textual summary of what happened.
fn handle_load() {
    let path = survey_path();
    match loader::load_survey(&path) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} kept)",
                util::format_int(report.total_rows as i64),
                util::format_int(report.kept_rows as i64)
            );
            println!(
                "Note: {} rows skipped due to parse errors.",
                util::format_int(report.parse_errors as i64)
            );
            if report.unknown_satisfaction > 0 {
                println!(
                    "Info: {} rows carry an unrecognized satisfaction label; they are excluded from numeric aggregates.",
                    util::format_int(report.unknown_satisfaction as i64)
                );
            }
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some((data, report));
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Boundary dataset, loaded on first use and cached for the process
/// lifetime.
fn boundaries_cached() -> Result<BoundaryCollection, BoundaryError> {
    {
        let state = APP_STATE.lock().unwrap();
        if let Some(b) = &state.boundaries {
            return Ok(b.clone());
        }
    }
    let boundaries = geo::load_boundaries(boundary_path())?;
    let mut state = APP_STATE.lock().unwrap();
    state.boundaries = Some(boundaries.clone());
    Ok(boundaries)
}

/// Handle option [2]: generate all reports and the JSON summary.
///
/// This function is intentionally side-effectful:
/// - writes the report CSV files,
/// - writes the map join and summary JSON files,
/// - and prints Markdown previews of each report to the console.
fn handle_generate_reports() {
    let loaded = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some((data, load_report)) = loaded else {
        println!("Error: No data loaded. Please load the survey file first (option 1).\n");
        return;
    };

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    let r1 = reports::situation_crosstab(&data);
    let file1 = "report1_situation_crosstab.csv";
    if let Err(e) = output::write_crosstab_csv(file1, &r1) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Satisfaction Levels by Housing Situation\n");
    output::preview_crosstab(&r1, 3);
    println!("(Full table exported to {})\n", file1);

    let breakdown = reports::satisfaction_breakdown(&data);
    println!("Overall Satisfaction Distribution");
    println!(
        "(Satisfied: {}%, Dissatisfied: {}%)\n",
        util::format_number(breakdown.satisfied_pct, 1),
        util::format_number(breakdown.dissatisfied_pct, 1)
    );
    output::preview_table_rows(&reports::breakdown_rows(&breakdown), 5);

    let counts = reasons::reason_counts(&data, &load_report.present_reasons);
    let r2 = reports::reason_rows(&counts);
    let file2 = "report2_reason_ranking.csv";
    if let Err(e) = output::write_csv(file2, &r2) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Reasons for Housing Dissatisfaction\n");
    output::preview_table_rows(&r2, 3);
    println!("(Full table exported to {})\n", file2);

    let r3_tab = reports::rent_burden_crosstab(&data);
    let file3_tab = "report3_rent_burden_crosstab.csv";
    if let Err(e) = output::write_crosstab_csv(file3_tab, &r3_tab) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Satisfaction by Rent Burden");
    println!("(Renters only, brackets ordered by affordability)\n");
    output::preview_crosstab(&r3_tab, 5);
    println!("(Full table exported to {})\n", file3_tab);
    let r3 = reports::group_rows(&reports::rent_burden_scores(&data));
    let file3 = "report3_rent_burden_scores.csv";
    if let Err(e) = output::write_csv(file3, &r3) {
        eprintln!("Write error: {}", e);
    }
    output::preview_table_rows(&r3, 5);
    println!("(Full table exported to {})\n", file3);

    let r4 = reports::income_crosstab(&data);
    let file4 = "report4_income_crosstab.csv";
    if let Err(e) = output::write_crosstab_csv(file4, &r4) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 4: Satisfaction Levels by Income Bracket\n");
    output::preview_crosstab(&r4, 3);
    match reports::income_satisfaction_correlation(&data) {
        Some(corr) => println!(
            "Income-satisfaction correlation: {}",
            util::format_number(corr, 2)
        ),
        None => println!("Income-satisfaction correlation: n/a (insufficient data)"),
    }
    println!("(Full table exported to {})\n", file4);

    let districts = reports::district_summary(&data);
    let r5 = reports::district_rows(&districts);
    let file5 = "report5_district_scores.csv";
    if let Err(e) = output::write_csv(file5, &r5) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 5: Average Satisfaction Score by District\n");
    output::preview_table_rows(&r5, 3);
    println!("(Full table exported to {})\n", file5);

    let map_file = "map_districts.json";
    match boundaries_cached() {
        Ok(boundaries) => {
            let join = reports::map_join(&boundaries, &data);
            if let Err(e) = output::write_json(map_file, &join) {
                eprintln!("Write error: {}", e);
            }
            let with_data = join.features.iter().filter(|f| f.score.is_some()).count();
            println!(
                "Map join: {} districts with data, {} without. (Exported to {})\n",
                util::format_int(with_data as i64),
                util::format_int((join.features.len() - with_data) as i64),
                map_file
            );
        }
        // A failed boundary load is a structural error: the map cannot be
        // rendered at all, unlike a district that merely has no responses.
        Err(e) => {
            eprintln!("Map join skipped: {}\n", e);
        }
    }

    let summary = reports::generate_summary(&data, &counts);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"satisfied_pct\": {}, \"dissatisfied_pct\": {}}}\n",
        util::format_number(summary.satisfied_pct, 1),
        util::format_number(summary.dissatisfied_pct, 1)
    );
}

fn main() {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::WARN),
        )
        .with_target(false)
        .init();

    loop {
        println!("Housing Satisfaction Reports:");
        println!("[1] Load the survey file");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
