// Entry point and high-level CLI flow.
//
// - Option [1] loads every dataset from the data directory, printing
//   per-file diagnostics.
// - Option [2] builds the summaries and prints the league table, movers and
//   story text, exporting CSV/JSON alongside.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
use fines_report::aggregate;
use fines_report::domain::Jurisdiction;
use fines_report::loader;
use fines_report::narrative;
use fines_report::output;
use fines_report::rank::{self, Direction};
use fines_report::types::{
    Coverage, Datasets, Mover, MoverRow, StateLeagueRow, StateStory, StoryExport,
};
use fines_report::util::{format_decimal, format_int, format_pct};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

const DATA_DIR: &str = "data";

// Simple in-memory app state so we only load the datasets once but can
// generate reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Datasets>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
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

/// Handle option [1]: load every dataset. The load is all-or-nothing; any
/// missing file leaves the previous state untouched.
fn handle_load() {
    match loader::load_all(Path::new(DATA_DIR)) {
        Ok((data, reports)) => {
            for r in &reports {
                println!(
                    "Loaded {}: {} rows, {} kept, {} dropped as noise.",
                    r.file,
                    format_int(r.total_rows as i64),
                    format_int(r.kept_rows as i64),
                    format_int(r.dropped_rows() as i64)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(data);
        }
        Err(e) => {
            eprintln!("Datasets unavailable: {}\n", e);
        }
    }
}

fn pct_or_na(coverage: &Coverage<f64>) -> String {
    match coverage.value() {
        Some(v) => format_pct(*v),
        None => "n/a".to_string(),
    }
}

fn mover_row(direction: &str, m: &Mover<Jurisdiction>) -> MoverRow {
    MoverRow {
        direction: direction.to_string(),
        state: m.subject.name().to_string(),
        earliest: format_decimal(m.earliest),
        latest: format_decimal(m.latest),
        pct_change: format_pct(m.pct_change),
    }
}

/// Handle option [2]: build the summaries and produce every report.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the datasets first (option 1).\n");
        return;
    };

    println!("Generating reports...\n");

    let summaries = aggregate::build_all_summaries(&data);
    let national = aggregate::build_national_summary(&summaries);

    // League table: states ranked by their latest rate per 10k.
    let pairs: Vec<(Jurisdiction, f64)> = summaries
        .values()
        .filter_map(|s| s.rate_per_10k.map(|r| (s.jurisdiction, r)))
        .collect();
    let mut ranked = rank::rank_by(&pairs, Direction::Descending);
    if let Some(n) = &national {
        rank::with_national_delta(&mut ranked, n.avg_rate);
    }
    let league: Vec<StateLeagueRow> = ranked
        .iter()
        .map(|f| {
            let s = &summaries[&f.subject];
            StateLeagueRow {
                rank: f.rank,
                state: s.name.to_string(),
                latest_year: s.latest_year,
                total_fines: format_int(s.total_fines.round() as i64),
                rate_per_10k: format_decimal(f.value),
                remote_share: pct_or_na(&s.remote_share),
                camera_share: match s.detection.value() {
                    Some(d) => format_pct(d.camera_share),
                    None => "n/a".to_string(),
                },
            }
        })
        .collect();
    println!("Report 1: State League Table (latest rate per 10k licence holders)\n");
    output::preview_table_rows(&league, 8);
    if let Err(e) = output::write_csv(Path::new("report1_state_league.csv"), &league) {
        eprintln!("Write error: {}", e);
    }
    println!("(Full table exported to report1_state_league.csv)\n");

    // Movers: rate trajectories, first year against last.
    let movers = rank::largest_mover(&aggregate::rate_series(&data));
    let mut mover_rows: Vec<MoverRow> = Vec::new();
    if let Some(r) = &movers.riser {
        mover_rows.push(mover_row("Riser", r));
    }
    if let Some(c) = &movers.cooler {
        mover_rows.push(mover_row("Cooler", c));
    }
    println!("Report 2: Largest Movers (rate per 10k, earliest vs latest year)\n");
    output::preview_table_rows(&mover_rows, 2);
    if let Err(e) = output::write_csv(Path::new("report2_movers.csv"), &mover_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("(Full table exported to report2_movers.csv)\n");

    // Stories: one paragraph per jurisdiction, national overview on top.
    let stories: Vec<StateStory> = Jurisdiction::ALL
        .iter()
        .map(|&j| {
            let story = match summaries.get(&j) {
                Some(s) => narrative::state_story(s),
                None => narrative::missing_state_story(j),
            };
            StateStory {
                code: j.code().to_string(),
                name: j.name().to_string(),
                story,
            }
        })
        .collect();

    println!("{}", narrative::national_story(national.as_ref()));
    let rates: Vec<f64> = pairs.iter().map(|(_, r)| *r).collect();
    if let Some(med) = rank::median_cluster(&rates) {
        println!(
            "Most states cluster around {} fines per 10k licence holders.",
            format_decimal(med)
        );
    }
    println!("{}", narrative::movers_story(&movers));
    if let Some(n) = &national {
        let gap = rank::widest_gap(
            &aggregate::rate_by_year(&data, n.leader),
            &aggregate::national_rate_by_year(&data),
        );
        println!("{}", narrative::gap_story(n.leader, gap.as_ref()));
    }
    println!();
    for s in &stories {
        println!("[{}] {}\n", s.code, s.story);
    }

    let export = StoryExport {
        national: national.clone(),
        national_story: narrative::national_story(national.as_ref()),
        stories,
    };
    if let Err(e) = output::write_json(Path::new("stories.json"), &export) {
        eprintln!("Write error: {}", e);
    }
    println!("(Stories exported to stories.json)\n");
}

fn main() {
    loop {
        println!("Speeding Fine Statistics");
        println!("[1] Load the datasets");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
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
