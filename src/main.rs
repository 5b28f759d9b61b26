// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clear_ballot::{AppConfig, ElectionService, ServiceResponse, VoterRegistration};

#[derive(Parser)]
#[command(
    name = "clear-ballot",
    version,
    about = "Clear Ballot - regional election model with recoverable snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print service responses as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build a two-region sample election and save it
    Demo {
        /// Snapshot file to write (default: <data dir>/demo_election.txt)
        #[arg(long, value_name = "FILE")]
        output: Option<String>,
    },

    /// Show results from a saved election
    Results {
        #[arg(value_name = "FILE")]
        file: String,

        /// Only this region's results
        #[arg(long, value_name = "CODE")]
        region: Option<String>,
    },

    /// Write a plain-text results report
    Report {
        #[arg(value_name = "FILE")]
        file: String,
        #[arg(value_name = "OUTPUT")]
        output: String,
    },

    /// Export candidates, voters, and parties to CSV
    Export {
        #[arg(value_name = "FILE")]
        file: String,
        /// Base name: writes <BASE>_candidates.csv, <BASE>_voters.csv, <BASE>_parties.csv
        #[arg(value_name = "BASE")]
        base: String,
    },

    /// Check whether a voter is registered and has voted
    Status {
        #[arg(value_name = "FILE")]
        file: String,
        #[arg(value_name = "VOTER_ID")]
        voter_id: u32,
    },

    /// Browse a saved election in the terminal
    View {
        #[arg(value_name = "FILE")]
        file: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = ElectionService::new(config);

    let ok = match cli.command {
        Command::Demo { output } => run_demo(&service, output, cli.json)?,
        Command::Results { file, region } => {
            let id = load(&service, &file, cli.json)?;
            let response = match region {
                Some(code) => service.get_region_results(id, &code),
                None => service.get_election_results(id),
            };
            emit(&response, cli.json)?
        }
        Command::Report { file, output } => {
            let id = load(&service, &file, cli.json)?;
            emit(&service.save_election_results(id, &output), cli.json)?
        }
        Command::Export { file, base } => {
            let id = load(&service, &file, cli.json)?;
            emit(&service.export_election_to_csv(id, &base), cli.json)?
        }
        Command::Status { file, voter_id } => {
            let id = load(&service, &file, cli.json)?;
            emit(&service.check_voter_registration(id, voter_id), cli.json)?
        }
        Command::View { file } => {
            let id = load(&service, &file, cli.json)?;
            run_ui_mode(&service, id)?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Print a response; returns its success flag
fn emit(response: &ServiceResponse, json: bool) -> Result<bool> {
    if json {
        println!("{}", response.to_json()?);
    } else {
        let mark = if response.success { "✓" } else { "❌" };
        println!("{} {}", mark, response.message);
        for line in &response.data {
            println!("   {}", line);
        }
    }
    Ok(response.success)
}

/// Load a snapshot into a fresh election; exits on failure
fn load(service: &ElectionService, file: &str, json: bool) -> Result<u32> {
    let id = service.create_election(&service.config().default_title);
    let response = service.load_election_data(id, file);
    if !response.success {
        emit(&response, json)?;
        std::process::exit(1);
    }
    if !json {
        emit(&response, json)?;
    }
    Ok(id)
}

fn run_demo(service: &ElectionService, output: Option<String>, json: bool) -> Result<bool> {
    let output = match output {
        Some(path) => path,
        None => service
            .config()
            .data_dir
            .join("demo_election.txt")
            .to_string_lossy()
            .into_owned(),
    };

    if !json {
        println!("🗳️  Clear Ballot demo");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let id = service.create_election(&service.config().default_title);
    let voter = |first: &str, unique_id: &str| {
        VoterRegistration::new(first, "Doe", "5551234567", "12 Main Street", unique_id, "25")
    };

    // Rejections are part of the demo, so only the final save decides the exit code
    let steps = vec![
        service.create_region(id, "North District", "NORTH"),
        service.create_region(id, "South District", "SOUTH"),
        service.create_party(id, "P"),
        service.add_candidate_to_region(id, "Alice", Some("P"), "NORTH"),
        service.add_candidate_to_region(id, "Alice", Some("P"), "SOUTH"),
        service.add_candidate_to_region(id, "Bob", Some("P"), "NORTH"),
        service.add_candidate_to_region(id, "Carol", None, "NORTH"),
        service.add_candidate_to_region(id, "Bob", Some("P"), "SOUTH"),
        service.register_voter_in_region(id, &voter("Jane", "111111111"), "NORTH"),
        service.register_voter_in_region(id, &voter("John", "222222222"), "NORTH"),
        service.register_voter_in_region(id, &voter("Sara", "333333333"), "SOUTH"),
        service.cast_vote_in_region(id, 111111111, 0, "SOUTH"),
        service.cast_vote_in_region(id, 111111111, 0, "NORTH"),
        service.cast_vote_in_region(id, 111111111, 0, "NORTH"),
        service.cast_vote_in_region(id, 222222222, 1, "NORTH"),
        service.cast_vote_in_region(id, 333333333, 0, "SOUTH"),
        service.get_regions(id),
        service.get_election_results(id),
    ];
    for response in &steps {
        emit(response, json)?;
    }

    emit(&service.save_complete_election_data(id, &output), json)
}

#[cfg(feature = "tui")]
fn run_ui_mode(service: &ElectionService, id: u32) -> Result<bool> {
    let Some(mut app) = service.inspect(id, ui::App::new) else {
        anyhow::bail!("Election {} disappeared before the viewer opened", id);
    };

    println!("Starting viewer... (Press 'q' to quit)\n");
    ui::run_ui(&mut app)?;
    println!("\n✅ Viewer closed");
    Ok(true)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_service: &ElectionService, _id: u32) -> Result<bool> {
    eprintln!("❌ Viewer not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    Ok(false)
}
