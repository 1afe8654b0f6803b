use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use csv::{ReaderBuilder, WriterBuilder};
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use team_sorter::config::SorterConfig;
use team_sorter::loader::{load_players, Cell};
use team_sorter::model::entity::RowRef;
use team_sorter::search::{team_sort, SearchParams, SortOutcome};
use team_sorter::Roster;

#[derive(Parser)]
#[command(name = "team-sorter")]
#[command(about = "Sort a player sheet into balanced teams")]
struct Cli {
    /// CSV export of the player sheet; the first row is the header
    input: PathBuf,

    /// Number of teams (overrides the config file)
    #[arg(short, long)]
    teams: Option<usize>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of random trials (overrides the config file)
    #[arg(long)]
    trials: Option<usize>,

    /// Random seed for a reproducible sort
    #[arg(long)]
    seed: Option<u64>,

    /// Run trials in parallel
    #[arg(long)]
    parallel: bool,

    /// Where to write the sheet with team numbers filled in [default: INPUT]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long)]
    quiet: bool,
}

fn setup_logging(verbosity: u8, quiet: bool) {
    let level_filter = if quiet {
        LevelFilter::OFF
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    tracing_subscriber::registry().with(level_filter).with(stderr_layer).init();
}

fn read_sheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .context("Failed to read row")
        })
        .collect()
}

fn write_sheet(path: &Path, sheet: &[Vec<String>]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in sheet {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes each player's team number into `column` of their source row.
fn fill_team_column(sheet: &mut [Vec<String>], column: usize, assignments: &[(RowRef, usize)]) {
    for &(row, team) in assignments {
        let cells = &mut sheet[row - 1];
        if cells.len() <= column {
            cells.resize(column + 1, String::new());
        }
        cells[column] = team.to_string();
    }
}

fn print_teams(roster: &Roster, outcome: &SortOutcome) {
    for team in &outcome.teams {
        println!(
            "{} ({} players, avg rating {:.2}, avg age {:.2})",
            team,
            team.player_count(),
            team.avg_rating().unwrap_or_default(),
            team.avg_age().unwrap_or_default(),
        );
        for &id in team.players() {
            println!("{}", roster.players[id]);
        }
        println!("------------------------------");
    }
    println!("Sort complete. Sort score: {}", outcome.score);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => SorterConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SorterConfig::default(),
    };
    if let Some(teams) = cli.teams {
        config = config.with_teams(teams);
    }
    if let Some(trials) = cli.trials {
        config = config.with_trials(trials);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.parallel {
        config = config.with_parallel(true);
    }
    config.validate()?;
    let Some(team_count) = config.teams else {
        bail!("Number of teams not given; pass --teams or set `teams` in the config");
    };

    let mut sheet = read_sheet(&cli.input)?;
    let header = sheet.first().map(Vec::as_slice);
    let columns = config.columns.resolve(header)?;
    let team_column = config.columns.team_column(header)?;

    let rows: Vec<Vec<Cell>> = sheet
        .iter()
        .map(|row| row.iter().map(|cell| Cell::from(cell.as_str())).collect())
        .collect();
    let roster = load_players(&rows, &columns, team_count)?;
    info!(players = roster.player_count(), "players detected in sheet");

    let outcome = team_sort(&roster, &SearchParams::from(&config))?;
    print_teams(&roster, &outcome);

    fill_team_column(&mut sheet, team_column, &outcome.assignments(&roster.players));
    let output = cli.output.as_ref().unwrap_or(&cli.input);
    write_sheet(output, &sheet)?;
    info!(path = %output.display(), "sheet written");
    Ok(())
}
