use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rating_engine::{render, OutputFormat, RatingConfig, SeasonPipeline};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "nba-ratings")]
#[command(about = "Scrape NBA per-game statistics, rate players and print leaderboards")]
struct Cli {
    /// Configuration file (defaults to ./nba-ratings.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Leaderboard output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape, store and rate seasons, then print their leaderboards
    Run(RunArgs),
    /// Print leaderboards from an already rated season store
    Report {
        /// Season year (e.g. 2024 for 2023-24)
        #[arg(long)]
        season: u16,
    },
    /// Re-rate an existing season store with the configured weights
    Rate {
        /// Season year (e.g. 2024 for 2023-24)
        #[arg(long)]
        season: u16,
    },
}

#[derive(Args, Debug, Default, PartialEq)]
struct RunArgs {
    /// Season to process; repeat for several (overrides the configuration)
    #[arg(long = "season")]
    seasons: Vec<u16>,

    /// Season to report after the run; repeat for several
    #[arg(long = "report")]
    report_seasons: Vec<u16>,
}

impl RunArgs {
    fn is_empty(&self) -> bool {
        self.seasons.is_empty() && self.report_seasons.is_empty()
    }
}

/// What the parsed command line asks for
#[derive(Debug, PartialEq)]
enum Action {
    Run(RunArgs),
    Report(u16),
    Rate(u16),
}

impl Cli {
    /// Resolve the command, folding run flags given before `run` into it
    fn action(self) -> anyhow::Result<Action> {
        match self.command {
            None => Ok(Action::Run(self.run)),
            Some(Commands::Run(args)) => {
                let mut merged = self.run;
                merged.seasons.extend(args.seasons);
                merged.report_seasons.extend(args.report_seasons);
                Ok(Action::Run(merged))
            }
            Some(Commands::Report { season }) | Some(Commands::Rate { season }) if !self.run.is_empty() => {
                anyhow::bail!(
                    "--season/--report before a subcommand only apply to `run`; use `--season {season}` after the subcommand"
                )
            }
            Some(Commands::Report { season }) => Ok(Action::Report(season)),
            Some(Commands::Rate { season }) => Ok(Action::Rate(season)),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    rating_engine::init_tracing();

    let cli = Cli::parse();
    let config = RatingConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let format = cli.format;

    match cli.action()? {
        Action::Run(args) => run(config, args, format).await,
        Action::Report(season) => report(config, &[season], format).await,
        Action::Rate(season) => rate(config, season, format).await,
    }
}

async fn run(mut config: RatingConfig, args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    if !args.seasons.is_empty() {
        config.pipeline.seasons = args.seasons;
    }
    if !args.report_seasons.is_empty() {
        config.pipeline.report_seasons = args.report_seasons;
    }
    config.validate()?;

    let seasons = config.pipeline.seasons.clone();
    let report_seasons = config.pipeline.report_seasons.clone();
    let pipeline = SeasonPipeline::new(config)?;

    info!("Processing seasons {:?}", seasons);
    let outcome = pipeline.run_all(&seasons).await;

    // Only report seasons that have a rated store
    let failed = outcome.failed_seasons();
    let reportable: Vec<u16> = report_seasons.into_iter().filter(|s| !failed.contains(s)).collect();
    let printed = print_reports(&pipeline, &reportable, format).await;

    if !outcome.is_success() {
        anyhow::bail!("Seasons failed: {:?}", failed);
    }
    printed
}

async fn report(config: RatingConfig, seasons: &[u16], format: OutputFormat) -> anyhow::Result<()> {
    let pipeline = SeasonPipeline::new(config)?;
    print_reports(&pipeline, seasons, format).await
}

async fn rate(config: RatingConfig, season: u16, format: OutputFormat) -> anyhow::Result<()> {
    let pipeline = SeasonPipeline::new(config)?;
    let rated = pipeline.rerate_season(season).await?;
    info!("Re-rated {} players for season {}", rated, season);

    print_reports(&pipeline, &[season], format).await
}

async fn print_reports(pipeline: &SeasonPipeline, seasons: &[u16], format: OutputFormat) -> anyhow::Result<()> {
    let mut boards = Vec::with_capacity(seasons.len());
    let mut failed = Vec::new();

    for &season in seasons {
        match pipeline.leaderboards(season).await {
            Ok(season_boards) => boards.push(season_boards),
            Err(e) => {
                error!("Season {} failed at {} stage: {}", e.season(), e.stage(), e);
                failed.push(season);
            }
        }
    }

    if !boards.is_empty() {
        println!("{}", render(&boards, format)?);
    }

    if !failed.is_empty() {
        anyhow::bail!("No leaderboards for seasons {:?}", failed);
    }
    Ok(())
}
