mod commands;
mod render;
mod utils;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use tzplan_core::{App, ClientConfig};

use crate::utils::tui;

#[derive(Parser)]
#[command(name = "tzplan")]
#[command(about = "Plan events across timezones with shared profiles")]
struct Cli {
    /// Backend base URL (overrides config and TZPLAN_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Act as this profile instead of the configured default
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Show debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List, create and select profiles
    Profiles {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// List, create, edit and delete events
    Events {
        #[command(subcommand)]
        action: Option<EventAction>,
    },
    /// Show the change history of one event, or of every event
    Logs { event_id: Option<String> },
    /// Show the current time in the selected profile's timezone
    Clock {
        /// Keep running, refreshing every minute
        #[arg(short, long)]
        watch: bool,
    },
    /// List supported timezones with their current time
    Timezones,
    /// Convert a wall-clock time from one timezone to another
    Convert {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Time (HH:MM)
        time: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Show config path and effective settings
    Config,
}

#[derive(Subcommand)]
enum ProfileAction {
    List,
    Create {
        name: Option<String>,
        #[arg(short, long)]
        timezone: Option<String>,
    },
    /// Make a profile the default selection
    Select { id: String },
    /// Change the selected profile's timezone
    Timezone { zone: String },
}

#[derive(Subcommand)]
enum EventAction {
    List {
        /// Every event, not only the selected profile's
        #[arg(short, long)]
        all: bool,
        /// Only events ending today or later
        #[arg(short, long)]
        upcoming: bool,
    },
    Create(EventFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: EventFields,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Event form fields. Anything left out keeps the form's current value.
#[derive(Args, Default)]
pub struct EventFields {
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,
    /// Start time (HH:MM)
    #[arg(long)]
    pub start_time: Option<String>,
    /// End date (YYYY-MM-DD), defaults to the start date
    #[arg(long)]
    pub end_date: Option<String>,
    /// End time (HH:MM)
    #[arg(long)]
    pub end_time: Option<String>,
    /// Timezone the dates and times are written in
    #[arg(long)]
    pub timezone: Option<String>,
    /// Assigned profile ids (repeatable)
    #[arg(long = "with")]
    pub profiles: Vec<String>,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("{}", format!("{error:#}").red());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match &cli.command {
        Commands::Timezones => return commands::timezones::run(),
        Commands::Convert {
            date,
            time,
            from,
            to,
        } => return commands::timezones::convert(date, time, from, to),
        Commands::Config => return commands::config::run(),
        _ => {}
    }

    let config = load_config(&cli)?;
    let app = App::connect(config).context("failed to set up the backend client")?;

    tui::with_spinner("Loading profiles", app.start()).await?;

    match cli.command {
        Commands::Profiles { action } => match action.unwrap_or(ProfileAction::List) {
            ProfileAction::List => commands::profiles::list(&app),
            ProfileAction::Create { name, timezone } => {
                commands::profiles::create(&app, name, timezone).await
            }
            ProfileAction::Select { id } => commands::profiles::select(&app, &id).await,
            ProfileAction::Timezone { zone } => {
                commands::profiles::change_timezone(&app, &zone).await
            }
        },
        Commands::Events { action } => match action.unwrap_or(EventAction::List {
            all: false,
            upcoming: false,
        }) {
            EventAction::List { all, upcoming } => {
                commands::events::list(&app, all, upcoming).await
            }
            EventAction::Create(fields) => commands::events::create(&app, fields).await,
            EventAction::Edit { id, fields } => commands::events::edit(&app, &id, fields).await,
            EventAction::Delete { id, yes } => commands::events::delete(&app, &id, yes).await,
        },
        Commands::Logs { event_id } => commands::logs::run(&app, event_id.as_deref()).await,
        Commands::Clock { watch } => commands::clock::run(&app, watch).await,
        Commands::Timezones | Commands::Convert { .. } | Commands::Config => Ok(()),
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load().context("failed to load config")?;

    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(profile) = &cli.profile {
        config.default_profile = Some(profile.clone());
    }

    tracing::debug!(api_url = %config.api_url, "config loaded");
    Ok(config)
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TZPLAN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
