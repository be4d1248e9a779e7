//! `meetplan` CLI: run scheduling operations against a JSON meeting data file.
//!
//! ## Usage
//!
//! ```sh
//! # Common free slots for two people over a week
//! meetplan --data team.json slots -p u1,u2 -d 60 \
//!     --start 2026-03-16T00:00:00Z --end 2026-03-23T00:00:00Z
//!
//! # A user's meetings touching a range
//! meetplan --data team.json conflicts -u u1 --start 2026-03-16T09:00:00Z --end 2026-03-16T17:00:00Z
//!
//! # Team workload over the coming week, anchored at a fixed instant
//! meetplan --data team.json --now 2026-03-16T00:00:00Z workload -m u1,u2,u3
//!
//! # Schedule a meeting at the first common slot
//! meetplan --config meetplan.toml create -t "Design review" -p u1,u2 -d 45
//!
//! # Raw tool request (stdin or file)
//! echo '{"tool":"score_meeting","params":{"meeting_id":"m1"}}' | meetplan --data team.json call
//! ```
//!
//! Results are printed as a JSON envelope on stdout. A failed operation prints
//! `{"ok": false, "error": {...}}` and exits with status 1.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use meeting_engine::timeconv::parse_instant;
use meeting_engine::tools::is_ok;
use meeting_engine::{Config, MeetingPreferences, TimeRange, ToolCall, ToolHandler};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "meetplan",
    version,
    about = "Meeting scheduling: availability, conflicts, workload and schedule diagnostics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (defaults to meetplan.toml or config/meetplan.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON data file with users and meetings (overrides store.data_file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Anchor for "the coming week/month" (RFC 3339; defaults to the current time)
    #[arg(long, global = true, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find common free slots for all participants
    Slots {
        /// Comma-separated participant ids
        #[arg(short, long, value_delimiter = ',', required = true)]
        participants: Vec<String>,
        /// Meeting length in minutes
        #[arg(short, long)]
        duration: i64,
        #[arg(long, value_parser = parse_instant)]
        start: DateTime<Utc>,
        #[arg(long, value_parser = parse_instant)]
        end: DateTime<Utc>,
    },
    /// List a user's meetings touching a time range
    Conflicts {
        #[arg(short, long)]
        user: String,
        #[arg(long, value_parser = parse_instant)]
        start: DateTime<Utc>,
        #[arg(long, value_parser = parse_instant)]
        end: DateTime<Utc>,
    },
    /// Day/hour distributions and effectiveness over a period
    Patterns {
        #[arg(short, long)]
        user: String,
        #[arg(long, value_parser = parse_instant)]
        start: DateTime<Utc>,
        #[arg(long, value_parser = parse_instant)]
        end: DateTime<Utc>,
    },
    /// Compare team members' meeting load over the coming week
    Workload {
        /// Comma-separated team member ids
        #[arg(short, long, value_delimiter = ',', required = true)]
        members: Vec<String>,
    },
    /// Diagnose a user's next 30 days
    Optimize {
        #[arg(short, long)]
        user: String,
    },
    /// Schedule a meeting at the first common slot in the coming week
    Create {
        #[arg(short, long)]
        title: String,
        /// Comma-separated participant ids
        #[arg(short, long, value_delimiter = ',', required = true)]
        participants: Vec<String>,
        /// Meeting length in minutes
        #[arg(short, long)]
        duration: i64,
        /// Location (defaults to scheduling.default_location)
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Suggest agenda items for a topic
    Agenda {
        #[arg(short, long)]
        topic: String,
        /// Comma-separated participant ids
        #[arg(short, long, value_delimiter = ',', required = true)]
        participants: Vec<String>,
    },
    /// Score a stored meeting's effectiveness
    Score {
        #[arg(short, long)]
        meeting: String,
    },
    /// Run a raw JSON tool request
    Call {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::load_default().context("Failed to load config")?,
    };
    if let Some(data) = cli.data {
        config.store.data_file = Some(data);
    }

    init_logging(&config.logging.level)?;

    let store = config.open_store().context("Failed to open meeting data")?;
    let handler = ToolHandler::new(
        Arc::new(store),
        config.suggestions.service(),
        config.scheduling.clone(),
    );
    let now = cli.now.unwrap_or_else(Utc::now);
    debug!(%now, "anchoring relative horizons");

    let response = match Request::from(cli.command) {
        Request::Tool(call) => handler.respond(&call, now),
        Request::Raw { input } => {
            let request = read_input(input.as_deref())?;
            handler.respond_raw(&request, now)
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !is_ok(&response) {
        process::exit(1);
    }
    Ok(())
}

/// What a subcommand asks the tool handler for.
#[derive(Debug, PartialEq)]
enum Request {
    Tool(ToolCall),
    /// A JSON request read from a file, or stdin when `input` is `None`.
    Raw { input: Option<String> },
}

impl From<Commands> for Request {
    fn from(command: Commands) -> Self {
        let call = match command {
            Commands::Call { input } => return Request::Raw { input },
            Commands::Slots {
                participants,
                duration,
                start,
                end,
            } => ToolCall::FindSlots {
                participants,
                duration,
                date_range: TimeRange { start, end },
            },
            Commands::Conflicts { user, start, end } => ToolCall::DetectConflicts {
                user_id: user,
                time_range: TimeRange { start, end },
            },
            Commands::Patterns { user, start, end } => ToolCall::AnalyzePatterns {
                user_id: user,
                period: TimeRange { start, end },
            },
            Commands::Workload { members } => ToolCall::BalanceWorkload {
                team_members: members,
            },
            Commands::Optimize { user } => ToolCall::OptimizeSchedule { user_id: user },
            Commands::Create {
                title,
                participants,
                duration,
                location,
            } => ToolCall::CreateMeeting {
                title,
                participants,
                duration,
                preferences: MeetingPreferences { location },
            },
            Commands::Agenda {
                topic,
                participants,
            } => ToolCall::SuggestAgenda {
                meeting_topic: topic,
                participants,
            },
            Commands::Score { meeting } => ToolCall::ScoreMeeting {
                meeting_id: meeting,
            },
        };
        Request::Tool(call)
    }
}

/// Log to stderr so stdout stays a single JSON document. `RUST_LOG` wins over
/// the configured level.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid logging.level: {}", level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
