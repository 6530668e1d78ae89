use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use riskgate_core::{RiskGateConfig, Severity, DEFAULT_MANIFEST};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

/// Exit code for configuration, store and usage errors.
const EXIT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "riskgate", version, about = "Risk acceptance lifecycle and release gate")]
struct Cli {
    /// Path to the riskgate.yaml manifest
    #[arg(long, global = true, env = "RISKGATE_CONFIG", default_value = DEFAULT_MANIFEST)]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate the gate: exits 1 when an accepted risk has expired.
    RiskCheck {
        /// Also block on risks expiring inside the warn window
        #[arg(long, default_value_t = false)]
        strict: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Git hook entry points
    Hook {
        #[command(subcommand)]
        hook: HookCommand,
    },

    /// Record a new risk acceptance.
    Accept {
        /// Risk category, e.g. vulnerability, license, compliance
        #[arg(long)]
        category: String,

        /// critical, high, medium or low
        #[arg(long)]
        severity: Severity,

        #[arg(long)]
        title: String,

        #[arg(long = "accepted-by", env = "USER")]
        accepted_by: String,

        /// Planned remediation
        #[arg(long = "follow-up")]
        follow_up: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Explicit deadline (RFC 3339 or YYYY-MM-DD); defaults from severity
        #[arg(long = "expires-at")]
        expires_at: Option<String>,

        /// Explicit decision id; a UUID is generated otherwise
        #[arg(long)]
        id: Option<String>,
    },

    /// Replace an active acceptance with a successor carrying a fresh deadline.
    Renew {
        id: String,

        #[arg(long = "as", env = "USER", default_value = "unknown")]
        actor: String,
    },

    /// Withdraw an active acceptance.
    Revoke {
        id: String,

        #[arg(long)]
        reason: String,

        #[arg(long = "as", env = "USER", default_value = "unknown")]
        actor: String,
    },

    /// Mark the accepted risk as fixed.
    Remediate {
        id: String,

        #[arg(long)]
        note: String,

        #[arg(long = "as", env = "USER", default_value = "unknown")]
        actor: String,
    },

    /// List risk acceptances.
    List {
        /// Only active acceptances past their deadline
        #[arg(long, conflicts_with = "expiring")]
        expired: bool,

        /// Only active acceptances expiring inside the window
        #[arg(long)]
        expiring: bool,

        /// Window for --expiring (defaults to policy.warnWindowDays)
        #[arg(long = "window-days")]
        window_days: Option<u32>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show one decision and its renewal lineage.
    Show {
        id: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the audit journal.
    Audit {
        /// Only events for this decision
        #[arg(long)]
        decision: Option<String>,

        /// Only events by this actor
        #[arg(long)]
        actor: Option<String>,

        /// Show the most recent N events
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum HookCommand {
    /// Warn about expired and expiring acceptances; never fails the commit.
    PreCommit,
    /// Block the push when an acceptance has expired.
    PrePush,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn load_config(path: &Path) -> Result<RiskGateConfig> {
    let config = RiskGateConfig::load_or_default(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::debug!(
        store = %config.store.path.display(),
        audit = %config.audit.path.display(),
        "Loaded configuration"
    );
    Ok(config)
}

fn run(cli: Cli) -> Result<u8> {
    // Hooks must not fail a commit because of a broken manifest.
    if let Command::Hook {
        hook: HookCommand::PreCommit,
    } = cli.cmd
    {
        return Ok(commands::check::pre_commit(&cli.config));
    }

    let config = load_config(&cli.config)?;

    match cli.cmd {
        Command::RiskCheck { strict, format } => commands::check::risk_check(&config, strict, format),

        Command::Hook { hook } => match hook {
            HookCommand::PreCommit => Ok(commands::check::pre_commit(&cli.config)),
            HookCommand::PrePush => commands::check::pre_push(&config),
        },

        Command::Accept {
            category,
            severity,
            title,
            accepted_by,
            follow_up,
            description,
            expires_at,
            id,
        } => commands::decision::accept(
            &config,
            commands::decision::AcceptArgs {
                id,
                category,
                severity,
                title,
                description,
                accepted_by,
                follow_up,
                expires_at,
            },
        ),

        Command::Renew { id, actor } => commands::decision::renew(&config, &id, &actor),

        Command::Revoke { id, reason, actor } => {
            commands::decision::revoke(&config, &id, &reason, &actor)
        }

        Command::Remediate { id, note, actor } => {
            commands::decision::remediate(&config, &id, &note, &actor)
        }

        Command::List {
            expired,
            expiring,
            window_days,
            format,
        } => {
            let filter = if expired {
                commands::list::ListFilter::Expired
            } else if expiring {
                commands::list::ListFilter::Expiring(
                    window_days.unwrap_or(config.policy.warn_window_days),
                )
            } else {
                commands::list::ListFilter::All
            };
            commands::list::list(&config, filter, format)
        }

        Command::Show { id, format } => commands::list::show(&config, &id, format),

        Command::Audit {
            decision,
            actor,
            limit,
            format,
        } => commands::audit::run(&config, decision, actor, limit, format),
    }
}
