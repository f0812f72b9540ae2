use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Targets that receive the `-v`/`-q` level when `RUST_LOG` is unset.
const CRATE_TARGETS: &[&str] = &["tourcal_core", "tourcal_cli"];

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tourcal",
    version,
    about = "Lays out a tournament schedule as a multi-day lane timeline"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Setting override, `KEY=VALUE` or `KEY:VALUE`; repeatable.
    #[arg(long = "rc", value_name = "KEY=VALUE", value_parser = parse_setting)]
    pub rc_overrides: Vec<(String, String)>,

    #[arg(long = "rcfile")]
    pub rcfile: Option<PathBuf>,

    /// `text` or `json`; defaults to the rc `format` key.
    #[arg(long = "format")]
    pub format: Option<String>,

    /// IANA zone used for day boundaries and clock positions.
    #[arg(long = "timezone")]
    pub timezone: Option<String>,

    /// Calendar JSON; stdin when absent or `-`.
    pub input: Option<PathBuf>,
}

/// argv with positional `rc.` settings lifted out.
#[derive(Debug, Clone, Default)]
pub struct SplitArgs {
    pub argv: Vec<OsString>,
    pub overrides: Vec<(String, String)>,
}

/// Splits one setting at the first `=`, or at `:` when there is no `=`.
pub fn parse_setting(raw: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .or_else(|| raw.split_once(':'))
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {raw}"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("setting has an empty key: {raw}"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Lifts positional `rc.KEY=VALUE` words out of argv so clap never sees
/// them. A bare `rc.word` with no separator stays positional.
#[tracing::instrument(skip_all, fields(args = raw.len()))]
pub fn split_rc_args(raw: &[OsString]) -> SplitArgs {
    let mut split = SplitArgs::default();

    for (idx, arg) in raw.iter().enumerate() {
        let setting = match idx {
            0 => None,
            _ => arg
                .to_str()
                .and_then(|s| s.strip_prefix("rc."))
                .and_then(|rest| parse_setting(rest).ok()),
        };

        match setting {
            Some((key, value)) => {
                debug!(key = %key, value = %value, "positional setting");
                split.overrides.push((key, value));
            }
            None => split.argv.push(arg.clone()),
        }
    }

    split
}

/// `-q` wins over `-v`; with neither only warnings are shown.
pub fn log_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) | (0, 0) => "warn",
        (0, 1) => "info",
        (0, 2) => "debug",
        (0, _) => "trace",
    }
}

fn default_filter(level: &str) -> String {
    CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Logs go to stderr so `--format json` output stays clean on stdout.
/// `RUST_LOG` replaces the verbosity flags entirely when set.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter(log_level(verbose, quiet)))
            .map_err(|e| anyhow!("invalid log filter: {e}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
        .or_else(|err| {
            debug!(error = %err, "subscriber already installed");
            Ok(())
        })
}
