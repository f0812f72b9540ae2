pub mod cli;
pub mod config;
pub mod datetime;
pub mod days;
pub mod display;
pub mod event;
pub mod geometry;
pub mod lanes;
pub mod layout;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let split =
    cli::split_rc_args(&raw_args);
  let cli = cli::GlobalCli::parse_from(
    split.argv
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tourcal"
  );
  debug!(?split.overrides, "positional setting overrides");

  let mut cfg = config::Config::load(
    cli.rcfile.as_deref()
  )?;
  cfg.apply_overrides(
    split
      .overrides
      .into_iter()
      .chain(cli.rc_overrides)
  );

  let format: render::OutputFormat =
    match cli.format {
      | Some(raw) => raw.parse()?,
      | None => cfg
        .get("format")
        .unwrap_or_else(|| {
          "text".to_string()
        })
        .parse()?
    };

  let options = layout::LayoutOptions {
    tz:         datetime::resolve_timezone(
      cli.timezone.as_deref(),
      &cfg
    ),
    group_size: cfg.group_size()?
  };

  let data = event::CalendarData::load(
    cli.input.as_deref()
  )
  .context(
    "failed to load calendar data"
  )?;

  let layout =
    layout::build_layout(&data, &options);

  let mut renderer =
    render::Renderer::new(&cfg)?;
  renderer.print(&layout, format)?;

  info!("done");
  Ok(())
}
