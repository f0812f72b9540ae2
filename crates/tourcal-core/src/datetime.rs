use chrono::{
  DateTime,
  LocalResult,
  NaiveDate,
  NaiveTime,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

use crate::config::Config;

const TIMEZONE_ENV_VAR: &str =
  "TOURCAL_TIMEZONE";

pub const SHORT_DAY_FORMAT: &str =
  "%d/%m";
pub const LONG_DAY_FORMAT: &str =
  "%A, %d/%m/%Y";
pub const EVENT_START_FORMAT: &str =
  "%A, %d/%m/%Y %H:%M";

/// Picks the display zone: explicit flag, `TOURCAL_TIMEZONE`, the rc
/// `timezone` key, then UTC.
pub fn resolve_timezone(
  flag: Option<&str>,
  cfg: &Config
) -> Tz {
  resolve_timezone_from(
    flag,
    std::env::var(TIMEZONE_ENV_VAR)
      .ok()
      .as_deref(),
    cfg
  )
}

#[tracing::instrument(skip(cfg))]
pub fn resolve_timezone_from(
  flag: Option<&str>,
  env: Option<&str>,
  cfg: &Config
) -> Tz {
  if let Some(raw) = flag
    && let Some(tz) =
      parse_timezone(raw, "--timezone")
  {
    return tz;
  }

  if let Some(raw) = env
    && let Some(tz) = parse_timezone(
      raw,
      TIMEZONE_ENV_VAR
    )
  {
    return tz;
  }

  if let Some(raw) = cfg.get("timezone")
    && let Some(tz) =
      parse_timezone(&raw, "rc")
  {
    return tz;
  }

  tracing::debug!(
    "no timezone configured; using UTC"
  );
  chrono_tz::UTC
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured display timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Start of `date` in `tz`. When midnight falls in a DST gap the first
/// existing instant of the date is used.
pub fn local_midnight(
  date: NaiveDate,
  tz: &Tz
) -> DateTime<Tz> {
  match tz.from_local_datetime(
    &date.and_time(NaiveTime::MIN)
  ) {
    | LocalResult::Single(dt) => dt,
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      tracing::trace!(
        date = %date,
        "ambiguous local midnight; using earliest"
      );
      first.min(second)
    }
    | LocalResult::None => {
      first_instant_after_gap(date, tz)
    }
  }
}

fn first_instant_after_gap(
  date: NaiveDate,
  tz: &Tz
) -> DateTime<Tz> {
  for minutes in (15..=180).step_by(15)
  {
    let candidate = date
      .and_time(NaiveTime::MIN)
      + chrono::Duration::minutes(
        minutes
      );
    if let Some(dt) = tz
      .from_local_datetime(&candidate)
      .earliest()
    {
      tracing::warn!(
        date = %date,
        resolved = %dt,
        "local midnight does not exist; shifted past gap"
      );
      return dt;
    }
  }

  tracing::error!(
    date = %date,
    "no local instant found near midnight; treating as UTC"
  );
  tz.from_utc_datetime(
    &date.and_time(NaiveTime::MIN)
  )
}

#[must_use]
pub fn to_local_date(
  dt: DateTime<Utc>,
  tz: &Tz
) -> NaiveDate {
  dt.with_timezone(tz).date_naive()
}

#[must_use]
pub fn format_local(
  dt: DateTime<Utc>,
  tz: &Tz,
  fmt: &str
) -> String {
  dt.with_timezone(tz)
    .format(fmt)
    .to_string()
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    TimeZone,
    Timelike,
    Utc
  };

  use super::{
    EVENT_START_FORMAT,
    format_local,
    local_midnight,
    parse_timezone,
    resolve_timezone_from
  };
  use crate::config::Config;

  #[test]
  fn midnight_in_utc_is_plain_midnight()
  {
    let date =
      NaiveDate::from_ymd_opt(
        2026, 3, 1
      )
      .expect("valid date");
    let day = local_midnight(
      date,
      &chrono_tz::UTC
    );
    assert_eq!(
      day.with_timezone(&Utc),
      Utc
        .with_ymd_and_hms(
          2026, 3, 1, 0, 0, 0
        )
        .unwrap()
    );
  }

  #[test]
  fn midnight_in_dst_gap_moves_forward()
  {
    // Santiago skipped 00:00-01:00 on 2019-09-08.
    let tz = chrono_tz::America::Santiago;
    let date =
      NaiveDate::from_ymd_opt(
        2019, 9, 8
      )
      .expect("valid date");
    let day = local_midnight(date, &tz);
    assert_eq!(day.date_naive(), date);
    assert_eq!(day.hour(), 1);
  }

  #[test]
  fn midnight_repeated_by_fall_back_takes_earliest()
  {
    // Havana turned 01:00 CDT back to 00:00 CST on 2025-11-02.
    let tz = chrono_tz::America::Havana;
    let date =
      NaiveDate::from_ymd_opt(
        2025, 11, 2
      )
      .expect("valid date");
    let day = local_midnight(date, &tz);
    assert_eq!(
      day.with_timezone(&Utc),
      Utc
        .with_ymd_and_hms(
          2025, 11, 2, 4, 0, 0
        )
        .unwrap()
    );
  }

  #[test]
  fn timezone_precedence_flag_env_rc()
  {
    let mut cfg = Config::default();
    assert_eq!(
      resolve_timezone_from(
        None, None, &cfg
      ),
      chrono_tz::UTC
    );

    cfg.apply_overrides(vec![(
      "rc.timezone".to_string(),
      "Europe/Paris".to_string()
    )]);
    assert_eq!(
      resolve_timezone_from(
        None, None, &cfg
      ),
      chrono_tz::Europe::Paris
    );
    assert_eq!(
      resolve_timezone_from(
        None,
        Some("Asia/Tokyo"),
        &cfg
      ),
      chrono_tz::Asia::Tokyo
    );
    assert_eq!(
      resolve_timezone_from(
        Some("America/Havana"),
        Some("Asia/Tokyo"),
        &cfg
      ),
      chrono_tz::America::Havana
    );
    // Unparseable sources fall through.
    assert_eq!(
      resolve_timezone_from(
        Some("Mars/Olympus"),
        None,
        &cfg
      ),
      chrono_tz::Europe::Paris
    );
  }

  #[test]
  fn unknown_timezone_is_rejected() {
    assert!(
      parse_timezone(
        "Mars/Olympus",
        "test"
      )
      .is_none()
    );
    assert!(
      parse_timezone(
        " Europe/Paris ",
        "test"
      )
      .is_some()
    );
  }

  #[test]
  fn formats_event_start_in_zone() {
    let start = Utc
      .with_ymd_and_hms(
        2026, 3, 1, 17, 30, 0
      )
      .unwrap();
    assert_eq!(
      format_local(
        start,
        &chrono_tz::Europe::Paris,
        EVENT_START_FORMAT
      ),
      "Sunday, 01/03/2026 18:30"
    );
  }
}
