use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthChar;

use crate::config::Config;
use crate::display::CategoryFlag;
use crate::layout::{CalendarLayout, DayNode, EventNode, HourMark};

const LABEL_WIDTH: usize = 5;
const TRACK_FILL: char = '.';
const BAR_FILL: char = '=';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("invalid output format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    columns: usize,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_switch("color")?.unwrap_or(true);

        Ok(Self {
            color: color && io::stdout().is_terminal(),
            columns: cfg.render_columns()?,
        })
    }

    #[tracing::instrument(skip(self, layout))]
    pub fn print(&mut self, layout: &CalendarLayout, format: OutputFormat) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        match format {
            OutputFormat::Text => self.write_text(&mut out, layout),
            OutputFormat::Json => write_json(&mut out, layout),
        }
    }

    pub fn write_text<W: Write>(&self, mut writer: W, layout: &CalendarLayout) -> anyhow::Result<()> {
        for (idx, group) in layout.groups.iter().enumerate() {
            if idx > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "{:width$} {}", "", self.header_row(&group.timeline), width = LABEL_WIDTH)?;
            for day in &group.days {
                self.write_day(&mut writer, day)?;
            }
        }
        Ok(())
    }

    fn write_day<W: Write>(&self, writer: &mut W, day: &DayNode) -> anyhow::Result<()> {
        if day.lanes.is_empty() {
            let empty = TRACK_FILL.to_string().repeat(self.columns);
            writeln!(writer, "{:width$} {}", day.label, empty, width = LABEL_WIDTH)?;
            return Ok(());
        }

        for (idx, lane) in day.lanes.iter().enumerate() {
            let label = if idx == 0 { day.label.as_str() } else { "" };
            writeln!(writer, "{:width$} {}", label, self.lane_row(&lane.events), width = LABEL_WIDTH)?;
        }
        Ok(())
    }

    fn header_row(&self, marks: &[HourMark]) -> String {
        let mut row = vec![' '; self.columns];
        let mut next_free = 0usize;
        for mark in marks {
            let col = self.column_of(mark.left);
            let len = mark.label.chars().count();
            if col < next_free || col + len > self.columns {
                continue;
            }
            for (offset, ch) in mark.label.chars().enumerate() {
                row[col + offset] = ch;
            }
            next_free = col + len + 1;
        }
        row.into_iter().collect()
    }

    /// Bars are clipped to the day's track; the layout keeps the full extent.
    fn lane_row(&self, events: &[EventNode]) -> String {
        let mut segments: Vec<(usize, usize, &EventNode)> = events
            .iter()
            .map(|e| (self.column_of(e.left), self.column_of(e.left + e.width), e))
            .filter(|(start, end, _)| end > start)
            .collect();
        segments.sort_by_key(|(start, _, _)| *start);

        let mut out = String::new();
        let mut cursor = 0usize;
        for (start, end, event) in segments {
            let start = start.max(cursor);
            if end <= start {
                continue;
            }
            out.extend(std::iter::repeat_n(TRACK_FILL, start - cursor));
            let bar = fit_to_width(&event.name, end - start);
            out.push_str(&self.paint(&bar, color_code(event)));
            cursor = end;
        }
        out.extend(std::iter::repeat_n(TRACK_FILL, self.columns.saturating_sub(cursor)));
        out
    }

    fn column_of(&self, percent: f64) -> usize {
        let col = (percent / 100.0 * self.columns as f64).round();
        col.clamp(0.0, self.columns as f64) as usize
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

pub fn write_json<W: Write>(mut writer: W, layout: &CalendarLayout) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, layout)?;
    writeln!(writer)?;
    Ok(())
}

fn color_code(event: &EventNode) -> &'static str {
    let has = |flag: &CategoryFlag| event.flags.contains(flag);
    if has(&CategoryFlag::Freq("shield".to_string())) {
        "35"
    } else if has(&CategoryFlag::MaxRating) {
        "36"
    } else if has(&CategoryFlag::Casual) {
        "32"
    } else {
        "33"
    }
}

/// Exactly `width` terminal cells: the text, cut before a char that would
/// overflow, then padded with bar fill.
fn fit_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.extend(std::iter::repeat_n(BAR_FILL, width - used));
    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{OutputFormat, Renderer, fit_to_width, write_json};
    use crate::config::Config;
    use crate::event::{CalendarData, Tournament};
    use crate::layout::{LayoutOptions, build_layout};

    fn renderer() -> Renderer {
        let mut cfg = Config::default();
        cfg.apply_overrides(vec![("color".to_string(), "off".to_string())]);
        Renderer::new(&cfg).expect("renderer")
    }

    #[test]
    fn fits_wide_text() {
        assert_eq!(fit_to_width("Blitz", 8), "Blitz===");
        assert_eq!(fit_to_width("Bullet Arena", 6), "Bullet");
        assert_eq!(fit_to_width("日本語", 5), "日本=");
    }

    #[test]
    fn rejects_bad_settings() {
        let mut cfg = Config::default();
        cfg.apply_overrides(vec![("color".to_string(), "sometimes".to_string())]);
        assert!(Renderer::new(&cfg).is_err());
        cfg.apply_overrides(vec![("color".to_string(), "y".to_string())]);
        assert!(Renderer::new(&cfg).is_err());
        cfg.apply_overrides(vec![("color".to_string(), "Off".to_string())]);
        assert!(Renderer::new(&cfg).is_ok());
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(" JSON ".parse::<OutputFormat>().expect("json"), OutputFormat::Json);
    }

    #[test]
    fn draws_lanes_as_rows() {
        let since = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let data = CalendarData {
            since,
            to: since + Duration::days(1),
            tournaments: vec![
                Tournament::new("a", "Alpha", since + Duration::hours(2), 360),
                Tournament::new("b", "Beta", since + Duration::hours(4), 120),
                Tournament::new("n", "Night", since + Duration::hours(22), 240),
            ],
        };
        let layout = build_layout(&data, &LayoutOptions::default());

        let mut buf = Vec::new();
        renderer().write_text(&mut buf, &layout).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].trim_start().starts_with("00  02  04"));
        let dots = |n: usize| ".".repeat(n);
        assert_eq!(lines[1], format!("01/03 {}Alpha======={}Nigh", dots(4), dots(28)));
        assert_eq!(lines[2], format!("      {}Beta{}", dots(8), dots(36)));
        assert_eq!(lines[3], format!("02/03 Nigh{}", dots(44)));
    }

    #[test]
    fn json_output_is_parseable() {
        let since = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let data = CalendarData {
            since,
            to: since,
            tournaments: vec![],
        };
        let layout = build_layout(&data, &LayoutOptions::default());
        let mut buf = Vec::new();
        write_json(&mut buf, &layout).expect("json");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("parse");
        assert_eq!(value["groups"][0]["days"][0]["lanes"], serde_json::json!([]));
    }
}
