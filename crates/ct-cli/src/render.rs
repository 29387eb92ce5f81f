//! Terminal rendering of cards, lists, and statistics.
//!
//! Everything here writes to an injected writer and takes the clock and
//! timezone as arguments, so output is deterministic under test.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, TimeZone, Utc};
use crossterm::style::{Color, Stylize, style};
use ct_core::{
    Bucket, Distribution, FilterTab, ListState, ListView, Theme, Tracker, TrackerId, evaluate,
};

/// Cells in a card's progress bar.
pub const BAR_WIDTH: usize = 20;

/// Characters of a tracker ID shown on cards.
const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Heading,
    Muted,
    Accent,
    Success,
    Warning,
}

/// ANSI styling for one theme. Disabled output passes text through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    theme: Theme,
    color: bool,
}

impl Palette {
    pub const fn new(theme: Theme, color: bool) -> Self {
        Self { theme, color }
    }

    /// Unstyled output.
    pub const fn plain() -> Self {
        Self::new(Theme::Dark, false)
    }

    const fn color_for(&self, role: Role) -> Color {
        match (self.theme, role) {
            (Theme::Dark, Role::Heading) => Color::White,
            (Theme::Dark, Role::Muted) => Color::DarkGrey,
            (Theme::Dark, Role::Accent) => Color::Magenta,
            (Theme::Dark, Role::Success) => Color::Green,
            (Theme::Dark, Role::Warning) => Color::Yellow,
            (Theme::Light, Role::Heading) => Color::Black,
            (Theme::Light, Role::Muted) => Color::Grey,
            (Theme::Light, Role::Accent) => Color::DarkMagenta,
            (Theme::Light, Role::Success) => Color::DarkGreen,
            (Theme::Light, Role::Warning) => Color::DarkYellow,
        }
    }

    fn paint(&self, text: &str, role: Role) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = style(text).with(self.color_for(role));
        if role == Role::Heading {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint(text, Role::Heading)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, Role::Muted)
    }

    pub fn accent(&self, text: &str) -> String {
        self.paint(text, Role::Accent)
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, Role::Success)
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, Role::Warning)
    }
}

/// Whether stdout is a terminal and `NO_COLOR` is unset.
pub fn stdout_supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

/// Generates a bar of `width` cells filled in proportion to `ratio`.
///
/// A non-zero ratio always fills at least one cell.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let mut filled = (ratio * width as f64).round() as usize;
    if filled == 0 && ratio > 0.0 {
        filled = 1;
    }
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn short_id(id: &TrackerId) -> &str {
    id.as_str().get(..SHORT_ID_LEN).unwrap_or_else(|| id.as_str())
}

/// Formats a target as `Jan 5, 3:07 PM` in `tz`.
pub fn format_target<Tz>(target: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    target.with_timezone(tz).format("%b %-d, %-I:%M %p").to_string()
}

/// Writes one tracker card evaluated at `now`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn write_card<W, Tz>(
    writer: &mut W,
    tracker: &Tracker,
    now: DateTime<Utc>,
    tz: &Tz,
    palette: &Palette,
) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let countdown = evaluate(tracker, now);
    let badge = format!("[{}]", countdown.display_status.label());
    let badge = if countdown.is_completed() {
        palette.success(&badge)
    } else {
        palette.accent(&badge)
    };

    write!(writer, "{badge} {}", palette.heading(&tracker.title))?;
    if tracker.pause.is_paused() {
        write!(writer, " {}", palette.warning("(paused)"))?;
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "  {}  due {}",
        palette.muted(short_id(&tracker.id)),
        format_target(tracker.target_timestamp, tz)
    )?;
    if let Some(description) = &tracker.description {
        writeln!(writer, "  {description}")?;
    }

    if countdown.is_completed() {
        writeln!(writer, "  {}", palette.success("Ready to Claim"))?;
    } else {
        let percent = countdown.progress_percent.floor() as u32;
        writeln!(
            writer,
            "  {}  {} {percent}%",
            countdown.text,
            palette.accent(&progress_bar(countdown.progress_percent / 100.0, BAR_WIDTH))
        )?;
    }
    Ok(())
}

fn tab_strip(active: FilterTab, palette: &Palette) -> String {
    [FilterTab::All, FilterTab::Progress, FilterTab::Available]
        .iter()
        .map(|tab| {
            let name = match tab {
                FilterTab::All => "All",
                FilterTab::Progress => "Progress",
                FilterTab::Available => "Available",
            };
            if *tab == active {
                palette.accent(&format!("[{name}]"))
            } else {
                palette.muted(name)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Writes the tab strip, the revealed cards, and the pagination footer.
///
/// `more_hint` is the command suggested for revealing the next page.
pub fn write_list<W, Tz>(
    writer: &mut W,
    state: &ListState,
    view: &ListView<'_>,
    now: DateTime<Utc>,
    tz: &Tz,
    palette: &Palette,
    more_hint: Option<&str>,
) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    write!(writer, "{}", tab_strip(state.tab(), palette))?;
    if !state.query().is_empty() {
        write!(writer, "  {}", palette.muted(&format!("search: \"{}\"", state.query())))?;
    }
    writeln!(writer)?;

    if view.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No trackers found.")?;
        return Ok(());
    }

    writeln!(writer, "Showing {} of {}", view.items.len(), view.total)?;
    for tracker in &view.items {
        writeln!(writer)?;
        write_card(writer, tracker, now, tz, palette)?;
    }

    if view.has_more() {
        writeln!(writer)?;
        let remaining = view.total - view.items.len();
        match more_hint {
            Some(hint) => writeln!(writer, "{remaining} more. Load more: {hint}")?,
            None => writeln!(writer, "{remaining} more.")?,
        }
    }
    Ok(())
}

/// Writes the bucket chart with bars scaled to the largest bucket.
pub fn write_stats<W: Write>(
    writer: &mut W,
    distribution: &Distribution,
    timezone: &str,
    palette: &Palette,
) -> io::Result<()> {
    writeln!(
        writer,
        "{}  {}",
        palette.heading("Overview"),
        palette.accent(&format!("{} Total", distribution.total()))
    )?;
    writeln!(writer, "{}", palette.muted(&format!("Timezone: {timezone}")))?;
    writeln!(writer)?;
    for bucket in Bucket::ALL {
        writeln!(
            writer,
            "  {} {} {}",
            palette.muted(&format!("{:<9}", bucket.label())),
            palette.accent(&progress_bar(distribution.ratio(bucket), BAR_WIDTH)),
            distribution.count(bucket)
        )?;
    }
    Ok(())
}
