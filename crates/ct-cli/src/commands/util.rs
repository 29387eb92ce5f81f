//! Shared utilities for CLI commands.

use std::io::BufRead;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use ct_core::{OwnerId, TrackerId};
use ct_db::Database;
use regex::Regex;

/// Pre-compiled regex for relative target parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:in\s+)?(\d+)\s*(minute|min|hour|hr|day|week)s?$").unwrap()
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a target in the system timezone. See [`parse_target_in`].
pub fn parse_target(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    parse_target_in(s, now, &Local)
}

/// Parse a target instant entered by the user.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Wall clock in `tz`: "2026-01-15 10:30"
/// - Relative to `now`: "in 90 minutes", "2 hours", "in 1 week"
pub fn parse_target_in<Tz: TimeZone>(s: &str, now: DateTime<Utc>, tz: &Tz) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(naive) = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        return match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
            LocalResult::None => bail!("{s} does not exist in the local timezone"),
        };
    }

    let lowered = s.to_ascii_lowercase();
    let Some(caps) = RELATIVE_TIME_RE.captures(&lowered) else {
        bail!(
            "Invalid target: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z), local time (e.g., '2026-01-15 10:30'), or relative (e.g., 'in 2 hours')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" | "min" => (MAX_RELATIVE_MINUTES, 1),
        "hour" | "hr" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now + Duration::minutes(n * minutes_per_unit))
}

/// Resolves a full or abbreviated tracker ID owned by `owner`.
pub fn resolve_tracker(db: &Database, owner: &OwnerId, id: &str) -> Result<TrackerId> {
    let id = id.trim();
    if id.len() < MIN_ID_PREFIX {
        bail!("tracker ID must be at least {MIN_ID_PREFIX} characters: {id}");
    }
    Ok(db.resolve_tracker_id(owner, id)?)
}

/// Shortest accepted tracker ID prefix.
pub const MIN_ID_PREFIX: usize = 4;

/// Reads one trimmed line, or `None` at end of input.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = reader.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Uses `explicit` when given, otherwise reads a password from `reader`.
pub fn password_from<R: BufRead>(explicit: Option<&str>, reader: &mut R) -> Result<String> {
    if let Some(password) = explicit {
        return Ok(password.to_string());
    }
    read_line(reader)?
        .filter(|line| !line.is_empty())
        .context("no password given. Pass --password, set CT_PASSWORD, or pipe it on stdin")
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::FixedOffset;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_target_in("2026-01-15T10:30:00+02:00", now(), &Utc).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_local_wall_clock() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let dt = parse_target_in("2026-01-15 10:30", now(), &tz).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap());

        let dt = parse_target_in("2026-01-15T10:30", now(), &Utc).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_relative_forms() {
        let cases = [
            ("in 90 minutes", Duration::minutes(90)),
            ("in 1 minute", Duration::minutes(1)),
            ("2 hours", Duration::hours(2)),
            ("In 3 Days", Duration::days(3)),
            ("in 1 week", Duration::weeks(1)),
            ("45min", Duration::minutes(45)),
        ];
        for (input, offset) in cases {
            assert_eq!(
                parse_target_in(input, now(), &Utc).unwrap(),
                now() + offset,
                "{input}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_garbage_and_overflow() {
        let err = parse_target_in("tomorrow-ish", now(), &Utc).unwrap_err();
        assert!(err.to_string().contains("Invalid target"));

        let err = parse_target_in("in 999999999999 weeks", now(), &Utc).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_password_from_prefers_explicit_value() {
        let mut input = "piped\n".as_bytes();
        assert_eq!(password_from(Some("flag"), &mut input).unwrap(), "flag");
        assert_eq!(password_from(None, &mut input).unwrap(), "piped");
        assert!(password_from(None, &mut input).is_err());
    }

    #[test]
    fn test_resolve_tracker_rejects_short_prefix() {
        let db = Database::open_in_memory().unwrap();
        let owner = OwnerId::new("owner-1").unwrap();
        let err = resolve_tracker(&db, &owner, "ab").unwrap_err();
        assert!(err.to_string().contains("at least 4 characters"));
    }
}
