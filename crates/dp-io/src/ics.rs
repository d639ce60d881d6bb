//! Writing a planned day as an iCalendar document.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use dp_core::{TimeOfDay, Timeline, TimelineItem};
use uuid::Uuid;

use crate::error::SourceError;

const PRODID: &str = "-//dayplan//dayplan//EN";
const MAX_LINE_OCTETS: usize = 75;

/// Renders timelines for one date.
///
/// Times are written as floating local time unless a timezone name is set,
/// in which case every `DTSTART`/`DTEND` carries a `TZID` parameter. Items
/// past `24:00` land on the following date.
#[derive(Debug, Clone)]
pub struct IcsWriter {
    date: NaiveDate,
    timezone: Option<String>,
    stamp: DateTime<Utc>,
}

impl IcsWriter {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            timezone: None,
            stamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: Option<String>) -> Self {
        self.timezone = timezone.filter(|tz| !tz.trim().is_empty());
        self
    }

    /// Overrides the `DTSTAMP` written on every event.
    #[must_use]
    pub fn with_stamp(mut self, stamp: DateTime<Utc>) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn render(&self, timeline: &Timeline) -> String {
        let mut out = String::new();
        push_line(&mut out, "BEGIN:VCALENDAR");
        push_line(&mut out, "VERSION:2.0");
        push_line(&mut out, &format!("PRODID:{PRODID}"));
        push_line(&mut out, "CALSCALE:GREGORIAN");
        for item in timeline {
            self.render_item(&mut out, item);
        }
        push_line(&mut out, "END:VCALENDAR");
        out
    }

    /// Renders and writes the calendar, replacing any existing file.
    pub fn write(&self, timeline: &Timeline, path: &Path) -> Result<(), SourceError> {
        std::fs::write(path, self.render(timeline)).map_err(|err| SourceError::write(path, err))?;
        tracing::info!(path = %path.display(), items = timeline.len(), "wrote calendar");
        Ok(())
    }

    fn render_item(&self, out: &mut String, item: &TimelineItem) {
        push_line(out, "BEGIN:VEVENT");
        push_line(out, &format!("UID:{}@dayplan", Uuid::new_v4()));
        push_line(
            out,
            &format!("DTSTAMP:{}", self.stamp.format("%Y%m%dT%H%M%SZ")),
        );
        push_line(out, &self.date_time("DTSTART", self.instant(item.start)));
        push_line(out, &self.date_time("DTEND", self.instant(item.end)));
        push_line(out, &format!("SUMMARY:{}", escape_text(&item.description)));
        if let Some(location) = &item.location {
            push_line(out, &format!("LOCATION:{}", escape_text(location)));
        }
        push_line(
            out,
            &format!("CATEGORIES:{}", item.kind.as_str().to_uppercase()),
        );
        push_line(out, "END:VEVENT");
    }

    fn instant(&self, time: TimeOfDay) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
            + TimeDelta::minutes(i64::from(time.minutes_from_midnight()))
    }

    fn date_time(&self, name: &str, at: NaiveDateTime) -> String {
        let value = at.format("%Y%m%dT%H%M%S");
        match &self.timezone {
            Some(tz) => format!("{name};TZID={tz}:{value}"),
            None => format!("{name}:{value}"),
        }
    }
}

/// Escapes a TEXT value.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Appends a content line, folded at 75 octets, with a CRLF ending.
fn push_line(out: &mut String, line: &str) {
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            // The leading space of a continuation line counts.
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dp_core::{Event, Minutes};

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn writer() -> IcsWriter {
        IcsWriter::new(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
            .with_stamp(Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap())
    }

    /// Replaces random UIDs so snapshots are stable.
    fn redact_uids(ics: &str) -> String {
        ics.split("\r\n")
            .map(|line| {
                if line.starts_with("UID:") {
                    "UID:[uid]"
                } else {
                    line
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string()
    }

    fn sample_timeline() -> Timeline {
        let standup = Event::new(t("09:00"), t("09:30"), "Standup")
            .unwrap()
            .with_location("Room 4, 2nd floor");
        Timeline::from(vec![
            TimelineItem::task("Write report (part 1)", t("08:30"), Minutes::new(30)),
            TimelineItem::from_event(&standup),
            TimelineItem::task("Write report (part 2)", t("09:30"), Minutes::new(30)),
        ])
    }

    #[test]
    fn renders_floating_calendar() {
        let ics = writer().render(&sample_timeline());
        insta::assert_snapshot!(redact_uids(&ics), @r"
        BEGIN:VCALENDAR
        VERSION:2.0
        PRODID:-//dayplan//dayplan//EN
        CALSCALE:GREGORIAN
        BEGIN:VEVENT
        UID:[uid]
        DTSTAMP:20240501T180000Z
        DTSTART:20240502T083000
        DTEND:20240502T090000
        SUMMARY:Write report (part 1)
        CATEGORIES:TASK
        END:VEVENT
        BEGIN:VEVENT
        UID:[uid]
        DTSTAMP:20240501T180000Z
        DTSTART:20240502T090000
        DTEND:20240502T093000
        SUMMARY:Standup
        LOCATION:Room 4\, 2nd floor
        CATEGORIES:EVENT
        END:VEVENT
        BEGIN:VEVENT
        UID:[uid]
        DTSTAMP:20240501T180000Z
        DTSTART:20240502T093000
        DTEND:20240502T100000
        SUMMARY:Write report (part 2)
        CATEGORIES:TASK
        END:VEVENT
        END:VCALENDAR
        ");
    }

    #[test]
    fn uses_crlf_line_endings() {
        let ics = writer().render(&Timeline::new());
        assert_eq!(
            ics,
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//dayplan//dayplan//EN\r\n\
             CALSCALE:GREGORIAN\r\nEND:VCALENDAR\r\n"
        );
    }

    #[test]
    fn timezone_adds_tzid() {
        let ics = writer()
            .with_timezone(Some("Europe/Paris".to_string()))
            .render(&sample_timeline());
        assert!(ics.contains("DTSTART;TZID=Europe/Paris:20240502T083000\r\n"));
        assert!(ics.contains("DTEND;TZID=Europe/Paris:20240502T100000\r\n"));
    }

    #[test]
    fn items_past_midnight_roll_to_the_next_date() {
        let timeline = Timeline::from(vec![TimelineItem::task(
            "Late shift",
            t("23:30"),
            Minutes::new(60),
        )]);
        let ics = writer().render(&timeline);
        assert!(ics.contains("DTSTART:20240502T233000\r\n"));
        assert!(ics.contains("DTEND:20240503T003000\r\n"));
    }

    #[test]
    fn escapes_text_values() {
        assert_eq!(
            escape_text("a,b;c\\d\nline"),
            "a\\,b\\;c\\\\d\\nline"
        );
    }

    #[test]
    fn folds_long_lines() {
        let mut out = String::new();
        let summary = format!("SUMMARY:{}", "x".repeat(100));
        push_line(&mut out, &summary);
        let lines: Vec<_> = out.trim_end_matches("\r\n").split("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 75);
        assert!(lines[1].starts_with(' '));
        assert_eq!(lines.concat().replace(' ', "").len(), summary.len());
    }

    #[test]
    fn writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ics");
        writer().write(&sample_timeline(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.matches("BEGIN:VEVENT").count(), 3);
        assert!(written.ends_with("END:VCALENDAR\r\n"));
    }
}
