//! Reading the day's events from an iCalendar file.
//!
//! Only what the planner needs is extracted: start, end, summary and
//! location of each `VEVENT` that starts on the target date.
//!
//! - UTC date-times (`...Z`) are converted to the local timezone.
//! - Floating and `TZID=` date-times are taken as local wall-clock time.
//! - All-day events (`VALUE=DATE`) are skipped.
//! - Events ending on a later date are clipped to `24:00`.
//!
//! Malformed events are skipped with a warning; a file that is not an
//! iCalendar document at all is an error.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use dp_core::{Event, EventSet, TimeOfDay};
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use regex::Regex;

use crate::error::SourceError;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d{1,6})W)?(?:(\d{1,6})D)?(?:T(?:(\d{1,6})H)?(?:(\d{1,6})M)?(?:\d{1,6}S)?)?$")
        .unwrap()
});

const DEFAULT_SUMMARY: &str = "Busy";

/// Loads the events of `date` from the calendar at `path`.
pub fn read_events(path: &Path, date: NaiveDate) -> Result<EventSet, SourceError> {
    let file = File::open(path).map_err(|err| SourceError::read(path, err))?;
    let events = parse_events(BufReader::new(file), date)?;
    tracing::debug!(
        path = %path.display(),
        %date,
        count = events.len(),
        "loaded calendar events"
    );
    Ok(events)
}

/// Parses iCalendar data and keeps the events starting on `date`.
pub fn parse_events<R: BufRead>(reader: R, date: NaiveDate) -> Result<EventSet, SourceError> {
    let mut events = Vec::new();
    for calendar in ical::IcalParser::new(reader) {
        let calendar = calendar.map_err(|err| SourceError::Calendar(err.to_string()))?;
        for vevent in &calendar.events {
            match convert_event(vevent, date) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(reason) => tracing::warn!(%reason, "skipping calendar event"),
            }
        }
    }
    Ok(EventSet::new(events))
}

enum Stamp {
    AllDay,
    At(NaiveDateTime),
}

/// `Ok(None)` for events that are valid but not relevant to `date`.
fn convert_event(vevent: &IcalEvent, date: NaiveDate) -> Result<Option<Event>, String> {
    let mut start = None;
    let mut end = None;
    let mut duration = None;
    let mut summary = None;
    let mut location = None;

    for property in &vevent.properties {
        match property.name.as_str() {
            "DTSTART" => start = Some(property),
            "DTEND" => end = Some(property),
            "DURATION" => duration = property.value.as_deref(),
            "SUMMARY" => summary = property.value.as_deref(),
            "LOCATION" => location = property.value.as_deref(),
            _ => {}
        }
    }

    let summary = summary
        .map(str::trim)
        .filter(|summary| !summary.is_empty())
        .unwrap_or(DEFAULT_SUMMARY);
    let start = start.ok_or_else(|| format!("{summary}: missing DTSTART"))?;
    let Stamp::At(start) = parse_stamp(start)? else {
        tracing::debug!(%summary, "ignoring all-day event");
        return Ok(None);
    };
    if start.date() != date {
        return Ok(None);
    }

    let end = match (end, duration) {
        (Some(end), _) => match parse_stamp(end)? {
            Stamp::At(end) => end,
            Stamp::AllDay => return Ok(None),
        },
        (None, Some(duration)) => start + parse_duration(duration)?,
        (None, None) => return Err(format!("{summary}: missing DTEND and DURATION")),
    };

    let end_time = match end.date().cmp(&date) {
        Ordering::Equal => TimeOfDay::from_naive_time(end.time()),
        Ordering::Greater => TimeOfDay::END_OF_DAY,
        Ordering::Less => return Err(format!("{summary}: ends before it starts")),
    };
    let event = Event::new(TimeOfDay::from_naive_time(start.time()), end_time, summary)
        .map_err(|err| format!("{summary}: {err}"))?;

    Ok(Some(match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(location) => event.with_location(location),
        None => event,
    }))
}

fn parse_stamp(property: &Property) -> Result<Stamp, String> {
    let value = property
        .value
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| format!("{} has no value", property.name))?;

    let is_date = property.params.as_ref().is_some_and(|params| {
        params.iter().any(|(name, values)| {
            name.eq_ignore_ascii_case("VALUE")
                && values.iter().any(|value| value.eq_ignore_ascii_case("DATE"))
        })
    });
    if is_date || !value.contains('T') {
        return Ok(Stamp::AllDay);
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = parse_naive(utc)?;
        let local = Utc.from_utc_datetime(&naive).with_timezone(&Local);
        return Ok(Stamp::At(local.naive_local()));
    }
    parse_naive(value).map(Stamp::At)
}

fn parse_naive(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M"))
        .map_err(|err| format!("invalid date-time {value:?}: {err}"))
}

/// Parses a non-negative `DURATION` such as `PT1H30M` or `P1DT2H`.
/// Seconds are dropped.
fn parse_duration(value: &str) -> Result<TimeDelta, String> {
    let invalid = || format!("invalid duration {value:?}");
    let caps = DURATION_RE.captures(value.trim()).ok_or_else(invalid)?;
    let field = |index: usize| -> Result<i64, String> {
        caps.get(index)
            .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
    };
    let minutes = field(1)? * 7 * 24 * 60 + field(2)? * 24 * 60 + field(3)? * 60 + field(4)?;
    Ok(TimeDelta::minutes(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn calendar(events: &str) -> String {
        format!("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//test//EN\n{events}END:VCALENDAR\n")
    }

    fn parse(events: &str, day: &str) -> EventSet {
        parse_events(calendar(events).as_bytes(), date(day)).unwrap()
    }

    #[test]
    fn reads_floating_events_for_the_day() {
        let events = parse(
            "BEGIN:VEVENT\n\
             SUMMARY:Standup\n\
             DTSTART:20240502T090000\n\
             DTEND:20240502T093000\n\
             LOCATION:Room 4\n\
             END:VEVENT\n",
            "2024-05-02",
        );

        assert_eq!(events.len(), 1);
        let standup = &events.as_slice()[0];
        assert_eq!(standup.description(), "Standup");
        assert_eq!(standup.start(), t("09:00"));
        assert_eq!(standup.end(), t("09:30"));
        assert_eq!(standup.location(), Some("Room 4"));
    }

    #[test]
    fn keeps_only_events_on_the_target_date_in_start_order() {
        let events = parse(
            "BEGIN:VEVENT\nSUMMARY:Lunch\nDTSTART:20240502T120000\nDTEND:20240502T130000\nEND:VEVENT\n\
             BEGIN:VEVENT\nSUMMARY:Tomorrow\nDTSTART:20240503T090000\nDTEND:20240503T100000\nEND:VEVENT\n\
             BEGIN:VEVENT\nSUMMARY:Early\nDTSTART:20240502T080000\nDTEND:20240502T083000\nEND:VEVENT\n",
            "2024-05-02",
        );

        let names: Vec<_> = events.iter().map(Event::description).collect();
        assert_eq!(names, vec!["Early", "Lunch"]);
    }

    #[test]
    fn tzid_times_are_wall_clock() {
        let events = parse(
            "BEGIN:VEVENT\n\
             SUMMARY:Call\n\
             DTSTART;TZID=Europe/Paris:20240502T140000\n\
             DTEND;TZID=Europe/Paris:20240502T150000\n\
             END:VEVENT\n",
            "2024-05-02",
        );
        assert_eq!(events.as_slice()[0].start(), t("14:00"));
    }

    #[test]
    fn utc_times_are_converted_to_local_time() {
        let expected = Utc
            .with_ymd_and_hms(2024, 5, 2, 12, 0, 0)
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        let events = parse_events(
            calendar(
                "BEGIN:VEVENT\nSUMMARY:Sync\nDTSTART:20240502T120000Z\nDURATION:PT30M\nEND:VEVENT\n",
            )
            .as_bytes(),
            expected.date(),
        )
        .unwrap();

        assert_eq!(events.len(), 1);
        let sync = &events.as_slice()[0];
        assert_eq!(sync.start(), TimeOfDay::from_naive_time(expected.time()));
        assert_eq!(sync.duration().get(), 30);
    }

    #[test]
    fn duration_replaces_a_missing_end() {
        let events = parse(
            "BEGIN:VEVENT\nSUMMARY:Workshop\nDTSTART:20240502T100000\nDURATION:PT1H30M\nEND:VEVENT\n",
            "2024-05-02",
        );
        assert_eq!(events.as_slice()[0].end(), t("11:30"));
    }

    #[test]
    fn all_day_events_are_skipped() {
        let events = parse(
            "BEGIN:VEVENT\nSUMMARY:Holiday\nDTSTART;VALUE=DATE:20240502\nDTEND;VALUE=DATE:20240503\nEND:VEVENT\n",
            "2024-05-02",
        );
        assert!(events.is_empty());
    }

    #[test]
    fn events_running_past_midnight_are_clipped() {
        let events = parse(
            "BEGIN:VEVENT\nSUMMARY:Deploy\nDTSTART:20240502T230000\nDTEND:20240503T010000\nEND:VEVENT\n",
            "2024-05-02",
        );
        let deploy = &events.as_slice()[0];
        assert_eq!(deploy.end(), TimeOfDay::END_OF_DAY);
        assert_eq!(deploy.duration().get(), 60);
    }

    #[test]
    fn malformed_events_are_skipped() {
        let events = parse(
            "BEGIN:VEVENT\nSUMMARY:No end\nDTSTART:20240502T090000\nEND:VEVENT\n\
             BEGIN:VEVENT\nSUMMARY:Backwards\nDTSTART:20240502T110000\nDTEND:20240502T100000\nEND:VEVENT\n\
             BEGIN:VEVENT\nSUMMARY:Garbled\nDTSTART:2024-05-02 09:00\nDTEND:20240502T100000\nEND:VEVENT\n\
             BEGIN:VEVENT\nDTSTART:20240502T130000\nDTEND:20240502T140000\nEND:VEVENT\n",
            "2024-05-02",
        );
        let names: Vec<_> = events.iter().map(Event::description).collect();
        assert_eq!(names, vec![DEFAULT_SUMMARY]);
    }

    #[test]
    fn parses_iso_durations() {
        assert_eq!(parse_duration("PT45M"), Ok(TimeDelta::minutes(45)));
        assert_eq!(parse_duration("PT2H"), Ok(TimeDelta::minutes(120)));
        assert_eq!(parse_duration("P1DT1H"), Ok(TimeDelta::minutes(25 * 60)));
        assert_eq!(parse_duration("P1W"), Ok(TimeDelta::minutes(7 * 24 * 60)));
        assert!(parse_duration("-PT5M").is_err());
        assert!(parse_duration("90").is_err());
    }

    #[test]
    fn reads_from_disk_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar.ics");
        std::fs::write(
            &path,
            calendar("BEGIN:VEVENT\nSUMMARY:Review\nDTSTART:20240502T150000\nDTEND:20240502T160000\nEND:VEVENT\n"),
        )
        .unwrap();

        let events = read_events(&path, date("2024-05-02")).unwrap();
        assert_eq!(events.len(), 1);

        let missing = read_events(&dir.path().join("nope.ics"), date("2024-05-02"));
        assert!(matches!(missing, Err(SourceError::Read { .. })));
    }
}
