//! Date helpers shared by the ticker, report and taxonomy flows.
//!
//! Instants travel as ISO-8601 UTC strings; everything shown to the user is
//! rendered in the local zone with German formatting.

use chrono::{
    DateTime, Duration, Local, Locale, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat,
    TimeZone, Utc,
};

pub const DEFAULT_LOCALE: Locale = Locale::de_DE;

const LOCAL_DATETIME_FORMAT: &str = "%d.%m.%y %H:%M:%S";
const DAY_LABEL_FORMAT: &str = "%A, %d.%m.%Y";
const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an ISO-8601 instant. Strings without an offset are read as UTC.
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|day| Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)))
}

pub fn to_utc_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_utc_iso() -> String {
    to_utc_iso(Utc::now())
}

/// `dd.MM.yy HH:mm:ss` in the local zone, or an empty string for bad input.
pub fn format_local_datetime(iso: &str) -> String {
    parse_utc(iso)
        .map(format_local)
        .unwrap_or_default()
}

pub fn format_local(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local)
        .format_localized(LOCAL_DATETIME_FORMAT, DEFAULT_LOCALE)
        .to_string()
}

pub fn now_local_formatted() -> String {
    format_local(Utc::now())
}

/// Weekday plus date, e.g. `Montag, 06.01.2025`.
pub fn format_day_label(day: NaiveDate) -> String {
    utc_day_to_midnight(day)
        .with_timezone(&Local)
        .format_localized(DAY_LABEL_FORMAT, DEFAULT_LOCALE)
        .to_string()
}

/// Convert a `datetime-local` style input (`yyyy-MM-ddTHH:mm[:ss]`) to UTC.
pub fn local_input_to_utc(local: &str) -> Option<DateTime<Utc>> {
    let local = local.trim();
    let naive = NaiveDateTime::parse_from_str(local, LOCAL_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M"))
        .ok()?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn utc_to_local_input(iso: &str) -> String {
    parse_utc(iso)
        .map(|dt| dt.with_timezone(&Local).format(LOCAL_INPUT_FORMAT).to_string())
        .unwrap_or_default()
}

/// Whole seconds from `start` to `end`, floored and clamped to zero.
pub fn diff_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    millis.div_euclid(1000).max(0)
}

/// `{h}h {mm}m {ss}s`; negative input renders as zero.
pub fn format_duration(secs: i64) -> String {
    let total = secs.max(0);
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h}h {m:02}m {s:02}s")
}

/// `[start of day - days_back, end of day + days_forward]` of the local zone,
/// expressed in UTC.
pub fn compute_local_day_range_utc(days_back: u32, days_forward: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    day_range_in(Local::now(), days_back, days_forward)
}

pub fn day_range_in<Tz: TimeZone>(
    now: DateTime<Tz>,
    days_back: u32,
    days_forward: u32,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let today = now.date_naive();

    let first = today - Duration::days(i64::from(days_back));
    let last = today + Duration::days(i64::from(days_forward));

    let from = start_of_day(&tz, first);
    let to = start_of_day(&tz, last + Duration::days(1)) - Duration::milliseconds(1);
    (from, to)
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

pub fn utc_day_to_midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// Two optional ISO strings denote the same instant. Two blanks are equal.
pub fn is_same_instant(a: Option<&str>, b: Option<&str>) -> bool {
    let blank = |v: Option<&str>| v.map_or(true, |s| s.trim().is_empty());
    match (blank(a), blank(b)) {
        (true, true) => true,
        (false, false) => match (a.and_then(parse_utc), b.and_then(parse_utc)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => false,
    }
}
