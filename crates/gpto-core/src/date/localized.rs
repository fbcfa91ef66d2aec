use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::log::LogSink;

static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[年년月월]\s*").unwrap());
static DAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[日일]").unwrap());

static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        (?P<y>\d{4})[-/.](?P<m>\d{1,2})[-/.](?P<d>\d{1,2})
        (?:
            [\sT,]*
            (?P<pre>AM|PM)?\s*
            (?P<time>\d{1,2}:\d{2}(?::\d{2})?)
            \s*(?P<post>AM|PM)?
        )?
        \s*
        (?:(?P<tz>[A-Z]{2,5})(?P<off>[+-]\d{1,2}(?::?\d{2})?)?\b)?
        ",
    )
    .unwrap()
});

/// Localized meridiem markers, mapped to their Latin form.
const MERIDIEMS: &[(&str, &str)] = &[
    ("午前", "AM"),
    ("午後", "PM"),
    ("오전", "AM"),
    ("오후", "PM"),
    ("上午", "AM"),
    ("下午", "PM"),
];

/// Abbreviations with a fixed UTC offset, in hours east.
const ZONES: &[(&str, i32)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("JST", 9),
    ("KST", 9),
    ("HKT", 8),
    ("SGT", 8),
    ("AEST", 10),
    ("AEDT", 11),
    ("CET", 1),
    ("CEST", 2),
    ("BST", 1),
    ("EST", -5),
    ("EDT", -4),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
];

/// Rewrite localized calendar separators, meridiem markers and
/// compatibility characters (full-width digits, colons) into Latin form.
pub fn normalize(input: &str) -> String {
    let mut s: String = input.nfkc().collect();
    for (local, latin) in MERIDIEMS {
        s = s.replace(local, &format!(" {} ", latin));
    }
    let s = YEAR_MONTH_RE.replace_all(&s, "-");
    DAY_RE.replace_all(&s, " ").into_owned()
}

fn zone_offset(abbr: &str) -> Option<FixedOffset> {
    ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(abbr))
        .and_then(|(_, hours)| FixedOffset::east_opt(hours * 3600))
}

/// `+9`, `+09`, `+0900`, `+09:00`
fn numeric_offset(off: &str) -> Option<FixedOffset> {
    let (sign, rest) = match off.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
    let (h, m) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        3 | 4 => {
            let split = digits.len() - 2;
            (digits[..split].parse::<i32>().ok()?, digits[split..].parse::<i32>().ok()?)
        }
        _ => return None,
    };
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

/// Interpret a naive wall-clock value in the system timezone. Ambiguous
/// (DST fold) values take the earlier instant; values in a DST gap fail.
pub fn in_local_zone(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// Parse a localized, human-formatted date string such as
/// `2023年10月27日 午後 3:30:00 UTC` or `2021-01-01 0:00:00 JST`.
///
/// Without a timezone token the value is taken as local time. An unknown
/// abbreviation is taken as UTC and reported on `log`.
pub fn parse_localized_date(input: &str, log: &dyn LogSink) -> Option<DateTime<FixedOffset>> {
    let normalized = normalize(input);
    let caps = DATE_TIME_RE.captures(&normalized)?;

    let date = format!("{}-{}-{}", &caps["y"], &caps["m"], &caps["d"]);
    let meridiem = caps.name("pre").or_else(|| caps.name("post"));

    let naive = match caps.name("time") {
        Some(time) => {
            let time = if time.as_str().matches(':').count() == 1 {
                format!("{}:00", time.as_str())
            } else {
                time.as_str().to_string()
            };
            let parsed = match meridiem {
                Some(ampm) => NaiveDateTime::parse_from_str(
                    &format!("{} {} {}", date, time, ampm.as_str().to_ascii_uppercase()),
                    "%Y-%m-%d %I:%M:%S %p",
                ),
                None => NaiveDateTime::parse_from_str(
                    &format!("{} {}", date, time),
                    "%Y-%m-%d %H:%M:%S",
                ),
            };
            parsed.ok()?
        }
        None => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?,
    };

    let tz = caps
        .name("tz")
        .map(|m| m.as_str())
        .filter(|t| !t.eq_ignore_ascii_case("AM") && !t.eq_ignore_ascii_case("PM"));

    let offset = match tz {
        None => return in_local_zone(naive),
        Some(abbr) => {
            let named = zone_offset(abbr);
            let explicit = caps
                .name("off")
                .filter(|_| named.map_or(false, |o| o.local_minus_utc() == 0))
                .and_then(|m| numeric_offset(m.as_str()));
            match explicit.or(named) {
                Some(offset) => offset,
                None => {
                    log.warn(&format!(
                        "Unknown timezone '{}' in '{}'; treating as UTC",
                        abbr, input
                    ));
                    FixedOffset::east_opt(0)?
                }
            }
        }
    };

    offset.from_local_datetime(&naive).single()
}
