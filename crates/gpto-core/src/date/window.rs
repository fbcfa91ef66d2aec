use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Google Photos public launch, 2015-05-28T00:00:00Z.
pub fn service_release_date() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2015, 5, 28)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Closed interval `[start, now]` of dates trusted enough for dated filing.
/// The upper bound is read at classification time, so it moves with the clock
/// during a long run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlausibilityWindow {
    pub start: DateTime<Utc>,
}

impl Default for PlausibilityWindow {
    fn default() -> Self {
        Self {
            start: service_release_date(),
        }
    }
}

impl PlausibilityWindow {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { start }
    }

    pub fn contains<Tz: TimeZone>(&self, date: &DateTime<Tz>) -> bool {
        self.contains_at(date, Utc::now())
    }

    pub fn contains_at<Tz: TimeZone>(&self, date: &DateTime<Tz>, now: DateTime<Utc>) -> bool {
        let date = date.with_timezone(&Utc);
        self.start <= date && date <= now
    }
}
