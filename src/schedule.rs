use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use log::warn;

/// Activity category of a planned session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sport {
    Ride,
    Yoga,
    Other,
}

impl Sport {
    /// Maps a SYSTM sport/prospect type label.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "cycling" | "ride" => Sport::Ride,
            "yoga" => Sport::Yoga,
            _ => Sport::Other,
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sport::Ride => write!(f, "Ride"),
            Sport::Yoga => write!(f, "Yoga"),
            Sport::Other => write!(f, "Other"),
        }
    }
}

/// One scheduled training session from the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSession {
    pub planned_date: Option<DateTime<Utc>>,
    pub applied_time_zone: Option<String>,
    pub display_name: String,
    pub workout_id: Option<String>,
    pub sport: Sport,
}

impl PlannedSession {
    /// Calendar date of the session in its own time zone.
    ///
    /// Unknown zones fall back to UTC.
    pub fn local_date(&self) -> Option<NaiveDate> {
        let planned = self.planned_date?;

        let zone = match self.applied_time_zone.as_deref() {
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                warn!("Unknown time zone '{name}' for '{}', using UTC", self.display_name);
                Tz::UTC
            }),
            None => Tz::UTC,
        };

        Some(planned.with_timezone(&zone).date_naive())
    }

    /// Artifact name: `{local date}_{sanitized name}`.
    pub fn filename(&self) -> Option<String> {
        self.local_date()
            .map(|date| format!("{}_{}", date.format("%Y-%m-%d"), sanitize_name(&self.display_name)))
    }

    /// Name used for the uploaded file.
    pub fn upload_filename(&self) -> String {
        format!("{}.zwo", sanitize_name(&self.display_name))
    }
}

/// Removes `:` and replaces space, comma, period and slash with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ':')
        .map(|c| match c {
            ' ' | ',' | '.' | '/' => '_',
            other => other,
        })
        .collect()
}

/// Why a session was left out of a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoPlannedDate,
    ExcludedSport(Sport),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPlannedDate => write!(f, "no planned date"),
            SkipReason::ExcludedSport(sport) => write!(f, "{sport} workouts are excluded"),
        }
    }
}

/// Decides which sessions are synced and which get uploaded.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleFilter {
    pub upload_past_workouts: bool,
    pub upload_yoga_workouts: bool,
}

impl ScheduleFilter {
    pub fn new(upload_past_workouts: bool, upload_yoga_workouts: bool) -> Self {
        Self {
            upload_past_workouts,
            upload_yoga_workouts,
        }
    }

    /// Whether the session is worth fetching at all.
    pub fn should_process(&self, session: &PlannedSession) -> Result<(), SkipReason> {
        if session.planned_date.is_none() {
            return Err(SkipReason::NoPlannedDate);
        }
        self.check_sport(session.sport)
    }

    /// Sport check, also applied to the sport reported by the workout detail.
    pub fn check_sport(&self, sport: Sport) -> Result<(), SkipReason> {
        if sport == Sport::Yoga && !self.upload_yoga_workouts {
            return Err(SkipReason::ExcludedSport(sport));
        }
        Ok(())
    }

    /// Only sessions strictly after today are uploaded, unless past uploads are on.
    pub fn is_upload_due(&self, local_date: NaiveDate, today: NaiveDate) -> bool {
        local_date > today || self.upload_past_workouts
    }

    /// Combined processing and upload test for one session.
    pub fn is_eligible(&self, session: &PlannedSession, today: NaiveDate) -> bool {
        self.should_process(session).is_ok()
            && session
                .local_date()
                .is_some_and(|date| self.is_upload_due(date, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(planned: Option<&str>, zone: &str, sport: Sport) -> PlannedSession {
        PlannedSession {
            planned_date: planned.map(|p| p.parse::<DateTime<Utc>>().unwrap()),
            applied_time_zone: Some(zone.to_string()),
            display_name: "The Omnium".to_string(),
            workout_id: Some("w1".to_string()),
            sport,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn is_eligible(session: &PlannedSession, today: NaiveDate, past: bool, yoga: bool) -> bool {
        ScheduleFilter::new(past, yoga).is_eligible(session, today)
    }

    #[test]
    fn test_sport_from_label() {
        assert_eq!(Sport::from_label("Cycling"), Sport::Ride);
        assert_eq!(Sport::from_label("Yoga"), Sport::Yoga);
        assert_eq!(Sport::from_label("Running"), Sport::Other);
    }

    #[test]
    fn test_local_date_uses_session_zone() {
        let morning = session(Some("2021-11-05T06:00:00.000Z"), "America/New_York", Sport::Ride);
        assert_eq!(morning.local_date(), Some(date(2021, 11, 5)));

        let late = session(Some("2021-11-05T02:00:00.000Z"), "America/New_York", Sport::Ride);
        assert_eq!(late.local_date(), Some(date(2021, 11, 4)));
    }

    #[test]
    fn test_local_date_unknown_zone_falls_back_to_utc() {
        let s = session(Some("2021-11-05T02:00:00.000Z"), "Mars/Olympus", Sport::Ride);
        assert_eq!(s.local_date(), Some(date(2021, 11, 5)));
    }

    #[test]
    fn test_filename() {
        let mut s = session(Some("2021-11-05T06:00:00.000Z"), "America/New_York", Sport::Ride);
        s.display_name = "ISLAGIATT: Part 1, v2.0/extended".to_string();

        assert_eq!(
            s.filename().as_deref(),
            Some("2021-11-05_ISLAGIATT_Part_1__v2_0_extended")
        );
        assert_eq!(s.upload_filename(), "ISLAGIATT_Part_1__v2_0_extended.zwo");
    }

    #[test]
    fn test_no_planned_date_is_never_eligible() {
        let s = session(None, "UTC", Sport::Ride);
        assert!(!is_eligible(&s, date(2021, 1, 1), true, true));
        assert_eq!(s.filename(), None);
    }

    #[test]
    fn test_yoga_toggle() {
        let s = session(Some("2021-11-05T06:00:00.000Z"), "UTC", Sport::Yoga);
        let today = date(2021, 11, 1);

        assert!(!is_eligible(&s, today, false, false));
        assert!(is_eligible(&s, today, false, true));
    }

    #[test]
    fn test_today_requires_past_toggle() {
        let s = session(Some("2021-11-05T06:00:00.000Z"), "UTC", Sport::Ride);
        let today = date(2021, 11, 5);

        assert!(!is_eligible(&s, today, false, false));
        assert!(is_eligible(&s, today, true, false));
    }

    #[test]
    fn test_future_session_is_eligible() {
        let s = session(Some("2021-11-05T06:00:00.000Z"), "UTC", Sport::Other);
        assert!(is_eligible(&s, date(2021, 11, 4), false, false));
        assert!(!is_eligible(&s, date(2021, 11, 6), false, false));
    }

    #[test]
    fn test_should_process_reasons() {
        let filter = ScheduleFilter::new(false, false);

        assert_eq!(
            filter.should_process(&session(None, "UTC", Sport::Ride)),
            Err(SkipReason::NoPlannedDate)
        );
        assert_eq!(
            filter.should_process(&session(Some("2021-11-05T06:00:00Z"), "UTC", Sport::Yoga)),
            Err(SkipReason::ExcludedSport(Sport::Yoga))
        );

        let planned = Utc.with_ymd_and_hms(2021, 11, 5, 6, 0, 0).unwrap();
        let mut ride = session(None, "UTC", Sport::Ride);
        ride.planned_date = Some(planned);
        assert_eq!(filter.should_process(&ride), Ok(()));
    }
}
