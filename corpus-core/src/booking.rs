//! Trial-class booking rules.
//!
//! A registration for the trial plan must carry a preferred date within the
//! booking window and one of that weekday's fixed slots:
//!
//! ```text
//! Mon-Fri  06:00 07:00 08:00 09:00 10:00 11:00 14:00 … 21:00   (14 slots)
//! Sat      10:00 11:00 12:00 13:00 14:00 15:00                 (6 slots)
//! Sun      closed
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::{Config, BOOKING_WINDOW_DAYS, TRIAL_PLAN_LABEL};
use crate::error::ValidationError;
use crate::types::RegistrationForm;
use crate::validate::{check_email, require_text};

const WEEKDAY_HOURS: [u8; 14] = [6, 7, 8, 9, 10, 11, 14, 15, 16, 17, 18, 19, 20, 21];
const SATURDAY_HOURS: [u8; 6] = [10, 11, 12, 13, 14, 15];

// ---------------------------------------------------------------------------
// Time slots
// ---------------------------------------------------------------------------

/// A wall-clock `HH:MM` time, serialized as that string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    hour: u8,
    minute: u8,
}

impl TimeSlot {
    pub const fn on_the_hour(hour: u8) -> Self {
        Self { hour, minute: 0 }
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime {
            value: s.to_string(),
        };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Slots open for a trial class on `date`. Empty on Sundays.
pub fn available_slots(date: NaiveDate) -> Vec<TimeSlot> {
    let hours: &[u8] = match date.weekday() {
        Weekday::Sun => &[],
        Weekday::Sat => &SATURDAY_HOURS,
        _ => &WEEKDAY_HOURS,
    };
    hours.iter().copied().map(TimeSlot::on_the_hour).collect()
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Which plan label requires a schedule, and how far ahead it may be booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPolicy {
    pub trial_plan_label: String,
    pub window_days: i64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            trial_plan_label: TRIAL_PLAN_LABEL.to_string(),
            window_days: BOOKING_WINDOW_DAYS,
        }
    }
}

impl From<&Config> for BookingPolicy {
    fn from(config: &Config) -> Self {
        Self {
            trial_plan_label: config.trial_plan_label.clone(),
            window_days: config.booking_window_days,
        }
    }
}

impl BookingPolicy {
    pub fn is_trial(&self, plan_label: &str) -> bool {
        plan_label.trim() == self.trial_plan_label.trim()
    }

    /// Last bookable day, inclusive.
    ///
    /// Fails for a negative window or one that runs past the calendar.
    pub fn latest_day(&self, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
        u64::try_from(self.window_days)
            .ok()
            .and_then(|days| today.checked_add_days(Days::new(days)))
            .ok_or(ValidationError::InvalidWindow {
                window_days: self.window_days,
            })
    }

    /// Check a trial slot against the window, the weekday and the slot table.
    pub fn check_trial_slot(
        &self,
        date: NaiveDate,
        time: TimeSlot,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        if date < today {
            return Err(ValidationError::DateInPast {
                date,
                earliest: today,
            });
        }
        let latest = self.latest_day(today)?;
        if date > latest {
            return Err(ValidationError::DateTooFar {
                date,
                latest,
                window_days: self.window_days,
            });
        }
        if date.weekday() == Weekday::Sun {
            return Err(ValidationError::ClosedOnSunday { date });
        }
        if !available_slots(date).contains(&time) {
            return Err(ValidationError::UnavailableSlot { date, time });
        }
        Ok(())
    }

    /// Validate a submitted form and return it trimmed.
    ///
    /// Non-trial registrations never carry a schedule: any date/time sent
    /// along is dropped.
    pub fn prepare(
        &self,
        form: RegistrationForm,
        today: NaiveDate,
    ) -> Result<RegistrationForm, ValidationError> {
        require_text("name", &form.name)?;
        require_text("email", &form.email)?;
        check_email(&form.email)?;
        require_text("phone", &form.phone)?;
        require_text("plan", &form.plan)?;

        let trial = self.is_trial(&form.plan);
        let (preferred_date, preferred_time) = if trial {
            match (form.preferred_date, form.preferred_time) {
                (Some(date), Some(time)) => {
                    self.check_trial_slot(date, time, today)?;
                    (Some(date), Some(time))
                }
                _ => return Err(ValidationError::MissingTrialSchedule),
            }
        } else {
            (None, None)
        };

        Ok(RegistrationForm {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            plan: form.plan.trim().to_string(),
            preferred_date,
            preferred_time,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
