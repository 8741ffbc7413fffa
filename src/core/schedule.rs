use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::core::error::PantryError;
use crate::models::{ClosedReason, DayHours, OpeningTime, Pantry, PantryStatus, WeeklySchedule};

/// Minutes before opening/closing at which a pantry counts as opening or closing soon
pub const SOON_THRESHOLD_MINUTES: u32 = 60;

/// Evaluate a weekly schedule at `now` (already in the pantry's local time)
///
/// Every recorded day must parse, not just today's; a malformed entry
/// anywhere makes the whole schedule an `InvalidScheduleFormat`.
///
/// # Evaluation order
/// 1. No hours today: look ahead up to a week for the next open day
/// 2. Before opening: not yet open, with minutes or the opening time
/// 3. Within hours: open, or closing soon inside the last hour
/// 4. After closing: past close
pub fn evaluate(schedule: &WeeklySchedule, now: NaiveDateTime) -> Result<PantryStatus, PantryError> {
    validate_schedule(schedule)?;

    let today = now.weekday();
    let now_minutes = now.hour() * 60 + now.minute();

    let hours = match schedule.hours_on(today) {
        Some(hours) if !hours.is_blank() => hours,
        entry => {
            let status = match next_open_day_offset(schedule, today) {
                // A blank entry means the pantry recorded "no hours" for today
                Some(_) if entry.is_some() => PantryStatus::ClosedToday {
                    reason: ClosedReason::NoHoursToday,
                },
                Some(offset) => PantryStatus::ClosedUntil {
                    next_open_day_offset: offset,
                },
                None => PantryStatus::PermanentlyClosed,
            };
            return Ok(status);
        }
    };

    let (open_minutes, close_minutes) = parse_day_hours(today, hours)?;

    if now_minutes < open_minutes {
        let until_open = open_minutes - now_minutes;
        let opens = if until_open <= SOON_THRESHOLD_MINUTES {
            OpeningTime::InMinutes(until_open)
        } else {
            OpeningTime::At(hours.open.trim().to_string())
        };
        return Ok(PantryStatus::ClosedToday {
            reason: ClosedReason::NotYetOpen { opens },
        });
    }

    if now_minutes < close_minutes {
        let until_close = close_minutes - now_minutes;
        if until_close <= SOON_THRESHOLD_MINUTES {
            return Ok(PantryStatus::ClosingSoon {
                closing_in_minutes: until_close,
            });
        }
        return Ok(PantryStatus::Open {
            closing_in_minutes: None,
        });
    }

    Ok(PantryStatus::ClosedToday {
        reason: ClosedReason::PastClose,
    })
}

/// Status of a pantry, degrading a malformed schedule to `PermanentlyClosed`
///
/// One bad record must not break a listing; the anomaly is logged instead.
pub fn status_or_closed(pantry: &Pantry, now: NaiveDateTime) -> PantryStatus {
    match evaluate(&pantry.schedule, now) {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!("Pantry {} has an invalid schedule, treating as closed: {}", pantry.id, e);
            PantryStatus::PermanentlyClosed
        }
    }
}

/// Check every non-blank day of a schedule parses and has open < close
pub fn validate_schedule(schedule: &WeeklySchedule) -> Result<(), PantryError> {
    for (day, hours) in schedule.entries() {
        if !hours.is_blank() {
            parse_day_hours(*day, hours)?;
        }
    }
    Ok(())
}

/// Parse an "HH:MM" time into minutes since midnight
pub fn parse_minutes(day: Weekday, value: &str) -> Result<u32, PantryError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map(|time| time.hour() * 60 + time.minute())
        .map_err(|_| PantryError::InvalidScheduleFormat {
            day: day.to_string(),
            value: value.to_string(),
        })
}

fn parse_day_hours(day: Weekday, hours: &DayHours) -> Result<(u32, u32), PantryError> {
    let open = parse_minutes(day, &hours.open)?;
    let close = parse_minutes(day, &hours.close)?;

    // Overnight intervals are not supported
    if open >= close {
        return Err(PantryError::InvalidScheduleFormat {
            day: day.to_string(),
            value: format!("{}-{}", hours.open, hours.close),
        });
    }

    Ok((open, close))
}

/// Offset in days (1..=7) of the next day with hours, if any
fn next_open_day_offset(schedule: &WeeklySchedule, today: Weekday) -> Option<u8> {
    let mut day = today;
    for offset in 1..=7u8 {
        day = day.succ();
        if schedule.has_hours_on(day) {
            return Some(offset);
        }
    }
    None
}
