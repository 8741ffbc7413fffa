use serde::{Deserialize, Serialize};

/// Real-time opening status derived from a weekly schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PantryStatus {
    #[serde(rename_all = "camelCase")]
    Open { closing_in_minutes: Option<u32> },
    #[serde(rename_all = "camelCase")]
    ClosingSoon { closing_in_minutes: u32 },
    ClosedToday { reason: ClosedReason },
    #[serde(rename_all = "camelCase")]
    ClosedUntil { next_open_day_offset: u8 },
    PermanentlyClosed,
}

/// Why a pantry with a schedule entry today is currently closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClosedReason {
    NoHoursToday,
    NotYetOpen { opens: OpeningTime },
    PastClose,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpeningTime {
    #[serde(rename = "opensInMinutes")]
    InMinutes(u32),
    #[serde(rename = "opensAt")]
    At(String),
}

/// Coarse status used for badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusBadge {
    Open,
    ClosingSoon,
    Closed,
}

impl PantryStatus {
    /// Open or closing soon
    pub fn is_open(&self) -> bool {
        matches!(self, PantryStatus::Open { .. } | PantryStatus::ClosingSoon { .. })
    }

    pub fn badge(&self) -> StatusBadge {
        match self {
            PantryStatus::Open { .. } => StatusBadge::Open,
            PantryStatus::ClosingSoon { .. } => StatusBadge::ClosingSoon,
            _ => StatusBadge::Closed,
        }
    }

    /// Human-readable status line
    pub fn status_text(&self) -> String {
        match self {
            PantryStatus::Open { closing_in_minutes: None } => "Open now".to_string(),
            PantryStatus::Open { closing_in_minutes: Some(minutes) } => {
                format!("Open now, closes in {}", format_minutes(*minutes))
            }
            PantryStatus::ClosingSoon { closing_in_minutes } => {
                format!("Closing soon, closes in {}", format_minutes(*closing_in_minutes))
            }
            PantryStatus::ClosedToday { reason } => match reason {
                ClosedReason::NoHoursToday => "Closed today".to_string(),
                ClosedReason::NotYetOpen { opens: OpeningTime::InMinutes(minutes) } => {
                    format!("Opens in {}", format_minutes(*minutes))
                }
                ClosedReason::NotYetOpen { opens: OpeningTime::At(time) } => {
                    format!("Opens today at {}", time)
                }
                ClosedReason::PastClose => "Closed for today".to_string(),
            },
            PantryStatus::ClosedUntil { next_open_day_offset: 1 } => "Opens tomorrow".to_string(),
            PantryStatus::ClosedUntil { next_open_day_offset } => {
                format!("Opens in {} days", next_open_day_offset)
            }
            PantryStatus::PermanentlyClosed => "Closed".to_string(),
        }
    }
}

fn format_minutes(minutes: u32) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else if minutes < 60 {
        format!("{} minutes", minutes)
    } else if minutes % 60 == 0 {
        let hours = minutes / 60;
        if hours == 1 {
            "1 hour".to_string()
        } else {
            format!("{} hours", hours)
        }
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}
