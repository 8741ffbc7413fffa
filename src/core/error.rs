use thiserror::Error;

/// Errors raised by the discovery core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PantryError {
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid schedule format on {day}: {value:?}")]
    InvalidScheduleFormat { day: String, value: String },

    #[error("Invalid filter value for {field}: {reason}")]
    InvalidFilterValue { field: &'static str, reason: String },
}

impl PantryError {
    pub(crate) fn filter(field: &'static str, reason: impl Into<String>) -> Self {
        PantryError::InvalidFilterValue {
            field,
            reason: reason.into(),
        }
    }
}
