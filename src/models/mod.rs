// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod status;

pub use domain::{Coordinate, DayHours, DietaryFlags, Freshness, Pantry, PantryFilter, Review, WeeklySchedule};
pub use requests::{ReviewPageQuery, SearchPantriesQuery, SubmitReviewRequest};
pub use responses::{ErrorResponse, HealthResponse, PantryStatusResponse, PantryView, SearchPantriesResponse, SubmitReviewResponse};
pub use status::{ClosedReason, OpeningTime, PantryStatus, StatusBadge};
