// Core algorithm exports
pub mod clock;
pub mod distance;
pub mod error;
pub mod filters;
pub mod schedule;
pub mod search;

pub use clock::{Clock, FixedClock, SystemClock};
pub use distance::{distance_miles, haversine_distance, round_to_hundredths, DistanceTier};
pub use error::PantryError;
pub use filters::{apply_filters, matches_dietary, matches_filter, within_walking_distance};
pub use schedule::{evaluate, status_or_closed, validate_schedule};
pub use search::{search, RankedSearch, SearchOutcome};
