use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::core::{
    distance::distance_miles,
    filters::apply_filters,
    schedule::validate_schedule,
};
use crate::models::{Coordinate, Pantry, PantryFilter};

/// Result of a ranked search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub pantries: Vec<Pantry>,
    /// Matches before the limit was applied
    pub total_results: usize,
    pub total_candidates: usize,
    /// Candidates whose schedule could not be parsed and were treated as closed
    pub schedule_errors: usize,
}

/// Search orchestrator - distance annotation, filtering and ranking
///
/// # Pipeline Stages
/// 1. Annotate copies of the candidates with distance from the user
/// 2. Apply the filter
/// 3. Stable sort by distance, pantries without a distance last
/// 4. Truncate to the optional limit
#[derive(Debug, Clone, Copy, Default)]
pub struct RankedSearch {
    limit: Option<usize>,
}

impl RankedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Run the full pipeline over a snapshot of pantries
    ///
    /// # Arguments
    /// * `pantries` - Candidate pantries; never mutated
    /// * `user_location` - Optional user position
    /// * `filter` - Validated filter
    /// * `now` - Current time in the pantries' local time
    pub fn run(
        &self,
        pantries: &[Pantry],
        user_location: Option<Coordinate>,
        filter: &PantryFilter,
        now: NaiveDateTime,
    ) -> SearchOutcome {
        let total_candidates = pantries.len();

        let schedule_errors = pantries
            .iter()
            .filter(|pantry| validate_schedule(&pantry.schedule).is_err())
            .count();

        let annotated = annotate_distances(pantries, user_location);
        let mut matches = apply_filters(annotated, filter, now);
        sort_by_distance(&mut matches);

        let total_results = matches.len();
        if let Some(limit) = self.limit {
            matches.truncate(limit);
        }

        tracing::debug!(
            "Search matched {} of {} pantries ({} with invalid schedules)",
            total_results,
            total_candidates,
            schedule_errors
        );

        SearchOutcome {
            pantries: matches,
            total_results,
            total_candidates,
            schedule_errors,
        }
    }
}

/// Filter and rank pantries for a user
pub fn search(
    pantries: &[Pantry],
    user_location: Option<Coordinate>,
    filter: &PantryFilter,
    now: NaiveDateTime,
) -> Vec<Pantry> {
    RankedSearch::new()
        .run(pantries, user_location, filter, now)
        .pantries
}

/// Copy the pantries, attaching the rounded distance when a location is known
pub fn annotate_distances(pantries: &[Pantry], user_location: Option<Coordinate>) -> Vec<Pantry> {
    pantries
        .iter()
        .map(|pantry| {
            let mut annotated = pantry.clone();
            annotated.distance = user_location.map(|location| distance_miles(&location, &pantry.coordinate));
            annotated
        })
        .collect()
}

/// Stable ascending sort by distance; missing distances sort last
pub fn sort_by_distance(pantries: &mut [Pantry]) {
    pantries.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeeklySchedule;
    use chrono::{NaiveDate, Weekday};

    fn monday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn create_pantry(id: &str, lat: f64, lon: f64) -> Pantry {
        let mut pantry = Pantry::new(
            id,
            format!("Pantry {}", id),
            Coordinate { latitude: lat, longitude: lon },
        );
        pantry.schedule = WeeklySchedule::new().with_day(Weekday::Mon, "09:00", "17:00");
        pantry
    }

    fn user() -> Coordinate {
        Coordinate { latitude: 37.7749, longitude: -122.4194 }
    }

    #[test]
    fn test_sorted_by_distance() {
        let pantries = vec![
            create_pantry("far", 37.80, -122.27),
            create_pantry("near", 37.775, -122.419),
            create_pantry("mid", 37.76, -122.45),
        ];

        let result = search(&pantries, Some(user()), &PantryFilter::default(), monday_noon());
        let ids: Vec<_> = result.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert!(result.iter().all(|p| p.distance.is_some()));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let pantries = vec![create_pantry("1", 37.775, -122.419)];
        let _ = search(&pantries, Some(user()), &PantryFilter::default(), monday_noon());

        assert_eq!(pantries[0].distance, None);
    }

    #[test]
    fn test_missing_distance_sorts_last_and_stable() {
        let mut a = create_pantry("a", 0.0, 0.0);
        let mut b = create_pantry("b", 0.0, 0.0);
        let mut c = create_pantry("c", 0.0, 0.0);
        let mut d = create_pantry("d", 0.0, 0.0);
        a.distance = None;
        b.distance = Some(2.0);
        c.distance = None;
        d.distance = Some(2.0);

        let mut pantries = vec![a, b, c, d];
        sort_by_distance(&mut pantries);
        let ids: Vec<_> = pantries.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_respects_limit() {
        let pantries: Vec<Pantry> = (0..20)
            .map(|i| create_pantry(&i.to_string(), 37.77 + i as f64 * 0.001, -122.42))
            .collect();

        let outcome = RankedSearch::new()
            .with_limit(5)
            .run(&pantries, Some(user()), &PantryFilter::default(), monday_noon());

        assert_eq!(outcome.pantries.len(), 5);
        assert_eq!(outcome.total_results, 20);
        assert_eq!(outcome.total_candidates, 20);
    }

    #[test]
    fn test_counts_schedule_errors() {
        let mut broken = create_pantry("broken", 37.775, -122.419);
        broken.schedule = WeeklySchedule::new().with_day(Weekday::Mon, "25:00", "26:00");
        let pantries = vec![broken, create_pantry("ok", 37.776, -122.419)];

        let filter = PantryFilter {
            is_open: Some(true),
            ..Default::default()
        };
        let outcome = RankedSearch::new().run(&pantries, Some(user()), &filter, monday_noon());

        assert_eq!(outcome.schedule_errors, 1);
        assert_eq!(outcome.pantries.len(), 1);
        assert_eq!(outcome.pantries[0].id, "ok");
    }
}
