use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::core::distance::WALKING_DISTANCE_MILES;
use crate::core::schedule::status_or_closed;
use crate::models::{DietaryFlags, Pantry, PantryFilter};

/// Check whether a pantry satisfies every constraint of the filter
///
/// Axes are combined with AND. Cheap attribute checks run first; the
/// schedule is only evaluated when `isOpen` is requested.
#[inline]
pub fn matches_filter(pantry: &Pantry, filter: &PantryFilter, now: NaiveDateTime) -> bool {
    if filter.offers_delivery == Some(true) && !pantry.offers_delivery {
        return false;
    }

    if let Some(max) = filter.max_distance_miles {
        // Fail closed: without a user location there is nothing to compare
        match pantry.distance {
            Some(distance) if distance <= max => {}
            _ => return false,
        }
    }

    if filter.walking_distance_only == Some(true) && !within_walking_distance(pantry) {
        return false;
    }

    if let Some(min) = filter.min_rating {
        match pantry.rating {
            Some(rating) if rating >= min => {}
            _ => return false,
        }
    }

    if let Some(categories) = &filter.categories {
        if !intersects(&pantry.categories, categories) {
            return false;
        }
    }

    if let Some(preparation) = &filter.preparation_required {
        if !intersects(&pantry.preparation, preparation) {
            return false;
        }
    }

    if let Some(dietary) = &filter.dietary {
        if !matches_dietary(&pantry.dietary, dietary) {
            return false;
        }
    }

    if let Some(required) = filter.freshness {
        match pantry.freshness {
            Some(freshness) if freshness.satisfies(required) => {}
            _ => return false,
        }
    }

    if filter.is_open == Some(true) && !status_or_closed(pantry, now).is_open() {
        return false;
    }

    true
}

/// Keep the pantries matching the filter, preserving input order
pub fn apply_filters(pantries: Vec<Pantry>, filter: &PantryFilter, now: NaiveDateTime) -> Vec<Pantry> {
    pantries
        .into_iter()
        .filter(|pantry| matches_filter(pantry, filter, now))
        .collect()
}

/// Within a mile by computed distance or by the pantry's own walking distance
#[inline]
pub fn within_walking_distance(pantry: &Pantry) -> bool {
    let by_distance = pantry.distance.is_some_and(|d| d <= WALKING_DISTANCE_MILES);
    let by_attribute = pantry.walking_distance.is_some_and(|d| d <= WALKING_DISTANCE_MILES);
    by_distance || by_attribute
}

/// Every flag requested as `true` must be explicitly `true` on the pantry
#[inline]
pub fn matches_dietary(pantry: &DietaryFlags, requested: &DietaryFlags) -> bool {
    let pairs = [
        (requested.vegetarian, pantry.vegetarian),
        (requested.vegan, pantry.vegan),
        (requested.gluten_free, pantry.gluten_free),
        (requested.dairy_free, pantry.dairy_free),
    ];

    pairs
        .iter()
        .all(|(wanted, offered)| *wanted != Some(true) || *offered == Some(true))
}

/// Any-of match between tag sets, ignoring ASCII case. An empty request matches.
fn intersects(tags: &BTreeSet<String>, requested: &BTreeSet<String>) -> bool {
    if requested.is_empty() {
        return true;
    }

    requested
        .iter()
        .any(|wanted| tags.iter().any(|tag| tag.eq_ignore_ascii_case(wanted)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Freshness, WeeklySchedule};
    use chrono::{NaiveDate, Weekday};

    fn monday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn create_test_pantry(distance: Option<f64>) -> Pantry {
        let mut pantry = Pantry::new(
            "p1",
            "Test Pantry",
            Coordinate { latitude: 37.77, longitude: -122.42 },
        );
        pantry.schedule = WeeklySchedule::new().with_day(Weekday::Mon, "09:00", "17:00");
        pantry.categories = tags(&["Produce", "Bread"]);
        pantry.distance = distance;
        pantry
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let pantry = create_test_pantry(None);
        assert!(matches_filter(&pantry, &PantryFilter::default(), monday_noon()));
    }

    #[test]
    fn test_max_distance_fails_closed() {
        let filter = PantryFilter {
            max_distance_miles: Some(5.0),
            ..Default::default()
        };

        assert!(matches_filter(&create_test_pantry(Some(5.0)), &filter, monday_noon()));
        assert!(!matches_filter(&create_test_pantry(Some(5.01)), &filter, monday_noon()));
        assert!(!matches_filter(&create_test_pantry(None), &filter, monday_noon()));
    }

    #[test]
    fn test_walking_distance_uses_either_source() {
        let filter = PantryFilter {
            walking_distance_only: Some(true),
            ..Default::default()
        };

        assert!(matches_filter(&create_test_pantry(Some(0.8)), &filter, monday_noon()));
        assert!(!matches_filter(&create_test_pantry(Some(1.5)), &filter, monday_noon()));

        let mut pantry = create_test_pantry(None);
        pantry.walking_distance = Some(0.5);
        assert!(matches_filter(&pantry, &filter, monday_noon()));
    }

    #[test]
    fn test_categories_any_of() {
        let filter = PantryFilter {
            categories: Some(tags(&["produce", "Dairy"])),
            ..Default::default()
        };
        assert!(matches_filter(&create_test_pantry(None), &filter, monday_noon()));

        let mut meat_only = create_test_pantry(None);
        meat_only.categories = tags(&["Meat"]);
        assert!(!matches_filter(&meat_only, &filter, monday_noon()));
    }

    #[test]
    fn test_dietary_all_of() {
        let requested = DietaryFlags {
            vegetarian: Some(true),
            gluten_free: Some(true),
            ..Default::default()
        };

        let offered = DietaryFlags {
            vegetarian: Some(true),
            gluten_free: Some(true),
            vegan: Some(false),
            ..Default::default()
        };
        assert!(matches_dietary(&offered, &requested));

        let partial = DietaryFlags {
            vegetarian: Some(true),
            ..Default::default()
        };
        assert!(!matches_dietary(&partial, &requested));

        // Requesting `false` is not a constraint
        let not_vegan = DietaryFlags {
            vegan: Some(false),
            ..Default::default()
        };
        assert!(matches_dietary(&DietaryFlags::default(), &not_vegan));
    }

    #[test]
    fn test_rating_requires_value() {
        let filter = PantryFilter {
            min_rating: Some(4.0),
            ..Default::default()
        };

        let mut pantry = create_test_pantry(None);
        assert!(!matches_filter(&pantry, &filter, monday_noon()));

        pantry.rating = Some(4.5);
        assert!(matches_filter(&pantry, &filter, monday_noon()));

        pantry.rating = Some(3.9);
        assert!(!matches_filter(&pantry, &filter, monday_noon()));
    }

    #[test]
    fn test_open_now() {
        let filter = PantryFilter {
            is_open: Some(true),
            ..Default::default()
        };
        let pantry = create_test_pantry(None);

        assert!(matches_filter(&pantry, &filter, monday_noon()));

        let tuesday = monday_noon() + chrono::Duration::days(1);
        assert!(!matches_filter(&pantry, &filter, tuesday));

        // `isOpen: false` does not restrict
        let filter = PantryFilter {
            is_open: Some(false),
            ..Default::default()
        };
        assert!(matches_filter(&pantry, &filter, tuesday));
    }

    #[test]
    fn test_delivery_and_freshness() {
        let mut pantry = create_test_pantry(None);
        let delivery = PantryFilter {
            offers_delivery: Some(true),
            ..Default::default()
        };
        assert!(!matches_filter(&pantry, &delivery, monday_noon()));
        pantry.offers_delivery = true;
        assert!(matches_filter(&pantry, &delivery, monday_noon()));

        let fresh = PantryFilter {
            freshness: Some(Freshness::Fresh),
            ..Default::default()
        };
        assert!(!matches_filter(&pantry, &fresh, monday_noon()));
        pantry.freshness = Some(Freshness::Recent);
        assert!(!matches_filter(&pantry, &fresh, monday_noon()));
        pantry.freshness = Some(Freshness::Fresh);
        assert!(matches_filter(&pantry, &fresh, monday_noon()));
    }

    #[test]
    fn test_preparation_any_of() {
        let mut pantry = create_test_pantry(None);
        pantry.preparation = tags(&["ready-to-eat"]);

        let filter = PantryFilter {
            preparation_required: Some(tags(&["ready-to-eat", "microwave"])),
            ..Default::default()
        };
        assert!(matches_filter(&pantry, &filter, monday_noon()));

        pantry.preparation = tags(&["requires-cooking"]);
        assert!(!matches_filter(&pantry, &filter, monday_noon()));
    }
}
