use std::collections::{BTreeSet, HashMap};

use chrono::Weekday;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::core::error::PantryError;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid lat/lon ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PantryError> {
        let coordinate = Self { latitude, longitude };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(PantryError::InvalidCoordinate { latitude, longitude })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Opening interval for a single day, as "HH:MM" strings in local time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(default)]
    pub open: String,
    #[serde(default)]
    pub close: String,
}

impl DayHours {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// A recorded day with both fields left empty ("no hours" day)
    pub fn is_blank(&self) -> bool {
        self.open.trim().is_empty() && self.close.trim().is_empty()
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Weekly opening hours keyed by day of week. Days without an entry are closed.
///
/// Serialized as a map in Monday-to-Sunday order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: HashMap<Weekday, DayHours>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper used by seeders and tests
    pub fn with_day(mut self, day: Weekday, open: &str, close: &str) -> Self {
        self.set(day, DayHours::new(open, close));
        self
    }

    pub fn set(&mut self, day: Weekday, hours: DayHours) {
        self.days.insert(day, hours);
    }

    pub fn remove(&mut self, day: Weekday) -> Option<DayHours> {
        self.days.remove(&day)
    }

    /// Raw entry for a day, including blank entries
    pub fn hours_on(&self, day: Weekday) -> Option<&DayHours> {
        self.days.get(&day)
    }

    /// Whether the day has a non-blank opening interval
    pub fn has_hours_on(&self, day: Weekday) -> bool {
        self.hours_on(day).is_some_and(|hours| !hours.is_blank())
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Recorded days, Monday first
    pub fn entries(&self) -> impl Iterator<Item = (&Weekday, &DayHours)> {
        WEEK.iter()
            .filter_map(move |day| self.days.get(day).map(|hours| (day, hours)))
    }
}

impl Serialize for WeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, hours) in self.entries() {
            map.serialize_entry(day, hours)?;
        }
        map.end()
    }
}

/// Dietary attributes. `None` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryFlags {
    #[serde(default)]
    pub vegetarian: Option<bool>,
    #[serde(default)]
    pub vegan: Option<bool>,
    #[serde(default)]
    pub gluten_free: Option<bool>,
    #[serde(default)]
    pub dairy_free: Option<bool>,
}

impl DietaryFlags {
    /// True when no flag is requested
    pub fn is_empty(&self) -> bool {
        self.vegetarian.is_none()
            && self.vegan.is_none()
            && self.gluten_free.is_none()
            && self.dairy_free.is_none()
    }
}

/// How recently a pantry's stock was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Fresh,
    Recent,
}

impl Freshness {
    /// Whether stock of this freshness meets the requested level
    pub fn satisfies(self, required: Freshness) -> bool {
        match required {
            Freshness::Fresh => self == Freshness::Fresh,
            Freshness::Recent => true,
        }
    }
}

/// A food-distribution location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pantry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default)]
    pub schedule: WeeklySchedule,
    #[serde(default)]
    pub offers_delivery: bool,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub preparation: BTreeSet<String>,
    #[serde(default)]
    pub freshness: Option<Freshness>,
    #[serde(default)]
    pub dietary: DietaryFlags,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Static walking distance recorded on the pantry, independent of the query
    #[serde(default)]
    pub walking_distance: Option<f64>,
    /// Miles from the querying user, computed per search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Pantry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            coordinate,
            schedule: WeeklySchedule::default(),
            offers_delivery: false,
            categories: BTreeSet::new(),
            preparation: BTreeSet::new(),
            freshness: None,
            dietary: DietaryFlags::default(),
            rating: None,
            walking_distance: None,
            distance: None,
        }
    }
}

/// Per-query filter. Every `None` field leaves that axis unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryFilter {
    pub is_open: Option<bool>,
    pub max_distance_miles: Option<f64>,
    pub walking_distance_only: Option<bool>,
    pub offers_delivery: Option<bool>,
    pub min_rating: Option<f64>,
    pub categories: Option<BTreeSet<String>>,
    pub dietary: Option<DietaryFlags>,
    pub preparation_required: Option<BTreeSet<String>>,
    pub freshness: Option<Freshness>,
}

impl PantryFilter {
    /// Reject values the filter engine does not accept
    pub fn validate(&self) -> Result<(), PantryError> {
        if let Some(max) = self.max_distance_miles {
            if !max.is_finite() || max < 0.0 {
                return Err(PantryError::filter(
                    "maxDistanceMiles",
                    format!("must be a non-negative number, got {}", max),
                ));
            }
        }

        if let Some(min) = self.min_rating {
            if !min.is_finite() || !(0.0..=5.0).contains(&min) {
                return Err(PantryError::filter(
                    "minRating",
                    format!("must be between 0 and 5, got {}", min),
                ));
            }
        }

        Ok(())
    }
}

/// Stored pantry review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: uuid::Uuid,
    pub pantry_id: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(37.7749, -122.4194).is_ok());
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_filter_validation() {
        let filter = PantryFilter {
            max_distance_miles: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            filter.validate(),
            Err(PantryError::InvalidFilterValue { field: "maxDistanceMiles", .. })
        ));

        let filter = PantryFilter {
            min_rating: Some(6.0),
            ..Default::default()
        };
        assert!(filter.validate().is_err());

        assert!(PantryFilter::default().validate().is_ok());
    }

    #[test]
    fn test_freshness_levels() {
        assert!(Freshness::Fresh.satisfies(Freshness::Recent));
        assert!(Freshness::Recent.satisfies(Freshness::Recent));
        assert!(!Freshness::Recent.satisfies(Freshness::Fresh));
    }

    #[test]
    fn test_pantry_deserializes_from_record() {
        let json = r#"{
            "id": "p1",
            "name": "Mission Pantry",
            "latitude": 37.76,
            "longitude": -122.42,
            "schedule": {"monday": {"open": "09:00", "close": "17:00"}},
            "offersDelivery": true,
            "categories": ["Produce"],
            "dietary": {"vegetarian": true},
            "walkingDistance": 0.4
        }"#;

        let pantry: Pantry = serde_json::from_str(json).unwrap();

        assert_eq!(pantry.id, "p1");
        assert!(pantry.offers_delivery);
        assert!(pantry.schedule.has_hours_on(Weekday::Mon));
        assert!(!pantry.schedule.has_hours_on(Weekday::Tue));
        assert_eq!(pantry.dietary.vegetarian, Some(true));
        assert_eq!(pantry.dietary.vegan, None);
        assert_eq!(pantry.walking_distance, Some(0.4));
        assert_eq!(pantry.distance, None);
    }

    #[test]
    fn test_schedule_serializes_in_week_order() {
        let schedule = WeeklySchedule::new()
            .with_day(Weekday::Sun, "12:00", "16:00")
            .with_day(Weekday::Wed, "10:00", "14:00")
            .with_day(Weekday::Mon, "09:00", "17:00");

        let json = serde_json::to_string(&schedule).unwrap();
        let mon = json.find("\"Mon\"").unwrap();
        let wed = json.find("\"Wed\"").unwrap();
        let sun = json.find("\"Sun\"").unwrap();
        assert!(mon < wed && wed < sun, "{}", json);

        let days: Vec<_> = schedule.entries().map(|(day, _)| *day).collect();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]);

        let back: WeeklySchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schedule);
    }

    #[test]
    fn test_blank_day_hours() {
        assert!(DayHours::new("", " ").is_blank());
        assert!(!DayHours::new("09:00", "").is_blank());
    }
}
