use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::{distance::DistanceTier, error::PantryError};
use crate::models::domain::{Coordinate, DietaryFlags, Freshness, PantryFilter};

/// Query string of the pantry search endpoint
///
/// Set-valued axes (`categories`, `preparation`) are comma separated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchPantriesQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub is_open: Option<bool>,
    #[validate(range(min = 0.0))]
    pub max_distance_miles: Option<f64>,
    pub distance_tier: Option<DistanceTier>,
    pub walking_distance_only: Option<bool>,
    pub offers_delivery: Option<bool>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub min_rating: Option<f64>,
    pub categories: Option<String>,
    pub preparation: Option<String>,
    pub vegetarian: Option<bool>,
    pub vegan: Option<bool>,
    pub gluten_free: Option<bool>,
    pub dairy_free: Option<bool>,
    pub freshness: Option<Freshness>,
    /// Evaluate opening hours at this local time instead of the clock
    pub at: Option<NaiveDateTime>,
    #[validate(range(min = 1))]
    pub limit: Option<usize>,
}

impl SearchPantriesQuery {
    /// User location, requiring `lat` and `lng` together
    pub fn user_location(&self) -> Result<Option<Coordinate>, PantryError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).map(Some),
            (None, None) => Ok(None),
            _ => Err(PantryError::filter("lat/lng", "must be provided together")),
        }
    }

    /// Build and validate the filter described by the query
    pub fn to_filter(&self) -> Result<PantryFilter, PantryError> {
        // A tier narrows an explicit distance, never widens it
        let max_distance_miles = match (self.max_distance_miles, self.distance_tier) {
            (Some(max), Some(tier)) => Some(max.min(tier.max_miles())),
            (Some(max), None) => Some(max),
            (None, Some(tier)) => Some(tier.max_miles()),
            (None, None) => None,
        };

        let dietary = DietaryFlags {
            vegetarian: self.vegetarian,
            vegan: self.vegan,
            gluten_free: self.gluten_free,
            dairy_free: self.dairy_free,
        };

        let filter = PantryFilter {
            is_open: self.is_open,
            max_distance_miles,
            walking_distance_only: self.walking_distance_only,
            offers_delivery: self.offers_delivery,
            min_rating: self.min_rating,
            categories: self.categories.as_deref().and_then(split_tags),
            dietary: (!dietary.is_empty()).then_some(dietary),
            preparation_required: self.preparation.as_deref().and_then(split_tags),
            freshness: self.freshness,
        };

        filter.validate()?;
        Ok(filter)
    }
}

fn split_tags(raw: &str) -> Option<BTreeSet<String>> {
    let tags: BTreeSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();

    (!tags.is_empty()).then_some(tags)
}

/// Request to submit a pantry review
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub comment: Option<String>,
}

/// Pagination for review listings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewPageQuery {
    #[serde(default = "default_page_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u16,
    #[serde(default)]
    pub offset: u32,
}

fn default_page_limit() -> u16 {
    20
}
