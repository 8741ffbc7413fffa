use crate::models::Pantry;
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::repository::{PantrySource, RepositoryError};
use crate::services::reviews::ReviewStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Pantry snapshot provider for the HTTP layer
///
/// Combines the record source with review ratings and caches the joined
/// result. Review and cache failures degrade to uncached, record-only data.
pub struct PantryCatalog {
    source: PantrySource,
    reviews: Option<Arc<ReviewStore>>,
    cache: Arc<CacheManager>,
}

impl PantryCatalog {
    pub fn new(source: PantrySource, reviews: Option<Arc<ReviewStore>>, cache: Arc<CacheManager>) -> Self {
        Self {
            source,
            reviews,
            cache,
        }
    }

    pub fn reviews(&self) -> Option<&ReviewStore> {
        self.reviews.as_deref()
    }

    pub fn backend_name(&self) -> &'static str {
        self.source.backend_name()
    }

    /// All pantries with ratings joined
    pub async fn snapshot(&self) -> Result<Vec<Pantry>, RepositoryError> {
        let key = CacheKey::pantries();
        match self.cache.get::<Vec<Pantry>>(&key).await {
            Ok(pantries) => return Ok(pantries),
            Err(crate::services::CacheError::CacheMiss(_)) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }

        let mut pantries = self.source.list_pantries().await?;

        if let Some(reviews) = &self.reviews {
            match reviews.average_ratings().await {
                Ok(ratings) => join_ratings(&mut pantries, &ratings),
                Err(e) => tracing::warn!("Failed to load ratings, using record ratings: {}", e),
            }
        }

        if let Err(e) = self.cache.set(&key, &pantries).await {
            tracing::warn!("Failed to cache pantry snapshot: {}", e);
        }

        Ok(pantries)
    }

    /// One pantry with its rating joined
    pub async fn pantry(&self, pantry_id: &str) -> Result<Option<Pantry>, RepositoryError> {
        let key = CacheKey::pantry(pantry_id);
        if let Ok(pantry) = self.cache.get::<Pantry>(&key).await {
            return Ok(Some(pantry));
        }

        let Some(mut pantry) = self.source.get_pantry(pantry_id).await? else {
            return Ok(None);
        };

        if let Some(reviews) = &self.reviews {
            match reviews.rating_for(pantry_id).await {
                Ok(Some(rating)) => pantry.rating = Some(rating),
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to load rating for {}: {}", pantry_id, e),
            }
        }

        if let Err(e) = self.cache.set(&key, &pantry).await {
            tracing::warn!("Failed to cache pantry {}: {}", pantry_id, e);
        }

        Ok(Some(pantry))
    }

    /// Drop cached data touching a pantry
    pub async fn invalidate(&self, pantry_id: &str) {
        for key in [CacheKey::pantries(), CacheKey::pantry(pantry_id)] {
            if let Err(e) = self.cache.delete(&key).await {
                tracing::warn!("Failed to invalidate cache key {}: {}", key, e);
            }
        }
    }
}

/// Overwrite record ratings with review averages where reviews exist
pub fn join_ratings(pantries: &mut [Pantry], ratings: &HashMap<String, f64>) {
    for pantry in pantries.iter_mut() {
        if let Some(rating) = ratings.get(&pantry.id) {
            pantry.rating = Some(rating.clamp(0.0, 5.0));
        }
    }
}
