use crate::models::Pantry;
use crate::services::appwrite::{AppwriteClient, AppwriteError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when loading pantry records
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Appwrite error: {0}")]
    Appwrite(#[from] AppwriteError),

    #[error("Failed to read seed file {path}: {source}")]
    SeedIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid seed data: {0}")]
    SeedFormat(#[from] serde_json::Error),
}

/// Pantry records held in memory, in insertion order
#[derive(Default)]
pub struct InMemoryPantryStore {
    pantries: RwLock<Vec<Pantry>>,
}

impl InMemoryPantryStore {
    pub fn new(pantries: Vec<Pantry>) -> Self {
        Self {
            pantries: RwLock::new(pantries),
        }
    }

    /// Load a JSON array of pantry records
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RepositoryError::SeedIo {
            path: path.to_path_buf(),
            source,
        })?;
        let pantries: Vec<Pantry> = serde_json::from_str(&raw)?;

        tracing::info!("Loaded {} pantries from {}", pantries.len(), path.display());

        Ok(Self::new(pantries))
    }

    pub async fn list(&self) -> Vec<Pantry> {
        self.pantries.read().await.clone()
    }

    pub async fn get(&self, pantry_id: &str) -> Option<Pantry> {
        self.pantries
            .read()
            .await
            .iter()
            .find(|pantry| pantry.id == pantry_id)
            .cloned()
    }

    /// Insert a pantry, replacing any record with the same id in place
    pub async fn upsert(&self, pantry: Pantry) {
        let mut pantries = self.pantries.write().await;
        match pantries.iter_mut().find(|existing| existing.id == pantry.id) {
            Some(existing) => *existing = pantry,
            None => pantries.push(pantry),
        }
    }
}

/// Where pantry records come from
pub enum PantrySource {
    Appwrite(AppwriteClient),
    InMemory(InMemoryPantryStore),
}

impl PantrySource {
    /// List every pantry record
    pub async fn list_pantries(&self) -> Result<Vec<Pantry>, RepositoryError> {
        match self {
            PantrySource::Appwrite(client) => Ok(client.list_pantries().await?),
            PantrySource::InMemory(store) => Ok(store.list().await),
        }
    }

    /// Get one pantry by id
    pub async fn get_pantry(&self, pantry_id: &str) -> Result<Option<Pantry>, RepositoryError> {
        match self {
            PantrySource::Appwrite(client) => Ok(client.get_pantry(pantry_id).await?),
            PantrySource::InMemory(store) => Ok(store.get(pantry_id).await),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            PantrySource::Appwrite(_) => "appwrite",
            PantrySource::InMemory(_) => "memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn pantry(id: &str, name: &str) -> Pantry {
        Pantry::new(id, name, Coordinate { latitude: 0.0, longitude: 0.0 })
    }

    #[test]
    fn test_upsert_keeps_order() {
        tokio_test::block_on(async {
            let store = InMemoryPantryStore::new(vec![pantry("a", "A"), pantry("b", "B")]);

            store.upsert(pantry("a", "A renamed")).await;
            store.upsert(pantry("c", "C")).await;

            let names: Vec<_> = store.list().await.into_iter().map(|p| p.name).collect();
            assert_eq!(names, vec!["A renamed", "B", "C"]);
        });
    }

    #[test]
    fn test_source_get_missing() {
        tokio_test::block_on(async {
            let source = PantrySource::InMemory(InMemoryPantryStore::new(vec![pantry("a", "A")]));

            assert!(source.get_pantry("a").await.unwrap().is_some());
            assert!(source.get_pantry("zzz").await.unwrap().is_none());
            assert_eq!(source.backend_name(), "memory");
        });
    }

    #[test]
    fn test_missing_seed_file() {
        let result = InMemoryPantryStore::from_json_file("does/not/exist.json");
        assert!(matches!(result, Err(RepositoryError::SeedIo { .. })));
    }
}
