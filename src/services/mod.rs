// Service exports
pub mod appwrite;
pub mod cache;
pub mod catalog;
pub mod repository;
pub mod reviews;

pub use appwrite::{AppwriteClient, AppwriteError};
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use catalog::{join_ratings, PantryCatalog};
pub use repository::{InMemoryPantryStore, PantrySource, RepositoryError};
pub use reviews::{ReviewStore, ReviewStoreError};
