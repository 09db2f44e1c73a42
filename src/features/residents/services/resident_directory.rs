use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;

/// Resident records live in another system; tickets only keep the id
#[async_trait]
pub trait ResidentDirectory: Send + Sync {
    /// `None` when no resident matches `search_term`
    async fn resolve(&self, search_term: &str) -> Result<Option<Uuid>>;
}
