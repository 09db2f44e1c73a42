use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ResolveResidentQuery {
    /// Name, household number or any term the directory understands
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResidentLookupDto {
    pub search_term: String,
    /// Null when no resident matched
    pub resident_id: Option<Uuid>,
}
