use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A record in one of the guarded collections (`products`,
/// `protected_data`). The payload is free-form JSON; this service imposes no
/// schema on it.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Resource {
    pub id: String,
    pub collection: String,
    pub owner_id: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
