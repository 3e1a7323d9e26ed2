//! Book and category snapshots embedded in loan records

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Book category (static reference data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Book as embedded in a loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSnapshot {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub category: Option<Category>,
}
