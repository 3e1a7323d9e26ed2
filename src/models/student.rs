//! Student snapshot embedded in loan records

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Student as embedded in a loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(from = "StudentWire")]
pub struct StudentSnapshot {
    pub id: i32,
    /// Full name as a single string (first names, then family name)
    pub full_name: String,
    pub grade: Option<String>,
    pub major: Option<String>,
}

/// Store payload; older stores only send split name fields
#[derive(Deserialize)]
struct StudentWire {
    id: i32,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    grade: Option<String>,
    #[serde(default)]
    major: Option<String>,
}

impl From<StudentWire> for StudentSnapshot {
    fn from(wire: StudentWire) -> Self {
        let full_name = match wire.full_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => [wire.first_name, wire.last_name]
                .into_iter()
                .flatten()
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        };

        Self {
            id: wire.id,
            full_name,
            grade: wire.grade,
            major: wire.major,
        }
    }
}
