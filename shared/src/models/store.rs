//! Store models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retail location that gets inspected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub name: String,
}
