//! Query DTOs - Data Transfer Objects per query parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DTO per la paginazione della history delle interazioni
#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryQuery {
    #[serde(default)]
    pub before_date: Option<DateTime<Utc>>,
}
