//! Store types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing record for a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

impl StoredObject {
    /// Age of the object relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_modified
    }
}
