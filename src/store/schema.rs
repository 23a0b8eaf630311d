use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::ledger::AttemptRecord;
use crate::engine::unlock::PracticeSet;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    #[serde(default)]
    pub unlocked: Vec<char>,
    #[serde(default)]
    pub last_practice_date: Option<String>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            unlocked: PracticeSet::new().included,
            last_practice_date: None,
        }
    }
}

impl ProfileData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttemptHistoryData {
    pub schema_version: u32,
    #[serde(default)]
    pub attempts: Vec<AttemptRecord>,
}

impl Default for AttemptHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            attempts: Vec::new(),
        }
    }
}

pub const EXPORT_VERSION: u32 = 1;

/// Export contract: attempt history is the sole source of truth for
/// per-character statistics, which are rebuilt from it on import/startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub dotdash_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub profile: ProfileData,
    pub history: AttemptHistoryData,
}
