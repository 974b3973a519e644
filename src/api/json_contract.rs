use serde::{Deserialize, Serialize};

use crate::core::position::Breakpoint;
use crate::core::region::ScrollMode;
use crate::error::{SoflanError, SoflanResult};

pub const TIMELINE_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Diagnostic view of one cached position list, for dumping and diffing
/// timeline state outside the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub mode: ScrollMode,
    pub rebuilds: u64,
    pub breakpoints: Vec<Breakpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: TimelineSnapshot,
}

impl TimelineSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> SoflanResult<String> {
        let payload = TimelineSnapshotJsonContractV1 {
            schema_version: TIMELINE_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            SoflanError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Parses either a bare snapshot or a v1 contract payload.
    pub fn from_json_compat_str(input: &str) -> SoflanResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<Self>(input) {
            return Ok(snapshot);
        }
        let payload: TimelineSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            SoflanError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        Ok(payload.snapshot)
    }
}
