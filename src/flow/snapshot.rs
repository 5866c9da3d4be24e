use crate::error::SnapshotError;
use crate::runner::RunState;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

const SNAPSHOT_VERSION: u32 = 1;

/// A persisted run, tagged with the flow it belongs to.
///
/// Suspended runs are stored between replies; restoring a snapshot and calling
/// `FlowRunner::resume` continues the conversation as if the process never stopped.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub version: u32,
    pub flow_id: Option<String>,
    pub state: RunState,
}

impl RunSnapshot {
    pub fn new(flow_id: Option<String>, state: RunState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            flow_id,
            state,
        }
    }

    /// Serializes the snapshot into the bincode format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_to_vec(self, standard()).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Deserializes a snapshot from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = decode_from_slice(bytes, standard())
            .map(|(snapshot, _)| snapshot)
            .map_err(|e| SnapshotError::Decode(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Decode(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// Saves the snapshot to a file.
    pub fn save(&self, path: &str) -> Result<(), SnapshotError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })?;
        file.write_all(&bytes).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })
    }

    /// Loads a snapshot from a file.
    pub fn from_file(path: &str) -> Result<Self, SnapshotError> {
        let mut file = fs::File::open(path).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| SnapshotError::Io {
                path: path.to_string(),
                source,
            })?;
        Self::from_bytes(&bytes)
    }
}
