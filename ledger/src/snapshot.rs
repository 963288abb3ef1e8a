//! Chain snapshots on disk.
//!
//! A snapshot is the ordered block list, stored hashes included, written as
//! JSON. Nothing in the file is trusted: restoring goes through
//! [`Ledger::from_blocks`], which re-checks every digest, link and admission.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::admission::AdmissionCheck;
use crate::error::LedgerError;
use crate::{Block, Ledger};

/// File name used inside the data directory.
pub const SNAPSHOT_FILE: &str = "chain.json";

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Format version for compatibility.
    pub version: u32,
    /// Number of blocks; must equal `blocks.len()`.
    pub length: usize,
    pub blocks: Vec<Block>,
}

impl ChainSnapshot {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            length: blocks.len(),
            blocks,
        }
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE)
    }

    /// Write `blocks` to `dir/chain.json`, replacing any previous snapshot.
    ///
    /// The file is written under a temporary name and renamed into place, so
    /// a crash never leaves a half-written snapshot behind.
    pub fn save(dir: &Path, blocks: &[Block]) -> Result<PathBuf, LedgerError> {
        fs::create_dir_all(dir)?;
        let snapshot = Self::new(blocks.to_vec());
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| LedgerError::Snapshot(e.to_string()))?;

        let target = Self::path(dir);
        let tmp = dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &target)?;
        Ok(target)
    }

    /// Read the snapshot in `dir`. `Ok(None)` if there is none.
    pub fn load(dir: &Path) -> Result<Option<Self>, LedgerError> {
        let path = Self::path(dir);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: Self =
            serde_json::from_slice(&bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if snapshot.length != snapshot.blocks.len() {
            return Err(LedgerError::Snapshot(format!(
                "declared length {} but {} blocks present",
                snapshot.length,
                snapshot.blocks.len()
            )));
        }
        Ok(Some(snapshot))
    }

    /// Rebuild a ledger, re-verifying the whole chain.
    pub fn into_ledger<A>(self, admission: &A) -> Result<Ledger, LedgerError>
    where
        A: AdmissionCheck + ?Sized,
    {
        Ok(Ledger::from_blocks(self.blocks, admission)?)
    }
}
