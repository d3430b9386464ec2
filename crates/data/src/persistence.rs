use crate::schema::BalanceStore;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const BALANCE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SavedBalance {
    pub version: u32,
    pub balance: f64,
}

pub fn default_balance_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("FLIPCARD_BALANCE") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".flipcard_balance.json"))
}

pub fn save_balance_file(balance: f64, path: &Path) -> anyhow::Result<()> {
    let payload = SavedBalance {
        version: BALANCE_SCHEMA_VERSION,
        balance,
    };
    let body = serde_json::to_string_pretty(&payload)?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

pub fn load_balance_file(path: &Path) -> anyhow::Result<f64> {
    let body = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let payload: SavedBalance =
        serde_json::from_str(&body).with_context(|| format!("parse {}", path.display()))?;
    if payload.version != BALANCE_SCHEMA_VERSION {
        bail!(
            "unsupported balance version {} (expected {})",
            payload.version,
            BALANCE_SCHEMA_VERSION
        );
    }
    if !payload.balance.is_finite() {
        bail!("balance in {} is not a number", path.display());
    }
    Ok(payload.balance)
}

/// Balance that is written back to disk after every change.
#[derive(Debug, Clone)]
pub struct FileBalanceStore {
    path: PathBuf,
    amount: f64,
}

impl FileBalanceStore {
    /// Opens `path`, starting from `starting_balance` when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>, starting_balance: f64) -> anyhow::Result<Self> {
        let path = path.into();
        let amount = if path.exists() {
            load_balance_file(&path)?
        } else {
            debug!(path = %path.display(), starting_balance, "new balance file");
            starting_balance
        };
        Ok(Self { path, amount })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        save_balance_file(self.amount, &self.path)
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            warn!(path = %self.path.display(), error = %err, "failed to save balance");
        }
    }
}

impl BalanceStore for FileBalanceStore {
    fn balance(&self) -> f64 {
        self.amount
    }

    fn credit(&mut self, amount: f64) {
        self.amount += amount;
        self.persist();
    }

    fn debit(&mut self, amount: f64) {
        self.amount -= amount;
        self.persist();
    }
}
