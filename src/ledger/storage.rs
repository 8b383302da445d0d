use super::types::Ledger;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs::{self, File};
use std::path::PathBuf;

const SNAPSHOT_VERSION: u32 = 1;

/// Where the ledger lives between runs.
pub trait SnapshotStore {
    /// Load the last saved ledger, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Ledger>>;

    /// Persist the current ledger.
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    ledger: Ledger,
}

/// Get the default ledger file path (~/.config/mun-marker/ledger.json)
pub fn get_ledger_path() -> PathBuf {
    crate::config::get_config_dir().join("ledger.json")
}

/// Ledger stored as pretty JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for JsonFileStore {
    /// If the file doesn't exist, returns `None`.
    /// If the file exists but has an unsupported version, returns an error.
    fn load(&self) -> Result<Option<Ledger>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no saved ledger");
            return Ok(None);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open ledger file at {}", self.path.display()))?;

        let snapshot: Snapshot =
            serde_json::from_reader(file).context("Failed to load ledger")?;

        if snapshot.version != SNAPSHOT_VERSION {
            anyhow::bail!("Unsupported ledger version: {}", snapshot.version);
        }

        tracing::debug!(
            path = %self.path.display(),
            participants = snapshot.ledger.participants.len(),
            saved_at = %snapshot.saved_at,
            "ledger loaded"
        );
        Ok(Some(snapshot.ledger))
    }

    /// Uses atomic-write-file so the ledger is never left half-written.
    fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create ledger directory at {}", parent.display())
                })?;
            }
        }

        let mut file = AtomicWriteFile::open(&self.path).with_context(|| {
            format!("Failed to open atomic write file at {}", self.path.display())
        })?;

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            ledger: ledger.clone(),
        };
        serde_json::to_writer_pretty(&mut file, &snapshot)
            .context("Failed to serialize ledger")?;

        file.commit().context("Failed to save ledger")?;

        tracing::debug!(path = %self.path.display(), "ledger saved");
        Ok(())
    }
}

/// Keeps the last saved ledger in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: RefCell<Option<Ledger>>,
    saves: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            saved: RefCell::new(Some(ledger)),
            saves: RefCell::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Ledger>> {
        Ok(self.saved.borrow().clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        *self.saved.borrow_mut() = Some(ledger.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

/// Owns the ledger for one run: loaded once, saved after every edit.
pub struct Session<S: SnapshotStore> {
    store: S,
    ledger: Ledger,
}

impl<S: SnapshotStore> Session<S> {
    /// Load from `store`, falling back to the default rubric with no
    /// participants when nothing was saved yet.
    pub fn open(store: S) -> Result<Self> {
        let ledger = store.load()?.unwrap_or_default();
        Ok(Self { store, ledger })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply one edit and persist the result.
    pub fn apply<T>(&mut self, edit: impl FnOnce(&mut Ledger) -> T) -> Result<T> {
        let out = edit(&mut self.ledger);
        self.store.save(&self.ledger)?;
        Ok(out)
    }

    /// Like [`Session::apply`], but an `Err` from the edit leaves both memory
    /// and storage untouched.
    pub fn try_apply<T, E>(
        &mut self,
        edit: impl FnOnce(&mut Ledger) -> std::result::Result<T, E>,
    ) -> Result<std::result::Result<T, E>> {
        let mut draft = self.ledger.clone();
        match edit(&mut draft) {
            Ok(out) => {
                self.ledger = draft;
                self.store.save(&self.ledger)?;
                Ok(Ok(out))
            }
            Err(err) => Ok(Err(err)),
        }
    }
}
