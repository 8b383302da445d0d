pub mod backup;
pub mod storage;
pub mod types;

pub use backup::{
    backup_file_name, export_backup, import_backup, read_backup_file, write_backup_file,
    ImportError, ImportOutcome,
};
pub use storage::{get_ledger_path, JsonFileStore, MemoryStore, Session, SnapshotStore};
pub use types::{Ledger, Participant};
