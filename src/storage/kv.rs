use crate::config::Config;
use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::storage::Storage;
use crate::tx::Request;
use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

/// File-based storage implementation using append-only logs and snapshots.
///
/// Files:
/// - `ops.log`: Append-only operation log (bincode serialized)
/// - `ledger.bin`: Ledger snapshot (bincode serialized Ledger + u64 last_op_id)
/// - `ledger.bin.tmp`: Temporary file for atomic snapshot writes
pub struct FileStorage {
    op_log_path: PathBuf,
    ledger_path: PathBuf,
    ledger_tmp_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with paths from config
    pub fn new(config: &Config) -> Self {
        FileStorage {
            op_log_path: config.get_op_log_path(),
            ledger_path: config.get_ledger_path(),
            ledger_tmp_path: config.get_ledger_path().with_extension("bin.tmp"),
        }
    }

    /// Create FileStorage with custom paths (for testing)
    pub fn with_paths(op_log_path: PathBuf, ledger_path: PathBuf) -> Self {
        let ledger_tmp_path = ledger_path.with_extension("bin.tmp");
        FileStorage {
            op_log_path,
            ledger_path,
            ledger_tmp_path,
        }
    }

    /// Ensure the data directory exists
    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.op_log_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::StateError(format!("Failed to create data directory: {}", e)))?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn append_op(&mut self, req: &Request) -> Result<()> {
        self.ensure_dir()?;

        let op_bytes = bincode::serialize(req)
            .map_err(|e| Error::StateError(format!("Failed to serialize request: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.op_log_path)
            .map_err(|e| Error::StateError(format!("Failed to open op log for append: {}", e)))?;

        // Length prefix (u64 little-endian) + request data
        let len = op_bytes.len() as u64;
        file.write_all(&len.to_le_bytes())
            .map_err(|e| Error::StateError(format!("Failed to write op length: {}", e)))?;
        file.write_all(&op_bytes)
            .map_err(|e| Error::StateError(format!("Failed to write op data: {}", e)))?;

        // Fsync for crash safety (append-only semantics)
        file.sync_all()
            .map_err(|e| Error::StateError(format!("Failed to fsync op log: {}", e)))?;

        Ok(())
    }

    fn load_ledger(&self) -> Result<Option<(Ledger, u64)>> {
        if !self.ledger_path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.ledger_path)
            .map_err(|e| Error::StateError(format!("Failed to open ledger file: {}", e)))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| Error::StateError(format!("Failed to read ledger file: {}", e)))?;

        // Format: [Ledger bytes][last_op_id: u64]
        if data.len() < 8 {
            return Err(Error::StateError("Ledger file too short".to_string()));
        }

        let mut id_bytes = [0u8; 8];
        id_bytes.copy_from_slice(&data[data.len() - 8..]);
        let last_op_id = u64::from_le_bytes(id_bytes);

        let ledger_bytes = &data[..data.len() - 8];
        let ledger: Ledger = bincode::deserialize(ledger_bytes)
            .map_err(|e| Error::StateError(format!("Failed to deserialize ledger: {}", e)))?;

        Ok(Some((ledger, last_op_id)))
    }

    fn persist_ledger(&mut self, ledger: &Ledger, last_op_id: u64) -> Result<()> {
        self.ensure_dir()?;

        let ledger_bytes = bincode::serialize(ledger)
            .map_err(|e| Error::StateError(format!("Failed to serialize ledger: {}", e)))?;

        let mut file = File::create(&self.ledger_tmp_path)
            .map_err(|e| Error::StateError(format!("Failed to create temp ledger file: {}", e)))?;

        file.write_all(&ledger_bytes)
            .map_err(|e| Error::StateError(format!("Failed to write ledger: {}", e)))?;
        file.write_all(&last_op_id.to_le_bytes())
            .map_err(|e| Error::StateError(format!("Failed to write last_op_id: {}", e)))?;

        // Fsync before rename (crash safety)
        file.sync_all()
            .map_err(|e| Error::StateError(format!("Failed to fsync temp ledger file: {}", e)))?;
        drop(file);

        // Atomic rename (crash-safe snapshot)
        fs::rename(&self.ledger_tmp_path, &self.ledger_path)
            .map_err(|e| Error::StateError(format!("Failed to rename temp ledger file: {}", e)))?;

        // Fsync parent directory (ensure rename is persisted)
        if let Some(parent) = self.ledger_path.parent() {
            let parent_file = File::open(parent)
                .map_err(|e| Error::StateError(format!("Failed to open parent directory: {}", e)))?;
            parent_file
                .sync_all()
                .map_err(|e| Error::StateError(format!("Failed to fsync parent directory: {}", e)))?;
        }

        Ok(())
    }

    fn load_ops_from(&self, from_op_id: u64) -> Result<Vec<Request>> {
        if !self.op_log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.op_log_path)
            .map_err(|e| Error::StateError(format!("Failed to open op log: {}", e)))?;
        let mut reader = BufReader::new(file);

        let mut ops = Vec::new();
        let mut current_id = 0u64;

        loop {
            let mut len_buf = [0u8; 8];
            match reader.read_exact(&mut len_buf) {
                Ok(_) => {
                    let len = u64::from_le_bytes(len_buf) as usize;
                    let mut op_buf = vec![0u8; len];
                    reader
                        .read_exact(&mut op_buf)
                        .map_err(|e| Error::StateError(format!("Failed to read op data: {}", e)))?;

                    if current_id >= from_op_id {
                        let req: Request = bincode::deserialize(&op_buf).map_err(|e| {
                            Error::StateError(format!("Failed to deserialize op: {}", e))
                        })?;
                        ops.push(req);
                    }

                    current_id += 1;
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => {
                    return Err(Error::StateError(format!("Failed to read op log: {}", e)));
                }
            }
        }

        Ok(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Account;
    use crate::tx::Transaction;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let op_log_path = temp_dir.path().join("ops.log");
        let ledger_path = temp_dir.path().join("ledger.bin");
        let storage = FileStorage::with_paths(op_log_path, ledger_path);
        (storage, temp_dir)
    }

    fn buy_request(caller: &str, token_amount: u64) -> Request {
        Request::new(
            caller.to_string(),
            1700000000,
            Transaction::BuyTokens {
                token_amount,
                currency_sent: 1,
            },
        )
    }

    #[test]
    fn test_append_and_load_op() {
        let (mut storage, _temp_dir) = create_test_storage();

        storage.append_op(&buy_request("alice", 100)).unwrap();
        let ops = storage.load_ops_from(0).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].caller, "alice");
    }

    #[test]
    fn test_load_ops_from() {
        let (mut storage, _temp_dir) = create_test_storage();

        for i in 0..5 {
            storage.append_op(&buy_request("alice", 100 + i)).unwrap();
        }

        // Load from op_id 2
        let ops = storage.load_ops_from(2).unwrap();
        assert_eq!(ops.len(), 3); // op_ids 2, 3, 4
    }

    #[test]
    fn test_persist_and_load_ledger() {
        let (mut storage, _temp_dir) = create_test_storage();

        let mut ledger = Ledger::new("owner".to_string());
        ledger
            .accounts
            .insert("alice".to_string(), Account::with_balance(1000));
        ledger.currency_balance = 7;

        storage.persist_ledger(&ledger, 5).unwrap();

        let loaded = storage.load_ledger().unwrap();
        assert!(loaded.is_some());
        let (loaded_ledger, last_op_id) = loaded.unwrap();
        assert_eq!(last_op_id, 5);
        assert_eq!(loaded_ledger.owner(), "owner");
        assert_eq!(loaded_ledger.balance_of("alice"), 1000);
        assert_eq!(loaded_ledger.currency_balance(), 7);
    }

    #[test]
    fn test_load_ledger_none() {
        let (storage, _temp_dir) = create_test_storage();
        let loaded = storage.load_ledger().unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_append_multiple_op_kinds() {
        let (mut storage, _temp_dir) = create_test_storage();

        storage.append_op(&buy_request("alice", 100)).unwrap();
        storage
            .append_op(&Request::new(
                "alice".to_string(),
                1700000001,
                Transaction::PayForService {
                    service: "Laundry".to_string(),
                    amount: 10,
                },
            ))
            .unwrap();

        let ops = storage.load_ops_from(0).unwrap();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[1].kind, Transaction::PayForService { .. }));
    }
}
