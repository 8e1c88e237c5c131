pub mod kv;

pub use kv::FileStorage;

use crate::error::Result;
use crate::ledger::Ledger;
use crate::tx::Request;

/// Storage abstraction for the append-only operation log and ledger snapshots.
///
/// Implementations must preserve:
/// - Append-only semantics for the operation log
/// - Atomic snapshot writes (crash-safe)
/// - Deterministic replay from the operation log
pub trait Storage {
    /// Append a request to the log (append-only, fsync before ack)
    fn append_op(&mut self, req: &Request) -> Result<()>;

    /// Load the latest ledger snapshot with the last applied operation ID
    ///
    /// Returns `None` if no snapshot exists (genesis state).
    fn load_ledger(&self) -> Result<Option<(Ledger, u64)>>;

    /// Persist a ledger snapshot atomically (write to temp file, fsync, rename)
    ///
    /// `last_op_id` is the sequential ID of the last request applied to this state.
    fn persist_ledger(&mut self, ledger: &Ledger, last_op_id: u64) -> Result<()>;

    /// Load requests from the log starting from `from_op_id` (inclusive)
    ///
    /// Operation IDs are sequential (0, 1, 2, ...).
    fn load_ops_from(&self, from_op_id: u64) -> Result<Vec<Request>>;
}
