//! Transaction management.
//!
//! SimpleDB transactions give read-committed isolation with eager
//! write locks:
//! - **Buffering**: puts and deletes stay private until commit
//! - **Locking**: a key touched by one open transaction cannot be touched by
//!   another until the first commits or rolls back
//! - **Validation**: commit compares each touched key's committed version
//!   against the transaction's snapshot and rejects the whole commit on any
//!   mismatch

mod manager;
mod state;

pub use manager::TransactionManager;
pub use state::{PendingWrite, Transaction};
