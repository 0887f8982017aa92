//! # SimpleDB Core
//!
//! Transactional core of an in-memory key-value store.
//!
//! This crate provides:
//! - A [`Keyspace`] holding committed values with per-key version counters
//! - A [`TransactionManager`] that buffers writes in named transactions,
//!   locks touched keys against other open transactions, and validates
//!   versions at commit time
//! - Typed errors, configuration, and operation statistics
//!
//! ## Example
//!
//! ```rust
//! use simpledb_core::{CoreError, TransactionManager};
//!
//! let tm: TransactionManager<String, String, u32> = TransactionManager::new();
//! tm.put("a".into(), "bar".into(), None)?;
//!
//! tm.create_transaction(1)?;
//! tm.put("a".into(), "foo".into(), Some(&1))?;
//!
//! tm.create_transaction(2)?;
//! let locked = tm.put("a".into(), "baz".into(), Some(&2));
//! assert!(matches!(locked, Err(CoreError::LockConflict { .. })));
//!
//! tm.commit_transaction(&1)?;
//! assert_eq!(tm.get(&"a".into(), None)?, Some("foo".to_string()));
//! # Ok::<(), CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod keyspace;
mod stats;
mod transaction;
mod types;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use keyspace::Keyspace;
pub use stats::{ManagerStats, StatsSnapshot};
pub use transaction::{PendingWrite, Transaction, TransactionManager};
pub use types::Version;
