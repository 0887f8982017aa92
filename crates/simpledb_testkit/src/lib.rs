//! # SimpleDB Testkit
//!
//! Test utilities for SimpleDB.
//!
//! This crate provides:
//! - Test fixtures and a string-keyed store wrapper
//! - Property-based test generators using proptest
//! - A reference model for differential testing
//! - Concurrent stress scenarios
//!
//! ## Usage
//!
//! ```rust
//! use simpledb_testkit::prelude::*;
//!
//! let store = TestStore::seeded(&[("a", "bar")]);
//! store.begin("def").unwrap();
//! store.put("b", "foo", Some("def")).unwrap();
//! assert_eq!(store.get("a", Some("def")).unwrap().as_deref(), Some("bar"));
//! store.rollback("def").unwrap();
//! assert_eq!(store.committed("b"), None);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use model::*;
pub use stress::*;
