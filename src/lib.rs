//! An in-memory, transactionally-atomic command executor covering six
//! Redis-compatible data-type namespaces (strings, lists, sets, hashes,
//! sorted sets, and an exact-count HyperLogLog stand-in). Wire protocol
//! framing, persistence, replication, and authentication are explicitly
//! out of scope (`spec.md` §1 Non-goals) — a caller owns the connection
//! and hands this crate already-parsed argument vectors.
//!
//! ```
//! use rudis_core::{Executor, Reply};
//!
//! let exec = Executor::new();
//! let argv = vec![b"SET".to_vec(), b"k".to_vec(), b"v".to_vec()];
//! assert_eq!(exec.execute(argv), Reply::ok());
//! ```

pub mod args;
pub mod blocking;
pub mod bounds;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod pattern;
pub mod rand_pick;
pub mod reply;
pub mod store;
pub mod util;

pub use config::ExecutorConfig;
pub use error::CommandError;
pub use executor::Executor;
pub use reply::Reply;
pub use store::{Kind, Store};
