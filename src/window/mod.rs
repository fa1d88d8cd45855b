//! Sliding-window event counter
//!
//! Events are recorded as whole-second Unix timestamps. A timestamp `t` is
//! active relative to an instant `current` while `current - t < threshold`.
//! The active set lives in memory ([`TimestampStore`]) and is mirrored to a
//! flat file, one timestamp per line, so the window survives restarts.
//!
//! ## Request protocol
//!
//! [`TimestampService::record_timestamp`] runs, in order:
//!
//! 1. `remove_expired(now, threshold)`
//! 2. `store(now)`
//! 3. `sync()`
//! 4. `count()`
//!
//! Steps of two concurrent requests may interleave at the lock boundaries, so
//! near-simultaneous callers can both observe each other's event.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use windowcount::window::{MalformedLines, TimestampService, TimestampStore};
//!
//! let store = Arc::new(TimestampStore::open_file("timestamps.log", MalformedLines::Fail));
//! let service = TimestampService::new(store.clone(), 60);
//! service.initialize().await?;
//! let count = service.record_timestamp().await?;
//! store.close().await?;
//! ```

pub mod clock;
pub mod error;
pub mod inspect;
pub mod persistence;
pub mod pruning;
pub mod service;
pub mod store;

/// Whole seconds since the Unix epoch
pub type Timestamp = i64;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{PersistenceError, Result, ServiceError};
pub use inspect::{WindowReport, inspect_file};
pub use persistence::{FilePersistence, MalformedLines, Persistence};
pub use pruning::{PruneStats, is_active};
pub use service::TimestampService;
pub use store::TimestampStore;
