//! # Msgdesk Store
//!
//! Owns the aggregate lists the desk builds up from incoming messages and
//! the durable message log.
//!
//! ## Core Features
//!
//! - **Single owner**: [`AggregateStore`] is the only place aggregate state
//!   changes. It applies [`SideEffect`](sanitise::SideEffect)s produced by
//!   sanitisation and appends finished messages, enforcing each collection's
//!   uniqueness rule.
//! - **Pluggable persistence**: the [`PersistenceGateway`] trait abstracts the
//!   durable layer. Out of the box:
//!   - [`FileGateway`], the CSV/JSON flat files the desk has always used.
//!   - [`InMemoryGateway`], for tests, with switchable write failures.
//! - **Change tracking**: every mutation returns [`Changes`] naming the
//!   collections it touched, so callers flush only what moved.
//!
//! ## Example Usage
//!
//! ```
//! use store::{AggregateStore, GatewayConfig};
//! use sanitise::SideEffect;
//!
//! let gateway = GatewayConfig::in_memory().build().unwrap();
//! let mut store = AggregateStore::from_state(gateway.load_all().unwrap());
//!
//! let changes = store.apply(&[SideEffect::ObserveTag("#deals".into())]);
//! if changes.trending {
//!     gateway.save_trending(&store.state().trending).unwrap();
//! }
//! assert_eq!(store.snapshot_trending(), vec![("deals".to_string(), 1)]);
//! ```

mod aggregates;
mod error;
mod files;
mod gateway;
mod store;

pub use crate::aggregates::{Mentions, MessageLog, QuarantinedUrls, SirRecords, TrendingTags};
pub use crate::error::StoreError;
pub use crate::files::{FileGateway, FileLayout};
pub use crate::gateway::{GatewayConfig, InMemoryGateway, PersistenceGateway};
pub use crate::store::{AggregateState, AggregateStore, Changes};
