//! Data synchronization between console views and the platform API
//!
//! This module provides:
//! - Slot addressing by (resource kind, key) with composite key derivation
//! - The per-slot state machine: absent, fetching, present
//! - The store itself: fetch-or-use-cached access with single-flight
//!   de-duplication, field-wise app merging, and change notification

mod key;
mod slot;
mod sync;


pub use key::{PlacementVariant, ResourceKind, SlotKey, KEY_SEPARATOR};
pub use slot::SlotView;
pub use sync::{DataSyncStore, StoreStats};
