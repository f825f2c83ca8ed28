//! Client library for the workload interference console
//!
//! This crate provides the core functionality for:
//! - Typed records for the analysis platform's REST resources
//! - A thin HTTP/JSON client over the platform API
//! - The data synchronization store shared by console views

pub mod api;
pub mod error;
pub mod models;
pub mod store;

pub use api::ApiClient;
pub use error::StoreError;
pub use models::*;
pub use store::{
    DataSyncStore, PlacementVariant, ResourceKind, SlotKey, SlotView, StoreStats, KEY_SEPARATOR,
};
