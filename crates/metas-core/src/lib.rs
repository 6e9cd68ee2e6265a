//! # metas-core
//!
//! Goal ("meta") registration for Metas.
//!
//! A [`Meta`] is a sustainability or operational target for one indicator
//! within a division and process. Goals are created once, never edited, and
//! must always carry a target date in the future at the moment of creation.
//!
//! ## Key components
//!
//! - [`MetaDraft`] — the raw creation payload, every field optional
//! - [`validate`] — turns a draft into a [`NewMeta`] or a [`FieldErrors`] map
//! - [`MetaStore`] — SQLite persistence with storage-assigned ids
//! - [`MetaService`] — validate → persist → notify, the creation pipeline
//! - [`MetaEvent`] / [`EventDispatcher`] — creation audit trail
//! - [`MetaSummary`] / [`export_csv`] — aggregate views for reporting
//! - [`catalog`] — reference divisions, processes and indicators

pub mod catalog;
pub mod error;
pub mod events;
pub mod meta;
pub mod report;
pub mod service;
pub mod store;
pub mod validation;

pub use catalog::Catalog;
pub use error::MetaError;
pub use events::{EventDispatcher, LogSink, MetaEvent, NotificationSink};
pub use meta::{Meta, MetaDraft, MetaFilter, NewMeta};
pub use report::{export_csv, MetaSummary};
pub use service::MetaService;
pub use store::MetaStore;
pub use validation::{validate, FieldErrors};
