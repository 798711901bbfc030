//! `gatehouse-core`: shared building blocks for the admin backend.
//!
//! This crate contains **pure** primitives (no infrastructure concerns):
//! identifiers, the domain error model, audit stamps and localized labels.

pub mod audit;
pub mod error;
pub mod id;
pub mod locale;
pub mod record;

pub use audit::{AuditStamp, AuditTrail};
pub use error::DomainError;
pub use id::{AccountId, ActionId, AreaId, BranchId};
pub use locale::{Labels, Locale};
pub use record::Record;
