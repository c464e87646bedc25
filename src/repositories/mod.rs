//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for the listing, view, account and enquiry tables.

pub mod enquiry;
pub mod property;
pub mod property_view;
pub mod user;

pub use enquiry::{EnquiryRepository, NewEnquiry};
pub use property::{PropertyChanges, PropertyDraft, PropertyRepository, PropertyScope};
pub use property_view::{PropertyViewRepository, ViewOutcome};
pub use user::{ExtraFields, NewUser, UserRepository};
