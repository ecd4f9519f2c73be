//! Action definitions and catalogue contract

pub mod catalog;

pub use catalog::{ActionCatalog, ActionDescriptor, AdvisorType};
