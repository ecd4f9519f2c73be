//! Iron Regent - AI faction turn-driver for a hex-based strategy campaign

pub mod actions;
pub mod ai;
pub mod core;
pub mod world;
