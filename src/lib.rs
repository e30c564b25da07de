//! Squash court availability checker for Places Leisure facilities.
//!
//! Walks the live-slots RPDE feed, filters to the squash facility, and
//! reconstructs per-court availability for a 40-minute slot and the
//! 40 minutes immediately before it.

pub mod availability;
pub mod checker;
pub mod config;
pub mod error;
pub mod model;
pub mod places_leisure;
