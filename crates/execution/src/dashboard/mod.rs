//! Per-account dashboard.
//!
//! Provides:
//! - Campaigns owned by the viewer with their donor breakdown
//! - Campaigns the viewer has contributed to
//! - Totals across both

mod view;

pub use view::*;
