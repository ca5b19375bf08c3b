//! Marketplace lifecycle engine
//!
//! The `Marketplace` owns the only mutation paths over the store:
//! slot submission, slot approval, booking, and the expiry sweep.

mod engine;

pub use engine::*;
