//! API Routes
//!
//! Route handlers organized by functionality.

pub mod counties;
pub mod export;
pub mod health;
pub mod map;
pub mod selection;
