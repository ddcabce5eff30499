//! # Utilities Module
//!
//! Flat-plane vector math and tile navigation shared by the game systems.

pub mod math;
pub mod navigation;

pub use math::*;
pub use navigation::*;
