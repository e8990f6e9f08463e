//! Combat resolution primitives.
//!
//! Everything here is pure: the engine draws rolls and mutates state.

pub mod damage;

pub use damage::{DamageResult, apply_damage, apply_heal, calculate_damage};
