//! Angular and photometric primitives for multi-survey catalog work.
//!
//! `celestial-core` is deliberately small: it holds the numbers and the one
//! piece of spherical geometry that every other crate in the workspace needs,
//! and nothing that touches files, tables or configuration.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Angle conversions, AB zero point, survey flux scale factors |
//! | [`math`] | Great-circle separation, grid rounding helpers |
//!
//! # Design Notes
//!
//! - **Degrees at the boundary**: catalogs store positions in degrees, so the
//!   public functions take and return degrees. Radians are used internally.
//!
//! - **Non-finite values are data**: nothing here validates its inputs. A NaN
//!   position yields a NaN separation, which never satisfies a radius cut.

pub mod constants;
pub mod math;

pub use math::{angular_separation_deg, ceil_to_multiple, floor_to_multiple};
