//! Columnar source catalogs for multi-survey photometry.
//!
//! Loads survey dumps into in-memory [`Table`]s, trims them to a sky
//! [`Region`], and associates sources across surveys by position, either
//! locally or through a remote crossmatch service.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`table`] | [`Table`] and [`Column`], NaN-as-null columnar storage |
//! | [`region`] | [`Region`] bounds, row filtering, brick enumeration |
//! | [`brick`] | [`Brick`] sweep tiles on the 10° × 5° grid |
//! | [`crossmatch`] | [`crossmatch()`], key joins, remote matching |
//! | [`io`] | Comma-separated table files, optionally gzipped |
//! | [`loader`] | Sweep, AGN, VHS and GALEX loaders |
//! | [`config`] | [`PathConfig`] directory layout |
//! | [`errors`] | [`CatalogError`] |
//!
//! # Quick Start
//!
//! ```ignore
//! use celestial_catalog::{crossmatch, CrossmatchParams, JoinMode, Region};
//!
//! let region = Region::new(126.0, 141.5, -1.2, 3.3)?;
//! let agn = region.filter(&agn)?;
//! let params = CrossmatchParams::from_arcsec(1.0, JoinMode::Left);
//! let matched = crossmatch(&agn, &vhs, &params)?;
//! ```

pub mod brick;
pub mod config;
pub mod crossmatch;
pub mod errors;
pub mod io;
pub mod loader;
pub mod region;
pub mod table;

pub use brick::Brick;
pub use config::{PathConfig, PathKind};
pub use crossmatch::{crossmatch, join_on_key, CrossmatchParams, JoinMode, KeyJoin};
pub use errors::{CatalogError, CatalogResult};
pub use region::Region;
pub use table::{Column, Table};
