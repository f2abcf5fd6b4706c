//! Photometric harmonization of matched survey catalogs.
//!
//! Converts GALEX, Legacy Survey sweep and VHS photometry to one flux unit
//! (erg s⁻¹ cm⁻² Hz⁻¹), splits sources by morphology and writes LePhare
//! input catalogs.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`band`] | [`Band`] and [`Survey`] closed enums, per-band constants |
//! | [`correct`] | Flux corrections per survey, scalar and table level |
//! | [`split`] | Point-like / extended split and aperture selection |
//! | [`lephare`] | LePhare input layout and files |
//! | [`pipeline`] | [`Pipeline`] from raw catalogs to LePhare inputs |
//! | [`config`] | [`PipelineConfig`] read from TOML |
//! | [`errors`] | [`PhotometryError`] |
//!
//! # Quick Start
//!
//! ```ignore
//! use celestial_catalog::PathConfig;
//! use celestial_photometry::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_file("sedprep.toml".as_ref())?;
//! let pipeline = Pipeline::with_cds(config, PathConfig::new("."))?;
//! let report = pipeline.run()?;
//! ```

pub mod band;
pub mod config;
pub mod correct;
pub mod errors;
pub mod lephare;
pub mod pipeline;
pub mod split;

pub use band::{Band, Survey};
pub use config::PipelineConfig;
pub use errors::{PhotometryError, PhotometryResult};
pub use pipeline::{Pipeline, PipelineReport};
pub use split::{split_by_source_type, SourceType, SplitTables};
