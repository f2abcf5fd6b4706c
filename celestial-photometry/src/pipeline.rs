//! End-to-end preparation of LePhare inputs.
//!
//! ```text
//! load ─► AGN ⋈ sweep ─► GALEX (remote) ─► VHS ─► correct sweep/GALEX
//!                                                   │
//!                         write ◄─ format ◄─ VHS ◄─ split
//! ```
//!
//! Every match after the first is attached by `sweep_id`, so base rows are
//! never lost once they have a sweep counterpart. Rows without a GALEX or VHS
//! partner carry nulls and come out as `-99` in the LePhare files.

use crate::band::Band;
use crate::config::PipelineConfig;
use crate::correct::{correct_galex, correct_sweep, correct_vhs};
use crate::errors::PhotometryResult;
use crate::lephare::{format_input, write_input};
use crate::split::{split_by_source_type, SourceType};
use celestial_catalog::crossmatch::remote::{
    crossmatch_remote, CdsXmatch, CrossmatchService, XmatchRequest,
};
use celestial_catalog::io::write_table;
use celestial_catalog::loader::{load_agn, load_sweep, load_vhs, GALEX_COLUMN_MAPPING};
use celestial_catalog::crossmatch::match_with_sweep;
use celestial_catalog::{
    crossmatch, join_on_key, CrossmatchParams, JoinMode, KeyJoin, PathConfig, PathKind, Table,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Identifier every survey is joined on after the sweep match.
pub const KEY_COLUMN: &str = "sweep_id";

/// Suffix of AGN catalog columns that clash with sweep columns.
pub const AGN_SUFFIX: &str = "_shu";

/// The three loaded catalogs, already trimmed to the region.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub agn: Table,
    pub sweep: Table,
    pub vhs: Table,
}

/// Tables produced by [`Pipeline::prepare`], not yet written.
#[derive(Debug, Clone)]
pub struct Prepared {
    /// All matches attached, before any correction.
    pub matched: Table,
    /// LePhare layout per source type, point-like first.
    pub inputs: Vec<(SourceType, Table)>,
}

/// Row counts and written files of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub agn_rows: usize,
    pub sweep_rows: usize,
    pub vhs_rows: usize,
    pub matched_rows: usize,
    pub galex_matches: usize,
    pub vhs_matches: usize,
    pub pointlike_rows: usize,
    pub extended_rows: usize,
    pub backup: Option<PathBuf>,
    pub inputs: Vec<PathBuf>,
}

pub struct Pipeline {
    config: PipelineConfig,
    paths: PathConfig,
    service: Box<dyn CrossmatchService>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        paths: PathConfig,
        service: Box<dyn CrossmatchService>,
    ) -> Self {
        Self {
            config,
            paths,
            service,
        }
    }

    /// Pipeline talking to the configured CDS XMatch endpoint.
    pub fn with_cds(config: PipelineConfig, paths: PathConfig) -> PhotometryResult<Self> {
        let timeout = config.remote.timeout_secs.map(Duration::from_secs);
        let service = CdsXmatch::new(config.remote.endpoint.clone(), timeout)?;
        Ok(Self::new(config, paths, Box::new(service)))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn paths(&self) -> &PathConfig {
        &self.paths
    }

    /// Load, match, correct and write everything.
    pub fn run(&self) -> PhotometryResult<PipelineReport> {
        info!(region = %self.config.region, root = %self.paths.root().display(), "starting run");
        self.paths.create_all()?;
        let inputs = self.load()?;
        let prepared = self.prepare(&inputs)?;

        let mut report = self.summarize(&inputs, &prepared);
        if self.config.save_backups {
            report.backup = Some(self.write_backup(&prepared.matched)?);
        }
        for (source_type, table) in &prepared.inputs {
            let path = write_input(
                table,
                *source_type,
                &self.config.stem,
                &self.paths,
                self.config.overwrite,
            )?;
            report.inputs.push(path);
        }
        info!(
            matched = report.matched_rows,
            pointlike = report.pointlike_rows,
            extended = report.extended_rows,
            "run complete"
        );
        Ok(report)
    }

    pub fn load(&self) -> PhotometryResult<Inputs> {
        let region = &self.config.region;
        let files = &self.config.catalogs;
        let sweep_bands = band_names(&self.config.bands.sweep);
        let vhs_bands = band_names(&self.config.bands.vhs);

        let agn = load_agn(region, &self.paths, &files.agn, self.config.matching.rf_prob_cut)?;
        let sweep = load_sweep(region, &self.paths, &sweep_bands, &files.sweep_extension)?;
        let vhs = load_vhs(region, &self.paths, &files.vhs, &vhs_bands)?;
        Ok(Inputs { agn, sweep, vhs })
    }

    /// Match, correct, split and format the loaded catalogs.
    pub fn prepare(&self, inputs: &Inputs) -> PhotometryResult<Prepared> {
        let bands = &self.config.bands;
        let matched = self.match_catalogs(inputs)?;

        let mut corrected = correct_sweep(matched.clone(), &bands.sweep)?;
        if !self.config.skip_galex {
            corrected = correct_galex(corrected, &bands.galex)?;
        }

        let output_bands = self.output_bands();
        let mut formatted = Vec::with_capacity(SourceType::ALL.len());
        for (source_type, subset) in split_by_source_type(&corrected)?.into_parts() {
            let subset = correct_vhs(subset, &bands.vhs)?;
            formatted.push((source_type, format_input(&subset, &output_bands)?));
        }
        Ok(Prepared {
            matched,
            inputs: formatted,
        })
    }

    /// Bands written to the LePhare files.
    pub fn output_bands(&self) -> Vec<Band> {
        let bands = &self.config.bands;
        let mut out = Vec::new();
        if !self.config.skip_galex {
            out.extend_from_slice(&bands.galex);
        }
        out.extend_from_slice(&bands.sweep);
        out.extend_from_slice(&bands.vhs);
        out
    }

    fn match_catalogs(&self, inputs: &Inputs) -> PhotometryResult<Table> {
        let radii = &self.config.matching;
        let base =
            match_with_sweep(&inputs.agn, &inputs.sweep, radii.sweep_radius_deg, AGN_SUFFIX)?.table;
        info!(
            agn = inputs.agn.len(),
            matched = base.len(),
            "matched AGN candidates to sweep"
        );

        let base = if self.config.skip_galex {
            base
        } else {
            let request = XmatchRequest::new(
                self.config.remote.galex_catalog.clone(),
                radii.galex_radius_arcsec,
            );
            crossmatch_remote(
                &base,
                self.service.as_ref(),
                &request,
                KEY_COLUMN,
                &GALEX_COLUMN_MAPPING,
            )?
        };

        self.attach_vhs(base, &inputs.vhs)
    }

    fn attach_vhs(&self, base: Table, vhs: &Table) -> PhotometryResult<Table> {
        let params =
            CrossmatchParams::from_arcsec(self.config.matching.vhs_radius_arcsec, JoinMode::Left)
                .with_suffixes("", "_vhs")
                .with_separation_column("sep_to_vhs");
        let matched = crossmatch(&base, vhs, &params)?.table;
        info!(
            base = base.len(),
            matched = matched.len(),
            "matched VHS to sweep"
        );

        let vhs_columns: Vec<&str> = matched
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|name| *name == KEY_COLUMN || !base.has_column(name))
            .collect();
        let vhs_part = matched.select(&vhs_columns)?;
        Ok(join_on_key(
            &base,
            &vhs_part,
            KEY_COLUMN,
            KEY_COLUMN,
            KeyJoin::Left,
        )?)
    }

    fn write_backup(&self, matched: &Table) -> PhotometryResult<PathBuf> {
        let path = self
            .paths
            .path(PathKind::MatchBackups)
            .join(format!("{}_matched.csv", self.config.stem));
        write_table(&path, matched, self.config.overwrite)?;
        info!(path = %path.display(), rows = matched.len(), "saved match backup");
        Ok(path)
    }

    fn summarize(&self, inputs: &Inputs, prepared: &Prepared) -> PipelineReport {
        let rows_of = |source_type| {
            prepared
                .inputs
                .iter()
                .find(|(t, _)| *t == source_type)
                .map_or(0, |(_, table)| table.len())
        };
        PipelineReport {
            agn_rows: inputs.agn.len(),
            sweep_rows: inputs.sweep.len(),
            vhs_rows: inputs.vhs.len(),
            matched_rows: prepared.matched.len(),
            galex_matches: present_count(&prepared.matched, "sep_to_galex"),
            vhs_matches: present_count(&prepared.matched, "sep_to_vhs"),
            pointlike_rows: rows_of(SourceType::Pointlike),
            extended_rows: rows_of(SourceType::Extended),
            backup: None,
            inputs: Vec::new(),
        }
    }
}

fn band_names(bands: &[Band]) -> Vec<&'static str> {
    bands.iter().map(|b| b.name()).collect()
}

/// Non-null cells of `name`; zero if the column is absent.
fn present_count(table: &Table, name: &str) -> usize {
    table.column(name).map_or(0, |column| {
        (0..column.len()).filter(|&row| !column.is_null(row)).count()
    })
}
