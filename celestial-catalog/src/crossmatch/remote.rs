//! Crossmatching against a remotely hosted catalog.
//!
//! Large reference catalogs (GALEX among them) are never downloaded. Instead
//! the local positions are uploaded to a crossmatch service, which answers
//! with every remote row within the search radius. The service sits behind
//! the [`CrossmatchService`] trait so the pipeline can run against a fake in
//! tests.
//!
//! A source may get several candidates back. Only the closest one per key
//! (smallest distance column) is attached; see [`nearest_per_key`].

use super::key::{join_on_key, KeyJoin};
use crate::errors::{CatalogError, CatalogResult};
use crate::io::{format_table, parse_table_str};
use crate::table::{Column, Table};
use reqwest::blocking::multipart::{Form, Part};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Synchronous endpoint of the CDS XMatch service.
pub const CDS_XMATCH_URL: &str = "http://cdsxmatch.u-strasbg.fr/xmatch/api/v1/sync";

/// GALEX GR6+7 AIS/MIS catalog identifier on VizieR.
pub const GALEX_CATALOG: &str = "vizier:II/335/galex_ais";

/// Response column holding the match distance, in arcseconds.
pub const DISTANCE_COLUMN: &str = "angDist";

/// What to match against and how far to look.
#[derive(Debug, Clone, PartialEq)]
pub struct XmatchRequest {
    /// Remote catalog identifier, e.g. [`GALEX_CATALOG`].
    pub catalog: String,
    pub max_distance_arcsec: f64,
    /// Upload columns holding right ascension and declination, in degrees.
    pub ra_column: String,
    pub dec_column: String,
    /// Response column ranking candidates of the same source.
    pub distance_column: String,
}

impl XmatchRequest {
    pub fn new(catalog: impl Into<String>, max_distance_arcsec: f64) -> Self {
        Self {
            catalog: catalog.into(),
            max_distance_arcsec,
            ra_column: "ra".to_string(),
            dec_column: "dec".to_string(),
            distance_column: DISTANCE_COLUMN.to_string(),
        }
    }
}

/// A service that matches an uploaded table against a remote catalog.
///
/// Implementations return every remote match together with the uploaded
/// columns of the row it belongs to, possibly several per uploaded row.
pub trait CrossmatchService {
    fn name(&self) -> &str;

    /// # Errors
    /// Any transport or service failure is reported as
    /// [`CatalogError::Network`].
    fn query(&self, upload: &Table, request: &XmatchRequest) -> CatalogResult<Table>;
}

/// Client for the CDS XMatch HTTP API.
///
/// A failed request is reported once; there is no retry.
pub struct CdsXmatch {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl CdsXmatch {
    /// `timeout` of `None` waits for as long as the service takes.
    ///
    /// # Errors
    /// Returns [`CatalogError::Network`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> CatalogResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::network("CDS XMatch", e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(upload: &Table, request: &XmatchRequest) -> CatalogResult<Form> {
        let csv = Part::text(format_table(upload)?).file_name("upload.csv");
        Ok(Form::new()
            .text("request", "xmatch")
            .text("distMaxArcsec", request.max_distance_arcsec.to_string())
            .text("RESPONSEFORMAT", "csv")
            .text("cat2", request.catalog.clone())
            .text("colRA1", request.ra_column.clone())
            .text("colDec1", request.dec_column.clone())
            .part("cat1", csv))
    }
}

impl CrossmatchService for CdsXmatch {
    fn name(&self) -> &str {
        "CDS XMatch"
    }

    fn query(&self, upload: &Table, request: &XmatchRequest) -> CatalogResult<Table> {
        debug!(
            endpoint = %self.endpoint,
            catalog = %request.catalog,
            rows = upload.len(),
            "uploading to crossmatch service"
        );
        let response = self
            .client
            .post(self.endpoint.as_str())
            .multipart(Self::form(upload, request)?)
            .send()
            .map_err(|e| CatalogError::network(self.name(), e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| CatalogError::network(self.name(), e.to_string()))?;
        if !status.is_success() {
            let detail: String = body.chars().take(200).collect();
            return Err(CatalogError::network(
                self.name(),
                format!("HTTP {}: {}", status, detail.trim()),
            ));
        }
        parse_table_str(&body)
    }
}

/// Match `table` against a remote catalog and attach the results by `key`.
///
/// Only `ra`, `dec` and the key column are uploaded. The service response is
/// cut to the nearest candidate per key, renamed through `mapping` (response
/// name to local name), restricted to the mapped columns, and left-joined back
/// onto `table` on the key. The mapping must rename the echoed key column; its
/// local name is the right-hand key of the join.
///
/// # Errors
/// Returns [`CatalogError::MissingColumn`] if `table` lacks the key or
/// positions, or if the response lacks the distance or a mapped column, and
/// propagates [`CatalogError::Network`] from the service.
pub fn crossmatch_remote(
    table: &Table,
    service: &dyn CrossmatchService,
    request: &XmatchRequest,
    key: &str,
    mapping: &[(&str, &str)],
) -> CatalogResult<Table> {
    let upload = table.select(&[request.ra_column.as_str(), request.dec_column.as_str(), key])?;
    let matched_key = mapping
        .iter()
        .find(|(remote, _)| *remote == key)
        .map(|(_, local)| *local)
        .ok_or_else(|| CatalogError::missing_column(key, "remote crossmatch mapping"))?;

    let response = if upload.is_empty() {
        Table::new()
    } else {
        service.query(&upload, request)?
    };
    info!(
        service = service.name(),
        catalog = %request.catalog,
        uploaded = upload.len(),
        returned = response.len(),
        "remote crossmatch"
    );

    let remote_names: Vec<&str> = mapping.iter().map(|(remote, _)| *remote).collect();
    let matched = if response.num_columns() == 0 {
        empty_like(mapping)?
    } else {
        let candidates = response.len();
        let response = nearest_per_key(&response, key, &request.distance_column)?;
        debug!(
            candidates,
            kept = response.len(),
            "kept nearest remote candidate per key"
        );
        response
            .select(remote_names.as_slice())
            .map_err(|_| missing_in_response(&response, &remote_names))?
            .rename_all(mapping)?
    };
    join_on_key(table, &matched, key, matched_key, KeyJoin::Left)
}

/// Keep, for every key, the row with the smallest finite `distance`.
///
/// Rows with a null key or a NaN distance are dropped. Ties keep the earlier
/// row. Surviving rows stay in their original order.
///
/// # Errors
/// Returns [`CatalogError::MissingColumn`] if `key` or `distance` is absent.
pub fn nearest_per_key(table: &Table, key: &str, distance: &str) -> CatalogResult<Table> {
    let keys = table.texts(key, "nearest candidate per key")?;
    let distances = table.floats(distance, "nearest candidate per key")?;

    let mut best: HashMap<&str, usize> = HashMap::with_capacity(keys.len());
    for (row, key) in keys.iter().enumerate() {
        let Some(key) = key.as_deref() else {
            continue;
        };
        let d = distances[row];
        if d.is_nan() {
            continue;
        }
        best.entry(key)
            .and_modify(|kept| {
                if d < distances[*kept] {
                    *kept = row;
                }
            })
            .or_insert(row);
    }

    let mut rows: Vec<usize> = best.into_values().collect();
    rows.sort_unstable();
    Ok(table.take(&rows))
}

fn empty_like(mapping: &[(&str, &str)]) -> CatalogResult<Table> {
    Table::from_columns(
        mapping
            .iter()
            .map(|(_, local)| (*local, Column::Float(Vec::new())))
            .collect(),
    )
}

fn missing_in_response(response: &Table, wanted: &[&str]) -> CatalogError {
    let absent = wanted
        .iter()
        .find(|name| !response.has_column(name))
        .copied()
        .unwrap_or_default();
    CatalogError::missing_column(absent, "crossmatch service response")
}
