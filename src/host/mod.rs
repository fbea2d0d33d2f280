//! Default implementations of the capabilities the evaluator consumes.
//!
//! The engine itself never touches the filesystem, computes a statistic or
//! draws anything; hosts that want different behavior (another file format,
//! another renderer) implement [`Capabilities`] themselves.

pub mod chart;
pub mod loader;
pub mod stats;

use std::path::Path;

use anyhow::Result;

use crate::lang::ast::StatKind;
use crate::lang::caps::{Capabilities, ChartRequest};
use crate::table::Dataset;

/// The capabilities shipped with this crate: CSV loading, local statistics,
/// SVG charts
pub struct HostCapabilities;

impl Capabilities for HostCapabilities {
    fn load_dataset(&self, path: &Path) -> Result<Dataset> {
        loader::load_dataset(path)
    }

    fn compute_statistic(&self, values: &[f64], stat: StatKind) -> Result<f64> {
        stats::compute(values, stat)
    }

    fn render_chart(&self, request: &ChartRequest<'_>) -> Result<Vec<u8>> {
        chart::render(request)
    }
}
