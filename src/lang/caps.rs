use std::path::Path;

use anyhow::Result;

use crate::lang::ast::{ChartKind, StatKind};
use crate::table::{Dataset, Value};

/// Everything the evaluator needs to hand to a chart renderer
///
/// Axis labels are the column names; the title is generated by the plot
/// command. Grid lines are always requested.
pub struct ChartRequest<'a> {
    pub kind: ChartKind,
    pub x: &'a [Value],
    pub y: &'a [Value],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub title: String,
    pub grid: bool,
}

/// External operations the evaluator calls but does not implement
///
/// Implemented by the host and injected into each invocation. Each call is
/// expected to be a bounded, synchronous operation; every `Err` is caught
/// at the evaluator boundary and becomes an `Error` record, never a fault
/// of the run itself.
pub trait Capabilities {
    /// Read the tabular file at `path` into a dataset
    fn load_dataset(&self, path: &Path) -> Result<Dataset>;

    /// Compute `stat` over a column already stripped of missing values
    fn compute_statistic(&self, values: &[f64], stat: StatKind) -> Result<f64>;

    /// Render a chart and return the encoded image bytes
    fn render_chart(&self, request: &ChartRequest<'_>) -> Result<Vec<u8>>;
}
