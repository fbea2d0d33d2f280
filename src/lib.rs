//! A small command language over named, in-memory tabular datasets: load
//! them from files, preview them, compute summary statistics on a column,
//! and render bar/line charts.
//!
//! The library is the language core: lexer, command grammar and evaluator.
//! A run takes a block of source text plus a caller-owned [`Environment`]
//! and returns an [`ExecutionLog`] of typed records. File loading,
//! statistics and chart rendering are [`Capabilities`] the caller injects;
//! [`host`] provides the default set (CSV files, local statistics, SVG
//! charts).
//!
//! ```
//! use tablang::{execute, Environment, Record};
//! use tablang::host::HostCapabilities;
//!
//! let mut env = Environment::new();
//! let log = execute("MOSTRAR DADOS DE vendas", &mut env, None, &HostCapabilities);
//! assert_eq!(
//!     log,
//!     vec![Record::Error("data variable 'vendas' does not exist".to_string())]
//! );
//! ```

pub mod host;
pub mod lang;
pub mod table;

pub use lang::ast::{ChartKind, Command, StatKind};
pub use lang::caps::{Capabilities, ChartRequest};
pub use lang::env::Environment;
pub use lang::record::{ExecutionLog, Record};
pub use lang::runtime::execute;
pub use table::{Column, Dataset, Value};
