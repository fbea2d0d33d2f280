/// One entry of the execution log
///
/// The log is the sole observable output of a run besides the mutated
/// environment. Each command appends exactly one record (or none at all if
/// parsing stopped before it was reached); the caller decides how records
/// are rendered.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    /// Informational text, e.g. a load confirmation or a computed statistic
    Message(String),
    /// A recoverable failure, already worded for the user
    Error(String),
    /// Preview of the first rows of a dataset, pre-rendered to strings
    Table {
        variable: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// A rendered chart: encoded image bytes plus the file name the plot
    /// command chose for them
    Image { file_name: String, bytes: Vec<u8> },
}

/// Ordered, append-only sequence of records produced by one invocation
pub type ExecutionLog = Vec<Record>;
