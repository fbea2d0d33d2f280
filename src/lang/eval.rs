use std::io;
use std::path::Path;

use anyhow::{bail, Result};

use crate::lang::ast::{ChartKind, Command, StatKind, PREVIEW_ROWS};
use crate::lang::caps::{Capabilities, ChartRequest};
use crate::lang::env::Environment;
use crate::lang::record::{ExecutionLog, Record};
use crate::table::{Column, Value};

/// Interprets parsed commands against the environment
///
/// Execution is fail-soft at command granularity: every failure becomes an
/// `Error` record and the next command still runs. Nothing here panics or
/// propagates an error to the caller; capability failures are caught at
/// this boundary.
pub struct Eval<'a> {
    caps: &'a dyn Capabilities,
    /// Path of a file uploaded alongside the command batch, if any
    upload: Option<&'a Path>,
}

impl<'a> Eval<'a> {
    pub fn new(caps: &'a dyn Capabilities, upload: Option<&'a Path>) -> Self {
        Self { caps, upload }
    }

    /// Evaluate one command, appending exactly one record to the log
    pub fn eval(&self, cmd: &Command, env: &mut Environment, log: &mut ExecutionLog) {
        let record = match cmd {
            Command::ShowData { variable } => self.show(variable, env),
            Command::LoadFromPath { path, variable } => self.load(path, variable, false, env),
            Command::LoadFromUpload { variable } => self.load_upload(variable, env),
            Command::Calculate {
                stat,
                column,
                variable,
            } => self.calculate(*stat, column, variable, env),
            Command::PlotChart {
                kind,
                x,
                y,
                variable,
                out_file,
            } => self.plot(*kind, x, y, variable, out_file, env),
        };

        log.push(record);
    }

    fn show(&self, variable: &str, env: &Environment) -> Record {
        let dataset = match env.get(variable) {
            Some(dataset) => dataset,
            None => return unknown_variable(variable),
        };

        Record::Table {
            variable: variable.to_string(),
            columns: dataset
                .column_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            rows: dataset.head(PREVIEW_ROWS),
        }
    }

    fn load(&self, path: &str, variable: &str, uploaded: bool, env: &mut Environment) -> Record {
        if !supported_format(path) {
            return Record::Error("unsupported file format, use .csv or .xlsx".to_string());
        }

        match self.caps.load_dataset(Path::new(path)) {
            Ok(dataset) => {
                env.insert(variable, dataset);
                if uploaded {
                    Record::Message(format!(
                        "uploaded file successfully loaded into variable '{}'",
                        variable
                    ))
                } else {
                    Record::Message(format!(
                        "data from file '{}' successfully loaded into variable '{}'",
                        path, variable
                    ))
                }
            }
            Err(err) => Record::Error(load_failure(path, &err)),
        }
    }

    fn load_upload(&self, variable: &str, env: &mut Environment) -> Record {
        let path = match self.upload {
            Some(path) => path.to_string_lossy().into_owned(),
            None => {
                return Record::Error(
                    "'CARREGAR ARQUIVO' can only be used with a file upload".to_string(),
                )
            }
        };

        self.load(&path, variable, true, env)
    }

    fn calculate(
        &self,
        stat: StatKind,
        column: &str,
        variable: &str,
        env: &Environment,
    ) -> Record {
        let dataset = match env.get(variable) {
            Some(dataset) => dataset,
            None => return unknown_variable(variable),
        };

        let col = match dataset.column(column) {
            Some(col) => col,
            None => {
                return Record::Error(format!(
                    "column '{}' does not exist in variable '{}'",
                    column, variable
                ))
            }
        };

        match numeric_cells(col).and_then(|values| self.caps.compute_statistic(&values, stat)) {
            Ok(value) => Record::Message(format!(
                "the {} of column '{}' is: {:.2}",
                stat, column, value
            )),
            Err(err) => Record::Error(format!("error computing the {}: {}", stat, err)),
        }
    }

    fn plot(
        &self,
        kind: ChartKind,
        x: &str,
        y: &str,
        variable: &str,
        out_file: &str,
        env: &Environment,
    ) -> Record {
        let dataset = match env.get(variable) {
            Some(dataset) => dataset,
            None => return unknown_variable(variable),
        };

        let (x_col, y_col) = match (dataset.column(x), dataset.column(y)) {
            (Some(x_col), Some(y_col)) => (x_col, y_col),
            _ => {
                return Record::Error(format!(
                    "one or both of the columns '{}', '{}' do not exist in variable '{}'",
                    x, y, variable
                ))
            }
        };

        let request = ChartRequest {
            kind,
            x: x_col.values(),
            y: y_col.values(),
            x_label: x,
            y_label: y,
            title: format!("Gráfico de {} de {} por {}", kind, y, x),
            grid: true,
        };

        match self.caps.render_chart(&request) {
            Ok(bytes) => Record::Image {
                file_name: out_file.to_string(),
                bytes,
            },
            Err(err) => Record::Error(format!(
                "an error occurred while rendering the chart: {}",
                err
            )),
        }
    }
}

fn unknown_variable(name: &str) -> Record {
    Record::Error(format!("data variable '{}' does not exist", name))
}

fn supported_format(path: &str) -> bool {
    path.ends_with(".csv") || path.ends_with(".xlsx")
}

/// Collect the column's numbers, dropping missing cells
///
/// Statistics are only defined over numbers; a string cell anywhere in the
/// column is a computation failure, not a silent skip.
fn numeric_cells(col: &Column) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for value in col.values() {
        match value {
            Value::Number(n) => values.push(*n),
            Value::Missing => (),
            Value::Str(_) => bail!("column '{}' contains non-numeric values", col.name()),
        }
    }

    Ok(values)
}

fn load_failure(path: &str, err: &anyhow::Error) -> String {
    match err.downcast_ref::<io::Error>() {
        Some(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
            format!("file '{}' not found", path)
        }
        _ => format!("an error occurred while loading the file: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::table::Dataset;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "mes",
                vec![
                    Value::Str("jan".to_string()),
                    Value::Str("fev".to_string()),
                    Value::Str("mar".to_string()),
                ],
            ),
            Column::new(
                "total",
                vec![Value::Number(10.0), Value::Number(20.0), Value::Missing],
            ),
        ])
        .unwrap()
    }

    struct StubCaps;

    impl Capabilities for StubCaps {
        fn load_dataset(&self, path: &Path) -> Result<Dataset> {
            if path == Path::new("vendas.csv") || path == Path::new("upload.csv") {
                Ok(sample())
            } else {
                Err(anyhow::Error::from(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no such file",
                )))
            }
        }

        fn compute_statistic(&self, values: &[f64], _stat: StatKind) -> Result<f64> {
            if values.is_empty() {
                return Err(anyhow!("cannot compute over an empty column"));
            }

            Ok(values.iter().sum::<f64>() / values.len() as f64)
        }

        fn render_chart(&self, _request: &ChartRequest<'_>) -> Result<Vec<u8>> {
            Ok(b"<svg/>".to_vec())
        }
    }

    fn run_one(cmd: Command, env: &mut Environment, upload: Option<&Path>) -> Record {
        let mut log = ExecutionLog::new();
        Eval::new(&StubCaps, upload).eval(&cmd, env, &mut log);
        assert_eq!(log.len(), 1);
        log.remove(0)
    }

    #[test]
    fn test_unknown_variable_wording_everywhere() {
        let commands = vec![
            Command::ShowData {
                variable: "d".to_string(),
            },
            Command::Calculate {
                stat: StatKind::Mean,
                column: "x".to_string(),
                variable: "d".to_string(),
            },
            Command::PlotChart {
                kind: ChartKind::Bar,
                x: "a".to_string(),
                y: "b".to_string(),
                variable: "d".to_string(),
                out_file: "out.png".to_string(),
            },
        ];

        for cmd in commands {
            let mut env = Environment::new();
            assert_eq!(
                run_one(cmd, &mut env, None),
                Record::Error("data variable 'd' does not exist".to_string())
            );
        }
    }

    #[test]
    fn test_show_previews_first_rows() {
        let mut env = Environment::new();
        env.insert("v", sample());

        let record = run_one(
            Command::ShowData {
                variable: "v".to_string(),
            },
            &mut env,
            None,
        );

        match record {
            Record::Table {
                variable,
                columns,
                rows,
            } => {
                assert_eq!(variable, "v");
                assert_eq!(columns, vec!["mes", "total"]);
                assert_eq!(rows.len(), 3);
                assert_eq!(rows[0], vec!["jan".to_string(), "10".to_string()]);
                assert_eq!(rows[2], vec!["mar".to_string(), "".to_string()]);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_load_binds_and_reports() {
        let mut env = Environment::new();
        let record = run_one(
            Command::LoadFromPath {
                path: "vendas.csv".to_string(),
                variable: "v".to_string(),
            },
            &mut env,
            None,
        );

        assert_eq!(
            record,
            Record::Message(
                "data from file 'vendas.csv' successfully loaded into variable 'v'".to_string()
            )
        );
        assert!(env.contains("v"));
    }

    #[test]
    fn test_load_failures() {
        let data = vec![
            (
                "missing.csv",
                Record::Error("file 'missing.csv' not found".to_string()),
            ),
            (
                "dados.txt",
                Record::Error("unsupported file format, use .csv or .xlsx".to_string()),
            ),
        ];

        for (path, expected) in data {
            let mut env = Environment::new();
            let record = run_one(
                Command::LoadFromPath {
                    path: path.to_string(),
                    variable: "v".to_string(),
                },
                &mut env,
                None,
            );

            assert_eq!(record, expected, "path: {}", path);
            assert!(!env.contains("v"), "path: {}", path);
        }
    }

    #[test]
    fn test_upload_requires_a_path() {
        let mut env = Environment::new();
        let record = run_one(
            Command::LoadFromUpload {
                variable: "v".to_string(),
            },
            &mut env,
            None,
        );

        assert_eq!(
            record,
            Record::Error("'CARREGAR ARQUIVO' can only be used with a file upload".to_string())
        );
    }

    #[test]
    fn test_upload_with_path() {
        let mut env = Environment::new();
        let record = run_one(
            Command::LoadFromUpload {
                variable: "v".to_string(),
            },
            &mut env,
            Some(Path::new("upload.csv")),
        );

        assert_eq!(
            record,
            Record::Message("uploaded file successfully loaded into variable 'v'".to_string())
        );
        assert!(env.contains("v"));
    }

    #[test]
    fn test_calculate_drops_missing_cells() {
        let mut env = Environment::new();
        env.insert("v", sample());

        // Stub computes the mean: (10 + 20) / 2, the missing cell dropped
        let record = run_one(
            Command::Calculate {
                stat: StatKind::Mean,
                column: "total".to_string(),
                variable: "v".to_string(),
            },
            &mut env,
            None,
        );

        assert_eq!(
            record,
            Record::Message("the Media of column 'total' is: 15.00".to_string())
        );
    }

    #[test]
    fn test_calculate_errors() {
        let mut env = Environment::new();
        env.insert("v", sample());

        let unknown_column = run_one(
            Command::Calculate {
                stat: StatKind::Median,
                column: "nope".to_string(),
                variable: "v".to_string(),
            },
            &mut env,
            None,
        );
        assert_eq!(
            unknown_column,
            Record::Error("column 'nope' does not exist in variable 'v'".to_string())
        );

        let non_numeric = run_one(
            Command::Calculate {
                stat: StatKind::Mode,
                column: "mes".to_string(),
                variable: "v".to_string(),
            },
            &mut env,
            None,
        );
        assert_eq!(
            non_numeric,
            Record::Error(
                "error computing the Moda: column 'mes' contains non-numeric values".to_string()
            )
        );
    }

    #[test]
    fn test_plot_success_and_missing_columns() {
        let mut env = Environment::new();
        env.insert("v", sample());

        let ok = run_one(
            Command::PlotChart {
                kind: ChartKind::Bar,
                x: "mes".to_string(),
                y: "total".to_string(),
                variable: "v".to_string(),
                out_file: "grafico_gerado.png".to_string(),
            },
            &mut env,
            None,
        );
        assert_eq!(
            ok,
            Record::Image {
                file_name: "grafico_gerado.png".to_string(),
                bytes: b"<svg/>".to_vec(),
            }
        );

        let bad = run_one(
            Command::PlotChart {
                kind: ChartKind::Line,
                x: "mes".to_string(),
                y: "nope".to_string(),
                variable: "v".to_string(),
                out_file: "grafico_gerado.png".to_string(),
            },
            &mut env,
            None,
        );
        assert_eq!(
            bad,
            Record::Error(
                "one or both of the columns 'mes', 'nope' do not exist in variable 'v'"
                    .to_string()
            )
        );
    }
}
