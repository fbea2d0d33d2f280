use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Result};
use log::info;

use crate::table::{Column, Dataset, Value};

/// Read the tabular file at `path` into a dataset
///
/// The evaluator has already dispatched on the extension, so anything other
/// than `.csv`/`.xlsx` arriving here is a caller bug, reported as an error
/// all the same.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => read_csv(path),
        Some("xlsx") => bail!("spreadsheet (.xlsx) loading is not supported by this build"),
        _ => bail!("unsupported file format, use .csv or .xlsx"),
    }
}

fn read_csv(path: &Path) -> Result<Dataset> {
    // No context wrapper: a not-found failure must stay downcastable so the
    // evaluator can word it precisely
    let text = fs::read_to_string(path)?;
    let dataset = parse_csv(&text)?;
    info!(
        "loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );

    Ok(dataset)
}

/// Parse CSV text: header row, comma separation, minimal quoting
///
/// An empty cell is a missing value, a cell that parses as a number is a
/// number, anything else is a string. Rows with a field count different
/// from the header are rejected.
fn parse_csv(text: &str) -> Result<Dataset> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = match lines.next() {
        Some(line) => split_fields(line),
        None => bail!("file has no header row"),
    };

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); header.len()];
    for (i, line) in lines.enumerate() {
        let fields = split_fields(line);
        ensure!(
            fields.len() == header.len(),
            "row {} has {} fields, expected {}",
            i + 2,
            fields.len(),
            header.len()
        );

        for (column, field) in columns.iter_mut().zip(fields) {
            column.push(cell(&field));
        }
    }

    let columns = header
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();

    Dataset::new(columns)
}

/// Split one line into fields, honoring `"..."` quoting with `""` escapes
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);

    fields
}

fn cell(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Value::Missing
    } else if let Ok(n) = trimmed.parse::<f64>() {
        Value::Number(n)
    } else {
        Value::Str(field.to_string())
    }
}

#[test]
fn test_parse_csv() {
    let text = "mes,total\njan,10\nfev,20.5\nmar,\n";
    let ds = parse_csv(text).unwrap();

    assert_eq!(ds.column_names(), vec!["mes", "total"]);
    assert_eq!(ds.row_count(), 3);
    assert_eq!(
        ds.column("mes").unwrap().values(),
        &[
            Value::Str("jan".to_string()),
            Value::Str("fev".to_string()),
            Value::Str("mar".to_string()),
        ]
    );
    assert_eq!(
        ds.column("total").unwrap().values(),
        &[Value::Number(10.0), Value::Number(20.5), Value::Missing]
    );
}

#[test]
fn test_parse_csv_quoting() {
    let text = "nome,nota\n\"a, b\",1\n\"diz \"\"oi\"\"\",2\n";
    let ds = parse_csv(text).unwrap();

    assert_eq!(
        ds.column("nome").unwrap().values(),
        &[
            Value::Str("a, b".to_string()),
            Value::Str("diz \"oi\"".to_string()),
        ]
    );
}

#[test]
fn test_parse_csv_rejects_ragged_rows() {
    let err = parse_csv("a,b\n1,2,3\n").unwrap_err();
    assert_eq!(err.to_string(), "row 2 has 3 fields, expected 2");
}

#[test]
fn test_parse_csv_empty_input() {
    assert!(parse_csv("").is_err());
    assert!(parse_csv("\n  \n").is_err());
}

#[test]
fn test_parse_csv_negative_and_blank_lines() {
    let text = "x\n-1.5\n\n2e3\n";
    let ds = parse_csv(text).unwrap();
    assert_eq!(
        ds.column("x").unwrap().values(),
        &[Value::Number(-1.5), Value::Number(2000.0)]
    );
}

#[test]
fn test_load_dataset_rejects_xlsx() {
    assert!(load_dataset(Path::new("planilha.xlsx")).is_err());
}
