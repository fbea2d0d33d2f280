use std::fmt;

use anyhow::{ensure, Result};

/// A single cell of a dataset
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// All numbers are internally represented as 64 bit floats to keep things simple
    Number(f64),
    Str(String),
    /// An absent cell; excluded from statistics
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers print without a trailing ".0" so previews and
            // axis labels read like the source data
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Missing => Ok(()),
        }
    }
}

/// A named, ordered sequence of cells
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// An in-memory table: ordered named columns of uniform length
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Create a dataset, checking that every column has the same length
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let len = first.values.len();
            for col in &columns {
                ensure!(
                    col.values.len() == len,
                    "column '{}' has {} rows, expected {}",
                    col.name,
                    col.values.len(),
                    len
                );
            }
        }

        Ok(Self { columns })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Render the first `n` rows as display strings, row-major
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        let rows = self.row_count().min(n);
        (0..rows)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| c.values[i].to_string())
                    .collect()
            })
            .collect()
    }
}

#[test]
fn test_value_display() {
    let data = vec![
        (Value::Number(1.0), "1"),
        (Value::Number(-3.0), "-3"),
        (Value::Number(2.5), "2.5"),
        (Value::Str("norte".to_string()), "norte"),
        (Value::Missing, ""),
    ];

    for (value, expected) in data {
        assert_eq!(value.to_string(), expected);
    }
}

#[test]
fn test_dataset_uniform_lengths() {
    let ok = Dataset::new(vec![
        Column::new("a", vec![Value::Number(1.0), Value::Number(2.0)]),
        Column::new("b", vec![Value::Missing, Value::Str("x".to_string())]),
    ]);
    assert!(ok.is_ok());

    let bad = Dataset::new(vec![
        Column::new("a", vec![Value::Number(1.0), Value::Number(2.0)]),
        Column::new("b", vec![Value::Number(3.0)]),
    ]);
    assert!(bad.is_err());
}

#[test]
fn test_dataset_head() {
    let ds = Dataset::new(vec![
        Column::new(
            "mes",
            (1..=7).map(|i| Value::Number(i as f64)).collect(),
        ),
        Column::new(
            "vendas",
            (1..=7).map(|i| Value::Number((i * 10) as f64)).collect(),
        ),
    ])
    .unwrap();

    let head = ds.head(5);
    assert_eq!(head.len(), 5);
    assert_eq!(head[0], vec!["1".to_string(), "10".to_string()]);
    assert_eq!(head[4], vec!["5".to_string(), "50".to_string()]);

    // Shorter than the preview window
    let short = Dataset::new(vec![Column::new("a", vec![Value::Number(1.0)])]).unwrap();
    assert_eq!(short.head(5).len(), 1);
}

#[test]
fn test_dataset_lookup() {
    let ds = Dataset::new(vec![
        Column::new("a", vec![Value::Number(1.0)]),
        Column::new("b", vec![Value::Number(2.0)]),
    ])
    .unwrap();

    assert_eq!(ds.column_names(), vec!["a", "b"]);
    assert!(ds.column("a").is_some());
    assert!(ds.column("c").is_none());
    assert_eq!(ds.row_count(), 1);
    assert_eq!(ds.column_count(), 2);
}
