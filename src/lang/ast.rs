use std::fmt;

/// File name an image record carries when a plot command has no
/// `SALVAR COMO` clause
pub const DEFAULT_CHART_FILE: &str = "grafico_gerado.png";

/// Number of rows a `MOSTRAR DADOS` preview shows
pub const PREVIEW_ROWS: usize = 5;

/// Summary statistic selected by a `CALCULAR` command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatKind {
    Mean,
    Median,
    Mode,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKind::Mean => "Media",
            StatKind::Median => "Mediana",
            StatKind::Mode => "Moda",
        };

        write!(f, "{}", name)
    }
}

/// Chart family selected by a `PLOTAR` command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChartKind {
    Bar,
    Line,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "Barras",
            ChartKind::Line => "Linhas",
        };

        write!(f, "{}", name)
    }
}

/// One parsed, executable statement
///
/// Every command is fully self-contained; defaults (the plot output file
/// name) are substituted at parse time, so no command references another.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// `MOSTRAR DADOS DE <ident>`
    ShowData { variable: String },
    /// `CARREGAR DADOS DE <string> COMO <ident>`
    LoadFromPath { path: String, variable: String },
    /// `CARREGAR ARQUIVO COMO <ident>`
    LoadFromUpload { variable: String },
    /// `CALCULAR <stat> DA COLUNA <string> DE <ident>`
    Calculate {
        stat: StatKind,
        column: String,
        variable: String,
    },
    /// `PLOTAR GRAFICO DE <kind> COM EIXO_X <string> E EIXO_Y <string>
    /// DE <ident> [SALVAR COMO <string>]`
    PlotChart {
        kind: ChartKind,
        x: String,
        y: String,
        variable: String,
        out_file: String,
    },
}

#[test]
fn test_stat_display() {
    assert_eq!(StatKind::Mean.to_string(), "Media");
    assert_eq!(StatKind::Median.to_string(), "Mediana");
    assert_eq!(StatKind::Mode.to_string(), "Moda");
}

#[test]
fn test_chart_display() {
    assert_eq!(ChartKind::Bar.to_string(), "Barras");
    assert_eq!(ChartKind::Line.to_string(), "Linhas");
}
