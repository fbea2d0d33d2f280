use std::path::Path;

use crate::lang::caps::Capabilities;
use crate::lang::env::Environment;
use crate::lang::eval::Eval;
use crate::lang::parse::Parser;
use crate::lang::record::{ExecutionLog, Record};

/// Execute one block of commands against the caller's environment
///
/// Parsing and evaluation run in lockstep, command by command: each
/// successfully parsed top-level command is evaluated before the next one
/// is parsed, so a syntax error later in the input leaves the results of
/// everything before it in the log. A syntax error ends the run; a semantic
/// error only ends its own command.
///
/// `upload` is the path of a file submitted alongside the command batch; it
/// applies to every `CARREGAR ARQUIVO` in this invocation and to nothing
/// else.
pub fn execute(
    source: &str,
    env: &mut Environment,
    upload: Option<&Path>,
    caps: &dyn Capabilities,
) -> ExecutionLog {
    let mut log = ExecutionLog::new();
    let mut parser = Parser::new(source);
    let eval = Eval::new(caps, upload);

    loop {
        match parser.next_command(&mut log) {
            Ok(Some(cmd)) => eval.eval(&cmd, env, &mut log),
            Ok(None) => break,
            Err(err) => {
                log.push(Record::Error(err.to_string()));
                break;
            }
        }
    }

    log
}

#[cfg(test)]
mod tests {
    use std::io;

    use anyhow::Result;

    use super::*;
    use crate::host::stats;
    use crate::lang::ast::StatKind;
    use crate::lang::caps::ChartRequest;
    use crate::table::{Column, Dataset, Value};

    /// In-memory capabilities: one known file, real statistics, a canned
    /// chart
    struct TestCaps;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "mes",
                vec![
                    Value::Str("jan".to_string()),
                    Value::Str("fev".to_string()),
                    Value::Str("mar".to_string()),
                    Value::Str("abr".to_string()),
                ],
            ),
            Column::new(
                "x",
                vec![
                    Value::Number(1.0),
                    Value::Number(2.0),
                    Value::Number(3.0),
                    Value::Missing,
                ],
            ),
            Column::new(
                "empate",
                vec![
                    Value::Number(1.0),
                    Value::Number(1.0),
                    Value::Number(2.0),
                    Value::Number(2.0),
                ],
            ),
        ])
        .unwrap()
    }

    impl Capabilities for TestCaps {
        fn load_dataset(&self, path: &std::path::Path) -> Result<Dataset> {
            if path == std::path::Path::new("vendas.csv") {
                Ok(sample())
            } else {
                Err(anyhow::Error::from(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no such file",
                )))
            }
        }

        fn compute_statistic(&self, values: &[f64], stat: StatKind) -> Result<f64> {
            stats::compute(values, stat)
        }

        fn render_chart(&self, _request: &ChartRequest<'_>) -> Result<Vec<u8>> {
            Ok(b"<svg/>".to_vec())
        }
    }

    fn run(source: &str) -> (ExecutionLog, Environment) {
        let mut env = Environment::new();
        let log = execute(source, &mut env, None, &TestCaps);
        (log, env)
    }

    fn run_loaded(source: &str) -> ExecutionLog {
        let mut env = Environment::new();
        env.insert("d", sample());
        execute(source, &mut env, None, &TestCaps)
    }

    #[test]
    fn test_one_record_per_command() {
        let (log, env) = run(r#"CARREGAR DADOS DE "vendas.csv" COMO d
            MOSTRAR DADOS DE d
            CALCULAR MEDIA DA COLUNA "x" DE d
            PLOTAR GRAFICO DE BARRAS COM EIXO_X "mes" E EIXO_Y "x" DE d"#);

        assert_eq!(log.len(), 4);
        assert!(matches!(log[0], Record::Message(_)));
        assert!(matches!(log[1], Record::Table { .. }));
        assert!(matches!(log[2], Record::Message(_)));
        assert!(matches!(log[3], Record::Image { .. }));
        assert!(env.contains("d"));
    }

    #[test]
    fn test_mean_excludes_missing() {
        // x = [1, 2, 3, missing]: the mean is over the three numbers
        let log = run_loaded(r#"CALCULAR MEDIA DA COLUNA "x" DE d"#);
        assert_eq!(
            log,
            vec![Record::Message(
                "the Media of column 'x' is: 2.00".to_string()
            )]
        );
    }

    #[test]
    fn test_mode_tie_takes_smallest() {
        let log = run_loaded(r#"CALCULAR MODA DA COLUNA "empate" DE d"#);
        assert_eq!(
            log,
            vec![Record::Message(
                "the Moda of column 'empate' is: 1.00".to_string()
            )]
        );
    }

    #[test]
    fn test_case_insensitive_source() {
        let upper = run_loaded("MOSTRAR DADOS DE d");
        let lower = run_loaded("mostrar dados de d");
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 1);
    }

    #[test]
    fn test_failed_load_never_binds() {
        // The file is absent: one not-found error, then the show command
        // still runs and reports the unbound variable
        let (log, env) = run("CARREGAR DADOS DE \"missing.csv\" COMO d\nMOSTRAR DADOS DE d");

        assert_eq!(
            log,
            vec![
                Record::Error("file 'missing.csv' not found".to_string()),
                Record::Error("data variable 'd' does not exist".to_string()),
            ]
        );
        assert!(!env.contains("d"));
    }

    #[test]
    fn test_syntax_error_stops_the_batch() {
        // The second, otherwise-valid command never executes
        let (log, _) = run("MOSTRAR DADOS DE\nMOSTRAR DADOS DE d");

        assert_eq!(
            log,
            vec![Record::Error(
                "syntax error at token 'MOSTRAR' (kind: MOSTRAR) on line 2".to_string()
            )]
        );
    }

    #[test]
    fn test_commands_before_syntax_error_already_ran() {
        let mut env = Environment::new();
        env.insert("d", sample());
        let log = execute(
            "MOSTRAR DADOS DE d\nMOSTRAR DADOS DE",
            &mut env,
            None,
            &TestCaps,
        );

        assert_eq!(log.len(), 2);
        assert!(matches!(log[0], Record::Table { .. }));
        assert_eq!(
            log[1],
            Record::Error("syntax error: unexpected end of input".to_string())
        );
    }

    #[test]
    fn test_keyword_collision_is_a_syntax_error() {
        let (log, env) = run(r#"CARREGAR DADOS DE "vendas.csv" COMO media"#);

        assert_eq!(
            log,
            vec![Record::Error(
                "syntax error at token 'media' (kind: MEDIA) on line 1".to_string()
            )]
        );
        assert!(env.is_empty());
    }

    #[test]
    fn test_semantic_errors_do_not_stop_the_batch() {
        let log = run_loaded(
            "MOSTRAR DADOS DE nao_existe\nMOSTRAR DADOS DE d",
        );

        assert_eq!(log.len(), 2);
        assert_eq!(
            log[0],
            Record::Error("data variable 'nao_existe' does not exist".to_string())
        );
        assert!(matches!(log[1], Record::Table { .. }));
    }

    #[test]
    fn test_illegal_character_is_recorded_and_skipped() {
        let log = run_loaded("MOSTRAR DADOS DE d ?\nMOSTRAR DADOS DE d");

        assert_eq!(log.len(), 3);
        assert!(matches!(log[0], Record::Table { .. }));
        assert_eq!(
            log[1],
            Record::Error("illegal character encountered: '?'".to_string())
        );
        assert!(matches!(log[2], Record::Table { .. }));
    }

    #[test]
    fn test_default_plot_file_name() {
        let log =
            run_loaded(r#"PLOTAR GRAFICO DE LINHAS COM EIXO_X "mes" E EIXO_Y "x" DE d"#);

        match &log[0] {
            Record::Image { file_name, .. } => assert_eq!(file_name, "grafico_gerado.png"),
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_named_plot_file_name() {
        let log = run_loaded(
            r#"PLOTAR GRAFICO DE LINHAS COM EIXO_X "mes" E EIXO_Y "x" DE d SALVAR COMO "meu.png""#,
        );

        match &log[0] {
            Record::Image { file_name, .. } => assert_eq!(file_name, "meu.png"),
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_load_overwrites_binding() {
        let mut env = Environment::new();
        env.insert(
            "d",
            Dataset::new(vec![Column::new("antiga", vec![Value::Number(0.0)])]).unwrap(),
        );

        let log = execute(
            r#"CARREGAR DADOS DE "vendas.csv" COMO d"#,
            &mut env,
            None,
            &TestCaps,
        );

        assert_eq!(log.len(), 1);
        let ds = env.get("d").unwrap();
        assert!(ds.column("antiga").is_none());
        assert!(ds.column("mes").is_some());
    }

    #[test]
    fn test_upload_applies_to_whole_invocation() {
        let mut env = Environment::new();
        let log = execute(
            "CARREGAR ARQUIVO COMO a\nCARREGAR ARQUIVO COMO b",
            &mut env,
            Some(std::path::Path::new("vendas.csv")),
            &TestCaps,
        );

        assert_eq!(
            log,
            vec![
                Record::Message(
                    "uploaded file successfully loaded into variable 'a'".to_string()
                ),
                Record::Message(
                    "uploaded file successfully loaded into variable 'b'".to_string()
                ),
            ]
        );
        assert!(env.contains("a") && env.contains("b"));
    }

    #[test]
    fn test_empty_source_is_an_empty_log() {
        let (log, env) = run("");
        assert!(log.is_empty());
        assert!(env.is_empty());
    }
}
