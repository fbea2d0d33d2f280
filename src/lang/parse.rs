//! Command grammar:
//!
//! ```text
//! Program      := Command+
//! ShowCmd      := MOSTRAR DADOS DE ID
//! LoadFileCmd  := CARREGAR DADOS DE STRING COMO ID
//! LoadUpldCmd  := CARREGAR ARQUIVO COMO ID
//! CalcCmd      := CALCULAR (MEDIA | MEDIANA | MODA) DA COLUNA STRING DE ID
//! PlotCmd      := PLOTAR GRAFICO DE (BARRAS | LINHAS) COM EIXO_X STRING
//!                 E EIXO_Y STRING DE ID [ SALVAR COMO STRING ]
//! ```
//!
//! Every rule is selected by its leading keyword, so one token of lookahead
//! suffices; the optional `SALVAR COMO` tail is resolved by the presence of
//! the `SALVAR` keyword. A token that fits no derivation is a syntax error
//! that ends the parse for the remainder of the input. No resynchronization
//! is attempted, so commands after the failure point never run; commands
//! parsed before it have already been handed to the evaluator.

use std::fmt;

use crate::lang::ast::{ChartKind, Command, StatKind, DEFAULT_CHART_FILE};
use crate::lang::lex::{Lexed, Lexer};
use crate::lang::record::{ExecutionLog, Record};
use crate::lang::token::{Token, TokenKind};

/// Fatal-to-the-parse failure; rendered as the user-facing diagnostic
#[derive(Clone, Debug, PartialEq)]
pub enum SyntaxError {
    UnexpectedToken(Token),
    UnexpectedEof,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::UnexpectedToken(tok) => write!(
                f,
                "syntax error at token '{}' (kind: {}) on line {}",
                tok.text, tok.kind, tok.line
            ),
            SyntaxError::UnexpectedEof => write!(f, "syntax error: unexpected end of input"),
        }
    }
}

/// Consumes the token stream one top-level command at a time
///
/// Illegal characters reported by the lexer are recorded in the log as the
/// parser pulls past them; they never reach the grammar.
pub struct Parser {
    lexer: Lexer,
    peeked: Option<Token>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
        }
    }

    fn fill(&mut self, log: &mut ExecutionLog) {
        if self.peeked.is_some() {
            return;
        }

        loop {
            match self.lexer.next() {
                Some(Lexed::Token(tok)) => {
                    self.peeked = Some(tok);
                    return;
                }
                Some(Lexed::Illegal { ch, .. }) => log.push(Record::Error(format!(
                    "illegal character encountered: '{}'",
                    ch
                ))),
                None => return,
            }
        }
    }

    fn peek(&mut self, log: &mut ExecutionLog) -> Option<&Token> {
        self.fill(log);
        self.peeked.as_ref()
    }

    fn bump(&mut self, log: &mut ExecutionLog) -> Option<Token> {
        self.fill(log);
        self.peeked.take()
    }

    fn expect(&mut self, kind: TokenKind, log: &mut ExecutionLog) -> Result<Token, SyntaxError> {
        match self.bump(log) {
            Some(tok) if tok.kind == kind => Ok(tok),
            Some(tok) => Err(SyntaxError::UnexpectedToken(tok)),
            None => Err(SyntaxError::UnexpectedEof),
        }
    }

    fn expect_ident(&mut self, log: &mut ExecutionLog) -> Result<String, SyntaxError> {
        self.expect(TokenKind::Ident, log).map(|tok| tok.text)
    }

    fn expect_str(&mut self, log: &mut ExecutionLog) -> Result<String, SyntaxError> {
        self.expect(TokenKind::Str, log).map(|tok| tok.text)
    }

    /// Parse the next top-level command; `Ok(None)` at end of input
    pub fn next_command(
        &mut self,
        log: &mut ExecutionLog,
    ) -> Result<Option<Command>, SyntaxError> {
        let first = match self.bump(log) {
            Some(tok) => tok,
            None => return Ok(None),
        };

        let cmd = match first.kind {
            TokenKind::Mostrar => self.show(log)?,
            TokenKind::Carregar => self.load(log)?,
            TokenKind::Calcular => self.calculate(log)?,
            TokenKind::Plotar => self.plot(log)?,
            _ => return Err(SyntaxError::UnexpectedToken(first)),
        };

        Ok(Some(cmd))
    }

    fn show(&mut self, log: &mut ExecutionLog) -> Result<Command, SyntaxError> {
        self.expect(TokenKind::Dados, log)?;
        self.expect(TokenKind::De, log)?;
        let variable = self.expect_ident(log)?;

        Ok(Command::ShowData { variable })
    }

    fn load(&mut self, log: &mut ExecutionLog) -> Result<Command, SyntaxError> {
        let selector = match self.bump(log) {
            Some(tok) => tok,
            None => return Err(SyntaxError::UnexpectedEof),
        };

        match selector.kind {
            TokenKind::Dados => {
                self.expect(TokenKind::De, log)?;
                let path = self.expect_str(log)?;
                self.expect(TokenKind::Como, log)?;
                let variable = self.expect_ident(log)?;

                Ok(Command::LoadFromPath { path, variable })
            }
            TokenKind::Arquivo => {
                self.expect(TokenKind::Como, log)?;
                let variable = self.expect_ident(log)?;

                Ok(Command::LoadFromUpload { variable })
            }
            _ => Err(SyntaxError::UnexpectedToken(selector)),
        }
    }

    fn calculate(&mut self, log: &mut ExecutionLog) -> Result<Command, SyntaxError> {
        let stat = match self.bump(log) {
            Some(tok) => match tok.kind {
                TokenKind::Media => StatKind::Mean,
                TokenKind::Mediana => StatKind::Median,
                TokenKind::Moda => StatKind::Mode,
                _ => return Err(SyntaxError::UnexpectedToken(tok)),
            },
            None => return Err(SyntaxError::UnexpectedEof),
        };

        self.expect(TokenKind::Da, log)?;
        self.expect(TokenKind::Coluna, log)?;
        let column = self.expect_str(log)?;
        self.expect(TokenKind::De, log)?;
        let variable = self.expect_ident(log)?;

        Ok(Command::Calculate {
            stat,
            column,
            variable,
        })
    }

    fn plot(&mut self, log: &mut ExecutionLog) -> Result<Command, SyntaxError> {
        self.expect(TokenKind::Grafico, log)?;
        self.expect(TokenKind::De, log)?;

        let kind = match self.bump(log) {
            Some(tok) => match tok.kind {
                TokenKind::Barras => ChartKind::Bar,
                TokenKind::Linhas => ChartKind::Line,
                _ => return Err(SyntaxError::UnexpectedToken(tok)),
            },
            None => return Err(SyntaxError::UnexpectedEof),
        };

        self.expect(TokenKind::Com, log)?;
        self.expect(TokenKind::EixoX, log)?;
        let x = self.expect_str(log)?;
        self.expect(TokenKind::E, log)?;
        self.expect(TokenKind::EixoY, log)?;
        let y = self.expect_str(log)?;
        self.expect(TokenKind::De, log)?;
        let variable = self.expect_ident(log)?;

        let out_file = match self.peek(log).map(|tok| tok.kind) {
            Some(TokenKind::Salvar) => {
                self.bump(log);
                self.expect(TokenKind::Como, log)?;
                self.expect_str(log)?
            }
            _ => DEFAULT_CHART_FILE.to_string(),
        };

        Ok(Command::PlotChart {
            kind,
            x,
            y,
            variable,
            out_file,
        })
    }
}

#[cfg(test)]
fn parse_all(source: &str) -> (Vec<Command>, ExecutionLog, Option<SyntaxError>) {
    let mut log = ExecutionLog::new();
    let mut parser = Parser::new(source);
    let mut cmds = Vec::new();

    loop {
        match parser.next_command(&mut log) {
            Ok(Some(cmd)) => cmds.push(cmd),
            Ok(None) => return (cmds, log, None),
            Err(err) => return (cmds, log, Some(err)),
        }
    }
}

#[test]
fn test_commands() {
    let data = vec![
        (
            "MOSTRAR DADOS DE vendas",
            Command::ShowData {
                variable: "vendas".to_string(),
            },
        ),
        (
            r#"CARREGAR DADOS DE "vendas.csv" COMO v"#,
            Command::LoadFromPath {
                path: "vendas.csv".to_string(),
                variable: "v".to_string(),
            },
        ),
        (
            "CARREGAR ARQUIVO COMO enviado",
            Command::LoadFromUpload {
                variable: "enviado".to_string(),
            },
        ),
        (
            r#"CALCULAR MEDIA DA COLUNA "total" DE v"#,
            Command::Calculate {
                stat: StatKind::Mean,
                column: "total".to_string(),
                variable: "v".to_string(),
            },
        ),
        (
            r#"CALCULAR MODA DA COLUNA "total" DE v"#,
            Command::Calculate {
                stat: StatKind::Mode,
                column: "total".to_string(),
                variable: "v".to_string(),
            },
        ),
        (
            r#"PLOTAR GRAFICO DE BARRAS COM EIXO_X "mes" E EIXO_Y "total" DE v"#,
            Command::PlotChart {
                kind: ChartKind::Bar,
                x: "mes".to_string(),
                y: "total".to_string(),
                variable: "v".to_string(),
                out_file: DEFAULT_CHART_FILE.to_string(),
            },
        ),
        (
            r#"PLOTAR GRAFICO DE LINHAS COM EIXO_X "mes" E EIXO_Y "total" DE v SALVAR COMO "saida.png""#,
            Command::PlotChart {
                kind: ChartKind::Line,
                x: "mes".to_string(),
                y: "total".to_string(),
                variable: "v".to_string(),
                out_file: "saida.png".to_string(),
            },
        ),
    ];

    for (input, expected) in data {
        let (cmds, log, err) = parse_all(input);
        assert_eq!(err, None, "input: {}", input);
        assert!(log.is_empty(), "input: {}", input);
        assert_eq!(cmds, vec![expected], "input: {}", input);
    }
}

#[test]
fn test_case_insensitive_keywords() {
    let upper = parse_all("MOSTRAR DADOS DE d");
    let lower = parse_all("mostrar dados de d");
    let mixed = parse_all("MoStRaR dAdOs De d");

    assert_eq!(upper.0, lower.0);
    assert_eq!(upper.0, mixed.0);
}

#[test]
fn test_program_sequence() {
    let source = r#"
        CARREGAR DADOS DE "vendas.csv" COMO v
        MOSTRAR DADOS DE v
        CALCULAR MEDIANA DA COLUNA "total" DE v
    "#;

    let (cmds, log, err) = parse_all(source);
    assert_eq!(err, None);
    assert!(log.is_empty());
    assert_eq!(cmds.len(), 3);
}

#[test]
fn test_syntax_errors() {
    // (input, offending token text)
    let data = vec![
        // A name colliding with a keyword can never be an identifier
        (r#"CARREGAR DADOS DE "f.csv" COMO media"#, "media"),
        // Missing identifier: the next command's keyword is the offender
        ("MOSTRAR DADOS DE\nMOSTRAR DADOS DE d", "MOSTRAR"),
        // A command cannot start with a non-command keyword
        ("DADOS DE d", "DADOS"),
        // Nor with an identifier
        ("vendas", "vendas"),
        // Identifier where a string literal is required
        ("CARREGAR DADOS DE vendas.csv COMO v", "vendas"),
    ];

    for (input, offender) in data {
        let (_, _, err) = parse_all(input);
        match err {
            Some(SyntaxError::UnexpectedToken(tok)) => {
                assert_eq!(tok.text, offender, "input: {}", input)
            }
            other => panic!("input: {} -> {:?}", input, other),
        }
    }
}

#[test]
fn test_unexpected_eof() {
    let data = vec![
        "MOSTRAR DADOS DE",
        "CARREGAR",
        r#"PLOTAR GRAFICO DE BARRAS COM EIXO_X "a" E EIXO_Y "b" DE v SALVAR COMO"#,
    ];

    for input in data {
        let (_, _, err) = parse_all(input);
        assert_eq!(err, Some(SyntaxError::UnexpectedEof), "input: {}", input);
    }
}

#[test]
fn test_error_message_format() {
    let (_, _, err) = parse_all("MOSTRAR DADOS DE\nMOSTRAR DADOS DE d");
    assert_eq!(
        err.unwrap().to_string(),
        "syntax error at token 'MOSTRAR' (kind: MOSTRAR) on line 2"
    );

    let (_, _, err) = parse_all("MOSTRAR DADOS DE");
    assert_eq!(
        err.unwrap().to_string(),
        "syntax error: unexpected end of input"
    );
}

#[test]
fn test_illegal_characters_reach_the_log() {
    let (cmds, log, err) = parse_all("MOSTRAR @ DADOS DE d");
    assert_eq!(err, None);
    assert_eq!(cmds.len(), 1);
    assert_eq!(
        log,
        vec![Record::Error(
            "illegal character encountered: '@'".to_string()
        )]
    );
}

#[test]
fn test_commands_before_failure_are_kept() {
    let (cmds, _, err) = parse_all("MOSTRAR DADOS DE a\nMOSTRAR DADOS DE\nMOSTRAR DADOS DE b");
    assert_eq!(cmds.len(), 1);
    assert!(err.is_some());
}
