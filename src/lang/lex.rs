use crate::lang::token::{Token, TokenKind, KEYWORDS};

/// One lexing step: a token, or an illegal character the scanner stepped over
///
/// Illegal characters are not fatal: the caller records them and keeps
/// pulling tokens
#[derive(Clone, Debug, PartialEq)]
pub enum Lexed {
    Token(Token),
    Illegal { ch: char, line: u32 },
}

/// Converts source text into a lazy sequence of tokens
///
/// Space, tab and carriage return are skipped. Newlines advance the line
/// counter (used only for diagnostics) and are otherwise skipped.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Scan a string literal; the opening quote has been consumed
    ///
    /// The value is the text strictly between the quotes, no escape
    /// processing. A quote with no closing partner is an illegal character
    /// and scanning resumes right after it.
    fn string(&mut self) -> Lexed {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '"' {
                let text: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Lexed::Token(Token::new(TokenKind::Str, text, self.line));
            }
            self.pos += 1;
        }

        self.pos = start;
        Lexed::Illegal {
            ch: '"',
            line: self.line,
        }
    }

    /// Scan an identifier or keyword: letter-or-underscore, then
    /// letters/digits/underscores
    ///
    /// The text is case-folded to upper case and looked up in the reserved
    /// set; a match always wins over a user identifier.
    fn ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let kind = KEYWORDS
            .get(text.to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(TokenKind::Ident);

        Token::new(kind, text, self.line)
    }
}

impl Iterator for Lexer {
    type Item = Lexed;

    fn next(&mut self) -> Option<Lexed> {
        loop {
            let c = self.peek()?;
            match c {
                ' ' | '\t' | '\r' => self.pos += 1,
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                }
                '"' => {
                    self.pos += 1;
                    return Some(self.string());
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    return Some(Lexed::Token(self.ident()))
                }
                c => {
                    self.pos += 1;
                    return Some(Lexed::Illegal { ch: c, line: self.line });
                }
            }
        }
    }
}

#[cfg(test)]
fn kinds(source: &str) -> Vec<Lexed> {
    Lexer::new(source).collect()
}

#[test]
fn test_keywords_and_idents() {
    let data = vec![
        ("MOSTRAR", TokenKind::Mostrar, "MOSTRAR"),
        ("mostrar", TokenKind::Mostrar, "mostrar"),
        ("MoStRaR", TokenKind::Mostrar, "MoStRaR"),
        ("eixo_x", TokenKind::EixoX, "eixo_x"),
        ("media", TokenKind::Media, "media"),
        ("vendas", TokenKind::Ident, "vendas"),
        ("_v1", TokenKind::Ident, "_v1"),
        ("e2e", TokenKind::Ident, "e2e"),
    ];

    for (input, kind, text) in data {
        assert_eq!(
            kinds(input),
            vec![Lexed::Token(Token::new(kind, text, 1))],
            "input: {}",
            input
        );
    }
}

#[test]
fn test_string_literal() {
    assert_eq!(
        kinds(r#""dados.csv""#),
        vec![Lexed::Token(Token::new(TokenKind::Str, "dados.csv", 1))]
    );
    // No escape processing: backslashes are ordinary characters
    assert_eq!(
        kinds(r#""a\b""#),
        vec![Lexed::Token(Token::new(TokenKind::Str, r"a\b", 1))]
    );
    assert_eq!(
        kinds(r#""""#),
        vec![Lexed::Token(Token::new(TokenKind::Str, "", 1))]
    );
}

#[test]
fn test_unterminated_string() {
    // The lone quote is an illegal character; scanning resumes after it
    assert_eq!(
        kinds("\"abc"),
        vec![
            Lexed::Illegal { ch: '"', line: 1 },
            Lexed::Token(Token::new(TokenKind::Ident, "abc", 1)),
        ]
    );
}

#[test]
fn test_illegal_character_recovery() {
    assert_eq!(
        kinds("mostrar $ dados"),
        vec![
            Lexed::Token(Token::new(TokenKind::Mostrar, "mostrar", 1)),
            Lexed::Illegal { ch: '$', line: 1 },
            Lexed::Token(Token::new(TokenKind::Dados, "dados", 1)),
        ]
    );
}

#[test]
fn test_line_numbers() {
    assert_eq!(
        kinds("a\nb\n\nc"),
        vec![
            Lexed::Token(Token::new(TokenKind::Ident, "a", 1)),
            Lexed::Token(Token::new(TokenKind::Ident, "b", 2)),
            Lexed::Token(Token::new(TokenKind::Ident, "c", 4)),
        ]
    );
}

#[test]
fn test_whole_command() {
    let toks = kinds(r#"CARREGAR DADOS DE "vendas.csv" COMO v"#);
    let expected = vec![
        Lexed::Token(Token::new(TokenKind::Carregar, "CARREGAR", 1)),
        Lexed::Token(Token::new(TokenKind::Dados, "DADOS", 1)),
        Lexed::Token(Token::new(TokenKind::De, "DE", 1)),
        Lexed::Token(Token::new(TokenKind::Str, "vendas.csv", 1)),
        Lexed::Token(Token::new(TokenKind::Como, "COMO", 1)),
        Lexed::Token(Token::new(TokenKind::Ident, "v", 1)),
    ];
    assert_eq!(toks, expected);
}
