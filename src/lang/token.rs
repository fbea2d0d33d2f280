use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

/// Token kinds: the reserved keyword set plus identifiers and string literals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Carregar,
    Dados,
    De,
    Como,
    Mostrar,
    Calcular,
    Media,
    Mediana,
    Moda,
    Da,
    Coluna,
    Plotar,
    Grafico,
    Barras,
    Linhas,
    Com,
    EixoX,
    EixoY,
    E,
    Salvar,
    Arquivo,
    Ident,
    Str,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Carregar => "CARREGAR",
            TokenKind::Dados => "DADOS",
            TokenKind::De => "DE",
            TokenKind::Como => "COMO",
            TokenKind::Mostrar => "MOSTRAR",
            TokenKind::Calcular => "CALCULAR",
            TokenKind::Media => "MEDIA",
            TokenKind::Mediana => "MEDIANA",
            TokenKind::Moda => "MODA",
            TokenKind::Da => "DA",
            TokenKind::Coluna => "COLUNA",
            TokenKind::Plotar => "PLOTAR",
            TokenKind::Grafico => "GRAFICO",
            TokenKind::Barras => "BARRAS",
            TokenKind::Linhas => "LINHAS",
            TokenKind::Com => "COM",
            TokenKind::EixoX => "EIXO_X",
            TokenKind::EixoY => "EIXO_Y",
            TokenKind::E => "E",
            TokenKind::Salvar => "SALVAR",
            TokenKind::Arquivo => "ARQUIVO",
            TokenKind::Ident => "ID",
            TokenKind::Str => "STRING",
        };

        write!(f, "{}", name)
    }
}

lazy_static! {
    /// Reserved words, keyed by their upper-cased spelling
    ///
    /// An identifier whose upper-cased text appears here is always lexed as
    /// the keyword, never as a user identifier
    pub static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("CARREGAR", TokenKind::Carregar);
        map.insert("DADOS", TokenKind::Dados);
        map.insert("DE", TokenKind::De);
        map.insert("COMO", TokenKind::Como);
        map.insert("MOSTRAR", TokenKind::Mostrar);
        map.insert("CALCULAR", TokenKind::Calcular);
        map.insert("MEDIA", TokenKind::Media);
        map.insert("MEDIANA", TokenKind::Mediana);
        map.insert("MODA", TokenKind::Moda);
        map.insert("DA", TokenKind::Da);
        map.insert("COLUNA", TokenKind::Coluna);
        map.insert("PLOTAR", TokenKind::Plotar);
        map.insert("GRAFICO", TokenKind::Grafico);
        map.insert("BARRAS", TokenKind::Barras);
        map.insert("LINHAS", TokenKind::Linhas);
        map.insert("COM", TokenKind::Com);
        map.insert("EIXO_X", TokenKind::EixoX);
        map.insert("EIXO_Y", TokenKind::EixoY);
        map.insert("E", TokenKind::E);
        map.insert("SALVAR", TokenKind::Salvar);
        map.insert("ARQUIVO", TokenKind::Arquivo);
        map
    };
}

/// One lexed token
///
/// `text` is the original source spelling: the identifier as typed (never
/// case-folded), the string literal with its quotes stripped, or the keyword
/// as it appeared
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S, line: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

#[test]
fn test_keyword_lookup() {
    assert_eq!(KEYWORDS.get("MOSTRAR"), Some(&TokenKind::Mostrar));
    assert_eq!(KEYWORDS.get("EIXO_X"), Some(&TokenKind::EixoX));
    assert_eq!(KEYWORDS.get("mostrar"), None);
    assert_eq!(KEYWORDS.get("VENDAS"), None);
    assert_eq!(KEYWORDS.len(), 21);
}

#[test]
fn test_kind_display() {
    assert_eq!(TokenKind::Mostrar.to_string(), "MOSTRAR");
    assert_eq!(TokenKind::EixoY.to_string(), "EIXO_Y");
    assert_eq!(TokenKind::Ident.to_string(), "ID");
    assert_eq!(TokenKind::Str.to_string(), "STRING");
}
