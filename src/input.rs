use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Helper, Highlighter, Hinter, Result};

/// Helper that extends editor
///
/// Implements the `Validator` trait to trigger multiline editing when a `\`
/// is seen at the end of a line or a string literal is still open.
#[derive(Completer, Helper, Highlighter, Hinter)]
pub struct ReplHelper {}

impl ReplHelper {
    pub fn new() -> Self {
        ReplHelper {}
    }
}

/// String literals have no escapes, so an odd number of quotes means one is
/// still open
fn open_string(input: &str) -> bool {
    input.chars().filter(|c| *c == '"').count() % 2 == 1
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> Result<ValidationResult> {
        if ctx.input().ends_with('\\') || open_string(ctx.input()) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Fixup input so the parser is happy
///
/// Removes the multiline escape created by `ReplHelper`; the grammar itself
/// has no statement terminator, so nothing else is needed.
pub fn fixup_input(input: &str) -> String {
    input.replace("\\\n", " ")
}

#[test]
fn test_open_string() {
    assert!(!open_string("MOSTRAR DADOS DE d"));
    assert!(open_string(r#"CARREGAR DADOS DE "vendas"#));
    assert!(!open_string(r#"CARREGAR DADOS DE "vendas.csv" COMO v"#));
}

#[test]
fn test_fixup_input() {
    assert_eq!(fixup_input("asdf \\\nme"), "asdf  me");
    assert_eq!(fixup_input("asdf \\ \nme"), "asdf \\ \nme");
    assert_eq!(fixup_input("uma linha"), "uma linha");
}
