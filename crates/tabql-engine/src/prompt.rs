//! Tokenizes a prompt template into literal text, `@var`, `@%envvar`,
//! `@#runtime_info` and `` `<expression>` `` segments and substitutes
//! each against the current session.

use tabql_core::{Flags, Value};

use crate::operators::Evaluator;
use crate::session::Session;

const DEFAULT_PROMPT: &str = "tabql > ";
const DEFAULT_CONTINUOUS_PROMPT: &str = "      > ";

/// One decoded template segment.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Variable(String),
    EnvVar(String),
    RuntimeInfo(String),
    Expression(String),
}

/// Runtime info names the `@#name` form may reference. Anything else is
/// left to the evaluator as an error.
fn runtime_info(name: &str, session: &Session) -> Option<String> {
    match name {
        "working_directory" => std::env::current_dir().ok().map(|p| p.display().to_string()),
        "version" => Some(env!("CARGO_PKG_VERSION").to_string()),
        _ => {
            let _ = session;
            None
        }
    }
}

fn tokenize(template: &str) -> Vec<Token> {
    let chars: Vec<char> = template.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '`' => {
                flush_literal(&mut tokens, &mut literal);
                let mut expr = String::new();
                i += 1;
                while i < chars.len() && chars[i] != '`' {
                    expr.push(chars[i]);
                    i += 1;
                }
                i += 1; // consume closing backtick (or end of input)
                tokens.push(Token::Expression(expr));
            }
            '@' if i + 1 < chars.len() && chars[i + 1] == '%' => {
                flush_literal(&mut tokens, &mut literal);
                i += 2;
                let name = take_identifier(&chars, &mut i);
                tokens.push(Token::EnvVar(name));
            }
            '@' if i + 1 < chars.len() && chars[i + 1] == '#' => {
                flush_literal(&mut tokens, &mut literal);
                i += 2;
                let name = take_identifier(&chars, &mut i);
                tokens.push(Token::RuntimeInfo(name));
            }
            '@' if i + 1 < chars.len() && is_identifier_start(chars[i + 1]) => {
                flush_literal(&mut tokens, &mut literal);
                i += 1;
                let name = take_identifier(&chars, &mut i);
                tokens.push(Token::Variable(name));
            }
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }
    flush_literal(&mut tokens, &mut literal);
    tokens
}

fn flush_literal(tokens: &mut Vec<Token>, literal: &mut String) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn take_identifier(chars: &[char], i: &mut usize) -> String {
    let mut name = String::new();
    while *i < chars.len() && (chars[*i].is_ascii_alphanumeric() || chars[*i] == '_') {
        name.push(chars[*i]);
        *i += 1;
    }
    name
}

/// Strips an embedded ANSI escape sequence when color is disabled:
/// starts at `ESC` (`0x1B`), ends at the first alphabetic byte.
fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for next in chars.by_ref() {
                if next.is_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

pub struct PromptEvaluator;

impl PromptEvaluator {
    /// Evaluates `template` against `session`. On any failure the whole
    /// prompt falls back to the default (`is_continuous` selects which
    /// one); failures are swallowed here by design.
    pub fn evaluate(
        template: &str,
        is_continuous: bool,
        session: &mut Session,
        evaluator: &mut dyn Evaluator,
    ) -> String {
        match Self::try_evaluate(template, session, evaluator) {
            Ok(text) => {
                if session.flags.color {
                    text
                } else {
                    strip_ansi(&text)
                }
            }
            Err(_) => default_prompt(is_continuous, &session.flags).to_string(),
        }
    }

    fn try_evaluate(
        template: &str,
        session: &mut Session,
        evaluator: &mut dyn Evaluator,
    ) -> Result<String, tabql_core::AppError> {
        let mut out = String::new();
        for token in tokenize(template) {
            match token {
                Token::Literal(text) => out.push_str(&text),
                Token::Variable(name) => {
                    let value = session.scope.get_variable(&name, None)?;
                    out.push_str(&value.to_string());
                }
                Token::EnvVar(name) => {
                    let value = std::env::var(&name).map_err(|_| tabql_core::AppError::PromptEvaluationError {
                        message: format!("environment variable {name} is not set"),
                    })?;
                    out.push_str(&value);
                }
                Token::RuntimeInfo(name) => {
                    let value = runtime_info(&name, session).ok_or_else(|| {
                        tabql_core::AppError::PromptEvaluationError {
                            message: format!("unknown runtime info: {name}"),
                        }
                    })?;
                    out.push_str(&value);
                }
                Token::Expression(expr) => {
                    let value: Value = evaluator.eval_raw(&expr, session)?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Ok(out)
    }
}

fn default_prompt(is_continuous: bool, _flags: &Flags) -> &'static str {
    if is_continuous {
        DEFAULT_CONTINUOUS_PROMPT
    } else {
        DEFAULT_PROMPT
    }
}
