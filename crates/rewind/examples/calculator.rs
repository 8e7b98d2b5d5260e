//! A floating-point calculator built on the precedence-climbing engine.
//!
//! Every token skips the whitespace that follows it, so the lexer only ever
//! looks at the first significant byte. Numbers are collected into the
//! parser's per-depth scratch buffer.
//!
//! Run with
//!
//! ```bash
//! cargo run -p rewind --example calculator -- "4 / (1 + 1) + 2" "-2 * 3.5"
//! RUST_LOG=rewind=debug cargo run -p rewind --example calculator
//! ```
#![allow(missing_docs)]

use rewind::{
    InfixToken, Lexer, Parser, Precedence, PrefixToken, Source, SourceError, TracingDiagnostics,
    discard,
};
use tracing_subscriber::EnvFilter;

const SUM: Precedence = 3;
const PRODUCT: Precedence = 4;
const PREFIX: Precedence = 6;

struct Calculator;

struct Number;
struct Group;
struct Negate;
struct Binary {
    op: u8,
    binding: Precedence,
}

impl Binary {
    const fn new(op: u8, binding: Precedence) -> Self {
        Self { op, binding }
    }
}

const ADD: Binary = Binary::new(b'+', SUM);
const SUB: Binary = Binary::new(b'-', SUM);
const MUL: Binary = Binary::new(b'*', PRODUCT);
const DIV: Binary = Binary::new(b'/', PRODUCT);

const DEMO: [&str; 6] = [
    "1 + 1",
    "-1 + 2",
    "2 * 3 + 1",
    "4 / (1 + 1) + 2",
    "1.5 * (2 - -2)",
    "(1 + 2",
];

impl Lexer for Calculator {
    type Value = f64;

    fn prefix_token(&self, src: &mut Source<'_>) -> Option<&dyn PrefixToken<Self>> {
        match src.peek1() {
            b'(' => Some(&Group),
            b'-' => Some(&Negate),
            b'0'..=b'9' | b'.' => Some(&Number),
            _ => None,
        }
    }

    fn infix_token(&self, src: &mut Source<'_>) -> Option<(&dyn InfixToken<Self>, Precedence)> {
        let token = match src.peek1() {
            b'+' => &ADD,
            b'-' => &SUB,
            b'*' => &MUL,
            b'/' => &DIV,
            _ => return None,
        };
        Some((token, token.binding))
    }
}

impl PrefixToken<Calculator> for Number {
    fn prefix_parse(&self, parser: &Parser<'_, Calculator>, src: &mut Source<'_>) -> f64 {
        let value = parser.with_scratch(|digits| {
            while src.error().is_none() && matches!(src.peek1(), b'0'..=b'9' | b'.') {
                digits.push(src.read1());
            }
            let text = std::str::from_utf8(digits).ok()?;
            text.parse::<f64>().ok()
        });
        discard::space(src);
        value.unwrap_or_else(|| {
            src.report_error(SourceError::syntax("malformed number"));
            f64::NAN
        })
    }

    fn name(&self) -> &'static str {
        "number"
    }
}

impl PrefixToken<Calculator> for Group {
    fn prefix_parse(&self, parser: &Parser<'_, Calculator>, src: &mut Source<'_>) -> f64 {
        src.expect1(b'(');
        discard::space(src);
        let inner = parser.parse(src, 0);
        if !src.expect1(b')') {
            src.report_error(SourceError::syntax("expect )"));
        }
        discard::space(src);
        inner
    }

    fn name(&self) -> &'static str {
        "group"
    }
}

impl PrefixToken<Calculator> for Negate {
    fn prefix_parse(&self, parser: &Parser<'_, Calculator>, src: &mut Source<'_>) -> f64 {
        src.expect1(b'-');
        discard::space(src);
        -parser.parse(src, PREFIX)
    }

    fn name(&self) -> &'static str {
        "negate"
    }
}

impl InfixToken<Calculator> for Binary {
    fn infix_parse(
        &self,
        parser: &Parser<'_, Calculator>,
        src: &mut Source<'_>,
        left: f64,
    ) -> f64 {
        src.expect1(self.op);
        discard::space(src);
        let right = parser.parse(src, self.binding);
        match self.op {
            b'+' => left + right,
            b'-' => left - right,
            b'*' => left * right,
            _ => left / right,
        }
    }

    fn name(&self) -> &'static str {
        match self.op {
            b'+' => "add",
            b'-' => "sub",
            b'*' => "mul",
            _ => "div",
        }
    }
}

fn evaluate(parser: &Parser<'_, Calculator>, input: &str) -> Result<f64, SourceError> {
    let mut src = Source::try_from(input)?;
    discard::space(&mut src);
    let value = parser.parse_source(&mut src)?;
    if src.error().is_none() {
        return Err(SourceError::syntax(format!(
            "unexpected {:?} at byte {}",
            char::from(src.peek1()),
            src.position()
        )));
    }
    Ok(value)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        inputs = DEMO.map(String::from).into();
    }

    let parser = Parser::new(&Calculator).with_diagnostics(&TracingDiagnostics);
    for input in &inputs {
        match evaluate(&parser, input) {
            Ok(value) => println!("{input} = {value}"),
            Err(err) => println!("{input}: {err}"),
        }
    }
}
