//! `exl` - evaluate an EXL expression from the command line.
//!
//! ```text
//! exl '1 + 2 * 3'
//! exl -D name=foo.java 'name =* "*.java" || "no match"'
//! exl -D x=2 -D y=1.5 'x * y'
//! ```
//!
//! Bindings given with `-D` are typed from their literal form: `true`
//! and `false` are booleans, integers are `int` (or `long` with an `L`
//! suffix), decimals are `double`, anything else is a string.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use exl_eval::{Bindings, Evaluator, Extensions, Value};

#[derive(Parser)]
#[command(name = "exl", version, about = "Evaluate an EXL expression")]
struct Cli {
    /// The expression to evaluate.
    expression: String,

    /// Bind a variable, e.g. `-D name=value`. Repeatable.
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
    defines: Vec<String>,

    /// Print the parsed expression instead of evaluating it.
    #[arg(long)]
    ast: bool,

    /// Disable the `=*`, `=~`, and `instanceof` operators.
    #[arg(long)]
    no_match_operators: bool,

    /// Allow `Type(args)` without the `new` keyword.
    #[arg(long)]
    new_without_keyword: bool,

    /// Allow `new Type` without an argument list.
    #[arg(long)]
    new_without_parens: bool,
}

fn parse_define(raw: &str) -> Result<(String, Value), String> {
    let Some((name, text)) = raw.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got {raw:?}"));
    };
    if name.is_empty() {
        return Err(format!("empty variable name in {raw:?}"));
    }
    Ok((name.to_owned(), typed_value(text)))
}

/// The most specific reading of a binding's text.
fn typed_value(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Some(body) = text.strip_suffix(['l', 'L']) {
        if let Ok(v) = body.parse() {
            return Value::Long(v);
        }
    }
    if let Ok(v) = text.parse() {
        return Value::Int(v);
    }
    if let Ok(v) = text.parse() {
        return Value::Double(v);
    }
    Value::Str(text.to_owned())
}

fn extensions(cli: &Cli) -> Extensions {
    let mut extensions = if cli.no_match_operators {
        Extensions::empty()
    } else {
        Extensions::default()
    };
    if cli.new_without_keyword {
        extensions |= Extensions::NEW_WITHOUT_KEYWORD;
    }
    if cli.new_without_parens {
        extensions |= Extensions::NEW_WITHOUT_PARENS;
    }
    extensions
}

fn run(cli: &Cli) -> Result<String, String> {
    let mut bindings = Bindings::default();
    for define in &cli.defines {
        let (name, value) = parse_define(define)?;
        bindings.insert(name, value);
    }
    let evaluator =
        Evaluator::new(bindings.keys().cloned()).with_extensions(extensions(cli));
    let expression = evaluator
        .parse(&cli.expression)
        .map_err(|e| e.to_string())?;
    if cli.ast {
        return Ok(expression.to_string());
    }
    debug!(expression = %cli.expression, "evaluate");
    let value = expression.evaluate(&bindings).map_err(|e| e.to_string())?;
    Ok(value.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cli(expression: &str, defines: &[&str]) -> Cli {
        let mut args = vec!["exl".to_owned()];
        for define in defines {
            args.push("-D".to_owned());
            args.push((*define).to_owned());
        }
        args.push(expression.to_owned());
        Cli::parse_from(args)
    }

    #[test]
    fn defines_are_typed_from_their_text() {
        assert_eq!(typed_value("42"), Value::Int(42));
        assert_eq!(typed_value("42L"), Value::Long(42));
        assert_eq!(typed_value("1.5"), Value::Double(1.5));
        assert_eq!(typed_value("true"), Value::Bool(true));
        assert_eq!(typed_value("null"), Value::Null);
        assert_eq!(typed_value("foo.java"), Value::Str("foo.java".into()));
    }

    #[test]
    fn evaluates_with_bindings() {
        let cli = cli("x * 3", &["x=2"]);
        assert_eq!(run(&cli), Ok("6".to_owned()));
    }

    #[test]
    fn glob_matching_from_the_command_line() {
        let cli = cli("name =* \"*.java\" || \"no match\"", &["name=foo.java"]);
        assert_eq!(run(&cli), Ok("foo.java".to_owned()));
    }

    #[test]
    fn errors_are_reported() {
        let cli = cli("1 + )", &[]);
        let err = run(&cli).expect_err("parse error");
        assert!(err.contains("offset 4"), "{err}");
    }

    #[test]
    fn ast_mode_prints_the_parse() {
        let mut c = cli("1 + 2 * 3", &[]);
        c.ast = true;
        assert_eq!(run(&c), Ok("(1 + (2 * 3))".to_owned()));
    }
}
