use std::{
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser as _;
use errors::{LoxErrors, Reporter};
use interpreter::{InterpretError, Interpreter};
use itertools::Itertools;
use parser::{Parser, Stmt};

const EXIT_SYNTAX_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;

#[derive(clap::Parser)]
struct Args {
    /// Script to run. Starts a prompt if omitted.
    file: Option<PathBuf>,

    /// Print the syntax tree of every statement instead of running it.
    #[arg(long)]
    print_ast: bool,

    /// Report all syntax errors without running anything.
    #[arg(long, conflicts_with = "print_ast")]
    check: bool,
}

fn render(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expression(expr) => expr.to_string(),
        Stmt::Print(expr) => format!("(print {expr})"),
        Stmt::Block { statements, .. } => {
            format!("(block {})", statements.iter().map(render).join(" "))
        }
        Stmt::Continue(_) => "(continue)".to_string(),
    }
}

/// Parses without running and renders every statement. If there were
/// syntax errors, all of them are returned instead.
fn check(source: &str) -> Result<Vec<String>, LoxErrors> {
    let mut reporter = Reporter::new();
    let tokens = scanner::scan_tokens(source, &mut reporter);
    let stmts = Parser::new(tokens, &mut reporter).parse();

    match stmts {
        Some(stmts) if !reporter.had_error() => Ok(stmts.iter().map(render).collect_vec()),
        _ => Err(reporter.take_errors()),
    }
}

fn check_expression(source: &str) -> Result<String, LoxErrors> {
    let mut reporter = Reporter::new();
    let tokens = scanner::scan_tokens(source, &mut reporter);
    let expr = Parser::new(tokens, &mut reporter).parse_expression();

    match expr {
        Some(expr) if !reporter.had_error() => Ok(expr.to_string()),
        _ => Err(reporter.take_errors()),
    }
}

fn is_statement(line: &str) -> bool {
    line.ends_with(';') || line.ends_with('}')
}

fn run_file(path: &Path, args: &Args) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;

    if args.check || args.print_ast {
        return match check(&source) {
            Ok(rendered) => {
                if args.print_ast {
                    rendered.iter().for_each(|r| println!("{r}"));
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(errors) => {
                eprintln!("{errors}");
                Ok(ExitCode::from(EXIT_SYNTAX_ERROR))
            }
        };
    }

    let mut interpreter = Interpreter::new(stdout());
    match interpreter.run_source(&source) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(InterpretError::CompileError(errors)) => {
            eprintln!("{errors}");
            Ok(ExitCode::from(EXIT_SYNTAX_ERROR))
        }
        Err(InterpretError::RuntimeError(e)) => {
            eprintln!("{e}\n[line {}]", e.line);
            Ok(ExitCode::from(EXIT_RUNTIME_ERROR))
        }
        Err(e) => Err(e.into()),
    }
}

fn run_prompt(args: &Args) -> anyhow::Result<ExitCode> {
    let mut interpreter = Interpreter::new(stdout());
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            return Ok(ExitCode::SUCCESS);
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if args.check || args.print_ast {
            let rendered =
                if is_statement(line) { check(line) } else { check_expression(line).map(|r| vec![r]) };
            match rendered {
                Ok(rendered) if args.print_ast => rendered.iter().for_each(|r| println!("{r}")),
                Ok(_) => (),
                Err(errors) => println!("{errors}"),
            }
            continue;
        }

        // Bare expressions are evaluated and echoed, everything else is run as statements.
        let result = if is_statement(line) {
            interpreter.run_source(line)
        } else {
            interpreter.evaluate_source(line).map(|value| println!("{value}"))
        };

        match result {
            Ok(()) => (),
            Err(InterpretError::RuntimeError(e)) => println!("{e}\n[line {}]", e.line),
            Err(e) => println!("{e}"),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();
    log::debug!(
        "Starting {} (check: {}, print_ast: {})",
        args.file.as_ref().map_or("prompt".to_string(), |f| f.display().to_string()),
        args.check,
        args.print_ast
    );

    match &args.file {
        Some(file) => run_file(file, &args),
        None => run_prompt(&args),
    }
}
