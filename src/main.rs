use miette::{Diagnostic, IntoDiagnostic, Report, Result};
use rustyline::error::ReadlineError;

use saffron_rs::{
    ast::Program, Console, Interpreter, Parser, ParserOpts, Scanner, SourceReference, Streams,
    Validator,
};

const USAGE: &str = "Usage: saffron-rs [--version | --help] [file]";

// Exit codes follow sysexits.h.
const EXIT_DATA_ERROR: i32 = 65;
const EXIT_NO_INPUT: i32 = 66;
const EXIT_SOFTWARE: i32 = 70;

fn main() -> Result<()> {
    let mut args: Vec<_> = std::env::args().skip(1).collect();
    if consume_arg(&mut args, |arg| (arg == "--version").then(|| ())).is_some() {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if consume_arg(&mut args, |arg| (arg == "--help").then(|| ())).is_some() {
        println!("{}", USAGE);
        println!("Runs a Saffron program, or starts an interactive prompt without a file.");
        return Ok(());
    }
    let file = consume_arg(&mut args, |arg| {
        if arg.starts_with("--") {
            None
        } else {
            Some(arg.to_string())
        }
    });
    if !args.is_empty() {
        eprintln!("Unrecognized arguments: {:?}", args);
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }
    if let Some(file) = file {
        run_file(file)
    } else {
        run_prompt()
    }
}

fn consume_arg<T, F: Fn(&str) -> Option<T>>(args: &mut Vec<String>, predicate: F) -> Option<T> {
    let found = args
        .iter()
        .enumerate()
        .filter_map(|(idx, arg)| predicate(arg).map(|val| (idx, val)))
        .next();

    if let Some((idx, val)) = found {
        args.remove(idx);
        Some(val)
    } else {
        None
    }
}

fn report<E: Diagnostic + Send + Sync + 'static>(error: E) {
    eprintln!("{:?}", Report::new(error));
}

/// Parses `source`, reporting every syntax error. Returns `None` if there
/// were any.
fn parse_and_report_errors(name: &str, source: &str, parser_opts: ParserOpts) -> Option<Program> {
    let source_reference = SourceReference::new(name.to_string(), source.to_string());
    let (program, parser_errors) =
        Parser::parse(Scanner::new(source), source_reference, parser_opts);
    if parser_errors.is_empty() {
        Some(program)
    } else {
        parser_errors.into_iter().for_each(report);
        None
    }
}

fn run_file(file_name: String) -> Result<()> {
    let source = match std::fs::read_to_string(&file_name) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not read '{}': {}", file_name, err);
            std::process::exit(EXIT_NO_INPUT);
        }
    };

    let program = match parse_and_report_errors(&file_name, &source, ParserOpts::default()) {
        Some(program) => program,
        None => std::process::exit(EXIT_DATA_ERROR),
    };
    if let Err(err) = Validator::new().validate(&program) {
        report(err);
        std::process::exit(EXIT_DATA_ERROR);
    }

    let mut console = Streams::stdio();
    if let Err(err) = Interpreter::new(&mut console).execute(&program) {
        report(err);
        std::process::exit(EXIT_SOFTWARE);
    }
    Ok(())
}

fn run_prompt() -> Result<()> {
    let mut console = Streams::stdio();
    let mut validator = Validator::new();
    let mut interpreter = Interpreter::new(&mut console);
    let mut rl = rustyline::Editor::<()>::new();
    let mut repl_line: usize = 1;
    loop {
        match rl.readline(&format!("{}> ", repl_line)) {
            Ok(line) => {
                rl.add_history_entry(line.as_str());
                let name = format!("<repl-{}>", repl_line);
                if let Some(program) =
                    parse_and_report_errors(&name, &line, ParserOpts::default().for_repl())
                {
                    eval_entry(&mut validator, &mut interpreter, &program);
                }
            }
            Err(ReadlineError::Interrupted) => return Ok(()),
            Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(err).into_diagnostic(),
        }
        repl_line += 1;
    }
}

/// Validates and runs one REPL entry. An entry that fails validation leaves
/// no trace in the validator.
fn eval_entry<C: Console>(
    validator: &mut Validator,
    interpreter: &mut Interpreter<C>,
    program: &Program,
) {
    let snapshot = validator.clone();
    if let Err(err) = validator.validate(program) {
        *validator = snapshot;
        report(err);
        return;
    }
    if let Err(err) = interpreter.execute(program) {
        report(err);
    }
}
