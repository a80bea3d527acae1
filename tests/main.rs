use std::{
    collections::VecDeque,
    fs::{self},
    path::{Path, PathBuf},
};

use colored::Colorize;
use itertools::Itertools;
use lazy_static::lazy_static;
use libtest_mimic::{self, run_tests, Arguments, Outcome, Test};
use miette::{miette, IntoDiagnostic, Result};
use regex::Regex;
use saffron_rs::{
    ast::Program, Interpreter, Parser, ParserError, ParserOpts, RuntimeError, Scanner,
    SourceOffset, SourceReference, Streams, ValidationError, Validator,
};

fn main() {
    let tests = read_all_files("test_fixtures".to_string().into())
        .unwrap()
        .into_iter()
        .filter(|path| path.extension().map_or(false, |ext| ext == "sf"))
        .sorted()
        .map(|path| Test {
            name: path.to_string_lossy().into(),
            kind: "fixture".into(),
            is_bench: false,
            is_ignored: false,
            data: path,
        })
        .collect::<Vec<_>>();

    run_tests(&Arguments::from_args(), tests, |test| match run_test(&test.data) {
        Ok(outcome) => outcome,
        Err(err) => Outcome::Failed {
            msg: Some(format!("{:?}", err)),
        },
    })
    .exit();
}

lazy_static! {
    static ref EXPECTED_OUTPUT_RE: Regex = Regex::new("// expect: (.*)\n?").unwrap();
    static ref STDIN_RE: Regex = Regex::new("// stdin: (.*)\n?").unwrap();
    static ref PARSE_ERROR_RE: Regex = Regex::new("// ParseError: (.*)\n?").unwrap();
    static ref VALIDATION_ERROR_RE: Regex = Regex::new("// ValidationError: (.*)\n?").unwrap();
    static ref RUNTIME_ERROR_RE: Regex = Regex::new("// RuntimeError: (.*)\n?").unwrap();
}

fn run_test(path: &Path) -> Result<Outcome> {
    let test_source = fs::read_to_string(path).into_diagnostic()?;
    let source_reference =
        SourceReference::new(path.to_string_lossy().to_string(), test_source.clone());

    let expected_output = EXPECTED_OUTPUT_RE
        .captures_iter(&test_source)
        .map(|captures| format!("{}\n", &captures[1]))
        .collect::<String>();

    let stdin = STDIN_RE
        .captures_iter(&test_source)
        .map(|captures| format!("{}\n", &captures[1]))
        .collect::<String>();

    let mut expected_parse_errors = PARSE_ERROR_RE
        .captures_iter(&test_source)
        .map(|captures| format!("ParseError: {}", &captures[1]))
        .collect::<VecDeque<_>>();

    let expected_validation_error = VALIDATION_ERROR_RE
        .captures_iter(&test_source)
        .map(|captures| format!("ValidationError: {}", &captures[1]))
        .at_most_one()
        .map_err(|_| miette!("should have at most one expected validation error"))?;

    let expected_runtime_error = RUNTIME_ERROR_RE
        .captures_iter(&test_source)
        .map(|captures| format!("RuntimeError: {}", &captures[1]))
        .at_most_one()
        .map_err(|_| miette!("should have at most one expected runtime error"))?;

    let (program, parser_errors) = Parser::parse(
        Scanner::new(&test_source),
        source_reference,
        ParserOpts::default(),
    );

    let did_have_parse_errors = !parser_errors.is_empty();
    for parser_error in parser_errors {
        match match_errors(
            parser_error,
            &expected_parse_errors.pop_front(),
            &test_source,
        ) {
            Ok(_) => continue,
            Err(msg) => return Ok(Outcome::Failed { msg: Some(msg) }),
        }
    }

    if !expected_parse_errors.is_empty() {
        return Ok(Outcome::Failed {
            msg: Some(format!(
                "Expected errors:\n{}",
                expected_parse_errors
                    .iter()
                    .map(|err| format!(" - {}\n", err))
                    .collect::<String>(),
            )),
        });
    }

    if did_have_parse_errors {
        return Ok(Outcome::Passed);
    }

    if let Err(err) = Validator::new().validate(&program) {
        return Ok(match match_errors(err, &expected_validation_error, &test_source) {
            Ok(_) => Outcome::Passed,
            Err(msg) => Outcome::Failed { msg: Some(msg) },
        });
    } else if let Some(expected_err) = &expected_validation_error {
        return Ok(Outcome::Failed {
            msg: Some(format!("Expected validation error:\n{}", expected_err)),
        });
    }

    let (actual_output, result) = run_program(&program, &stdin);

    // A second run over the same tree with fresh state must behave the same.
    let (rerun_output, rerun_result) = run_program(&program, &stdin);
    let describe = |result: &Result<(), RuntimeError>| {
        result
            .as_ref()
            .err()
            .map(|err| err.fmt_error(&test_source))
    };
    if rerun_output != actual_output || describe(&rerun_result) != describe(&result) {
        return Ok(Outcome::Failed {
            msg: Some("Running the program a second time behaved differently".to_string()),
        });
    }

    if let Err(err) = result {
        if let Err(err) = match_errors(err, &expected_runtime_error, &test_source) {
            return Ok(Outcome::Failed { msg: Some(err) });
        }
    } else if let Some(expected_err) = &expected_runtime_error {
        return Ok(Outcome::Failed {
            msg: Some(format!("Expected runtime error:\n{}", expected_err)),
        });
    }

    Ok(compare_outputs(
        expected_output.split('\n').map(String::from).collect(),
        actual_output.split('\n').map(String::from).collect(),
    ))
}

fn run_program(program: &Program, stdin: &str) -> (String, Result<(), RuntimeError>) {
    let mut console = Streams::new(stdin.as_bytes(), Vec::new());
    let result = Interpreter::new(&mut console).execute(program);
    let output = String::from_utf8_lossy(&console.into_output()).into_owned();
    (output, result)
}

fn match_errors<E: FmtError>(
    actual_error: E,
    expected_error: &Option<String>,
    source: &str,
) -> Result<(), String> {
    let actual_str = actual_error.fmt_error(source);
    match expected_error {
        Some(expected_str) if expected_str.trim() == actual_str.trim() => Ok(()),
        Some(expected_str) => Err(format!(
            "Errors do not match.\nExpected: {}\n  Actual: {}",
            expected_str, actual_str
        )),
        None => Err(format!("Unexpected error:\n{}", actual_str)),
    }
}

fn compare_outputs(expected_lines: Vec<String>, actual_lines: Vec<String>) -> Outcome {
    const EXPECTED: &str = "expected";
    const ACTUAL: &str = "actual";
    const NONE: &str = "<None>";

    fn max_len(lines: &[String], label: &str) -> usize {
        lines
            .iter()
            .map(|line| line.len())
            .max()
            .unwrap_or(0)
            .max(label.len())
    }

    let max_expected_len = max_len(&expected_lines, EXPECTED);
    let max_actual_len = max_len(&actual_lines, ACTUAL);

    let mut output_str = format!(
        "   | {:max_expected_len$} | {:max_actual_len$} \n",
        EXPECTED.bold(),
        ACTUAL.bold()
    );
    let line_count = expected_lines.len().max(actual_lines.len());
    let mut unmatched_count = 0usize;
    for i in 0..line_count {
        let expected_line = expected_lines.get(i);
        let actual_line = actual_lines.get(i);

        let is_match = expected_line == actual_line;
        if !is_match {
            unmatched_count += 1;
        }

        let colorify = |string: &str| {
            if is_match {
                string.green()
            } else {
                string.red()
            }
        };

        let result_char = if is_match { "✓" } else { "✗" };
        let result_str = &format!(
            " {} | {:max_expected_len$} | {:max_actual_len$}",
            colorify(result_char),
            expected_line
                .map(|line| colorify(line))
                .unwrap_or_else(|| NONE.dimmed()),
            actual_line
                .map(|line| colorify(line))
                .unwrap_or_else(|| NONE.dimmed()),
        );
        output_str.push_str(result_str);
        output_str.push('\n');
    }

    if unmatched_count > 0 {
        Outcome::Failed {
            msg: Some(output_str),
        }
    } else {
        Outcome::Passed
    }
}

fn read_all_files(prefix: PathBuf) -> Result<Vec<PathBuf>> {
    let mut results = Vec::<PathBuf>::new();
    read_children(prefix, &mut results)?;
    return Ok(results);

    fn read_children(prefix: PathBuf, results: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(prefix).into_diagnostic()? {
            let entry = entry.into_diagnostic()?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if entry.file_type().into_diagnostic()?.is_dir() {
                read_children(entry.path(), results)?;
            } else {
                results.push(entry.path())
            }
        }
        Ok(())
    }
}

trait FmtError {
    fn fmt_error(&self, source: &str) -> String;
}
impl FmtError for ParserError {
    fn fmt_error(&self, source: &str) -> String {
        format!(
            "ParseError: {} at {}",
            self,
            format_offset(&self.source_span().start(), source)
        )
    }
}
impl FmtError for ValidationError {
    fn fmt_error(&self, source: &str) -> String {
        format!(
            "ValidationError: {} at {}",
            self,
            format_offset(&self.source_span().start(), source)
        )
    }
}
impl FmtError for RuntimeError {
    fn fmt_error(&self, source: &str) -> String {
        format!(
            "RuntimeError: {} at {}",
            self,
            format_offset(&self.source_span().start(), source)
        )
    }
}

fn format_offset(loc: &SourceOffset, source: &str) -> String {
    let mut line_no: usize = 1;
    let mut char_no: usize = 0;
    let target = loc.byte_offset();
    for (byte_offset, ch) in source.char_indices() {
        char_no += 1;
        if byte_offset >= target {
            break;
        }
        if ch == '\n' {
            line_no += 1;
            char_no = 0;
        }
    }

    format!("l{}c{}", line_no, char_no)
}
