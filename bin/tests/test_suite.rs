use std::{collections::BTreeMap, str::Lines};

use interpreter::{InterpretError, Interpreter};
use itertools::Itertools;
use lazy_regex::regex;
use test_suite_proc_macro::generate_tests;

use pretty_assertions::assert_eq;

fn output_lines(interpreter: &Interpreter<Vec<u8>>) -> Vec<String> {
    String::from_utf8(interpreter.output().clone()).unwrap().lines().map(str::to_string).collect_vec()
}

pub fn test_runtime_errors_line_by_line(
    lines: Lines<'_>,
    expected_runtime_errors: &BTreeMap<usize, String>,
    expected_output: &[String],
) {
    let mut interpreter = Interpreter::new(Vec::new());

    let mut actual_runtime_errors = BTreeMap::new();
    for (i, line) in lines.enumerate() {
        match interpreter.run_source(line) {
            Ok(()) => (),
            Err(InterpretError::RuntimeError(e)) => {
                actual_runtime_errors.insert(i + 1, e.to_string());
            }
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    assert_eq!(actual_runtime_errors, *expected_runtime_errors,
        "Actual runtime errors (left) do not match expected runtime errors (right)");
    assert_eq!(
        output_lines(&interpreter),
        expected_output,
        "Actual output (left) does not match expected output (right)"
    );
}

/// Runs a fixture and checks it against its annotations:
/// `// expect: <line of output>`, `// Error...: <syntax error>` and
/// `// runtime error: <message>`, each on the line the diagnostic is for.
pub fn lox_expect(code: &str) {
    let mut expected_compiler_errors = vec![];
    let mut expected_runtime_errors = BTreeMap::new();
    let mut expected_output = vec![];

    let compiler_error_regex = regex!(r"// (Error( at '.*'| at end)?: .*)");
    let runtime_error_regex = regex!(r"// runtime error: (.*)");
    let output_regex = regex!(r"// expect: (.*)");

    for (i, line) in code.lines().enumerate() {
        if let Some(cap) = runtime_error_regex.captures(line) {
            expected_runtime_errors.insert(i + 1, cap[1].to_string());
        } else if let Some(cap) = compiler_error_regex.captures(line) {
            expected_compiler_errors.push(format!("[line {}] {}", i + 1, &cap[1]));
        } else if let Some(cap) = output_regex.captures(line) {
            expected_output.push(cap[1].to_string());
        }
    }

    if !expected_runtime_errors.is_empty() {
        assert!(
            expected_compiler_errors.is_empty(),
            "Can't have a runtime error when there are compiler errors."
        );
    }

    if expected_runtime_errors.len() > 1 {
        test_runtime_errors_line_by_line(code.lines(), &expected_runtime_errors, &expected_output);
        return;
    }

    let mut interpreter = Interpreter::new(Vec::new());
    match interpreter.run_source(code) {
        Ok(()) => {
            assert_eq!(expected_output, output_lines(&interpreter));

            assert!(expected_runtime_errors.is_empty(), "Expected runtime error but none occurred");
            assert!(
                expected_compiler_errors.is_empty(),
                "Expected compiler errors but none occured"
            );
        }
        Err(InterpretError::CompileError(e)) => {
            assert!(expected_output.is_empty());
            assert!(expected_runtime_errors.is_empty());
            assert!(interpreter.reporter().had_error());

            assert_eq!(e.to_string(), expected_compiler_errors.join("\n"));
        }
        Err(InterpretError::RuntimeError(runtime_error)) => {
            assert_eq!(expected_output, output_lines(&interpreter));
            let (line, message) = expected_runtime_errors
                .iter()
                .next()
                .expect("Unexpected runtime error");
            assert_eq!((*line, message), (runtime_error.line.0, &runtime_error.to_string()));
            assert!(interpreter.reporter().had_runtime_error());

            assert!(
                expected_compiler_errors.is_empty(),
                "Expected compiler errors but none occured"
            );
        }
        Err(e) => panic!("Unexpected error: {:?}", e),
    }
}

generate_tests!("lox");
