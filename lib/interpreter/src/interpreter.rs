use std::io::{Stdout, Write};

use cursor::Line;
use errors::{LoxErrors, Reporter};
use parser::{Expr, ExprVisitor, LiteralValue, Parser, Stmt, StmtVisitor};
use scanner::{Token, TokenType};

mod value;
pub use value::Value;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RuntimeErrorType {
    #[error("Operand must be a number")]
    OperandMustBeNumber,
    #[error("Operands must be Number or String")]
    OperandsMustBeNumberOrString,
    #[error("Expression must return boolean")]
    ConditionMustBeBoolean,
    #[error("Unsupported statement")]
    UnsupportedStatement,
}

impl RuntimeErrorType {
    fn at(self, token: &Token) -> RuntimeError {
        RuntimeError { error: self, line: token.line(), lexeme: token.lexeme().to_string() }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub line: Line,
    pub lexeme: String,
}

#[derive(thiserror::Error, Debug)]
pub enum InterpretError {
    #[error("{0}")]
    CompileError(LoxErrors),
    #[error("{0}")]
    RuntimeError(#[from] RuntimeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Tree-walking evaluator. `print` output goes to `out`.
#[derive(Debug)]
pub struct Interpreter<W: Write = Stdout> {
    out: W,
    reporter: Reporter,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self { out, reporter: Reporter::new() }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Diagnostics of the most recent `run_source`/`evaluate_source` call.
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Scans, parses and executes `source`. Nothing is executed if there
    /// was any syntax error; execution stops at the first runtime error.
    pub fn run_source(&mut self, source: &str) -> Result<(), InterpretError> {
        self.reporter.reset();

        let tokens = scanner::scan_tokens(source, &mut self.reporter);
        let stmts = Parser::new(tokens, &mut self.reporter).parse();

        match stmts {
            Some(stmts) if !self.reporter.had_error() => self.interpret(&stmts),
            _ => Err(InterpretError::CompileError(self.reporter.errors().clone())),
        }
    }

    /// Like `run_source`, but for a single expression whose value is returned.
    pub fn evaluate_source(&mut self, source: &str) -> Result<Value, InterpretError> {
        self.reporter.reset();

        let tokens = scanner::scan_tokens(source, &mut self.reporter);
        let expr = Parser::new(tokens, &mut self.reporter).parse_expression();

        match expr {
            Some(expr) if !self.reporter.had_error() => {
                self.evaluate(&expr).map_err(|e| self.report_runtime_error(e))
            }
            _ => Err(InterpretError::CompileError(self.reporter.errors().clone())),
        }
    }

    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<(), InterpretError> {
        for stmt in stmts {
            if let Err(e) = self.execute(stmt) {
                return Err(match e {
                    InterpretError::RuntimeError(e) => self.report_runtime_error(e),
                    e => e,
                });
            }
        }
        Ok(())
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        expr.accept(self)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), InterpretError> {
        stmt.accept(self)
    }

    fn report_runtime_error(&mut self, error: RuntimeError) -> InterpretError {
        self.reporter.runtime_error(error.line, &error);
        error.into()
    }
}

impl<'a, W: Write> StmtVisitor<'a, Result<(), InterpretError>> for Interpreter<W> {
    fn visit_expression_stmt(&mut self, expression: &Expr<'a>) -> Result<(), InterpretError> {
        let value = self.evaluate(expression)?;
        log::trace!("Discarding {value:?}");
        Ok(())
    }

    fn visit_print_stmt(&mut self, expression: &Expr<'a>) -> Result<(), InterpretError> {
        let value = self.evaluate(expression)?;
        writeln!(self.out, "{value}")?;
        Ok(())
    }

    fn visit_unsupported(&mut self, keyword: &Token<'a>) -> Result<(), InterpretError> {
        Err(RuntimeErrorType::UnsupportedStatement.at(keyword).into())
    }
}

impl<'a, W: Write> ExprVisitor<'a, Result<Value, RuntimeError>> for Interpreter<W> {
    fn visit_literal(&mut self, value: &LiteralValue<'a>) -> Result<Value, RuntimeError> {
        Ok(value.into())
    }

    fn visit_grouping(&mut self, expression: &Expr<'a>) -> Result<Value, RuntimeError> {
        self.evaluate(expression)
    }

    fn visit_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;
        match (operator.ty(), right) {
            (TokenType::Minus, Value::Number(n)) => Ok((-n).into()),
            (TokenType::Minus, _) => Err(RuntimeErrorType::OperandMustBeNumber.at(operator)),
            (TokenType::Bang, v) => Ok((!v.is_truthy()).into()),
            (ty, _) => unreachable!("Unary expression with operator {ty}"),
        }
    }

    fn visit_binary(
        &mut self,
        left: &Expr<'a>,
        operator: &Token<'a>,
        right: &Expr<'a>,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        let value: Value = match (&left, &right, operator.ty()) {
            (Value::Number(l), Value::Number(r), TokenType::Minus) => (l - r).into(),
            // No check for zero, this yields inf or NaN
            (Value::Number(l), Value::Number(r), TokenType::Slash) => (l / r).into(),
            (Value::Number(l), Value::Number(r), TokenType::Star) => (l * r).into(),
            (Value::Number(l), Value::Number(r), TokenType::Plus) => (l + r).into(),
            (Value::Number(_) | Value::Str(_), Value::Number(_) | Value::Str(_), TokenType::Plus) => {
                format!("{left}{right}").into()
            }

            (Value::Number(l), Value::Number(r), TokenType::Greater) => (l > r).into(),
            (Value::Number(l), Value::Number(r), TokenType::GreaterEqual) => (l >= r).into(),
            (Value::Number(l), Value::Number(r), TokenType::Less) => (l < r).into(),
            (Value::Number(l), Value::Number(r), TokenType::LessEqual) => (l <= r).into(),

            (_, _, TokenType::EqualEqual) => left.eq_in_lox(&right).into(),
            (_, _, TokenType::BangEqual) => (!left.eq_in_lox(&right)).into(),

            (_, _, TokenType::Plus) => {
                return Err(RuntimeErrorType::OperandsMustBeNumberOrString.at(operator))
            }
            (
                _,
                _,
                TokenType::Minus
                | TokenType::Slash
                | TokenType::Star
                | TokenType::Greater
                | TokenType::GreaterEqual
                | TokenType::Less
                | TokenType::LessEqual,
            ) => return Err(RuntimeErrorType::OperandMustBeNumber.at(operator)),

            (_, _, ty) => unreachable!("Binary expression with operator {ty}"),
        };

        log::trace!("{left:?} {operator} {right:?} = {value:?}");
        Ok(value)
    }

    fn visit_conditional(
        &mut self,
        condition: &Expr<'a>,
        then_branch: &Expr<'a>,
        else_branch: &Expr<'a>,
        _question: &Token<'a>,
        colon: &Token<'a>,
    ) -> Result<Value, RuntimeError> {
        // Deliberately stricter than `is_truthy`: only booleans are accepted here.
        match self.evaluate(condition)? {
            Value::Bool(true) => self.evaluate(then_branch),
            Value::Bool(false) => self.evaluate(else_branch),
            _ => Err(RuntimeErrorType::ConditionMustBeBoolean.at(colon)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[ctor::ctor]
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn eval(source: &str) -> Result<Value, InterpretError> {
        Interpreter::new(Vec::new()).evaluate_source(source)
    }

    fn eval_ok(source: &str) -> Value {
        eval(source).unwrap_or_else(|e| panic!("{source}: {e}"))
    }

    fn runtime_error(source: &str) -> RuntimeError {
        match eval(source) {
            Err(InterpretError::RuntimeError(e)) => e,
            other => panic!("Expected runtime error for {source}, got {other:?}"),
        }
    }

    fn run(source: &str) -> (String, Result<(), InterpretError>) {
        let mut interpreter = Interpreter::new(Vec::new());
        let result = interpreter.run_source(source);
        (String::from_utf8(interpreter.output().clone()).unwrap(), result)
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval_ok("1 + 2 * 3"), Value::Number(7.0));
        assert_eq!(eval_ok("(1 + 2) * 3"), Value::Number(9.0));
        assert_eq!(eval_ok("8 / 4 / 2"), Value::Number(1.0));
        assert_eq!(eval_ok("10 - 4 - 3"), Value::Number(3.0));
        assert_eq!(eval_ok("--5"), Value::Number(5.0));
        assert_eq!(eval_ok("-(2 * 3)"), Value::Number(-6.0));
    }

    #[test]
    fn division_by_zero_is_not_an_error() {
        assert_eq!(eval_ok("1 / 0"), Value::Number(f64::INFINITY));
        assert_eq!(eval_ok("-1 / 0"), Value::Number(f64::NEG_INFINITY));
        assert!(matches!(eval_ok("0 / 0"), Value::Number(n) if n.is_nan()));
    }

    #[test]
    fn comparison_and_logic() {
        assert_eq!(eval_ok("1 < 2"), Value::Bool(true));
        assert_eq!(eval_ok("2 <= 2"), Value::Bool(true));
        assert_eq!(eval_ok("1 > 2"), Value::Bool(false));
        assert_eq!(eval_ok("3 >= 4"), Value::Bool(false));
        assert_eq!(eval_ok("!!true"), Value::Bool(true));
        assert_eq!(eval_ok("!nil"), Value::Bool(true));
        assert_eq!(eval_ok("!0"), Value::Bool(false));
        assert_eq!(eval_ok("!\"\""), Value::Bool(false));
    }

    #[test]
    fn equality() {
        assert_eq!(eval_ok("1 == \"1\""), Value::Bool(false));
        assert_eq!(eval_ok("nil == nil"), Value::Bool(true));
        assert_eq!(eval_ok("nil == false"), Value::Bool(false));
        assert_eq!(eval_ok("\"a\" == \"a\""), Value::Bool(true));
        assert_eq!(eval_ok("1 != 2"), Value::Bool(true));
        assert_eq!(eval_ok("true != true"), Value::Bool(false));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval_ok("\"a\" + 1"), Value::from("a1"));
        assert_eq!(eval_ok("1 + \"a\""), Value::from("1a"));
        assert_eq!(eval_ok("\"x\" + 2.5 + \"y\""), Value::from("x2.5y"));
        assert_eq!(eval_ok("\"a\" + \"b\""), Value::from("ab"));
    }

    #[test]
    fn conditional() {
        assert_eq!(eval_ok("true ? 1 : (1/0)"), Value::Number(1.0));
        assert_eq!(eval_ok("false ? (1/0) : 2"), Value::Number(2.0));
        assert_eq!(eval_ok("1 < 2 ? \"yes\" : \"no\""), Value::from("yes"));
        assert_eq!(eval_ok("false ? 1 : true ? 2 : 3"), Value::Number(2.0));
    }

    #[test]
    fn untaken_branch_is_not_evaluated() {
        assert_eq!(eval_ok("true ? 1 : -\"boom\""), Value::Number(1.0));
        assert_eq!(eval_ok("false ? nil + nil : 2"), Value::Number(2.0));
    }

    #[test]
    fn type_errors() {
        let e = runtime_error("1 ? 2 : 3");
        assert_eq!(e.error, RuntimeErrorType::ConditionMustBeBoolean);
        assert_eq!(e.lexeme, ":");

        let e = runtime_error("nil ? 2 : 3");
        assert_eq!(e.to_string(), "Expression must return boolean");

        let e = runtime_error("true + 1");
        assert_eq!((e.error, e.lexeme.as_str()), (RuntimeErrorType::OperandsMustBeNumberOrString, "+"));

        let e = runtime_error("-\"a\"");
        assert_eq!(e.to_string(), "Operand must be a number");

        let e = runtime_error("1 +\n2 *\n\"x\"");
        assert_eq!((e.error, e.line), (RuntimeErrorType::OperandMustBeNumber, Line(2)));

        assert_eq!(runtime_error("\"a\" < \"b\"").error, RuntimeErrorType::OperandMustBeNumber);
    }

    #[test]
    fn print_statements() {
        let (output, result) = run("print 6 / 2;\nprint \"a\" + 1;\nprint nil;\n1 + 1;\nprint 1 == 1;");
        result.unwrap();
        assert_eq!(output, "3\na1\nnil\ntrue\n");
    }

    #[test]
    fn runtime_error_stops_execution() {
        let mut interpreter = Interpreter::new(Vec::new());
        let result = interpreter.run_source("print 1;\nprint -true;\nprint 2;");
        assert!(matches!(
            result,
            Err(InterpretError::RuntimeError(RuntimeError { line: Line(2), .. }))
        ));
        assert!(interpreter.reporter().had_runtime_error());
        assert_eq!(String::from_utf8(interpreter.output().clone()).unwrap(), "1\n");
    }

    #[test]
    fn syntax_errors_prevent_execution() {
        let (output, result) = run("print 1;\nprint (2;\nprint 3 +;");
        assert_eq!(output, "");
        match result {
            Err(InterpretError::CompileError(errors)) => assert_eq!(
                errors.to_string(),
                "[line 2] Error at ';': Expected ')' after expression.\n[line 3] Error at ';': Expression expected"
            ),
            other => panic!("Expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn scan_errors_prevent_execution() {
        let (output, result) = run("print 1;\nprint 2 @ 3;");
        assert_eq!(output, "");
        assert!(matches!(result, Err(InterpretError::CompileError(_))));
    }

    #[test]
    fn blocks_and_continue_are_not_executable() {
        let (output, result) = run("print 1;\n{ print 2; }\nprint 3;");
        assert_eq!(output, "1\n");
        match result {
            Err(InterpretError::RuntimeError(e)) => {
                assert_eq!((e.error, e.line, e.lexeme.as_str()), (RuntimeErrorType::UnsupportedStatement, Line(2), "{"))
            }
            other => panic!("Expected runtime error, got {other:?}"),
        }

        let (_, result) = run("continue;");
        assert!(matches!(
            result,
            Err(InterpretError::RuntimeError(RuntimeError { error: RuntimeErrorType::UnsupportedStatement, .. }))
        ));
    }
}
