use itertools::Itertools;
use scanner::Token;

use crate::{Expr, ExprVisitor, LiteralValue};

/// Renders an expression as nested S-expressions, e.g. `(* (group (+ 1 2)) 3)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(mut self, expr: &Expr) -> String {
        expr.accept(&mut self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        format!("({name} {})", exprs.iter().map(|e| e.accept(self)).join(" "))
    }
}

impl<'a> ExprVisitor<'a, String> for AstPrinter {
    fn visit_literal(&mut self, value: &LiteralValue<'a>) -> String {
        value.to_string()
    }

    fn visit_grouping(&mut self, expression: &Expr<'a>) -> String {
        self.parenthesize("group", &[expression])
    }

    fn visit_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> String {
        self.parenthesize(operator.lexeme(), &[right])
    }

    fn visit_binary(&mut self, left: &Expr<'a>, operator: &Token<'a>, right: &Expr<'a>) -> String {
        self.parenthesize(operator.lexeme(), &[left, right])
    }

    fn visit_conditional(
        &mut self,
        condition: &Expr<'a>,
        then_branch: &Expr<'a>,
        else_branch: &Expr<'a>,
        _question: &Token<'a>,
        _colon: &Token<'a>,
    ) -> String {
        self.parenthesize("?:", &[condition, then_branch, else_branch])
    }
}
