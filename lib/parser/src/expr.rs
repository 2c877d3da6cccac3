use std::fmt::{self, Display, Formatter};

use scanner::Token;

use crate::AstPrinter;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Literal(LiteralValue<'a>),
    Grouping(Box<Expr<'a>>),
    Unary {
        operator: Token<'a>,
        right: Box<Expr<'a>>,
    },
    Binary {
        left: Box<Expr<'a>>,
        operator: Token<'a>,
        right: Box<Expr<'a>>,
    },
    /// `condition ? then_branch : else_branch`. The `?` and `:` tokens are
    /// only kept to anchor diagnostics.
    Conditional {
        condition: Box<Expr<'a>>,
        then_branch: Box<Expr<'a>>,
        else_branch: Box<Expr<'a>>,
        question: Token<'a>,
        colon: Token<'a>,
    },
}

/// One operation over every kind of [`Expr`]. Implementors get a method per
/// variant; adding a variant breaks every visitor until it handles it.
pub trait ExprVisitor<'a, R> {
    fn visit_literal(&mut self, value: &LiteralValue<'a>) -> R;
    fn visit_grouping(&mut self, expression: &Expr<'a>) -> R;
    fn visit_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> R;
    fn visit_binary(&mut self, left: &Expr<'a>, operator: &Token<'a>, right: &Expr<'a>) -> R;
    fn visit_conditional(
        &mut self,
        condition: &Expr<'a>,
        then_branch: &Expr<'a>,
        else_branch: &Expr<'a>,
        question: &Token<'a>,
        colon: &Token<'a>,
    ) -> R;
}

impl<'a> Expr<'a> {
    pub fn accept<R>(&self, visitor: &mut impl ExprVisitor<'a, R>) -> R {
        match self {
            Expr::Literal(value) => visitor.visit_literal(value),
            Expr::Grouping(expression) => visitor.visit_grouping(expression),
            Expr::Unary { operator, right } => visitor.visit_unary(operator, right),
            Expr::Binary { left, operator, right } => visitor.visit_binary(left, operator, right),
            Expr::Conditional { condition, then_branch, else_branch, question, colon } => {
                visitor.visit_conditional(condition, then_branch, else_branch, question, colon)
            }
        }
    }
}

impl Display for Expr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", AstPrinter.print(self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue<'a> {
    Number(f64),
    Str(&'a str),
    Boolean(bool),
    Nil,
}

impl<'a> Display for LiteralValue<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{n}"),
            LiteralValue::Str(s) => write!(f, "{s}"),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
            LiteralValue::Nil => write!(f, "nil"),
        }
    }
}
