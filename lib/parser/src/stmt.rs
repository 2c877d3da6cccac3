use scanner::Token;

use crate::Expr;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    Expression(Expr<'a>),
    Print(Expr<'a>),
    // Blocks and `continue` can be parsed but not executed yet: there are no
    // scopes or loops to give them a meaning.
    Block { brace: Token<'a>, statements: Vec<Stmt<'a>> },
    Continue(Token<'a>),
}

pub trait StmtVisitor<'a, R> {
    fn visit_expression_stmt(&mut self, expression: &Expr<'a>) -> R;
    fn visit_print_stmt(&mut self, expression: &Expr<'a>) -> R;
    /// Called for statements that have a syntax but no semantics, with the
    /// token that introduced them.
    fn visit_unsupported(&mut self, keyword: &Token<'a>) -> R;
}

impl<'a> Stmt<'a> {
    pub fn accept<R>(&self, visitor: &mut impl StmtVisitor<'a, R>) -> R {
        match self {
            Stmt::Expression(expression) => visitor.visit_expression_stmt(expression),
            Stmt::Print(expression) => visitor.visit_print_stmt(expression),
            Stmt::Block { brace, .. } => visitor.visit_unsupported(brace),
            Stmt::Continue(keyword) => visitor.visit_unsupported(keyword),
        }
    }
}
