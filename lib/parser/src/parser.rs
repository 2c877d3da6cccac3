mod expr;
mod printer;
mod stmt;

use errors::{LoxError, Reporter};
pub use expr::{Expr, ExprVisitor, LiteralValue};
pub use printer::AstPrinter;
use scanner::{Token, TokenData, TokenType};
pub use stmt::{Stmt, StmtVisitor};

use TokenType::*;

#[derive(Debug)]
pub struct ParserError<'a> {
    error: ParserErrorType,
    token: Token<'a>,
}

impl<'a> From<ParserError<'a>> for LoxError {
    fn from(error: ParserError<'a>) -> Self {
        LoxError::at(&error.token, error.error)
    }
}

impl<'a> ParserError<'a> {
    fn new(error: ParserErrorType, token: Token<'a>) -> Self {
        Self { token, error }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ParserErrorType {
    #[error("Expression expected")]
    ExpectedExpression,
    #[error("Expected ')' after expression.")]
    MissingRightParen,
    #[error("Expected ':' for conditional expression")]
    MissingColon,
    #[error("Expected ';' after value.")]
    ExpectedSemicolonAfterValue,
    #[error("Expected ';' after expression.")]
    ExpectedSemicolonAfterExpression,
    #[error("Expected ';' after 'continue'.")]
    ExpectedSemicolonAfterContinue,
    #[error("Expected '}}' after block.")]
    ExpectedRightBrace,
    #[error("Expected end of expression")]
    ExpectedEndOfExpression,
}

type Result<'a, T> = std::result::Result<T, ParserError<'a>>;

/// Recursive descent parser over an already scanned token sequence, from the
/// loosest binding rule (`expression`) down to `primary`.
///
/// Syntax errors are handed to the [`Reporter`] instead of being returned, so
/// one pass over a statement sequence reports all of them.
#[derive(Debug)]
pub struct Parser<'a, 'r> {
    tokens: Vec<Token<'a>>,
    current: usize,
    had_error: bool,
    reporter: &'r mut Reporter,
}

impl<'a, 'r> Parser<'a, 'r> {
    /// `tokens` must end with an `Eof` token, which [`scanner::scan_tokens`] guarantees.
    pub fn new(tokens: Vec<Token<'a>>, reporter: &'r mut Reporter) -> Self {
        assert!(
            matches!(tokens.last(), Some(Token { data: TokenData::Eof, .. })),
            "token sequence must end with Eof"
        );
        Self { tokens, current: 0, had_error: false, reporter }
    }

    /// Parses a single expression spanning all tokens. Returns `None` if
    /// there was a syntax error, which has already been reported.
    pub fn parse_expression(&mut self) -> Option<Expr<'a>> {
        let result = self.expression().and_then(|expr| {
            self.consume(Eof, ParserErrorType::ExpectedEndOfExpression)?;
            Ok(expr)
        });

        match result {
            Ok(expr) => {
                log::debug!("Parsed expression: {expr}");
                Some(expr)
            }
            Err(e) => {
                self.reporter.report(e.into());
                None
            }
        }
    }

    /// Parses statements until `Eof`, resynchronizing after every syntax
    /// error. Returns `None` if any error was found; all of them have been
    /// reported by then.
    pub fn parse(&mut self) -> Option<Vec<Stmt<'a>>> {
        self.had_error = false;
        let mut stmts = Vec::new();

        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.report(e);
                    self.synchronize(&[]);
                }
            }
        }

        log::debug!("Parsed {} statement(s), had_error: {}", stmts.len(), self.had_error);
        (!self.had_error).then_some(stmts)
    }

    fn report(&mut self, error: ParserError<'a>) {
        log::trace!("Hit error: {:?}, syncing...", error.error);
        self.had_error = true;
        self.reporter.report(error.into());
    }

    fn statement(&mut self) -> Result<'a, Stmt<'a>> {
        if self.match_any(&[Print]).is_some() {
            return self.print_statement();
        }

        if let Some(brace) = self.match_any(&[LeftBrace]) {
            return self.block(brace);
        }

        if let Some(keyword) = self.match_any(&[Continue]) {
            self.consume(Semicolon, ParserErrorType::ExpectedSemicolonAfterContinue)?;
            return Ok(Stmt::Continue(keyword));
        }

        self.expression_statement()
    }

    fn print_statement(&mut self) -> Result<'a, Stmt<'a>> {
        let value = self.expression()?;
        self.consume(Semicolon, ParserErrorType::ExpectedSemicolonAfterValue)?;
        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<'a, Stmt<'a>> {
        let value = self.expression()?;
        self.consume(Semicolon, ParserErrorType::ExpectedSemicolonAfterExpression)?;
        Ok(Stmt::Expression(value))
    }

    fn block(&mut self, brace: Token<'a>) -> Result<'a, Stmt<'a>> {
        let mut statements = Vec::new();

        // Errors are recovered from inside the block, so its closing brace
        // still ends it instead of turning up as a stray statement.
        while !self.check(RightBrace) && !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.report(e);
                    if !self.check(RightBrace) {
                        self.synchronize(&[RightBrace]);
                    }
                }
            }
        }

        self.consume(RightBrace, ParserErrorType::ExpectedRightBrace)?;
        Ok(Stmt::Block { brace, statements })
    }

    fn expression(&mut self) -> Result<'a, Expr<'a>> {
        self.conditional()
    }

    fn conditional(&mut self) -> Result<'a, Expr<'a>> {
        let condition = self.equality()?;

        if let Some(question) = self.match_any(&[Question]) {
            let then_branch = Box::new(self.expression()?);
            let colon = self.consume(Colon, ParserErrorType::MissingColon)?;
            let else_branch = Box::new(self.expression()?);

            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                then_branch,
                else_branch,
                question,
                colon,
            });
        }

        Ok(condition)
    }

    fn equality(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.comparison()?;

        while let Some(operator) = self.match_any(&[BangEqual, EqualEqual]) {
            let right = Box::new(self.comparison()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.term()?;

        while let Some(operator) = self.match_any(&[Greater, GreaterEqual, Less, LessEqual]) {
            let right = Box::new(self.term()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.factor()?;

        while let Some(operator) = self.match_any(&[Plus, Minus]) {
            let right = Box::new(self.factor()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.unary()?;

        while let Some(operator) = self.match_any(&[Star, Slash]) {
            let right = Box::new(self.unary()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<'a, Expr<'a>> {
        if let Some(operator) = self.match_any(&[Bang, Minus]) {
            let right = Box::new(self.unary()?);
            return Ok(Expr::Unary { operator, right });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<'a, Expr<'a>> {
        let literal = match self.peek().data.clone() {
            TokenData::False => LiteralValue::Boolean(false),
            TokenData::True => LiteralValue::Boolean(true),
            TokenData::Nil => LiteralValue::Nil,
            TokenData::Number(n) => LiteralValue::Number(n),
            TokenData::Str(s) => LiteralValue::Str(s),
            TokenData::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(RightParen, ParserErrorType::MissingRightParen)?;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => {
                return Err(ParserError::new(ParserErrorType::ExpectedExpression, self.peek().clone()))
            }
        };

        self.advance();
        Ok(Expr::Literal(literal))
    }

    /// Skips tokens until a statement boundary: just past a `;`, or right
    /// before a keyword that starts a statement or one of `stop_before`.
    fn synchronize(&mut self, stop_before: &[TokenType]) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().ty() == Semicolon {
                return;
            }

            match self.peek().ty() {
                Class | Fun | Var | For | If | While | Print | Return => return,
                ty if stop_before.contains(&ty) => return,
                _ => {}
            }

            self.advance();
        }
    }
}

// Helpers
impl<'a, 'r> Parser<'a, 'r> {
    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token<'a> {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().ty() == Eof
    }

    fn check(&self, ty: TokenType) -> bool {
        self.peek().ty() == ty
    }

    /// Never moves past `Eof`; at the end it keeps handing out the `Eof` token.
    fn advance(&mut self) -> Token<'a> {
        if self.is_at_end() {
            return self.peek().clone();
        }
        self.current += 1;
        self.previous().clone()
    }

    fn match_any(&mut self, types: &[TokenType]) -> Option<Token<'a>> {
        types.contains(&self.peek().ty()).then(|| self.advance())
    }

    fn consume(&mut self, ty: TokenType, error: ParserErrorType) -> Result<'a, Token<'a>> {
        if self.check(ty) {
            return Ok(self.advance());
        }

        Err(ParserError::new(error, self.peek().clone()))
    }
}
