use cursor::{Cursor, Line};
use errors::Reporter;

pub mod token;
pub use token::{Token, TokenData, TokenType};

use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct ScanError {
    pub error: ScanErrorType,
    pub line: Line,
}

/// Lazily turns source text into tokens. The last item is always a single
/// `Eof` token; after that the stream is exhausted.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    done: bool,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        let cursor = Cursor::new(source);
        Self { start: cursor.clone(), current: cursor, done: false }
    }

    fn make_token(&self, data: TokenData<'a>) -> Token<'a> {
        Token::new(data, (self.start.clone(), self.current.clone()))
    }

    fn error(&self, error: ScanErrorType) -> ScanError {
        ScanError { error, line: self.current.line() }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.current.peek() {
                Some(' ' | '\r' | '\t' | '\n') => {
                    self.current.next();
                }
                Some('/') if self.current.peek_next() == Some('/') => {
                    self.current.advance_while(|c| c != '\n');
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Result<Token<'a>, ScanError> {
        self.current.advance_while(|c| c != '"');
        if self.current.is_at_end() {
            return Err(self.error(ScanErrorType::UnterminatedString));
        }

        // The closing quote.
        self.current.next();

        let lexeme = self.start.slice_until(&self.current);
        Ok(self.make_token(Str(&lexeme[1..lexeme.len() - 1])))
    }

    fn number(&mut self) -> Token<'a> {
        self.current.advance_while(|c| c.is_ascii_digit());

        if self.current.peek() == Some('.')
            && self.current.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.current.next();
            self.current.advance_while(|c| c.is_ascii_digit());
        }

        let lexeme = self.start.slice_until(&self.current);
        // Only ascii digits with at most one '.' in between, so this always parses
        self.make_token(Number(lexeme.parse().unwrap_or_default()))
    }

    fn identifier(&mut self) -> Token<'a> {
        self.current.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let lexeme = self.start.slice_until(&self.current);
        self.make_token(TokenData::keyword(lexeme).unwrap_or(Identifier))
    }

    fn scan_token(&mut self) -> Result<Token<'a>, ScanError> {
        self.skip_whitespace();
        self.start = self.current.clone();

        let c = match self.current.next() {
            Some(c) => c,
            None => return Ok(self.make_token(Eof)),
        };

        let data = match c {
            '(' => LeftParen,
            ')' => RightParen,
            '{' => LeftBrace,
            '}' => RightBrace,
            ',' => Comma,
            '.' => Dot,
            '-' => Minus,
            '+' => Plus,
            ';' => Semicolon,
            '/' => Slash,
            '*' => Star,
            '?' => Question,
            ':' => Colon,

            '!' if self.current.match_char('=') => BangEqual,
            '!' => Bang,
            '=' if self.current.match_char('=') => EqualEqual,
            '=' => Equal,
            '<' if self.current.match_char('=') => LessEqual,
            '<' => Less,
            '>' if self.current.match_char('=') => GreaterEqual,
            '>' => Greater,

            '"' => return self.string(),
            d if d.is_ascii_digit() => return Ok(self.number()),
            a if a.is_ascii_alphabetic() || a == '_' => return Ok(self.identifier()),

            c => return Err(self.error(ScanErrorType::UnexpectedCharacter(c))),
        };

        Ok(self.make_token(data))
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.scan_token();
        match &token {
            Ok(token) => {
                log::trace!("Scanned {:?} '{}' on line {}", token.ty(), token.lexeme(), token.line());
                self.done = token.data == Eof;
            }
            Err(e) => log::trace!("Scan error on line {}: {e}", e.line),
        }
        Some(token)
    }
}

/// Scans the whole source. Scan errors are reported and the offending
/// characters skipped, so the result always ends with `Eof`.
pub fn scan_tokens<'a>(source: &'a str, reporter: &mut Reporter) -> Vec<Token<'a>> {
    TokenStream::new(source)
        .filter_map(|token| match token {
            Ok(token) => Some(token),
            Err(e) => {
                reporter.error(e.line, &e);
                None
            }
        })
        .collect()
}
