//! Lexer implementation using logos

use super::token::{Token, TokenKind};
use crate::common::{CompileError, CompileResult, Span};
use logos::Logos;

/// Lexer for C-Minus source code
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> CompileResult<Token> {
        if self.at_eof {
            let len = self.inner.source().len();
            return Ok(Token::new(TokenKind::Eof, Span::new(len, len)));
        }

        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = self.inner.span();
                Ok(Token::new(kind, Span::new(span.start, span.end)))
            }
            Some(Err(())) => {
                let span = self.inner.span();
                Err(CompileError::lexer(
                    format!("unexpected input '{}'", self.inner.slice()),
                    Span::new(span.start, span.end),
                ))
            }
            None => {
                self.at_eof = true;
                let len = self.inner.source().len();
                Ok(Token::new(TokenKind::Eof, Span::new(len, len)))
            }
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize_all(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let source = "int void return if else while";
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Int));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Void));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Return));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::If));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Else));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::While));
    }

    #[test]
    fn test_identifiers_and_numbers() {
        let source = "foo bar_2 integer 42 007";
        let mut lexer = Lexer::new(source);

        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "foo"
        ));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "bar_2"
        ));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "integer"
        ));
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::IntLiteral(42));
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::IntLiteral(7));
    }

    #[test]
    fn test_operators() {
        let source = "+ - * / < <= > >= == != = ; , ( ) [ ] { }";
        let kinds: Vec<TokenKind> = Lexer::new(source)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Eq,
                TokenKind::Semi,
                TokenKind::Comma,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let source = "int /* block\n comment */ x";
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Int));
        let token = lexer.next_token().unwrap();
        assert!(matches!(&token.kind, TokenKind::Identifier(s) if s == "x"));
        assert_eq!(token.span, Span::new(25, 26));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("x # y");
        assert!(lexer.next_token().is_ok());
        assert!(matches!(lexer.next_token(), Err(CompileError::Lexer { .. })));
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        lexer.next_token().unwrap();
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}
