use owly_core::{Ast, ExprPool, NodeKind, Token, TokenKind};

use crate::error::ParseError;

/// Owns the token cursor plus the two arenas the grammar productions build
/// into. Tokens are fully materialized up front (mirrors
/// [`owly_core::VecTokenStream`]); the parser does not restart or rewind
/// past what `peek`/`peek_next` already exposes, per §6.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) ast: Ast,
    pub(crate) exprs: ExprPool,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token::eof());
        }
        Parser {
            tokens,
            pos: 0,
            ast: Ast::new(),
            exprs: ExprPool::new(),
        }
    }

    /// Parses the full token list into a `Program` node at `ast.root`,
    /// returning the populated AST and expression arenas. One error aborts
    /// the whole parse (§4.1).
    pub fn parse_program(mut self) -> Result<(Ast, ExprPool), ParseError> {
        let stmts = self.parse_stmt_list()?;
        let root = self.ast.push(NodeKind::Program { stmts });
        self.ast.root = Some(root);
        Ok((self.ast, self.exprs))
    }

    pub(crate) fn at(&self, idx: usize) -> &Token {
        self.tokens.get(idx).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    pub(crate) fn peek(&self) -> &Token {
        self.at(self.pos)
    }

    pub(crate) fn peek_next(&self) -> &Token {
        self.at(self.pos + 1)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.at(self.pos).clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    /// Consumes the current token if it matches `kind`, else errors.
    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else if self.is_eof() {
            Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            })
        } else {
            let found = self.peek().clone();
            Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.kind,
                lexeme: found.lexeme,
            })
        }
    }
}
