//! The token-stream contract (§6).
//!
//! `owly-parser` consumes an ordered, finite, non-restartable sequence of
//! [`Token`]s through the [`TokenStream`] trait, with a guaranteed lookahead
//! of at least two (`peek`, `peek_next`). The tokenizer itself is an
//! external collaborator and is not implemented here; this module only
//! defines the contract and a `Vec`-backed implementation plus a loader for
//! the persisted `TAG, "lexeme";` test format, so the parser can be
//! exercised without a lexer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The closed set of token tags the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Eof,
    Unknown,

    // Keywords
    KeywordArr,
    KeywordAuto,
    KeywordBreak,
    KeywordCase,
    KeywordChar,
    KeywordConst,
    KeywordContinue,
    KeywordDefault,
    KeywordDo,
    KeywordDouble,
    KeywordElse,
    KeywordEnum,
    KeywordExtern,
    KeywordFloat,
    KeywordFor,
    KeywordFunc,
    KeywordIf,
    KeywordInline,
    KeywordInt,
    KeywordLong,
    KeywordRegister,
    KeywordRestrict,
    KeywordReturn,
    KeywordShort,
    KeywordSigned,
    KeywordSizeof,
    KeywordStatic,
    KeywordStruct,
    KeywordSwitch,
    KeywordTypedef,
    KeywordUnion,
    KeywordUnsigned,
    KeywordVar,
    KeywordVoid,
    KeywordVolatile,
    KeywordWhile,
    KeywordBool,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Increment,
    Decrement,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    Equal,
    NotEqual,
    Greater,
    Lower,
    Geq,
    Leq,
    Not,
    AndAnd,
    OrOr,
    Amp,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,
    AmpAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    Dot,
    Arrow,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Question,

    Identifier,

    LiteralString,
    LiteralChar,
    LiteralInt,
    LiteralFloat,
}

impl TokenKind {
    /// Maps the closed set of persisted-format tag spellings (`TAG,
    /// "lexeme";` records) onto a `TokenKind`. Unknown spellings map to
    /// `TokenKind::Unknown`, per §6.
    pub fn from_tag_str(tag: &str) -> TokenKind {
        use TokenKind::*;
        match tag {
            "EOF" => Eof,
            "KEYWORD_ARR" => KeywordArr,
            "KEYWORD_AUTO" => KeywordAuto,
            "KEYWORD_BREAK" => KeywordBreak,
            "KEYWORD_CASE" => KeywordCase,
            "KEYWORD_CHAR" => KeywordChar,
            "KEYWORD_CONST" => KeywordConst,
            "KEYWORD_CONTINUE" => KeywordContinue,
            "KEYWORD_DEFAULT" => KeywordDefault,
            "KEYWORD_DO" => KeywordDo,
            "KEYWORD_DOUBLE" => KeywordDouble,
            "KEYWORD_ELSE" => KeywordElse,
            "KEYWORD_ENUM" => KeywordEnum,
            "KEYWORD_EXTERN" => KeywordExtern,
            "KEYWORD_FLOAT" => KeywordFloat,
            "KEYWORD_FOR" => KeywordFor,
            "KEYWORD_FUNC" => KeywordFunc,
            "KEYWORD_IF" => KeywordIf,
            "KEYWORD_INLINE" => KeywordInline,
            "KEYWORD_INT" => KeywordInt,
            "KEYWORD_LONG" => KeywordLong,
            "KEYWORD_REGISTER" => KeywordRegister,
            "KEYWORD_RESTRICT" => KeywordRestrict,
            "KEYWORD_RETURN" => KeywordReturn,
            "KEYWORD_SHORT" => KeywordShort,
            "KEYWORD_SIGNED" => KeywordSigned,
            "KEYWORD_SIZEOF" => KeywordSizeof,
            "KEYWORD_STATIC" => KeywordStatic,
            "KEYWORD_STRUCT" => KeywordStruct,
            "KEYWORD_SWITCH" => KeywordSwitch,
            "KEYWORD_TYPEDEF" => KeywordTypedef,
            "KEYWORD_UNION" => KeywordUnion,
            "KEYWORD_UNSIGNED" => KeywordUnsigned,
            "KEYWORD_VAR" => KeywordVar,
            "KEYWORD_VOID" => KeywordVoid,
            "KEYWORD_VOLATILE" => KeywordVolatile,
            "KEYWORD_WHILE" => KeywordWhile,
            "KEYWORD_BOOL" => KeywordBool,
            "OPERATOR_PLUS" => Plus,
            "OPERATOR_MINUS" => Minus,
            "OPERATOR_STAR" => Star,
            "OPERATOR_SLASH" => Slash,
            "OPERATOR_PERCENT" => Percent,
            "OPERATOR_INCREMENT" => Increment,
            "OPERATOR_DECREMENT" => Decrement,
            "OPERATOR_ASSIGN" => Assign,
            "OPERATOR_PLUSASSIGN" => PlusAssign,
            "OPERATOR_MINUSASSIGN" => MinusAssign,
            "OPERATOR_STARASSIGN" => StarAssign,
            "OPERATOR_SLASHASSIGN" => SlashAssign,
            "OPERATOR_PERCENTASSIGN" => PercentAssign,
            "OPERATOR_EQUAL" => Equal,
            "OPERATOR_NEQUAL" => NotEqual,
            "OPERATOR_GREATER" => Greater,
            "OPERATOR_LOWER" => Lower,
            "OPERATOR_GEQ" => Geq,
            "OPERATOR_LEQ" => Leq,
            "OPERATOR_NOT" => Not,
            "OPERATOR_AND" => AndAnd,
            "OPERATOR_OR" => OrOr,
            "OPERATOR_AMP" => Amp,
            "OPERATOR_BITOR" => BitOr,
            "OPERATOR_BITXOR" => BitXor,
            "OPERATOR_BITNOT" => BitNot,
            "OPERATOR_BITSHL" => Shl,
            "OPERATOR_BITSHR" => Shr,
            "OPERATOR_BITANDASSIGN" => AmpAssign,
            "OPERATOR_BITORASSIGN" => BitOrAssign,
            "OPERATOR_BITXORASSIGN" => BitXorAssign,
            "OPERATOR_BITSHLASSIGN" => ShlAssign,
            "OPERATOR_BITSHRASSIGN" => ShrAssign,
            "OPERATOR_POINT" => Dot,
            "OPERATOR_ARROW" => Arrow,
            "LPAREN" => LParen,
            "RPAREN" => RParen,
            "LBRACKET" => LBracket,
            "RBRACKET" => RBracket,
            "LBRACE" => LBrace,
            "RBRACE" => RBrace,
            "COMMA" => Comma,
            "COLON" => Colon,
            "SEMICOLON" => Semicolon,
            "QUESTION" => Question,
            "IDENTIFIER" => Identifier,
            "LITERAL_STRING" => LiteralString,
            "LITERAL_CHAR" => LiteralChar,
            "LITERAL_INT" => LiteralInt,
            "LITERAL_FLOAT" => LiteralFloat,
            _ => Unknown,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single lexical token: a closed-set tag plus its immutable lexeme text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenKind::Eof, "")
    }
}

/// The token-stream contract the parser depends on: a finite,
/// non-restartable sequence with at least two tokens of lookahead.
pub trait TokenStream {
    /// The token at the current position, without consuming it.
    fn peek(&self) -> &Token;
    /// The token one position past the current one, without consuming it.
    fn peek_next(&self) -> &Token;
    /// Consumes and returns the token at the current position.
    fn advance(&mut self) -> Token;
    /// `true` once the current token is `TokenKind::Eof`.
    fn is_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
}

/// A `Vec`-backed [`TokenStream`]: a fully materialized token list with a
/// cursor.
#[derive(Debug, Clone)]
pub struct VecTokenStream {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl VecTokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token::eof());
        }
        VecTokenStream {
            tokens,
            pos: 0,
            eof: Token::eof(),
        }
    }

    fn at(&self, idx: usize) -> &Token {
        self.tokens.get(idx).unwrap_or(&self.eof)
    }
}

impl TokenStream for VecTokenStream {
    fn peek(&self) -> &Token {
        self.at(self.pos)
    }

    fn peek_next(&self) -> &Token {
        self.at(self.pos + 1)
    }

    fn advance(&mut self) -> Token {
        let tok = self.at(self.pos).clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }
}

/// Parses a persisted token-list format, usable for testing the parser
/// independently of a lexer: one `TAG, "lexeme";` record per line. Unknown
/// tag spellings map to [`TokenKind::Unknown`] rather than erroring; a line
/// that isn't shaped like a record at all is a
/// [`CoreError::MalformedTokenRecord`].
pub fn parse_token_list(text: &str) -> Result<Vec<Token>, CoreError> {
    let mut tokens = Vec::new();
    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let token = parse_token_record(line).ok_or_else(|| CoreError::MalformedTokenRecord {
            line: line_no + 1,
            text: raw_line.to_string(),
        })?;
        tokens.push(token);
    }
    Ok(tokens)
}

/// Parses one `TAG, "lexeme";` record. Returns `None` if the line does not
/// match that shape.
fn parse_token_record(line: &str) -> Option<Token> {
    let line = line.strip_suffix(';').unwrap_or(line).trim();
    let (tag_part, rest) = line.split_once(',')?;
    let tag = tag_part.trim();

    let lexeme_part = rest.trim();
    let lexeme = lexeme_part
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))?;

    Some(Token::new(TokenKind::from_tag_str(tag), lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_tag_str_known_keyword() {
        assert_eq!(TokenKind::from_tag_str("KEYWORD_FUNC"), TokenKind::KeywordFunc);
    }

    #[test]
    fn from_tag_str_unknown_maps_to_unknown() {
        assert_eq!(TokenKind::from_tag_str("NOT_A_REAL_TAG"), TokenKind::Unknown);
    }

    #[test]
    fn parse_single_record() {
        let tokens = parse_token_list(r#"KEYWORD_INT, "int";"#).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::KeywordInt);
        assert_eq!(tokens[0].lexeme, "int");
    }

    #[test]
    fn parse_multiple_lines_skips_blank() {
        let text = "KEYWORD_INT, \"int\";\n\nIDENTIFIER, \"x\";\nSEMICOLON, \";\";\n";
        let tokens = parse_token_list(text).unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Semicolon);
    }

    #[test]
    fn parse_malformed_record_errors() {
        let err = parse_token_list("not a record at all").unwrap_err();
        assert!(matches!(err, CoreError::MalformedTokenRecord { line: 1, .. }));
    }

    #[test]
    fn vec_stream_lookahead_two() {
        let stream = VecTokenStream::new(vec![
            Token::new(TokenKind::KeywordInt, "int"),
            Token::new(TokenKind::Identifier, "x"),
            Token::new(TokenKind::Semicolon, ";"),
        ]);
        assert_eq!(stream.peek().kind, TokenKind::KeywordInt);
        assert_eq!(stream.peek_next().kind, TokenKind::Identifier);
    }

    #[test]
    fn vec_stream_advance_and_eof() {
        let mut stream = VecTokenStream::new(vec![Token::new(TokenKind::Semicolon, ";")]);
        let tok = stream.advance();
        assert_eq!(tok.kind, TokenKind::Semicolon);
        assert_eq!(stream.peek().kind, TokenKind::Eof);
        assert!(stream.is_eof());
        // Advancing past EOF keeps yielding EOF rather than panicking.
        assert_eq!(stream.advance().kind, TokenKind::Eof);
        assert_eq!(stream.advance().kind, TokenKind::Eof);
    }

    #[test]
    fn vec_stream_appends_eof_if_missing() {
        let stream = VecTokenStream::new(vec![Token::new(TokenKind::KeywordVar, "var")]);
        assert_eq!(stream.peek_next().kind, TokenKind::Eof);
    }
}
