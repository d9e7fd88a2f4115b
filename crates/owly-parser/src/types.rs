//! Type specifier and type-node parsing (§4.1 "Types").

use owly_core::{
    LengthModifier, NodeId, NodeKind, Signedness, StorageClass, TokenKind, TypeBase, TypeSpec,
};

use crate::error::ParseError;
use crate::parser::Parser;

/// `int`/`void`/`char`/`float`/`double`/`bool`: builtin type keywords that
/// can stand as a type's base name.
fn is_builtin_type_keyword(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KeywordChar
            | TokenKind::KeywordDouble
            | TokenKind::KeywordFloat
            | TokenKind::KeywordInt
            | TokenKind::KeywordVoid
            | TokenKind::KeywordBool
    )
}

/// Storage class / sign / length / qualifier keywords that accumulate into
/// a `TypeSpec` (§4.1). Deliberately excludes `struct`/`enum`/`union`: those
/// always introduce a nested declaration and are never themselves a
/// specifier token.
fn is_specifier_keyword(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KeywordAuto
            | TokenKind::KeywordRegister
            | TokenKind::KeywordStatic
            | TokenKind::KeywordExtern
            | TokenKind::KeywordSigned
            | TokenKind::KeywordUnsigned
            | TokenKind::KeywordShort
            | TokenKind::KeywordLong
            | TokenKind::KeywordConst
            | TokenKind::KeywordVolatile
            | TokenKind::KeywordInline
            | TokenKind::KeywordRestrict
    )
}

impl Parser {
    /// Accumulates storage/sign/length/qualifier keywords into a
    /// `TypeSpec`, rejecting invalid combinations as soon as they appear:
    /// `signed`+`unsigned`, `short`+`long`, three or more `long`s, and more
    /// than one storage class (§4.1).
    pub(crate) fn parse_type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let mut spec = TypeSpec::new();
        let mut saw_signed = 0u32;
        let mut saw_unsigned = 0u32;
        let mut saw_short = 0u32;
        let mut saw_long = 0u32;
        let mut saw_storage = 0u32;

        while is_specifier_keyword(self.peek().kind) {
            let tok = self.advance();
            match tok.kind {
                TokenKind::KeywordAuto => {
                    spec.storage = Some(StorageClass::Auto);
                    saw_storage += 1;
                }
                TokenKind::KeywordRegister => {
                    spec.storage = Some(StorageClass::Register);
                    saw_storage += 1;
                }
                TokenKind::KeywordStatic => {
                    spec.storage = Some(StorageClass::Static);
                    saw_storage += 1;
                }
                TokenKind::KeywordExtern => {
                    spec.storage = Some(StorageClass::Extern);
                    saw_storage += 1;
                }
                TokenKind::KeywordSigned => {
                    spec.sign = Some(Signedness::Signed);
                    saw_signed += 1;
                }
                TokenKind::KeywordUnsigned => {
                    spec.sign = Some(Signedness::Unsigned);
                    saw_unsigned += 1;
                }
                TokenKind::KeywordShort => {
                    spec.length = Some(LengthModifier::Short);
                    saw_short += 1;
                }
                TokenKind::KeywordLong => {
                    saw_long += 1;
                    spec.length = Some(if spec.length == Some(LengthModifier::Long) {
                        LengthModifier::LongLong
                    } else {
                        LengthModifier::Long
                    });
                }
                TokenKind::KeywordConst => spec.is_const = true,
                TokenKind::KeywordVolatile => spec.is_volatile = true,
                TokenKind::KeywordInline => spec.is_inline = true,
                TokenKind::KeywordRestrict => spec.is_restrict = true,
                _ => unreachable!("is_specifier_keyword guards this match"),
            }

            if saw_signed > 0 && saw_unsigned > 0 {
                return Err(ParseError::InvalidSpecifier {
                    reason: "cannot combine 'signed' and 'unsigned' in the same declaration"
                        .to_string(),
                });
            }
            if saw_long > 0 && saw_short > 0 {
                return Err(ParseError::InvalidSpecifier {
                    reason: "cannot combine 'long' and 'short' in the same declaration"
                        .to_string(),
                });
            }
            if saw_long > 2 {
                return Err(ParseError::InvalidSpecifier {
                    reason: "too many 'long' specifiers".to_string(),
                });
            }
            if saw_storage > 1 {
                return Err(ParseError::InvalidSpecifier {
                    reason: "multiple storage specifiers in one declaration".to_string(),
                });
            }
        }

        Ok(spec)
    }

    /// Parses a full type node: specifiers, then a base (builtin keyword,
    /// typedef name, or nested struct/enum/union declaration), then any
    /// number of trailing `*` pointer markers (§4.1).
    pub(crate) fn parse_type(&mut self) -> Result<NodeId, ParseError> {
        let mut spec = self.parse_type_spec()?;

        let base = if is_builtin_type_keyword(self.peek().kind) {
            let tok = self.advance();
            TypeBase::Name(tok.lexeme)
        } else if self.check(TokenKind::Identifier) && self.peek_next().kind == TokenKind::Identifier
        {
            let tok = self.advance();
            TypeBase::Name(tok.lexeme)
        } else if self.check(TokenKind::KeywordStruct) {
            self.advance();
            TypeBase::Decl(self.parse_struct_decl()?)
        } else if self.check(TokenKind::KeywordEnum) {
            self.advance();
            TypeBase::Decl(self.parse_enum_decl()?)
        } else if self.check(TokenKind::KeywordUnion) {
            self.advance();
            TypeBase::Decl(self.parse_union_decl()?)
        } else {
            // Only specifiers were given (e.g. "unsigned x;"): default to int.
            TypeBase::Name("int".to_string())
        };

        while self.check(TokenKind::Star) {
            spec.pointer_depth += 1;
            self.advance();
        }

        Ok(self.ast.push(NodeKind::TypeNode { spec, base }))
    }
}

#[cfg(test)]
mod tests {
    use owly_core::{NodeKind, Token, TokenKind};

    use crate::error::ParseError;
    use crate::parser::Parser;

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme)
    }

    #[test]
    fn plain_int_defaults_base_name() {
        let mut p = Parser::new(vec![tok(TokenKind::KeywordInt, "int")]);
        let id = p.parse_type().unwrap();
        match &p.ast.get(id).kind {
            NodeKind::TypeNode { base, spec } => {
                assert!(matches!(base, owly_core::TypeBase::Name(n) if n == "int"));
                assert_eq!(spec.pointer_depth, 0);
            }
            _ => panic!("expected type node"),
        }
    }

    #[test]
    fn specifiers_only_default_to_int() {
        let mut p = Parser::new(vec![tok(TokenKind::KeywordUnsigned, "unsigned")]);
        let id = p.parse_type().unwrap();
        match &p.ast.get(id).kind {
            NodeKind::TypeNode { base, .. } => {
                assert!(matches!(base, owly_core::TypeBase::Name(n) if n == "int"));
            }
            _ => panic!("expected type node"),
        }
    }

    #[test]
    fn pointer_depth_counts_stars() {
        let mut p = Parser::new(vec![
            tok(TokenKind::KeywordChar, "char"),
            tok(TokenKind::Star, "*"),
            tok(TokenKind::Star, "*"),
        ]);
        let id = p.parse_type().unwrap();
        match &p.ast.get(id).kind {
            NodeKind::TypeNode { spec, .. } => assert_eq!(spec.pointer_depth, 2),
            _ => panic!("expected type node"),
        }
    }

    #[test]
    fn double_long_upgrades_to_longlong() {
        let mut p = Parser::new(vec![
            tok(TokenKind::KeywordLong, "long"),
            tok(TokenKind::KeywordLong, "long"),
            tok(TokenKind::KeywordInt, "int"),
        ]);
        let spec = p.parse_type_spec().unwrap();
        assert_eq!(spec.length, Some(owly_core::LengthModifier::LongLong));
    }

    #[test]
    fn signed_and_unsigned_conflict_errors() {
        let mut p = Parser::new(vec![
            tok(TokenKind::KeywordSigned, "signed"),
            tok(TokenKind::KeywordUnsigned, "unsigned"),
            tok(TokenKind::KeywordInt, "int"),
        ]);
        let err = p.parse_type_spec().unwrap_err();
        assert!(matches!(err, ParseError::InvalidSpecifier { .. }));
    }

    #[test]
    fn short_and_long_conflict_errors() {
        let mut p = Parser::new(vec![
            tok(TokenKind::KeywordShort, "short"),
            tok(TokenKind::KeywordLong, "long"),
        ]);
        let err = p.parse_type_spec().unwrap_err();
        assert!(matches!(err, ParseError::InvalidSpecifier { .. }));
    }

    #[test]
    fn triple_long_errors() {
        let mut p = Parser::new(vec![
            tok(TokenKind::KeywordLong, "long"),
            tok(TokenKind::KeywordLong, "long"),
            tok(TokenKind::KeywordLong, "long"),
        ]);
        let err = p.parse_type_spec().unwrap_err();
        assert!(matches!(err, ParseError::InvalidSpecifier { .. }));
    }

    #[test]
    fn multiple_storage_classes_error() {
        let mut p = Parser::new(vec![
            tok(TokenKind::KeywordStatic, "static"),
            tok(TokenKind::KeywordExtern, "extern"),
        ]);
        let err = p.parse_type_spec().unwrap_err();
        assert!(matches!(err, ParseError::InvalidSpecifier { .. }));
    }

    #[test]
    fn typedef_name_lookahead_two_identifiers() {
        let mut p = Parser::new(vec![
            tok(TokenKind::Identifier, "Point"),
            tok(TokenKind::Identifier, "origin"),
        ]);
        let id = p.parse_type().unwrap();
        match &p.ast.get(id).kind {
            NodeKind::TypeNode { base, .. } => {
                assert!(matches!(base, owly_core::TypeBase::Name(n) if n == "Point"));
            }
            _ => panic!("expected type node"),
        }
    }
}
