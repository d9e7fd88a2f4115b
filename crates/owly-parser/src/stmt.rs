//! Statement and declaration parsing (§4.1 "Statements", "Declarations").

use owly_core::{ElifClause, EnumMember, MiscKind, NodeId, NodeKind, SwitchCase, TokenKind};

use crate::error::ParseError;
use crate::expr::parse_int_value;
use crate::parser::Parser;

impl Parser {
    /// Parses statements until `}` or end of input, without consuming the
    /// terminator -- the caller (block-opening construct, or
    /// `parse_program` at top level) is responsible for that.
    pub(crate) fn parse_stmt_list(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let mut stmts = Vec::new();
        while !self.is_eof() && !self.check(TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_brace_block(&mut self) -> Result<Vec<NodeId>, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let stmts = self.parse_stmt_list()?;
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<NodeId, ParseError> {
        match self.peek().kind {
            TokenKind::KeywordVar => {
                self.advance();
                self.parse_var_decl()
            }
            TokenKind::KeywordFunc => {
                self.advance();
                self.parse_func_decl()
            }
            TokenKind::KeywordReturn => {
                self.advance();
                self.parse_return()
            }
            TokenKind::KeywordEnum => {
                self.advance();
                self.parse_enum_decl()
            }
            TokenKind::KeywordStruct => {
                self.advance();
                self.parse_struct_decl()
            }
            TokenKind::KeywordUnion => {
                self.advance();
                self.parse_union_decl()
            }
            TokenKind::KeywordWhile => {
                self.advance();
                self.parse_while_stmt()
            }
            TokenKind::KeywordDo => {
                self.advance();
                self.parse_do_while_stmt()
            }
            TokenKind::KeywordFor => {
                self.advance();
                self.parse_for_stmt()
            }
            TokenKind::KeywordIf => {
                self.advance();
                self.parse_if_stmt()
            }
            TokenKind::KeywordSwitch => {
                self.advance();
                self.parse_switch_stmt()
            }
            TokenKind::KeywordBreak | TokenKind::KeywordContinue => self.parse_misc_stmt(),
            TokenKind::KeywordTypedef => {
                self.advance();
                self.parse_typedef()
            }
            TokenKind::KeywordArr => {
                self.advance();
                self.parse_array()
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_expr_stmt(&mut self) -> Result<NodeId, ParseError> {
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "';' after expression")?;
        Ok(self.ast.push(NodeKind::ExprStmt { expr }))
    }

    /// `[properties] type [*]ident [= expr];` -- also the `for`-loop
    /// initializer form, which omits the leading `var` keyword (the caller
    /// decides whether to consume one first).
    pub(crate) fn parse_var_decl(&mut self) -> Result<NodeId, ParseError> {
        let ty = self.parse_type()?;
        let name = self.expect(TokenKind::Identifier, "variable name")?.lexeme;
        let mut init = None;
        if self.check(TokenKind::Assign) {
            self.advance();
            init = Some(self.parse_expr()?);
        }
        self.expect(TokenKind::Semicolon, "';' after variable declaration")?;
        Ok(self.ast.push(NodeKind::VarDecl { ty, name, init }))
    }

    /// `[properties] type [*]ident [= expr]`, with no terminator of its own
    /// -- used for function parameters and struct/union members, whose
    /// callers supply the `,`/`;`/`)` that ends the declaration.
    fn parse_arg_decl(&mut self) -> Result<NodeId, ParseError> {
        let ty = self.parse_type()?;
        let name = self.expect(TokenKind::Identifier, "member or parameter name")?.lexeme;
        let mut init = None;
        if self.check(TokenKind::Assign) {
            self.advance();
            init = Some(self.parse_expr()?);
        }
        Ok(self.ast.push(NodeKind::VarDecl { ty, name, init }))
    }

    fn parse_func_decl(&mut self) -> Result<NodeId, ParseError> {
        let return_ty = self.parse_type()?;
        let name = self.expect(TokenKind::Identifier, "function name")?.lexeme;
        self.expect(TokenKind::LParen, "'(' after function name")?;

        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_eof() {
            if self.check(TokenKind::KeywordVoid) && self.peek_next().kind != TokenKind::Star {
                self.advance();
                break;
            }
            params.push(self.parse_arg_decl()?);
            if self.check(TokenKind::Comma) {
                self.advance();
            } else if !self.check(TokenKind::RParen) {
                return Err(ParseError::UnexpectedToken {
                    expected: "',' or ')' in parameter list".to_string(),
                    found: self.peek().kind,
                    lexeme: self.peek().lexeme.clone(),
                });
            }
        }
        self.expect(TokenKind::RParen, "')' after parameter list")?;

        if self.check(TokenKind::Semicolon) {
            self.advance();
            return Ok(self.ast.push(NodeKind::FuncDecl {
                return_ty,
                name,
                params,
                is_prototype: true,
                body: Vec::new(),
            }));
        }

        let body = self.parse_brace_block()?;
        Ok(self.ast.push(NodeKind::FuncDecl {
            return_ty,
            name,
            params,
            is_prototype: false,
            body,
        }))
    }

    fn parse_return(&mut self) -> Result<NodeId, ParseError> {
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "';' after return statement")?;
        Ok(self.ast.push(NodeKind::Return { value }))
    }

    pub(crate) fn parse_enum_decl(&mut self) -> Result<NodeId, ParseError> {
        let tag = if self.check(TokenKind::Identifier) {
            Some(self.advance().lexeme)
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{' after enum name")?;

        let mut members = Vec::new();
        loop {
            if self.check(TokenKind::RBrace) {
                self.advance();
                break;
            }
            let name = self.expect(TokenKind::Identifier, "enum member name")?.lexeme;
            let value = if self.check(TokenKind::Assign) {
                self.advance();
                Some(self.parse_expr()?)
            } else {
                None
            };
            members.push(EnumMember { name, value });

            if self.check(TokenKind::Comma) {
                self.advance();
            } else if !self.check(TokenKind::RBrace) {
                return Err(ParseError::UnexpectedToken {
                    expected: "',' or '}' after enum member".to_string(),
                    found: self.peek().kind,
                    lexeme: self.peek().lexeme.clone(),
                });
            }
        }

        let tag = tag.or_else(|| {
            self.check(TokenKind::Identifier)
                .then(|| self.advance().lexeme)
        });
        self.expect(TokenKind::Semicolon, "';' after enum declaration")?;
        Ok(self.ast.push(NodeKind::EnumDecl { tag, members }))
    }

    pub(crate) fn parse_struct_decl(&mut self) -> Result<NodeId, ParseError> {
        let tag = if self.check(TokenKind::Identifier) {
            Some(self.advance().lexeme)
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{' after struct name")?;

        let mut members = Vec::new();
        loop {
            if self.check(TokenKind::RBrace) {
                self.advance();
                break;
            }
            members.push(self.parse_arg_decl()?);
            self.expect(TokenKind::Semicolon, "';' after struct member")?;
        }

        let tag = tag.or_else(|| {
            self.check(TokenKind::Identifier)
                .then(|| self.advance().lexeme)
        });
        self.expect(TokenKind::Semicolon, "';' after struct declaration")?;
        Ok(self.ast.push(NodeKind::StructDecl { tag, members }))
    }

    pub(crate) fn parse_union_decl(&mut self) -> Result<NodeId, ParseError> {
        let tag = if self.check(TokenKind::Identifier) {
            Some(self.advance().lexeme)
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{' after union name")?;

        let mut members = Vec::new();
        loop {
            if self.check(TokenKind::RBrace) {
                self.advance();
                break;
            }
            members.push(self.parse_arg_decl()?);
            self.expect(TokenKind::Semicolon, "';' after union member")?;
        }

        let tag = tag.or_else(|| {
            self.check(TokenKind::Identifier)
                .then(|| self.advance().lexeme)
        });
        self.expect(TokenKind::Semicolon, "';' after union declaration")?;
        Ok(self.ast.push(NodeKind::UnionDecl { tag, members }))
    }

    fn parse_while_stmt(&mut self) -> Result<NodeId, ParseError> {
        self.expect(TokenKind::LParen, "'(' after 'while'")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        let body = self.parse_brace_block()?;
        Ok(self.ast.push(NodeKind::While { cond, body }))
    }

    fn parse_do_while_stmt(&mut self) -> Result<NodeId, ParseError> {
        let body = self.parse_brace_block()?;
        self.expect(TokenKind::KeywordWhile, "'while' after 'do' body")?;
        self.expect(TokenKind::LParen, "'(' after 'while'")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        self.expect(TokenKind::Semicolon, "';' after do-while condition")?;
        Ok(self.ast.push(NodeKind::DoWhile { body, cond }))
    }

    fn parse_for_stmt(&mut self) -> Result<NodeId, ParseError> {
        self.expect(TokenKind::LParen, "'(' after 'for'")?;

        let init = if self.check(TokenKind::Semicolon) {
            self.advance();
            None
        } else {
            Some(self.parse_var_decl()?)
        };

        let cond = if self.check(TokenKind::Semicolon) {
            self.advance();
            None
        } else {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "';' after for-loop condition")?;
            Some(self.ast.push(NodeKind::ExprStmt { expr }))
        };

        let inc = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen, "')' after for-loop clauses")?;

        let body = self.parse_brace_block()?;
        Ok(self.ast.push(NodeKind::For {
            init,
            cond,
            inc,
            body,
        }))
    }

    fn parse_if_stmt(&mut self) -> Result<NodeId, ParseError> {
        self.expect(TokenKind::LParen, "'(' after 'if'")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')' after if condition")?;
        let body = self.parse_brace_block()?;

        let mut elifs = Vec::new();
        while self.check(TokenKind::KeywordElse) && self.peek_next().kind == TokenKind::KeywordIf {
            self.advance();
            self.advance();
            self.expect(TokenKind::LParen, "'(' after elif condition")?;
            let elif_cond = self.parse_expr()?;
            self.expect(TokenKind::RParen, "')' after elif condition")?;
            let elif_body = self.parse_brace_block()?;
            elifs.push(ElifClause {
                cond: elif_cond,
                body: elif_body,
            });
        }

        let else_body = if self.check(TokenKind::KeywordElse) {
            self.advance();
            Some(self.parse_brace_block()?)
        } else {
            None
        };

        Ok(self.ast.push(NodeKind::If {
            cond,
            body,
            elifs,
            else_body,
        }))
    }

    fn parse_switch_stmt(&mut self) -> Result<NodeId, ParseError> {
        self.expect(TokenKind::LParen, "'(' after 'switch'")?;
        let scrutinee = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')' after switch expression")?;
        self.expect(TokenKind::LBrace, "'{' after switch expression")?;

        let mut cases = Vec::new();
        let mut default_body = None;
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            if self.check(TokenKind::KeywordCase) {
                self.advance();
                self.expect(TokenKind::LParen, "'(' after 'case'")?;
                let value = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')' after case expression")?;
                let body = self.parse_brace_block()?;
                cases.push(SwitchCase { value, body });
            } else if self.check(TokenKind::KeywordDefault) {
                self.advance();
                default_body = Some(self.parse_brace_block()?);
            } else {
                return Err(ParseError::UnexpectedToken {
                    expected: "'case' or 'default' inside switch".to_string(),
                    found: self.peek().kind,
                    lexeme: self.peek().lexeme.clone(),
                });
            }
        }
        self.expect(TokenKind::RBrace, "'}' after switch body")?;

        Ok(self.ast.push(NodeKind::Switch {
            scrutinee,
            cases,
            default_body,
        }))
    }

    fn parse_misc_stmt(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.advance();
        let kind = match tok.kind {
            TokenKind::KeywordBreak => MiscKind::Break,
            TokenKind::KeywordContinue => MiscKind::Continue,
            _ => unreachable!("caller only dispatches here for break/continue"),
        };
        self.expect(TokenKind::Semicolon, "';' after statement")?;
        Ok(self.ast.push(NodeKind::Misc { kind }))
    }

    fn parse_typedef(&mut self) -> Result<NodeId, ParseError> {
        let (underlying, name) = match self.peek().kind {
            TokenKind::KeywordStruct => {
                self.advance();
                let decl = self.parse_struct_decl()?;
                let name = match &self.ast.get(decl).kind {
                    NodeKind::StructDecl { tag: Some(tag), .. } => tag.clone(),
                    _ => {
                        return Err(ParseError::InvalidSpecifier {
                            reason: "typedef of an anonymous struct needs a tag name".to_string(),
                        })
                    }
                };
                (decl, name)
            }
            TokenKind::KeywordUnion => {
                self.advance();
                let decl = self.parse_union_decl()?;
                let name = match &self.ast.get(decl).kind {
                    NodeKind::UnionDecl { tag: Some(tag), .. } => tag.clone(),
                    _ => {
                        return Err(ParseError::InvalidSpecifier {
                            reason: "typedef of an anonymous union needs a tag name".to_string(),
                        })
                    }
                };
                (decl, name)
            }
            TokenKind::KeywordEnum => {
                self.advance();
                let decl = self.parse_enum_decl()?;
                let name = match &self.ast.get(decl).kind {
                    NodeKind::EnumDecl { tag: Some(tag), .. } => tag.clone(),
                    _ => {
                        return Err(ParseError::InvalidSpecifier {
                            reason: "typedef of an anonymous enum needs a tag name".to_string(),
                        })
                    }
                };
                (decl, name)
            }
            _ => {
                let ty = self.parse_type()?;
                let name = self.expect(TokenKind::Identifier, "typedef name")?.lexeme;
                self.expect(TokenKind::Semicolon, "';' after typedef")?;
                (ty, name)
            }
        };
        Ok(self.ast.push(NodeKind::Typedef { name, underlying }))
    }

    fn parse_array(&mut self) -> Result<NodeId, ParseError> {
        self.expect(TokenKind::Lower, "'<' after 'arr'")?;
        let elem_ty = self.parse_type()?;
        self.expect(TokenKind::Greater, "'>' after array element type")?;
        let name = self.expect(TokenKind::Identifier, "array name")?.lexeme;

        let mut dimensions = Vec::new();
        while self.check(TokenKind::LBracket) {
            self.advance();
            let size_tok = self.expect(TokenKind::LiteralInt, "array dimension size")?;
            dimensions.push(parse_int_value(&size_tok.lexeme) as u64);
            self.expect(TokenKind::RBracket, "']' after array dimension")?;
        }

        let init = if self.check(TokenKind::Assign) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';' after array declaration")?;

        Ok(self.ast.push(NodeKind::Array {
            elem_ty,
            name,
            dimensions,
            init,
        }))
    }
}
