//! End-to-end parses of small Owly programs expressed in the persisted
//! `TAG, "lexeme";` token-list format, exercising the parser without a
//! lexer (§6).

use owly_core::{parse_token_list, NodeKind};
use pretty_assertions::assert_eq;

fn parse_program(tokens_text: &str) -> owly_core::Ast {
    let tokens = parse_token_list(tokens_text).expect("token list should parse");
    let (ast, _exprs) = owly_parser::parse(tokens).expect("program should parse");
    ast
}

#[test]
fn var_decl_with_initializer() {
    let ast = parse_program(
        r#"
        KEYWORD_VAR, "var";
        KEYWORD_INT, "int";
        IDENTIFIER, "x";
        OPERATOR_ASSIGN, "=";
        LITERAL_INT, "5";
        SEMICOLON, ";";
        "#,
    );
    assert_eq!(ast.program_stmts().len(), 1);
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::VarDecl { name, init, .. } => {
            assert_eq!(name, "x");
            assert!(init.is_some());
        }
        other => panic!("expected var decl, got {other:?}"),
    }
}

#[test]
fn function_with_params_and_return() {
    let ast = parse_program(
        r#"
        KEYWORD_FUNC, "func";
        KEYWORD_INT, "int";
        IDENTIFIER, "add";
        LPAREN, "(";
        KEYWORD_INT, "int";
        IDENTIFIER, "a";
        COMMA, ",";
        KEYWORD_INT, "int";
        IDENTIFIER, "b";
        RPAREN, ")";
        LBRACE, "{";
        KEYWORD_RETURN, "return";
        IDENTIFIER, "a";
        OPERATOR_PLUS, "+";
        IDENTIFIER, "b";
        SEMICOLON, ";";
        RBRACE, "}";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::FuncDecl {
            name,
            params,
            is_prototype,
            body,
            ..
        } => {
            assert_eq!(name, "add");
            assert_eq!(params.len(), 2);
            assert!(!is_prototype);
            assert_eq!(body.len(), 1);
            assert!(matches!(ast.get(body[0]).kind, NodeKind::Return { .. }));
        }
        other => panic!("expected func decl, got {other:?}"),
    }
}

#[test]
fn function_prototype_has_no_body() {
    let ast = parse_program(
        r#"
        KEYWORD_FUNC, "func";
        KEYWORD_VOID, "void";
        IDENTIFIER, "noop";
        LPAREN, "(";
        KEYWORD_VOID, "void";
        RPAREN, ")";
        SEMICOLON, ";";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::FuncDecl { is_prototype, params, body, .. } => {
            assert!(is_prototype);
            assert!(params.is_empty());
            assert!(body.is_empty());
        }
        other => panic!("expected func decl, got {other:?}"),
    }
}

#[test]
fn if_elif_else_chain() {
    let ast = parse_program(
        r#"
        KEYWORD_IF, "if";
        LPAREN, "(";
        IDENTIFIER, "a";
        RPAREN, ")";
        LBRACE, "{";
        KEYWORD_BREAK, "break";
        SEMICOLON, ";";
        RBRACE, "}";
        KEYWORD_ELSE, "else";
        KEYWORD_IF, "if";
        LPAREN, "(";
        IDENTIFIER, "b";
        RPAREN, ")";
        LBRACE, "{";
        KEYWORD_CONTINUE, "continue";
        SEMICOLON, ";";
        RBRACE, "}";
        KEYWORD_ELSE, "else";
        LBRACE, "{";
        RBRACE, "}";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::If { elifs, else_body, .. } => {
            assert_eq!(elifs.len(), 1);
            assert!(else_body.is_some());
        }
        other => panic!("expected if stmt, got {other:?}"),
    }
}

#[test]
fn struct_decl_with_members() {
    let ast = parse_program(
        r#"
        KEYWORD_STRUCT, "struct";
        IDENTIFIER, "Point";
        LBRACE, "{";
        KEYWORD_INT, "int";
        IDENTIFIER, "x";
        SEMICOLON, ";";
        KEYWORD_INT, "int";
        IDENTIFIER, "y";
        SEMICOLON, ";";
        RBRACE, "}";
        SEMICOLON, ";";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::StructDecl { tag, members } => {
            assert_eq!(tag.as_deref(), Some("Point"));
            assert_eq!(members.len(), 2);
        }
        other => panic!("expected struct decl, got {other:?}"),
    }
}

#[test]
fn enum_decl_with_explicit_values() {
    let ast = parse_program(
        r#"
        KEYWORD_ENUM, "enum";
        IDENTIFIER, "Color";
        LBRACE, "{";
        IDENTIFIER, "Red";
        OPERATOR_ASSIGN, "=";
        LITERAL_INT, "1";
        COMMA, ",";
        IDENTIFIER, "Green";
        RBRACE, "}";
        SEMICOLON, ";";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::EnumDecl { tag, members } => {
            assert_eq!(tag.as_deref(), Some("Color"));
            assert_eq!(members.len(), 2);
            assert!(members[0].value.is_some());
            assert!(members[1].value.is_none());
        }
        other => panic!("expected enum decl, got {other:?}"),
    }
}

#[test]
fn for_loop_clauses() {
    let ast = parse_program(
        r#"
        KEYWORD_FOR, "for";
        LPAREN, "(";
        KEYWORD_INT, "int";
        IDENTIFIER, "i";
        OPERATOR_ASSIGN, "=";
        LITERAL_INT, "0";
        SEMICOLON, ";";
        IDENTIFIER, "i";
        OPERATOR_LOWER, "<";
        LITERAL_INT, "10";
        SEMICOLON, ";";
        IDENTIFIER, "i";
        OPERATOR_INCREMENT, "++";
        RPAREN, ")";
        LBRACE, "{";
        RBRACE, "}";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::For { init, cond, inc, .. } => {
            assert!(init.is_some());
            assert!(cond.is_some());
            assert!(inc.is_some());
        }
        other => panic!("expected for stmt, got {other:?}"),
    }
}

#[test]
fn switch_with_cases_and_default() {
    let ast = parse_program(
        r#"
        KEYWORD_SWITCH, "switch";
        LPAREN, "(";
        IDENTIFIER, "x";
        RPAREN, ")";
        LBRACE, "{";
        KEYWORD_CASE, "case";
        LPAREN, "(";
        LITERAL_INT, "1";
        RPAREN, ")";
        LBRACE, "{";
        RBRACE, "}";
        KEYWORD_DEFAULT, "default";
        LBRACE, "{";
        RBRACE, "}";
        RBRACE, "}";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::Switch { cases, default_body, .. } => {
            assert_eq!(cases.len(), 1);
            assert!(default_body.is_some());
        }
        other => panic!("expected switch stmt, got {other:?}"),
    }
}

#[test]
fn typedef_of_plain_type() {
    let ast = parse_program(
        r#"
        KEYWORD_TYPEDEF, "typedef";
        KEYWORD_UNSIGNED, "unsigned";
        KEYWORD_INT, "int";
        IDENTIFIER, "u32";
        SEMICOLON, ";";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    assert!(matches!(&stmt.kind, NodeKind::Typedef { name, .. } if name == "u32"));
}

#[test]
fn array_decl_with_dimensions() {
    let ast = parse_program(
        r#"
        KEYWORD_ARR, "arr";
        OPERATOR_LOWER, "<";
        KEYWORD_INT, "int";
        OPERATOR_GREATER, ">";
        IDENTIFIER, "grid";
        LBRACKET, "[";
        LITERAL_INT, "4";
        RBRACKET, "]";
        LBRACKET, "[";
        LITERAL_INT, "8";
        RBRACKET, "]";
        SEMICOLON, ";";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::Array { name, dimensions, .. } => {
            assert_eq!(name, "grid");
            assert_eq!(dimensions, &vec![4, 8]);
        }
        other => panic!("expected array decl, got {other:?}"),
    }
}

#[test]
fn do_while_loop() {
    let ast = parse_program(
        r#"
        KEYWORD_DO, "do";
        LBRACE, "{";
        RBRACE, "}";
        KEYWORD_WHILE, "while";
        LPAREN, "(";
        IDENTIFIER, "running";
        RPAREN, ")";
        SEMICOLON, ";";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    assert!(matches!(stmt.kind, NodeKind::DoWhile { .. }));
}

#[test]
fn pointer_var_decl() {
    let ast = parse_program(
        r#"
        KEYWORD_VAR, "var";
        KEYWORD_INT, "int";
        OPERATOR_STAR, "*";
        IDENTIFIER, "p";
        SEMICOLON, ";";
        "#,
    );
    let stmt = ast.get(ast.program_stmts()[0]);
    match &stmt.kind {
        NodeKind::VarDecl { ty, .. } => match &ast.get(*ty).kind {
            NodeKind::TypeNode { spec, .. } => assert_eq!(spec.pointer_depth, 1),
            other => panic!("expected type node, got {other:?}"),
        },
        other => panic!("expected var decl, got {other:?}"),
    }
}

#[test]
fn malformed_program_reports_parse_error() {
    let tokens = parse_token_list(
        r#"
        KEYWORD_VAR, "var";
        KEYWORD_INT, "int";
        "#,
    )
    .unwrap();
    let err = owly_parser::parse(tokens).unwrap_err();
    assert!(matches!(err, owly_parser::ParseError::UnexpectedEof { .. }));
}
