//! End-to-end pipeline tests driving the same library calls `main.rs`
//! wires together, covering spec.md §8's S1/S2 scenarios. These exercise
//! `owly-parser` + `owly-sema` + `owly-lower` directly rather than
//! shelling out to the `owly` binary, matching this workspace's usual
//! style of testing library entry points in-process rather than spawning
//! binaries.

use owly_core::parse_token_list;
use owly_ir::IRInstrKind;

/// S1: an empty token stream parses to a program with zero statements, all
/// three passes run clean, and lowering produces an empty module.
#[test]
fn empty_program_end_to_end() {
    let tokens = parse_token_list("").unwrap();
    let (mut ast, mut exprs) = owly_parser::parse(tokens).unwrap();
    assert_eq!(ast.program_stmts().len(), 0);

    let ctx = owly_sema::analyze(&mut ast, &mut exprs);
    assert!(!ctx.has_errors());

    let module = owly_lower::lower_program(&ast, &exprs, &ctx, "empty.owly").unwrap();
    assert!(module.functions.is_empty());
    assert!(module.globals.is_empty());
}

/// S2: `func int main(void) { return 42; }` lowers to one function with one
/// block whose sole instruction is `return const_int 42`.
#[test]
fn trivial_main_end_to_end() {
    let tokens = parse_token_list(
        r#"
        KEYWORD_FUNC, "func";
        KEYWORD_INT, "int";
        IDENTIFIER, "main";
        LPAREN, "(";
        KEYWORD_VOID, "void";
        RPAREN, ")";
        LBRACE, "{";
        KEYWORD_RETURN, "return";
        LITERAL_INT, "42";
        SEMICOLON, ";";
        RBRACE, "}";
        "#,
    )
    .unwrap();

    let (mut ast, mut exprs) = owly_parser::parse(tokens).unwrap();
    let ctx = owly_sema::analyze(&mut ast, &mut exprs);
    assert!(!ctx.has_errors(), "diagnostics: {:?}", ctx.diagnostics);

    let module = owly_lower::lower_program(&ast, &exprs, &ctx, "main.owly").unwrap();
    assert_eq!(module.functions.len(), 1);
    let func = &module.functions[0];
    assert_eq!(func.name, "main");
    assert_eq!(func.blocks.len(), 1);
    let block = &func.blocks[0];
    assert_eq!(block.instrs.len(), 1);
    match &block.instrs[0].kind {
        IRInstrKind::Return { value: Some(v) } => {
            assert!(matches!(v.kind, owly_ir::IRValueKind::ConstInt(42)));
        }
        other => panic!("expected return const_int 42, got {other:?}"),
    }
}

/// Lowering refuses to run against a program pass 3 rejected.
#[test]
fn lowering_refuses_a_program_with_semantic_errors() {
    let tokens = parse_token_list(
        r#"
        KEYWORD_VAR, "var";
        KEYWORD_INT, "int";
        IDENTIFIER, "x";
        SEMICOLON, ";";
        KEYWORD_VAR, "var";
        KEYWORD_INT, "int";
        IDENTIFIER, "x";
        SEMICOLON, ";";
        "#,
    )
    .unwrap();

    let (mut ast, mut exprs) = owly_parser::parse(tokens).unwrap();
    let ctx = owly_sema::analyze(&mut ast, &mut exprs);
    assert_eq!(ctx.error_count, 1);

    let err = owly_lower::lower_program(&ast, &exprs, &ctx, "bad.owly").unwrap_err();
    assert!(matches!(
        err,
        owly_lower::LowerError::UnresolvedSemanticErrors { error_count: 1 }
    ));
}
