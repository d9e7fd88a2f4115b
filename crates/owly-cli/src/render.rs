//! Plain-text IR dump (SPEC_FULL.md §10.4 `lower` subcommand: "text form
//! resembling the opcode mnemonics of §3"). This is presentation only --
//! `owly-ir`/`owly-lower` never format anything themselves -- so it lives
//! here rather than in the library crates, per §6's "an implementer may
//! substitute any serializer without changing the core semantics".

use owly_ir::{IRFunction, IRInstrKind, IRModule, IRValue, IRValueKind};

pub fn print_module(module: &IRModule, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(module).unwrap());
        return;
    }

    println!("; module {}", module.source_file);
    for global in &module.globals {
        println!("@{} = global", display_value(global));
    }
    println!();
    for func in &module.functions {
        print_function(func);
        println!();
    }
}

fn print_function(func: &IRFunction) {
    let params = func
        .params
        .iter()
        .map(|(name, ty)| format!("{name}: {}", display_type(*ty)))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "func @{}({params}) -> {} {{",
        func.name,
        display_type(func.return_type)
    );
    for block in &func.blocks {
        let label = block.name.as_deref().unwrap_or("");
        println!("{}: ; {label}", block.id);
        for instr in &block.instrs {
            print_instr(instr);
        }
    }
    println!("}}");
}

fn print_instr(instr: &owly_ir::IRInstr) {
    let dest = instr.dest.map(|d| format!("{d} = ")).unwrap_or_default();
    let line = match &instr.kind {
        IRInstrKind::Alloca { size, align } => format!("alloca size={size} align={align}"),
        IRInstrKind::Load { ptr } => format!("load {}", display_value(ptr)),
        IRInstrKind::Store { value, ptr } => {
            format!("store {}, {}", display_value(value), display_value(ptr))
        }
        IRInstrKind::Binary { op, lhs, rhs } => {
            format!("{} {}, {}", op.mnemonic(), display_value(lhs), display_value(rhs))
        }
        IRInstrKind::Unary { op, operand } => format!("{} {}", op.mnemonic(), display_value(operand)),
        IRInstrKind::Convert { op, source } => format!("{} {}", op.mnemonic(), display_value(source)),
        IRInstrKind::Jump { target } => format!("jump {target}"),
        IRInstrKind::Branch {
            cond,
            then_block,
            else_block,
        } => format!("branch {}, {then_block}, {else_block}", display_value(cond)),
        IRInstrKind::Return { value } => match value {
            Some(v) => format!("return {}", display_value(v)),
            None => "return".to_string(),
        },
        IRInstrKind::Call { callee, args } => {
            let args = args.iter().map(display_value).collect::<Vec<_>>().join(", ");
            format!("call {}({args})", display_value(callee))
        }
        IRInstrKind::Phi { incoming } => {
            let pairs = incoming
                .iter()
                .map(|inc| format!("[{}, {}]", display_value(&inc.value), inc.block))
                .collect::<Vec<_>>()
                .join(", ");
            format!("phi {pairs}")
        }
    };
    println!("  {dest}{line}");
}

fn display_value(value: &IRValue) -> String {
    match &value.kind {
        IRValueKind::Temp => value
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "%?".to_string()),
        IRValueKind::Global => format!("@{}", value.name.as_deref().unwrap_or("?")),
        IRValueKind::ConstInt(n) => n.to_string(),
        IRValueKind::ConstFloat(f) => f.to_string(),
        IRValueKind::ConstString(_) => format!("@{}", value.name.as_deref().unwrap_or("?")),
        IRValueKind::Label(block) => block.to_string(),
        IRValueKind::Undef => "undef".to_string(),
    }
}

/// Printed as a bare numeric id (§6: resolved types are an opaque contract
/// to external consumers) rather than re-deriving a name from a registry
/// the IR module doesn't carry.
fn display_type(ty: owly_core::TypeId) -> String {
    format!("{ty}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use owly_core::TypeId;
    use owly_ir::id::ValueId;

    #[test]
    fn temp_displays_as_percent_id() {
        let v = IRValue::temp(ValueId(3), Some(TypeId::INT));
        assert_eq!(display_value(&v), "%3");
    }

    #[test]
    fn global_displays_as_at_name() {
        let v = IRValue::global("counter", Some(TypeId::INT));
        assert_eq!(display_value(&v), "@counter");
    }

    #[test]
    fn const_int_displays_bare() {
        let v = IRValue::const_int(42, Some(TypeId::INT));
        assert_eq!(display_value(&v), "42");
    }

    #[test]
    fn type_id_displays_numerically() {
        assert_eq!(display_type(TypeId::INT), "TypeId(7)");
    }
}
