// This module renders the finished compilation into C++ source text: one
// extractor struct per field, the instruction-type enumeration with its count
// and invalid sentinels, one decode struct per instruction, the nested switch
// decoder and the computed-goto dispatch loop. Every renderer is a pure
// function of the plan, so rendering the same compilation twice yields
// byte-identical text. Layout (header guards, namespace wrap, switch
// indentation, the six-per-row jump table) matches the interpreter core these
// files are compiled into.

//! C++ renderers for the generated units.

use crate::compile::{
    Arm, ArmTarget, DispatchPlan, FieldPlan, FieldRegistry, InstructionPlan, Selection, ValueKind,
};

/// Render `Fields.h`: extractor structs for every compiled field.
pub fn render_fields(fields: &FieldRegistry) -> String {
    let classes = fields
        .values()
        .map(field_class)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "#ifndef GENERATED_FIELDS_H\n\
         #define GENERATED_FIELDS_H\n\
         \n\
         #include \"Common.h\"\n\
         \n\
         namespace RISCV {{\n\
         {classes}\n\
         \n\
         }}  // namespace RISCV\n\
         \n\
         #endif  // GENERATED_FIELDS_H\n"
    )
}

fn field_class(plan: &FieldPlan) -> String {
    let return_type = match plan.kind {
        ValueKind::Register => "RegisterType",
        _ => "uint32_t",
    };
    let signed_bit = match plan.kind {
        ValueKind::Immediate { sign_bit } => {
            format!("    static constexpr uint8_t SIGNEDBIT = {sign_bit};")
        }
        _ => String::new(),
    };
    let value = plan
        .slices
        .iter()
        .map(|slice| {
            let partial = format!("getPartialBits<{}, {}>(instr)", slice.src_lsb, slice.src_msb);
            if slice.shift > 0 {
                format!("        shiftRight<{}>({partial})", slice.shift)
            } else {
                format!("        shiftLeft<{}>({partial})", -slice.shift)
            }
        })
        .collect::<Vec<_>>()
        .join(" +\n");
    let ret = if return_type == "RegisterType" {
        format!("static_cast<RegisterType>({})", plan.name)
    } else {
        plan.name.clone()
    };
    format!(
        "struct {ident} {{\n\
         \x20   static constexpr uint32_t MASK = 0x{mask:x};\n\
         {signed_bit}\n\
         \x20   static inline {return_type} getValue(uint32_t instr)\n\
         \x20   {{\n\
         \x20       uint32_t {name} =\n\
         {value};\n\
         \x20       return {ret};\n\
         \x20   }}\n\
         }};",
        ident = plan.ident,
        mask = plan.mask,
        name = plan.name,
    )
}

/// Render `InstructionTypes.h`: the instruction-type enumeration.
pub fn render_instruction_types(instructions: &[InstructionPlan]) -> String {
    let entries = instructions
        .iter()
        .map(|plan| format!("    {},\n", plan.mnemonic))
        .collect::<String>();
    format!(
        "#ifndef GENERATED_INSTRUCTION_TYPES_H\n\
         #define GENERATED_INSTRUCTION_TYPES_H\n\
         \n\
         #include <cstdint>\n\
         \n\
         namespace RISCV {{\n\
         \n\
         enum InstructionType : uint8_t {{\n\
         {entries}\
         \n\
         \x20   INSTRUCTION_COUNT,\n\
         \n\
         \x20   INSTRUCTION_INVALID = INSTRUCTION_COUNT\n\
         }};\n\
         \n\
         }}  // namespace RISCV\n\
         \n\
         #endif  // GENERATED_INSTRUCTION_TYPES_H\n"
    )
}

/// Render `Instructions.h`: decode structs for every instruction.
pub fn render_instructions(instructions: &[InstructionPlan]) -> String {
    let classes = instructions
        .iter()
        .map(instruction_class)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "#ifndef GENERATED_INSTRUCTIONS_H\n\
         #define GENERATED_INSTRUCTIONS_H\n\
         \n\
         #include <cstdint>\n\
         #include \"Common.h\"\n\
         #include \"generated/Fields.h\"\n\
         \n\
         namespace RISCV {{\n\
         \n\
         {classes}\n\
         \n\
         }}  // namespace RISCV\n\
         \n\
         #endif  // GENERATED_INSTRUCTIONS_H\n"
    )
}

fn instruction_class(plan: &InstructionPlan) -> String {
    let mut assignments = String::new();
    for binding in &plan.bindings {
        if binding.sign_bit.is_some() {
            assignments.push_str(&format!(
                "        decInstr.immSignBitNum = {}::SIGNEDBIT;\n",
                binding.ident
            ));
        }
        assignments.push_str(&format!(
            "        decInstr.{} = {}::getValue(encInstr);\n",
            binding.member, binding.ident
        ));
    }
    assignments.push_str("        return decInstr;");
    format!(
        "struct Instruction{mnemonic} {{\n\
         \x20   static constexpr uint32_t OPCODE = {opcode:#010x};\n\
         \x20   static inline DecodedInstruction decodeInstruction(EncodedInstruction encInstr) {{\n\
         \x20       DecodedInstruction decInstr;\n\
         \x20       decInstr.type = InstructionType::{mnemonic};\n\
         \x20       decInstr.exec = Executor{mnemonic};\n\
         {assignments}\n\
         \x20   }}\n\
         }};",
        mnemonic = plan.mnemonic,
        opcode = plan.opcode,
    )
}

/// Render `Decoder.cpp`: the hierarchical decode function.
pub fn render_decoder(selection: &Selection, instructions: &[InstructionPlan]) -> String {
    let mut body = String::new();
    render_switch(&mut body, selection, instructions);
    let body = body.trim_end_matches('\n');
    format!(
        "#include \"Decoder.h\"\n\
         #include \"macros.h\"\n\
         #include \"generated/Instructions.h\"\n\
         \n\
         namespace RISCV {{\n\
         \n\
         DecodedInstruction Decoder::decodeInstruction(const EncodedInstruction encInstr) const {{\n\
         \x20   DecodedInstruction decInstr;\n\
         {body}\n\
         \x20   UNREACHABLE();\n\
         }}\n\
         \n\
         }}  // namespace RISCV\n\
         \n"
    )
}

fn render_switch(out: &mut String, selection: &Selection, instructions: &[InstructionPlan]) {
    // Each nesting level indents its switch by eight columns.
    let indent = 4 + 8 * selection.depth as usize;
    let pad = " ".repeat(indent);
    let case_pad = " ".repeat(indent + 4);
    let body_pad = " ".repeat(indent + 8);
    out.push_str(&format!("{pad}switch (encInstr & 0x{:x}) {{\n", selection.mask));
    for Arm { key, target } in &selection.arms {
        match target {
            ArmTarget::Instruction(ordinal) => {
                let mnemonic = &instructions[*ordinal].mnemonic;
                out.push_str(&format!(
                    "{case_pad}case getOpcodeBits<Instruction{mnemonic}::OPCODE, 0x{:x}>():\n",
                    selection.mask
                ));
                out.push_str(&format!(
                    "{body_pad}return Instruction{mnemonic}::decodeInstruction(encInstr);\n"
                ));
            }
            ArmTarget::Nested(nested) => {
                out.push_str(&format!("{case_pad}case 0x{key:x}:\n"));
                render_switch(out, nested, instructions);
            }
        }
    }
    out.push_str(&format!("{case_pad}default:\n{body_pad}UNREACHABLE();\n"));
    out.push_str(&format!("{pad}}}\n"));
}

/// Render `Dispatcher.cpp`: the threaded dispatch loop.
pub fn render_dispatcher(dispatch: &DispatchPlan) -> String {
    let mut rows = String::new();
    for (count, label) in dispatch
        .table
        .iter()
        .take(dispatch.handlers.len())
        .enumerate()
    {
        rows.push_str(&format!("&&{label},"));
        rows.push_str(&" ".repeat(11usize.saturating_sub(label.len())));
        if (count + 1) % 6 == 0 {
            rows.push('\n');
            rows.push_str(&" ".repeat(38));
        }
    }
    rows.push_str(&format!("&&{}", crate::compile::BLOCK_END_LABEL));

    let mut cases = String::new();
    for handler in &dispatch.handlers {
        cases.push_str(&format!(
            "{label}:\n    {executor}(hart_, *instr_iter);\n    DISPATCH();\n",
            label = handler.label,
            executor = handler.executor,
        ));
    }
    cases.push_str(&format!(
        "{}:\n    return;\n\n    UNREACHABLE();",
        crate::compile::BLOCK_END_LABEL
    ));

    format!(
        "#include \"Dispatcher.h\"\n\
         #include \"Executor-inl.h\"\n\
         \n\
         namespace RISCV {{\n\
         \n\
         void Dispatcher::dispatchExecute(BasicBlock::BodyEntry instr_iter) {{\n\
         \x20   static void *dispatch_table[] = {{ {rows} }};\n\
         \n\
         #define DISPATCH()                          \\\n\
         \x20   ++instr_iter;                           \\\n\
         \x20   goto *dispatch_table[instr_iter->type]\n\
         \n\
         \x20   goto *dispatch_table[instr_iter->type];\n\
         \n\
         {cases}\n\
         }}\n\
         \n\
         }}  // namespace RISCV\n\
         \n"
    )
}
