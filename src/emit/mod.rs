//! Rendering the finished compilation into generated source files.
//!
//! Four logical units across five files: field extractors, the instruction
//! enumeration plus per-instruction decode routines, the hierarchical decoder
//! and the threaded dispatch loop. Nothing here inspects the specification;
//! renderers only see the plans the compiler passes produced.

pub mod cpp;

use crate::compile::Compilation;

/// One generated file: its deterministic name and full contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: &'static str,
    pub contents: String,
}

/// Render every generated unit of a compilation.
pub fn emit(compilation: &Compilation) -> Vec<GeneratedFile> {
    let files = vec![
        GeneratedFile {
            name: "Fields.h",
            contents: cpp::render_fields(&compilation.fields),
        },
        GeneratedFile {
            name: "InstructionTypes.h",
            contents: cpp::render_instruction_types(&compilation.instructions),
        },
        GeneratedFile {
            name: "Instructions.h",
            contents: cpp::render_instructions(&compilation.instructions),
        },
        GeneratedFile {
            name: "Decoder.cpp",
            contents: cpp::render_decoder(&compilation.selection, &compilation.instructions),
        },
        GeneratedFile {
            name: "Dispatcher.cpp",
            contents: cpp::render_dispatcher(&compilation.dispatch),
        },
    ];
    for file in &files {
        log::debug!("rendered {} ({} bytes)", file.name, file.contents.len());
    }
    files
}
