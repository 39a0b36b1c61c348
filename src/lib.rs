//! decodegen - ISA specification compiler.
//!
//! decodegen reads a declarative description of an instruction set (bit
//! fields, instruction encodings and an opcode decode tree) and generates the
//! C++ sources of an interpreter core: field extractors, per-instruction
//! decode routines, a hierarchical decoder and a threaded dispatch loop.
//!
//! # Primary Usage
//!
//! ```ignore
//! use decodegen::{compile::Compilation, emit, isa};
//!
//! let spec = isa::parse(&std::fs::read_to_string("risc-v.json")?)?;
//! let compilation = Compilation::build(&spec)?;
//! for file in emit::emit(&compilation) {
//!     std::fs::write(out_dir.join(file.name), &file.contents)?;
//! }
//! ```
//!
//! # Architecture
//!
//! - [`isa`] - specification data model and document ingestion
//! - [`compile`] - the four compiler passes building the generation plan
//! - [`emit`] - C++ rendering of the finished plan
//! - [`error`] - crate-wide error type

pub mod compile;
pub mod emit;
pub mod error;
pub mod isa;

// Re-export common types from organized modules
pub use compile::{
    // Pass outputs
    Compilation, DispatchPlan, FieldPlan, InstructionPlan, Selection,
    // Evaluation results
    DecodedInstruction, FieldValue, RegisterIndex,
};
pub use emit::{emit, GeneratedFile};
pub use error::{CompileError, CompileResult};
pub use isa::{parse, Specification};
