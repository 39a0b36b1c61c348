// This module defines error types for the decodegen compiler using the thiserror
// crate for idiomatic Rust error handling. CompileError is the main error enum
// covering the failure scenarios of a generation run: malformed or inconsistent
// specification documents (duplicate mnemonics, decode-tree leaves naming unknown
// instructions, unparsable fixed values or selector keys), structural errors found
// by the compiler passes (fields without bit slices, instructions referencing
// undeclared fields, duplicate selector keys among decode-tree siblings) and the
// IO/JSON errors of loading the document. Each variant carries the offending
// field, instruction or tree node so diagnostics name the exact culprit. The
// module also provides CompileResult<T> as a convenience type alias.

//! Error types for the specification compiler.
//!
//! Using thiserror for more idiomatic error handling.

use thiserror::Error;

/// Main error type for a specification compilation run.
///
/// Every variant aborts the run; there is no recovery and no partial output.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A field declares no bit slices, so no extraction plan can be built.
    #[error("field `{field}` declares no bit slices")]
    EmptyBitSlices { field: String },

    /// A bit slice has an inverted range or addresses bits outside the word.
    #[error("field `{field}` declares a malformed bit slice")]
    MalformedBitSlice { field: String },

    /// A decode-tree node selects on an inverted or out-of-word bit span.
    #[error("decode node selects on malformed bit span {lsb}..={msb}")]
    MalformedSelectorRange { lsb: u32, msb: u32 },

    /// An instruction references a field name absent from the field registry.
    #[error("instruction `{mnemonic}` references undeclared field `{field}`")]
    MissingField { mnemonic: String, field: String },

    /// Two siblings under one decode-tree node resolve to the same selector key.
    #[error("duplicate selector key {key:#x} under decode node spanning bits {lsb}..={msb}")]
    AmbiguousSelector { key: u32, lsb: u32, msb: u32 },

    /// Two instructions normalize to the same mnemonic.
    #[error("duplicate instruction mnemonic `{mnemonic}`")]
    DuplicateMnemonic { mnemonic: String },

    /// A decode-tree leaf names an instruction that is not in the catalog.
    #[error("decode tree references unknown instruction `{mnemonic}`")]
    UnknownMnemonic { mnemonic: String },

    /// An instruction's fixed value is not a valid 32-bit pattern.
    #[error("instruction `{mnemonic}` has invalid fixed value `{value}`")]
    InvalidFixedValue { mnemonic: String, value: String },

    /// A decode-tree child key is not a valid 32-bit selector value.
    #[error("invalid decode-tree selector key `{key}`")]
    InvalidSelectorKey { key: String },

    /// No decode-tree path matches the encoded word.
    ///
    /// Reachable only through the in-process evaluation API; in generated
    /// code the same condition is the `UNREACHABLE()` default arm.
    #[error("no decode-tree path matches encoded word {word:#010x}")]
    UnreachableEncoding { word: u32 },

    /// Reading the specification document failed.
    #[error("failed to read specification: {0}")]
    Io(#[from] std::io::Error),

    /// The specification document is not structurally valid JSON.
    #[error("malformed specification document: {0}")]
    Document(#[from] serde_json::Error),
}

/// Result type alias for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;
