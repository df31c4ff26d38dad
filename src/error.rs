use std::fmt;

use crate::{types::Type, util::intern::Interned};

/// Location of a node in the source, as reported in diagnostics.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: u32,
}

impl Span {
    pub const fn new(line: u32) -> Span {
        Span { line }
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({})", self.line)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

/// The pass that owns an error counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    Symbol,
    Type,
    Codegen,
}

impl Pass {
    pub const ALL: [Pass; 3] = [Pass::Symbol, Pass::Type, Pass::Codegen];
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Symbol => "symbol",
            Pass::Type => "type",
            Pass::Codegen => "codegen",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    // declarations
    UndeclaredIdentifier(Interned),
    Redeclared(Interned),
    FunctionRedefined(Interned),
    FunctionReturnMismatch(Interned),
    FunctionArityMismatch {
        name: Interned,
        expected: usize,
        actual: usize,
    },
    FunctionParameterMismatch {
        name: Interned,
        index: usize,
    },
    IllegalReturnType(Interned),
    IllegalArrayElement(Interned),
    DuplicateLabel(Interned),
    UndeclaredLabel(Interned),

    // types
    NonConstantArrayLength(Interned),
    VoidObject(Interned),
    FunctionAsValue,
    InvalidOperands {
        op: &'static str,
        lhs: Type,
        rhs: Type,
    },
    InvalidOperand {
        op: &'static str,
        ty: Type,
    },
    PointerOperation {
        op: &'static str,
    },
    Incomparable {
        lhs: Type,
        rhs: Type,
    },
    NotAssignable,
    AssignNonArithmetic(Type),
    NonZeroToPointer,
    IncompatiblePointers {
        lhs: Type,
        rhs: Type,
    },
    IncompatibleAssignment {
        lhs: Type,
        rhs: Type,
    },
    PointerCompoundOperator {
        op: &'static str,
    },
    PointerCompoundNonInteger(Type),
    AddressOfNonObject,
    DerefNonPointer(Type),
    DerefVoidPointer,
    NotScalar {
        what: &'static str,
        ty: Type,
    },
    TernaryMismatch {
        lhs: Type,
        rhs: Type,
    },
    InvalidCast {
        from: Type,
        to: Type,
    },
    NotCallable(Type),
    ArgumentCount {
        name: Interned,
        expected: usize,
        actual: usize,
    },
    ArgumentType {
        index: usize,
        expected: Type,
        actual: Type,
    },
    ReturnValueInVoid(Interned),
    ReturnWithoutValue(Interned),
    ReturnType {
        expected: Type,
        actual: Type,
    },
    MissingReturn(Interned),
    IncrementNonLvalue,

    // code generation
    TooManyStrings,
    TooManyArguments {
        name: Interned,
        count: usize,
    },
    TooManyParameters {
        name: Interned,
        count: usize,
    },
    BreakOutsideLoop,
    ContinueOutsideLoop,
}

impl Error {
    pub fn pass(&self) -> Pass {
        use Error::*;
        match self {
            UndeclaredIdentifier(_)
            | Redeclared(_)
            | FunctionRedefined(_)
            | FunctionReturnMismatch(_)
            | FunctionArityMismatch { .. }
            | FunctionParameterMismatch { .. }
            | IllegalReturnType(_)
            | IllegalArrayElement(_)
            | DuplicateLabel(_)
            | UndeclaredLabel(_) => Pass::Symbol,

            NonConstantArrayLength(_)
            | VoidObject(_)
            | FunctionAsValue
            | InvalidOperands { .. }
            | InvalidOperand { .. }
            | PointerOperation { .. }
            | Incomparable { .. }
            | NotAssignable
            | AssignNonArithmetic(_)
            | NonZeroToPointer
            | IncompatiblePointers { .. }
            | IncompatibleAssignment { .. }
            | PointerCompoundOperator { .. }
            | PointerCompoundNonInteger(_)
            | AddressOfNonObject
            | DerefNonPointer(_)
            | DerefVoidPointer
            | NotScalar { .. }
            | TernaryMismatch { .. }
            | InvalidCast { .. }
            | NotCallable(_)
            | ArgumentCount { .. }
            | ArgumentType { .. }
            | ReturnValueInVoid(_)
            | ReturnWithoutValue(_)
            | ReturnType { .. }
            | MissingReturn(_)
            | IncrementNonLvalue => Pass::Type,

            TooManyStrings
            | TooManyArguments { .. }
            | TooManyParameters { .. }
            | BreakOutsideLoop
            | ContinueOutsideLoop => Pass::Codegen,
        }
    }
}
