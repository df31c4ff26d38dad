use crate::{
    context::MAX_STRING_LITERALS,
    error::{Error, Spanned},
    ir_gen::MAX_CALL_ARGUMENTS,
    util::fmt::{Show, ShowContext},
};

impl Show for Spanned<Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &ShowContext<'_>) -> std::fmt::Result {
        let i = ctx.interner;
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use Error::*;
        match error {
            UndeclaredIdentifier(name) => {
                let name = i.get(name);
                write!(f, "identifier '{name}' has not been declared")
            }
            Redeclared(name) => {
                let name = i.get(name);
                write!(f, "identifier '{name}' has already been declared")
            }
            FunctionRedefined(name) => {
                let name = i.get(name);
                write!(f, "function '{name}' has already been defined")
            }
            FunctionReturnMismatch(name) => {
                let name = i.get(name);
                write!(f, "function '{name}' redeclared with a different return type")
            }
            FunctionArityMismatch {
                name,
                expected,
                actual,
            } => {
                let name = i.get(name);
                write!(
                    f,
                    "function '{name}' redeclared with {actual} parameters, \
                    but was declared with {expected}"
                )
            }
            FunctionParameterMismatch { name, index } => {
                let name = i.get(name);
                write!(
                    f,
                    "function '{name}' redeclared with a different type for parameter {index}"
                )
            }
            IllegalReturnType(name) => {
                let name = i.get(name);
                write!(f, "function '{name}' cannot return an array or a function")
            }
            IllegalArrayElement(name) => {
                let name = i.get(name);
                write!(f, "'{name}' declared as an array of functions")
            }
            DuplicateLabel(name) => {
                let name = i.get(name);
                write!(f, "label '{name}' has already been defined")
            }
            UndeclaredLabel(name) => {
                let name = i.get(name);
                write!(f, "label '{name}' is used but never defined")
            }
            NonConstantArrayLength(name) => {
                let name = i.get(name);
                write!(f, "cannot declare array '{name}' without a constant length")
            }
            VoidObject(name) => {
                let name = i.get(name);
                write!(f, "variable '{name}' declared void")
            }
            FunctionAsValue => write!(f, "function cannot be used as a value"),
            InvalidOperands { op, lhs, rhs } => {
                write!(f, "invalid operands to '{op}' ({lhs} and {rhs})")
            }
            InvalidOperand { op, ty } => write!(f, "invalid operand to unary '{op}' ({ty})"),
            PointerOperation { op } => write!(f, "cannot perform '{op}' on pointers"),
            Incomparable { lhs, rhs } => write!(f, "cannot compare {lhs} with {rhs}"),
            NotAssignable => write!(f, "cannot assign to r-value"),
            AssignNonArithmetic(ty) => {
                write!(f, "right side of assignment must be arithmetic, but got {ty}")
            }
            NonZeroToPointer => write!(f, "cannot assign non-zero constant to pointer"),
            IncompatiblePointers { lhs, rhs } => {
                write!(f, "incompatible pointer types {lhs} and {rhs}")
            }
            IncompatibleAssignment { lhs, rhs } => write!(f, "cannot assign {rhs} to {lhs}"),
            PointerCompoundOperator { op } => write!(f, "cannot apply '{op}=' to pointer"),
            PointerCompoundNonInteger(ty) => write!(
                f,
                "compound assignment to pointer must be integer, but got {ty}"
            ),
            AddressOfNonObject => write!(f, "cannot take the address of a non-object"),
            DerefNonPointer(ty) => write!(f, "cannot dereference non-pointer type {ty}"),
            DerefVoidPointer => write!(f, "cannot dereference void pointer"),
            NotScalar { what, ty } => write!(f, "{what} must be scalar, but got {ty}"),
            TernaryMismatch { lhs, rhs } => {
                write!(f, "mismatched conditional operands ({lhs} and {rhs})")
            }
            InvalidCast { from, to } => write!(f, "cannot cast {from} to {to}"),
            NotCallable(ty) => write!(f, "called object of type {ty} is not a function"),
            ArgumentCount {
                name,
                expected,
                actual,
            } => {
                let name = i.get(name);
                write!(
                    f,
                    "function '{name}' expects {expected} arguments, but got {actual}"
                )
            }
            ArgumentType {
                index,
                expected,
                actual,
            } => write!(f, "argument {index}: expected {expected}, but got {actual}"),
            ReturnValueInVoid(name) => {
                let name = i.get(name);
                write!(f, "returning a value in void function '{name}'")
            }
            ReturnWithoutValue(name) => {
                let name = i.get(name);
                write!(f, "non-void function '{name}' must return a value")
            }
            ReturnType { expected, actual } => {
                write!(f, "return type mismatch: expected {expected}, but got {actual}")
            }
            MissingReturn(name) => {
                let name = i.get(name);
                write!(f, "non-void function '{name}' has no return statement")
            }
            IncrementNonLvalue => write!(f, "increment requires a modifiable l-value"),
            TooManyStrings => write!(
                f,
                "too many string literals (at most {MAX_STRING_LITERALS} are supported)"
            ),
            TooManyArguments { name, count } => {
                let name = i.get(name);
                write!(
                    f,
                    "call to '{name}' passes {count} arguments \
                    (at most {MAX_CALL_ARGUMENTS} are supported)"
                )
            }
            TooManyParameters { name, count } => {
                let name = i.get(name);
                write!(
                    f,
                    "function '{name}' has {count} parameters \
                    (at most {MAX_CALL_ARGUMENTS} are supported)"
                )
            }
            BreakOutsideLoop => write!(f, "cannot break from outside of a loop"),
            ContinueOutsideLoop => write!(f, "cannot continue outside of a loop"),
        }
    }
}
