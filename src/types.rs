use std::{fmt, rc::Rc};

use crate::symbols::ScopeId;

/// Storage width of a basic type, in bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Width {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
}

impl Width {
    pub const fn bytes(self) -> u32 {
        self as u32
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Basic {
    pub width: Width,
    pub unsigned: bool,
}

impl Basic {
    pub const CHAR: Basic = Basic::signed(Width::Byte);
    pub const SHORT: Basic = Basic::signed(Width::HalfWord);
    pub const INT: Basic = Basic::signed(Width::Word);
    pub const UNSIGNED_INT: Basic = Basic {
        width: Width::Word,
        unsigned: true,
    };

    pub const fn signed(width: Width) -> Basic {
        Basic {
            width,
            unsigned: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Basic(Basic),
    Void,
    Pointer(Rc<Type>),
    Array {
        element: Rc<Type>,
        /// `None` when the declaration omits the length.
        length: Option<u32>,
    },
    Function(Rc<Function>),
    Label,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub return_type: Type,
    pub params: Vec<Type>,
    pub is_definition: bool,
    /// Scope holding the parameters and body, set for definitions only.
    pub scope: Option<ScopeId>,
}

/// Size and alignment of an object placed in a stack frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub size: u32,
    pub align: u32,
}

pub const POINTER_WIDTH: u32 = 4;

impl Type {
    pub const CHAR: Type = Type::Basic(Basic::CHAR);
    pub const SHORT: Type = Type::Basic(Basic::SHORT);
    pub const INT: Type = Type::Basic(Basic::INT);
    pub const UNSIGNED_INT: Type = Type::Basic(Basic::UNSIGNED_INT);

    pub fn pointer_to(pointee: Type) -> Type {
        Type::Pointer(Rc::new(pointee))
    }

    pub fn array_of(element: Type, length: Option<u32>) -> Type {
        Type::Array {
            element: Rc::new(element),
            length,
        }
    }

    pub fn function(function: Function) -> Type {
        Type::Function(Rc::new(function))
    }

    pub fn basic(&self) -> Option<Basic> {
        match self {
            Type::Basic(basic) => Some(*basic),
            _ => None,
        }
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, Type::Basic(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Basic and pointer types, the ones usable as truth values.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Basic(_) | Type::Pointer(_))
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, Type::Basic(Basic { unsigned: true, .. }))
    }

    /// Same-type relation. Only basic types are ever equal, and only when both
    /// width and signedness agree.
    pub fn is_equal(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Basic(a), Type::Basic(b)) => a == b,
            _ => false,
        }
    }

    /// The looser relation used for pointers, arrays and functions.
    pub fn is_compatible(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Basic(_), Type::Basic(_)) => self.is_equal(other),
            (Type::Void, Type::Void) => true,
            (Type::Pointer(a), Type::Pointer(b)) => {
                a.is_void() || b.is_void() || a.is_compatible(b)
            }
            (
                Type::Array {
                    element: a,
                    length: a_len,
                },
                Type::Array {
                    element: b,
                    length: b_len,
                },
            ) => match (a_len, b_len) {
                (Some(a_len), Some(b_len)) if a_len != b_len => false,
                _ => a.is_compatible(b),
            },
            (Type::Function(a), Type::Function(b)) => {
                a.params.len() == b.params.len()
                    && a.return_type.is_compatible(&b.return_type)
                    && a.params.iter().zip(&b.params).all(|(a, b)| a.is_compatible(b))
            }
            _ => false,
        }
    }

    /// Comparison used when an identifier is declared again in the same
    /// scope. Basic types match on width alone. Pointers match on kind alone
    /// and arrays on their length, without looking further inside.
    pub fn matches_redeclaration(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Basic(a), Type::Basic(b)) => a.width == b.width,
            (Type::Void, Type::Void) => true,
            (Type::Pointer(_), Type::Pointer(_)) => true,
            (Type::Array { length: a, .. }, Type::Array { length: b, .. }) => a == b,
            (Type::Function(a), Type::Function(b)) => {
                a.return_type.matches_redeclaration(&b.return_type)
                    && a.params.len() == b.params.len()
                    && a.params.iter().zip(&b.params).all(|(a, b)| a.matches_redeclaration(b))
            }
            _ => false,
        }
    }

    /// Width in bytes of a value of this type held in a register. `None` for
    /// types without a scalar value.
    pub fn value_width(&self) -> Option<u32> {
        match self {
            Type::Basic(basic) => Some(basic.width.bytes()),
            Type::Pointer(_) => Some(POINTER_WIDTH),
            Type::Void | Type::Array { .. } | Type::Function(_) | Type::Label => None,
        }
    }

    /// Frame layout of an object of this type. `None` for types that don't
    /// occupy frame storage.
    pub fn layout(&self) -> Option<Layout> {
        match self {
            Type::Basic(basic) => {
                let width = basic.width.bytes();
                Some(Layout {
                    size: width,
                    align: width,
                })
            }
            Type::Pointer(_) => Some(Layout {
                size: POINTER_WIDTH,
                align: POINTER_WIDTH,
            }),
            Type::Array { element, length } => {
                let element = element.layout()?;
                Some(Layout {
                    size: element.size * length.unwrap_or(1),
                    align: element.align,
                })
            }
            Type::Void | Type::Function(_) | Type::Label => None,
        }
    }

    /// Byte distance between consecutive elements pointed to by a pointer of
    /// this type. Arithmetic on `void*` advances one byte at a time.
    pub fn stride(&self) -> u32 {
        match self.pointee() {
            Some(pointee) => pointee.layout().map_or(1, |layout| layout.size),
            None => 1,
        }
    }
}

impl fmt::Display for Basic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unsigned {
            write!(f, "unsigned ")?;
        }
        f.write_str(match self.width {
            Width::Byte => "char",
            Width::HalfWord => "short",
            Width::Word => "int",
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(basic) => write!(f, "{basic}"),
            Type::Void => write!(f, "void"),
            Type::Pointer(pointee) => write!(f, "{pointee}*"),
            Type::Array {
                element,
                length: Some(length),
            } => write!(f, "{element}[{length}]"),
            Type::Array {
                element,
                length: None,
            } => write!(f, "{element}[]"),
            Type::Function(function) => {
                write!(f, "{}(", function.return_type)?;
                for (i, param) in function.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ")")
            }
            Type::Label => write!(f, "label"),
        }
    }
}
