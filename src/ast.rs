// translation-unit ::= (function-definition | declaration)+
// function-definition ::= specifier declarator compound
// declaration ::= specifier declarator (',' declarator)* ';'
// specifier ::= ['unsigned' | 'signed'] ('char' | 'short' | 'int' | 'long' | 'void')
// declarator ::= ID
//              | '*' declarator
//              | declarator '[' [constant-expr] ']'
//              | declarator '(' [param (',' param)*] ')'
// stmt ::= expr ';' | compound | declaration
//        | if '(' expr ')' stmt [else stmt]
//        | while '(' expr ')' stmt
//        | do stmt while '(' expr ')' ';'
//        | for '(' [expr] ';' [expr] ';' [expr] ')' stmt
//        | goto ID ';' | continue ';' | break ';' | return [expr] ';'
//        | ID ':' stmt | ';'
// expr ::= number | ID | string
//        | unary-op expr | expr binary-op expr | expr assign-op expr
//        | expr '?' expr ':' expr
//        | '(' type-name ')' expr
//        | expr '++' | expr '--' | '++' expr | '--' expr
//        | ID '(' [expr (',' expr)*] ')'
//        | expr (',' expr)+
//
// `a[i]` reaches this tree as `*(a + i)`.

use crate::util::intern::Interned;

pub mod build;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationUnit {
    pub items: Vec<ExternalDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDecl {
    Function(FunctionDef),
    Decl(Decl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub specifier: TypeSpecifier,
    /// Must contain a function declarator applied directly to the name.
    pub declarator: Declarator,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub specifier: TypeSpecifier,
    pub declarators: Vec<Declarator>,
    pub line: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeSpecifier {
    pub base: BaseType,
    pub unsigned: bool,
}

impl TypeSpecifier {
    pub const VOID: TypeSpecifier = TypeSpecifier::signed(BaseType::Void);
    pub const CHAR: TypeSpecifier = TypeSpecifier::signed(BaseType::Char);
    pub const SHORT: TypeSpecifier = TypeSpecifier::signed(BaseType::Short);
    pub const INT: TypeSpecifier = TypeSpecifier::signed(BaseType::Int);
    pub const LONG: TypeSpecifier = TypeSpecifier::signed(BaseType::Long);
    pub const UNSIGNED_CHAR: TypeSpecifier = TypeSpecifier::unsigned(BaseType::Char);
    pub const UNSIGNED_SHORT: TypeSpecifier = TypeSpecifier::unsigned(BaseType::Short);
    pub const UNSIGNED_INT: TypeSpecifier = TypeSpecifier::unsigned(BaseType::Int);

    pub const fn signed(base: BaseType) -> TypeSpecifier {
        TypeSpecifier {
            base,
            unsigned: false,
        }
    }

    pub const fn unsigned(base: BaseType) -> TypeSpecifier {
        TypeSpecifier {
            base,
            unsigned: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BaseType {
    Char,
    Short,
    Int,
    Long,
    Void,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declarator {
    Ident(Interned),
    /// No name, as in type names and unnamed parameters.
    Abstract,
    Pointer(Box<Declarator>),
    Array(Box<Declarator>, Option<Box<Expr>>),
    Function(Box<Declarator>, Vec<ParamDecl>),
}

impl Declarator {
    pub fn name(&self) -> Option<Interned> {
        match self {
            Declarator::Ident(name) => Some(*name),
            Declarator::Abstract => None,
            Declarator::Pointer(inner)
            | Declarator::Array(inner, _)
            | Declarator::Function(inner, _) => inner.name(),
        }
    }

    /// Parameters of the function declarator applied directly to the name, if
    /// any. These are the ones a definition binds.
    pub fn own_params(&self) -> Option<&[ParamDecl]> {
        match self {
            Declarator::Function(inner, params) if matches!(**inner, Declarator::Ident(_)) => {
                Some(params)
            }
            Declarator::Ident(_) | Declarator::Abstract => None,
            Declarator::Pointer(inner)
            | Declarator::Array(inner, _)
            | Declarator::Function(inner, _) => inner.own_params(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub specifier: TypeSpecifier,
    pub declarator: Declarator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    pub specifier: TypeSpecifier,
    pub declarator: Declarator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Compound(Vec<Stmt>),
    Decl(Decl),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },
    For {
        init: Option<Expr>,
        condition: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Goto(Interned),
    Continue,
    Break,
    Return(Option<Expr>),
    Labeled {
        label: Interned,
        stmt: Box<Stmt>,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(i64),
    Ident(Interned),
    String(Box<str>),
    Unary {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `op` is `None` for plain `=`, and the arithmetic operator of compound
    /// forms such as `+=`.
    Assign {
        op: Option<BinaryOperator>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then_arm: Box<Expr>,
        else_arm: Box<Expr>,
    },
    Cast {
        ty: TypeName,
        expr: Box<Expr>,
    },
    Postfix {
        op: IncDec,
        expr: Box<Expr>,
    },
    Prefix {
        op: IncDec,
        expr: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Comma(Vec<Expr>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Deref,
    Not,
    Plus,
    Minus,
    BitNot,
    AddressOf,
}

impl UnaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Deref => "*",
            UnaryOperator::Not => "!",
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::BitNot => "~",
            UnaryOperator::AddressOf => "&",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LogAnd,
    LogOr,
}

impl BinaryOperator {
    pub const fn symbol(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Mul => "*",
            Div => "/",
            Mod => "%",
            Add => "+",
            Sub => "-",
            Shl => "<<",
            Shr => ">>",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Eq => "==",
            Ne => "!=",
            BitAnd => "&",
            BitXor => "^",
            BitOr => "|",
            LogAnd => "&&",
            LogOr => "||",
        }
    }

    pub const fn is_relational(self) -> bool {
        use BinaryOperator::*;
        matches!(self, Lt | Le | Gt | Ge | Eq | Ne)
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::LogAnd | BinaryOperator::LogOr)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IncDec {
    Increment,
    Decrement,
}

impl IncDec {
    pub const fn symbol(self) -> &'static str {
        match self {
            IncDec::Increment => "++",
            IncDec::Decrement => "--",
        }
    }
}
