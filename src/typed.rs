//! The checked program. Every expression carries its type, identifiers are
//! resolved to symbols, and implicit conversions are explicit cast nodes.

use crate::{
    ast::{BinaryOperator, IncDec, UnaryOperator},
    symbols::{ScopeId, SymbolId},
    types::Type,
    util::intern::Interned,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(Function),
    Decl(Vec<SymbolId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Interned,
    pub symbol: SymbolId,
    pub scope: ScopeId,
    pub params: Vec<SymbolId>,
    pub return_type: Type,
    pub body: Vec<Stmt>,
    pub line: u32,
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
    Decl(Vec<SymbolId>),
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
    pub ty: Type,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(i64),
    Ident(SymbolId),
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
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `lhs` is the target wrapped in whatever conversions the arithmetic
    /// needs; the stored-to location is found by peeling them off.
    CompoundAssign {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        operation_ty: Type,
    },
    Ternary {
        condition: Box<Expr>,
        then_arm: Box<Expr>,
        else_arm: Box<Expr>,
    },
    Cast {
        expr: Box<Expr>,
        implicit: bool,
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
        callee: SymbolId,
        name: Interned,
        args: Vec<Expr>,
    },
    Comma(Vec<Expr>),
}

impl Expr {
    /// Whether lowering this node yields the address of its value rather than
    /// the value itself.
    pub fn yields_address(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Ident(_)
                | ExprKind::Unary {
                    op: UnaryOperator::Deref,
                    ..
                }
        )
    }

    /// An l-value that can be stored to: an object of scalar type.
    pub fn is_modifiable_lvalue(&self) -> bool {
        self.yields_address() && self.ty.is_scalar()
    }

    /// The literal `0`, possibly behind implicit conversions.
    pub fn is_null_constant(&self) -> bool {
        matches!(self.strip_implicit_casts().kind, ExprKind::Number(0))
    }

    pub fn strip_implicit_casts(&self) -> &Expr {
        let mut current = self;
        while let ExprKind::Cast {
            expr,
            implicit: true,
        } = &current.kind
        {
            current = expr;
        }
        current
    }

    /// Walks down through conversion wrappers to the expression that denotes
    /// the stored-to object.
    pub fn root_lvalue(&self) -> &Expr {
        let mut current = self;
        loop {
            match &current.kind {
                ExprKind::Cast { expr, .. } => current = expr,
                ExprKind::Comma(exprs) => match exprs.last() {
                    Some(last) => current = last,
                    None => return current,
                },
                _ => return current,
            }
        }
    }
}
