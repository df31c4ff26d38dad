//! Terse construction of input trees, for drivers without a front end, tests
//! and benchmarks.
//!
//! Every node takes the builder's current line, set with [`Builder::at`].

use std::cell::{Cell, RefCell};

use super::*;
use crate::util::intern::Interner;

pub struct Builder<'i> {
    interner: RefCell<&'i mut Interner>,
    line: Cell<u32>,
}

impl<'i> Builder<'i> {
    pub fn new(interner: &'i mut Interner) -> Builder<'i> {
        Builder {
            interner: RefCell::new(interner),
            line: Cell::new(1),
        }
    }

    /// Sets the line of the nodes built from now on.
    pub fn at(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    pub fn name(&self, name: &str) -> Interned {
        self.interner.borrow_mut().intern(name)
    }

    fn expr(&self, kind: ExprKind) -> Expr {
        Expr {
            kind,
            line: self.line.get(),
        }
    }

    fn stmt(&self, kind: StmtKind) -> Stmt {
        Stmt {
            kind,
            line: self.line.get(),
        }
    }

    // Expressions.

    pub fn num(&self, value: i64) -> Expr {
        self.expr(ExprKind::Number(value))
    }

    pub fn id(&self, name: &str) -> Expr {
        let name = self.name(name);
        self.expr(ExprKind::Ident(name))
    }

    pub fn string(&self, value: &str) -> Expr {
        self.expr(ExprKind::String(value.into()))
    }

    pub fn unary(&self, op: UnaryOperator, expr: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op,
            expr: Box::new(expr),
        })
    }

    pub fn deref(&self, expr: Expr) -> Expr {
        self.unary(UnaryOperator::Deref, expr)
    }

    pub fn addr(&self, expr: Expr) -> Expr {
        self.unary(UnaryOperator::AddressOf, expr)
    }

    pub fn bin(&self, op: BinaryOperator, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// `array[index]`, spelled the way a front end hands it over.
    pub fn index(&self, array: Expr, index: Expr) -> Expr {
        let sum = self.bin(BinaryOperator::Add, array, index);
        self.deref(sum)
    }

    pub fn assign(&self, target: Expr, value: Expr) -> Expr {
        self.expr(ExprKind::Assign {
            op: None,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn compound(&self, op: BinaryOperator, target: Expr, value: Expr) -> Expr {
        self.expr(ExprKind::Assign {
            op: Some(op),
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn ternary(&self, condition: Expr, then_arm: Expr, else_arm: Expr) -> Expr {
        self.expr(ExprKind::Ternary {
            condition: Box::new(condition),
            then_arm: Box::new(then_arm),
            else_arm: Box::new(else_arm),
        })
    }

    pub fn cast(&self, ty: TypeName, expr: Expr) -> Expr {
        self.expr(ExprKind::Cast {
            ty,
            expr: Box::new(expr),
        })
    }

    pub fn post(&self, op: IncDec, expr: Expr) -> Expr {
        self.expr(ExprKind::Postfix {
            op,
            expr: Box::new(expr),
        })
    }

    pub fn pre(&self, op: IncDec, expr: Expr) -> Expr {
        self.expr(ExprKind::Prefix {
            op,
            expr: Box::new(expr),
        })
    }

    pub fn call(&self, callee: &str, args: Vec<Expr>) -> Expr {
        let callee = self.id(callee);
        self.expr(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    pub fn comma(&self, exprs: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Comma(exprs))
    }

    // Declarators and types.

    pub fn var(&self, name: &str) -> Declarator {
        Declarator::Ident(self.name(name))
    }

    pub fn ptr(&self, inner: Declarator) -> Declarator {
        Declarator::Pointer(Box::new(inner))
    }

    pub fn array(&self, inner: Declarator, length: Option<Expr>) -> Declarator {
        Declarator::Array(Box::new(inner), length.map(Box::new))
    }

    pub fn func(&self, inner: Declarator, params: Vec<ParamDecl>) -> Declarator {
        Declarator::Function(Box::new(inner), params)
    }

    pub fn param(&self, specifier: TypeSpecifier, declarator: Declarator) -> ParamDecl {
        ParamDecl {
            specifier,
            declarator,
        }
    }

    pub fn type_name(&self, specifier: TypeSpecifier, declarator: Declarator) -> TypeName {
        TypeName {
            specifier,
            declarator,
        }
    }

    // Statements.

    pub fn expr_stmt(&self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn block(&self, stmts: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::Compound(stmts))
    }

    pub fn decl(&self, specifier: TypeSpecifier, declarators: Vec<Declarator>) -> Stmt {
        let decl = self.declaration(specifier, declarators);
        self.stmt(StmtKind::Decl(decl))
    }

    fn declaration(&self, specifier: TypeSpecifier, declarators: Vec<Declarator>) -> Decl {
        Decl {
            specifier,
            declarators,
            line: self.line.get(),
        }
    }

    pub fn if_(&self, condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_(&self, condition: Expr, body: Stmt) -> Stmt {
        self.stmt(StmtKind::While {
            condition,
            body: Box::new(body),
        })
    }

    pub fn do_while(&self, body: Stmt, condition: Expr) -> Stmt {
        self.stmt(StmtKind::DoWhile {
            body: Box::new(body),
            condition,
        })
    }

    pub fn for_(
        &self,
        init: Option<Expr>,
        condition: Option<Expr>,
        step: Option<Expr>,
        body: Stmt,
    ) -> Stmt {
        self.stmt(StmtKind::For {
            init,
            condition,
            step,
            body: Box::new(body),
        })
    }

    pub fn goto(&self, label: &str) -> Stmt {
        let label = self.name(label);
        self.stmt(StmtKind::Goto(label))
    }

    pub fn labeled(&self, label: &str, stmt: Stmt) -> Stmt {
        let label = self.name(label);
        self.stmt(StmtKind::Labeled {
            label,
            stmt: Box::new(stmt),
        })
    }

    pub fn continue_(&self) -> Stmt {
        self.stmt(StmtKind::Continue)
    }

    pub fn break_(&self) -> Stmt {
        self.stmt(StmtKind::Break)
    }

    pub fn ret(&self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn empty(&self) -> Stmt {
        self.stmt(StmtKind::Empty)
    }

    // Top level.

    pub fn function(
        &self,
        specifier: TypeSpecifier,
        declarator: Declarator,
        body: Vec<Stmt>,
    ) -> ExternalDecl {
        ExternalDecl::Function(FunctionDef {
            specifier,
            declarator,
            body,
            line: self.line.get(),
        })
    }

    pub fn global(&self, specifier: TypeSpecifier, declarators: Vec<Declarator>) -> ExternalDecl {
        ExternalDecl::Decl(self.declaration(specifier, declarators))
    }

    pub fn unit(&self, items: Vec<ExternalDecl>) -> TranslationUnit {
        TranslationUnit { items }
    }
}
