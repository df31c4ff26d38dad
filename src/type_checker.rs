use std::rc::Rc;

use crate::{
    ast::{self, BaseType, BinaryOperator, UnaryOperator},
    context::CompilationContext,
    error::{Error, Pass, Span},
    ir_gen::MAX_CALL_ARGUMENTS,
    symbols::{parameter_offset, ScopeId, Storage, SymbolId, SymbolTable},
    typed::{self, Expr, ExprKind},
    types::{Basic, Function, Type, Width},
    util::intern::Interned,
};

type Result<T, E = ()> = std::result::Result<T, E>;

/// Resolves names, assigns a type to every expression and makes implicit
/// conversions explicit, producing the tree the IR generator reads.
///
/// Errors are reported to `ctx` and recovered from, so the returned program
/// is always complete.
pub fn check(ctx: &mut CompilationContext, unit: &ast::TranslationUnit) -> typed::Program {
    let mut checker = Checker {
        ctx: &mut *ctx,
        scope: SymbolTable::GLOBAL,
        function: None,
    };
    let items = unit
        .items
        .iter()
        .map(|item| checker.check_external(item))
        .collect();

    tracing::debug!(
        symbol_errors = ctx.error_count(Pass::Symbol),
        type_errors = ctx.error_count(Pass::Type),
        "checked translation unit"
    );
    typed::Program { items }
}

struct Checker<'c> {
    ctx: &'c mut CompilationContext,
    scope: ScopeId,
    function: Option<FunctionState>,
}

/// What the checker tracks about the function being checked.
struct FunctionState {
    name: Interned,
    return_type: Type,
    scope: ScopeId,
    has_return: bool,
    gotos: Vec<(Interned, u32)>,
}

/// Coarse classification of operand types.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Kind {
    Basic,
    Pointer,
    Void,
    Other,
}

fn kind(ty: &Type) -> Kind {
    match ty {
        Type::Basic(_) => Kind::Basic,
        Type::Pointer(_) => Kind::Pointer,
        Type::Void => Kind::Void,
        Type::Array { .. } | Type::Function(_) | Type::Label => Kind::Other,
    }
}

// Declarations.
impl Checker<'_> {
    fn error(&mut self, line: u32, error: Error) {
        self.ctx.report(Span::new(line), error);
    }

    fn check_external(&mut self, item: &ast::ExternalDecl) -> typed::Item {
        match item {
            ast::ExternalDecl::Function(def) => typed::Item::Function(self.check_function(def)),
            ast::ExternalDecl::Decl(decl) => typed::Item::Decl(self.check_decl(decl)),
        }
    }

    fn check_decl(&mut self, decl: &ast::Decl) -> Vec<SymbolId> {
        let base = base_type(decl.specifier);
        let mut symbols = Vec::with_capacity(decl.declarators.len());
        for declarator in &decl.declarators {
            let Some(name) = declarator.name() else {
                continue;
            };
            let ty = self.derive_type(base.clone(), declarator, decl.line);
            let id = if ty.as_function().is_some() {
                self.declare_function(name, ty, decl.line)
            } else {
                self.declare_object(name, ty, decl.line)
            };
            symbols.push(id);
        }
        symbols
    }

    fn declare_object(&mut self, name: Interned, mut ty: Type, line: u32) -> SymbolId {
        if ty.is_void() {
            self.error(line, Error::VoidObject(name));
            ty = Type::INT;
        }
        if let Some(existing) = self.ctx.symbols.lookup(self.scope, name, true) {
            if !self.ctx.symbols.symbol(existing).ty.matches_redeclaration(&ty) {
                self.error(line, Error::Redeclared(name));
            }
            return existing;
        }
        self.declare_in(self.scope, name, ty)
    }

    fn declare_in(&mut self, scope: ScopeId, name: Interned, ty: Type) -> SymbolId {
        let id = self.ctx.symbols.declare(scope, name, ty);
        if scope == SymbolTable::GLOBAL {
            self.ctx.symbols.symbol_mut(id).storage = Some(Storage::Global);
        }
        id
    }

    /// Declares a prototype or a definition, reconciling it with an earlier
    /// declaration of the same name.
    fn declare_function(&mut self, name: Interned, ty: Type, line: u32) -> SymbolId {
        let Some(new) = ty.as_function() else {
            unreachable!("declaring a non-function type as a function");
        };
        let Some(existing) = self.ctx.symbols.lookup(self.scope, name, true) else {
            return self.ctx.symbols.declare(self.scope, name, ty);
        };
        let existing_ty = self.ctx.symbols.symbol(existing).ty.clone();
        let Some(old) = existing_ty.as_function() else {
            self.error(line, Error::Redeclared(name));
            if new.is_definition {
                return self.ctx.symbols.declare(self.scope, name, ty);
            }
            return existing;
        };

        let error = if old.is_definition && new.is_definition {
            Some(Error::FunctionRedefined(name))
        } else if !old.return_type.matches_redeclaration(&new.return_type) {
            Some(Error::FunctionReturnMismatch(name))
        } else if old.params.len() != new.params.len() {
            Some(Error::FunctionArityMismatch {
                name,
                expected: old.params.len(),
                actual: new.params.len(),
            })
        } else {
            old.params
                .iter()
                .zip(&new.params)
                .position(|(old, new)| !old.matches_redeclaration(new))
                .map(|index| Error::FunctionParameterMismatch {
                    name,
                    index: index + 1,
                })
        };
        if let Some(error) = error {
            self.error(line, error);
        }

        if new.is_definition {
            self.ctx.symbols.symbol_mut(existing).ty = ty;
        }
        existing
    }

    fn check_function(&mut self, def: &ast::FunctionDef) -> typed::Function {
        let Some(name) = def.declarator.name() else {
            unreachable!("function definition without a name");
        };
        let ty = self.derive_type(base_type(def.specifier), &def.declarator, def.line);
        let Type::Function(signature) = ty else {
            unreachable!("function definition without a function declarator");
        };

        let scope = self.ctx.symbols.new_child_scope(SymbolTable::GLOBAL);
        let mut signature = Rc::unwrap_or_clone(signature);
        signature.is_definition = true;
        signature.scope = Some(scope);
        let return_type = signature.return_type.clone();
        let param_types = signature.params.clone();
        let symbol = self.declare_function(name, Type::function(signature), def.line);

        let outer = std::mem::replace(&mut self.scope, scope);
        let mut params = Vec::with_capacity(param_types.len());
        let decls = def.declarator.own_params().unwrap_or_default();
        if !is_void_list(decls) {
            for (index, (param, mut ty)) in decls.iter().zip(param_types).enumerate() {
                let Some(param_name) = param.declarator.name() else {
                    continue;
                };
                if ty.is_void() {
                    self.error(def.line, Error::VoidObject(param_name));
                    ty = Type::INT;
                }
                if self.ctx.symbols.lookup(scope, param_name, true).is_some() {
                    self.error(def.line, Error::Redeclared(param_name));
                    continue;
                }
                let id = self.ctx.symbols.declare(scope, param_name, ty);
                if index < MAX_CALL_ARGUMENTS {
                    self.ctx.symbols.symbol_mut(id).storage =
                        Some(Storage::Frame(parameter_offset(index)));
                }
                params.push(id);
            }
        }

        self.function = Some(FunctionState {
            name,
            return_type: return_type.clone(),
            scope,
            has_return: false,
            gotos: Vec::new(),
        });
        let body = def.body.iter().map(|stmt| self.check_stmt(stmt)).collect();
        let Some(state) = self.function.take() else {
            unreachable!("function state lost while checking a body");
        };

        for (label, line) in state.gotos {
            if self.ctx.symbols.lookup_label(scope, label).is_none() {
                self.error(line, Error::UndeclaredLabel(label));
            }
        }
        if !return_type.is_void() && !state.has_return {
            self.error(def.line, Error::MissingReturn(name));
        }
        self.scope = outer;

        tracing::trace!(name = self.ctx.interner.get(name), "checked function");
        typed::Function {
            name,
            symbol,
            scope,
            params,
            return_type,
            body,
            line: def.line,
        }
    }

    /// Applies `declarator` to `ty`, outermost constructor first, so
    /// `int *a[4]` is an array of four `int*`.
    fn derive_type(&mut self, ty: Type, declarator: &ast::Declarator, line: u32) -> Type {
        match declarator {
            ast::Declarator::Ident(_) | ast::Declarator::Abstract => ty,
            ast::Declarator::Pointer(inner) => self.derive_type(Type::pointer_to(ty), inner, line),
            ast::Declarator::Array(inner, length) => {
                if ty.as_function().is_some() {
                    let name = self.declarator_name(declarator);
                    self.error(line, Error::IllegalArrayElement(name));
                }
                let length = match length {
                    None => None,
                    Some(expr) => {
                        let folded = fold_constant(expr)
                            .ok()
                            .and_then(|n| u32::try_from(n).ok());
                        if folded.is_none() {
                            let name = self.declarator_name(declarator);
                            self.error(line, Error::NonConstantArrayLength(name));
                        }
                        folded
                    }
                };
                self.derive_type(Type::array_of(ty, length), inner, line)
            }
            ast::Declarator::Function(inner, params) => {
                let mut return_type = ty;
                if matches!(return_type, Type::Array { .. } | Type::Function(_)) {
                    let name = self.declarator_name(declarator);
                    self.error(line, Error::IllegalReturnType(name));
                    return_type = Type::INT;
                }
                let params = self.parameter_types(params, line);
                let function = Type::function(Function {
                    return_type,
                    params,
                    is_definition: false,
                    scope: None,
                });
                self.derive_type(function, inner, line)
            }
        }
    }

    fn parameter_types(&mut self, params: &[ast::ParamDecl], line: u32) -> Vec<Type> {
        if is_void_list(params) {
            return Vec::new();
        }
        params
            .iter()
            .map(|param| {
                let ty = self.derive_type(base_type(param.specifier), &param.declarator, line);
                match ty {
                    Type::Array { element, .. } => Type::Pointer(element),
                    Type::Function(_) => Type::pointer_to(ty),
                    ty => ty,
                }
            })
            .collect()
    }

    fn declarator_name(&mut self, declarator: &ast::Declarator) -> Interned {
        match declarator.name() {
            Some(name) => name,
            None => self.ctx.interner.intern("<unnamed>"),
        }
    }

    fn type_name(&mut self, ty: &ast::TypeName, line: u32) -> Type {
        self.derive_type(base_type(ty.specifier), &ty.declarator, line)
    }
}

fn base_type(specifier: ast::TypeSpecifier) -> Type {
    let width = match specifier.base {
        BaseType::Void => return Type::Void,
        BaseType::Char => Width::Byte,
        BaseType::Short => Width::HalfWord,
        BaseType::Int | BaseType::Long => Width::Word,
    };
    Type::Basic(Basic {
        width,
        unsigned: specifier.unsigned,
    })
}

/// Whether a parameter list is the `(void)` spelling of "no parameters".
fn is_void_list(params: &[ast::ParamDecl]) -> bool {
    matches!(
        params,
        [ast::ParamDecl {
            specifier: ast::TypeSpecifier {
                base: BaseType::Void,
                ..
            },
            declarator: ast::Declarator::Abstract,
        }]
    )
}

/// Evaluates an array length at compile time.
fn fold_constant(expr: &ast::Expr) -> Result<i64> {
    use BinaryOperator::*;
    match &expr.kind {
        ast::ExprKind::Number(n) => Ok(*n),
        ast::ExprKind::Unary { op, expr } => {
            let value = fold_constant(expr)?;
            match op {
                UnaryOperator::Plus => Ok(value),
                UnaryOperator::Minus => value.checked_neg().ok_or(()),
                UnaryOperator::BitNot => Ok(!value),
                UnaryOperator::Not => Ok(i64::from(value == 0)),
                UnaryOperator::Deref | UnaryOperator::AddressOf => Err(()),
            }
        }
        ast::ExprKind::Binary { op, lhs, rhs } => {
            let lhs = fold_constant(lhs)?;
            let rhs = fold_constant(rhs)?;
            let value = match op {
                Mul => lhs.checked_mul(rhs),
                Div => lhs.checked_div(rhs),
                Mod => lhs.checked_rem(rhs),
                Add => lhs.checked_add(rhs),
                Sub => lhs.checked_sub(rhs),
                Shl => u32::try_from(rhs).ok().and_then(|rhs| lhs.checked_shl(rhs)),
                Shr => u32::try_from(rhs).ok().and_then(|rhs| lhs.checked_shr(rhs)),
                Lt => Some(i64::from(lhs < rhs)),
                Le => Some(i64::from(lhs <= rhs)),
                Gt => Some(i64::from(lhs > rhs)),
                Ge => Some(i64::from(lhs >= rhs)),
                Eq => Some(i64::from(lhs == rhs)),
                Ne => Some(i64::from(lhs != rhs)),
                BitAnd => Some(lhs & rhs),
                BitXor => Some(lhs ^ rhs),
                BitOr => Some(lhs | rhs),
                LogAnd => Some(i64::from(lhs != 0 && rhs != 0)),
                LogOr => Some(i64::from(lhs != 0 || rhs != 0)),
            };
            value.ok_or(())
        }
        ast::ExprKind::Cast { expr, .. } => fold_constant(expr),
        _ => Err(()),
    }
}

// Statements.
impl Checker<'_> {
    fn check_stmt(&mut self, stmt: &ast::Stmt) -> typed::Stmt {
        let line = stmt.line;
        let kind = match &stmt.kind {
            ast::StmtKind::Expr(expr) => typed::StmtKind::Expr(self.check_expr(expr)),
            ast::StmtKind::Compound(stmts) => {
                let scope = self.ctx.symbols.new_child_scope(self.scope);
                let outer = std::mem::replace(&mut self.scope, scope);
                let stmts = stmts.iter().map(|stmt| self.check_stmt(stmt)).collect();
                self.scope = outer;
                typed::StmtKind::Compound(stmts)
            }
            ast::StmtKind::Decl(decl) => typed::StmtKind::Decl(self.check_decl(decl)),
            ast::StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => typed::StmtKind::If {
                condition: self.check_condition(condition, "condition"),
                then_branch: Box::new(self.check_stmt(then_branch)),
                else_branch: else_branch
                    .as_ref()
                    .map(|stmt| Box::new(self.check_stmt(stmt))),
            },
            ast::StmtKind::While { condition, body } => typed::StmtKind::While {
                condition: self.check_condition(condition, "condition"),
                body: Box::new(self.check_stmt(body)),
            },
            ast::StmtKind::DoWhile { body, condition } => typed::StmtKind::DoWhile {
                body: Box::new(self.check_stmt(body)),
                condition: self.check_condition(condition, "condition"),
            },
            ast::StmtKind::For {
                init,
                condition,
                step,
                body,
            } => typed::StmtKind::For {
                init: init.as_ref().map(|expr| self.check_expr(expr)),
                condition: condition
                    .as_ref()
                    .map(|expr| self.check_condition(expr, "condition")),
                step: step.as_ref().map(|expr| self.check_expr(expr)),
                body: Box::new(self.check_stmt(body)),
            },
            ast::StmtKind::Goto(label) => {
                if let Some(function) = &mut self.function {
                    function.gotos.push((*label, line));
                }
                typed::StmtKind::Goto(*label)
            }
            ast::StmtKind::Continue => typed::StmtKind::Continue,
            ast::StmtKind::Break => typed::StmtKind::Break,
            ast::StmtKind::Return(value) => self.check_return(value.as_ref(), line),
            ast::StmtKind::Labeled { label, stmt } => {
                self.declare_label(*label, line);
                typed::StmtKind::Labeled {
                    label: *label,
                    stmt: Box::new(self.check_stmt(stmt)),
                }
            }
            ast::StmtKind::Empty => typed::StmtKind::Empty,
        };
        typed::Stmt { kind, line }
    }

    /// Labels belong to the function's outermost scope wherever they appear.
    fn declare_label(&mut self, label: Interned, line: u32) {
        let Some(scope) = self.function.as_ref().map(|function| function.scope) else {
            return;
        };
        if self.ctx.symbols.lookup_label(scope, label).is_some() {
            self.error(line, Error::DuplicateLabel(label));
        } else {
            self.ctx.symbols.declare(scope, label, Type::Label);
        }
    }

    fn check_return(&mut self, value: Option<&ast::Expr>, line: u32) -> typed::StmtKind {
        let Some(function) = &mut self.function else {
            unreachable!("return statement outside of a function");
        };
        function.has_return = true;
        let name = function.name;
        let expected = function.return_type.clone();

        let Some(value) = value else {
            if !expected.is_void() {
                self.error(line, Error::ReturnWithoutValue(name));
            }
            return typed::StmtKind::Return(None);
        };
        let value = self.check_value(value);
        if expected.is_void() {
            self.error(line, Error::ReturnValueInVoid(name));
            return typed::StmtKind::Return(None);
        }
        let value = match convert(value, &expected) {
            Ok(value) => value,
            Err(value) => {
                let actual = value.ty.clone();
                self.error(line, Error::ReturnType { expected, actual });
                value
            }
        };
        typed::StmtKind::Return(Some(value))
    }

    fn check_condition(&mut self, expr: &ast::Expr, what: &'static str) -> Expr {
        let expr = self.check_value(expr);
        if !expr.ty.is_scalar() {
            let ty = expr.ty.clone();
            self.error(expr.line, Error::NotScalar { what, ty });
        }
        expr
    }
}

// Expressions.
impl Checker<'_> {
    /// Checks an expression whose value is used, applying the usual unary
    /// conversion.
    fn check_value(&mut self, expr: &ast::Expr) -> Expr {
        let expr = self.check_expr(expr);
        self.convert_unary(expr)
    }

    /// Promotes narrow basic types to `int` and decays arrays to pointers.
    fn convert_unary(&mut self, expr: Expr) -> Expr {
        let target = match &expr.ty {
            Type::Basic(basic) if basic.width < Width::Word => Type::INT,
            Type::Array { element, .. } => Type::Pointer(Rc::clone(element)),
            Type::Function(_) => {
                self.error(expr.line, Error::FunctionAsValue);
                Type::INT
            }
            _ => return expr,
        };
        cast_to(expr, &target)
    }

    fn check_expr(&mut self, expr: &ast::Expr) -> Expr {
        let line = expr.line;
        let (kind, ty) = match &expr.kind {
            ast::ExprKind::Number(n) => (ExprKind::Number(*n), Type::INT),
            ast::ExprKind::Ident(name) => {
                let id = self.resolve(*name, line);
                let ty = self.ctx.symbols.symbol(id).ty.clone();
                (ExprKind::Ident(id), ty)
            }
            ast::ExprKind::String(value) => (
                ExprKind::String(value.clone()),
                Type::pointer_to(Type::CHAR),
            ),
            ast::ExprKind::Unary { op, expr } => return self.check_unary(*op, expr, line),
            ast::ExprKind::Binary { op, lhs, rhs } => {
                return self.check_binary(*op, lhs, rhs, line);
            }
            ast::ExprKind::Assign { op, target, value } => {
                return self.check_assign(*op, target, value, line);
            }
            ast::ExprKind::Ternary {
                condition,
                then_arm,
                else_arm,
            } => return self.check_ternary(condition, then_arm, else_arm, line),
            ast::ExprKind::Cast { ty, expr } => {
                let target = self.type_name(ty, line);
                let operand = self.check_value(expr);
                let legal = target.is_void() || (target.is_scalar() && operand.ty.is_scalar());
                if !legal {
                    let from = operand.ty.clone();
                    let to = target.clone();
                    self.error(line, Error::InvalidCast { from, to });
                }
                let kind = ExprKind::Cast {
                    expr: Box::new(operand),
                    implicit: false,
                };
                (kind, target)
            }
            ast::ExprKind::Postfix { op, expr } => {
                let operand = self.check_increment_operand(expr);
                let ty = operand.ty.clone();
                let kind = ExprKind::Postfix {
                    op: *op,
                    expr: Box::new(operand),
                };
                (kind, ty)
            }
            ast::ExprKind::Prefix { op, expr } => {
                let operand = self.check_increment_operand(expr);
                let ty = operand.ty.clone();
                let kind = ExprKind::Prefix {
                    op: *op,
                    expr: Box::new(operand),
                };
                (kind, ty)
            }
            ast::ExprKind::Call { callee, args } => return self.check_call(callee, args, line),
            ast::ExprKind::Comma(exprs) => {
                let mut checked = Vec::with_capacity(exprs.len());
                for (i, expr) in exprs.iter().enumerate() {
                    let expr = if i + 1 == exprs.len() {
                        self.check_value(expr)
                    } else {
                        self.check_expr(expr)
                    };
                    checked.push(expr);
                }
                let ty = checked.last().map_or(Type::INT, |last| last.ty.clone());
                (ExprKind::Comma(checked), ty)
            }
        };
        Expr { kind, ty, line }
    }

    /// Resolves an identifier use. Undeclared names are reported and declared
    /// as `int` so later uses resolve quietly.
    fn resolve(&mut self, name: Interned, line: u32) -> SymbolId {
        if let Some(id) = self.ctx.symbols.lookup(self.scope, name, false) {
            return id;
        }
        self.error(line, Error::UndeclaredIdentifier(name));
        self.declare_in(self.scope, name, Type::INT)
    }

    fn check_unary(&mut self, op: UnaryOperator, operand: &ast::Expr, line: u32) -> Expr {
        let symbol = op.symbol();
        let (operand, ty) = match op {
            UnaryOperator::AddressOf => {
                let operand = self.check_expr(operand);
                if !operand.yields_address() {
                    self.error(line, Error::AddressOfNonObject);
                }
                let ty = Type::pointer_to(operand.ty.clone());
                (operand, ty)
            }
            UnaryOperator::Deref => {
                let operand = self.check_value(operand);
                let ty = match operand.ty.pointee() {
                    Some(Type::Void) => {
                        self.error(line, Error::DerefVoidPointer);
                        Type::INT
                    }
                    Some(pointee) => pointee.clone(),
                    None => {
                        self.error(line, Error::DerefNonPointer(operand.ty.clone()));
                        Type::INT
                    }
                };
                (operand, ty)
            }
            UnaryOperator::Not => {
                let operand = self.check_value(operand);
                if !operand.ty.is_scalar() {
                    let ty = operand.ty.clone();
                    self.error(line, Error::InvalidOperand { op: symbol, ty });
                }
                (operand, Type::INT)
            }
            UnaryOperator::Plus | UnaryOperator::Minus | UnaryOperator::BitNot => {
                let operand = self.check_value(operand);
                let ty = if operand.ty.is_basic() {
                    operand.ty.clone()
                } else {
                    let ty = operand.ty.clone();
                    self.error(line, Error::InvalidOperand { op: symbol, ty });
                    Type::INT
                };
                (operand, ty)
            }
        };
        Expr {
            kind: ExprKind::Unary {
                op,
                expr: Box::new(operand),
            },
            ty,
            line,
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOperator,
        lhs: &ast::Expr,
        rhs: &ast::Expr,
        line: u32,
    ) -> Expr {
        let lhs = self.check_value(lhs);
        let rhs = self.check_value(rhs);
        let (lhs, rhs, ty) = if op.is_logical() {
            if !lhs.ty.is_scalar() || !rhs.ty.is_scalar() {
                self.invalid_operands(op, &lhs, &rhs, line);
            }
            (lhs, rhs, Type::INT)
        } else if op.is_relational() {
            self.relational_operands(lhs, rhs, line)
        } else {
            self.arithmetic_operands(op, lhs, rhs, line)
        };
        Expr {
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
            line,
        }
    }

    fn invalid_operands(&mut self, op: BinaryOperator, lhs: &Expr, rhs: &Expr, line: u32) {
        let error = Error::InvalidOperands {
            op: op.symbol(),
            lhs: lhs.ty.clone(),
            rhs: rhs.ty.clone(),
        };
        self.error(line, error);
    }

    fn relational_operands(&mut self, lhs: Expr, rhs: Expr, line: u32) -> (Expr, Expr, Type) {
        match (kind(&lhs.ty), kind(&rhs.ty)) {
            (Kind::Basic, Kind::Basic) => {
                let (lhs, rhs, _) = usual_arithmetic(lhs, rhs);
                (lhs, rhs, Type::INT)
            }
            (Kind::Pointer, Kind::Pointer) if lhs.ty.is_compatible(&rhs.ty) => {
                (lhs, rhs, Type::INT)
            }
            (Kind::Pointer, Kind::Basic) if rhs.is_null_constant() => {
                let rhs = cast_to(rhs, &lhs.ty);
                (lhs, rhs, Type::INT)
            }
            (Kind::Basic, Kind::Pointer) if lhs.is_null_constant() => {
                let lhs = cast_to(lhs, &rhs.ty);
                (lhs, rhs, Type::INT)
            }
            _ => {
                let error = Error::Incomparable {
                    lhs: lhs.ty.clone(),
                    rhs: rhs.ty.clone(),
                };
                self.error(line, error);
                (lhs, rhs, Type::INT)
            }
        }
    }

    fn arithmetic_operands(
        &mut self,
        op: BinaryOperator,
        lhs: Expr,
        rhs: Expr,
        line: u32,
    ) -> (Expr, Expr, Type) {
        use BinaryOperator::{Add, Sub};
        match (kind(&lhs.ty), kind(&rhs.ty), op) {
            (Kind::Basic, Kind::Basic, _) => usual_arithmetic(lhs, rhs),
            (Kind::Pointer, Kind::Basic, Add | Sub) => {
                let ty = lhs.ty.clone();
                (lhs, rhs, ty)
            }
            (Kind::Basic, Kind::Pointer, Add) => {
                let ty = rhs.ty.clone();
                (lhs, rhs, ty)
            }
            (Kind::Pointer, Kind::Pointer, Sub) => {
                if !lhs.ty.is_compatible(&rhs.ty) {
                    let error = Error::IncompatiblePointers {
                        lhs: lhs.ty.clone(),
                        rhs: rhs.ty.clone(),
                    };
                    self.error(line, error);
                }
                (lhs, rhs, Type::INT)
            }
            (Kind::Pointer, _, _) | (_, Kind::Pointer, _) => {
                self.error(line, Error::PointerOperation { op: op.symbol() });
                let ty = lhs.ty.clone();
                (lhs, rhs, ty)
            }
            _ => {
                self.invalid_operands(op, &lhs, &rhs, line);
                let ty = lhs.ty.clone();
                (lhs, rhs, ty)
            }
        }
    }

    fn check_assign(
        &mut self,
        op: Option<BinaryOperator>,
        target: &ast::Expr,
        value: &ast::Expr,
        line: u32,
    ) -> Expr {
        let target = self.check_expr(target);
        let value = self.check_value(value);
        let ty = target.ty.clone();
        if !target.is_modifiable_lvalue() {
            self.error(line, Error::NotAssignable);
            let kind = ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            };
            return Expr { kind, ty, line };
        }

        let Some(op) = op else {
            let value = match convert(value, &ty) {
                Ok(value) => value,
                Err(value) => {
                    self.error(line, assignment_error(&ty, &value.ty));
                    value
                }
            };
            let kind = ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            };
            return Expr { kind, ty, line };
        };

        let (lhs, rhs, operation_ty) = if ty.is_pointer() {
            if !matches!(op, BinaryOperator::Add | BinaryOperator::Sub) {
                self.error(line, Error::PointerCompoundOperator { op: op.symbol() });
            } else if !value.ty.is_basic() {
                self.error(line, Error::PointerCompoundNonInteger(value.ty.clone()));
            }
            (target, value, ty.clone())
        } else {
            let lhs = self.convert_unary(target);
            if lhs.ty.is_basic() && value.ty.is_basic() {
                usual_arithmetic(lhs, value)
            } else {
                self.invalid_operands(op, &lhs, &value, line);
                let operation_ty = lhs.ty.clone();
                (lhs, value, operation_ty)
            }
        };
        let kind = ExprKind::CompoundAssign {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            operation_ty,
        };
        Expr { kind, ty, line }
    }

    fn check_ternary(
        &mut self,
        condition: &ast::Expr,
        then_arm: &ast::Expr,
        else_arm: &ast::Expr,
        line: u32,
    ) -> Expr {
        let condition = self.check_condition(condition, "ternary condition");
        let then_arm = self.check_value(then_arm);
        let else_arm = self.check_value(else_arm);

        let (then_arm, else_arm, ty) = match (kind(&then_arm.ty), kind(&else_arm.ty)) {
            (Kind::Basic, Kind::Basic) => {
                let ty = if then_arm.ty.is_unsigned() != else_arm.ty.is_unsigned() {
                    Type::UNSIGNED_INT
                } else {
                    Type::INT
                };
                (cast_to(then_arm, &ty), cast_to(else_arm, &ty), ty)
            }
            (Kind::Pointer, Kind::Pointer) if then_arm.ty.is_compatible(&else_arm.ty) => {
                let ty = then_arm.ty.clone();
                (then_arm, cast_to(else_arm, &ty), ty)
            }
            (Kind::Pointer, Kind::Basic) if else_arm.is_null_constant() => {
                let ty = then_arm.ty.clone();
                (then_arm, cast_to(else_arm, &ty), ty)
            }
            (Kind::Basic, Kind::Pointer) if then_arm.is_null_constant() => {
                let ty = else_arm.ty.clone();
                (cast_to(then_arm, &ty), else_arm, ty)
            }
            (Kind::Void, Kind::Void) => (then_arm, else_arm, Type::Void),
            _ => {
                let error = Error::TernaryMismatch {
                    lhs: then_arm.ty.clone(),
                    rhs: else_arm.ty.clone(),
                };
                self.error(line, error);
                let ty = then_arm.ty.clone();
                (then_arm, else_arm, ty)
            }
        };
        Expr {
            kind: ExprKind::Ternary {
                condition: Box::new(condition),
                then_arm: Box::new(then_arm),
                else_arm: Box::new(else_arm),
            },
            ty,
            line,
        }
    }

    fn check_increment_operand(&mut self, expr: &ast::Expr) -> Expr {
        let operand = self.check_expr(expr);
        if !operand.is_modifiable_lvalue() {
            self.error(operand.line, Error::IncrementNonLvalue);
        }
        operand
    }

    fn check_call(&mut self, callee: &ast::Expr, args: &[ast::Expr], line: u32) -> Expr {
        let &ast::ExprKind::Ident(name) = &callee.kind else {
            let callee = self.check_expr(callee);
            self.error(line, Error::NotCallable(callee.ty.clone()));
            return Expr {
                ty: Type::INT,
                ..callee
            };
        };

        let Some(symbol) = self.ctx.symbols.lookup(self.scope, name, false) else {
            self.error(line, Error::UndeclaredIdentifier(name));
            let args: Vec<Expr> = args.iter().map(|arg| self.check_value(arg)).collect();
            let filler = Type::function(Function {
                return_type: Type::INT,
                params: args.iter().map(|arg| arg.ty.clone()).collect(),
                is_definition: false,
                scope: None,
            });
            let callee = self.ctx.symbols.declare(SymbolTable::GLOBAL, name, filler);
            let kind = ExprKind::Call { callee, name, args };
            return Expr {
                kind,
                ty: Type::INT,
                line,
            };
        };

        let args: Vec<Expr> = args.iter().map(|arg| self.check_value(arg)).collect();
        let callee_ty = self.ctx.symbols.symbol(symbol).ty.clone();
        let Some(function) = callee_ty.as_function() else {
            self.error(line, Error::NotCallable(callee_ty.clone()));
            let kind = ExprKind::Call {
                callee: symbol,
                name,
                args,
            };
            return Expr {
                kind,
                ty: Type::INT,
                line,
            };
        };

        if function.params.len() != args.len() {
            let error = Error::ArgumentCount {
                name,
                expected: function.params.len(),
                actual: args.len(),
            };
            self.error(line, error);
        }
        let args = args
            .into_iter()
            .enumerate()
            .map(|(index, arg)| {
                let Some(param) = function.params.get(index) else {
                    return arg;
                };
                convert(arg, param).unwrap_or_else(|arg| {
                    let error = Error::ArgumentType {
                        index: index + 1,
                        expected: param.clone(),
                        actual: arg.ty.clone(),
                    };
                    self.error(line, error);
                    arg
                })
            })
            .collect();

        Expr {
            kind: ExprKind::Call {
                callee: symbol,
                name,
                args,
            },
            ty: function.return_type.clone(),
            line,
        }
    }
}

/// Wraps `expr` in an implicit conversion to `ty`, unless it already has
/// that type.
fn cast_to(expr: Expr, ty: &Type) -> Expr {
    if expr.ty == *ty {
        return expr;
    }
    let line = expr.line;
    Expr {
        kind: ExprKind::Cast {
            expr: Box::new(expr),
            implicit: true,
        },
        ty: ty.clone(),
        line,
    }
}

/// Balances two word-sized basic operands. Only mixed signedness makes an
/// `unsigned int`: the signed side is converted to the unsigned one. Operands
/// of the same signedness are left alone and give `int`.
fn usual_arithmetic(lhs: Expr, rhs: Expr) -> (Expr, Expr, Type) {
    match (lhs.ty.is_unsigned(), rhs.ty.is_unsigned()) {
        (false, false) | (true, true) => (lhs, rhs, Type::INT),
        (true, false) => {
            let rhs = cast_to(rhs, &lhs.ty);
            (lhs, rhs, Type::UNSIGNED_INT)
        }
        (false, true) => {
            let lhs = cast_to(lhs, &rhs.ty);
            (lhs, rhs, Type::UNSIGNED_INT)
        }
    }
}

/// Converts a value as if by assignment to an object of type `target`.
/// Gives the value back unchanged when no such conversion exists.
fn convert(value: Expr, target: &Type) -> Result<Expr, Expr> {
    match (kind(target), kind(&value.ty)) {
        (Kind::Basic, Kind::Basic) => Ok(cast_to(value, target)),
        (Kind::Pointer, Kind::Basic) if value.is_null_constant() => Ok(cast_to(value, target)),
        (Kind::Pointer, Kind::Pointer) if target.is_compatible(&value.ty) => {
            Ok(cast_to(value, target))
        }
        _ => Err(value),
    }
}

fn assignment_error(target: &Type, value: &Type) -> Error {
    match (kind(target), kind(value)) {
        (Kind::Basic, Kind::Pointer) => Error::IncompatibleAssignment {
            lhs: target.clone(),
            rhs: value.clone(),
        },
        (Kind::Basic, _) => Error::AssignNonArithmetic(value.clone()),
        (Kind::Pointer, Kind::Basic) => Error::NonZeroToPointer,
        (Kind::Pointer, Kind::Pointer) => Error::IncompatiblePointers {
            lhs: target.clone(),
            rhs: value.clone(),
        },
        _ => Error::IncompatibleAssignment {
            lhs: target.clone(),
            rhs: value.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::{build::Builder, IncDec, TypeSpecifier as Spec},
        symbols::Storage,
        util::test_utils::ir_tests,
    };

    fn check_with(
        build: impl FnOnce(&Builder<'_>) -> ast::TranslationUnit,
    ) -> (CompilationContext, typed::Program) {
        let mut ctx = CompilationContext::new();
        let unit = build(&Builder::new(&mut ctx.interner));
        let program = check(&mut ctx, &unit);
        (ctx, program)
    }

    /// The first expression statement of the first function.
    fn first_expr(program: &typed::Program) -> &Expr {
        let typed::Item::Function(function) = &program.items[0] else {
            panic!("expected a function");
        };
        function
            .body
            .iter()
            .find_map(|stmt| match &stmt.kind {
                typed::StmtKind::Expr(expr) => Some(expr),
                _ => None,
            })
            .expect("no expression statement")
    }

    #[test]
    fn narrow_operands_are_promoted() {
        let (ctx, program) = check_with(|b| {
            b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.decl(Spec::CHAR, vec![b.var("c")]),
                    b.decl(Spec::UNSIGNED_INT, vec![b.var("u")]),
                    b.expr_stmt(b.bin(BinaryOperator::Add, b.id("c"), b.id("u"))),
                ],
            )])
        });
        assert!(ctx.errors().is_empty(), "{:?}", ctx.formatted_errors());

        let sum = first_expr(&program);
        assert_eq!(sum.ty, Type::UNSIGNED_INT);
        let ExprKind::Binary { lhs, rhs, .. } = &sum.kind else {
            panic!("expected a binary expression");
        };
        // char -> int -> unsigned int
        assert_eq!(lhs.ty, Type::UNSIGNED_INT);
        let ExprKind::Cast { expr: promoted, implicit: true } = &lhs.kind else {
            panic!("expected an implicit cast, got {lhs:?}");
        };
        assert_eq!(promoted.ty, Type::INT);
        assert!(matches!(promoted.strip_implicit_casts().kind, ExprKind::Ident(_)));
        assert!(matches!(rhs.kind, ExprKind::Ident(_)));
    }

    #[test]
    fn same_signedness_operands_give_int() {
        let (ctx, program) = check_with(|b| {
            b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.decl(Spec::UNSIGNED_INT, vec![b.var("a"), b.var("c")]),
                    b.expr_stmt(b.bin(BinaryOperator::Div, b.id("a"), b.id("c"))),
                    b.expr_stmt(b.ternary(b.num(1), b.id("a"), b.id("c"))),
                ],
            )])
        });
        assert!(ctx.errors().is_empty(), "{:?}", ctx.formatted_errors());

        let quotient = first_expr(&program);
        assert_eq!(quotient.ty, Type::INT);
        let ExprKind::Binary { lhs, rhs, .. } = &quotient.kind else {
            panic!("expected a binary expression");
        };
        assert_eq!(lhs.ty, Type::UNSIGNED_INT);
        assert_eq!(rhs.ty, Type::UNSIGNED_INT);

        let typed::Item::Function(function) = &program.items[0] else {
            panic!("expected a function");
        };
        let typed::StmtKind::Expr(choice) = &function.body[2].kind else {
            panic!("expected an expression statement");
        };
        assert_eq!(choice.ty, Type::INT);
    }

    #[test]
    fn arrays_decay_in_arithmetic() {
        let (ctx, program) = check_with(|b| {
            b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.decl(Spec::SHORT, vec![b.array(b.var("a"), Some(b.num(4)))]),
                    b.expr_stmt(b.index(b.id("a"), b.num(1))),
                ],
            )])
        });
        assert!(ctx.errors().is_empty(), "{:?}", ctx.formatted_errors());

        let element = first_expr(&program);
        assert_eq!(element.ty, Type::SHORT);
        let ExprKind::Unary { expr: sum, .. } = &element.kind else {
            panic!("expected a dereference");
        };
        assert_eq!(sum.ty, Type::pointer_to(Type::SHORT));
    }

    #[test]
    fn parameters_are_homed_and_locals_unplaced() {
        let (ctx, program) = check_with(|b| {
            b.unit(vec![b.function(
                Spec::INT,
                b.func(
                    b.var("f"),
                    vec![
                        b.param(Spec::INT, b.var("a")),
                        b.param(Spec::CHAR, b.array(b.var("s"), None)),
                    ],
                ),
                vec![
                    b.decl(Spec::INT, vec![b.var("local")]),
                    b.ret(Some(b.id("a"))),
                ],
            )])
        });
        assert!(ctx.errors().is_empty(), "{:?}", ctx.formatted_errors());

        let typed::Item::Function(function) = &program.items[0] else {
            panic!("expected a function");
        };
        let a = ctx.symbols.symbol(function.params[0]);
        let s = ctx.symbols.symbol(function.params[1]);
        assert_eq!(a.storage, Some(Storage::Frame(0)));
        assert_eq!(s.storage, Some(Storage::Frame(4)));
        assert_eq!(s.ty, Type::pointer_to(Type::CHAR));

        let (_, local) = ctx
            .symbols
            .symbols_in(function.scope)
            .find(|(_, symbol)| ctx.interner.get(symbol.name) == "local")
            .unwrap();
        assert_eq!(local.storage, None);
    }

    #[test]
    fn declarators_apply_outermost_first() {
        let (ctx, program) = check_with(|b| {
            b.unit(vec![b.global(
                Spec::INT,
                vec![
                    b.ptr(b.array(b.var("a"), Some(b.num(4)))),
                    b.array(b.ptr(b.var("p")), Some(b.bin(BinaryOperator::Mul, b.num(2), b.num(3)))),
                ],
            )])
        });
        assert!(ctx.errors().is_empty(), "{:?}", ctx.formatted_errors());

        let typed::Item::Decl(ids) = &program.items[0] else {
            panic!("expected a declaration");
        };
        let a = ctx.symbols.symbol(ids[0]);
        let p = ctx.symbols.symbol(ids[1]);
        assert_eq!(a.ty.to_string(), "int*[4]");
        assert_eq!(p.ty.to_string(), "int[6]*");
        assert_eq!(a.storage, Some(Storage::Global));
    }

    #[test]
    fn null_constant_converts_to_pointer() {
        let (ctx, program) = check_with(|b| {
            b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.decl(Spec::INT, vec![b.ptr(b.var("p"))]),
                    b.expr_stmt(b.assign(b.id("p"), b.num(0))),
                ],
            )])
        });
        assert!(ctx.errors().is_empty(), "{:?}", ctx.formatted_errors());

        let ExprKind::Assign { value, .. } = &first_expr(&program).kind else {
            panic!("expected an assignment");
        };
        assert_eq!(value.ty, Type::pointer_to(Type::INT));
        assert!(value.is_null_constant());
    }

    ir_tests! {
        use checker;

        fn undeclared_identifier_is_reported_once() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::INT,
                b.func(b.var("f"), vec![]),
                vec![
                    b.at(2).expr_stmt(b.assign(b.id("x"), b.num(1))),
                    b.at(3).ret(Some(b.id("x"))),
                ],
            )]);
            let expected_errors = &["line 2: identifier 'x' has not been declared"];
        }

        fn redeclaration_in_same_scope() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.at(2).decl(Spec::INT, vec![b.var("x")]),
                    b.at(3).decl(Spec::CHAR, vec![b.var("x")]),
                    b.at(4).block(vec![b.decl(Spec::CHAR, vec![b.var("x")])]),
                ],
            )]);
            let expected_errors = &["line 3: identifier 'x' has already been declared"];
        }

        fn prototypes_and_definitions() {
            let program = |b: &Builder<'_>| b.unit(vec![
                b.at(1).global(Spec::INT, vec![b.func(b.var("f"), vec![b.param(Spec::INT, b.var("a"))])]),
                b.at(2).global(Spec::INT, vec![b.func(b.var("f"), vec![b.param(Spec::INT, b.var("b"))])]),
                b.at(3).function(
                    Spec::INT,
                    b.func(b.var("f"), vec![b.param(Spec::INT, b.var("a"))]),
                    vec![b.ret(Some(b.id("a")))],
                ),
                b.at(4).function(
                    Spec::INT,
                    b.func(b.var("f"), vec![b.param(Spec::INT, b.var("a"))]),
                    vec![b.ret(Some(b.id("a")))],
                ),
                b.at(5).global(Spec::CHAR, vec![b.func(b.var("f"), vec![b.param(Spec::INT, b.var("a"))])]),
                b.at(6).global(Spec::INT, vec![b.func(b.var("f"), vec![])]),
                b.at(7).global(Spec::INT, vec![b.func(b.var("f"), vec![b.param(Spec::CHAR, b.var("a"))])]),
            ]);
            let expected_errors = &[
                "line 4: function 'f' has already been defined",
                "line 5: function 'f' redeclared with a different return type",
                "line 6: function 'f' redeclared with 0 parameters, but was declared with 1",
                "line 7: function 'f' redeclared with a different type for parameter 1",
            ];
        }

        fn illegal_declarators() {
            let program = |b: &Builder<'_>| b.unit(vec![
                b.at(1).global(Spec::INT, vec![b.array(b.func(b.var("f"), vec![]), Some(b.num(2)))]),
                b.at(2).global(Spec::INT, vec![b.func(b.array(b.var("g"), Some(b.num(2))), vec![])]),
                b.at(3).global(Spec::INT, vec![b.array(b.var("a"), Some(b.id("n")))]),
                b.at(4).global(Spec::VOID, vec![b.var("v")]),
            ]);
            let expected_errors = &[
                "line 1: function 'f' cannot return an array or a function",
                "line 2: 'g' declared as an array of functions",
                "line 3: cannot declare array 'a' without a constant length",
                "line 4: variable 'v' declared void",
            ];
        }

        fn labels_are_checked_per_function() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.at(2).goto("later"),
                    b.at(3).goto("nowhere"),
                    b.at(4).labeled("again", b.empty()),
                    b.at(5).block(vec![b.labeled("again", b.empty())]),
                    b.at(6).labeled("later", b.empty()),
                ],
            )]);
            let expected_errors = &[
                "line 5: label 'again' has already been defined",
                "line 3: label 'nowhere' is used but never defined",
            ];
        }

        fn pointer_arithmetic_rules() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.at(1).decl(Spec::INT, vec![b.ptr(b.var("p")), b.ptr(b.var("q")), b.var("i")]),
                    b.decl(Spec::CHAR, vec![b.ptr(b.var("c"))]),
                    b.at(2).expr_stmt(b.bin(BinaryOperator::Add, b.id("i"), b.id("p"))),
                    b.at(3).expr_stmt(b.bin(BinaryOperator::Sub, b.id("p"), b.id("q"))),
                    b.at(4).expr_stmt(b.bin(BinaryOperator::Sub, b.id("i"), b.id("p"))),
                    b.at(5).expr_stmt(b.bin(BinaryOperator::Mul, b.id("p"), b.id("i"))),
                    b.at(6).expr_stmt(b.bin(BinaryOperator::Sub, b.id("p"), b.id("c"))),
                    b.at(7).expr_stmt(b.bin(BinaryOperator::Lt, b.id("p"), b.id("c"))),
                    b.at(8).expr_stmt(b.bin(BinaryOperator::Eq, b.id("p"), b.num(0))),
                    b.at(9).expr_stmt(b.bin(BinaryOperator::LogAnd, b.id("p"), b.id("c"))),
                ],
            )]);
            let expected_errors = &[
                "line 4: cannot perform '-' on pointers",
                "line 5: cannot perform '*' on pointers",
                "line 6: incompatible pointer types int* and char*",
                "line 7: cannot compare int* with char*",
            ];
        }

        fn assignment_rules() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.at(1).decl(Spec::INT, vec![b.ptr(b.var("p")), b.var("i"), b.array(b.var("a"), Some(b.num(2)))]),
                    b.decl(Spec::CHAR, vec![b.ptr(b.var("c"))]),
                    b.decl(Spec::VOID, vec![b.ptr(b.var("v"))]),
                    b.at(2).expr_stmt(b.assign(b.num(1), b.id("i"))),
                    b.at(3).expr_stmt(b.assign(b.id("p"), b.num(1))),
                    b.at(4).expr_stmt(b.assign(b.id("p"), b.id("c"))),
                    b.at(5).expr_stmt(b.assign(b.id("i"), b.id("p"))),
                    b.at(6).expr_stmt(b.assign(b.id("a"), b.id("p"))),
                    b.at(7).expr_stmt(b.assign(b.id("v"), b.id("p"))),
                    b.at(8).expr_stmt(b.assign(b.id("p"), b.id("v"))),
                    b.at(9).expr_stmt(b.compound(BinaryOperator::Mul, b.id("p"), b.num(2))),
                    b.at(10).expr_stmt(b.compound(BinaryOperator::Add, b.id("p"), b.id("c"))),
                    b.at(11).expr_stmt(b.compound(BinaryOperator::Add, b.deref(b.id("c")), b.id("i"))),
                ],
            )]);
            let expected_errors = &[
                "line 2: cannot assign to r-value",
                "line 3: cannot assign non-zero constant to pointer",
                "line 4: incompatible pointer types int* and char*",
                "line 5: cannot assign int* to int",
                "line 6: cannot assign to r-value",
                "line 9: cannot apply '*=' to pointer",
                "line 10: compound assignment to pointer must be integer, but got char*",
            ];
        }

        fn unary_operator_rules() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.at(1).decl(Spec::INT, vec![b.ptr(b.var("p")), b.var("i")]),
                    b.decl(Spec::VOID, vec![b.ptr(b.var("v"))]),
                    b.at(2).expr_stmt(b.deref(b.id("i"))),
                    b.at(3).expr_stmt(b.deref(b.id("v"))),
                    b.at(4).expr_stmt(b.addr(b.num(3))),
                    b.at(5).expr_stmt(b.unary(UnaryOperator::Minus, b.id("p"))),
                    b.at(6).expr_stmt(b.unary(UnaryOperator::Not, b.id("p"))),
                    b.at(7).expr_stmt(b.post(IncDec::Increment, b.num(1))),
                    b.at(8).expr_stmt(b.pre(IncDec::Decrement, b.id("p"))),
                    b.at(9).expr_stmt(b.addr(b.deref(b.id("p")))),
                ],
            )]);
            let expected_errors = &[
                "line 2: cannot dereference non-pointer type int",
                "line 3: cannot dereference void pointer",
                "line 4: cannot take the address of a non-object",
                "line 5: invalid operand to unary '-' (int*)",
                "line 7: increment requires a modifiable l-value",
            ];
        }

        fn call_rules() {
            let program = |b: &Builder<'_>| b.unit(vec![
                b.at(1).global(Spec::INT, vec![b.func(b.var("g"), vec![
                    b.param(Spec::INT, b.var("a")),
                    b.param(Spec::CHAR, b.ptr(b.var("s"))),
                ])]),
                b.function(
                    Spec::VOID,
                    b.func(b.var("f"), vec![]),
                    vec![
                        b.decl(Spec::INT, vec![b.var("i")]),
                        b.at(2).expr_stmt(b.call("g", vec![b.num(1)])),
                        b.at(3).expr_stmt(b.call("g", vec![b.id("i"), b.id("i")])),
                        b.at(4).expr_stmt(b.call("g", vec![b.num(1), b.num(0)])),
                        b.at(5).expr_stmt(b.call("h", vec![b.num(1)])),
                        b.at(6).expr_stmt(b.call("h", vec![b.num(2)])),
                        b.at(7).expr_stmt(b.call("i", vec![])),
                    ],
                ),
            ]);
            let expected_errors = &[
                "line 2: function 'g' expects 2 arguments, but got 1",
                "line 3: argument 2: expected char*, but got int",
                "line 5: identifier 'h' has not been declared",
                "line 7: called object of type int is not a function",
            ];
        }

        fn return_rules() {
            let program = |b: &Builder<'_>| b.unit(vec![
                b.at(1).function(Spec::VOID, b.func(b.var("v"), vec![]), vec![b.at(2).ret(Some(b.num(1)))]),
                b.at(3).function(Spec::INT, b.func(b.var("i"), vec![]), vec![b.at(4).ret(None)]),
                b.at(5).function(Spec::INT, b.func(b.var("m"), vec![]), vec![b.empty()]),
                b.at(6).function(
                    Spec::CHAR,
                    b.ptr(b.func(b.var("p"), vec![])),
                    vec![b.at(7).ret(Some(b.num(0)))],
                ),
                b.at(8).function(
                    Spec::INT,
                    b.ptr(b.func(b.var("q"), vec![])),
                    vec![b.at(9).ret(Some(b.num(5)))],
                ),
            ]);
            let expected_errors = &[
                "line 2: returning a value in void function 'v'",
                "line 4: non-void function 'i' must return a value",
                "line 5: non-void function 'm' has no return statement",
                "line 9: return type mismatch: expected int*, but got int",
            ];
        }

        fn conditions_must_be_scalar() {
            let program = |b: &Builder<'_>| b.unit(vec![
                b.global(Spec::VOID, vec![b.func(b.var("nothing"), vec![b.param(Spec::VOID, ast::Declarator::Abstract)])]),
                b.function(
                    Spec::VOID,
                    b.func(b.var("f"), vec![]),
                    vec![
                        b.at(2).if_(b.call("nothing", vec![]), b.empty(), None),
                        b.at(3).expr_stmt(b.ternary(b.call("nothing", vec![]), b.num(1), b.num(2))),
                        b.at(4).while_(b.num(1), b.break_()),
                    ],
                ),
            ]);
            let expected_errors = &[
                "line 2: condition must be scalar, but got void",
                "line 3: ternary condition must be scalar, but got void",
            ];
        }

        fn ternary_and_cast_rules() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::VOID,
                b.func(b.var("f"), vec![]),
                vec![
                    b.at(1).decl(Spec::INT, vec![b.ptr(b.var("p")), b.var("i")]),
                    b.decl(Spec::CHAR, vec![b.ptr(b.var("c"))]),
                    b.at(2).expr_stmt(b.ternary(b.id("i"), b.id("p"), b.num(0))),
                    b.at(3).expr_stmt(b.ternary(b.id("i"), b.id("p"), b.id("c"))),
                    b.at(4).expr_stmt(b.cast(b.type_name(Spec::CHAR, b.ptr(ast::Declarator::Abstract)), b.id("p"))),
                    b.at(5).expr_stmt(b.cast(b.type_name(Spec::VOID, ast::Declarator::Abstract), b.id("p"))),
                    b.at(6).expr_stmt(b.cast(
                        b.type_name(Spec::INT, b.array(ast::Declarator::Abstract, Some(b.num(2)))),
                        b.id("i"),
                    )),
                ],
            )]);
            let expected_errors = &[
                "line 3: mismatched conditional operands (int* and char*)",
                "line 6: cannot cast int to int[2]",
            ];
        }
    }
}
