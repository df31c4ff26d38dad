//! Lowers the checked program to three-address code.
//!
//! Expressions lower to a [`Lowered`]: the instructions computing them and the
//! operand holding the result. Identifiers and dereferences lower to the
//! *address* of their object; [`Generator::lower_value`] adds the load where a
//! value is needed.

use crate::{
    ast::{BinaryOperator, IncDec, UnaryOperator},
    context::CompilationContext,
    error::{Error, Pass, Span},
    ir::{self, Arena, Instruction, Opcode, Operand, Section},
    symbols::Storage,
    typed::{self, Expr, ExprKind, Stmt, StmtKind},
    types::{Basic, Type, Width},
    util::intern::Interned,
};

/// Arguments passed in registers, and the most a call may have.
pub const MAX_CALL_ARGUMENTS: usize = 4;

/// Bytes at the base of every frame reserved for the parameter home slots and
/// the saved frame pointer and return address. Locals start above them.
pub const FRAME_OVERHEAD: i32 = 56;

/// Prefix of the data label of a file-scope object.
pub const GLOBAL_LABEL_PREFIX: &str = "_Global_";

/// Lowers every function definition of `program`, in order.
///
/// The program must have checked without symbol or type errors. Problems found
/// here are reported to `ctx` and lowering carries on, so the returned program
/// is only meaningful when no codegen error was reported.
pub fn generate(ctx: &mut CompilationContext, program: &typed::Program) -> ir::Program {
    let mut generator = Generator {
        ctx: &mut *ctx,
        arena: Arena::with_capacity(1024),
        function: None,
    };

    let mut body = Section::empty();
    for item in &program.items {
        if let typed::Item::Function(function) = item {
            let section = generator.lower_function(function);
            body = generator.arena.concatenate(body, section);
            body = generator.sequence_point(body);
        }
    }

    let arena = generator.arena;
    tracing::debug!(
        instructions = arena.len(),
        codegen_errors = ctx.error_count(Pass::Codegen),
        "generated IR"
    );
    ir::Program { arena, body }
}

struct Generator<'c> {
    ctx: &'c mut CompilationContext,
    arena: Arena,
    /// Function being lowered; user labels are scoped by its name.
    function: Option<Interned>,
}

struct Lowered {
    section: Section,
    operand: Operand,
}

/// Jump targets of the innermost enclosing loop.
#[derive(Copy, Clone)]
struct LoopLabels {
    continue_label: Interned,
    break_label: Interned,
}

impl Generator<'_> {
    fn error(&mut self, line: u32, error: Error) {
        self.ctx.report(Span::new(line), error);
    }

    fn single(&mut self, opcode: Opcode, operands: &[Operand]) -> Section {
        self.arena.single(Instruction::new(opcode, operands))
    }

    fn push(&mut self, section: Section, opcode: Opcode, operands: &[Operand]) -> Section {
        self.arena.append(section, Instruction::new(opcode, operands))
    }

    fn join(&mut self, before: Section, after: Section) -> Section {
        self.arena.concatenate(before, after)
    }

    fn temporary(&mut self) -> Operand {
        Operand::Temporary(self.ctx.new_temporary())
    }

    fn label(&mut self) -> Interned {
        self.ctx.new_label()
    }

    /// Marks a statement boundary. Temporaries allocated before it are dead
    /// after it.
    fn sequence_point(&mut self, section: Section) -> Section {
        let next = i64::from(self.ctx.next_temporary_id());
        self.push(section, Opcode::SequencePoint, &[Operand::Immediate(next)])
    }

    fn global_label(&mut self, name: Interned) -> Interned {
        let label = format!("{GLOBAL_LABEL_PREFIX}{}", self.ctx.interner.get(name));
        self.ctx.interner.intern(&label)
    }

    fn user_label(&mut self, label: Interned) -> Interned {
        let Some(function) = self.function else {
            unreachable!("label outside of a function");
        };
        let label = format!(
            "_UserLabel_{}_{}",
            self.ctx.interner.get(function),
            self.ctx.interner.get(label)
        );
        self.ctx.interner.intern(&label)
    }
}

// Functions and statements.
impl Generator<'_> {
    fn lower_function(&mut self, function: &typed::Function) -> Section {
        let high_water_mark = self
            .ctx
            .symbols
            .assign_frame_offsets(function.scope, FRAME_OVERHEAD);
        let frame_size = (high_water_mark + 7) / 8 * 8;

        let param_count = self
            .ctx
            .symbols
            .symbol(function.symbol)
            .ty
            .as_function()
            .map_or(function.params.len(), |signature| signature.params.len());
        if param_count > MAX_CALL_ARGUMENTS {
            self.error(
                function.line,
                Error::TooManyParameters {
                    name: function.name,
                    count: param_count,
                },
            );
        }

        self.function = Some(function.name);
        let name = Operand::Label(function.name);
        let frame = Operand::Immediate(i64::from(frame_size));
        let mut section = self.single(Opcode::ProcBegin, &[name, frame, immediate(param_count)]);
        for stmt in &function.body {
            let lowered = self.lower_stmt(stmt, None);
            section = self.join(section, lowered);
        }
        let section = self.push(section, Opcode::ProcEnd, &[name, frame]);
        self.function = None;

        tracing::trace!(
            name = self.ctx.interner.get(function.name),
            frame_size,
            "lowered function"
        );
        section
    }

    /// Lowers `stmt`, followed by a sequence point. Blocks only carry the
    /// sequence points of their statements.
    fn lower_stmt(&mut self, stmt: &Stmt, loop_labels: Option<LoopLabels>) -> Section {
        let section = match &stmt.kind {
            StmtKind::Compound(stmts) => {
                let mut section = Section::empty();
                for stmt in stmts {
                    let lowered = self.lower_stmt(stmt, loop_labels);
                    section = self.join(section, lowered);
                }
                return section;
            }
            StmtKind::Expr(expr) => self.lower_expr(expr).section,
            StmtKind::Decl(_) | StmtKind::Empty => self.single(Opcode::Nop, &[]),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.lower_if(condition, then_branch, else_branch.as_deref(), loop_labels),
            StmtKind::While { condition, body } => self.lower_while(condition, body),
            StmtKind::DoWhile { body, condition } => self.lower_do_while(body, condition),
            StmtKind::For {
                init,
                condition,
                step,
                body,
            } => self.lower_for(init.as_ref(), condition.as_ref(), step.as_ref(), body),
            StmtKind::Goto(label) => {
                let target = self.user_label(*label);
                self.single(Opcode::Goto, &[Operand::Label(target)])
            }
            StmtKind::Continue => match loop_labels {
                Some(labels) => self.single(Opcode::Goto, &[Operand::Label(labels.continue_label)]),
                None => {
                    self.error(stmt.line, Error::ContinueOutsideLoop);
                    self.single(Opcode::Nop, &[])
                }
            },
            StmtKind::Break => match loop_labels {
                Some(labels) => self.single(Opcode::Goto, &[Operand::Label(labels.break_label)]),
                None => {
                    self.error(stmt.line, Error::BreakOutsideLoop);
                    self.single(Opcode::Nop, &[])
                }
            },
            StmtKind::Return(Some(value)) => {
                let value = self.lower_value(value);
                self.push(value.section, Opcode::Return, &[value.operand])
            }
            StmtKind::Return(None) => self.single(Opcode::ReturnVoid, &[]),
            StmtKind::Labeled { label, stmt } => {
                let label = self.user_label(*label);
                let section = self.single(Opcode::Label, &[Operand::Label(label)]);
                let inner = self.lower_stmt(stmt, loop_labels);
                self.join(section, inner)
            }
        };
        self.sequence_point(section)
    }

    fn lower_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        loop_labels: Option<LoopLabels>,
    ) -> Section {
        let condition = self.lower_value(condition);
        let Some(else_branch) = else_branch else {
            let end = self.label();
            let section = self.push(
                condition.section,
                Opcode::GotoIfFalse,
                &[condition.operand, Operand::Label(end)],
            );
            let then = self.lower_stmt(then_branch, loop_labels);
            let section = self.join(section, then);
            return self.push(section, Opcode::Label, &[Operand::Label(end)]);
        };

        let else_label = self.label();
        let end = self.label();
        let section = self.push(
            condition.section,
            Opcode::GotoIfFalse,
            &[condition.operand, Operand::Label(else_label)],
        );
        let then = self.lower_stmt(then_branch, loop_labels);
        let section = self.join(section, then);
        let section = self.push(section, Opcode::Goto, &[Operand::Label(end)]);
        let section = self.push(section, Opcode::Label, &[Operand::Label(else_label)]);
        let otherwise = self.lower_stmt(else_branch, loop_labels);
        let section = self.join(section, otherwise);
        self.push(section, Opcode::Label, &[Operand::Label(end)])
    }

    fn lower_while(&mut self, condition: &Expr, body: &Stmt) -> Section {
        let labels = LoopLabels {
            continue_label: self.label(),
            break_label: self.label(),
        };
        let section = self.single(Opcode::Label, &[Operand::Label(labels.continue_label)]);
        let condition = self.lower_value(condition);
        let section = self.join(section, condition.section);
        let section = self.push(
            section,
            Opcode::GotoIfFalse,
            &[condition.operand, Operand::Label(labels.break_label)],
        );
        let body = self.lower_stmt(body, Some(labels));
        let section = self.join(section, body);
        let section = self.push(section, Opcode::Goto, &[Operand::Label(labels.continue_label)]);
        self.push(section, Opcode::Label, &[Operand::Label(labels.break_label)])
    }

    fn lower_do_while(&mut self, body: &Stmt, condition: &Expr) -> Section {
        let top = self.label();
        let labels = LoopLabels {
            continue_label: self.label(),
            break_label: self.label(),
        };
        let section = self.single(Opcode::Label, &[Operand::Label(top)]);
        let body = self.lower_stmt(body, Some(labels));
        let section = self.join(section, body);
        let section = self.push(section, Opcode::Label, &[Operand::Label(labels.continue_label)]);
        let condition = self.lower_value(condition);
        let section = self.join(section, condition.section);
        let section = self.push(
            section,
            Opcode::GotoIfTrue,
            &[condition.operand, Operand::Label(top)],
        );
        self.push(section, Opcode::Label, &[Operand::Label(labels.break_label)])
    }

    /// `continue` lands on the step, so it still runs before the next test.
    fn lower_for(
        &mut self,
        init: Option<&Expr>,
        condition: Option<&Expr>,
        step: Option<&Expr>,
        body: &Stmt,
    ) -> Section {
        let section = match init {
            Some(init) => self.lower_expr(init).section,
            None => Section::empty(),
        };
        let top = self.label();
        let labels = LoopLabels {
            continue_label: self.label(),
            break_label: self.label(),
        };
        let mut section = self.push(section, Opcode::Label, &[Operand::Label(top)]);
        if let Some(condition) = condition {
            let condition = self.lower_value(condition);
            section = self.join(section, condition.section);
            section = self.push(
                section,
                Opcode::GotoIfFalse,
                &[condition.operand, Operand::Label(labels.break_label)],
            );
        }
        let body = self.lower_stmt(body, Some(labels));
        let section = self.join(section, body);
        let mut section = self.push(section, Opcode::Label, &[Operand::Label(labels.continue_label)]);
        if let Some(step) = step {
            let step = self.lower_expr(step);
            section = self.join(section, step.section);
        }
        let section = self.push(section, Opcode::Goto, &[Operand::Label(top)]);
        self.push(section, Opcode::Label, &[Operand::Label(labels.break_label)])
    }
}

// Expressions.
impl Generator<'_> {
    /// Lowers `expr` to its value, loading through the address its node
    /// yields when it has one.
    fn lower_value(&mut self, expr: &Expr) -> Lowered {
        let lowered = self.lower_expr(expr);
        self.load_value(expr, lowered)
    }

    /// Arrays and functions have no value to load; their address stands in
    /// for it.
    fn load_value(&mut self, expr: &Expr, lowered: Lowered) -> Lowered {
        if !expr.yields_address() {
            return lowered;
        }
        let Some(opcode) = load_opcode(&expr.ty) else {
            return lowered;
        };
        let value = self.temporary();
        let section = self.push(lowered.section, opcode, &[value, lowered.operand]);
        Lowered {
            section,
            operand: value,
        }
    }

    fn lower_expr(&mut self, expr: &Expr) -> Lowered {
        match &expr.kind {
            &ExprKind::Number(value) => {
                let result = self.temporary();
                Lowered {
                    section: self.single(Opcode::LoadImmediate, &[result, Operand::Immediate(value)]),
                    operand: result,
                }
            }
            &ExprKind::Ident(id) => {
                let symbol = self.ctx.symbols.symbol(id);
                let (name, storage) = (symbol.name, symbol.storage);
                let is_function = symbol.ty.as_function().is_some();
                let address = match storage {
                    _ if is_function => Operand::Label(name),
                    Some(Storage::Frame(offset)) => Operand::FrameSlot(offset),
                    Some(Storage::Global) => Operand::Label(self.global_label(name)),
                    None => unreachable!("object without storage reached code generation"),
                };
                let result = self.temporary();
                Lowered {
                    section: self.single(Opcode::AddressOf, &[result, address]),
                    operand: result,
                }
            }
            ExprKind::String(value) => {
                let result = self.temporary();
                let section = match self.ctx.record_string(value) {
                    Some(label) => self.single(Opcode::AddressOf, &[result, Operand::Label(label)]),
                    None => {
                        self.error(expr.line, Error::TooManyStrings);
                        self.single(Opcode::LoadImmediate, &[result, Operand::Immediate(0)])
                    }
                };
                Lowered {
                    section,
                    operand: result,
                }
            }
            ExprKind::Unary { op, expr: operand } => self.lower_unary(*op, operand),
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs, &expr.ty),
            ExprKind::Assign { target, value } => self.lower_assign(target, value),
            ExprKind::CompoundAssign {
                op,
                lhs,
                rhs,
                operation_ty,
            } => self.lower_compound_assign(*op, lhs, rhs, operation_ty),
            ExprKind::Ternary {
                condition,
                then_arm,
                else_arm,
            } => self.lower_ternary(condition, then_arm, else_arm, &expr.ty),
            ExprKind::Cast { expr: inner, .. } => {
                let value = self.lower_value(inner);
                self.convert(value, &inner.ty, &expr.ty)
            }
            ExprKind::Postfix { op, expr: operand } => self.lower_increment(*op, operand, true),
            ExprKind::Prefix { op, expr: operand } => self.lower_increment(*op, operand, false),
            ExprKind::Call { name, args, .. } => self.lower_call(*name, args, &expr.ty, expr.line),
            ExprKind::Comma(exprs) => {
                let Some((last, rest)) = exprs.split_last() else {
                    unreachable!("empty comma expression");
                };
                let mut section = Section::empty();
                for expr in rest {
                    let lowered = self.lower_expr(expr);
                    section = self.join(section, lowered.section);
                }
                let last = self.lower_value(last);
                Lowered {
                    section: self.join(section, last.section),
                    operand: last.operand,
                }
            }
        }
    }

    fn lower_unary(&mut self, op: UnaryOperator, operand: &Expr) -> Lowered {
        let opcode = match op {
            // The pointer value is the address of the object.
            UnaryOperator::Deref => return self.lower_value(operand),
            UnaryOperator::AddressOf => return self.lower_expr(operand),
            UnaryOperator::Not => Opcode::LogicalNot,
            UnaryOperator::Plus => Opcode::Positive,
            UnaryOperator::Minus => Opcode::Negate,
            UnaryOperator::BitNot => Opcode::BitNot,
        };
        let value = self.lower_value(operand);
        let result = self.temporary();
        Lowered {
            section: self.push(value.section, opcode, &[result, value.operand]),
            operand: result,
        }
    }

    fn lower_binary(&mut self, op: BinaryOperator, lhs: &Expr, rhs: &Expr, ty: &Type) -> Lowered {
        if op.is_logical() {
            return self.lower_logical(op, lhs, rhs);
        }

        let lhs_value = self.lower_value(lhs);
        let rhs_value = self.lower_value(rhs);
        if op.is_relational() {
            let unsigned = lhs.ty.is_unsigned() || rhs.ty.is_unsigned();
            let opcode = relational_opcode(op, unsigned);
            let section = self.join(lhs_value.section, rhs_value.section);
            let result = self.temporary();
            return Lowered {
                section: self.push(section, opcode, &[result, lhs_value.operand, rhs_value.operand]),
                operand: result,
            };
        }
        self.arithmetic(op, ty, &lhs.ty, &rhs.ty, lhs_value, rhs_value)
    }

    /// Emits `lhs op rhs`, scaling integer operands of pointer arithmetic by
    /// the pointee size and dividing pointer differences by it.
    fn arithmetic(
        &mut self,
        op: BinaryOperator,
        result_ty: &Type,
        lhs_ty: &Type,
        rhs_ty: &Type,
        lhs: Lowered,
        rhs: Lowered,
    ) -> Lowered {
        let (lhs, rhs) = match (lhs_ty.is_pointer(), rhs_ty.is_pointer(), op) {
            (true, true, BinaryOperator::Sub) => {
                let section = self.join(lhs.section, rhs.section);
                let difference = self.temporary();
                let section = self.push(
                    section,
                    Opcode::Subtract,
                    &[difference, lhs.operand, rhs.operand],
                );
                let stride = lhs_ty.stride();
                if stride == 1 {
                    return Lowered {
                        section,
                        operand: difference,
                    };
                }
                let width = self.temporary();
                let section = self.push(
                    section,
                    Opcode::LoadImmediate,
                    &[width, Operand::Immediate(i64::from(stride))],
                );
                let result = self.temporary();
                return Lowered {
                    section: self.push(section, Opcode::Divide, &[result, difference, width]),
                    operand: result,
                };
            }
            (true, false, BinaryOperator::Add | BinaryOperator::Sub) => {
                let rhs = self.scale(rhs, lhs_ty.stride());
                (lhs, rhs)
            }
            (false, true, BinaryOperator::Add) => {
                let lhs = self.scale(lhs, rhs_ty.stride());
                (lhs, rhs)
            }
            _ => (lhs, rhs),
        };

        let opcode = arithmetic_opcode(op, result_ty.is_unsigned());
        let section = self.join(lhs.section, rhs.section);
        let result = self.temporary();
        Lowered {
            section: self.push(section, opcode, &[result, lhs.operand, rhs.operand]),
            operand: result,
        }
    }

    fn scale(&mut self, value: Lowered, stride: u32) -> Lowered {
        if stride == 1 {
            return value;
        }
        let width = self.temporary();
        let section = self.push(
            value.section,
            Opcode::LoadImmediate,
            &[width, Operand::Immediate(i64::from(stride))],
        );
        let result = self.temporary();
        Lowered {
            section: self.push(section, Opcode::Multiply, &[result, value.operand, width]),
            operand: result,
        }
    }

    /// Short-circuits on the left operand, then normalizes whichever operand
    /// decided the result to 0 or 1.
    fn lower_logical(&mut self, op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> Lowered {
        let lhs = self.lower_value(lhs);
        let result = self.temporary();
        let skip = self.label();
        let join = self.label();
        let branch = if op == BinaryOperator::LogAnd {
            Opcode::GotoIfFalse
        } else {
            Opcode::GotoIfTrue
        };

        let section = self.push(lhs.section, branch, &[lhs.operand, Operand::Label(skip)]);
        let rhs = self.lower_value(rhs);
        let section = self.join(section, rhs.section);
        let section = self.push(section, Opcode::Copy, &[result, rhs.operand]);
        let section = self.push(section, Opcode::Goto, &[Operand::Label(join)]);
        let section = self.push(section, Opcode::Label, &[Operand::Label(skip)]);
        let section = self.push(section, Opcode::Copy, &[result, lhs.operand]);
        let section = self.push(section, Opcode::Label, &[Operand::Label(join)]);
        self.truth_value(Lowered {
            section,
            operand: result,
        })
    }

    fn truth_value(&mut self, value: Lowered) -> Lowered {
        let result = self.temporary();
        let done = self.label();
        let section = self.push(
            value.section,
            Opcode::LoadImmediate,
            &[result, Operand::Immediate(0)],
        );
        let section = self.push(
            section,
            Opcode::GotoIfFalse,
            &[value.operand, Operand::Label(done)],
        );
        let section = self.push(section, Opcode::LoadImmediate, &[result, Operand::Immediate(1)]);
        Lowered {
            section: self.push(section, Opcode::Label, &[Operand::Label(done)]),
            operand: result,
        }
    }

    fn lower_ternary(&mut self, condition: &Expr, then_arm: &Expr, else_arm: &Expr, ty: &Type) -> Lowered {
        let condition = self.lower_value(condition);
        let result = if ty.is_void() {
            Operand::Immediate(0)
        } else {
            self.temporary()
        };
        let else_label = self.label();
        let end = self.label();

        let section = self.push(
            condition.section,
            Opcode::GotoIfFalse,
            &[condition.operand, Operand::Label(else_label)],
        );
        let then = self.lower_value(then_arm);
        let mut section = self.join(section, then.section);
        if !ty.is_void() {
            section = self.push(section, Opcode::Copy, &[result, then.operand]);
        }
        let section = self.push(section, Opcode::Goto, &[Operand::Label(end)]);
        let section = self.push(section, Opcode::Label, &[Operand::Label(else_label)]);
        let otherwise = self.lower_value(else_arm);
        let mut section = self.join(section, otherwise.section);
        if !ty.is_void() {
            section = self.push(section, Opcode::Copy, &[result, otherwise.operand]);
        }
        Lowered {
            section: self.push(section, Opcode::Label, &[Operand::Label(end)]),
            operand: result,
        }
    }

    /// Changes the register width of `value`. Widths that already agree, and
    /// conversions involving non-scalar types, need no instruction.
    fn convert(&mut self, value: Lowered, from: &Type, to: &Type) -> Lowered {
        let opcode = match (from.value_width(), to.value_width()) {
            (Some(1), Some(2)) => Opcode::ByteToHalfWord,
            (Some(1), Some(4)) => Opcode::ByteToWord,
            (Some(2), Some(1)) if to.is_unsigned() => Opcode::HalfWordToByteUnsigned,
            (Some(2), Some(1)) => Opcode::HalfWordToByte,
            (Some(2), Some(4)) => Opcode::HalfWordToWord,
            (Some(4), Some(1)) if to.is_unsigned() => Opcode::WordToByteUnsigned,
            (Some(4), Some(1)) => Opcode::WordToByte,
            (Some(4), Some(2)) if to.is_unsigned() => Opcode::WordToHalfWordUnsigned,
            (Some(4), Some(2)) => Opcode::WordToHalfWord,
            _ => return value,
        };
        let result = self.temporary();
        Lowered {
            section: self.push(value.section, opcode, &[result, value.operand]),
            operand: result,
        }
    }

    fn lower_assign(&mut self, target: &Expr, value: &Expr) -> Lowered {
        let value = self.lower_value(value);
        let address = self.lower_expr(target);
        let section = self.join(value.section, address.section);
        let store = store_opcode(&target.ty);
        Lowered {
            section: self.push(section, store, &[value.operand, address.operand]),
            operand: value.operand,
        }
    }

    /// The target is loaded once and run through the conversions wrapped
    /// around it, so it's evaluated a single time.
    fn lower_compound_assign(
        &mut self,
        op: BinaryOperator,
        lhs: &Expr,
        rhs: &Expr,
        operation_ty: &Type,
    ) -> Lowered {
        let root = lhs.root_lvalue();
        let address = self.lower_expr(root);
        let destination = match &root.kind {
            &ExprKind::Ident(id) => match self.ctx.symbols.symbol(id).storage {
                Some(Storage::Frame(offset)) => Operand::FrameSlot(offset),
                _ => address.operand,
            },
            _ => address.operand,
        };

        let mut current = self.load_value(root, address);
        for (from, to) in conversions(lhs) {
            current = self.convert(current, from, to);
        }
        let rhs_value = self.lower_value(rhs);
        let result = self.arithmetic(op, operation_ty, &lhs.ty, &rhs.ty, current, rhs_value);

        let store = store_opcode(&root.ty);
        Lowered {
            section: self.push(result.section, store, &[result.operand, destination]),
            operand: result.operand,
        }
    }

    fn lower_increment(&mut self, op: IncDec, operand: &Expr, postfix: bool) -> Lowered {
        let address = self.lower_expr(operand);
        let location = address.operand;
        let old = self.load_value(operand, address);

        let step = if operand.ty.is_pointer() {
            operand.ty.stride()
        } else {
            1
        };
        let step_value = self.temporary();
        let section = self.push(
            old.section,
            Opcode::LoadImmediate,
            &[step_value, Operand::Immediate(i64::from(step))],
        );
        let arithmetic = match op {
            IncDec::Increment => BinaryOperator::Add,
            IncDec::Decrement => BinaryOperator::Sub,
        };
        let new = self.temporary();
        let section = self.push(
            section,
            arithmetic_opcode(arithmetic, operand.ty.is_unsigned()),
            &[new, old.operand, step_value],
        );
        let section = self.push(section, store_opcode(&operand.ty), &[new, location]);
        Lowered {
            section,
            operand: if postfix { old.operand } else { new },
        }
    }

    /// Arguments are all evaluated before the first `PARAM`, so a nested call
    /// can't clobber the argument registers of an outer one.
    fn lower_call(&mut self, name: Interned, args: &[Expr], return_ty: &Type, line: u32) -> Lowered {
        let mut section = Section::empty();
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.lower_value(arg);
            section = self.join(section, value.section);
            values.push(value.operand);
        }
        if values.len() > MAX_CALL_ARGUMENTS {
            self.error(
                line,
                Error::TooManyArguments {
                    name,
                    count: values.len(),
                },
            );
            values.truncate(MAX_CALL_ARGUMENTS);
        }

        for (index, value) in values.iter().enumerate() {
            section = self.push(section, Opcode::Parameter, &[immediate(index), *value]);
        }
        let section = self.push(
            section,
            Opcode::Call,
            &[Operand::Label(name), immediate(values.len())],
        );

        let Some(width) = return_ty.value_width() else {
            return Lowered {
                section,
                operand: Operand::Immediate(0),
            };
        };
        let opcode = if width == 1 {
            Opcode::ResultByte
        } else {
            Opcode::ResultWord
        };
        let result = self.temporary();
        Lowered {
            section: self.push(section, opcode, &[result]),
            operand: result,
        }
    }
}

/// The conversions wrapped around an assignment target, innermost first, as
/// `(from, to)` pairs.
fn conversions(expr: &Expr) -> Vec<(&Type, &Type)> {
    let mut chain = Vec::new();
    let mut current = expr;
    while let ExprKind::Cast { expr: inner, .. } = &current.kind {
        chain.push((&inner.ty, &current.ty));
        current = inner;
    }
    chain.reverse();
    chain
}

fn load_opcode(ty: &Type) -> Option<Opcode> {
    match ty {
        Type::Basic(Basic { width, unsigned }) => Some(match (width, unsigned) {
            (Width::Byte, false) => Opcode::LoadByte,
            (Width::Byte, true) => Opcode::LoadByteUnsigned,
            (Width::HalfWord, false) => Opcode::LoadHalfWord,
            (Width::HalfWord, true) => Opcode::LoadHalfWordUnsigned,
            (Width::Word, _) => Opcode::LoadWord,
        }),
        Type::Pointer(_) => Some(Opcode::LoadWord),
        _ => None,
    }
}

fn store_opcode(ty: &Type) -> Opcode {
    match ty.value_width() {
        Some(1) => Opcode::StoreByte,
        Some(2) => Opcode::StoreHalfWord,
        Some(_) => Opcode::StoreWord,
        None => unreachable!("store to an object of type {ty}"),
    }
}

fn relational_opcode(op: BinaryOperator, unsigned: bool) -> Opcode {
    use BinaryOperator::*;
    match (op, unsigned) {
        (Lt, false) => Opcode::Less,
        (Lt, true) => Opcode::LessUnsigned,
        (Le, false) => Opcode::LessEqual,
        (Le, true) => Opcode::LessEqualUnsigned,
        (Gt, false) => Opcode::Greater,
        (Gt, true) => Opcode::GreaterUnsigned,
        (Ge, false) => Opcode::GreaterEqual,
        (Ge, true) => Opcode::GreaterEqualUnsigned,
        (Eq, _) => Opcode::Equal,
        (Ne, _) => Opcode::NotEqual,
        _ => unreachable!("{} is not a relational operator", op.symbol()),
    }
}

fn arithmetic_opcode(op: BinaryOperator, unsigned: bool) -> Opcode {
    use BinaryOperator::*;
    match (op, unsigned) {
        (Mul, false) => Opcode::Multiply,
        (Mul, true) => Opcode::MultiplyUnsigned,
        (Div, false) => Opcode::Divide,
        (Div, true) => Opcode::DivideUnsigned,
        (Mod, false) => Opcode::Mod,
        (Mod, true) => Opcode::ModUnsigned,
        (Add, false) => Opcode::Add,
        (Add, true) => Opcode::AddUnsigned,
        (Sub, false) => Opcode::Subtract,
        (Sub, true) => Opcode::SubtractUnsigned,
        (Shl, _) => Opcode::ShiftLeft,
        (Shr, false) => Opcode::ShiftRight,
        (Shr, true) => Opcode::ShiftRightUnsigned,
        (BitAnd, _) => Opcode::BitAnd,
        (BitXor, _) => Opcode::Xor,
        (BitOr, _) => Opcode::BitOr,
        (Lt | Le | Gt | Ge | Eq | Ne | LogAnd | LogOr, _) => {
            unreachable!("{} is not an arithmetic operator", op.symbol())
        }
    }
}

fn immediate(n: usize) -> Operand {
    Operand::Immediate(i64::try_from(n).unwrap_or(i64::MAX))
}
