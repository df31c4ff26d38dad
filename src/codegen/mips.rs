//! MIPS32 emission.
//!
//! Temporaries aren't allocated. Each sequence point resets the window that
//! maps them onto `$8`-`$23`, so the temporaries of one statement must fit in
//! those sixteen registers and none may outlive its statement.
//!
//! Frames grow the IR frame by a save area for the sixteen registers, which
//! every function saves and restores whole:
//!
//! ```text
//! $fp + 0 .. 16            parameter home slots
//! $fp + 16, $fp + 20       saved $fp, $ra
//! $fp + 56 .. frame        locals
//! $fp + frame .. frame+64  saved $8-$23
//! ```

use std::{fmt, format_args as f, io};

use crate::{
    codegen::runtime::BUILTINS,
    context::CompilationContext,
    ir::{self, Instruction, Opcode, Operand},
    ir_gen::{GLOBAL_LABEL_PREFIX, MAX_CALL_ARGUMENTS},
    symbols::{parameter_offset, Storage, SymbolTable},
    util::intern::Interned,
};

pub const FIRST_USABLE_REGISTER: i64 = 8;
pub const LAST_USABLE_REGISTER: i64 = 23;

const SAVE_AREA: i64 = (LAST_USABLE_REGISTER - FIRST_USABLE_REGISTER + 1) * 4;
const SAVED_FP_OFFSET: i64 = 16;
const SAVED_RA_OFFSET: i64 = 20;

pub fn emit(writer: impl io::Write, ctx: &CompilationContext, program: &ir::Program) {
    Generator::new(writer, ctx).generate(program);
}

pub fn emit_string(ctx: &CompilationContext, program: &ir::Program) -> String {
    let mut buf = Vec::with_capacity(4096);
    emit(&mut buf, ctx, program);
    String::from_utf8(buf).unwrap()
}

pub struct Generator<'a, W> {
    writer: W,
    ctx: &'a CompilationContext,
    indent: bool,
    /// Payload of the last sequence point: the id of the temporary that maps
    /// to the first usable register.
    register_offset: i64,
    /// Name and IR frame size of the function being emitted.
    function: Option<(&'a str, i64)>,
}

impl<'a, W> Generator<'a, W>
where
    W: io::Write,
{
    pub fn new(writer: W, ctx: &'a CompilationContext) -> Generator<'a, W> {
        Generator {
            writer,
            ctx,
            indent: false,
            register_offset: 0,
            function: None,
        }
    }

    pub fn generate(mut self, program: &ir::Program) {
        self.g_data();
        self.out(".text");
        self.out(f!(".globl main"));

        let mut functions = 0;
        for instruction in program.instructions() {
            if instruction.opcode == Opcode::ProcBegin {
                functions += 1;
            }
            self.g_instruction(instruction);
        }
        self.g_builtins(program);

        tracing::debug!(functions, "emitted assembly");
    }
}

/// Sections.
impl<'a, W> Generator<'a, W>
where
    W: io::Write,
{
    fn g_data(&mut self) {
        let ctx = self.ctx;
        self.out(".data");
        for (label, value) in ctx.strings() {
            let label = self.name(label);
            self.out(f!("{label}: .asciiz \"{}\"", Escaped(value)));
        }
        for (_, symbol) in ctx.symbols.symbols_in(SymbolTable::GLOBAL) {
            if symbol.storage != Some(Storage::Global) {
                continue;
            }
            let Some(layout) = symbol.ty.layout() else {
                continue;
            };
            let name = self.name(symbol.name);
            self.out(".align 2");
            self.out(f!("{GLOBAL_LABEL_PREFIX}{name}: .space {}", layout.size));
        }
        self.out_line();
    }

    /// Appends a syscall stub for every builtin the program calls but doesn't
    /// define, in order of first call.
    fn g_builtins(&mut self, program: &ir::Program) {
        let mut called = Vec::new();
        let mut defined = Vec::new();
        for instruction in program.instructions() {
            match instruction.opcode {
                Opcode::Call => {
                    let name = self.label(instruction.operand(0));
                    if !called.contains(&name) {
                        called.push(name);
                    }
                }
                Opcode::ProcBegin => defined.push(self.label(instruction.operand(0))),
                _ => {}
            }
        }

        for name in called {
            if defined.contains(&name) {
                continue;
            }
            let Some(code) = BUILTINS.get(name) else {
                continue;
            };
            self.out_line();
            self.out(f!("{name}:"));
            self.indented(|this| {
                this.out(f!("li {V0}, {code}"));
                this.out("syscall");
                this.out(f!("jr {RA}"));
            });
        }
    }
}

/// Instructions.
impl<'a, W> Generator<'a, W>
where
    W: io::Write,
{
    fn g_instruction(&mut self, instruction: &Instruction) {
        use Opcode::*;
        let op = |i| instruction.operand(i);
        let m = mnemonic(instruction.opcode);
        match instruction.opcode {
            Nop => self.out(m),
            Add | AddUnsigned | Subtract | SubtractUnsigned | ShiftLeft | ShiftRight
            | ShiftRightUnsigned | Xor | BitAnd | BitOr | Less | LessEqual | Greater
            | GreaterEqual | Equal | NotEqual | LessUnsigned | LessEqualUnsigned
            | GreaterUnsigned | GreaterEqualUnsigned => {
                let (d, s, t) = (self.reg(op(0)), self.reg(op(1)), self.reg(op(2)));
                self.out(f!("{m} {d}, {s}, {t}"));
            }
            Multiply | MultiplyUnsigned | Divide | DivideUnsigned | Mod | ModUnsigned => {
                let (d, s, t) = (self.reg(op(0)), self.reg(op(1)), self.reg(op(2)));
                let extract = if matches!(instruction.opcode, Mod | ModUnsigned) {
                    "mfhi"
                } else {
                    "mflo"
                };
                self.out(f!("{m} {s}, {t}"));
                self.out(f!("{extract} {d}"));
            }
            LoadImmediate => {
                let d = self.reg(op(0));
                let value = immediate(op(1));
                self.out(f!("{m} {d}, {value}"));
            }
            Copy | Positive | BitNot | Negate | ByteToHalfWord | ByteToWord | HalfWordToWord => {
                let (d, s) = (self.reg(op(0)), self.reg(op(1)));
                self.out(f!("{m} {d}, {s}"));
            }
            LogicalNot => {
                let (d, s) = (self.reg(op(0)), self.reg(op(1)));
                self.out(f!("{m} {d}, {s}, {ZERO}"));
            }
            HalfWordToByte | WordToByte | WordToHalfWord => {
                let (d, s) = (self.reg(op(0)), self.reg(op(1)));
                let shift = if instruction.opcode == WordToHalfWord { 16 } else { 24 };
                self.out(f!("{m} {d}, {s}, {shift}"));
                self.out(f!("sra {d}, {d}, {shift}"));
            }
            HalfWordToByteUnsigned | WordToByteUnsigned | WordToHalfWordUnsigned => {
                let (d, s) = (self.reg(op(0)), self.reg(op(1)));
                let mask = if instruction.opcode == WordToHalfWordUnsigned {
                    "0xffff"
                } else {
                    "0xff"
                };
                self.out(f!("{m} {d}, {s}, {mask}"));
            }
            LoadByte | LoadByteUnsigned | LoadHalfWord | LoadHalfWordUnsigned | LoadWord => {
                let (d, address) = (self.reg(op(0)), self.address(op(1)));
                self.out(f!("{m} {d}, {address}"));
            }
            StoreByte | StoreHalfWord | StoreWord => {
                let (value, address) = (self.reg(op(0)), self.address(op(1)));
                self.out(f!("{m} {value}, {address}"));
            }
            AddressOf => {
                let d = self.reg(op(0));
                match op(1) {
                    Operand::FrameSlot(offset) => self.out(f!("addiu {d}, {FP}, {offset}")),
                    Operand::Label(label) => {
                        let label = self.name(label);
                        self.out(f!("{m} {d}, {label}"));
                    }
                    temporary => {
                        let s = self.reg(temporary);
                        self.out(f!("move {d}, {s}"));
                    }
                }
            }
            Parameter => {
                let (index, value) = (immediate(op(0)), self.reg(op(1)));
                self.out(f!("{m} {}, {value}", Reg::argument(index)));
            }
            Call => {
                let name = self.label(op(0));
                self.out(f!("{m} {name}"));
            }
            ResultByte | ResultWord => {
                let d = self.reg(op(0));
                self.out(f!("{m} {d}, {V0}"));
            }
            Label => {
                let label = self.label(op(0));
                self.out_label(label);
            }
            Goto => {
                let label = self.label(op(0));
                self.out(f!("{m} {label}"));
            }
            GotoIfFalse | GotoIfTrue => {
                let (condition, label) = (self.reg(op(0)), self.label(op(1)));
                self.out(f!("{m} {condition}, {label}"));
            }
            Return => {
                let value = self.reg(op(0));
                self.out(f!("{m} {V0}, {value}"));
                self.g_jump_to_epilogue();
            }
            ReturnVoid => self.g_jump_to_epilogue(),
            ProcBegin => {
                let name = self.label(op(0));
                let frame_size = immediate(op(1));
                let param_count = immediate(op(2));
                self.g_prologue(name, frame_size, param_count);
            }
            ProcEnd => self.g_epilogue(),
            SequencePoint => self.register_offset = immediate(op(0)),
        }
    }

    fn g_prologue(&mut self, name: &'a str, frame_size: i64, param_count: i64) {
        self.function = Some((name, frame_size));
        self.out_line();
        self.out(f!("{name}:"));
        self.indent = true;

        let stack_size = frame_size + SAVE_AREA;
        self.out(f!("addiu {SP}, {SP}, -{stack_size}"));
        self.out(f!("sw {FP}, {SAVED_FP_OFFSET}({SP})"));
        self.out(f!("sw {RA}, {SAVED_RA_OFFSET}({SP})"));
        self.out(f!("move {FP}, {SP}"));
        let homed = usize::try_from(param_count).map_or(0, |count| count.min(MAX_CALL_ARGUMENTS));
        for (index, register) in (0..homed).zip(4..) {
            self.out(f!("sw {}, {}({FP})", Reg(register), parameter_offset(index)));
        }
        for register in FIRST_USABLE_REGISTER..=LAST_USABLE_REGISTER {
            let offset = save_slot(frame_size, register);
            self.out(f!("sw {}, {offset}({FP})", Reg(register)));
        }
    }

    fn g_epilogue(&mut self) {
        let Some((name, frame_size)) = self.function.take() else {
            unreachable!("procedure end without a beginning");
        };
        self.indent = false;
        self.out_line();
        self.out(f!("{}:", Epilogue(name)));
        self.indent = true;

        for register in FIRST_USABLE_REGISTER..=LAST_USABLE_REGISTER {
            let offset = save_slot(frame_size, register);
            self.out(f!("lw {}, {offset}({FP})", Reg(register)));
        }
        self.out(f!("move {SP}, {FP}"));
        self.out(f!("lw {RA}, {SAVED_RA_OFFSET}({SP})"));
        self.out(f!("lw {FP}, {SAVED_FP_OFFSET}({SP})"));
        self.out(f!("addiu {SP}, {SP}, {}", frame_size + SAVE_AREA));
        self.out(f!("jr {RA}"));
        self.indent = false;
    }

    fn g_jump_to_epilogue(&mut self) {
        let Some((name, _)) = self.function else {
            unreachable!("return outside of a procedure");
        };
        self.out(f!("b {}", Epilogue(name)));
    }
}

/// Utility functions.
impl<'a, W> Generator<'a, W>
where
    W: io::Write,
{
    /// Prints a line.
    fn out(&mut self, f: impl fmt::Display) {
        let indent = if self.indent { "    " } else { "" };
        writeln!(self.writer, "{indent}{f}").expect("Failed to write to sink");
    }

    /// Prints an empty line.
    fn out_line(&mut self) {
        writeln!(self.writer).expect("Failed to write to sink");
    }

    /// Prints an unindented label, preceded by an empty line.
    fn out_label(&mut self, label: &str) {
        self.out_line();
        writeln!(self.writer, "{label}:").expect("Failed to write to sink");
    }

    /// Writes in an indented block.
    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.indent = true;
        let res = f(self);
        self.indent = false;
        res
    }

    fn name(&self, handle: impl Into<Interned>) -> &'a str {
        let ctx: &'a CompilationContext = self.ctx;
        ctx.interner.get(handle)
    }

    fn label(&self, operand: Operand) -> &'a str {
        match operand {
            Operand::Label(label) => self.name(label),
            other => unreachable!("{other:?} is not a label"),
        }
    }

    /// The physical register of a temporary under the current window.
    fn reg(&self, operand: Operand) -> Reg {
        match operand {
            Operand::Temporary(temporary) => {
                let register =
                    i64::from(temporary.0) + FIRST_USABLE_REGISTER - self.register_offset;
                if !(FIRST_USABLE_REGISTER..=LAST_USABLE_REGISTER).contains(&register) {
                    tracing::warn!(
                        temporary = temporary.0,
                        register,
                        "temporary outside of the register window"
                    );
                }
                Reg(register)
            }
            Operand::Immediate(0) => ZERO,
            other => unreachable!("{other:?} is not a register"),
        }
    }

    fn address(&self, operand: Operand) -> Address<'a> {
        match operand {
            Operand::FrameSlot(offset) => Address::Frame(i64::from(offset)),
            Operand::Label(label) => Address::Label(self.name(label)),
            register => Address::Indirect(self.reg(register)),
        }
    }
}

fn immediate(operand: Operand) -> i64 {
    match operand {
        Operand::Immediate(value) => value,
        other => unreachable!("{other:?} is not an immediate"),
    }
}

/// Offset from `$fp` at which `register` is saved.
fn save_slot(frame_size: i64, register: i64) -> i64 {
    frame_size + (register - FIRST_USABLE_REGISTER) * 4
}

/// Mnemonic of the main instruction each opcode emits.
const fn mnemonic(opcode: Opcode) -> &'static str {
    use Opcode::*;
    match opcode {
        Nop => "nop",
        Multiply => "mult",
        MultiplyUnsigned => "multu",
        Divide | Mod => "div",
        DivideUnsigned | ModUnsigned => "divu",
        Add => "add",
        AddUnsigned => "addu",
        Subtract => "sub",
        SubtractUnsigned => "subu",
        LoadImmediate => "li",
        Copy | Positive | ByteToHalfWord | ByteToWord | HalfWordToWord => "move",
        ShiftLeft => "sllv",
        ShiftRight => "srav",
        ShiftRightUnsigned => "srlv",
        Xor => "xor",
        BitAnd => "and",
        BitOr => "or",
        Less => "slt",
        LessEqual => "sle",
        Greater => "sgt",
        GreaterEqual => "sge",
        Equal | LogicalNot => "seq",
        NotEqual => "sne",
        BitNot => "not",
        Negate => "neg",
        LoadByte => "lb",
        LoadByteUnsigned => "lbu",
        LoadHalfWord => "lh",
        LoadHalfWordUnsigned => "lhu",
        LoadWord => "lw",
        AddressOf => "la",
        StoreByte => "sb",
        StoreHalfWord => "sh",
        StoreWord => "sw",
        HalfWordToByte | WordToByte | WordToHalfWord => "sll",
        HalfWordToByteUnsigned | WordToByteUnsigned | WordToHalfWordUnsigned => "andi",
        LessUnsigned => "sltu",
        LessEqualUnsigned => "sleu",
        GreaterUnsigned => "sgtu",
        GreaterEqualUnsigned => "sgeu",
        Parameter | ResultByte | ResultWord | Return => "move",
        Call => "jal",
        Goto | ReturnVoid => "b",
        GotoIfFalse => "beqz",
        GotoIfTrue => "bnez",
        ProcBegin => "addiu",
        ProcEnd => "jr",
        Label | SequencePoint => "",
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
struct Reg(i64);

const ZERO: Reg = Reg(0);
const V0: Reg = Reg(2);
const SP: Reg = Reg(29);
const FP: Reg = Reg(30);
const RA: Reg = Reg(31);

impl Reg {
    const fn argument(index: i64) -> Reg {
        Reg(4 + index)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("$0"),
            2 => f.write_str("$v0"),
            n @ 4..=7 => write!(f, "$a{}", n - 4),
            29 => f.write_str("$sp"),
            30 => f.write_str("$fp"),
            31 => f.write_str("$ra"),
            n => write!(f, "${n}"),
        }
    }
}

enum Address<'a> {
    Indirect(Reg),
    Frame(i64),
    Label(&'a str),
}

impl fmt::Display for Address<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Indirect(register) => write!(f, "0({register})"),
            Address::Frame(offset) => write!(f, "{offset}({FP})"),
            Address::Label(label) => f.write_str(label),
        }
    }
}

struct Epilogue<'a>(&'a str);

impl fmt::Display for Epilogue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_Epilogue_{}", self.0)
    }
}

/// A string literal as `.asciiz` spells it.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '\n' => f.write_str("\\n")?,
                '\t' => f.write_str("\\t")?,
                '\0' => f.write_str("\\0")?,
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                c if c.is_ascii_control() => write!(f, "\\x{:02x}", u32::from(c))?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::{build::Builder, BinaryOperator::*, Declarator, TypeSpecifier as Spec},
        util::test_utils::{ir_tests, run_pipeline, Stage},
    };

    #[test]
    fn register_names() {
        assert_eq!(Reg(8).to_string(), "$8");
        assert_eq!(Reg::argument(3).to_string(), "$a3");
        assert_eq!(Address::Indirect(Reg(9)).to_string(), "0($9)");
        assert_eq!(Address::Frame(-4).to_string(), "-4($fp)");
        assert_eq!(Escaped("a\"b\n").to_string(), "a\\\"b\\n");
        assert_eq!(Escaped("\x07bell\x1b").to_string(), "\\x07bell\\x1b");
    }

    #[test]
    fn defined_builtins_get_no_stub() {
        let (asm, errors) = run_pipeline(Stage::Assembly, |b: &Builder<'_>| {
            b.unit(vec![
                b.function(
                    Spec::VOID,
                    b.func(b.var("print_number"), vec![b.param(Spec::INT, b.var("n"))]),
                    vec![],
                ),
                b.function(
                    Spec::INT,
                    b.func(b.var("main"), vec![]),
                    vec![
                        b.expr_stmt(b.call("print_number", vec![b.num(7)])),
                        b.ret(Some(b.num(0))),
                    ],
                ),
            ])
        });
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(asm.matches("\nprint_number:").count(), 1);
        assert!(!asm.contains("syscall"));
    }

    ir_tests! {
        use mips;

        fn minimal_function() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::INT,
                b.func(b.var("main"), vec![b.param(Spec::VOID, Declarator::Abstract)]),
                vec![b.ret(Some(b.num(0)))],
            )]);
            let listing_ok = "
                .data

                .text
                .globl main

                main:
                    addiu $sp, $sp, -120
                    sw $fp, 16($sp)
                    sw $ra, 20($sp)
                    move $fp, $sp
                    sw $8, 56($fp)
                    sw $9, 60($fp)
                    sw $10, 64($fp)
                    sw $11, 68($fp)
                    sw $12, 72($fp)
                    sw $13, 76($fp)
                    sw $14, 80($fp)
                    sw $15, 84($fp)
                    sw $16, 88($fp)
                    sw $17, 92($fp)
                    sw $18, 96($fp)
                    sw $19, 100($fp)
                    sw $20, 104($fp)
                    sw $21, 108($fp)
                    sw $22, 112($fp)
                    sw $23, 116($fp)
                    li $8, 0
                    move $v0, $8
                    b _Epilogue_main

                _Epilogue_main:
                    lw $8, 56($fp)
                    lw $9, 60($fp)
                    lw $10, 64($fp)
                    lw $11, 68($fp)
                    lw $12, 72($fp)
                    lw $13, 76($fp)
                    lw $14, 80($fp)
                    lw $15, 84($fp)
                    lw $16, 88($fp)
                    lw $17, 92($fp)
                    lw $18, 96($fp)
                    lw $19, 100($fp)
                    lw $20, 104($fp)
                    lw $21, 108($fp)
                    lw $22, 112($fp)
                    lw $23, 116($fp)
                    move $sp, $fp
                    lw $ra, 20($sp)
                    lw $fp, 16($sp)
                    addiu $sp, $sp, 120
                    jr $ra
            ";
        }

        fn factorial() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::INT,
                b.func(b.var("fact"), vec![b.param(Spec::INT, b.var("n"))]),
                vec![b.ret(Some(b.ternary(
                    b.bin(Le, b.id("n"), b.num(1)),
                    b.num(1),
                    b.bin(Mul, b.id("n"), b.call("fact", vec![b.bin(Sub, b.id("n"), b.num(1))])),
                )))],
            )]);
            let listing_contains = &[
                "fact:",
                "addiu $sp, $sp, -120",
                "sw $a0, 0($fp)",
                "sw $8, 56($fp)",
                "sw $23, 116($fp)",
                "sle $11, $9, $10",
                "beqz $11, _GeneratedLabel_0",
                "jal fact",
                "move $20, $v0",
                "mult $15, $20",
                "mflo $21",
                "move $12, $21",
                "move $v0, $12",
                "b _Epilogue_fact",
                "_Epilogue_fact:",
                "lw $8, 56($fp)",
                "lw $23, 116($fp)",
                "lw $ra, 20($sp)",
                "lw $fp, 16($sp)",
                "jr $ra",
            ];
        }

        fn registers_are_reused_across_statements() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::INT,
                b.func(b.var("f"), vec![]),
                vec![
                    b.decl(Spec::INT, vec![b.var("a")]),
                    b.expr_stmt(b.assign(b.id("a"), b.num(1))),
                    b.expr_stmt(b.assign(b.id("a"), b.num(2))),
                    b.ret(Some(b.id("a"))),
                ],
            )]);
            let listing_contains = &[
                "addiu $sp, $sp, -128",
                "nop",
                "li $8, 1",
                "addiu $9, $fp, 56",
                "sw $8, 0($9)",
                "li $8, 2",
                "addiu $9, $fp, 56",
                "sw $8, 0($9)",
                "addiu $8, $fp, 56",
                "lw $9, 0($8)",
                "move $v0, $9",
            ];
        }

        fn data_section() {
            let program = |b: &Builder<'_>| b.unit(vec![
                b.global(Spec::INT, vec![b.var("g")]),
                b.global(Spec::CHAR, vec![b.array(b.var("buf"), Some(b.num(10)))]),
                b.function(
                    Spec::CHAR,
                    b.ptr(b.func(b.var("f"), vec![])),
                    vec![
                        b.expr_stmt(b.assign(b.id("g"), b.num(1))),
                        b.ret(Some(b.string("a\"b\n"))),
                    ],
                ),
            ]);
            let listing_contains = &[
                ".data",
                r#"_StringLabel_0: .asciiz "a\"b\n""#,
                ".align 2",
                "_Global_g: .space 4",
                ".align 2",
                "_Global_buf: .space 10",
                ".text",
                ".globl main",
                "li $8, 1",
                "la $9, _Global_g",
                "sw $8, 0($9)",
                "la $8, _StringLabel_0",
            ];
        }

        fn narrowing_and_remainder() {
            let program = |b: &Builder<'_>| b.unit(vec![
                b.function(
                    Spec::CHAR,
                    b.func(b.var("narrow"), vec![b.param(Spec::INT, b.var("x"))]),
                    vec![b.ret(Some(b.id("x")))],
                ),
                b.function(
                    Spec::INT,
                    b.func(b.var("rem"), vec![
                        b.param(Spec::INT, b.var("a")),
                        b.param(Spec::INT, b.var("b")),
                    ]),
                    vec![b.ret(Some(b.bin(Mod, b.id("a"), b.id("b"))))],
                ),
            ]);
            let listing_contains = &[
                "narrow:",
                "addiu $8, $fp, 0",
                "lw $9, 0($8)",
                "sll $10, $9, 24",
                "sra $10, $10, 24",
                "move $v0, $10",
                "rem:",
                "sw $a1, 4($fp)",
                "div $9, $11",
                "mfhi $12",
            ];
        }

        fn unsigned_compares_and_narrowing() {
            let program = |b: &Builder<'_>| b.unit(vec![b.function(
                Spec::INT,
                b.func(b.var("f"), vec![]),
                vec![
                    b.decl(Spec::UNSIGNED_CHAR, vec![b.var("uc")]),
                    b.decl(Spec::UNSIGNED_INT, vec![b.var("u"), b.var("v")]),
                    b.expr_stmt(b.assign(b.id("uc"), b.num(200))),
                    b.ret(Some(b.bin(Lt, b.id("u"), b.id("v")))),
                ],
            )]);
            let listing_contains = &[
                "addiu $sp, $sp, -136",
                "li $8, 200",
                "andi $9, $8, 0xff",
                "addiu $10, $fp, 56",
                "sb $9, 0($10)",
                "lw $9, 0($8)",
                "lw $11, 0($10)",
                "sltu $12, $9, $11",
                "move $v0, $12",
            ];
        }

        fn builtin_stubs() {
            let program = |b: &Builder<'_>| b.unit(vec![
                b.global(Spec::VOID, vec![b.func(b.var("print_number"), vec![b.param(Spec::INT, Declarator::Abstract)])]),
                b.global(Spec::INT, vec![b.func(b.var("read_number"), vec![b.param(Spec::VOID, Declarator::Abstract)])]),
                b.function(
                    Spec::INT,
                    b.func(b.var("main"), vec![]),
                    vec![
                        b.expr_stmt(b.call("print_number", vec![b.call("read_number", vec![])])),
                        b.ret(Some(b.num(0))),
                    ],
                ),
            ]);
            let listing_contains = &[
                "jal read_number",
                "move $8, $v0",
                "move $a0, $8",
                "jal print_number",
                "li $8, 0",
                "read_number:",
                "li $v0, 5",
                "syscall",
                "jr $ra",
                "print_number:",
                "li $v0, 1",
                "syscall",
                "jr $ra",
            ];
        }
    }
}
