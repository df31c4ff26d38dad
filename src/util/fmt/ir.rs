use std::io::Write;

use crate::{
    ir::{Arena, Instruction, Operand, Program, Section},
    util::{
        fmt::{Show, ShowContext},
        intern::Interner,
    },
};

pub fn print_program_string(idents: &Interner, program: &Program) -> String {
    print_section_string(idents, &program.arena, &program.body)
}

pub fn print_section_string(idents: &Interner, arena: &Arena, section: &Section) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_section(&mut buf, idents, arena, section).unwrap();
    String::from_utf8(buf).unwrap()
}

/// Writes one instruction per line, as `OPCODE op, op, op`.
pub fn print_section(
    w: &mut impl Write,
    idents: &Interner,
    arena: &Arena,
    section: &Section,
) -> std::io::Result<()> {
    let ctx = ShowContext { interner: idents };
    for instr in arena.iter(section) {
        writeln!(w, "{}", instr.display(&ctx))?;
    }
    Ok(())
}

impl Show for Instruction {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &ShowContext<'_>) -> std::fmt::Result {
        f.write_str(self.opcode.name())?;
        for (i, operand) in self.operands().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{}", operand.display(ctx))?;
        }
        Ok(())
    }
}

impl Show for Operand {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &ShowContext<'_>) -> std::fmt::Result {
        match self {
            Operand::Immediate(value) => write!(f, "{value}"),
            Operand::Temporary(t) => write!(f, "t{}", t.0),
            Operand::FrameSlot(offset) => write!(f, "{offset}($fp)"),
            Operand::Label(name) => f.write_str(ctx.interner.get(name)),
        }
    }
}
