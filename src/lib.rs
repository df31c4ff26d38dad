/// The input tree: declarations, statements and expressions as a front end
/// produces them.
pub mod ast;

/// The checked tree. Every expression carries its type and every name its
/// symbol.
pub mod typed;

pub mod error;
pub mod symbols;
pub mod types;

/// State shared by the passes of one compilation.
pub mod context;

/// The type checker resolves names against the symbol table, checks the
/// soundness of every declaration and expression, and maps the input tree
/// into a typed tree.
pub mod type_checker;

/// Three-address instructions, kept in an arena of linked sections.
pub mod ir;

/// The IR generator lowers a typed tree into a linear sequence of
/// three-address instructions.
pub mod ir_gen;

pub mod codegen {
    /// Maps IR onto MIPS32 assembly.
    pub mod mips;
    pub mod runtime;
}

pub mod util {
    pub mod fmt;
    pub mod intern;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

use crate::{context::CompilationContext, error::Pass};

/// Runs every pass over `unit`, returning the assembly listing.
///
/// Stops after the first pass that reports errors and returns that pass. The
/// diagnostics stay in `ctx`.
pub fn compile(ctx: &mut CompilationContext, unit: &ast::TranslationUnit) -> Result<String, Pass> {
    let program = type_checker::check(ctx, unit);
    for pass in [Pass::Symbol, Pass::Type] {
        if ctx.error_count(pass) > 0 {
            tracing::debug!(?pass, errors = ctx.error_count(pass), "compilation stopped");
            return Err(pass);
        }
    }

    let ir = ir_gen::generate(ctx, &program);
    if ctx.error_count(Pass::Codegen) > 0 {
        tracing::debug!(errors = ctx.error_count(Pass::Codegen), "compilation stopped");
        return Err(Pass::Codegen);
    }

    Ok(codegen::mips::emit_string(ctx, &ir))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::{build::Builder, BinaryOperator::*, TypeSpecifier as Spec};

    fn factorial_program(b: &Builder<'_>) -> ast::TranslationUnit {
        b.unit(vec![
            b.global(Spec::VOID, vec![b.func(b.var("print_number"), vec![b.param(Spec::INT, b.var("n"))])]),
            b.function(
                Spec::INT,
                b.func(b.var("fact"), vec![b.param(Spec::INT, b.var("n"))]),
                vec![
                    b.if_(b.bin(Le, b.id("n"), b.num(1)), b.ret(Some(b.num(1))), None),
                    b.ret(Some(b.bin(
                        Mul,
                        b.id("n"),
                        b.call("fact", vec![b.bin(Sub, b.id("n"), b.num(1))]),
                    ))),
                ],
            ),
            b.function(
                Spec::INT,
                b.func(b.var("main"), vec![]),
                vec![
                    b.expr_stmt(b.call("print_number", vec![b.call("fact", vec![b.num(5)])])),
                    b.ret(Some(b.num(0))),
                ],
            ),
        ])
    }

    #[test]
    fn compiles_factorial() {
        let mut ctx = CompilationContext::new();
        let unit = factorial_program(&Builder::new(&mut ctx.interner));
        let asm = compile(&mut ctx, &unit).unwrap();

        assert!(ctx.errors().is_empty());
        let labels: Vec<_> = asm.lines().filter(|line| line.ends_with(':')).collect();
        assert_eq!(
            labels,
            [
                "fact:",
                "_GeneratedLabel_0:",
                "_Epilogue_fact:",
                "main:",
                "_Epilogue_main:",
                "print_number:",
            ]
        );
        assert!(asm.starts_with(".data\n"));
        assert!(asm.contains("\n.globl main\n"));
    }

    #[test]
    fn stops_at_the_failing_pass() {
        let mut ctx = CompilationContext::new();
        let unit = {
            let b = Builder::new(&mut ctx.interner);
            b.unit(vec![b.function(
                Spec::INT,
                b.func(b.var("main"), vec![]),
                vec![b.ret(Some(b.id("missing")))],
            )])
        };
        assert_eq!(compile(&mut ctx, &unit), Err(Pass::Symbol));
        assert_eq!(ctx.formatted_errors(), ["line 1: identifier 'missing' has not been declared"]);

        let mut ctx = CompilationContext::new();
        let unit = {
            let b = Builder::new(&mut ctx.interner);
            b.unit(vec![b.function(
                Spec::INT,
                b.func(b.var("main"), vec![]),
                vec![b.break_()],
            )])
        };
        assert_eq!(compile(&mut ctx, &unit), Err(Pass::Codegen));
        assert_eq!(ctx.formatted_errors(), ["line 1: cannot break from outside of a loop"]);
    }
}
