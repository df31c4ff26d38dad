use std::{
    env,
    error::Error,
    fs,
    io::{self, Write},
    process::ExitCode,
};

use minic::{
    ast::{build::Builder, BinaryOperator::*, TranslationUnit, TypeSpecifier as Spec},
    compile,
    context::CompilationContext,
    util::fmt::symbols::print_symbols_string,
};

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("failed to run: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Compiles the demo program, writing the assembly to the path given as an
/// argument or to stdout. Diagnostics go to stderr, as does the symbol table
/// when `--symbols` is passed.
fn run() -> Result<bool, Box<dyn Error>> {
    let (flags, paths): (Vec<_>, Vec<_>) = env::args().skip(1).partition(|arg| arg.starts_with("--"));
    let dump_symbols = flags.iter().any(|flag| flag == "--symbols");

    let mut ctx = CompilationContext::with_diagnostics(io::stderr());
    let unit = demo(&Builder::new(&mut ctx.interner));

    let result = compile(&mut ctx, &unit);
    if dump_symbols {
        eprint!("{}", print_symbols_string(&ctx.interner, &ctx.symbols));
    }
    let Ok(asm) = result else {
        eprintln!("errors: {}", ctx.error_summary());
        return Ok(false);
    };

    match paths.into_iter().next() {
        Some(path) => fs::write(path, asm)?,
        None => io::stdout().write_all(asm.as_bytes())?,
    }
    Ok(true)
}

/// Prints the factorials of the numbers read until a non-positive one.
fn demo(b: &Builder<'_>) -> TranslationUnit {
    b.unit(vec![
        b.global(Spec::VOID, vec![b.func(b.var("print_number"), vec![b.param(Spec::INT, b.var("n"))])]),
        b.global(Spec::VOID, vec![b.func(b.var("print_string"), vec![b.param(Spec::CHAR, b.ptr(b.var("s")))])]),
        b.global(Spec::INT, vec![b.func(b.var("read_number"), vec![])]),
        b.at(5).function(
            Spec::INT,
            b.func(b.var("fact"), vec![b.param(Spec::INT, b.var("n"))]),
            vec![
                b.at(6).if_(b.bin(Le, b.id("n"), b.num(1)), b.ret(Some(b.num(1))), None),
                b.at(7).ret(Some(b.bin(
                    Mul,
                    b.id("n"),
                    b.call("fact", vec![b.bin(Sub, b.id("n"), b.num(1))]),
                ))),
            ],
        ),
        b.at(10).function(
            Spec::INT,
            b.func(b.var("main"), vec![]),
            vec![
                b.at(11).decl(Spec::INT, vec![b.var("n")]),
                b.at(12).while_(
                    b.bin(Gt, b.assign(b.id("n"), b.call("read_number", vec![])), b.num(0)),
                    b.block(vec![
                        b.at(13).expr_stmt(b.call("print_number", vec![b.call("fact", vec![b.id("n")])])),
                        b.at(14).expr_stmt(b.call("print_string", vec![b.string("\n")])),
                    ]),
                ),
                b.at(16).ret(Some(b.num(0))),
            ],
        ),
    ])
}
