use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use minic::{
    ast::{build::Builder, BinaryOperator::*, ExternalDecl, TranslationUnit, TypeSpecifier as Spec},
    compile,
    context::CompilationContext,
};
use std::hint::black_box;

const FUNCTIONS: usize = 200;

/// A unit of `FUNCTIONS` functions, each looping over a local array and
/// calling the previous one.
fn build(b: &Builder<'_>) -> TranslationUnit {
    let mut items: Vec<ExternalDecl> = Vec::with_capacity(FUNCTIONS);
    for i in 0..FUNCTIONS {
        let name = format!("f{i}");
        let mut body = vec![
            b.decl(Spec::INT, vec![b.var("i"), b.var("acc")]),
            b.decl(Spec::CHAR, vec![b.array(b.var("buf"), Some(b.num(16)))]),
            b.expr_stmt(b.assign(b.id("acc"), b.id("n"))),
            b.for_(
                Some(b.assign(b.id("i"), b.num(0))),
                Some(b.bin(Lt, b.id("i"), b.num(16))),
                Some(b.compound(Add, b.id("i"), b.num(1))),
                b.block(vec![
                    b.expr_stmt(b.assign(b.index(b.id("buf"), b.id("i")), b.id("i"))),
                    b.expr_stmt(b.compound(
                        Add,
                        b.id("acc"),
                        b.bin(Mul, b.index(b.id("buf"), b.id("i")), b.num(3)),
                    )),
                ]),
            ),
        ];
        if i > 0 {
            let previous = format!("f{}", i - 1);
            body.push(b.expr_stmt(b.compound(Add, b.id("acc"), b.call(&previous, vec![b.id("acc")]))));
        }
        body.push(b.ret(Some(b.id("acc"))));
        items.push(b.function(Spec::INT, b.func(b.var(&name), vec![b.param(Spec::INT, b.var("n"))]), body));
    }
    b.unit(items)
}

fn compile_fresh() -> String {
    let mut ctx = CompilationContext::new();
    let unit = build(&Builder::new(&mut ctx.interner));
    compile(&mut ctx, &unit).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("build and compile", |b| b.iter(|| black_box(compile_fresh())));
    c.bench_function("compile", |b| {
        b.iter_batched(
            || {
                let mut ctx = CompilationContext::new();
                let unit = build(&Builder::new(&mut ctx.interner));
                (ctx, unit)
            },
            |(mut ctx, unit)| black_box(compile(&mut ctx, &unit)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
