use std::io::Write;

use crate::{
    symbols::{ScopeId, Storage, Symbol, SymbolTable},
    util::intern::Interner,
};

const INDENT_WIDTH: usize = 2;

pub fn print_symbols_string(idents: &Interner, table: &SymbolTable) -> String {
    let mut buf = Vec::with_capacity(512);
    print_scope(&mut buf, idents, table, SymbolTable::GLOBAL, 0).unwrap();
    String::from_utf8(buf).unwrap()
}

/// Writes the symbols of `scope` in declaration order, then its child scopes,
/// each indented one level deeper.
pub fn print_scope(
    w: &mut impl Write,
    idents: &Interner,
    table: &SymbolTable,
    scope: ScopeId,
    depth: usize,
) -> std::io::Result<()> {
    let indent = depth * INDENT_WIDTH;
    writeln!(w, "{:indent$}scope at depth {depth}:", "")?;
    for (_, symbol) in table.symbols_in(scope) {
        print_symbol(w, idents, symbol, indent + INDENT_WIDTH)?;
    }
    for &child in table.children(scope) {
        print_scope(w, idents, table, child, depth + 1)?;
    }
    Ok(())
}

fn print_symbol(
    w: &mut impl Write,
    idents: &Interner,
    symbol: &Symbol,
    indent: usize,
) -> std::io::Result<()> {
    let name = idents.get(symbol.name);
    write!(w, "{:indent$}{name}: {}", "", symbol.ty)?;
    match symbol.storage {
        Some(Storage::Frame(offset)) => writeln!(w, ", {offset}($fp)"),
        Some(Storage::Global) => writeln!(w, ", global"),
        None => writeln!(w),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::{build::Builder, TypeSpecifier as Spec},
        context::CompilationContext,
        ir_gen, type_checker,
    };

    #[test]
    fn nested_scopes_with_storage() {
        let mut ctx = CompilationContext::new();
        let unit = {
            let b = Builder::new(&mut ctx.interner);
            b.unit(vec![
                b.global(Spec::INT, vec![b.var("g")]),
                b.function(
                    Spec::VOID,
                    b.func(b.var("f"), vec![b.param(Spec::INT, b.var("n"))]),
                    vec![
                        b.decl(Spec::INT, vec![b.var("a")]),
                        b.block(vec![b.decl(Spec::CHAR, vec![b.var("c")])]),
                    ],
                ),
            ])
        };
        let program = type_checker::check(&mut ctx, &unit);
        let _ = ir_gen::generate(&mut ctx, &program);
        assert!(ctx.errors().is_empty(), "{:?}", ctx.formatted_errors());

        assert_eq!(
            print_symbols_string(&ctx.interner, &ctx.symbols),
            indoc! {"
                scope at depth 0:
                  g: int, global
                  f: void(int)
                  scope at depth 1:
                    n: int, 0($fp)
                    a: int, 56($fp)
                    scope at depth 2:
                      c: char, 60($fp)
            "}
        );
    }
}
