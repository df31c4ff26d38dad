use std::{fmt, io};

use crate::{
    error::{Error, Pass, Span, Spanned},
    ir::Temporary,
    symbols::SymbolTable,
    util::{
        fmt::{Show, ShowContext},
        intern::{Interned, Interner},
    },
};

/// Maximum number of string literals a program may contain.
pub const MAX_STRING_LITERALS: usize = 1000;

/// State shared by every pass of one compilation. Two compilations never
/// share a context.
pub struct CompilationContext {
    pub interner: Interner,
    pub symbols: SymbolTable,
    strings: Vec<(Interned, Box<str>)>,
    errors: Vec<Spanned<Error>>,
    diagnostics: Option<Box<dyn io::Write>>,
    next_temporary: u32,
    next_label: u32,
}

impl Default for CompilationContext {
    fn default() -> Self {
        CompilationContext::new()
    }
}

impl fmt::Debug for CompilationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationContext")
            .field("strings", &self.strings.len())
            .field("errors", &self.errors.len())
            .field("next_temporary", &self.next_temporary)
            .field("next_label", &self.next_label)
            .finish_non_exhaustive()
    }
}

impl CompilationContext {
    pub fn new() -> CompilationContext {
        CompilationContext {
            interner: Interner::with_capacity(256),
            symbols: SymbolTable::with_capacity(128),
            strings: Vec::new(),
            errors: Vec::with_capacity(8),
            diagnostics: None,
            next_temporary: 0,
            next_label: 0,
        }
    }

    /// Creates a context that also writes every diagnostic to `sink` as soon
    /// as it is reported.
    pub fn with_diagnostics(sink: impl io::Write + 'static) -> CompilationContext {
        CompilationContext {
            diagnostics: Some(Box::new(sink)),
            ..CompilationContext::new()
        }
    }

    pub fn report(&mut self, span: Span, error: Error) {
        let error = span.wrap(error);
        if let Some(sink) = &mut self.diagnostics {
            let ctx = ShowContext {
                interner: &self.interner,
            };
            let result = writeln!(sink, "{:#}", error.display(&ctx));
            if let Err(io_error) = result {
                tracing::warn!(%io_error, "failed to write diagnostic");
            }
        }
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[Spanned<Error>] {
        &self.errors
    }

    pub fn error_count(&self, pass: Pass) -> usize {
        self.errors.iter().filter(|e| e.inner.pass() == pass).count()
    }

    /// Error counts of every pass, as `symbol: 1, type: 0, codegen: 0`.
    pub fn error_summary(&self) -> String {
        Pass::ALL
            .iter()
            .map(|&pass| format!("{pass}: {}", self.error_count(pass)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Diagnostics rendered as `line <n>: <message>`, in report order.
    pub fn formatted_errors(&self) -> Vec<String> {
        let ctx = self.show_context();
        self.errors
            .iter()
            .map(|e| format!("{:#}", e.display(&ctx)))
            .collect()
    }

    pub fn new_temporary(&mut self) -> Temporary {
        let temporary = Temporary(self.next_temporary);
        self.next_temporary += 1;
        temporary
    }

    /// The id the next call to [`CompilationContext::new_temporary`] returns.
    pub fn next_temporary_id(&self) -> u32 {
        self.next_temporary
    }

    pub fn new_label(&mut self) -> Interned {
        let n = self.next_label;
        self.next_label += 1;
        self.interner.intern_fmt(format_args!("_GeneratedLabel_{n}"))
    }

    /// Records a string literal, returning the label of its data. `None` once
    /// the table is full.
    pub fn record_string(&mut self, value: &str) -> Option<Interned> {
        if self.strings.len() >= MAX_STRING_LITERALS {
            return None;
        }
        let n = self.strings.len();
        let label = self.interner.intern_fmt(format_args!("_StringLabel_{n}"));
        self.strings.push((label, value.into()));
        Some(label)
    }

    /// Recorded string literals with their labels, in recording order.
    pub fn strings(&self) -> impl Iterator<Item = (Interned, &str)> + '_ {
        self.strings.iter().map(|(label, value)| (*label, &**value))
    }

    pub fn show_context(&self) -> ShowContext<'_> {
        ShowContext {
            interner: &self.interner,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<u8>>>);

    impl io::Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn diagnostics_are_written_as_reported() {
        let sink = SharedSink::default();
        let mut ctx = CompilationContext::with_diagnostics(sink.clone());
        let x = ctx.interner.intern("x");

        ctx.report(Span::new(3), Error::UndeclaredIdentifier(x));
        assert_eq!(
            String::from_utf8(sink.0.borrow().clone()).unwrap(),
            "line 3: identifier 'x' has not been declared\n"
        );

        ctx.report(Span::new(7), Error::BreakOutsideLoop);
        assert_eq!(ctx.error_count(Pass::Symbol), 1);
        assert_eq!(ctx.error_count(Pass::Type), 0);
        assert_eq!(ctx.error_count(Pass::Codegen), 1);
        assert_eq!(ctx.error_summary(), "symbol: 1, type: 0, codegen: 1");
    }

    #[test]
    fn counters_are_per_context() {
        let mut a = CompilationContext::new();
        let mut b = CompilationContext::new();
        assert_eq!(a.new_temporary(), Temporary(0));
        assert_eq!(a.new_temporary(), Temporary(1));
        assert_eq!(b.new_temporary(), Temporary(0));

        let label = a.new_label();
        assert_eq!(a.interner.get(label), "_GeneratedLabel_0");
        let label = b.new_label();
        assert_eq!(b.interner.get(label), "_GeneratedLabel_0");
    }

    #[test]
    fn string_table_is_bounded() {
        let mut ctx = CompilationContext::new();
        for i in 0..MAX_STRING_LITERALS {
            let label = ctx.record_string("x").unwrap();
            assert_eq!(ctx.interner.get(label), format!("_StringLabel_{i}"));
        }
        assert_eq!(ctx.record_string("one too many"), None);
        assert_eq!(ctx.strings().count(), MAX_STRING_LITERALS);
    }
}
