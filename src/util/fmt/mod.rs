use crate::util::intern::Interner;

pub mod error;
pub mod ir;
pub mod symbols;

pub struct ShowContext<'i> {
    pub interner: &'i Interner,
}

/// Analogous to [`std::fmt::Display`], but also receives the compilation's
/// [`Interner`] to resolve names.
pub trait Show {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &ShowContext<'_>) -> std::fmt::Result;

    /// Returns a type which can be displayed.
    fn display(&self, ctx: &ShowContext<'_>) -> impl std::fmt::Display
    where
        Self: Sized,
    {
        Display(self, ctx)
    }
}

struct Display<'this, 'ctx, 'i, T: Show>(pub &'this T, pub &'ctx ShowContext<'i>);

impl<T> std::fmt::Display for Display<'_, '_, '_, T>
where
    T: Show,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Display(this, ctx) = self;
        this.show(f, ctx)
    }
}
