use crate::{
    ast::{build::Builder, TranslationUnit},
    codegen::mips,
    context::CompilationContext,
    error::Pass,
    ir_gen, type_checker,
    util::fmt::ir::print_program_string,
};

/// How far down the pipeline a test runs.
pub enum Stage {
    Checker,
    Ir,
    Assembly,
}

pub enum Assertion {
    /// No diagnostics, and the listing matches exactly.
    ListingOk(&'static str),
    /// Each line occurs in the listing, in this order.
    ListingContains(&'static [&'static str]),
    ExpectedErrors(&'static [&'static str]),
}

/// Runs the passes up to `stage` on the unit built by `build`, returning the
/// listing of the last stage and the formatted diagnostics.
///
/// Nothing is generated for programs that fail checking.
#[track_caller]
pub fn run_pipeline(
    stage: Stage,
    build: impl FnOnce(&Builder<'_>) -> TranslationUnit,
) -> (String, Vec<String>) {
    let mut ctx = CompilationContext::new();
    let unit = build(&Builder::new(&mut ctx.interner));
    let program = type_checker::check(&mut ctx, &unit);
    let checked = ctx.error_count(Pass::Symbol) == 0 && ctx.error_count(Pass::Type) == 0;

    let listing = match stage {
        Stage::Checker => String::new(),
        _ if !checked => String::new(),
        Stage::Ir => {
            let ir = ir_gen::generate(&mut ctx, &program);
            print_program_string(&ctx.interner, &ir)
        }
        Stage::Assembly => {
            let ir = ir_gen::generate(&mut ctx, &program);
            mips::emit_string(&ctx, &ir)
        }
    };
    (listing, ctx.formatted_errors())
}

#[track_caller]
pub fn run_assertion(assertion: Assertion, actual_listing: &str, actual_errors: &[String]) {
    match assertion {
        Assertion::ListingOk(expected_listing) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(actual_listing.trim(), expected_listing.trim());
        }
        Assertion::ListingContains(expected_lines) => {
            let mut lines = actual_listing.lines().map(str::trim);
            for expected in expected_lines {
                assert!(
                    lines.any(|line| line == expected.trim()),
                    "`{expected}` not found in order in:\n{actual_listing}"
                );
            }
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(actual_errors, expected_errors);
        }
    }
}

macro_rules! ir_tests {
    (
        use $stage:ident;

        $(
            fn $test_name:ident() {
                let program = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let (actual_listing, actual_errors) = crate::util::test_utils::run_pipeline(
                    ir_tests!(@@stage $stage),
                    $source,
                );
                let ctx = (&actual_listing, &actual_errors);
                ir_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            ir_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        ir_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, listing_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::ListingOk(::indoc::indoc! { $expected })
    };
    (@@assertion, listing_contains, $expected:expr) => {
        crate::util::test_utils::Assertion::ListingContains($expected)
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@stage checker) => {
        crate::util::test_utils::Stage::Checker
    };
    (@@stage ir) => {
        crate::util::test_utils::Stage::Ir
    };
    (@@stage mips) => {
        crate::util::test_utils::Stage::Assembly
    };
}
pub(crate) use ir_tests;
