/// Declares `#[test]` functions that run inside [`UnitTest::global()`].
///
/// Each generated test returns `Result<(), TestFailure>`, so a test that runs
/// past the exception threshold fails with the guard's message. Mark a test
/// with `#[ignore_rules]`, anywhere among its attributes, to exempt it from
/// the duration check; any other attributes are passed through.
///
/// ```rust
/// use unit_duration::unit_test;
///
/// unit_test! {
///     fn parses_quickly() {
///         assert_eq!("42".parse::<u32>().unwrap(), 42);
///     }
///
///     #[ignore = "talks to a real database"]
///     #[ignore_rules]
///     fn migrates_schema() {
///         std::thread::sleep(std::time::Duration::from_millis(150));
///     }
/// }
/// # fn main() {}
/// ```
///
/// [`UnitTest::global()`]: crate::UnitTest::global
#[macro_export]
macro_rules! unit_test {
    () => {};
    (@attrs [$($attrs:tt)*] [$runner:ident] #[ignore_rules] $($rest:tt)*) => {
        $crate::unit_test! { @attrs [$($attrs)*] [run_ignoring_rules] $($rest)* }
    };
    (@attrs [$($attrs:tt)*] [$runner:ident] #[$meta:meta] $($rest:tt)*) => {
        $crate::unit_test! { @attrs [$($attrs)* #[$meta]] [$runner] $($rest)* }
    };
    (@attrs [$($attrs:tt)*] [$runner:ident] fn $name:ident() $body:block $($rest:tt)*) => {
        $($attrs)*
        #[test]
        fn $name() -> ::std::result::Result<(), $crate::TestFailure> {
            $crate::UnitTest::global().$runner(
                ::std::concat!(::std::module_path!(), "::", ::std::stringify!($name)),
                || $body,
            )
        }

        $crate::unit_test! { $($rest)* }
    };
    (@attrs $($unexpected:tt)*) => {
        ::std::compile_error!(
            "unit_test! expects items of the form `#[attr]* fn name() { ... }`"
        );
    };
    ($($items:tt)+) => {
        $crate::unit_test! { @attrs [] [run] $($items)+ }
    };
}
