//! Native CLI support for the liskov binary.

pub mod args;
pub mod driver;
pub mod reporter;
pub mod type_expr;
pub mod universe_file;

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
#[cfg(test)]
#[path = "tests/reporter_tests.rs"]
mod reporter_tests;
#[cfg(test)]
#[path = "tests/type_expr_tests.rs"]
mod type_expr_tests;
#[cfg(test)]
#[path = "tests/universe_file_tests.rs"]
mod universe_file_tests;
