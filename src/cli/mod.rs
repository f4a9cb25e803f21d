//! Terminal output for the command-line binary

mod console;

pub use console::Console;
