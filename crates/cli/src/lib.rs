//! fontgen CLI library.

pub mod cli;
pub mod console;
pub mod io;
