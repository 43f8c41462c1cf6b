pub mod cli;
pub mod commands;
pub mod core;
pub mod io;
pub mod lda;

pub use commands::run;
