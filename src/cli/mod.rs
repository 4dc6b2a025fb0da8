mod replay;
mod root;
mod scan;

pub use root::Cli;
