pub mod cli;
pub mod core;
pub mod output;
pub mod pypi;
