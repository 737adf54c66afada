//! # docqa-cli
//!
//! Terminal front end for [`docqa_rag`]: argument parsing and an interactive
//! console that loads one document and answers questions about it.

pub mod args;
pub mod console;

pub use args::Args;
