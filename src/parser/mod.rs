//! Input parsing: classification and plain command-line tokenization.

pub mod classifier;
pub mod tokenizer;

pub use classifier::{Classification, METHOD_HEADER, classify, resolve_method};
pub use tokenizer::{Token, parse_args, parse_function_name, tokenize};
