//! Parser for the constraint rules language

mod grammar;
pub mod lexer;

pub use grammar::parse;
