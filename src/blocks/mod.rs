//! Block Schema and Assembler (C8). See §4.8 and §6.

pub mod assembler;
pub mod types;

pub use assembler::assemble;
pub use types::{Block, BlockVariant, CtaVariant, HeaderLevel, ListStyle};
