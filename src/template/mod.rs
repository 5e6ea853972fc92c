//! Macro template language
//!
//! - `syntax`: scanner shared by the expansion and substitution passes
//! - `definitions`: `@name = body` extraction into a [`MacroTable`]
//! - `binding`: positional `{N}` substitution
//! - `expander`: recursive `@[name args...]` expansion

pub mod binding;
pub mod definitions;
pub mod expander;
pub mod syntax;

pub use definitions::MacroTable;
pub use expander::Expander;
