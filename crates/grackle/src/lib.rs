// lib.rs — Static analysis core for Garry's Mod Lua.
//
// Walks a parsed syntax tree and produces a structured inventory of
// globally visible symbols: top-level functions and variables, members
// attached to tables and metatables, and hook.Run/hook.Call event
// registrations. Downstream consumers (hover help, diagnostics) live
// outside this crate; so does parsing — callers hand in an `ast` tree
// from whatever front-end they use.

pub mod ast;
pub mod extractor;
pub mod scope;
pub mod symbol_table;


pub use extractor::{extract, extract_with_scope, ExtractError};
pub use scope::Scope;
pub use symbol_table::GlobalSymbolTable;
