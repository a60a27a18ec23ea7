//! Scope resolution over a finished syntax tree.
//!
//! The resolver walks the tree once in source order with a stack of live
//! scopes. Definitions insert bindings into the innermost scope (imports go
//! to the module scope) and every variable, symbol, command name and
//! pattern type name is looked up innermost-first. Results land in a flat
//! [`binding::BindingTable`] keyed by node id and span:
//!
//! - Lexical scope records with their parent links
//! - Definition sites (bindings)
//! - Use sites (references) and what each resolved to
//! - Warnings for references nothing defines
//!
//! Resolution never fails; unknown names are reported as warnings.

pub mod binding;
pub mod resolver;
pub mod scope;
