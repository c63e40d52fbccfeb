//
// scope.rs
//
// Lexical scope tracking for the symbol extractor
//

use std::collections::{HashMap, HashSet};

/// One lexical scope: the local names, parameter names, and metatable
/// aliases visible at a point in the traversal.
///
/// A child scope is a full snapshot of its parent at derivation time.
/// Parent and child are independent afterwards, which is what guarantees
/// that sibling branches of a conditional never see each other's locals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Local variables. Function parameters appear here as well.
    locals: HashSet<String>,
    /// Function parameters only.
    parameters: HashSet<String>,
    /// Maps a local variable name to a metatable name, e.g. "plymeta => Player".
    metatable_aliases: HashMap<String, String>,
}

impl Scope {
    /// Empty root scope for a whole source unit.
    pub fn root() -> Self {
        Self::default()
    }

    /// Derive a child scope: an independent copy of everything visible
    /// here. Later mutations of either scope never reach the other.
    pub fn derive(&self) -> Self {
        self.clone()
    }

    /// Register a local variable in this scope.
    pub fn add_local(&mut self, name: impl Into<String>) {
        self.locals.insert(name.into());
    }

    /// Register a function parameter in this scope.
    ///
    /// Callers that want parameter-as-local semantics (every Lua parameter
    /// is also a local) add the name through `add_local` as well.
    pub fn add_parameter(&mut self, name: impl Into<String>) {
        self.parameters.insert(name.into());
    }

    /// Register the implicit `self` receiver bound by value-call (`:`)
    /// function declarations, as both local and parameter.
    pub fn add_self_parameter(&mut self) {
        self.add_local("self");
        self.add_parameter("self");
    }

    /// Map a local variable name to the metatable it holds, e.g.
    /// `local plymeta = FindMetaTable("Player")` maps "plymeta" => "Player".
    pub fn add_metatable_alias(
        &mut self,
        local_name: impl Into<String>,
        metatable_name: impl Into<String>,
    ) {
        self.metatable_aliases
            .insert(local_name.into(), metatable_name.into());
    }

    /// Is `name` in the local set? Ignores alias overrides; see `is_local`.
    pub fn has_local(&self, name: &str) -> bool {
        self.locals.contains(name)
    }

    /// Is `name` a registered function parameter?
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains(name)
    }

    /// Does `name` have a metatable alias registered?
    pub fn has_metatable_alias(&self, name: &str) -> bool {
        self.metatable_aliases.contains_key(name)
    }

    /// The metatable name `name` aliases, if any.
    pub fn resolve_metatable_alias(&self, name: &str) -> Option<&str> {
        self.metatable_aliases.get(name).map(String::as_str)
    }

    /// Whether writes through `name` should be treated as local writes.
    ///
    /// An alias wins over local membership: an aliased name is a handle to
    /// a global metatable, so writes through it must be attributed to the
    /// metatable even though the name itself was declared `local`.
    pub fn is_local(&self, name: &str) -> bool {
        if self.has_metatable_alias(name) {
            return false;
        }
        self.has_local(name)
    }
}
