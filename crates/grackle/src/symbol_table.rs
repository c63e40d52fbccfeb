//
// symbol_table.rs
//
// Output data model: the global symbol inventory of one source unit
//

use serde::{Deserialize, Serialize};

use crate::ast::Indexer;

/// Lua primitive kinds, plus `any` for values whose kind cannot be
/// classified from the initializer expression alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Nil,
    Boolean,
    Number,
    String,
    Function,
    Userdata,
    Thread,
    Table,
    Any,
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Primitive::Nil => "nil",
            Primitive::Boolean => "boolean",
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Function => "function",
            Primitive::Userdata => "userdata",
            Primitive::Thread => "thread",
            Primitive::Table => "table",
            Primitive::Any => "any",
        };
        f.write_str(name)
    }
}

/// A top-level variable definition site.
///
/// The kind is classified from the initializer's syntactic shape only, so
/// it is best-effort: anything beyond a literal classifies as `any`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub kind: Primitive,
    pub name: String,
    pub line: u32,
    pub unit_id: String,
}

/// A top-level function definition site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalFunction {
    pub name: String,
    pub parameters: Vec<String>,
    pub line: u32,
    pub unit_id: String,
}

/// A variable assigned onto a table, `Owner.name = value`.
///
/// When the owner was a metatable alias (`FindMetaTable` handle), `owner`
/// is the metatable name and `on_metatable` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberVariable {
    pub on_metatable: bool,
    pub owner: String,
    pub variable: GlobalVariable,
}

/// A function defined on a table, via assignment or declaration syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFunction {
    pub on_metatable: bool,
    pub owner: String,
    /// `.` or `:` as written at the definition site. Value-call (`:`)
    /// definitions implicitly bind `self`.
    pub indexer: Indexer,
    pub function: GlobalFunction,
}

/// A `hook.Run`/`hook.Call` site: some code path fires this named event
/// with the given forwarded parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookRegistration {
    pub name: String,
    pub parameters: Vec<String>,
    pub line: u32,
    pub unit_id: String,
}

/// The global symbol inventory of one extraction run.
///
/// Five insertion-ordered, append-only sequences. Every definition site
/// observed is retained, so re-assignment of the same global name yields
/// one entry per site rather than a single "final value" entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalSymbolTable {
    variables: Vec<GlobalVariable>,
    functions: Vec<GlobalFunction>,
    member_variables: Vec<MemberVariable>,
    member_functions: Vec<MemberFunction>,
    hooks: Vec<HookRegistration>,
}

impl GlobalSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variables(&self) -> &[GlobalVariable] {
        &self.variables
    }

    pub fn functions(&self) -> &[GlobalFunction] {
        &self.functions
    }

    pub fn member_variables(&self) -> &[MemberVariable] {
        &self.member_variables
    }

    pub fn member_functions(&self) -> &[MemberFunction] {
        &self.member_functions
    }

    pub fn hooks(&self) -> &[HookRegistration] {
        &self.hooks
    }

    /// Total number of entries across all five sequences.
    pub fn len(&self) -> usize {
        self.variables.len()
            + self.functions.len()
            + self.member_variables.len()
            + self.member_functions.len()
            + self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn push_variable(&mut self, variable: GlobalVariable) {
        self.variables.push(variable);
    }

    pub(crate) fn push_function(&mut self, function: GlobalFunction) {
        self.functions.push(function);
    }

    pub(crate) fn push_member_variable(&mut self, member: MemberVariable) {
        self.member_variables.push(member);
    }

    pub(crate) fn push_member_function(&mut self, member: MemberFunction) {
        self.member_functions.push(member);
    }

    pub(crate) fn push_hook(&mut self, hook: HookRegistration) {
        self.hooks.push(hook);
    }

    /// Append another unit's inventory onto this one.
    ///
    /// Multi-unit merging is plain per-kind concatenation; callers that
    /// want a project-wide inventory fold each unit's table in after its
    /// extraction completes.
    pub fn merge(&mut self, other: GlobalSymbolTable) {
        self.variables.extend(other.variables);
        self.functions.extend(other.functions);
        self.member_variables.extend(other.member_variables);
        self.member_functions.extend(other.member_functions);
        self.hooks.extend(other.hooks);
    }
}
