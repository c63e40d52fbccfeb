//
// extractor.rs
//
// Tree-walking extraction of globally visible symbols
//
// One pre-order recursive descent over the statement tree, carrying the
// current scope top-down and appending into a single symbol table. The
// pass is best-effort by design: when an expression is too complex to
// attribute with confidence it skips that symbol instead of guessing.
//

use log::{debug, trace};
use thiserror::Error;

use crate::ast::{
    AssignStat, AssignTarget, Block, CallExpr, Expr, FuncBody, FuncName, FunctionStat, Indexer,
    LocalStat, Param, Stat, SyntaxTree,
};
use crate::scope::Scope;
use crate::symbol_table::{
    GlobalFunction, GlobalSymbolTable, GlobalVariable, HookRegistration, MemberFunction,
    MemberVariable, Primitive,
};

/// The single hard failure of extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("not a valid program: expected a chunk at the root, found {0}")]
    NotAProgram(&'static str),
}

/// Extract the global symbol inventory of one source unit.
///
/// `unit_id` is an opaque caller-supplied label (a file path, usually)
/// stamped onto every emitted entry so symbols can be traced back to
/// their origin.
pub fn extract(tree: &SyntaxTree, unit_id: &str) -> Result<GlobalSymbolTable, ExtractError> {
    extract_with_scope(tree, unit_id).map(|(table, _)| table)
}

/// Like [`extract`], but also returns the root scope as it stood after
/// the pass, for diagnostic introspection of top-level locals/aliases.
pub fn extract_with_scope(
    tree: &SyntaxTree,
    unit_id: &str,
) -> Result<(GlobalSymbolTable, Scope), ExtractError> {
    let SyntaxTree::Chunk(chunk) = tree else {
        return Err(ExtractError::NotAProgram(tree.kind()));
    };

    let mut extractor = Extractor {
        unit_id,
        table: GlobalSymbolTable::new(),
    };
    let mut root = Scope::root();
    extractor.visit_block(&chunk.block, &mut root);

    debug!(
        "extracted {} symbol entries from unit {}",
        extractor.table.len(),
        unit_id
    );
    Ok((extractor.table, root))
}

struct Extractor<'a> {
    unit_id: &'a str,
    table: GlobalSymbolTable,
}

impl Extractor<'_> {
    fn visit_block(&mut self, block: &Block, scope: &mut Scope) {
        for stat in &block.stats {
            self.visit_stat(stat, scope);
        }
    }

    /// Apply the per-statement rules in their fixed order: descend into
    /// nested blocks first, then run every recognizer that matches this
    /// statement kind. A single statement can contribute to several
    /// categories (an assignment is scanned for hooks, aliases, and
    /// global assignments alike).
    fn visit_stat(&mut self, stat: &Stat, scope: &mut Scope) {
        self.descend(stat, scope);

        match stat {
            Stat::Local(local) => {
                self.register_locals(local, scope);
                for value in &local.values {
                    self.detect_hook(value);
                }
                for (name, value) in local.names.iter().zip(&local.values) {
                    detect_metatable_alias(&name.name, value, scope);
                }
            }
            Stat::Assign(assign) => {
                for value in &assign.values {
                    self.detect_hook(value);
                }
                for (target, value) in assign.targets.iter().zip(&assign.values) {
                    if let AssignTarget::Name(name) = target {
                        detect_metatable_alias(&name.name, value, scope);
                    }
                }
                self.extract_assignment(assign, scope);
            }
            Stat::Call(call) => {
                self.detect_hook_in_call(&call.call);
            }
            Stat::Function(function) if !function.is_local => {
                self.extract_function_stat(function, scope);
            }
            _ => {}
        }
    }

    /// Recurse into every nested statement sequence this node introduces,
    /// each with its own independently derived child scope. Sibling
    /// branches never share a scope instance.
    fn descend(&mut self, stat: &Stat, scope: &Scope) {
        match stat {
            Stat::Function(function) => {
                let mut child = scope.derive();
                inject_function_scope(&function.name, &function.body, &mut child);
                self.visit_block(&function.body.block, &mut child);
            }
            Stat::If(if_stat) => {
                for clause in &if_stat.clauses {
                    let mut child = scope.derive();
                    self.visit_block(&clause.block, &mut child);
                }
            }
            Stat::While(while_stat) => {
                let mut child = scope.derive();
                self.visit_block(&while_stat.block, &mut child);
            }
            Stat::Repeat(repeat) => {
                let mut child = scope.derive();
                self.visit_block(&repeat.block, &mut child);
            }
            Stat::NumericFor(numeric_for) => {
                let mut child = scope.derive();
                child.add_local(&numeric_for.var.name);
                self.visit_block(&numeric_for.block, &mut child);
            }
            Stat::GenericFor(generic_for) => {
                let mut child = scope.derive();
                for var in &generic_for.vars {
                    child.add_local(&var.name);
                }
                self.visit_block(&generic_for.block, &mut child);
            }
            Stat::Do(do_stat) => {
                let mut child = scope.derive();
                self.visit_block(&do_stat.block, &mut child);
            }
            Stat::Local(_)
            | Stat::Assign(_)
            | Stat::Call(_)
            | Stat::Return(_)
            | Stat::Break(_) => {}
        }
    }

    /// Register the names a `local` statement declares.
    ///
    /// A name that already exists as a global variable in this unit is
    /// deliberately not registered: the common idiom
    /// `ctp = ctp or {}; local ctp = ctp` re-declares a global default
    /// under the same name, and treating it as local afterwards would
    /// hide every later `ctp.foo = ...` definition. The cost is that a
    /// legitimately scoped local of the same name is occasionally missed;
    /// fixing that properly would require interpreting the code.
    fn register_locals(&mut self, local: &LocalStat, scope: &mut Scope) {
        for name in &local.names {
            if self
                .table
                .variables()
                .iter()
                .any(|v| v.name == name.name)
            {
                trace!(
                    "{}:{}: not registering local {}, already a global variable",
                    self.unit_id,
                    name.line,
                    name.name
                );
                continue;
            }
            scope.add_local(&name.name);
        }
    }

    /// Rule for initializer position: a `local x = hook.Run(...)` or
    /// `x = hook.Run(...)` still registers the hook.
    fn detect_hook(&mut self, value: &Expr) {
        if let Expr::Call(call) = value {
            self.detect_hook_in_call(call);
        }
    }

    /// Recognize the event-dispatch convention `hook.Run(name, ...)` /
    /// `hook.Call(name, gamemode, ...)` and record the fired event.
    ///
    /// `Run` forwards every argument after the first to listeners; `Call`
    /// additionally skips a gamemode-table argument. Forwarded arguments
    /// that are bare identifiers keep their name; anything else gets a
    /// synthesized `argN` placeholder, numbered among the forwarded
    /// arguments.
    fn detect_hook_in_call(&mut self, call: &CallExpr) {
        let Expr::Member(member) = &call.callee else {
            return;
        };
        if member.base.plain_name() != Some("hook") {
            return;
        }
        let forwarded_from = match member.member.name.as_str() {
            "Run" => 1,
            "Call" => 2,
            _ => return,
        };
        if call.args.is_empty() {
            return;
        }

        let Some(name) = call.args[0].static_display_value() else {
            trace!(
                "{}:{}: hook name is not a static value, skipping",
                self.unit_id,
                call.line
            );
            return;
        };

        let parameters = call
            .args
            .iter()
            .skip(forwarded_from)
            .enumerate()
            .map(|(index, arg)| match arg.plain_name() {
                Some(name) => name.to_string(),
                None => format!("arg{}", index + 1),
            })
            .collect();

        self.table.push_hook(HookRegistration {
            name,
            parameters,
            line: call.line,
            unit_id: self.unit_id.to_string(),
        });
    }

    /// Emit global/member entries for each (target, value) clause of an
    /// assignment. Clauses without a matching value are ignored.
    fn extract_assignment(&mut self, assign: &AssignStat, scope: &Scope) {
        for (target, value) in assign.targets.iter().zip(&assign.values) {
            match target {
                AssignTarget::Name(name) => {
                    if scope.is_local(&name.name) {
                        continue;
                    }
                    if let Expr::Function(body) = value {
                        self.table.push_function(self.global_function(
                            &name.name,
                            body,
                            false,
                            name.line,
                        ));
                    } else {
                        self.table.push_variable(GlobalVariable {
                            kind: classify_initializer(value),
                            name: name.name.clone(),
                            line: name.line,
                            unit_id: self.unit_id.to_string(),
                        });
                    }
                }
                AssignTarget::Member(member) => {
                    let Some((on_metatable, owner)) =
                        self.resolve_owner(&member.base, member.member.line, scope)
                    else {
                        continue;
                    };
                    if let Expr::Function(body) = value {
                        let function = self.global_function(
                            &member.member.name,
                            body,
                            member.indexer == Indexer::Colon,
                            member.member.line,
                        );
                        self.table.push_member_function(MemberFunction {
                            on_metatable,
                            owner,
                            indexer: member.indexer,
                            function,
                        });
                    } else {
                        self.table.push_member_variable(MemberVariable {
                            on_metatable,
                            owner,
                            variable: GlobalVariable {
                                kind: classify_initializer(value),
                                name: member.member.name.clone(),
                                line: member.member.line,
                                unit_id: self.unit_id.to_string(),
                            },
                        });
                    }
                }
                AssignTarget::Index(index) => {
                    trace!(
                        "{}:{}: indexed assignment target is too complex, skipping",
                        self.unit_id,
                        index.line
                    );
                }
            }
        }
    }

    /// Emit an entry for a non-local function declaration.
    fn extract_function_stat(&mut self, function: &FunctionStat, scope: &Scope) {
        match &function.name {
            FuncName::Name(name) => {
                if scope.is_local(&name.name) {
                    return;
                }
                self.table.push_function(self.global_function(
                    &name.name,
                    &function.body,
                    false,
                    function.line,
                ));
            }
            FuncName::Member {
                base,
                indexer,
                member,
            } => {
                let Some((on_metatable, owner)) =
                    self.resolve_owner(base, function.line, scope)
                else {
                    return;
                };
                let emitted = self.global_function(
                    &member.name,
                    &function.body,
                    *indexer == Indexer::Colon,
                    function.line,
                );
                self.table.push_member_function(MemberFunction {
                    on_metatable,
                    owner,
                    indexer: *indexer,
                    function: emitted,
                });
            }
        }
    }

    /// Resolve the owner of a member definition: the base must be a bare
    /// identifier that is not local, and a registered metatable alias
    /// redirects ownership to the metatable it names.
    ///
    /// Returns `None` when the symbol should be skipped. A complex base
    /// (e.g. `self.config.x = 1`) is an accepted precision gap, not an
    /// error.
    fn resolve_owner(
        &self,
        base: &Expr,
        line: u32,
        scope: &Scope,
    ) -> Option<(bool, String)> {
        let Some(base_name) = base.plain_name() else {
            trace!(
                "{}:{}: member base is too complex to attribute, skipping",
                self.unit_id,
                line
            );
            return None;
        };
        if scope.is_local(base_name) {
            return None;
        }
        match scope.resolve_metatable_alias(base_name) {
            Some(metatable) => Some((true, metatable.to_string())),
            None => Some((false, base_name.to_string())),
        }
    }

    fn global_function(
        &self,
        name: &str,
        body: &FuncBody,
        implicit_self: bool,
        line: u32,
    ) -> GlobalFunction {
        GlobalFunction {
            name: name.to_string(),
            parameters: recorded_parameters(&body.params, implicit_self),
            line,
            unit_id: self.unit_id.to_string(),
        }
    }
}

/// Recognize `<name> = FindMetaTable("Player")` in a declaration or
/// assignment clause and register the alias in the current scope. The
/// alias is visible to every statement lexically after this one in the
/// same or a nested scope.
fn detect_metatable_alias(target_name: &str, value: &Expr, scope: &mut Scope) {
    let Expr::Call(call) = value else {
        return;
    };
    if call.callee.plain_name() != Some("FindMetaTable") {
        return;
    }
    let [Expr::Str {
        value: metatable, ..
    }] = call.args.as_slice()
    else {
        return;
    };
    scope.add_metatable_alias(target_name, metatable);
}

/// Derive-time injection for a function body's scope: the implicit `self`
/// receiver for value-call declarations, then every declared parameter as
/// both local and parameter. The variadic marker registers as `...`.
fn inject_function_scope(name: &FuncName, body: &FuncBody, scope: &mut Scope) {
    if matches!(
        name,
        FuncName::Member {
            indexer: Indexer::Colon,
            ..
        }
    ) {
        scope.add_self_parameter();
    }
    for param in &body.params {
        let param_name = match param {
            Param::Name(name) => name.as_str(),
            Param::Vararg => "...",
        };
        scope.add_parameter(param_name);
        scope.add_local(param_name);
    }
}

/// Parameter list as recorded on an emitted function entry. Value-call
/// definitions carry `self` first even though it never appears in the
/// source parameter list.
fn recorded_parameters(params: &[Param], implicit_self: bool) -> Vec<String> {
    let mut recorded = Vec::with_capacity(params.len() + usize::from(implicit_self));
    if implicit_self {
        recorded.push("self".to_string());
    }
    for param in params {
        recorded.push(match param {
            Param::Name(name) => name.clone(),
            Param::Vararg => "...".to_string(),
        });
    }
    recorded
}

/// Classify an initializer's primitive kind from its syntactic shape.
/// Only literals classify; calls, references, arithmetic, and even the
/// `nil` literal fall through to `any`.
fn classify_initializer(value: &Expr) -> Primitive {
    match value {
        Expr::Str { .. } => Primitive::String,
        Expr::Number { .. } => Primitive::Number,
        Expr::Bool { .. } => Primitive::Boolean,
        Expr::Table(_) => Primitive::Table,
        _ => Primitive::Any,
    }
}
