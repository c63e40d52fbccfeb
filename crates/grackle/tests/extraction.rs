//
// extraction.rs
//
// End-to-end extraction scenarios over hand-built syntax trees,
// exercising only the public crate surface.
//

use grackle::ast::{
    AssignStat, AssignTarget, Block, CallExpr, CallStat, Chunk, Expr, FuncBody, FuncName,
    FunctionStat, IfClause, IfStat, Indexer, LocalStat, MemberExpr, MemberTarget, Name, Param,
    Span, Stat, SyntaxTree,
};
use grackle::extractor::{extract, extract_with_scope, ExtractError};
use grackle::symbol_table::{GlobalSymbolTable, Primitive};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn chunk(stats: Vec<Stat>) -> SyntaxTree {
    SyntaxTree::Chunk(Chunk {
        block: Block::new(stats),
        span: Span::new(1, 100),
    })
}

fn body(params: &[&str], stats: Vec<Stat>, line: u32) -> FuncBody {
    FuncBody {
        params: params.iter().map(|p| Param::Name(p.to_string())).collect(),
        block: Block::new(stats),
        span: Span::new(line, line + 5),
    }
}

fn member_call(base: &str, member: &str, args: Vec<Expr>, line: u32) -> CallExpr {
    CallExpr {
        callee: Expr::Member(Box::new(MemberExpr {
            base: Expr::name(base, line),
            indexer: Indexer::Dot,
            member: Name::new(member, line),
        })),
        args,
        line,
    }
}

/// Builds the tree of a small but realistic gamemode file:
///
/// ```lua
/// GM.Name = "Deathmatch"                      -- line 1
/// roundsPlayed = 0                            -- line 2
///
/// local plymeta = FindMetaTable("Player")     -- line 4
///
/// function plymeta:AddScore(points)           -- line 6
///     hook.Run("ScoreChanged", self, points)  -- line 7
/// end
///
/// function GM:PlayerSpawn(ply)                -- line 10
///     if ply:IsBot() then
///         local greeting = "beep"             -- line 12
///     else
///         greeting = "welcome"                -- line 14
///     end
///     hook.Call("PlayerGreeted", GAMEMODE, ply, 5)  -- line 16
/// end
/// ```
fn gamemode_tree() -> SyntaxTree {
    let add_score = Stat::Function(FunctionStat {
        name: FuncName::Member {
            base: Expr::name("plymeta", 6),
            indexer: Indexer::Colon,
            member: Name::new("AddScore", 6),
        },
        is_local: false,
        body: body(
            &["points"],
            vec![Stat::Call(CallStat {
                call: member_call(
                    "hook",
                    "Run",
                    vec![
                        Expr::string("ScoreChanged", 7),
                        Expr::name("self", 7),
                        Expr::name("points", 7),
                    ],
                    7,
                ),
            })],
            6,
        ),
        line: 6,
    });

    let branches = Stat::If(IfStat {
        clauses: vec![
            IfClause {
                cond: Some(Expr::name("isbot", 11)),
                block: Block::new(vec![Stat::Local(LocalStat {
                    names: vec![Name::new("greeting", 12)],
                    values: vec![Expr::string("beep", 12)],
                    line: 12,
                })]),
            },
            IfClause {
                cond: None,
                block: Block::new(vec![Stat::Assign(AssignStat {
                    targets: vec![AssignTarget::Name(Name::new("greeting", 14))],
                    values: vec![Expr::string("welcome", 14)],
                    line: 14,
                })]),
            },
        ],
        line: 11,
    });

    let player_spawn = Stat::Function(FunctionStat {
        name: FuncName::Member {
            base: Expr::name("GM", 10),
            indexer: Indexer::Colon,
            member: Name::new("PlayerSpawn", 10),
        },
        is_local: false,
        body: body(
            &["ply"],
            vec![
                branches,
                Stat::Call(CallStat {
                    call: member_call(
                        "hook",
                        "Call",
                        vec![
                            Expr::string("PlayerGreeted", 16),
                            Expr::name("GAMEMODE", 16),
                            Expr::name("ply", 16),
                            Expr::number(5.0, 16),
                        ],
                        16,
                    ),
                }),
            ],
            10,
        ),
        line: 10,
    });

    chunk(vec![
        Stat::Assign(AssignStat {
            targets: vec![AssignTarget::Member(MemberTarget {
                base: Expr::name("GM", 1),
                indexer: Indexer::Dot,
                member: Name::new("Name", 1),
            })],
            values: vec![Expr::string("Deathmatch", 1)],
            line: 1,
        }),
        Stat::Assign(AssignStat {
            targets: vec![AssignTarget::Name(Name::new("roundsPlayed", 2))],
            values: vec![Expr::number(0.0, 2)],
            line: 2,
        }),
        Stat::Local(LocalStat {
            names: vec![Name::new("plymeta", 4)],
            values: vec![Expr::Call(Box::new(CallExpr {
                callee: Expr::name("FindMetaTable", 4),
                args: vec![Expr::string("Player", 4)],
                line: 4,
            }))],
            line: 4,
        }),
        add_score,
        player_spawn,
    ])
}

#[test]
fn extracts_full_gamemode_inventory() {
    init_logging();
    let table = extract(&gamemode_tree(), "gamemodes/deathmatch/init.lua").unwrap();

    // One plain global: roundsPlayed. The branch-local `greeting` in the
    // else branch surfaces as a global too, since the `local greeting` of
    // the sibling branch must not leak across.
    let names: Vec<&str> = table.variables().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["roundsPlayed", "greeting"]);
    assert_eq!(table.variables()[0].kind, Primitive::Number);
    assert_eq!(table.variables()[1].kind, Primitive::String);
    assert_eq!(table.variables()[1].line, 14);

    // GM.Name is a member variable on the plain GM table
    assert_eq!(table.member_variables().len(), 1);
    let gm_name = &table.member_variables()[0];
    assert!(!gm_name.on_metatable);
    assert_eq!(gm_name.owner, "GM");
    assert_eq!(gm_name.variable.kind, Primitive::String);

    // plymeta:AddScore resolves through the alias; GM:PlayerSpawn stays
    // on the plain table. Both record the implicit self receiver.
    assert_eq!(table.member_functions().len(), 2);
    let add_score = &table.member_functions()[0];
    assert!(add_score.on_metatable);
    assert_eq!(add_score.owner, "Player");
    assert_eq!(add_score.indexer, Indexer::Colon);
    assert_eq!(add_score.function.name, "AddScore");
    assert_eq!(add_score.function.parameters, vec!["self", "points"]);

    let player_spawn = &table.member_functions()[1];
    assert!(!player_spawn.on_metatable);
    assert_eq!(player_spawn.owner, "GM");
    assert_eq!(player_spawn.function.parameters, vec!["self", "ply"]);
    assert_eq!(player_spawn.function.line, 10);

    // Hooks: identifier arguments keep their names, the numeric literal
    // becomes a positional placeholder, and hook.Call skips the
    // gamemode-table argument.
    assert_eq!(table.hooks().len(), 2);
    assert_eq!(table.hooks()[0].name, "ScoreChanged");
    assert_eq!(table.hooks()[0].parameters, vec!["self", "points"]);
    assert_eq!(table.hooks()[1].name, "PlayerGreeted");
    assert_eq!(table.hooks()[1].parameters, vec!["ply", "arg2"]);

    // Every entry is traceable to the unit
    assert!(table
        .hooks()
        .iter()
        .all(|h| h.unit_id == "gamemodes/deathmatch/init.lua"));
}

#[test]
fn repeated_extraction_is_deterministic() {
    let tree = gamemode_tree();
    let first = extract(&tree, "init.lua").unwrap();
    let second = extract(&tree, "init.lua").unwrap();
    assert_eq!(first, second);
}

#[test]
fn root_scope_is_available_for_introspection() {
    let (_, root) = extract_with_scope(&gamemode_tree(), "init.lua").unwrap();
    assert!(!root.is_local("plymeta"));
    assert!(root.has_metatable_alias("plymeta"));
    assert_eq!(root.resolve_metatable_alias("plymeta"), Some("Player"));
}

#[test]
fn fragment_roots_are_rejected() {
    let statement = SyntaxTree::Statement(Box::new(Stat::Break(1)));
    assert_eq!(
        extract(&statement, "repl").unwrap_err(),
        ExtractError::NotAProgram("statement")
    );

    let expression = SyntaxTree::Expression(Box::new(Expr::name("x", 1)));
    assert!(matches!(
        extract(&expression, "repl"),
        Err(ExtractError::NotAProgram("expression"))
    ));
}

#[test]
fn tables_merge_across_units() {
    let first_unit = chunk(vec![Stat::Assign(AssignStat {
        targets: vec![AssignTarget::Name(Name::new("Config", 1))],
        values: vec![Expr::string("a", 1)],
        line: 1,
    })]);
    let second_unit = chunk(vec![Stat::Function(FunctionStat {
        name: FuncName::Name(Name::new("Setup", 1)),
        is_local: false,
        body: body(&[], vec![], 1),
        line: 1,
    })]);

    let mut merged = GlobalSymbolTable::new();
    merged.merge(extract(&first_unit, "a.lua").unwrap());
    merged.merge(extract(&second_unit, "b.lua").unwrap());

    assert_eq!(merged.variables().len(), 1);
    assert_eq!(merged.functions().len(), 1);
    assert_eq!(merged.variables()[0].unit_id, "a.lua");
    assert_eq!(merged.functions()[0].unit_id, "b.lua");
}

#[test]
fn inventory_round_trips_through_json() {
    let table = extract(&gamemode_tree(), "init.lua").unwrap();
    let json = serde_json::to_string_pretty(&table).unwrap();

    // The access operator serializes as the literal source token
    assert!(json.contains("\":\""));
    assert!(json.contains("\"string\""));

    let back: GlobalSymbolTable = serde_json::from_str(&json).unwrap();
    assert_eq!(back, table);
}
