//! Enum literal emission across the configured modes, plus per-member
//! renames.

mod fixture;

use fixture::*;
use lunet_common::Span;
use lunet_emitter::{
    AssignmentOp, ConstValue, EmitConfig, EnumEmitMode, ExprArena, NodeIndex, ResolutionResult,
    TypeFlags, TypeRef,
};

fn s() -> Span {
    Span::empty()
}

fn color() -> TypeRef {
    TypeRef::new("Color", TypeFlags::ENUM)
}

/// Builds `x = Color.Red` with `Red` resolved as an enum member of value 1.
fn red_access(arena: &mut ExprArena, resolver: &mut MapResolver) -> NodeIndex {
    let x = arena.push_identifier(s(), "x");
    let ty = arena.push_identifier(s(), "Color");
    let access = arena.push_member_access(s(), ty, "Red");
    let assign = arena.push_assignment(s(), AssignmentOp::Assign, x, access);
    let stmt = arena.push_expression_statement(s(), assign);

    let red = MemberBuilder::field("Red")
        .declaring(color())
        .constant(ConstValue::Int(1))
        .build();
    resolver.set(ty, ResolutionResult::TypeRef(color()));
    resolver.set(access, member_res(&red, ResolutionResult::TypeRef(color())));
    stmt
}

fn config_with_mode(mode: EnumEmitMode) -> EmitConfig {
    let mut config = EmitConfig::default();
    config.enums.modes.insert("Color".to_string(), mode);
    config
}

#[test]
fn test_passthrough_keeps_member_access() {
    let mut arena = ExprArena::new();
    let mut resolver = MapResolver::new();
    let stmt = red_access(&mut arena, &mut resolver);
    assert_eq!(lower(&arena, &resolver, stmt), "x = Color.Red");
}

#[test]
fn test_numeric_mode_folds_the_value() {
    let mut arena = ExprArena::new();
    let mut resolver = MapResolver::new();
    let stmt = red_access(&mut arena, &mut resolver);
    let config = config_with_mode(EnumEmitMode::Numeric);
    assert_eq!(lower_with(&arena, &resolver, &config, stmt), "x = 1");
}

#[test]
fn test_lower_camel_mode_emits_a_string() {
    let mut arena = ExprArena::new();
    let mut resolver = MapResolver::new();
    let stmt = red_access(&mut arena, &mut resolver);
    let config = config_with_mode(EnumEmitMode::LowerCamel);
    assert_eq!(lower_with(&arena, &resolver, &config, stmt), "x = \"red\"");
}

#[test]
fn test_verbatim_mode_keeps_the_member_name() {
    let mut arena = ExprArena::new();
    let mut resolver = MapResolver::new();
    let stmt = red_access(&mut arena, &mut resolver);
    let config = config_with_mode(EnumEmitMode::Verbatim);
    assert_eq!(lower_with(&arena, &resolver, &config, stmt), "x = \"Red\"");
}

#[test]
fn test_uppercase_mode_shouts() {
    let mut arena = ExprArena::new();
    let mut resolver = MapResolver::new();
    let stmt = red_access(&mut arena, &mut resolver);
    let config = config_with_mode(EnumEmitMode::Uppercase);
    assert_eq!(lower_with(&arena, &resolver, &config, stmt), "x = \"RED\"");
}

#[test]
fn test_rename_wins_over_mode_casing() {
    let mut arena = ExprArena::new();
    let mut resolver = MapResolver::new();
    let stmt = red_access(&mut arena, &mut resolver);
    let mut config = config_with_mode(EnumEmitMode::LowerCamel);
    config
        .enums
        .renames
        .insert("Color.Red".to_string(), "crimson".to_string());
    assert_eq!(
        lower_with(&arena, &resolver, &config, stmt),
        "x = \"crimson\""
    );
}
