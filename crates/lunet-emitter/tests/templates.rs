//! Inline-template emission: receiver substitution, deferred argument
//! completion, bare-reference errors, and static callable prefixes.

mod fixture;

use fixture::*;
use lunet_common::{Span, TranslationErrorKind};
use lunet_emitter::{
    AssignmentOp, ConstValue, EmitConfig, ExprArena, MemberFlags, ResolutionResult, TypeRef,
};

fn s() -> Span {
    Span::empty()
}

#[test]
fn test_receiver_template_substitutes_the_target() {
    let mut arena = ExprArena::new();
    let target = arena.push_identifier(s(), "s");
    let access = arena.push_member_access(s(), target, "Trim");
    let call = arena.push_invocation(s(), access, vec![]);
    let stmt = arena.push_expression_statement(s(), call);

    let trim = MemberBuilder::method("Trim")
        .template("string.trim({this})")
        .build();

    let mut resolver = MapResolver::new();
    resolver.set(target, ResolutionResult::Local);
    resolver.set(access, member_res(&trim, ResolutionResult::Local));
    resolver.set(call, invoke_res(&trim, ResolutionResult::Local));

    assert_eq!(lower(&arena, &resolver, stmt), "string.trim(s)");
}

#[test]
fn test_receiver_template_argument_hole_is_filled_later() {
    let mut arena = ExprArena::new();
    let target = arena.push_identifier(s(), "s");
    let access = arena.push_member_access(s(), target, "Repeat");
    let n = arena.push_literal(s(), ConstValue::Int(3));
    let call = arena.push_invocation(s(), access, vec![n]);
    let stmt = arena.push_expression_statement(s(), call);

    let repeat = MemberBuilder::method("Repeat")
        .template("string.rep({this}, {0})")
        .build();

    let mut resolver = MapResolver::new();
    resolver.set(target, ResolutionResult::Local);
    resolver.set(access, member_res(&repeat, ResolutionResult::Local));
    resolver.set(call, invoke_res(&repeat, ResolutionResult::Local));

    assert_eq!(lower(&arena, &resolver, stmt), "string.rep(s, 3)");
}

#[test]
fn test_receiver_template_on_property_writes_in_place() {
    let mut arena = ExprArena::new();
    let x = arena.push_identifier(s(), "x");
    let target = arena.push_identifier(s(), "s");
    let access = arena.push_member_access(s(), target, "Length");
    let assign = arena.push_assignment(s(), AssignmentOp::Assign, x, access);
    let stmt = arena.push_expression_statement(s(), assign);

    let length = MemberBuilder::property("Length").template("#{this}").build();

    let mut resolver = MapResolver::new();
    resolver.set(target, ResolutionResult::Local);
    resolver.set(access, member_res(&length, ResolutionResult::Local));

    assert_eq!(lower(&arena, &resolver, stmt), "x = #s");
}

#[test]
fn test_bare_reference_to_receiver_templated_method_is_an_error() {
    let mut arena = ExprArena::new();
    let x = arena.push_identifier(s(), "x");
    let target = arena.push_identifier(s(), "s");
    let access = arena.push_member_access(s(), target, "Trim");
    let assign = arena.push_assignment(s(), AssignmentOp::Assign, x, access);
    let stmt = arena.push_expression_statement(s(), assign);

    let trim = MemberBuilder::method("Trim")
        .template("string.trim({this})")
        .build();

    let mut resolver = MapResolver::new();
    resolver.set(target, ResolutionResult::Local);
    resolver.set(access, member_res(&trim, ResolutionResult::Local));

    let err = try_lower(&arena, &resolver, &EmitConfig::default(), stmt).unwrap_err();
    assert_eq!(err.kind, TranslationErrorKind::InvalidTemplateUsage);
    assert_eq!(err.member, "T.Trim");
}

#[test]
fn test_static_template_invocation_fills_holes() {
    let mut arena = ExprArena::new();
    let math = arena.push_identifier(s(), "Math");
    let access = arena.push_member_access(s(), math, "Abs");
    let x = arena.push_identifier(s(), "x");
    let call = arena.push_invocation(s(), access, vec![x]);
    let stmt = arena.push_expression_statement(s(), call);

    let abs = MemberBuilder::method("Abs")
        .declaring(TypeRef::reference("Math"))
        .flags(MemberFlags::STATIC)
        .template("math.abs({0})")
        .build();

    let math_ty = ResolutionResult::TypeRef(TypeRef::reference("Math"));
    let mut resolver = MapResolver::new();
    resolver.set(math, math_ty.clone());
    resolver.set(access, member_res(&abs, math_ty.clone()));
    resolver.set(call, invoke_res(&abs, math_ty));

    assert_eq!(lower(&arena, &resolver, stmt), "math.abs(x)");
}

#[test]
fn test_bare_static_templated_method_emits_callable_prefix() {
    let mut arena = ExprArena::new();
    let x = arena.push_identifier(s(), "x");
    let math = arena.push_identifier(s(), "Math");
    let access = arena.push_member_access(s(), math, "Abs");
    let assign = arena.push_assignment(s(), AssignmentOp::Assign, x, access);
    let stmt = arena.push_expression_statement(s(), assign);

    let abs = MemberBuilder::method("Abs")
        .declaring(TypeRef::reference("Math"))
        .flags(MemberFlags::STATIC)
        .template("math.abs({0})")
        .build();

    let math_ty = ResolutionResult::TypeRef(TypeRef::reference("Math"));
    let mut resolver = MapResolver::new();
    resolver.set(math, math_ty.clone());
    resolver.set(access, member_res(&abs, math_ty));

    assert_eq!(lower(&arena, &resolver, stmt), "x = math.abs");
}

#[test]
fn test_bare_static_method_with_uncallable_template_is_an_error() {
    let mut arena = ExprArena::new();
    let x = arena.push_identifier(s(), "x");
    let math = arena.push_identifier(s(), "Math");
    let access = arena.push_member_access(s(), math, "Inc");
    let assign = arena.push_assignment(s(), AssignmentOp::Assign, x, access);
    let stmt = arena.push_expression_statement(s(), assign);

    let inc = MemberBuilder::method("Inc")
        .declaring(TypeRef::reference("Math"))
        .flags(MemberFlags::STATIC)
        .template("{0} + 1")
        .build();

    let math_ty = ResolutionResult::TypeRef(TypeRef::reference("Math"));
    let mut resolver = MapResolver::new();
    resolver.set(math, math_ty.clone());
    resolver.set(access, member_res(&inc, math_ty));

    let err = try_lower(&arena, &resolver, &EmitConfig::default(), stmt).unwrap_err();
    assert_eq!(err.kind, TranslationErrorKind::MalformedTemplate);
}

#[test]
fn test_bare_static_templated_property_fills_in_place() {
    let mut arena = ExprArena::new();
    let x = arena.push_identifier(s(), "x");
    let num = arena.push_identifier(s(), "Number");
    let access = arena.push_member_access(s(), num, "MaxValue");
    let assign = arena.push_assignment(s(), AssignmentOp::Assign, x, access);
    let stmt = arena.push_expression_statement(s(), assign);

    let max = MemberBuilder::property("MaxValue")
        .declaring(TypeRef::reference("Number"))
        .flags(MemberFlags::STATIC)
        .template("math.huge")
        .build();

    let num_ty = ResolutionResult::TypeRef(TypeRef::reference("Number"));
    let mut resolver = MapResolver::new();
    resolver.set(num, num_ty.clone());
    resolver.set(access, member_res(&max, num_ty));

    assert_eq!(lower(&arena, &resolver, stmt), "x = math.huge");
}
