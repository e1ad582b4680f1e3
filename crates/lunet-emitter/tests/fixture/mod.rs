//! Shared test scaffolding: a table-driven resolver, a pass-through overload
//! namer, member builders, and one-call lowering runners.
#![allow(dead_code)]

use lunet_common::TranslationError;
use lunet_emitter::{
    ConstValue, EmitConfig, ExprArena, InvocationResolution, Lowerer, MemberFlags, MemberKind,
    MemberResolution, MemberSymbol, NodeIndex, OverloadNameResolver, ResolutionResult,
    SemanticResolver, TypeRef,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Resolver backed by an explicit node -> result table. Unlisted nodes
/// resolve to `Error`, matching a resolver with no information.
#[derive(Default)]
pub struct MapResolver {
    map: FxHashMap<NodeIndex, ResolutionResult>,
}

impl MapResolver {
    pub fn new() -> Self {
        MapResolver::default()
    }

    pub fn set(&mut self, node: NodeIndex, result: ResolutionResult) {
        self.map.insert(node, result);
    }
}

impl SemanticResolver for MapResolver {
    fn resolve(&self, node: NodeIndex) -> ResolutionResult {
        self.map
            .get(&node)
            .cloned()
            .unwrap_or(ResolutionResult::Error)
    }
}

/// Overload namer that emits source names unchanged, so expected output
/// stays readable.
pub struct PlainNames;

impl OverloadNameResolver for PlainNames {
    fn overload_name(&self, member: &MemberSymbol) -> String {
        member.name.clone()
    }
}

pub struct MemberBuilder(MemberSymbol);

impl MemberBuilder {
    pub fn new(kind: MemberKind, name: &str) -> Self {
        MemberBuilder(MemberSymbol {
            name: name.to_string(),
            full_name: format!("T.{name}"),
            kind,
            flags: MemberFlags::empty(),
            declaring_type: TypeRef::reference("T"),
            value_type: TypeRef::value("number"),
            inline_template: None,
            constant_value: None,
        })
    }

    pub fn field(name: &str) -> Self {
        MemberBuilder::new(MemberKind::Field, name)
    }

    pub fn property(name: &str) -> Self {
        MemberBuilder::new(MemberKind::Property, name)
    }

    pub fn method(name: &str) -> Self {
        MemberBuilder::new(MemberKind::Method, name)
    }

    pub fn event(name: &str) -> Self {
        MemberBuilder::new(MemberKind::Event, name)
    }

    pub fn declaring(mut self, ty: TypeRef) -> Self {
        self.0.full_name = format!("{}.{}", ty.name, self.0.name);
        self.0.declaring_type = ty;
        self
    }

    pub fn value_type(mut self, ty: TypeRef) -> Self {
        self.0.value_type = ty;
        self
    }

    pub fn flags(mut self, extra: MemberFlags) -> Self {
        self.0.flags |= extra;
        self
    }

    pub fn template(mut self, text: &str) -> Self {
        self.0.inline_template = Some(text.to_string());
        self
    }

    /// Mark the member compile-time constant with the given folded value.
    pub fn constant(mut self, value: ConstValue) -> Self {
        self.0.constant_value = Some(value);
        self.0.flags |= MemberFlags::COMPILE_TIME_CONST;
        self
    }

    pub fn build(self) -> Arc<MemberSymbol> {
        Arc::new(self.0)
    }
}

pub fn member_res(member: &Arc<MemberSymbol>, target: ResolutionResult) -> ResolutionResult {
    ResolutionResult::Member(MemberResolution {
        member: Arc::clone(member),
        target: Box::new(target),
        is_compile_time_constant: member.is_const(),
    })
}

pub fn invoke_res(member: &Arc<MemberSymbol>, target: ResolutionResult) -> ResolutionResult {
    ResolutionResult::Invocation(InvocationResolution {
        member: Arc::clone(member),
        target: Box::new(target),
        is_delegate_invocation: false,
    })
}

pub fn delegate_invoke_res(
    member: &Arc<MemberSymbol>,
    target: ResolutionResult,
) -> ResolutionResult {
    ResolutionResult::Invocation(InvocationResolution {
        member: Arc::clone(member),
        target: Box::new(target),
        is_delegate_invocation: true,
    })
}

pub fn lower(arena: &ExprArena, resolver: &MapResolver, root: NodeIndex) -> String {
    try_lower(arena, resolver, &EmitConfig::default(), root).expect("lowering failed")
}

pub fn lower_with(
    arena: &ExprArena,
    resolver: &MapResolver,
    config: &EmitConfig,
    root: NodeIndex,
) -> String {
    try_lower(arena, resolver, config, root).expect("lowering failed")
}

pub fn try_lower(
    arena: &ExprArena,
    resolver: &MapResolver,
    config: &EmitConfig,
    root: NodeIndex,
) -> Result<String, TranslationError> {
    let names = PlainNames;
    let mut lowerer = Lowerer::new(arena, resolver, &names, config);
    lowerer.lower_statement(root)?;
    Ok(lowerer.into_output())
}

/// Lower with the given local names in scope, for shadowing tests.
pub fn lower_locals(
    arena: &ExprArena,
    resolver: &MapResolver,
    locals: &[&str],
    root: NodeIndex,
) -> String {
    let names = PlainNames;
    let config = EmitConfig::default();
    let mut lowerer = Lowerer::new(arena, resolver, &names, &config);
    for local in locals {
        lowerer.declare_local(*local);
    }
    lowerer.lower_statement(root).expect("lowering failed");
    lowerer.into_output()
}
