//! Method specialization registry
//!
//! Application methods get one resolved instance per application context so
//! that the cloning pass can maintain distinct instrumented bodies; VM and
//! library methods exist once. This registry keeps the instances and the
//! canonical method references. Creation is idempotent: racing resolution
//! threads compute identical field values from the same inputs, so the
//! first writer wins and redundant instances are dropped.

use crate::context::{Context, ContextResolver};
use crate::member::{MethodRef, ResolvedMethod, TypeRef};
use crate::{ContextError, LoaderResult};
use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

type FxDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Identity of a method: owning type, name, descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemberKey {
    type_name: Arc<str>,
    name: Arc<str>,
    descriptor: Arc<str>,
}

impl MemberKey {
    fn of(method_ref: &MethodRef) -> Self {
        Self {
            type_name: method_ref.type_ref().name_arc(),
            name: method_ref.name_arc(),
            descriptor: method_ref.descriptor_arc(),
        }
    }
}

/// Registry of canonical method references and their resolved instances.
///
/// Instances are keyed by member identity plus a context slot: `None` for
/// methods that exist once, `Some(context)` for specialized application
/// instances.
#[derive(Debug, Default)]
pub struct MethodTable {
    resolver: ContextResolver,
    refs: FxDashMap<MemberKey, Arc<MethodRef>>,
    methods: FxDashMap<(MemberKey, Option<Context>), Arc<ResolvedMethod>>,
}

impl MethodTable {
    /// Table over the default prefix table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table over a custom resolver.
    pub fn with_resolver(resolver: ContextResolver) -> Self {
        Self {
            resolver,
            refs: FxDashMap::default(),
            methods: FxDashMap::default(),
        }
    }

    /// The resolver backing this table.
    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }

    /// Canonical method reference for the given member triple.
    pub fn reference(&self, type_name: &str, name: &str, descriptor: &str) -> Arc<MethodRef> {
        let key = MemberKey {
            type_name: Arc::from(type_name),
            name: Arc::from(name),
            descriptor: Arc::from(descriptor),
        };
        self.refs
            .entry(key)
            .or_insert_with(|| MethodRef::new(TypeRef::new(type_name), name, descriptor))
            .value()
            .clone()
    }

    /// Resolved instance of `method_ref` under `context`, created on first
    /// request.
    ///
    /// Specialized methods resolve to the instance of the requested
    /// application context. Lone-context methods have a single instance and
    /// `context` does not participate in keying. An ambiguous method that
    /// was never specialized resolves to its single shared instance (see
    /// [`MethodTable::resolve_unspecialized`] for the interface-inherit
    /// variant).
    pub fn resolve(&self, method_ref: &Arc<MethodRef>, context: Context) -> Arc<ResolvedMethod> {
        let classifier = self.resolver.classifier();
        if method_ref.has_multiple_resolved_contexts() {
            debug_assert!(
                context.is_application(),
                "specialized method {} resolved under {}",
                method_ref,
                context
            );
            self.instance(method_ref, Some(context), context, Some(context))
        } else if !classifier.has_multiple_contexts(method_ref.type_ref()) {
            let lone = self.resolver.lone_context(method_ref);
            self.instance(method_ref, None, lone, None)
        } else {
            let canonical = Context::Trans.meet(Context::NonTrans);
            self.instance(method_ref, None, canonical, None)
        }
    }

    /// Mark `method_ref` as tracking multiple resolved contexts and
    /// materialize both application instances.
    ///
    /// Errors when the owning type has a lone context: VM and library
    /// methods are never cloned, so specialization is an application-only
    /// concept.
    pub fn specialize(
        &self,
        method_ref: &Arc<MethodRef>,
    ) -> LoaderResult<(Arc<ResolvedMethod>, Arc<ResolvedMethod>)> {
        let classifier = self.resolver.classifier();
        if !classifier.has_multiple_contexts(method_ref.type_ref()) {
            return Err(ContextError::NotSpecializable(method_ref.to_string()));
        }
        method_ref.mark_multiple_resolved_contexts();
        let trans = self.instance(
            method_ref,
            Some(Context::Trans),
            Context::Trans,
            Some(Context::Trans),
        );
        let non_trans = self.instance(
            method_ref,
            Some(Context::NonTrans),
            Context::NonTrans,
            Some(Context::NonTrans),
        );
        Ok((trans, non_trans))
    }

    /// Single shared instance for an ambiguous method inherited from
    /// `declaring` without being overridden.
    ///
    /// The owning class has both application contexts but the method body
    /// exists once; its static context is the meet of the owner's canonical
    /// application context and the declaring type's context.
    pub fn resolve_unspecialized(
        &self,
        method_ref: &Arc<MethodRef>,
        declaring: &TypeRef,
    ) -> Arc<ResolvedMethod> {
        let classifier = self.resolver.classifier();
        debug_assert!(
            classifier.has_multiple_contexts(method_ref.type_ref()),
            "unspecialized resolution of unambiguous method {}",
            method_ref
        );
        let owner = Context::Trans.meet(Context::NonTrans);
        let declared_contexts = classifier.static_contexts(declaring);
        let declared = if declared_contexts.len() == 1 {
            declared_contexts[0]
        } else {
            owner
        };
        self.instance(method_ref, None, owner.meet(declared), None)
    }

    /// Instance already resolved for the given slot, if any.
    pub fn resolved(
        &self,
        method_ref: &MethodRef,
        slot: Option<Context>,
    ) -> Option<Arc<ResolvedMethod>> {
        self.methods
            .get(&(MemberKey::of(method_ref), slot))
            .map(|entry| entry.value().clone())
    }

    /// Number of resolved instances in the table.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    fn instance(
        &self,
        method_ref: &Arc<MethodRef>,
        slot: Option<Context>,
        static_context: Context,
        resolved_context: Option<Context>,
    ) -> Arc<ResolvedMethod> {
        self.methods
            .entry((MemberKey::of(method_ref), slot))
            .or_insert_with(|| {
                ResolvedMethod::new(Arc::clone(method_ref), static_context, resolved_context)
            })
            .value()
            .clone()
    }
}
