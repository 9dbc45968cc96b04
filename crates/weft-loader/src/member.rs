//! Type and method references
//!
//! The identities the context pass works over: an immutable binary type
//! name, a method reference shared by all specialized instances of a
//! method, and the per-context resolved instance itself.

use crate::context::Context;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Immutable fully-qualified binary type name, e.g. `Ljava/lang/String;`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: Arc<str>,
}

impl TypeRef {
    /// Reference to the type with the given binary name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// The binary name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Canonical reference to a method, shared by all of its resolved instances.
#[derive(Debug)]
pub struct MethodRef {
    type_ref: TypeRef,
    name: Arc<str>,
    descriptor: Arc<str>,
    /// Set when the owning type is ambiguous and the method has distinct
    /// per-context bodies. Flipped at most once, by specialization.
    multiple_resolved_contexts: AtomicBool,
}

impl MethodRef {
    /// Reference to the method `name descriptor` of `type_ref`.
    ///
    /// References created through [`MethodTable::reference`] are canonical
    /// within that table; this constructor is for embedders that keep their
    /// own member interning.
    ///
    /// [`MethodTable::reference`]: crate::specialize::MethodTable::reference
    pub fn new(
        type_ref: TypeRef,
        name: impl Into<Arc<str>>,
        descriptor: impl Into<Arc<str>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            type_ref,
            name: name.into(),
            descriptor: descriptor.into(),
            multiple_resolved_contexts: AtomicBool::new(false),
        })
    }

    /// The owning type.
    #[inline]
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Method name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method descriptor.
    #[inline]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Does this method keep one resolved instance per application context?
    #[inline]
    pub fn has_multiple_resolved_contexts(&self) -> bool {
        self.multiple_resolved_contexts.load(Ordering::Acquire)
    }

    pub(crate) fn mark_multiple_resolved_contexts(&self) {
        self.multiple_resolved_contexts.store(true, Ordering::Release);
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub(crate) fn descriptor_arc(&self) -> Arc<str> {
        Arc::clone(&self.descriptor)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.type_ref, self.name, self.descriptor)
    }
}

/// One resolved instance of a method.
///
/// Lone-context methods have exactly one instance; specialized application
/// methods have one per application context. Context fields are assigned at
/// creation and never change.
#[derive(Debug)]
pub struct ResolvedMethod {
    member_ref: Arc<MethodRef>,
    static_context: Context,
    resolved_context: Option<Context>,
}

impl ResolvedMethod {
    pub(crate) fn new(
        member_ref: Arc<MethodRef>,
        static_context: Context,
        resolved_context: Option<Context>,
    ) -> Arc<Self> {
        Arc::new(Self {
            member_ref,
            static_context,
            resolved_context,
        })
    }

    /// The shared method reference.
    #[inline]
    pub fn member_ref(&self) -> &Arc<MethodRef> {
        &self.member_ref
    }

    /// Context determined at resolution time from the declaring type's name
    /// (and, for specialized instances, from the specialization itself).
    #[inline]
    pub fn static_context(&self) -> Context {
        self.static_context
    }

    /// The specialization this instance was created for; `None` for
    /// instances that exist once.
    #[inline]
    pub fn resolved_context(&self) -> Option<Context> {
        self.resolved_context
    }
}

impl fmt::Display for ResolvedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolved_context {
            Some(context) => write!(f, "{} [{}]", self.member_ref, context),
            None => write!(f, "{}", self.member_ref),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_name() {
        let t = TypeRef::new("Ljava/lang/String;");
        assert_eq!(t.name(), "Ljava/lang/String;");
        assert_eq!(t.to_string(), "Ljava/lang/String;");
    }

    #[test]
    fn test_method_ref_display() {
        let m = MethodRef::new(TypeRef::new("Lcom/app/Bar;"), "run", "()V");
        assert_eq!(m.to_string(), "Lcom/app/Bar;.run()V");
        assert!(!m.has_multiple_resolved_contexts());
    }

    #[test]
    fn test_multiple_resolved_contexts_flag() {
        let m = MethodRef::new(TypeRef::new("Lcom/app/Bar;"), "run", "()V");
        m.mark_multiple_resolved_contexts();
        assert!(m.has_multiple_resolved_contexts());
    }
}
