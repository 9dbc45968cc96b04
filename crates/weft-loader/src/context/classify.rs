//! Type-level context classification

use super::{Context, PrefixTable, APP_CONTEXTS, VM_ONLY};
use crate::member::TypeRef;

/// Classifies types into their static context sets.
///
/// Classification is a pure function of the type's binary name and the
/// prefix table: library and VM types get the lone `Vm` context, everything
/// else gets both application contexts. Queries take `&self` only and are
/// safe to call from any number of class-resolution threads.
#[derive(Debug, Clone, Default)]
pub struct ContextClassifier {
    prefixes: PrefixTable,
}

impl ContextClassifier {
    /// Classifier over the default prefix table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier over a custom prefix table.
    pub fn with_table(prefixes: PrefixTable) -> Self {
        Self { prefixes }
    }

    /// The prefix table backing this classifier.
    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Static context set of a type: `[Vm]` for library and VM types,
    /// `[Trans, NonTrans]` for application types.
    pub fn static_contexts(&self, type_ref: &TypeRef) -> &'static [Context] {
        // Library list first; a conforming table never matches both.
        if self.prefixes.is_library(type_ref.name()) || self.prefixes.is_vm(type_ref.name()) {
            VM_ONLY
        } else {
            APP_CONTEXTS
        }
    }

    /// Does the type have both application contexts?
    #[inline]
    pub fn has_multiple_contexts(&self, type_ref: &TypeRef) -> bool {
        self.static_contexts(type_ref).len() > 1
    }

    /// Number of static contexts of the type (1 or 2).
    #[inline]
    pub fn context_count(&self, type_ref: &TypeRef) -> usize {
        self.static_contexts(type_ref).len()
    }

    /// Is the type part of the class library?
    #[inline]
    pub fn is_library(&self, type_ref: &TypeRef) -> bool {
        self.prefixes.is_library(type_ref.name())
    }

    /// Is the type VM-internal?
    #[inline]
    pub fn is_vm(&self, type_ref: &TypeRef) -> bool {
        self.prefixes.is_vm(type_ref.name())
    }

    /// Is the type application code?
    #[inline]
    pub fn is_application(&self, type_ref: &TypeRef) -> bool {
        self.prefixes.is_application(type_ref.name())
    }
}
