//! Per-method context resolution and call-site matching

use super::{Context, ContextClassifier};
use crate::member::{MethodRef, ResolvedMethod};

/// Resolves method contexts and validates caller/callee context pairs.
///
/// Built on a [`ContextClassifier`]; like the classifier, every query is a
/// pure function over immutable tables and needs no locking.
#[derive(Debug, Clone, Default)]
pub struct ContextResolver {
    classifier: ContextClassifier,
}

impl ContextResolver {
    /// Resolver over the default prefix table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver over a custom classifier.
    pub fn with_classifier(classifier: ContextClassifier) -> Self {
        Self { classifier }
    }

    /// The classifier this resolver is built on.
    pub fn classifier(&self) -> &ContextClassifier {
        &self.classifier
    }

    /// The single static context of an unambiguous method.
    ///
    /// Calling this on a method of an ambiguous (application) type is a
    /// programmer error.
    pub fn lone_context(&self, method_ref: &MethodRef) -> Context {
        let contexts = self.classifier.static_contexts(method_ref.type_ref());
        debug_assert!(
            contexts.len() == 1,
            "lone context requested for ambiguous type {}",
            method_ref.type_ref()
        );
        contexts[0]
    }

    /// Static context of a method instance.
    ///
    /// Ambiguous types carry one instance per application context, so the
    /// resolved context assigned to this particular instance decides;
    /// unambiguous types have a single determinable context and the hint is
    /// ignored.
    pub fn static_context(&self, method_ref: &MethodRef, resolved_hint: Context) -> Context {
        if self.classifier.has_multiple_contexts(method_ref.type_ref()) {
            resolved_hint
        } else {
            self.lone_context(method_ref)
        }
    }

    /// Does `method` match `context` at a call site?
    ///
    /// Specialized application methods match exactly their resolved
    /// context. Library and VM methods match exactly their static context
    /// under `strict` (needed when deciding whether to clone), and match
    /// any context otherwise — which context a library method is called
    /// from is immaterial. The remaining case is an application method that
    /// was never specialized: an application class can implement an
    /// interface without overriding one of its methods, leaving a single
    /// instance shared by both contexts. Such methods match any context.
    pub fn matches(&self, method: &ResolvedMethod, context: Context, strict: bool) -> bool {
        let method_ref = method.member_ref();
        if method_ref.has_multiple_resolved_contexts() {
            method.resolved_context() == Some(context)
        } else if !self.classifier.has_multiple_contexts(method_ref.type_ref()) {
            if strict {
                method.static_context() == context
            } else {
                true
            }
        } else if self.classifier.has_multiple_contexts(method_ref.type_ref()) {
            true
        } else {
            debug_assert!(false, "unreachable context match for {}", method_ref);
            false
        }
    }
}
