//! Weft class-loading support
//!
//! This crate implements the static-context side of weft's class-loading
//! pipeline:
//! - Binary-name prefix classification (`context::PrefixTable`)
//! - Per-type context sets and per-method context resolution (`context`)
//! - The method specialization registry (`specialize`)
//! - Entry-point classification policy (`policy`)
//! - Optional call-site context verification counters (`stats`, behind the
//!   `context-stats` feature)
//!
//! Weft maintains distinct instrumented bodies of application methods, one
//! per application context (transactional / non-transactional). VM and
//! library methods are not instrumented and keep a single VM context. This
//! crate decides which contexts a method can run under and whether a call
//! site's caller and callee contexts are consistent; cloning the bodies and
//! inserting instrumentation happen elsewhere.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod context;
pub mod member;
pub mod policy;
pub mod specialize;
#[cfg(feature = "context-stats")]
pub mod stats;

pub use context::{
    name_of, Context, ContextClassifier, ContextResolver, PrefixTable, APP_CONTEXTS, VM_ONLY,
};
pub use member::{MethodRef, ResolvedMethod, TypeRef};
pub use policy::ContextPolicy;
pub use specialize::MethodTable;
#[cfg(feature = "context-stats")]
pub use stats::{caller_context, check_entry, inline_caller_context, CallSite, ContextStats};

/// Class-loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Specialization requested for a method whose owning type has a lone
    /// context
    #[error("method {0} belongs to a single-context type and cannot be specialized")]
    NotSpecializable(String),
}

/// Class-loading result
pub type LoaderResult<T> = Result<T, ContextError>;
