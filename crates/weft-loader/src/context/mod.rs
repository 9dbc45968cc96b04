//! Static execution contexts
//!
//! Every method runs under exactly one static context: the VM-internal
//! context shared by VM and class-library code, or one of the two
//! application contexts (transactional / non-transactional) that weft keeps
//! separate instrumented method bodies for. VM and library methods are not
//! instrumented, so a single context suffices for them; application methods
//! get one resolved instance per application context.

mod classify;
mod prefixes;
mod resolve;

pub use classify::ContextClassifier;
pub use prefixes::PrefixTable;
pub use resolve::ContextResolver;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Static execution context of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Context {
    /// VM-internal and class-library code.
    Vm,
    /// Application code running inside a transaction.
    Trans,
    /// Application code running outside any transaction.
    NonTrans,
}

/// The lone context set shared by library and VM types.
pub const VM_ONLY: &[Context] = &[Context::Vm];

/// The context set of application types, one slot per instrumentation
/// variant.
pub const APP_CONTEXTS: &[Context] = &[Context::Trans, Context::NonTrans];

impl Context {
    /// Short display label.
    pub fn name(self) -> &'static str {
        match self {
            Context::Vm => "VM",
            Context::Trans => "TRANS",
            Context::NonTrans => "NONTRANS",
        }
    }

    /// True for the transactional application context.
    #[inline]
    pub fn is_trans(self) -> bool {
        self == Context::Trans
    }

    /// True for the non-transactional application context.
    #[inline]
    pub fn is_non_trans(self) -> bool {
        self == Context::NonTrans
    }

    /// True for either application context.
    #[inline]
    pub fn is_application(self) -> bool {
        self != Context::Vm
    }

    /// The opposite application context.
    ///
    /// Defined only on the two application contexts; `Vm` has no other
    /// side.
    pub fn other(self) -> Context {
        debug_assert!(self != Context::Vm, "Vm context has no opposite");
        match self {
            Context::Trans => Context::NonTrans,
            _ => Context::Trans,
        }
    }

    /// Meet of two context values, used when combining an inherited member
    /// with its declaring type.
    ///
    /// Idempotent; `Vm` absorbs; the two application contexts meet at
    /// `NonTrans`, the uninstrumented variant.
    pub fn meet(self, other: Context) -> Context {
        if self == other {
            self
        } else if self == Context::Vm || other == Context::Vm {
            Context::Vm
        } else {
            Context::NonTrans
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display label for a possibly-undetermined context.
///
/// `None` is the out-of-band result of a failed boundary search (the
/// diagnostic caller walk); it is never stored in a method.
pub fn name_of(context: Option<Context>) -> &'static str {
    match context {
        Some(c) => c.name(),
        None => "INVALID",
    }
}
