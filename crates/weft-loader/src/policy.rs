//! Entry-point context policy
//!
//! JNI entry points and finalizer invocations have no declaring type to
//! classify from, and how they should be treated is unresolved: the stack
//! walker may not check JNI transitions correctly, and it is not clear what
//! finalizers should run under. Both currently alias to the VM context.
//! The fields are independently overridable; nothing in this crate
//! consults them.

use crate::context::Context;
use serde::{Deserialize, Serialize};

/// Classification policy for entry points whose context is not derivable
/// from a declaring type's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPolicy {
    /// Context assumed for JNI entry points.
    pub jni: Context,
    /// Context assumed for finalizer invocation.
    pub finalizer: Context,
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self {
            jni: Context::Vm,
            finalizer: Context::Vm,
        }
    }
}
