//! Call-site context verification
//!
//! Debug tooling for checking that caller and callee contexts agree at
//! library method entries. The embedder plants a hook at the prologue of
//! unambiguous-context methods, walks the physical stack to the caller
//! frame, and hands the resulting [`CallSite`] view to [`check_entry`];
//! this module picks the logical caller out of the inlining chain, tallies
//! one of four caller/callee buckets, and asserts context consistency.
//! An assertion failure here indicates a classification or specialization
//! bug elsewhere in the pipeline, not a collector bug.
//!
//! Counters are best-effort statistics under concurrency (relaxed atomics).
//! The embedder owns report timing, typically a process exit callback.

use crate::context::{name_of, Context, ContextResolver};
use crate::member::{MethodRef, ResolvedMethod};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Reflection trampoline types, excluded from caller/callee consistency
/// checks.
const REFLECTION_TYPES: &[&str] = &[
    "Lorg/jikesrvm/runtime/Reflection;",
    "Lorg/jikesrvm/runtime/ReflectionBase;",
];

/// Reflection invocation method, excluded like the trampoline types.
const INVOKE_INTERNAL: &str = "invokeInternal";

/// Caller/callee bucket counters for library method entries.
#[derive(Debug, Default)]
pub struct ContextStats {
    lib_called_by_lib_in_vm_context: AtomicU64,
    lib_called_by_lib_in_app_context: AtomicU64,
    lib_called_by_vm: AtomicU64,
    lib_called_by_app: AtomicU64,
}

impl ContextStats {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library entries whose logical caller is library code in VM context.
    pub fn lib_called_by_lib_in_vm_context(&self) -> u64 {
        self.lib_called_by_lib_in_vm_context.load(Ordering::Relaxed)
    }

    /// Library entries whose logical caller is library code in an
    /// application context.
    pub fn lib_called_by_lib_in_app_context(&self) -> u64 {
        self.lib_called_by_lib_in_app_context.load(Ordering::Relaxed)
    }

    /// Library entries whose logical caller is VM-internal code.
    pub fn lib_called_by_vm(&self) -> u64 {
        self.lib_called_by_vm.load(Ordering::Relaxed)
    }

    /// Library entries whose logical caller is application code.
    pub fn lib_called_by_app(&self) -> u64 {
        self.lib_called_by_app.load(Ordering::Relaxed)
    }

    /// Write all four counters.
    pub fn report(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "libCalledByLibInVmContext: {}",
            self.lib_called_by_lib_in_vm_context()
        )?;
        writeln!(
            out,
            "libCalledByLibInAppContext: {}",
            self.lib_called_by_lib_in_app_context()
        )?;
        writeln!(out, "libCalledByVm: {}", self.lib_called_by_vm())?;
        writeln!(out, "libCalledByApp: {}", self.lib_called_by_app())
    }
}

/// View of the physical caller frame at a checked entry.
#[derive(Debug, Clone)]
pub struct CallSite<'a> {
    /// Inlined methods at the return address, innermost first. Empty when
    /// the caller frame was not produced by the optimizing compiler.
    pub inline_chain: &'a [Arc<MethodRef>],
    /// The method owning the physical caller frame.
    pub physical: &'a Arc<ResolvedMethod>,
}

/// Static context determinable from the inlining chain alone.
///
/// A caller may be inlined through several levels whose owning types are
/// all ambiguous; the search walks the chain outward until a frame with a
/// lone static context appears. `None` means no frame in the chain was
/// determinable.
pub fn inline_caller_context(
    resolver: &ContextResolver,
    chain: &[Arc<MethodRef>],
) -> Option<Context> {
    for method_ref in chain {
        if !resolver
            .classifier()
            .has_multiple_contexts(method_ref.type_ref())
        {
            return Some(resolver.lone_context(method_ref));
        }
    }
    None
}

/// Static context of the logical caller: the inlining-chain search result,
/// falling back to the physical frame's own static context.
pub fn caller_context(resolver: &ContextResolver, site: &CallSite<'_>) -> Context {
    inline_caller_context(resolver, site.inline_chain)
        .unwrap_or_else(|| site.physical.static_context())
}

/// Verify and tally one library method entry.
///
/// `callee` is the method being entered; the hook is planted only at
/// methods whose owning type has a lone context.
pub fn check_entry(
    resolver: &ContextResolver,
    stats: &ContextStats,
    callee: &ResolvedMethod,
    site: &CallSite<'_>,
) {
    let classifier = resolver.classifier();
    debug_assert!(
        !classifier.has_multiple_contexts(callee.member_ref().type_ref()),
        "entry check planted on ambiguous method {}",
        callee.member_ref()
    );

    let caller_ref = site
        .inline_chain
        .first()
        .unwrap_or(site.physical.member_ref());
    let inline_context = inline_caller_context(resolver, site.inline_chain);
    let context = inline_context.unwrap_or_else(|| site.physical.static_context());

    let caller_type = caller_ref.type_ref();
    if classifier.is_library(caller_type) {
        debug_assert!(
            context == callee.static_context(),
            "caller context {} (inline search: {}) disagrees with callee {} of {}",
            context,
            name_of(inline_context),
            callee.static_context(),
            callee.member_ref()
        );
        if context == Context::Vm {
            stats
                .lib_called_by_lib_in_vm_context
                .fetch_add(1, Ordering::Relaxed);
        } else {
            stats
                .lib_called_by_lib_in_app_context
                .fetch_add(1, Ordering::Relaxed);
        }
    } else if classifier.is_vm(caller_type) {
        if !is_reflection_trampoline(caller_ref) {
            debug_assert!(
                context == Context::Vm && callee.static_context() == Context::Vm,
                "VM-internal caller {} presents {} entering {} of {}",
                caller_ref,
                context,
                callee.static_context(),
                callee.member_ref()
            );
        }
        stats.lib_called_by_vm.fetch_add(1, Ordering::Relaxed);
    } else {
        stats.lib_called_by_app.fetch_add(1, Ordering::Relaxed);
    }
}

fn is_reflection_trampoline(method_ref: &MethodRef) -> bool {
    REFLECTION_TYPES.contains(&method_ref.type_ref().name())
        || method_ref.name() == INVOKE_INTERNAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specialize::MethodTable;

    fn library_callee(table: &MethodTable) -> Arc<ResolvedMethod> {
        let m = table.reference("Ljava/lang/String;", "length", "()I");
        table.resolve(&m, Context::Vm)
    }

    #[test]
    fn test_inline_search_skips_ambiguous_frames() {
        let table = MethodTable::new();
        let resolver = table.resolver();
        let app = table.reference("Lcom/app/Bar;", "run", "()V");
        let lib = table.reference("Ljava/util/AbstractList;", "iterator", "()Ljava/util/Iterator;");
        let chain = [Arc::clone(&app), Arc::clone(&lib)];
        assert_eq!(
            inline_caller_context(resolver, &chain),
            Some(Context::Vm)
        );
        assert_eq!(inline_caller_context(resolver, &chain[..1]), None);
        assert_eq!(inline_caller_context(resolver, &[]), None);
    }

    #[test]
    fn test_caller_context_falls_back_to_physical_frame() {
        let table = MethodTable::new();
        let app = table.reference("Lcom/app/Bar;", "run", "()V");
        let (trans, _) = table.specialize(&app).unwrap();
        let inner = table.reference("Lcom/app/Helper;", "step", "()V");
        let chain = [Arc::clone(&inner)];
        let site = CallSite {
            inline_chain: &chain,
            physical: &trans,
        };
        assert_eq!(caller_context(table.resolver(), &site), Context::Trans);
    }

    #[test]
    fn test_entry_from_library_caller() {
        let table = MethodTable::new();
        let stats = ContextStats::new();
        let callee = library_callee(&table);
        let caller_ref = table.reference("Ljava/util/ArrayList;", "size", "()I");
        let caller = table.resolve(&caller_ref, Context::Vm);
        let site = CallSite {
            inline_chain: &[],
            physical: &caller,
        };
        check_entry(table.resolver(), &stats, &callee, &site);
        assert_eq!(stats.lib_called_by_lib_in_vm_context(), 1);
        assert_eq!(stats.lib_called_by_lib_in_app_context(), 0);
    }

    #[test]
    fn test_entry_from_vm_caller() {
        let table = MethodTable::new();
        let stats = ContextStats::new();
        let callee = library_callee(&table);
        let caller_ref = table.reference("Lorg/jikesrvm/scheduler/RVMThread;", "yield", "()V");
        let caller = table.resolve(&caller_ref, Context::Vm);
        let site = CallSite {
            inline_chain: &[],
            physical: &caller,
        };
        check_entry(table.resolver(), &stats, &callee, &site);
        assert_eq!(stats.lib_called_by_vm(), 1);
    }

    #[test]
    fn test_entry_from_application_caller() {
        let table = MethodTable::new();
        let stats = ContextStats::new();
        let callee = library_callee(&table);
        let app = table.reference("Lcom/app/Bar;", "run", "()V");
        let (_, non_trans) = table.specialize(&app).unwrap();
        let site = CallSite {
            inline_chain: &[],
            physical: &non_trans,
        };
        check_entry(table.resolver(), &stats, &callee, &site);
        assert_eq!(stats.lib_called_by_app(), 1);
    }

    #[test]
    fn test_reflection_trampoline_is_counted_without_checks() {
        let table = MethodTable::new();
        let stats = ContextStats::new();
        let callee = library_callee(&table);
        let caller_ref = table.reference(
            "Lorg/jikesrvm/runtime/Reflection;",
            "invoke",
            "()Ljava/lang/Object;",
        );
        let caller = table.resolve(&caller_ref, Context::Vm);
        let site = CallSite {
            inline_chain: &[],
            physical: &caller,
        };
        check_entry(table.resolver(), &stats, &callee, &site);
        assert_eq!(stats.lib_called_by_vm(), 1);
    }

    #[test]
    fn test_report_prints_all_buckets() {
        let stats = ContextStats::new();
        let mut out = Vec::new();
        stats.report(&mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("libCalledByLibInVmContext: 0"));
        assert!(report.contains("libCalledByLibInAppContext: 0"));
        assert!(report.contains("libCalledByVm: 0"));
        assert!(report.contains("libCalledByApp: 0"));
    }
}
