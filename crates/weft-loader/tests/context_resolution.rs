//! Integration tests for static context classification and resolution
//!
//! Covers the classifier over the default prefix table, the resolver's
//! strict and permissive match modes, and the specialization registry.

use std::sync::Arc;
use weft_loader::{
    Context, ContextClassifier, MethodTable, PrefixTable, TypeRef, APP_CONTEXTS, VM_ONLY,
};

#[test]
fn test_library_type_classifies_to_vm() {
    let classifier = ContextClassifier::new();
    let contexts = classifier.static_contexts(&TypeRef::new("Ljava/lang/String;"));
    assert_eq!(contexts, VM_ONLY);
}

#[test]
fn test_vm_type_classifies_to_vm() {
    let classifier = ContextClassifier::new();
    let contexts = classifier.static_contexts(&TypeRef::new("Lorg/jikesrvm/Foo;"));
    assert_eq!(contexts, VM_ONLY);
}

#[test]
fn test_application_type_classifies_to_both_contexts() {
    let classifier = ContextClassifier::new();
    let contexts = classifier.static_contexts(&TypeRef::new("Lcom/app/Bar;"));
    assert_eq!(contexts, APP_CONTEXTS);
}

#[test]
fn test_other_context_toggle() {
    assert_eq!(Context::Trans.other(), Context::NonTrans);
    assert_eq!(Context::NonTrans.other(), Context::Trans);
}

#[test]
fn test_library_method_matching() {
    let table = MethodTable::new();
    let m = table.reference("Ljava/lang/String;", "length", "()I");
    let resolved = table.resolve(&m, Context::Vm);
    assert_eq!(resolved.static_context(), Context::Vm);

    let resolver = table.resolver();
    // Strict matching needs the exact static context.
    assert!(!resolver.matches(&resolved, Context::Trans, true));
    assert!(!resolver.matches(&resolved, Context::NonTrans, true));
    assert!(resolver.matches(&resolved, Context::Vm, true));
    // Without strictness the calling context is immaterial.
    assert!(resolver.matches(&resolved, Context::Trans, false));
    assert!(resolver.matches(&resolved, Context::NonTrans, false));
    assert!(resolver.matches(&resolved, Context::Vm, false));
}

#[test]
fn test_specialized_method_matching() {
    let table = MethodTable::new();
    let m = table.reference("Lcom/app/Bar;", "run", "()V");
    let (trans, non_trans) = table.specialize(&m).unwrap();

    let resolver = table.resolver();
    for strict in [true, false] {
        assert!(resolver.matches(&trans, Context::Trans, strict));
        assert!(!resolver.matches(&trans, Context::NonTrans, strict));
        assert!(resolver.matches(&non_trans, Context::NonTrans, strict));
        assert!(!resolver.matches(&non_trans, Context::Trans, strict));
        assert!(!resolver.matches(&trans, Context::Vm, strict));
    }
}

// Known permissive edge case: an application class that implements an
// interface without overriding one of its methods keeps a single instance
// shared by both contexts, and that instance matches any context, strict or
// not.
#[test]
fn test_unspecialized_application_method_matches_everything() {
    let table = MethodTable::new();
    let m = table.reference("Lhedc/MetaSearchResultIterator;", "next", "()Ljava/lang/Object;");
    let resolved = table.resolve_unspecialized(&m, &TypeRef::new("Ljava/util/Iterator;"));

    let resolver = table.resolver();
    for context in [Context::Vm, Context::Trans, Context::NonTrans] {
        assert!(resolver.matches(&resolved, context, true));
        assert!(resolver.matches(&resolved, context, false));
    }
}

#[test]
fn test_static_context_ignores_hint_for_unambiguous_types() {
    let table = MethodTable::new();
    let resolver = table.resolver();
    let m = table.reference("Ljava/lang/String;", "length", "()I");
    assert_eq!(resolver.static_context(&m, Context::Trans), Context::Vm);

    let vm = table.reference("Lorg/jikesrvm/Foo;", "boot", "()V");
    assert_eq!(resolver.static_context(&vm, Context::NonTrans), Context::Vm);
}

#[test]
fn test_static_context_uses_hint_for_ambiguous_types() {
    let table = MethodTable::new();
    let resolver = table.resolver();
    let m = table.reference("Lcom/app/Bar;", "run", "()V");
    assert_eq!(resolver.static_context(&m, Context::Trans), Context::Trans);
    assert_eq!(
        resolver.static_context(&m, Context::NonTrans),
        Context::NonTrans
    );
}

#[test]
fn test_resolution_is_idempotent_across_threads() {
    let table = Arc::new(MethodTable::new());
    let m = table.reference("Lcom/app/Bar;", "run", "()V");
    table.specialize(&m).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let table = Arc::clone(&table);
            let m = Arc::clone(&m);
            std::thread::spawn(move || {
                let context = if i % 2 == 0 {
                    Context::Trans
                } else {
                    Context::NonTrans
                };
                table.resolve(&m, context)
            })
        })
        .collect();
    let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Every thread requesting a given context observed the same instance.
    for pair in resolved.chunks(2) {
        assert!(Arc::ptr_eq(&pair[0], &resolved[0]));
        assert!(Arc::ptr_eq(&pair[1], &resolved[1]));
    }
    assert_eq!(table.len(), 2);
}

#[test]
fn test_default_prefix_table_is_disjoint() {
    assert!(PrefixTable::default().is_disjoint());
}

#[test]
fn test_prefix_table_round_trips_through_config() {
    let table = PrefixTable::new(
        vec!["Lstd/".to_string(), "Lcore/".to_string()],
        vec!["Lkernel/".to_string()],
    );
    let json = serde_json::to_string(&table).unwrap();
    let restored: PrefixTable = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, table);
    assert!(restored.is_library("Lcore/List;"));
    assert!(restored.is_vm("Lkernel/Heap;"));
}
