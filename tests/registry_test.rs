use std::sync::Arc;
use unfold::RegistryError;
use unfold::dsl::ConstructType;
use unfold::error::ExpansionError;
use unfold::expanders::{DoWhileExpander, ExpanderRegistry, SimpleExpander, TaskExpander};

#[test]
fn test_standard_registry_covers_authorable_constructs() {
    let registry = ExpanderRegistry::standard();

    for construct in [
        ConstructType::Leaf,
        ConstructType::Loop,
        ConstructType::Branch,
        ConstructType::FanOut,
        ConstructType::SubWorkflow,
    ] {
        let expander = registry.get(construct).expect("Expander missing");
        assert_eq!(expander.construct_type(), construct);
    }
    assert_eq!(registry.registered_types().len(), 5);
}

#[test]
fn test_join_has_no_expander() {
    let registry = ExpanderRegistry::standard();

    let err = registry.get(ConstructType::Join).unwrap_err();

    assert_eq!(err, ExpansionError::UnsupportedConstruct(ConstructType::Join));
    assert_eq!(err.reason(), "No expander registered for construct type JOIN");
}

#[test]
fn test_empty_registry_rejects_every_lookup() {
    let registry = ExpanderRegistry::new();

    assert!(registry.get(ConstructType::Loop).is_err());
    assert!(registry.registered_types().is_empty());
}

#[test]
fn test_register_rejects_duplicates() {
    let mut registry = ExpanderRegistry::new();
    registry
        .register(Arc::new(DoWhileExpander::new()))
        .expect("First registration failed");
    registry
        .register(Arc::new(SimpleExpander::new()))
        .expect("Second registration failed");

    let err = registry.register(Arc::new(DoWhileExpander::new())).unwrap_err();

    assert_eq!(err, RegistryError::AlreadyRegistered(ConstructType::Loop));
    assert_eq!(registry.registered_types().len(), 2);
}
