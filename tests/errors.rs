mod common;

use assert_matches::assert_matches;

use biodata_fetchgraph::auth::AllowAll;
use biodata_fetchgraph::context::TranslationContext;
use biodata_fetchgraph::error::{FetchGraphError, GateError, LoaderError};
use biodata_fetchgraph::fetch::DataSetFetchOptions;
use biodata_fetchgraph::memory::MemoryLoader;
use biodata_fetchgraph::translator::EntityTranslator;
use biodata_fetchgraph::translators::DataSetTranslator;

use common::{
    FailingGate, alice, data_set_of_kind, history, ids, lab_snapshot, parent_child, snapshot_with,
};

#[test]
fn unknown_relationship_code_is_a_mapping_error() {
    let mut sibling = parent_child(1, 2);
    sibling.relationship_type = "SIBLING".to_string();
    let loader = MemoryLoader::new(snapshot_with(&[1, 2], vec![sibling]));
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    let mut fetch = DataSetFetchOptions::default();
    fetch.with_children();
    let err = DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &fetch)
        .unwrap_err();

    assert_matches!(
        err,
        FetchGraphError::Mapping { mapping: "data set relationship type", ref value } if value == "SIBLING"
    );
}

#[test]
fn unknown_data_set_kind_is_a_mapping_error() {
    let mut snapshot = snapshot_with(&[], Vec::new());
    snapshot.data_sets.push(data_set_of_kind(1, "VIRTUAL"));
    let loader = MemoryLoader::new(snapshot);
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    let err = DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &DataSetFetchOptions::default())
        .unwrap_err();

    assert_matches!(err, FetchGraphError::Mapping { mapping: "data set kind", .. });
}

#[test]
fn unknown_history_relation_is_a_mapping_error() {
    let mut snapshot = lab_snapshot();
    snapshot.history.push(history(502, 3, "COUSIN", 1));
    let loader = MemoryLoader::new(snapshot);
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    let mut fetch = DataSetFetchOptions::default();
    fetch.with_history();
    let err = DataSetTranslator
        .translate(&mut ctx, &ids(&[3]), &fetch)
        .unwrap_err();

    assert_matches!(err, FetchGraphError::Mapping { mapping: "history relation type", .. });
}

#[test]
fn loader_failure_is_propagated_unchanged() {
    let loader = MemoryLoader::new(lab_snapshot())
        .fail_on("load_data_set_relationships", "connection reset by peer");
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    let mut fetch = DataSetFetchOptions::default();
    fetch.with_parents();
    let err = DataSetTranslator
        .translate(&mut ctx, &ids(&[2]), &fetch)
        .unwrap_err();

    assert_matches!(
        err,
        FetchGraphError::Loader(ref source)
            if *source == LoaderError::new("load_data_set_relationships", "connection reset by peer")
    );
    assert!(err.is_external());
}

#[test]
fn loader_failure_in_a_nested_kind_is_propagated() {
    let loader = MemoryLoader::new(lab_snapshot()).fail_on("load_file_format_types", "timeout");
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    let mut fetch = DataSetFetchOptions::default();
    fetch.with_physical_data().with_file_format_type();
    let err = DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &fetch)
        .unwrap_err();

    assert_matches!(err, FetchGraphError::Loader(LoaderError { operation: "load_file_format_types", .. }));
}

#[test]
fn gate_failure_is_propagated_unchanged() {
    let loader = MemoryLoader::new(lab_snapshot());
    let mut ctx = TranslationContext::new(alice(), &loader, &FailingGate);

    let err = DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &DataSetFetchOptions::default())
        .unwrap_err();

    assert_matches!(err, FetchGraphError::Gate(GateError(ref message)) if message == "session expired");
    assert_eq!(loader.total_calls(), 0);
}

#[test]
fn failing_gate_is_not_consulted_for_empty_input() {
    let loader = MemoryLoader::new(lab_snapshot());
    let mut ctx = TranslationContext::new(alice(), &loader, &FailingGate);

    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[]), &DataSetFetchOptions::default())
        .unwrap();

    assert!(result.is_empty());
}
