mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use biodata_fetchgraph::auth::AllowAll;
use biodata_fetchgraph::context::TranslationContext;
use biodata_fetchgraph::domain::{EntityKind, Principal};
use biodata_fetchgraph::fetch::{DataSetFetchOptions, Fetched};
use biodata_fetchgraph::memory::MemoryLoader;
use biodata_fetchgraph::model::{DataSet, Entity, Ref};
use biodata_fetchgraph::translator::EntityTranslator;
use biodata_fetchgraph::translators::DataSetTranslator;

use common::{CountingGate, GenerousGate, alice, history, id, ids, parent_child, snapshot_with};

fn parents_fetch() -> DataSetFetchOptions {
    let mut fetch = DataSetFetchOptions::default();
    fetch.with_parents();
    fetch
}

#[test]
fn parents_are_loaded_in_one_call_regardless_of_batch_size() {
    for n in [1_u64, 10, 10_000] {
        let data_sets = (1..=2 * n).collect::<Vec<_>>();
        let relationships = (1..=n).map(|child| parent_child(n + child, child)).collect();
        let loader = MemoryLoader::new(snapshot_with(&data_sets, relationships));
        let gate = CountingGate::allow_all();
        let mut ctx = TranslationContext::new(alice(), &loader, &gate);

        let mut fetch = parents_fetch();
        fetch.with_type();
        fetch.with_tags();
        let requested = (1..=n).map(id).collect::<BTreeSet<_>>();
        let result = DataSetTranslator
            .translate(&mut ctx, &requested, &fetch)
            .unwrap();

        assert_eq!(result.len() as u64, n);
        for (child, data_set) in &result {
            let parent = id(n + child.get());
            assert_eq!(data_set.parents, Fetched::Fetched(vec![Ref::new(parent)]));
        }
        assert_eq!(loader.call_count("load_data_set_relationships"), 1, "n = {n}");
        assert_eq!(loader.call_count("load_data_set_type_links"), 1, "n = {n}");
        assert_eq!(loader.call_count("load_data_set_types"), 1, "n = {n}");
        assert_eq!(loader.call_count("load_data_set_tag_links"), 1, "n = {n}");
        assert_eq!(loader.call_count("load_data_sets"), 2, "n = {n}");
        assert_eq!(gate.call_count(EntityKind::DataSet), 2, "n = {n}");
    }
}

#[test]
fn unrequested_relations_are_never_loaded() {
    let loader = MemoryLoader::new(snapshot_with(&[1, 2], vec![parent_child(1, 2)]));
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    let mut fetch = DataSetFetchOptions::default();
    fetch.with_type();
    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[1, 2]), &fetch)
        .unwrap();

    assert_eq!(loader.call_count("load_data_set_relationships"), 0);
    assert_eq!(loader.call_count("load_data_set_tag_links"), 0);
    assert_eq!(loader.call_count("load_data_set_properties"), 0);
    assert_eq!(loader.total_calls(), 3);

    let two = &result[&id(2)];
    assert_eq!(two.parents, Fetched::NotFetched);
    assert_eq!(two.data_set_type, Fetched::Fetched(Some(Ref::new(id(100)))));
}

#[test]
fn second_translation_returns_cached_object_unchanged() {
    let loader = MemoryLoader::new(snapshot_with(&[1, 2], vec![parent_child(2, 1)]));
    let gate = CountingGate::allow_all();
    let mut ctx = TranslationContext::new(alice(), &loader, &gate);

    let first = DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &DataSetFetchOptions::default())
        .unwrap();
    let second = DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &parents_fetch())
        .unwrap();

    assert!(Arc::ptr_eq(&first[&id(1)], &second[&id(1)]));
    assert_eq!(second[&id(1)].parents, Fetched::NotFetched);
    assert_eq!(loader.call_count("load_data_set_relationships"), 0);
    assert_eq!(loader.call_count("load_data_sets"), 1);
    assert_eq!(gate.call_count(EntityKind::DataSet), 1);
}

#[test]
fn related_object_is_the_same_instance_as_the_root() {
    let loader = MemoryLoader::new(snapshot_with(&[1, 2], vec![parent_child(1, 2)]));
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[1, 2]), &parents_fetch())
        .unwrap();

    let parent = result[&id(2)].parents.get().unwrap()[0];
    assert!(Arc::ptr_eq(&ctx.resolve(parent).unwrap(), &result[&id(1)]));
    assert_eq!(loader.call_count("load_data_sets"), 1);
}

#[test]
fn diamond_loads_the_shared_parent_once() {
    let loader = MemoryLoader::new(snapshot_with(
        &[1, 2, 3],
        vec![parent_child(3, 1), parent_child(3, 2)],
    ));
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[1, 2]), &parents_fetch())
        .unwrap();

    let left = result[&id(1)].parents.get().unwrap()[0];
    let right = result[&id(2)].parents.get().unwrap()[0];
    assert_eq!(left, right);
    assert!(Arc::ptr_eq(
        &ctx.resolve(left).unwrap(),
        &ctx.resolve(right).unwrap()
    ));
    assert_eq!(loader.call_count("load_data_sets"), 2);
}

#[test]
fn cyclic_relations_terminate() {
    let loader = MemoryLoader::new(snapshot_with(
        &[1, 2, 3],
        vec![parent_child(1, 2), parent_child(2, 1), parent_child(3, 3)],
    ));
    let mut ctx = TranslationContext::new(alice(), &loader, &AllowAll);

    // parents -> children -> parents -> ... ten levels deep
    let mut fetch = DataSetFetchOptions::default();
    let mut level = &mut fetch;
    for depth in 0..10 {
        level = if depth % 2 == 0 {
            level.with_parents()
        } else {
            level.with_children()
        };
    }

    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[1, 3]), &fetch)
        .unwrap();

    let one = &result[&id(1)];
    assert_eq!(one.parents, Fetched::Fetched(vec![Ref::new(id(2))]));
    let two = ctx.resolve(Ref::<DataSet>::new(id(2))).unwrap();
    assert_eq!(two.children, Fetched::Fetched(vec![Ref::new(id(1))]));
    assert_eq!(two.parents, Fetched::NotFetched);

    let three = &result[&id(3)];
    assert_eq!(three.parents, Fetched::Fetched(vec![Ref::new(id(3))]));

    assert_eq!(ctx.cache().shell_count(), 0);
    assert_eq!(loader.call_count("load_data_set_relationships"), 2);
    assert_eq!(loader.call_count("load_data_sets"), 2);
}

#[test]
fn rejected_ids_are_dropped_at_every_depth() {
    let mut snapshot = snapshot_with(
        &[1, 2, 3, 4],
        vec![parent_child(2, 1), parent_child(4, 1), parent_child(4, 2)],
    );
    snapshot.history = vec![history(600, 1, "CHILD", 4), history(601, 1, "CHILD", 3)];
    let loader = MemoryLoader::new(snapshot);
    let gate = CountingGate::allow_all().denying(EntityKind::DataSet, &[4]);
    let mut ctx = TranslationContext::new(alice(), &loader, &gate);

    let mut fetch = DataSetFetchOptions::default();
    fetch.with_parents().with_parents();
    fetch.with_history().with_related_data_set();
    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &fetch)
        .unwrap();

    let one = &result[&id(1)];
    assert_eq!(one.parents, Fetched::Fetched(vec![Ref::new(id(2))]));
    let two = ctx.resolve(Ref::<DataSet>::new(id(2))).unwrap();
    assert_eq!(two.parents, Fetched::Fetched(Vec::new()));

    let entries = one.history.get().unwrap();
    assert_eq!(entries.len(), 2);
    let rejected = ctx.resolve(entries[0]).unwrap();
    assert_eq!(rejected.related_object_id, id(4));
    assert_eq!(rejected.related_data_set, Fetched::Fetched(None));
    let visible = ctx.resolve(entries[1]).unwrap();
    assert_eq!(visible.related_data_set, Fetched::Fetched(Some(Ref::new(id(3)))));

    assert!(!ctx.cache().contains(DataSet::TRANSLATOR, id(4)));
}

#[test]
fn gate_answer_is_restricted_to_the_requested_ids() {
    let loader = MemoryLoader::new(snapshot_with(&[1, 999], Vec::new()));
    let mut ctx = TranslationContext::new(alice(), &loader, &GenerousGate);

    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &DataSetFetchOptions::default())
        .unwrap();

    assert_eq!(result.keys().copied().collect::<BTreeSet<_>>(), ids(&[1]));
    assert!(!ctx.cache().contains(DataSet::TRANSLATOR, id(999)));
}

#[test]
fn gate_is_asked_only_about_uncached_ids() {
    let loader = MemoryLoader::new(snapshot_with(&[1, 2, 3], Vec::new()));
    let gate = CountingGate::allow_all();
    let mut ctx = TranslationContext::new(alice(), &loader, &gate);
    let fetch = DataSetFetchOptions::default();

    DataSetTranslator
        .translate(&mut ctx, &ids(&[1, 2]), &fetch)
        .unwrap();
    DataSetTranslator
        .translate(&mut ctx, &ids(&[1, 2, 3]), &fetch)
        .unwrap();

    assert_eq!(
        gate.calls(),
        vec![
            (EntityKind::DataSet, ids(&[1, 2])),
            (EntityKind::DataSet, ids(&[3])),
        ]
    );
}

#[test]
fn unsecured_kinds_skip_the_gate() {
    let loader = MemoryLoader::new(snapshot_with(&[1], Vec::new()));
    let gate = CountingGate::allow_all();
    let mut ctx = TranslationContext::new(alice(), &loader, &gate);

    let mut fetch = DataSetFetchOptions::default();
    fetch.with_type();
    DataSetTranslator
        .translate(&mut ctx, &ids(&[1]), &fetch)
        .unwrap();

    assert_eq!(gate.call_count(EntityKind::DataSet), 1);
    assert_eq!(gate.call_count(EntityKind::DataSetType), 0);
}

#[test]
fn empty_input_does_no_io() {
    let loader = MemoryLoader::new(snapshot_with(&[1], Vec::new()));
    let gate = CountingGate::allow_all();
    let mut ctx = TranslationContext::new(alice(), &loader, &gate);

    let result = DataSetTranslator
        .translate(&mut ctx, &BTreeSet::new(), &parents_fetch())
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(loader.total_calls(), 0);
    assert!(gate.calls().is_empty());
    assert!(ctx.cache().is_empty());
}

#[test]
fn ids_without_records_are_omitted() {
    let loader = MemoryLoader::new(snapshot_with(&[1], Vec::new()));
    let mut ctx = TranslationContext::new(Principal::default(), &loader, &AllowAll);

    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[1, 42]), &DataSetFetchOptions::default())
        .unwrap();

    assert_eq!(result.len(), 1);
    assert!(result.contains_key(&id(1)));
    assert!(!ctx.cache().contains(DataSet::TRANSLATOR, id(42)));
}

#[test]
fn lineage_with_a_hidden_grandchild() {
    let loader = MemoryLoader::new(snapshot_with(
        &[1, 2, 3],
        vec![parent_child(1, 2), parent_child(2, 3)],
    ));
    let gate = CountingGate::allow_all().denying(EntityKind::DataSet, &[3]);
    let mut ctx = TranslationContext::new(alice(), &loader, &gate);

    let result = DataSetTranslator
        .translate(&mut ctx, &ids(&[1, 2, 3]), &parents_fetch())
        .unwrap();

    assert_eq!(
        result.keys().copied().collect::<BTreeSet<_>>(),
        ids(&[1, 2])
    );
    assert_eq!(result[&id(1)].parents, Fetched::Fetched(Vec::new()));
    assert_eq!(
        result[&id(2)].parents,
        Fetched::Fetched(vec![Ref::new(id(1))])
    );
}
