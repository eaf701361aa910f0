use pretty_assertions::assert_eq;
use refscan_core::{ScanError, ScanOptions, ScanRequest, ScanResult, Scanner, ScratchPools};
use refscan_graph::live::{
    Component, DictEntry, Element, SceneNode, SyncArray, SyncBag, SyncCollection, SyncDictionary,
    SyncField, SyncList, SyncRef, Text,
};
use refscan_graph::{
    AccessError, ArrayMember, Blueprint, DictionaryMember, ElementRef, GraphValue, Iterable, Node,
    Value, ValueIter, WorldElement,
};
use refscan_test_utils::{
    init_tracing, source_and_target, type_hierarchy, FailingIterable, Fault, FaultyArray,
    FaultyDictionary,
};
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn scan(root: &dyn Node, source: &ElementRef, target: &ElementRef) -> ScanResult {
    try_scan(root, source, target).unwrap()
}

fn try_scan(
    root: &dyn Node,
    source: &ElementRef,
    target: &ElementRef,
) -> Result<ScanResult, ScanError> {
    init_tracing();
    let types = type_hierarchy();
    Scanner::new(&types).scan(ScanRequest::of(root, source.clone(), target.clone()))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_direct_slot() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(SyncRef::typed("SlotRef", "T1", Some(source.clone())));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.SlotRef"]);
    assert_eq!(result.incompatible_count(), 0);
    assert_eq!(result.visited_member_count(), 1);
    assert_eq!(result.last_matched_path(), Some("Root.SlotRef"));
}

#[test]
fn scenario_b_incompatible_slot() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(SyncRef::typed("SlotRef", "T2", Some(source.clone())));

    let result = scan(&*root, &source, &target);

    assert!(result.is_empty());
    assert_eq!(result.incompatible_count(), 1);
    assert_eq!(result.visited_member_count(), 1);
    assert!(result.last_matched_path().is_none());
}

#[test]
fn scenario_c_generic_iterable() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let nested: Value = SyncRef::untyped("Nested", Some(source.clone()));
    root.add_member(SyncCollection::new("Collection", [Some(nested)]));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Collection[0]"]);
    assert_eq!(result.visited_member_count(), 1);
}

#[test]
fn scenario_d_dictionary_entry() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let slot: Value = SyncRef::untyped("Value", Some(source.clone()));
    root.add_member(SyncDictionary::new("Dict", [(Text::shared("key"), slot)]));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Dict.BoxedEntries[0]"]);
    assert_eq!(result.incompatible_count(), 0);
}

#[test]
fn scenario_e_array_skips_transient_index_failure() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let first: Value = SyncRef::untyped("First", Some(source.clone()));
    let second: Value = SyncRef::untyped("Second", Some(source.clone()));
    root.add_member(
        FaultyArray::new("Array", [Some(first), Some(second)])
            .fail_at(1, Fault::InvalidOperation)
            .into_value(),
    );

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Array.Items[0]"]);
}

// ============================================================================
// Ordering and paths
// ============================================================================

#[test]
fn preorder_node_members_then_facets_then_children() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let arm = root.add_child("Arm");
    let hand = arm.add_child("Hand");

    hand.add_member(SyncRef::untyped("Grip", Some(source.clone())));
    root.attach(
        Component::new("Renderer")
            .with_member(SyncField::new("Enabled", "true"))
            .with_member(SyncRef::untyped("Material", Some(source.clone())))
            .into_shared(),
    );
    root.add_member(SyncRef::untyped("Direct", Some(source.clone())));

    let result = scan(&*root, &source, &target);

    assert_eq!(
        result.paths(),
        vec!["Root.Direct", "Root::Renderer.Material", "Root/Arm/Hand.Grip"]
    );
    assert_eq!(result.visited_member_count(), 4);
    assert_eq!(result.last_matched_path(), Some("Root/Arm/Hand.Grip"));
}

#[test]
fn blank_node_name_uses_reference_id() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let unnamed = root.add_child("");
    unnamed.add_member(SyncRef::untyped("Ref", Some(source.clone())));

    let result = scan(&*root, &source, &target);

    let expected = format!("Root/{}.Ref", unnamed.reference_id());
    assert_eq!(result.paths(), vec![expected.as_str()]);
}

#[test]
fn known_container_views_are_walked() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let in_bag: Value = SyncRef::untyped("InBag", Some(source.clone()));
    let in_array: Value = SyncRef::untyped("InArray", Some(source.clone()));
    let in_list: Value = SyncRef::untyped("InList", Some(source.clone()));

    root.add_member(SyncList::new("List", [in_list]));
    root.add_member(SyncBag::new("Bag", [(Text::shared("k"), in_bag)]));
    root.add_member(SyncArray::new("Array", [None, Some(in_array)]));

    let result = scan(&*root, &source, &target);

    assert_eq!(
        result.paths(),
        vec!["Root.List[0]", "Root.Bag.Elements[0]", "Root.Array.Items[1]"]
    );
    assert_eq!(result.visited_member_count(), 3);
}

#[test]
fn nested_member_inside_collection_is_counted() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let inner: Value = SyncList::new(
        "Inner",
        [SyncRef::untyped("Ref", Some(source.clone())) as Value],
    );
    root.add_member(SyncCollection::new("Outer", [None, Some(inner)]));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Outer[1][0]"]);
    assert_eq!(result.visited_member_count(), 2);
}

// ============================================================================
// Deduplication
// ============================================================================

#[test]
fn slot_reached_twice_is_recorded_at_first_path() {
    let (source, target) = source_and_target();
    let shared: Value = SyncRef::untyped("Shared", Some(source.clone()));
    let root = SceneNode::new("Root");
    let child = root.add_child("Child");

    child.add_member(SyncCollection::new("Later", [Some(Arc::clone(&shared))]));
    root.add_member(SyncCollection::new("Early", [None, Some(shared)]));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Early[1]"]);
}

#[test]
fn incompatible_slot_reached_twice_counts_once() {
    let (source, target) = source_and_target();
    let shared: Value = SyncRef::typed("Shared", "T2", Some(source.clone()));
    let root = SceneNode::new("Root");
    root.add_member(Arc::clone(&shared));
    root.add_member(SyncCollection::new("Again", [Some(shared)]));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.incompatible_count(), 1);
    assert_eq!(result.visited_member_count(), 2);
}

#[test]
fn self_containing_list_is_entered_once() {
    let (source, target) = source_and_target();
    let list = SyncList::new("Loop", []);
    list.push(list.clone());
    list.push(SyncRef::untyped("Ref", Some(source.clone())));

    let root = SceneNode::new("Root");
    root.add_member(list.clone());

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Loop[1]"]);
    assert_eq!(result.visited_member_count(), 2);
}

#[test]
fn dictionary_values_view_does_not_duplicate_entries() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let dict = SyncDictionary::new("Dict", []);
    dict.insert(Text::shared("a"), SyncRef::untyped("A", Some(source.clone())));
    dict.insert(Text::shared("b"), SyncRef::untyped("B", Some(source.clone())));
    root.add_member(dict);

    let result = scan(&*root, &source, &target);

    assert_eq!(
        result.paths(),
        vec!["Root.Dict.BoxedEntries[0]", "Root.Dict.BoxedEntries[1]"]
    );
}

/// Entries stored inline, ahead of every other field of their dictionary
struct InlineEntries(Vec<Value>);

impl Iterable for InlineEntries {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        Ok(Box::new(self.0.iter().map(|entry| Ok(Some(Arc::clone(entry))))))
    }
}

/// Iterable dictionary whose `BoxedEntries` view shares its address
#[repr(C)]
struct InlineDictionary {
    entries: InlineEntries,
    name: String,
}

impl GraphValue for InlineDictionary {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        Some(self)
    }

    fn as_dictionary(&self) -> Option<&dyn DictionaryMember> {
        Some(self)
    }
}

impl Iterable for InlineDictionary {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        Ok(Box::new(std::iter::empty()))
    }
}

impl DictionaryMember for InlineDictionary {
    fn boxed_entries(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Ok(Some(&self.entries))
    }

    fn values(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Ok(None)
    }
}

#[test]
fn view_stored_at_owner_address_is_still_walked() {
    let (source, target) = source_and_target();
    let slot: Value = SyncRef::untyped("Ref", Some(source.clone()));
    let root = SceneNode::new("Root");
    root.add_member(Arc::new(InlineDictionary {
        entries: InlineEntries(vec![DictEntry::shared(Some(Text::shared("k")), Some(slot))]),
        name: "Dict".to_string(),
    }));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Dict.BoxedEntries[0]"]);
}

/// Array that can also be enumerated; counts how it is read
struct CountingArray {
    items: Vec<Option<Value>>,
    enumerations: AtomicUsize,
    element_reads: AtomicUsize,
}

impl CountingArray {
    fn new(items: Vec<Option<Value>>) -> Arc<Self> {
        Arc::new(Self {
            items,
            enumerations: AtomicUsize::new(0),
            element_reads: AtomicUsize::new(0),
        })
    }
}

impl GraphValue for CountingArray {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some("Seq")
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        Some(self)
    }

    fn as_array(&self) -> Option<&dyn ArrayMember> {
        Some(self)
    }
}

impl Iterable for CountingArray {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.items.iter().map(|item| Ok(item.clone()))))
    }
}

impl ArrayMember for CountingArray {
    fn count(&self) -> Result<usize, AccessError> {
        Ok(self.items.len())
    }

    fn element(&self, index: usize) -> Result<Option<Value>, AccessError> {
        self.element_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.get(index).cloned().flatten())
    }
}

#[test]
fn iterable_array_is_also_read_by_index() {
    let (source, target) = source_and_target();
    let array = CountingArray::new(vec![
        Some(SyncRef::untyped("Ref", Some(source.clone())) as Value),
        None,
    ]);
    let root = SceneNode::new("Root");
    root.add_member(array.clone());
    root.add_child("Child").add_member(array.clone());

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Seq[0]"]);
    assert_eq!(array.enumerations.load(Ordering::SeqCst), 1);
    assert_eq!(array.element_reads.load(Ordering::SeqCst), 2);
    assert_eq!(result.visited_member_count(), 2);
}

// ============================================================================
// Matching rules
// ============================================================================

#[test]
fn foreign_and_empty_slots_are_ignored() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(SyncRef::untyped("Empty", None));
    root.add_member(SyncRef::untyped("Other", Some(Element::shared("X", "T1"))));

    let result = scan(&*root, &source, &target);

    assert!(result.is_empty());
    assert_eq!(result.incompatible_count(), 0);
    assert_eq!(result.visited_member_count(), 2);
}

#[test]
fn subtype_target_satisfies_required_type() {
    let source = Element::shared("Old", "Texture");
    let target = Element::shared("New", "Texture");
    let root = SceneNode::new("Root");
    root.add_member(SyncRef::typed("Albedo", "Asset", Some(source.clone())));
    root.add_member(SyncRef::typed("Mesh", "Material", Some(source.clone())));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Albedo"]);
    assert_eq!(result.incompatible_count(), 1);
}

#[test]
fn reference_id_equality_is_optional() {
    let (source, target) = source_and_target();
    let twin: ElementRef = Arc::new(Element::with_id(source.reference_id(), "Twin", "T1"));
    let root = SceneNode::new("Root");
    root.add_member(SyncRef::untyped("Ref", Some(twin)));

    assert_eq!(scan(&*root, &source, &target).match_count(), 1);

    let types = type_hierarchy();
    let strict = Scanner::new(&types)
        .with_options(ScanOptions::new().match_by_reference_id(false))
        .scan(ScanRequest::of(&*root, source.clone(), target.clone()))
        .unwrap();
    assert!(strict.is_empty());
}

#[test]
fn scene_nodes_can_be_sources() {
    let root = SceneNode::new("Root");
    let old_anchor = root.add_child("OldAnchor");
    let new_anchor: ElementRef = SceneNode::new("NewAnchor");
    let source: ElementRef = old_anchor.clone();
    root.add_member(SyncRef::typed("Anchor", "Slot", Some(source.clone())));

    let result = scan(&*root, &source, &new_anchor);

    assert_eq!(result.paths(), vec!["Root.Anchor"]);
}

#[test]
fn structural_pair_wrapping_reference_is_captured() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let slot: Value = SyncRef::untyped("Ref", Some(source.clone()));
    root.add_member(SyncCollection::new(
        "Pairs",
        [Some(refscan_graph::live::KeyValuePair::shared(
            Some(Text::shared("k")),
            Some(slot),
        ))],
    ));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Pairs[0]"]);
}

/// Text-like scalar that would expose a slot if it were ever iterated
struct Label {
    hidden: Value,
}

impl GraphValue for Label {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some("Label")
    }

    fn is_text(&self) -> bool {
        true
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        Some(self)
    }
}

impl Iterable for Label {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        Ok(Box::new(std::iter::once(Ok(Some(Arc::clone(&self.hidden))))))
    }
}

#[test]
fn text_scalars_are_never_iterated() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(Arc::new(Label {
        hidden: SyncRef::untyped("Hidden", Some(source.clone())),
    }));

    let result = scan(&*root, &source, &target);

    assert!(result.is_empty());
    assert_eq!(result.visited_member_count(), 1);
}

// ============================================================================
// Exclusion and blueprints
// ============================================================================

#[test]
fn excluded_subtree_is_skipped() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let gizmos = root.add_child("Gizmos");
    gizmos.add_member(SyncRef::untyped("Handle", Some(source.clone())));
    gizmos
        .add_child("Inner")
        .add_member(SyncRef::untyped("Deep", Some(source.clone())));
    root.add_child("Scene")
        .add_member(SyncRef::untyped("Kept", Some(source.clone())));

    let types = type_hierarchy();
    let result = Scanner::new(&types)
        .with_options(ScanOptions::new().exclude(gizmos))
        .scan(ScanRequest::of(&*root, source.clone(), target.clone()))
        .unwrap();

    assert_eq!(result.paths(), vec!["Root/Scene.Kept"]);
    assert_eq!(result.visited_member_count(), 1);
}

#[test]
fn blueprint_is_scanned_like_a_live_tree() {
    let (source, target) = source_and_target();
    let blueprint = Blueprint::new(
        "Template",
        [SyncRef::untyped("Ref", Some(source.clone())) as Value],
        [Blueprint::leaf(
            "Part",
            [SyncCollection::new(
                "Parts",
                [Some(SyncRef::untyped("Inner", Some(source.clone())) as Value)],
            ) as Value],
        )],
    );

    let result = scan(&blueprint, &source, &target);

    assert_eq!(result.paths(), vec!["Template.Ref", "Template/Part.Parts[0]"]);
    assert_eq!(result.visited_member_count(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn missing_arguments_fail_before_traversal() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let types = type_hierarchy();
    let scanner = Scanner::new(&types);

    let no_root = scanner.scan(
        ScanRequest::new()
            .with_source(source.clone())
            .with_target(target.clone()),
    );
    assert!(matches!(no_root, Err(ScanError::MissingArgument("root"))));

    let no_source = scanner.scan(ScanRequest::new().with_root(&*root).with_target(target));
    assert!(matches!(no_source, Err(ScanError::MissingArgument("source"))));

    let no_target = scanner.scan(ScanRequest::new().with_root(&*root).with_source(source));
    assert!(matches!(no_target, Err(ScanError::MissingArgument("target"))));
}

#[test]
fn transient_count_failure_skips_the_array() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let hidden: Value = SyncRef::untyped("Hidden", Some(source.clone()));
    root.add_member(
        FaultyArray::new("Broken", [Some(hidden)])
            .fail_count(Fault::NotSupported)
            .into_value(),
    );
    root.add_member(SyncRef::untyped("After", Some(source.clone())));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.After"]);
    assert_eq!(result.visited_member_count(), 2);
}

#[test]
fn transient_view_failure_skips_only_that_view() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(FaultyDictionary::new(
        "Dict",
        vec![SyncRef::untyped("Ref", Some(source.clone())) as Value],
        Fault::NotSupported,
    ));

    let result = scan(&*root, &source, &target);

    assert_eq!(result.paths(), vec!["Root.Dict.Values[0]"]);
}

#[test]
fn fatal_view_failure_aborts() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(FaultyDictionary::new("Dict", Vec::new(), Fault::Fatal));

    let err = try_scan(&*root, &source, &target).unwrap_err();

    assert_eq!(err.path(), Some("Root.Dict.BoxedEntries"));
}

#[test]
fn fatal_element_failure_aborts_and_releases_leases() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(
        FaultyArray::new("Array", [None, None])
            .fail_at(1, Fault::Fatal)
            .into_value(),
    );

    let pools = ScratchPools::default();
    let types = type_hierarchy();
    let err = Scanner::new(&types)
        .with_pools(&pools)
        .scan(ScanRequest::of(&*root, source, target))
        .unwrap_err();

    match err {
        ScanError::Access { ref path, ref source } => {
            assert_eq!(path, "Root.Array.Items[1]");
            assert!(!source.is_recoverable());
        }
        ScanError::MissingArgument(_) => panic!("unexpected usage error"),
    }
    assert_eq!(pools.identities().stats().outstanding(), 0);
    assert_eq!(pools.matches().stats().outstanding(), 0);
}

#[test]
fn failure_while_iterating_is_always_fatal() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(FailingIterable::new(
        "Items",
        vec![SyncRef::untyped("Ref", Some(source.clone())) as Value],
        1,
        Fault::InvalidOperation,
    ));

    let err = try_scan(&*root, &source, &target).unwrap_err();

    assert_eq!(err.path(), Some("Root.Items[1]"));
}

// ============================================================================
// Determinism and pooling
// ============================================================================

#[test]
fn repeated_scans_are_identical() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    let child = root.add_child("Child");
    root.add_member(SyncRef::untyped("A", Some(source.clone())));
    child.add_member(SyncBag::new(
        "Bag",
        [(Text::shared("k"), SyncRef::untyped("B", Some(source.clone())) as Value)],
    ));
    child.add_member(SyncRef::typed("C", "T2", Some(source.clone())));

    let first = scan(&*root, &source, &target);
    let second = scan(&*root, &source, &target);

    assert_eq!(first.paths(), second.paths());
    assert_eq!(first.summary(), second.summary());
}

#[test]
fn scans_reuse_pooled_containers() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(SyncRef::untyped("A", Some(source.clone())));

    let pools = ScratchPools::default();
    let types = type_hierarchy();
    let scanner = Scanner::new(&types).with_pools(&pools);
    for _ in 0..3 {
        scanner
            .scan(ScanRequest::of(&*root, source.clone(), target.clone()))
            .unwrap();
    }

    let stats = pools.identities().stats();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.leased, 6);
    assert_eq!(stats.outstanding(), 0);
}

#[test]
fn summary_serializes() {
    let (source, target) = source_and_target();
    let root = SceneNode::new("Root");
    root.add_member(SyncRef::untyped("A", Some(source.clone())));

    let summary = scan(&*root, &source, &target).summary();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["matches"], 1);
    assert_eq!(json["visited_members"], 1);
    assert_eq!(json["last_matched_path"], "Root.A");
}
