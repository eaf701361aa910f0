//! Depth-first traversal
//!
//! Walks a node tree in preorder: node members, then facet members, then
//! children in declaration order. Every member is counted and classified; slots
//! are handed to the [`MatchAccumulator`], containers are entered at most once
//! per access route and enumerated in ascending index order.
//!
//! A container is keyed by [`Identity`]: a named view stored inside its owner
//! is a different container from the owner, and the indexed `Items` walk of an
//! array is a different route from enumerating it.
//!
//! # Failure handling
//! - array `count` fails recoverably: the array is skipped
//! - array `element(i)` fails recoverably: index `i` is skipped
//! - a container view getter fails recoverably: that view is skipped
//! - anything else aborts the scan with [`ScanError::Access`]

use crate::accumulator::MatchAccumulator;
use crate::error::ScanError;
use crate::lease::ScratchPools;
use crate::options::ScanOptions;
use crate::path::TraversalPath;
use crate::result::ScanResult;
use crate::shape::{classify, Shape};
use refscan_graph::{
    same_node, AccessError, ArrayMember, ElementRef, Identity, Iterable, Node, Route, TypeModel,
    Value,
};
use tracing::{debug, error, info};

/// Inputs of one scan
///
/// All three parts are required; [`Scanner::scan`] rejects an incomplete
/// request before touching the graph.
#[derive(Default, Clone)]
pub struct ScanRequest<'a> {
    root: Option<&'a dyn Node>,
    source: Option<ElementRef>,
    target: Option<ElementRef>,
}

impl<'a> ScanRequest<'a> {
    /// Create empty request
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete request in one call
    #[must_use]
    pub fn of(root: &'a dyn Node, source: ElementRef, target: ElementRef) -> Self {
        Self {
            root: Some(root),
            source: Some(source),
            target: Some(target),
        }
    }

    /// With traversal root (live node or blueprint)
    #[must_use]
    pub fn with_root(mut self, root: &'a dyn Node) -> Self {
        self.root = Some(root);
        self
    }

    /// With element to search for
    #[must_use]
    pub fn with_source(mut self, source: ElementRef) -> Self {
        self.source = Some(source);
        self
    }

    /// With element proposed as replacement
    #[must_use]
    pub fn with_target(mut self, target: ElementRef) -> Self {
        self.target = Some(target);
        self
    }
}

/// Reference scanner
///
/// Holds only shared, read-only configuration; one scanner may run any number
/// of scans concurrently.
///
/// # Example
/// ```
/// use refscan_core::{ScanRequest, Scanner};
/// use refscan_graph::live::{Element, SceneNode, SyncRef};
/// use refscan_graph::TypeHierarchy;
///
/// let source = Element::shared("Old", "Material");
/// let target = Element::shared("New", "Material");
/// let root = SceneNode::new("Root");
/// root.add_member(SyncRef::typed("Material", "Material", Some(source.clone())));
///
/// let types = TypeHierarchy::new();
/// let result = Scanner::new(&types)
///     .scan(ScanRequest::of(&*root, source, target))
///     .unwrap();
///
/// assert_eq!(result.paths(), vec!["Root.Material"]);
/// ```
pub struct Scanner<'t> {
    types: &'t dyn TypeModel,
    pools: &'t ScratchPools,
    options: ScanOptions,
}

impl<'t> Scanner<'t> {
    /// Create scanner using the process-wide scratch pools
    #[must_use]
    pub fn new(types: &'t dyn TypeModel) -> Self {
        Self {
            types,
            pools: ScratchPools::global(),
            options: ScanOptions::default(),
        }
    }

    /// With dedicated scratch pools
    #[must_use]
    pub fn with_pools(mut self, pools: &'t ScratchPools) -> Self {
        self.pools = pools;
        self
    }

    /// With scan options
    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Scan options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Find every reference slot under the request's root that targets the
    /// source
    ///
    /// # Errors
    /// - [`ScanError::MissingArgument`] if root, source or target is absent
    /// - [`ScanError::Access`] if a container fails in a non-recoverable way
    pub fn scan(&self, request: ScanRequest<'_>) -> Result<ScanResult, ScanError> {
        let root = request.root.ok_or(ScanError::MissingArgument("root"))?;
        let source = request.source.ok_or(ScanError::MissingArgument("source"))?;
        let target = request.target.ok_or(ScanError::MissingArgument("target"))?;

        let root_path = TraversalPath::from_root(root.label());
        debug!(
            root = %root_path,
            source = %source.reference_id(),
            target = %target.reference_id(),
            "starting reference scan"
        );

        let accumulator = MatchAccumulator::new(source, target, self.types, self.pools)
            .with_reference_id_matching(self.options.matches_by_reference_id());
        let mut walk = Walk {
            accumulator,
            excluded: self.options.excluded().map(|node| &**node),
        };

        if let Err(err) = walk.visit_node(root, &root_path) {
            error!(root = %root_path, error = %err, "reference scan aborted");
            return Err(err);
        }

        let result = walk.accumulator.build();
        info!(
            root = %root_path,
            matches = result.match_count(),
            incompatible = result.incompatible_count(),
            visited = result.visited_member_count(),
            "reference scan complete"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct Walk<'s> {
    accumulator: MatchAccumulator<'s>,
    excluded: Option<&'s dyn Node>,
}

impl Walk<'_> {
    fn visit_node(&mut self, node: &dyn Node, path: &TraversalPath) -> Result<(), ScanError> {
        if let Some(excluded) = self.excluded {
            if same_node(node, excluded) {
                debug!(path = %path, "skipping excluded subtree");
                return Ok(());
            }
        }

        for (index, member) in node.members().iter().enumerate() {
            self.visit_member(member, &member_path(path, member, index))?;
        }

        for facet in node.facets() {
            let facet_path = path.facet(facet.type_name());
            for (index, member) in facet.members().iter().enumerate() {
                self.visit_member(member, &member_path(&facet_path, member, index))?;
            }
        }

        for child in node.children() {
            self.visit_node(child.as_ref(), &path.child(&child.label()))?;
        }
        Ok(())
    }

    fn visit_member(&mut self, member: &Value, path: &TraversalPath) -> Result<(), ScanError> {
        if self.accumulator.try_capture_direct(member, path) {
            return Ok(());
        }

        let shape = classify(member);
        if shape.is_iterable() {
            self.enter_iterable(member, path)?;
        }

        if shape.is_named_container() {
            self.visit_known_collections(member, shape, path)?;
        }
        Ok(())
    }

    fn visit_known_collections(
        &mut self,
        member: &Value,
        shape: Shape,
        path: &TraversalPath,
    ) -> Result<(), ScanError> {
        match shape {
            Shape::List { .. } => {
                if let Some(list) = member.as_list() {
                    self.visit_view(member, list.elements(), &path.property("Elements"))?;
                }
            }
            Shape::Bag { .. } => {
                if let Some(bag) = member.as_bag() {
                    self.visit_view(member, bag.elements(), &path.property("Elements"))?;
                    self.visit_view(member, bag.values(), &path.property("Values"))?;
                }
            }
            Shape::Dictionary { .. } => {
                if let Some(dictionary) = member.as_dictionary() {
                    self.visit_view(
                        member,
                        dictionary.boxed_entries(),
                        &path.property("BoxedEntries"),
                    )?;
                    self.visit_view(member, dictionary.values(), &path.property("Values"))?;
                }
            }
            Shape::Array { .. } => {
                if let Some(array) = member.as_array() {
                    let items = Identity::of_value(member).via(Route::Indexed);
                    if self.accumulator.should_enter_container(items, member) {
                        self.visit_array(array, &path.property("Items"))?;
                    }
                }
            }
            Shape::Reference
            | Shape::Iterable
            | Shape::Entry
            | Shape::Pair
            | Shape::Scalar => {}
        }
        Ok(())
    }

    fn visit_view(
        &mut self,
        owner: &Value,
        view: Result<Option<&dyn Iterable>, AccessError>,
        path: &TraversalPath,
    ) -> Result<(), ScanError> {
        let view = match view {
            Ok(Some(view)) => view,
            Ok(None) => return Ok(()),
            Err(err) if err.is_recoverable() => {
                debug!(path = %path, error = %err, "skipping unavailable container view");
                return Ok(());
            }
            Err(err) => return Err(ScanError::access(path, err)),
        };

        if self.accumulator.should_enter_container(Identity::of_view(view), owner) {
            self.visit_iterable(view, path)?;
        }
        Ok(())
    }

    fn visit_array(
        &mut self,
        array: &dyn ArrayMember,
        path: &TraversalPath,
    ) -> Result<(), ScanError> {
        let count = match array.count() {
            Ok(count) => count,
            Err(err) if err.is_recoverable() => {
                debug!(path = %path, error = %err, "skipping array without a count");
                return Ok(());
            }
            Err(err) => return Err(ScanError::access(path, err)),
        };

        for index in 0..count {
            let element_path = path.index(index);
            match array.element(index) {
                Ok(Some(value)) => self.visit_value(&value, &element_path)?,
                Ok(None) => {}
                Err(err) if err.is_recoverable() => {
                    debug!(
                        path = %element_path,
                        error = %err,
                        "skipping unreadable array element"
                    );
                }
                Err(err) => return Err(ScanError::access(&element_path, err)),
            }
        }
        Ok(())
    }

    fn visit_iterable(
        &mut self,
        iterable: &dyn Iterable,
        path: &TraversalPath,
    ) -> Result<(), ScanError> {
        let values = iterable
            .iter_values()
            .map_err(|err| ScanError::access(path, err))?;

        for (index, item) in values.enumerate() {
            let element_path = path.index(index);
            let item = item.map_err(|err| ScanError::access(&element_path, err))?;
            if let Some(value) = item {
                self.visit_value(&value, &element_path)?;
            }
        }
        Ok(())
    }

    fn visit_value(&mut self, value: &Value, path: &TraversalPath) -> Result<(), ScanError> {
        if self.accumulator.try_capture_value(value, path) {
            return Ok(());
        }
        if value.member_name().is_some() {
            return self.visit_member(value, path);
        }

        if classify(value).is_iterable() {
            self.enter_iterable(value, path)?;
        }
        Ok(())
    }

    fn enter_iterable(&mut self, owner: &Value, path: &TraversalPath) -> Result<(), ScanError> {
        let Some(iterable) = owner.as_iterable() else {
            return Ok(());
        };
        if self
            .accumulator
            .should_enter_container(Identity::of_view(iterable), owner)
        {
            self.visit_iterable(iterable, path)?;
        }
        Ok(())
    }
}

fn member_path(parent: &TraversalPath, member: &Value, index: usize) -> TraversalPath {
    match member.member_name() {
        Some(name) => parent.member(name),
        None => parent.index(index),
    }
}
