//! Scan-local match state
//!
//! [`MatchAccumulator`] owns everything a single scan mutates: the identity
//! sets that deduplicate reference slots and containers, the match list and
//! the counters. Its scratch containers are leased, so they go back to the
//! pool however the scan ends.

use crate::lease::{IdentitySet, Lease, ScratchPools};
use crate::path::TraversalPath;
use crate::result::{Match, ScanResult};
use crate::shape::{classify, Shape};
use refscan_graph::{same_element, ElementRef, Identity, SlotRef, TypeModel, Value};
use std::sync::Arc;

/// Deduplicating collector of candidate reference slots
pub struct MatchAccumulator<'s> {
    source: ElementRef,
    target: ElementRef,
    types: &'s dyn TypeModel,
    match_by_reference_id: bool,
    visited_refs: Lease<'s, IdentitySet>,
    visited_containers: Lease<'s, IdentitySet>,
    matches: Lease<'s, Vec<Match>>,
    incompatible_count: usize,
    visited_member_count: usize,
    last_matched_path: Option<String>,
}

impl<'s> MatchAccumulator<'s> {
    /// Lease scratch state for a scan from `source` towards `target`
    #[must_use]
    pub fn new(
        source: ElementRef,
        target: ElementRef,
        types: &'s dyn TypeModel,
        pools: &'s ScratchPools,
    ) -> Self {
        Self {
            source,
            target,
            types,
            match_by_reference_id: true,
            visited_refs: pools.identities().lease(),
            visited_containers: pools.identities().lease(),
            matches: pools.matches().lease(),
            incompatible_count: 0,
            visited_member_count: 0,
            last_matched_path: None,
        }
    }

    /// Whether a slot whose target has the source's reference id matches
    #[must_use]
    pub fn with_reference_id_matching(mut self, enabled: bool) -> Self {
        self.match_by_reference_id = enabled;
        self
    }

    /// Count a member and capture it if it is a reference slot
    ///
    /// Returns `true` iff the member is a reference slot, whether or not the
    /// capture recorded anything.
    pub fn try_capture_direct(&mut self, member: &Value, path: &TraversalPath) -> bool {
        self.visited_member_count += 1;

        if classify(member) != Shape::Reference {
            return false;
        }
        match Arc::clone(member).to_reference() {
            Some(slot) => {
                self.capture(member, slot, path);
                true
            }
            None => false,
        }
    }

    /// Capture a container element that resolves to a reference slot
    ///
    /// Resolves direct slots, dictionary entries whose value is a slot, and
    /// as a last resort two-field records whose second field is a slot. The
    /// record fallback applies only to values that are not named members.
    pub fn try_capture_value(&mut self, value: &Value, path: &TraversalPath) -> bool {
        match classify(value) {
            Shape::Reference => match Arc::clone(value).to_reference() {
                Some(slot) => {
                    self.capture(value, slot, path);
                    true
                }
                None => false,
            },
            Shape::Entry => {
                let inner = value.as_entry().and_then(|entry| entry.value());
                self.capture_inner(inner, path)
            }
            Shape::Pair if value.member_name().is_none() => {
                let inner = value.as_record().and_then(|record| {
                    let mut fields = record.fields();
                    if fields.len() == 2 {
                        fields.pop().and_then(|(_, second)| second)
                    } else {
                        None
                    }
                });
                self.capture_inner(inner, path)
            }
            _ => false,
        }
    }

    /// Record a container as entered
    ///
    /// Returns `false` if `container` was already entered in this scan through
    /// the same route. `owner` keeps the container alive for the rest of the
    /// scan so its address cannot be reused.
    pub fn should_enter_container(&mut self, container: Identity, owner: &Value) -> bool {
        if self.visited_containers.contains_key(&container) {
            return false;
        }
        self.visited_containers.insert(container, Arc::clone(owner));
        true
    }

    /// Members examined so far
    #[inline]
    #[must_use]
    pub fn visited_member_count(&self) -> usize {
        self.visited_member_count
    }

    /// Matches recorded so far
    #[inline]
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Finish the scan
    ///
    /// The scratch containers are returned to their pools when `self` drops.
    #[must_use]
    pub fn build(mut self) -> ScanResult {
        let matches: Vec<Match> = self.matches.drain(..).collect();
        ScanResult::new(
            Arc::clone(&self.source),
            matches,
            self.incompatible_count,
            self.visited_member_count,
            self.last_matched_path.take(),
        )
    }

    fn capture_inner(&mut self, inner: Option<Value>, path: &TraversalPath) -> bool {
        let Some(inner) = inner else {
            return false;
        };
        if classify(&inner) != Shape::Reference {
            return false;
        }
        match Arc::clone(&inner).to_reference() {
            Some(slot) => {
                self.capture(&inner, slot, path);
                true
            }
            None => false,
        }
    }

    fn capture(&mut self, holder: &Value, slot: SlotRef, path: &TraversalPath) {
        let key = Identity::of_slot(&slot);
        if self.visited_refs.contains_key(&key) {
            return;
        }
        self.visited_refs.insert(key, Arc::clone(holder));

        let Some(current) = slot.target() else {
            return;
        };
        if !self.matches_source(&current) {
            return;
        }

        if self.accepts_target(&slot) {
            self.last_matched_path = Some(path.to_string());
            self.matches.push(Match::new(slot, path.as_str()));
        } else {
            self.incompatible_count += 1;
        }
    }

    fn matches_source(&self, candidate: &ElementRef) -> bool {
        same_element(candidate, &self.source)
            || (self.match_by_reference_id
                && candidate.reference_id() == self.source.reference_id())
    }

    fn accepts_target(&self, slot: &SlotRef) -> bool {
        match slot.required_type() {
            Some(required) => self
                .types
                .accepts(&required, &self.target.runtime_type()),
            None => true,
        }
    }
}
