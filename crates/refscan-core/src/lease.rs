//! Pooled scratch containers
//!
//! Scans borrow their identity sets and match lists from a [`ScratchPool`]
//! instead of allocating fresh ones. A [`Lease`] hands the container back when
//! it is dropped, so release happens on every exit path: normal return, early
//! return, `?` propagation and unwinding.
//!
//! Containers are reset before they re-enter the pool; a pooled container
//! never keeps graph values alive between scans.

use crate::result::Match;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use refscan_graph::{Identity, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasher, Hash};
use std::ops::{Deref, DerefMut};

/// Identity-keyed set that keeps its members alive
///
/// The stored handle guarantees a key's address cannot be reused by another
/// allocation while the set is in use.
pub type IdentitySet = HashMap<Identity, Value>;

/// Container that can be reset and reused
pub trait Scratch: Default + Send {
    /// Clear contents, keeping allocated capacity
    fn reset(&mut self);

    /// Capacity currently held
    fn retained_capacity(&self) -> usize;
}

impl<T: Send> Scratch for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }

    fn retained_capacity(&self) -> usize {
        self.capacity()
    }
}

impl<K, V, S> Scratch for HashMap<K, V, S>
where
    K: Send,
    V: Send,
    S: BuildHasher + Default + Send,
{
    fn reset(&mut self) {
        self.clear();
    }

    fn retained_capacity(&self) -> usize {
        self.capacity()
    }
}

impl<K, S> Scratch for HashSet<K, S>
where
    K: Eq + Hash + Send,
    S: BuildHasher + Default + Send,
{
    fn reset(&mut self) {
        self.clear();
    }

    fn retained_capacity(&self) -> usize {
        self.capacity()
    }
}

/// Pool retention limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum idle containers kept per pool
    pub max_retained: usize,
    /// Containers that grew beyond this capacity are dropped instead of kept
    pub max_retained_capacity: usize,
}

impl PoolConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With maximum idle containers
    #[inline]
    #[must_use]
    pub fn with_max_retained(mut self, max: usize) -> Self {
        self.max_retained = max;
        self
    }

    /// With capacity ceiling for retained containers
    #[inline]
    #[must_use]
    pub fn with_max_retained_capacity(mut self, max: usize) -> Self {
        self.max_retained_capacity = max;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_retained: 16,
            max_retained_capacity: 64 * 1024,
        }
    }
}

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Containers allocated because the pool was empty
    pub created: usize,
    /// Total leases handed out
    pub leased: usize,
    /// Leases handed back and kept for reuse
    pub returned: usize,
    /// Leases handed back and dropped by the retention limits
    pub discarded: usize,
    /// Idle containers in the pool
    pub available: usize,
}

impl PoolStats {
    /// Leases not yet handed back
    #[inline]
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.leased - self.returned - self.discarded
    }
}

#[derive(Debug)]
struct PoolState<T> {
    free: Vec<T>,
    stats: PoolStats,
}

/// Thread-safe pool of reusable containers
#[derive(Debug)]
pub struct ScratchPool<T: Scratch> {
    config: PoolConfig,
    state: Mutex<PoolState<T>>,
}

impl<T: Scratch> ScratchPool<T> {
    /// Create an empty pool
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState {
                free: Vec::new(),
                stats: PoolStats::default(),
            }),
        }
    }

    /// Borrow a container, reusing an idle one when available
    pub fn lease(&self) -> Lease<'_, T> {
        let mut state = self.state.lock();
        state.stats.leased += 1;
        let item = if let Some(item) = state.free.pop() {
            item
        } else {
            state.stats.created += 1;
            T::default()
        };
        state.stats.available = state.free.len();

        Lease { pool: self, item }
    }

    /// Pool statistics
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.state.lock().stats
    }

    /// Retention limits
    #[inline]
    #[must_use]
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    fn give_back(&self, mut item: T) {
        item.reset();

        let mut state = self.state.lock();
        if item.retained_capacity() > self.config.max_retained_capacity
            || state.free.len() >= self.config.max_retained
        {
            state.stats.discarded += 1;
        } else {
            state.free.push(item);
            state.stats.returned += 1;
        }
        state.stats.available = state.free.len();
    }
}

impl<T: Scratch> Default for ScratchPool<T> {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Scoped borrow of a pooled container
///
/// Dereferences to the container; hands it back to the pool on drop.
#[derive(Debug)]
pub struct Lease<'p, T: Scratch> {
    pool: &'p ScratchPool<T>,
    item: T,
}

impl<T: Scratch> Deref for Lease<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Scratch> DerefMut for Lease<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Scratch> Drop for Lease<'_, T> {
    fn drop(&mut self) {
        let item = std::mem::take(&mut self.item);
        self.pool.give_back(item);
    }
}

/// The pools one scan draws from
#[derive(Debug)]
pub struct ScratchPools {
    identities: ScratchPool<IdentitySet>,
    matches: ScratchPool<Vec<Match>>,
}

static GLOBAL_POOLS: Lazy<ScratchPools> = Lazy::new(ScratchPools::default);

impl ScratchPools {
    /// Create pools with the given retention limits
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            identities: ScratchPool::new(config),
            matches: ScratchPool::new(config),
        }
    }

    /// Process-wide pools shared by every scanner that does not bring its own
    #[must_use]
    pub fn global() -> &'static ScratchPools {
        &GLOBAL_POOLS
    }

    /// Pool of identity sets
    #[inline]
    #[must_use]
    pub fn identities(&self) -> &ScratchPool<IdentitySet> {
        &self.identities
    }

    /// Pool of match lists
    #[inline]
    #[must_use]
    pub fn matches(&self) -> &ScratchPool<Vec<Match>> {
        &self.matches
    }
}

impl Default for ScratchPools {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
