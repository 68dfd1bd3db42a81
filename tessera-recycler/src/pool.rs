//! Keyed object pools for reusable view instances.
//!
//! ## Usage
//!
//! Register one [`Template`] per kind of view, then acquire and release
//! instances through a [`PoolRegistry`]. Released instances stay alive in the
//! pool and are handed out again, most recently released first.
use std::{
    fmt,
    ops::{Add, AddAssign},
};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use tracing::{trace, warn};

use crate::{
    error::{BoxError, PoolError},
    node::{PoolableReset, ResetHooks, SceneNode},
};

slotmap::new_key_type! {
    /// Handle to an instance owned by a [`Pool`].
    pub struct PoolHandle;
}

/// Opaque identity of a view kind.
///
/// Pools are keyed by this value rather than by a live object, so two
/// recyclers can share nothing but a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateId(pub u64);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Factory<V> = Box<dyn FnMut() -> Result<V, BoxError>>;
type Hook<V> = Box<dyn FnMut(&mut V)>;

/// Describes how instances of one view kind are created and recycled.
pub struct Template<V> {
    id: TemplateId,
    factory: Factory<V>,
    on_acquire: Option<Hook<V>>,
    on_release: Option<Hook<V>>,
    reset: Option<ResetHooks<V>>,
}

impl<V> Template<V> {
    /// Creates a template from its identity and a factory.
    pub fn new<F>(id: TemplateId, factory: F) -> Self
    where
        F: FnMut() -> Result<V, BoxError> + 'static,
    {
        Self {
            id,
            factory: Box::new(factory),
            on_acquire: None,
            on_release: None,
            reset: None,
        }
    }

    /// Runs `hook` every time an instance is handed out.
    pub fn on_acquire<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut V) + 'static,
    {
        self.on_acquire = Some(Box::new(hook));
        self
    }

    /// Runs `hook` every time an instance goes back to the pool, before it is
    /// detached.
    pub fn on_release<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut V) + 'static,
    {
        self.on_release = Some(Box::new(hook));
        self
    }

    /// Enables the [`PoolableReset`] hooks for this template's instances.
    pub fn resettable(mut self) -> Self
    where
        V: PoolableReset,
    {
        self.reset = Some(ResetHooks::of());
        self
    }

    /// Identity of the template.
    pub fn id(&self) -> TemplateId {
        self.id
    }
}

impl<V> fmt::Debug for Template<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("id", &self.id)
            .field("resettable", &self.reset.is_some())
            .finish_non_exhaustive()
    }
}

/// Lifecycle state of a pooled instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Detached, hidden and waiting in the free list.
    Free,
    /// Attached to a parent and in use.
    Active,
}

struct PoolEntry<V> {
    node: V,
    state: EntryState,
}

/// Instance counts of a pool. `active + free == total_created` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Instances currently handed out.
    pub active: usize,
    /// Instances waiting in the free list.
    pub free: usize,
    /// Instances ever created by the factory and not torn down.
    pub total_created: usize,
}

impl Add for PoolStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            active: self.active + rhs.active,
            free: self.free + rhs.free,
            total_created: self.total_created + rhs.total_created,
        }
    }
}

impl AddAssign for PoolStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// A pool of instances created from a single [`Template`].
pub struct Pool<V: SceneNode> {
    template: Template<V>,
    entries: SlotMap<PoolHandle, PoolEntry<V>>,
    free: Vec<PoolHandle>,
    active: usize,
}

impl<V: SceneNode> Pool<V> {
    /// Creates an empty pool. Nothing is allocated until the first acquire.
    pub fn new(template: Template<V>) -> Self {
        Self {
            template,
            entries: SlotMap::with_key(),
            free: Vec::new(),
            active: 0,
        }
    }

    /// Identity of the template backing this pool.
    pub fn template_id(&self) -> TemplateId {
        self.template.id
    }

    /// Current instance counts.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active,
            free: self.free.len(),
            total_created: self.entries.len(),
        }
    }

    /// Creates `count` instances up front and leaves them in the free list.
    pub fn prewarm(&mut self, count: usize) -> Result<(), PoolError> {
        for _ in 0..count {
            let handle = self.create()?;
            self.free.push(handle);
        }
        Ok(())
    }

    /// Hands out an instance attached under `parent`.
    ///
    /// The most recently released instance is reused first; a new one is
    /// created only when the free list is empty. A factory failure aborts
    /// this acquisition.
    pub fn acquire(&mut self, parent: V::Parent) -> Result<PoolHandle, PoolError> {
        let handle = match self.free.pop() {
            Some(handle) => handle,
            None => self.create()?,
        };
        let Some(entry) = self.entries.get_mut(handle) else {
            return Err(PoolError::StaleHandle(handle));
        };

        if entry.node.parent() != Some(parent) {
            entry.node.set_parent(Some(parent));
        }
        entry.node.reset_local_transform();
        entry.node.set_active(true);
        entry.state = EntryState::Active;
        self.active += 1;

        if let Some(hook) = self.template.on_acquire.as_mut() {
            hook(&mut entry.node);
        }
        trace!(template = %self.template.id, ?handle, "acquired pool entry");
        Ok(handle)
    }

    /// Returns an active instance to the free list.
    ///
    /// Releasing an entry that is already free is rejected and leaves the
    /// pool untouched.
    pub fn release(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        let Some(entry) = self.entries.get_mut(handle) else {
            warn!(template = %self.template.id, ?handle, "release of unknown pool entry");
            return Err(PoolError::StaleHandle(handle));
        };
        if entry.state == EntryState::Free {
            warn!(template = %self.template.id, ?handle, "pool entry released twice");
            return Err(PoolError::NotActive(handle));
        }

        self.free.push(handle);
        entry.state = EntryState::Free;
        self.active -= 1;

        if let Some(hook) = self.template.on_release.as_mut() {
            hook(&mut entry.node);
        }
        entry.node.set_parent(None);
        entry.node.set_active(false);
        if let Some(reset) = self.template.reset {
            (reset.reset_to_defaults)(&mut entry.node);
        }
        trace!(template = %self.template.id, ?handle, "released pool entry");
        Ok(())
    }

    /// Releases every active instance. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let active: Vec<PoolHandle> = self.active_handles().collect();
        let mut released = 0;
        for handle in active {
            if self.release(handle).is_ok() {
                released += 1;
            }
        }
        released
    }

    /// Handles of all active instances, in creation order.
    pub fn active_handles(&self) -> impl Iterator<Item = PoolHandle> + '_ {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.state == EntryState::Active)
            .map(|(handle, _)| handle)
    }

    /// State of an instance, or `None` for a foreign handle.
    pub fn state(&self, handle: PoolHandle) -> Option<EntryState> {
        self.entries.get(handle).map(|entry| entry.state)
    }

    /// Borrows an instance.
    pub fn get(&self, handle: PoolHandle) -> Option<&V> {
        self.entries.get(handle).map(|entry| &entry.node)
    }

    /// Mutably borrows an instance.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut V> {
        self.entries.get_mut(handle).map(|entry| &mut entry.node)
    }

    fn create(&mut self) -> Result<PoolHandle, PoolError> {
        let template = self.template.id;
        let mut node =
            (self.template.factory)().map_err(|source| PoolError::Factory { template, source })?;
        if let Some(reset) = self.template.reset {
            (reset.cache_defaults)(&mut node);
        }
        node.set_parent(None);
        node.set_active(false);
        let handle = self.entries.insert(PoolEntry {
            node,
            state: EntryState::Free,
        });
        trace!(%template, ?handle, total = self.entries.len(), "created pool entry");
        Ok(handle)
    }
}

impl<V: SceneNode> fmt::Debug for Pool<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("template", &self.template)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Pools owned by one widget, keyed by [`TemplateId`].
pub struct PoolRegistry<V: SceneNode> {
    pools: FxHashMap<TemplateId, Pool<V>>,
}

impl<V: SceneNode> Default for PoolRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SceneNode> PoolRegistry<V> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            pools: FxHashMap::default(),
        }
    }

    /// Registers a template, returning the pool it replaced, if any.
    pub fn register(&mut self, template: Template<V>) -> Option<Pool<V>> {
        self.pools.insert(template.id(), Pool::new(template))
    }

    /// Whether a pool exists for `template`.
    pub fn contains(&self, template: TemplateId) -> bool {
        self.pools.contains_key(&template)
    }

    /// Borrows the pool for `template`.
    pub fn pool(&self, template: TemplateId) -> Option<&Pool<V>> {
        self.pools.get(&template)
    }

    /// Mutably borrows the pool for `template`.
    pub fn pool_mut(&mut self, template: TemplateId) -> Option<&mut Pool<V>> {
        self.pools.get_mut(&template)
    }

    /// Acquires an instance of `template` attached under `parent`.
    pub fn acquire(
        &mut self,
        template: TemplateId,
        parent: V::Parent,
    ) -> Result<PoolHandle, PoolError> {
        self.try_pool_mut(template)?.acquire(parent)
    }

    /// Releases an instance of `template`.
    pub fn release(&mut self, template: TemplateId, handle: PoolHandle) -> Result<(), PoolError> {
        self.try_pool_mut(template)?.release(handle)
    }

    /// Releases every active instance of `template`.
    pub fn release_all(&mut self, template: TemplateId) -> Result<usize, PoolError> {
        Ok(self.try_pool_mut(template)?.release_all())
    }

    /// Borrows an instance of `template`.
    pub fn get(&self, template: TemplateId, handle: PoolHandle) -> Option<&V> {
        self.pools.get(&template)?.get(handle)
    }

    /// Mutably borrows an instance of `template`.
    pub fn get_mut(&mut self, template: TemplateId, handle: PoolHandle) -> Option<&mut V> {
        self.pools.get_mut(&template)?.get_mut(handle)
    }

    /// Removes a pool and destroys all of its instances.
    pub fn remove(&mut self, template: TemplateId) -> Option<Pool<V>> {
        self.pools.remove(&template)
    }

    /// Destroys every pool.
    pub fn clear(&mut self) {
        self.pools.clear();
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether no template is registered.
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Counts summed over every pool.
    pub fn stats(&self) -> PoolStats {
        self.pools
            .values()
            .fold(PoolStats::default(), |acc, pool| acc + pool.stats())
    }

    fn try_pool_mut(&mut self, template: TemplateId) -> Result<&mut Pool<V>, PoolError> {
        self.pools
            .get_mut(&template)
            .ok_or(PoolError::UnknownTemplate(template))
    }
}

impl<V: SceneNode> fmt::Debug for PoolRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.pools.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ContainerId, RecordingNode};

    const ROOT: ContainerId = ContainerId(1);

    fn pool() -> Pool<RecordingNode> {
        Pool::new(RecordingNode::template(TemplateId(7)))
    }

    fn assert_conserved(pool: &Pool<RecordingNode>) {
        let stats = pool.stats();
        assert_eq!(stats.active + stats.free, stats.total_created);
    }

    #[test]
    fn test_acquire_creates_and_attaches() {
        let mut pool = pool();
        let handle = pool.acquire(ROOT).unwrap();
        let node = pool.get(handle).unwrap();

        assert_eq!(node.parent(), Some(ROOT));
        assert!(node.is_active());
        assert_eq!(node.transform_resets, 1);
        assert_eq!(
            pool.stats(),
            PoolStats {
                active: 1,
                free: 0,
                total_created: 1
            }
        );
    }

    #[test]
    fn test_release_detaches_and_resets() {
        let mut pool = pool();
        let handle = pool.acquire(ROOT).unwrap();
        pool.get_mut(handle).unwrap().tint = 42;
        pool.release(handle).unwrap();

        let node = pool.get(handle).unwrap();
        assert_eq!(node.parent(), None);
        assert!(!node.is_active());
        assert_eq!(node.tint, RecordingNode::DEFAULT_TINT);
        assert_eq!(node.resets, 1);
        assert_eq!(pool.state(handle), Some(EntryState::Free));
        assert_conserved(&pool);
    }

    #[test]
    fn test_reuse_is_lifo() {
        let mut pool = pool();
        let a = pool.acquire(ROOT).unwrap();
        let b = pool.acquire(ROOT).unwrap();
        pool.release(a).unwrap();
        pool.release(b).unwrap();

        assert_eq!(pool.acquire(ROOT).unwrap(), b);
        assert_eq!(pool.acquire(ROOT).unwrap(), a);
        assert_eq!(pool.stats().total_created, 2);
    }

    #[test]
    fn test_double_release_is_rejected() {
        let mut pool = pool();
        let handle = pool.acquire(ROOT).unwrap();
        pool.release(handle).unwrap();

        assert!(matches!(pool.release(handle), Err(PoolError::NotActive(h)) if h == handle));
        assert_eq!(pool.stats().free, 1);
        assert_conserved(&pool);
    }

    #[test]
    fn test_factory_failure_surfaces() {
        let mut pool: Pool<RecordingNode> = Pool::new(Template::new(TemplateId(3), || {
            Err("out of nodes".into())
        }));

        let err = pool.acquire(ROOT).unwrap_err();
        assert!(matches!(err, PoolError::Factory { template, .. } if template == TemplateId(3)));
        assert_eq!(pool.stats(), PoolStats::default());
    }

    #[test]
    fn test_release_all_and_hooks() {
        let mut pool = Pool::new(
            RecordingNode::template(TemplateId(1)).on_acquire(|node: &mut RecordingNode| {
                node.bring_to_front();
            }),
        );
        for _ in 0..4 {
            pool.acquire(ROOT).unwrap();
        }
        assert_eq!(pool.release_all(), 4);
        assert_eq!(pool.release_all(), 0);

        let handle = pool.acquire(ROOT).unwrap();
        assert_eq!(pool.get(handle).unwrap().front_moves, 2);
        assert_conserved(&pool);
    }

    #[test]
    fn test_cache_defaults_runs_once() {
        let mut pool = pool();
        let handle = pool.acquire(ROOT).unwrap();
        pool.release(handle).unwrap();
        let again = pool.acquire(ROOT).unwrap();

        assert_eq!(again, handle);
        assert_eq!(pool.get(handle).unwrap().defaults_cached, 1);
    }

    #[test]
    fn test_prewarm() {
        let mut pool = pool();
        pool.prewarm(3).unwrap();
        assert_eq!(
            pool.stats(),
            PoolStats {
                active: 0,
                free: 3,
                total_created: 3
            }
        );
        pool.acquire(ROOT).unwrap();
        assert_eq!(pool.stats().total_created, 3);
    }

    #[test]
    fn test_registry_keys_by_template() {
        let mut registry = PoolRegistry::new();
        registry.register(RecordingNode::template(TemplateId(1)));
        registry.register(RecordingNode::template(TemplateId(2)));

        let a = registry.acquire(TemplateId(1), ROOT).unwrap();
        registry.acquire(TemplateId(2), ROOT).unwrap();
        registry.release(TemplateId(1), a).unwrap();

        assert_eq!(registry.pool(TemplateId(1)).unwrap().stats().free, 1);
        assert_eq!(registry.pool(TemplateId(2)).unwrap().stats().active, 1);
        assert_eq!(
            registry.stats(),
            PoolStats {
                active: 1,
                free: 1,
                total_created: 2
            }
        );
        assert!(matches!(
            registry.acquire(TemplateId(9), ROOT),
            Err(PoolError::UnknownTemplate(TemplateId(9)))
        ));

        registry.remove(TemplateId(1));
        assert!(!registry.contains(TemplateId(1)));
        assert_eq!(registry.len(), 1);
    }
}
