//! Host scene-graph interface consumed by the pool and the recycler.
//!
//! The recycler never owns a scene graph. Whatever the host renders with, each
//! pooled view instance is reached through [`SceneNode`], and instances that
//! keep ad hoc per-item customization can opt into [`PoolableReset`].
use std::fmt;

use glam::Vec2;

/// Layout rectangle assigned to a node, in the container's content space.
///
/// The origin is the top-left corner of the content, x grows to the right and
/// y grows downward. Hosts apply the scroll offset when rendering the
/// container, so frames stay stable while the content scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellFrame {
    /// Top-left corner of the cell.
    pub position: Vec2,
    /// Width and height of the cell.
    pub size: Vec2,
}

impl CellFrame {
    /// Creates a frame from a position and a size.
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Bottom-right corner of the frame.
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }
}

/// A view instance living in the host scene graph.
///
/// Implementations are thin handles over host objects: the recycler only asks
/// them to move between parents, toggle visibility and accept a frame.
pub trait SceneNode {
    /// Identity of a container node that instances can be parented under.
    type Parent: Copy + PartialEq + fmt::Debug;

    /// Returns the current parent, if attached.
    fn parent(&self) -> Option<Self::Parent>;

    /// Attaches the node under `parent`, or detaches it when `None`.
    fn set_parent(&mut self, parent: Option<Self::Parent>);

    /// Resets scale and rotation to identity and the local offset to zero.
    fn reset_local_transform(&mut self);

    /// Shows or hides the node.
    fn set_active(&mut self, active: bool);

    /// Whether the node is currently shown.
    fn is_active(&self) -> bool;

    /// Moves the node to the end of its parent's draw order.
    fn bring_to_front(&mut self) {}

    /// Applies a layout rectangle.
    fn set_frame(&mut self, frame: CellFrame);
}

/// Optional capability for instances that must undo per-item customization
/// before they are reused for unrelated data.
pub trait PoolableReset {
    /// Captures the pristine state. Called once, right after creation.
    fn cache_defaults(&mut self);

    /// Restores the state captured by [`PoolableReset::cache_defaults`].
    /// Called on every release.
    fn reset_to_defaults(&mut self);
}

/// [`PoolableReset`] entry points, resolved once per template.
pub(crate) struct ResetHooks<V> {
    pub(crate) cache_defaults: fn(&mut V),
    pub(crate) reset_to_defaults: fn(&mut V),
}

impl<V: PoolableReset> ResetHooks<V> {
    pub(crate) fn of() -> Self {
        Self {
            cache_defaults: V::cache_defaults,
            reset_to_defaults: V::reset_to_defaults,
        }
    }
}

impl<V> Clone for ResetHooks<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for ResetHooks<V> {}

impl<V> fmt::Debug for ResetHooks<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetHooks").finish_non_exhaustive()
    }
}
