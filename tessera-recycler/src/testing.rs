//! In-memory scene node for tests.
//!
//! [`RecordingNode`] counts every call the pool and the recycler make on it,
//! so tests can assert on lifecycle effects without a real scene graph.
use crate::{
    node::{CellFrame, PoolableReset, SceneNode},
    pool::{Template, TemplateId},
};

/// Identity of a container in the in-memory scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u32);

/// A scene node that records what was done to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingNode {
    /// Creation order within its template.
    pub serial: usize,
    /// Last frame applied.
    pub frame: CellFrame,
    /// Per-item customization restored by [`PoolableReset`].
    pub tint: u32,
    /// Logical index last shown, cleared on reset.
    pub content: Option<usize>,
    /// Times [`RecordingNode::show`] ran.
    pub updates: usize,
    /// Times the local transform was reset.
    pub transform_resets: usize,
    /// Times the node was restored to its defaults.
    pub resets: usize,
    /// Times the defaults were captured.
    pub defaults_cached: usize,
    /// Times the node was moved to the front.
    pub front_moves: usize,
    parent: Option<ContainerId>,
    active: bool,
    cached_tint: u32,
}

impl RecordingNode {
    /// Tint a fresh node starts with.
    pub const DEFAULT_TINT: u32 = 0xffff_ffff;

    /// Creates a detached, visible node.
    pub fn new(serial: usize) -> Self {
        Self {
            serial,
            frame: CellFrame::default(),
            tint: Self::DEFAULT_TINT,
            content: None,
            updates: 0,
            transform_resets: 0,
            resets: 0,
            defaults_cached: 0,
            front_moves: 0,
            parent: None,
            active: true,
            cached_tint: Self::DEFAULT_TINT,
        }
    }

    /// A resettable template numbering its nodes from zero.
    pub fn template(id: TemplateId) -> Template<Self> {
        let mut next = 0;
        Template::new(id, move || {
            let node = Self::new(next);
            next += 1;
            Ok(node)
        })
        .resettable()
    }

    /// Binds the node to a logical index.
    pub fn show(&mut self, index: usize) {
        self.content = Some(index);
        self.updates += 1;
    }
}

impl SceneNode for RecordingNode {
    type Parent = ContainerId;

    fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<ContainerId>) {
        self.parent = parent;
    }

    fn reset_local_transform(&mut self) {
        self.transform_resets += 1;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn bring_to_front(&mut self) {
        self.front_moves += 1;
    }

    fn set_frame(&mut self, frame: CellFrame) {
        self.frame = frame;
    }
}

impl PoolableReset for RecordingNode {
    fn cache_defaults(&mut self) {
        self.cached_tint = self.tint;
        self.defaults_cached += 1;
    }

    fn reset_to_defaults(&mut self) {
        self.tint = self.cached_tint;
        self.content = None;
        self.resets += 1;
    }
}
