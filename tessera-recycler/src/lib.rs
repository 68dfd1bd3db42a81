//! Pooled, virtualized scroll views for retained scene graphs.
//!
//! # Usage
//!
//! Implement [`SceneNode`] for the host's view handle, register a
//! [`Template`] describing how instances are made, then initialize a
//! [`RecyclerView`] with the dataset length and a callback that writes item
//! content into an instance.
//!
//! ```
//! use glam::Vec2;
//! use tessera_recycler::{
//!     CellFrame, GridSizing, GridSpec, RecyclerArgs, RecyclerView, SceneNode, ScrollInput,
//!     Template, TemplateId,
//! };
//!
//! #[derive(Default)]
//! struct Label {
//!     parent: Option<u32>,
//!     active: bool,
//!     text: String,
//!     frame: CellFrame,
//! }
//!
//! impl SceneNode for Label {
//!     type Parent = u32;
//!
//!     fn parent(&self) -> Option<u32> {
//!         self.parent
//!     }
//!     fn set_parent(&mut self, parent: Option<u32>) {
//!         self.parent = parent;
//!     }
//!     fn reset_local_transform(&mut self) {}
//!     fn set_active(&mut self, active: bool) {
//!         self.active = active;
//!     }
//!     fn is_active(&self) -> bool {
//!         self.active
//!     }
//!     fn set_frame(&mut self, frame: CellFrame) {
//!         self.frame = frame;
//!     }
//! }
//!
//! # fn main() -> Result<(), tessera_recycler::RecyclerError> {
//! const LABEL: TemplateId = TemplateId(0);
//!
//! let args = RecyclerArgs::default()
//!     .grid(
//!         GridSpec::default()
//!             .sizing(GridSizing::FixedColumns(3))
//!             .cell_size(Vec2::new(80.0, 40.0)),
//!     )
//!     .viewport_size(Vec2::new(240.0, 200.0));
//! let mut view = RecyclerView::new(1, args);
//! view.register_template(Template::new(LABEL, || Ok(Label::default())));
//! view.initialize(LABEL, 10_000, |label, index| label.text = format!("#{index}"), None)?;
//!
//! // 6 visible rows of 3 columns, whatever the dataset length.
//! assert_eq!(view.active_count(), 18);
//!
//! view.snap_to_element(5_000, true)?;
//! view.tick(1.0 / 60.0, ScrollInput::default())?;
//! assert!(view.visible_window().contains(5_000));
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

pub mod error;
pub mod grid;
pub mod node;
pub mod pool;
pub mod recycler;
pub mod scroll;
pub mod scrollbar;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod tests;

pub use error::{BoxError, PoolError, RecyclerError};
pub use grid::{
    Corner, GridLayout, GridSizing, GridSpec, Padding, StartAxis, arrange, grid_dimensions,
};
pub use node::{CellFrame, PoolableReset, SceneNode};
pub use pool::{EntryState, Pool, PoolHandle, PoolRegistry, PoolStats, Template, TemplateId};
pub use recycler::{RecyclerArgs, RecyclerView, ReturnItemFn, UpdateItemFn, VisibleWindow};
pub use scroll::{
    MovementPolicy, SCROLL_SNAP_EPSILON, ScrollController, ScrollInput, ScrollSettings,
};
pub use scrollbar::{DEFAULT_MIN_HANDLE_SIZE, ScrollbarState, ScrollbarSync};
