//! Virtualized, pooled scroll view.
//!
//! ## Usage
//!
//! A [`RecyclerView`] shows a dataset of any length through a handful of
//! pooled view instances. The host registers one or more [`Template`]s,
//! calls [`RecyclerView::initialize`] with a callback that writes item
//! content into an instance, and drives the view with
//! [`RecyclerView::tick`] once per frame.
//!
//! Each tick runs three stages in a fixed order: the scroll controller
//! advances the offset, the visible window is recomputed from that offset,
//! and the scrollbar is synced to the same offset.
use std::{fmt, ops::Range};

use derive_setters::Setters;
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{
    error::RecyclerError,
    grid::{Corner, GridLayout, GridSpec, StartAxis},
    node::SceneNode,
    pool::{PoolHandle, PoolRegistry, PoolStats, Template, TemplateId},
    scroll::{ScrollController, ScrollInput, ScrollSettings},
    scrollbar::{DEFAULT_MIN_HANDLE_SIZE, ScrollbarState, ScrollbarSync},
};

/// Callback writing the content of a logical index into an instance.
pub type UpdateItemFn<V> = Box<dyn FnMut(&mut V, usize)>;
/// Callback run on an instance right before it goes back to its pool.
pub type ReturnItemFn<V> = Box<dyn FnMut(&mut V)>;
type ScrollbarListener = Box<dyn FnMut(ScrollbarState)>;

/// Arguments for a [`RecyclerView`].
#[derive(Debug, Clone, PartialEq, Setters)]
pub struct RecyclerArgs {
    /// Grid arrangement of the items. Rows always run top to bottom and
    /// indices always fill a row first.
    pub grid: GridSpec,
    /// Scroll behavior.
    pub scroll: ScrollSettings,
    /// Size of the visible area.
    pub viewport_size: Vec2,
    /// Smallest scrollbar handle, as a fraction of the track.
    pub min_handle_size: f32,
}

impl Default for RecyclerArgs {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            scroll: ScrollSettings::default(),
            viewport_size: Vec2::ZERO,
            min_handle_size: DEFAULT_MIN_HANDLE_SIZE,
        }
    }
}

/// Contiguous range of logical indices backed by pool entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleWindow {
    /// First logical index of the window.
    pub start_index: usize,
    /// Number of indices currently displayed.
    pub count: usize,
}

impl VisibleWindow {
    /// Indices covered by the window.
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.start_index + self.count
    }

    /// Whether `index` is displayed.
    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    handle: PoolHandle,
    index: Option<usize>,
}

struct Binding<V> {
    template: TemplateId,
    item_count: usize,
    on_update: UpdateItemFn<V>,
    on_return: Option<ReturnItemFn<V>>,
}

/// A scroll view that recycles pooled instances for a virtual dataset.
pub struct RecyclerView<V: SceneNode> {
    container: V::Parent,
    pools: PoolRegistry<V>,
    binding: Option<Binding<V>>,
    grid: GridSpec,
    layout: GridLayout,
    viewport: Vec2,
    scroll: ScrollController,
    scrollbar: ScrollbarSync,
    scrollbar_listener: Option<ScrollbarListener>,
    window: VisibleWindow,
    slots: SmallVec<[Slot; 32]>,
    slot_template: Option<TemplateId>,
    needs_refresh: bool,
}

impl<V: SceneNode> RecyclerView<V> {
    /// Creates an empty view whose instances are parented under `container`.
    pub fn new(container: V::Parent, args: RecyclerArgs) -> Self {
        let viewport = args.viewport_size.max(Vec2::ZERO);
        let layout = recycler_grid(&args.grid).measure(0, viewport);
        Self {
            container,
            pools: PoolRegistry::new(),
            binding: None,
            grid: args.grid,
            layout,
            viewport,
            scroll: ScrollController::new(args.scroll),
            scrollbar: ScrollbarSync::new(args.min_handle_size),
            scrollbar_listener: None,
            window: VisibleWindow::default(),
            slots: SmallVec::new(),
            slot_template: None,
            needs_refresh: true,
        }
    }

    /// Registers a template the view can be initialized with.
    ///
    /// Re-registering the template currently on screen drains its entries
    /// first; the view is rebuilt on the next refresh.
    pub fn register_template(&mut self, template: Template<V>) {
        if self.slot_template == Some(template.id()) {
            self.release_slots();
            self.needs_refresh = true;
        }
        self.pools.register(template);
    }

    /// (Re)configures the dataset and callbacks, then rebuilds the view.
    ///
    /// Entries acquired for a previous configuration are returned before any
    /// entry for the new one is acquired.
    pub fn initialize<F>(
        &mut self,
        template: TemplateId,
        total_item_count: usize,
        on_update: F,
        on_return: Option<ReturnItemFn<V>>,
    ) -> Result<(), RecyclerError>
    where
        F: FnMut(&mut V, usize) + 'static,
    {
        if !self.pools.contains(template) {
            return Err(RecyclerError::UnknownTemplate(template));
        }
        self.release_slots();
        self.binding = Some(Binding {
            template,
            item_count: total_item_count,
            on_update: Box::new(on_update),
            on_return,
        });
        self.refresh()
    }

    /// Changes the dataset length. Takes effect on the next refresh.
    pub fn set_item_count(&mut self, total_item_count: usize) {
        if let Some(binding) = self.binding.as_mut() {
            if binding.item_count != total_item_count {
                binding.item_count = total_item_count;
                self.needs_refresh = true;
            }
        }
    }

    /// Resizes the viewport. Takes effect on the next refresh.
    pub fn set_viewport_size(&mut self, size: Vec2) {
        let size = size.max(Vec2::ZERO);
        if self.viewport != size {
            self.viewport = size;
            self.needs_refresh = true;
        }
    }

    /// Replaces the grid arrangement. Takes effect on the next refresh.
    pub fn set_grid_spec(&mut self, grid: GridSpec) {
        if self.grid != grid {
            self.grid = grid;
            self.needs_refresh = true;
        }
    }

    /// Replaces the scroll settings.
    pub fn set_scroll_settings(&mut self, settings: ScrollSettings) {
        self.scroll.set_settings(settings);
    }

    /// Installs a callback that receives the scrollbar handle whenever it
    /// changes.
    pub fn set_scrollbar_listener<F>(&mut self, listener: F)
    where
        F: FnMut(ScrollbarState) + 'static,
    {
        self.scrollbar_listener = Some(Box::new(listener));
        self.scrollbar.invalidate();
    }

    /// Requests a normalized scroll position in `[0, 1]`.
    ///
    /// Returns `false` without doing anything when the content fits the
    /// viewport.
    pub fn set_normalized_scroll_position(&mut self, value: f32, immediate: bool) -> bool {
        self.remeasure_if_stale();
        let applied = self.scroll.set_normalized_target(value, immediate);
        if applied && immediate && !self.needs_refresh {
            self.update_window();
        }
        applied
    }

    /// Scrolls to the first row.
    pub fn scroll_to_start(&mut self, immediate: bool) -> bool {
        self.set_normalized_scroll_position(0.0, immediate)
    }

    /// Scrolls to the last row.
    pub fn scroll_to_end(&mut self, immediate: bool) -> bool {
        self.set_normalized_scroll_position(1.0, immediate)
    }

    /// Moves the scroll target by `delta` pixels.
    pub fn scroll_by(&mut self, delta: f32) -> bool {
        self.remeasure_if_stale();
        self.scroll.scroll_by(delta)
    }

    /// Scrolls so the row holding `index` starts at the top of the viewport,
    /// or as close as the scroll range allows, then rebuilds the window.
    pub fn snap_to_element(&mut self, index: usize, immediate: bool) -> Result<(), RecyclerError> {
        let len = match self.binding.as_ref() {
            Some(binding) => binding.item_count,
            None => return Err(RecyclerError::NotInitialized),
        };
        if index >= len {
            return Err(RecyclerError::IndexOutOfRange { index, len });
        }
        if self.needs_refresh {
            self.refresh()?;
        }

        let (row, _) = self.layout.cell_coords(index);
        let offset = self.layout.padding().top + row as f32 * self.layout.row_height();
        if offset >= self.scroll.max_extent() {
            self.scroll.set_normalized_target(1.0, immediate);
        } else {
            self.scroll.set_target_offset(offset, immediate);
        }
        debug!(index, row, offset, "snapping to element");
        self.refresh()
    }

    /// Runs the update callback again for every displayed entry, without
    /// moving the window. A pending geometry change is applied first.
    pub fn update_all_displayed_items(&mut self) -> Result<(), RecyclerError> {
        if self.needs_refresh {
            self.refresh()?;
        }
        let Self {
            pools,
            binding,
            slots,
            slot_template,
            ..
        } = self;
        let (Some(binding), Some(template)) = (binding.as_mut(), *slot_template) else {
            return Ok(());
        };
        for slot in slots.iter() {
            let Some(index) = slot.index.filter(|&index| index < binding.item_count) else {
                continue;
            };
            if let Some(node) = pools.get_mut(template, slot.handle) {
                (binding.on_update)(node, index);
            }
        }
        Ok(())
    }

    /// Advances the view by one frame.
    ///
    /// `input` carries the wheel and drag deltas the host resolved for this
    /// frame. The scrollbar is synced even when the refresh fails; the
    /// refresh error is returned afterwards.
    pub fn tick(&mut self, delta_time: f32, input: ScrollInput) -> Result<(), RecyclerError> {
        self.remeasure_if_stale();
        self.scroll.apply_input(input);
        self.scroll.tick(delta_time);

        let refreshed = if self.needs_refresh {
            self.refresh()
        } else {
            self.update_window();
            Ok(())
        };

        let state = self.scrollbar.sync(
            self.scroll.normalized_position(),
            self.viewport.y,
            self.scroll.max_extent(),
        );
        if let (Some(state), Some(listener)) = (state, self.scrollbar_listener.as_mut()) {
            listener(state);
        }
        refreshed
    }

    /// Rebuilds geometry, scroll range and pool entries from scratch.
    ///
    /// Every active entry is returned before the entries for the current
    /// geometry are acquired, so the active count never exceeds what the
    /// viewport can show.
    ///
    /// A factory failure leaves the entries acquired so far bound and on
    /// screen. It is not retried until the next explicit refresh or
    /// configuration change.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn refresh(&mut self) -> Result<(), RecyclerError> {
        self.needs_refresh = false;
        let item_count = self.item_count();
        self.remeasure();

        self.release_slots();
        let Some(template) = self.binding.as_ref().map(|binding| binding.template) else {
            return Ok(());
        };

        let needed = self.pool_size();
        self.slot_template = Some(template);
        let mut failure = None;
        for _ in 0..needed {
            match self.pools.acquire(template, self.container) {
                Ok(handle) => self.slots.push(Slot {
                    handle,
                    index: None,
                }),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        self.window.start_index = self.first_visible_index();
        self.bind_slots();
        if let Some(err) = failure {
            warn!(%err, acquired = self.slots.len(), needed, "recycler refresh incomplete");
            return Err(err.into());
        }
        debug!(
            %template,
            item_count,
            rows = self.layout.rows(),
            columns = self.layout.columns(),
            pooled = needed,
            window = ?self.window,
            "recycler refreshed"
        );
        Ok(())
    }

    /// Releases every entry and destroys all pools and callbacks.
    pub fn teardown(&mut self) {
        self.release_slots();
        self.binding = None;
        self.pools.clear();
        self.needs_refresh = true;
    }

    /// Current visible window.
    pub fn visible_window(&self) -> VisibleWindow {
        self.window
    }

    /// Number of pool entries held by the view, displayed or not.
    pub fn active_count(&self) -> usize {
        self.slots.len()
    }

    /// Length of the dataset, zero before initialization.
    pub fn item_count(&self) -> usize {
        self.binding
            .as_ref()
            .map_or(0, |binding| binding.item_count)
    }

    /// Layout from the last refresh.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Grid arrangement in use.
    pub fn grid_spec(&self) -> &GridSpec {
        &self.grid
    }

    /// Viewport size in use.
    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    /// Scroll controller driving the view.
    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    /// Rendered scroll offset as a fraction of the scroll range.
    pub fn normalized_position(&self) -> f32 {
        self.scroll.normalized_position()
    }

    /// Whether the content overflows the viewport.
    pub fn is_scrolling_allowed(&self) -> bool {
        self.scroll.is_scrolling_allowed()
    }

    /// Scrollbar handle for the current offset.
    pub fn scrollbar_state(&self) -> ScrollbarState {
        ScrollbarState::compute(
            self.scroll.normalized_position(),
            self.viewport.y,
            self.scroll.max_extent(),
            self.scrollbar.min_handle_size(),
        )
    }

    /// Scrollbar handle length as a fraction of the track.
    pub fn handle_size(&self) -> f32 {
        self.scrollbar_state().handle_size
    }

    /// Scrollbar handle start as a fraction of the track.
    pub fn handle_position(&self) -> f32 {
        self.scrollbar_state().handle_offset()
    }

    /// Whether a geometry change is waiting for the next refresh.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Pools owned by the view.
    pub fn pools(&self) -> &PoolRegistry<V> {
        &self.pools
    }

    /// Counts summed over every pool of the view.
    pub fn pool_stats(&self) -> PoolStats {
        self.pools.stats()
    }

    /// Displayed entries with their logical index, in window order.
    pub fn displayed(&self) -> impl Iterator<Item = (usize, &V)> + '_ {
        let item_count = self.item_count();
        self.slots.iter().filter_map(move |slot| {
            let index = slot.index.filter(|&index| index < item_count)?;
            let node = self.pools.get(self.slot_template?, slot.handle)?;
            Some((index, node))
        })
    }

    /// Brings layout and scroll range up to date without touching entries.
    fn remeasure(&mut self) {
        self.layout = recycler_grid(&self.grid).measure(self.item_count(), self.viewport);
        self.scroll.set_step(self.layout.row_height());
        self.scroll
            .set_max_extent(self.layout.max_scroll_extent(self.viewport.y));
    }

    fn remeasure_if_stale(&mut self) {
        if self.needs_refresh {
            self.remeasure();
        }
    }

    fn pool_size(&self) -> usize {
        let item_count = self.item_count();
        if item_count == 0 {
            return 0;
        }
        let row_height = self.layout.row_height();
        let rows = if row_height > 0.0 {
            (self.viewport.y / row_height).ceil() as usize + 1
        } else {
            warn!("recycler row height is zero; pooling every row");
            self.layout.rows()
        };
        rows.saturating_mul(self.layout.columns()).min(item_count)
    }

    fn first_visible_index(&self) -> usize {
        let row_height = self.layout.row_height();
        if row_height <= 0.0 {
            return 0;
        }
        let offset = self.scroll.position() - self.layout.padding().top;
        let row = (offset / row_height).floor().max(0.0) as usize;
        row.min(self.layout.rows().saturating_sub(1)) * self.layout.columns()
    }

    fn update_window(&mut self) {
        let start_index = self.first_visible_index();
        if start_index != self.window.start_index {
            trace!(
                from = self.window.start_index,
                to = start_index,
                "visible window shifted"
            );
            self.window.start_index = start_index;
            self.bind_slots();
        }
    }

    fn bind_slots(&mut self) {
        let Self {
            pools,
            binding,
            layout,
            window,
            slots,
            slot_template,
            ..
        } = self;
        let (Some(binding), Some(template)) = (binding.as_mut(), *slot_template) else {
            window.count = 0;
            return;
        };

        let mut shown = 0;
        for (offset, slot) in slots.iter_mut().enumerate() {
            let index = window.start_index + offset;
            let Some(node) = pools.get_mut(template, slot.handle) else {
                continue;
            };
            if index < binding.item_count {
                if !node.is_active() {
                    node.set_active(true);
                }
                node.set_frame(layout.cell_frame(index));
                (binding.on_update)(node, index);
                slot.index = Some(index);
                shown += 1;
            } else {
                if node.is_active() {
                    node.set_active(false);
                }
                slot.index = None;
            }
        }
        window.count = shown;
    }

    fn release_slots(&mut self) {
        let Self {
            pools,
            binding,
            slots,
            slot_template,
            window,
            ..
        } = self;
        window.count = 0;
        let Some(template) = slot_template.take() else {
            slots.clear();
            return;
        };

        // Reverse order so LIFO reuse hands slot N the instance it had before.
        for slot in slots.drain(..).rev() {
            if let (Some(hook), Some(node)) = (
                binding
                    .as_mut()
                    .and_then(|binding| binding.on_return.as_mut()),
                pools.get_mut(template, slot.handle),
            ) {
                hook(node);
            }
            if let Err(err) = pools.release(template, slot.handle) {
                warn!(%err, "failed to return recycler entry");
            }
        }
    }
}

impl<V: SceneNode> fmt::Debug for RecyclerView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecyclerView")
            .field("container", &self.container)
            .field("item_count", &self.item_count())
            .field("window", &self.window)
            .field("active", &self.slots.len())
            .field("scroll", &self.scroll)
            .field("needs_refresh", &self.needs_refresh)
            .finish_non_exhaustive()
    }
}

/// The recycler walks rows from the top: indices fill rows first and row 0
/// sits at the top edge. Only the horizontal corner is honored.
fn recycler_grid(grid: &GridSpec) -> GridSpec {
    let start_corner = match grid.start_corner {
        Corner::UpperRight | Corner::LowerRight => Corner::UpperRight,
        Corner::UpperLeft | Corner::LowerLeft => Corner::UpperLeft,
    };
    GridSpec {
        start_axis: StartAxis::Horizontal,
        start_corner,
        ..grid.clone()
    }
}
