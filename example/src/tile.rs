use tessera_recycler::{CellFrame, PoolableReset, SceneNode};
use tracing::trace;

/// Container id of the demo scroll view.
pub const GALLERY: u32 = 1;

/// A headless photo tile: it only remembers what it was told to show.
#[derive(Debug, Clone)]
pub struct Tile {
    id: usize,
    parent: Option<u32>,
    active: bool,
    frame: CellFrame,
    caption: String,
    highlighted: bool,
    default_highlighted: bool,
}

impl Tile {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            parent: None,
            active: false,
            frame: CellFrame::default(),
            caption: String::new(),
            highlighted: false,
            default_highlighted: false,
        }
    }

    pub fn bind(&mut self, index: usize) {
        self.caption = format!("photo {index:05}");
        self.highlighted = index % 100 == 0;
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn frame(&self) -> CellFrame {
        self.frame
    }
}

impl SceneNode for Tile {
    type Parent = u32;

    fn parent(&self) -> Option<u32> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<u32>) {
        self.parent = parent;
    }

    fn reset_local_transform(&mut self) {}

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_frame(&mut self, frame: CellFrame) {
        trace!(tile = self.id, ?frame, "tile moved");
        self.frame = frame;
    }
}

impl PoolableReset for Tile {
    fn cache_defaults(&mut self) {
        self.default_highlighted = self.highlighted;
    }

    fn reset_to_defaults(&mut self) {
        self.highlighted = self.default_highlighted;
        self.caption.clear();
    }
}
