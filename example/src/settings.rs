use std::{fs, path::Path};

use anyhow::Context;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tessera_recycler::{GridSizing, GridSpec, Padding, RecyclerArgs, ScrollSettings};

/// Demo configuration, read from a JSON file.
///
/// Every field is optional; missing ones fall back to [`DemoSettings::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub item_count: usize,
    pub viewport_size: Vec2,
    pub grid: GridSpec,
    pub scroll: ScrollSettings,
    pub min_handle_size: f32,
    pub frame_time: f32,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            item_count: 10_000,
            viewport_size: Vec2::new(360.0, 640.0),
            grid: GridSpec::default()
                .sizing(GridSizing::FixedColumns(3))
                .cell_size(Vec2::new(112.0, 112.0))
                .spacing(Vec2::splat(8.0))
                .padding(Padding::all(4.0)),
            scroll: ScrollSettings::default(),
            min_handle_size: tessera_recycler::DEFAULT_MIN_HANDLE_SIZE,
            frame_time: 1.0 / 60.0,
        }
    }
}

impl DemoSettings {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings in {}", path.display()))
    }

    pub fn recycler_args(&self) -> RecyclerArgs {
        RecyclerArgs::default()
            .grid(self.grid.clone())
            .scroll(self.scroll.clone())
            .viewport_size(self.viewport_size)
            .min_handle_size(self.min_handle_size)
    }
}
