//! Headless walkthrough of a recycled photo gallery.
//!
//! Run with an optional JSON settings file:
//!
//! ```text
//! RUST_LOG=debug cargo run -p example -- gallery.json
//! ```
mod settings;
mod tile;

use std::path::PathBuf;

use tessera_recycler::{RecyclerView, ScrollInput, Template, TemplateId};
use tracing::{debug, info};

use crate::{
    settings::DemoSettings,
    tile::{GALLERY, Tile},
};

const TILE: TemplateId = TemplateId(1);

fn main() -> anyhow::Result<()> {
    init_tracing();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = DemoSettings::load(path.as_deref())?;
    info!(?settings, "starting gallery");

    let mut gallery = RecyclerView::new(GALLERY, settings.recycler_args());
    let mut next_id = 0;
    gallery.register_template(
        Template::new(TILE, move || {
            next_id += 1;
            Ok(Tile::new(next_id))
        })
        .resettable(),
    );
    gallery.set_scrollbar_listener(|state| {
        debug!(
            handle_size = state.handle_size,
            value = state.value,
            "scrollbar moved"
        );
    });
    gallery.initialize(TILE, settings.item_count, Tile::bind, None)?;
    report("initialized", &gallery);

    let frame = settings.frame_time;
    for _ in 0..30 {
        gallery.tick(frame, ScrollInput::wheel(40.0))?;
    }
    settle(&mut gallery, frame)?;
    report("after wheel", &gallery);

    gallery.snap_to_element(settings.item_count / 2, false)?;
    settle(&mut gallery, frame)?;
    report("snapped to middle", &gallery);

    for _ in 0..10 {
        gallery.tick(frame, ScrollInput::drag(-25.0))?;
    }
    report("after drag", &gallery);

    gallery.scroll_to_end(false);
    settle(&mut gallery, frame)?;
    report("at end", &gallery);

    let stats = gallery.pool_stats();
    info!(
        created = stats.total_created,
        active = stats.active,
        free = stats.free,
        items = gallery.item_count(),
        "gallery finished"
    );
    Ok(())
}

fn settle(gallery: &mut RecyclerView<Tile>, frame: f32) -> anyhow::Result<()> {
    while gallery.scroll().is_animating() {
        gallery.tick(frame, ScrollInput::default())?;
    }
    gallery.tick(frame, ScrollInput::default())?;
    Ok(())
}

fn report(stage: &str, gallery: &RecyclerView<Tile>) {
    let window = gallery.visible_window();
    info!(
        stage,
        start = window.start_index,
        shown = window.count,
        position = gallery.normalized_position(),
        handle = gallery.handle_position(),
        "gallery window"
    );
    if let Some((index, tile)) = gallery.displayed().next() {
        debug!(
            index,
            tile = tile.id(),
            caption = tile.caption(),
            frame = ?tile.frame(),
            "first visible tile"
        );
    }
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(
            "error,tessera_recycler=info,example=info",
        ) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}
