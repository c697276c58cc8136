//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `stickynote_core` linkage without a presentation host.
//! - Drive one scripted board session against the simulated remote.
//!
//! Usage: `stickynote [config.json]`. Logs go to `$STICKYNOTE_LOG_DIR` when
//! set to an absolute path.

use std::sync::Arc;
use stickynote_core::{
    default_log_level, init_logging, Board, CoreConfig, DragMode, Extent, FixedTrashZone,
    MemorySnapshotStore, NoteStore, Point, Rect, SimulatedRemote,
};

const TRASH_SIZE: f64 = 120.0;

#[tokio::main]
async fn main() {
    println!("stickynote_core ping={}", stickynote_core::ping());
    println!("stickynote_core version={}", stickynote_core::core_version());

    if let Ok(log_dir) = std::env::var("STICKYNOTE_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let remote = Arc::new(SimulatedRemote::new(config.remote));
    let store = Arc::new(NoteStore::new(
        remote,
        Arc::new(MemorySnapshotStore::new()),
        &config,
    ));
    let trash_rect = Rect::from_origin(
        Point::new(
            config.viewport.width - TRASH_SIZE,
            config.viewport.height - TRASH_SIZE,
        ),
        Extent::new(TRASH_SIZE, TRASH_SIZE),
    );
    let trash_center = Point::new(
        (trash_rect.left + trash_rect.right) / 2.0,
        (trash_rect.top + trash_rect.bottom) / 2.0,
    );
    let mut board = Board::new(store, Box::new(FixedTrashZone::new(trash_rect)));

    println!("hydrate={:?}", board.hydrate().await);
    run_session(&mut board, trash_center);
    board.store().settle().await;

    let sync = board.sync_state();
    println!("notes={}", board.notes().len());
    println!(
        "sync loading={} last_error={}",
        sync.is_loading,
        sync.last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
}

fn load_config() -> Result<CoreConfig, String> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(CoreConfig::default());
    };
    let raw = std::fs::read_to_string(&path)
        .map_err(|err| format!("failed to read config `{path}`: {err}"))?;
    CoreConfig::from_json_str(&raw).map_err(|err| err.to_string())
}

fn run_session(board: &mut Board, trash_center: Point) {
    let kept = board.create("#fff59d");
    let tossed = board.create("#90caf9");
    board.update_text(&kept.id, "hello from the smoke run");

    board.start_drag(&kept.id, DragMode::Resize, Point::new(0.0, 0.0));
    board.on_pointer_move(Point::new(60.0, 40.0));
    board.end_drag(Point::new(60.0, 40.0));
    board.raise_to_front(&kept.id);

    board.start_drag(&tossed.id, DragMode::Move, tossed.position);
    board.on_pointer_move(trash_center);
    if let Some(deleted) = board.end_drag(trash_center) {
        println!("dropped note {} on trash", deleted.id);
    }
}
