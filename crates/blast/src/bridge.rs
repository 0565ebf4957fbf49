use std::cell::RefCell;
use wasm_bindgen::prelude::*;

use crate::config::BlastConfig;
use crate::events::{records_as_bytes, EventLog, EventRecord};
use crate::state::BlastGame;

thread_local! {
    static GAME: RefCell<Option<BlastGame<EventLog>>> = RefCell::new(None);
    static RECORDS: RefCell<Vec<EventRecord>> = RefCell::new(Vec::new());
}

fn with_game<T: Default>(f: impl FnOnce(&mut BlastGame<EventLog>) -> T) -> T {
    GAME.with(|cell| match cell.borrow_mut().as_mut() {
        Some(game) => f(game),
        None => {
            log::warn!("blast-sim: game not initialized, call init_game() first");
            T::default()
        }
    })
}

/// Move pending notifications from the game into the shared record buffer.
fn flush_events(game: &mut BlastGame<EventLog>) {
    let records = game.notifier().to_records();
    game.notifier_mut().clear();
    RECORDS.with(|cell| cell.borrow_mut().extend(records));
}

/// Create a game from a YAML config and deal the first field.
/// Returns false if the config does not parse or validate.
#[wasm_bindgen]
pub fn init_game(config_yaml: &str, seed: f64, min_groups: u32) -> bool {
    let config = match BlastConfig::from_yaml_str(config_yaml) {
        Ok(config) => config,
        Err(e) => {
            log::error!("blast-sim: {}", e);
            return false;
        }
    };
    let mut game = match BlastGame::with_seed(config, EventLog::new(), seed as u64) {
        Ok(game) => game,
        Err(e) => {
            log::error!("blast-sim: {}", e);
            return false;
        }
    };
    game.init_field(min_groups as usize);

    RECORDS.with(|cell| cell.borrow_mut().clear());
    flush_events(&mut game);
    GAME.with(|cell| {
        *cell.borrow_mut() = Some(game);
    });
    log::info!("blast-sim: game initialized with seed {}", seed as u64);
    true
}

#[wasm_bindgen]
pub fn tap_tile(x: i32, y: i32) -> bool {
    with_game(|g| {
        let changed = g.tap_at(x, y);
        flush_events(g);
        changed
    })
}

#[wasm_bindgen]
pub fn swap_tiles(x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
    with_game(|g| {
        let changed = g.swap(x1, y1, x2, y2);
        flush_events(g);
        changed
    })
}

/// Start over with the same config.
#[wasm_bindgen]
pub fn restart_game() {
    with_game(|g| {
        g.restart();
        flush_events(g);
    });
}

/// Pointer to the event record buffer. Each record is 24 bytes:
/// code, x, y, to_x, to_y, value as 32-bit words.
#[wasm_bindgen]
pub fn get_events_ptr() -> *const u8 {
    RECORDS.with(|cell| records_as_bytes(&cell.borrow()).as_ptr())
}

/// Number of records in the event buffer.
#[wasm_bindgen]
pub fn get_events_len() -> u32 {
    RECORDS.with(|cell| cell.borrow().len() as u32)
}

/// Drop records the host has consumed.
#[wasm_bindgen]
pub fn clear_events() {
    RECORDS.with(|cell| cell.borrow_mut().clear());
}

/// Returns the current game phase (0=Active, 1=Won, 2=Lost).
#[wasm_bindgen]
pub fn get_game_phase() -> u8 {
    with_game(|g| g.phase() as u8)
}

#[wasm_bindgen]
pub fn get_score() -> u32 {
    with_game(|g| g.score())
}

#[wasm_bindgen]
pub fn get_win_score() -> u32 {
    with_game(|g| g.win_score())
}

#[wasm_bindgen]
pub fn get_turns() -> u32 {
    with_game(|g| g.turns())
}

#[wasm_bindgen]
pub fn get_swaps() -> u32 {
    with_game(|g| g.swaps())
}

#[wasm_bindgen]
pub fn get_board_width() -> u32 {
    with_game(|g| g.width() as u32)
}

#[wasm_bindgen]
pub fn get_board_height() -> u32 {
    with_game(|g| g.height() as u32)
}

/// Tile kind at a cell, or 255 for an empty or out-of-bounds cell.
#[wasm_bindgen]
pub fn get_tile_kind(x: i32, y: i32) -> u8 {
    GAME.with(|cell| {
        cell.borrow()
            .as_ref()
            .and_then(|g| g.tile_at(x, y))
            .map_or(u8::MAX, |t| t.kind as u8)
    })
}
