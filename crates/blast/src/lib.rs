pub mod components;
pub mod config;
pub mod events;
pub mod grid;
pub mod state;
pub mod systems;

#[cfg(target_arch = "wasm32")]
pub mod bridge;

pub use components::TileKind;
pub use config::{BlastConfig, ConfigError};
pub use events::{EventLog, EventRecord, GameEvent, Notifier, NullNotifier};
pub use grid::{Grid, Position, Tile};
pub use state::{BlastGame, GamePhase};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("blast-sim initialized");
}
