use bytemuck::{Pod, Zeroable};

use crate::grid::Position;

/// Outbound notifications, dispatched synchronously in mutation order.
/// Every method defaults to doing nothing so hosts implement only what they animate.
pub trait Notifier {
    fn on_destroy_tile(&mut self, _position: Position) {}
    fn on_move_tile(&mut self, _from: Position, _to: Position) {}
    /// `from_outside` is true when the tile should enter from above the field.
    fn on_generate_tile(&mut self, _position: Position, _from_outside: bool) {}
    fn on_turns_changed(&mut self, _turns: u32) {}
    fn on_score_changed(&mut self, _score: u32) {}
    /// Parallel arrays: `from[i]` moved to `to[i]`.
    fn on_shuffle(&mut self, _from: &[Position], _to: &[Position]) {}
    fn on_swaps_changed(&mut self, _swaps: u32) {}
    fn on_win(&mut self) {}
    fn on_lose(&mut self) {}
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Destroy(Position),
    Move { from: Position, to: Position },
    Generate { at: Position, from_outside: bool },
    Turns(u32),
    Score(u32),
    Shuffle { from: Vec<Position>, to: Vec<Position> },
    Swaps(u32),
    Win,
    Lose,
}

/// Notifier that records events for hosts that poll instead of receiving callbacks.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Flatten the recorded events into fixed-size records.
    /// A shuffle expands into one record per remapped tile.
    pub fn to_records(&self) -> Vec<EventRecord> {
        let mut out = Vec::with_capacity(self.events.len());
        for event in &self.events {
            match event {
                GameEvent::Destroy(at) => out.push(EventRecord::at(EventCode::Destroy, *at)),
                GameEvent::Move { from, to } => {
                    out.push(EventRecord::pair(EventCode::Move, *from, *to))
                }
                GameEvent::Generate { at, from_outside } => {
                    let mut r = EventRecord::at(EventCode::Generate, *at);
                    r.value = *from_outside as u32;
                    out.push(r);
                }
                GameEvent::Turns(n) => out.push(EventRecord::value(EventCode::Turns, *n)),
                GameEvent::Score(n) => out.push(EventRecord::value(EventCode::Score, *n)),
                GameEvent::Shuffle { from, to } => {
                    let total = from.len() as u32;
                    for (a, b) in from.iter().zip(to) {
                        let mut r = EventRecord::pair(EventCode::Shuffle, *a, *b);
                        r.value = total;
                        out.push(r);
                    }
                }
                GameEvent::Swaps(n) => out.push(EventRecord::value(EventCode::Swaps, *n)),
                GameEvent::Win => out.push(EventRecord::value(EventCode::Win, 0)),
                GameEvent::Lose => out.push(EventRecord::value(EventCode::Lose, 0)),
            }
        }
        out
    }
}

impl Notifier for EventLog {
    fn on_destroy_tile(&mut self, position: Position) {
        self.events.push(GameEvent::Destroy(position));
    }

    fn on_move_tile(&mut self, from: Position, to: Position) {
        self.events.push(GameEvent::Move { from, to });
    }

    fn on_generate_tile(&mut self, position: Position, from_outside: bool) {
        self.events.push(GameEvent::Generate {
            at: position,
            from_outside,
        });
    }

    fn on_turns_changed(&mut self, turns: u32) {
        self.events.push(GameEvent::Turns(turns));
    }

    fn on_score_changed(&mut self, score: u32) {
        self.events.push(GameEvent::Score(score));
    }

    fn on_shuffle(&mut self, from: &[Position], to: &[Position]) {
        self.events.push(GameEvent::Shuffle {
            from: from.to_vec(),
            to: to.to_vec(),
        });
    }

    fn on_swaps_changed(&mut self, swaps: u32) {
        self.events.push(GameEvent::Swaps(swaps));
    }

    fn on_win(&mut self) {
        self.events.push(GameEvent::Win);
    }

    fn on_lose(&mut self) {
        self.events.push(GameEvent::Lose);
    }
}

/// Event codes used in the flat record buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EventCode {
    Destroy = 0,
    Move = 1,
    Generate = 2,
    Turns = 3,
    Score = 4,
    Shuffle = 5,
    Swaps = 6,
    Win = 7,
    Lose = 8,
}

/// One event in host-readable form. 6 x 4 bytes = 24 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct EventRecord {
    pub code: u32,
    pub x: i32,
    pub y: i32,
    pub to_x: i32,
    pub to_y: i32,
    pub value: u32,
}

impl EventRecord {
    fn at(code: EventCode, at: Position) -> Self {
        EventRecord {
            code: code as u32,
            x: at.x,
            y: at.y,
            ..Default::default()
        }
    }

    fn pair(code: EventCode, from: Position, to: Position) -> Self {
        EventRecord {
            code: code as u32,
            x: from.x,
            y: from.y,
            to_x: to.x,
            to_y: to.y,
            value: 0,
        }
    }

    fn value(code: EventCode, value: u32) -> Self {
        EventRecord {
            code: code as u32,
            value,
            ..Default::default()
        }
    }
}

/// Reinterpret records as raw bytes for a shared buffer.
pub fn records_as_bytes(records: &[EventRecord]) -> &[u8] {
    bytemuck::cast_slice(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_records_in_call_order() {
        let mut log = EventLog::new();
        log.on_destroy_tile(Position::new(1, 2));
        log.on_move_tile(Position::new(1, 1), Position::new(1, 2));
        log.on_generate_tile(Position::new(1, 0), true);
        log.on_win();

        assert_eq!(
            log.events,
            vec![
                GameEvent::Destroy(Position::new(1, 2)),
                GameEvent::Move {
                    from: Position::new(1, 1),
                    to: Position::new(1, 2)
                },
                GameEvent::Generate {
                    at: Position::new(1, 0),
                    from_outside: true
                },
                GameEvent::Win,
            ]
        );
        assert_eq!(log.len(), 4);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn shuffle_expands_to_one_record_per_tile() {
        let mut log = EventLog::new();
        let from = [Position::new(0, 0), Position::new(1, 0)];
        let to = [Position::new(1, 0), Position::new(0, 0)];
        log.on_shuffle(&from, &to);
        log.on_score_changed(40);

        let records = log.to_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].code, EventCode::Shuffle as u32);
        assert_eq!((records[0].to_x, records[0].to_y), (1, 0));
        assert_eq!(records[1].value, 2);
        assert_eq!(records[2].code, EventCode::Score as u32);
        assert_eq!(records[2].value, 40);
    }

    #[test]
    fn records_have_fixed_stride() {
        let records = [EventRecord::default(); 3];
        assert_eq!(std::mem::size_of::<EventRecord>(), 24);
        assert_eq!(records_as_bytes(&records).len(), 72);
    }
}
