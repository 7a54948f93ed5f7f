//! Player input snapshot.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Keys held down by a player during the last input update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct InputFlags: u32 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const JUMP = 1 << 4;
        const CROUCH = 1 << 5;
        const SELECT_UP = 1 << 6;
        const SELECT_DOWN = 1 << 7;
        const FIRE_1 = 1 << 8;
        const FIRE_2 = 1 << 9;
        const INTERACT = 1 << 10;
        const SELECT_1 = 1 << 11;
        const SELECT_2 = 1 << 12;
        const SELECT_3 = 1 << 13;
        const SELECT_4 = 1 << 14;
        const SELECT_5 = 1 << 15;
        const SELECT_6 = 1 << 16;
        const SELECT_7 = 1 << 17;
        const SELECT_8 = 1 << 18;
        const SELECT_9 = 1 << 19;
    }
}

/// Hotbar keys, indexed by slot.
const SLOT_KEYS: [InputFlags; 9] = [
    InputFlags::SELECT_1,
    InputFlags::SELECT_2,
    InputFlags::SELECT_3,
    InputFlags::SELECT_4,
    InputFlags::SELECT_5,
    InputFlags::SELECT_6,
    InputFlags::SELECT_7,
    InputFlags::SELECT_8,
    InputFlags::SELECT_9,
];

/// Keys and mouse movement reported by a player's client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerInputState {
    pub flags: InputFlags,
    pub mouse_dx: i16,
    pub mouse_dy: i16,
}

impl PlayerInputState {
    /// No keys held, no mouse movement.
    pub const IDLE: PlayerInputState = PlayerInputState {
        flags: InputFlags::empty(),
        mouse_dx: 0,
        mouse_dy: 0,
    };

    pub fn with_flags(mut self, flags: InputFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_mouse(mut self, dx: i16, dy: i16) -> Self {
        self.mouse_dx = dx;
        self.mouse_dy = dy;
        self
    }

    /// Whether every key in `flags` is held.
    pub fn is_pressed(&self, flags: InputFlags) -> bool {
        self.flags.contains(flags)
    }

    /// Hotbar slot (0-8) picked by a number key. The lowest wins when several
    /// are held.
    pub fn selected_slot(&self) -> Option<u8> {
        SLOT_KEYS
            .iter()
            .position(|&key| self.flags.contains(key))
            .map(|slot| slot as u8)
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }
}
