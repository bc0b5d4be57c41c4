//! Dimmable RGB light — merge-style command application plus local encoder
//! and button input.
//!
//! Command payloads are partial records: a field absent from the payload
//! keeps its last known value, so the hub can change brightness without
//! resending color. A missing `state` field also means *keep last* (see
//! DESIGN.md — the original scripts disagreed on this).

use serde::{Deserialize, Serialize};

use crate::error::CommandParseError;
use crate::input::StepDirection;

/// Brightness values below this are normalized to exactly 0 and force the
/// light off.
pub const BRIGHTNESS_FLOOR: u8 = 5;

/// Default brightness change per encoder step event.
pub const DEFAULT_BRIGHTNESS_STEP: u8 = 25;

/// Brightness restored by a button toggle when no previous on-brightness is
/// known (half brightness, the original default).
const FALLBACK_ON_BRIGHTNESS: u8 = 128;

/// On/off discriminator used in command and state payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnOff {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

/// RGB color triple, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Partial update decoded from a command payload. Every field is optional;
/// absence means "keep previous value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct LightCommand {
    pub state: Option<OnOff>,
    pub brightness: Option<u8>,
    pub color: Option<Rgb>,
}

impl LightCommand {
    /// Decode a command payload.
    ///
    /// # Errors
    ///
    /// Returns [`CommandParseError::Malformed`] when the payload is not a
    /// valid JSON record of the expected shape. The caller must leave the
    /// entity state untouched in that case.
    pub fn parse(payload: &[u8]) -> Result<Self, CommandParseError> {
        serde_json::from_slice(payload).map_err(CommandParseError::Malformed)
    }
}

/// Authoritative state of one light entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightState {
    power: bool,
    brightness: u8,
    color: Rgb,
    /// Last brightness the light was actually on with; restored by a button
    /// toggle from off.
    last_on_brightness: u8,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            power: false,
            brightness: 0,
            color: Rgb::default(),
            last_on_brightness: FALLBACK_ON_BRIGHTNESS,
        }
    }
}

/// Serialized shape of the retained state payload. Mirrors the command
/// schema.
#[derive(Debug, Serialize)]
struct StatePayload {
    state: OnOff,
    brightness: u8,
    color: Rgb,
}

impl LightState {
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.power
    }

    #[must_use]
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Apply an already-decoded command, merging absent fields from the
    /// current state.
    pub fn apply_command(&mut self, command: &LightCommand) {
        if let Some(brightness) = command.brightness {
            self.brightness = brightness;
        }
        if let Some(state) = command.state {
            self.power = state == OnOff::On;
        }
        if let Some(color) = command.color {
            self.color = color;
        }
        self.normalize();
    }

    /// Apply one discrete encoder step. Raising brightness from 0 turns the
    /// light on; reaching 0 turns it off. Returns whether the state changed.
    pub fn apply_step(&mut self, direction: StepDirection, step: u8) -> bool {
        let before = (self.power, self.brightness);
        match direction {
            StepDirection::Up => {
                self.brightness = self.brightness.saturating_add(step);
                self.power = true;
            }
            StepDirection::Down => {
                self.brightness = self.brightness.saturating_sub(step);
                if self.brightness == 0 {
                    self.power = false;
                }
            }
        }
        self.normalize();
        (self.power, self.brightness) != before
    }

    /// Toggle by button press. Turning off zeroes the brightness; turning
    /// back on restores the last on-brightness.
    pub fn toggle(&mut self) {
        if self.power {
            self.power = false;
            self.brightness = 0;
        } else {
            self.power = true;
            if self.brightness == 0 {
                self.brightness = self.last_on_brightness;
            }
        }
        self.normalize();
    }

    /// Enforce the brightness floor and remember the last on-brightness.
    fn normalize(&mut self) {
        if self.brightness > 0 && self.brightness < BRIGHTNESS_FLOOR {
            self.brightness = 0;
            self.power = false;
        }
        if self.power && self.brightness > 0 {
            self.last_on_brightness = self.brightness;
        }
    }

    /// Serialize the full state for retained publication.
    #[must_use]
    pub fn to_payload(&self) -> Vec<u8> {
        let payload = StatePayload {
            state: if self.power { OnOff::On } else { OnOff::Off },
            brightness: self.brightness,
            color: self.color,
        };
        serde_json::to_vec(&payload).unwrap_or_default()
    }
}
