// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Construction-time configuration.
//!
//! Mirrors the original `OneWireSlave_InitTypeDef`: a tiny, explicit struct
//! rather than a builder. The pin and timer HIL references are passed as
//! separate `OneWireSlave::new` arguments instead of living in this struct,
//! matching the Tock convention of wiring hardware references directly
//! rather than boxing them into a config type.

use crate::registry::PinId;
use crate::rom::Rom;

/// Per-instance configuration supplied once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OneWireSlaveConfig {
    /// This device's 64-bit ROM address, unique on the bus.
    pub rom: Rom,
    /// Opaque board-chosen key used only for [`crate::registry::Registry`]
    /// lookups; the engine itself never interprets it.
    pub pin_id: PinId,
}

impl OneWireSlaveConfig {
    pub const fn new(rom: Rom, pin_id: PinId) -> Self {
        OneWireSlaveConfig { rom, pin_id }
    }
}
