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

//! Fakes of the `kernel::hil::gpio`/`kernel::hil::time` HILs, exported
//! behind the `test` feature the way `nvcounter`'s `internal` module is
//! exported for `nvcounter_test`. Host-run `#[test]`s
//! in [`crate::engine`] use these directly; a board integration crate can
//! also depend on this crate with `features = ["test"]` to drive the same
//! fakes against a real wiring.

use core::cell::Cell;

use arrayvec::ArrayVec;
use kernel::hil;

use crate::client::OneWireClient;

/// A fake open-drain bus pin. `level` models the wire itself: `true` is
/// released/high, `false` is driven low, by either the simulated master (via
/// [`FakePin::set_level`]) or the engine under test (via `Output::clear`).
pub struct FakePin {
    level: Cell<bool>,
    driven_low: Cell<bool>,
}

impl FakePin {
    pub fn new() -> Self {
        FakePin {
            level: Cell::new(true),
            driven_low: Cell::new(false),
        }
    }

    pub fn level(&self) -> bool {
        self.level.get()
    }

    /// Simulates the bus master changing the wire level and generating the
    /// edge a board's interrupt controller would report.
    pub fn set_level(&self, level: bool) {
        self.level.set(level);
    }

    /// Returns whether the engine drove the pin low (`Output::clear`) since
    /// the last call, then clears the flag. Needed because the engine's own
    /// write-0 pulse is synchronous: by the time `fired()` returns, the pin
    /// is already released again, so `level()` alone can't distinguish "the
    /// engine sent a 0" from "the engine sent a 1".
    pub fn take_driven_low(&self) -> bool {
        let driven = self.driven_low.get();
        self.driven_low.set(false);
        driven
    }
}

impl hil::gpio::Input for FakePin {
    fn read(&self) -> bool {
        self.level.get()
    }
}

impl hil::gpio::Output for FakePin {
    fn set(&self) {
        self.level.set(true);
    }

    fn clear(&self) {
        self.level.set(false);
        self.driven_low.set(true);
    }

    fn toggle(&self) -> bool {
        let next = !self.level.get();
        self.level.set(next);
        next
    }
}

impl hil::gpio::Configure for FakePin {
    fn configuration(&self) -> hil::gpio::Configuration {
        hil::gpio::Configuration::InputOutput
    }
    fn make_output(&self) -> hil::gpio::Configuration {
        hil::gpio::Configuration::InputOutput
    }
    fn disable_output(&self) -> hil::gpio::Configuration {
        hil::gpio::Configuration::Input
    }
    fn make_input(&self) -> hil::gpio::Configuration {
        hil::gpio::Configuration::Input
    }
    fn disable_input(&self) -> hil::gpio::Configuration {
        hil::gpio::Configuration::Input
    }
    fn deactivate_to_low_power(&self) {}
    fn set_floating_state(&self, _state: hil::gpio::FloatingState) {}
    fn floating_state(&self) -> hil::gpio::FloatingState {
        hil::gpio::FloatingState::PullNone
    }
    fn is_input(&self) -> bool {
        true
    }
    fn is_output(&self) -> bool {
        true
    }
}

impl hil::gpio::Pin for FakePin {}

impl<'a> hil::gpio::Interrupt<'a> for FakePin {
    // Tests call `fired()` directly instead of routing through a registered
    // client, so there is nothing to store here.
    fn set_client(&self, _client: &'a dyn hil::gpio::Client) {}
    fn enable_interrupts(&self, _mode: hil::gpio::InterruptEdge) {}
    fn disable_interrupts(&self) {}
    fn is_pending(&self) -> bool {
        false
    }
}

impl<'a> hil::gpio::InterruptPin<'a> for FakePin {}

/// 1 tick = 1 microsecond, so tests can pass elapsed-time arguments directly
/// as `u32` microseconds without a conversion step.
pub struct MicrosecondFrequency;

impl hil::time::Frequency for MicrosecondFrequency {
    fn frequency() -> u32 {
        1_000_000
    }
}

/// A fake monotonic microsecond clock. `now()` auto-increments by one tick
/// on every read in addition to whatever a test advances explicitly via
/// [`FakeTime::advance`] -- without that, `timing::drive_low_for_micros`'s
/// busy-wait loop would spin forever, since nothing else moves the clock
/// while the engine is "inside" a blocking pulse.
pub struct FakeTime {
    now: Cell<u32>,
}

impl FakeTime {
    pub fn new() -> Self {
        FakeTime { now: Cell::new(0) }
    }

    /// Simulates wall-clock time passing between edges the test drives.
    pub fn advance(&self, us: u32) {
        self.now.set(self.now.get().wrapping_add(us));
    }
}

impl hil::time::Time for FakeTime {
    type Frequency = MicrosecondFrequency;
    type Ticks = hil::time::Ticks32;

    fn now(&self) -> Self::Ticks {
        let next = self.now.get().wrapping_add(1);
        self.now.set(next);
        next.into()
    }
}

/// An [`OneWireClient`] that records every notification for assertions.
/// Capacity bounds (32 bytes) are generous for the scenarios exercised here; a test
/// driving more application bytes than that should size a fake of its own.
pub struct RecordingClient {
    bytes: Cell<ArrayVec<u8, 32>>,
    bits: Cell<u32>,
    resets: Cell<u32>,
}

impl RecordingClient {
    pub fn new() -> Self {
        RecordingClient {
            bytes: Cell::new(ArrayVec::new()),
            bits: Cell::new(0),
            resets: Cell::new(0),
        }
    }

    pub fn bytes(&self) -> ArrayVec<u8, 32> {
        let bytes = self.bytes.take();
        self.bytes.set(bytes.clone());
        bytes
    }

    pub fn bit_count(&self) -> u32 {
        self.bits.get()
    }

    pub fn resets(&self) -> u32 {
        self.resets.get()
    }
}

impl OneWireClient for RecordingClient {
    fn byte_received(&self, byte: u8) {
        let mut bytes = self.bytes.take();
        let _ = bytes.try_push(byte);
        self.bytes.set(bytes);
    }

    fn bit_received(&self, _bit: bool) {
        self.bits.set(self.bits.get() + 1);
    }

    fn reset_received(&self) {
        self.resets.set(self.resets.get() + 1);
    }
}
