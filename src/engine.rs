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

//! The two-tier 1-Wire slave state machine: a link-layer
//! automaton that classifies edges into symbols and a ROM-layer automaton
//! that interprets the resulting bit stream as Maxim ROM commands.

use kernel::debug;
use kernel::hil;
use kernel::hil::gpio::{Input, Output};
use kernel::hil::time::Time;
use kernel::ReturnCode;

use crate::client::OneWireClient;
use crate::config::OneWireSlaveConfig;
use crate::framer::{ReceiveFramer, TransmitFramer};
use crate::rom::{command, Rom};
use crate::timing;

use core::cell::Cell;

/// The link state. The original source's transient `ONEWIRE_RESET` resting
/// state is folded into an explicit `enter_reset_handling` call invoked from
/// both `MasterSendsData` and `Writing` rather than kept as a variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LinkState {
    RIdle,
    MasterSendsData,
    WIdle,
    Writing,
    SendingPresence,
}

/// The ROM state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RomState {
    ReadingCommand,
    ReadingBits,
    MatchRom,
    SearchRom,
    ConditionalSearch,
    Wait,
}

/// A 1-Wire slave instance. Generic over the board's GPIO interrupt pin
/// and microsecond-scale timer HILs, exactly as a Tock capsule is generic
/// over the HIL traits its hardware dependencies satisfy.
pub struct OneWireSlave<'a, P, T>
where
    P: hil::gpio::InterruptPin<'a>,
    T: hil::time::Time,
{
    rom: Rom,
    pin_id: crate::registry::PinId,
    pin: &'a P,
    timer: &'a T,

    link_state: Cell<LinkState>,
    rom_state: Cell<RomState>,
    /// Bit index 0..=63 the current MATCH_ROM/SEARCH_ROM scan has reached.
    scan_bit: Cell<u32>,

    /// Tick snapshot taken at the falling edge that started the pulse
    /// currently being timed. `None` outside of an in-progress pulse.
    edge_start: Cell<Option<T::Ticks>>,

    receive: ReceiveFramer,
    transmit: TransmitFramer<'a>,
    /// Scratch bytes for single-bit replies, SEARCH ROM pairs, and the READ
    /// ROM payload. The engine owns this
    /// buffer and may overwrite it between read slots; callers must not
    /// assume its contents persist across an unrelated transmission.
    scratch: Cell<[u8; 8]>,

    client: Cell<Option<&'a dyn OneWireClient>>,
}

impl<'a, P, T> OneWireSlave<'a, P, T>
where
    P: hil::gpio::InterruptPin<'a>,
    T: hil::time::Time,
{
    /// Installs ROM address, pin, timer, and initial states. Does not
    /// itself enable the pin's interrupt or install
    /// this instance as its `gpio::Client` -- the board does that after
    /// `static_init!`, the same two-step wiring every capsule in this
    /// codebase follows.
    pub fn new(config: OneWireSlaveConfig, pin: &'a P, timer: &'a T) -> Self {
        OneWireSlave {
            rom: config.rom,
            pin_id: config.pin_id,
            pin,
            timer,
            link_state: Cell::new(LinkState::RIdle),
            rom_state: Cell::new(RomState::ReadingBits),
            scan_bit: Cell::new(0),
            edge_start: Cell::new(None),
            receive: ReceiveFramer::new(),
            transmit: TransmitFramer::new(),
            scratch: Cell::new([0; 8]),
            client: Cell::new(None),
        }
    }

    pub fn pin_id(&self) -> crate::registry::PinId {
        self.pin_id
    }

    pub fn set_client(&self, client: &'a dyn OneWireClient) {
        self.client.set(Some(client));
    }

    /// Installs `buffer` as the transmit source and enters `W_IDLE`.
    /// Best-effort: a master reset aborts the transmission, and if the ROM
    /// state is currently `WAIT` or mid-presence-pulse the install is staged
    /// but may not be emitted before the next reset. Neither case is
    /// reported as an error.
    pub fn start_transmit(&self, buffer: &'a mut [u8]) -> ReturnCode {
        self.transmit.install_external(buffer);
        self.link_state.set(LinkState::WIdle);
        ReturnCode::SUCCESS
    }

    /// Installs a single bit for transmission using the internal scratch
    /// buffer.
    pub fn transmit_bit(&self, bit: bool) {
        let mut scratch = self.scratch.get();
        scratch[0] = bit as u8;
        self.scratch.set(scratch);
        self.transmit.install_scratch(1);
        self.link_state.set(LinkState::WIdle);
    }

    fn elapsed_since(&self, since: T::Ticks) -> u32 {
        timing::elapsed_micros(self.timer, since)
    }

    /// Reset handling, reached from both `MasterSendsData` (a
    /// reset-length pulse) and `Writing` (a master abort mid-transmission).
    /// Clears both framers and the ROM scan cursor, fires the reset
    /// notification, then drives the presence pulse. This is an explicit
    /// call, not a fallthrough state.
    fn enter_reset_handling(&self) {
        self.rom_state.set(RomState::ReadingCommand);
        self.scan_bit.set(0);
        self.receive.reset();
        self.transmit.clear();
        self.edge_start.set(None);

        if let Some(client) = self.client.get() {
            client.reset_received();
        }

        timing::drive_low_for_micros(self.pin, self.timer, timing::PRESENCE_US);
        self.link_state.set(LinkState::SendingPresence);
    }

    /// READING_COMMAND: dispatches the first post-reset byte.
    fn dispatch_command(&self, byte: u8) {
        match byte {
            command::SEARCH_ROM => self.begin_search(RomState::SearchRom),
            command::CONDITIONAL_SEARCH => self.begin_search(RomState::ConditionalSearch),
            command::READ_ROM => {
                self.scratch.set(self.rom.to_wire_bytes());
                self.transmit.install_scratch(64);
                self.rom_state.set(RomState::ReadingBits);
                self.link_state.set(LinkState::WIdle);
            }
            command::MATCH_ROM => {
                self.scan_bit.set(0);
                self.rom_state.set(RomState::MatchRom);
            }
            command::SKIP_ROM => {
                self.rom_state.set(RomState::ReadingBits);
            }
            other => {
                self.rom_state.set(RomState::ReadingBits);
                if let Some(client) = self.client.get() {
                    client.byte_received(other);
                }
            }
        }
    }

    fn begin_search(&self, state: RomState) {
        self.scan_bit.set(0);
        self.rom_state.set(state);
        self.enqueue_search_pair();
    }

    /// Queues the (ROM_bit, ~ROM_bit) pair for the bit at the current scan
    /// cursor and forces the link layer into `W_IDLE` so the next read slot
    /// transmits it, per the SEARCH ROM interleave.
    fn enqueue_search_pair(&self) {
        let bit = self.rom.bit(self.scan_bit.get());
        let mut scratch = self.scratch.get();
        scratch[0] = (bit as u8) | ((!bit as u8) << 1);
        self.scratch.set(scratch);
        self.transmit.install_scratch(2);
        self.link_state.set(LinkState::WIdle);
    }

    /// One bit arrived from the master, invoked once per received bit
    /// regardless of ROM state.
    fn rom_bit_received(&self, bit: bool) {
        if let Some(client) = self.client.get() {
            client.bit_received(bit);
        }

        match self.rom_state.get() {
            RomState::ReadingCommand => {
                if let Some(byte) = self.receive.accept(bit) {
                    self.dispatch_command(byte);
                }
            }
            RomState::ReadingBits => {
                if let Some(byte) = self.receive.accept(bit) {
                    if let Some(client) = self.client.get() {
                        client.byte_received(byte);
                    }
                }
            }
            RomState::MatchRom => self.advance_match(bit),
            RomState::SearchRom | RomState::ConditionalSearch => self.advance_search(bit),
            RomState::Wait => {}
        }
    }

    fn advance_match(&self, bit: bool) {
        let idx = self.scan_bit.get();
        if bit == self.rom.bit(idx) {
            if idx == 63 {
                self.rom_state.set(RomState::ReadingBits);
            } else {
                self.scan_bit.set(idx + 1);
            }
        } else {
            self.rom_state.set(RomState::Wait);
        }
    }

    fn advance_search(&self, bit: bool) {
        let idx = self.scan_bit.get();
        if bit == self.rom.bit(idx) {
            if idx == 63 {
                self.rom_state.set(RomState::ReadingBits);
            } else {
                self.scan_bit.set(idx + 1);
                self.enqueue_search_pair();
            }
        } else {
            self.rom_state.set(RomState::Wait);
        }
    }
}

/// The edge notification: invoked from the pin's interrupt handler on
/// every falling or rising edge, including edges caused by this instance's
/// own drive.
impl<'a, P, T> hil::gpio::Client for OneWireSlave<'a, P, T>
where
    P: hil::gpio::InterruptPin<'a>,
    T: hil::time::Time,
{
    fn fired(&self) {
        let level = self.pin.read();

        match (self.link_state.get(), level) {
            (LinkState::RIdle, false) => {
                self.edge_start.set(Some(self.timer.now()));
                self.link_state.set(LinkState::MasterSendsData);
            }

            (LinkState::MasterSendsData, true) => {
                let elapsed = match self.edge_start.take() {
                    Some(since) => self.elapsed_since(since),
                    None => return,
                };
                match timing::classify(elapsed) {
                    timing::Symbol::One => {
                        self.link_state.set(LinkState::RIdle);
                        self.rom_bit_received(true);
                    }
                    timing::Symbol::Zero => {
                        self.link_state.set(LinkState::RIdle);
                        self.rom_bit_received(false);
                    }
                    timing::Symbol::Reset => self.enter_reset_handling(),
                }
            }

            (LinkState::SendingPresence, false) => {
                // Our own low drive's falling edge; wait for the release.
            }
            (LinkState::SendingPresence, true) => {
                self.link_state.set(LinkState::RIdle);
            }

            (LinkState::WIdle, false) => {
                self.edge_start.set(Some(self.timer.now()));
                let scratch = self.scratch.get();
                if !self.transmit.current_bit(&scratch) {
                    timing::drive_low_for_micros(self.pin, self.timer, timing::WRITE_ZERO_US);
                }
                self.link_state.set(LinkState::Writing);
            }

            (LinkState::Writing, true) => {
                let elapsed = match self.edge_start.take() {
                    Some(since) => self.elapsed_since(since),
                    None => return,
                };
                if elapsed > timing::WRITE_ABORT_US {
                    self.enter_reset_handling();
                } else if self.transmit.advance() {
                    self.link_state.set(LinkState::WIdle);
                } else {
                    self.link_state.set(LinkState::RIdle);
                }
            }

            (state, level) => {
                debug!("onewire: spurious edge in {:?}, level={}", state, level);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PinId;
    use crate::testing::{FakePin, FakeTime, RecordingClient};

    fn rom(value: u64) -> OneWireSlaveConfig {
        OneWireSlaveConfig::new(Rom(value), PinId(0))
    }

    /// Fires the engine's `fired()` after setting the fake pin to `level`
    /// and advancing the fake timer by `advance_us` microseconds.
    fn edge<C: hil::gpio::Client>(client: &C, pin: &FakePin, timer: &FakeTime, level: bool, advance_us: u32) {
        timer.advance(advance_us);
        pin.set_level(level);
        client.fired();
    }

    #[test]
    fn presence_after_reset() {
        let pin = FakePin::new();
        let timer = FakeTime::new();
        let client = RecordingClient::new();
        let engine = OneWireSlave::new(rom(0x1122334455667788), &pin, &timer);
        engine.set_client(&client);

        // Master: low 500us, release.
        edge(&engine, &pin, &timer, false, 0);
        edge(&engine, &pin, &timer, true, 500);
        // Slave drove the presence pulse synchronously inside that edge;
        // the pin is released again by the time fired() returns.
        assert!(pin.level());
        // Its own rising edge is now queued and delivered as the next entry.
        pin.set_level(true);
        engine.fired();

        assert_eq!(client.resets(), 1);
    }

    #[test]
    fn skip_rom_then_read_byte() {
        let pin = FakePin::new();
        let timer = FakeTime::new();
        let client = RecordingClient::new();
        let engine = OneWireSlave::new(rom(0xAABBCCDDEEFF0011), &pin, &timer);
        engine.set_client(&client);

        reset(&engine, &pin, &timer);
        write_byte(&engine, &pin, &timer, command::SKIP_ROM);
        write_byte(&engine, &pin, &timer, 0x5A);

        assert_eq!(client.bytes().as_slice(), &[0x5A]);
    }

    #[test]
    fn read_rom_round_trip() {
        let pin = FakePin::new();
        let timer = FakeTime::new();
        let engine = OneWireSlave::new(rom(0x0123456789ABCDEF), &pin, &timer);

        reset(&engine, &pin, &timer);
        write_byte(&engine, &pin, &timer, command::READ_ROM);

        let mut bytes = [0u8; 8];
        for byte in bytes.iter_mut() {
            *byte = read_byte(&engine, &pin, &timer);
        }
        assert_eq!(bytes, [0xEF, 0xCD, 0xAB, 0x89, 0x67, 0x45, 0x23, 0x01]);
    }

    #[test]
    fn match_rom_mismatch_enters_wait() {
        let pin = FakePin::new();
        let timer = FakeTime::new();
        let client = RecordingClient::new();
        let engine = OneWireSlave::new(rom(0x0000000000000001), &pin, &timer);
        engine.set_client(&client);

        reset(&engine, &pin, &timer);
        write_byte(&engine, &pin, &timer, command::MATCH_ROM);
        // ROM's LSB (bit 0) is 1; master selects 0, a mismatch.
        write_bit(&engine, &pin, &timer, false);
        // Further bytes produce no callback: the engine is in WAIT.
        write_byte(&engine, &pin, &timer, 0xFF);
        assert!(client.bytes().is_empty());
    }

    #[test]
    fn search_rom_single_device_reconstructs_rom() {
        let pin = FakePin::new();
        let timer = FakeTime::new();
        let target = 0xA5u64;
        let engine = OneWireSlave::new(rom(target), &pin, &timer);

        reset(&engine, &pin, &timer);
        write_byte(&engine, &pin, &timer, command::SEARCH_ROM);

        let mut reconstructed: u64 = 0;
        for i in 0..64 {
            let true_bit = read_bit(&engine, &pin, &timer);
            let comp_bit = read_bit(&engine, &pin, &timer);
            assert_eq!(comp_bit, !true_bit);
            if true_bit {
                reconstructed |= 1 << i;
            }
            write_bit(&engine, &pin, &timer, true_bit);
        }
        assert_eq!(reconstructed, target);
    }

    #[test]
    fn aborted_write_routes_to_reset() {
        let pin = FakePin::new();
        let timer = FakeTime::new();
        let client = RecordingClient::new();
        let engine = OneWireSlave::new(rom(0), &pin, &timer);
        engine.set_client(&client);

        let mut buffer = [0xFFu8];
        engine.start_transmit(&mut buffer);

        // Master begins a slot (low, then a long low pulse instead of a
        // normal release -- a reset arriving mid-transmission).
        edge(&engine, &pin, &timer, false, 0);
        edge(&engine, &pin, &timer, true, 500);

        assert_eq!(client.resets(), 1);
    }

    #[test]
    fn write_abort_threshold_is_a_hard_300_microsecond_boundary() {
        // `FakeTime::now()` advances the clock by one synthetic tick on
        // every read in addition to whatever `advance()` adds explicitly
        // (see testing.rs), and `Writing`'s elapsed-time check reads the
        // clock twice relative to the `WIdle` edge that captured
        // `edge_start` (once there, once here) -- so the elapsed time the
        // engine observes is `advance_us + 1`. Pass `WRITE_ABORT_US - 1`
        // and `WRITE_ABORT_US` respectively to land exactly on 300us and
        // 301us as the engine sees them.
        let pin = FakePin::new();
        let timer = FakeTime::new();
        let client = RecordingClient::new();
        let engine = OneWireSlave::new(rom(0), &pin, &timer);
        engine.set_client(&client);

        let mut buffer = [0xFFu8]; // all 1s: every bit is silent (no drive)
        engine.start_transmit(&mut buffer);

        edge(&engine, &pin, &timer, false, 0);
        edge(&engine, &pin, &timer, true, timing::WRITE_ABORT_US - 1);
        assert_eq!(client.resets(), 0, "elapsed == 300us must not abort");

        let pin = FakePin::new();
        let timer = FakeTime::new();
        let client = RecordingClient::new();
        let engine = OneWireSlave::new(rom(0), &pin, &timer);
        engine.set_client(&client);

        let mut buffer = [0xFFu8];
        engine.start_transmit(&mut buffer);

        edge(&engine, &pin, &timer, false, 0);
        edge(&engine, &pin, &timer, true, timing::WRITE_ABORT_US);
        assert_eq!(client.resets(), 1, "elapsed == 301us must abort as a reset");
    }

    #[test]
    fn consecutive_resets_are_idempotent() {
        let pin = FakePin::new();
        let timer = FakeTime::new();
        let client = RecordingClient::new();
        let engine = OneWireSlave::new(rom(0xAABBCCDDEEFF0011), &pin, &timer);
        engine.set_client(&client);

        reset(&engine, &pin, &timer);
        reset(&engine, &pin, &timer);
        assert_eq!(client.resets(), 2);

        // A second reset with no intervening traffic must leave the engine
        // in exactly the state a single reset would: still able to read a
        // fresh ROM command and deliver the following application byte.
        write_byte(&engine, &pin, &timer, command::SKIP_ROM);
        write_byte(&engine, &pin, &timer, 0x5A);
        assert_eq!(client.bytes().as_slice(), &[0x5A]);
    }

    #[test]
    fn registry_exhaustion_returns_enomem() {
        use crate::registry::Registry;
        let pin_a = FakePin::new();
        let pin_b = FakePin::new();
        let timer = FakeTime::new();
        let a = OneWireSlave::new(rom(1), &pin_a, &timer);
        let b = OneWireSlave::new(rom(2), &pin_b, &timer);

        let mut registry: Registry<1> = Registry::new();
        assert_eq!(registry.register(PinId(1), &a), ReturnCode::SUCCESS);
        assert_eq!(registry.register(PinId(2), &b), ReturnCode::ENOMEM);
        assert!(registry.lookup(PinId(1)).is_some());
    }

    // -- helpers shared by the scenarios above -----------------------------

    fn reset<'a>(engine: &OneWireSlave<'a, FakePin, FakeTime>, pin: &FakePin, timer: &FakeTime) {
        edge(engine, pin, timer, false, 0);
        edge(engine, pin, timer, true, 500);
        pin.set_level(true);
        engine.fired();
    }

    fn write_bit<'a>(engine: &OneWireSlave<'a, FakePin, FakeTime>, pin: &FakePin, timer: &FakeTime, bit: bool) {
        let us = if bit { 5 } else { 60 };
        edge(engine, pin, timer, false, 0);
        edge(engine, pin, timer, true, us);
    }

    fn write_byte<'a>(engine: &OneWireSlave<'a, FakePin, FakeTime>, pin: &FakePin, timer: &FakeTime, byte: u8) {
        for i in 0..8 {
            write_bit(engine, pin, timer, (byte >> i) & 1 != 0);
        }
    }

    /// Drives a read slot: master pulses low briefly. The slave's write-slot
    /// logic synchronously drives (and releases) the line low for a logical
    /// 0 within that same edge, so by the time control returns here the pin
    /// is already released either way -- `take_driven_low` is what lets this
    /// helper tell the two cases apart. Returns the bit the slave sent.
    fn read_bit<'a>(engine: &OneWireSlave<'a, FakePin, FakeTime>, pin: &FakePin, timer: &FakeTime) -> bool {
        pin.take_driven_low();
        edge(engine, pin, timer, false, 0);
        let transmitted_zero = pin.take_driven_low();
        let bit = !transmitted_zero;
        edge(engine, pin, timer, true, if bit { 5 } else { timing::WRITE_ZERO_US + 5 });
        bit
    }

    fn read_byte<'a>(engine: &OneWireSlave<'a, FakePin, FakeTime>, pin: &FakePin, timer: &FakeTime) -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if read_bit(engine, pin, timer) {
                byte |= 1 << i;
            }
        }
        byte
    }
}
