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

//! Optional pin-id to instance registry.
//!
//! The original source keeps a process-wide `OneWireInstances[MAX_ONEWIRE_INSTANCES]`
//! array that every interrupt handler searches linearly. This module keeps
//! the bounded, linear-scan shape -- it is still the right data structure
//! for the one-or-two-instance case this library targets -- but owns it as
//! an explicit, board-constructed collection instead of a library-global
//! `static mut`, using `arrayvec::ArrayVec` for a fixed-capacity, no-heap
//! collection the way the teacher vendors that crate for the same purpose
//! elsewhere in this tree (see DESIGN.md for the 0.5 -> 0.7 version note:
//! `CAP` here is a board-chosen const generic, which needs the newer
//! `ArrayVec<T, const CAP: usize>` shape).

use arrayvec::ArrayVec;
use kernel::hil::gpio;
use kernel::ReturnCode;

/// Opaque, board-chosen key identifying a 1-Wire bus pin. Boards that wire
/// exactly one instance to one interrupt vector don't need a registry at
/// all and can call `fired()` directly; `PinId` only matters to boards that
/// share one interrupt handler across several instances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinId(pub u32);

struct Entry<'a> {
    pin_id: PinId,
    client: &'a dyn gpio::Client,
}

/// A fixed-capacity table from [`PinId`] to the `OneWireSlave` registered
/// under it, indexed by `register()` call order. `CAP` is chosen by the
/// board, not by this library.
pub struct Registry<'a, const CAP: usize> {
    entries: ArrayVec<Entry<'a>, CAP>,
}

impl<'a, const CAP: usize> Registry<'a, CAP> {
    pub fn new() -> Self {
        Registry {
            entries: ArrayVec::new(),
        }
    }

    /// Registers `client` under `pin_id`. Returns `ReturnCode::ENOMEM` if
    /// the registry is already at capacity (the configuration error
    /// regime) and `ReturnCode::EALREADY` if `pin_id` is already registered.
    pub fn register(&mut self, pin_id: PinId, client: &'a dyn gpio::Client) -> ReturnCode {
        if self.lookup(pin_id).is_some() {
            return ReturnCode::EALREADY;
        }
        if self.entries.try_push(Entry { pin_id, client }).is_err() {
            return ReturnCode::ENOMEM;
        }
        ReturnCode::SUCCESS
    }

    /// Removes whatever is registered under `pin_id`, if anything.
    pub fn unregister(&mut self, pin_id: PinId) {
        self.entries.retain(|entry| entry.pin_id != pin_id);
    }

    pub fn lookup(&self, pin_id: PinId) -> Option<&'a dyn gpio::Client> {
        self.entries
            .iter()
            .find(|entry| entry.pin_id == pin_id)
            .map(|entry| entry.client)
    }

    /// Dispatches an edge interrupt observed on `pin_id` to its registered
    /// client, if one is registered. Intended to be called from a board's
    /// shared GPIO interrupt vector.
    pub fn dispatch(&self, pin_id: PinId) {
        if let Some(client) = self.lookup(pin_id) {
            client.fired();
        }
    }
}
