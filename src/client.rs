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

//! Application notification interface.
//!
//! Replaces the original library's three `__weak` C functions with a single
//! trait installed once via [`crate::engine::OneWireSlave::set_client`] --
//! the same re-architecture the teacher applies to its own capsule clients
//! (e.g. `h1::nvcounter::Client`, `kernel::hil::gpio::Client`).

/// Notifications the engine delivers to the application. All three methods
/// default to doing nothing, so implementors only override what they need.
pub trait OneWireClient {
    /// A non-ROM byte was read from the master while in `READING_BITS`.
    fn byte_received(&self, _byte: u8) {}

    /// Any bit was read from the master, including MATCH/SEARCH ROM
    /// selection bits.
    fn bit_received(&self, _bit: bool) {}

    /// The master sent a reset pulse. Fired after internal state (ROM state,
    /// both framers) has already been cleared and before the presence pulse
    /// completes.
    fn reset_received(&self) {}
}
