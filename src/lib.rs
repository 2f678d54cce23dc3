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

//! A 1-Wire (Maxim/Dallas iButton bus) slave protocol engine.
//!
//! [`OneWireSlave`] is driven entirely from a single GPIO interrupt
//! (`kernel::hil::gpio::Client::fired`): it classifies the master's edge
//! timings into bus symbols (link layer) and interprets the resulting
//! bit stream as Maxim ROM commands -- SEARCH ROM, MATCH ROM, READ ROM, SKIP
//! ROM, CONDITIONAL SEARCH (ROM layer). Applications observe non-ROM
//! traffic through the [`OneWireClient`] trait.
//!
//! Test builds link `std` so the `#[cfg(test)]` suites in each module can
//! run on the host; real board builds stay `no_std`, as every other capsule
//! in this tree does.

#![crate_name = "onewire_slave"]
#![crate_type = "rlib"]
#![cfg_attr(not(test), no_std)]

extern crate kernel;

pub mod client;
pub mod config;
pub mod engine;
pub mod framer;
pub mod registry;
pub mod rom;
pub mod timing;

#[cfg(any(test, feature = "test"))]
pub mod testing;

pub use client::OneWireClient;
pub use config::OneWireSlaveConfig;
pub use engine::OneWireSlave;
pub use registry::{PinId, Registry};
pub use rom::Rom;
