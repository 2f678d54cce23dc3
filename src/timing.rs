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

//! Elapsed-time symbol classification and the blocking low-pulse primitive
//! classification and the blocking low-pulse primitive. These are the
//! only two places this crate touches the
//! `kernel::hil::time::Time` HIL directly.

use kernel::hil::gpio::Output;
use kernel::hil::time::{Frequency, Ticks, Time};

/// The three things a master-driven low pulse can mean, decided purely by
/// elapsed microseconds between the falling edge and the ending rising edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    One,
    Zero,
    Reset,
}

/// Microsecond boundaries for the bus timing. A pulse shorter than
/// [`WRITE_ONE_MAX_US`] is a "1"; up to [`RESET_MIN_US`] is a "0"; beyond
/// that, a reset.
pub const WRITE_ONE_MAX_US: u32 = 20;
pub const RESET_MIN_US: u32 = 100;
/// Slave's own write-0 low pulse duration.
pub const WRITE_ZERO_US: u32 = 46;
/// Slave's presence pulse duration.
pub const PRESENCE_US: u32 = 100;
/// Beyond this elapsed time in `WRITING`, a pulse is reinterpreted as a
/// master-initiated reset aborting the in-progress write.
pub const WRITE_ABORT_US: u32 = 300;

pub fn classify(elapsed_us: u32) -> Symbol {
    if elapsed_us < WRITE_ONE_MAX_US {
        Symbol::One
    } else if elapsed_us <= RESET_MIN_US {
        Symbol::Zero
    } else {
        Symbol::Reset
    }
}

/// Converts a tick delta, measured in `T::Frequency`, into microseconds.
pub fn ticks_to_micros<T: Time>(delta: T::Ticks) -> u32 {
    let hz = <T::Frequency as Frequency>::frequency() as u64;
    let ticks = delta.into_u32() as u64;
    ((ticks * 1_000_000) / hz) as u32
}

/// Elapsed microseconds between `since` and `timer.now()`.
pub fn elapsed_micros<T: Time>(timer: &T, since: T::Ticks) -> u32 {
    let delta = timer.now().wrapping_sub(since);
    ticks_to_micros::<T>(delta)
}

/// Pulls `pin` low, busy-waits until `duration_us` have elapsed, then
/// releases it. Blocking is acceptable here: every caller in this crate
/// bounds `duration_us` to at most [`PRESENCE_US`] (100 µs), matching the
/// contract `send_low` documents above.
pub fn drive_low_for_micros<P, T>(pin: &P, timer: &T, duration_us: u32)
where
    P: Output,
    T: Time,
{
    pin.clear();
    let start = timer.now();
    while elapsed_micros(timer, start) < duration_us {}
    pin.set();
}
