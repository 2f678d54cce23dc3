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

//! The 64-bit Maxim/Dallas ROM identifier and the Maxim ROM command codes.

/// A device's 64-bit ROM address (family code + serial number + CRC).
///
/// The library does not interpret or validate the value: family code and CRC
/// are meaningful only to the application and the bus master.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rom(pub u64);

impl Rom {
    /// Returns the ROM bit at `index` (0 = LSB, 63 = MSB), the bit order in
    /// which SEARCH ROM and MATCH ROM scan the address.
    pub fn bit(&self, index: u32) -> bool {
        debug_assert!(index < 64);
        (self.0 >> index) & 1 != 0
    }

    /// Builds the 8-byte buffer READ ROM transmits: the ROM's eight bytes in
    /// LSB-byte-first order (byte 0 = bits 7..0, byte 1 = bits 15..8, ...).
    /// This is exactly `u64::to_le_bytes`; see the Open Question note
    /// on the original source's ambiguous byte-shift expression.
    pub fn to_wire_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

/// First-byte-after-reset Maxim ROM command codes.
pub mod command {
    pub const SEARCH_ROM: u8 = 0xF0;
    pub const CONDITIONAL_SEARCH: u8 = 0xEC;
    pub const READ_ROM: u8 = 0x33;
    pub const MATCH_ROM: u8 = 0x55;
    pub const SKIP_ROM: u8 = 0xCC;
}
