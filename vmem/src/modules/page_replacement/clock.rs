/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use super::PageReplacementModule;
use crate::PageTable;

/// Second chance algorithm.
///
/// The hand rotates over all frames. A page with its `used` bit set loses the bit
/// and survives this round, the first page without it is evicted.
/// After one full round every bit is cleared, so the hand stops after
/// at most `2 * FRAMES` inspections.
#[derive(Debug, Clone, Default)]
pub struct ClockReplacementModule {
    hand: usize,
}

impl ClockReplacementModule {
    pub fn new() -> Self {
        Self { hand: 0 }
    }

    /// Selects a victim and returns it together with the number of inspected frames
    fn advance<const PAGES: usize, const FRAMES: usize>(
        &mut self,
        page_table: &mut PageTable<PAGES, FRAMES>,
    ) -> (usize, usize) {
        let mut inspections = 0;

        loop {
            let frame = self.hand % FRAMES;
            self.hand = (frame + 1) % FRAMES;
            inspections += 1;

            match page_table.occupant(frame) {
                Some(page) if page_table.entry(page).used => {
                    // page was accessed, give it another chance
                    page_table.entry_mut(page).used = false;
                    debug_assert!(inspections <= FRAMES, "clock hand passed a cleared frame");
                }
                _ => {
                    // page lost its chance, choose it
                    return (frame, inspections);
                }
            }
        }
    }
}

impl PageReplacementModule for ClockReplacementModule {
    fn name(&self) -> &'static str {
        "CLOCK"
    }

    fn select_victim<const PAGES: usize, const FRAMES: usize>(
        &mut self,
        page_table: &mut PageTable<PAGES, FRAMES>,
    ) -> usize {
        self.advance(page_table).0
    }
}
