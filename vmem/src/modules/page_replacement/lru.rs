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

/// Evicts the page with the oldest access timestamp (`last_used`).
///
/// Ties are broken by the lowest frame index.
#[derive(Debug, Clone, Default)]
pub struct LruReplacementModule;

impl LruReplacementModule {
    pub fn new() -> Self {
        Self
    }
}

impl PageReplacementModule for LruReplacementModule {
    fn name(&self) -> &'static str {
        "LRU"
    }

    fn select_victim<const PAGES: usize, const FRAMES: usize>(
        &mut self,
        page_table: &mut PageTable<PAGES, FRAMES>,
    ) -> usize {
        let mut victim = 0;
        let mut oldest = u64::MAX;

        for frame in 0..FRAMES {
            let last_used = match page_table.occupant(frame) {
                Some(page) => page_table.entry(page).last_used,
                // a free frame is even better than the oldest page
                None => return frame,
            };

            if last_used < oldest {
                oldest = last_used;
                victim = frame;
            }
        }

        victim
    }
}

#[cfg(test)]
mod test {
    use super::LruReplacementModule;
    use crate::modules::page_replacement::{test::full_page_table, PageReplacementModule};
    use crate::PageTable;

    #[test]
    fn test_lru_evicts_oldest() {
        let mut module = LruReplacementModule::new();
        let mut table: PageTable<16, 4> = full_page_table(4);

        assert_eq!(module.select_victim(&mut table), 0);

        // touch page in frame 0, frame 1 is the oldest now
        table.entry_mut(4).last_used = 10;
        assert_eq!(module.select_victim(&mut table), 1);

        table.entry_mut(5).last_used = 11;
        table.entry_mut(6).last_used = 12;
        table.entry_mut(7).last_used = 13;
        assert_eq!(module.select_victim(&mut table), 0);
    }

    #[test]
    fn test_lru_ties_take_lowest_frame() {
        let mut module = LruReplacementModule::new();
        let mut table: PageTable<16, 4> = full_page_table(0);
        for page in 0..4 {
            table.entry_mut(page).last_used = 7;
        }
        table.entry_mut(0).last_used = 8;

        assert_eq!(module.select_victim(&mut table), 1);
    }
}
