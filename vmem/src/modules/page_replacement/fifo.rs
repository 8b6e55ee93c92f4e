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

/// Evicts frames in the order they were allocated.
///
/// Frames are handed out in ascending order while free, so a cursor
/// rotating over all frames always points at the oldest allocation.
#[derive(Debug, Clone, Default)]
pub struct FifoReplacementModule {
    next_alloc_idx: usize,
}

impl FifoReplacementModule {
    pub fn new() -> Self {
        Self { next_alloc_idx: 0 }
    }
}

impl PageReplacementModule for FifoReplacementModule {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn select_victim<const PAGES: usize, const FRAMES: usize>(
        &mut self,
        _page_table: &mut PageTable<PAGES, FRAMES>,
    ) -> usize {
        let frame = self.next_alloc_idx % FRAMES;
        self.next_alloc_idx = (frame + 1) % FRAMES;

        frame
    }
}
