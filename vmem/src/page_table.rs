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

use core::fmt;

use crate::VMemError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTableEntry {
    pub present: bool,

    /// modified since it was loaded, needs to be written back before eviction
    pub dirty: bool,

    /// second chance bit, only used by CLOCK
    pub used: bool,

    /// frame this page is mapped to, `None` if not present
    pub frame: Option<usize>,

    /// global access counter of the last access, used by LRU
    pub last_used: u64,
}

impl PageTableEntry {
    pub const EMPTY: Self = Self {
        present: false,
        dirty: false,
        used: false,
        frame: None,
        last_used: 0,
    };
}

/// Page table together with the inverse frame table.
///
/// Only data and accessors live here, all policy decisions are made by the
/// memory manager and the page replacement modules.
#[derive(Debug, Clone)]
pub struct PageTable<const PAGES: usize, const FRAMES: usize> {
    entries: [PageTableEntry; PAGES],

    /// page that currently occupies a frame
    frame_pages: [Option<usize>; FRAMES],
}

impl<const PAGES: usize, const FRAMES: usize> PageTable<PAGES, FRAMES> {
    pub const fn new() -> Self {
        Self {
            entries: [PageTableEntry::EMPTY; PAGES],
            frame_pages: [None; FRAMES],
        }
    }

    #[inline]
    pub fn is_present(&self, page: usize) -> bool {
        self.entries[page].present
    }

    #[inline]
    pub fn frame_of(&self, page: usize) -> Option<usize> {
        let entry = &self.entries[page];
        if entry.present {
            entry.frame
        } else {
            None
        }
    }

    #[inline]
    pub fn occupant(&self, frame: usize) -> Option<usize> {
        self.frame_pages[frame]
    }

    #[inline]
    pub fn entry(&self, page: usize) -> &PageTableEntry {
        &self.entries[page]
    }

    #[inline]
    pub fn entry_mut(&mut self, page: usize) -> &mut PageTableEntry {
        &mut self.entries[page]
    }

    pub fn entries(&self) -> &[PageTableEntry; PAGES] {
        &self.entries
    }

    pub fn frame_pages(&self) -> &[Option<usize>; FRAMES] {
        &self.frame_pages
    }

    /// Returns the lowest frame that is not occupied by any page
    pub fn free_frame(&self) -> Option<usize> {
        self.frame_pages.iter().position(|page| page.is_none())
    }

    /// Maps `page` to `frame`. The frame has to be free.
    pub fn mark_present(&mut self, page: usize, frame: usize) {
        debug_assert!(
            self.frame_pages[frame].is_none(),
            "frame {} is still occupied by page {:?}",
            frame,
            self.frame_pages[frame]
        );

        self.entries[page] = PageTableEntry {
            present: true,
            dirty: false,
            used: false,
            frame: Some(frame),
            last_used: self.entries[page].last_used,
        };
        self.frame_pages[frame] = Some(page);
    }

    /// Unmaps `page` and frees its frame. Clears present, dirty and used.
    pub fn mark_absent(&mut self, page: usize) {
        let entry = &mut self.entries[page];
        if let Some(frame) = entry.frame.take() {
            if self.frame_pages[frame] == Some(page) {
                self.frame_pages[frame] = None;
            }
        }

        entry.present = false;
        entry.dirty = false;
        entry.used = false;
    }

    /// Checks that page table and frame table agree with each other
    /// and that every item of the address space is located in exactly one place.
    pub fn check_consistency(&self, page_size: usize) -> Result<(), VMemError> {
        for (page, entry) in self.entries.iter().enumerate() {
            match (entry.present, entry.frame) {
                (true, Some(frame)) => {
                    if frame >= FRAMES || self.frame_pages[frame] != Some(page) {
                        return Err(VMemError::InvariantViolation(format!(
                            "page {} maps to frame {} which is occupied by {:?}",
                            page,
                            frame,
                            self.frame_pages.get(frame).copied().flatten()
                        )));
                    }
                }
                (true, None) => {
                    return Err(VMemError::InvariantViolation(format!(
                        "page {} is present without a frame",
                        page
                    )));
                }
                (false, Some(frame)) => {
                    return Err(VMemError::InvariantViolation(format!(
                        "page {} is not present but still references frame {}",
                        page, frame
                    )));
                }
                (false, None) => {}
            }
        }

        for (frame, occupant) in self.frame_pages.iter().enumerate() {
            if let Some(page) = *occupant {
                if page >= PAGES || self.frame_of(page) != Some(frame) {
                    return Err(VMemError::InvariantViolation(format!(
                        "frame {} holds page {} which is not mapped to it",
                        frame, page
                    )));
                }
            }
        }

        let resident_items = self.frame_pages.iter().filter(|p| p.is_some()).count() * page_size;
        let stored_items = self.entries.iter().filter(|e| !e.present).count() * page_size;
        if resident_items + stored_items != PAGES * page_size {
            return Err(VMemError::InvariantViolation(format!(
                "resident-item accounting mismatch: {} resident + {} stored != {}",
                resident_items,
                stored_items,
                PAGES * page_size
            )));
        }

        Ok(())
    }
}

impl<const PAGES: usize, const FRAMES: usize> Default for PageTable<PAGES, FRAMES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PAGES: usize, const FRAMES: usize> fmt::Display for PageTable<PAGES, FRAMES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Page table:")?;
        writeln!(
            f,
            "{:>6} {:>8} {:>6} {:>5} {:>6} {:>10}",
            "page", "present", "dirty", "used", "frame", "last_used"
        )?;
        for (page, entry) in self.entries.iter().enumerate() {
            let frame = match entry.frame {
                Some(frame) => frame as i64,
                None => -1,
            };
            writeln!(
                f,
                "{:>6} {:>8} {:>6} {:>5} {:>6} {:>10}",
                page, entry.present, entry.dirty, entry.used, frame, entry.last_used
            )?;
        }

        writeln!(f, "Frame table:")?;
        for (frame, page) in self.frame_pages.iter().enumerate() {
            match page {
                Some(page) => writeln!(f, "frame {:>4}: page {:>6}", frame, page)?,
                None => writeln!(f, "frame {:>4}: free", frame)?,
            }
        }

        Ok(())
    }
}
