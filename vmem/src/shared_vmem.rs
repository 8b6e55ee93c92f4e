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

use log::info;
use try_lock::{Locked, TryLock};

use crate::{util::mmap_guard::MMapGuard, PageTable, VMemError};

/// Administration data shared by the access side and the memory manager
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdministrationBlock {
    /// page the access side is waiting for
    pub req_pageno: Option<usize>,

    /// page fault counter
    pub pf_count: u64,

    /// global access counter, used as quasi-timestamp
    pub g_count: u64,
}

/// Everything that lives in the shared region
pub(crate) struct VMemState<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize> {
    pub(crate) adm: AdministrationBlock,
    pub(crate) page_table: PageTable<PAGES, FRAMES>,
    pub(crate) data: [[i32; PAGE_SIZE]; FRAMES],
}

impl<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize>
    VMemState<PAGES, FRAMES, PAGE_SIZE>
{
    fn new() -> Self {
        Self {
            adm: AdministrationBlock::default(),
            page_table: PageTable::new(),
            data: [[0; PAGE_SIZE]; FRAMES],
        }
    }

    /// Updates the access metadata of a present `page` and returns its frame
    pub(crate) fn touch(&mut self, page: usize, write: bool) -> Result<usize, VMemError> {
        let frame = self.page_table.frame_of(page).ok_or_else(|| {
            VMemError::InvariantViolation(format!(
                "page {} is not present after its page fault was handled",
                page
            ))
        })?;

        let g_count = self.adm.g_count;
        let entry = self.page_table.entry_mut(page);
        entry.last_used = g_count;
        entry.used = true;
        if write {
            entry.dirty = true;
        }

        Ok(frame)
    }

    pub(crate) fn snapshot(&self) -> VMemSnapshot<PAGES, FRAMES, PAGE_SIZE> {
        VMemSnapshot {
            adm: self.adm.clone(),
            page_table: self.page_table.clone(),
            data: self.data,
        }
    }
}

/// Handle to the shared region holding administration block, page table and frame data.
///
/// The manager creates it, the access side attaches by cloning the `Arc` it is handed out in,
/// dropping a handle detaches and dropping the last one destroys the region.
pub(crate) struct SharedVMem<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize> {
    region: MMapGuard<TryLock<VMemState<PAGES, FRAMES, PAGE_SIZE>>>,
}

impl<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize>
    SharedVMem<PAGES, FRAMES, PAGE_SIZE>
{
    /// Maps a new region and initializes an empty page table
    pub(crate) fn create() -> Result<Self, VMemError> {
        let region = MMapGuard::new(TryLock::new(VMemState::new()))?;
        info!("created shared region of {} bytes", region.size());

        Ok(Self { region })
    }

    /// Only one side is active at a time, so the lock should always be free.
    /// If it is not, both sides are running at the same time.
    pub(crate) fn lock(
        &self,
    ) -> Result<Locked<'_, VMemState<PAGES, FRAMES, PAGE_SIZE>>, VMemError> {
        self.region.try_lock().ok_or(VMemError::SharedRegionBusy)
    }
}

/// Copy of the shared state at a point in time where no fault was in flight
#[derive(Debug, Clone)]
pub struct VMemSnapshot<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize> {
    pub adm: AdministrationBlock,
    pub page_table: PageTable<PAGES, FRAMES>,
    pub data: [[i32; PAGE_SIZE]; FRAMES],
}

impl<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize>
    VMemSnapshot<PAGES, FRAMES, PAGE_SIZE>
{
    pub fn stats(&self) -> VMemStats {
        VMemStats {
            page_faults: self.adm.pf_count,
            accesses: self.adm.g_count,
        }
    }

    pub fn check_consistency(&self) -> Result<(), VMemError> {
        self.page_table.check_consistency(PAGE_SIZE)
    }
}

impl<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize> fmt::Display
    for VMemSnapshot<PAGES, FRAMES, PAGE_SIZE>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Administration:")?;
        match self.adm.req_pageno {
            Some(page) => writeln!(f, "  req_pageno: {}", page)?,
            None => writeln!(f, "  req_pageno: none")?,
        }
        writeln!(f, "  pf_count:   {}", self.adm.pf_count)?;
        writeln!(f, "  g_count:    {}", self.adm.g_count)?;

        write!(f, "{}", self.page_table)?;

        writeln!(f, "Frame data:")?;
        for (frame, items) in self.data.iter().enumerate() {
            write!(f, "frame {:>4}:", frame)?;
            for item in items {
                write!(f, " {:>10}", item)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VMemStats {
    pub page_faults: u64,
    pub accesses: u64,
}
