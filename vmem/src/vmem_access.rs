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

use std::{
    sync::{
        mpsc::{Receiver, SyncSender},
        Arc,
    },
    thread::JoinHandle,
};

use log::{error, info, trace};

use crate::{
    memory_manager::ManagerRequest,
    shared_vmem::{SharedVMem, VMemSnapshot, VMemStats},
    VMemError,
};

/// Flat, item addressed memory
pub trait VirtualMemory {
    /// Reads the item stored at `address`
    fn read(&mut self, address: usize) -> Result<i32, VMemError>;

    /// Writes `value` to `address`
    fn write(&mut self, address: usize, value: i32) -> Result<(), VMemError>;

    /// Number of addressable items
    fn size(&self) -> usize;
}

/// Access side of the virtual memory.
///
/// Translates addresses to page and offset, raises page faults at the memory manager
/// and blocks until they are handled. There is exactly one access handle per memory manager.
pub struct VMemAccess<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize> {
    vmem: Arc<SharedVMem<PAGES, FRAMES, PAGE_SIZE>>,
    requests: SyncSender<ManagerRequest>,
    completion: Receiver<()>,

    /// `None` once the manager was joined, every access fails from then on
    manager: Option<JoinHandle<Result<(), VMemError>>>,
}

impl<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize>
    VMemAccess<PAGES, FRAMES, PAGE_SIZE>
{
    pub const VIRT_MEM_SIZE: usize = PAGES * PAGE_SIZE;

    pub(crate) fn new(
        vmem: Arc<SharedVMem<PAGES, FRAMES, PAGE_SIZE>>,
        requests: SyncSender<ManagerRequest>,
        completion: Receiver<()>,
        manager: JoinHandle<Result<(), VMemError>>,
    ) -> Self {
        Self {
            vmem,
            requests,
            completion,
            manager: Some(manager),
        }
    }

    /// Reads the item at `address`, faulting its page in if necessary
    pub fn read(&mut self, address: usize) -> Result<i32, VMemError> {
        let (page, offset) = Self::translate(address)?;
        self.ensure_present(page)?;

        let mut state = self.vmem.lock()?;
        let frame = state.touch(page, false)?;

        Ok(state.data[frame][offset])
    }

    /// Writes `value` to `address`, faulting its page in if necessary
    pub fn write(&mut self, address: usize, value: i32) -> Result<(), VMemError> {
        let (page, offset) = Self::translate(address)?;
        self.ensure_present(page)?;

        let mut state = self.vmem.lock()?;
        let frame = state.page_table.frame_of(page).ok_or_else(|| {
            VMemError::InvariantViolation(format!("page {} is not present after its fault", page))
        })?;

        state.data[frame][offset] = value;
        state.touch(page, true)?;

        Ok(())
    }

    /// Lets the memory manager print its administration block and page table.
    ///
    /// Blocks until the dump was printed.
    pub fn dump(&mut self) -> Result<(), VMemError> {
        self.request(ManagerRequest::Dump)
    }

    pub fn snapshot(&self) -> Result<VMemSnapshot<PAGES, FRAMES, PAGE_SIZE>, VMemError> {
        Ok(self.vmem.lock()?.snapshot())
    }

    pub fn stats(&self) -> Result<VMemStats, VMemError> {
        let state = self.vmem.lock()?;

        Ok(VMemStats {
            page_faults: state.adm.pf_count,
            accesses: state.adm.g_count,
        })
    }

    /// Detaches from the shared region and shuts the memory manager down.
    ///
    /// Returns the error the memory manager terminated with, if any.
    pub fn teardown(mut self) -> Result<(), VMemError> {
        let _ = self.requests.send(ManagerRequest::Terminate);

        match self.join_manager() {
            Some(err) => Err(err),
            None => {
                info!("disconnected from virtual memory");
                Ok(())
            }
        }
    }

    fn translate(address: usize) -> Result<(usize, usize), VMemError> {
        if address >= Self::VIRT_MEM_SIZE {
            error!("address {} is out of bounds", address);
            return Err(VMemError::AddressOutOfRange {
                address,
                size: Self::VIRT_MEM_SIZE,
            });
        }

        Ok((address / PAGE_SIZE, address % PAGE_SIZE))
    }

    /// Counts the access and makes sure `page` is present afterwards
    fn ensure_present(&mut self, page: usize) -> Result<(), VMemError> {
        if self.manager.is_none() {
            // frames are not maintained anymore
            return Err(VMemError::ManagerTerminated);
        }

        {
            let mut state = self.vmem.lock()?;
            state.adm.g_count += 1;

            if state.page_table.is_present(page) {
                return Ok(());
            }

            // has to be written before the manager is notified
            state.adm.req_pageno = Some(page);
        }

        trace!("page {} is not present, raising page fault", page);
        self.request(ManagerRequest::PageFault)
    }

    /// Sends `request` and blocks until the manager signals completion
    fn request(&mut self, request: ManagerRequest) -> Result<(), VMemError> {
        if self.requests.send(request).is_ok() && self.completion.recv().is_ok() {
            return Ok(());
        }

        // manager is gone, find out why
        Err(self
            .join_manager()
            .unwrap_or(VMemError::ManagerTerminated))
    }

    /// Waits for the manager thread and returns the error it ended with
    fn join_manager(&mut self) -> Option<VMemError> {
        let handle = self.manager.take()?;

        match handle.join() {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(_) => {
                error!("memory manager panicked");
                Some(VMemError::ManagerTerminated)
            }
        }
    }
}

impl<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize> VirtualMemory
    for VMemAccess<PAGES, FRAMES, PAGE_SIZE>
{
    fn read(&mut self, address: usize) -> Result<i32, VMemError> {
        VMemAccess::read(self, address)
    }

    fn write(&mut self, address: usize, value: i32) -> Result<(), VMemError> {
        VMemAccess::write(self, address, value)
    }

    fn size(&self) -> usize {
        Self::VIRT_MEM_SIZE
    }
}

impl<const PAGES: usize, const FRAMES: usize, const PAGE_SIZE: usize> Drop
    for VMemAccess<PAGES, FRAMES, PAGE_SIZE>
{
    fn drop(&mut self) {
        if self.manager.is_some() {
            let _ = self.requests.send(ManagerRequest::Terminate);

            if let Some(err) = self.join_manager() {
                error!("memory manager terminated with: {}", err);
            }
        }
    }
}

impl VirtualMemory for Vec<i32> {
    fn read(&mut self, address: usize) -> Result<i32, VMemError> {
        self.get(address)
            .copied()
            .ok_or(VMemError::AddressOutOfRange {
                address,
                size: self.len(),
            })
    }

    fn write(&mut self, address: usize, value: i32) -> Result<(), VMemError> {
        let size = self.len();
        let item = self
            .get_mut(address)
            .ok_or(VMemError::AddressOutOfRange { address, size })?;
        *item = value;

        Ok(())
    }

    fn size(&self) -> usize {
        self.len()
    }
}
