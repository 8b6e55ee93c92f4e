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
        mpsc::{sync_channel, Receiver, SyncSender},
        Arc,
    },
    thread,
};

use log::{debug, error, info, warn};

use crate::{
    fault_log::{FaultLogger, LogEvent},
    modules::{
        page_replacement::{
            allocate_frame, PageReplacement, PageReplacementModule, ReplacementAlgorithm,
        },
        persistent_storage::{PageFile, PersistentStorageModule},
    },
    shared_vmem::SharedVMem,
    vmem_access::VMemAccess,
    VMemConfig, VMemError,
};

/// Notifications the access side sends to the memory manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerRequest {
    /// `req_pageno` was written and the access side waits for it to become present
    PageFault,

    /// print administration block, page table and frame data
    Dump,

    /// leave the service loop
    Terminate,
}

/// The memory manager maintains the page table and services page faults.
///
/// It owns the pagefile, creates the shared region and runs in its own thread
/// once started. The access side talks to it via [`VMemAccess`].
pub struct MemoryManager<
    S: PersistentStorageModule,
    const PAGES: usize,
    const FRAMES: usize,
    const PAGE_SIZE: usize,
> {
    vmem: Arc<SharedVMem<PAGES, FRAMES, PAGE_SIZE>>,
    page_file: PageFile<S, PAGE_SIZE>,
    replacement: PageReplacement,
    fault_log: FaultLogger,
    check_consistency: bool,
}

impl<
        S: PersistentStorageModule + Send + 'static,
        const PAGES: usize,
        const FRAMES: usize,
        const PAGE_SIZE: usize,
    > MemoryManager<S, PAGES, FRAMES, PAGE_SIZE>
{
    pub const VIRT_MEM_SIZE: usize = PAGES * PAGE_SIZE;

    /// Initializes the pagefile, the fault log and the shared region.
    ///
    /// `storage` is overwritten with placeholder pages.
    pub fn new(
        storage: S,
        config: &VMemConfig,
        algorithm: ReplacementAlgorithm,
    ) -> Result<Self, VMemError> {
        if PAGE_SIZE == 0 || FRAMES == 0 || FRAMES >= PAGES {
            return Err(VMemError::resource_init(
                "memory layout",
                &format!(
                    "need 0 < frames < pages and a page size > 0, got {} frames, {} pages, page size {}",
                    FRAMES, PAGES, PAGE_SIZE
                ),
            ));
        }

        let page_file = PageFile::new(storage, PAGES)?;

        let fault_log = match &config.logfile_path {
            Some(path) => FaultLogger::create(path)?,
            None => FaultLogger::disabled(),
        };

        let vmem = Arc::new(SharedVMem::create()?);
        let replacement = PageReplacement::new(algorithm);

        info!(
            "memory manager ready: {} pages, {} frames, {} items per page, replacement module {}",
            PAGES,
            FRAMES,
            PAGE_SIZE,
            replacement.name()
        );

        Ok(Self {
            vmem,
            page_file,
            replacement,
            fault_log,
            check_consistency: config.check_consistency,
        })
    }

    pub fn algorithm(&self) -> ReplacementAlgorithm {
        self.replacement.algorithm()
    }

    /// Spawns the service loop and returns the (single) access handle.
    pub fn start(self) -> Result<VMemAccess<PAGES, FRAMES, PAGE_SIZE>, VMemError> {
        let (request_sender, request_receiver) = sync_channel(1);
        let (completion_sender, completion_receiver) = sync_channel(1);
        let vmem = Arc::clone(&self.vmem);

        let handle = thread::Builder::new()
            .name("mmanage".into())
            .spawn(move || self.run(request_receiver, completion_sender))
            .map_err(|source| VMemError::ResourceInit {
                resource: "memory manager thread",
                source,
            })?;

        Ok(VMemAccess::new(
            vmem,
            request_sender,
            completion_receiver,
            handle,
        ))
    }

    /// Service loop: waits for requests until termination is requested or the access side is gone.
    ///
    /// Every error is fatal. The loop ends and drops the completion sender,
    /// which wakes up a waiting access side.
    pub(crate) fn run(
        mut self,
        requests: Receiver<ManagerRequest>,
        completion: SyncSender<()>,
    ) -> Result<(), VMemError> {
        while let Ok(request) = requests.recv() {
            let res = match request {
                ManagerRequest::PageFault => self.handle_page_fault(),
                ManagerRequest::Dump => self.dump(),
                ManagerRequest::Terminate => break,
            };

            if let Err(err) = res {
                error!("memory manager failed while handling {:?}: {}", request, err);
                return Err(err);
            }

            if completion.send(()).is_err() {
                // access side is gone
                break;
            }
        }

        info!("memory manager shutting down");
        Ok(())
    }

    /// Loads the requested page, evicting another page if there is no free frame.
    pub(crate) fn handle_page_fault(&mut self) -> Result<(), VMemError> {
        let mut state = self.vmem.lock()?;

        let page = state.adm.req_pageno.ok_or_else(|| {
            VMemError::InvariantViolation("page fault without a requested page".into())
        })?;

        if page >= PAGES {
            return Err(VMemError::AddressOutOfRange {
                address: page * PAGE_SIZE,
                size: Self::VIRT_MEM_SIZE,
            });
        }

        if state.page_table.is_present(page) {
            warn!("spurious page fault: page {} is already present", page);
            return Ok(());
        }

        state.adm.pf_count += 1;

        let allocation = allocate_frame(&mut self.replacement, &mut state.page_table);
        let frame = allocation.frame;

        if let Some(victim) = allocation.victim {
            if state.page_table.entry(victim).dirty {
                self.page_file.store(victim, &state.data[frame])?;
            }
            state.page_table.mark_absent(victim);
        }

        self.page_file.load(page, &mut state.data[frame])?;
        state.page_table.mark_present(page, frame);

        let event = LogEvent {
            req_pageno: page,
            replaced_page: allocation.victim,
            alloc_frame: frame,
            pf_count: state.adm.pf_count,
            g_count: state.adm.g_count,
        };
        debug!(
            "page fault {}: loaded page {} into frame {}, replaced {:?}",
            event.pf_count, page, frame, event.replaced_page
        );

        if self.check_consistency {
            state.page_table.check_consistency(PAGE_SIZE)?;
        }

        self.fault_log.log(&event)
    }

    /// Prints administration block, page table and frame data.
    ///
    /// Page table and frame table not matching each other is fatal.
    pub(crate) fn dump(&self) -> Result<(), VMemError> {
        let snapshot = self.vmem.lock()?.snapshot();
        println!("{}", snapshot);

        snapshot.check_consistency()
    }
}
