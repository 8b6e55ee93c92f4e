use std::path::PathBuf;

use static_assertions::const_assert;

use crate::{memory_manager::MemoryManager, vmem_access::VMemAccess};

/// Process address space in items
pub const VMEM_VIRTMEMSIZE: usize = 1024;

/// Physical memory in items
pub const VMEM_PHYSMEMSIZE: usize = 128;

/// Items per page
pub const VMEM_PAGESIZE: usize = 8;

/// Total number of pages
pub const VMEM_NPAGES: usize = VMEM_VIRTMEMSIZE / VMEM_PAGESIZE;

/// Number of available frames
pub const VMEM_NFRAMES: usize = VMEM_PHYSMEMSIZE / VMEM_PAGESIZE;

const_assert!(VMEM_NFRAMES < VMEM_NPAGES);
const_assert!(VMEM_VIRTMEMSIZE % VMEM_PAGESIZE == 0);
const_assert!(VMEM_PHYSMEMSIZE % VMEM_PAGESIZE == 0);

pub const MMANAGE_PFNAME: &str = "./pagefile.bin";
pub const MMANAGE_LOGFNAME: &str = "./logfile.txt";

pub type DefaultMemoryManager<S> = MemoryManager<S, VMEM_NPAGES, VMEM_NFRAMES, VMEM_PAGESIZE>;
pub type DefaultVMemAccess = VMemAccess<VMEM_NPAGES, VMEM_NFRAMES, VMEM_PAGESIZE>;

#[derive(Debug, Clone)]
pub struct VMemConfig {
    /// Where the fault records are appended to. `None` disables the record stream.
    pub logfile_path: Option<PathBuf>,

    /// Check page table and frame table against each other after every fault
    pub check_consistency: bool,
}

impl Default for VMemConfig {
    fn default() -> Self {
        Self {
            logfile_path: Some(PathBuf::from(MMANAGE_LOGFNAME)),
            check_consistency: cfg!(debug_assertions),
        }
    }
}
