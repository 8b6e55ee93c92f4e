use std::io;

use thiserror::Error;

/// Everything that can go wrong while simulating virtual memory.
///
/// None of these are recovered from: page faults are the normal control flow,
/// these are the conditions that end the side that observed them.
#[derive(Error, Debug)]
pub enum VMemError {
    /// logical address outside of `[0, size)`
    #[error("address {address} is outside of the virtual address space [0, {size})")]
    AddressOutOfRange { address: usize, size: usize },

    /// seek, read or write of the pagefile failed or was short
    #[error("backing store I/O failed for page {page}: {source}")]
    BackingStoreIo {
        page: usize,
        #[source]
        source: io::Error,
    },

    /// shared region, channels, pagefile or fault log could not be created
    #[error("could not initialize {resource}: {source}")]
    ResourceInit {
        resource: &'static str,
        #[source]
        source: io::Error,
    },

    /// page table and frame table disagree
    #[error("page table invariant violated: {0}")]
    InvariantViolation(String),

    /// the shared region was locked although the other side should be idle
    #[error("shared region is locked by the other side")]
    SharedRegionBusy,

    #[error("could not write fault log: {0}")]
    FaultLog(#[source] io::Error),

    #[error("memory manager terminated")]
    ManagerTerminated,

    #[error("unknown page replacement algorithm `{0}`, expected one of FIFO, LRU, CLOCK")]
    UnknownAlgorithm(String),
}

impl VMemError {
    pub(crate) fn resource_init(resource: &'static str, reason: &str) -> Self {
        Self::ResourceInit {
            resource,
            source: io::Error::new(io::ErrorKind::InvalidInput, reason.to_string()),
        }
    }
}
