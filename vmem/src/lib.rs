mod error;
mod fault_log;
mod memory_manager;
mod page_table;
mod shared_vmem;
mod util;
mod vmem_access;
mod vmem_config;

pub mod modules;
pub mod workload;

#[cfg(test)]
mod test;

#[cfg(feature = "benchmarks")]
pub mod benchmarks;

pub use crate::error::VMemError;
pub use crate::fault_log::{FaultLogger, LogEvent};
pub use crate::memory_manager::{ManagerRequest, MemoryManager};
pub use crate::page_table::{PageTable, PageTableEntry};
pub use crate::shared_vmem::{AdministrationBlock, VMemSnapshot, VMemStats};
pub use crate::vmem_access::{VMemAccess, VirtualMemory};
pub use vmem_config::*;
