//! Client workloads that only use [`VirtualMemory::read`] and [`VirtualMemory::write`].

use core::fmt::Write as _;

use rand::{rngs::SmallRng, RngCore, SeedableRng};

use crate::{VMemError, VirtualMemory};

pub const SEED: u64 = 161114;
pub const LENGTH: usize = 550;
pub const RNDMOD: u32 = 1000;
pub const NDISPLAYCOLS: usize = 8;

/// Fills, displays and sorts `length` items starting at address 0
pub struct SortWorkload {
    pub length: usize,
    pub seed: u64,
}

impl Default for SortWorkload {
    fn default() -> Self {
        Self {
            length: LENGTH,
            seed: SEED,
        }
    }
}

impl SortWorkload {
    /// Fills memory with pseudo-random data
    pub fn init_data<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError> {
        let mut rand = SmallRng::seed_from_u64(self.seed);

        for i in 0..self.length {
            let val = (rand.next_u32() % RNDMOD) as i32;
            vmem.write(i, val)?;
        }

        Ok(())
    }

    /// Formats all items, `NDISPLAYCOLS` per line
    pub fn display_data<V: VirtualMemory>(&self, vmem: &mut V) -> Result<String, VMemError> {
        let mut out = String::new();

        for i in 0..self.length {
            let _ = write!(out, "{:10}", vmem.read(i)?);
            out.push(if (i + 1) % NDISPLAYCOLS == 0 { '\n' } else { ' ' });
        }

        Ok(out)
    }

    pub fn sort<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError> {
        if self.length == 0 {
            return Ok(());
        }

        quicksort(vmem, 0, self.length as isize - 1)
    }

    pub fn run<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError> {
        self.init_data(vmem)?;
        self.sort(vmem)
    }
}

fn quicksort<V: VirtualMemory>(vmem: &mut V, l: isize, r: isize) -> Result<(), VMemError> {
    if l >= r {
        return Ok(());
    }

    let mut i = l;
    let mut j = r - 1;
    loop {
        // put all elements < [r] to the left
        while vmem.read(i as usize)? < vmem.read(r as usize)? {
            i += 1;
        }
        while j > l && vmem.read(j as usize)? >= vmem.read(r as usize)? {
            j -= 1;
        }
        if i >= j {
            break;
        }
        swap(vmem, i as usize, j as usize)?;
    }

    // put reference element to the boundary
    swap(vmem, i as usize, r as usize)?;

    quicksort(vmem, l, i - 1)?;
    quicksort(vmem, i + 1, r)
}

fn swap<V: VirtualMemory>(vmem: &mut V, addr1: usize, addr2: usize) -> Result<(), VMemError> {
    let tmp = vmem.read(addr1)?;
    let other = vmem.read(addr2)?;
    vmem.write(addr1, other)?;
    vmem.write(addr2, tmp)
}

/// Writes one item per page, walking the first `pages` pages in ascending order
pub struct SequentialWalk {
    pub pages: usize,
    pub page_size: usize,
    pub rounds: usize,
}

impl SequentialWalk {
    pub fn run<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError> {
        for round in 0..self.rounds {
            for page in 0..self.pages {
                vmem.write(page * self.page_size, (round * self.pages + page) as i32)?;
            }
        }

        Ok(())
    }
}

/// Random accesses where most of them hit a small, slowly moving window
pub struct LocalityLoop {
    pub accesses: usize,
    pub window: usize,
    pub seed: u64,
}

impl LocalityLoop {
    pub fn run<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError> {
        let size = vmem.size();
        let window = self.window.clamp(1, size);
        let mut rand = SmallRng::seed_from_u64(self.seed);
        let mut base = 0;

        for i in 0..self.accesses {
            if rand.next_u32() % 10 == 0 {
                // jump somewhere else
                let address = rand.next_u32() as usize % size;
                vmem.read(address)?;
            } else {
                let address = (base + rand.next_u32() as usize % window) % size;
                if i % 3 == 0 {
                    vmem.write(address, i as i32)?;
                } else {
                    vmem.read(address)?;
                }
            }

            if i % 64 == 63 {
                base = (base + window / 4 + 1) % size;
            }
        }

        Ok(())
    }
}
