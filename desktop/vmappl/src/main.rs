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

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use env_logger::{Builder, Env};
use log::error;
use vmem::{
    modules::{
        page_replacement::ReplacementAlgorithm,
        persistent_storage::{FilePersistentStorageModule, ITEM_SIZE},
    },
    workload::SortWorkload,
    DefaultMemoryManager, MemoryManager, VMemConfig, VMemError, MMANAGE_LOGFNAME, MMANAGE_PFNAME,
    VMEM_VIRTMEMSIZE,
};

/// Sorts pseudo-random numbers inside the simulated virtual memory
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Page replacement algorithm: FIFO, LRU or CLOCK
    #[arg(short, long, default_value = "FIFO")]
    algorithm: ReplacementAlgorithm,

    /// Backing store of the virtual memory, recreated on every start
    #[arg(long, default_value = MMANAGE_PFNAME)]
    pagefile: String,

    /// One record per page fault is appended here
    #[arg(long, default_value = MMANAGE_LOGFNAME)]
    logfile: PathBuf,

    /// Deletes the pagefile on exit instead of leaving it for inspection
    #[arg(long)]
    remove_pagefile: bool,

    /// Number of items to sort
    #[arg(long, default_value_t = vmem::workload::LENGTH)]
    length: usize,
}

fn main() -> ExitCode {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Warn)
        .format_module_path(false)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), VMemError> {
    let mut storage =
        FilePersistentStorageModule::new(args.pagefile, VMEM_VIRTMEMSIZE * ITEM_SIZE).map_err(
            |source| VMemError::ResourceInit {
                resource: "pagefile",
                source,
            },
        )?;
    if !args.remove_pagefile {
        storage = storage.keep_file();
    }
    let config = VMemConfig {
        logfile_path: Some(args.logfile),
        ..VMemConfig::default()
    };

    let manager: DefaultMemoryManager<_> = MemoryManager::new(storage, &config, args.algorithm)?;
    println!("Using {} page replacement", manager.algorithm());

    // dropping `vmem` on an error shuts the memory manager down
    let mut vmem = manager.start()?;
    let workload = SortWorkload {
        length: args.length,
        ..SortWorkload::default()
    };

    workload.init_data(&mut vmem)?;

    println!("\nUnsorted:");
    println!("{}", workload.display_data(&mut vmem)?);

    println!("\nSorting:");
    workload.sort(&mut vmem)?;

    println!("\nSorted:");
    println!("{}", workload.display_data(&mut vmem)?);

    let stats = vmem.stats()?;
    println!(
        "\n{} page faults in {} accesses",
        stats.page_faults, stats.accesses
    );

    vmem.dump()?;
    vmem.teardown()
}
