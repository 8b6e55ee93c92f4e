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

use std::{process::ExitCode, thread};

use clap::Parser;
use env_logger::{Builder, Env};
use log::error;
use vmem::{
    benchmarks::run_all_benchmarks,
    modules::persistent_storage::{FilePersistentStorageModule, ITEM_SIZE},
    VMemError, VMEM_NFRAMES, VMEM_NPAGES, VMEM_PAGESIZE, VMEM_VIRTMEMSIZE,
};

/// Compares the page replacement algorithms on several workloads
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory the pagefiles are created in
    #[arg(long, default_value = "/tmp")]
    storage_dir: String,
}

fn main() -> ExitCode {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Warn)
        .format_module_path(false)
        .init();

    let args = Args::parse();

    // avoid stack overflow, quicksort recurses through every access
    let builder = thread::Builder::new().stack_size(20 * 1024 * 1024);
    let handler = builder.spawn(move || {
        run_all_benchmarks::<_, _, VMEM_NPAGES, VMEM_NFRAMES, VMEM_PAGESIZE>(|bench_name| {
            FilePersistentStorageModule::new(
                format!("{}/vmem_benchmark_{}.data", args.storage_dir, bench_name),
                VMEM_VIRTMEMSIZE * ITEM_SIZE,
            )
            .map_err(|source| VMemError::ResourceInit {
                resource: "pagefile",
                source,
            })
        })
    });

    let res = match handler {
        Ok(handler) => handler.join(),
        Err(err) => {
            error!("could not start benchmark thread: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match res {
        Ok(Ok(_)) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            error!("benchmark failed: {}", err);
            ExitCode::FAILURE
        }
        Err(_) => {
            error!("benchmark thread panicked");
            ExitCode::FAILURE
        }
    }
}
