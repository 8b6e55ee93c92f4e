use std::io::stdout;

use serde::Serialize;

use crate::{
    modules::{page_replacement::ReplacementAlgorithm, persistent_storage::PersistentStorageModule},
    workload::{LocalityLoop, SequentialWalk, SortWorkload},
    MemoryManager, VMemConfig, VMemError, VMemStats, VirtualMemory,
};

/// A client workload that can be run against the virtual memory
pub trait Benchmark {
    fn get_name(&self) -> &'static str;

    fn execute<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError>;
}

impl Benchmark for SortWorkload {
    fn get_name(&self) -> &'static str {
        "sort"
    }

    fn execute<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError> {
        self.run(vmem)
    }
}

impl Benchmark for SequentialWalk {
    fn get_name(&self) -> &'static str {
        "sequential_walk"
    }

    fn execute<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError> {
        self.run(vmem)
    }
}

impl Benchmark for LocalityLoop {
    fn get_name(&self) -> &'static str {
        "locality_loop"
    }

    fn execute<V: VirtualMemory>(&self, vmem: &mut V) -> Result<(), VMemError> {
        self.run(vmem)
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct BenchmarkRunInfo {
    pub bench_name: &'static str,
    pub algorithm: String,
    pub pages: usize,
    pub frames: usize,
    pub page_size: usize,
    pub page_faults: u64,
    pub accesses: u64,
}

impl BenchmarkRunInfo {
    pub fn fault_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.page_faults as f64 / self.accesses as f64
        }
    }
}

/// Runs `benchmark` once under `algorithm` on a fresh memory manager.
pub fn run_benchmark<
    B: Benchmark,
    S: PersistentStorageModule + Send + 'static,
    const PAGES: usize,
    const FRAMES: usize,
    const PAGE_SIZE: usize,
>(
    benchmark: &B,
    storage: S,
    algorithm: ReplacementAlgorithm,
) -> Result<BenchmarkRunInfo, VMemError> {
    let config = VMemConfig {
        logfile_path: None,
        check_consistency: false,
    };
    let manager: MemoryManager<S, PAGES, FRAMES, PAGE_SIZE> =
        MemoryManager::new(storage, &config, algorithm)?;
    let mut vmem = manager.start()?;

    benchmark.execute(&mut vmem)?;
    let VMemStats {
        page_faults,
        accesses,
    } = vmem.stats()?;
    vmem.teardown()?;

    Ok(BenchmarkRunInfo {
        bench_name: benchmark.get_name(),
        algorithm: algorithm.to_string(),
        pages: PAGES,
        frames: FRAMES,
        page_size: PAGE_SIZE,
        page_faults,
        accesses,
    })
}

/// Runs all workloads with all replacement algorithms and prints one result line per run.
///
/// `get_storage` is called once per run and has to return a fresh storage module.
pub fn run_all_benchmarks<
    S: PersistentStorageModule + Send + 'static,
    F: Fn(&str) -> Result<S, VMemError>,
    const PAGES: usize,
    const FRAMES: usize,
    const PAGE_SIZE: usize,
>(
    get_storage: F,
) -> Result<Vec<BenchmarkRunInfo>, VMemError> {
    let sort = SortWorkload::default();
    let walk = SequentialWalk {
        pages: (FRAMES + FRAMES / 2).min(PAGES),
        page_size: PAGE_SIZE,
        rounds: 8,
    };
    let locality = LocalityLoop {
        accesses: 20_000,
        window: FRAMES * PAGE_SIZE / 2,
        seed: 5446535461589659585,
    };

    let mut results = vec![];
    for algorithm in ReplacementAlgorithm::ALL {
        macro_rules! run {
            ($bench: expr) => {
                let storage = get_storage($bench.get_name())?;
                let info = run_benchmark::<_, S, PAGES, FRAMES, PAGE_SIZE>(&$bench, storage, algorithm)?;
                print_run_info(&info);
                results.push(info);
            };
        }

        run!(sort);
        run!(walk);
        run!(locality);
    }

    Ok(results)
}

fn print_run_info(info: &BenchmarkRunInfo) {
    print!("[BENCH-INFO] ");
    if let Err(err) = serde_json::to_writer(stdout(), info) {
        log::error!("could not serialize benchmark result: {}", err);
    }
    println!();

    println!(
        "-> Finished {} with {}: page_faults={}, accesses={}, fault_rate={:.4}",
        info.bench_name,
        info.algorithm,
        info.page_faults,
        info.accesses,
        info.fault_rate()
    );
}
