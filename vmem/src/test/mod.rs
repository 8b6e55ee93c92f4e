use crate::{
    modules::{
        page_replacement::ReplacementAlgorithm,
        persistent_storage::{test::get_test_storage, PersistentStorageModule, ITEM_SIZE},
    },
    DefaultMemoryManager, DefaultVMemAccess, MemoryManager, VMemAccess, VMemConfig,
    VMEM_VIRTMEMSIZE,
};

mod properties;

fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_config() -> VMemConfig {
    VMemConfig {
        logfile_path: None,
        check_consistency: true,
    }
}

/// Starts a memory manager with the default geometry and a pagefile at `/tmp/<test_name>.tmp`
pub(crate) fn get_test_vmem(test_name: &str, algorithm: ReplacementAlgorithm) -> DefaultVMemAccess {
    init_test_logger();

    let storage = get_test_storage(test_name, VMEM_VIRTMEMSIZE * ITEM_SIZE);
    let manager: DefaultMemoryManager<_> =
        MemoryManager::new(storage, &test_config(), algorithm).unwrap();

    manager.start().unwrap()
}

/// Starts a memory manager with a custom geometry on top of `storage`
pub(crate) fn get_custom_test_vmem<
    S: PersistentStorageModule + Send + 'static,
    const PAGES: usize,
    const FRAMES: usize,
    const PAGE_SIZE: usize,
>(
    storage: S,
    config: VMemConfig,
    algorithm: ReplacementAlgorithm,
) -> VMemAccess<PAGES, FRAMES, PAGE_SIZE> {
    init_test_logger();

    let manager: MemoryManager<S, PAGES, FRAMES, PAGE_SIZE> =
        MemoryManager::new(storage, &config, algorithm).unwrap();

    manager.start().unwrap()
}
