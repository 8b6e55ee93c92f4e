use rand::{rngs::SmallRng, RngCore, SeedableRng};

use super::{get_custom_test_vmem, get_test_vmem, test_config};
use crate::{
    modules::{
        page_replacement::ReplacementAlgorithm,
        persistent_storage::{test::get_test_storage, ITEM_SIZE},
    },
    VMEM_NFRAMES, VMEM_PAGESIZE, VMEM_VIRTMEMSIZE,
};

#[test]
fn test_read_after_write() {
    const SEED: u64 = 5446535461589659585;

    for algorithm in ReplacementAlgorithm::ALL {
        let test_name = format!("test_read_after_write_{}", algorithm);
        let mut vmem = get_test_vmem(&test_name, algorithm);
        let mut rand = SmallRng::seed_from_u64(SEED);
        let mut check_states = vec![0i32; VMEM_VIRTMEMSIZE];

        for i in 0..5_000 {
            let address = rand.next_u32() as usize % VMEM_VIRTMEMSIZE;

            if rand.next_u32() % 3 == 0 {
                let value = rand.next_u32() as i32;
                vmem.write(address, value).unwrap();
                check_states[address] = value;

                // write followed immediately by a read
                assert_eq!(vmem.read(address).unwrap(), value);
            } else {
                assert_eq!(
                    vmem.read(address).unwrap(),
                    check_states[address],
                    "{}: wrong value at address {} in iteration {}",
                    algorithm,
                    address,
                    i
                );
            }

            if i % 500 == 0 {
                vmem.snapshot().unwrap().check_consistency().unwrap();
            }
        }

        vmem.teardown().unwrap();
    }
}

#[test]
fn test_presence_and_conservation() {
    let mut vmem = get_test_vmem("test_presence_and_conservation", ReplacementAlgorithm::Clock);
    let mut rand = SmallRng::seed_from_u64(42);

    for _ in 0..2_000 {
        let address = rand.next_u32() as usize % VMEM_VIRTMEMSIZE;
        vmem.write(address, address as i32).unwrap();

        let snapshot = vmem.snapshot().unwrap();
        let table = &snapshot.page_table;

        for (page, entry) in table.entries().iter().enumerate() {
            if entry.present {
                let frame = entry.frame.unwrap();
                assert_eq!(table.occupant(frame), Some(page));
            } else {
                assert_eq!(entry.frame, None);
            }
        }
        for (frame, occupant) in table.frame_pages().iter().enumerate() {
            if let Some(page) = occupant {
                assert_eq!(table.frame_of(*page), Some(frame));
            }
        }

        let resident = table.entries().iter().filter(|e| e.present).count() * VMEM_PAGESIZE;
        let stored = table.entries().iter().filter(|e| !e.present).count() * VMEM_PAGESIZE;
        let occupied = table.frame_pages().iter().filter(|p| p.is_some()).count();
        assert!(occupied <= VMEM_NFRAMES);
        assert_eq!(resident, occupied * VMEM_PAGESIZE);
        assert_eq!(resident + stored, VMEM_VIRTMEMSIZE);
    }

    vmem.teardown().unwrap();
}

#[test]
fn test_fifo_evicts_first_allocated_frame() {
    let mut vmem = get_test_vmem("test_fifo_evicts_first_allocated_frame", ReplacementAlgorithm::Fifo);

    for page in 0..VMEM_NFRAMES {
        vmem.read(page * VMEM_PAGESIZE).unwrap();
    }

    // page 0 is the most recently used one now, FIFO does not care
    vmem.read(0).unwrap();
    vmem.read(VMEM_NFRAMES * VMEM_PAGESIZE).unwrap();

    let snapshot = vmem.snapshot().unwrap();
    assert!(!snapshot.page_table.is_present(0));
    assert_eq!(snapshot.page_table.occupant(0), Some(VMEM_NFRAMES));

    // next one replaces frame 1
    vmem.read((VMEM_NFRAMES + 1) * VMEM_PAGESIZE).unwrap();
    let snapshot = vmem.snapshot().unwrap();
    assert!(!snapshot.page_table.is_present(1));
    assert_eq!(snapshot.page_table.occupant(1), Some(VMEM_NFRAMES + 1));

    vmem.teardown().unwrap();
}

#[test]
fn test_lru_evicts_least_recently_used() {
    let mut vmem = get_test_vmem("test_lru_evicts_least_recently_used", ReplacementAlgorithm::Lru);

    for page in 0..VMEM_NFRAMES {
        vmem.read(page * VMEM_PAGESIZE).unwrap();
    }

    // touch every page except page 3 again, in increasing order
    for page in (0..VMEM_NFRAMES).filter(|page| *page != 3) {
        vmem.write(page * VMEM_PAGESIZE + 1, page as i32).unwrap();
    }

    vmem.read(VMEM_NFRAMES * VMEM_PAGESIZE).unwrap();
    let snapshot = vmem.snapshot().unwrap();
    assert!(!snapshot.page_table.is_present(3));
    assert_eq!(snapshot.page_table.frame_of(VMEM_NFRAMES), Some(3));

    // page 0 has the smallest timestamp now
    vmem.read((VMEM_NFRAMES + 1) * VMEM_PAGESIZE).unwrap();
    let snapshot = vmem.snapshot().unwrap();
    assert!(!snapshot.page_table.is_present(0));
    assert!((1..VMEM_NFRAMES).filter(|p| *p != 3).all(|p| snapshot.page_table.is_present(p)));

    vmem.teardown().unwrap();
}

#[test]
fn test_clock_with_all_pages_used() {
    let storage = get_test_storage("test_clock_with_all_pages_used", 8 * 2 * ITEM_SIZE);
    let mut vmem =
        get_custom_test_vmem::<_, 8, 3, 2>(storage, test_config(), ReplacementAlgorithm::Clock);

    // every resident page has its used bit set
    for page in 0..3 {
        vmem.write(page * 2, page as i32).unwrap();
    }
    assert!(vmem
        .snapshot()
        .unwrap()
        .page_table
        .entries()
        .iter()
        .take(3)
        .all(|e| e.used));

    // one full round clears every bit, then frame 0 is chosen
    vmem.read(3 * 2).unwrap();
    let snapshot = vmem.snapshot().unwrap();
    assert_eq!(snapshot.page_table.occupant(0), Some(3));
    assert!(!snapshot.page_table.entry(1).used);
    assert!(!snapshot.page_table.entry(2).used);

    // page 1 did not get a new chance, it goes next
    vmem.read(4 * 2).unwrap();
    assert_eq!(vmem.snapshot().unwrap().page_table.occupant(1), Some(4));
    assert_eq!(vmem.read(0).unwrap(), 0);
    assert_eq!(vmem.read(2).unwrap(), 1);

    vmem.teardown().unwrap();
}
