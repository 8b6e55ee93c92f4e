mod clock;
mod fifo;
mod lru;

use core::{fmt, str::FromStr};

pub use clock::ClockReplacementModule;
pub use fifo::FifoReplacementModule;
pub use lru::LruReplacementModule;

use crate::{PageTable, VMemError};

pub trait PageReplacementModule {
    fn name(&self) -> &'static str;

    /// Selects the frame whose occupant will be evicted next.
    ///
    /// This is only called if every frame is occupied.
    /// Modules may update replacement metadata of the page table (e.g. the `used` bits).
    fn select_victim<const PAGES: usize, const FRAMES: usize>(
        &mut self,
        page_table: &mut PageTable<PAGES, FRAMES>,
    ) -> usize;
}

/// Page replacement algorithms that can be selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementAlgorithm {
    #[default]
    Fifo,
    Lru,
    Clock,
}

impl ReplacementAlgorithm {
    pub const ALL: [ReplacementAlgorithm; 3] = [Self::Fifo, Self::Lru, Self::Clock];
}

impl FromStr for ReplacementAlgorithm {
    type Err = VMemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIFO" => Ok(Self::Fifo),
            "LRU" => Ok(Self::Lru),
            "CLOCK" => Ok(Self::Clock),
            _ => Err(VMemError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for ReplacementAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fifo => "FIFO",
            Self::Lru => "LRU",
            Self::Clock => "CLOCK",
        };
        f.write_str(name)
    }
}

/// The replacement module chosen at runtime
#[derive(Debug, Clone)]
pub enum PageReplacement {
    Fifo(FifoReplacementModule),
    Lru(LruReplacementModule),
    Clock(ClockReplacementModule),
}

impl PageReplacement {
    pub fn new(algorithm: ReplacementAlgorithm) -> Self {
        match algorithm {
            ReplacementAlgorithm::Fifo => Self::Fifo(FifoReplacementModule::new()),
            ReplacementAlgorithm::Lru => Self::Lru(LruReplacementModule::new()),
            ReplacementAlgorithm::Clock => Self::Clock(ClockReplacementModule::new()),
        }
    }

    pub fn algorithm(&self) -> ReplacementAlgorithm {
        match self {
            Self::Fifo(_) => ReplacementAlgorithm::Fifo,
            Self::Lru(_) => ReplacementAlgorithm::Lru,
            Self::Clock(_) => ReplacementAlgorithm::Clock,
        }
    }
}

impl PageReplacementModule for PageReplacement {
    fn name(&self) -> &'static str {
        match self {
            Self::Fifo(module) => module.name(),
            Self::Lru(module) => module.name(),
            Self::Clock(module) => module.name(),
        }
    }

    fn select_victim<const PAGES: usize, const FRAMES: usize>(
        &mut self,
        page_table: &mut PageTable<PAGES, FRAMES>,
    ) -> usize {
        match self {
            Self::Fifo(module) => module.select_victim(page_table),
            Self::Lru(module) => module.select_victim(page_table),
            Self::Clock(module) => module.select_victim(page_table),
        }
    }
}

/// Result of asking for a frame to load a page into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameAllocation {
    pub(crate) frame: usize,

    /// page that has to be evicted from `frame` first
    pub(crate) victim: Option<usize>,
}

/// Prefers free frames, only asks `replacement` for a victim if every frame is occupied.
pub(crate) fn allocate_frame<R: PageReplacementModule, const PAGES: usize, const FRAMES: usize>(
    replacement: &mut R,
    page_table: &mut PageTable<PAGES, FRAMES>,
) -> FrameAllocation {
    if let Some(frame) = page_table.free_frame() {
        return FrameAllocation {
            frame,
            victim: None,
        };
    }

    let frame = replacement.select_victim(page_table);
    FrameAllocation {
        frame,
        victim: page_table.occupant(frame),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::{allocate_frame, PageReplacement, PageReplacementModule, ReplacementAlgorithm};
    use crate::PageTable;

    /// Page table with page `i + offset` in frame `i` and `last_used = i + 1`
    pub(crate) fn full_page_table<const PAGES: usize, const FRAMES: usize>(
        offset: usize,
    ) -> PageTable<PAGES, FRAMES> {
        let mut table = PageTable::new();
        for frame in 0..FRAMES {
            table.mark_present(frame + offset, frame);
            table.entry_mut(frame + offset).last_used = frame as u64 + 1;
        }
        table
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("FIFO".parse::<ReplacementAlgorithm>().unwrap(), ReplacementAlgorithm::Fifo);
        assert_eq!("lru".parse::<ReplacementAlgorithm>().unwrap(), ReplacementAlgorithm::Lru);
        assert_eq!("Clock".parse::<ReplacementAlgorithm>().unwrap(), ReplacementAlgorithm::Clock);
        assert!("OPT".parse::<ReplacementAlgorithm>().is_err());

        for algorithm in ReplacementAlgorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<ReplacementAlgorithm>().unwrap(), algorithm);
            let replacement = PageReplacement::new(algorithm);
            assert_eq!(replacement.algorithm(), algorithm);
            assert_eq!(replacement.name(), algorithm.to_string());
        }
    }

    #[test]
    fn test_allocate_prefers_free_frames() {
        let mut replacement = PageReplacement::new(ReplacementAlgorithm::Fifo);
        let mut table: PageTable<8, 4> = PageTable::new();
        table.mark_present(2, 0);
        table.mark_present(6, 1);
        table.mark_present(7, 3);

        let allocation = allocate_frame(&mut replacement, &mut table);
        assert_eq!(allocation.frame, 2);
        assert_eq!(allocation.victim, None);

        table.mark_present(1, 2);
        let allocation = allocate_frame(&mut replacement, &mut table);
        assert_eq!(allocation.frame, 0);
        assert_eq!(allocation.victim, Some(2));
    }
}
