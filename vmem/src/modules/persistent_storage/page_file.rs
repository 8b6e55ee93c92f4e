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

use core::mem::size_of;

use log::trace;

use super::PersistentStorageModule;
use crate::VMemError;

/// Size in bytes of one item in the pagefile
pub const ITEM_SIZE: usize = size_of::<i32>();

/// Item every page is filled with when the pagefile is created
const PLACEHOLDER_ITEM: i32 = 0;

/// Page indexed view on a storage module: the backing store of the virtual memory.
///
/// Page `n` is located at byte offset `n * PAGE_SIZE * ITEM_SIZE`, items are stored native-endian.
pub struct PageFile<S: PersistentStorageModule, const PAGE_SIZE: usize> {
    storage: S,
    pages: usize,

    /// byte buffer for exactly one page
    buffer: Vec<u8>,
}

impl<S: PersistentStorageModule, const PAGE_SIZE: usize> PageFile<S, PAGE_SIZE> {
    pub const PAGE_BYTES: usize = PAGE_SIZE * ITEM_SIZE;

    /// Initializes the pagefile by writing placeholder items to each of the `pages` pages.
    ///
    /// This is destructive, previous contents of `storage` are overwritten.
    pub fn new(storage: S, pages: usize) -> Result<Self, VMemError> {
        let required = pages * Self::PAGE_BYTES;
        if storage.get_max_size() < required {
            return Err(VMemError::resource_init(
                "pagefile",
                &format!(
                    "storage holds {} bytes but {} pages need {} bytes",
                    storage.get_max_size(),
                    pages,
                    required
                ),
            ));
        }

        let mut page_file = Self {
            storage,
            pages,
            buffer: vec![0u8; Self::PAGE_BYTES],
        };

        let placeholder = [PLACEHOLDER_ITEM; PAGE_SIZE];
        for page in 0..pages {
            page_file
                .store(page, &placeholder)
                .map_err(|err| match err {
                    VMemError::BackingStoreIo { source, .. } => VMemError::ResourceInit {
                        resource: "pagefile",
                        source,
                    },
                    other => other,
                })?;
        }

        page_file
            .storage
            .flush()
            .map_err(|source| VMemError::ResourceInit {
                resource: "pagefile",
                source,
            })?;

        Ok(page_file)
    }

    #[inline]
    /// Writes the items of `data` to the location of `page`
    pub fn store(&mut self, page: usize, data: &[i32; PAGE_SIZE]) -> Result<(), VMemError> {
        debug_assert!(page < self.pages, "page {} is not part of the pagefile", page);
        trace!("storing page {}", page);

        for (item, chunk) in data.iter().zip(self.buffer.chunks_exact_mut(ITEM_SIZE)) {
            chunk.copy_from_slice(&item.to_ne_bytes());
        }

        self.storage
            .write(page * Self::PAGE_BYTES, &self.buffer)
            .map_err(|source| VMemError::BackingStoreIo { page, source })
    }

    /// Reads the items of `page` into `data`
    pub fn load(&mut self, page: usize, data: &mut [i32; PAGE_SIZE]) -> Result<(), VMemError> {
        debug_assert!(page < self.pages, "page {} is not part of the pagefile", page);
        trace!("loading page {}", page);

        self.storage
            .read(page * Self::PAGE_BYTES, &mut self.buffer)
            .map_err(|source| VMemError::BackingStoreIo { page, source })?;

        for (item, chunk) in data.iter_mut().zip(self.buffer.chunks_exact(ITEM_SIZE)) {
            let mut bytes = [0u8; ITEM_SIZE];
            bytes.copy_from_slice(chunk);
            *item = i32::from_ne_bytes(bytes);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{PageFile, ITEM_SIZE};
    use crate::{
        modules::persistent_storage::test::{get_test_storage, FailingStorageModule},
        VMemError,
    };

    #[test]
    fn test_page_file_keeps_pages_apart() {
        let storage = get_test_storage("test_page_file_keeps_pages_apart", 16 * 4 * ITEM_SIZE);
        let mut page_file: PageFile<_, 4> = PageFile::new(storage, 16).unwrap();

        let mut data = [0; 4];
        page_file.load(9, &mut data).unwrap();
        assert_eq!(data, [0; 4], "fresh pagefile should only contain placeholders");

        page_file.store(3, &[1, -2, 3, i32::MAX]).unwrap();
        page_file.store(4, &[5, 6, 7, i32::MIN]).unwrap();

        page_file.load(3, &mut data).unwrap();
        assert_eq!(data, [1, -2, 3, i32::MAX]);
        page_file.load(4, &mut data).unwrap();
        assert_eq!(data, [5, 6, 7, i32::MIN]);
        page_file.load(2, &mut data).unwrap();
        assert_eq!(data, [0; 4]);
    }

    #[test]
    fn test_page_file_too_small() {
        let storage = get_test_storage("test_page_file_too_small", 10 * 4 * ITEM_SIZE);
        let res: Result<PageFile<_, 4>, _> = PageFile::new(storage, 16);
        assert!(matches!(res, Err(VMemError::ResourceInit { .. })));
    }

    #[test]
    fn test_page_file_reports_failed_store() {
        let storage = FailingStorageModule {
            inner: get_test_storage("test_page_file_reports_failed_store", 8 * 2 * ITEM_SIZE),
            writes_left: 8,
            reads_left: usize::MAX,
        };
        let mut page_file: PageFile<_, 2> = PageFile::new(storage, 8).unwrap();

        match page_file.store(6, &[1, 2]) {
            Err(VMemError::BackingStoreIo { page, .. }) => assert_eq!(page, 6),
            other => panic!("expected backing store error, got {:?}", other),
        }
    }

    #[test]
    fn test_page_file_reports_failed_load() {
        let storage = FailingStorageModule {
            inner: get_test_storage("test_page_file_reports_failed_load", 8 * 2 * ITEM_SIZE),
            writes_left: usize::MAX,
            reads_left: 0,
        };
        let mut page_file: PageFile<_, 2> = PageFile::new(storage, 8).unwrap();

        let mut data = [5; 2];
        match page_file.load(3, &mut data) {
            Err(VMemError::BackingStoreIo { page, .. }) => assert_eq!(page, 3),
            other => panic!("expected backing store error, got {:?}", other),
        }
    }
}
