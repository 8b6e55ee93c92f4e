mod file_storage;
mod page_file;

use std::io;

pub use file_storage::FilePersistentStorageModule;
pub use page_file::{PageFile, ITEM_SIZE};

pub trait PersistentStorageModule {
    /// Reads a region `[offset, offset + dest.len())` to a storage location `dest` that is at least `dest.len()` bytes big.
    ///
    /// If this call fails, it could be that already some data was written to `dest`.
    /// A short read is an error.
    fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()>;

    /// Returns the maximum size in bytes of this storage
    fn get_max_size(&self) -> usize;

    /// Writes the region `src` back to the underlying storage `[offset, offset + src.len())`
    ///
    /// A short write is an error.
    fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()>;

    /// Makes sure all previous writes reached the underlying storage
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::io;

    use super::{FilePersistentStorageModule, PersistentStorageModule};

    pub(crate) fn get_test_storage(test_name: &str, size: usize) -> FilePersistentStorageModule {
        FilePersistentStorageModule::new(format!("/tmp/{}.tmp", test_name), size).unwrap()
    }

    /// Storage that starts failing once a given number of writes or reads went through
    pub(crate) struct FailingStorageModule<S: PersistentStorageModule> {
        pub(crate) inner: S,
        pub(crate) writes_left: usize,
        pub(crate) reads_left: usize,
    }

    impl<S: PersistentStorageModule> PersistentStorageModule for FailingStorageModule<S> {
        fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()> {
            if self.reads_left == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "storage is unreadable"));
            }

            self.reads_left -= 1;
            self.inner.read(offset, dest)
        }

        fn get_max_size(&self) -> usize {
            self.inner.get_max_size()
        }

        fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()> {
            if self.writes_left == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "storage is worn out"));
            }

            self.writes_left -= 1;
            self.inner.write(offset, src)
        }
    }

    fn gen_number(i: usize) -> u8 {
        (i * 3 + (i % 3) * 7 + (i % 11) * 51) as u8
    }

    pub(super) const PERSISTENT_STORAGE_NORMAL_TEST_SIZE: usize = 4096;

    /// test if write saves all data and read restores all of it
    pub(super) fn test_persistent_storage_normal<T: PersistentStorageModule>(mut module: T) {
        const SUB_TEST_SIZE: usize = PERSISTENT_STORAGE_NORMAL_TEST_SIZE / 32;

        // generate some random data
        let mut source_slice = [0u8; PERSISTENT_STORAGE_NORMAL_TEST_SIZE];
        for i in 0..PERSISTENT_STORAGE_NORMAL_TEST_SIZE {
            source_slice[i] = gen_number(i as usize);
        }

        let mut test_slice = [0u8; SUB_TEST_SIZE];

        for i in 0..PERSISTENT_STORAGE_NORMAL_TEST_SIZE / SUB_TEST_SIZE {
            let offset = i * SUB_TEST_SIZE;
            test_slice.copy_from_slice(&source_slice[offset..offset + SUB_TEST_SIZE]);

            module.write(offset, &test_slice).unwrap();
        }

        for i in 0..PERSISTENT_STORAGE_NORMAL_TEST_SIZE / SUB_TEST_SIZE {
            let offset = i * SUB_TEST_SIZE;
            module.read(offset, &mut test_slice).unwrap();

            for x in 0..SUB_TEST_SIZE {
                assert_eq!(test_slice[x], source_slice[offset + x]);
            }
        }
    }
}
