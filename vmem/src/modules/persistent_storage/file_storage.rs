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

use std::{
    fs::{remove_file, File},
    io::{self, Read, Seek, SeekFrom, Write},
    mem::ManuallyDrop,
    path::Path,
};

use super::PersistentStorageModule;

pub struct FilePersistentStorageModule {
    /// underlying file
    file: ManuallyDrop<File>,

    /// path of file, save for deleting file later
    file_path: String,

    /// cached file size, so no `metadata` call necessary
    file_size: usize,

    /// file is deleted on drop unless this is set
    keep_file: bool,
}

impl FilePersistentStorageModule {
    /// Creates a new storage file of `size` bytes.
    ///
    /// An existing file at `filepath` is truncated, its previous contents are lost.
    pub fn new(filepath: String, size: usize) -> io::Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .truncate(true)
            .create(true)
            .open(filepath.clone())?;

        file.set_len(size as u64)?;

        Ok(Self {
            file: ManuallyDrop::new(file),
            file_path: filepath,
            file_size: size,
            keep_file: false,
        })
    }

    /// Leaves the file on disk once this module is dropped
    pub fn keep_file(mut self) -> Self {
        self.keep_file = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }

    fn check_bounds(&self, offset: usize, len: usize) -> io::Result<()> {
        if offset + len > self.file_size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "illegal access, offset: {}, len: {}, file_size: {}",
                    offset, len, self.file_size
                ),
            ));
        }

        Ok(())
    }
}

impl PersistentStorageModule for FilePersistentStorageModule {
    fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()> {
        self.check_bounds(offset, dest.len())?;

        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(dest)
    }

    fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()> {
        self.check_bounds(offset, src.len())?;

        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(src)
    }

    fn get_max_size(&self) -> usize {
        self.file_size
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for FilePersistentStorageModule {
    fn drop(&mut self) {
        // drop and close file before removing
        // note that after this call, file should never be accessed again...
        unsafe {
            ManuallyDrop::drop(&mut self.file);
        }

        if !self.keep_file && Path::new(self.file_path.as_str()).exists() {
            let _ = remove_file(self.file_path.as_str());
        }
    }
}
