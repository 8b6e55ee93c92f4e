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

use core::{
    mem::{align_of, size_of},
    ops::{Deref, DerefMut},
    ptr::{null_mut, NonNull},
};
use std::io;

use libc::{c_void, mmap, munmap, MAP_ANONYMOUS, MAP_FAILED, MAP_SHARED, PROT_READ, PROT_WRITE};
use log::error;

use super::{ceil_div, get_page_size};
use crate::VMemError;

/// Owns a value of type `T` that lives inside its own shared memory mapping.
///
/// The mapping is `MAP_SHARED`, so it stays shared with children forked after its creation.
/// Dropping the guard drops `T` in place and unmaps the region.
pub(crate) struct MMapGuard<T> {
    inner: NonNull<T>,
    size: usize,
}

impl<T> MMapGuard<T> {
    /// Maps a new region with a multiple of `get_page_size()` bytes and moves `data` to the start of it.
    pub(crate) fn new(data: T) -> Result<Self, VMemError> {
        let page_size = get_page_size();
        debug_assert!(align_of::<T>() <= page_size, "T needs a bigger alignment than a page!");

        let mmap_size = ceil_div(size_of::<T>().max(1), page_size) * page_size;

        let base_ptr = unsafe {
            mmap(
                null_mut(),
                mmap_size,
                PROT_READ | PROT_WRITE,
                MAP_SHARED | MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if base_ptr == MAP_FAILED {
            return Err(VMemError::ResourceInit {
                resource: "shared region",
                source: io::Error::last_os_error(),
            });
        }

        let inner = match NonNull::new(base_ptr as *mut T) {
            Some(inner) => inner,
            None => {
                return Err(VMemError::resource_init(
                    "shared region",
                    "mmap returned a null pointer",
                ))
            }
        };

        unsafe { core::ptr::write(inner.as_ptr(), data) };

        Ok(Self {
            inner,
            size: mmap_size,
        })
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }
}

impl<T> Deref for MMapGuard<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { self.inner.as_ref() }
    }
}

impl<T> DerefMut for MMapGuard<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { self.inner.as_mut() }
    }
}

impl<T> Drop for MMapGuard<T> {
    fn drop(&mut self) {
        let ptr = self.inner.as_ptr();

        unsafe {
            core::ptr::drop_in_place(ptr);
        }

        // dropped all values, now unmap region
        let code = unsafe { munmap(ptr as *mut c_void, self.size) };

        if code != 0 {
            error!("Could not unmap shared region: {}", io::Error::last_os_error());
        }
    }
}

// the guard owns its `T` just like a `Box` would
unsafe impl<T: Send> Send for MMapGuard<T> {}
unsafe impl<T: Sync> Sync for MMapGuard<T> {}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::MMapGuard;
    use crate::util::get_page_size;

    static DROPPED: AtomicUsize = AtomicUsize::new(0);

    struct DropCounter([u32; 2000]);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            DROPPED.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_mmap_guard_lifecycle() {
        let mut guard = MMapGuard::new(DropCounter([7; 2000])).unwrap();
        assert_eq!(guard.size() % get_page_size(), 0);
        assert!(guard.size() >= 2000 * 4);

        assert!(guard.0.iter().all(|x| *x == 7));
        guard.0[1999] = 3;
        assert_eq!(guard.0[1999], 3);

        drop(guard);
        assert_eq!(DROPPED.load(Ordering::SeqCst), 1);
    }
}
