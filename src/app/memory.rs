// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Access to application-owned memory.
//!
//! [`CallerPtr`] is the only type in the crate that dereferences pointers
//! handed in by the application. Creating one is `unsafe`; every access after
//! that goes through the bounded, closure-scoped helpers below so conversion
//! code only ever sees ordinary slices.

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;

/// Pointer into application memory, possibly null.
pub struct CallerPtr<T> {
    ptr: *mut T,
    _marker: PhantomData<*mut T>,
}

impl<T> Clone for CallerPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CallerPtr<T> {}

impl<T> PartialEq for CallerPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for CallerPtr<T> {}

impl<T> fmt::Debug for CallerPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallerPtr({:p})", self.ptr)
    }
}

impl<T> Default for CallerPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> CallerPtr<T> {
    pub const fn null() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            _marker: PhantomData,
        }
    }

    /// Wrap an application pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or valid for reads and writes of every element the
    /// driver will address through it (including bind offsets and rowset
    /// strides) for as long as the pointer stays bound to a statement or
    /// descriptor.
    pub unsafe fn new(ptr: *mut T) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    pub fn as_ptr(&self) -> *mut T {
        self.ptr
    }

    /// Reinterpret as a pointer to another element type.
    pub fn cast<U>(self) -> CallerPtr<U> {
        CallerPtr {
            ptr: self.ptr.cast(),
            _marker: PhantomData,
        }
    }

    /// Advance by a byte count. Null stays null.
    pub(crate) fn byte_offset(self, bytes: isize) -> Self {
        if self.is_null() {
            return self;
        }
        Self {
            ptr: self.ptr.cast::<u8>().wrapping_offset(bytes).cast(),
            _marker: PhantomData,
        }
    }

    /// Advance by whole elements. Null stays null.
    pub(crate) fn element_offset(self, count: usize) -> Self {
        if self.is_null() {
            return self;
        }
        Self {
            ptr: self.ptr.wrapping_add(count),
            _marker: PhantomData,
        }
    }
}

impl<T: Copy> CallerPtr<T> {
    pub(crate) fn read(&self) -> Option<T> {
        if self.is_null() {
            return None;
        }
        // SAFETY: non-null and valid per the `new` contract; caller memory
        // carries no alignment guarantee, hence the unaligned read.
        Some(unsafe { self.ptr.read_unaligned() })
    }

    /// Write a value; returns `false` when the pointer is null.
    pub(crate) fn write(&self, value: T) -> bool {
        if self.is_null() {
            return false;
        }
        // SAFETY: see `read`.
        unsafe { self.ptr.write_unaligned(value) };
        true
    }

    pub(crate) fn write_at(&self, index: usize, value: T) -> bool {
        self.element_offset(index).write(value)
    }
}

impl CallerPtr<u8> {
    /// Run `f` over `len` bytes of caller memory; `None` when null.
    pub(crate) fn with_slice_mut<R>(&self, len: usize, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
        if self.is_null() {
            return None;
        }
        // SAFETY: the region is valid for `len` bytes per the `new` contract
        // and the borrow does not outlive the closure.
        let slice = unsafe { std::slice::from_raw_parts_mut(self.ptr, len) };
        Some(f(slice))
    }

    pub(crate) fn with_slice<R>(&self, len: usize, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        if self.is_null() {
            return None;
        }
        // SAFETY: as for `with_slice_mut`.
        let slice = unsafe { std::slice::from_raw_parts(self.ptr, len) };
        Some(f(slice))
    }

    /// Length of a null-terminated string of `unit`-byte code units, scanning
    /// at most `max_units` units.
    pub(crate) fn terminated_len(&self, unit: usize, max_units: usize) -> usize {
        let mut count = 0;
        while count < max_units {
            let at = self.byte_offset((count * unit) as isize);
            let terminated = at
                .with_slice(unit, |bytes| bytes.iter().all(|b| *b == 0))
                .unwrap_or(true);
            if terminated {
                break;
            }
            count += 1;
        }
        count
    }
}

impl CallerPtr<c_void> {
    pub fn bytes(self) -> CallerPtr<u8> {
        self.cast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_pointer_is_inert() {
        let ptr: CallerPtr<isize> = CallerPtr::null();
        assert!(ptr.is_null());
        assert_eq!(ptr.read(), None);
        assert!(!ptr.write(5));
        assert!(ptr.byte_offset(16).is_null());
    }

    #[test]
    fn test_write_at_strides_elements() {
        let mut statuses = [0u16; 4];
        let ptr = unsafe { CallerPtr::new(statuses.as_mut_ptr()) };
        assert!(ptr.write_at(2, 7));
        assert_eq!(statuses, [0, 0, 7, 0]);
    }

    #[test]
    fn test_terminated_len() {
        let mut text = *b"abc\0zzz";
        let ptr = unsafe { CallerPtr::new(text.as_mut_ptr()) };
        assert_eq!(ptr.terminated_len(1, text.len()), 3);
        assert_eq!(ptr.terminated_len(1, 2), 2);
    }
}
