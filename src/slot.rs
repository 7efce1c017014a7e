use core::ptr::{self, NonNull};

use crate::alloc::boxed::Box;

/// A heap allocation obtained from the Rust global allocator, or nothing.
///
/// Usage model is to treat this type as if it were an `Option<NonNull<T>>`.
///
/// Dropping the slot itself only drops the pointer, not the thing it points to.
/// To drop the value within and free the allocation, `release()` must be called explicitly,
/// exactly once per allocation. Deciding *when* that happens is the job of the owner types.
pub(crate) struct HeapSlot<T> {
    ptr: Option<NonNull<T>>,
}

impl<T> HeapSlot<T> {
    pub(crate) const fn empty() -> Self {
        HeapSlot { ptr: None }
    }

    pub(crate) fn from_box(value: Box<T>) -> Self {
        HeapSlot {
            ptr: Some(NonNull::from(Box::leak(value))),
        }
    }

    /// Adopts a raw heap pointer. A null pointer yields an empty slot.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must have been produced by `Box::into_raw` (or `Box::leak`) for a `T`,
    /// and nothing else may release it afterwards.
    pub(crate) unsafe fn from_raw(raw: *mut T) -> Self {
        HeapSlot {
            ptr: NonNull::new(raw),
        }
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Obtains the raw heap pointer, or null if the slot is empty.
    pub(crate) fn as_ptr(&self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    pub(crate) fn same_allocation(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }

    /// Clones the slot, returning a new instance that points to the same allocation.
    ///
    /// This is implemented as an inherent method to keep the `Clone` trait off the slot. Only the
    /// owner types decide whether an allocation may be reachable from more than one slot.
    pub(crate) fn clone(&self) -> Self {
        HeapSlot { ptr: self.ptr }
    }

    /// Moves the pointer out, leaving this slot empty.
    pub(crate) fn take(&mut self) -> Self {
        HeapSlot {
            ptr: self.ptr.take(),
        }
    }

    /// Gives up the allocation without releasing it.
    pub(crate) fn into_raw(self) -> *mut T {
        self.as_ptr()
    }

    /// # Safety
    ///
    /// The caller must guarantee that `release()` has not been called on any slot
    /// pointing to the same allocation.
    pub(crate) unsafe fn as_ref(&self) -> Option<&T> {
        // SAFETY: The pointer came from a live `Box<T>` and the caller guarantees it was not released.
        self.ptr.map(|ptr| unsafe { ptr.as_ref() })
    }

    /// # Safety
    ///
    /// Same as `as_ref()`. In addition, the caller must guarantee that no other reference
    /// to the value exists for the lifetime of the returned borrow.
    pub(crate) unsafe fn as_mut(&mut self) -> Option<&mut T> {
        // SAFETY: See above, exclusivity is upheld by the caller.
        self.ptr.map(|mut ptr| unsafe { ptr.as_mut() })
    }

    /// Drops the value and frees the allocation, leaving this slot empty.
    /// Does nothing if the slot is already empty.
    ///
    /// # Safety
    ///
    /// This must be called at most once for each allocation, across all the slots that
    /// point to it, and no references obtained through `as_ref()`/`as_mut()` may outlive it.
    pub(crate) unsafe fn release(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: The allocation came from a `Box<T>` and the caller guarantees that
            // nobody released it before us.
            unsafe { dealloc(ptr) };
        }
    }

    /// Takes the value back out of the allocation and frees it, leaving this slot empty.
    ///
    /// # Safety
    ///
    /// Same as `release()`.
    pub(crate) unsafe fn into_box(&mut self) -> Option<Box<T>> {
        // SAFETY: Same contract as `release()`, ownership of the allocation moves into the box.
        self.ptr.take().map(|ptr| unsafe { Box::from_raw(ptr.as_ptr()) })
    }
}

impl<T> core::fmt::Debug for HeapSlot<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}

#[inline]
unsafe fn dealloc<T>(value: NonNull<T>) {
    // SAFETY: Forwarded from `release()`.
    drop(unsafe { Box::from_raw(value.as_ptr()) })
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    struct CountsDrops<'a>(&'a Cell<usize>);

    impl Drop for CountsDrops<'_> {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn release_drops_exactly_once() {
        let drops = Cell::new(0);
        let mut slot = HeapSlot::from_box(Box::new(CountsDrops(&drops)));

        unsafe { slot.release() };
        assert_eq!(drops.get(), 1);
        assert!(slot.is_empty());

        unsafe { slot.release() };
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn dropping_a_slot_does_not_release() {
        let drops = Cell::new(0);
        let slot = HeapSlot::from_box(Box::new(CountsDrops(&drops)));
        drop(slot.clone());
        assert_eq!(drops.get(), 0);

        let raw = slot.into_raw();
        assert_eq!(drops.get(), 0);

        drop(unsafe { Box::from_raw(raw) });
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn null_raw_pointer_is_empty() {
        let slot = unsafe { HeapSlot::<u32>::from_raw(ptr::null_mut()) };
        assert!(slot.is_empty());
        assert!(slot.as_ptr().is_null());
        assert!(unsafe { slot.as_ref() }.is_none());
    }

    #[test]
    fn take_moves_the_pointer() {
        let mut source = HeapSlot::from_box(Box::new(5_u32));
        let address = source.as_ptr();

        let mut dest = source.take();
        assert!(source.is_empty());
        assert_eq!(dest.as_ptr(), address);
        assert!(!dest.same_allocation(&source));

        assert_eq!(unsafe { dest.into_box() }.map(|value| *value), Some(5));
        assert!(dest.is_empty());
    }
}
