use core::fmt;
use core::{
    fmt::Debug,
    hash::Hash,
    iter::{ExactSizeIterator, FusedIterator},
    marker::PhantomData,
    mem::{self, MaybeUninit},
    ops::{Bound, Deref, DerefMut, Index, IndexMut, RangeBounds},
    ptr::{self, NonNull},
    slice::{self, SliceIndex},
};
use std::alloc::{alloc, dealloc, Layout};

use super::error::{infallible, HybridVectorError};

enum Storage<T, const N: usize> {
    Inline([MaybeUninit<T>; N]),
    Heap { ptr: NonNull<T>, capacity: usize },
}

/// A vector that stores up to `N` elements inline and spills to the heap past that.
///
/// While `len() <= N` has never been exceeded (or after a `shrink_to_fit` / `clear`) the
/// elements live in a buffer embedded in the vector itself. Once more room is needed, the
/// elements are moved into a heap buffer that grows by at least half of its capacity each time.
///
/// `capacity()` is never below `N`, and it equals `N` exactly when the vector is inline.
///
/// # Examples
///
/// ```
/// use hybrid_containers::HybridVector;
///
/// let mut v: HybridVector<i32, 2> = HybridVector::new();
/// v.push(1);
/// v.push(2);
/// assert!(v.is_inline());
/// v.push(3);
/// assert!(!v.is_inline());
/// assert_eq!(v, &[1, 2, 3]);
/// ```
pub struct HybridVector<T, const N: usize> {
    storage: Storage<T, N>,
    len: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send, const N: usize> Send for HybridVector<T, N> {}
unsafe impl<T: Sync, const N: usize> Sync for HybridVector<T, N> {}

impl<T, const N: usize> HybridVector<T, N> {
    const NONZERO_INLINE_CAPACITY: () = assert!(
        N != 0,
        "a HybridVector without an inline buffer isn't very useful"
    );

    /// Creates a new empty vector using its inline buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let v: HybridVector<i32, 4> = HybridVector::new();
    /// assert_eq!(v.len(), 0);
    /// assert_eq!(v.capacity(), 4);
    /// assert!(v.is_inline());
    /// ```
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_INLINE_CAPACITY;
        HybridVector {
            storage: Storage::Inline([const { MaybeUninit::uninit() }; N]),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Builds a vector by pushing every item of `iter` in order, reporting growth failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let v = HybridVector::<u8, 2>::try_from_iter(1..=5).unwrap();
    /// assert_eq!(v, &[1, 2, 3, 4, 5]);
    /// assert_eq!(v.capacity(), 6);
    /// ```
    pub fn try_from_iter<I>(iter: I) -> Result<Self, HybridVectorError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut result = Self::new();
        for elem in iter {
            result.try_push(elem)?;
        }
        Ok(result)
    }

    #[inline]
    const fn is_zst() -> bool {
        mem::size_of::<T>() == 0
    }

    #[inline]
    const fn max_elements() -> usize {
        if Self::is_zst() {
            usize::MAX
        } else {
            usize::MAX / mem::size_of::<T>()
        }
    }

    /// Returns the number of elements in the vector.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 2> = HybridVector::new();
    /// assert!(v.is_empty());
    /// v.push(1);
    /// assert!(!v.is_empty());
    /// ```
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots the current buffer can hold.
    ///
    /// This is `N` while inline and the heap buffer's size once spilled.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 4> = HybridVector::new();
    /// assert_eq!(v.capacity(), 4);
    /// v.extend([1, 2, 3, 4, 5]);
    /// assert_eq!(v.capacity(), 6);
    /// ```
    #[must_use]
    #[inline]
    pub const fn capacity(&self) -> usize {
        match self.storage {
            Storage::Inline(_) => N,
            Storage::Heap { capacity, .. } => capacity,
        }
    }

    /// Returns the size of the inline buffer, `N`.
    #[must_use]
    #[inline]
    pub const fn inline_capacity(&self) -> usize {
        N
    }

    /// Returns the largest number of elements the vector could ever address.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let v: HybridVector<u32, 1> = HybridVector::new();
    /// assert_eq!(v.max_size(), usize::MAX / 4);
    /// ```
    #[must_use]
    #[inline]
    pub const fn max_size(&self) -> usize {
        Self::max_elements()
    }

    /// Returns `true` while the elements live in the embedded buffer.
    #[must_use]
    #[inline]
    pub const fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    /// Returns a raw pointer to the vector's buffer.
    ///
    /// The pointer is invalidated by any operation that reallocates, and by moving the vector
    /// while it is inline.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 2> = HybridVector::new();
    /// v.push(10);
    /// let ptr = v.as_ptr();
    /// unsafe {
    ///     assert_eq!(*ptr, 10);
    /// }
    /// ```
    #[must_use]
    #[inline]
    pub const fn as_ptr(&self) -> *const T {
        match &self.storage {
            Storage::Inline(buffer) => buffer.as_ptr() as *const T,
            Storage::Heap { ptr, .. } => ptr.as_ptr() as *const T,
        }
    }

    /// Returns a mutable raw pointer to the vector's buffer.
    #[must_use]
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        match &mut self.storage {
            Storage::Inline(buffer) => buffer.as_mut_ptr() as *mut T,
            Storage::Heap { ptr, .. } => ptr.as_ptr(),
        }
    }

    /// Returns a shared slice of all initialized elements.
    #[must_use]
    #[inline]
    pub const fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// Returns a mutable slice of all initialized elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 3> = HybridVector::new();
    /// v.push(1);
    /// v.push(2);
    /// v.as_mut_slice()[1] = 7;
    /// assert_eq!(v, &[1, 7]);
    /// ```
    #[must_use]
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }

    /// Returns the unused slots of the current buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 3> = HybridVector::new();
    /// v.push(1);
    /// let spare = v.spare_capacity_mut();
    /// assert_eq!(spare.len(), 2);
    /// spare[0].write(2);
    /// unsafe {
    ///     v.set_len(2);
    /// }
    /// assert_eq!(v, &[1, 2]);
    /// ```
    #[must_use]
    #[inline]
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<T>] {
        let len = self.len;
        let spare = self.capacity() - len;
        unsafe {
            let ptr = self.as_mut_ptr().add(len) as *mut MaybeUninit<T>;
            slice::from_raw_parts_mut(ptr, spare)
        }
    }

    /// Forces the length of the vector to `new_len`.
    /// This is a low-level operation that maintains none of the normal invariants of the type.
    ///
    /// # Safety
    ///
    /// - `new_len` must be less than or equal to `capacity()`.
    /// - the elements at `old_len..new_len` must be initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    fn allocate(capacity: usize) -> Result<NonNull<T>, HybridVectorError> {
        debug_assert!(capacity > N);
        if capacity > Self::max_elements() {
            return Err(HybridVectorError::CapacityOverflow);
        }
        if Self::is_zst() {
            return Ok(NonNull::dangling());
        }

        let layout =
            Layout::array::<T>(capacity).map_err(|_| HybridVectorError::CapacityOverflow)?;
        // `layout` is non-empty: capacity > N >= 1 and T is not zero-sized.
        let ptr = unsafe { alloc(layout) } as *mut T;
        NonNull::new(ptr).ok_or(HybridVectorError::AllocationFailure { layout })
    }

    /// # Safety
    ///
    /// `ptr` must come from `allocate(capacity)` and hold no live elements.
    unsafe fn deallocate(ptr: NonNull<T>, capacity: usize) {
        if Self::is_zst() {
            return;
        }
        let layout =
            Layout::from_size_align_unchecked(capacity * mem::size_of::<T>(), mem::align_of::<T>());
        dealloc(ptr.as_ptr() as *mut u8, layout);
    }

    /// Moves the elements into a fresh heap buffer of exactly `new_capacity` slots.
    ///
    /// Nothing is modified unless the allocation succeeds.
    fn relocate_to_heap(&mut self, new_capacity: usize) -> Result<(), HybridVectorError> {
        debug_assert!(new_capacity >= self.len);
        let new_ptr = Self::allocate(new_capacity)?;

        unsafe { ptr::copy_nonoverlapping(self.as_ptr(), new_ptr.as_ptr(), self.len) };
        let previous = mem::replace(
            &mut self.storage,
            Storage::Heap {
                ptr: new_ptr,
                capacity: new_capacity,
            },
        );
        if let Storage::Heap { ptr, capacity } = previous {
            unsafe { Self::deallocate(ptr, capacity) };
        }
        Ok(())
    }

    /// Grows the buffer to `capacity + max(additional, capacity / 2)` slots.
    #[cold]
    fn grow(&mut self, additional: usize) -> Result<(), HybridVectorError> {
        let capacity = self.capacity();
        let new_capacity = capacity
            .checked_add(additional.max(capacity / 2))
            .filter(|&new_capacity| new_capacity <= Self::max_elements())
            .ok_or(HybridVectorError::CapacityOverflow)?;
        self.relocate_to_heap(new_capacity)
    }

    /// Writes `value` into the first spare slot.
    ///
    /// # Safety
    ///
    /// `len` must be less than `capacity()`.
    #[inline]
    unsafe fn write_unchecked(&mut self, value: T) -> &mut T {
        debug_assert!(self.len < self.capacity());
        let len = self.len;
        let slot = self.as_mut_ptr().add(len);
        ptr::write(slot, value);
        self.len = len + 1;
        &mut *slot
    }

    /// Makes room for at least `additional` more elements.
    ///
    /// When the spare capacity is too small the buffer grows by the missing amount or by half
    /// its capacity, whichever is larger.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::{HybridVector, HybridVectorError};
    ///
    /// let mut v: HybridVector<u64, 4> = HybridVector::new();
    /// v.try_reserve(10).unwrap();
    /// assert_eq!(v.capacity(), 10);
    /// assert_eq!(v.try_reserve(usize::MAX), Err(HybridVectorError::CapacityOverflow));
    /// assert_eq!(v.capacity(), 10);
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), HybridVectorError> {
        let spare = self.capacity() - self.len;
        if additional > spare {
            self.grow(additional - spare)
        } else {
            Ok(())
        }
    }

    /// Makes room for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts through `handle_alloc_error` if the allocator fails.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional));
    }

    /// Shrinks the buffer to hold exactly `len()` elements.
    ///
    /// A spilled vector whose elements fit in `N` slots moves back into the inline buffer.
    /// An inline or exactly-sized vector is left alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 2> = (0..10).collect();
    /// v.truncate(2);
    /// v.try_shrink_to_fit().unwrap();
    /// assert!(v.is_inline());
    /// assert_eq!(v.capacity(), 2);
    /// assert_eq!(v, &[0, 1]);
    /// ```
    pub fn try_shrink_to_fit(&mut self) -> Result<(), HybridVectorError> {
        let (ptr, capacity) = match self.storage {
            Storage::Inline(_) => return Ok(()),
            Storage::Heap { ptr, capacity } => (ptr, capacity),
        };
        let len = self.len;
        if len == capacity {
            return Ok(());
        }

        if len <= N {
            let mut buffer = [const { MaybeUninit::uninit() }; N];
            unsafe {
                ptr::copy_nonoverlapping(ptr.as_ptr(), buffer.as_mut_ptr() as *mut T, len);
                self.storage = Storage::Inline(buffer);
                Self::deallocate(ptr, capacity);
            }
            Ok(())
        } else {
            self.relocate_to_heap(len)
        }
    }

    /// Shrinks the buffer to hold exactly `len()` elements.
    ///
    /// # Panics
    ///
    /// Aborts through `handle_alloc_error` if the exactly-sized heap buffer cannot be allocated.
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        infallible(self.try_shrink_to_fit());
    }

    /// Appends an element, growing the buffer if it is full.
    ///
    /// Returns a mutable reference to the new element.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 1> = HybridVector::new();
    /// *v.try_push(1).unwrap() += 10;
    /// v.try_push(2).unwrap();
    /// assert_eq!(v, &[11, 2]);
    /// ```
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<&mut T, HybridVectorError> {
        if self.len == self.capacity() {
            self.grow(1)?;
        }
        Ok(unsafe { self.write_unchecked(value) })
    }

    /// Appends an element to the back of the vector.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts through `handle_alloc_error` if the allocator fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<&str, 1> = HybridVector::new();
    /// v.push("a");
    /// v.push("b");
    /// assert_eq!(v, &["a", "b"]);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        infallible(self.try_push(value));
    }

    /// Constructs a new element from `f` at the back of the vector.
    ///
    /// The buffer grows before `f` runs, so `f` always builds directly into a free slot.
    #[inline]
    pub fn try_emplace_with<F>(&mut self, f: F) -> Result<&mut T, HybridVectorError>
    where
        F: FnOnce() -> T,
    {
        if self.len == self.capacity() {
            self.grow(1)?;
        }
        Ok(unsafe { self.write_unchecked(f()) })
    }

    /// Constructs a new element from `f` at the back of the vector and returns it.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<String, 2> = HybridVector::new();
    /// let s = v.emplace_with(|| "hello".to_owned());
    /// s.push_str(" world");
    /// assert_eq!(v, &["hello world"]);
    /// ```
    #[inline]
    pub fn emplace_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        infallible(self.try_emplace_with(f))
    }

    /// Removes the last element and returns it, or `None` if empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            Some(unsafe { ptr::read(self.as_ptr().add(self.len)) })
        }
    }

    /// Shortens the vector to `new_len`, dropping the removed tail in place.
    ///
    /// Has no effect if `new_len` is not below the current length. The buffer is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 4> = (1..=3).collect();
    /// v.truncate(1);
    /// assert_eq!(v, &[1]);
    /// v.truncate(5);
    /// assert_eq!(v, &[1]);
    /// ```
    pub fn truncate(&mut self, new_len: usize) {
        let len = self.len;
        if new_len >= len {
            return;
        }
        unsafe {
            self.len = new_len;
            let tail = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(new_len), len - new_len);
            ptr::drop_in_place(tail);
        }
    }

    /// Resizes the vector, filling new slots with values produced by `f`.
    ///
    /// Shrinking drops the trailing elements. Growing past `capacity()` first grows the buffer
    /// by `new_len - capacity()` slots (or half the capacity, whichever is larger).
    pub fn try_resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), HybridVectorError>
    where
        F: FnMut() -> T,
    {
        let len = self.len;
        if new_len <= len {
            self.truncate(new_len);
            return Ok(());
        }

        let capacity = self.capacity();
        if new_len > capacity {
            self.grow(new_len - capacity)?;
        }
        for _ in len..new_len {
            unsafe { self.write_unchecked(f()) };
        }
        Ok(())
    }

    /// Resizes the vector, filling new slots with values produced by `f`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 2> = HybridVector::new();
    /// let mut next = 0;
    /// v.resize_with(4, || {
    ///     next += 1;
    ///     next
    /// });
    /// assert_eq!(v, &[1, 2, 3, 4]);
    /// ```
    #[inline]
    pub fn resize_with<F>(&mut self, new_len: usize, f: F)
    where
        F: FnMut() -> T,
    {
        infallible(self.try_resize_with(new_len, f));
    }

    /// Resizes the vector, cloning `value` into new slots.
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<(), HybridVectorError>
    where
        T: Clone,
    {
        self.try_resize_with(new_len, || value.clone())
    }

    /// Resizes the vector, cloning `value` into new slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 4> = HybridVector::new();
    /// v.resize(3, 7);
    /// assert_eq!(v, &[7, 7, 7]);
    /// v.resize(6, 1);
    /// assert_eq!(v, &[7, 7, 7, 1, 1, 1]);
    /// v.resize(1, 0);
    /// assert_eq!(v, &[7]);
    /// ```
    #[inline]
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        infallible(self.try_resize(new_len, value));
    }

    /// Resizes the vector, default-constructing new slots.
    pub fn try_resize_default(&mut self, new_len: usize) -> Result<(), HybridVectorError>
    where
        T: Default,
    {
        self.try_resize_with(new_len, T::default)
    }

    /// Resizes the vector, default-constructing new slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<u8, 2> = HybridVector::new();
    /// v.push(9);
    /// v.resize_default(3);
    /// assert_eq!(v, &[9, 0, 0]);
    /// ```
    #[inline]
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        infallible(self.try_resize_default(new_len));
    }

    /// Drops every element and returns to the inline buffer, freeing any heap buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 2> = (0..5).collect();
    /// assert!(!v.is_inline());
    /// v.clear();
    /// assert!(v.is_empty());
    /// assert!(v.is_inline());
    /// assert_eq!(v.capacity(), 2);
    /// ```
    pub fn clear(&mut self) {
        self.truncate(0);
        if let Storage::Heap { ptr, capacity } = self.storage {
            self.storage = Storage::Inline([const { MaybeUninit::uninit() }; N]);
            unsafe { Self::deallocate(ptr, capacity) };
        }
    }

    /// Removes and returns the element at `index`, shifting the tail down.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        if index >= len {
            panic!("removal index (is {index}) should be < len (is {len})");
        }
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            let removed = ptr::read(slot);
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.len = len - 1;
            removed
        }
    }

    /// Drops the element at `index` and closes the gap.
    ///
    /// Returns `index`, which now refers to the element that followed the removed one
    /// (or equals `len()` if the last element was removed).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 4> = (1..=4).collect();
    /// let next = v.erase(1);
    /// assert_eq!(next, 1);
    /// assert_eq!(v[next], 3);
    /// assert_eq!(v, &[1, 3, 4]);
    /// assert_eq!(v.erase(2), v.len());
    /// ```
    #[inline]
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Drops the elements in `range` and moves the tail down to close the gap.
    ///
    /// Returns the start of the range, where the former tail now begins. An empty or inverted
    /// range removes nothing and returns its end.
    ///
    /// # Panics
    ///
    /// Panics if a non-empty range ends past `len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 4> = (0..6).collect();
    /// assert_eq!(v.erase_range(1..3), 1);
    /// assert_eq!(v, &[0, 3, 4, 5]);
    /// assert_eq!(v.erase_range(2..2), 2);
    /// assert_eq!(v.erase_range(2..), 2);
    /// assert_eq!(v, &[0, 3]);
    /// ```
    pub fn erase_range<R>(&mut self, range: R) -> usize
    where
        R: RangeBounds<usize>,
    {
        let len = self.len;
        let (start, end) = resolve_range(&range, len);
        if start >= end {
            return end;
        }
        if end > len {
            panic!("range end index {end} out of range for HybridVector of length {len}");
        }

        unsafe {
            self.len = start;
            let base = self.as_mut_ptr();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
            ptr::copy(base.add(end), base.add(start), len - end);
            self.len = len - (end - start);
        }
        start
    }

    /// Returns a reference to the element at `index`, or `IndexOutOfRange`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::{HybridVector, HybridVectorError};
    ///
    /// let v: HybridVector<i32, 2> = (10..13).collect();
    /// assert_eq!(v.at(2), Ok(&12));
    /// assert_eq!(
    ///     v.at(3),
    ///     Err(HybridVectorError::IndexOutOfRange { index: 3, len: 3 })
    /// );
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, HybridVectorError> {
        self.as_slice()
            .get(index)
            .ok_or(HybridVectorError::IndexOutOfRange {
                index,
                len: self.len,
            })
    }

    /// Returns a mutable reference to the element at `index`, or `IndexOutOfRange`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, HybridVectorError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(HybridVectorError::IndexOutOfRange { index, len })
    }

    /// Returns the first element.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn front(&self) -> &T {
        match self.as_slice().first() {
            Some(first) => first,
            None => panic!("front() called on an empty HybridVector"),
        }
    }

    /// Returns the first element mutably.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        match self.as_mut_slice().first_mut() {
            Some(first) => first,
            None => panic!("front_mut() called on an empty HybridVector"),
        }
    }

    /// Returns the last element.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn back(&self) -> &T {
        match self.as_slice().last() {
            Some(last) => last,
            None => panic!("back() called on an empty HybridVector"),
        }
    }

    /// Returns the last element mutably.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        match self.as_mut_slice().last_mut() {
            Some(last) => last,
            None => panic!("back_mut() called on an empty HybridVector"),
        }
    }

    /// Clones and appends all elements of `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut v: HybridVector<i32, 2> = HybridVector::new();
    /// v.extend_from_slice(&[1, 2, 3]);
    /// assert_eq!(v, &[1, 2, 3]);
    /// ```
    pub fn extend_from_slice(&mut self, other: &[T])
    where
        T: Clone,
    {
        self.reserve(other.len());
        for elem in other {
            unsafe { self.write_unchecked(elem.clone()) };
        }
    }

    /// Moves all elements from `other` into `self`, leaving `other` empty.
    ///
    /// `other` keeps its buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut a: HybridVector<i32, 2> = HybridVector::new();
    /// a.push(1);
    /// let mut b: HybridVector<i32, 3> = (2..5).collect();
    /// a.append(&mut b);
    /// assert_eq!(a, &[1, 2, 3, 4]);
    /// assert!(b.is_empty());
    /// ```
    pub fn append<const M: usize>(&mut self, other: &mut HybridVector<T, M>) {
        let count = other.len;
        self.reserve(count);
        let len = self.len;
        unsafe {
            other.set_len(0);
            ptr::copy_nonoverlapping(other.as_ptr(), self.as_mut_ptr().add(len), count);
            self.set_len(len + count);
        }
    }

    /// Moves the contents out, leaving `self` empty and inline.
    ///
    /// A spilled vector hands over its heap buffer; an inline one moves its elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut source: HybridVector<i32, 2> = (0..4).collect();
    /// let taken = source.take();
    /// assert_eq!(taken, &[0, 1, 2, 3]);
    /// assert!(source.is_empty());
    /// assert!(source.is_inline());
    /// ```
    #[must_use]
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Exchanges the contents of two vectors.
    ///
    /// Two spilled vectors trade their heap buffers in O(1). Otherwise at least one side keeps
    /// its elements in the embedded buffer, and the two vectors are exchanged whole.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_containers::HybridVector;
    ///
    /// let mut a: HybridVector<i32, 2> = (0..5).collect();
    /// let mut b: HybridVector<i32, 2> = HybridVector::new();
    /// b.push(9);
    /// a.swap_with(&mut b);
    /// assert_eq!(a, &[9]);
    /// assert!(a.is_inline());
    /// assert_eq!(b, &[0, 1, 2, 3, 4]);
    /// ```
    pub fn swap_with(&mut self, other: &mut Self) {
        if self.is_inline() || other.is_inline() {
            mem::swap(self, other);
            return;
        }

        if let (
            Storage::Heap {
                ptr: ptr_a,
                capacity: capacity_a,
            },
            Storage::Heap {
                ptr: ptr_b,
                capacity: capacity_b,
            },
        ) = (&mut self.storage, &mut other.storage)
        {
            mem::swap(ptr_a, ptr_b);
            mem::swap(capacity_a, capacity_b);
        }
        mem::swap(&mut self.len, &mut other.len);
    }
}

#[inline]
fn resolve_range<R>(range: &R, len: usize) -> (usize, usize)
where
    R: RangeBounds<usize>,
{
    let start = match range.start_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&i) => i.saturating_add(1),
        Bound::Excluded(&i) => i,
        Bound::Unbounded => len,
    };
    (start, end)
}

impl<T, const N: usize> Drop for HybridVector<T, N> {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(self.as_mut_slice());
            if let Storage::Heap { ptr, capacity } = self.storage {
                Self::deallocate(ptr, capacity);
            }
        }
    }
}

impl<T, const N: usize> Default for HybridVector<T, N> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Clone for HybridVector<T, N> {
    /// Deep-copies into storage sized for the elements: inline when they fit, otherwise a heap
    /// buffer of exactly `len()` slots.
    #[inline]
    fn clone(&self) -> Self {
        let mut result = Self::new();
        if self.len > N {
            infallible(result.relocate_to_heap(self.len));
        }
        for value in self.as_slice() {
            unsafe { result.write_unchecked(value.clone()) };
        }
        result
    }

    /// Reuses the existing buffer (and the overlapping elements) when it is large enough.
    fn clone_from(&mut self, source: &Self) {
        self.truncate(source.len);
        let (init, tail) = source.split_at(self.len);
        self.as_mut_slice().clone_from_slice(init);

        if source.len > self.capacity() {
            infallible(self.relocate_to_heap(source.len));
        }
        for value in tail {
            unsafe { self.write_unchecked(value.clone()) };
        }
    }
}

impl<T, const N: usize> FromIterator<T> for HybridVector<T, N> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        infallible(Self::try_from_iter(iter))
    }
}

impl<T, const N: usize> Extend<T> for HybridVector<T, N> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let it = iter.into_iter();
        let (lowerbound, _) = it.size_hint();
        self.reserve(lowerbound);
        for elem in it {
            self.push(elem);
        }
    }
}

impl<'a, T: Clone + 'a, const N: usize> Extend<&'a T> for HybridVector<T, N> {
    #[inline]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        <Self as Extend<T>>::extend(self, iter.into_iter().cloned());
    }
}

impl<T, const N: usize, const M: usize> From<[T; M]> for HybridVector<T, N> {
    #[inline]
    fn from(value: [T; M]) -> Self {
        value.into_iter().collect()
    }
}

impl<T: Clone, const N: usize> From<&[T]> for HybridVector<T, N> {
    #[inline]
    fn from(value: &[T]) -> Self {
        let mut result = Self::new();
        result.extend_from_slice(value);
        result
    }
}

impl<T, const N: usize> Deref for HybridVector<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for HybridVector<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, I, const N: usize> Index<I> for HybridVector<T, N>
where
    I: SliceIndex<[T]>,
{
    type Output = <I as SliceIndex<[T]>>::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I, const N: usize> IndexMut<I> for HybridVector<T, N>
where
    I: SliceIndex<[T]>,
{
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T, U, const N: usize, const M: usize> PartialEq<HybridVector<U, M>> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &HybridVector<U, M>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U, const N: usize, const M: usize> PartialEq<[U; M]> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U; M]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, const N: usize, const M: usize> PartialEq<&[U; M]> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &&[U; M]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<&[U]> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<Vec<U>> for HybridVector<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, const N: usize> Eq for HybridVector<T, N> where T: Eq {}

impl<T, const N: usize> PartialOrd for HybridVector<T, N>
where
    T: PartialOrd,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T, const N: usize> Ord for HybridVector<T, N>
where
    T: Ord,
{
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T, const N: usize> Hash for HybridVector<T, N>
where
    T: Hash,
{
    #[inline]
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: fmt::Debug, const N: usize> Debug for HybridVector<T, N> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T, const N: usize> AsRef<[T]> for HybridVector<T, N> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize> AsMut<[T]> for HybridVector<T, N> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, const N: usize> std::borrow::Borrow<[T]> for HybridVector<T, N> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize> std::borrow::BorrowMut<[T]> for HybridVector<T, N> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, const N: usize> IntoIterator for HybridVector<T, N> {
    type Item = T;

    type IntoIter = IntoIter<T, N>;

    #[inline]
    fn into_iter(mut self) -> Self::IntoIter {
        let end = self.len;
        self.len = 0;
        IntoIter {
            vec: self,
            begin: 0,
            end,
        }
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a HybridVector<T, N> {
    type Item = &'a T;

    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut HybridVector<T, N> {
    type Item = &'a mut T;

    type IntoIter = slice::IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

/// Owning iterator returned by `HybridVector::into_iter`.
///
/// The vector's buffer stays alive until the iterator is dropped; its length is held at zero
/// so only the not-yet-yielded range `[begin, end)` is dropped.
pub struct IntoIter<T, const N: usize> {
    vec: HybridVector<T, N>,
    begin: usize,
    end: usize,
}

impl<T, const N: usize> IntoIter<T, N> {
    /// Returns the remaining elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.vec.as_ptr().add(self.begin), self.end - self.begin) }
    }

    /// Returns the remaining elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.end - self.begin;
        unsafe { slice::from_raw_parts_mut(self.vec.as_mut_ptr().add(self.begin), len) }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.begin == self.end {
            None
        } else {
            let index = self.begin;
            self.begin += 1;
            Some(unsafe { ptr::read(self.vec.as_ptr().add(index)) })
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.begin;
        (len, Some(len))
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.begin == self.end {
            None
        } else {
            self.end -= 1;
            Some(unsafe { ptr::read(self.vec.as_ptr().add(self.end)) })
        }
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    #[inline]
    fn drop(&mut self) {
        unsafe { ptr::drop_in_place(self.as_mut_slice()) };
    }
}

impl<T: fmt::Debug, const N: usize> Debug for IntoIter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::hybrid_vec;
    use core::cell::Cell;
    use std::borrow::{Borrow, BorrowMut};
    use std::cmp::Ordering;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;

    use super::*;

    struct DropCounter<'a>(&'a Cell<u32>);

    impl<'a> Drop for DropCounter<'a> {
        #[inline]
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn inline_ptr<T, const N: usize>(v: &HybridVector<T, N>) -> Option<*const T> {
        match &v.storage {
            Storage::Inline(buffer) => Some(buffer.as_ptr() as *const T),
            Storage::Heap { .. } => None,
        }
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_macro() {
        let deduced_size = hybrid_vec![
            "1".to_owned(),
            "2".to_owned(),
            "3".to_owned(),
            "4".to_owned(),
            "5".to_owned()
        ];

        assert_eq!(deduced_size.inline_capacity(), 5);
        assert!(deduced_size.is_inline());
        assert!(deduced_size.iter().eq(&["1", "2", "3", "4", "5"]));

        let specific_size = hybrid_vec![
            8;
            "1".to_owned(),
            "2".to_owned(),
            "3".to_owned()
        ];
        assert_eq!(specific_size.capacity(), 8);
        assert!(specific_size.iter().eq(&["1", "2", "3"]));

        let spilled = hybrid_vec![2; 1, 2, 3, 4];
        assert!(!spilled.is_inline());
        assert_eq!(spilled, &[1, 2, 3, 4]);

        let one_element_vec = hybrid_vec![42];
        assert_eq!(one_element_vec.capacity(), 1);
        assert_eq!(one_element_vec, &[42]);

        let mut capacity_spec = hybrid_vec![5;];
        capacity_spec.push(42); // for deduction
        assert_eq!(capacity_spec.first(), Some(&42));
        assert_eq!(capacity_spec.capacity(), 5);

        let empty: HybridVector<u8, 3> = hybrid_vec![];
        assert!(empty.is_empty());
    }

    #[test]
    fn inline_to_heap_and_back_scenario() {
        let mut v: HybridVector<i32, 4> = HybridVector::new();
        for i in 1..=4 {
            v.push(i);
        }
        assert_eq!(v.len(), 4);
        assert_eq!(v.capacity(), 4);
        assert_eq!(Some(v.as_ptr()), inline_ptr(&v));

        v.push(5);
        assert_eq!(v.len(), 5);
        assert_eq!(v.capacity(), 6);
        assert!(!v.is_inline());
        assert_eq!(inline_ptr(&v), None);

        assert_eq!(v.erase(0), 0);
        assert_eq!(v, &[2, 3, 4, 5]);
        assert_eq!(v.len(), 4);

        v.shrink_to_fit();
        assert_eq!(v.capacity(), 4);
        assert_eq!(Some(v.as_ptr()), inline_ptr(&v));
        assert_eq!(v, &[2, 3, 4, 5]);
    }

    #[test]
    fn growth_uses_half_capacity_or_request() {
        let mut v: HybridVector<u32, 4> = HybridVector::new();
        v.extend(0..4);
        v.try_reserve(1).unwrap();
        assert_eq!(v.capacity(), 6);

        v.extend(4..6);
        v.try_reserve(10).unwrap();
        assert_eq!(v.capacity(), 16);

        v.extend(6..16);
        v.push(16);
        assert_eq!(v.capacity(), 24);

        assert!(v.iter().copied().eq(0..17));
    }

    #[test]
    fn basic_push_pop_and_len_capacity() {
        let mut v = hybrid_vec![4;];
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 4);
        v.push(1);
        v.push(2);
        assert_eq!(v.len(), 2);
        assert_eq!(v.pop(), Some(2));
        assert_eq!(v.pop(), Some(1));
        assert_eq!(v.pop(), None);
        assert!(v.is_empty());
    }

    #[test]
    fn emplace_returns_new_element() {
        let mut v: HybridVector<String, 1> = HybridVector::new();
        v.emplace_with(|| "a".to_owned()).push('!');
        let second = v.try_emplace_with(|| "b".to_owned()).unwrap();
        second.push('?');
        assert_eq!(v, &["a!", "b?"]);
        assert!(!v.is_inline());
    }

    #[test]
    fn capacity_overflow_leaves_vector_untouched() {
        let mut v: HybridVector<u64, 2> = (0..3).collect();
        let capacity = v.capacity();

        assert_eq!(
            v.try_reserve(usize::MAX),
            Err(HybridVectorError::CapacityOverflow)
        );
        assert_eq!(
            v.try_resize(usize::MAX / 4, 0),
            Err(HybridVectorError::CapacityOverflow)
        );
        assert_eq!(v.capacity(), capacity);
        assert_eq!(v, &[0, 1, 2]);

        let mut bytes: HybridVector<u8, 2> = HybridVector::new();
        assert_eq!(
            bytes.try_reserve(usize::MAX),
            Err(HybridVectorError::CapacityOverflow)
        );
        assert!(bytes.is_inline());
    }

    #[test]
    fn allocation_failure_leaves_vector_untouched() {
        let mut v: HybridVector<u8, 4> = (0..4).collect();
        let err = v.try_reserve(isize::MAX as usize - 64).unwrap_err();
        assert!(matches!(err, HybridVectorError::AllocationFailure { .. }));
        assert!(v.is_inline());
        assert_eq!(v, &[0, 1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn reserve_panics_on_overflow() {
        let mut v: HybridVector<u16, 1> = HybridVector::new();
        v.reserve(usize::MAX);
    }

    #[test]
    fn max_size_matches_element_size() {
        let words: HybridVector<u64, 1> = HybridVector::new();
        assert_eq!(words.max_size(), usize::MAX / 8);

        let units: HybridVector<(), 1> = HybridVector::new();
        assert_eq!(units.max_size(), usize::MAX);
    }

    #[test]
    fn zero_sized_elements_spill_without_allocating() {
        let mut v: HybridVector<(), 2> = HybridVector::new();
        for _ in 0..10 {
            v.push(());
        }
        assert_eq!(v.len(), 10);
        assert!(!v.is_inline());
        assert!(v.capacity() >= 10);

        v.truncate(2);
        v.shrink_to_fit();
        assert!(v.is_inline());
        assert_eq!(v.into_iter().count(), 2);
    }

    #[test]
    fn at_checks_bounds() {
        let mut v: HybridVector<i32, 2> = (0..5).collect();
        for i in 0..5 {
            assert_eq!(v.at(i), Ok(&(i as i32)));
        }
        for i in 5..12 {
            assert_eq!(
                v.at(i),
                Err(HybridVectorError::IndexOutOfRange { index: i, len: 5 })
            );
        }
        *v.at_mut(1).unwrap() = 10;
        assert_eq!(v[1], 10);
        assert!(v.at_mut(5).is_err());
    }

    #[test]
    fn front_and_back() {
        let mut v: HybridVector<i32, 2> = (1..=3).collect();
        assert_eq!(*v.front(), 1);
        assert_eq!(*v.back(), 3);
        *v.front_mut() = 0;
        *v.back_mut() = 4;
        assert_eq!(v, &[0, 2, 4]);
    }

    #[test]
    #[should_panic(expected = "front() called on an empty HybridVector")]
    fn front_panics_when_empty() {
        let v: HybridVector<i32, 2> = HybridVector::new();
        let _ = v.front();
    }

    #[test]
    #[should_panic(expected = "back() called on an empty HybridVector")]
    fn back_panics_when_empty() {
        let v: HybridVector<i32, 2> = HybridVector::new();
        let _ = v.back();
    }

    #[test]
    fn resize_default_initializes_and_drops_tail() {
        let mut v: HybridVector<u32, 2> = HybridVector::new();
        v.resize_default(5);
        assert_eq!(v, &[0, 0, 0, 0, 0]);
        assert_eq!(v.capacity(), 5);

        let counter = Cell::new(0);
        let mut dc: HybridVector<DropCounter<'_>, 2> = HybridVector::new();
        dc.resize_with(6, || DropCounter(&counter));
        assert_eq!(counter.get(), 0);
        dc.resize_with(2, || DropCounter(&counter));
        assert_eq!(counter.get(), 4);
        assert_eq!(dc.len(), 2);
        drop(dc);
        assert_eq!(counter.get(), 6);
    }

    #[test]
    fn resize_grows_by_missing_slots() {
        let mut v: HybridVector<i32, 4> = HybridVector::new();
        v.resize(10, 3);
        assert_eq!(v.capacity(), 10);
        v.resize(11, 4);
        assert_eq!(v.capacity(), 15);
        assert_eq!(v.len(), 11);
        assert_eq!(v[10], 4);
    }

    #[test]
    fn resize_with_panic_keeps_written_prefix() {
        let counter = Cell::new(0);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut v: HybridVector<DropCounter<'_>, 2> = HybridVector::new();
            let mut produced = 0;
            v.resize_with(5, || {
                produced += 1;
                if produced == 4 {
                    panic!("producer failed");
                }
                DropCounter(&counter)
            });
        }));
        assert!(result.is_err());
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn erase_keeps_relative_order() {
        let mut v: HybridVector<String, 2> = ["a", "b", "c", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(v.erase(3), 3);
        assert_eq!(v.len(), 3);
        assert_eq!(v.erase(0), 0);
        assert_eq!(v, &["b", "c"]);
    }

    #[test]
    #[should_panic(expected = "removal index")]
    fn erase_out_of_bounds_panics() {
        let mut v: HybridVector<i32, 2> = HybridVector::new();
        v.push(1);
        v.erase(1);
    }

    #[test]
    fn erase_range_drops_exactly_the_range() {
        let counter = Cell::new(0);
        let mut v: HybridVector<DropCounter<'_>, 2> = HybridVector::new();
        v.resize_with(7, || DropCounter(&counter));

        assert_eq!(v.erase_range(2..5), 2);
        assert_eq!(counter.get(), 3);
        assert_eq!(v.len(), 4);

        assert_eq!(v.erase_range(3..1), 1);
        assert_eq!(v.len(), 4);
        assert_eq!(counter.get(), 3);

        assert_eq!(v.erase_range(..), 0);
        assert_eq!(counter.get(), 7);
        assert!(v.is_empty());
        assert!(!v.is_inline());
    }

    #[test]
    fn erase_range_moves_tail() {
        let mut v: HybridVector<i32, 8> = (0..8).collect();
        assert_eq!(v.erase_range(1..=2), 1);
        assert_eq!(v, &[0, 3, 4, 5, 6, 7]);
        assert_eq!(v.erase_range(4..), 4);
        assert_eq!(v, &[0, 3, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn erase_range_past_end_panics() {
        let mut v: HybridVector<i32, 4> = (0..3).collect();
        v.erase_range(1..5);
    }

    #[test]
    fn clear_returns_to_inline() {
        let counter = Cell::new(0);
        let mut v: HybridVector<DropCounter<'_>, 2> = HybridVector::new();
        v.resize_with(5, || DropCounter(&counter));
        assert!(!v.is_inline());

        v.clear();
        assert_eq!(counter.get(), 5);
        assert!(v.is_empty());
        assert!(v.is_inline());
        assert_eq!(v.capacity(), 2);
    }

    #[test]
    fn shrink_to_fit_noops_and_exact_heap() {
        let mut inline: HybridVector<i32, 4> = (0..2).collect();
        inline.shrink_to_fit();
        assert!(inline.is_inline());
        assert_eq!(inline.capacity(), 4);

        let mut exact: HybridVector<i32, 2> = HybridVector::new();
        exact.reserve(4);
        exact.extend(0..4);
        assert_eq!(exact.capacity(), 4);
        let before = exact.as_ptr();
        exact.shrink_to_fit();
        assert_eq!(exact.as_ptr(), before);

        let mut spilled: HybridVector<i32, 2> = (0..9).collect();
        spilled.truncate(5);
        spilled.shrink_to_fit();
        assert!(!spilled.is_inline());
        assert_eq!(spilled.capacity(), 5);
        assert_eq!(spilled, &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn growth_moves_without_dropping() {
        let counter = Cell::new(0);
        let mut v: HybridVector<DropCounter<'_>, 1> = HybridVector::new();
        for _ in 0..20 {
            v.push(DropCounter(&counter));
        }
        v.truncate(1);
        assert_eq!(counter.get(), 19);
        v.shrink_to_fit();
        assert_eq!(counter.get(), 19);
        drop(v);
        assert_eq!(counter.get(), 20);
    }

    #[test]
    fn swap_exchanges_every_mode_combination() {
        fn check<const N: usize>(a_len: i32, b_len: i32) {
            let mut a: HybridVector<i32, N> = (0..a_len).collect();
            let mut b: HybridVector<i32, N> = (100..100 + b_len).collect();
            let (a_inline, b_inline) = (a.is_inline(), b.is_inline());

            a.swap_with(&mut b);
            assert!(a.iter().copied().eq(100..100 + b_len));
            assert!(b.iter().copied().eq(0..a_len));
            assert_eq!(a.is_inline(), b_inline);
            assert_eq!(b.is_inline(), a_inline);
        }

        check::<3>(2, 1);
        check::<3>(2, 7);
        check::<3>(9, 1);
        check::<3>(9, 12);
    }

    #[test]
    fn swap_of_heap_vectors_exchanges_buffers() {
        let mut a: HybridVector<i32, 1> = (0..4).collect();
        let mut b: HybridVector<i32, 1> = (0..8).collect();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        a.swap_with(&mut b);
        assert_eq!(a.as_ptr(), pb);
        assert_eq!(b.as_ptr(), pa);
    }

    #[test]
    fn clone_sizes_storage_to_contents() {
        let mut v: HybridVector<String, 2> = HybridVector::new();
        for i in 0..7 {
            v.push(i.to_string());
        }
        let c = v.clone();
        assert_eq!(c, v);
        assert_eq!(c.capacity(), 7);

        v.truncate(2);
        let small = v.clone();
        assert!(small.is_inline());
        assert_eq!(small, &["0", "1"]);
    }

    #[test]
    fn clone_from_reuses_buffer_when_large_enough() {
        let mut dst: HybridVector<i32, 2> = (0..10).collect();
        let before = dst.as_ptr();
        let src: HybridVector<i32, 2> = (20..25).collect();

        dst.clone_from(&src);
        assert_eq!(dst, src);
        assert_eq!(dst.as_ptr(), before);

        let mut small: HybridVector<i32, 2> = HybridVector::new();
        small.push(1);
        small.clone_from(&src);
        assert_eq!(small, &[20, 21, 22, 23, 24]);
        assert_eq!(small.capacity(), 5);
    }

    #[test]
    fn take_steals_heap_buffer() {
        let mut source: HybridVector<i32, 2> = (0..6).collect();
        let ptr = source.as_ptr();
        let taken = source.take();
        assert_eq!(taken.as_ptr(), ptr);
        assert_eq!(taken, &[0, 1, 2, 3, 4, 5]);
        assert!(source.is_empty());
        assert!(source.is_inline());

        let mut inline: HybridVector<i32, 4> = (0..2).collect();
        let moved = inline.take();
        assert!(moved.is_inline());
        assert_eq!(moved, &[0, 1]);
        assert!(inline.is_empty());
    }

    #[test]
    fn equality_ignores_storage_mode() {
        let a: HybridVector<i32, 8> = (0..5).collect();
        let b: HybridVector<i32, 2> = (0..5).collect();
        let mut c: HybridVector<i32, 8> = (0..6).collect();
        assert!(a.is_inline());
        assert!(!b.is_inline());
        assert_eq!(a, b);
        assert_ne!(a, c);
        c.pop();
        assert_eq!(a, c);
        assert_eq!(a, [0, 1, 2, 3, 4]);
        assert_eq!(a, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn iteration_forward_and_reverse() {
        let mut v: HybridVector<i32, 2> = (0..5).collect();
        let collected: Vec<_> = v.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 3, 4]);
        let reversed: Vec<_> = v.iter().rev().copied().collect();
        assert_eq!(reversed, vec![4, 3, 2, 1, 0]);

        for x in &mut v {
            *x += 10;
        }
        assert_eq!(v, &[10, 11, 12, 13, 14]);
    }

    #[test]
    fn into_iter_consumes_and_double_ended() {
        let v: HybridVector<i32, 2> = (0..4).collect();
        let mut into = v.into_iter();
        assert_eq!(into.len(), 4);
        assert_eq!(into.next(), Some(0));
        assert_eq!(into.next_back(), Some(3));
        assert_eq!(into.as_slice(), &[1, 2]);
        assert_eq!(into.next(), Some(1));
        assert_eq!(into.next_back(), Some(2));
        assert_eq!(into.next(), None);
    }

    #[test]
    fn into_iter_drops_remaining() {
        let counter = Cell::new(0);
        let mut v: HybridVector<DropCounter<'_>, 2> = HybridVector::new();
        v.resize_with(5, || DropCounter(&counter));
        let mut iter = v.into_iter();
        drop(iter.next());
        assert_eq!(counter.get(), 1);
        drop(iter);
        assert_eq!(counter.get(), 5);
    }

    #[test]
    fn append_moves_and_empties_other() {
        let mut a: HybridVector<String, 2> = HybridVector::new();
        a.push("1".to_string());

        let mut b: HybridVector<String, 4> = HybridVector::new();
        b.push("2".to_string());
        b.push("3".to_string());
        b.push("4".to_string());

        a.append(&mut b);
        assert_eq!(a, &["1", "2", "3", "4"]);
        assert!(b.is_empty());
        assert_eq!(b.capacity(), 4);
    }

    #[test]
    fn spare_capacity_and_set_len_manual_init() {
        let mut v: HybridVector<i32, 2> = (0..5).collect();
        assert_eq!(v.capacity(), 6);
        let spare = v.spare_capacity_mut();
        assert_eq!(spare.len(), 1);
        spare[0].write(5);
        unsafe {
            v.set_len(6);
        }
        assert_eq!(v, &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn conversions_from_arrays_and_slices() {
        let from_array: HybridVector<u8, 2> = HybridVector::from([1, 2, 3]);
        assert_eq!(from_array, &[1, 2, 3]);

        let slice: &[u8] = &[4, 5];
        let from_slice: HybridVector<u8, 4> = HybridVector::from(slice);
        assert!(from_slice.is_inline());
        assert_eq!(from_slice, &[4, 5]);
    }

    #[test]
    fn default_and_debug() {
        let mut v = HybridVector::<i32, 4>::default();
        v.push(3);
        assert_eq!(format!("{:?}", v), "[3]");
        assert_eq!(format!("{:?}", v.into_iter()), "IntoIter([3])");
    }

    #[test]
    fn ord_hash_and_borrow_traits() {
        let mut a: HybridVector<i32, 4> = HybridVector::new();
        a.extend([1, 2].iter());
        let mut b: HybridVector<i32, 4> = HybridVector::new();
        b.extend([1, 3].iter());
        assert_eq!(a.cmp(&b), Ordering::Less);

        let spilled: HybridVector<i32, 4> = {
            let mut v: HybridVector<i32, 4> = (0..8).collect();
            v.truncate(2);
            v[0] = 1;
            v[1] = 2;
            v
        };
        assert_eq!(hash_of(&a), hash_of(&spilled));

        let as_ref: &[i32] = a.as_ref();
        assert_eq!(as_ref, &[1, 2]);

        let borrowed: &[i32] = a.borrow();
        assert_eq!(borrowed, &[1, 2]);

        let borrowed_mut: &mut [i32] = b.borrow_mut();
        borrowed_mut[0] = 7;
        assert_eq!(b, &[7, 3]);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            HybridVectorError::IndexOutOfRange { index: 4, len: 2 }.to_string(),
            "index (is 4) should be < len (is 2)"
        );
        assert_eq!(
            HybridVectorError::CapacityOverflow.to_string(),
            "HybridVector capacity overflow"
        );
        let layout = Layout::array::<u32>(8).unwrap();
        assert_eq!(
            HybridVectorError::AllocationFailure { layout }.to_string(),
            "HybridVector allocation of 32 bytes (align 4) failed"
        );
    }
}
