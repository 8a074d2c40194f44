use crate::error::NullAccess;
use crate::error::null_access;
use super::owner::Owner;
use super::release::Bulk;
use super::release::Release;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;
use core::ops::IndexMut;
use core::ptr;
use core::ptr::NonNull;

/// Exclusive owner of a heap-allocated sequence.
///
/// The elements are released together, with bulk deallocation,
/// when the handle is dropped, reset, or assigned over.
/// The token is a slice pointer, so it carries the element count;
/// the handle itself stores nothing else.
///
/// Indexing panics on an empty handle or an out-of-range index.
/// [`element_at_unchecked`][`Self::element_at_unchecked`]
/// leaves both checks to the caller.
///
/// Handles cannot be cloned:
///
/// ```compile_fail
/// # use owning_handle::ArrayHandle;
/// let a = ArrayHandle::from_vec(vec![1, 2, 3]);
/// let b: ArrayHandle<i32> = Clone::clone(&a);
/// ```
///
/// And they are confined to the thread that created them:
///
/// ```compile_fail
/// # use owning_handle::ArrayHandle;
/// fn send<T: Send>(_: T) {}
/// send(ArrayHandle::from_vec(vec![1, 2, 3]));
/// ```
pub struct ArrayHandle<T>
{
    owner: Owner<Bulk<T>>,
}

impl<T> ArrayHandle<T>
{
    /// Create a handle that owns nothing.
    #[inline]
    pub const fn empty() -> Self
    {
        Self{owner: Owner::empty()}
    }

    /// Take ownership of the elements behind a raw slice pointer.
    ///
    /// A pointer with a null address yields an empty handle.
    ///
    /// # Safety
    ///
    /// A non-null pointer must have been obtained from [`Box::into_raw`]
    /// on a `Box<[T]>` of exactly this length,
    /// and nothing else may release it afterwards.
    /// Pointers to single boxed values must not be passed here.
    #[inline]
    pub unsafe fn from_raw(raw: *mut [T]) -> Self
    {
        Self{owner: Owner::from_token(NonNull::new(raw))}
    }

    /// Take ownership of a boxed slice.
    #[inline]
    pub fn from_boxed_slice(elements: Box<[T]>) -> Self
    {
        let token = NonNull::from(Box::leak(elements));
        // SAFETY: The token came from a boxed slice.
        unsafe { Self{owner: Owner::from_token(Some(token))} }
    }

    /// Take ownership of the elements of a vector.
    ///
    /// Excess capacity is freed first.
    #[inline]
    pub fn from_vec(elements: Vec<T>) -> Self
    {
        Self::from_boxed_slice(elements.into_boxed_slice())
    }

    /// Whether the handle owns a sequence, possibly of length zero.
    #[inline]
    pub fn is_some(&self) -> bool
    {
        self.owner.is_some()
    }

    /// Whether the handle owns nothing.
    #[inline]
    pub fn is_empty(&self) -> bool
    {
        !self.is_some()
    }

    /// Number of owned elements; zero for an empty handle.
    #[inline]
    pub fn len(&self) -> usize
    {
        self.owner.token().map_or(0, |token| token.len())
    }

    /// The owned slice pointer, or a null one of length zero.
    /// Ownership stays with the handle.
    #[inline]
    pub fn get(&self) -> *mut [T]
    {
        match self.owner.token() {
            Some(token) => token.as_ptr(),
            None => ptr::slice_from_raw_parts_mut(ptr::null_mut(), 0),
        }
    }

    /// Borrow the owned elements, if any.
    #[inline]
    pub fn as_slice(&self) -> Option<&[T]>
    {
        // SAFETY: The handle owns the elements, so they are alive.
        self.owner.token().map(|token| unsafe { token.as_ref() })
    }

    /// Mutably borrow the owned elements, if any.
    #[inline]
    pub fn as_mut_slice(&mut self) -> Option<&mut [T]>
    {
        // SAFETY: The handle owns the elements and is borrowed mutably.
        self.owner.token().map(|mut token| unsafe { token.as_mut() })
    }

    /// Borrow the element at `index` without any checks.
    ///
    /// # Safety
    ///
    /// The handle must not be empty and `index` must be in bounds.
    /// With debug assertions enabled, violations panic.
    #[inline]
    pub unsafe fn element_at_unchecked(&self, index: usize) -> &T
    {
        debug_assert!(index < self.len(), "index {} out of bounds", index);
        self.as_slice().unwrap_unchecked().get_unchecked(index)
    }

    /// Mutably borrow the element at `index` without any checks.
    ///
    /// # Safety
    ///
    /// Same as for [`element_at_unchecked`][`Self::element_at_unchecked`].
    #[inline]
    pub unsafe fn element_at_unchecked_mut(&mut self, index: usize) -> &mut T
    {
        debug_assert!(index < self.len(), "index {} out of bounds", index);
        self.as_mut_slice().unwrap_unchecked().get_unchecked_mut(index)
    }

    /// Give up ownership and return the raw slice pointer.
    ///
    /// For an empty handle, the pointer is null.
    /// The caller becomes responsible for releasing the elements,
    /// for example with [`Box::from_raw`].
    #[inline]
    #[must_use = "the released elements leak unless they are freed"]
    pub fn release(&mut self) -> *mut [T]
    {
        match self.owner.release() {
            Some(token) => token.as_ptr(),
            None => ptr::slice_from_raw_parts_mut(ptr::null_mut(), 0),
        }
    }

    /// Release the owned elements, if any, and take ownership of `raw`.
    ///
    /// Resetting to the pointer the handle already owns does nothing.
    ///
    /// # Safety
    ///
    /// Same as for [`from_raw`][`Self::from_raw`].
    /// Pointers are compared by address only, ignoring the length:
    /// if `T` is zero-sized, or both sequences are empty,
    /// a fresh pointer counts as the owned one,
    /// so the call is a no-op and `raw` is never released.
    /// Use [`reset_boxed_slice`][`Self::reset_boxed_slice`] instead.
    #[inline]
    pub unsafe fn reset(&mut self, raw: *mut [T])
    {
        self.owner.reset(NonNull::new(raw));
    }

    /// Release the owned elements, if any, and take ownership of new ones.
    #[inline]
    pub fn reset_boxed_slice(&mut self, elements: Box<[T]>)
    {
        let token = NonNull::from(Box::leak(elements));
        // SAFETY: The token came from a boxed slice we were just given,
        //         so it cannot be the one already owned.
        unsafe { self.owner.replace(Some(token)) }
    }

    /// Release the owned elements, if any, leaving the handle empty.
    #[inline]
    pub fn clear(&mut self)
    {
        // SAFETY: No token is adopted.
        unsafe { self.owner.replace(None) }
    }

    /// Move the elements into a new handle, leaving this one empty.
    #[inline]
    pub fn take(&mut self) -> Self
    {
        Self{owner: self.owner.take()}
    }

    /// Release the owned elements, if any,
    /// and take over the elements of `other`.
    ///
    /// Afterwards `other` is empty.
    #[inline]
    pub fn move_from(&mut self, other: &mut Self)
    {
        self.owner.move_from(&mut other.owner);
    }

    /// Exchange elements with another handle.
    #[inline]
    pub fn swap(&mut self, other: &mut Self)
    {
        self.owner.swap(&mut other.owner);
    }

    /// Convert the handle back into a boxed slice.
    pub fn into_boxed_slice(mut self) -> Result<Box<[T]>, NullAccess>
    {
        let token = self.owner.release().ok_or(NullAccess)?;
        // SAFETY: Handles only own tokens allocated like boxed slices.
        unsafe { Ok(Box::from_raw(token.as_ptr())) }
    }
}

impl<T> Default for ArrayHandle<T>
{
    fn default() -> Self
    {
        Self::empty()
    }
}

impl<T> Index<usize> for ArrayHandle<T>
{
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T
    {
        match self.as_slice() {
            Some(elements) => &elements[index],
            None => null_access(),
        }
    }
}

impl<T> IndexMut<usize> for ArrayHandle<T>
{
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T
    {
        match self.as_mut_slice() {
            Some(elements) => &mut elements[index],
            None => null_access(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ArrayHandle<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let mut tuple = f.debug_tuple(Bulk::<T>::NAME);
        match self.as_slice() {
            Some(elements) => tuple.field(&elements),
            None => tuple.field(&format_args!("Empty")),
        };
        tuple.finish()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    use alloc::format;
    use alloc::vec;
    use proptest::proptest;
    use release_probe::Probe;
    use release_probe::Tally;
    use super::super::testing::Marker;
    use super::super::testing::marker_drops;

    fn probe_array(tally: &Tally, len: u32) -> ArrayHandle<Probe>
    {
        ArrayHandle::from_vec(tally.probes(len))
    }

    fn sorted(mut ids: Vec<u32>) -> Vec<u32>
    {
        ids.sort_unstable();
        ids
    }

    #[test]
    fn empty_handle()
    {
        let handle = ArrayHandle::<u8>::default();
        assert!(handle.is_empty());
        assert_eq!(handle.len(), 0);
        assert!(handle.get().is_null());
        assert_eq!(handle.as_slice(), None);
        assert_eq!(handle.into_boxed_slice(), Err(NullAccess));
    }

    #[test]
    fn five_elements_released_in_bulk()
    {
        let tally = Tally::new();
        let handle = probe_array(&tally, 5);
        assert_eq!(handle.len(), 5);
        assert_eq!(handle[2].id(), 2);
        assert_eq!(unsafe { handle.element_at_unchecked(4) }.id(), 4);

        drop(handle);
        assert_eq!(sorted(tally.released()), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_length_sequence_is_owned()
    {
        let handle = ArrayHandle::<u8>::from_vec(Vec::new());
        assert!(handle.is_some());
        assert_eq!(handle.len(), 0);
        assert_eq!(handle.as_slice(), Some(&[][..]));
    }

    #[test]
    fn from_raw_adopts_pointer()
    {
        let tally = Tally::new();
        let raw = Box::into_raw(tally.probes(3).into_boxed_slice());
        let handle = unsafe { ArrayHandle::from_raw(raw) };
        assert_eq!(handle.get(), raw);
        drop(handle);
        assert_eq!(tally.drops(), 3);
    }

    #[test]
    fn release_transfers_responsibility()
    {
        let tally = Tally::new();
        let mut handle = probe_array(&tally, 2);
        let raw = handle.release();
        assert!(handle.is_empty());
        drop(handle);
        assert_eq!(tally.drops(), 0);

        drop(unsafe { Box::from_raw(raw) });
        assert_eq!(tally.drops(), 2);
    }

    #[test]
    fn assignment_releases_previous()
    {
        let tally = Tally::new();
        let mut a = probe_array(&tally, 2);
        let b = ArrayHandle::from_vec(vec![tally.probe(10)]);

        a = b;
        assert_eq!(sorted(tally.released()), [0, 1]);
        assert_eq!(a[0].id(), 10);
    }

    #[test]
    fn move_from_empties_source()
    {
        let tally = Tally::new();
        let mut a = ArrayHandle::empty();
        let mut b = probe_array(&tally, 3);
        a.move_from(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.len(), 3);
        assert_eq!(tally.drops(), 0);
    }

    #[test]
    fn self_reset_keeps_elements()
    {
        let tally = Tally::new();
        let mut handle = probe_array(&tally, 3);
        let raw = handle.get();
        unsafe { handle.reset(raw) };
        assert_eq!(tally.drops(), 0);
        assert_eq!(handle.len(), 3);
    }

    #[test]
    fn reset_releases_old_then_binds_new()
    {
        let tally = Tally::new();
        let mut handle = probe_array(&tally, 2);
        handle.reset_boxed_slice(vec![tally.probe(7)].into_boxed_slice());
        assert_eq!(sorted(tally.released()), [0, 1]);
        assert_eq!(handle[0].id(), 7);

        handle.clear();
        assert_eq!(tally.drops_of(7), 1);
        assert!(handle.is_empty());
    }

    #[test]
    fn take_and_swap()
    {
        let mut a = ArrayHandle::from_vec(vec![1, 2]);
        let mut b = a.take();
        assert!(a.is_empty());
        a.swap(&mut b);
        assert_eq!(a.as_slice(), Some(&[1, 2][..]));
        assert!(b.is_empty());
    }

    #[test]
    fn index_mut_writes_through()
    {
        let mut handle = ArrayHandle::from_vec(vec![0u32; 4]);
        handle[1] = 5;
        unsafe { *handle.element_at_unchecked_mut(3) = 9 };
        assert_eq!(&*handle.into_boxed_slice().unwrap(), [0, 5, 0, 9]);
    }

    #[test]
    #[should_panic(expected = "access through an empty handle")]
    fn index_of_empty_panics()
    {
        let handle = ArrayHandle::<u32>::empty();
        let _element: u32 = handle[0];
    }

    #[test]
    #[should_panic]
    fn index_out_of_range_panics()
    {
        let handle = ArrayHandle::from_vec(vec![1u32, 2, 3]);
        let _element: u32 = handle[3];
    }

    #[test]
    fn debug_format()
    {
        let handle = ArrayHandle::from_vec(vec![1, 2]);
        assert_eq!(format!("{:?}", handle), "ArrayHandle([1, 2])");
        let empty = ArrayHandle::<i32>::empty();
        assert_eq!(format!("{:?}", empty), "ArrayHandle(Empty)");
    }

    fn markers(len: usize) -> Vec<Marker>
    {
        (0 .. len).map(|_| Marker).collect()
    }

    #[test]
    fn zero_sized_move_from_takes_other_length()
    {
        let before = marker_drops();
        let mut a = ArrayHandle::from_vec(markers(3));
        let mut b = ArrayHandle::from_vec(markers(2));

        a.move_from(&mut b);
        assert_eq!(marker_drops() - before, 3);
        assert_eq!(a.len(), 2);
        assert!(b.is_empty());

        drop(a);
        assert_eq!(marker_drops() - before, 5);
    }

    #[test]
    fn zero_sized_reset_boxed_slice_releases_previous()
    {
        let before = marker_drops();
        let mut handle = ArrayHandle::from_vec(markers(4));
        handle.reset_boxed_slice(markers(1).into_boxed_slice());
        assert_eq!(marker_drops() - before, 4);
        assert_eq!(handle.len(), 1);

        drop(handle);
        assert_eq!(marker_drops() - before, 5);
    }

    #[test]
    fn empty_sequences_are_distinct_resources()
    {
        let tally = Tally::new();
        let mut a = ArrayHandle::<Probe>::from_vec(Vec::new());
        let mut b = ArrayHandle::from_vec(Vec::new());
        a.move_from(&mut b);
        assert!(a.is_some());
        assert!(b.is_empty());

        a.reset_boxed_slice(tally.probes(2).into_boxed_slice());
        assert_eq!(a.len(), 2);
        drop(a);
        assert_eq!(tally.drops(), 2);
    }

    proptest!
    {
        #[test]
        fn every_element_released_once(len in 0u32 .. 64)
        {
            let tally = Tally::new();
            let handle = probe_array(&tally, len);
            assert_eq!(handle.len(), len as usize);
            for i in 0 .. len {
                assert_eq!(handle[i as usize].id(), i);
            }

            drop(handle);
            for id in 0 .. len {
                assert_eq!(tally.drops_of(id), 1);
            }
        }

        #[test]
        fn owns_arbitrary_elements(elements: Vec<i64>)
        {
            let handle = ArrayHandle::from_vec(elements.clone());
            assert_eq!(handle.as_slice(), Some(&elements[..]));
            assert_eq!(handle.into_boxed_slice().unwrap().into_vec(), elements);
        }

        #[test]
        fn zero_sized_resets_release_every_element(
            lens in proptest::collection::vec(0usize .. 8, 1 .. 16),
        )
        {
            let before = marker_drops();
            let mut handle = ArrayHandle::empty();
            let mut released = 0;

            for len in lens.iter().copied() {
                released += handle.len();
                let mut other = ArrayHandle::from_vec(markers(len));
                handle.move_from(&mut other);
                assert_eq!(marker_drops() - before, released);
                assert_eq!(handle.len(), len);
            }

            drop(handle);
            assert_eq!(marker_drops() - before, lens.iter().sum::<usize>());
        }
    }
}
