use crate::error::NullAccess;
use crate::error::null_access;
use super::owner::Owner;
use super::release::Release;
use super::release::Single;

use alloc::boxed::Box;
use core::fmt;
use core::mem::MaybeUninit;
use core::ops::Deref;
use core::ops::DerefMut;
use core::ptr;
use core::ptr::NonNull;
use scopeguard::ScopeGuard;
use scopeguard::guard;

/// Exclusive owner of a single heap-allocated value.
///
/// The value is released with single-object deallocation
/// when the handle is dropped, reset, or assigned over.
/// Dereferencing an empty handle panics;
/// use [`value`][`Self::value`] to check first.
///
/// Handles cannot be copied or cloned:
///
/// ```compile_fail
/// # use owning_handle::ScalarHandle;
/// let a = ScalarHandle::from_box(Box::new(1));
/// let b: ScalarHandle<i32> = Clone::clone(&a);
/// ```
///
/// ```compile_fail
/// # use owning_handle::ScalarHandle;
/// let a = ScalarHandle::from_box(Box::new(1));
/// let b = a;
/// let c = a;
/// ```
///
/// Nor can they be converted into implicitly from a raw pointer:
///
/// ```compile_fail
/// # use owning_handle::ScalarHandle;
/// let h: ScalarHandle<i32> = Box::into_raw(Box::new(1)).into();
/// ```
pub struct ScalarHandle<T>
{
    owner: Owner<Single<T>>,
}

impl<T> ScalarHandle<T>
{
    /// Create a handle that owns nothing.
    #[inline]
    pub const fn empty() -> Self
    {
        Self{owner: Owner::empty()}
    }

    /// Take ownership of the value behind a raw pointer.
    ///
    /// A null pointer yields an empty handle.
    ///
    /// # Safety
    ///
    /// A non-null pointer must have been obtained from [`Box::into_raw`]
    /// (or otherwise allocated exactly like a `Box<T>`),
    /// and nothing else may release it afterwards.
    #[inline]
    pub unsafe fn from_raw(raw: *mut T) -> Self
    {
        Self{owner: Owner::from_token(NonNull::new(raw))}
    }

    /// Take ownership of a boxed value.
    #[inline]
    pub fn from_box(value: Box<T>) -> Self
    {
        let token = NonNull::from(Box::leak(value));
        // SAFETY: The token came from a box.
        unsafe { Self{owner: Owner::from_token(Some(token))} }
    }

    /// Whether the handle owns a value.
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

    /// The owned pointer, or null. Ownership stays with the handle.
    #[inline]
    pub fn get(&self) -> *mut T
    {
        self.owner.token().map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Borrow the owned value, if any.
    #[inline]
    pub fn value(&self) -> Option<&T>
    {
        // SAFETY: The handle owns the value, so it is alive.
        self.owner.token().map(|token| unsafe { token.as_ref() })
    }

    /// Mutably borrow the owned value, if any.
    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut T>
    {
        // SAFETY: The handle owns the value and is borrowed mutably.
        self.owner.token().map(|mut token| unsafe { token.as_mut() })
    }

    /// Borrow the owned value, failing if there is none.
    pub fn try_deref(&self) -> Result<&T, NullAccess>
    {
        self.value().ok_or(NullAccess)
    }

    /// Mutably borrow the owned value, failing if there is none.
    pub fn try_deref_mut(&mut self) -> Result<&mut T, NullAccess>
    {
        self.value_mut().ok_or(NullAccess)
    }

    /// Give up ownership and return the raw pointer, or null.
    ///
    /// The caller becomes responsible for releasing the value,
    /// for example with [`Box::from_raw`].
    #[inline]
    #[must_use = "the released value leaks unless it is freed"]
    pub fn release(&mut self) -> *mut T
    {
        self.owner.release().map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Release the owned value, if any, and take ownership of `raw`.
    ///
    /// Resetting to the pointer the handle already owns does nothing.
    ///
    /// # Safety
    ///
    /// Same as for [`from_raw`][`Self::from_raw`].
    /// Pointers are compared by address: if `T` is zero-sized,
    /// every boxed value has the same address as the owned one,
    /// so the call is a no-op and `raw` is never released.
    /// Use [`reset_box`][`Self::reset_box`] to replace zero-sized values.
    #[inline]
    pub unsafe fn reset(&mut self, raw: *mut T)
    {
        self.owner.reset(NonNull::new(raw));
    }

    /// Release the owned value, if any, and take ownership of a boxed value.
    #[inline]
    pub fn reset_box(&mut self, value: Box<T>)
    {
        let token = NonNull::from(Box::leak(value));
        // SAFETY: The token came from a box we were just given,
        //         so it cannot be the one already owned.
        unsafe { self.owner.replace(Some(token)) }
    }

    /// Release the owned value, if any, leaving the handle empty.
    #[inline]
    pub fn clear(&mut self)
    {
        // SAFETY: No token is adopted.
        unsafe { self.owner.replace(None) }
    }

    /// Move the value into a new handle, leaving this one empty.
    #[inline]
    pub fn take(&mut self) -> Self
    {
        Self{owner: self.owner.take()}
    }

    /// Release the owned value, if any, and take over the value of `other`.
    ///
    /// Afterwards `other` is empty.
    #[inline]
    pub fn move_from(&mut self, other: &mut Self)
    {
        self.owner.move_from(&mut other.owner);
    }

    /// Exchange values with another handle.
    #[inline]
    pub fn swap(&mut self, other: &mut Self)
    {
        self.owner.swap(&mut other.owner);
    }

    /// Convert the handle back into a box.
    pub fn into_box(mut self) -> Result<Box<T>, NullAccess>
    {
        let token = self.owner.release().ok_or(NullAccess)?;
        // SAFETY: Handles only own tokens allocated like boxes.
        unsafe { Ok(Box::from_raw(token.as_ptr())) }
    }

    /// Replace the owned value with the result of `f` applied to it.
    ///
    /// The allocation is reused.
    /// If `f` panics, the allocation is freed and the handle is left empty;
    /// the old value is dropped only by `f` itself.
    pub fn update<F>(&mut self, f: F) -> Result<(), NullAccess>
        where F: FnOnce(T) -> T
    {
        let token = self.owner.release().ok_or(NullAccess)?;

        // While `f` runs, the allocation holds no value.
        let storage = guard(token.cast::<MaybeUninit<T>>(), |storage| {
            // SAFETY: Same layout as the box; nothing left to drop.
            unsafe { drop(Box::from_raw(storage.as_ptr())) }
        });

        // SAFETY: The handle owned an initialized value,
        //         and the token was taken out of the handle.
        let value = unsafe { ptr::read(token.as_ptr()) };
        let value = f(value);

        let storage = ScopeGuard::into_inner(storage);
        // SAFETY: The allocation is unoccupied and owned by nobody else,
        //         and the owner was emptied above.
        unsafe {
            storage.as_ptr().write(MaybeUninit::new(value));
            self.owner.replace(Some(storage.cast()));
        }

        Ok(())
    }
}

impl<T> Default for ScalarHandle<T>
{
    fn default() -> Self
    {
        Self::empty()
    }
}

impl<T> Deref for ScalarHandle<T>
{
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T
    {
        match self.value() {
            Some(value) => value,
            None => null_access(),
        }
    }
}

impl<T> DerefMut for ScalarHandle<T>
{
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T
    {
        match self.value_mut() {
            Some(value) => value,
            None => null_access(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ScalarHandle<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let mut tuple = f.debug_tuple(Single::<T>::NAME);
        match self.value() {
            Some(value) => tuple.field(value),
            None => tuple.field(&format_args!("Empty")),
        };
        tuple.finish()
    }
}

impl<T> fmt::Pointer for ScalarHandle<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Pointer::fmt(&self.get(), f)
    }
}
