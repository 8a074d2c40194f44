use alloc::boxed::Box;
use core::marker::PhantomData;
use core::ptr::NonNull;

/// Deallocation strategy of a handle variant.
///
/// Each handle type fixes its strategy through a type parameter,
/// so the releaser can never be swapped out at runtime.
pub (crate) trait Release
{
    /// What the token points to.
    type Target: ?Sized;

    /// Variant name used in diagnostics.
    const NAME: &'static str;

    /// Destroy the resource and free its memory.
    ///
    /// # Safety
    ///
    /// The token must have been produced by the matching allocation
    /// (`Box<T>` for [`Single`], `Box<[T]>` for [`Bulk`]),
    /// and must not be used after this call.
    unsafe fn release(token: NonNull<Self::Target>);
}

/// Single-object release.
pub (crate) struct Single<T>(PhantomData<fn(T)>);

impl<T> Release for Single<T>
{
    type Target = T;

    const NAME: &'static str = "ScalarHandle";

    unsafe fn release(token: NonNull<T>)
    {
        drop(Box::from_raw(token.as_ptr()));
    }
}

/// Bulk release of a contiguous sequence.
///
/// Every element is dropped, then the memory is freed in one go.
pub (crate) struct Bulk<T>(PhantomData<fn(T)>);

impl<T> Release for Bulk<T>
{
    type Target = [T];

    const NAME: &'static str = "ArrayHandle";

    unsafe fn release(token: NonNull<[T]>)
    {
        drop(Box::from_raw(token.as_ptr()));
    }
}
