use super::release::Release;

use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

/// State machine shared by all handle variants.
///
/// An owner is either empty or owning exactly one token.
/// Every transition that drops a token goes through [`discard`],
/// and every transition that hands a token out empties the owner first,
/// so a token is released at most once.
///
/// [`NonNull`] keeps owners `!Send` and `!Sync`.
pub (crate) struct Owner<R: Release>
{
    token: Option<NonNull<R::Target>>,
    _owns: PhantomData<R::Target>,
}

impl<R: Release> Owner<R>
{
    /// Create an owner without a token.
    #[inline]
    pub (crate) const fn empty() -> Self
    {
        Self{token: None, _owns: PhantomData}
    }

    /// Create an owner responsible for the given token.
    ///
    /// # Safety
    ///
    /// The token must be releasable by `R`,
    /// and nothing else may release it.
    #[inline]
    pub (crate) unsafe fn from_token(token: Option<NonNull<R::Target>>)
        -> Self
    {
        Self{token, _owns: PhantomData}
    }

    /// The current token, if any. Ownership stays with the owner.
    #[inline]
    pub (crate) fn token(&self) -> Option<NonNull<R::Target>>
    {
        self.token
    }

    /// Whether the owner currently holds a token.
    #[inline]
    pub (crate) fn is_some(&self) -> bool
    {
        self.token.is_some()
    }

    /// Give up the token without releasing it.
    #[inline]
    pub (crate) fn release(&mut self) -> Option<NonNull<R::Target>>
    {
        self.token.take()
    }

    /// Release the current token, if any, and adopt the given one.
    ///
    /// Passing the token that is already owned does nothing.
    /// Tokens are compared by address,
    /// so for zero-sized targets every token counts as already owned;
    /// use [`replace`][`Self::replace`] when the token is known to be fresh.
    ///
    /// # Safety
    ///
    /// Same as for [`from_token`][`Self::from_token`].
    pub (crate) unsafe fn reset(&mut self, token: Option<NonNull<R::Target>>)
    {
        if same_address(self.token, token) {
            return;
        }

        self.replace(token);
    }

    /// Release the current token, if any, and adopt the given one.
    ///
    /// The new token is bound before the old one is released,
    /// so the owner stays consistent even if releasing panics.
    ///
    /// # Safety
    ///
    /// Same as for [`from_token`][`Self::from_token`].
    /// In addition, the token must not be the one currently owned.
    pub (crate) unsafe fn replace(&mut self, token: Option<NonNull<R::Target>>)
    {
        if let Some(old) = mem::replace(&mut self.token, token) {
            discard::<R>(old);
        }
    }

    /// Release the current token, if any, and adopt the token of `other`.
    ///
    /// Afterwards `other` is empty.
    pub (crate) fn move_from(&mut self, other: &mut Self)
    {
        let token = other.release();
        // SAFETY: The token was owned by `other`, which gave it up,
        //         and `other` is a different owner than `self`.
        unsafe { self.replace(token) }
    }

    /// Move the token into a new owner, leaving this one empty.
    #[inline]
    pub (crate) fn take(&mut self) -> Self
    {
        Self{token: self.release(), _owns: PhantomData}
    }

    /// Exchange tokens with another owner. Nothing is released.
    #[inline]
    pub (crate) fn swap(&mut self, other: &mut Self)
    {
        mem::swap(&mut self.token, &mut other.token);
    }
}

impl<R: Release> Drop for Owner<R>
{
    fn drop(&mut self)
    {
        if let Some(token) = self.token.take() {
            // SAFETY: The owner was solely responsible for the token.
            unsafe { discard::<R>(token) }
        }
    }
}

/// Release a token through the releaser of `R`.
unsafe fn discard<R: Release>(token: NonNull<R::Target>)
{
    trace_release!(R::NAME, token);
    R::release(token);
}

/// Compare tokens by address only.
///
/// Slice tokens also carry a length,
/// which does not matter for telling resources apart.
fn same_address<T: ?Sized>(a: Option<NonNull<T>>, b: Option<NonNull<T>>)
    -> bool
{
    a.map(NonNull::cast::<u8>) == b.map(NonNull::cast::<u8>)
}
