use core::fmt;

/// Raised when accessing the resource of an empty handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NullAccess;

impl fmt::Display for NullAccess
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str("access through an empty handle")
    }
}

/// Panic for an access that requires a resource when there is none.
#[cold]
#[track_caller]
pub (crate) fn null_access() -> !
{
    panic!("{}", NullAccess)
}
