//! Zero-sized values whose drops are counted per thread.
//!
//! Every boxed zero-sized value has the same dangling address,
//! so these catch code that tells resources apart by address.

use core::cell::Cell;

std::thread_local!
{
    static MARKER_DROPS: Cell<usize> = Cell::new(0);
}

/// Zero-sized value that counts its own drops.
#[derive(Debug)]
pub (crate) struct Marker;

impl Drop for Marker
{
    fn drop(&mut self)
    {
        MARKER_DROPS.with(|drops| drops.set(drops.get() + 1));
    }
}

/// Markers dropped on this thread so far.
///
/// Tests may share a thread, so compare differences, not absolute counts.
pub (crate) fn marker_drops() -> usize
{
    MARKER_DROPS.with(Cell::get)
}
