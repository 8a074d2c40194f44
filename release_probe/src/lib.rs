//! Observe exactly when and how often values are destroyed.
//!
//! A [`Probe`] records its own destruction in the [`Tally`] it came from.
//! Wrapping probes in an owning handle makes every release visible,
//! so tests can assert that a resource was released once, or not at all.

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

/// Shared record of destroyed probes.
///
/// Cloning a tally yields another view of the same record.
#[derive(Clone, Debug, Default)]
pub struct Tally
{
    released: Rc<RefCell<Vec<u32>>>,
}

impl Tally
{
    /// Create a tally with nothing released yet.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Create a probe that reports to this tally.
    pub fn probe(&self, id: u32) -> Probe
    {
        Probe{tally: self.clone(), id}
    }

    /// Create `len` probes with ids `0 .. len`.
    pub fn probes(&self, len: u32) -> Vec<Probe>
    {
        (0 .. len).map(|id| self.probe(id)).collect()
    }

    /// Total number of probes destroyed so far.
    pub fn drops(&self) -> usize
    {
        self.released.borrow().len()
    }

    /// How many times the probe with the given id was destroyed.
    ///
    /// Anything other than zero or one indicates a double release.
    pub fn drops_of(&self, id: u32) -> usize
    {
        self.released.borrow().iter().filter(|&&r| r == id).count()
    }

    /// Ids of destroyed probes, in order of destruction.
    pub fn released(&self) -> Vec<u32>
    {
        self.released.borrow().clone()
    }
}

/// Value that reports its destruction to a [`Tally`].
#[derive(Debug)]
pub struct Probe
{
    tally: Tally,
    id: u32,
}

impl Probe
{
    /// The id this probe was created with.
    pub fn id(&self) -> u32
    {
        self.id
    }
}

impl Drop for Probe
{
    fn drop(&mut self)
    {
        self.tally.released.borrow_mut().push(self.id);
    }
}
