use core::ops;

use bitvec::prelude::{BitSlice, Msb0};

/// Splits `at` elements off the front of a `&mut [T]`/`&[T]`, replacing
/// `self` with the remainder and returning the prefix.
pub(crate) trait SplitTo {
    fn split_to(&mut self, at: usize) -> Self;
}

impl<'a, T> SplitTo for &'a mut [T] {
    fn split_to(&mut self, at: usize) -> Self {
        let taken = core::mem::take(self);
        let (prefix, rest) = taken.split_at_mut(at);
        *self = rest;
        prefix
    }
}

impl<'a, T> SplitTo for &'a [T] {
    fn split_to(&mut self, at: usize) -> Self {
        let (prefix, rest) = self.split_at(at);
        *self = rest;
        prefix
    }
}

/// Bit-slice cursor used by [`crate::rlgr::decode`]'s leading-run scans.
pub(crate) struct Bits<'a> {
    bits_slice: &'a BitSlice<u8, Msb0>,
}

impl<'a> Bits<'a> {
    pub(crate) fn new(bits_slice: &'a BitSlice<u8, Msb0>) -> Self {
        Self { bits_slice }
    }

    pub(crate) fn split_to(&mut self, at: usize) -> &'a BitSlice<u8, Msb0> {
        let (value, new_bits) = self.bits_slice.split_at(at);
        self.bits_slice = new_bits;
        value
    }
}

impl ops::Deref for Bits<'_> {
    type Target = BitSlice<u8, Msb0>;

    fn deref(&self) -> &Self::Target {
        self.bits_slice
    }
}
