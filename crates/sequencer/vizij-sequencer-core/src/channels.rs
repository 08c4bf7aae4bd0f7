//! Fixed-width sparse channel vectors.

use std::fmt::Debug;
use std::ops::{Add, Div, Index, Mul, Sub};

/// Scalar type a channel can hold while blending.
pub trait ChannelScalar:
    Copy
    + Default
    + Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + From<f32>
{
}

impl<T> ChannelScalar for T where
    T: Copy
        + Default
        + Debug
        + PartialOrd
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Div<Output = T>
        + From<f32>
{
}

/// Up to 16 channels of `T`, each individually set or unset.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MultiChannelValue<T, const N: usize> {
    channels: [T; N],
    mask: u16,
}

impl<T: ChannelScalar, const N: usize> Default for MultiChannelValue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ChannelScalar, const N: usize> MultiChannelValue<T, N> {
    const FULL_MASK: u16 = if N >= 16 { u16::MAX } else { (1u16 << N) - 1 };

    pub fn new() -> Self {
        Self {
            channels: [T::default(); N],
            mask: 0,
        }
    }

    /// Every channel set.
    pub fn from_array(channels: [T; N]) -> Self {
        Self {
            channels,
            mask: Self::FULL_MASK,
        }
    }

    #[inline]
    pub const fn num_channels() -> usize {
        N
    }

    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        index < N && self.mask & (1 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn is_full(&self) -> bool {
        self.mask == Self::FULL_MASK
    }

    pub fn mask(&self) -> u16 {
        self.mask
    }

    pub fn set(&mut self, index: usize, value: T) {
        debug_assert!(index < N, "channel {index} out of range for {N} channels");
        if index < N {
            self.channels[index] = value;
            self.mask |= 1 << index;
        }
    }

    /// Add onto a set channel, or set it.
    pub fn increment(&mut self, index: usize, value: T) {
        if self.is_set(index) {
            self.channels[index] = self.channels[index] + value;
        } else {
            self.set(index, value);
        }
    }

    /// Read a channel. Reading an unset channel is a caller bug; release
    /// builds return `T::default()`.
    pub fn get(&self, index: usize) -> T {
        debug_assert!(self.is_set(index), "channel {index} read while unset");
        if self.is_set(index) {
            self.channels[index]
        } else {
            T::default()
        }
    }

    pub fn try_get(&self, index: usize) -> Option<T> {
        self.is_set(index).then(|| self.channels[index])
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Channels as an array; unset channels read as `T::default()`.
    pub fn into_array(self) -> [T; N] {
        let mut out = [T::default(); N];
        for (index, slot) in out.iter_mut().enumerate() {
            if self.is_set(index) {
                *slot = self.channels[index];
            }
        }
        out
    }

    /// `(index, value)` for every set channel, in index order.
    pub fn iter_set(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        (0..N).filter_map(move |i| self.try_get(i).map(|v| (i, v)))
    }
}

impl<T: ChannelScalar, const N: usize> Index<usize> for MultiChannelValue<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        debug_assert!(self.is_set(index), "channel {index} read while unset");
        &self.channels[index]
    }
}
