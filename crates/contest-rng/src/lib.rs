//! Fast bounded sampling for solution code.
//!
//! Each call draws a single `u64` and maps slices of it onto the requested ranges
//! with a widening multiply-shift. There is no rejection step, so a range of
//! `width` values is skewed by at most `width / 2^bits`.

use std::ops::{Range, RangeInclusive};

use rand::RngCore;

mod sealed {
    pub trait Sealed {}
}

/// Primitive integers that can be offset by an unsigned distance.
pub trait SampleInt: Copy + sealed::Sealed {
    /// `end - start` in the type's unsigned two's-complement domain.
    fn distance(start: Self, end: Self) -> u128;
    fn offset(start: Self, delta: u64) -> Self;
    fn at_most(self, other: Self) -> bool;
}

macro_rules! impl_sample_int {
    ($($t:ty => $u:ty),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl SampleInt for $t {
            #[inline]
            fn distance(start: Self, end: Self) -> u128 {
                (end as $u).wrapping_sub(start as $u) as u128
            }

            #[inline]
            fn offset(start: Self, delta: u64) -> Self {
                (start as $u).wrapping_add(delta as $u) as $t
            }

            #[inline]
            fn at_most(self, other: Self) -> bool {
                self <= other
            }
        }
    )*};
}

impl_sample_int! {
    u8 => u8, u16 => u16, u32 => u32, u64 => u64, usize => usize,
    u128 => u128,
    i8 => u8, i16 => u16, i32 => u32, i64 => u64, isize => usize,
    i128 => u128,
}

/// A range with a known lower bound and number of values.
pub trait BoundedRange<T> {
    fn low(&self) -> T;
    /// Number of values in the range, `None` when it is empty.
    fn width(&self) -> Option<u128>;
}

impl<T: SampleInt> BoundedRange<T> for Range<T> {
    fn low(&self) -> T {
        self.start
    }

    fn width(&self) -> Option<u128> {
        if self.end.at_most(self.start) {
            None
        } else {
            Some(T::distance(self.start, self.end))
        }
    }
}

impl<T: SampleInt> BoundedRange<T> for RangeInclusive<T> {
    fn low(&self) -> T {
        *self.start()
    }

    fn width(&self) -> Option<u128> {
        if self.start().at_most(*self.end()) {
            // Saturates for a full 128-bit range; `sample` rejects it as too wide.
            let width = T::distance(*self.start(), *self.end())
                .checked_add(1)
                .unwrap_or(u128::MAX);
            Some(width)
        } else {
            None
        }
    }
}

fn sample<T: SampleInt, R: BoundedRange<T>>(range: R, bits: u32, raw: u64) -> T {
    let Some(width) = range.width() else {
        panic!("cannot sample empty range");
    };
    assert!(
        width <= 1u128 << bits,
        "range of width {width} does not fit in {bits} bits"
    );
    let slice = if bits == 64 {
        raw
    } else {
        raw & ((1u64 << bits) - 1)
    };
    let value = (width * slice as u128) >> bits;
    T::offset(range.low(), value as u64)
}

/// Multi-value bounded sampling from a single 64-bit draw.
///
/// The `uNNxK` variants take `K` values from disjoint `NN`-bit slices of the draw,
/// so every range passed to them must hold at most `2^NN` values.
pub trait RandExtension {
    fn fast_gen_range_u64x1<T: SampleInt, R: BoundedRange<T>>(&mut self, range: R) -> T;

    fn fast_gen_range_u32x1<T: SampleInt, R: BoundedRange<T>>(&mut self, range: R) -> T;

    fn fast_gen_range_u32x2<T0, T1, R0, R1>(&mut self, range0: R0, range1: R1) -> (T0, T1)
    where
        T0: SampleInt,
        T1: SampleInt,
        R0: BoundedRange<T0>,
        R1: BoundedRange<T1>;

    fn fast_gen_range_u16x1<T: SampleInt, R: BoundedRange<T>>(&mut self, range: R) -> T;

    fn fast_gen_range_u16x2<T0, T1, R0, R1>(&mut self, range0: R0, range1: R1) -> (T0, T1)
    where
        T0: SampleInt,
        T1: SampleInt,
        R0: BoundedRange<T0>,
        R1: BoundedRange<T1>;

    fn fast_gen_range_u16x3<T0, T1, T2, R0, R1, R2>(
        &mut self,
        range0: R0,
        range1: R1,
        range2: R2,
    ) -> (T0, T1, T2)
    where
        T0: SampleInt,
        T1: SampleInt,
        T2: SampleInt,
        R0: BoundedRange<T0>,
        R1: BoundedRange<T1>,
        R2: BoundedRange<T2>;

    #[allow(clippy::type_complexity)]
    fn fast_gen_range_u16x4<T0, T1, T2, T3, R0, R1, R2, R3>(
        &mut self,
        range0: R0,
        range1: R1,
        range2: R2,
        range3: R3,
    ) -> (T0, T1, T2, T3)
    where
        T0: SampleInt,
        T1: SampleInt,
        T2: SampleInt,
        T3: SampleInt,
        R0: BoundedRange<T0>,
        R1: BoundedRange<T1>,
        R2: BoundedRange<T2>,
        R3: BoundedRange<T3>;
}

impl<G: RngCore + ?Sized> RandExtension for G {
    fn fast_gen_range_u64x1<T: SampleInt, R: BoundedRange<T>>(&mut self, range: R) -> T {
        sample(range, 64, self.next_u64())
    }

    fn fast_gen_range_u32x1<T: SampleInt, R: BoundedRange<T>>(&mut self, range: R) -> T {
        sample(range, 32, self.next_u64())
    }

    fn fast_gen_range_u32x2<T0, T1, R0, R1>(&mut self, range0: R0, range1: R1) -> (T0, T1)
    where
        T0: SampleInt,
        T1: SampleInt,
        R0: BoundedRange<T0>,
        R1: BoundedRange<T1>,
    {
        let raw = self.next_u64();
        (sample(range0, 32, raw), sample(range1, 32, raw >> 32))
    }

    fn fast_gen_range_u16x1<T: SampleInt, R: BoundedRange<T>>(&mut self, range: R) -> T {
        sample(range, 16, self.next_u64())
    }

    fn fast_gen_range_u16x2<T0, T1, R0, R1>(&mut self, range0: R0, range1: R1) -> (T0, T1)
    where
        T0: SampleInt,
        T1: SampleInt,
        R0: BoundedRange<T0>,
        R1: BoundedRange<T1>,
    {
        let raw = self.next_u64();
        (sample(range0, 16, raw), sample(range1, 16, raw >> 16))
    }

    fn fast_gen_range_u16x3<T0, T1, T2, R0, R1, R2>(
        &mut self,
        range0: R0,
        range1: R1,
        range2: R2,
    ) -> (T0, T1, T2)
    where
        T0: SampleInt,
        T1: SampleInt,
        T2: SampleInt,
        R0: BoundedRange<T0>,
        R1: BoundedRange<T1>,
        R2: BoundedRange<T2>,
    {
        let raw = self.next_u64();
        (
            sample(range0, 16, raw),
            sample(range1, 16, raw >> 16),
            sample(range2, 16, raw >> 32),
        )
    }

    fn fast_gen_range_u16x4<T0, T1, T2, T3, R0, R1, R2, R3>(
        &mut self,
        range0: R0,
        range1: R1,
        range2: R2,
        range3: R3,
    ) -> (T0, T1, T2, T3)
    where
        T0: SampleInt,
        T1: SampleInt,
        T2: SampleInt,
        T3: SampleInt,
        R0: BoundedRange<T0>,
        R1: BoundedRange<T1>,
        R2: BoundedRange<T2>,
        R3: BoundedRange<T3>,
    {
        let raw = self.next_u64();
        (
            sample(range0, 16, raw),
            sample(range1, 16, raw >> 16),
            sample(range2, 16, raw >> 32),
            sample(range3, 16, raw >> 48),
        )
    }
}
