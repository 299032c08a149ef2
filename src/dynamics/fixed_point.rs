//! Fixed-point force encoding for race-free parallel accumulation.
//!
//! Floats cannot be summed with an atomic add, so every force contribution is
//! scaled by `2^shift`, rounded to an `i32` and added into an [`AtomicI64`].
//! Integer addition is associative and commutative, so the accumulated total is
//! identical for any arrival order of the contributions.
//!
//! Overflow bound: a single encoded value saturates at `±i32::MAX / 2^shift`
//! (8192 at the default shift of 18). Totals live in 64 bits, so up to
//! [`MAX_CONTRIBUTIONS`] saturated contributions fit before a cell could wrap.
//! Quantization error is at most half of `1 / 2^shift` per contribution.

use std::sync::atomic::{AtomicI64, Ordering};

use glam::Vec2;

use crate::{
    config::DEFAULT_FIXED_POINT_SHIFT,
    error::{Result, SimError},
};

/// Smallest supported shift; coarser scales lose too much precision.
pub const MIN_SHIFT: u32 = 8;

/// Largest supported shift; finer scales leave too little headroom.
pub const MAX_SHIFT: u32 = 24;

/// Contributions one accumulator may receive between clears. Each is at most
/// `2^31` in magnitude, so the total stays inside `i64`.
pub const MAX_CONTRIBUTIONS: u64 = 1 << 32;

/// Scale-and-round conversion between float forces and integer accumulators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceCodec {
    shift: u32,
    scale: f32,
    inv_scale: f32,
}

impl Default for ForceCodec {
    fn default() -> Self {
        Self::from_shift(DEFAULT_FIXED_POINT_SHIFT)
    }
}

impl ForceCodec {
    pub fn new(shift: u32) -> Result<Self> {
        if !(MIN_SHIFT..=MAX_SHIFT).contains(&shift) {
            return Err(SimError::config(format!(
                "fixed-point shift must be in {MIN_SHIFT}..={MAX_SHIFT}, got {shift}"
            )));
        }
        Ok(Self::from_shift(shift))
    }

    fn from_shift(shift: u32) -> Self {
        let scale = (1u32 << shift) as f32;
        Self {
            shift,
            scale,
            inv_scale: 1.0 / scale,
        }
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Smallest representable force step.
    pub fn resolution(&self) -> f32 {
        self.inv_scale
    }

    /// Largest magnitude that encodes without saturating.
    pub fn max_magnitude(&self) -> f32 {
        i32::MAX as f32 * self.inv_scale
    }

    /// `round(f * scale)`, saturating at the `i32` range. NaN encodes to zero.
    #[inline]
    pub fn encode(&self, force: f32) -> i32 {
        // `as` saturates out-of-range floats.
        (force * self.scale).round() as i32
    }

    #[inline]
    pub fn decode(&self, raw: i32) -> f32 {
        raw as f32 * self.inv_scale
    }

    #[inline]
    pub fn encode_vec(&self, force: Vec2) -> [i32; 2] {
        [self.encode(force.x), self.encode(force.y)]
    }

    #[inline]
    pub fn decode_vec(&self, raw: [i32; 2]) -> Vec2 {
        Vec2::new(self.decode(raw[0]), self.decode(raw[1]))
    }

    /// Decodes an accumulated total, which may exceed the single-value range.
    #[inline]
    pub fn decode_sum(&self, raw: i64) -> f32 {
        (raw as f64 * self.inv_scale as f64) as f32
    }

    #[inline]
    pub fn decode_sum_vec(&self, raw: [i64; 2]) -> Vec2 {
        Vec2::new(self.decode_sum(raw[0]), self.decode_sum(raw[1]))
    }
}

/// Pair of atomic fixed-point cells accumulating a 2D force.
///
/// Same size and alignment as `[i64; 2]`.
#[repr(C)]
#[derive(Debug, Default)]
pub struct AtomicForce {
    x: AtomicI64,
    y: AtomicI64,
}

impl AtomicForce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `force` and adds it into both cells.
    ///
    /// Relaxed ordering is enough: readers only observe the total after the
    /// dispatch barrier that ends the stage.
    #[inline]
    pub fn add(&self, codec: &ForceCodec, force: Vec2) {
        let [x, y] = codec.encode_vec(force);
        self.add_raw([x, y]);
    }

    #[inline]
    pub fn add_raw(&self, raw: [i32; 2]) {
        if raw[0] != 0 {
            self.x.fetch_add(i64::from(raw[0]), Ordering::Relaxed);
        }
        if raw[1] != 0 {
            self.y.fetch_add(i64::from(raw[1]), Ordering::Relaxed);
        }
    }

    pub fn raw(&self) -> [i64; 2] {
        [self.x.load(Ordering::Relaxed), self.y.load(Ordering::Relaxed)]
    }

    pub fn load(&self, codec: &ForceCodec) -> Vec2 {
        codec.decode_sum_vec(self.raw())
    }

    pub fn store_raw(&self, raw: [i64; 2]) {
        self.x.store(raw[0], Ordering::Relaxed);
        self.y.store(raw[1], Ordering::Relaxed);
    }

    /// Non-atomic overwrite for a slot owned exclusively by the caller.
    pub fn set_raw(&mut self, raw: [i64; 2]) {
        *self.x.get_mut() = raw[0];
        *self.y.get_mut() = raw[1];
    }

    /// Non-atomic read for a slot owned exclusively by the caller.
    pub fn raw_mut(&mut self) -> [i64; 2] {
        [*self.x.get_mut(), *self.y.get_mut()]
    }

    pub fn clear(&self) {
        self.store_raw([0, 0]);
    }
}

impl Clone for AtomicForce {
    fn clone(&self) -> Self {
        let [x, y] = self.raw();
        Self {
            x: AtomicI64::new(x),
            y: AtomicI64::new(y),
        }
    }
}
