//! Fixed-window rolling averages for frame-to-frame smoothing.
//!
//! The window always averages exactly `W` slots. The first sample is
//! replicated into every slot, so the first window is biased toward it.

use std::ops::{Add, Mul};

use glam::Vec3;

/// Lifecycle of a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    /// No sample seen since creation or the last reset.
    #[default]
    Uninitialized,
    /// Every slot holds the first sample.
    Warm,
    /// At least one slot has been overwritten after warm-up.
    Steady,
}

/// Circular buffer of `W ≥ 1` samples with a constant-cost average.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    slots: Vec<T>,
    capacity: usize,
    next: usize,
    state: WindowState,
}

impl<T> RollingWindow<T>
where
    T: Copy + Default + Add<Output = T> + Mul<f32, Output = T>,
{
    /// Creates a window holding `size` samples. A size of zero is treated as one.
    pub fn new(size: usize) -> Self {
        let capacity = size.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            next: 0,
            state: WindowState::Uninitialized,
        }
    }

    /// Returns the window size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Pushes a sample and returns the new average.
    pub fn push(&mut self, sample: T) -> T {
        match self.state {
            WindowState::Uninitialized => {
                self.slots.clear();
                self.slots.resize(self.capacity, sample);
                self.next = 0;
                self.state = WindowState::Warm;
            }
            WindowState::Warm | WindowState::Steady => {
                self.slots[self.next] = sample;
                self.next = (self.next + 1) % self.capacity;
                self.state = WindowState::Steady;
            }
        }
        self.average()
    }

    /// Returns the mean of all slots, or `T::default()` before the first sample.
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> T {
        if self.slots.is_empty() {
            return T::default();
        }
        let sum = self
            .slots
            .iter()
            .fold(T::default(), |acc, &sample| acc + sample);
        sum * (1.0 / self.capacity as f32)
    }

    /// Drops all samples and returns to [`WindowState::Uninitialized`].
    pub fn reset(&mut self) {
        self.slots.clear();
        self.next = 0;
        self.state = WindowState::Uninitialized;
    }
}

/// Rolling average of surface normals.
///
/// Smooths the seed normal so the tangent frame, and therefore the patch
/// mesh, does not jitter between frames. Worst-case lag is the window size.
#[derive(Debug, Clone)]
pub struct RollingNormalFilter {
    window: RollingWindow<Vec3>,
}

impl RollingNormalFilter {
    /// Creates a filter averaging the last `size` normals.
    pub fn new(size: usize) -> Self {
        Self {
            window: RollingWindow::new(size),
        }
    }

    /// Adds a normal and returns the normalized running average.
    ///
    /// Returns zero when the window sums to (near) zero.
    pub fn update(&mut self, sample: Vec3) -> Vec3 {
        self.window.push(sample).normalize_or_zero()
    }

    /// The running average before normalization.
    pub fn average(&self) -> Vec3 {
        self.window.average()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> WindowState {
        self.window.state()
    }

    /// Returns the window size.
    pub fn size(&self) -> usize {
        self.window.capacity()
    }

    /// Forgets all history.
    pub fn reset(&mut self) {
        self.window.reset();
    }
}
