use std::num::NonZeroUsize;

use ndarray::{prelude::*, s};
use ndarray_rand::{
    rand_distr::{Normal, Uniform},
    RandomExt,
};
use rand::{seq::SliceRandom, Rng};

use super::Batch;
use crate::{AdapterErr, Result};

/// An in-memory classification dataset: one row of features per sample and
/// one class label per row.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array1<usize>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Errors
    /// Returns `AdapterErr::SizeMismatch` if there is not one label per row.
    pub fn new(x: Array2<f32>, y: Array1<usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(AdapterErr::SizeMismatch {
                what: "dataset labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, y })
    }

    /// Samples `samples_per_class` points around each of `num_classes` random
    /// centers in `[-4, 4)^features`, labels interleaved.
    ///
    /// # Arguments
    /// * `samples_per_class` - The amount of samples drawn per class.
    /// * `num_classes` - The amount of blobs.
    /// * `features` - The dimension of every sample.
    /// * `std_dev` - The spread of every blob around its center.
    /// * `rng` - The random number generator to sample with.
    ///
    /// # Errors
    /// Returns `AdapterErr::InvalidConfig` if `std_dev` is negative or not finite.
    pub fn gaussian_blobs<R: Rng>(
        samples_per_class: usize,
        num_classes: usize,
        features: usize,
        std_dev: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let center_dist = Uniform::new(-4.0f32, 4.0)
            .map_err(|e| AdapterErr::InvalidConfig(format!("blob centers: {e}")))?;
        let noise_dist = Normal::new(0.0f32, std_dev)
            .map_err(|e| AdapterErr::InvalidConfig(format!("blob spread: {e}")))?;

        let n = samples_per_class * num_classes;
        let centers = Array2::random_using((num_classes, features), center_dist, rng);
        let mut x = Array2::random_using((n, features), noise_dist, rng);
        let y: Array1<usize> = (0..n).map(|i| i % num_classes).collect();

        for (mut row, &label) in x.outer_iter_mut().zip(&y) {
            row += &centers.row(label);
        }

        Self::new(x, y)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn features(&self) -> usize {
        self.x.ncols()
    }

    pub fn x(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, usize> {
        self.y.view()
    }

    /// Returns a copy of the dataset with its rows in random order.
    pub fn shuffled<R: Rng>(&self, rng: &mut R) -> Self {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);

        Self {
            x: self.x.select(Axis(0), &indices),
            y: self.y.select(Axis(0), &indices),
        }
    }

    /// Splits the dataset in two at row `mid`, clamped to its length.
    pub fn split_at(&self, mid: usize) -> (Self, Self) {
        let mid = mid.min(self.len());

        let head = Self {
            x: self.x.slice(s![..mid, ..]).to_owned(),
            y: self.y.slice(s![..mid]).to_owned(),
        };
        let tail = Self {
            x: self.x.slice(s![mid.., ..]).to_owned(),
            y: self.y.slice(s![mid..]).to_owned(),
        };

        (head, tail)
    }

    /// Iterates the dataset in order, `batch_size` rows at a time. The last batch may be smaller.
    pub fn batches(&self, batch_size: NonZeroUsize) -> impl Iterator<Item = Batch<'_>> {
        let size = batch_size.get();

        self.x
            .axis_chunks_iter(Axis(0), size)
            .zip(self.y.axis_chunks_iter(Axis(0), size))
            .map(|(x, y)| Batch { x, y })
    }
}
