//! Binned 1-D and 2-D histograms.
//!
//! Bin numbering follows ROOT: bin `0` is the underflow, bins `1..=n_bins`
//! are in range and `n_bins + 1` is the overflow. Indices therefore read the
//! same as in the files the histograms come from.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A binned axis with uniform or variable-width bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    n_bins: usize,
    x_min: f64,
    x_max: f64,
    /// Variable bin edges (length `n_bins + 1`); empty for uniform binning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    edges: Vec<f64>,
}

impl Axis {
    /// Uniform binning with `n_bins` bins on `[x_min, x_max)`.
    pub fn uniform(n_bins: usize, x_min: f64, x_max: f64) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::Validation("axis needs at least one bin".into()));
        }
        if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
            return Err(Error::Validation(format!("invalid axis range [{x_min}, {x_max}]")));
        }
        Ok(Self { n_bins, x_min, x_max, edges: Vec::new() })
    }

    /// Variable binning from explicit, strictly increasing edges.
    pub fn variable(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::Validation("variable axis needs at least two edges".into()));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::Validation("bin edges must be finite and strictly increasing".into()));
        }
        let n_bins = edges.len() - 1;
        Ok(Self { n_bins, x_min: edges[0], x_max: edges[n_bins], edges })
    }

    /// Number of in-range bins.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Lower edge of the first bin.
    #[inline]
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Upper edge of the last bin.
    #[inline]
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Whether all bins have the same width.
    pub fn is_uniform(&self) -> bool {
        self.edges.is_empty()
    }

    fn edge(&self, k: usize) -> f64 {
        if !self.edges.is_empty() {
            return self.edges[k.min(self.n_bins)];
        }
        if k >= self.n_bins {
            return self.x_max;
        }
        self.x_min + k as f64 * (self.x_max - self.x_min) / self.n_bins as f64
    }

    /// All `n_bins + 1` bin edges.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.n_bins).map(|k| self.edge(k)).collect()
    }

    /// Centers of the in-range bins.
    pub fn centers(&self) -> Vec<f64> {
        (1..=self.n_bins).map(|b| self.bin_center(b)).collect()
    }

    /// Lower edge of `bin` (`-inf` for the underflow).
    pub fn bin_low_edge(&self, bin: usize) -> f64 {
        match bin {
            0 => f64::NEG_INFINITY,
            b if b > self.n_bins => self.x_max,
            b => self.edge(b - 1),
        }
    }

    /// Upper edge of `bin` (`+inf` for the overflow).
    pub fn bin_up_edge(&self, bin: usize) -> f64 {
        match bin {
            0 => self.x_min,
            b if b > self.n_bins => f64::INFINITY,
            b => self.edge(b),
        }
    }

    /// Center of `bin`; flow bins are clamped to the first/last in-range bin.
    pub fn bin_center(&self, bin: usize) -> f64 {
        let bin = bin.clamp(1, self.n_bins);
        0.5 * (self.edge(bin - 1) + self.edge(bin))
    }

    /// Width of `bin`; flow bins are clamped to the first/last in-range bin.
    pub fn bin_width(&self, bin: usize) -> f64 {
        let bin = bin.clamp(1, self.n_bins);
        self.edge(bin) - self.edge(bin - 1)
    }

    /// Bin containing `x`: `0` below the range, `n_bins + 1` at or above
    /// `x_max` (NaN lands in the overflow, as in ROOT).
    pub fn find_bin(&self, x: f64) -> usize {
        if x < self.x_min {
            return 0;
        }
        if !(x < self.x_max) {
            return self.n_bins + 1;
        }
        if self.edges.is_empty() {
            let width = (self.x_max - self.x_min) / self.n_bins as f64;
            let bin = 1 + ((x - self.x_min) / width) as usize;
            bin.min(self.n_bins)
        } else {
            self.edges.partition_point(|&e| e <= x).clamp(1, self.n_bins)
        }
    }
}

/// A 1-D histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    /// Histogram name (the key it is stored under).
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// Binning.
    pub axis: Axis,
    /// In-range bin contents (length = `axis.n_bins()`).
    pub contents: Vec<f64>,
    /// Sum of squared weights per in-range bin, if tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sumw2: Option<Vec<f64>>,
    /// Underflow content.
    #[serde(default)]
    pub underflow: f64,
    /// Overflow content.
    #[serde(default)]
    pub overflow: f64,
    /// Number of entries.
    pub entries: f64,
}

impl Histogram1D {
    /// Empty histogram over `axis`.
    pub fn new(name: impl Into<String>, title: impl Into<String>, axis: Axis) -> Self {
        let n = axis.n_bins();
        Self {
            name: name.into(),
            title: title.into(),
            axis,
            contents: vec![0.0; n],
            sumw2: None,
            underflow: 0.0,
            overflow: 0.0,
            entries: 0.0,
        }
    }

    /// Histogram with the given in-range contents; entries are their sum.
    pub fn from_contents(
        name: impl Into<String>,
        title: impl Into<String>,
        axis: Axis,
        contents: Vec<f64>,
    ) -> Result<Self> {
        if contents.len() != axis.n_bins() {
            return Err(Error::Validation(format!(
                "{} bin contents for an axis with {} bins",
                contents.len(),
                axis.n_bins()
            )));
        }
        let entries = contents.iter().sum();
        Ok(Self { contents, entries, ..Self::new(name, title, axis) })
    }

    /// Attach per-bin sums of squared weights.
    pub fn with_sumw2(mut self, sumw2: Vec<f64>) -> Result<Self> {
        if sumw2.len() != self.contents.len() {
            return Err(Error::Validation(format!(
                "sumw2 has {} values, histogram has {} bins",
                sumw2.len(),
                self.contents.len()
            )));
        }
        self.sumw2 = Some(sumw2);
        Ok(self)
    }

    /// Number of in-range bins.
    pub fn n_bins(&self) -> usize {
        self.axis.n_bins()
    }

    /// Fill with unit weight.
    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0);
    }

    /// Fill with weight `w`. The first non-unit weight switches on sumw2 tracking.
    pub fn fill_weighted(&mut self, x: f64, w: f64) {
        self.entries += 1.0;
        if w != 1.0 && self.sumw2.is_none() {
            self.sumw2 = Some(self.contents.clone());
        }
        let bin = self.axis.find_bin(x);
        if bin == 0 {
            self.underflow += w;
        } else if bin > self.n_bins() {
            self.overflow += w;
        } else {
            self.contents[bin - 1] += w;
            if let Some(sumw2) = self.sumw2.as_mut() {
                sumw2[bin - 1] += w * w;
            }
        }
    }

    /// Fill `n` values drawn from a normal distribution.
    pub fn fill_gaussian<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        mean: f64,
        sigma: f64,
        rng: &mut R,
    ) -> Result<()> {
        let normal = Normal::new(mean, sigma)
            .map_err(|e| Error::Validation(format!("gaussian({mean}, {sigma}): {e}")))?;
        for _ in 0..n {
            self.fill(normal.sample(rng));
        }
        Ok(())
    }

    /// Content of `bin`, including the flow bins.
    pub fn bin_content(&self, bin: usize) -> f64 {
        match bin {
            0 => self.underflow,
            b if b > self.n_bins() => self.overflow,
            b => self.contents[b - 1],
        }
    }

    /// Statistical error of `bin`: `sqrt(sumw2)` when tracked, else `sqrt(|content|)`.
    pub fn bin_error(&self, bin: usize) -> f64 {
        if bin == 0 || bin > self.n_bins() {
            return self.bin_content(bin).abs().sqrt();
        }
        match &self.sumw2 {
            Some(sumw2) => sumw2[bin - 1].max(0.0).sqrt(),
            None => self.contents[bin - 1].abs().sqrt(),
        }
    }

    /// Errors of all in-range bins.
    pub fn errors(&self) -> Vec<f64> {
        (1..=self.n_bins()).map(|b| self.bin_error(b)).collect()
    }

    /// Largest in-range content.
    pub fn max(&self) -> f64 {
        self.contents.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Bin number of the largest in-range content (first one on ties).
    pub fn maximum_bin(&self) -> usize {
        let mut best = 1;
        for (i, &c) in self.contents.iter().enumerate() {
            if c > self.contents[best - 1] {
                best = i + 1;
            }
        }
        best
    }

    /// Sum of in-range contents.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Content-weighted mean of bin centers (0 for an empty histogram).
    pub fn mean(&self) -> f64 {
        let total = self.integral();
        if total <= 0.0 {
            return 0.0;
        }
        let sum: f64 = self
            .contents
            .iter()
            .enumerate()
            .map(|(i, &c)| c * self.axis.bin_center(i + 1))
            .sum();
        sum / total
    }

    /// Content-weighted standard deviation of bin centers.
    pub fn std_dev(&self) -> f64 {
        let total = self.integral();
        if total <= 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        let var: f64 = self
            .contents
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let d = self.axis.bin_center(i + 1) - mean;
                c * d * d
            })
            .sum::<f64>()
            / total;
        var.max(0.0).sqrt()
    }

    /// Multiply every bin (flows included) by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.contents {
            *c *= factor;
        }
        if let Some(sumw2) = self.sumw2.as_mut() {
            for s in sumw2 {
                *s *= factor * factor;
            }
        }
        self.underflow *= factor;
        self.overflow *= factor;
    }

    /// Copy divided by the largest bin, so the peak is exactly 1.0.
    ///
    /// A histogram without a positive maximum is returned unchanged.
    pub fn normalized_to_max(&self) -> Self {
        let mut out = self.clone();
        let max = self.max();
        if max > 0.0 && max.is_finite() {
            out.scale(1.0 / max);
        }
        out
    }
}

/// A 2-D histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    /// Histogram name (the key it is stored under).
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// Binning of the independent (x) variable.
    pub x_axis: Axis,
    /// Binning of the dependent (y) variable.
    pub y_axis: Axis,
    /// In-range contents with x fastest: index `(iy - 1) * nx + (ix - 1)`.
    pub contents: Vec<f64>,
    /// Sum of squared weights per in-range bin, if tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sumw2: Option<Vec<f64>>,
    /// Number of entries.
    pub entries: f64,
}

impl Histogram2D {
    /// Empty histogram over the two axes.
    pub fn new(name: impl Into<String>, title: impl Into<String>, x_axis: Axis, y_axis: Axis) -> Self {
        let n = x_axis.n_bins() * y_axis.n_bins();
        Self {
            name: name.into(),
            title: title.into(),
            x_axis,
            y_axis,
            contents: vec![0.0; n],
            sumw2: None,
            entries: 0.0,
        }
    }

    /// Empty 100 x 100 histogram on the unit square, used in place of a
    /// histogram missing from an input file.
    pub fn empty_default(name: impl Into<String>) -> Self {
        let axis = Axis { n_bins: 100, x_min: 0.0, x_max: 1.0, edges: Vec::new() };
        Self::new(name, "", axis.clone(), axis)
    }

    /// Histogram with the given in-range contents (x fastest).
    pub fn from_contents(
        name: impl Into<String>,
        title: impl Into<String>,
        x_axis: Axis,
        y_axis: Axis,
        contents: Vec<f64>,
    ) -> Result<Self> {
        let n = x_axis.n_bins() * y_axis.n_bins();
        if contents.len() != n {
            return Err(Error::Validation(format!(
                "{} bin contents for a {}x{} histogram",
                contents.len(),
                x_axis.n_bins(),
                y_axis.n_bins()
            )));
        }
        let entries = contents.iter().sum();
        Ok(Self { contents, entries, ..Self::new(name, title, x_axis, y_axis) })
    }

    /// Attach per-bin sums of squared weights.
    pub fn with_sumw2(mut self, sumw2: Vec<f64>) -> Result<Self> {
        if sumw2.len() != self.contents.len() {
            return Err(Error::Validation(format!(
                "sumw2 has {} values, histogram has {} bins",
                sumw2.len(),
                self.contents.len()
            )));
        }
        self.sumw2 = Some(sumw2);
        Ok(self)
    }

    fn index(&self, ix: usize, iy: usize) -> Option<usize> {
        let (nx, ny) = (self.x_axis.n_bins(), self.y_axis.n_bins());
        if (1..=nx).contains(&ix) && (1..=ny).contains(&iy) {
            Some((iy - 1) * nx + (ix - 1))
        } else {
            None
        }
    }

    /// Fill with unit weight.
    pub fn fill(&mut self, x: f64, y: f64) {
        self.fill_weighted(x, y, 1.0);
    }

    /// Fill with weight `w`; values outside either axis only count as entries.
    pub fn fill_weighted(&mut self, x: f64, y: f64, w: f64) {
        self.entries += 1.0;
        if w != 1.0 && self.sumw2.is_none() {
            self.sumw2 = Some(self.contents.clone());
        }
        let Some(idx) = self.index(self.x_axis.find_bin(x), self.y_axis.find_bin(y)) else {
            return;
        };
        self.contents[idx] += w;
        if let Some(sumw2) = self.sumw2.as_mut() {
            sumw2[idx] += w * w;
        }
    }

    /// Content of in-range bin `(ix, iy)`; 0 outside the range.
    pub fn bin_content(&self, ix: usize, iy: usize) -> f64 {
        self.index(ix, iy).map_or(0.0, |i| self.contents[i])
    }

    /// Overwrite the content of in-range bin `(ix, iy)`.
    pub fn set_bin_content(&mut self, ix: usize, iy: usize, value: f64) -> Result<()> {
        let idx = self
            .index(ix, iy)
            .ok_or_else(|| Error::Validation(format!("bin ({ix}, {iy}) is out of range")))?;
        self.contents[idx] = value;
        Ok(())
    }

    /// Statistical error of in-range bin `(ix, iy)`.
    pub fn bin_error(&self, ix: usize, iy: usize) -> f64 {
        let Some(idx) = self.index(ix, iy) else {
            return 0.0;
        };
        match &self.sumw2 {
            Some(sumw2) => sumw2[idx].max(0.0).sqrt(),
            None => self.contents[idx].abs().sqrt(),
        }
    }

    /// Largest in-range content.
    pub fn max(&self) -> f64 {
        self.contents.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest strictly positive content, if any (log-scale color floor).
    pub fn min_positive(&self) -> Option<f64> {
        self.contents.iter().copied().filter(|&c| c > 0.0).reduce(f64::min)
    }

    /// Sum of in-range contents.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Multiply every bin by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.contents {
            *c *= factor;
        }
        if let Some(sumw2) = self.sumw2.as_mut() {
            for s in sumw2 {
                *s *= factor * factor;
            }
        }
    }

    /// Project onto the y axis, summing x bins `first_x..=last_x`.
    ///
    /// The range is clamped to the in-range bins; an empty range gives an
    /// empty histogram.
    pub fn projection_y(&self, name: impl Into<String>, first_x: usize, last_x: usize) -> Histogram1D {
        let nx = self.x_axis.n_bins();
        let ny = self.y_axis.n_bins();
        let first = first_x.max(1);
        let last = last_x.min(nx);

        let mut out = Histogram1D::new(name, self.title.clone(), self.y_axis.clone());
        let mut sumw2 = self.sumw2.as_ref().map(|_| vec![0.0; ny]);
        for iy in 1..=ny {
            for ix in first..=last {
                let idx = (iy - 1) * nx + (ix - 1);
                out.contents[iy - 1] += self.contents[idx];
                if let (Some(dst), Some(src)) = (sumw2.as_mut(), self.sumw2.as_ref()) {
                    dst[iy - 1] += src[idx];
                }
            }
        }
        out.sumw2 = sumw2;
        out.entries = out.integral();
        out
    }
}

/// A histogram of either dimensionality, as stored under one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Histogram {
    /// One-dimensional histogram.
    H1(Histogram1D),
    /// Two-dimensional histogram.
    H2(Histogram2D),
}

impl Histogram {
    /// Histogram name.
    pub fn name(&self) -> &str {
        match self {
            Histogram::H1(h) => &h.name,
            Histogram::H2(h) => &h.name,
        }
    }

    /// Histogram title.
    pub fn title(&self) -> &str {
        match self {
            Histogram::H1(h) => &h.title,
            Histogram::H2(h) => &h.title,
        }
    }

    /// 1 or 2.
    pub fn dimension(&self) -> usize {
        match self {
            Histogram::H1(_) => 1,
            Histogram::H2(_) => 2,
        }
    }

    /// Number of entries.
    pub fn entries(&self) -> f64 {
        match self {
            Histogram::H1(h) => h.entries,
            Histogram::H2(h) => h.entries,
        }
    }

    /// Short binning description, e.g. `100` or `100x50`.
    pub fn shape(&self) -> String {
        match self {
            Histogram::H1(h) => h.n_bins().to_string(),
            Histogram::H2(h) => format!("{}x{}", h.x_axis.n_bins(), h.y_axis.n_bins()),
        }
    }

    /// Borrow as 1-D, if it is one.
    pub fn as_h1(&self) -> Option<&Histogram1D> {
        match self {
            Histogram::H1(h) => Some(h),
            Histogram::H2(_) => None,
        }
    }

    /// Borrow as 2-D, if it is one.
    pub fn as_h2(&self) -> Option<&Histogram2D> {
        match self {
            Histogram::H2(h) => Some(h),
            Histogram::H1(_) => None,
        }
    }

    /// Multiply every bin by `factor`.
    pub fn scale(&mut self, factor: f64) {
        match self {
            Histogram::H1(h) => h.scale(factor),
            Histogram::H2(h) => h.scale(factor),
        }
    }
}

impl From<Histogram1D> for Histogram {
    fn from(h: Histogram1D) -> Self {
        Histogram::H1(h)
    }
}

impl From<Histogram2D> for Histogram {
    fn from(h: Histogram2D) -> Self {
        Histogram::H2(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn axis_rejects_bad_binning() {
        assert!(Axis::uniform(0, 0.0, 1.0).is_err());
        assert!(Axis::uniform(10, 1.0, 1.0).is_err());
        assert!(Axis::variable(vec![0.0, 2.0, 1.0]).is_err());
        assert!(Axis::variable(vec![0.0]).is_err());
    }

    #[test]
    fn find_bin_follows_flow_convention() {
        let axis = Axis::uniform(10, 0.0, 10.0).unwrap();
        assert_eq!(axis.find_bin(-0.1), 0);
        assert_eq!(axis.find_bin(0.0), 1);
        assert_eq!(axis.find_bin(5.0), 6);
        assert_eq!(axis.find_bin(9.999), 10);
        assert_eq!(axis.find_bin(10.0), 11);
        assert_eq!(axis.find_bin(f64::NAN), 11);
    }

    #[test]
    fn variable_axis_lookup() {
        let axis = Axis::variable(vec![0.0, 1.0, 3.0, 7.0]).unwrap();
        assert_eq!(axis.n_bins(), 3);
        assert_eq!(axis.find_bin(0.5), 1);
        assert_eq!(axis.find_bin(1.0), 2);
        assert_eq!(axis.find_bin(6.9), 3);
        assert_relative_eq!(axis.bin_center(3), 5.0);
        assert_relative_eq!(axis.bin_width(2), 2.0);
        assert_eq!(axis.edges(), vec![0.0, 1.0, 3.0, 7.0]);
    }

    #[test]
    fn bin_edges_and_centers() {
        let axis = Axis::uniform(4, -2.0, 2.0).unwrap();
        assert_relative_eq!(axis.bin_low_edge(1), -2.0);
        assert_relative_eq!(axis.bin_up_edge(4), 2.0);
        assert_relative_eq!(axis.bin_center(2), -0.5);
        assert_eq!(axis.centers(), vec![-1.5, -0.5, 0.5, 1.5]);
        assert!(axis.bin_low_edge(0).is_infinite());
    }

    #[test]
    fn fill_tracks_flows_and_errors() {
        let mut h = Histogram1D::new("h", "", Axis::uniform(5, 0.0, 5.0).unwrap());
        h.fill(-1.0);
        h.fill(2.5);
        h.fill(2.5);
        h.fill(7.0);
        assert_eq!(h.entries, 4.0);
        assert_eq!(h.underflow, 1.0);
        assert_eq!(h.overflow, 1.0);
        assert_eq!(h.bin_content(3), 2.0);
        assert_relative_eq!(h.bin_error(3), 2.0_f64.sqrt());

        h.fill_weighted(0.5, 3.0);
        assert_relative_eq!(h.bin_error(1), 3.0);
        assert_relative_eq!(h.bin_error(3), 2.0_f64.sqrt());
    }

    #[test]
    fn mean_and_std_dev_of_symmetric_histogram() {
        let axis = Axis::uniform(3, -1.5, 1.5).unwrap();
        let h = Histogram1D::from_contents("h", "", axis, vec![1.0, 2.0, 1.0]).unwrap();
        assert_relative_eq!(h.mean(), 0.0);
        assert_relative_eq!(h.std_dev(), 0.5_f64.sqrt());
        assert_eq!(h.maximum_bin(), 2);
    }

    #[test]
    fn normalizing_two_histograms_gives_unit_peaks() {
        let axis = Axis::uniform(4, 0.0, 4.0).unwrap();
        let data = Histogram1D::from_contents("d", "", axis.clone(), vec![3.0, 12.0, 6.0, 1.0]).unwrap();
        let sim = Histogram1D::from_contents("s", "", axis, vec![250.0, 100.0, 0.0, 5.0]).unwrap();
        let (nd, ns) = (data.normalized_to_max(), sim.normalized_to_max());
        assert_relative_eq!(nd.max(), 1.0);
        assert_relative_eq!(ns.max(), 1.0);
        assert_relative_eq!(nd.contents[0], 0.25);
    }

    #[test]
    fn normalizing_empty_histogram_does_not_produce_nan() {
        let h = Histogram1D::new("h", "", Axis::uniform(3, 0.0, 1.0).unwrap());
        let n = h.normalized_to_max();
        assert!(n.contents.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn projection_y_sums_x_range() {
        let x = Axis::uniform(3, 0.0, 3.0).unwrap();
        let y = Axis::uniform(2, 0.0, 2.0).unwrap();
        // x fastest: row iy=1 then iy=2
        let h = Histogram2D::from_contents("h", "t", x, y, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        let p = h.projection_y("p", 2, 3);
        assert_eq!(p.contents, vec![5.0, 11.0]);
        assert_eq!(p.entries, 16.0);
        assert_eq!(p.title, "t");

        let clamped = h.projection_y("p", 0, 99);
        assert_eq!(clamped.contents, vec![6.0, 15.0]);

        let empty = h.projection_y("p", 3, 2);
        assert_eq!(empty.integral(), 0.0);
    }

    #[test]
    fn projection_carries_sumw2() {
        let x = Axis::uniform(2, 0.0, 2.0).unwrap();
        let y = Axis::uniform(1, 0.0, 1.0).unwrap();
        let mut h = Histogram2D::new("h", "", x, y);
        h.fill_weighted(0.5, 0.5, 2.0);
        h.fill_weighted(1.5, 0.5, 3.0);
        let p = h.projection_y("p", 1, 2);
        assert_eq!(p.contents, vec![5.0]);
        assert_relative_eq!(p.bin_error(1), 13.0_f64.sqrt());
    }

    #[test]
    fn histogram_enum_accessors() {
        let h: Histogram = Histogram2D::empty_default("missing").into();
        assert_eq!(h.dimension(), 2);
        assert_eq!(h.shape(), "100x100");
        assert!(h.as_h1().is_none());
        assert_eq!(h.name(), "missing");
    }

    #[test]
    fn histogram_serializes_with_kind_tag() {
        let h: Histogram =
            Histogram1D::new("h", "", Axis::uniform(2, 0.0, 1.0).unwrap()).into();
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["kind"], "h1");
        let back: Histogram = serde_json::from_value(json).unwrap();
        assert_eq!(back, h);
    }
}
