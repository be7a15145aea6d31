//! Resampling of a slave raster onto the master grid through a fitted warp.

use crate::kernel::KernelTable;
use coreg_core::{Error, WarpModel};
use log::*;
use ndarray::Array2;

/// A rectangle of the master grid to compute, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x0: i64,
    pub y0: i64,
    pub width: usize,
    pub height: usize,
}

impl TileRect {
    pub fn new(x0: i64, y0: i64, width: usize, height: usize) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }
}

/// External accessor for rectangular windows of the slave raster.
///
/// The resampler never reads the raster directly; it requests one window per
/// tile covering all needed support. Requested windows may extend past the
/// raster bounds, and how those samples are synthesized (edge replication,
/// zero fill, ...) is the implementor's decision, not this crate's.
pub trait SlaveRaster {
    /// Full raster dimensions (width, height) in pixels.
    fn dimensions(&self) -> (usize, usize);

    /// Sample values for the given rectangle, shaped (height, width).
    fn window(&self, x0: i64, y0: i64, width: usize, height: usize) -> Array2<f32>;
}

/// How an [`ArraySlave`] synthesizes samples outside the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Border {
    #[default]
    Replicate,
    Zero,
}

/// In-memory [`SlaveRaster`] over an `Array2<f32>`, shaped (height, width).
/// Suitable for tests and rasters small enough to hold in memory; real
/// products are expected to provide their own tile-cache-backed accessor.
#[derive(Debug, Clone)]
pub struct ArraySlave {
    data: Array2<f32>,
    border: Border,
}

impl ArraySlave {
    pub fn new(data: Array2<f32>, border: Border) -> Self {
        Self { data, border }
    }
}

impl SlaveRaster for ArraySlave {
    fn dimensions(&self) -> (usize, usize) {
        let (h, w) = self.data.dim();
        (w, h)
    }

    fn window(&self, x0: i64, y0: i64, width: usize, height: usize) -> Array2<f32> {
        let (h, w) = self.data.dim();
        Array2::from_shape_fn((height, width), |(r, c)| {
            let x = x0 + c as i64;
            let y = y0 + r as i64;
            let inside = x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h;
            match (inside, self.border) {
                (true, _) => self.data[(y as usize, x as usize)],
                (false, Border::Zero) => 0.0,
                (false, Border::Replicate) => {
                    let cx = x.clamp(0, w as i64 - 1) as usize;
                    let cy = y.clamp(0, h as i64 - 1) as usize;
                    self.data[(cy, cx)]
                }
            }
        })
    }
}

/// Resamples master-grid tiles from a slave raster through a fitted warp.
///
/// Holds the kernel table for the chosen interpolation method; the table is
/// immutable, so one `Resampler` can serve any number of tiles, concurrently,
/// once the band's model is fitted.
#[derive(Debug, Clone)]
pub struct Resampler {
    table: KernelTable,
}

impl Resampler {
    pub fn new(table: KernelTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KernelTable {
        &self.table
    }

    /// Computes one output tile.
    ///
    /// The result has exactly the requested shape (height, width); nothing
    /// outside the rectangle is touched. A pixel is `None` — a deliberate
    /// "no value" outcome, not an error — when the band's model is flagged
    /// insufficient, when the warped position is not finite, or when the
    /// kernel support window around the warped position lies entirely
    /// outside the slave raster. Everything else is reconstructed as the
    /// separable kernel-weighted sum of slave samples, with out-of-raster
    /// samples inside a partially covered window synthesized by the
    /// accessor's border policy.
    pub fn resample(
        &self,
        rect: TileRect,
        model: &WarpModel,
        source: &impl SlaveRaster,
    ) -> Result<Array2<Option<f32>>, Error> {
        let mut out = Array2::from_elem((rect.height, rect.width), None);
        if model.insufficient_data {
            trace!("band model has insufficient data, skipping tile");
            return Ok(out);
        }

        let (src_w, src_h) = source.dimensions();
        let taps = self.table.taps as i64;
        let padding = self.table.padding as i64;

        // Warp every output pixel first so a single source window request
        // can cover the union of all support windows for this tile.
        let mut positions = Vec::with_capacity(rect.width * rect.height);
        let mut support = None;
        for ty in 0..rect.height {
            for tx in 0..rect.width {
                let (sx, sy) = model.warp((rect.x0 + tx as i64) as f64, (rect.y0 + ty as i64) as f64)?;
                if !(sx.is_finite() && sy.is_finite()) {
                    positions.push(None);
                    continue;
                }
                let ax = sx.floor() as i64 - padding;
                let ay = sy.floor() as i64 - padding;
                // Support entirely outside the slave raster: no value.
                if ax + taps <= 0 || ay + taps <= 0 || ax >= src_w as i64 || ay >= src_h as i64 {
                    positions.push(None);
                    continue;
                }
                positions.push(Some((sx, sy)));
                let (x0, y0, x1, y1) = support.unwrap_or((ax, ay, ax, ay));
                support = Some((x0.min(ax), y0.min(ay), x1.max(ax), y1.max(ay)));
            }
        }
        let Some((wx0, wy0, wx1, wy1)) = support else {
            return Ok(out);
        };
        let win_w = (wx1 - wx0) as usize + self.table.taps;
        let win_h = (wy1 - wy0) as usize + self.table.taps;
        let window = source.window(wx0, wy0, win_w, win_h);

        for (idx, pos) in positions.iter().enumerate() {
            let Some((sx, sy)) = *pos else { continue };
            let ax = sx.floor() as i64 - padding;
            let ay = sy.floor() as i64 - padding;
            let wx = self.table.row(self.table.phase_of(sx - sx.floor()));
            let wy = self.table.row(self.table.phase_of(sy - sy.floor()));
            let mut value = 0.0f64;
            for (r, &wr) in wy.iter().enumerate() {
                let row = (ay - wy0) as usize + r;
                let mut acc = 0.0f64;
                for (c, &wc) in wx.iter().enumerate() {
                    let col = (ax - wx0) as usize + c;
                    acc += wc * window[(row, col)] as f64;
                }
                value += wr * acc;
            }
            out[(idx / rect.width, idx % rect.width)] = Some(value as f32);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interpolation;
    use coreg_core::Degree;
    use ndarray::Array2;

    fn translation_model(dx: f64, dy: f64) -> WarpModel {
        let mut model = WarpModel::new(Degree::Linear, Vec::new());
        model.x_coef = vec![dx, 1.0, 0.0];
        model.y_coef = vec![dy, 0.0, 1.0];
        model
    }

    fn ramp(w: usize, h: usize) -> Array2<f32> {
        Array2::from_shape_fn((h, w), |(r, c)| (r * w + c) as f32)
    }

    #[test]
    fn integer_translation_is_exact_for_bilinear() {
        let source = ArraySlave::new(ramp(16, 16), Border::Replicate);
        let model = translation_model(3.0, 2.0);
        let resampler = Resampler::new(KernelTable::build(Interpolation::Bilinear));
        let out = resampler
            .resample(TileRect::new(4, 4, 5, 5), &model, &source)
            .unwrap();
        for ((r, c), v) in out.indexed_iter() {
            let expected = ((r + 4 + 2) * 16 + (c + 4 + 3)) as f32;
            assert_eq!(v.unwrap(), expected, "pixel ({r}, {c})");
        }
    }

    #[test]
    fn half_pixel_translation_averages_neighbors() {
        let source = ArraySlave::new(ramp(16, 16), Border::Replicate);
        let model = translation_model(0.5, 0.0);
        let resampler = Resampler::new(KernelTable::build(Interpolation::Bilinear));
        let out = resampler
            .resample(TileRect::new(4, 4, 2, 2), &model, &source)
            .unwrap();
        // Linear ramp: the half-pixel value sits halfway between neighbors.
        assert_eq!(out[(0, 0)].unwrap(), (4 * 16 + 4) as f32 + 0.5);
    }

    #[test]
    fn pixels_warped_off_the_raster_stay_unset() {
        let source = ArraySlave::new(ramp(8, 8), Border::Replicate);
        let model = translation_model(100.0, 0.0);
        let resampler = Resampler::new(KernelTable::build(Interpolation::Bilinear));
        let out = resampler
            .resample(TileRect::new(0, 0, 4, 4), &model, &source)
            .unwrap();
        assert!(out.iter().all(|v| v.is_none()));
    }

    #[test]
    fn insufficient_model_writes_nothing() {
        let source = ArraySlave::new(ramp(8, 8), Border::Replicate);
        let mut model = translation_model(0.0, 0.0);
        model.insufficient_data = true;
        model.x_coef.clear();
        model.y_coef.clear();
        let resampler = Resampler::new(KernelTable::build(Interpolation::Nearest));
        let out = resampler
            .resample(TileRect::new(0, 0, 3, 3), &model, &source)
            .unwrap();
        assert_eq!(out.dim(), (3, 3));
        assert!(out.iter().all(|v| v.is_none()));
    }

    #[test]
    fn border_policy_is_the_accessors_decision() {
        let data = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f32 + 10.0);
        let zero = ArraySlave::new(data.clone(), Border::Zero);
        let replicate = ArraySlave::new(data, Border::Replicate);
        // Warp pushes the support window partially past the left edge.
        let model = translation_model(-0.75, 0.0);
        let resampler = Resampler::new(KernelTable::build(Interpolation::Bicubic));
        let rect = TileRect::new(0, 0, 1, 1);
        let from_zero = resampler.resample(rect, &model, &zero).unwrap()[(0, 0)].unwrap();
        let from_replicate = resampler.resample(rect, &model, &replicate).unwrap()[(0, 0)].unwrap();
        assert_ne!(from_zero, from_replicate);
    }
}
