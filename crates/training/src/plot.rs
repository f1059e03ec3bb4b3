//! Training-curve rendering: accuracy (left panel) and loss (right panel), training in
//! blue and validation in orange.

use data_contracts::TrainingHistory;
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::Path;

const PANEL_W: u32 = 560;
const PANEL_H: u32 = 400;
const MARGIN: u32 = 40;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const TRAIN: Rgb<u8> = Rgb([31, 119, 180]);
const VAL: Rgb<u8> = Rgb([255, 127, 14]);

struct Panel {
    x0: f32,
    y0: f32,
    w: f32,
    h: f32,
    y_min: f32,
    y_max: f32,
    epochs: usize,
}

impl Panel {
    fn new(index: u32, epochs: usize, series: &[&[f32]]) -> Self {
        let finite = series.iter().flat_map(|s| s.iter().copied()).filter(|v| v.is_finite());
        let (mut lo, mut hi) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !lo.is_finite() || !hi.is_finite() {
            (lo, hi) = (0.0, 1.0);
        }
        if (hi - lo).abs() < 1e-6 {
            hi = lo + 1.0;
        }
        Self {
            x0: (index * PANEL_W + MARGIN) as f32,
            y0: MARGIN as f32,
            w: (PANEL_W - 2 * MARGIN) as f32,
            h: (PANEL_H - 2 * MARGIN) as f32,
            y_min: lo,
            y_max: hi,
            epochs,
        }
    }

    fn point(&self, epoch: usize, value: f32) -> (f32, f32) {
        let span = self.epochs.saturating_sub(1).max(1) as f32;
        let x = self.x0 + self.w * epoch as f32 / span;
        let t = (value - self.y_min) / (self.y_max - self.y_min);
        (x, self.y0 + self.h * (1.0 - t.clamp(0.0, 1.0)))
    }

    fn frame(&self, img: &mut RgbImage) {
        for i in 1..4 {
            let y = self.y0 + self.h * i as f32 / 4.0;
            draw_line_segment_mut(img, (self.x0, y), (self.x0 + self.w, y), GRID);
        }
        let rect = Rect::at(self.x0 as i32, self.y0 as i32).of_size(self.w as u32, self.h as u32);
        draw_hollow_rect_mut(img, rect, AXIS);
    }

    fn series(&self, img: &mut RgbImage, values: &[f32], color: Rgb<u8>) {
        let points: Vec<(f32, f32)> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(e, &v)| self.point(e, v))
            .collect();
        for pair in points.windows(2) {
            draw_line_segment_mut(img, pair[0], pair[1], color);
        }
        for &(x, y) in &points {
            draw_filled_circle_mut(img, (x as i32, y as i32), 2, color);
        }
    }
}

/// Render the history as a two-panel chart.
pub fn render_history(history: &TrainingHistory) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::from_pixel(PANEL_W * 2, PANEL_H, BACKGROUND);
    let epochs = history.len();
    let pick = |f: fn(&data_contracts::EpochRecord) -> f32| -> Vec<f32> {
        history.epochs.iter().map(f).collect()
    };
    let train_acc = pick(|r| r.train_accuracy);
    let val_acc = pick(|r| r.val_accuracy);
    let train_loss = pick(|r| r.train_loss);
    let val_loss = pick(|r| r.val_loss);

    for (index, (train, val)) in [(&train_acc, &val_acc), (&train_loss, &val_loss)]
        .into_iter()
        .enumerate()
    {
        let panel = Panel::new(index as u32, epochs, &[train.as_slice(), val.as_slice()]);
        panel.frame(&mut img);
        panel.series(&mut img, train, TRAIN);
        panel.series(&mut img, val, VAL);
    }
    img
}

/// Render and save the chart as PNG.
pub fn save_history_plot(history: &TrainingHistory, path: &Path) -> image::ImageResult<()> {
    render_history(history).save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_contracts::EpochRecord;

    fn history(n: usize) -> TrainingHistory {
        let mut h = TrainingHistory::default();
        for epoch in 0..n {
            let t = epoch as f32;
            h.push(EpochRecord {
                epoch,
                train_loss: 2.0 / (t + 1.0),
                train_accuracy: 0.5 + 0.04 * t,
                val_loss: 2.2 / (t + 1.0),
                val_accuracy: 0.45 + 0.04 * t,
                learning_rate: 1e-3,
            });
        }
        h
    }

    #[test]
    fn draws_both_series() {
        let img = render_history(&history(10));
        assert_eq!(img.dimensions(), (PANEL_W * 2, PANEL_H));
        assert!(img.pixels().any(|p| *p == TRAIN));
        assert!(img.pixels().any(|p| *p == VAL));
    }

    #[test]
    fn single_epoch_and_nan_do_not_panic() {
        let mut h = history(1);
        h.epochs[0].val_loss = f32::NAN;
        let img = render_history(&h);
        assert!(img.pixels().any(|p| *p == TRAIN));
    }

    #[test]
    fn saves_png() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("training_history.png");
        save_history_plot(&history(3), &path).unwrap();
        assert!(image::open(&path).is_ok());
    }
}
