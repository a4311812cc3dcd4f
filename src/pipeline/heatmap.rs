//! Page 1: the per-response score heatmap.
//!
//! Rows are responses (first response at the top), columns the six
//! categories. Colours come from the diverging "coolwarm" map stretched over
//! the data's own minimum and maximum. Missing scores leave their cell blank.

use crate::pipeline::canvas::{Align, Canvas, Paint, Rgb};
use crate::pipeline::extract::{Category, FeedbackMatrix};

/// 10 × 8 inches.
pub const PAGE_SIZE: (f32, f32) = (720.0, 576.0);

const GRID_LEFT: f32 = 80.0;
const GRID_RIGHT: f32 = 600.0;
const GRID_TOP: f32 = 516.0;
const GRID_BOTTOM: f32 = 170.0;
const COLORBAR_LEFT: f32 = 624.0;
const COLORBAR_WIDTH: f32 = 16.0;
const COLORBAR_STEPS: usize = 64;

const TITLE_SIZE: f32 = 18.0;
const AXIS_LABEL_SIZE: f32 = 14.0;
const CATEGORY_LABEL_SIZE: f32 = 12.0;
const TICK_SIZE: f32 = 10.0;
const MAX_ROW_LABELS: usize = 30;

/// Anchor colours of matplotlib's "coolwarm" at 0, ¼, ½, ¾ and 1.
const COOLWARM: [(f32, Rgb); 5] = [
    (0.0, Rgb(0.2298, 0.2987, 0.7537)),
    (0.25, Rgb(0.5543, 0.6901, 0.9955)),
    (0.5, Rgb(0.8654, 0.8654, 0.8654)),
    (0.75, Rgb(0.9567, 0.5980, 0.4773)),
    (1.0, Rgb(0.7057, 0.0156, 0.1502)),
];

/// Colour at `t` in 0..=1 (clamped), interpolated linearly between anchors.
pub fn coolwarm(t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    for pair in COOLWARM.windows(2) {
        let (t0, Rgb(r0, g0, b0)) = pair[0];
        let (t1, Rgb(r1, g1, b1)) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            let mix = |a: f32, b: f32| a * (1.0 - f) + b * f;
            return Rgb(mix(r0, r1), mix(g0, g1), mix(b0, b1));
        }
    }
    COOLWARM[COOLWARM.len() - 1].1
}

/// Position of `v` within `range`; a flat range maps everything to 0.
fn normalize(v: f64, (lo, hi): (f64, f64)) -> f32 {
    if hi > lo {
        ((v - lo) / (hi - lo)) as f32
    } else {
        0.0
    }
}

/// Upper bound on colour-bar ticks.
const MAX_TICKS: usize = 20;

/// Round tick positions covering `lo..=hi`, about five of them.
///
/// Returns at most [`MAX_TICKS`] strictly increasing values. When no round
/// step can be represented at the data's magnitude the ends are used as-is.
pub fn nice_ticks(lo: f64, hi: f64) -> Vec<f64> {
    if !(hi > lo) {
        return vec![lo];
    }
    let raw = (hi - lo) / 5.0;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);
    if !step.is_finite() || step <= 0.0 {
        return vec![lo, hi];
    }

    let first = (lo / step - 1e-9).ceil();
    let last = (hi / step + 1e-9).floor();
    let span = last - first;
    if !span.is_finite() || span < 0.0 || span >= MAX_TICKS as f64 {
        return vec![lo, hi];
    }

    let mut ticks: Vec<f64> = Vec::with_capacity(span as usize + 1);
    for i in 0..=span as usize {
        // `+ 0.0` turns -0.0 into 0.0.
        let t = (first + i as f64) * step + 0.0;
        if ticks.last().map_or(true, |&prev| t > prev) {
            ticks.push(t);
        }
    }
    if ticks.len() < 2 {
        return vec![lo, hi];
    }
    ticks
}

/// Fewest decimals that show every step between `ticks` exactly.
fn tick_decimals(ticks: &[f64]) -> usize {
    let step = match ticks {
        [a, b, ..] => b - a,
        _ => return 0,
    };
    (0..=6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0)
        })
        .unwrap_or(6)
}

fn tick_label(v: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, v + 0.0)
}

/// Draw the heatmap page.
pub fn draw(matrix: &FeedbackMatrix) -> Canvas {
    let (width, height) = PAGE_SIZE;
    let mut canvas = Canvas::new(width, height);
    let range = matrix.range();

    let grid_w = GRID_RIGHT - GRID_LEFT;
    let grid_h = GRID_TOP - GRID_BOTTOM;
    let cols = Category::ALL.len();
    let rows = matrix.row_count();
    let cell_w = grid_w / cols as f32;
    let cell_h = if rows > 0 { grid_h / rows as f32 } else { grid_h };

    // ── Cells ────────────────────────────────────────────────────────────
    canvas.stroke_color(Rgb::WHITE);
    canvas.line_width(0.5);
    if let Some(range) = range {
        for (r, row) in matrix.rows().iter().enumerate() {
            let y = GRID_TOP - (r + 1) as f32 * cell_h;
            for (c, score) in row.iter().enumerate() {
                let Some(v) = score else { continue };
                canvas.fill_color(coolwarm(normalize(*v, range)));
                canvas.rect(GRID_LEFT + c as f32 * cell_w, y, cell_w, cell_h, Paint::FillStroke);
            }
        }
    }

    canvas.fill_color(Rgb::BLACK);

    // ── Category labels (x axis) ─────────────────────────────────────────
    for (c, category) in Category::ALL.iter().enumerate() {
        let x = GRID_LEFT + (c as f32 + 0.5) * cell_w;
        canvas.text_rotated(
            x,
            GRID_BOTTOM - 8.0,
            CATEGORY_LABEL_SIZE,
            45.0,
            Align::Right,
            category.label(),
        );
    }

    // ── Response labels (y axis) ─────────────────────────────────────────
    let step = rows.div_ceil(MAX_ROW_LABELS).max(1);
    for r in (0..rows).step_by(step) {
        let cy = GRID_TOP - (r as f32 + 0.5) * cell_h;
        canvas.text(
            GRID_LEFT - 6.0,
            cy - TICK_SIZE * 0.35,
            TICK_SIZE,
            Align::Right,
            &r.to_string(),
        );
    }

    // ── Titles ───────────────────────────────────────────────────────────
    let grid_mid_x = GRID_LEFT + grid_w / 2.0;
    canvas.text(
        grid_mid_x,
        GRID_TOP + 18.0,
        TITLE_SIZE,
        Align::Center,
        "Seminar Feedback Heatmap",
    );
    canvas.text(grid_mid_x, 20.0, AXIS_LABEL_SIZE, Align::Center, "Feedback Category");
    canvas.text_rotated(
        GRID_LEFT - 34.0,
        GRID_BOTTOM + grid_h / 2.0,
        AXIS_LABEL_SIZE,
        90.0,
        Align::Center,
        "Responses",
    );

    draw_colorbar(&mut canvas, range);
    canvas
}

fn draw_colorbar(canvas: &mut Canvas, range: Option<(f64, f64)>) {
    let bar_h = GRID_TOP - GRID_BOTTOM;
    let band_h = bar_h / COLORBAR_STEPS as f32;
    for i in 0..COLORBAR_STEPS {
        let t = (i as f32 + 0.5) / COLORBAR_STEPS as f32;
        canvas.fill_color(coolwarm(t));
        canvas.rect(
            COLORBAR_LEFT,
            GRID_BOTTOM + i as f32 * band_h,
            COLORBAR_WIDTH,
            band_h,
            Paint::Fill,
        );
    }

    canvas.fill_color(Rgb::BLACK);
    let Some((lo, hi)) = range else { return };
    let ticks = nice_ticks(lo, hi);
    let decimals = tick_decimals(&ticks);
    for tick in ticks {
        let y = GRID_BOTTOM + normalize(tick, (lo, hi)) * bar_h;
        canvas.rect(COLORBAR_LEFT + COLORBAR_WIDTH, y - 0.25, 3.0, 0.5, Paint::Fill);
        canvas.text(
            COLORBAR_LEFT + COLORBAR_WIDTH + 5.0,
            y - TICK_SIZE * 0.35,
            TICK_SIZE,
            Align::Left,
            &tick_label(tick, decimals),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolwarm_endpoints_and_midpoint() {
        assert_eq!(coolwarm(0.0), COOLWARM[0].1);
        assert_eq!(coolwarm(1.0), COOLWARM[4].1);
        assert_eq!(coolwarm(0.5), COOLWARM[2].1);
        assert_eq!(coolwarm(-3.0), coolwarm(0.0));
        assert_eq!(coolwarm(f32::NAN), coolwarm(0.0));
    }

    #[test]
    fn coolwarm_runs_blue_to_red() {
        let low = coolwarm(0.1);
        let high = coolwarm(0.9);
        assert!(low.2 > low.0, "low end is blue: {low:?}");
        assert!(high.0 > high.2, "high end is red: {high:?}");
    }

    #[test]
    fn flat_range_maps_to_low_end() {
        assert_eq!(normalize(3.0, (3.0, 3.0)), 0.0);
        assert_eq!(normalize(4.0, (2.0, 6.0)), 0.5);
    }

    #[test]
    fn likert_ticks_are_integers() {
        let ticks = nice_ticks(1.0, 5.0);
        assert_eq!(ticks.len(), 5, "{ticks:?}");
        for (t, want) in ticks.iter().zip([1.0, 2.0, 3.0, 4.0, 5.0]) {
            assert!((t - want).abs() < 1e-9, "{ticks:?}");
        }
        assert_eq!(nice_ticks(3.0, 3.0), vec![3.0]);
        assert_eq!(tick_decimals(&ticks), 0);
        assert_eq!(tick_label(2.0, 0), "2");
    }

    fn labels(lo: f64, hi: f64) -> Vec<String> {
        let ticks = nice_ticks(lo, hi);
        let d = tick_decimals(&ticks);
        ticks.iter().map(|&t| tick_label(t, d)).collect()
    }

    fn assert_well_formed(lo: f64, hi: f64) {
        let ticks = nice_ticks(lo, hi);
        assert!((2..=MAX_TICKS).contains(&ticks.len()), "{ticks:?}");
        assert!(ticks.windows(2).all(|w| w[0] < w[1]), "{ticks:?}");
    }

    #[test]
    fn quarter_step_labels_keep_two_decimals() {
        assert_well_formed(3.5, 4.75);
        assert_eq!(
            labels(3.5, 4.75),
            vec!["3.50", "3.75", "4.00", "4.25", "4.50", "4.75"]
        );
    }

    #[test]
    fn tiny_span_labels_resolve_each_step() {
        assert_well_formed(4.0, 4.01);
        assert_eq!(
            labels(4.0, 4.01),
            vec!["4.000", "4.002", "4.004", "4.006", "4.008", "4.010"]
        );
    }

    #[test]
    fn huge_magnitudes_stay_bounded() {
        let (lo, hi) = (1e16, 1e16 + 2.0);
        assert_well_formed(lo, hi);
        let ticks = nice_ticks(lo, hi);
        assert!(ticks[0] >= lo && *ticks.last().unwrap() <= hi, "{ticks:?}");
        assert_eq!(
            labels(lo, hi),
            vec!["10000000000000000", "10000000000000002"]
        );

        assert_well_formed(-1e308, 1e308);
        assert_well_formed(0.0, 1e300);
    }

    #[test]
    fn negative_zero_tick_prints_as_zero() {
        let l = labels(-1.0, 1.0);
        assert!(l.contains(&"0.0".to_string()) || l.contains(&"0".to_string()), "{l:?}");
        assert!(l.iter().all(|s| s != "-0" && s != "-0.0"), "{l:?}");
    }

    #[test]
    fn huge_ratings_still_draw() {
        let row = [Some(1e16), Some(1e16 + 2.0), None, None, None, None];
        let canvas = draw(&FeedbackMatrix::from_rows(vec![row]));
        assert!(!canvas.is_empty());
    }

    #[test]
    fn missing_cells_are_not_drawn() {
        let full = draw(&FeedbackMatrix::from_rows(vec![[Some(1.0); 6], [Some(5.0); 6]]));
        let gappy = draw(&FeedbackMatrix::from_rows(vec![
            [Some(1.0), None, None, None, None, None],
            [Some(5.0); 6],
        ]));
        // Each missing cell saves rg + re + B.
        assert_eq!(full.len() - gappy.len(), 5 * 3);
    }

    #[test]
    fn empty_matrix_still_draws_axes() {
        let canvas = draw(&FeedbackMatrix::from_rows(vec![]));
        assert!(!canvas.is_empty());
    }
}
