use eframe::egui::{Pos2, Rect, Vec2, pos2};

// ---------------------------------------------------------------------------
// Year axis: evenly spaced ordinal positions
// ---------------------------------------------------------------------------

/// Maps each distinct year to an evenly spaced position in `[0, range]`,
/// regardless of the numeric gap between years.  `padding` is the outer
/// gap on each side, in steps.
#[derive(Debug, Clone)]
pub struct PointScale {
    domain: Vec<i64>,
    start: f32,
    step: f32,
}

impl PointScale {
    pub fn new(domain: Vec<i64>, range: f32, padding: f32) -> Self {
        let n = domain.len() as f32;
        let step = range / (n - 1.0 + 2.0 * padding).max(1.0);
        let start = (range - step * (n - 1.0).max(0.0)) / 2.0;
        Self { domain, start, step }
    }

    /// Position of `year`, or `None` if it is not in the domain.
    pub fn map(&self, year: i64) -> Option<f32> {
        self.domain
            .iter()
            .position(|&y| y == year)
            .map(|i| self.start + self.step * i as f32)
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn domain(&self) -> &[i64] {
        &self.domain
    }
}

// ---------------------------------------------------------------------------
// Rank axis: inverted linear scale
// ---------------------------------------------------------------------------

/// Linear map from rank to vertical position: rank 1 at the top (0),
/// `max_rank` at the bottom (`height`).
#[derive(Debug, Clone, Copy)]
pub struct RankScale {
    max_rank: i64,
    height: f32,
}

impl RankScale {
    pub fn new(max_rank: i64, height: f32) -> Self {
        Self { max_rank, height }
    }

    pub fn map(&self, rank: i64) -> f32 {
        let span = self.max_rank as f32 - 1.0;
        if span <= 0.0 {
            // Degenerate domain: everything sits mid-axis.
            return self.height / 2.0;
        }
        (rank as f32 - 1.0) / span * self.height
    }

    pub fn max_rank(&self) -> i64 {
        self.max_rank
    }
}

/// Integer tick values between 1 and `max_rank`, aiming for about ten.
pub fn rank_ticks(max_rank: i64) -> Vec<i64> {
    if max_rank <= 1 {
        return vec![1];
    }
    let step = tick_step(max_rank as f64 - 1.0, 10).max(1.0) as i64;
    (step..=max_rank).step_by(step as usize).collect()
}

/// 1, 2 or 5 × 10^k step covering `span` in roughly `count` ticks.
fn tick_step(span: f64, count: usize) -> f64 {
    let raw = span / count as f64;
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

// ---------------------------------------------------------------------------
// Fitting the logical canvas into the available screen area
// ---------------------------------------------------------------------------

/// Uniform scale + offset placing a `width` × `height` logical canvas in
/// the middle of a screen rectangle, as large as fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: f32,
    pub offset: Vec2,
}

impl FitTransform {
    pub fn new(logical: Vec2, screen: Rect) -> Self {
        let scale = (screen.width() / logical.x)
            .min(screen.height() / logical.y)
            .max(0.0);
        let used = logical * scale;
        let offset = screen.min.to_vec2() + (screen.size() - used) / 2.0;
        Self { scale, offset }
    }

    pub fn to_screen(&self, p: Pos2) -> Pos2 {
        pos2(p.x * self.scale, p.y * self.scale) + self.offset
    }

    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(r.min), self.to_screen(r.max))
    }

    /// Inverse of [`FitTransform::to_screen`].
    pub fn to_logical(&self, p: Pos2) -> Pos2 {
        if self.scale == 0.0 {
            return Pos2::ZERO;
        }
        let v = (p - self.offset).to_vec2() / self.scale;
        pos2(v.x, v.y)
    }

    pub fn scaled(&self, logical: f32) -> f32 {
        logical * self.scale
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn years_are_evenly_spaced_regardless_of_gaps() {
        let scale = PointScale::new(vec![2012, 2016, 2021, 2024], 700.0, 1.0);
        let xs: Vec<f32> = scale.domain().iter().map(|&y| scale.map(y).unwrap()).collect();
        assert_eq!(scale.step(), 140.0);
        assert_eq!(xs, vec![140.0, 280.0, 420.0, 560.0]);
        assert_eq!(scale.map(2000), None);
    }

    #[test]
    fn single_year_sits_in_the_middle() {
        let scale = PointScale::new(vec![2012], 730.0, 1.0);
        assert_eq!(scale.map(2012), Some(365.0));
    }

    #[test]
    fn rank_scale_is_inverted_and_monotonic() {
        let scale = RankScale::new(8, 480.0);
        assert_eq!(scale.map(1), 0.0);
        assert_eq!(scale.map(8), 480.0);
        for r in 1..8 {
            assert!(scale.map(r) < scale.map(r + 1));
        }
    }

    #[test]
    fn degenerate_rank_domain_maps_to_middle() {
        assert_eq!(RankScale::new(1, 480.0).map(1), 240.0);
        assert_eq!(RankScale::new(0, 480.0).map(0), 240.0);
    }

    #[test]
    fn ticks() {
        assert_eq!(rank_ticks(1), vec![1]);
        assert_eq!(rank_ticks(5), vec![1, 2, 3, 4, 5]);
        assert_eq!(rank_ticks(12), (1..=12).collect::<Vec<_>>());
        assert_eq!(rank_ticks(40), vec![5, 10, 15, 20, 25, 30, 35, 40]);
    }

    #[test]
    fn fit_is_centered_and_invertible() {
        let screen = Rect::from_min_size(pos2(10.0, 20.0), vec2(1920.0, 800.0));
        let fit = FitTransform::new(vec2(960.0, 600.0), screen);
        assert!((fit.scale - 800.0 / 600.0).abs() < 1e-6);
        let centre = fit.to_screen(pos2(480.0, 300.0));
        assert!((centre.x - 970.0).abs() < 1e-3);
        assert!((centre.y - 420.0).abs() < 1e-3);
        let back = fit.to_logical(centre);
        assert!((back.x - 480.0).abs() < 1e-3);
        assert!((back.y - 300.0).abs() < 1e-3);
    }
}
