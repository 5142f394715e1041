use crate::foundation::core::Rect;

/// Image layout family, selected by how many pictures a post carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageArrangement {
    TextOnly,
    Single,
    StackedPair,
    FeatureTrio,
    Grid2x2,
}

impl ImageArrangement {
    /// Counts above four collapse onto the 2x2 grid.
    pub fn for_count(count: usize) -> Self {
        match count {
            0 => Self::TextOnly,
            1 => Self::Single,
            2 => Self::StackedPair,
            3 => Self::FeatureTrio,
            _ => Self::Grid2x2,
        }
    }

    pub fn template(self) -> &'static ArrangementTemplate {
        match self {
            Self::TextOnly => &TEXT_ONLY,
            Self::Single => &SINGLE,
            Self::StackedPair => &STACKED_PAIR,
            Self::FeatureTrio => &FEATURE_TRIO,
            Self::Grid2x2 => &GRID_2X2,
        }
    }
}

/// Cell in the normalized unit square, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

const fn unit(x: f64, y: f64, w: f64, h: f64) -> UnitRect {
    UnitRect { x, y, w, h }
}

/// Proportional cell layout for one arrangement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrangementTemplate {
    pub cells: &'static [UnitRect],
    /// Lay the cells out inside a square rather than the full band.
    pub square: bool,
}

const TEXT_ONLY: ArrangementTemplate = ArrangementTemplate {
    cells: &[],
    square: false,
};

const SINGLE: ArrangementTemplate = ArrangementTemplate {
    cells: &[unit(0.0, 0.0, 1.0, 1.0)],
    square: false,
};

const STACKED_PAIR: ArrangementTemplate = ArrangementTemplate {
    cells: &[unit(0.0, 0.0, 1.0, 0.5), unit(0.0, 0.5, 1.0, 0.5)],
    square: false,
};

const FEATURE_TRIO: ArrangementTemplate = ArrangementTemplate {
    cells: &[
        unit(0.0, 0.0, 1.0, 0.6),
        unit(0.0, 0.6, 0.5, 0.4),
        unit(0.5, 0.6, 0.5, 0.4),
    ],
    square: false,
};

const GRID_2X2: ArrangementTemplate = ArrangementTemplate {
    cells: &[
        unit(0.0, 0.0, 0.5, 0.5),
        unit(0.5, 0.0, 0.5, 0.5),
        unit(0.0, 0.5, 0.5, 0.5),
        unit(0.5, 0.5, 0.5, 0.5),
    ],
    square: true,
};

impl ArrangementTemplate {
    /// Resolve the template against an image band.
    ///
    /// `band` spans the available vertical space; `max_width` caps the composition width, which
    /// is centered horizontally on `band`. Each interior cell boundary consumes one `gap`, so
    /// proportions apply to the space left after gaps.
    pub fn materialize(&self, band: Rect, max_width: f64, gap: f64) -> Vec<Rect> {
        if self.cells.is_empty() || band.width() <= 0.0 || band.height() <= 0.0 {
            return Vec::new();
        }

        let mut width = band.width().min(max_width);
        let mut height = band.height();
        if self.square {
            let side = width.min(height);
            width = side;
            height = side;
        }
        let x0 = band.x0 + (band.width() - width) / 2.0;
        let y0 = band.y0;

        let xs = interior_breaks(self.cells.iter().map(|c| (c.x, c.w)));
        let ys = interior_breaks(self.cells.iter().map(|c| (c.y, c.h)));
        let inner_w = (width - gap * xs.len() as f64).max(0.0);
        let inner_h = (height - gap * ys.len() as f64).max(0.0);

        self.cells
            .iter()
            .map(|c| {
                let (before_x, spanned_x) = gap_counts(&xs, c.x, c.w);
                let (before_y, spanned_y) = gap_counts(&ys, c.y, c.h);
                let x = x0 + c.x * inner_w + before_x * gap;
                let y = y0 + c.y * inner_h + before_y * gap;
                Rect::from_origin_size(
                    (x, y),
                    (c.w * inner_w + spanned_x * gap, c.h * inner_h + spanned_y * gap),
                )
            })
            .collect()
    }
}

const BREAK_EPS: f64 = 1e-9;

/// Gaps that precede a cell and gaps that fall strictly inside its span.
fn gap_counts(breaks: &[f64], start: f64, len: f64) -> (f64, f64) {
    let end = start + len;
    let before = breaks.iter().filter(|&&b| b <= start + BREAK_EPS).count();
    let inside = breaks
        .iter()
        .filter(|&&b| b > start + BREAK_EPS && b < end - BREAK_EPS)
        .count();
    (before as f64, inside as f64)
}

/// Distinct cell edges strictly inside (0, 1) along one axis.
fn interior_breaks(spans: impl Iterator<Item = (f64, f64)>) -> Vec<f64> {
    let mut out = Vec::<f64>::new();
    for (start, len) in spans {
        for edge in [start, start + len] {
            if edge > BREAK_EPS
                && edge < 1.0 - BREAK_EPS
                && !out.iter().any(|&b| (b - edge).abs() < BREAK_EPS)
            {
                out.push(edge);
            }
        }
    }
    out.sort_by(f64::total_cmp);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/arrangement.rs"]
mod tests;
