use plotters::chart::SeriesLabelPosition;

/// Where the legend box sits inside the plotting area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendLoc {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
    MiddleRight,
    MiddleLeft,
    LowerMiddle,
    UpperMiddle,
    Center,
}

/// Candidates for automatic placement, most preferred first.
pub const BEST_ORDER: [LegendLoc; 9] = [
    LegendLoc::UpperRight,
    LegendLoc::UpperLeft,
    LegendLoc::LowerLeft,
    LegendLoc::LowerRight,
    LegendLoc::MiddleRight,
    LegendLoc::MiddleLeft,
    LegendLoc::LowerMiddle,
    LegendLoc::UpperMiddle,
    LegendLoc::Center,
];

impl From<LegendLoc> for SeriesLabelPosition {
    fn from(loc: LegendLoc) -> Self {
        match loc {
            LegendLoc::UpperRight => SeriesLabelPosition::UpperRight,
            LegendLoc::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendLoc::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendLoc::LowerRight => SeriesLabelPosition::LowerRight,
            LegendLoc::MiddleRight => SeriesLabelPosition::MiddleRight,
            LegendLoc::MiddleLeft => SeriesLabelPosition::MiddleLeft,
            LegendLoc::LowerMiddle => SeriesLabelPosition::LowerMiddle,
            LegendLoc::UpperMiddle => SeriesLabelPosition::UpperMiddle,
            LegendLoc::Center => SeriesLabelPosition::MiddleMiddle,
        }
    }
}

/// Axis-aligned box in plot-relative coordinates: (0, 0) is the lower left
/// corner of the plotting area and (1, 1) the upper right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl UnitBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0: x0.min(x1), y0: y0.min(y1), x1: x0.max(x1), y1: y0.max(y1) }
    }

    pub fn overlaps(&self, other: &UnitBox) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    fn crosses_hline(&self, y: f64) -> bool {
        self.y0 <= y && y <= self.y1
    }
}

impl LegendLoc {
    /// The legend's box for this location, `margin` away from the edges.
    pub fn place(&self, width: f64, height: f64, margin: f64) -> UnitBox {
        let left = margin;
        let right = 1.0 - margin - width;
        let hmid = (1.0 - width) / 2.0;
        let bottom = margin;
        let top = 1.0 - margin - height;
        let vmid = (1.0 - height) / 2.0;
        let (x, y) = match self {
            LegendLoc::UpperRight => (right, top),
            LegendLoc::UpperLeft => (left, top),
            LegendLoc::LowerLeft => (left, bottom),
            LegendLoc::LowerRight => (right, bottom),
            LegendLoc::MiddleRight => (right, vmid),
            LegendLoc::MiddleLeft => (left, vmid),
            LegendLoc::LowerMiddle => (hmid, bottom),
            LegendLoc::UpperMiddle => (hmid, top),
            LegendLoc::Center => (hmid, vmid),
        };
        UnitBox::new(x, y, x + width, y + height)
    }
}

/// What the legend should avoid covering.
#[derive(Debug, Clone, Default)]
pub struct Obstacles {
    pub boxes: Vec<UnitBox>,
    pub hlines: Vec<f64>,
}

impl Obstacles {
    fn badness(&self, legend: &UnitBox) -> usize {
        self.boxes.iter().filter(|b| legend.overlaps(b)).count()
            + self.hlines.iter().filter(|y| legend.crosses_hline(**y)).count()
    }
}

/// Picks the first location in [`BEST_ORDER`] that covers the fewest
/// obstacles.
pub fn best_location(obstacles: &Obstacles, width: f64, height: f64, margin: f64) -> LegendLoc {
    let mut best = BEST_ORDER[0];
    let mut best_badness = usize::MAX;
    for loc in BEST_ORDER {
        let badness = obstacles.badness(&loc.place(width, height, margin));
        if badness < best_badness {
            best = loc;
            best_badness = badness;
            if badness == 0 {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_place() {
        let b = LegendLoc::UpperRight.place(0.25, 0.5, 0.0);
        assert_eq!(b, UnitBox::new(0.75, 0.5, 1.0, 1.0));
        let b = LegendLoc::LowerLeft.place(0.25, 0.5, 0.125);
        assert_eq!(b, UnitBox::new(0.125, 0.125, 0.375, 0.625));
        let b = LegendLoc::Center.place(0.5, 0.5, 0.125);
        assert_eq!(b, UnitBox::new(0.25, 0.25, 0.75, 0.75));
    }

    #[test]
    fn test_overlaps() {
        let a = UnitBox::new(0.0, 0.0, 0.5, 0.5);
        assert!(a.overlaps(&UnitBox::new(0.25, 0.25, 1.0, 1.0)));
        assert!(!a.overlaps(&UnitBox::new(0.5, 0.0, 1.0, 0.5)));
        assert!(!a.overlaps(&UnitBox::new(0.6, 0.6, 1.0, 1.0)));
    }

    #[test]
    fn test_prefers_upper_right_when_free() {
        assert_eq!(best_location(&Obstacles::default(), 0.3, 0.3, 0.02), LegendLoc::UpperRight);
        let obstacles = Obstacles {
            boxes: vec![UnitBox::new(0.0, 0.0, 0.4, 0.3)],
            hlines: vec![0.5],
        };
        assert_eq!(best_location(&obstacles, 0.3, 0.3, 0.02), LegendLoc::UpperRight);
    }

    #[test]
    fn test_avoids_tall_bars() {
        // Tall bar on the right, short bar on the left.
        let obstacles = Obstacles {
            boxes: vec![UnitBox::new(0.1, 0.0, 0.2, 0.2), UnitBox::new(0.8, 0.0, 0.9, 0.95)],
            hlines: vec![0.1],
        };
        assert_eq!(best_location(&obstacles, 0.3, 0.3, 0.02), LegendLoc::UpperLeft);
    }

    #[test]
    fn test_falls_back_to_least_covered() {
        // Everything is crossed by the baseline; the bar only blocks the right.
        let obstacles = Obstacles {
            boxes: vec![UnitBox::new(0.7, 0.0, 1.0, 1.0)],
            hlines: vec![0.0, 0.5, 1.0],
        };
        assert_eq!(best_location(&obstacles, 0.3, 0.3, 0.0), LegendLoc::UpperLeft);
    }
}
