/// A point in frame-pixel coordinates.
///
/// Landmark positions are ephemeral — one is produced per detection tick and
/// discarded, except for the session baseline which is retained for the
/// lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Sum of absolute per-axis displacements to `other`.
    pub fn manhattan(&self, other: &Point) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_sums_both_axes() {
        let a = Point::new(100.0, 100.0);
        let b = Point::new(110.0, 108.0);
        assert_eq!(a.manhattan(&b), 18.0);
    }

    #[test]
    fn manhattan_is_symmetric_and_handles_negatives() {
        let a = Point::new(-5.0, 3.0);
        let b = Point::new(5.0, -3.0);
        assert_eq!(a.manhattan(&b), 16.0);
        assert_eq!(b.manhattan(&a), 16.0);
    }

    #[test]
    fn manhattan_zero_for_identical_points() {
        let p = Point::new(42.5, 17.25);
        assert_eq!(p.manhattan(&p), 0.0);
    }
}
