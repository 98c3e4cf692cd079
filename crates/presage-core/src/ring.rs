//! Circular progress ring rendered as SVG.
//!
//! Standalone presentation component: a track circle plus a progress arc
//! whose visible length is `progress/100` of the circumference, drawn with
//! the stroke-dasharray/dashoffset technique. In the original UI the ring
//! wraps a looping video preview; here it is emitted as a standalone SVG
//! document.

use std::f32::consts::TAU;

/// Geometry of the ring. Defaults match the reference layout: a 200×200
/// viewport with a radius-50 circle and a 10-unit stroke centred at
/// (100, 100).
#[derive(Debug, Clone, Copy)]
pub struct ProgressRing {
    pub radius: f32,
    pub stroke_width: f32,
}

impl Default for ProgressRing {
    fn default() -> Self {
        Self {
            radius: 50.0,
            stroke_width: 10.0,
        }
    }
}

impl ProgressRing {
    pub fn new(radius: f32, stroke_width: f32) -> Self {
        Self {
            radius,
            stroke_width,
        }
    }

    pub fn circumference(&self) -> f32 {
        TAU * self.radius
    }

    /// Dash offset hiding the unfilled remainder of the arc. 0 progress
    /// hides the whole circumference; 100 hides nothing.
    pub fn dash_offset(&self, progress: f32) -> f32 {
        let progress = progress.clamp(0.0, 100.0);
        self.circumference() * (1.0 - progress / 100.0)
    }

    /// Side length of the square viewport, leaving the same margin around
    /// the ring as the reference layout (radius 50 in a 200×200 box).
    pub fn viewport(&self) -> f32 {
        self.radius * 4.0
    }

    /// Emit the two-circle SVG document for the given progress value.
    pub fn to_svg(&self, progress: f32) -> String {
        let size = self.viewport();
        let centre = size / 2.0;
        let circumference = self.circumference();
        let offset = self.dash_offset(progress);
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}">"#,
                "\n",
                r#"  <circle cx="{c}" cy="{c}" r="{r}" stroke="lightgray" stroke-width="{sw}" fill="none"/>"#,
                "\n",
                r#"  <circle cx="{c}" cy="{c}" r="{r}" stroke="blue" stroke-width="{sw}" fill="none" stroke-dasharray="{dash}" stroke-dashoffset="{offset}"/>"#,
                "\n</svg>\n",
            ),
            size = size,
            c = centre,
            r = self.radius,
            sw = self.stroke_width,
            dash = circumference,
            offset = offset,
        )
    }
}
