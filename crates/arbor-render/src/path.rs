use crate::transition::Interpolate;
use arbor_core::Point;

/// A cubic Bezier connector between two layout points.
///
/// The control points sit halfway along the depth axis, and the curve is projected so depth
/// runs horizontally: layout `(x, y)` is drawn at screen `(y, x)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagonal {
    pub source: Point,
    pub target: Point,
}

impl Diagonal {
    pub fn new(source: Point, target: Point) -> Self {
        Self { source, target }
    }

    /// A zero-length diagonal, the start and end state of growing or collapsing links.
    pub fn collapsed(at: Point) -> Self {
        Self {
            source: at,
            target: at,
        }
    }

    /// The four Bezier points in screen space.
    pub fn screen_points(&self) -> [Point; 4] {
        let s = self.source;
        let t = self.target;
        let m = (s.y + t.y) / 2.0;
        [
            project(s),
            project(Point::new(s.x, m)),
            project(Point::new(t.x, m)),
            project(t),
        ]
    }

    /// SVG path data: `M x0,y0C x1,y1 x2,y2 x3,y3`.
    pub fn to_path_d(&self) -> String {
        let mut buf = ryu_js::Buffer::new();
        let [p0, p1, p2, p3] = self.screen_points();
        let mut out = String::with_capacity(64);
        out.push('M');
        push_pair(&mut out, p0, &mut buf);
        out.push('C');
        push_pair(&mut out, p1, &mut buf);
        out.push(' ');
        push_pair(&mut out, p2, &mut buf);
        out.push(' ');
        push_pair(&mut out, p3, &mut buf);
        out
    }
}

impl Interpolate for Diagonal {
    fn interpolate(self, to: Self, t: f64) -> Self {
        Self {
            source: self.source.lerp(to.source, t),
            target: self.target.lerp(to.target, t),
        }
    }
}

/// Layout space to screen space.
pub fn project(p: Point) -> Point {
    Point::new(p.y, p.x)
}

fn push_pair(out: &mut String, p: Point, buf: &mut ryu_js::Buffer) {
    out.push_str(js_number(p.x, buf));
    out.push(',');
    out.push_str(js_number(p.y, buf));
}

/// Formats a number the way a JS engine stringifies it into an attribute.
pub(crate) fn js_number(mut v: f64, buf: &mut ryu_js::Buffer) -> &str {
    if !v.is_finite() {
        return "0";
    }
    if v == -0.0 {
        v = 0.0;
    }
    buf.format_finite(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_bends_halfway_along_depth() {
        let d = Diagonal::new(Point::new(50.0, 0.0), Point::new(25.0, 200.0));
        assert_eq!(d.to_path_d(), "M0,50C100,50 100,25 200,25");
    }

    #[test]
    fn collapsed_diagonal_is_a_point() {
        let d = Diagonal::collapsed(Point::new(10.5, 3.0));
        assert_eq!(d.to_path_d(), "M3,10.5C3,10.5 3,10.5 3,10.5");
    }

    #[test]
    fn interpolating_diagonals_moves_both_ends() {
        let from = Diagonal::collapsed(Point::new(0.0, 0.0));
        let to = Diagonal::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let mid = from.interpolate(to, 0.5);
        assert_eq!(mid.target, Point::new(50.0, 50.0));
        assert_eq!(mid.source, Point::ORIGIN);
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        let mut buf = ryu_js::Buffer::new();
        assert_eq!(js_number(-0.0, &mut buf), "0");
        assert_eq!(js_number(f64::NAN, &mut buf), "0");
    }
}
