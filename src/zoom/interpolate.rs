use super::ViewWindow;

const RHO: f64 = std::f64::consts::SQRT_2;
const RHO2: f64 = 2.0;
const RHO4: f64 = 4.0;
const EPSILON2: f64 = 1e-12;

/// Cubic in-out easing.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Clone, Copy, Debug)]
enum Shape {
    /// Centers coincide: pure exponential zoom with a linear pan remainder.
    Zoom { s: f64 },
    /// van Wijk and Nuttall's optimal pan+zoom path.
    Arc { d1: f64, r0: f64, s: f64 },
}

/// Smooth pan-and-zoom path between two view windows.
#[derive(Clone, Copy, Debug)]
pub struct ZoomPath {
    from: ViewWindow,
    to: ViewWindow,
    shape: Shape,
}

impl ZoomPath {
    pub fn new(from: ViewWindow, to: ViewWindow) -> Self {
        let (w0, w1) = (from.diameter, to.diameter);
        let dx = to.cx - from.cx;
        let dy = to.cy - from.cy;
        let d2 = dx * dx + dy * dy;

        let shape = if d2 < EPSILON2 {
            Shape::Zoom {
                s: (w1 / w0).ln() / RHO,
            }
        } else {
            let d1 = d2.sqrt();
            let b0 = (w1 * w1 - w0 * w0 + RHO4 * d2) / (2.0 * w0 * RHO2 * d1);
            let b1 = (w1 * w1 - w0 * w0 - RHO4 * d2) / (2.0 * w1 * RHO2 * d1);
            let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
            let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();
            Shape::Arc {
                d1,
                r0,
                s: (r1 - r0) / RHO,
            }
        };

        Self { from, to, shape }
    }

    pub fn to(&self) -> ViewWindow {
        self.to
    }

    /// View at progress `t`; the end points are returned exactly.
    pub fn at(&self, t: f64) -> ViewWindow {
        if t <= 0.0 {
            return self.from;
        }
        if t >= 1.0 {
            return self.to;
        }

        let ViewWindow {
            cx: ux0,
            cy: uy0,
            diameter: w0,
        } = self.from;
        let dx = self.to.cx - ux0;
        let dy = self.to.cy - uy0;

        let view = match self.shape {
            Shape::Zoom { s } => ViewWindow {
                cx: ux0 + t * dx,
                cy: uy0 + t * dy,
                diameter: w0 * (RHO * t * s).exp(),
            },
            Shape::Arc { d1, r0, s } => {
                let s = t * s;
                let cosh_r0 = r0.cosh();
                let u = w0 / (RHO2 * d1) * (cosh_r0 * (RHO * s + r0).tanh() - r0.sinh());
                ViewWindow {
                    cx: ux0 + u * dx,
                    cy: uy0 + u * dy,
                    diameter: w0 * cosh_r0 / (RHO * s + r0).cosh(),
                }
            }
        };

        if view.cx.is_finite() && view.cy.is_finite() && view.diameter.is_finite() {
            view
        } else {
            self.linear(t)
        }
    }

    // Used only when the analytic path degenerates (zero diameters).
    fn linear(&self, t: f64) -> ViewWindow {
        ViewWindow {
            cx: self.from.cx + (self.to.cx - self.from.cx) * t,
            cy: self.from.cy + (self.to.cy - self.from.cy) * t,
            diameter: self.from.diameter + (self.to.diameter - self.from.diameter) * t,
        }
    }
}
