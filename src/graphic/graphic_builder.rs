use crate::error::{CompMathError, CompMathResult};
use crate::graphic::primitives::{Color, GraphicPrimitive};
use crate::symbolic::symbolic_derivatives::numerical_derivative;

/// Look of a sampled curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveStyle {
    pub color: Color,
    /// distance between samples on the independent axis
    pub step: f64,
    pub width: f64,
    pub fill: Option<Color>,
}

impl Default for CurveStyle {
    fn default() -> Self {
        CurveStyle {
            color: Color::Blue,
            step: 0.1,
            width: 1.0,
            fill: None,
        }
    }
}

impl CurveStyle {
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }
    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }
    pub fn fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }
}

fn sorted(limits: Option<(f64, f64)>) -> Option<(f64, f64)> {
    limits.map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

/// `lo + i*step` for `i in 0..ceil((hi-lo)/step)` strictly below `hi`, then `hi` itself.
fn sample_axis(lo: f64, hi: f64, step: f64) -> CompMathResult<Vec<f64>> {
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(CompMathError::Validation(format!(
            "curve limits must be finite, got ({}, {})",
            lo, hi
        )));
    }
    let count = ((hi - lo) / step).ceil().max(0.0) as usize;
    // rounding in the ratio can add one sample at or past `hi`
    let last_inner = hi - step * 1e-9;
    let mut samples: Vec<f64> = (0..count)
        .map(|i| lo + i as f64 * step)
        .filter(|&x| x < last_inner)
        .collect();
    samples.push(hi);
    Ok(samples)
}

fn clip(value: f64, limits: Option<(f64, f64)>) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    match limits {
        Some((lo, hi)) if value < lo || value > hi => None,
        _ => Some(value),
    }
}

/// Collects primitives of one diagram in insertion order.
///
/// The limits given at construction are defaults for every `add_curve` call.
#[derive(Clone, Debug, Default)]
pub struct GraphicBuilder {
    x_limits: Option<(f64, f64)>,
    y_limits: Option<(f64, f64)>,
    primitives: Vec<GraphicPrimitive>,
}

impl GraphicBuilder {
    pub fn new(x_limits: Option<(f64, f64)>, y_limits: Option<(f64, f64)>) -> Self {
        GraphicBuilder {
            x_limits: sorted(x_limits),
            y_limits: sorted(y_limits),
            primitives: Vec::new(),
        }
    }

    /// Samples `y = fx(x)` or `x = fy(y)` into a `Curve`.
    ///
    /// # Arguments
    /// * `fx`, `fy` - exactly one must be given
    /// * `style` - color, sampling step, width and fill
    /// * `x_limits`, `y_limits` - override the builder defaults for this curve
    ///
    /// Values of the dependent axis that are not finite or leave its limits become `None`.
    pub fn add_curve(
        &mut self,
        fx: Option<&dyn Fn(f64) -> f64>,
        fy: Option<&dyn Fn(f64) -> f64>,
        style: CurveStyle,
        x_limits: Option<(f64, f64)>,
        y_limits: Option<(f64, f64)>,
    ) -> CompMathResult<()> {
        let x_limits = sorted(x_limits).or(self.x_limits);
        let y_limits = sorted(y_limits).or(self.y_limits);
        if !(style.step > 0.0) {
            return Err(CompMathError::Validation(format!(
                "curve step must be positive, got {}",
                style.step
            )));
        }
        let (x_data, y_data) = match (fx, fy) {
            (None, None) => return Err(CompMathError::NoFunctionGiven),
            (Some(_), Some(_)) => return Err(CompMathError::AmbiguousFunction),
            (Some(f), None) => {
                let (lo, hi) = x_limits.ok_or(CompMathError::NoLimitsGiven)?;
                let xs = sample_axis(lo, hi, style.step)?;
                let ys: Vec<Option<f64>> = xs.iter().map(|&x| clip(f(x), y_limits)).collect();
                (xs.into_iter().map(Some).collect(), ys)
            }
            (None, Some(f)) => {
                let (lo, hi) = y_limits.ok_or(CompMathError::NoLimitsGiven)?;
                let ys = sample_axis(lo, hi, style.step)?;
                let xs: Vec<Option<f64>> = ys.iter().map(|&y| clip(f(y), x_limits)).collect();
                (xs, ys.into_iter().map(Some).collect())
            }
        };
        self.primitives.push(GraphicPrimitive::Curve {
            x_data,
            y_data,
            color: style.color,
            width: style.width,
            fill: style.fill,
        });
        Ok(())
    }

    pub fn add_point(&mut self, x: f64, y: f64, color: Color) {
        self.primitives.push(GraphicPrimitive::Point { x, y, color });
    }

    pub fn add_rect(
        &mut self,
        (x1, y1): (f64, f64),
        (x2, y2): (f64, f64),
        color: Color,
        width: f64,
        fill: Option<Color>,
    ) {
        self.primitives.push(GraphicPrimitive::Rectangle {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
            fill,
        });
    }

    pub fn add_polygon(
        &mut self,
        vertices: Vec<(f64, f64)>,
        color: Color,
        width: f64,
        fill: Option<Color>,
    ) {
        self.primitives.push(GraphicPrimitive::Polygon {
            vertices,
            color,
            width,
            fill,
        });
    }

    pub fn add_mesh(&mut self, vertices: Vec<[f64; 3]>, faces: Vec<Vec<usize>>, shader: &str) {
        self.primitives.push(GraphicPrimitive::Mesh {
            vertices,
            faces,
            shader: shader.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Primitives in the order they were added.
    pub fn build(self) -> Vec<GraphicPrimitive> {
        self.primitives
    }
}

/// Tangent `y = f(x0) + f'(x0)(x - x0)` with the numerical derivative.
pub fn tangent_line<F: Fn(f64) -> f64>(f: F, x0: f64) -> impl Fn(f64) -> f64 {
    let y0 = f(x0);
    let slope = numerical_derivative(&f, x0);
    move |x| y0 + slope * (x - x0)
}

/// Straight line through two points; a vertical pair gives a line that is nowhere finite.
pub fn line_between_points(x1: f64, y1: f64, x2: f64, y2: f64) -> impl Fn(f64) -> f64 {
    let slope = (y2 - y1) / (x2 - x1);
    move |x| y1 + slope * (x - x1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve_data(primitive: &GraphicPrimitive) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        match primitive {
            GraphicPrimitive::Curve { x_data, y_data, .. } => (x_data.clone(), y_data.clone()),
            other => panic!("expected curve, got {}", other.kind()),
        }
    }

    #[test]
    fn test_samples_include_upper_limit() {
        let mut builder = GraphicBuilder::new(None, None);
        let sin = |x: f64| x.sin();
        builder
            .add_curve(Some(&sin), None, CurveStyle::default().step(0.5), Some((0.0, 1.0)), None)
            .unwrap();
        let primitives = builder.build();
        let (xs, ys) = curve_data(&primitives[0]);
        assert_eq!(xs, vec![Some(0.0), Some(0.5), Some(1.0)]);
        assert_eq!(ys.len(), 3);
        assert_relative_eq!(ys[2].unwrap(), 1.0_f64.sin());
    }

    #[test]
    fn test_samples_stay_inside_limits() {
        // (1.1 - 0.0) / 0.1 rounds up to 12 samples
        let xs = sample_axis(0.0, 1.1, 0.1).unwrap();
        assert_eq!(xs.len(), 12);
        assert_eq!(*xs.last().unwrap(), 1.1);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert!(xs.iter().all(|&x| (0.0..=1.1).contains(&x)));
        assert_eq!(sample_axis(2.0, 2.0, 0.1).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_function_and_limit_errors() {
        let mut builder = GraphicBuilder::new(None, None);
        let f = |x: f64| x;
        assert!(matches!(
            builder.add_curve(None, None, CurveStyle::default(), Some((0.0, 1.0)), None),
            Err(CompMathError::NoFunctionGiven)
        ));
        assert!(matches!(
            builder.add_curve(Some(&f), Some(&f), CurveStyle::default(), Some((0.0, 1.0)), None),
            Err(CompMathError::AmbiguousFunction)
        ));
        assert!(matches!(
            builder.add_curve(Some(&f), None, CurveStyle::default(), None, None),
            Err(CompMathError::NoLimitsGiven)
        ));
        assert!(matches!(
            builder.add_curve(Some(&f), None, CurveStyle::default().step(0.0), Some((0.0, 1.0)), None),
            Err(CompMathError::Validation(_))
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_out_of_range_and_undefined_become_none() {
        let mut builder = GraphicBuilder::new(Some((1.0, -1.0)), Some((-2.0, 2.0)));
        let inverse = |x: f64| 1.0 / x;
        builder
            .add_curve(Some(&inverse), None, CurveStyle::default().step(0.25), None, None)
            .unwrap();
        let (xs, ys) = curve_data(&builder.build()[0]);
        // limits were swapped into (-1, 1)
        assert_eq!(xs.first(), Some(&Some(-1.0)));
        assert_eq!(xs.last(), Some(&Some(1.0)));
        let at_zero = xs.iter().position(|x| *x == Some(0.0)).unwrap();
        assert_eq!(ys[at_zero], None);
        let at_quarter = xs.iter().position(|x| *x == Some(0.25)).unwrap();
        assert_eq!(ys[at_quarter], None);
        let at_one = xs.iter().position(|x| *x == Some(1.0)).unwrap();
        assert_eq!(ys[at_one], Some(1.0));
    }

    #[test]
    fn test_curve_along_y() {
        let mut builder = GraphicBuilder::new(Some((-10.0, 10.0)), Some((0.0, 2.0)));
        let square = |y: f64| y * y;
        builder
            .add_curve(None, Some(&square), CurveStyle::default().step(1.0), None, None)
            .unwrap();
        let (xs, ys) = curve_data(&builder.build()[0]);
        assert_eq!(ys, vec![Some(0.0), Some(1.0), Some(2.0)]);
        assert_eq!(xs, vec![Some(0.0), Some(1.0), Some(4.0)]);
    }

    #[test]
    fn test_fifo_order() {
        let mut builder = GraphicBuilder::new(Some((0.0, 1.0)), None);
        builder.add_point(0.0, 0.0, Color::Red);
        builder.add_rect((0.0, 0.0), (1.0, 1.0), Color::Red, 1.0, None);
        builder.add_polygon(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], Color::Green, 1.0, Some(Color::Green));
        builder.add_mesh(vec![[0.0, 0.0, 0.0]], vec![vec![0]], "flat");
        let f = |x: f64| x;
        builder.add_curve(Some(&f), None, CurveStyle::default(), None, None).unwrap();
        let kinds: Vec<&str> = builder.build().iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec!["point", "rectangle", "polygon", "mesh", "curve"]);
    }

    #[test]
    fn test_lines() {
        let tangent = tangent_line(|x: f64| x * x, 1.0);
        assert_relative_eq!(tangent(3.0), 5.0, epsilon = 1e-3);
        let chord = line_between_points(0.0, 1.0, 2.0, 5.0);
        assert_relative_eq!(chord(1.0), 3.0);
        assert!(!line_between_points(1.0, 0.0, 1.0, 2.0)(1.0).is_finite());
    }
}
