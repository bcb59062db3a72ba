//! Drawing instructions produced by the solvers. Nothing here renders: every snapshot of a
//! method is a plain `Vec<GraphicPrimitive>` for whatever front end is attached.
/// `Color` palette and the `GraphicPrimitive` enum
pub mod primitives;
///  Example#1
/// ```
/// use CompMath::graphic::graphic_builder::{CurveStyle, GraphicBuilder};
/// use CompMath::graphic::primitives::Color;
/// let mut builder = GraphicBuilder::new(Some((0.0, 1.0)), Some((-1.0, 1.0)));
/// let f = |x: f64| x.sin();
/// builder.add_curve(Some(&f), None, CurveStyle::default().step(0.5), None, None).unwrap();
/// builder.add_point(0.5, f(0.5), Color::Red);
/// assert_eq!(builder.build().len(), 2);
/// ```
pub mod graphic_builder;
