use strum_macros::{Display, EnumIter};

/// Palette of the diagrams. Displayed in lowercase: `Color::Yellow` is "yellow".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Blue,
    Red,
    Yellow,
    Green,
    Black,
    Orange,
}

/// Renderer-agnostic drawing instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphicPrimitive {
    Point {
        x: f64,
        y: f64,
        color: Color,
    },
    /// `None` marks a sample where the curve is undefined or leaves the plot window
    Curve {
        x_data: Vec<Option<f64>>,
        y_data: Vec<Option<f64>>,
        color: Color,
        width: f64,
        fill: Option<Color>,
    },
    Rectangle {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
        fill: Option<Color>,
    },
    Polygon {
        vertices: Vec<(f64, f64)>,
        color: Color,
        width: f64,
        fill: Option<Color>,
    },
    Mesh {
        vertices: Vec<[f64; 3]>,
        faces: Vec<Vec<usize>>,
        shader: String,
    },
}

impl GraphicPrimitive {
    /// Short kind name, handy for logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphicPrimitive::Point { .. } => "point",
            GraphicPrimitive::Curve { .. } => "curve",
            GraphicPrimitive::Rectangle { .. } => "rectangle",
            GraphicPrimitive::Polygon { .. } => "polygon",
            GraphicPrimitive::Mesh { .. } => "mesh",
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            GraphicPrimitive::Point { color, .. }
            | GraphicPrimitive::Curve { color, .. }
            | GraphicPrimitive::Rectangle { color, .. }
            | GraphicPrimitive::Polygon { color, .. } => Some(*color),
            GraphicPrimitive::Mesh { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_color_names() {
        let names: Vec<String> = Color::iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["blue", "red", "yellow", "green", "black", "orange"]);
    }
}
