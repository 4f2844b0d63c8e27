use nalgebra::Vector3;

/// A vertex position, stored with the 32 bit precision of binary STL.
pub type Vertex = Vector3<f32>;

/// One raw STL facet: three positions in winding order and an optional normal.
///
/// The normal is carried as-is. It is never computed or checked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub normal: Option<Vertex>,
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(vertices: [Vertex; 3]) -> Triangle {
        Triangle {
            normal: None,
            vertices,
        }
    }

    pub fn with_normal(normal: Vertex, vertices: [Vertex; 3]) -> Triangle {
        Triangle {
            normal: Some(normal),
            vertices,
        }
    }

    /// The stored normal, or the zero vector when there is none.
    pub fn normal_or_zero(&self) -> Vertex {
        self.normal.unwrap_or_else(Vertex::zeros)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn missing_normal_is_zero() {
        let t = Triangle::new([
            vector![0.0, 0.0, 0.0],
            vector![1.0, 0.0, 0.0],
            vector![0.0, 1.0, 0.0],
        ]);
        assert_eq!(t.normal_or_zero(), Vertex::zeros());
    }

    #[test]
    fn normal_is_not_recomputed() {
        // Deliberately wrong for this winding, kept anyway.
        let t = Triangle::with_normal(
            vector![0.0, 0.0, -1.0],
            [
                vector![0.0, 0.0, 0.0],
                vector![1.0, 0.0, 0.0],
                vector![0.0, 1.0, 0.0],
            ],
        );
        assert_eq!(t.normal_or_zero(), vector![0.0, 0.0, -1.0]);
    }
}
