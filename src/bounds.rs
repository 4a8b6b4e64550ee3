/// Axis-aligned bounding box of a container.
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Side length along `axis`.
    pub fn side(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Squared length of the main diagonal.
    pub fn diagonal_squared(&self) -> f64 {
        let mut d2 = 0.0;
        for a in 0..3 {
            let s = self.side(a);
            d2 += s * s;
        }
        d2
    }

    /// Volume of the box.
    pub fn volume(&self) -> f64 {
        self.side(0) * self.side(1) * self.side(2)
    }
}
