use serde::{Deserialize, Serialize};

/// Continuous position of an agent or actor, in world cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Quantizes the position onto the cell grid (floor on every axis).
    pub fn cell(&self) -> CellPos {
        CellPos {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }
}

/// Integer grid coordinate of a terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }
}

pub fn space_distance(a: Vec3, b: Vec3) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    ((dx * dx) + (dy * dy) + (dz * dz)).sqrt()
}

/// Distance on the horizontal plane; vertical movement does not count as travel.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    ((dx * dx) + (dz * dz)).sqrt()
}

/// Cells of a `(2r+1) x (2v+1) x (2r+1)` box around `center`, x-major order.
pub fn box_cells(center: Vec3, radius: i32, vertical: i32) -> Vec<CellPos> {
    let radius = radius.max(0);
    let vertical = vertical.max(0);
    let origin = center.cell();
    let mut cells = Vec::new();
    for dx in -radius..=radius {
        for dy in -vertical..=vertical {
            for dz in -radius..=radius {
                cells.push(origin.offset(dx, dy, dz));
            }
        }
    }
    cells
}
