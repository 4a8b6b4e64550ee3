//! WASM boundary. Thin `wasm_bindgen` wrappers over the containers; no
//! kernel logic lives here.

use wasm_bindgen::prelude::*;

use crate::bounds::BoundingBox;
use crate::cell::VoronoiCell;
use crate::container::{Container, ContainerPoly};
use crate::wall::{ConeWall, CylinderWall, PlaneWall, SphereWall};

#[cfg(all(target_arch = "wasm32", feature = "parallel"))]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    wasm_bindgen_rayon::init_thread_pool(n)
}

/// Plain container exposed to JavaScript.
#[wasm_bindgen]
pub struct WasmContainer {
    inner: Container,
}

#[wasm_bindgen]
impl WasmContainer {
    /// Bounds, grid resolution and per-axis periodicity.
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(constructor)]
    pub fn new(
        ax: f64,
        bx: f64,
        ay: f64,
        by: f64,
        az: f64,
        bz: f64,
        nx: usize,
        ny: usize,
        nz: usize,
        px: bool,
        py: bool,
        pz: bool,
    ) -> WasmContainer {
        WasmContainer {
            inner: Container::new(
                BoundingBox::new([ax, ay, az], [bx, by, bz]),
                [nx, ny, nz],
                [px, py, pz],
            ),
        }
    }

    /// Stores a particle; returns false when the position is rejected.
    pub fn put(&mut self, id: i32, x: f64, y: f64, z: f64) -> bool {
        self.inner.put(id, x, y, z).is_ok()
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.inner.total_particles()
    }

    pub fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
        self.inner.point_inside(x, y, z)
    }

    pub fn add_wall_plane(&mut self, nx: f64, ny: f64, nz: f64, displacement: f64, id: i32) {
        self.inner.add_wall(PlaneWall::new([nx, ny, nz], displacement, id));
    }

    pub fn add_wall_sphere(&mut self, cx: f64, cy: f64, cz: f64, radius: f64, id: i32) {
        self.inner.add_wall(SphereWall::new([cx, cy, cz], radius, id));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_wall_cylinder(
        &mut self,
        px: f64,
        py: f64,
        pz: f64,
        ax: f64,
        ay: f64,
        az: f64,
        radius: f64,
        id: i32,
    ) {
        self.inner
            .add_wall(CylinderWall::new([px, py, pz], [ax, ay, az], radius, id));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_wall_cone(
        &mut self,
        px: f64,
        py: f64,
        pz: f64,
        ax: f64,
        ay: f64,
        az: f64,
        half_angle: f64,
        id: i32,
    ) {
        self.inner
            .add_wall(ConeWall::new([px, py, pz], [ax, ay, az], half_angle, id));
    }

    /// Volume of every cell in grid-scan order, 0 for annihilated cells.
    pub fn cell_volumes(&self) -> Vec<f64> {
        let mut cell = VoronoiCell::new();
        self.inner
            .particles()
            .map(|p| {
                if self.inner.compute_cell(&mut cell, p.block, p.slot) {
                    cell.volume()
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Flat global cell centroids in grid-scan order; an annihilated cell
    /// reports its particle position.
    pub fn cell_centroids(&self) -> Vec<f64> {
        let mut cell = VoronoiCell::new();
        let mut out = Vec::with_capacity(self.inner.total_particles() * 3);
        for p in self.inner.particles() {
            if self.inner.compute_cell(&mut cell, p.block, p.slot) {
                let c = cell.centroid();
                out.push(c[0] + p.position[0]);
                out.push(c[1] + p.position[1]);
                out.push(c[2] + p.position[2]);
            } else {
                out.extend_from_slice(&p.position);
            }
        }
        out
    }

    pub fn sum_cell_volumes(&self) -> f64 {
        self.inner.sum_cell_volumes()
    }
}

/// Radical container exposed to JavaScript.
#[wasm_bindgen]
pub struct WasmContainerPoly {
    inner: ContainerPoly,
}

#[wasm_bindgen]
impl WasmContainerPoly {
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(constructor)]
    pub fn new(
        ax: f64,
        bx: f64,
        ay: f64,
        by: f64,
        az: f64,
        bz: f64,
        nx: usize,
        ny: usize,
        nz: usize,
        px: bool,
        py: bool,
        pz: bool,
    ) -> WasmContainerPoly {
        WasmContainerPoly {
            inner: ContainerPoly::new(
                BoundingBox::new([ax, ay, az], [bx, by, bz]),
                [nx, ny, nz],
                [px, py, pz],
            ),
        }
    }

    /// Stores a particle with a radius; returns false when rejected.
    pub fn put(&mut self, id: i32, x: f64, y: f64, z: f64, r: f64) -> bool {
        self.inner.put(id, x, y, z, r).is_ok()
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.inner.total_particles()
    }

    pub fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
        self.inner.point_inside(x, y, z)
    }

    /// Volume of every cell in grid-scan order, 0 for annihilated cells.
    pub fn cell_volumes(&self) -> Vec<f64> {
        let mut cell = VoronoiCell::new();
        self.inner
            .particles()
            .map(|p| {
                if self.inner.compute_cell(&mut cell, p.block, p.slot) {
                    cell.volume()
                } else {
                    0.0
                }
            })
            .collect()
    }

    pub fn sum_cell_volumes(&self) -> f64 {
        self.inner.sum_cell_volumes()
    }
}
