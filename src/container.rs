use std::io::BufRead;

use crate::bounds::BoundingBox;
use crate::cell::VoronoiCell;
use crate::compute::{self, MonoRadius, PolyRadius};
use crate::config::{DEFAULT_INIT_MEMORY, DEFAULT_TOLERANCE, MAX_PARTICLE_MEMORY};
use crate::error::Error;
use crate::grid::ParticleGrid;
use crate::loops::{OrderedIter, ParticleIter, ParticleOrder, SubsetIter};
use crate::wall::{Wall, WallList};

/// State shared by the two container flavors: the particle grid, the wall
/// list and the classification tolerance handed to cells.
pub(crate) struct ContainerBase {
    pub grid: ParticleGrid,
    pub walls: WallList,
    pub tolerance: f64,
}

impl ContainerBase {
    fn new(
        bounds: BoundingBox,
        blocks: [usize; 3],
        periodic: [bool; 3],
        stride: usize,
        init_mem: usize,
    ) -> ContainerBase {
        ContainerBase {
            tolerance: DEFAULT_TOLERANCE * bounds.diagonal_squared(),
            grid: ParticleGrid::new(
                bounds,
                blocks,
                periodic,
                stride,
                init_mem,
                MAX_PARTICLE_MEMORY,
            ),
            walls: WallList::new(),
        }
    }

    /// Initializes `cell` to the container extent seen from the particle in
    /// box `ijk`, slot `q`: the full box on non-periodic axes, half a
    /// period either way on periodic ones (those boundaries belong to the
    /// particle's own images). Then applies the walls. Returns `false` when
    /// the walls annihilate the cell.
    pub fn initialize_cell(&self, cell: &mut VoronoiCell, ijk: usize, q: usize) -> bool {
        let p = self.grid.position(ijk, q);
        let mut lo = [0.0f64; 3];
        let mut hi = [0.0f64; 3];
        for a in 0..3 {
            if self.grid.periodic[a] {
                hi[a] = 0.5 * self.grid.bounds.side(a);
                lo[a] = -hi[a];
            } else {
                lo[a] = self.grid.bounds.min[a] - p[a];
                hi[a] = self.grid.bounds.max[a] - p[a];
            }
        }
        cell.set_tolerance(self.tolerance);
        cell.init(lo[0], hi[0], lo[1], hi[1], lo[2], hi[2]);
        self.walls.apply(cell, p)
    }

    pub fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
        match self.grid.remap([x, y, z]) {
            Ok(p) => self.walls.point_inside(p[0], p[1], p[2]),
            Err(_) => false,
        }
    }
}

macro_rules! shared_container_api {
    () => {
        /// The container bounding box.
        pub fn bounds(&self) -> BoundingBox {
            self.base.grid.bounds
        }

        /// Per-axis periodicity flags.
        pub fn periodic(&self) -> [bool; 3] {
            self.base.grid.periodic
        }

        /// Number of computational boxes along each axis.
        pub fn grid_shape(&self) -> [usize; 3] {
            self.base.grid.n
        }

        /// Overrides the on-plane classification tolerance. The default
        /// scales with the squared container diagonal.
        pub fn set_tolerance(&mut self, tolerance: f64) {
            self.base.tolerance = tolerance;
        }

        /// Overrides the per-box particle ceiling.
        pub fn set_max_particle_memory(&mut self, ceiling: usize) {
            self.base.grid.max_particle_memory = ceiling;
        }

        /// Adds a wall. Walls apply to cells computed afterwards; particles
        /// already stored are not revalidated.
        pub fn add_wall<W: Wall + 'static>(&mut self, wall: W) {
            self.base.walls.add(Box::new(wall));
        }

        /// Whether a point lies in the container and inside every wall.
        pub fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
            self.base.point_inside(x, y, z)
        }

        /// Number of stored particles.
        pub fn total_particles(&self) -> usize {
            self.base.grid.total_particles()
        }

        /// Grid-scan traversal over the stored particles.
        pub fn particles(&self) -> ParticleIter<'_> {
            ParticleIter::new(&self.base.grid)
        }

        /// Insertion-order traversal driven by `order`.
        pub fn particles_ordered<'a>(&'a self, order: &'a ParticleOrder) -> OrderedIter<'a> {
            OrderedIter::new(&self.base.grid, order)
        }

        /// Traversal over particles inside `[min, max]` (inclusive).
        pub fn particles_in(&self, min: [f64; 3], max: [f64; 3]) -> SubsetIter<'_> {
            SubsetIter::new(&self.base.grid, min, max)
        }
    };
}

/// Container for plain Voronoi tessellations: each particle is a bare
/// point and cells follow the Euclidean bisectors.
///
/// ```
/// use voroxide::{BoundingBox, Container, VoronoiCell};
///
/// let mut con = Container::new(
///     BoundingBox::new([0.0; 3], [1.0; 3]),
///     [5, 5, 5],
///     [false; 3],
/// );
/// con.put(0, 0.5, 0.5, 0.5).unwrap();
/// let mut cell = VoronoiCell::new();
/// let p = con.particles().next().unwrap();
/// assert!(con.compute_cell(&mut cell, p.block, p.slot));
/// assert!((cell.volume() - 1.0).abs() < 1e-9);
/// ```
pub struct Container {
    base: ContainerBase,
}

impl Container {
    /// Creates an empty container over `bounds`, split into
    /// `blocks[0]·blocks[1]·blocks[2]` computational boxes, with per-axis
    /// periodicity `periodic`.
    pub fn new(bounds: BoundingBox, blocks: [usize; 3], periodic: [bool; 3]) -> Container {
        Container::with_init_memory(bounds, blocks, periodic, DEFAULT_INIT_MEMORY)
    }

    /// Same as [`new`](Self::new) with an explicit initial per-box
    /// capacity.
    pub fn with_init_memory(
        bounds: BoundingBox,
        blocks: [usize; 3],
        periodic: [bool; 3],
        init_mem: usize,
    ) -> Container {
        Container {
            base: ContainerBase::new(bounds, blocks, periodic, 3, init_mem),
        }
    }

    shared_container_api!();

    /// Drops all particles; capacities are retained.
    pub fn clear(&mut self) {
        self.base.grid.clear();
    }

    /// Stores a particle. Rejects positions outside the container on
    /// non-periodic axes.
    pub fn put(&mut self, id: i32, x: f64, y: f64, z: f64) -> Result<(), Error> {
        self.base.grid.put(id, [x, y, z], 0.0).map(|_| ())
    }

    /// Stores a particle and records it in the insertion-order sidecar.
    pub fn put_ordered(
        &mut self,
        order: &mut ParticleOrder,
        id: i32,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(), Error> {
        let loc = self.base.grid.put(id, [x, y, z], 0.0)?;
        order.entries.push(loc);
        Ok(())
    }

    /// Imports whitespace-separated `id x y z` records, one per line.
    /// Blank lines are skipped; the first malformed line aborts the import
    /// with [`Error::Parse`]. Returns the number of particles read.
    pub fn import<R: BufRead>(&mut self, reader: R) -> Result<usize, Error> {
        let mut count = 0;
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (id, x, y, z) = parse_plain(&line).ok_or(Error::Parse { line: n + 1 })?;
            self.put(id, x, y, z)?;
            count += 1;
        }
        Ok(count)
    }

    /// [`import`](Self::import) that also fills an insertion-order sidecar.
    pub fn import_ordered<R: BufRead>(
        &mut self,
        order: &mut ParticleOrder,
        reader: R,
    ) -> Result<usize, Error> {
        let mut count = 0;
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (id, x, y, z) = parse_plain(&line).ok_or(Error::Parse { line: n + 1 })?;
            self.put_ordered(order, id, x, y, z)?;
            count += 1;
        }
        Ok(count)
    }

    /// Computes the Voronoi cell of the particle at `(block, slot)` into
    /// `cell`. Returns `false` when walls or neighbors leave no cell.
    pub fn compute_cell(&self, cell: &mut VoronoiCell, block: usize, slot: usize) -> bool {
        if !self.base.initialize_cell(cell, block, slot) {
            return false;
        }
        compute::compute_cell(&self.base.grid, &MonoRadius, cell, block, slot)
    }

    /// Computes every cell once, discarding the meshes. Returns the number
    /// of particles that still own a cell.
    pub fn compute_all_cells(&self) -> usize {
        let locs: Vec<(usize, usize)> = self.particles().map(|p| (p.block, p.slot)).collect();
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            locs.par_iter()
                .map_init(VoronoiCell::new, |cell, &(b, s)| {
                    usize::from(self.compute_cell(cell, b, s))
                })
                .sum()
        }
        #[cfg(not(feature = "parallel"))]
        {
            let mut cell = VoronoiCell::new();
            locs.iter()
                .filter(|&&(b, s)| self.compute_cell(&mut cell, b, s))
                .count()
        }
    }

    /// Sum of all cell volumes. For a wall-free container this reproduces
    /// the container volume.
    pub fn sum_cell_volumes(&self) -> f64 {
        let locs: Vec<(usize, usize)> = self.particles().map(|p| (p.block, p.slot)).collect();
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            locs.par_iter()
                .map_init(VoronoiCell::new, |cell, &(b, s)| {
                    if self.compute_cell(cell, b, s) {
                        cell.volume()
                    } else {
                        0.0
                    }
                })
                .sum()
        }
        #[cfg(not(feature = "parallel"))]
        {
            let mut cell = VoronoiCell::new();
            locs.iter()
                .map(|&(b, s)| {
                    if self.compute_cell(&mut cell, b, s) {
                        cell.volume()
                    } else {
                        0.0
                    }
                })
                .sum()
        }
    }

}

/// Container for radical (power diagram) tessellations: every particle
/// carries a radius and dividing planes follow the weighted bisectors.
pub struct ContainerPoly {
    base: ContainerBase,
    max_radius: f64,
}

impl ContainerPoly {
    /// Creates an empty radical container; see [`Container::new`].
    pub fn new(bounds: BoundingBox, blocks: [usize; 3], periodic: [bool; 3]) -> ContainerPoly {
        ContainerPoly::with_init_memory(bounds, blocks, periodic, DEFAULT_INIT_MEMORY)
    }

    /// Same as [`new`](Self::new) with an explicit initial per-box
    /// capacity.
    pub fn with_init_memory(
        bounds: BoundingBox,
        blocks: [usize; 3],
        periodic: [bool; 3],
        init_mem: usize,
    ) -> ContainerPoly {
        ContainerPoly {
            base: ContainerBase::new(bounds, blocks, periodic, 4, init_mem),
            max_radius: 0.0,
        }
    }

    shared_container_api!();

    /// Largest radius stored so far; it scales the radical search bound.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Drops all particles and forgets the maximum radius; capacities are
    /// retained.
    pub fn clear(&mut self) {
        self.base.grid.clear();
        self.max_radius = 0.0;
    }

    /// Stores a particle with its radius.
    pub fn put(&mut self, id: i32, x: f64, y: f64, z: f64, r: f64) -> Result<(), Error> {
        self.base.grid.put(id, [x, y, z], r)?;
        if r > self.max_radius {
            self.max_radius = r;
        }
        Ok(())
    }

    /// Stores a particle and records it in the insertion-order sidecar.
    pub fn put_ordered(
        &mut self,
        order: &mut ParticleOrder,
        id: i32,
        x: f64,
        y: f64,
        z: f64,
        r: f64,
    ) -> Result<(), Error> {
        let loc = self.base.grid.put(id, [x, y, z], r)?;
        if r > self.max_radius {
            self.max_radius = r;
        }
        order.entries.push(loc);
        Ok(())
    }

    /// Imports whitespace-separated `id x y z r` records, one per line.
    /// Blank lines are skipped; the first malformed line aborts the import
    /// with [`Error::Parse`]. Returns the number of particles read.
    pub fn import<R: BufRead>(&mut self, reader: R) -> Result<usize, Error> {
        let mut count = 0;
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (id, x, y, z, r) = parse_poly(&line).ok_or(Error::Parse { line: n + 1 })?;
            self.put(id, x, y, z, r)?;
            count += 1;
        }
        Ok(count)
    }

    /// [`import`](Self::import) that also fills an insertion-order sidecar.
    pub fn import_ordered<R: BufRead>(
        &mut self,
        order: &mut ParticleOrder,
        reader: R,
    ) -> Result<usize, Error> {
        let mut count = 0;
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (id, x, y, z, r) = parse_poly(&line).ok_or(Error::Parse { line: n + 1 })?;
            self.put_ordered(order, id, x, y, z, r)?;
            count += 1;
        }
        Ok(count)
    }

    /// Computes the radical cell of the particle at `(block, slot)` into
    /// `cell`. Returns `false` when walls or neighbors leave no cell.
    pub fn compute_cell(&self, cell: &mut VoronoiCell, block: usize, slot: usize) -> bool {
        if !self.base.initialize_cell(cell, block, slot) {
            return false;
        }
        let scale = PolyRadius {
            grid: &self.base.grid,
            max_radius: self.max_radius,
        };
        compute::compute_cell(&self.base.grid, &scale, cell, block, slot)
    }

    /// Computes every cell once, discarding the meshes. Returns the number
    /// of particles that still own a cell.
    pub fn compute_all_cells(&self) -> usize {
        let locs: Vec<(usize, usize)> = self.particles().map(|p| (p.block, p.slot)).collect();
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            locs.par_iter()
                .map_init(VoronoiCell::new, |cell, &(b, s)| {
                    usize::from(self.compute_cell(cell, b, s))
                })
                .sum()
        }
        #[cfg(not(feature = "parallel"))]
        {
            let mut cell = VoronoiCell::new();
            locs.iter()
                .filter(|&&(b, s)| self.compute_cell(&mut cell, b, s))
                .count()
        }
    }

    /// Sum of all cell volumes.
    pub fn sum_cell_volumes(&self) -> f64 {
        let locs: Vec<(usize, usize)> = self.particles().map(|p| (p.block, p.slot)).collect();
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            locs.par_iter()
                .map_init(VoronoiCell::new, |cell, &(b, s)| {
                    if self.compute_cell(cell, b, s) {
                        cell.volume()
                    } else {
                        0.0
                    }
                })
                .sum()
        }
        #[cfg(not(feature = "parallel"))]
        {
            let mut cell = VoronoiCell::new();
            locs.iter()
                .map(|&(b, s)| {
                    if self.compute_cell(&mut cell, b, s) {
                        cell.volume()
                    } else {
                        0.0
                    }
                })
                .sum()
        }
    }

}

fn parse_plain(line: &str) -> Option<(i32, f64, f64, f64)> {
    let mut it = line.split_whitespace();
    let id = it.next()?.parse().ok()?;
    let x = it.next()?.parse().ok()?;
    let y = it.next()?.parse().ok()?;
    let z = it.next()?.parse().ok()?;
    if it.next().is_some() {
        return None;
    }
    Some((id, x, y, z))
}

fn parse_poly(line: &str) -> Option<(i32, f64, f64, f64, f64)> {
    let mut it = line.split_whitespace();
    let id = it.next()?.parse().ok()?;
    let x = it.next()?.parse().ok()?;
    let y = it.next()?.parse().ok()?;
    let z = it.next()?.parse().ok()?;
    let r = it.next()?.parse().ok()?;
    if it.next().is_some() {
        return None;
    }
    Some((id, x, y, z, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_traverse() {
        let mut con = Container::new(
            BoundingBox::new([0.0; 3], [10.0; 3]),
            [5, 5, 5],
            [false; 3],
        );
        con.put(7, 1.0, 1.0, 1.0).expect("put");
        con.put(8, 9.0, 9.0, 9.0).expect("put");
        assert_eq!(con.total_particles(), 2);
        let ids: Vec<i32> = con.particles().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 8]);
        con.clear();
        assert_eq!(con.total_particles(), 0);
    }

    #[test]
    fn ordered_traversal_follows_insertion() {
        let mut con = Container::new(
            BoundingBox::new([0.0; 3], [10.0; 3]),
            [5, 5, 5],
            [false; 3],
        );
        let mut order = ParticleOrder::new();
        // grid-scan order would yield 2, 1, 0
        con.put_ordered(&mut order, 0, 9.0, 9.0, 9.0).expect("put");
        con.put_ordered(&mut order, 1, 5.0, 5.0, 5.0).expect("put");
        con.put_ordered(&mut order, 2, 1.0, 1.0, 1.0).expect("put");
        let ids: Vec<i32> = con.particles_ordered(&order).map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn subset_traversal_filters() {
        let mut con = Container::new(
            BoundingBox::new([0.0; 3], [10.0; 3]),
            [5, 5, 5],
            [false; 3],
        );
        for i in 0..10 {
            con.put(i, i as f64 + 0.5, 5.0, 5.0).expect("put");
        }
        let picked: Vec<i32> = con
            .particles_in([2.0, 0.0, 0.0], [6.0, 10.0, 10.0])
            .map(|p| p.id)
            .collect();
        assert_eq!(picked, vec![2, 3, 4, 5]);
    }

    #[test]
    fn single_particle_owns_the_whole_box() {
        let mut con = Container::new(
            BoundingBox::new([0.0; 3], [1.0; 3]),
            [5, 5, 5],
            [false; 3],
        );
        con.put(0, 0.5, 0.5, 0.5).expect("put");
        let mut cell = VoronoiCell::new();
        let p = con.particles().next().expect("particle");
        assert!(con.compute_cell(&mut cell, p.block, p.slot));
        assert!((cell.volume() - 1.0).abs() < 1e-12);
        assert_eq!(cell.number_of_faces(), 6);
        for a in cell.face_areas() {
            assert!((a - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn two_particles_split_the_box() {
        let mut con = Container::new(
            BoundingBox::new([0.0; 3], [1.0; 3]),
            [5, 5, 5],
            [false; 3],
        );
        con.put(0, 0.25, 0.5, 0.5).expect("put");
        con.put(1, 0.75, 0.5, 0.5).expect("put");
        let mut cell = VoronoiCell::new_tracking();
        for p in con.particles() {
            assert!(con.compute_cell(&mut cell, p.block, p.slot));
            assert!((cell.volume() - 0.5).abs() < 1e-10);
            assert_eq!(cell.number_of_faces(), 6);
            let other = 1 - p.id;
            assert!(cell.neighbors().contains(&other));
        }
    }

    #[test]
    fn import_rejects_malformed_lines() {
        let mut con = Container::new(
            BoundingBox::new([0.0; 3], [1.0; 3]),
            [2, 2, 2],
            [false; 3],
        );
        let data = "0 0.2 0.2 0.2\n1 0.8 oops 0.8\n";
        match con.import(data.as_bytes()) {
            Err(Error::Parse { line }) => assert_eq!(line, 2),
            other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
        }
    }
}
