//! # voroxide
//!
//! `voroxide` computes three-dimensional Voronoi tessellations of point
//! sets inside a rectangular box, cell by cell. It supports periodic
//! boundaries along any subset of axes, per-particle radii (the radical /
//! power diagram variant) and clipping against user-defined walls, and can
//! be used natively or compiled to WebAssembly.
//!
//! ## Features
//!
//! - **Cell-based**: each cell is carved independently by incremental
//!   half-space clipping of a convex polyhedron, driven by a
//!   distance-ordered neighbor search that stops as soon as no remaining
//!   particle can matter.
//! - **Spatial partitioning**: particles live in a uniform grid of
//!   computational boxes with a precomputed radius-ordered search table.
//! - **Periodic and radical variants**: per-axis periodicity and weighted
//!   (power) bisectors with a search bound that stays complete.
//! - **Custom walls**: plane, sphere, cylinder and cone walls, or any type
//!   implementing [`Wall`].
//! - **Neighbor tracking**: cells can record which particle or wall
//!   produced each face.
//!
//! ## Example
//!
//! ```
//! use voroxide::{BoundingBox, Container, VoronoiCell};
//!
//! let mut con = Container::new(
//!     BoundingBox::new([0.0; 3], [1.0; 3]),
//!     [4, 4, 4],
//!     [false, false, false],
//! );
//! con.put(0, 0.25, 0.5, 0.5).unwrap();
//! con.put(1, 0.75, 0.5, 0.5).unwrap();
//!
//! let mut cell = VoronoiCell::new_tracking();
//! for p in con.particles() {
//!     if con.compute_cell(&mut cell, p.block, p.slot) {
//!         assert!((cell.volume() - 0.5).abs() < 1e-9);
//!     }
//! }
//! ```
//!
//! ## Main interface
//!
//! [`Container`] (plain) and [`ContainerPoly`] (radical) own the particles
//! and walls; [`VoronoiCell`] is the polyhedral cell mesh they carve.

mod bounds;
mod cell;
mod compute;
mod config;
mod container;
mod draw;
mod error;
mod grid;
mod loops;
mod wall;
pub mod wasm;

pub use bounds::BoundingBox;
pub use cell::VoronoiCell;
pub use config::{
    BOX_ID_XMAX, BOX_ID_XMIN, BOX_ID_YMAX, BOX_ID_YMIN, BOX_ID_ZMAX, BOX_ID_ZMIN,
    DEFAULT_INIT_MEMORY, DEFAULT_TOLERANCE, MAX_PARTICLE_MEMORY, WALL_ID_START,
};
pub use container::{Container, ContainerPoly};
pub use error::Error;
pub use loops::{OrderedIter, Particle, ParticleIter, ParticleOrder, SubsetIter};
pub use wall::{ConeWall, CylinderWall, Plane, PlaneWall, SphereWall, Wall, WallList};
