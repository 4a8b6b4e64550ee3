use crate::cell::VoronoiCell;
use crate::config::WALL_ID_START;

/// A cutting half-space in a particle's local frame: points with
/// `<normal, v> <= dist` are kept. The normal points out of the retained
/// region and need not be normalized as long as `dist` uses the same scale.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: [f64; 3],
    pub dist: f64,
}

/// A container wall.
///
/// A wall constrains cells in two ways: it rejects particles outside the
/// allowed region (`point_inside`), and at cell initialization it supplies
/// the half-space that approximates the wall surface as seen from the
/// cell's particle (`cut`). Returning the plane rather than mutating a
/// concrete cell type keeps the cell flavor out of the wall interface: the
/// wall list applies the plane to whichever cell it is given.
pub trait Wall: Send + Sync {
    /// Identifier recorded on faces this wall creates. Must be at most
    /// [`WALL_ID_START`] so it cannot collide with particle ids or the box
    /// face ids.
    fn id(&self) -> i32;

    /// Whether a point lies in the region the wall allows.
    fn point_inside(&self, x: f64, y: f64, z: f64) -> bool;

    /// The clipping half-space for a cell whose particle sits at `source`,
    /// or `None` when the wall cannot constrain it (for example the
    /// particle lies on the wall's axis of symmetry).
    fn cut(&self, source: [f64; 3]) -> Option<Plane>;
}

/// The ordered walls of a container, applied once at cell initialization.
#[derive(Default)]
pub struct WallList {
    walls: Vec<Box<dyn Wall>>,
}

impl WallList {
    pub fn new() -> WallList {
        WallList { walls: Vec::new() }
    }

    pub fn add(&mut self, wall: Box<dyn Wall>) {
        self.walls.push(wall);
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    /// Conjunction of every wall's `point_inside`.
    pub fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
        self.walls.iter().all(|w| w.point_inside(x, y, z))
    }

    /// Applies each wall's cut in order, short-circuiting when the cell is
    /// annihilated.
    pub fn apply(&self, cell: &mut VoronoiCell, source: [f64; 3]) -> bool {
        for w in &self.walls {
            if let Some(p) = w.cut(source) {
                if !cell.cut(p.normal, p.dist, w.id()) {
                    return false;
                }
            }
        }
        true
    }
}

fn normalize_or_z(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        [0.0, 0.0, 1.0]
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

fn assert_wall_id(id: i32) {
    assert!(id <= WALL_ID_START, "wall id must be <= {}", WALL_ID_START);
}

/// Half-space wall: keeps the side of the plane `<normal, x> <= displacement`.
#[derive(Debug)]
pub struct PlaneWall {
    normal: [f64; 3],
    displacement: f64,
    id: i32,
}

impl PlaneWall {
    pub fn new(normal: [f64; 3], displacement: f64, id: i32) -> PlaneWall {
        assert_wall_id(id);
        PlaneWall {
            normal,
            displacement,
            id,
        }
    }

    /// A plane through `point`; the normal points out of the kept region.
    pub fn from_point(point: [f64; 3], normal: [f64; 3], id: i32) -> PlaneWall {
        let d = normal[0] * point[0] + normal[1] * point[1] + normal[2] * point[2];
        PlaneWall::new(normal, d, id)
    }
}

impl Wall for PlaneWall {
    fn id(&self) -> i32 {
        self.id
    }

    fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
        self.normal[0] * x + self.normal[1] * y + self.normal[2] * z <= self.displacement
    }

    fn cut(&self, source: [f64; 3]) -> Option<Plane> {
        let dn = self.normal[0] * source[0] + self.normal[1] * source[1] + self.normal[2] * source[2];
        Some(Plane {
            normal: self.normal,
            dist: self.displacement - dn,
        })
    }
}

/// Spherical wall: keeps the inside of the sphere.
#[derive(Debug)]
pub struct SphereWall {
    center: [f64; 3],
    radius: f64,
    id: i32,
}

impl SphereWall {
    pub fn new(center: [f64; 3], radius: f64, id: i32) -> SphereWall {
        assert_wall_id(id);
        SphereWall { center, radius, id }
    }
}

impl Wall for SphereWall {
    fn id(&self) -> i32 {
        self.id
    }

    fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
        let dx = x - self.center[0];
        let dy = y - self.center[1];
        let dz = z - self.center[2];
        dx * dx + dy * dy + dz * dz <= self.radius * self.radius
    }

    fn cut(&self, source: [f64; 3]) -> Option<Plane> {
        let xd = source[0] - self.center[0];
        let yd = source[1] - self.center[1];
        let zd = source[2] - self.center[2];
        let dq = xd * xd + yd * yd + zd * zd;
        if dq < 1e-10 {
            // the particle sits at the center; no tangent plane is defined
            return None;
        }
        // tangent plane at the nearest surface point, with the radial
        // direction left unnormalized: <(xd,yd,zd), v> <= d·R - d²
        Some(Plane {
            normal: [xd, yd, zd],
            dist: dq.sqrt() * self.radius - dq,
        })
    }
}

/// Cylindrical wall: keeps the inside of an infinite cylinder.
#[derive(Debug)]
pub struct CylinderWall {
    point: [f64; 3],
    axis: [f64; 3],
    radius: f64,
    id: i32,
}

impl CylinderWall {
    pub fn new(point: [f64; 3], axis: [f64; 3], radius: f64, id: i32) -> CylinderWall {
        assert_wall_id(id);
        CylinderWall {
            point,
            axis: normalize_or_z(axis),
            radius,
            id,
        }
    }

    fn radial(&self, p: [f64; 3]) -> [f64; 3] {
        let d = [
            p[0] - self.point[0],
            p[1] - self.point[1],
            p[2] - self.point[2],
        ];
        let pa = d[0] * self.axis[0] + d[1] * self.axis[1] + d[2] * self.axis[2];
        [
            d[0] - pa * self.axis[0],
            d[1] - pa * self.axis[1],
            d[2] - pa * self.axis[2],
        ]
    }
}

impl Wall for CylinderWall {
    fn id(&self) -> i32 {
        self.id
    }

    fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
        let r = self.radial([x, y, z]);
        r[0] * r[0] + r[1] * r[1] + r[2] * r[2] <= self.radius * self.radius
    }

    fn cut(&self, source: [f64; 3]) -> Option<Plane> {
        let r = self.radial(source);
        let rq = r[0] * r[0] + r[1] * r[1] + r[2] * r[2];
        if rq < 1e-10 {
            return None;
        }
        Some(Plane {
            normal: r,
            dist: rq.sqrt() * self.radius - rq,
        })
    }
}

/// Conical wall: keeps the inside of an infinite open cone.
#[derive(Debug)]
pub struct ConeWall {
    apex: [f64; 3],
    axis: [f64; 3],
    sin_ang: f64,
    cos_ang: f64,
    id: i32,
}

impl ConeWall {
    /// `half_angle` is the opening half-angle in radians, measured from the
    /// axis.
    pub fn new(apex: [f64; 3], axis: [f64; 3], half_angle: f64, id: i32) -> ConeWall {
        assert_wall_id(id);
        ConeWall {
            apex,
            axis: normalize_or_z(axis),
            sin_ang: half_angle.sin(),
            cos_ang: half_angle.cos(),
            id,
        }
    }
}

impl Wall for ConeWall {
    fn id(&self) -> i32 {
        self.id
    }

    fn point_inside(&self, x: f64, y: f64, z: f64) -> bool {
        let d = [x - self.apex[0], y - self.apex[1], z - self.apex[2]];
        let pa = d[0] * self.axis[0] + d[1] * self.axis[1] + d[2] * self.axis[2];
        if pa < 0.0 {
            return false;
        }
        let rq = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2] - pa * pa).max(0.0);
        rq.sqrt() * self.cos_ang <= pa * self.sin_ang
    }

    fn cut(&self, source: [f64; 3]) -> Option<Plane> {
        let d = [
            source[0] - self.apex[0],
            source[1] - self.apex[1],
            source[2] - self.apex[2],
        ];
        let pa = d[0] * self.axis[0] + d[1] * self.axis[1] + d[2] * self.axis[2];
        let rq = d[0] * d[0] + d[1] * d[1] + d[2] * d[2] - pa * pa;
        if rq < 1e-10 {
            // on the axis the tangent direction is undefined
            return None;
        }
        let rr = rq.sqrt();
        // unit radial direction in the plane spanned by the axis and the
        // particle, then the outward surface normal of the cone
        let u = [
            (d[0] - pa * self.axis[0]) / rr,
            (d[1] - pa * self.axis[1]) / rr,
            (d[2] - pa * self.axis[2]) / rr,
        ];
        let n = [
            self.cos_ang * u[0] - self.sin_ang * self.axis[0],
            self.cos_ang * u[1] - self.sin_ang * self.axis[1],
            self.cos_ang * u[2] - self.sin_ang * self.axis[2],
        ];
        Some(Plane {
            normal: n,
            dist: pa * self.sin_ang - rr * self.cos_ang,
        })
    }
}
