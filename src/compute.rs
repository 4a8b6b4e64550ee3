use crate::cell::VoronoiCell;
use crate::grid::ParticleGrid;

/// Distance scaling hooks that differentiate the plain Voronoi search from
/// the radical (power diagram) one.
///
/// `r_cutoff` rescales a squared distance before it is compared against the
/// search bound, and `r_scale` turns the squared distance to a candidate
/// into the cut value of its bisecting plane. The plain implementation is
/// the identity on both; the radical implementation folds in the squared
/// radii so that the weighted bisector is used and the worklist cutoff
/// remains complete.
pub(crate) trait RadiusScale {
    type State: Copy;

    /// Captures the per-source state (the source radius terms) before a
    /// cell computation starts.
    fn r_init(&self, ijk: usize, q: usize) -> Self::State;

    /// Scales a squared distance for comparison against the search bound.
    fn r_cutoff(&self, state: &Self::State, lrs: f64) -> f64;

    /// The effective cut value for a candidate at squared distance `lrs`.
    fn r_scale(&self, state: &Self::State, lrs: f64, ijk: usize, q: usize) -> f64;
}

/// Unweighted distance: every particle carries the same influence.
pub(crate) struct MonoRadius;

impl RadiusScale for MonoRadius {
    type State = ();

    fn r_init(&self, _ijk: usize, _q: usize) -> Self::State {}

    fn r_cutoff(&self, _state: &Self::State, lrs: f64) -> f64 {
        lrs
    }

    fn r_scale(&self, _state: &Self::State, lrs: f64, _ijk: usize, _q: usize) -> f64 {
        lrs
    }
}

/// Radical (power diagram) distance over per-particle radii.
pub(crate) struct PolyRadius<'a> {
    pub grid: &'a ParticleGrid,
    pub max_radius: f64,
}

#[derive(Clone, Copy)]
pub(crate) struct PolyState {
    r_rad: f64,
    r_mul: f64,
}

impl RadiusScale for PolyRadius<'_> {
    type State = PolyState;

    fn r_init(&self, ijk: usize, q: usize) -> PolyState {
        let r = self.grid.radius(ijk, q);
        let m = self.max_radius;
        let denom = (m + r) * (m + r);
        PolyState {
            r_rad: r * r,
            r_mul: if denom > 0.0 {
                1.0 + (r * r - m * m) / denom
            } else {
                1.0
            },
        }
    }

    fn r_cutoff(&self, state: &PolyState, lrs: f64) -> f64 {
        state.r_mul * lrs
    }

    fn r_scale(&self, state: &PolyState, lrs: f64, ijk: usize, q: usize) -> f64 {
        let rt = self.grid.radius(ijk, q);
        lrs + state.r_rad - rt * rt
    }
}

/// Computes the cell of the particle in box `ijk`, slot `q`, into `cell`,
/// which must already hold the wall-clipped container extent.
///
/// The driver walks the radius-ordered worklist; a neighbor at squared
/// distance `lrs` can only alter the cell if `lrs < 4·R` where `R` is the
/// largest squared vertex distance, so once a worklist entry's scaled
/// lower bound passes that threshold nothing farther matters and the
/// computation stops. Returns `false` when a cut annihilates the cell.
pub(crate) fn compute_cell<S: RadiusScale>(
    grid: &ParticleGrid,
    scale: &S,
    cell: &mut VoronoiCell,
    ijk: usize,
    q: usize,
) -> bool {
    let c = grid.block_coords(ijk);
    let source = grid.position(ijk, q);
    let state = scale.r_init(ijk, q);
    let mut mrs = cell.max_radius_squared();

    for &(di, dj, dk, min_d2) in &grid.block_order {
        if scale.r_cutoff(&state, min_d2) > 4.0 * mrs {
            break;
        }
        let (jjk, qd) = match grid.region_index(c, (di, dj, dk)) {
            Some(r) => r,
            None => continue,
        };
        let home = di == 0 && dj == 0 && dk == 0;
        for s in 0..grid.count(jjk) {
            if home && s == q {
                continue;
            }
            let p = grid.position(jjk, s);
            let x = p[0] + qd[0] - source[0];
            let y = p[1] + qd[1] - source[1];
            let z = p[2] + qd[2] - source[2];
            let lrs = x * x + y * y + z * z;
            if scale.r_cutoff(&state, lrs) > 4.0 * mrs {
                continue;
            }
            let rs = scale.r_scale(&state, lrs, jjk, s);
            if !cell.cut([x, y, z], 0.5 * rs, grid.id(jjk, s)) {
                return false;
            }
            mrs = cell.max_radius_squared();
        }
    }
    true
}
