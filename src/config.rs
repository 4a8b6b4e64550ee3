//! Compile-time defaults and the reserved face-id ranges.

/// Half-width of the on-plane classification band used when cutting a cell,
/// for a container with a unit-length diagonal. Containers scale this by the
/// squared diagonal so that classification keeps roughly eleven significant
/// digits regardless of the box dimensions.
pub const DEFAULT_TOLERANCE: f64 = 1e-11;

/// Initial per-box particle capacity reserved at container construction.
pub const DEFAULT_INIT_MEMORY: usize = 8;

/// Ceiling on the number of particles a single computational box may hold.
/// Growing past it indicates a sizing mistake and is reported as
/// [`Error::MemoryCeiling`](crate::Error::MemoryCeiling).
pub const MAX_PARTICLE_MEMORY: usize = 16_777_216;

/// Face id for the x = min wall of the bounding box, negative to prevent
/// conflicts with particle ids.
pub const BOX_ID_XMIN: i32 = -1;
/// Face id for the x = max wall of the bounding box.
pub const BOX_ID_XMAX: i32 = -2;
/// Face id for the y = min wall of the bounding box.
pub const BOX_ID_YMIN: i32 = -3;
/// Face id for the y = max wall of the bounding box.
pub const BOX_ID_YMAX: i32 = -4;
/// Face id for the z = min wall of the bounding box.
pub const BOX_ID_ZMIN: i32 = -5;
/// Face id for the z = max wall of the bounding box.
pub const BOX_ID_ZMAX: i32 = -6;

/// User wall ids must be less than or equal to this value, keeping them
/// clear of the six box-wall ids above.
pub const WALL_ID_START: i32 = -10;
