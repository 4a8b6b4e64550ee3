use crate::config::{
    BOX_ID_XMAX, BOX_ID_XMIN, BOX_ID_YMAX, BOX_ID_YMIN, BOX_ID_ZMAX, BOX_ID_ZMIN,
    DEFAULT_TOLERANCE,
};

const NONE: u32 = u32::MAX;

/// Classification of a vertex against a cutting plane.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    In,
    On,
    Out,
}

/// Reusable buffers for the plane-cut routine. A cell owns its scratch
/// since it is never shared between compute requests.
#[derive(Default, Clone)]
struct CutScratch {
    // classification
    q: Vec<f64>,
    side: Vec<Side>,
    // enumeration of the faces of the current mesh
    offs: Vec<u32>,
    edge_face: Vec<u32>,
    face_start: Vec<u32>,
    face_len: Vec<u32>,
    face_id: Vec<i32>,
    face_verts: Vec<u32>,
    // the clipped vertex table
    new_pts: Vec<f64>,
    on_plane: Vec<bool>,
    old_to_new: Vec<u32>,
    cut_map: Vec<(u32, u32, u32)>,
    // clipped faces plus the freshly cut one
    nf_len: Vec<u32>,
    nf_id: Vec<i32>,
    nf_verts: Vec<u32>,
    cycle: Vec<u32>,
    lid: Vec<(u32, u32)>,
    // adjacency reconstruction
    out_edges: Vec<Vec<(u32, u32)>>,
    remap: Vec<u32>,
    final_to_old: Vec<u32>,
    ord_to: Vec<u32>,
    ord_face: Vec<u32>,
    ord_start: Vec<u32>,
}

/// The convex polyhedron of one Voronoi cell under construction.
///
/// Vertices are stored in the local frame of the source particle, so a cut
/// by a neighbor at relative offset `(x, y, z)` is the half-space
/// `<n, v> <= (x² + y² + z²) / 2` with `n = (x, y, z)`.
///
/// Vertex `i` of degree `d` owns an adjacency table `ed[i]` of length
/// `2·d + 1`: its neighboring vertex indices, then for each edge the slot
/// in the neighbor that points back to `i`, then the vertex's own index.
/// At rest the table describes a closed convex surface;
/// [`check_relations`](Self::check_relations) audits the pairing and the
/// Euler characteristic.
///
/// The neighbor-tracking flavor additionally records, per outgoing edge,
/// the id of the face to its left, so each face of the finished cell
/// remembers which particle (or wall) created it. Both flavors share one
/// cut code path; the sidecar is gated by a construction-time flag.
#[derive(Clone)]
pub struct VoronoiCell {
    pts: Vec<f64>,
    nu: Vec<usize>,
    ed: Vec<Vec<u32>>,
    ne: Vec<Vec<i32>>,
    tracking: bool,
    tolerance: f64,
    scratch: CutScratch,
}

impl Default for VoronoiCell {
    fn default() -> Self {
        Self::new()
    }
}

impl VoronoiCell {
    /// Creates an empty plain cell. Call [`init`](Self::init) before cutting.
    pub fn new() -> VoronoiCell {
        VoronoiCell {
            pts: Vec::new(),
            nu: Vec::new(),
            ed: Vec::new(),
            ne: Vec::new(),
            tracking: false,
            tolerance: DEFAULT_TOLERANCE,
            scratch: CutScratch::default(),
        }
    }

    /// Creates an empty neighbor-tracking cell.
    pub fn new_tracking() -> VoronoiCell {
        let mut c = VoronoiCell::new();
        c.tracking = true;
        c
    }

    /// Whether this cell records the id of the plane behind each face.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Sets the half-width of the on-plane classification band. Containers
    /// scale the default by their squared diagonal before handing cells out.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    /// Resets the mesh to the axis-aligned box `[x1,x2]×[y1,y2]×[z1,z2]`:
    /// eight vertices of degree three with the canonical edge pairing.
    pub fn init(&mut self, x1: f64, x2: f64, y1: f64, y2: f64, z1: f64, z2: f64) {
        self.pts.clear();
        self.pts.extend_from_slice(&[
            x1, y1, z1, // 0
            x2, y1, z1, // 1
            x1, y2, z1, // 2
            x2, y2, z1, // 3
            x1, y1, z2, // 4
            x2, y1, z2, // 5
            x1, y2, z2, // 6
            x2, y2, z2, // 7
        ]);
        self.nu.clear();
        self.nu.resize(8, 3);
        self.ed.clear();
        for (v, row) in [
            [1u32, 4, 2, 2, 1, 0],
            [3, 5, 0, 2, 1, 0],
            [0, 6, 3, 2, 1, 0],
            [2, 7, 1, 2, 1, 0],
            [6, 0, 5, 2, 1, 0],
            [4, 1, 7, 2, 1, 0],
            [7, 2, 4, 2, 1, 0],
            [5, 3, 6, 2, 1, 0],
        ]
        .iter()
        .enumerate()
        {
            let mut e = Vec::with_capacity(7);
            e.extend_from_slice(row);
            e.push(v as u32);
            self.ed.push(e);
        }
        self.ne.clear();
        if self.tracking {
            for ids in [
                [BOX_ID_ZMIN, BOX_ID_YMIN, BOX_ID_XMIN],
                [BOX_ID_ZMIN, BOX_ID_XMAX, BOX_ID_YMIN],
                [BOX_ID_ZMIN, BOX_ID_XMIN, BOX_ID_YMAX],
                [BOX_ID_ZMIN, BOX_ID_YMAX, BOX_ID_XMAX],
                [BOX_ID_ZMAX, BOX_ID_XMIN, BOX_ID_YMIN],
                [BOX_ID_ZMAX, BOX_ID_YMIN, BOX_ID_XMAX],
                [BOX_ID_ZMAX, BOX_ID_YMAX, BOX_ID_XMIN],
                [BOX_ID_ZMAX, BOX_ID_XMAX, BOX_ID_YMAX],
            ] {
                self.ne.push(ids.to_vec());
            }
        }
    }

    /// True once the cell has been annihilated (or never initialized).
    pub fn is_empty(&self) -> bool {
        self.nu.is_empty()
    }

    /// Number of vertices of the current mesh.
    pub fn number_of_vertices(&self) -> usize {
        self.nu.len()
    }

    /// Number of edges of the current mesh.
    pub fn number_of_edges(&self) -> usize {
        self.nu.iter().sum::<usize>() / 2
    }

    /// Number of faces of the current mesh.
    pub fn number_of_faces(&self) -> usize {
        let mut n = 0;
        self.for_each_face(|_, _| n += 1);
        n
    }

    fn wipe(&mut self) {
        self.pts.clear();
        self.nu.clear();
        self.ed.clear();
        self.ne.clear();
    }

    /// Clips the cell by the half-space `<normal, v> <= dist`, tagging the
    /// new face with `face_id` in the tracking flavor.
    ///
    /// Returns `false` when the cut removes the whole cell; the mesh is
    /// then empty. Vertices within the tolerance band of the plane are
    /// treated as on-plane and retained, so a tie never cuts.
    pub fn cut(&mut self, normal: [f64; 3], dist: f64, face_id: i32) -> bool {
        if self.nu.is_empty() {
            return false;
        }
        let mut s = std::mem::take(&mut self.scratch);
        let survived = self.cut_inner(&mut s, normal, dist, face_id);
        self.scratch = s;
        debug_assert!(!survived || self.check_relations());
        survived
    }

    /// Clips by the perpendicular bisector of the segment from the cell's
    /// particle to a neighbor at relative offset `(x, y, z)`.
    pub fn cut_bisector(&mut self, x: f64, y: f64, z: f64, face_id: i32) -> bool {
        let rsq = x * x + y * y + z * z;
        self.cut([x, y, z], 0.5 * rsq, face_id)
    }

    fn cut_inner(&mut self, s: &mut CutScratch, normal: [f64; 3], r: f64, face_id: i32) -> bool {
        let nv = self.nu.len();
        let [nx, ny, nz] = normal;

        // 1. Classify every vertex against the plane.
        s.q.clear();
        s.side.clear();
        let mut any_in = false;
        let mut any_out = false;
        for i in 0..nv {
            let qv = nx * self.pts[3 * i] + ny * self.pts[3 * i + 1] + nz * self.pts[3 * i + 2] - r;
            s.q.push(qv);
            s.side.push(if qv > self.tolerance {
                any_out = true;
                Side::Out
            } else if qv < -self.tolerance {
                any_in = true;
                Side::In
            } else {
                Side::On
            });
        }
        if !any_out {
            return true;
        }
        if !any_in {
            self.wipe();
            return false;
        }

        // 2. Enumerate the faces of the current mesh. Each directed edge
        // (i, slot) is assigned the index of the face to its left; cycles
        // are traced through the edge pairing.
        let mut acc = 0u32;
        s.offs.clear();
        for i in 0..nv {
            s.offs.push(acc);
            acc += self.nu[i] as u32;
        }
        let half_edges = acc as usize;
        s.edge_face.clear();
        s.edge_face.resize(half_edges, NONE);
        s.face_start.clear();
        s.face_len.clear();
        s.face_id.clear();
        s.face_verts.clear();
        for i in 0..nv {
            for j in 0..self.nu[i] {
                if s.edge_face[s.offs[i] as usize + j] != NONE {
                    continue;
                }
                let f = s.face_len.len() as u32;
                let start = s.face_verts.len() as u32;
                let fid = if self.tracking { self.ne[i][j] } else { 0 };
                let mut cv = i;
                let mut cs = j;
                let mut guard = half_edges + 1;
                loop {
                    guard -= 1;
                    if guard == 0 {
                        self.wipe();
                        return false;
                    }
                    s.edge_face[s.offs[cv] as usize + cs] = f;
                    s.face_verts.push(cv as u32);
                    let w = self.ed[cv][cs] as usize;
                    let back = self.ed[cv][self.nu[cv] + cs] as usize;
                    cv = w;
                    cs = if back + 1 == self.nu[w] { 0 } else { back + 1 };
                    if cv == i && cs == j {
                        break;
                    }
                }
                s.face_start.push(start);
                s.face_len.push(s.face_verts.len() as u32 - start);
                s.face_id.push(fid);
            }
        }

        // 3. Keep every retained vertex, in order, then clip each face
        // cycle. A crossed edge gets one interpolated vertex shared by the
        // two faces that border it; an on-plane vertex is reused as-is.
        s.new_pts.clear();
        s.on_plane.clear();
        s.old_to_new.clear();
        s.old_to_new.resize(nv, NONE);
        for i in 0..nv {
            if s.side[i] != Side::Out {
                s.old_to_new[i] = (s.new_pts.len() / 3) as u32;
                s.new_pts.extend_from_slice(&self.pts[3 * i..3 * i + 3]);
                s.on_plane.push(s.side[i] == Side::On);
            }
        }

        s.cut_map.clear();
        s.nf_len.clear();
        s.nf_id.clear();
        s.nf_verts.clear();
        s.lid.clear();
        for f in 0..s.face_len.len() {
            let start = s.face_start[f] as usize;
            let m = s.face_len[f] as usize;
            s.cycle.clear();
            for t in 0..m {
                let a = s.face_verts[start + t] as usize;
                let b = s.face_verts[start + (t + 1) % m] as usize;
                if s.side[a] != Side::Out {
                    s.cycle.push(s.old_to_new[a]);
                }
                if (s.side[a] == Side::Out) != (s.side[b] == Side::Out) {
                    let (keep, lose) = if s.side[a] == Side::Out { (b, a) } else { (a, b) };
                    if s.side[keep] == Side::On {
                        // the crossing coincides with the retained endpoint
                        continue;
                    }
                    let key = if a < b {
                        (a as u32, b as u32)
                    } else {
                        (b as u32, a as u32)
                    };
                    let known = s
                        .cut_map
                        .iter()
                        .find(|&&(u, v, _)| (u, v) == key)
                        .map(|&(_, _, idx)| idx);
                    let idx = match known {
                        Some(idx) => idx,
                        None => {
                            let frac = (s.q[keep] / (s.q[keep] - s.q[lose])).clamp(0.0, 1.0);
                            let idx = (s.new_pts.len() / 3) as u32;
                            for c in 0..3 {
                                let pa = self.pts[3 * keep + c];
                                let pb = self.pts[3 * lose + c];
                                s.new_pts.push(pa + frac * (pb - pa));
                            }
                            s.on_plane.push(true);
                            s.cut_map.push((key.0, key.1, idx));
                            idx
                        }
                    };
                    s.cycle.push(idx);
                }
            }
            if s.cycle.len() >= 3 {
                for t in 0..s.cycle.len() {
                    let u = s.cycle[t];
                    let v = s.cycle[(t + 1) % s.cycle.len()];
                    if s.on_plane[u as usize] && s.on_plane[v as usize] {
                        // the new face runs opposite to the clipped one
                        s.lid.push((v, u));
                    }
                }
                s.nf_len.push(s.cycle.len() as u32);
                s.nf_id.push(s.face_id[f]);
                s.nf_verts.extend_from_slice(&s.cycle);
            }
        }

        // 4. Stitch the boundary segments into the new face.
        if !s.lid.is_empty() {
            s.cycle.clear();
            let (first, mut cur) = s.lid[0];
            s.cycle.push(first);
            let mut guard = s.lid.len();
            while cur != first && guard > 0 {
                s.cycle.push(cur);
                match s.lid.iter().find(|&&(u, _)| u == cur) {
                    Some(&(_, next)) => cur = next,
                    None => break,
                }
                guard -= 1;
            }
            if cur != first {
                self.wipe();
                return false;
            }
            if s.cycle.len() >= 3 {
                s.nf_len.push(s.cycle.len() as u32);
                s.nf_id.push(face_id);
                s.nf_verts.extend_from_slice(&s.cycle);
            }
        }

        // 5. Rebuild the adjacency from the face cycles.
        let nv_new = s.new_pts.len() / 3;
        if s.out_edges.len() < nv_new {
            s.out_edges.resize(nv_new, Vec::new());
        }
        for e in s.out_edges.iter_mut().take(nv_new) {
            e.clear();
        }
        let mut base = 0usize;
        for (f, &len) in s.nf_len.iter().enumerate() {
            let len = len as usize;
            for t in 0..len {
                let u = s.nf_verts[base + t] as usize;
                let v = s.nf_verts[base + (t + 1) % len];
                s.out_edges[u].push((v, f as u32));
            }
            base += len;
        }

        // Collapse order-two vertices left behind by tangential cuts: such
        // a vertex sits in the middle of a straight edge and its neighbors
        // connect directly.
        let mut changed = true;
        while changed {
            changed = false;
            for v in 0..nv_new {
                if s.out_edges[v].len() != 2 {
                    continue;
                }
                let (a, _) = s.out_edges[v][0];
                let (b, _) = s.out_edges[v][1];
                if a == b {
                    self.wipe();
                    return false;
                }
                let vv = v as u32;
                for k in 0..s.out_edges[a as usize].len() {
                    if s.out_edges[a as usize][k].0 == vv {
                        s.out_edges[a as usize][k].0 = b;
                    }
                }
                for k in 0..s.out_edges[b as usize].len() {
                    if s.out_edges[b as usize][k].0 == vv {
                        s.out_edges[b as usize][k].0 = a;
                    }
                }
                s.out_edges[v].clear();
                changed = true;
            }
        }

        // Rotational ordering: around a vertex, the edge after v->w is the
        // one whose left face is the left face of the reverse edge w->v.
        s.remap.clear();
        s.remap.resize(nv_new, NONE);
        s.final_to_old.clear();
        s.ord_to.clear();
        s.ord_face.clear();
        s.ord_start.clear();
        self.pts.clear();
        self.nu.clear();
        for v in 0..nv_new {
            let d = s.out_edges[v].len();
            if d == 0 {
                continue;
            }
            if d < 3 {
                self.wipe();
                return false;
            }
            s.remap[v] = s.final_to_old.len() as u32;
            s.final_to_old.push(v as u32);
            s.ord_start.push(s.ord_to.len() as u32);
            self.pts.extend_from_slice(&s.new_pts[3 * v..3 * v + 3]);
            self.nu.push(d);

            let mut cur = 0usize;
            for _ in 0..d {
                let (w, f) = s.out_edges[v][cur];
                s.ord_to.push(w);
                s.ord_face.push(f);
                let mut back_face = NONE;
                for &(t, bf) in &s.out_edges[w as usize] {
                    if t == v as u32 {
                        back_face = bf;
                        break;
                    }
                }
                if back_face == NONE {
                    self.wipe();
                    return false;
                }
                let mut nxt = usize::MAX;
                for (k, &(_, kf)) in s.out_edges[v].iter().enumerate() {
                    if kf == back_face {
                        nxt = k;
                        break;
                    }
                }
                if nxt == usize::MAX {
                    self.wipe();
                    return false;
                }
                cur = nxt;
            }
            if cur != 0 {
                // the chain failed to close; the topology is beyond repair
                self.wipe();
                return false;
            }
        }
        s.ord_start.push(s.ord_to.len() as u32);

        let nfinal = s.final_to_old.len();
        self.ed.clear();
        self.ne.clear();
        for fv in 0..nfinal {
            let lo = s.ord_start[fv] as usize;
            let hi = s.ord_start[fv + 1] as usize;
            let d = hi - lo;
            let v_old = s.final_to_old[fv];
            let mut e = Vec::with_capacity(2 * d + 1);
            for t in lo..hi {
                e.push(s.remap[s.ord_to[t] as usize]);
            }
            for t in lo..hi {
                let wf = s.remap[s.ord_to[t] as usize] as usize;
                let wlo = s.ord_start[wf] as usize;
                let whi = s.ord_start[wf + 1] as usize;
                let mut slot = NONE;
                for (k, idx) in (wlo..whi).enumerate() {
                    if s.ord_to[idx] == v_old {
                        slot = k as u32;
                        break;
                    }
                }
                if slot == NONE {
                    self.wipe();
                    return false;
                }
                e.push(slot);
            }
            e.push(fv as u32);
            self.ed.push(e);
            if self.tracking {
                let mut n = Vec::with_capacity(d);
                for t in lo..hi {
                    n.push(s.nf_id[s.ord_face[t] as usize]);
                }
                self.ne.push(n);
            }
        }
        true
    }

    /// Walks every face once, calling `f` with its vertex cycle and, in the
    /// tracking flavor, the id of the plane that created it (0 otherwise).
    fn for_each_face<F: FnMut(&[u32], i32)>(&self, mut f: F) {
        let nv = self.nu.len();
        let mut offs = Vec::with_capacity(nv);
        let mut acc = 0usize;
        for i in 0..nv {
            offs.push(acc);
            acc += self.nu[i];
        }
        let mut seen = vec![false; acc];
        let mut cycle: Vec<u32> = Vec::new();
        for i in 0..nv {
            for j in 0..self.nu[i] {
                if seen[offs[i] + j] {
                    continue;
                }
                cycle.clear();
                let fid = if self.tracking { self.ne[i][j] } else { 0 };
                let mut cv = i;
                let mut cs = j;
                loop {
                    seen[offs[cv] + cs] = true;
                    cycle.push(cv as u32);
                    let w = self.ed[cv][cs] as usize;
                    let back = self.ed[cv][self.nu[cv] + cs] as usize;
                    cv = w;
                    cs = if back + 1 == self.nu[w] { 0 } else { back + 1 };
                    if cv == i && cs == j {
                        break;
                    }
                }
                f(&cycle, fid);
            }
        }
    }

    /// Volume by tetrahedron decomposition from the local-frame origin.
    pub fn volume(&self) -> f64 {
        let mut vol = 0.0;
        self.for_each_face(|cycle, _| {
            let v0 = self.vertex(cycle[0]);
            for t in 1..cycle.len() - 1 {
                let v1 = self.vertex(cycle[t]);
                let v2 = self.vertex(cycle[t + 1]);
                vol += v0[0] * (v1[1] * v2[2] - v1[2] * v2[1])
                    + v0[1] * (v1[2] * v2[0] - v1[0] * v2[2])
                    + v0[2] * (v1[0] * v2[1] - v1[1] * v2[0]);
            }
        });
        (vol / 6.0).abs()
    }

    /// Centroid in the local frame, `[0.0; 3]` for an empty cell.
    pub fn centroid(&self) -> [f64; 3] {
        let mut c = [0.0f64; 3];
        let mut total = 0.0f64;
        self.for_each_face(|cycle, _| {
            let v0 = self.vertex(cycle[0]);
            for t in 1..cycle.len() - 1 {
                let v1 = self.vertex(cycle[t]);
                let v2 = self.vertex(cycle[t + 1]);
                let det = v0[0] * (v1[1] * v2[2] - v1[2] * v2[1])
                    + v0[1] * (v1[2] * v2[0] - v1[0] * v2[2])
                    + v0[2] * (v1[0] * v2[1] - v1[1] * v2[0]);
                total += det;
                for k in 0..3 {
                    c[k] += det * (v0[k] + v1[k] + v2[k]);
                }
            }
        });
        if total.abs() < 1e-30 {
            return [0.0; 3];
        }
        let factor = 1.0 / (4.0 * total);
        [c[0] * factor, c[1] * factor, c[2] * factor]
    }

    fn vertex(&self, i: u32) -> [f64; 3] {
        let i = i as usize;
        [self.pts[3 * i], self.pts[3 * i + 1], self.pts[3 * i + 2]]
    }

    fn face_area_of(&self, cycle: &[u32]) -> f64 {
        let mut area = 0.0;
        let p0 = self.vertex(cycle[0]);
        for t in 1..cycle.len() - 1 {
            let p1 = self.vertex(cycle[t]);
            let p2 = self.vertex(cycle[t + 1]);
            let u = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
            let w = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
            let cx = u[1] * w[2] - u[2] * w[1];
            let cy = u[2] * w[0] - u[0] * w[2];
            let cz = u[0] * w[1] - u[1] * w[0];
            area += 0.5 * (cx * cx + cy * cy + cz * cz).sqrt();
        }
        area
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        let mut total = 0.0;
        self.for_each_face(|cycle, _| total += self.face_area_of(cycle));
        total
    }

    /// Area of each face, in face-walk order.
    pub fn face_areas(&self) -> Vec<f64> {
        let mut areas = Vec::new();
        self.for_each_face(|cycle, _| areas.push(self.face_area_of(cycle)));
        areas
    }

    /// Number of vertices of each face, in face-walk order.
    pub fn face_orders(&self) -> Vec<usize> {
        let mut orders = Vec::new();
        self.for_each_face(|cycle, _| orders.push(cycle.len()));
        orders
    }

    /// Perimeter of each face, in face-walk order.
    pub fn face_perimeters(&self) -> Vec<f64> {
        let mut per = Vec::new();
        self.for_each_face(|cycle, _| {
            let mut p = 0.0;
            for t in 0..cycle.len() {
                let a = self.vertex(cycle[t]);
                let b = self.vertex(cycle[(t + 1) % cycle.len()]);
                let dx = b[0] - a[0];
                let dy = b[1] - a[1];
                let dz = b[2] - a[2];
                p += (dx * dx + dy * dy + dz * dz).sqrt();
            }
            per.push(p);
        });
        per
    }

    /// Vertex index cycles of each face, in face-walk order.
    pub fn faces(&self) -> Vec<Vec<usize>> {
        let mut faces = Vec::new();
        self.for_each_face(|cycle, _| {
            faces.push(cycle.iter().map(|&v| v as usize).collect());
        });
        faces
    }

    /// Outward unit normal of each face, in face-walk order. Faces whose
    /// area vanishes yield a zero vector.
    pub fn face_normals(&self) -> Vec<[f64; 3]> {
        let mut normals = Vec::new();
        self.for_each_face(|cycle, _| {
            let mut n = [0.0f64; 3];
            let p0 = self.vertex(cycle[0]);
            for t in 1..cycle.len() - 1 {
                let p1 = self.vertex(cycle[t]);
                let p2 = self.vertex(cycle[t + 1]);
                let u = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
                let w = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
                n[0] += u[1] * w[2] - u[2] * w[1];
                n[1] += u[2] * w[0] - u[0] * w[2];
                n[2] += u[0] * w[1] - u[1] * w[0];
            }
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if len > 0.0 {
                for k in n.iter_mut() {
                    *k /= len;
                }
                // orient away from the particle at the local origin
                if n[0] * p0[0] + n[1] * p0[1] + n[2] * p0[2] < 0.0 {
                    for k in n.iter_mut() {
                        *k = -*k;
                    }
                }
            }
            normals.push(n);
        });
        normals
    }

    /// Face id of each face, in face-walk order. Empty for the plain flavor.
    pub fn neighbors(&self) -> Vec<i32> {
        if !self.tracking {
            return Vec::new();
        }
        let mut ids = Vec::new();
        self.for_each_face(|_, fid| ids.push(fid));
        ids
    }

    /// Flat local-frame vertex coordinates `[x, y, z, ...]`.
    pub fn vertices(&self) -> Vec<f64> {
        self.pts.clone()
    }

    /// Flat global vertex coordinates for a particle at `(x, y, z)`.
    pub fn vertices_at(&self, x: f64, y: f64, z: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.pts.len());
        for i in 0..self.nu.len() {
            out.push(self.pts[3 * i] + x);
            out.push(self.pts[3 * i + 1] + y);
            out.push(self.pts[3 * i + 2] + z);
        }
        out
    }

    /// Degree of each vertex.
    pub fn vertex_orders(&self) -> Vec<usize> {
        self.nu.clone()
    }

    /// Sum of the lengths of all edges.
    pub fn total_edge_distance(&self) -> f64 {
        let mut total = 0.0;
        for i in 0..self.nu.len() {
            for j in 0..self.nu[i] {
                let k = self.ed[i][j] as usize;
                if k > i {
                    let dx = self.pts[3 * k] - self.pts[3 * i];
                    let dy = self.pts[3 * k + 1] - self.pts[3 * i + 1];
                    let dz = self.pts[3 * k + 2] - self.pts[3 * i + 2];
                    total += (dx * dx + dy * dy + dz * dz).sqrt();
                }
            }
        }
        total
    }

    /// Largest squared distance from the particle to a vertex of the mesh.
    /// The compute driver uses this to bound the remaining search.
    pub fn max_radius_squared(&self) -> f64 {
        let mut max = 0.0f64;
        for i in 0..self.nu.len() {
            let x = self.pts[3 * i];
            let y = self.pts[3 * i + 1];
            let z = self.pts[3 * i + 2];
            let r = x * x + y * y + z * z;
            if r > max {
                max = r;
            }
        }
        max
    }

    /// Audits the edge pairing and the Euler characteristic. Debug builds
    /// run this after every cut; release builds may call it explicitly.
    pub fn check_relations(&self) -> bool {
        let nv = self.nu.len();
        if nv == 0 {
            return true;
        }
        for i in 0..nv {
            let d = self.nu[i];
            if self.ed[i].len() != 2 * d + 1 || self.ed[i][2 * d] != i as u32 {
                return false;
            }
            for j in 0..d {
                let k = self.ed[i][j] as usize;
                if k >= nv {
                    return false;
                }
                let back = self.ed[i][d + j] as usize;
                if back >= self.nu[k]
                    || self.ed[k][back] != i as u32
                    || self.ed[k][self.nu[k] + back] != j as u32
                {
                    return false;
                }
            }
        }
        let v = nv as i64;
        let e = self.number_of_edges() as i64;
        let f = self.number_of_faces() as i64;
        v - e + f == 2
    }
}
