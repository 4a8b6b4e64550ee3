use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voroxide::{BoundingBox, Container, VoronoiCell, WALL_ID_START};

// Faces thinner than this are clipping artifacts of finite precision and
// are exempt from the reciprocity check.
const SLIVER_AREA: f64 = 1e-9;

fn random_container(n: usize, seed: u64, periodic: bool) -> Container {
    let mut con = Container::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [4, 4, 4],
        [periodic; 3],
    );
    let mut rng = StdRng::seed_from_u64(seed);
    for i in 0..n {
        con.put(
            i as i32,
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            rng.gen::<f64>(),
        )
        .expect("put");
    }
    con
}

fn collect_neighbor_sets(con: &Container) -> Vec<(i32, Vec<(i32, f64)>)> {
    let mut cell = VoronoiCell::new_tracking();
    let mut out = Vec::new();
    for p in con.particles() {
        assert!(con.compute_cell(&mut cell, p.block, p.slot));
        let ids = cell.neighbors();
        let areas = cell.face_areas();
        assert_eq!(ids.len(), areas.len());
        out.push((p.id, ids.into_iter().zip(areas).collect()));
    }
    // particles() runs in grid-scan order; reindex by id so that
    // cells[id] works below
    out.sort_by_key(|(id, _)| *id);
    out
}

#[test]
fn neighbor_relations_are_reciprocal() {
    let con = random_container(120, 9, false);
    let cells = collect_neighbor_sets(&con);
    for (id, faces) in &cells {
        for &(n, area) in faces {
            if n < 0 || area < SLIVER_AREA {
                continue;
            }
            let (_, other) = &cells[n as usize];
            assert!(
                other.iter().any(|&(m, _)| m == *id),
                "particle {} sees {} but not vice versa",
                id,
                n
            );
        }
    }
}

#[test]
fn periodic_neighbor_relations_are_reciprocal() {
    let con = random_container(60, 21, true);
    let cells = collect_neighbor_sets(&con);
    for (id, faces) in &cells {
        for &(n, area) in faces {
            if area < SLIVER_AREA {
                continue;
            }
            assert!(n >= 0, "periodic cells only border particles, got {}", n);
            if n == *id {
                // a particle can border its own periodic image
                continue;
            }
            let (_, other) = &cells[n as usize];
            assert!(other.iter().any(|&(m, _)| m == *id));
        }
    }
}

#[test]
fn mesh_stays_closed_under_many_cuts() {
    let con = random_container(120, 5, false);
    let mut cell = VoronoiCell::new_tracking();
    for p in con.particles() {
        assert!(con.compute_cell(&mut cell, p.block, p.slot));
        assert!(cell.check_relations(), "broken pairing for {}", p.id);
        // every face of a convex cell has at least three vertices
        for o in cell.face_orders() {
            assert!(o >= 3);
        }
    }
}

#[test]
fn collinear_particles_know_both_neighbors() {
    let mut con = Container::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [5, 5, 5],
        [false; 3],
    );
    con.put(0, 0.2, 0.5, 0.5).expect("put");
    con.put(1, 0.5, 0.5, 0.5).expect("put");
    con.put(2, 0.8, 0.5, 0.5).expect("put");
    let mut cell = VoronoiCell::new_tracking();
    let middle = con.particles().find(|p| p.id == 1).expect("middle");
    assert!(con.compute_cell(&mut cell, middle.block, middle.slot));
    let ids = cell.neighbors();
    assert!(ids.contains(&0));
    assert!(ids.contains(&2));
    // the four remaining faces come from the box walls
    assert_eq!(ids.iter().filter(|&&n| n < 0).count(), 4);
    assert!((cell.volume() - 0.3).abs() < 1e-10);
}

#[test]
fn bcc_hexagons_face_the_other_sublattice() {
    let mut con = Container::new(BoundingBox::new([0.0; 3], [1.0; 3]), [2, 2, 2], [true; 3]);
    con.put(0, 0.0, 0.0, 0.0).expect("put");
    con.put(1, 0.5, 0.5, 0.5).expect("put");
    let mut cell = VoronoiCell::new_tracking();
    let p = con.particles().find(|p| p.id == 0).expect("particle");
    assert!(con.compute_cell(&mut cell, p.block, p.slot));
    let ids = cell.neighbors();
    let orders = cell.face_orders();
    // all eight hexagonal faces are cut by images of the other particle
    let hex_ids: Vec<i32> = ids
        .iter()
        .zip(&orders)
        .filter(|&(_, &o)| o == 6)
        .map(|(&n, _)| n)
        .collect();
    assert_eq!(hex_ids.len(), 8);
    assert!(hex_ids.iter().all(|&n| n == 1));
}

#[test]
fn wall_faces_report_wall_ids() {
    use voroxide::PlaneWall;
    let mut con = Container::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    con.add_wall(PlaneWall::from_point(
        [0.5, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        WALL_ID_START,
    ));
    con.put(0, 0.25, 0.5, 0.5).expect("put");
    let mut cell = VoronoiCell::new_tracking();
    let p = con.particles().next().expect("particle");
    assert!(con.compute_cell(&mut cell, p.block, p.slot));
    assert!(cell.neighbors().contains(&WALL_ID_START));
    assert!((cell.volume() - 0.5).abs() < 1e-10);
}
