use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voroxide::{BoundingBox, Container, ContainerPoly, VoronoiCell};

#[test]
fn weighted_bisector_respects_radii() {
    // particles at (0,0,0) with r=1 and (3,0,0) with r=2: the radical
    // plane sits at x = (3² + 1² - 2²)/(2·3) = 1, not at the midpoint
    let mut con = ContainerPoly::new(
        BoundingBox::new([-5.0; 3], [5.0; 3]),
        [5, 5, 5],
        [false; 3],
    );
    con.put(0, 0.0, 0.0, 0.0, 1.0).expect("put");
    con.put(1, 3.0, 0.0, 0.0, 2.0).expect("put");

    let mut cell = VoronoiCell::new();
    for p in con.particles() {
        assert!(con.compute_cell(&mut cell, p.block, p.slot));
        let global = cell.vertices_at(p.position[0], p.position[1], p.position[2]);
        if p.id == 0 {
            assert!((cell.volume() - 600.0).abs() < 1e-8);
            let max_x = global.chunks(3).map(|v| v[0]).fold(f64::MIN, f64::max);
            assert!((max_x - 1.0).abs() < 1e-9);
        } else {
            assert!((cell.volume() - 400.0).abs() < 1e-8);
            let min_x = global.chunks(3).map(|v| v[0]).fold(f64::MAX, f64::min);
            assert!((min_x - 1.0).abs() < 1e-9);
        }
    }
}

#[test]
fn equal_radii_match_the_plain_diagram() {
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let mut plain = Container::new(bounds, [4, 4, 4], [false; 3]);
    let mut poly = ContainerPoly::new(bounds, [4, 4, 4], [false; 3]);
    let mut rng = StdRng::seed_from_u64(17);
    for i in 0..80 {
        let (x, y, z) = (rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
        plain.put(i, x, y, z).expect("put");
        poly.put(i, x, y, z, 0.25).expect("put");
    }

    let mut volumes_plain = Vec::new();
    let mut cell = VoronoiCell::new();
    for p in plain.particles() {
        assert!(plain.compute_cell(&mut cell, p.block, p.slot));
        volumes_plain.push((p.id, cell.volume()));
    }
    let mut volumes_poly = Vec::new();
    for p in poly.particles() {
        assert!(poly.compute_cell(&mut cell, p.block, p.slot));
        volumes_poly.push((p.id, cell.volume()));
    }
    volumes_plain.sort_by_key(|(id, _)| *id);
    volumes_poly.sort_by_key(|(id, _)| *id);
    for ((_, a), (_, b)) in volumes_plain.iter().zip(&volumes_poly) {
        assert!((a - b).abs() < 1e-10);
    }
}

#[test]
fn radical_cloud_partitions_the_box() {
    let mut con = ContainerPoly::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [4, 4, 4],
        [false; 3],
    );
    let mut rng = StdRng::seed_from_u64(23);
    for i in 0..150 {
        con.put(
            i,
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            0.1 * rng.gen::<f64>(),
        )
        .expect("put");
    }
    let total = con.sum_cell_volumes();
    // a swallowed particle reports no cell but the survivors still tile
    assert!(
        (total - 1.0).abs() < 1e-8,
        "radical partition defect: {}",
        total
    );
}

#[test]
fn periodic_radical_cloud_partitions_the_box() {
    let mut con = ContainerPoly::new(BoundingBox::new([0.0; 3], [1.0; 3]), [3, 3, 3], [true; 3]);
    let mut rng = StdRng::seed_from_u64(31);
    for i in 0..60 {
        con.put(
            i,
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            0.05 + 0.05 * rng.gen::<f64>(),
        )
        .expect("put");
    }
    let total = con.sum_cell_volumes();
    assert!((total - 1.0).abs() < 1e-8);
}

#[test]
fn zero_radius_poly_behaves_like_plain() {
    let mut con = ContainerPoly::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    con.put(0, 0.25, 0.5, 0.5, 0.0).expect("put");
    con.put(1, 0.75, 0.5, 0.5, 0.0).expect("put");
    let mut cell = VoronoiCell::new();
    for p in con.particles() {
        assert!(con.compute_cell(&mut cell, p.block, p.slot));
        assert!((cell.volume() - 0.5).abs() < 1e-10);
    }
}

#[test]
fn a_dominated_particle_loses_its_cell() {
    // a tiny particle buried inside a much larger one owns no region
    let mut con = ContainerPoly::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    con.put(0, 0.5, 0.5, 0.5, 0.4).expect("put");
    con.put(1, 0.52, 0.5, 0.5, 0.01).expect("put");
    let mut cell = VoronoiCell::new();
    let mut live = 0;
    for p in con.particles() {
        if con.compute_cell(&mut cell, p.block, p.slot) {
            live += 1;
            assert_eq!(p.id, 0);
            assert!((cell.volume() - 1.0).abs() < 1e-10);
        }
    }
    assert_eq!(live, 1);
    assert_eq!(con.compute_all_cells(), 1);
}
