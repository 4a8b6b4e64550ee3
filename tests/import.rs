use voroxide::{BoundingBox, Container, ContainerPoly, Error, ParticleOrder, VoronoiCell};

#[test]
fn import_reads_particles() {
    let mut con = Container::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    let data = "\
0 0.25 0.5 0.5

1 0.75 0.5 0.5
";
    let read = con.import(data.as_bytes()).expect("import");
    assert_eq!(read, 2);
    assert_eq!(con.total_particles(), 2);
    assert!((con.sum_cell_volumes() - 1.0).abs() < 1e-10);
}

#[test]
fn import_rejects_out_of_domain_points() {
    let mut con = Container::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    let data = "0 1.1 0.5 0.5\n";
    match con.import(data.as_bytes()) {
        Err(Error::OutOfDomain { x, .. }) => assert!((x - 1.1).abs() < 1e-12),
        other => panic!("expected a domain error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn import_reports_the_offending_line() {
    let mut con = Container::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    let data = "0 0.2 0.2 0.2\n1 0.4 0.4 0.4\nnot a particle\n";
    match con.import(data.as_bytes()) {
        Err(Error::Parse { line }) => assert_eq!(line, 3),
        other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn import_rejects_missing_radius_in_poly() {
    let mut con = ContainerPoly::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    assert!(matches!(
        con.import("0 0.5 0.5 0.5\n".as_bytes()),
        Err(Error::Parse { line: 1 })
    ));
    assert!(con.import("0 0.5 0.5 0.5 0.1\n".as_bytes()).is_ok());
    assert!((con.max_radius() - 0.1).abs() < 1e-12);
}

#[test]
fn ordered_import_preserves_insertion_order() {
    let mut con = Container::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    let mut order = ParticleOrder::new();
    // grid-scan order would visit these back to front
    let data = "5 0.9 0.9 0.9\n6 0.5 0.5 0.5\n7 0.1 0.1 0.1\n";
    con.import_ordered(&mut order, data.as_bytes())
        .expect("import");
    let ids: Vec<i32> = con.particles_ordered(&order).map(|p| p.id).collect();
    assert_eq!(ids, vec![5, 6, 7]);
    let scan_ids: Vec<i32> = con.particles().map(|p| p.id).collect();
    assert_eq!(scan_ids, vec![7, 6, 5]);
}

#[test]
fn custom_output_emits_one_line_per_cell() {
    let mut con = Container::new(
        BoundingBox::new([0.0; 3], [1.0; 3]),
        [3, 3, 3],
        [false; 3],
    );
    con.put(0, 0.25, 0.5, 0.5).expect("put");
    con.put(1, 0.75, 0.5, 0.5).expect("put");
    let mut out = Vec::new();
    con.print_custom("%i %v %s", &mut out).expect("print");
    let text = String::from_utf8(out).expect("utf8");
    for line in text.lines() {
        let fields: Vec<&str> = line.split(' ').collect();
        assert_eq!(fields.len(), 3);
        let vol: f64 = fields[1].parse().expect("volume");
        assert!((vol - 0.5).abs() < 1e-10);
        assert_eq!(fields[2], "6");
    }
}

#[test]
fn periodic_import_wraps_coordinates() {
    let mut con = Container::new(BoundingBox::new([0.0; 3], [1.0; 3]), [3, 3, 3], [true; 3]);
    con.import("0 1.25 -0.25 0.5\n".as_bytes()).expect("import");
    let p = con.particles().next().expect("particle");
    assert!((p.position[0] - 0.25).abs() < 1e-12);
    assert!((p.position[1] - 0.75).abs() < 1e-12);
    let mut cell = VoronoiCell::new();
    assert!(con.compute_cell(&mut cell, p.block, p.slot));
    assert!((cell.volume() - 1.0).abs() < 1e-10);
}
