//! Periodic boundaries: stitching, transport across the seam and
//! conservation on fully periodic domains.

use approx::assert_relative_eq;
use fv_rs::{
    BoundaryError, BoundaryKind, Burgers, Godunov, GodunovError, LinearAdvection, Mesh2D, Point2,
    Scalar,
};

/// Structured `nx` x `ny` grid of unit quads.
fn grid(nx: usize, ny: usize) -> Mesh2D {
    let node = |i: usize, j: usize| j * (nx + 1) + i;
    let mut mesh = Mesh2D::new();
    for j in 0..=ny {
        for i in 0..=nx {
            mesh.emplace_node(node(i, j), i as f64, j as f64).unwrap();
        }
    }
    for j in 0..ny {
        for i in 0..nx {
            let nodes = [node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)];
            mesh.emplace_cell(j * nx + i, &nodes).unwrap();
        }
    }
    mesh
}

fn register_sides<R: fv_rs::RiemannSolver>(model: &mut Godunov<R>, nx: usize, ny: usize) {
    let (xmax, ymax) = (nx as f64, ny as f64);
    model.register_group("left", |w| w.center.x < 1e-9).unwrap();
    model.register_group("right", |w| w.center.x > xmax - 1e-9).unwrap();
    model.register_group("bottom", |w| w.center.y < 1e-9).unwrap();
    model.register_group("top", |w| w.center.y > ymax - 1e-9).unwrap();
}

#[test]
fn test_pairing_makes_walls_interior() {
    let mut model = Godunov::<LinearAdvection>::from_mesh(grid(4, 1), Point2::new(1.0, 0.0)).unwrap();
    register_sides(&mut model, 4, 1);

    let pair = model.pair_periodic("left", "right").unwrap();
    assert_eq!(pair.walls.len(), 1);
    let (a, b) = pair.walls[0];

    let mesh = model.mesh();
    assert!(mesh.wall(a).is_interior());
    assert!(mesh.wall(b).is_interior());
    assert_eq!(model.registry().kind_of(a), Some(BoundaryKind::Periodic));
    assert_eq!(model.registry().periodic_pairs().len(), 1);
}

#[test]
fn test_pairing_rejects_mismatched_groups() {
    let mut model = Godunov::<LinearAdvection>::from_mesh(grid(3, 2), Point2::new(1.0, 0.0)).unwrap();
    register_sides(&mut model, 3, 2);
    let err = model.pair_periodic("left", "bottom").unwrap_err();
    assert!(matches!(
        err,
        GodunovError::Configuration(BoundaryError::MismatchedPeriodicSizes { .. })
    ));
    let err = model.pair_periodic("left", "left").unwrap_err();
    assert!(matches!(
        err,
        GodunovError::Configuration(BoundaryError::SelfPeriodic(_))
    ));
}

#[test]
fn test_unit_courant_shift_wraps_around() {
    let mut model = Godunov::<LinearAdvection>::from_mesh(grid(4, 1), Point2::new(1.0, 0.0)).unwrap();
    register_sides(&mut model, 4, 1);
    model.pair_periodic("left", "right").unwrap();
    model.mark_free("bottom").unwrap();
    model.mark_free("top").unwrap();
    model.set_initial_state(|c| Scalar::from(c.x + 0.5));
    model.set_time_steps(4.0, 4, 1);

    let values = |m: &Godunov<LinearAdvection>| -> Vec<f64> {
        m.states().iter().map(|s| s.value()).collect()
    };
    assert_eq!(values(&model), [1.0, 2.0, 3.0, 4.0]);

    model.step().unwrap();
    let shifted = values(&model);
    for (got, want) in shifted.iter().zip([4.0, 1.0, 2.0, 3.0]) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }

    for _ in 0..3 {
        model.step().unwrap();
    }
    for (got, want) in values(&model).iter().zip([1.0, 2.0, 3.0, 4.0]) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
}

#[test]
fn test_fully_periodic_burgers_conserves() {
    let (nx, ny) = (5, 4);
    let mut model = Godunov::<Burgers>::from_mesh(grid(nx, ny), Point2::new(1.0, 0.5)).unwrap();
    register_sides(&mut model, nx, ny);
    model.pair_periodic("left", "right").unwrap();
    model.pair_periodic("bottom", "top").unwrap();
    assert!(model.mesh().walls().iter().all(|w| w.is_interior()));

    model.set_initial_state(|c| {
        let x = c.x / nx as f64;
        let y = c.y / ny as f64;
        Scalar::from((2.0 * std::f64::consts::PI * x).sin() + 0.5 * y)
    });
    model.set_time_steps(1.0, 40, 40);

    let before = model.total_conserved().value();
    for _ in 0..40 {
        model.step().unwrap();
        assert_relative_eq!(model.boundary_outflow().value(), 0.0);
    }
    assert_relative_eq!(model.total_conserved().value(), before, epsilon = 1e-10);
}

#[test]
fn test_single_row_periodic_in_y_keeps_uniform_state() {
    let mut model = Godunov::<LinearAdvection>::from_mesh(grid(4, 1), Point2::new(0.0, 1.0)).unwrap();
    register_sides(&mut model, 4, 1);
    let pair = model.pair_periodic("bottom", "top").unwrap().clone();
    // Each cell now sits on both slots of its bottom and top walls.
    for &(a, b) in &pair.walls {
        let (bottom, top) = (model.mesh().wall(a), model.mesh().wall(b));
        assert_eq!(bottom.left(), bottom.right());
        assert_eq!(top.left(), top.right());
    }
    model.mark_free("left").unwrap();
    model.mark_free("right").unwrap();
    model.set_initial_state(|_| Scalar::from(1.0));
    model.set_time_steps(1.0, 10, 10);

    let before = model.total_conserved().value();
    model.step().unwrap();
    assert_relative_eq!(model.total_conserved().value(), before, epsilon = 1e-12);
    for state in model.states() {
        assert_relative_eq!(state.value(), 1.0, epsilon = 1e-12);
    }
    for du in model.derivatives() {
        assert_relative_eq!(du.value(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_single_cell_fully_periodic_is_fixed_point() {
    let mut model = Godunov::<Burgers>::from_mesh(grid(1, 1), Point2::new(1.0, 1.0)).unwrap();
    register_sides(&mut model, 1, 1);
    model.pair_periodic("left", "right").unwrap();
    model.pair_periodic("bottom", "top").unwrap();
    model.set_initial_state(|_| Scalar::from(0.7));
    model.set_time_steps(1.0, 5, 5);

    for _ in 0..5 {
        model.step().unwrap();
    }
    assert_relative_eq!(model.states()[0].value(), 0.7, epsilon = 1e-12);
}
