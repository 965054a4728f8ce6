//! Sod shock tube with the Euler HLLC solver.
//!
//! A tube of length 1 split at x = 0.5:
//! - Left: ρ = 1, p = 1
//! - Right: ρ = 0.125, p = 0.1
//!
//! The ends are transmissive, the long sides are solid walls. Snapshots go to
//! `result/shock_tube/<step>.vtu`.
//!
//! Usage: `cargo run --example shock_tube [-- mesh.vtk [run.toml]]`.
//! Without arguments a triangulated 200 x 4 tube is generated.

use std::error::Error;

use fv_rs::riemann::max_wave_speed;
use fv_rs::solver::diagnostics::courant_number;
use fv_rs::{Euler, Godunov, IdealGas, Mesh2D, Primitive, RunConfig};

fn tube(nx: usize, ny: usize, length: f64, width: f64) -> Result<Mesh2D, Box<dyn Error>> {
    let node = |i: usize, j: usize| j * (nx + 1) + i;
    let (dx, dy) = (length / nx as f64, width / ny as f64);
    let mut mesh = Mesh2D::new();
    for j in 0..=ny {
        for i in 0..=nx {
            mesh.emplace_node(node(i, j), i as f64 * dx, j as f64 * dy)?;
        }
    }
    let mut id = 0;
    for j in 0..ny {
        for i in 0..nx {
            let (a, b, c, d) = (node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1));
            mesh.emplace_cell(id, &[a, b, c])?;
            mesh.emplace_cell(id + 1, &[a, c, d])?;
            id += 2;
        }
    }
    Ok(mesh)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let gas = IdealGas::default();
    let mut model = match args.get(1) {
        Some(path) => Godunov::<Euler>::load(path, gas)?,
        None => Godunov::<Euler>::from_mesh(tube(200, 4, 1.0, 0.02)?, gas)?,
    };
    let config = match args.get(2) {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::new(0.2, 1000, 100)
            .with_output_dir("result/shock_tube")
            .with_extension("vtu"),
    };

    println!("Sod shock tube (Euler, HLLC)");
    println!("============================");
    println!("Cells: {}", model.mesh().count_cells());
    println!("Walls: {}", model.mesh().count_walls());
    println!("Steps: {} (dt = {:.2e})", config.n_steps, config.step_size());
    println!();

    model.register_group("ends", |w| w.center.x < 1e-9 || w.center.x > 1.0 - 1e-9)?;
    model.register_group("sides", |w| w.center.x >= 1e-9 && w.center.x <= 1.0 - 1e-9)?;
    model.mark_free("ends")?;
    model.mark_solid("sides")?;

    let left = gas.conserved(Primitive::new(1.0, 0.0, 0.0, 1.0));
    let right = gas.conserved(Primitive::new(0.125, 0.0, 0.0, 0.1));
    model.set_initial_state(|c| if c.x < 0.5 { left } else { right });

    let speeds: Vec<f64> = model.states().iter().map(|s| max_wave_speed(&gas, s)).collect();
    let cfl = courant_number(model.mesh(), &speeds, config.step_size());
    println!("Initial Courant number: {:.3}", cfl);

    model.set_config(config);
    let mass_0 = model.total_conserved()[0];
    let summary = model.run()?;
    let mass_1 = model.total_conserved()[0];

    println!();
    println!("Final time: {:.4}", summary.final_time);
    println!("Snapshots: {}", summary.snapshots);
    println!("Mass change: {:.3e}", mass_1 - mass_0);
    println!("Wall time: {:.2}s", summary.wall_time);
    Ok(())
}
