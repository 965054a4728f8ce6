//! Conservation and stability diagnostics.

use crate::mesh::Mesh2D;
use crate::riemann::StateVector;

/// Compute Σ u_c |c|.
pub fn total_conserved<S: StateVector>(mesh: &Mesh2D, states: &[S]) -> S {
    mesh.cells()
        .iter()
        .zip(states)
        .fold(S::default(), |mut total, (cell, &u)| {
            total += u * cell.measure();
            total
        })
}

/// Net outward flux Σ ±F_w L_w through walls with a single adjacent cell.
///
/// `fluxes` are per unit length and oriented along each wall's normal, which
/// points out of the left cell. A wall with only a right cell therefore
/// contributes with a flipped sign.
pub fn boundary_outflow<S: StateVector>(mesh: &Mesh2D, fluxes: &[S]) -> S {
    let mut total = S::default();
    for w in mesh.wall_indices() {
        let wall = mesh.wall(w);
        let flow = fluxes[w.get()] * mesh.wall_length(w);
        match (wall.left(), wall.right()) {
            (Some(_), None) => total += flow,
            (None, Some(_)) => total -= flow,
            _ => {}
        }
    }
    total
}

/// Largest cell Courant number `dt * s_c * P_c / |c|`, where `s_c` is the
/// signal speed of cell `c` and `P_c` its perimeter.
pub fn courant_number(mesh: &Mesh2D, speeds: &[f64], dt: f64) -> f64 {
    mesh.cell_indices()
        .zip(speeds)
        .map(|(c, &speed)| {
            let perimeter: f64 = mesh.cell_walls(c).iter().map(|&w| mesh.wall_length(w)).sum();
            dt * speed * perimeter / mesh.cell(c).measure()
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riemann::{Conserved, Scalar};
    use approx::assert_relative_eq;

    fn triangle_pair() -> Mesh2D {
        let mut mesh = Mesh2D::new();
        for (id, (x, y)) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].into_iter().enumerate() {
            mesh.emplace_node(id, x, y).unwrap();
        }
        mesh.emplace_cell(0, &[0, 1, 2]).unwrap();
        mesh.emplace_cell(1, &[0, 2, 3]).unwrap();
        mesh
    }

    #[test]
    fn test_total_conserved() {
        let mesh = triangle_pair();
        let states = [Conserved::new([2.0, 1.0]), Conserved::new([4.0, -1.0])];
        let total = total_conserved(&mesh, &states);
        assert_relative_eq!(total[0], 3.0);
        assert_relative_eq!(total[1], 0.0);
    }

    #[test]
    fn test_uniform_flux_has_no_net_outflow() {
        // A constant vector field has zero divergence, so its outward flux
        // around the square vanishes.
        let mesh = triangle_pair();
        let a = crate::geometry::Point2::new(0.4, -1.3);
        let fluxes: Vec<Scalar> = mesh
            .wall_indices()
            .map(|w| Scalar::from(a.dot(&mesh.wall_normal(w))))
            .collect();
        assert_relative_eq!(boundary_outflow(&mesh, &fluxes).value(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_courant_number() {
        let mesh = triangle_pair();
        let perimeter = 2.0 + 2.0_f64.sqrt();
        let cfl = courant_number(&mesh, &[1.0, 2.0], 0.01);
        assert_relative_eq!(cfl, 0.01 * 2.0 * perimeter / 0.5, epsilon = 1e-14);
    }
}
