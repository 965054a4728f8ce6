//! HLLC Riemann solver for the 2D Euler equations of an ideal gas.
//!
//! Conserved variables: U = (ρ, ρu, ρv, E)
//!
//! The momentum of both states is rotated into the wall frame (normal,
//! tangential), the 1D HLLC flux is evaluated along the normal with the
//! tangential velocity carried as a passive scalar, and the momentum flux is
//! rotated back.
//!
//! Reference: Toro, "Riemann Solvers and Numerical Methods for Fluid Dynamics", ch. 10

use super::state::Conserved;
use super::traits::RiemannSolver;
use crate::geometry::Point2;
use crate::io::{FieldValue, OutputField};

/// Conserved Euler state (ρ, ρu, ρv, E).
pub type EulerState = Conserved<4>;

/// Ideal-gas equation of state p = (γ - 1)(E - ρ|u|²/2).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdealGas {
    pub gamma: f64,
}

impl Default for IdealGas {
    /// Diatomic gas (air), γ = 1.4.
    fn default() -> Self {
        Self { gamma: 1.4 }
    }
}

/// Primitive variables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive {
    pub rho: f64,
    pub u: f64,
    pub v: f64,
    pub p: f64,
}

impl Primitive {
    pub fn new(rho: f64, u: f64, v: f64, p: f64) -> Self {
        Self { rho, u, v, p }
    }
}

impl IdealGas {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    pub fn conserved(&self, w: Primitive) -> EulerState {
        let energy = w.p / (self.gamma - 1.0) + 0.5 * w.rho * (w.u * w.u + w.v * w.v);
        Conserved::new([w.rho, w.rho * w.u, w.rho * w.v, energy])
    }

    pub fn primitive(&self, q: &EulerState) -> Primitive {
        let rho = q[0];
        let u = q[1] / rho;
        let v = q[2] / rho;
        let p = (self.gamma - 1.0) * (q[3] - 0.5 * rho * (u * u + v * v));
        Primitive { rho, u, v, p }
    }

    pub fn pressure(&self, q: &EulerState) -> f64 {
        self.primitive(q).p
    }

    pub fn sound_speed(&self, rho: f64, p: f64) -> f64 {
        (self.gamma * p.max(0.0) / rho).sqrt()
    }
}

/// Rotated HLLC flux bound to one wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler {
    normal: Point2,
    gas: IdealGas,
}

/// State in the wall frame: normal velocity `un`, tangential velocity `ut`.
#[derive(Clone, Copy, Debug)]
struct Rotated {
    rho: f64,
    un: f64,
    ut: f64,
    p: f64,
    energy: f64,
}

impl Euler {
    pub fn gas(&self) -> IdealGas {
        self.gas
    }

    fn to_normal_frame(&self, q: &EulerState) -> Rotated {
        let w = self.gas.primitive(q);
        let n = self.normal;
        Rotated {
            rho: w.rho,
            un: w.u * n.x + w.v * n.y,
            ut: w.v * n.x - w.u * n.y,
            p: w.p,
            energy: q[3],
        }
    }

    fn to_global_frame(&self, f: [f64; 4]) -> EulerState {
        let n = self.normal;
        Conserved::new([f[0], f[1] * n.x - f[2] * n.y, f[1] * n.y + f[2] * n.x, f[3]])
    }

    /// Physical flux along the normal, in the wall frame.
    fn normal_flux(s: &Rotated) -> [f64; 4] {
        let mass = s.rho * s.un;
        [mass, mass * s.un + s.p, mass * s.ut, s.un * (s.energy + s.p)]
    }

    fn star_state(s: &Rotated, s_k: f64, s_star: f64) -> [f64; 4] {
        let factor = s.rho * (s_k - s.un) / (s_k - s_star);
        let energy = s.energy / s.rho
            + (s_star - s.un) * (s_star + s.p / (s.rho * (s_k - s.un)));
        [factor, factor * s_star, factor * s.ut, factor * energy]
    }

    fn hllc(&self, l: &Rotated, r: &Rotated) -> [f64; 4] {
        let c_l = self.gas.sound_speed(l.rho, l.p);
        let c_r = self.gas.sound_speed(r.rho, r.p);

        // Davis wave speed estimates
        let s_l = (l.un - c_l).min(r.un - c_r);
        let s_r = (l.un + c_l).max(r.un + c_r);

        let f_l = Self::normal_flux(l);
        if s_l >= 0.0 {
            return f_l;
        }
        let f_r = Self::normal_flux(r);
        if s_r <= 0.0 {
            return f_r;
        }

        let m_l = l.rho * (s_l - l.un);
        let m_r = r.rho * (s_r - r.un);
        let s_star = (r.p - l.p + l.un * m_l - r.un * m_r) / (m_l - m_r);

        let (side, s_k, f_k) = if s_star >= 0.0 {
            (l, s_l, f_l)
        } else {
            (r, s_r, f_r)
        };
        let u_k = [side.rho, side.rho * side.un, side.rho * side.ut, side.energy];
        let u_star = Self::star_state(side, s_k, s_star);
        std::array::from_fn(|i| f_k[i] + s_k * (u_star[i] - u_k[i]))
    }
}

impl RiemannSolver for Euler {
    type State = EulerState;
    type Coefficients = IdealGas;

    fn bind(normal: Point2, gas: &IdealGas) -> Self {
        Self { normal, gas: *gas }
    }

    fn flux_on_time_axis(&self, left: &EulerState, right: &EulerState) -> EulerState {
        let l = self.to_normal_frame(left);
        let r = self.to_normal_frame(right);
        self.to_global_frame(self.hllc(&l, &r))
    }

    /// Mirror the momentum across the wall.
    fn solid_ghost(&self, inner: &EulerState) -> EulerState {
        let n = self.normal;
        let m_n = inner[1] * n.x + inner[2] * n.y;
        let mut ghost = *inner;
        ghost[1] -= 2.0 * m_n * n.x;
        ghost[2] -= 2.0 * m_n * n.y;
        ghost
    }

    fn output_fields(gas: &IdealGas, state: &EulerState) -> Vec<OutputField> {
        let w = gas.primitive(state);
        vec![
            OutputField::new("rho", FieldValue::Scalar(w.rho)),
            OutputField::new("u", FieldValue::Vector(Point2::new(w.u, w.v))),
            OutputField::new("p", FieldValue::Scalar(w.p)),
        ]
    }

    fn name(&self) -> &'static str {
        "euler-hllc"
    }
}

/// Maximum signal speed |u| + c of a state, for time-step estimates.
pub fn max_wave_speed(gas: &IdealGas, state: &EulerState) -> f64 {
    let w = gas.primitive(state);
    (w.u * w.u + w.v * w.v).sqrt() + gas.sound_speed(w.rho, w.p)
}
