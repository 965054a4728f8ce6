//! First-order Godunov finite-volume engine on a 2D unstructured mesh.
//!
//! Each step evaluates one Riemann flux per wall, gathers the fluxes of every
//! cell's walls into a time derivative, and advances the cell averages with
//! forward Euler:
//!
//! ```text
//! du_c/dt = -(1/|c|) Σ_walls ±F_w L_w
//! ```
//!
//! where the sign is `-` when `c` was linked as the wall's left cell and `+`
//! when it was linked as the right one.
//! Walls with a single adjacent cell take their missing state from a ghost
//! rule fixed by the wall's boundary group.
//!
//! # Example
//!
//! ```no_run
//! use fv_rs::geometry::Point2;
//! use fv_rs::riemann::{LinearAdvection, Scalar};
//! use fv_rs::solver::Godunov;
//!
//! let mut model = Godunov::<LinearAdvection>::load("box.vtk", Point2::new(1.0, 0.0))?;
//! model.register_group("inflow", |w| w.center.x < 1e-9)?;
//! model.register_group("rest", |w| w.center.x >= 1e-9)?;
//! model.set_inflow_state("inflow", Scalar::from(1.0))?;
//! model.mark_outlet("rest")?;
//! model.set_initial_state(|_| Scalar::from(0.0));
//! model.set_time_steps(1.0, 100, 10);
//! model.set_output_dir("result/box");
//! let summary = model.run()?;
//! println!("{} snapshots", summary.snapshots);
//! # Ok::<(), fv_rs::solver::GodunovError>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::RunConfig;
use super::diagnostics;
use super::error::GodunovError;
use crate::boundary::{BoundaryRegistry, BoundaryWall, PeriodicPair};
use crate::geometry::Point2;
use crate::io::{FieldData, MeshIoError, SnapshotFormat, SnapshotWriter, read_mesh};
use crate::mesh::{BoundaryKind, Cell, Mesh2D, Side, Wall};
use crate::riemann::RiemannSolver;
use crate::time::{ForwardEuler, IntegratorInfo, TimeIntegrator};
use crate::types::{CellIndex, WallIndex};

/// Source of the states on either side of a wall.
#[derive(Clone, Copy, Debug, PartialEq)]
enum WallRule<S> {
    /// Both sides are cells.
    Interior,
    /// Ghost copies the inner state.
    ZeroGradient,
    /// Ghost from [`RiemannSolver::solid_ghost`].
    Solid,
    /// Ghost is a fixed inflow state.
    Prescribed(S),
}

/// Outcome of [`Godunov::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps taken in this run.
    pub steps: usize,
    /// Snapshot files written, including the initial one.
    pub snapshots: usize,
    pub final_time: f64,
    /// Wall-clock time in seconds.
    pub wall_time: f64,
}

/// Godunov solver for the system described by `R`.
#[derive(Clone, Debug)]
pub struct Godunov<R: RiemannSolver> {
    mesh: Mesh2D,
    coefficients: R::Coefficients,
    /// One solver per wall, bound to that wall's normal.
    solvers: Vec<R>,
    lengths: Vec<f64>,
    registry: BoundaryRegistry,
    inflow: HashMap<String, R::State>,
    rules: Vec<WallRule<R::State>>,
    prepared: bool,
    states: Vec<R::State>,
    fluxes: Vec<R::State>,
    derivatives: Vec<R::State>,
    config: RunConfig,
    integrator: ForwardEuler,
    steps_taken: usize,
    time: f64,
}

impl<R: RiemannSolver> Godunov<R> {
    /// Build a solver around an already assembled mesh.
    ///
    /// Every wall is bound to its Riemann solver here and the boundary walls
    /// are recorded for later classification.
    pub fn from_mesh(mesh: Mesh2D, coefficients: R::Coefficients) -> Result<Self, GodunovError> {
        mesh.check_walls()?;

        let solvers: Vec<R> = mesh
            .wall_indices()
            .map(|w| R::bind(mesh.wall_normal(w), &coefficients))
            .collect();
        let lengths: Vec<f64> = mesh.wall_indices().map(|w| mesh.wall_length(w)).collect();
        let registry = BoundaryRegistry::new(&mesh);

        let n_cells = mesh.count_cells();
        let n_walls = mesh.count_walls();
        log::info!(
            "godunov setup: {} cells, {} walls ({} on the boundary), flux {}",
            n_cells,
            n_walls,
            registry.expected_boundary_walls(),
            solvers.first().map_or("-", |s| s.name())
        );

        Ok(Self {
            mesh,
            coefficients,
            solvers,
            lengths,
            registry,
            inflow: HashMap::new(),
            rules: Vec::new(),
            prepared: false,
            states: vec![R::State::default(); n_cells],
            fluxes: vec![R::State::default(); n_walls],
            derivatives: vec![R::State::default(); n_cells],
            config: RunConfig::default(),
            integrator: ForwardEuler,
            steps_taken: 0,
            time: 0.0,
        })
    }

    /// Read a mesh file (`.vtk`, `.vtu` or `.msh`) and build a solver on it.
    pub fn load<P: AsRef<Path>>(path: P, coefficients: R::Coefficients) -> Result<Self, GodunovError> {
        let path = path.as_ref();
        let mesh = read_mesh(path).map_err(|source| GodunovError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_mesh(mesh, coefficients)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn mesh(&self) -> &Mesh2D {
        &self.mesh
    }

    pub fn coefficients(&self) -> &R::Coefficients {
        &self.coefficients
    }

    pub fn registry(&self) -> &BoundaryRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Cell averages, indexed by cell arena position.
    pub fn states(&self) -> &[R::State] {
        &self.states
    }

    pub fn state(&self, cell: CellIndex) -> &R::State {
        &self.states[cell.get()]
    }

    /// Per-unit-length fluxes of the last step, indexed by wall arena position.
    pub fn fluxes(&self) -> &[R::State] {
        &self.fluxes
    }

    /// Time derivatives of the last step, indexed by cell arena position.
    pub fn derivatives(&self) -> &[R::State] {
        &self.derivatives
    }

    /// Riemann solver bound to `wall`.
    pub fn solver(&self, wall: WallIndex) -> &R {
        &self.solvers[wall.get()]
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    // ---------------------------------------------------------------------
    // Boundary setup
    // ---------------------------------------------------------------------

    /// Collect the boundary walls matching `predicate` into a named group.
    pub fn register_group<F>(&mut self, name: &str, predicate: F) -> Result<usize, GodunovError>
    where
        F: Fn(&BoundaryWall) -> bool,
    {
        self.prepared = false;
        Ok(self.registry.register_group(&self.mesh, name, predicate)?)
    }

    pub fn mark_inlet(&mut self, name: &str) -> Result<(), GodunovError> {
        self.mark(name, BoundaryKind::Inlet)
    }

    pub fn mark_outlet(&mut self, name: &str) -> Result<(), GodunovError> {
        self.mark(name, BoundaryKind::Outlet)
    }

    pub fn mark_free(&mut self, name: &str) -> Result<(), GodunovError> {
        self.mark(name, BoundaryKind::Free)
    }

    pub fn mark_solid(&mut self, name: &str) -> Result<(), GodunovError> {
        self.mark(name, BoundaryKind::Solid)
    }

    fn mark(&mut self, name: &str, kind: BoundaryKind) -> Result<(), GodunovError> {
        self.prepared = false;
        Ok(self.registry.mark(name, kind)?)
    }

    /// Mark `name` as an inlet whose ghost cells hold `state`.
    pub fn set_inflow_state(&mut self, name: &str, state: R::State) -> Result<(), GodunovError> {
        self.mark_inlet(name)?;
        self.inflow.insert(name.to_string(), state);
        Ok(())
    }

    /// Stitch two groups into a periodic pair. Their walls become interior.
    pub fn pair_periodic(&mut self, first: &str, second: &str) -> Result<&PeriodicPair, GodunovError> {
        self.prepared = false;
        Ok(self.registry.pair_periodic(&mut self.mesh, first, second)?)
    }

    // ---------------------------------------------------------------------
    // Initial state and run settings
    // ---------------------------------------------------------------------

    /// Set every cell from a function of its centroid.
    pub fn set_initial_state<F>(&mut self, mut f: F)
    where
        F: FnMut(Point2) -> R::State,
    {
        for (state, cell) in self.states.iter_mut().zip(self.mesh.cells()) {
            *state = f(cell.center());
        }
    }

    /// Set every cell from a function of the whole cell.
    pub fn set_initial_state_with<F>(&mut self, mut f: F)
    where
        F: FnMut(&Cell) -> R::State,
    {
        for (state, cell) in self.states.iter_mut().zip(self.mesh.cells()) {
            *state = f(cell);
        }
    }

    /// Replace all cell averages at once.
    pub fn set_states(&mut self, states: Vec<R::State>) -> Result<(), GodunovError> {
        if states.len() != self.mesh.count_cells() {
            return Err(GodunovError::StateLength {
                expected: self.mesh.count_cells(),
                found: states.len(),
            });
        }
        self.states = states;
        Ok(())
    }

    pub fn set_time_steps(&mut self, duration: f64, n_steps: usize, refresh_rate: usize) {
        self.config.duration = duration;
        self.config.n_steps = n_steps;
        self.config.refresh_rate = refresh_rate;
    }

    pub fn set_output_dir<P: Into<PathBuf>>(&mut self, dir: P) {
        self.config.output_dir = dir.into();
    }

    pub fn set_config(&mut self, config: RunConfig) {
        self.config = config;
    }

    // ---------------------------------------------------------------------
    // Time stepping
    // ---------------------------------------------------------------------

    /// Check the run settings and boundary classification, then fix the
    /// ghost rule of every wall.
    pub fn prepare(&mut self) -> Result<(), GodunovError> {
        self.config.validate()?;
        self.registry.validate()?;
        self.mesh.check_walls()?;
        self.rules = self.build_rules();
        self.prepared = true;
        Ok(())
    }

    fn build_rules(&self) -> Vec<WallRule<R::State>> {
        self.mesh
            .wall_indices()
            .map(|w| {
                if self.mesh.wall(w).is_interior() {
                    return WallRule::Interior;
                }
                let Some(group) = self.registry.group_of(w) else {
                    return WallRule::ZeroGradient;
                };
                match group.kind() {
                    Some(BoundaryKind::Solid) => WallRule::Solid,
                    Some(BoundaryKind::Inlet) => self
                        .inflow
                        .get(group.name())
                        .map_or(WallRule::ZeroGradient, |&s| WallRule::Prescribed(s)),
                    _ => WallRule::ZeroGradient,
                }
            })
            .collect()
    }

    /// Advance one step of size `duration / n_steps`.
    pub fn step(&mut self) -> Result<(), GodunovError> {
        if !self.prepared {
            self.prepare()?;
        }
        let dt = self.config.step_size();
        self.compute_fluxes();
        self.compute_derivatives();
        self.integrator.advance(&mut self.states, &self.derivatives, dt);
        self.steps_taken += 1;
        self.time += dt;
        Ok(())
    }

    fn compute_fluxes(&mut self) {
        let mesh = &self.mesh;
        let solvers = &self.solvers;
        let rules = &self.rules;
        let states = &self.states;
        let evaluate = |(w, flux): (usize, &mut R::State)| {
            *flux = wall_flux(mesh.wall(WallIndex::new(w)), &solvers[w], &rules[w], states);
        };

        #[cfg(feature = "parallel")]
        self.fluxes.par_iter_mut().enumerate().for_each(evaluate);
        #[cfg(not(feature = "parallel"))]
        self.fluxes.iter_mut().enumerate().for_each(evaluate);
    }

    fn compute_derivatives(&mut self) {
        let mesh = &self.mesh;
        let fluxes = &self.fluxes;
        let lengths = &self.lengths;
        let gather = |(c, du): (usize, &mut R::State)| {
            let cell = mesh.cell(CellIndex::new(c));
            let mut sum = R::State::default();
            // Sides are the ones recorded at cell creation; after periodic
            // stitching a cell can fill both slots of a wall.
            for (w, side) in cell.oriented_walls() {
                let flow = fluxes[w.get()] * lengths[w.get()];
                match side {
                    Side::Left => sum -= flow,
                    Side::Right => sum += flow,
                }
            }
            *du = sum / cell.measure();
        };

        #[cfg(feature = "parallel")]
        self.derivatives.par_iter_mut().enumerate().for_each(gather);
        #[cfg(not(feature = "parallel"))]
        self.derivatives.iter_mut().enumerate().for_each(gather);
    }

    /// Run `n_steps` steps, writing `<output_dir>/<step>.<extension>` at
    /// step 0 and every `refresh_rate` steps. Any write failure aborts the run.
    pub fn run(&mut self) -> Result<RunSummary, GodunovError> {
        self.prepare()?;
        let dir = self.config.output_dir.clone();
        std::fs::create_dir_all(&dir).map_err(|e| GodunovError::Output {
            path: dir.clone(),
            source: MeshIoError::Io(e),
        })?;

        let n_steps = self.config.n_steps;
        log::info!(
            "godunov run: {} steps of {:.3e} ({} order {}), output to {}",
            n_steps,
            self.config.step_size(),
            self.integrator.name(),
            self.integrator.order(),
            dir.display()
        );

        let start = Instant::now();
        let mut snapshots = 0;
        self.write_snapshot(&self.config.snapshot_path(0))?;
        snapshots += 1;

        for step in 1..=n_steps {
            self.step()?;
            if self.config.is_output_step(step) {
                self.write_snapshot(&self.config.snapshot_path(step))?;
                snapshots += 1;
            }
        }

        let wall_time = start.elapsed().as_secs_f64();
        log::info!(
            "godunov run complete: t = {:.4}, {} snapshots, {:.2}s",
            self.time,
            snapshots,
            wall_time
        );
        Ok(RunSummary {
            steps: n_steps,
            snapshots,
            final_time: self.time,
            wall_time,
        })
    }

    /// Write the current cell fields to `path`, in the format its extension names.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), GodunovError> {
        let output_error = |source| GodunovError::Output {
            path: path.to_path_buf(),
            source,
        };
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let format = SnapshotFormat::from_extension(extension).map_err(output_error)?;
        let fields = FieldData::from_cell_fields(
            self.states
                .iter()
                .map(|s| R::output_fields(&self.coefficients, s)),
        )
        .map_err(GodunovError::Fields)?
        .with_time(self.time);

        format
            .write_snapshot(path, &self.mesh, &fields)
            .map_err(|source| {
                log::error!("failed to write {}: {}", path.display(), source);
                output_error(source)
            })?;
        log::debug!("wrote {} at t = {:.4}", path.display(), self.time);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------------

    /// Σ u_c |c| over all cells.
    pub fn total_conserved(&self) -> R::State {
        diagnostics::total_conserved(&self.mesh, &self.states)
    }

    /// Net outward flux Σ F_w L_w through walls that are still on the
    /// boundary, from the last step.
    pub fn boundary_outflow(&self) -> R::State {
        diagnostics::boundary_outflow(&self.mesh, &self.fluxes)
    }
}

fn wall_flux<R: RiemannSolver>(
    wall: &Wall,
    solver: &R,
    rule: &WallRule<R::State>,
    states: &[R::State],
) -> R::State {
    let (left, right) = match (wall.left(), wall.right()) {
        (Some(l), Some(r)) => (states[l.get()], states[r.get()]),
        (Some(l), None) => {
            let inner = states[l.get()];
            (inner, ghost(solver, rule, &inner))
        }
        (None, Some(r)) => {
            let inner = states[r.get()];
            (ghost(solver, rule, &inner), inner)
        }
        (None, None) => unreachable!("orphan wall {} survived the topology check", wall.id()),
    };
    solver.flux_on_time_axis(&left, &right)
}

fn ghost<R: RiemannSolver>(solver: &R, rule: &WallRule<R::State>, inner: &R::State) -> R::State {
    match rule {
        WallRule::Solid => solver.solid_ghost(inner),
        WallRule::Prescribed(state) => *state,
        WallRule::Interior | WallRule::ZeroGradient => *inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryError;
    use crate::riemann::{Euler, IdealGas, LinearAdvection, Primitive, Scalar};
    use approx::assert_relative_eq;

    /// Two unit quads side by side along x.
    fn strip() -> Mesh2D {
        let mut mesh = Mesh2D::new();
        let coords = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)];
        for (id, (x, y)) in coords.into_iter().enumerate() {
            mesh.emplace_node(id, x, y).unwrap();
        }
        mesh.emplace_cell(0, &[0, 1, 4, 3]).unwrap();
        mesh.emplace_cell(1, &[1, 2, 5, 4]).unwrap();
        mesh
    }

    fn advection(velocity: Point2) -> Godunov<LinearAdvection> {
        let mut model = Godunov::from_mesh(strip(), velocity).unwrap();
        model.register_group("left", |w| w.center.x < 1e-9).unwrap();
        model.register_group("right", |w| w.center.x > 2.0 - 1e-9).unwrap();
        model
            .register_group("sides", |w| w.center.x > 1e-9 && w.center.x < 2.0 - 1e-9)
            .unwrap();
        model
    }

    #[test]
    fn test_setup_binds_every_wall() {
        let model = advection(Point2::new(1.0, 0.0));
        assert_eq!(model.solvers.len(), 7);
        assert_eq!(model.states().len(), 2);
        assert_eq!(model.registry().expected_boundary_walls(), 6);
        assert_relative_eq!(model.mesh().total_measure(), 2.0);
    }

    #[test]
    fn test_orphan_walls_never_reach_setup() {
        let mut mesh = strip();
        mesh.emplace_wall(0, 5).unwrap();
        let result = Godunov::<LinearAdvection>::from_mesh(mesh, Point2::new(1.0, 0.0));
        assert!(matches!(result, Err(GodunovError::Topology(_))));
    }

    #[test]
    #[should_panic(expected = "orphan wall")]
    fn test_flux_on_orphan_wall_panics() {
        let mut mesh = strip();
        let w = mesh.emplace_wall(0, 5).unwrap();
        let solver = LinearAdvection::bind(mesh.wall_normal(w), &Point2::new(1.0, 0.0));
        let states = [Scalar::from(1.0), Scalar::from(2.0)];
        let _ = wall_flux(mesh.wall(w), &solver, &WallRule::Interior, &states);
    }

    #[test]
    fn test_step_requires_classified_boundary() {
        let mut model = Godunov::<LinearAdvection>::from_mesh(strip(), Point2::new(1.0, 0.0)).unwrap();
        model.register_group("left", |w| w.center.x < 1e-9).unwrap();
        let err = model.step().unwrap_err();
        assert!(matches!(
            err,
            GodunovError::Configuration(BoundaryError::Coverage { registered: 1, expected: 6 })
        ));
        assert_eq!(model.steps_taken(), 0);
    }

    #[test]
    fn test_uniform_state_is_fixed_point() {
        let mut model = advection(Point2::new(0.3, -0.7));
        for name in ["left", "right", "sides"] {
            model.mark_free(name).unwrap();
        }
        model.set_initial_state(|_| Scalar::from(2.5));
        model.set_time_steps(1.0, 10, 10);
        for _ in 0..10 {
            model.step().unwrap();
        }
        for s in model.states() {
            assert_relative_eq!(s.value(), 2.5, epsilon = 1e-12);
        }
        assert_relative_eq!(model.time(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_upwind_step() {
        let mut model = advection(Point2::new(1.0, 0.0));
        for name in ["left", "right", "sides"] {
            model.mark_outlet(name).unwrap();
        }
        model.set_initial_state(|c| Scalar::from(if c.x < 1.0 { 1.0 } else { 0.0 }));
        model.set_time_steps(0.1, 1, 1);
        model.step().unwrap();

        let derivatives: Vec<f64> = model.derivatives().iter().map(|d| d.value()).collect();
        assert_relative_eq!(derivatives[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(derivatives[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(model.states()[0].value(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(model.states()[1].value(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_prescribed_inflow() {
        let mut model = advection(Point2::new(1.0, 0.0));
        model.set_inflow_state("left", Scalar::from(3.0)).unwrap();
        model.mark_outlet("right").unwrap();
        model.mark_solid("sides").unwrap();
        model.set_time_steps(0.1, 1, 1);
        model.step().unwrap();

        // Inflow 3 into an empty first cell; nothing leaves it yet.
        assert_relative_eq!(model.states()[0].value(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(model.states()[1].value(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closed_box_conserves_mass_and_energy() {
        let gas = IdealGas::default();
        let mut model = Godunov::<Euler>::from_mesh(strip(), gas).unwrap();
        model.register_group("all", |_| true).unwrap();
        model.mark_solid("all").unwrap();
        model.set_initial_state(|c| {
            gas.conserved(Primitive::new(1.0 + c.x, 0.3, -0.2, 1.0 + 0.5 * c.y))
        });
        model.set_time_steps(0.05, 5, 1);

        let before = model.total_conserved();
        for _ in 0..5 {
            model.step().unwrap();
        }
        let after = model.total_conserved();
        assert_relative_eq!(after[0], before[0], epsilon = 1e-10);
        assert_relative_eq!(after[3], before[3], epsilon = 1e-10);
    }

    #[test]
    fn test_conservation_balances_boundary_flux() {
        let mut model = advection(Point2::new(0.8, 0.2));
        model.set_inflow_state("left", Scalar::from(1.0)).unwrap();
        model.mark_outlet("right").unwrap();
        model.mark_free("sides").unwrap();
        model.set_initial_state(|c| Scalar::from(c.x * c.y));
        model.set_time_steps(0.2, 4, 1);

        for _ in 0..4 {
            let before = model.total_conserved().value();
            model.step().unwrap();
            let after = model.total_conserved().value();
            let expected = -model.boundary_outflow().value() * model.config().step_size();
            assert_relative_eq!(after - before, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_set_states_checks_length() {
        let mut model = advection(Point2::new(1.0, 0.0));
        let err = model.set_states(vec![Scalar::from(1.0)]).unwrap_err();
        assert!(matches!(err, GodunovError::StateLength { expected: 2, found: 1 }));
        model.set_states(vec![Scalar::from(1.0), Scalar::from(2.0)]).unwrap();
        assert_relative_eq!(model.state(CellIndex::new(1)).value(), 2.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut model = advection(Point2::new(1.0, 0.0));
        for name in ["left", "right", "sides"] {
            model.mark_free(name).unwrap();
        }
        model.set_time_steps(1.0, 0, 1);
        assert!(matches!(model.step(), Err(GodunovError::Config(_))));
    }
}
