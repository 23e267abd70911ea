//! Spectral Poisson solve against closed-form periodic solutions.

use std::f64::consts::PI;

use nalgebra::DVector;
use vs_grid::{Grid, WavenumberMesh};
use vs_solver::{SpectralPoisson, VorticityRhs};

fn demean(v: &DVector<f64>) -> DVector<f64> {
    v.add_scalar(-v.mean())
}

#[test]
fn spectral_solution_matches_analytic_stream_function() {
    let endpt = 10.0;
    let grid = Grid::new(32, endpt).unwrap();
    let mesh = WavenumberMesh::build(&grid, 1e-6).unwrap();
    let poisson = SpectralPoisson::new(&grid, &mesh).unwrap();

    // Resolved periodic modes: wavenumber m * pi / endpt.
    let a = 2.0 * PI / endpt;
    let b = 3.0 * PI / endpt;
    let c = PI / endpt;

    let omega = grid.sample(|x, y| (a * x).cos() * (b * y).sin() + 0.5 * (c * x).sin());
    // Each Fourier component is divided by -(k^2).
    let expected =
        grid.sample(|x, y| -(a * x).cos() * (b * y).sin() / (a * a + b * b) - 0.5 * (c * x).sin() / (c * c));

    let psi = poisson.solve(&omega).unwrap();
    let err = (demean(&psi) - demean(&expected)).amax();
    assert!(err < 1e-6, "max error {err}");
}

#[test]
fn spectral_laplacian_of_solution_recovers_vorticity() {
    let endpt = PI;
    let grid = Grid::new(16, endpt).unwrap();
    let mesh = WavenumberMesh::build(&grid, 1e-6).unwrap();
    let poisson = SpectralPoisson::new(&grid, &mesh).unwrap();

    // Single mode sin(2x) sin(y): k^2 = 5, so psi = -omega / 5 and
    // the continuous Laplacian of psi returns omega.
    let omega = grid.sample(|x, y| (2.0 * x).sin() * y.sin());
    let psi = poisson.solve(&omega).unwrap();
    let lap_psi = demean(&psi) * -5.0;
    assert!((lap_psi - &omega).amax() < 1e-9);
}

#[test]
fn single_mode_has_no_self_advection() {
    let endpt = PI;
    let grid = Grid::new(16, endpt).unwrap();
    let nu = 0.01;
    let rhs = VorticityRhs::new(&grid, nu, 1e-6).unwrap();

    // psi is proportional to omega up to a constant, so J(psi, omega) vanishes.
    let omega = grid.sample(|x, y| x.cos() * (3.0 * y).cos());
    let psi = rhs.stream_function(&omega).unwrap();
    let j = rhs.jacobian(&psi, &omega).unwrap();
    assert!(j.amax() < 1e-9, "advection {}", j.amax());

    let d = rhs.evaluate(&omega).unwrap();
    let diffusion = rhs.diffusion(&omega).unwrap();
    assert!((d - diffusion).amax() < 1e-9);
}
