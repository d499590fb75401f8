//! Kernel of the direct minimization: orthogonalization, densities, Poisson solver,
//! Hamiltonian action, energy gradient and initial guesses.
#![allow(non_snake_case)]

use crate::error::{Result, ScfError};
use crate::scf_impl::Scf;
use nalgebra::linalg::SymmetricEigen;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use pwbasis::helper::{diagprod_c, field, pseudo_uniform};
use pwbasis::operators::{Idag, Jdag, Linv, I, J, L, O};
use pwbasis::Cell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Eigendecomposition of a Hermitian matrix, eigenvalues in ascending order.
pub fn eigh(m: &DMatrix<Complex64>) -> (DVector<f64>, DMatrix<Complex64>) {
    // symmetrize to drop round-off in the upper triangle
    let herm = (m + m.adjoint()).map(|z| z * 0.5);
    let eig = SymmetricEigen::new(herm);
    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    let values = DVector::from_iterator(order.len(), order.iter().map(|&i| eig.eigenvalues[i]));
    let vectors = eig.eigenvectors.select_columns(order.iter());
    (values, vectors)
}

/// `U^p` of a Hermitian positive-definite matrix.
pub fn hermitian_power(u: &DMatrix<Complex64>, p: f64) -> DMatrix<Complex64> {
    let (mu, v) = eigh(u);
    let scaled = DMatrix::from_diagonal(&mu.map(|m| Complex64::new(m.powf(p), 0.0)));
    &v * scaled * v.adjoint()
}

/// Orthonormalize `W` with respect to the overlap operator, `W (W^H O(W))^(-1/2)`.
pub fn orth(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let u = W.adjoint() * O(cell, W);
    W * hermitian_power(&u, -0.5)
}

pub fn orth_all(cell: &Cell, W: &[DMatrix<Complex64>]) -> Vec<DMatrix<Complex64>> {
    W.iter().map(|w| orth(cell, w)).collect()
}

/// Occupation-weighted densities of every state, one `Npoints x Ns` matrix per spin.
pub fn get_n_single(cell: &Cell, f: &[DVector<f64>], Y: &[DMatrix<Complex64>]) -> Vec<DMatrix<f64>> {
    f.iter()
        .zip(Y.iter())
        .map(|(fs, ys)| {
            let yrs = I(cell, ys);
            DMatrix::from_fn(yrs.nrows(), yrs.ncols(), |r, i| fs[i] * yrs[(r, i)].norm_sqr())
        })
        .collect()
}

/// Electronic density per spin channel.
pub fn get_n_spin(cell: &Cell, f: &[DVector<f64>], Y: &[DMatrix<Complex64>]) -> Vec<DVector<f64>> {
    get_n_single(cell, f, Y)
        .iter()
        .map(|ns| DVector::from_iterator(ns.nrows(), ns.row_iter().map(|row| row.sum())))
        .collect()
}

/// Total electronic density `sum_spin sum_i f_i |I(Y_i)|^2`.
pub fn get_n_total(cell: &Cell, f: &[DVector<f64>], Y: &[DMatrix<Complex64>]) -> DVector<f64> {
    let mut n = DVector::zeros(cell.n_points());
    for ns in get_n_spin(cell, f, Y) {
        n += ns;
    }
    n
}

/// Hartree field in reciprocal space, `phi = -4 pi Linv(O(J(n)))`.
pub fn solve_poisson(cell: &Cell, n: &DVector<f64>) -> DMatrix<Complex64> {
    Linv(cell, &O(cell, &J(cell, &field(n), true))).map(|z| z * (-4.0 * PI))
}

/// Quantities shared by the energy and the gradient at one point `W`.
#[derive(Debug, Clone)]
pub struct Precomputed {
    pub y: Vec<DMatrix<Complex64>>,
    pub n: DVector<f64>,
    pub n_spin: Vec<DVector<f64>>,
    pub phi: DMatrix<Complex64>,
    pub exc: DVector<f64>,
    pub vxc: Vec<DVector<f64>>,
}

/// Evaluate everything that depends on `W` only once per step.
pub fn precompute(scf: &Scf, W: &[DMatrix<Complex64>]) -> Result<Precomputed> {
    let cell = &scf.system.cell;
    let y = orth_all(cell, W);
    let n_spin = get_n_spin(cell, &scf.system.f, &y);
    let mut n = DVector::zeros(cell.n_points());
    for ns in &n_spin {
        n += ns;
    }
    with_density(scf, y, n, n_spin)
}

fn with_density(
    scf: &Scf,
    y: Vec<DMatrix<Complex64>>,
    n: DVector<f64>,
    n_spin: Vec<DVector<f64>>,
) -> Result<Precomputed> {
    let phi = solve_poisson(&scf.system.cell, &n);
    let (exc, vxc) = scf.xc.get_xc(&n_spin)?;
    Ok(Precomputed {
        y,
        n,
        n_spin,
        phi,
        exc,
        vxc,
    })
}

/// Hamiltonian applied on the coefficients `W` of spin channel `spin`.
///
/// `H(W) = -1/2 L(W) + Idag(Veff I(W)) + Vnl(W)` with
/// `Veff = Vloc + Jdag(O(J(vxc))) + Jdag(O(phi))`. The functional already returns the full
/// potential `vxc = exc + n exc'`.
pub fn H(scf: &Scf, spin: usize, W: &DMatrix<Complex64>, pre: &Precomputed) -> DMatrix<Complex64> {
    let cell = &scf.system.cell;
    let vxc = Jdag(cell, &O(cell, &J(cell, &field(&pre.vxc[spin]), true)));
    let vh = Jdag(cell, &O(cell, &pre.phi));
    let veff = DVector::from_fn(cell.n_points(), |r, _| {
        scf.vloc[r] + vxc[(r, 0)] + vh[(r, 0)]
    });

    let kinetic = L(cell, W).map(|z| z * -0.5);
    let potential = Idag(cell, &diagprod_c(&veff, &I(cell, W)));
    let nonlocal = scf.nonlocal.apply(cell.omega, W);
    kinetic + potential + nonlocal
}

/// `V ((V^H inp V) / (sqrt(mu_i) + sqrt(mu_j))) V^H` with `U = V diag(mu) V^H`.
pub fn Q(inp: &DMatrix<Complex64>, U: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let (mu, v) = eigh(U);
    let sqrt_mu = mu.map(f64::sqrt);
    let n = mu.len();
    let denom = DMatrix::from_fn(n, n, |i, j| Complex64::new(sqrt_mu[i] + sqrt_mu[j], 0.0));
    let projected = v.adjoint() * inp * &v;
    &v * projected.component_div(&denom) * v.adjoint()
}

/// Gradient of the total energy with respect to `W[spin]`.
pub fn get_grad(
    scf: &Scf,
    spin: usize,
    W: &[DMatrix<Complex64>],
    pre: &Precomputed,
) -> DMatrix<Complex64> {
    let cell = &scf.system.cell;
    let w = &W[spin];
    let f = DMatrix::from_diagonal(&scf.system.f[spin].map(|x| Complex64::new(x, 0.0)));

    let hw = H(scf, spin, w, pre);
    let whw = w.adjoint() * &hw;
    let ow = O(cell, w);
    let u = w.adjoint() * &ow;
    let inv_u = hermitian_power(&u, -1.0);
    let u12 = hermitian_power(&u, -0.5);
    let ht = &u12 * &whw * &u12;

    let first = (&hw - &ow * &inv_u * &whw) * (&u12 * &f * &u12);
    let commutator = &ht * &f - &f * &ht;
    let second = &ow * (&u12 * Q(&commutator, &u));
    first + second
}

/// Kohn-Sham orbitals: eigenvectors of the subspace Hamiltonian `Y^H H(Y)`.
///
/// With `n` the Hamiltonian is built from that density instead of the one of `W`.
pub fn get_psi(
    scf: &Scf,
    W: &[DMatrix<Complex64>],
    n: Option<&DVector<f64>>,
) -> Result<Vec<DMatrix<Complex64>>> {
    let (pre, mus) = subspace_hamiltonians(scf, W, n)?;
    Ok(pre
        .y
        .iter()
        .zip(mus.iter())
        .map(|(y, mu)| y * eigh(mu).1)
        .collect())
}

/// Sorted Kohn-Sham eigenvalues per spin channel.
pub fn get_epsilon(
    scf: &Scf,
    W: &[DMatrix<Complex64>],
    n: Option<&DVector<f64>>,
) -> Result<Vec<DVector<f64>>> {
    let (_, mus) = subspace_hamiltonians(scf, W, n)?;
    Ok(mus.iter().map(|mu| eigh(mu).0).collect())
}

fn subspace_hamiltonians(
    scf: &Scf,
    W: &[DMatrix<Complex64>],
    n: Option<&DVector<f64>>,
) -> Result<(Precomputed, Vec<DMatrix<Complex64>>)> {
    let pre = match n {
        None => precompute(scf, W)?,
        Some(n) => {
            let cell = &scf.system.cell;
            let y = orth_all(cell, W);
            let n_spin = if scf.system.nspin == 1 {
                vec![n.clone()]
            } else {
                get_n_spin(cell, &scf.system.f, &y)
            };
            with_density(scf, y, n.clone(), n_spin)?
        }
    };
    let mus = (0..scf.system.nspin)
        .map(|spin| pre.y[spin].adjoint() * H(scf, spin, &pre.y[spin], &pre))
        .collect();
    Ok((pre, mus))
}

/// Initial guess of the expansion coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Guess {
    /// Eigenstates of the Hamiltonian of superimposed Gaussian densities
    #[default]
    Gaussian,
    /// Complex standard-normal coefficients from a seeded generator
    Random,
    /// Platform-independent Lehmer sequence
    Pseudo,
}

impl FromStr for Guess {
    type Err = ScfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gauss" | "gaussian" => Ok(Self::Gaussian),
            "rand" | "random" => Ok(Self::Random),
            "pseudo" => Ok(Self::Pseudo),
            _ => Err(ScfError::UnknownGuess(s.to_string())),
        }
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gaussian => "gaussian",
            Self::Random => "random",
            Self::Pseudo => "pseudo",
        };
        write!(f, "{}", name)
    }
}

impl Guess {
    /// Orthogonal starting coefficients for every spin channel.
    pub fn init(&self, scf: &Scf) -> Result<Vec<DMatrix<Complex64>>> {
        match self {
            Self::Gaussian => guess_gaussian(scf),
            Self::Random => Ok(guess_random(scf, 42)),
            Self::Pseudo => Ok(guess_pseudo(scf, 1234)),
        }
    }
}

pub fn guess_random(scf: &Scf, seed: u64) -> Vec<DMatrix<Complex64>> {
    let cell = &scf.system.cell;
    let mut rng = StdRng::seed_from_u64(seed);
    let W: Vec<DMatrix<Complex64>> = (0..scf.system.nspin)
        .map(|_| {
            DMatrix::from_fn(cell.n_active(), scf.system.ns, |_, _| {
                let re: f64 = StandardNormal.sample(&mut rng);
                let im: f64 = StandardNormal.sample(&mut rng);
                Complex64::new(re, im)
            })
        })
        .collect();
    orth_all(cell, &W)
}

pub fn guess_pseudo(scf: &Scf, seed: u64) -> Vec<DMatrix<Complex64>> {
    let cell = &scf.system.cell;
    let W = pseudo_uniform(scf.system.nspin, cell.n_active(), scf.system.ns, seed);
    orth_all(cell, &W)
}

pub fn guess_gaussian(scf: &Scf) -> Result<Vec<DMatrix<Complex64>>> {
    let cell = &scf.system.cell;
    let W = guess_random(scf, 42);
    let sigma: f64 = 0.5;
    let normal = (2.0 * PI * sigma * sigma).powf(1.5);
    let mut n = DVector::zeros(cell.n_points());
    for (xa, za) in cell.x.iter().zip(scf.system.z.iter()) {
        for (i, r) in cell.r.iter().enumerate() {
            n[i] += za * (-(r - xa).norm_squared() / (2.0 * sigma * sigma)).exp() / normal;
        }
    }
    get_psi(scf, &W, Some(&n))
}
