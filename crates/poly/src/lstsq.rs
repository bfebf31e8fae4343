//! Dense linear least-squares solvers.
//!
//! Given a (n, m) matrix `G` and a (n,) vector `d`, find `m` minimizing `||G.m - d||_2`.
//!
//! * [LstsqMethod::Svd] computes the pseudo-inverse of `G` from its singular value
//!   decomposition. Singular values below `rcond * max(singular values)` are discarded,
//!   which gives the minimum-norm solution when `G` is rank deficient.
//! * [LstsqMethod::Qr] uses a thin QR decomposition of `G` and a back substitution.
//! * [LstsqMethod::NormalEquations] solves `G^T.G.m = G^T.d` with a Cholesky decomposition.
//!   It is the cheapest for a few parameters but squares the condition number of `G`,
//!   so precision degrades quickly when columns are close to collinear.
//!
//! QR and normal equations require `G` to have full column rank.

use crate::errors::{PolyFitError, Result};
use linfa::Float;
use linfa_linalg::{cholesky::*, qr::*, svd::*, triangular::*};
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use std::cmp::Ordering;
use std::fmt;

/// Dense least-squares solver methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LstsqMethod {
    /// Pseudo-inverse from singular value decomposition
    #[default]
    Svd,
    /// Thin QR decomposition
    Qr,
    /// Cholesky decomposition of the normal equations
    NormalEquations,
}

impl fmt::Display for LstsqMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LstsqMethod::Svd => "SVD",
            LstsqMethod::Qr => "QR",
            LstsqMethod::NormalEquations => "NormalEquations",
        };
        write!(f, "{}", name)
    }
}

/// Least-squares solution and diagnostics of the design matrix
#[derive(Clone, Debug)]
pub struct LstsqSolution<F: Float> {
    /// Solution vector (m,)
    pub solution: Array1<F>,
    /// Effective rank of the matrix
    pub rank: usize,
    /// Singular values of the matrix sorted in descending order
    pub singular_values: Array1<F>,
}

/// Solve the least-squares problem `min ||g.m - d||_2` with the given `method`.
///
/// `rcond` is the relative cutoff used to compute the rank of `g`.
pub fn lstsq<F: Float>(
    g: &ArrayBase<impl Data<Elem = F>, Ix2>,
    d: &ArrayBase<impl Data<Elem = F>, Ix1>,
    method: LstsqMethod,
    rcond: F,
) -> Result<LstsqSolution<F>> {
    if g.nrows() != d.len() {
        return Err(PolyFitError::InvalidInputError(format!(
            "matrix has {} rows but right hand side has {} values",
            g.nrows(),
            d.len()
        )));
    }
    debug!(
        "Least squares {} on ({}, {}) matrix with rcond={}",
        method,
        g.nrows(),
        g.ncols(),
        rcond
    );
    match method {
        LstsqMethod::Svd => lstsq_svd(g, d, rcond),
        LstsqMethod::Qr => {
            let (rank, singular_values) = rank(g, rcond)?;
            check_full_rank(rank, g.ncols())?;
            let (q, r) = g.qr()?.into_decomp();
            let qtd = q.t().dot(d).insert_axis(Axis(1));
            let solution = r.solve_triangular(&qtd, UPLO::Upper)?;
            Ok(LstsqSolution {
                solution: solution.remove_axis(Axis(1)),
                rank,
                singular_values,
            })
        }
        LstsqMethod::NormalEquations => {
            let (rank, singular_values) = rank(g, rcond)?;
            check_full_rank(rank, g.ncols())?;
            let gtg = g.t().dot(g);
            let gtd = g.t().dot(d).insert_axis(Axis(1));
            let l = gtg.cholesky()?;
            let y = l.solve_triangular(&gtd, UPLO::Lower)?;
            let solution = l.t().solve_triangular(&y, UPLO::Upper)?;
            Ok(LstsqSolution {
                solution: solution.remove_axis(Axis(1)),
                rank,
                singular_values,
            })
        }
    }
}

/// Singular values of `g` sorted in descending order
pub fn singular_values<F: Float>(
    g: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Result<Array1<F>> {
    // factorize the tall orientation, singular values are the same
    let (_, s, _) = if g.nrows() >= g.ncols() {
        g.svd(false, false)?
    } else {
        g.t().svd(false, false)?
    };
    Ok(sorted_desc(s))
}

/// Effective rank of `g` given the relative cutoff `rcond`, along with its singular values
pub fn rank<F: Float>(
    g: &ArrayBase<impl Data<Elem = F>, Ix2>,
    rcond: F,
) -> Result<(usize, Array1<F>)> {
    let s = singular_values(g)?;
    let tol = cutoff(&s, rcond);
    let rank = s.iter().filter(|&&v| v > tol).count();
    Ok((rank, s))
}

fn lstsq_svd<F: Float>(
    g: &ArrayBase<impl Data<Elem = F>, Ix2>,
    d: &ArrayBase<impl Data<Elem = F>, Ix1>,
    rcond: F,
) -> Result<LstsqSolution<F>> {
    let missing = || PolyFitError::LstsqComputationError("missing SVD factors".into());
    // u: (n, k) left singular vectors, v: (m, k) right singular vectors
    let (u, s, v): (Array2<F>, Array1<F>, Array2<F>) = if g.nrows() >= g.ncols() {
        let (u, s, vt) = g.svd(true, true)?;
        (u.ok_or_else(missing)?, s, vt.ok_or_else(missing)?.reversed_axes())
    } else {
        // g^T = u'.s.vt' hence g = vt'^T.s.u'^T
        let (ut, s, vtt) = g.t().svd(true, true)?;
        (vtt.ok_or_else(missing)?.reversed_axes(), s, ut.ok_or_else(missing)?)
    };

    let tol = cutoff(&s, rcond);
    let mut solution = Array1::<F>::zeros(g.ncols());
    let mut rank = 0;
    for (i, &si) in s.iter().enumerate() {
        if si > tol {
            rank += 1;
            let w = u.column(i).dot(d) / si;
            solution.scaled_add(w, &v.column(i));
        }
    }
    Ok(LstsqSolution {
        solution,
        rank,
        singular_values: sorted_desc(s),
    })
}

fn check_full_rank(rank: usize, n_params: usize) -> Result<()> {
    if rank < n_params {
        return Err(PolyFitError::RankDeficiencyError { rank, n_params });
    }
    Ok(())
}

fn cutoff<F: Float>(s: &Array1<F>, rcond: F) -> F {
    let smax = s.iter().fold(F::zero(), |acc, &v| if v > acc { v } else { acc });
    rcond * smax
}

fn sorted_desc<F: Float>(s: Array1<F>) -> Array1<F> {
    let mut values = s.to_vec();
    values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    Array1::from_vec(values)
}
