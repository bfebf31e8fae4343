use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Ix1, Zip};

/// Evaluate the polynomial of `coefficients` `[m_0, ..., m_k]` (increasing powers)
/// at each of the given `x` samples using Horner's scheme.
pub fn evaluate<F: Float>(
    coefficients: &ArrayBase<impl Data<Elem = F> + Sync, Ix1>,
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Array1<F> {
    let mut d = Array1::zeros(x.len());
    Zip::from(&mut d).and(x).par_for_each(|di, &xi| {
        *di = coefficients
            .iter()
            .rev()
            .fold(F::zero(), |acc, &m| acc * xi + m);
    });
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_evaluate() {
        let x = array![-2., -1., 0., 1., 2.];
        let d = evaluate(&array![1., 0.25, 1.], &x);
        assert_abs_diff_eq!(d, array![4.5, 1.75, 1., 2.25, 5.5], epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate_constant_and_empty() {
        let x = array![3., 4.];
        assert_abs_diff_eq!(evaluate(&array![7.], &x), array![7., 7.]);
        assert_abs_diff_eq!(evaluate(&Array1::<f64>::zeros(0), &x), array![0., 0.]);
    }
}
