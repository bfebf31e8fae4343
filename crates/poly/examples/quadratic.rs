use linfa::prelude::*;
use lsqfit_poly::{LstsqMethod, QuadraticFit};
use ndarray::{arr1, arr2, Array, Axis};

fn main() {
    let xtrain = arr2(&[[-5.0], [-2.5], [0.0], [2.5], [5.0]]);
    let dtrain = arr1(&[21.0, 6.0, 0.5, 4.7, 25.0]);

    let model = QuadraticFit::params()
        .method(LstsqMethod::Qr)
        .fit(&Dataset::new(xtrain, dtrain))
        .expect("Quadratic fitted");
    println!("{}", model);

    let xtest = Array::linspace(-6., 6., 100).insert_axis(Axis(1));
    let _dtest = model.predict(&xtest).expect("Quadratic prediction");
}
