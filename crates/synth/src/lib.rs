/*!
This library generates synthetic samples `(x, d)` from a known polynomial
`d = m_0 + m_1.x + ... + m_k.x^k` plus a uniform random noise, to exercise
least-squares fitting with a known answer.

Example:
```
use lsqfit_synth::{SyntheticPolynomial, XSampling};
use ndarray::array;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// d = -2 + 0.25.x + x^2 sampled on 100 evenly spaced x in [-5, 5] with U[0, 5) noise
let synth = SyntheticPolynomial::new(array![-2.0, 0.25, 1.0])
    .with_rng(Xoshiro256Plus::seed_from_u64(42));
let (x, d) = synth.sample(100);
// or else with random x locations and a smaller noise
let (x, d) = synth.x_sampling(XSampling::Random).noise(0., 0.5).sample(100);
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod polynomial;
mod synthetic;

pub use polynomial::*;
pub use synthetic::*;
