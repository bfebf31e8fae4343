use std::path::Path;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use linfa::traits::Fit;
use log::info;
use lsqfit::plot::{TextPlot, CURVE_MARKER, SAMPLE_MARKER};
use lsqfit::poly::{metrics::r2_score, LstsqMethod, MonomialBasis, PolynomialFit};
use lsqfit::synth::{as_records, SyntheticPolynomial, XSampling};
use ndarray::Array1;
use ndarray_npy::write_npy;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    /// Singular value decomposition, minimum-norm when rank deficient
    Svd,
    /// QR decomposition, requires full column rank
    Qr,
    /// Cholesky factorization of the normal equations, requires full column rank
    Normal,
}

impl From<Method> for LstsqMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Svd => LstsqMethod::Svd,
            Method::Qr => LstsqMethod::Qr,
            Method::Normal => LstsqMethod::NormalEquations,
        }
    }
}

/// Fit a polynomial to noisy samples of a known polynomial
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of samples
    #[arg(short, long, default_value_t = 100)]
    n_samples: usize,
    /// Lower bound of x samples
    #[arg(long, default_value_t = -5., allow_negative_numbers = true)]
    xmin: f64,
    /// Upper bound of x samples
    #[arg(long, default_value_t = 5., allow_negative_numbers = true)]
    xmax: f64,
    /// True polynomial coefficients in increasing power order
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "-2,0.25,1",
        allow_negative_numbers = true
    )]
    coefficients: Vec<f64>,
    /// Lower bound of the uniform noise
    #[arg(long, default_value_t = 0., allow_negative_numbers = true)]
    noise_low: f64,
    /// Upper bound of the uniform noise
    #[arg(long, default_value_t = 5., allow_negative_numbers = true)]
    noise_high: f64,
    /// Degree of the fitted polynomial
    #[arg(short, long, default_value_t = 2)]
    degree: usize,
    /// Least-squares solver
    #[arg(short, long, value_enum, default_value_t = Method::Svd)]
    method: Method,
    /// Random generator seed, drawn from entropy when absent
    #[arg(short, long)]
    seed: Option<u64>,
    /// Draw x samples at random instead of evenly spaced
    #[arg(long)]
    random_x: bool,
    /// Directory where x.npy, d.npy and d_pre.npy are written
    #[arg(short, long)]
    outdir: Option<String>,
    /// Text plot width
    #[arg(long, default_value_t = 72)]
    width: usize,
    /// Text plot height
    #[arg(long, default_value_t = 24)]
    height: usize,
}

fn main() -> Result<()> {
    let env = env_logger::Env::new().filter_or("LSQFIT_LOG", "info");
    let mut builder = env_logger::Builder::from_env(env);
    let builder = builder.target(env_logger::Target::Stdout);
    builder.try_init().ok();

    let args = Args::parse();
    if args.xmin > args.xmax {
        bail!("xmin ({}) should not be greater than xmax ({})", args.xmin, args.xmax);
    }
    if args.noise_low > args.noise_high {
        bail!(
            "noise-low ({}) should not be greater than noise-high ({})",
            args.noise_low,
            args.noise_high
        );
    }

    let rng = match args.seed {
        Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
        None => Xoshiro256Plus::from_entropy(),
    };
    let x_sampling = if args.random_x {
        XSampling::Random
    } else {
        XSampling::Grid
    };
    let synth = SyntheticPolynomial::new_with_rng(Array1::from_vec(args.coefficients), rng)
        .xlimits(args.xmin, args.xmax)
        .noise(args.noise_low, args.noise_high)
        .x_sampling(x_sampling);

    info!(
        "Sampling {} points in [{}, {}] with noise U[{}, {})",
        args.n_samples, args.xmin, args.xmax, args.noise_low, args.noise_high
    );
    let dataset = synth.sample_dataset(args.n_samples);
    let x = dataset.records().column(0).to_owned();
    let d = dataset.targets().to_owned();

    let method = LstsqMethod::from(args.method);
    info!("Fitting degree {} polynomial with {} solver", args.degree, method);
    let model = PolynomialFit::<f64, MonomialBasis>::params(MonomialBasis(args.degree))
        .method(method)
        .fit(&dataset)?;

    println!("true coefficients      = {}", synth.coefficients());
    println!("estimated coefficients = {}", model.coefficients());
    println!(
        "rank = {}, rcond = {:e}, singular values = {}",
        model.rank(),
        model.rcond(),
        model.singular_values()
    );
    println!(
        "rss = {:.6}, r2 = {:.6}",
        model.residual_sum_of_squares(),
        r2_score(&d, model.fitted_values())
    );

    if let Some(outdir) = &args.outdir {
        let outdir = Path::new(outdir);
        std::fs::create_dir_all(outdir)?;
        write_npy(outdir.join("x.npy"), &x)?;
        write_npy(outdir.join("d.npy"), &d)?;
        write_npy(outdir.join("d_pre.npy"), model.fitted_values())?;
        info!("Samples and fitted values written in {}", outdir.display());
    }

    let xlim = (args.xmin - 1., args.xmax + 1.);
    let xcurve = Array1::linspace(xlim.0, xlim.1, 4 * args.width.max(2));
    let dcurve = model.predict(&as_records(&xcurve))?;
    let mut plot = TextPlot::fitting(args.width, args.height, xlim, [&d, &dcurve]);
    plot.draw(&xcurve, &dcurve, CURVE_MARKER);
    plot.draw(&x, &d, SAMPLE_MARKER);
    print!("{}", plot.render());

    let residuals = model.residuals();
    info!(
        "Residuals in [{:.4}, {:.4}]",
        residuals.fold(f64::INFINITY, |a, &b| a.min(b)),
        residuals.fold(f64::NEG_INFINITY, |a, &b| a.max(b))
    );
    Ok(())
}
