//! Text rendering of samples and fitted curves for terminals.

use ndarray::{ArrayBase, Data, Ix1};

/// Marker of observed samples
pub const SAMPLE_MARKER: char = 'o';
/// Marker of the fitted curve
pub const CURVE_MARKER: char = '*';

/// A character canvas mapping the rectangle `[xmin, xmax] x [ymin, ymax]`
/// onto `width` columns and `height` rows.
#[derive(Debug, Clone)]
pub struct TextPlot {
    width: usize,
    height: usize,
    xlim: (f64, f64),
    ylim: (f64, f64),
    cells: Vec<Vec<char>>,
}

impl TextPlot {
    /// Blank canvas. Degenerate limits are widened by one unit on each side.
    pub fn new(width: usize, height: usize, xlim: (f64, f64), ylim: (f64, f64)) -> Self {
        let width = width.max(2);
        let height = height.max(2);
        TextPlot {
            width,
            height,
            xlim: widen(xlim),
            ylim: widen(ylim),
            cells: vec![vec![' '; width]; height],
        }
    }

    /// Canvas fitting the given `y` series over `xlim`
    pub fn fitting<'a, S: Data<Elem = f64> + 'a>(
        width: usize,
        height: usize,
        xlim: (f64, f64),
        ys: impl IntoIterator<Item = &'a ArrayBase<S, Ix1>>,
    ) -> Self {
        let ylim = ys
            .into_iter()
            .flat_map(|y| y.iter().copied())
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let ylim = if ylim.0 > ylim.1 { (0., 0.) } else { ylim };
        Self::new(width, height, xlim, ylim)
    }

    /// Draw points `(x_i, y_i)` with `marker`, points out of the canvas are skipped
    pub fn draw(
        &mut self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix1>,
        y: &ArrayBase<impl Data<Elem = f64>, Ix1>,
        marker: char,
    ) {
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            if let Some((row, col)) = self.cell(xi, yi) {
                self.cells[row][col] = marker;
            }
        }
    }

    fn cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (x0, x1) = self.xlim;
        let (y0, y1) = self.ylim;
        if !(x0..=x1).contains(&x) || !(y0..=y1).contains(&y) {
            return None;
        }
        let col = ((x - x0) / (x1 - x0) * (self.width - 1) as f64).round() as usize;
        let row = ((y1 - y) / (y1 - y0) * (self.height - 1) as f64).round() as usize;
        Some((row, col))
    }

    /// Render canvas with a left y axis labelled by its limits and a bottom x axis
    pub fn render(&self) -> String {
        let top = format!("{:>10.2}", self.ylim.1);
        let bottom = format!("{:>10.2}", self.ylim.0);
        let blank = " ".repeat(top.len());
        let mut out = String::new();
        for (i, row) in self.cells.iter().enumerate() {
            let label = match i {
                0 => &top,
                i if i == self.height - 1 => &bottom,
                _ => &blank,
            };
            out.push_str(label);
            out.push_str(" |");
            out.extend(row.iter());
            out.push('\n');
        }
        out.push_str(&blank);
        out.push_str(" +");
        out.push_str(&"-".repeat(self.width));
        out.push('\n');
        let xlabels = format!("{:<.2}", self.xlim.0);
        let xlabel_right = format!("{:>.2}", self.xlim.1);
        let pad = self.width.saturating_sub(xlabels.len() + xlabel_right.len());
        out.push_str(&blank);
        out.push_str("  ");
        out.push_str(&xlabels);
        out.push_str(&" ".repeat(pad));
        out.push_str(&xlabel_right);
        out.push('\n');
        out
    }
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 1., hi + 1.)
    }
}
