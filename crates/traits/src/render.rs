//! Rendering sink trait.

use lintner_primitives::Date;

/// Consumer of pipeline output.
///
/// A renderer is a pure sink: nothing it does feeds back into the analysis.
pub trait Renderer {
    /// Render a dated numeric series (prices, returns, residuals, hat values).
    fn series(&mut self, title: &str, dates: &[Date], values: &[f64]);

    /// Render a block of preformatted text, such as a regression summary.
    fn text(&mut self, title: &str, body: &str);
}
