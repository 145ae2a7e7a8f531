//! Plain-text console output.

use lintner::{primitives::Date, traits::Renderer};

/// Prints summaries in full and series as one-line statistics.
#[derive(Default)]
pub(crate) struct ConsoleRenderer {
    sections: usize,
}

impl ConsoleRenderer {
    fn heading(&mut self, title: &str) {
        if self.sections > 0 {
            println!();
        }
        self.sections += 1;
        println!("=== {title} ===");
    }
}

impl Renderer for ConsoleRenderer {
    fn series(&mut self, title: &str, dates: &[Date], values: &[f64]) {
        let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
            println!("{title:<32} (empty)");
            return;
        };
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!(
            "{title:<32} {first} .. {last}  n = {:<5} mean = {mean:>12.6}  min = {min:>12.6}  max = {max:>12.6}",
            values.len()
        );
    }

    fn text(&mut self, title: &str, body: &str) {
        self.heading(title);
        println!("{body}");
    }
}
