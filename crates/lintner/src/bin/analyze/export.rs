//! CSV export of pipeline results.

use std::{fs::File, path::Path};

use lintner::{
    model::{FactorModel, InfluenceReport, PipelineReport},
    primitives::Date,
};
use polars::prelude::*;

fn date_column(dates: &[Date]) -> Column {
    let text: Vec<String> = dates.iter().map(ToString::to_string).collect();
    Column::new("date".into(), text)
}

fn write_csv(dir: &Path, file: &str, mut df: DataFrame) -> PolarsResult<()> {
    let mut out = File::create(dir.join(file))?;
    CsvWriter::new(&mut out).include_header(true).finish(&mut df)?;
    tracing::debug!(file, rows = df.height(), "wrote CSV export");
    Ok(())
}

fn influence_frame(model: &FactorModel, influence: &InfluenceReport) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        date_column(&influence.dates),
        Column::new("residual".into(), model.residuals().to_vec()),
        Column::new("fitted".into(), model.fitted().to_vec()),
        Column::new("hat".into(), influence.hat.to_vec()),
        Column::new("cooks_distance".into(), influence.cooks_distance.to_vec()),
        Column::new("studentized".into(), influence.studentized.to_vec()),
    ])
}

/// Write the aligned prices, excess returns and influence measures of
/// `report` as CSV files into `dir`.
pub(crate) fn write_report(report: &PipelineReport, dir: &Path) -> PolarsResult<()> {
    std::fs::create_dir_all(dir)?;

    let mut prices = vec![date_column(report.table.dates())];
    prices.extend(
        report.table.columns().map(|(name, values)| Column::new(name.into(), values.to_vec())),
    );
    write_csv(dir, "aligned_prices.csv", DataFrame::new(prices)?)?;

    let mut returns = vec![
        date_column(&report.excess.dates),
        Column::new("risk_free".into(), report.excess.risk_free.values.to_vec()),
    ];
    returns.extend(
        report
            .excess
            .series
            .iter()
            .map(|s| Column::new(s.name.as_str().into(), s.values.to_vec())),
    );
    write_csv(dir, "excess_returns.csv", DataFrame::new(returns)?)?;

    write_csv(
        dir,
        "influence_single_factor.csv",
        influence_frame(&report.capm, &report.capm_diagnostics.influence)?,
    )?;
    if let (Some(apt), Some(diagnostics)) = (&report.apt, &report.apt_diagnostics) {
        write_csv(
            dir,
            "influence_multi_factor.csv",
            influence_frame(apt, &diagnostics.influence)?,
        )?;
    }
    Ok(())
}
