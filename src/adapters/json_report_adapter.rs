//! JSON report adapter implementing ReportPort.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::error::StocksimError;
use crate::domain::simulation::SimulationResult;
use crate::domain::summary::AnalysisReport;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct SimulationDocument<'a> {
    ticker: &'a str,
    #[serde(flatten)]
    result: &'a SimulationResult,
    trade_count: usize,
    excess_return: f64,
}

/// Writes results as pretty-printed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_json<T: Serialize>(value: &T, output_path: &Path) -> Result<(), StocksimError> {
        let file = File::create(output_path).map_err(|e| StocksimError::Report {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| StocksimError::Report {
            reason: format!("failed to serialize report: {e}"),
        })?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %output_path.display(), "report written");
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_simulation(
        &self,
        ticker: &str,
        result: &SimulationResult,
        output_path: &Path,
    ) -> Result<(), StocksimError> {
        let document = SimulationDocument {
            ticker,
            result,
            trade_count: result.trade_count(),
            excess_return: result.excess_return(),
        };
        Self::write_json(&document, output_path)
    }

    fn write_analysis(
        &self,
        report: &AnalysisReport,
        output_path: &Path,
    ) -> Result<(), StocksimError> {
        Self::write_json(report, output_path)
    }
}
