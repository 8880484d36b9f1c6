//! Result sink port.

use std::path::Path;

use crate::domain::error::StocksimError;
use crate::domain::simulation::SimulationResult;
use crate::domain::summary::AnalysisReport;

/// Port for persisting simulation and analysis results.
pub trait ReportPort {
    fn write_simulation(
        &self,
        ticker: &str,
        result: &SimulationResult,
        output_path: &Path,
    ) -> Result<(), StocksimError>;

    fn write_analysis(
        &self,
        report: &AnalysisReport,
        output_path: &Path,
    ) -> Result<(), StocksimError>;
}
