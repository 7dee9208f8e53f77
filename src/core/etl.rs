use crate::core::Pipeline;
use crate::domain::model::SkippedFile;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was loaded, so the database was never contacted.
    NoData,
    Inserted(u64),
    /// The insert failed and nothing was committed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub files_matched: usize,
    pub files_loaded: usize,
    pub files_skipped: Vec<SkippedFile>,
    pub rows_combined: usize,
    pub outcome: LoadOutcome,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs load, aggregate and insert in sequence.
    ///
    /// Bad files and database failures are logged and reported in the
    /// returned [`RunReport`]; only errors that stop the input folder from
    /// being scanned at all are returned as `Err`.
    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting ETL process...");
        self.monitor.log_stats("Start");

        let extracted = self.pipeline.extract().await?;
        let mut report = RunReport {
            files_matched: extracted.files_matched,
            files_loaded: extracted.tables.len(),
            files_skipped: extracted.files_skipped,
            rows_combined: 0,
            outcome: LoadOutcome::NoData,
        };
        tracing::info!(
            "📥 Loaded {} of {} files",
            report.files_loaded,
            report.files_matched
        );
        self.monitor.log_stats("Extract");

        let Some(transformed) = self.pipeline.transform(extracted.tables).await? else {
            tracing::warn!("⚠️ No JSON files were loaded.");
            self.monitor.log_final_stats();
            return Ok(report);
        };
        report.rows_combined = transformed.combined.len();
        self.monitor.log_stats("Transform");

        report.outcome = match self.pipeline.load(transformed).await {
            Ok(inserted) => {
                tracing::info!(
                    "✅ Data successfully inserted into the database ({} rows).",
                    inserted
                );
                LoadOutcome::Inserted(inserted)
            }
            Err(e) => {
                tracing::error!("❌ Error inserting data into PostgreSQL: {}", e);
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                LoadOutcome::Failed(e.to_string())
            }
        };
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(report)
    }
}
