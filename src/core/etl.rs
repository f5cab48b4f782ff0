use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load once. Returns the output directory.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting curriculum ETL run");

        tracing::info!("📥 Extracting documents...");
        self.monitor.start_stage("extract");
        let snapshot = self.pipeline.extract().await?;
        self.monitor.finish_stage("extract");

        tracing::info!("🔄 Transforming curriculum...");
        self.monitor.start_stage("transform");
        let output = self.pipeline.transform(snapshot).await?;
        self.monitor.finish_stage("transform");
        tracing::info!(
            "Transformed {} modules for {} programs",
            output.modules.len(),
            output.programs.len()
        );

        tracing::info!("💾 Writing output files...");
        self.monitor.start_stage("load");
        let output_path = self.pipeline.load(output).await?;
        self.monitor.finish_stage("load");
        tracing::info!("📁 Output written to: {}", output_path);

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
