//! Per-run summaries emitted by each job and persisted to the run log.

use serde::{Deserialize, Serialize};

/// Outcome of one collector run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CollectorSummary {
    pub total_sources: u32,
    pub success: u32,
    pub error: u32,
    pub skipped: u32,
    pub total_fetched: u64,
    pub errors: Vec<String>,
}

impl std::fmt::Display for CollectorSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Collect Run Complete ===")?;
        writeln!(f, "Sources:       {}", self.total_sources)?;
        writeln!(f, "  succeeded:   {}", self.success)?;
        writeln!(f, "  failed:      {}", self.error)?;
        writeln!(f, "  skipped:     {}", self.skipped)?;
        writeln!(f, "Items fetched: {}", self.total_fetched)?;
        for err in &self.errors {
            writeln!(f, "  error: {err}")?;
        }
        Ok(())
    }
}

/// Outcome of one processor run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProcessorSummary {
    pub processed: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

impl std::fmt::Display for ProcessorSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Process Run Complete ===")?;
        writeln!(f, "Processed: {}", self.processed)?;
        writeln!(f, "Failed:    {}", self.failed)?;
        for err in &self.errors {
            writeln!(f, "  error: {err}")?;
        }
        Ok(())
    }
}

/// Outcome of one notifier run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotifierSummary {
    pub sent: u32,
    pub failed: u32,
    pub image_success: u32,
    pub image_fallback: u32,
    pub no_image: u32,
}

impl NotifierSummary {
    /// Share of image sends that went through as photos, over all
    /// deliveries that had an image to try.
    pub fn image_success_rate(&self) -> f64 {
        let attempted = self.image_success + self.image_fallback;
        if attempted == 0 {
            return 0.0;
        }
        self.image_success as f64 / attempted as f64
    }
}

impl std::fmt::Display for NotifierSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Notify Run Complete ===")?;
        writeln!(f, "Sent:           {}", self.sent)?;
        writeln!(f, "Failed:         {}", self.failed)?;
        writeln!(f, "Image success:  {}", self.image_success)?;
        writeln!(f, "Image fallback: {}", self.image_fallback)?;
        writeln!(f, "No image:       {}", self.no_image)?;
        writeln!(
            f,
            "Image success rate: {:.0}%",
            self.image_success_rate() * 100.0
        )
    }
}
