#[derive(Debug, Clone)]
pub struct ReportCadence {
    samples_per_report: u32,
    elapsed: u32,
}

impl ReportCadence {
    pub fn new(samples_per_report: usize) -> Self {
        let samples_per_report = u32::try_from(samples_per_report.max(1)).unwrap_or(u32::MAX);
        Self {
            samples_per_report,
            elapsed: 0,
        }
    }

    pub fn on_sample_tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.samples_per_report {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }

    pub fn samples_per_report(&self) -> u32 {
        self.samples_per_report
    }
}
