//! Control surfaces: codec configuration and the inbound message channel.

mod slave;

pub use slave::{respond, ControlSink};

/// Outcome of a best-effort configuration script.
///
/// Failed steps have already been logged by the driver; the script carries
/// on after them, so a non-zero `failures` means the device and its shadow
/// may disagree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    /// Steps attempted.
    pub steps: u16,
    /// Steps with at least one failed bus write.
    pub failures: u16,
}

impl InitReport {
    /// Count one step.
    pub fn record<T, E>(&mut self, result: Result<T, E>) {
        self.steps += 1;
        if result.is_err() {
            self.failures += 1;
        }
    }

    /// Every step went through.
    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

/// A codec brought up by a fixed register script at boot.
pub trait CodecControl {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Run the configuration script once. Never aborts part-way.
    fn initialize(&mut self) -> InitReport;
}
