//! Start-up helpers.
//!
//! Boot never aborts: every step is attempted, its outcome logged, and the
//! firmware carries on with whatever came up. The sequence on the board is
//! `i2c_master`, `i2c_slave`, `pcm9211`, `wm8960`, `i2s`, then the engine,
//! the remote render stage and the coordinator.

use core::fmt::Debug;

use log::{info, warn};

use crate::config::ChipConfig;
use crate::control::CodecControl;
use crate::error::InitError;

/// Run one named start-up step and log how it went.
///
/// The result is handed back for callers that want to count failures; the
/// boot sequence itself ignores it.
pub fn check_init<E, F>(step: &'static str, f: F) -> Result<(), InitError>
where
    E: Debug,
    F: FnOnce() -> Result<(), E>,
{
    match f() {
        Ok(()) => {
            info!("{}: ok", step);
            Ok(())
        }
        Err(e) => {
            warn!("{}: failed ({:?})", step, e);
            Err(InitError { step })
        }
    }
}

/// Run a codec's configuration script as a start-up step named after it.
pub fn init_codec<C: CodecControl + ?Sized>(codec: &mut C) -> Result<(), InitError> {
    let name = codec.name();
    check_init(name, || {
        let report = codec.initialize();
        if report.is_clean() {
            Ok(())
        } else {
            Err(report)
        }
    })
}

/// Log the board configuration once at start-up.
pub fn banner(config: &ChipConfig) {
    info!(
        "amy chip: i2s {:?} {} Hz, codec bus scl {} sda {}, control at {:#04x}",
        config.i2s.role,
        config.i2s.sample_rate,
        config.i2c_master.scl,
        config.i2c_master.sda,
        config.i2c_slave.address,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::InitReport;

    struct FakeCodec {
        fail: bool,
        runs: u32,
    }

    impl CodecControl for FakeCodec {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn initialize(&mut self) -> InitReport {
            self.runs += 1;
            let mut r = InitReport::default();
            r.record::<(), ()>(Ok(()));
            r.record::<(), ()>(if self.fail { Err(()) } else { Ok(()) });
            r
        }
    }

    #[test]
    fn check_init_reports_step() {
        assert_eq!(check_init::<(), _>("i2s", || Ok(())), Ok(()));
        assert_eq!(
            check_init("i2c_slave", || Err("no pins")),
            Err(InitError { step: "i2c_slave" })
        );
    }

    #[test]
    fn failed_steps_do_not_stop_the_sequence() {
        let mut ran = [false; 3];
        let results = [
            check_init("a", || { ran[0] = true; Err(1) }),
            check_init("b", || { ran[1] = true; Ok::<(), i32>(()) }),
            check_init("c", || { ran[2] = true; Err(3) }),
        ];
        assert_eq!(ran, [true; 3]);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 2);
    }

    #[test]
    fn codec_step_uses_its_name() {
        let mut ok = FakeCodec { fail: false, runs: 0 };
        let mut bad = FakeCodec { fail: true, runs: 0 };
        assert_eq!(init_codec(&mut ok), Ok(()));
        assert_eq!(init_codec(&mut bad), Err(InitError { step: "fake" }));
        assert_eq!((ok.runs, bad.runs), (1, 1));
    }
}
