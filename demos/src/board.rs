//! Host stand-ins for the board peripherals.

use std::f32::consts::TAU;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use amy_chip::config::{I2cMasterConfig, I2cSlaveConfig, I2sConfig};
use amy_chip::constants::{AMY_BYTES_PER_SAMPLE, AMY_NCHANS, AMY_SAMPLE_RATE};
use amy_chip::control::{respond, ControlSink};
use amy_chip::error::TransportError;
use amy_chip::io::frames::{self, frames_in, FRAME_BYTES};
use amy_chip::io::{I2sChannel, I2sRead, I2sWrite, Timeout};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use log::{debug, trace};

// ── Delay ──────────────────────────────────────────────────────────────────

pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

// ── I2C master ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimBusError {
    NoDevice,
    BadConfig,
}

impl i2c::Error for SimBusError {
    fn kind(&self) -> ErrorKind {
        match self {
            SimBusError::NoDevice => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            SimBusError::BadConfig => ErrorKind::Other,
        }
    }
}

/// Codec bus that acknowledges every write to a known address and logs it.
///
/// Clones share one write log.
#[derive(Clone)]
pub struct SimI2c {
    devices: Vec<u8>,
    log: Arc<Mutex<Vec<(u8, Vec<u8>)>>>,
}

impl SimI2c {
    pub fn new(devices: &[u8]) -> Self {
        SimI2c {
            devices: devices.to_vec(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn configure(&mut self, config: &I2cMasterConfig) -> Result<(), SimBusError> {
        if config.scl == config.sda || config.clock_hz == 0 {
            return Err(SimBusError::BadConfig);
        }
        debug!("sim i2c: master on scl {} sda {} at {} Hz", config.scl, config.sda, config.clock_hz);
        Ok(())
    }

    /// Writes seen so far, as `(address, bytes)`.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl ErrorType for SimI2c {
    type Error = SimBusError;
}

impl i2c::I2c for SimI2c {
    fn transaction(&mut self, address: u8, ops: &mut [Operation<'_>]) -> Result<(), SimBusError> {
        if !self.devices.contains(&address) {
            return Err(SimBusError::NoDevice);
        }
        for op in ops {
            match op {
                Operation::Write(bytes) => {
                    trace!("sim i2c: {:#04x} <- {:02x?}", address, bytes);
                    if let Ok(mut log) = self.log.lock() {
                        log.push((address, bytes.to_vec()));
                    }
                }
                // Both codecs are write-only.
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

// ── I2C slave ──────────────────────────────────────────────────────────────

/// Control port as the external controller sees it.
pub struct SimSlave<'a, const N: usize> {
    sink: ControlSink<'a, N>,
    address: Option<u8>,
    last: Vec<u8>,
}

impl<'a, const N: usize> SimSlave<'a, N> {
    pub fn new(sink: ControlSink<'a, N>) -> Self {
        SimSlave { sink, address: None, last: Vec::new() }
    }

    pub fn configure(&mut self, config: &I2cSlaveConfig) -> Result<(), SimBusError> {
        if config.address > 0x7F || config.rx_buf_len == 0 {
            return Err(SimBusError::BadConfig);
        }
        self.address = Some(config.address);
        debug!("sim i2c: slave at {:#04x}", config.address);
        Ok(())
    }

    /// Master write: deliver `bytes` as one receive event.
    pub fn master_write(&mut self, bytes: &[u8]) -> usize {
        if self.address.is_none() {
            return 0;
        }
        self.last = bytes.to_vec();
        self.sink.on_receive(bytes)
    }

    /// Master read: the slave's reply.
    pub fn master_read(&mut self, len: usize) -> Vec<u8> {
        let mut out = vec![0; len];
        let cmd = std::mem::take(&mut self.last);
        let n = respond(&cmd, &mut out);
        out.truncate(n);
        out
    }
}

// ── I2S ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimI2sError {
    UnsupportedRate(u32),
    NotEnabled,
}

/// Receive channel producing a line-in tone on the left channel.
///
/// A paced channel blocks like real hardware, one block per block period.
pub struct SimRx {
    paced: bool,
    enabled: bool,
    next: Option<Instant>,
    frame: u64,
    tone_hz: f32,
}

impl SimRx {
    pub fn paced(tone_hz: f32) -> Self {
        SimRx { paced: true, enabled: false, next: None, frame: 0, tone_hz }
    }

    pub fn unpaced(tone_hz: f32) -> Self {
        SimRx { paced: false, ..Self::paced(tone_hz) }
    }
}

fn check_rate(config: &I2sConfig) -> Result<(), SimI2sError> {
    if config.sample_rate != AMY_SAMPLE_RATE {
        return Err(SimI2sError::UnsupportedRate(config.sample_rate));
    }
    Ok(())
}

impl I2sChannel for SimRx {
    type Error = SimI2sError;

    fn configure(&mut self, config: &I2sConfig) -> Result<(), SimI2sError> {
        check_rate(config)
    }

    fn enable(&mut self) -> Result<(), SimI2sError> {
        self.enabled = true;
        Ok(())
    }
}

impl I2sRead for SimRx {
    fn read(&mut self, buf: &mut [u8], _: Timeout) -> Result<usize, TransportError<SimI2sError>> {
        if !self.enabled {
            return Err(TransportError::Channel(SimI2sError::NotEnabled));
        }
        let n = frames_in(buf.len());
        let mut samples = vec![0i16; n * AMY_NCHANS];
        for (i, frame) in samples.chunks_exact_mut(AMY_NCHANS).enumerate() {
            let t = (self.frame + i as u64) as f32 / AMY_SAMPLE_RATE as f32;
            frame[0] = ((t * self.tone_hz * TAU).sin() * 4000.0) as i16;
        }
        self.frame += n as u64;

        if self.paced {
            let period = Duration::from_secs_f64(n as f64 / f64::from(AMY_SAMPLE_RATE));
            let next = self.next.unwrap_or_else(Instant::now) + period;
            if let Some(wait) = next.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }
            self.next = Some(next);
        }
        Ok(frames::encode(&samples, buf) * AMY_BYTES_PER_SAMPLE)
    }
}

/// Transmit channel that optionally keeps everything written.
pub struct SimTx {
    enabled: bool,
    capture: Option<Arc<Mutex<Vec<i16>>>>,
}

impl SimTx {
    pub fn discard() -> Self {
        SimTx { enabled: false, capture: None }
    }

    /// Returns the channel and a handle to the captured samples.
    pub fn capture() -> (Self, Arc<Mutex<Vec<i16>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (SimTx { enabled: false, capture: Some(buf.clone()) }, buf)
    }
}

impl I2sChannel for SimTx {
    type Error = SimI2sError;

    fn configure(&mut self, config: &I2sConfig) -> Result<(), SimI2sError> {
        check_rate(config)
    }

    fn enable(&mut self) -> Result<(), SimI2sError> {
        self.enabled = true;
        Ok(())
    }
}

impl I2sWrite for SimTx {
    fn write(&mut self, buf: &[u8], _: Timeout) -> Result<usize, TransportError<SimI2sError>> {
        if !self.enabled {
            return Err(TransportError::Channel(SimI2sError::NotEnabled));
        }
        let whole = frames_in(buf.len()) * FRAME_BYTES;
        if let Some(capture) = &self.capture {
            let mut samples = vec![0i16; whole / AMY_BYTES_PER_SAMPLE];
            frames::decode(&buf[..whole], &mut samples);
            if let Ok(mut c) = capture.lock() {
                c.extend_from_slice(&samples);
            }
        }
        Ok(buf.len())
    }
}
