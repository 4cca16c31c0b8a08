//! [`AudioTransport`] over a byte-level I2S peripheral.
//!
//! ```text
//!  I2sRead ──bytes──► decode ──► [i16; block] ──► coordinator
//!  I2sWrite ◄─bytes── encode ◄── [i16; block] ◄── coordinator
//! ```
//!
//! Staging buffers hold one block of bytes per direction, so a transfer of
//! one block is exactly one call into the channel. Larger requests are split
//! into block-sized chunks; the first short chunk ends the transfer.

use log::info;

use crate::config::I2sConfig;
use crate::constants::{AMY_BYTES_PER_SAMPLE, BLOCK_BYTES};
use crate::error::TransportError;

use super::frames::{self, frames_in};
use super::{AudioTransport, I2sRead, I2sWrite, Timeout};

/// Full-duplex transport built from a receive and a transmit channel.
pub struct I2sTransport<R, W> {
    rx: R,
    tx: W,
    rx_bytes: [u8; BLOCK_BYTES],
    tx_bytes: [u8; BLOCK_BYTES],
}

impl<R, W> I2sTransport<R, W>
where
    R: I2sRead,
    W: I2sWrite<Error = R::Error>,
{
    pub fn new(rx: R, tx: W) -> Self {
        I2sTransport {
            rx,
            tx,
            rx_bytes: [0; BLOCK_BYTES],
            tx_bytes: [0; BLOCK_BYTES],
        }
    }

    /// Configure both directions and start them, transmit first.
    pub fn start(&mut self, config: &I2sConfig) -> Result<(), R::Error> {
        self.tx.configure(config)?;
        self.rx.configure(config)?;
        self.tx.enable()?;
        self.rx.enable()?;
        info!(
            "i2s: {:?} {} Hz {}-bit {:?}",
            config.role,
            config.sample_rate,
            config.bit_width.bits(),
            config.slot_mode
        );
        Ok(())
    }

    /// Give back the channels.
    pub fn release(self) -> (R, W) {
        (self.rx, self.tx)
    }
}

impl<R, W> AudioTransport for I2sTransport<R, W>
where
    R: I2sRead,
    W: I2sWrite<Error = R::Error>,
{
    type Error = R::Error;

    fn read_block(
        &mut self,
        block: &mut [i16],
        timeout: Timeout,
    ) -> Result<usize, TransportError<Self::Error>> {
        let chunk_samples = BLOCK_BYTES / AMY_BYTES_PER_SAMPLE;
        let mut filled = 0;
        let mut bytes = 0;
        while filled < block.len() {
            let end = (filled + chunk_samples).min(block.len());
            let chunk = &mut block[filled..end];
            let want = chunk.len() * AMY_BYTES_PER_SAMPLE;
            let got = self.rx.read(&mut self.rx_bytes[..want], timeout)?.min(want);
            filled += frames::decode(&self.rx_bytes[..got], chunk);
            bytes += got;
            if got < want {
                break;
            }
        }
        frames::silence(&mut block[filled..]);
        Ok(frames_in(bytes))
    }

    fn write_block(
        &mut self,
        block: &[i16],
        timeout: Timeout,
    ) -> Result<usize, TransportError<Self::Error>> {
        let mut bytes = 0;
        for chunk in block.chunks(BLOCK_BYTES / AMY_BYTES_PER_SAMPLE) {
            let want = frames::encode(chunk, &mut self.tx_bytes) * AMY_BYTES_PER_SAMPLE;
            let put = self.tx.write(&self.tx_bytes[..want], timeout)?.min(want);
            bytes += put;
            if put < want {
                break;
            }
        }
        Ok(frames_in(bytes))
    }
}
