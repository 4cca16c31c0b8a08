//! AMY wire-format messages.
//!
//! A message is a run of fields, each a single letter followed by its value:
//! `v0f440l1w0` sets oscillator 0 to a 440 Hz sine at velocity 1. Letters
//! this engine does not know are skipped, as are letters without a value
//! (the trailing `Z` terminator, for instance).

use core::str::FromStr;

use log::debug;
use thiserror::Error;

use super::osc::Wave;

/// One scheduled change to the bank.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ToneEvent {
    /// `v`: target oscillator.
    pub osc: u16,
    /// `t`: engine time in milliseconds; `None` applies at the next period.
    pub time_ms: Option<u64>,
    /// `w`
    pub wave: Option<Wave>,
    /// `f`: frequency in Hz.
    pub freq: Option<f32>,
    /// `n`: MIDI note, used when no frequency is given.
    pub note: Option<f32>,
    /// `l`: velocity; 0 is note-off.
    pub velocity: Option<f32>,
    /// `V`: global volume.
    pub volume: Option<f32>,
    /// `S`: reset one oscillator, or all of them for an index past the pool.
    pub reset: Option<u16>,
}

impl ToneEvent {
    /// Note-on of a plain sine.
    pub fn sine(osc: u16, freq: f32, velocity: f32) -> Self {
        ToneEvent {
            osc,
            wave: Some(Wave::Sine),
            freq: Some(freq),
            velocity: Some(velocity),
            ..Default::default()
        }
    }

    pub fn at(mut self, time_ms: u64) -> Self {
        self.time_ms = Some(time_ms);
        self
    }

    /// Frequency this event asks for, from `f` or else `n`.
    pub fn frequency(&self) -> Option<f32> {
        self.freq.or_else(|| self.note.map(note_to_freq))
    }
}

/// Equal-tempered frequency of a MIDI note (A4 = 69 = 440 Hz).
pub fn note_to_freq(note: f32) -> f32 {
    440.0 * libm::powf(2.0, (note - 69.0) / 12.0)
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    #[error("bad value for field `{0}`")]
    BadValue(char),
    #[error("unknown wave {0}")]
    UnknownWave(u8),
    #[error("message has no fields")]
    Empty,
}

fn value<T: FromStr>(field: char, text: &str) -> Result<T, MessageError> {
    text.parse().map_err(|_| MessageError::BadValue(field))
}

/// Parse one wire message into an event.
pub fn parse(message: &str) -> Result<ToneEvent, MessageError> {
    let mut event = ToneEvent::default();
    let mut fields = 0;
    let mut rest = message.trim();

    while let Some(field) = rest.chars().next() {
        rest = &rest[field.len_utf8()..];
        let end = rest.find(|c: char| c.is_ascii_alphabetic()).unwrap_or(rest.len());
        let text = &rest[..end];
        rest = &rest[end..];

        if !field.is_ascii_alphabetic() {
            return Err(MessageError::BadValue(field));
        }
        // Known fields need a value; an empty one fails to parse.
        match field {
            'v' => event.osc = value(field, text)?,
            't' => event.time_ms = Some(value(field, text)?),
            'w' => {
                let code: u8 = value(field, text)?;
                event.wave = Some(Wave::from_code(code).ok_or(MessageError::UnknownWave(code))?);
            }
            'f' => event.freq = Some(value(field, text)?),
            'n' => event.note = Some(value(field, text)?),
            'l' => event.velocity = Some(value(field, text)?),
            'V' => event.volume = Some(value(field, text)?),
            'S' => event.reset = Some(value(field, text)?),
            other => {
                debug!("sine bank: ignoring field `{}`", other);
                continue;
            }
        }
        fields += 1;
    }

    if fields == 0 {
        Err(MessageError::Empty)
    } else {
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on() {
        let e = parse("v3f440l1w0").unwrap();
        assert_eq!(e, ToneEvent::sine(3, 440.0, 1.0));
    }

    #[test]
    fn parses_time_note_and_volume() {
        let e = parse("t1500v1n69l0.5V2Z").unwrap();
        assert_eq!(e.time_ms, Some(1500));
        assert_eq!(e.osc, 1);
        assert_eq!(e.frequency(), Some(440.0));
        assert_eq!(e.velocity, Some(0.5));
        assert_eq!(e.volume, Some(2.0));
    }

    #[test]
    fn frequency_wins_over_note() {
        let e = parse("f100n69").unwrap();
        assert_eq!(e.frequency(), Some(100.0));
    }

    #[test]
    fn note_to_freq_octaves() {
        assert!((note_to_freq(81.0) - 880.0).abs() < 0.01);
        assert!((note_to_freq(57.0) - 220.0).abs() < 0.01);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse("vxf1"), Err(MessageError::BadValue('v')));
        assert_eq!(parse("w7"), Err(MessageError::UnknownWave(7)));
        assert_eq!(parse(""), Err(MessageError::Empty));
        assert_eq!(parse("Z"), Err(MessageError::Empty));
        assert_eq!(parse("12"), Err(MessageError::BadValue('1')));
    }

    #[test]
    fn known_field_without_value_is_rejected() {
        assert_eq!(parse("v1lf440"), Err(MessageError::BadValue('l')));
        assert_eq!(parse("f440v"), Err(MessageError::BadValue('v')));
        assert_eq!(parse("v1f440Z"), Ok(ToneEvent { osc: 1, freq: Some(440.0), ..Default::default() }));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let e = parse("v2a1b2l1").unwrap();
        assert_eq!(e.osc, 2);
        assert_eq!(e.velocity, Some(1.0));
    }

    #[test]
    fn reset_all() {
        let e = parse("S1000").unwrap();
        assert_eq!(e.reset, Some(1000));
    }
}
