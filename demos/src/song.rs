//! Demo material.

use std::fmt::Write;

use amy_chip::synth::{ToneEvent, Wave};

/// The tone played once the board is up: a 440 Hz sine on voice 0 at full
/// velocity.
pub fn boot_tone() -> ToneEvent {
    ToneEvent::sine(0, 440.0, 1.0)
}

/// Eleven voices, one rising note per second starting at MIDI 40, the first
/// one `start_ms + 250`.
pub fn polyphony(start_ms: u64) -> Vec<ToneEvent> {
    (0..11u16)
        .map(|i| ToneEvent {
            osc: i,
            time_ms: Some(start_ms + 250 + 1000 * u64::from(i)),
            wave: Some(Wave::Triangle),
            note: Some(f32::from(40 + 2 * i)),
            velocity: Some(0.5),
            ..Default::default()
        })
        .collect()
}

/// AMY wire form of `event`, without its time.
pub fn to_wire(event: &ToneEvent) -> String {
    let mut s = String::new();
    let _ = write!(s, "v{}", event.osc);
    if let Some(w) = event.wave {
        let _ = write!(s, "w{}", w as u8);
    }
    if let Some(f) = event.freq {
        let _ = write!(s, "f{}", f);
    }
    if let Some(n) = event.note {
        let _ = write!(s, "n{}", n);
    }
    if let Some(l) = event.velocity {
        let _ = write!(s, "l{}", l);
    }
    if let Some(v) = event.volume {
        let _ = write!(s, "V{}", v);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use amy_chip::synth::parse;

    #[test]
    fn boot_tone_is_full_velocity_a440_on_voice_zero() {
        assert_eq!(to_wire(&boot_tone()), "v0w0f440l1");
    }

    #[test]
    fn wire_form_parses_back() {
        for event in polyphony(0) {
            let parsed = parse(&to_wire(&event)).unwrap();
            assert_eq!(parsed, ToneEvent { time_ms: None, ..event });
        }
    }

    #[test]
    fn notes_rise_one_per_second() {
        let song = polyphony(1000);
        assert_eq!(song.len(), 11);
        assert_eq!(song[0].time_ms, Some(1250));
        assert_eq!(song[10].time_ms, Some(11_250));
        assert_eq!(song[10].note, Some(60.0));
    }
}
