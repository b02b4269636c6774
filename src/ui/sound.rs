/// Sound engine: procedural sound effects via rodio.
///
/// Every effect is rendered once into an in-memory WAV buffer at init.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Build without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::domain::vitals::DamageSource;
use crate::sim::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Coin,
    RockHit,
    LandHit,
    Purchase,
    Sunk,
    Start,
}

impl Sfx {
    pub const ALL: [Sfx; 6] = [Sfx::Coin, Sfx::RockHit, Sfx::LandHit, Sfx::Purchase, Sfx::Sunk, Sfx::Start];

    /// The cue for an event, if it has one. Passive wear is silent.
    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::CoinCollected { .. } => Some(Sfx::Coin),
            GameEvent::Damaged { source: DamageSource::Rock, .. } => Some(Sfx::RockHit),
            GameEvent::Damaged { source: DamageSource::Land, .. } => Some(Sfx::LandHit),
            GameEvent::Damaged { source: DamageSource::Passive, .. } => None,
            GameEvent::Purchased { .. } => Some(Sfx::Purchase),
            GameEvent::Died { .. } => Some(Sfx::Sunk),
            GameEvent::Started | GameEvent::Restarted => Some(Sfx::Start),
            GameEvent::ShopToggled { .. } => None,
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: Vec<(Sfx, Arc<Vec<u8>>)>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "no audio output; running silent");
                    return None;
                }
            };
            let buffers = Sfx::ALL.iter()
                .map(|&sfx| (sfx, Arc::new(make_wav(&render(sfx)))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some((_, buf)) = self.buffers.iter().find(|(s, _)| *s == sfx) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    pub(super) fn render(sfx: Sfx) -> Vec<f32> {
        match sfx {
            // bright two-note ping, B5→E6
            Sfx::Coin => chime(&[(988.0, 0.05), (1319.0, 0.09)], 0.25),
            // short gritty scrape
            Sfx::RockHit => thud(420.0, 180.0, 0.10, 0.7, 0.28),
            // heavy low crunch
            Sfx::LandHit => thud(220.0, 60.0, 0.22, 0.5, 0.35),
            // cash-register arpeggio, C6→E6→G6→C7
            Sfx::Purchase => chime(&[(1047.0, 0.04), (1319.0, 0.04), (1568.0, 0.04), (2093.0, 0.08)], 0.22),
            // slow falling bell, A4→F4→D4→A3
            Sfx::Sunk => fade_tail(chime(&[(440.0, 0.14), (349.0, 0.14), (294.0, 0.14), (220.0, 0.3)], 0.3)),
            // ship's horn: low fifth
            Sfx::Start => chime(&[(196.0, 0.12), (294.0, 0.22)], 0.3),
        }
    }

    /// Notes played back to back, sine plus an octave for body.
    fn chime(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 2.0 * TAU).sin() * 0.25;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Descending tone mixed with noise.
    fn thud(from: f32, to: f32, duration: f32, noise_mix: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 0x2545_F491;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq / SAMPLE_RATE as f32;
                let tone = (phase * TAU).sin();
                rng = rng.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(1.5);
                (tone * (1.0 - noise_mix) + noise * noise_mix) * env * volume
            })
            .collect()
    }

    /// Linear fade over the last quarter.
    fn fade_tail(mut samples: Vec<f32>) -> Vec<f32> {
        let total = samples.len();
        let fade_len = (total / 4).max(1);
        for (i, s) in samples.iter_mut().enumerate().skip(total.saturating_sub(fade_len)) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit mono PCM
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * u32::from(block_align);
        let data_size = samples.len() as u32 * u32::from(block_align);

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}
