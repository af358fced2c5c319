//! WAV container helpers built on `hound`

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Browsers stream 16 kHz mono 16-bit PCM
pub const BROWSER_SAMPLE_RATE: u32 = 16_000;

pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WAVE"
}

/// Wrap raw little-endian i16 PCM in a WAV container.
///
/// A trailing odd byte is dropped.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, channels: u16) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in pcm_samples(pcm) {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Scale the samples of a 16-bit integer WAV by `volume`.
///
/// Returns `Ok(None)` for sample formats this does not handle.
pub fn scale_wav_volume(wav: &[u8], volume: f32) -> Result<Option<Vec<u8>>, hound::Error> {
    let mut reader = WavReader::new(Cursor::new(wav))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Ok(None);
    }

    let gain = volume.clamp(0.0, 1.0);
    let mut cursor = Cursor::new(Vec::with_capacity(wav.len()));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in reader.samples::<i16>() {
            let scaled = (sample? as f32 * gain).round() as i16;
            writer.write_sample(scaled)?;
        }
        writer.finalize()?;
    }
    Ok(Some(cursor.into_inner()))
}

/// RMS level of little-endian i16 PCM, normalized to 0.0..=1.0.
pub fn audio_level(pcm: &[u8]) -> f32 {
    let (sum, count) = pcm_samples(pcm).fold((0f64, 0usize), |(sum, count), sample| {
        let value = sample as f64;
        (sum + value * value, count + 1)
    });

    if count == 0 {
        return 0.0;
    }

    let rms = (sum / count as f64).sqrt();
    (rms / 32768.0).min(1.0) as f32
}

fn pcm_samples(pcm: &[u8]) -> impl Iterator<Item = i16> + '_ {
    pcm.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
}
