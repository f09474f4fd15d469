//! Audio decoding
//!
//! The editor never decodes audio itself; it hands a path to an
//! [`AudioDecoder`] and receives a [`DecodedAudio`] back. [`WavDecoder`] is
//! the built-in implementation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CueError, CueResult};

/// Decoded track: the first channel only, as floats in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
    /// Channel count of the source file
    pub channels: u16,
    pub duration_secs: f64,
}

impl DecodedAudio {
    /// Build from the first channel's samples. Duration is derived from the
    /// sample count; an empty buffer or zero rate has no usable duration.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> CueResult<Self> {
        if sample_rate == 0 {
            return Err(CueError::decode("sample rate is zero"));
        }
        if samples.is_empty() {
            return Err(CueError::decode("file contains no audio frames"));
        }

        let duration_secs = samples.len() as f64 / sample_rate as f64;
        Ok(Self {
            samples: samples.into(),
            sample_rate,
            channels,
            duration_secs,
        })
    }
}

/// Decoding service seam
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    async fn decode(&self, path: &Path) -> CueResult<DecodedAudio>;
}

/// PCM/float WAV decoder backed by `hound`
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl WavDecoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioDecoder for WavDecoder {
    async fn decode(&self, path: &Path) -> CueResult<DecodedAudio> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || decode_wav_file(&path))
            .await
            .map_err(|e| CueError::decode(format!("decode task failed: {}", e)))?
    }
}

/// Blocking WAV decode of a file on disk
pub fn decode_wav_file(path: &Path) -> CueResult<DecodedAudio> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| CueError::decode(format!("{}: {}", path.display(), e)))?;
    let audio = decode_wav(reader)?;
    tracing::debug!(
        "Decoded {:?}: {} Hz, {} channel(s), {:.3}s",
        path,
        audio.sample_rate,
        audio.channels,
        audio.duration_secs
    );
    Ok(audio)
}

/// Decode the first channel from any WAV stream
pub fn decode_wav<R: Read>(mut reader: hound::WavReader<R>) -> CueResult<DecodedAudio> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(CueError::decode("WAV header declares zero channels"));
    }
    let stride = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(stride)
            .collect::<Result<_, _>>()
            .map_err(|e| CueError::decode(e.to_string()))?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(CueError::decode(format!(
                    "unsupported bit depth {}",
                    spec.bits_per_sample
                )));
            }
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .step_by(stride)
                .map(|s| s.map(|v| (v as f32 / scale).clamp(-1.0, 1.0)))
                .collect::<Result<_, _>>()
                .map_err(|e| CueError::decode(e.to_string()))?
        }
    };

    DecodedAudio::new(samples, spec.sample_rate, spec.channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, spec: hound::WavSpec, frames: &[Vec<i32>]) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &sample in frame {
                match spec.bits_per_sample {
                    16 => writer.write_sample(sample as i16).unwrap(),
                    _ => writer.write_sample(sample).unwrap(),
                }
            }
        }
        writer.finalize().unwrap();
    }

    fn int_spec(channels: u16) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_decoded_audio_rejects_empty() {
        assert!(matches!(
            DecodedAudio::new(Vec::new(), 44100, 1),
            Err(CueError::Decode(_))
        ));
        assert!(DecodedAudio::new(vec![0.0], 0, 1).is_err());
    }

    #[test]
    fn test_duration_from_sample_count() {
        let audio = DecodedAudio::new(vec![0.0; 22050], 44100, 2).unwrap();
        assert_eq!(audio.duration_secs, 0.5);
        assert_eq!(audio.channels, 2);
    }

    #[tokio::test]
    async fn test_wav_decoder_takes_first_channel() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.wav");
        let frames: Vec<Vec<i32>> = (0..8000).map(|_| vec![16384, -32768]).collect();
        write_wav(&path, int_spec(2), &frames);

        let audio = WavDecoder::new().decode(&path).await.unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples.len(), 8000);
        assert_eq!(audio.duration_secs, 1.0);
        assert!(audio.samples.iter().all(|&s| s == 0.5));
    }

    #[tokio::test]
    async fn test_wav_decoder_float() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 4,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for sample in [0.0f32, 0.25, -0.75, 1.0] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let audio = WavDecoder::new().decode(&path).await.unwrap();
        assert_eq!(&*audio.samples, &[0.0, 0.25, -0.75, 1.0]);
        assert_eq!(audio.duration_secs, 1.0);
    }

    #[tokio::test]
    async fn test_wav_decoder_errors() {
        let dir = TempDir::new().unwrap();

        let absent = dir.path().join("absent.wav");
        let missing = WavDecoder::new().decode(&absent).await;
        assert!(matches!(missing, Err(CueError::Decode(_))));

        let garbage = dir.path().join("garbage.wav");
        std::fs::write(&garbage, b"definitely not a riff header").unwrap();
        let err = WavDecoder::new().decode(&garbage).await.unwrap_err();
        assert!(err.user_notice().is_some());

        let empty = dir.path().join("empty.wav");
        write_wav(&empty, int_spec(1), &[]);
        assert!(WavDecoder::new().decode(&empty).await.is_err());
    }
}
