//! Audio decoding using Symphonia
//!
//! Detects the container format, picks the first decodable track and decodes every packet to
//! `f32`, averaging channels down to mono as it goes. Which codecs are available depends
//! on the crate features this library was built with; anything else surfaces as
//! [`LoadError::UnsupportedCodec`].

use crate::error::LoadError;
use crate::preprocessing::channel_mixer::downmix_interleaved;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Mono PCM decoded from a file, at the file's native rate
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Native sample rate in Hz
    pub sample_rate: u32,
    /// Channel count before downmixing
    pub channels: usize,
}

/// Decode audio file to mono PCM samples
///
/// # Arguments
///
/// * `path` - Path to audio file
///
/// # Errors
///
/// * `LoadError::NotFound` - the path does not exist
/// * `LoadError::Unreadable` - I/O failure or corrupt container
/// * `LoadError::UnsupportedCodec` - no reader/decoder for this format in this build
/// * `LoadError::NoAudioTrack` - the container has no decodable track
pub fn decode_file(path: &Path) -> Result<DecodedAudio, LoadError> {
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| map_symphonia_error(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| LoadError::NoAudioTrack(path.to_path_buf()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| map_symphonia_error(path, e))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut channels = 0;
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                log::warn!("Track list changed mid-stream in {}, stopping", path.display());
                break;
            }
            Err(e) => return Err(map_symphonia_error(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                if sample_rate == 0 {
                    sample_rate = spec.rate;
                }
                channels = spec.channels.count();

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);

                let mono = downmix_interleaved(buffer.samples(), channels).map_err(|e| {
                    LoadError::Unreadable {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    }
                })?;
                samples.extend_from_slice(&mono);
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                skipped_packets += 1;
                log::debug!("Skipping undecodable packet: {}", msg);
            }
            Err(SymphoniaError::IoError(ref e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(map_symphonia_error(path, e)),
        }
    }

    if skipped_packets > 0 {
        log::warn!(
            "Skipped {} corrupt packets while decoding {}",
            skipped_packets,
            path.display()
        );
    }

    if sample_rate == 0 {
        return Err(LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: "unknown sample rate".to_string(),
        });
    }

    log::debug!(
        "Decoded {} mono samples at {} Hz ({} channels)",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

fn map_symphonia_error(path: &Path, err: SymphoniaError) -> LoadError {
    match err {
        SymphoniaError::Unsupported(what) => LoadError::UnsupportedCodec {
            path: path.to_path_buf(),
            reason: what.to_string(),
        },
        other => LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_missing_file() {
        let result = decode_file(Path::new("/definitely/not/here.wav"));
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_decode_garbage_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "this is not audio, just some text that no format reader accepts").unwrap();

        let result = decode_file(&path);
        assert!(
            matches!(
                result,
                Err(LoadError::UnsupportedCodec { .. }) | Err(LoadError::Unreadable { .. })
            ),
            "Expected a load failure, got {:?}",
            result.map(|d| d.samples.len())
        );
    }

    #[test]
    fn test_decode_stereo_wav_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..800 {
            writer.write_sample(16384i16).unwrap(); // left = 0.5
            writer.write_sample(0i16).unwrap(); // right = 0.0
        }
        writer.finalize().unwrap();

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.samples.len(), 800);
        assert!((decoded.samples[100] - 0.25).abs() < 1e-3);
    }
}
