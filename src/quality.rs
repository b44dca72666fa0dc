//! Peak signal-to-noise ratio between the original and modified carrier
//!
//! The carrier is compressed MP3 payload, not PCM, so PSNR here is an
//! objective proxy for how far the bytes moved rather than a perceptual
//! measure. Even-length buffers are read as little-endian 16-bit samples
//! (peak 32767), odd-length buffers as 8-bit samples (peak 255).

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QualityError {
    #[error("audio lengths don't match: original={original}, modified={modified}")]
    LengthMismatch { original: usize, modified: usize },

    #[error("empty audio data")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleFormat {
    Pcm16,
    Pcm8,
}

impl SampleFormat {
    fn for_len(len: usize) -> Self {
        if len % 2 == 0 {
            SampleFormat::Pcm16
        } else {
            SampleFormat::Pcm8
        }
    }

    pub fn peak(self) -> f64 {
        match self {
            SampleFormat::Pcm16 => 32767.0,
            SampleFormat::Pcm8 => 255.0,
        }
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleFormat::Pcm16 => write!(f, "16-bit PCM"),
            SampleFormat::Pcm8 => write!(f, "8-bit PCM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
    Identical,
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl QualityLabel {
    pub fn from_psnr(psnr: f64) -> Self {
        if psnr == f64::INFINITY {
            QualityLabel::Identical
        } else if psnr >= 50.0 {
            QualityLabel::Excellent
        } else if psnr >= 40.0 {
            QualityLabel::VeryGood
        } else if psnr >= 30.0 {
            QualityLabel::Good
        } else if psnr >= 20.0 {
            QualityLabel::Fair
        } else {
            QualityLabel::Poor
        }
    }
}

impl std::fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityLabel::Identical => write!(f, "Perfect Quality (Identical)"),
            QualityLabel::Excellent => write!(f, "Excellent Quality"),
            QualityLabel::VeryGood => write!(f, "Very Good Quality"),
            QualityLabel::Good => write!(f, "Good Quality (Acceptable)"),
            QualityLabel::Fair => write!(f, "Fair Quality"),
            QualityLabel::Poor => write!(f, "Poor Quality (Damaged)"),
        }
    }
}

fn check(original: &[u8], modified: &[u8]) -> Result<(), QualityError> {
    if original.len() != modified.len() {
        return Err(QualityError::LengthMismatch {
            original: original.len(),
            modified: modified.len(),
        });
    }
    if original.is_empty() {
        return Err(QualityError::Empty);
    }
    Ok(())
}

fn mse_as(format: SampleFormat, original: &[u8], modified: &[u8]) -> f64 {
    let (sum, count) = match format {
        SampleFormat::Pcm16 => original
            .chunks_exact(2)
            .zip(modified.chunks_exact(2))
            .map(|(a, b)| {
                let a = i16::from_le_bytes([a[0], a[1]]);
                let b = i16::from_le_bytes([b[0], b[1]]);
                let diff = f64::from(a) - f64::from(b);
                diff * diff
            })
            .fold((0.0, 0usize), |(s, n), d| (s + d, n + 1)),
        SampleFormat::Pcm8 => original
            .iter()
            .zip(modified)
            .map(|(&a, &b)| {
                let diff = f64::from(a) - f64::from(b);
                diff * diff
            })
            .fold((0.0, 0usize), |(s, n), d| (s + d, n + 1)),
    };
    sum / count as f64
}

/// Mean squared sample difference
pub fn mse(original: &[u8], modified: &[u8]) -> Result<f64, QualityError> {
    check(original, modified)?;
    Ok(mse_as(SampleFormat::for_len(original.len()), original, modified))
}

/// PSNR in dB together with the sample interpretation used
pub fn psnr_with_format(original: &[u8], modified: &[u8]) -> Result<(f64, SampleFormat), QualityError> {
    check(original, modified)?;
    let format = SampleFormat::for_len(original.len());
    let mse = mse_as(format, original, modified);
    if mse == 0.0 {
        return Ok((f64::INFINITY, format));
    }
    let peak = format.peak();
    Ok((10.0 * (peak * peak / mse).log10(), format))
}

/// PSNR in dB; `+inf` for identical buffers
pub fn psnr(original: &[u8], modified: &[u8]) -> Result<f64, QualityError> {
    psnr_with_format(original, modified).map(|(value, _)| value)
}

/// Identical, or at least 30 dB
pub fn is_acceptable(psnr: f64) -> bool {
    psnr == f64::INFINITY || psnr >= 30.0
}

pub fn format_psnr(psnr: f64) -> String {
    if psnr == f64::INFINITY {
        "∞ dB".to_string()
    } else {
        format!("{:.2} dB", psnr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_infinite() {
        let data = vec![1u8, 2, 3, 4];
        assert_eq!(psnr(&data, &data), Ok(f64::INFINITY));
        assert_eq!(QualityLabel::from_psnr(f64::INFINITY), QualityLabel::Identical);
    }

    #[test]
    fn test_off_by_one_16bit_samples() {
        // Every little-endian sample differs by exactly 1 -> MSE = 1
        let original = vec![0u8; 1000];
        let modified: Vec<u8> = (0..1000).map(|i| if i % 2 == 0 { 1 } else { 0 }).collect();
        let (value, format) = psnr_with_format(&original, &modified).expect("Should compute");
        assert_eq!(format, SampleFormat::Pcm16);
        let expected = 10.0 * (32767.0f64 * 32767.0).log10();
        assert!((value - expected).abs() < 1e-9);
        assert!((value - 90.309).abs() < 0.001);
    }

    #[test]
    fn test_odd_length_uses_8bit_samples() {
        let original = vec![10u8, 10, 10];
        let modified = vec![11u8, 9, 10];
        // MSE = (1 + 1 + 0) / 3
        assert_eq!(mse(&original, &modified), Ok(2.0 / 3.0));
        let (value, format) = psnr_with_format(&original, &modified).expect("Should compute");
        assert_eq!(format, SampleFormat::Pcm8);
        assert!((value - 10.0 * (255.0f64 * 255.0 * 1.5).log10()).abs() < 1e-9);
    }

    #[test]
    fn test_signed_samples() {
        // 0xFFFF is -1 as i16; difference to 0x0001 (1) is 2
        let original = vec![0xFF, 0xFF];
        let modified = vec![0x01, 0x00];
        assert_eq!(mse(&original, &modified), Ok(4.0));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            psnr(&[1, 2], &[1]),
            Err(QualityError::LengthMismatch { original: 2, modified: 1 })
        );
        assert_eq!(psnr(&[], &[]), Err(QualityError::Empty));
    }

    #[test]
    fn test_labels_and_thresholds() {
        assert_eq!(QualityLabel::from_psnr(50.0), QualityLabel::Excellent);
        assert_eq!(QualityLabel::from_psnr(49.99), QualityLabel::VeryGood);
        assert_eq!(QualityLabel::from_psnr(40.0), QualityLabel::VeryGood);
        assert_eq!(QualityLabel::from_psnr(30.0), QualityLabel::Good);
        assert_eq!(QualityLabel::from_psnr(20.0), QualityLabel::Fair);
        assert_eq!(QualityLabel::from_psnr(19.9), QualityLabel::Poor);
        assert_eq!(QualityLabel::Good.to_string(), "Good Quality (Acceptable)");

        assert!(is_acceptable(f64::INFINITY));
        assert!(is_acceptable(30.0));
        assert!(!is_acceptable(29.9));
    }

    #[test]
    fn test_format_psnr() {
        assert_eq!(format_psnr(f64::INFINITY), "∞ dB");
        assert_eq!(format_psnr(42.123), "42.12 dB");
    }
}
