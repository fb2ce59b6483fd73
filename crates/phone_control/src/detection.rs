//! Boundary to the object-detection model
//!
//! The model itself lives outside this crate behind [`Detector`]; this module
//! decodes the image payload clients send and ranks what the model returns.

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use thiserror::Error;

/// One detected object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    #[serde(rename = "class")]
    pub label: String,
    /// In `[0, 1]`
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("No image provided")]
    MissingImage,

    #[error("Image must be a base64 data URL")]
    MalformedDataUrl,

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl DetectionError {
    /// True when the request itself was at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingImage
                | Self::MalformedDataUrl
                | Self::Base64Decode(_)
                | Self::UnsupportedFormat
        )
    }
}

/// A pretrained detection model: raw image bytes in, labelled boxes out
pub trait Detector: Send + Sync {
    fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, DetectionError>;
}

/// Decode `data:<mime>;base64,<payload>` into image bytes
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, DetectionError> {
    let data_url = data_url.trim();
    if data_url.is_empty() {
        return Err(DetectionError::MissingImage);
    }

    let (_, payload) = data_url
        .split_once(',')
        .ok_or(DetectionError::MalformedDataUrl)?;
    let bytes = general_purpose::STANDARD.decode(payload.trim())?;

    image::guess_format(&bytes).map_err(|_| DetectionError::UnsupportedFormat)?;
    Ok(bytes)
}

/// Clamp confidences into `[0, 1]`, drop NaNs, and sort highest first
pub fn rank(detections: Vec<Detection>) -> Vec<Detection> {
    let mut ranked: Vec<Detection> = detections
        .into_iter()
        .filter(|d| !d.confidence.is_nan())
        .map(|mut d| {
            d.confidence = d.confidence.clamp(0.0, 1.0);
            d
        })
        .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
}

/// Decode, infer and rank in one call
pub fn detect_objects(
    detector: Option<&dyn Detector>,
    data_url: &str,
) -> Result<Vec<Detection>, DetectionError> {
    let detector = detector.ok_or(DetectionError::ModelUnavailable)?;
    let bytes = decode_data_url(data_url)?;
    let detections = detector.detect(&bytes)?;
    Ok(rank(detections))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_data_url() -> String {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"fixture");
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(bytes)
        )
    }

    struct FixedDetector(Vec<Detection>);

    impl Detector for FixedDetector {
        fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, DetectionError> {
            assert!(image.starts_with(&PNG_SIGNATURE));
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_detections_sorted_by_confidence() {
        let detector = FixedDetector(vec![
            Detection::new("cup", 0.4),
            Detection::new("person", 0.9),
        ]);
        let ranked = detect_objects(Some(&detector), &png_data_url()).unwrap();
        let confidences: Vec<f32> = ranked.iter().map(|d| d.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.4]);
        assert_eq!(ranked[0].label, "person");
    }

    #[test]
    fn test_rank_clamps_and_drops_nan() {
        let ranked = rank(vec![
            Detection::new("a", 1.7),
            Detection::new("b", f32::NAN),
            Detection::new("c", -0.2),
        ]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].confidence, 1.0);
        assert_eq!(ranked[1].confidence, 0.0);
    }

    #[test]
    fn test_model_checked_first() {
        let err = detect_objects(None, "").unwrap_err();
        assert!(matches!(err, DetectionError::ModelUnavailable));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert!(matches!(
            decode_data_url("  "),
            Err(DetectionError::MissingImage)
        ));
        assert!(matches!(
            decode_data_url("not-a-data-url"),
            Err(DetectionError::MalformedDataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,!!!"),
            Err(DetectionError::Base64Decode(_))
        ));
        let text = general_purpose::STANDARD.encode(b"plain text");
        assert!(matches!(
            decode_data_url(&format!("data:text/plain;base64,{}", text)),
            Err(DetectionError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_serializes_label_as_class() {
        let json = serde_json::to_value(Detection::new("dog", 0.5)).unwrap();
        assert_eq!(json["class"], "dog");
        assert_eq!(json["confidence"], 0.5);
    }
}
