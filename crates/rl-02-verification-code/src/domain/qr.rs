//! QR Encoder
//!
//! Renders the verification URL as an SVG QR code wrapped in a base64 data
//! URL. A rendering failure is never fatal: the encoder logs a warning and
//! returns a placeholder image flagged as such.

use crate::error::QrEncodeError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

/// MIME type of every artifact produced here
pub const QR_MIME_TYPE: &str = "image/svg+xml";

const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 200" width="200" height="200"><rect width="200" height="200" fill="white"/><text x="100" y="100" text-anchor="middle" font-size="12" fill="#666">QR unavailable</text></svg>"##;

/// Rendering options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrEncoderConfig {
    /// Minimum width and height in pixels
    pub min_size: u32,
    /// Keep the quiet zone around the symbol
    pub quiet_zone: bool,
    pub dark_color: String,
    pub light_color: String,
}

impl Default for QrEncoderConfig {
    fn default() -> Self {
        Self {
            min_size: 200,
            quiet_zone: true,
            dark_color: "#000000".to_string(),
            light_color: "#FFFFFF".to_string(),
        }
    }
}

/// Encoded QR image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrArtifact {
    /// `data:image/svg+xml;base64,...`
    pub data_url: String,
    /// True when rendering failed and this is the fallback image
    pub placeholder: bool,
}

impl QrArtifact {
    fn from_svg(svg: &str, placeholder: bool) -> Self {
        Self {
            data_url: format!("data:{};base64,{}", QR_MIME_TYPE, BASE64.encode(svg)),
            placeholder,
        }
    }

    /// The documented fallback artifact
    pub fn placeholder() -> Self {
        Self::from_svg(PLACEHOLDER_SVG, true)
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// QR encoder at error correction level M
#[derive(Debug, Clone, Default)]
pub struct QrEncoder {
    config: QrEncoderConfig,
}

impl QrEncoder {
    pub fn new(config: QrEncoderConfig) -> Self {
        Self { config }
    }

    /// Render `payload`, failing on unencodable input.
    pub fn try_encode(&self, payload: &str) -> Result<QrArtifact, QrEncodeError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .map_err(|e| QrEncodeError::Encoding(e.to_string()))?;

        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.config.min_size, self.config.min_size)
            .quiet_zone(self.config.quiet_zone)
            .dark_color(svg::Color(&self.config.dark_color))
            .light_color(svg::Color(&self.config.light_color))
            .build();

        Ok(QrArtifact::from_svg(&image, false))
    }

    /// Render `payload`, falling back to [`QrArtifact::placeholder`].
    pub fn encode(&self, payload: &str) -> QrArtifact {
        match self.try_encode(payload) {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    payload_len = payload.len(),
                    "[rl-02] QR rendering failed, using placeholder"
                );
                ledger_telemetry::QR_FALLBACKS.inc();
                QrArtifact::placeholder()
            }
        }
    }
}
