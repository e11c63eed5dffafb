//! # qrenc
//!
//! A QR Code encoder that turns a text or byte payload into a square grid of dark and light
//! modules, typically an `otpauth://` provisioning URI for an authenticator app.
//!
//! `qrenc` follows the QR Code Model 2 specification. It supports versions 1 to 40, the four
//! error correction levels, and numeric, alphanumeric, byte and ECI segments. The finished
//! [`QrCode`] is an immutable grid; the [`render`] module offers thin PNG, SVG and terminal
//! renderers on top of it.
//!
//! ## Features
//!
//! - Automatic mode classification (numeric, alphanumeric, UTF-8 bytes).
//! - Smallest-version selection with optional free error correction boost.
//! - Automatic mask selection by penalty score, or a forced mask.
//! - Safe Rust implementation with no unsafe code and no global state.
//!
//! ## Example
//!
//! ```rust
//! use qrenc::{encode, EncodeOptions};
//!
//! let uri = "otpauth://totp/Example:alice@example.com?secret=JBSWY3DPEHPK3PXP&issuer=Example";
//! let qr = encode(uri, &EncodeOptions::default()).unwrap();
//! println!(
//!     "version {} level {:?} mask {}",
//!     qr.version().value(),
//!     qr.error_correction_level(),
//!     qr.mask().value()
//! );
//! ```
//!
//! Render it for display:
//!
//! ```rust
//! use qrenc::render::{to_image, RenderConfig};
//! use qrenc::{EcLevel, QrCode};
//!
//! let qr = QrCode::encode_text("Hello, World!", EcLevel::Medium).unwrap();
//! let img = to_image(&qr, &RenderConfig::default());
//! assert_eq!(img.width(), img.height());
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: symbol construction and the finished [`QrCode`].
//! - [`segment`]: payload classification and segment bit packing.
//! - [`version`]: versions, error correction levels and capacity tables.
//! - [`reed_solomon`]: GF(256) arithmetic and Reed-Solomon remainders.
//! - [`render`]: utilities for rendering QR codes in various formats.

#![forbid(unsafe_code)]

pub mod bit_buffer;
pub mod config;
pub mod error;
pub mod mask;
pub mod qrcode;
pub mod reed_solomon;
pub mod render;
pub mod segment;
pub mod version;

pub use bit_buffer::BitBuffer;
pub use config::EncodeOptions;
pub use error::{QrError, Result};
pub use mask::Mask;
pub use qrcode::QrCode;
pub use segment::{QrSegment, SegmentMode};
pub use version::{EcLevel, Version};

/// Encodes `text` with the given options: classifies the payload, picks the smallest
/// version (and possibly a stronger level), packs and error-corrects the data, and
/// draws the masked symbol.
///
/// The returned [`QrCode`] reports the version, level and mask that were chosen.
pub fn encode(text: &str, options: &EncodeOptions) -> Result<QrCode> {
    let segs = QrSegment::make_segments(text);
    QrCode::encode_segments_advanced(&segs, options)
}
