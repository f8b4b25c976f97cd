//! Image intake and media type helpers.

pub mod intake;
pub mod mime_detect;

pub use intake::{ImageIntake, DEFAULT_MAX_IMAGE_BYTES};
pub use mime_detect::{canonical_image_type, detect_mime_type, is_image, sniff_image_type};
