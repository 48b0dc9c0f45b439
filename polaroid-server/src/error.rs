//! Error taxonomy for the composition and storage boundaries.

use thiserror::Error;

/// Failures while turning an uploaded byte stream into an encoded polaroid.
/// Decode, orientation, resize and encode all collapse into one of these;
/// callers never receive partial output.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("could not decode uploaded image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode composed image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Failures talking to the Cloudinary API.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("cloudinary request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("cloudinary responded with status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}
