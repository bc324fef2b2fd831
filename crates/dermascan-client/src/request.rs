//! Outbound request descriptors for the classification and directory
//! endpoints.
//!
//! Builders here are pure: they encode payloads but never touch the network.
//! [`crate::DermascanClient`] turns a descriptor into an HTTP call.

use dermascan_core::Coordinate;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use reqwest::multipart::{Form, Part};

use crate::error::ClientError;

/// JPEG quality used when re-encoding the captured image.
pub const JPEG_QUALITY: u8 = 90;

/// Overpass `around:` radius for the provider search.
pub const SEARCH_RADIUS_METERS: u32 = 5000;

/// Multipart field the classification server reads the upload from.
pub const IMAGE_FIELD_NAME: &str = "image";
const IMAGE_FILE_NAME: &str = "capture.jpg";
const IMAGE_MIME: &str = "image/jpeg";

/// Form field the Overpass interpreter reads the query from.
pub const QUERY_FIELD_NAME: &str = "data";

/// A JPEG upload ready to be posted as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyRequest {
    jpeg: Vec<u8>,
}

impl ClassifyRequest {
    /// Re-encode `image` as baseline RGB JPEG at [`JPEG_QUALITY`].
    ///
    /// Alpha is dropped: JPEG has no alpha channel and the classifier only
    /// looks at colour.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] if the encoder rejects the image.
    pub fn from_image(image: &DynamicImage) -> Result<Self, ClientError> {
        let rgb = image.to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(Self { jpeg })
    }

    /// Wrap bytes that are already JPEG-encoded.
    #[must_use]
    pub fn from_jpeg(jpeg: Vec<u8>) -> Self {
        Self { jpeg }
    }

    #[must_use]
    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    /// Build the single-field multipart body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the MIME type fails to parse, which
    /// cannot happen for the constant used here.
    pub fn multipart_form(&self) -> Result<Form, ClientError> {
        let part = Part::bytes(self.jpeg.clone())
            .file_name(IMAGE_FILE_NAME)
            .mime_str(IMAGE_MIME)?;
        Ok(Form::new().part(IMAGE_FIELD_NAME, part))
    }
}

/// An Overpass QL query for dermatologists and doctor offices around a point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRequest {
    query: String,
}

impl DirectoryRequest {
    #[must_use]
    pub fn near(center: Coordinate) -> Self {
        let (lat, lon) = (center.lat, center.lon);
        let r = SEARCH_RADIUS_METERS;
        let query = format!(
            "[out:json][timeout:25];\n\
             (\n  \
             node[\"healthcare\"=\"dermatologist\"](around:{r},{lat},{lon});\n  \
             node[\"amenity\"=\"doctors\"](around:{r},{lat},{lon});\n\
             );\n\
             out body;"
        );
        Self { query }
    }

    /// Raw Overpass QL text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Fields for the urlencoded body: a single `data` pair holding the query.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, &str); 1] {
        [(QUERY_FIELD_NAME, self.query.as_str())]
    }
}
