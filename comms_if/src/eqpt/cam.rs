//! # Camera Equipment Communications Module
//!
//! The camera bridge publishes [`CamFrame`]s as JSON, with the encoded image bytes carried as a
//! base64 string.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use image::{DynamicImage, ImageResult};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An individual encoded frame from the camera
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CamFrame {
    /// UTC timestamp at which the frame was acquired
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// The format of this frame
    pub format: ImageFormat,

    /// The formatted image data
    #[serde(with = "base64_data")]
    pub data: Vec<u8>,
}

/// A decoded camera image
#[derive(Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself
    pub image: DynamicImage,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible formats for camera images. This is used rather than image::ImageFormat to:
///     1. Restrict the formats that can be sent back and forth
///     2. Allow serialisation as image::ImageFormat does not implement serde.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub enum ImageFormat {
    /// PNG image
    Png,

    /// JPEG image with a quality value between 1 and 100, where 100 is best.
    Jpeg(u8),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamFrame {
    /// Convert this camera frame into a camera image
    pub fn to_cam_image(&self) -> ImageResult<CamImage> {
        let format = match self.format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg(_) => image::ImageFormat::Jpeg,
        };

        Ok(CamImage {
            timestamp: self.timestamp,
            image: image::load_from_memory_with_format(&self.data, format)?,
        })
    }
}

impl CamImage {
    /// Convert this camera image into a camera frame with the given format
    pub fn to_cam_frame(&self, format: ImageFormat) -> ImageResult<CamFrame> {
        let output_format = match format {
            ImageFormat::Png => image::ImageOutputFormat::Png,
            ImageFormat::Jpeg(q) => image::ImageOutputFormat::Jpeg(q),
        };

        let mut cursor = Cursor::new(Vec::<u8>::new());
        self.image.write_to(&mut cursor, output_format)?;

        Ok(CamFrame {
            timestamp: self.timestamp,
            format,
            data: cursor.into_inner(),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// SERDE HELPERS
// ------------------------------------------------------------------------------------------------

mod base64_data {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::decode(s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_frame_over_json() {
        let mut img = RgbImage::new(4, 3);
        img.put_pixel(2, 1, Rgb([255, 0, 255]));

        let cam_image = CamImage {
            timestamp: Utc.timestamp_millis_opt(1_600_000_000_123).unwrap(),
            image: DynamicImage::ImageRgb8(img),
        };

        let frame = cam_image.to_cam_frame(ImageFormat::Png).unwrap();
        let json = serde_json::to_string(&frame).unwrap();

        // Image bytes travel as a base64 string rather than a json array of numbers
        assert!(json.contains("\"data\":\""));

        let decoded: CamFrame = serde_json::from_str(&json).unwrap();
        let back = decoded.to_cam_image().unwrap();

        assert_eq!(back.timestamp, cam_image.timestamp);
        let rgb = back.image.to_rgb8();
        assert_eq!(rgb.dimensions(), (4, 3));
        assert_eq!(rgb.get_pixel(2, 1), &Rgb([255, 0, 255]));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }
}
