//! Video frame types and processing

use image::{GrayImage, RgbImage};

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds since the source was created)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl Frame {
    /// Create a new frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns: 0,
            sequence: 0,
        }
    }

    /// Create a black frame of the given size
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(vec![0; (width * height * 3) as usize], width, height)
    }

    /// A frame with no pixels, or fewer bytes than its dimensions require.
    pub fn is_empty(&self) -> bool {
        self.width == 0
            || self.height == 0
            || self.data.len() < (self.width as usize) * (self.height as usize) * 3
    }

    /// Convert to a single-channel luminance image
    pub fn to_luma(&self) -> GrayImage {
        let mut gray = Vec::with_capacity((self.width * self.height) as usize);
        for pixel in self.data.chunks_exact(3) {
            // Luminance formula: 0.299*R + 0.587*G + 0.114*B
            let y = (pixel[0] as f32 * 0.299
                   + pixel[1] as f32 * 0.587
                   + pixel[2] as f32 * 0.114) as u8;
            gray.push(y);
        }
        gray.resize((self.width * self.height) as usize, 0);
        GrayImage::from_raw(self.width, self.height, gray)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// Copy the frame into an `image` RGB buffer
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.is_empty() {
            return None;
        }
        let len = (self.width * self.height * 3) as usize;
        RgbImage::from_raw(self.width, self.height, self.data[..len].to_vec())
    }

    /// Crop a region of the frame
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Option<Frame> {
        if w == 0 || h == 0 || x + w > self.width || y + h > self.height || self.is_empty() {
            return None;
        }

        let mut cropped = Vec::with_capacity((w * h * 3) as usize);
        for row in y..(y + h) {
            let start = ((row * self.width + x) * 3) as usize;
            let end = start + (w * 3) as usize;
            cropped.extend_from_slice(&self.data[start..end]);
        }

        Some(Frame {
            data: cropped,
            width: w,
            height: h,
            timestamp_ns: self.timestamp_ns,
            sequence: self.sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0]);
            }
        }
        Frame::new(data, width, height)
    }

    #[test]
    fn test_empty_detection() {
        assert!(Frame::new(vec![], 0, 0).is_empty());
        assert!(Frame::new(vec![0; 10], 4, 4).is_empty());
        assert!(!Frame::blank(4, 4).is_empty());
    }

    #[test]
    fn test_luma_weights() {
        let frame = Frame::new(vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255], 2, 2);
        let gray = frame.to_luma();
        assert_eq!(gray.dimensions(), (2, 2));
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 149);
        assert_eq!(gray.get_pixel(0, 1)[0], 29);
        assert!(gray.get_pixel(1, 1)[0] >= 254);
    }

    #[test]
    fn test_crop() {
        let frame = gradient(10, 8);
        let cropped = frame.crop(2, 3, 4, 2).unwrap();
        assert_eq!((cropped.width, cropped.height), (4, 2));
        let rgb = cropped.to_rgb_image().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [2, 3, 0]);
        assert_eq!(rgb.get_pixel(3, 1).0, [5, 4, 0]);

        assert!(frame.crop(8, 0, 4, 2).is_none());
        assert!(frame.crop(0, 0, 0, 2).is_none());
    }

    #[test]
    fn test_rgb_image_ignores_trailing_bytes() {
        let mut frame = gradient(3, 3);
        frame.data.extend_from_slice(&[9; 6]);
        let rgb = frame.to_rgb_image().unwrap();
        assert_eq!(rgb.dimensions(), (3, 3));
        assert_eq!(rgb.get_pixel(2, 2).0, [2, 2, 0]);
        assert!(Frame::new(vec![0; 5], 3, 3).to_rgb_image().is_none());
    }

    proptest! {
        #[test]
        fn crop_copies_the_requested_window(
            (width, height, x, y, w, h) in (1u32..48, 1u32..48).prop_flat_map(|(width, height)| {
                (Just(width), Just(height), 0..width, 0..height)
            }).prop_flat_map(|(width, height, x, y)| {
                (Just(width), Just(height), Just(x), Just(y), 1..=width - x, 1..=height - y)
            })
        ) {
            let frame = gradient(width, height);
            let cropped = frame.crop(x, y, w, h).unwrap();
            prop_assert_eq!((cropped.width, cropped.height), (w, h));
            prop_assert_eq!(cropped.to_luma().dimensions(), (w, h));

            let rgb = cropped.to_rgb_image().unwrap();
            prop_assert_eq!(rgb.get_pixel(0, 0).0, [x as u8, y as u8, 0]);
            prop_assert_eq!(rgb.get_pixel(w - 1, h - 1).0, [(x + w - 1) as u8, (y + h - 1) as u8, 0]);
        }

        #[test]
        fn crop_past_the_edge_is_rejected(width in 1u32..48, height in 1u32..48, overhang in 1u32..8) {
            let frame = Frame::blank(width, height);
            prop_assert!(frame.crop(0, 0, width + overhang, height).is_none());
            prop_assert!(frame.crop(0, 0, width, height + overhang).is_none());
        }
    }
}
