//! Debug overlay rendering and display sinks
//!
//! Rendering only reads analysis results; nothing here feeds back into
//! classification.

use camera_capture::Frame;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use posture::{FaceRegion, PostureAnalysis};

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const GUIDE: Rgb<u8> = Rgb([255, 255, 0]);

/// Annotated frame plus the status text to show next to it
#[derive(Debug, Clone)]
pub struct Overlay {
    pub image: RgbImage,
    pub status: Vec<String>,
}

/// Destination for debug overlays
pub trait DisplaySink {
    /// Whether overlays should be rendered at all
    fn wants_frames(&self) -> bool {
        true
    }

    fn show(&mut self, overlay: &Overlay);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn wants_frames(&self) -> bool {
        false
    }

    fn show(&mut self, _overlay: &Overlay) {}
}

/// Draw the face box and the third-line guides onto a copy of `frame`
pub fn render(frame: &Frame, analysis: &PostureAnalysis) -> Option<Overlay> {
    let mut image = frame.to_rgb_image()?;
    let (width, height) = image.dimensions();

    for i in 1..3 {
        let y = (height * i / 3) as f32;
        draw_line_segment_mut(&mut image, (0.0, y), (width as f32, y), GUIDE);
    }

    if let Some(face) = analysis.face {
        let color = if analysis.result.is_correct { GREEN } else { RED };
        draw_region(&mut image, face, color);
    }

    if let Some(profile) = analysis.profile_face {
        if analysis.face != Some(profile) {
            draw_region(&mut image, profile, BLUE);
        }
    }

    let mut status = vec![analysis.result.summary()];
    if let Some(side_view) = analysis.result.side_view {
        status.push(side_view.to_string());
    }

    Some(Overlay { image, status })
}

fn draw_region(image: &mut RgbImage, region: FaceRegion, color: Rgb<u8>) {
    let (width, height) = image.dimensions();
    if let Some(region) = region.clamp_to(width, height) {
        let rect = Rect::at(region.x as i32, region.y as i32).of_size(region.width, region.height);
        draw_hollow_rect_mut(image, rect, color);
    }
}

#[cfg(feature = "opencv")]
pub use highgui::HighguiDisplay;

#[cfg(feature = "opencv")]
mod highgui {
    use opencv::{
        core::{Mat, Point, Scalar},
        highgui, imgproc,
        prelude::*,
    };
    use tracing::warn;

    use super::{DisplaySink, Overlay};

    /// OpenCV window
    pub struct HighguiDisplay {
        window: String,
    }

    impl HighguiDisplay {
        pub fn new(title: &str) -> opencv::Result<Self> {
            highgui::named_window_def(title)?;
            Ok(Self {
                window: title.to_string(),
            })
        }

        fn draw(&self, overlay: &Overlay) -> opencv::Result<()> {
            let (width, height) = overlay.image.dimensions();
            let flat = Mat::new_rows_cols_with_data(
                height as i32,
                width as i32 * 3,
                overlay.image.as_raw().as_slice(),
            )?;
            let rgb = flat.reshape(3, height as i32)?;

            let mut bgr = Mat::default();
            imgproc::cvt_color_def(&*rgb, &mut bgr, imgproc::COLOR_RGB2BGR)?;

            for (i, line) in overlay.status.iter().enumerate() {
                imgproc::put_text(
                    &mut bgr,
                    line,
                    Point::new(10, 25 + 25 * i as i32),
                    imgproc::FONT_HERSHEY_SIMPLEX,
                    0.6,
                    Scalar::new(255.0, 255.0, 255.0, 0.0),
                    2,
                    imgproc::LINE_8,
                    false,
                )?;
            }

            highgui::imshow(&self.window, &bgr)?;
            highgui::poll_key()?;
            Ok(())
        }
    }

    impl DisplaySink for HighguiDisplay {
        fn show(&mut self, overlay: &Overlay) {
            if let Err(e) = self.draw(overlay) {
                warn!("Display update failed: {}", e);
            }
        }
    }

    impl Drop for HighguiDisplay {
        fn drop(&mut self) {
            let _ = highgui::destroy_window(&self.window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture::{PostureResult, PostureSignals, SitDistance};
    use proptest::prelude::*;

    fn analysis(face: Option<FaceRegion>, result: PostureResult) -> PostureAnalysis {
        PostureAnalysis {
            result,
            face,
            source: None,
            candidates: face.iter().count(),
            profile_face: None,
            frame_width: 90,
            frame_height: 90,
        }
    }

    #[test]
    fn test_incorrect_posture_box_is_red() {
        let signals = PostureSignals {
            distance: SitDistance::TooFar,
            ..PostureSignals::normal()
        };
        let analysis = analysis(
            Some(FaceRegion::new(10, 40, 20, 20)),
            PostureResult::from_signals(signals),
        );

        let overlay = render(&Frame::blank(90, 90), &analysis).unwrap();
        assert_eq!(*overlay.image.get_pixel(10, 45), RED);
        assert_eq!(overlay.status, vec!["sitting too far from the screen".to_string()]);
    }

    #[test]
    fn test_correct_posture_box_is_green() {
        let analysis = analysis(
            Some(FaceRegion::new(10, 40, 20, 20)),
            PostureResult::from_signals(PostureSignals::normal()),
        );
        let overlay = render(&Frame::blank(90, 90), &analysis).unwrap();
        assert_eq!(*overlay.image.get_pixel(10, 45), GREEN);
    }

    #[test]
    fn test_guides_drawn_at_thirds() {
        let analysis = analysis(None, PostureResult::no_person());
        let overlay = render(&Frame::blank(90, 90), &analysis).unwrap();
        assert_eq!(*overlay.image.get_pixel(45, 30), GUIDE);
        assert_eq!(*overlay.image.get_pixel(45, 60), GUIDE);
        assert_eq!(*overlay.image.get_pixel(45, 45), Rgb([0, 0, 0]));
        assert_eq!(overlay.status, vec!["no person detected".to_string()]);
    }

    #[test]
    fn test_empty_frame_not_rendered() {
        let analysis = analysis(None, PostureResult::no_person());
        assert!(render(&Frame::new(Vec::new(), 0, 0), &analysis).is_none());
    }

    fn region() -> impl Strategy<Value = FaceRegion> {
        (0u32..200, 0u32..200, 1u32..200, 1u32..200)
            .prop_map(|(x, y, width, height)| FaceRegion::new(x, y, width, height))
    }

    proptest! {
        #[test]
        fn overlay_matches_frame_for_any_region(
            width in 1u32..120,
            height in 1u32..120,
            face in region(),
            profile in proptest::option::of(region()),
        ) {
            let mut analysis = analysis(Some(face), PostureResult::from_signals(PostureSignals::normal()));
            analysis.profile_face = profile;

            let overlay = render(&Frame::blank(width, height), &analysis).unwrap();
            prop_assert_eq!(overlay.image.dimensions(), (width, height));

            if profile.is_none() && face.x < width && face.y < height {
                prop_assert_eq!(*overlay.image.get_pixel(face.x, face.y), GREEN);
            }
        }
    }
}
