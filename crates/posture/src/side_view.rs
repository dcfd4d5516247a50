//! Best-effort hunchback heuristic on a profile-face crop.
//!
//! Edges inside the profile box are traced into external contours; any
//! sizeable contour whose centroid angle (measured from the crop origin)
//! exceeds the configured threshold is reported as a hunchback. This is a
//! coarse silhouette cue, not a calibrated spinal measurement.

use camera_capture::Frame;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::edges::canny;
use imageproc::point::Point;
use tracing::debug;

use crate::region::FaceRegion;

/// Canny hysteresis thresholds
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

/// Contours enclosing less than this many square pixels are ignored
pub const MIN_CONTOUR_AREA: f64 = 100.0;

/// Check the profile region of `frame` for a hunched silhouette
pub fn detect_hunchback(frame: &Frame, region: FaceRegion, angle_threshold: f64) -> bool {
    let Some(region) = region.clamp_to(frame.width, frame.height) else {
        return false;
    };
    let Some(crop) = frame.crop(region.x, region.y, region.width, region.height) else {
        return false;
    };

    let edges = canny(&crop.to_luma(), CANNY_LOW, CANNY_HIGH);
    hunchback_in_edges(&edges, angle_threshold)
}

/// Contour analysis on an edge map
pub fn hunchback_in_edges(edges: &GrayImage, angle_threshold: f64) -> bool {
    let contours = find_contours::<i32>(edges);

    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
    {
        let area = polygon_area(&contour.points);
        if area < MIN_CONTOUR_AREA {
            continue;
        }

        let angle = centroid_angle(&contour.points);
        if angle > angle_threshold {
            debug!(
                "Contour of area {:.0} at {:.1} deg exceeds {:.1} deg",
                area, angle, angle_threshold
            );
            return true;
        }
    }

    false
}

/// Angle of the point centroid from the origin, in degrees within [0, 360)
pub fn centroid_angle(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));

    let angle = (sum_y / n).atan2(sum_x / n).to_degrees();
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Enclosed area of a closed polygon (shoelace formula)
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();

    twice_area.abs() as f64 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_hollow_rect_mut;
    use imageproc::rect::Rect;

    fn outline(width: u32, height: u32, rect: Rect) -> GrayImage {
        let mut edges = GrayImage::new(width, height);
        draw_hollow_rect_mut(&mut edges, rect, Luma([255u8]));
        edges
    }

    #[test]
    fn test_polygon_area() {
        let square = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(polygon_area(&square), 100.0);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_centroid_angle() {
        let diagonal = [Point::new(10, 10), Point::new(20, 20)];
        assert!((centroid_angle(&diagonal) - 45.0).abs() < 1e-9);

        let below = [Point::new(0, 10), Point::new(0, 20)];
        assert!((centroid_angle(&below) - 90.0).abs() < 1e-9);

        let left = [Point::new(-10, -1), Point::new(-20, -1)];
        let angle = centroid_angle(&left);
        assert!(angle > 180.0 && angle < 360.0);

        assert_eq!(centroid_angle(&[Point::new(3, 4)]), 0.0);
    }

    #[test]
    fn test_steep_contour_flags_hunchback() {
        // Centroid around (70, 130): atan2 ~ 61.7 deg
        let edges = outline(200, 200, Rect::at(40, 100).of_size(60, 60));
        assert!(hunchback_in_edges(&edges, 50.0));
        assert!(!hunchback_in_edges(&edges, 70.0));
    }

    #[test]
    fn test_small_contours_ignored() {
        // 6x6 outline encloses well under 100 px^2
        let edges = outline(100, 100, Rect::at(10, 60).of_size(6, 6));
        assert!(!hunchback_in_edges(&edges, 10.0));
    }

    #[test]
    fn test_blank_crop_is_upright() {
        let frame = Frame::blank(120, 120);
        assert!(!detect_hunchback(&frame, FaceRegion::new(10, 10, 80, 80), 10.0));
    }

    #[test]
    fn test_region_outside_frame() {
        let frame = Frame::blank(50, 50);
        assert!(!detect_hunchback(&frame, FaceRegion::new(60, 60, 10, 10), 10.0));
    }
}
