//! Numeral atlases for die faces
//!
//! Each atlas is a horizontal strip with one tile per face, tile `k` showing
//! numeral `k + 1`. Numerals are drawn as seven-segment glyphs so the atlas
//! needs no font. 6 and 9 get an underline so they read correctly upside down.

use glam::Vec2;
use image::{Rgba, RgbaImage};

use super::vertex::colors;
use crate::dice::DieType;
use crate::dice::shapes::D4_FACES;

/// Tile edge in pixels for every die except the d4
pub const TILE_SIZE: u32 = 128;
/// The d4 carries three small numerals per face and gets larger tiles
pub const D4_TILE_SIZE: u32 = 256;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Segments: top, top-left, top-right, middle, bottom-left, bottom-right, bottom
const SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, false, true, true, true],
    [false, false, true, false, false, true, false],
    [true, false, true, true, true, false, true],
    [true, false, true, true, false, true, true],
    [false, true, true, true, false, true, false],
    [true, true, false, true, false, true, true],
    [true, true, false, true, true, true, true],
    [true, false, true, false, false, true, false],
    [true, true, true, true, true, true, true],
    [true, true, true, true, false, true, true],
];

/// Glyph proportions relative to glyph height
const GLYPH_WIDTH: f32 = 0.5;
const STROKE: f32 = 0.12;
const DIGIT_GAP: f32 = 0.18;
const UNDERLINE_DROP: f32 = 0.22;

/// Pixel height and vertical nudge of the face numerals
fn glyph_layout(kind: DieType) -> (f32, f32) {
    match kind {
        DieType::D4 => (40.0, 0.0),
        DieType::D6 => (52.0, 0.0),
        DieType::D8 => (40.0, 0.0),
        // Kites are pointy at the top; lift the numeral towards their wide part
        DieType::D10 => (34.0, -6.0),
        DieType::D12 | DieType::D20 => (42.0, 0.0),
    }
}

/// Rasterise the label atlas for `kind`
pub fn label_atlas(kind: DieType) -> RgbaImage {
    let fill = Rgba(colors::to_rgba8(colors::die_fill(kind)));
    match kind {
        DieType::D4 => d4_atlas(fill),
        _ => {
            let faces = kind.face_count();
            let mut img = RgbaImage::from_pixel(TILE_SIZE * faces, TILE_SIZE, fill);
            let (height, nudge) = glyph_layout(kind);
            let half = TILE_SIZE as f32 / 2.0;
            for face in 0..faces {
                let center = Vec2::new((face * TILE_SIZE) as f32 + half, half + nudge);
                draw_numeral(&mut img, face + 1, center, height, 0.0);
            }
            img
        }
    }
}

/// d4 faces show the numeral of each corner, rotated to read from that corner
fn d4_atlas(fill: Rgba<u8>) -> RgbaImage {
    let tile = D4_TILE_SIZE as f32;
    let mut img = RgbaImage::from_pixel(D4_TILE_SIZE * 4, D4_TILE_SIZE, fill);
    // Matches the per-corner UVs: apex, bottom-left, bottom-right
    let corners = [
        Vec2::new(0.5, 0.30),
        Vec2::new(0.18, 0.88),
        Vec2::new(0.82, 0.88),
    ];
    let (height, _) = glyph_layout(DieType::D4);

    for (i, face) in D4_FACES.iter().enumerate() {
        let x0 = i as f32 * tile;
        let center = Vec2::new(x0 + tile / 2.0, tile / 2.0);
        for (corner, &vertex) in corners.iter().zip(face.iter()) {
            let base = Vec2::new(x0 + corner.x * tile, corner.y * tile);
            let towards = center - base;
            let at = base + towards * 0.15;
            let angle = towards.y.atan2(towards.x) + std::f32::consts::PI * 1.5;
            draw_numeral(&mut img, vertex as u32 + 1, at, height, angle);
        }
    }
    img
}

/// Draw `value` centred on `center`, glyph `height` pixels tall, rotated by
/// `angle` radians (clockwise on screen).
pub fn draw_numeral(img: &mut RgbaImage, value: u32, center: Vec2, height: f32, angle: f32) {
    let digits: Vec<u32> = value
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    let width = GLYPH_WIDTH * height;
    let gap = DIGIT_GAP * height;
    let stroke = STROKE * height;
    let total = digits.len() as f32 * width + (digits.len().saturating_sub(1)) as f32 * gap;
    let rot = Vec2::from_angle(angle);

    for (n, &digit) in digits.iter().enumerate() {
        let x = -total / 2.0 + width / 2.0 + n as f32 * (width + gap);
        for (segment, lit) in SEGMENTS[digit as usize].iter().enumerate() {
            if !lit {
                continue;
            }
            let (offset, half) = segment_rect(segment, width, height, stroke);
            let local = Vec2::new(x, 0.0) + offset;
            fill_rotated_rect(img, center + rot.rotate(local), half, rot);
        }
    }

    if value == 6 || value == 9 {
        let offset = Vec2::new(0.0, height / 2.0 + UNDERLINE_DROP * height);
        let half = Vec2::new(width * 0.6, stroke / 2.0);
        fill_rotated_rect(img, center + rot.rotate(offset), half, rot);
    }
}

/// Centre offset and half extents of one segment (y grows downwards)
fn segment_rect(segment: usize, width: f32, height: f32, stroke: f32) -> (Vec2, Vec2) {
    let horizontal = Vec2::new(width / 2.0, stroke / 2.0);
    let vertical = Vec2::new(stroke / 2.0, height / 4.0);
    match segment {
        0 => (Vec2::new(0.0, -height / 2.0), horizontal),
        1 => (Vec2::new(-width / 2.0, -height / 4.0), vertical),
        2 => (Vec2::new(width / 2.0, -height / 4.0), vertical),
        3 => (Vec2::ZERO, horizontal),
        4 => (Vec2::new(-width / 2.0, height / 4.0), vertical),
        5 => (Vec2::new(width / 2.0, height / 4.0), vertical),
        _ => (Vec2::new(0.0, height / 2.0), horizontal),
    }
}

/// Fill every pixel whose centre lies inside the rotated rectangle
fn fill_rotated_rect(img: &mut RgbaImage, center: Vec2, half: Vec2, rot: Vec2) {
    let reach = half.length().ceil();
    let min_x = (center.x - reach).floor().max(0.0) as u32;
    let min_y = (center.y - reach).floor().max(0.0) as u32;
    let max_x = ((center.x + reach).ceil() as u32).min(img.width());
    let max_y = ((center.y + reach).ceil() as u32).min(img.height());
    let inverse = Vec2::new(rot.x, -rot.y);

    for py in min_y..max_y {
        for px in min_x..max_x {
            let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5) - center;
            let local = inverse.rotate(p);
            if local.x.abs() <= half.x && local.y.abs() <= half.y {
                img.put_pixel(px, py, INK);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_ink(img: &RgbaImage, x: f32, y: f32) -> bool {
        *img.get_pixel(x as u32, y as u32) == INK
    }

    #[test]
    fn test_atlas_dimensions() {
        for kind in DieType::ALL {
            let img = label_atlas(kind);
            if kind == DieType::D4 {
                assert_eq!((img.width(), img.height()), (1024, 256));
            } else {
                assert_eq!(img.width(), TILE_SIZE * kind.face_count());
                assert_eq!(img.height(), TILE_SIZE);
            }
        }
    }

    #[test]
    fn test_tile_corners_keep_fill() {
        let img = label_atlas(DieType::D20);
        let fill = Rgba(colors::to_rgba8(colors::die_fill(DieType::D20)));
        for tile in 0..20 {
            assert_eq!(*img.get_pixel(tile * TILE_SIZE + 2, 2), fill);
        }
    }

    #[test]
    fn test_eight_lights_middle_segment() {
        let img = label_atlas(DieType::D8);
        // Tile 7 shows "8", tile 6 shows "7" which has no middle bar
        let half = TILE_SIZE as f32 / 2.0;
        assert!(is_ink(&img, 7.0 * TILE_SIZE as f32 + half, half));
        assert!(!is_ink(&img, 6.0 * TILE_SIZE as f32 + half, half));
    }

    #[test]
    fn test_six_and_nine_are_underlined() {
        let img = label_atlas(DieType::D12);
        let (height, nudge) = glyph_layout(DieType::D12);
        let half = TILE_SIZE as f32 / 2.0;
        let y = half + nudge + height / 2.0 + UNDERLINE_DROP * height;
        let at = |face: u32| is_ink(&img, (face * TILE_SIZE) as f32 + half, y);
        assert!(at(5), "6 underlined");
        assert!(at(8), "9 underlined");
        assert!(!at(4), "5 plain");
        assert!(!at(7), "8 plain");
    }

    #[test]
    fn test_rotated_numeral_stays_in_bounds() {
        let mut img = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));
        draw_numeral(&mut img, 20, Vec2::new(2.0, 2.0), 30.0, 1.0);
        draw_numeral(&mut img, 20, Vec2::new(62.0, 62.0), 30.0, -2.0);
        assert!(img.pixels().any(|p| *p == INK));
    }
}
