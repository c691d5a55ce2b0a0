// File: ./src/tui/sprites.rs
// Confetti surface backed by a list of point clouds for ratatui's Canvas.
use crate::color_utils::{self, Rgb};
use crate::confetti::Surface;

const BACKGROUND: Rgb = (0, 0, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// Canvas coordinates (y grows upwards).
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
}

#[derive(Debug, Default)]
pub struct Sprites {
    height: f64,
    pieces: Vec<Piece>,
}

impl Sprites {
    pub fn resize(&mut self, height: f64) {
        self.height = height;
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

impl Surface for Sprites {
    fn clear(&mut self) {
        self.pieces.clear();
    }

    fn fill_rect(
        &mut self,
        cx: f64,
        cy: f64,
        width: f64,
        height: f64,
        angle: f64,
        color: Rgb,
        opacity: f64,
    ) {
        let (sin, cos) = angle.to_radians().sin_cos();
        let mut points = Vec::new();

        // One sample per braille dot is enough at this size.
        let mut u = -width / 2.0;
        while u <= width / 2.0 {
            let mut v = -height / 2.0;
            while v <= height / 2.0 {
                let x = cx + u * cos - v * sin;
                let y = cy + u * sin + v * cos;
                points.push((x, self.height - y));
                v += 1.0;
            }
            u += 1.0;
        }

        self.pieces.push(Piece {
            points,
            color: color_utils::fade(color, BACKGROUND, opacity),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrotated_rect_is_flipped_into_canvas_space() {
        let mut sprites = Sprites::default();
        sprites.resize(100.0);
        sprites.fill_rect(10.0, 20.0, 2.0, 2.0, 0.0, (255, 0, 0), 1.0);

        let piece = &sprites.pieces()[0];
        assert_eq!(piece.color, (255, 0, 0));
        assert_eq!(piece.points.len(), 9);
        assert!(piece.points.contains(&(9.0, 81.0)));
        assert!(piece.points.contains(&(11.0, 79.0)));
    }

    #[test]
    fn clear_drops_everything() {
        let mut sprites = Sprites::default();
        sprites.fill_rect(0.0, 0.0, 4.0, 2.0, 45.0, (0, 0, 255), 0.5);
        assert!(!sprites.is_empty());
        sprites.clear();
        assert!(sprites.is_empty());
    }
}
