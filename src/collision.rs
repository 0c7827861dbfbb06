use glam::Vec2;

use crate::world::GridMap;

/// Axis-aligned collision extent of an actor, centered on its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub center: Vec2,
    pub size: Vec2,
}

impl Footprint {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }
}

/// True when the footprint lies inside the grid and every cell it touches
/// (inclusive on both corners) is floor.
pub fn can_occupy(center: Vec2, size: Vec2, map: &GridMap) -> bool {
    let footprint = Footprint::new(center, size);
    let (min, max) = (footprint.min(), footprint.max());

    let (w, h) = (map.width() as f32, map.height() as f32);
    if !(min.x >= 0.0 && min.y >= 0.0 && max.x < w && max.y < h) {
        return false;
    }

    let (x0, y0) = (min.x.floor() as usize, min.y.floor() as usize);
    let (x1, y1) = (max.x.floor() as usize, max.y.floor() as usize);
    (y0..=y1).all(|y| (x0..=x1).all(|x| map.is_floor(x, y)))
}
