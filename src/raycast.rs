use glam::{IVec2, Vec2};

use crate::world::{GridMap, Tile, WallKind};

/// Which grid line the ray crossed last before hitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitAxis {
    /// Crossed a vertical grid line (stepped along x).
    X,
    /// Crossed a horizontal grid line (stepped along y).
    Y,
}

/// A ray whose direction has no zero component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec2,
    dir: Vec2,
}

impl Ray {
    /// Axis-aligned directions are rejected; callers skip the column.
    pub fn new(origin: Vec2, dir: Vec2) -> Option<Self> {
        if dir.x == 0.0 || dir.y == 0.0 {
            return None;
        }
        Some(Self { origin, dir })
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.dir
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub cell: IVec2,
    pub kind: WallKind,
    pub axis: HitAxis,
    /// Distance to the wall projected onto the view direction.
    pub perp_dist: f32,
    /// Cells entered before the hit, the hit cell included.
    pub steps: u32,
}

/// DDA walk from the ray origin to the first wall cell.
///
/// The origin must lie inside the map. Termination follows from the map's
/// wall border: whatever the direction, the walk enters a border cell after
/// at most `width + height` steps.
pub fn cast(ray: &Ray, map: &GridMap) -> Hit {
    let (origin, dir) = (ray.origin(), ray.dir());

    // ray length per whole cell in x and in y
    let delta = Vec2::new(
        (1.0 + (dir.y * dir.y) / (dir.x * dir.x)).sqrt(),
        (1.0 + (dir.x * dir.x) / (dir.y * dir.y)).sqrt(),
    );

    let mut cell = origin.floor().as_ivec2();
    let step = IVec2::new(
        if dir.x < 0.0 { -1 } else { 1 },
        if dir.y < 0.0 { -1 } else { 1 },
    );

    // ray length from origin to the first x and y grid lines
    let mut side_dist = Vec2::new(
        if dir.x < 0.0 {
            (origin.x - cell.x as f32) * delta.x
        } else {
            (cell.x as f32 + 1.0 - origin.x) * delta.x
        },
        if dir.y < 0.0 {
            (origin.y - cell.y as f32) * delta.y
        } else {
            (cell.y as f32 + 1.0 - origin.y) * delta.y
        },
    );

    let mut steps = 0;
    let (axis, kind) = loop {
        let axis = if side_dist.x < side_dist.y {
            side_dist.x += delta.x;
            cell.x += step.x;
            HitAxis::X
        } else {
            side_dist.y += delta.y;
            cell.y += step.y;
            HitAxis::Y
        };
        steps += 1;

        if let Tile::Wall(kind) = map.tile_at(cell.x as usize, cell.y as usize) {
            break (axis, kind);
        }
    };
    debug_assert!(
        steps as usize <= map.width() + map.height(),
        "ray walked {steps} cells on a {}x{} map",
        map.width(),
        map.height()
    );

    let perp_dist = match axis {
        HitAxis::X => ((cell.x as f32 - origin.x + ((1 - step.x) / 2) as f32) / dir.x).abs(),
        HitAxis::Y => ((cell.y as f32 - origin.y + ((1 - step.y) / 2) as f32) / dir.y).abs(),
    };

    Hit {
        cell,
        kind,
        axis,
        perp_dist,
        steps,
    }
}
