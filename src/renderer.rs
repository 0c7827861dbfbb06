use rayon::{
    iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::{
    camera::Camera,
    raycast::{Hit, HitAxis, cast},
    world::{Rgb, WallPalette, World},
};

const BACKGROUND: Rgb = Rgb::BLACK;

/// Vertical run of wall pixels for one screen column, rows `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub column: usize,
    pub start: usize,
    pub end: usize,
    pub color: Rgb,
}

impl Slice {
    #[inline]
    pub fn covers(&self, row: usize) -> bool {
        (self.start..self.end).contains(&row)
    }
}

/// Turns a hit into a centered wall slice. X-axis hits are drawn at half
/// brightness.
pub fn project(hit: &Hit, column: usize, screen_height: usize, palette: &WallPalette) -> Slice {
    let h = screen_height as i32;
    // float to int casts saturate, so a wall touching the camera is fine
    let line_height = (screen_height as f32 / hit.perp_dist) as i32;

    let start = (-line_height / 2 + h / 2).clamp(0, h);
    let end = (line_height / 2 + h / 2).clamp(0, h);

    let base = palette.color(hit.kind);
    let color = match hit.axis {
        HitAxis::X => base.halved(),
        HitAxis::Y => base,
    };

    Slice {
        column,
        start: start as usize,
        end: end as usize,
        color,
    }
}

/// One entry per column; `None` where the column's ray was degenerate.
pub fn cast_columns(
    width: usize,
    height: usize,
    world: &World,
    camera: &Camera,
) -> Vec<Option<Slice>> {
    (0..width)
        .into_par_iter()
        .map(|column| {
            let ray = camera.ray_for_column(column, width)?;
            let hit = cast(&ray, &world.map);
            Some(project(&hit, column, height, &world.palette))
        })
        .collect()
}

/// Paints row-major `slices` into `buf`, rows in parallel.
pub fn paint(buf: &mut [u32], width: usize, slices: &[Option<Slice>]) {
    let background = BACKGROUND.pack();
    buf.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (px, slice) in row.iter_mut().zip(slices) {
            *px = match slice {
                Some(s) if s.covers(y) => s.color.pack(),
                _ => background,
            };
        }
    });
}

pub fn render_frame(buf: &mut [u32], width: usize, height: usize, world: &World, camera: &Camera) {
    debug_assert_eq!(buf.len(), width * height);
    let slices = cast_columns(width, height, world, camera);
    paint(buf, width, &slices);
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, Vec2};

    use super::*;
    use crate::world::{GridMap, MapSource, WallKind};

    fn hit(perp_dist: f32, axis: HitAxis) -> Hit {
        Hit {
            cell: IVec2::new(4, 2),
            kind: WallKind::Violet,
            axis,
            perp_dist,
            steps: 2,
        }
    }

    fn default_world() -> World {
        World::new(
            GridMap::load(&MapSource::default()).unwrap(),
            WallPalette::default(),
        )
    }

    fn start_camera() -> Camera {
        Camera::new(
            Vec2::new(2.5, 2.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-0.66, 0.0),
            Vec2::splat(0.375),
        )
    }

    #[test]
    fn slice_height_follows_distance() {
        let palette = WallPalette::default();

        let near = project(&hit(1.0, HitAxis::Y), 3, 720, &palette);
        assert_eq!((near.start, near.end), (0, 720));

        let far = project(&hit(2.0, HitAxis::Y), 3, 720, &palette);
        assert_eq!((far.start, far.end), (180, 540));
        assert_eq!(far.column, 3);

        let odd = project(&hit(3.0, HitAxis::Y), 0, 720, &palette);
        assert_eq!((odd.start, odd.end), (240, 480));
    }

    #[test]
    fn slice_is_clamped_to_screen() {
        let palette = WallPalette::default();
        let s = project(&hit(0.05, HitAxis::Y), 0, 720, &palette);
        assert_eq!((s.start, s.end), (0, 720));

        let s = project(&hit(1.0e-9, HitAxis::Y), 0, 720, &palette);
        assert_eq!((s.start, s.end), (0, 720));
    }

    #[test]
    fn x_axis_hits_are_darkened() {
        let palette = WallPalette::default();
        let base = palette.color(WallKind::Violet);

        assert_eq!(project(&hit(2.0, HitAxis::Y), 0, 720, &palette).color, base);
        assert_eq!(
            project(&hit(2.0, HitAxis::X), 0, 720, &palette).color,
            Rgb::new(0x40, 0x00, 0x7F)
        );
    }

    #[test]
    fn degenerate_column_yields_no_slice() {
        let world = default_world();
        let slices = cast_columns(64, 72, &world, &start_camera());
        assert_eq!(slices.len(), 64);
        assert!(slices[32].is_none());
        assert_eq!(slices.iter().filter(|s| s.is_none()).count(), 1);
        for (x, s) in slices.iter().enumerate().filter_map(|(x, s)| s.map(|s| (x, s))) {
            assert_eq!(s.column, x);
            assert!(s.start <= s.end && s.end <= 72);
        }
    }

    #[test]
    fn frame_paints_wall_band_over_background() {
        let world = default_world();
        let (w, h) = (64, 72);
        let mut buf = vec![0xDEAD_BEEF; w * h];
        render_frame(&mut buf, w, h, &world, &start_camera());

        // leftmost ray meets the x-face of the stone wall at (4, 4)
        let stone = world.palette.color(WallKind::Stone).halved().pack();
        assert_eq!(buf[(h / 2) * w], stone);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[(h - 1) * w], 0);

        // the skipped center column stays background
        assert!((0..h).all(|y| buf[y * w + 32] == 0));
    }
}
