use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source column/row for every destination pixel.
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_row: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_row: Vec::new(),
        }
    }

    #[inline]
    pub fn matches(&self, dst_w: usize, dst_h: usize) -> bool {
        self.src_x.len() == dst_w && self.src_row.len() == dst_h
    }
}

/// Nearest-neighbour mapping, keeps wall edges hard at any window size.
/// `src_row` holds row offsets (`y * src_w`) so the blit skips a multiply.
pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    let sx = src_w as f32 / dst_w as f32;
    let sy = src_h as f32 / dst_h as f32;

    let src_x = (0..dst_w)
        .map(|x| (((x as f32 + 0.5) * sx) as usize).min(src_w - 1))
        .collect();
    let src_row = (0..dst_h)
        .map(|y| (((y as f32 + 0.5) * sy) as usize).min(src_h - 1) * src_w)
        .collect();

    ScaleLut { src_x, src_row }
}

/// Parallel stretch of `src` onto `dst`, one destination row per task.
pub fn blit_nearest(dst: &mut [u32], dw: usize, src: &[u32], lut: &ScaleLut) {
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let row = &src[lut.src_row[y]..];
        for (px, &x) in dst_row.iter_mut().zip(&lut.src_x) {
            *px = row[x];
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_size_is_identity() {
        let src: Vec<u32> = (0..12).collect();
        let lut = build_scale_lut(4, 3, 4, 3);
        assert!(lut.matches(4, 3));

        let mut dst = vec![0; 12];
        blit_nearest(&mut dst, 4, &src, &lut);
        assert_eq!(dst, src);
    }

    #[test]
    fn doubling_repeats_pixels() {
        let src = vec![1, 2, 3, 4];
        let lut = build_scale_lut(4, 4, 2, 2);

        let mut dst = vec![0; 16];
        blit_nearest(&mut dst, 4, &src, &lut);
        assert_eq!(
            dst,
            vec![1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]
        );
    }

    #[test]
    fn shrinking_stays_in_bounds() {
        let src: Vec<u32> = (0..(1280 * 720)).collect();
        let lut = build_scale_lut(7, 5, 1280, 720);
        let mut dst = vec![0; 35];
        blit_nearest(&mut dst, 7, &src, &lut);
        assert!(dst.iter().all(|&p| (p as usize) < src.len()));
        assert!(!lut.matches(1280, 720));
    }
}
