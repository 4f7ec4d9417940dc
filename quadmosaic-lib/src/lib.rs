mod block;
mod buffer;
mod cache;
mod differ;
mod frame;
mod frames;
mod params;
mod refresh;
mod region;
mod sampler;
mod source;
mod stats;
mod tree;

use self::{frame::*, frames::*};
pub use ::image::{Rgb, RgbImage, RgbaImage};
use anyhow::{ensure, Context, Result};
use log::trace;

pub use self::{
    block::*, buffer::*, cache::*, differ::*, params::*, refresh::*, region::*, sampler::*,
    source::*, stats::*, tree::*,
};

/// One capture or display pipeline. Frames must be added in order; each
/// call is diffed against the previous one.
#[derive(Debug)]
pub struct Session<'a> {
    params: &'a Params,
    sampler: Box<dyn Sampler>,
    stats: Stats,
    cache: Option<Cache>,
}

impl<'a> Session<'a> {
    pub fn new(params: &'a Params) -> Self {
        Self::with_sampler(params, Box::new(Weighted::new(params.seed)))
    }

    /// The sampler only matters when the params set a sample budget.
    pub fn with_sampler(params: &'a Params, sampler: Box<dyn Sampler>) -> Self {
        Self {
            params,
            sampler,
            stats: Default::default(),
            cache: Default::default(),
        }
    }

    pub fn add(&mut self, curr: PixelBuffer) -> Result<&BlockSet> {
        let refresh = {
            let ctxt = FrameCtxt {
                params: self.params,
                sampler: &*self.sampler,
                frame: self.stats.frames as u64,
                prev: self.cache.as_ref(),
                curr: &curr,
            };

            let strategies: [fn(FrameCtxt<'_>) -> Option<Refresh>; 3] = [
                DFrame::build_refresh,
                PFrame::build_refresh,
                IFrame::build_refresh,
            ];

            strategies
                .iter()
                .find_map(|build| build(ctxt))
                .context("No update strategy applies")? // iframes always apply
        };

        let (kind, checked) = (refresh.kind(), refresh.checked());

        let cache = match (refresh.into_tree(), self.cache.take()) {
            (Some(tree), _) => Cache::new(curr, tree),

            (None, Some(mut cache)) => {
                cache.replace_frame(curr);
                cache
            }

            (None, None) => {
                let tree = Builder::new(self.params, &curr).build();
                Cache::new(curr, tree)
            }
        };

        self.stats.record(kind, checked, &cache);

        trace!(
            "Frame {}: {:?}, {} blocks",
            self.stats.frames,
            kind,
            cache.blocks().len()
        );

        Ok(self.cache.insert(cache).blocks())
    }

    /// Forgets the previous frame; the next one is decomposed from scratch.
    pub fn reset(&mut self) {
        self.cache = None;
    }

    pub fn blocks(&self) -> Option<&BlockSet> {
        self.cache.as_ref().map(Cache::blocks)
    }

    pub fn params(&self) -> &Params {
        self.params
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn finish(self) -> Stats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::ImageBuffer;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    fn frame(img: &RgbImage) -> PixelBuffer {
        PixelBuffer::from_rgb(img).unwrap()
    }

    /// Dark background with a bright square of side `size` at (`x`, `y`).
    fn square(x: u32, y: u32, size: u32) -> RgbImage {
        ImageBuffer::from_fn(256, 256, |px, py| {
            if (x..x + size).contains(&px) && (y..y + size).contains(&py) {
                Rgb([250, 240, 10])
            } else {
                Rgb([20, 30, 40])
            }
        })
    }

    fn noise(width: u32, height: u32, seed: u64) -> RgbImage {
        let mut rng = Pcg32::seed_from_u64(seed);
        ImageBuffer::from_fn(width, height, |_, _| Rgb(rng.gen::<[u8; 3]>()))
    }

    fn assert_covers(blocks: &BlockSet, width: u32, height: u32) {
        let mut covered = vec![0u8; (width * height) as usize];

        for block in blocks.iter() {
            for y in block.y()..block.y() + block.height() {
                for x in block.x()..block.x() + block.width() {
                    covered[(y * width + x) as usize] += 1;
                }
            }
        }

        assert!(covered.iter().all(|&n| n == 1));
    }

    #[test]
    fn first_frame_is_full_rebuild() {
        let params = Params::default();
        let mut session = Session::new(&params);
        let img = square(64, 64, 64);

        let blocks = session.add(frame(&img)).unwrap().clone();
        let built = Builder::new(&params, &frame(&img)).build().blocks();

        assert_eq!(blocks, built);
        assert_eq!(session.stats().refreshes[&RefreshKind::Full], 1);
        assert_eq!(session.stats().reused, 0);
        assert_covers(&blocks, 256, 256);
    }

    #[test]
    fn repeated_frame_reuses_everything() {
        let params = Params::default();
        let mut session = Session::new(&params);
        let img = square(64, 64, 64);

        let first = session.add(frame(&img)).unwrap().clone();
        let recomputed = session.stats().recomputed;
        let second = session.add(frame(&img)).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(session.stats().recomputed, recomputed);
        assert_eq!(session.stats().refreshes[&RefreshKind::Repeat], 1);
        assert!(second.changes(&first).iter().all(|c| *c == BlockChange::Keep));
    }

    #[test]
    fn padded_copy_of_same_frame_is_a_repeat() {
        let params = Params::default();
        let mut session = Session::new(&params);
        let img = square(10, 10, 40);

        session.add(frame(&img)).unwrap();

        let mut padded = Vec::new();
        for row in img.as_raw().chunks(256 * 3) {
            padded.extend_from_slice(row);
            padded.extend_from_slice(&[0xEE; 5]);
        }

        let buf = PixelBuffer::new(256, 256, 3, 256 * 3 + 5, padded).unwrap();
        session.add(buf).unwrap();

        assert_eq!(session.stats().refreshes.get(&RefreshKind::Repeat), Some(&1));
    }

    #[test]
    fn moving_square_only_touches_changed_regions() {
        let params = Params::default();
        let mut session = Session::new(&params);

        let first = session.add(frame(&square(32, 32, 40))).unwrap().clone();
        let recomputed = session.stats().recomputed;
        let second = session.add(frame(&square(40, 32, 40))).unwrap().clone();
        let stats = session.stats();

        assert_eq!(stats.refreshes.get(&RefreshKind::Partial), Some(&1));
        assert!(stats.reused > 0);
        assert!(stats.recomputed - recomputed < second.len());
        assert_covers(&second, 256, 256);

        // the bottom-right corner never changed
        assert_eq!(first.as_slice().last(), second.as_slice().last());
    }

    #[test]
    fn incremental_matches_full_rebuild_when_everything_changes() {
        let params = Params::new(20.0, 4, 8, 10.0).unwrap();
        let mut session = Session::new(&params);

        session.add(frame(&noise(120, 80, 1))).unwrap();

        let next = ImageBuffer::from_fn(120, 80, |x, y| Rgb([(x * 2) as u8, (y * 3) as u8, 128]));
        let incremental = session.add(frame(&next)).unwrap().clone();
        let cold = Session::new(&params).add(frame(&next)).unwrap().clone();

        assert_eq!(incremental, cold);
    }

    #[test]
    fn resize_forces_full_rebuild() {
        let params = Params::default();
        let mut session = Session::new(&params);

        session.add(frame(&square(0, 0, 64))).unwrap();

        let small = noise(100, 60, 4);
        let blocks = session.add(frame(&small)).unwrap().clone();

        assert_eq!(session.stats().refreshes[&RefreshKind::Full], 2);
        assert_eq!(blocks, Builder::new(&params, &frame(&small)).build().blocks());
        assert_covers(&blocks, 100, 60);
    }

    #[test]
    fn reset_drops_cache() {
        let params = Params::default();
        let mut session = Session::new(&params);
        let img = square(64, 64, 64);

        session.add(frame(&img)).unwrap();
        session.reset();

        assert!(session.blocks().is_none());

        session.add(frame(&img)).unwrap();

        assert_eq!(session.stats().refreshes[&RefreshKind::Full], 2);
        assert_eq!(session.stats().refreshes.get(&RefreshKind::Repeat), None);
    }

    #[test]
    fn sampled_session_keeps_tiling() {
        let params = Params::new(15.0, 4, 8, 5.0)
            .unwrap()
            .with_sample_budget(3)
            .with_seed(11);

        let mut session = Session::new(&params);

        for step in 0..6 {
            let blocks = session.add(frame(&square(step * 20, step * 10, 50))).unwrap();
            assert_covers(blocks, 256, 256);
        }

        let stats = session.finish();
        assert_eq!(stats.frames, 6);
        assert!(stats.checked <= 5 * 3);
    }

    #[test]
    fn sessions_are_independent() {
        let params = Params::default();
        let mut a = Session::new(&params);
        let mut b = Session::with_sampler(&params, Box::new(Busiest));

        a.add(frame(&square(0, 0, 64))).unwrap();
        b.add(frame(&square(100, 100, 64))).unwrap();

        let blocks = a.add(frame(&square(0, 0, 64))).unwrap().clone();

        assert_eq!(a.stats().refreshes.get(&RefreshKind::Repeat), Some(&1));
        assert_eq!(Some(&blocks), a.blocks());
        assert_ne!(a.blocks(), b.blocks());
    }
}
