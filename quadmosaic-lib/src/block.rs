use crate::*;
use std::collections::HashMap;
use std::iter::FromIterator;

/// Colored rectangle approximating one region of a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    rect: Rect,
    color: Rgb<u8>,
}

impl Block {
    pub fn new(rect: Rect, color: Rgb<u8>) -> Self {
        Self { rect, color }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn x(&self) -> u32 {
        self.rect.x
    }

    pub fn y(&self) -> u32 {
        self.rect.y
    }

    pub fn width(&self) -> u32 {
        self.rect.width
    }

    pub fn height(&self) -> u32 {
        self.rect.height
    }

    pub fn color(&self) -> Rgb<u8> {
        self.color
    }

    pub fn area(&self) -> u64 {
        self.rect.area()
    }

    /// Mean absolute channel difference below `threshold`.
    pub fn is_similar(&self, color: Rgb<u8>, threshold: f64) -> bool {
        let diff: u32 = self
            .color
            .0
            .iter()
            .zip(color.0.iter())
            .map(|(&a, &b)| (a as i32 - b as i32).abs() as u32)
            .sum();

        (diff as f64 / 3.0) < threshold
    }

    /// Position and size mapped onto a canvas scaled by `sx` x `sy`.
    pub fn scaled(&self, sx: f64, sy: f64) -> [f64; 4] {
        [
            self.rect.x as f64 * sx,
            self.rect.y as f64 * sy,
            self.rect.width as f64 * sx,
            self.rect.height as f64 * sy,
        ]
    }

    pub fn hex(&self) -> String {
        let [r, g, b] = self.color.0;

        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// How the surface at one index has to change to show the new block set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockChange {
    Keep,
    Recolor(Rgb<u8>),
    Reshape(Block),
    Create(Block),
    Retire,
}

/// Ordered blocks of one frame. Blocks produced by a session never
/// overlap and cover the whole frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockSet {
    blocks: Vec<Block>,
}

impl BlockSet {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter()
    }

    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }

    pub fn area(&self) -> u64 {
        self.blocks.iter().map(Block::area).sum()
    }

    /// Per-index changes turning `prev` into `self`, so a renderer that
    /// owns one surface per index can reuse them in place.
    pub fn changes(&self, prev: &BlockSet) -> Vec<BlockChange> {
        let len = self.len().max(prev.len());

        (0..len)
            .map(|idx| match (prev.blocks.get(idx), self.blocks.get(idx)) {
                (Some(a), Some(b)) if a == b => BlockChange::Keep,
                (Some(a), Some(b)) if a.rect == b.rect => BlockChange::Recolor(b.color),
                (Some(_), Some(b)) => BlockChange::Reshape(*b),
                (None, Some(b)) => BlockChange::Create(*b),
                (_, None) => BlockChange::Retire,
            })
            .collect()
    }

    /// The `n` largest blocks by area, kept in emission order. Ties go to
    /// the earlier block.
    pub fn largest(&self, n: usize) -> BlockSet {
        if n >= self.len() {
            return self.clone();
        }

        let mut idxs: Vec<_> = (0..self.len()).collect();
        idxs.sort_by(|&a, &b| self.blocks[b].area().cmp(&self.blocks[a].area()));
        idxs.truncate(n);
        idxs.sort_unstable();

        idxs.into_iter().map(|idx| self.blocks[idx]).collect()
    }

    /// Color covering the most area; ties go to the color seen first.
    pub fn dominant_color(&self) -> Option<Rgb<u8>> {
        let mut areas: HashMap<[u8; 3], (u64, usize)> = HashMap::new();

        for (idx, block) in self.blocks.iter().enumerate() {
            areas.entry(block.color.0).or_insert((0, idx)).0 += block.area();
        }

        areas
            .into_iter()
            .max_by(|(_, (a, ai)), (_, (b, bi))| a.cmp(b).then(bi.cmp(ai)))
            .map(|(color, _)| Rgb(color))
    }
}

impl FromIterator<Block> for BlockSet {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for BlockSet {
    type Item = Block;
    type IntoIter = std::vec::IntoIter<Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}
