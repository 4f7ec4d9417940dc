use crate::*;

/// Last frame of a session together with the tree and blocks built for it.
#[derive(Clone, Debug)]
pub struct Cache {
    frame: PixelBuffer,
    tree: QuadTree,
    blocks: BlockSet,
}

impl Cache {
    pub fn new(frame: PixelBuffer, tree: QuadTree) -> Self {
        let blocks = tree.blocks();

        Self {
            frame,
            tree,
            blocks,
        }
    }

    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn blocks(&self) -> &BlockSet {
        &self.blocks
    }

    pub(crate) fn replace_frame(&mut self, frame: PixelBuffer) {
        self.frame = frame;
    }
}
