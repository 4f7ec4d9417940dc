use crate::*;

/// Frame identical to the cached one; the whole block set carries over.
pub struct DFrame;

impl Frame for DFrame {
    fn build(ctxt: FrameCtxt<'_>) -> Option<Self> {
        if ctxt.prev?.frame().same_pixels(ctxt.curr) {
            Some(Self)
        } else {
            None
        }
    }
}
