use crate::*;

/// Full decomposition with nothing reused.
pub struct IFrame {
    pub(crate) tree: QuadTree,
}

impl Frame for IFrame {
    fn build(ctxt: FrameCtxt<'_>) -> Option<Self> {
        Some(Self {
            tree: Builder::new(ctxt.params, ctxt.curr).build(),
        })
    }
}
