use crate::*;
use log::{debug, trace};

/// Incremental update: unchanged leaves are copied from the cached tree,
/// changed regions are decomposed again.
pub struct PFrame {
    pub(crate) tree: QuadTree,
    pub(crate) checked: usize,
}

impl Frame for PFrame {
    fn build(ctxt: FrameCtxt<'_>) -> Option<Self> {
        let (params, prev, curr) = (ctxt.params, ctxt.prev?, ctxt.curr);

        if !prev.frame().same_dimensions(curr) {
            debug!(
                "Frame resized from {}x{} to {}x{}, rebuilding",
                prev.frame().width(),
                prev.frame().height(),
                curr.width(),
                curr.height()
            );

            return None;
        }

        if !prev.tree().tiles(curr.rect()) {
            debug!("Cached tree doesn't tile the frame, rebuilding");
            return None;
        }

        let changes = Differ::new(params, ctxt.sampler).diff(prev.tree(), curr, ctxt.frame);

        if changes.dirty.first().copied().unwrap_or(true) {
            debug!("Every region changed, rebuilding");
            return None;
        }

        trace!(
            "{} of {} checked leaves changed",
            changes.changed,
            changes.checked
        );

        Some(Self {
            tree: Builder::new(params, curr).regrow(prev.tree(), &changes.dirty),
            checked: changes.checked,
        })
    }
}
