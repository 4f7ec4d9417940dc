use crate::*;

pub trait Frame
where
    Self: Sized,
    Refresh: From<Self>,
{
    fn build(ctxt: FrameCtxt<'_>) -> Option<Self>;

    fn build_refresh(ctxt: FrameCtxt<'_>) -> Option<Refresh> {
        Self::build(ctxt).map(Refresh::from)
    }
}

#[derive(Copy, Clone)]
pub struct FrameCtxt<'a> {
    pub params: &'a Params,
    pub sampler: &'a dyn Sampler,
    /// Frames seen by the session before this one.
    pub frame: u64,
    pub prev: Option<&'a Cache>,
    pub curr: &'a PixelBuffer,
}
