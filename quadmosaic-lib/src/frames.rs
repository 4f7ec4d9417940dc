mod dframe;
mod iframe;
mod pframe;

pub use self::{dframe::*, iframe::*, pframe::*};
