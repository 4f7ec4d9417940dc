use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefreshKind {
    /// Decomposed from scratch.
    Full,
    /// Same pixels as the previous frame.
    Repeat,
    /// Changed regions decomposed again, the rest reused.
    Partial,
}

/// Result of one update strategy; `tree` is `None` when the cached tree
/// stays as it is.
pub struct Refresh {
    kind: RefreshKind,
    tree: Option<QuadTree>,
    checked: usize,
}

impl Refresh {
    pub fn kind(&self) -> RefreshKind {
        self.kind
    }

    pub fn checked(&self) -> usize {
        self.checked
    }

    pub(crate) fn into_tree(self) -> Option<QuadTree> {
        self.tree
    }
}

impl From<IFrame> for Refresh {
    fn from(frame: IFrame) -> Self {
        Self {
            kind: RefreshKind::Full,
            tree: Some(frame.tree),
            checked: 0,
        }
    }
}

impl From<DFrame> for Refresh {
    fn from(_: DFrame) -> Self {
        Self {
            kind: RefreshKind::Repeat,
            tree: None,
            checked: 0,
        }
    }
}

impl From<PFrame> for Refresh {
    fn from(frame: PFrame) -> Self {
        Self {
            kind: RefreshKind::Partial,
            tree: Some(frame.tree),
            checked: frame.checked,
        }
    }
}
