//! Seams to the collaborators that consume or check the built hierarchy.

use crate::domain::errors::LayerIssue;
use crate::domain::model::{GroupNode, LeafNode};

/// Checks whether a leaf can be materialised as a tabular point source.
pub trait LayerValidator {
    fn validate(&self, leaf: &LeafNode) -> Result<(), LayerIssue>;
}

/// Receives the finished top-level group.
pub trait LayerTreeSink {
    fn add_root_group(&mut self, group: GroupNode);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// User-facing message channel.
pub trait Notifier {
    fn notify(&mut self, level: NoticeLevel, message: &str);

    fn info(&mut self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn warn(&mut self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }
}

impl<T: Notifier + ?Sized> Notifier for &mut T {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        (**self).notify(level, message);
    }
}
