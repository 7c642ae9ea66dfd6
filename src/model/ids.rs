// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Serialize, Serializer};

/// A stable handle into a diagram's node or connection arena.
///
/// Handles carry the tag of the diagram that issued them, so a handle from one diagram is never
/// mistaken for a node of another diagram that happens to have the same arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    owner: u32,
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

pub trait IdTag {
    const PREFIX: &'static str;
}

impl<T> Id<T> {
    pub(crate) fn new(owner: DiagramTag, index: usize) -> Self {
        Self {
            owner: owner.0,
            index: u32::try_from(index).expect("arena index fits in u32"),
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub(crate) fn owner(&self) -> DiagramTag {
        DiagramTag(self.owner)
    }
}

impl<T: IdTag> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::PREFIX, self.index)
    }
}

impl<T: IdTag> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identifies the diagram that issued an [`Id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct DiagramTag(u32);

impl DiagramTag {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

impl IdTag for NodeIdTag {
    const PREFIX: &'static str = "n";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectionIdTag {}
pub type ConnectionId = Id<ConnectionIdTag>;

impl IdTag for ConnectionIdTag {
    const PREFIX: &'static str = "c";
}

#[cfg(test)]
mod tests {
    use super::{ConnectionId, DiagramTag, NodeId};

    #[test]
    fn ids_display_with_kind_prefix() {
        let tag = DiagramTag::next();
        assert_eq!(NodeId::new(tag, 3).to_string(), "n3");
        assert_eq!(ConnectionId::new(tag, 0).to_string(), "c0");
    }

    #[test]
    fn ids_from_different_diagrams_differ() {
        let a = NodeId::new(DiagramTag::next(), 0);
        let b = NodeId::new(DiagramTag::next(), 0);
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
    }

    #[test]
    fn ids_serialize_as_strings() {
        let id = NodeId::new(DiagramTag::next(), 7);
        assert_eq!(serde_json::to_string(&id).expect("json"), "\"n7\"");
    }
}
