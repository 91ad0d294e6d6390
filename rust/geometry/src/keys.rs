// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types for elements, levels and wall surfaces.
//!
//! A wall may live in the document being edited or in a linked document.
//! Linked elements are reached through a link instance, so a wall's logical
//! identity is the pair (container, element) rather than the element id
//! alone. Two hits resolve to the same wall iff their [`SurfaceId`]s are
//! equal by value.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Local element identifier inside one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(pub u64);

/// Level (storey) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LevelId(pub u64);

/// Which document an element belongs to, seen from the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "link", rename_all = "snake_case"))]
pub enum ContainerKey {
    /// The host document itself.
    Host,
    /// A linked document, reached through the link instance with this id.
    Link(ElementId),
}

/// Compound identity of a logical wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceId {
    pub container: ContainerKey,
    pub element: ElementId,
}

impl SurfaceId {
    /// A wall owned by the host document.
    pub fn host(element: ElementId) -> Self {
        Self {
            container: ContainerKey::Host,
            element,
        }
    }

    /// A wall owned by the document behind link instance `link`.
    pub fn linked(link: ElementId, element: ElementId) -> Self {
        Self {
            container: ContainerKey::Link(link),
            element,
        }
    }

    pub fn is_linked(&self) -> bool {
        matches!(self.container, ContainerKey::Link(_))
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::fmt::Display for LevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level #{}", self.0)
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.container {
            ContainerKey::Host => write!(f, "{}", self.element),
            ContainerKey::Link(link) => write!(f, "{}@link{}", self.element, link),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn same_element_in_different_containers_is_distinct() {
        let host = SurfaceId::host(ElementId(7));
        let linked = SurfaceId::linked(ElementId(100), ElementId(7));
        assert_ne!(host, linked);

        let other_link = SurfaceId::linked(ElementId(101), ElementId(7));
        assert_ne!(linked, other_link);
    }

    #[test]
    fn surface_ids_hash_by_value() {
        let mut set = FxHashSet::default();
        set.insert(SurfaceId::linked(ElementId(1), ElementId(2)));
        assert!(set.contains(&SurfaceId::linked(ElementId(1), ElementId(2))));
        assert!(!set.insert(SurfaceId::linked(ElementId(1), ElementId(2))));
    }

    #[test]
    fn display_formats() {
        assert_eq!(SurfaceId::host(ElementId(5)).to_string(), "#5");
        assert_eq!(
            SurfaceId::linked(ElementId(9), ElementId(5)).to_string(),
            "#5@link#9"
        );
        assert!(SurfaceId::linked(ElementId(9), ElementId(5)).is_linked());
    }
}
