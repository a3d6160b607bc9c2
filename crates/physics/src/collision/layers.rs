//! Collision layers and query filtering.
//!
//! Every collider lives on exactly one [`Layer`]. Queries carry a
//! [`LayerMask`] selecting which layers they can see, plus a
//! [`TriggerInteraction`] policy deciding whether trigger volumes count.

use serde::{Deserialize, Serialize};

/// A collision layer index in `0..32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Layer(u8);

impl Layer {
    /// Default layer for world geometry.
    pub const DEFAULT: Self = Self(0);

    /// Layer commonly used for walkable ground.
    pub const GROUND: Self = Self(1);

    /// Layer for dynamic props that block but are not walkable.
    pub const PROPS: Self = Self(2);

    /// Layer for characters.
    pub const CHARACTER: Self = Self(3);

    /// Create a layer from its index.
    ///
    /// Returns `None` when the index is outside `0..32`.
    pub const fn new(index: u8) -> Option<Self> {
        if index < 32 {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Layer index.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Mask containing only this layer.
    #[inline]
    pub const fn mask(self) -> LayerMask {
        LayerMask(1 << self.0)
    }
}

/// Set of layers a query collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Sees nothing.
    pub const NONE: Self = Self(0);

    /// Sees every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Check if the mask includes a layer.
    #[inline]
    pub fn contains(self, layer: Layer) -> bool {
        (self.0 & (1 << layer.0)) != 0
    }

    /// Return a copy of the mask with `layer` added.
    #[inline]
    pub fn with(self, layer: Layer) -> Self {
        Self(self.0 | (1 << layer.0))
    }

    /// Return a copy of the mask with `layer` removed.
    #[inline]
    pub fn without(self, layer: Layer) -> Self {
        Self(self.0 & !(1 << layer.0))
    }

    /// Check if no layer is selected.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        layer.mask()
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<Layer> for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Layer) -> Self {
        self.with(rhs)
    }
}

impl std::ops::BitAnd for LayerMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Whether queries report trigger volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriggerInteraction {
    /// Triggers are invisible to the query.
    #[default]
    Ignore,
    /// Triggers are reported like any other collider.
    Collide,
}

/// Filter applied to every collision query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Layers the query can hit.
    pub mask: LayerMask,
    /// Trigger policy.
    pub triggers: TriggerInteraction,
}

impl QueryFilter {
    /// Filter seeing the given layers and ignoring triggers.
    pub fn new(mask: LayerMask) -> Self {
        Self {
            mask,
            triggers: TriggerInteraction::Ignore,
        }
    }

    /// Set the trigger policy.
    pub fn with_triggers(mut self, triggers: TriggerInteraction) -> Self {
        self.triggers = triggers;
        self
    }

    /// Check if a collider on `layer` with the given trigger flag passes.
    #[inline]
    pub fn accepts(&self, layer: Layer, is_trigger: bool) -> bool {
        if is_trigger && self.triggers == TriggerInteraction::Ignore {
            return false;
        }
        self.mask.contains(layer)
    }
}

// ============================================================================
// Tests
// ============================================================================
