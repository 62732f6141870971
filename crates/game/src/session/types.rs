use std::fmt;

use engine::{Aabb, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NpcId(String);

impl NpcId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogueOption {
    pub text: String,
    pub correct: bool,
    pub feedback: String,
    pub reputation_delta: i32,
    pub budget_delta: i32,
}

/// What kind of stakeholder an NPC is. Only the boss carries visibility state;
/// standard NPCs are visible for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcKind {
    Standard,
    Boss { visible: bool },
}

impl NpcKind {
    pub fn is_visible(self) -> bool {
        match self {
            Self::Standard => true,
            Self::Boss { visible } => visible,
        }
    }

    pub fn is_boss(self) -> bool {
        match self {
            Self::Standard => false,
            Self::Boss { .. } => true,
        }
    }

    /// Flips a hidden boss to visible. Returns `true` only on the transition.
    pub(crate) fn reveal(&mut self) -> bool {
        match self {
            Self::Boss { visible } if !*visible => {
                *visible = true;
                true
            }
            Self::Boss { .. } | Self::Standard => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NonPlayerEntity {
    pub id: NpcId,
    pub role: String,
    pub position: Vec3,
    pub kind: NpcKind,
    pub prompt: String,
    pub options: Vec<DialogueOption>,
}

impl NonPlayerEntity {
    pub fn is_visible(&self) -> bool {
        self.kind.is_visible()
    }

    pub fn is_boss(&self) -> bool {
        self.kind.is_boss()
    }

    pub fn option(&self, index: usize) -> Option<&DialogueOption> {
        self.options.get(index)
    }

    pub fn correct_option_index(&self) -> Option<usize> {
        self.options.iter().position(|option| option.correct)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntity {
    pub position: Vec3,
    /// Unit ground-plane direction of the last successful move.
    pub facing: Vec2,
    pub half_extents: Vec3,
    pub invulnerable_until: Option<f64>,
}

impl PlayerEntity {
    pub fn bounds(&self) -> Aabb {
        self.bounds_at(self.position)
    }

    pub fn bounds_at(&self, position: Vec3) -> Aabb {
        Aabb::from_center_half_extents(position, self.half_extents)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_until.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hazard {
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub half_extents: Vec3,
}

impl Hazard {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }
}
