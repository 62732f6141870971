use engine::{ColliderSet, Vec2, Vec3};

use super::types::PlayerEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Idle,
    Moved,
    Blocked,
}

/// Integrates one step of player movement. A move whose destination box would
/// overlap a collider is rejected whole; there is no sliding along walls.
pub fn move_player(
    player: &mut PlayerEntity,
    intent: Vec2,
    speed: f32,
    dt_seconds: f32,
    colliders: &ColliderSet,
) -> MoveOutcome {
    let Some(direction) = intent.normalized() else {
        return MoveOutcome::Idle;
    };
    if dt_seconds <= 0.0 || speed <= 0.0 {
        return MoveOutcome::Idle;
    }

    let candidate = player.position + Vec3::from_ground(direction) * (speed * dt_seconds);
    if colliders.overlaps(&player.bounds_at(candidate)) {
        return MoveOutcome::Blocked;
    }

    player.position = candidate;
    player.facing = direction;
    MoveOutcome::Moved
}
