use std::collections::HashSet;
use std::path::Path;

use engine::{
    load_validated_document, Aabb, ColliderSet, ContentErrorCode, ContentPipelineError,
    ContentValidationErrors, Vec2, Vec3, ValidationReport,
};
use serde::Deserialize;
use tracing::info;

use crate::session::{DialogueOption, Hazard, NonPlayerEntity, NpcId, NpcKind, PlayerEntity};

pub const SESSION_FILE_NAME: &str = "session.json";

const DEFAULT_WORLD_HALF_EXTENT: f32 = 30.0;
const DEFAULT_INTERACTION_RADIUS: f32 = 4.0;
const DEFAULT_BOSS_THRESHOLD: u32 = 12;
const DEFAULT_WIN_THRESHOLD: u32 = 13;
const DEFAULT_HAZARD_DAMAGE: i32 = 5;
const DEFAULT_INVULNERABILITY_COOLDOWN_SECONDS: f64 = 1.5;
const DEFAULT_INITIAL_REPUTATION: i32 = 50;
const DEFAULT_INITIAL_BUDGET: i32 = 100;
const DEFAULT_PLAYER_SPEED: f32 = 6.0;
const DEFAULT_PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.9, 0.4);
const DEFAULT_HAZARD_HALF_EXTENTS: Vec3 = Vec3::new(0.6, 0.6, 0.6);

/// Raw session content as authored on disk. Nothing here is trusted until
/// [`SessionConfig::validate`] has accepted it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default)]
    pub rules: RulesConfig,
    pub player: PlayerConfig,
    #[serde(default)]
    pub colliders: Vec<ColliderConfig>,
    pub npcs: Vec<NpcConfig>,
    #[serde(default)]
    pub hazards: Vec<HazardConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    pub world_half_extent: f32,
    pub interaction_radius: f32,
    pub boss_threshold: u32,
    pub win_threshold: u32,
    pub hazard_damage: i32,
    pub invulnerability_cooldown_seconds: f64,
    pub initial_reputation: i32,
    pub initial_budget: i32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            world_half_extent: DEFAULT_WORLD_HALF_EXTENT,
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            boss_threshold: DEFAULT_BOSS_THRESHOLD,
            win_threshold: DEFAULT_WIN_THRESHOLD,
            hazard_damage: DEFAULT_HAZARD_DAMAGE,
            invulnerability_cooldown_seconds: DEFAULT_INVULNERABILITY_COOLDOWN_SECONDS,
            initial_reputation: DEFAULT_INITIAL_REPUTATION,
            initial_budget: DEFAULT_INITIAL_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    pub spawn: Vec3,
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    #[serde(default = "default_player_half_extents")]
    pub half_extents: Vec3,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColliderConfig {
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcKindConfig {
    #[default]
    Standard,
    Boss,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpcConfig {
    pub id: String,
    pub role: String,
    pub position: Vec3,
    #[serde(default)]
    pub kind: NpcKindConfig,
    pub prompt: String,
    pub options: Vec<DialogueOption>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HazardConfig {
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    #[serde(default = "default_hazard_half_extents")]
    pub half_extents: Vec3,
}

fn default_player_speed() -> f32 {
    DEFAULT_PLAYER_SPEED
}

fn default_player_half_extents() -> Vec3 {
    DEFAULT_PLAYER_HALF_EXTENTS
}

fn default_hazard_half_extents() -> Vec3 {
    DEFAULT_HAZARD_HALF_EXTENTS
}

/// Tuning shared read-only by every system for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRules {
    pub world_half_extent: f32,
    pub interaction_radius: f32,
    pub player_speed: f32,
    pub boss_threshold: usize,
    pub win_threshold: usize,
    pub hazard_damage: i32,
    pub invulnerability_cooldown_seconds: f64,
}

#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub rules: SessionRules,
    pub player: PlayerEntity,
    pub colliders: ColliderSet,
    pub npcs: Vec<NonPlayerEntity>,
    pub hazards: Vec<Hazard>,
    pub initial_reputation: i32,
    pub initial_budget: i32,
    pub content_hash_sha256_hex: Option<String>,
}

impl SessionConfig {
    /// Checks every field and collects all problems in one pass; a session is
    /// only ever built from the returned [`ValidatedSession`].
    pub fn validate(self) -> Result<ValidatedSession, ContentValidationErrors> {
        let mut report = ValidationReport::new();

        let rules = validate_rules(&self.rules, &self.player, &mut report);
        let colliders = validate_colliders(&self.colliders, &mut report);
        let player = validate_player(&self.player, &colliders, &mut report);
        let npcs = validate_npcs(&self.npcs, &mut report);
        let hazards = validate_hazards(&self.hazards, &mut report);
        validate_thresholds(&self.rules, &npcs, &mut report);

        report.finish(ValidatedSession {
            rules,
            player,
            colliders,
            npcs,
            hazards,
            initial_reputation: self.rules.initial_reputation,
            initial_budget: self.rules.initial_budget,
            content_hash_sha256_hex: None,
        })
    }
}

pub fn load_session_config(path: &Path) -> Result<ValidatedSession, ContentPipelineError> {
    let loaded = load_validated_document(path, SessionConfig::validate)?;
    let mut session = loaded.value;
    info!(
        path = %loaded.path.display(),
        npcs = session.npcs.len(),
        colliders = session.colliders.len(),
        hazards = session.hazards.len(),
        content_hash = %loaded.content_hash_sha256_hex,
        "session_config_loaded"
    );
    session.content_hash_sha256_hex = Some(loaded.content_hash_sha256_hex);
    Ok(session)
}

fn validate_rules(
    rules: &RulesConfig,
    player: &PlayerConfig,
    report: &mut ValidationReport,
) -> SessionRules {
    report.require_positive("rules.world_half_extent", rules.world_half_extent);
    report.require_positive("rules.interaction_radius", rules.interaction_radius);
    report.require_positive("player.speed", player.speed);
    if rules.hazard_damage < 0 {
        report.push(
            ContentErrorCode::InvalidValue,
            "rules.hazard_damage",
            format!("expected a value >= 0, got {}", rules.hazard_damage),
        );
    }
    if !rules.invulnerability_cooldown_seconds.is_finite()
        || rules.invulnerability_cooldown_seconds <= 0.0
    {
        report.push(
            ContentErrorCode::InvalidValue,
            "rules.invulnerability_cooldown_seconds",
            format!(
                "expected a finite number > 0, got {}",
                rules.invulnerability_cooldown_seconds
            ),
        );
    }
    report.require_in_range("rules.initial_reputation", rules.initial_reputation, 0, 100);
    report.require_in_range("rules.initial_budget", rules.initial_budget, 0, 100);

    SessionRules {
        world_half_extent: rules.world_half_extent,
        interaction_radius: rules.interaction_radius,
        player_speed: player.speed,
        boss_threshold: rules.boss_threshold as usize,
        win_threshold: rules.win_threshold as usize,
        hazard_damage: rules.hazard_damage,
        invulnerability_cooldown_seconds: rules.invulnerability_cooldown_seconds,
    }
}

fn validate_colliders(colliders: &[ColliderConfig], report: &mut ValidationReport) -> ColliderSet {
    let mut accepted = Vec::with_capacity(colliders.len());
    for (index, collider) in colliders.iter().enumerate() {
        match Aabb::new(collider.min, collider.max) {
            Ok(aabb) => accepted.push(aabb),
            Err(error) => report.push(
                ContentErrorCode::MalformedBounds,
                format!("colliders[{index}]"),
                error.to_string(),
            ),
        }
    }
    ColliderSet::new(accepted)
}

fn validate_player(
    player: &PlayerConfig,
    colliders: &ColliderSet,
    report: &mut ValidationReport,
) -> PlayerEntity {
    if !player.spawn.is_finite() {
        report.push(
            ContentErrorCode::InvalidValue,
            "player.spawn",
            "spawn position must be finite",
        );
    }
    require_positive_extents("player.half_extents", player.half_extents, report);

    let entity = PlayerEntity {
        position: player.spawn,
        facing: Vec2::new(0.0, 1.0),
        half_extents: player.half_extents,
        invulnerable_until: None,
    };
    if let Some(index) = colliders.first_overlap(&entity.bounds()) {
        report.push(
            ContentErrorCode::InconsistentDataset,
            "player.spawn",
            format!("player spawn box overlaps collider {index}"),
        );
    }
    entity
}

fn validate_npcs(npcs: &[NpcConfig], report: &mut ValidationReport) -> Vec<NonPlayerEntity> {
    let mut seen_ids = HashSet::new();
    let mut boss_count = 0usize;
    let mut accepted = Vec::with_capacity(npcs.len());

    for (index, npc) in npcs.iter().enumerate() {
        let base = format!("npcs[{index}]");
        report.require_non_empty(&format!("{base}.id"), &npc.id);
        if !npc.id.trim().is_empty() && !seen_ids.insert(npc.id.as_str()) {
            report.push(
                ContentErrorCode::DuplicateId,
                format!("{base}.id"),
                format!("duplicate npc id '{}'", npc.id),
            );
        }
        report.require_non_empty(&format!("{base}.role"), &npc.role);
        report.require_non_empty(&format!("{base}.prompt"), &npc.prompt);
        if !npc.position.is_finite() {
            report.push(
                ContentErrorCode::InvalidValue,
                format!("{base}.position"),
                "position must be finite",
            );
        }

        if npc.options.is_empty() {
            report.push(
                ContentErrorCode::MissingField,
                format!("{base}.options"),
                "npc must offer at least one dialogue option",
            );
        } else if !npc.options.iter().any(|option| option.correct) {
            report.push(
                ContentErrorCode::InconsistentDataset,
                format!("{base}.options"),
                "npc has no correct option and could never be completed",
            );
        }
        for (option_index, option) in npc.options.iter().enumerate() {
            let option_base = format!("{base}.options[{option_index}]");
            report.require_non_empty(&format!("{option_base}.text"), &option.text);
            report.require_non_empty(&format!("{option_base}.feedback"), &option.feedback);
        }

        let kind = match npc.kind {
            NpcKindConfig::Standard => NpcKind::Standard,
            NpcKindConfig::Boss => {
                boss_count += 1;
                NpcKind::Boss { visible: false }
            }
        };
        accepted.push(NonPlayerEntity {
            id: NpcId::new(npc.id.clone()),
            role: npc.role.clone(),
            position: npc.position,
            kind,
            prompt: npc.prompt.clone(),
            options: npc.options.clone(),
        });
    }

    if boss_count != 1 {
        report.push(
            ContentErrorCode::InconsistentDataset,
            "npcs",
            format!("expected exactly one boss npc, found {boss_count}"),
        );
    }
    accepted
}

fn validate_hazards(hazards: &[HazardConfig], report: &mut ValidationReport) -> Vec<Hazard> {
    let mut accepted = Vec::with_capacity(hazards.len());
    for (index, hazard) in hazards.iter().enumerate() {
        let base = format!("hazards[{index}]");
        if !hazard.position.is_finite() {
            report.push(
                ContentErrorCode::InvalidValue,
                format!("{base}.position"),
                "position must be finite",
            );
        }
        report.require_non_negative(&format!("{base}.speed"), hazard.speed);
        require_positive_extents(&format!("{base}.half_extents"), hazard.half_extents, report);
        let direction = match hazard.direction.normalized() {
            Some(direction) => direction,
            None => {
                report.push(
                    ContentErrorCode::InvalidValue,
                    format!("{base}.direction"),
                    "direction must be a finite non-zero vector",
                );
                Vec3::ZERO
            }
        };
        accepted.push(Hazard {
            position: hazard.position,
            direction,
            speed: hazard.speed,
            half_extents: hazard.half_extents,
        });
    }
    accepted
}

fn validate_thresholds(rules: &RulesConfig, npcs: &[NonPlayerEntity], report: &mut ValidationReport) {
    let standard_count = npcs.iter().filter(|npc| !npc.is_boss()).count();
    // The boss is revealed by a standard completion, so at least one must exist.
    if standard_count == 0 {
        report.push(
            ContentErrorCode::InconsistentDataset,
            "npcs",
            "at least one standard npc is required before the boss can be revealed",
        );
    }
    if rules.boss_threshold as usize != standard_count {
        report.push(
            ContentErrorCode::InconsistentDataset,
            "rules.boss_threshold",
            format!(
                "boss_threshold {} must equal the number of standard npcs ({standard_count})",
                rules.boss_threshold
            ),
        );
    }
    if rules.win_threshold as usize != npcs.len() {
        report.push(
            ContentErrorCode::InconsistentDataset,
            "rules.win_threshold",
            format!(
                "win_threshold {} must equal the total number of npcs ({})",
                rules.win_threshold,
                npcs.len()
            ),
        );
    }
}

fn require_positive_extents(field_path: &str, extents: Vec3, report: &mut ValidationReport) {
    if !extents.is_finite() || extents.x <= 0.0 || extents.y <= 0.0 || extents.z <= 0.0 {
        report.push(
            ContentErrorCode::InvalidValue,
            field_path,
            "half extents must be finite and > 0 on every axis",
        );
    }
}
