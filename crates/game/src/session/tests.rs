use engine::{run_headless, InputSnapshot, InputSource, LoopConfig, StopReason, Vec2, Vec3};
use proptest::prelude::*;
use serde_json::{json, Value};

use super::*;
use crate::config::SessionConfig;
use crate::telemetry::RecordingTelemetry;

const DT: f32 = 1.0 / 60.0;
const WRONG: usize = 0;
const CORRECT: usize = 1;

fn option_json(correct: bool, reputation_delta: i32, budget_delta: i32) -> Value {
    json!({
        "text": if_correct(correct, "Commit to the plan", "Promise a study"),
        "correct": correct,
        "feedback": if_correct(correct, "Good call.", "That stalls the project."),
        "reputation_delta": reputation_delta,
        "budget_delta": budget_delta
    })
}

fn if_correct(correct: bool, yes: &'static str, no: &'static str) -> &'static str {
    if correct {
        yes
    } else {
        no
    }
}

fn npc_json(id: &str, kind: &str, x: f32, z: f32) -> Value {
    json!({
        "id": id,
        "role": "Stakeholder",
        "position": { "x": x, "y": 0.0, "z": z },
        "kind": kind,
        "prompt": "How will you fund the line?",
        "options": [option_json(false, -10, -5), option_json(true, 10, -5)]
    })
}

fn standard_ids(count: usize) -> Vec<String> {
    (0..count)
        .map(|index| {
            if index == 0 {
                "ministro".to_string()
            } else {
                format!("npc_{index}")
            }
        })
        .collect()
}

/// Standard NPCs on a line along +x ten units apart, boss behind the spawn.
fn config_json(standard_count: usize) -> Value {
    let mut npcs = standard_ids(standard_count)
        .iter()
        .enumerate()
        .map(|(index, id)| npc_json(id, "standard", 10.0 * (index as f32 + 1.0), 0.0))
        .collect::<Vec<_>>();
    npcs.push(npc_json("presidente", "boss", 0.0, -20.0));

    json!({
        "rules": {
            "world_half_extent": 200.0,
            "boss_threshold": standard_count,
            "win_threshold": standard_count + 1
        },
        "player": { "spawn": { "x": 0.0, "y": 0.9, "z": 0.0 } },
        "colliders": [],
        "npcs": npcs,
        "hazards": []
    })
}

fn state_from(config: Value) -> SessionState {
    let config: SessionConfig = serde_json::from_value(config).expect("config shape");
    SessionState::new(config.validate().expect("valid config"))
}

fn full_state() -> SessionState {
    state_from(config_json(12))
}

fn run_tick(state: &mut SessionState, input: InputSnapshot) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    step::tick(state, &input, DT, &mut events);
    events
}

fn idle_ticks(state: &mut SessionState, count: usize) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for _ in 0..count {
        events.extend(run_tick(state, InputSnapshot::empty()));
    }
    events
}

fn npc_id(id: &str) -> NpcId {
    NpcId::new(id)
}

fn teleport_next_to(state: &mut SessionState, id: &str) {
    let npc_position = state.npc(&npc_id(id)).expect("npc exists").position;
    state.player.position = npc_position + Vec3::new(1.0, 0.9, 0.0);
}

fn open_dialogue(state: &mut SessionState, id: &str) -> Vec<SessionEvent> {
    teleport_next_to(state, id);
    let events = run_tick(state, InputSnapshot::empty().with_interact_pressed(true));
    assert_eq!(
        state.interaction,
        InteractionState::DialogueOpen {
            npc_id: npc_id(id)
        }
    );
    events
}

/// Walks the full open, select, close, settle sequence for one NPC.
fn resolve_with(state: &mut SessionState, id: &str, option_index: usize) -> Vec<SessionEvent> {
    let mut events = open_dialogue(state, id);
    events.extend(run_tick(
        state,
        InputSnapshot::empty().with_selected_option(Some(option_index)),
    ));
    events.extend(run_tick(
        state,
        InputSnapshot::empty().with_close_dialogue_pressed(true),
    ));
    events.extend(run_tick(state, InputSnapshot::empty()));
    events
}

fn complete_all_standard(state: &mut SessionState) -> Vec<SessionEvent> {
    let ids = state
        .npcs()
        .iter()
        .filter(|npc| !npc.is_boss())
        .map(|npc| npc.id.as_str().to_string())
        .collect::<Vec<_>>();
    let mut events = Vec::new();
    for id in ids {
        events.extend(resolve_with(state, &id, CORRECT));
    }
    events
}

fn telemetry_named(events: &[SessionEvent], name: &str) -> usize {
    events
        .iter()
        .filter_map(SessionEvent::as_telemetry)
        .filter(|event| event.name() == name)
        .count()
}

fn damage_events(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, SessionEvent::PlayerDamaged { .. }))
        .count()
}

#[derive(Debug, Clone)]
enum EconomyOp {
    Damage(i32),
    Resolve {
        npc_index: usize,
        correct: bool,
        reputation_delta: i32,
        budget_delta: i32,
    },
}

fn economy_op() -> impl Strategy<Value = EconomyOp> {
    prop_oneof![
        1 => (0..=250_i32).prop_map(EconomyOp::Damage),
        3 => (0..13_usize, any::<bool>(), -500..=500_i32, -500..=500_i32).prop_map(
            |(npc_index, correct, reputation_delta, budget_delta)| EconomyOp::Resolve {
                npc_index,
                correct,
                reputation_delta,
                budget_delta,
            }
        ),
    ]
}

fn walk_intent() -> impl Strategy<Value = Vec2> {
    (-1.0_f32..=1.0, -1.0_f32..=1.0).prop_map(|(x, z)| Vec2::new(x, z))
}

fn walled_config() -> Value {
    let mut config = config_json(12);
    config["colliders"] = json!([
        { "min": { "x": 2.0, "y": 0.0, "z": -6.0 }, "max": { "x": 3.0, "y": 3.0, "z": 6.0 } },
        { "min": { "x": -6.0, "y": 0.0, "z": 2.0 }, "max": { "x": 1.5, "y": 3.0, "z": 3.0 } },
        { "min": { "x": -4.0, "y": 0.0, "z": -4.0 }, "max": { "x": -3.0, "y": 3.0, "z": -1.0 } },
        { "min": { "x": -8.0, "y": 0.0, "z": -8.0 }, "max": { "x": 8.0, "y": 3.0, "z": -7.0 } }
    ]);
    config
}

#[test]
fn correct_answer_at_full_reputation_stays_clamped() {
    let mut config = config_json(12);
    config["rules"]["initial_reputation"] = json!(100);
    let mut state = state_from(config);

    let events = resolve_with(&mut state, "ministro", CORRECT);

    assert_eq!(state.economy().reputation(), 100);
    assert_eq!(state.economy().budget(), 95);
    assert!(state.economy().is_completed(&npc_id("ministro")));
    assert_eq!(state.economy().completed_count(), 1);
    assert_eq!(telemetry_named(&events, "challenge_resolved"), 1);
    assert!(events.contains(&SessionEvent::Telemetry(
        TelemetryEvent::ProgressUpdated {
            completed_count: 1,
            total: 13,
        }
    )));
}

#[test]
fn two_overlapping_hazards_deal_one_damage_event() {
    let mut config = config_json(12);
    let hazard = json!({
        "position": { "x": 0.0, "y": 0.9, "z": 0.0 },
        "direction": { "x": 1.0, "y": 0.0, "z": 0.0 },
        "speed": 0.0
    });
    config["hazards"] = json!([hazard.clone(), hazard]);
    let mut state = state_from(config);

    let mut events = Vec::new();
    step::tick(&mut state, &InputSnapshot::empty(), 0.05, &mut events);
    step::tick(&mut state, &InputSnapshot::empty(), 0.05, &mut events);

    assert_eq!(state.economy().reputation(), 45);
    assert_eq!(damage_events(&events), 1);
    assert!(state.player().is_invulnerable());
}

#[test]
fn hazard_damage_is_limited_to_one_event_per_cooldown_window() {
    let mut config = config_json(12);
    config["hazards"] = json!([{
        "position": { "x": 0.0, "y": 0.9, "z": 0.0 },
        "direction": { "x": 1.0, "y": 0.0, "z": 0.0 },
        "speed": 0.0
    }]);
    let mut state = state_from(config);

    let mut events = Vec::new();
    for _ in 0..30 {
        step::tick(&mut state, &InputSnapshot::empty(), 0.05, &mut events);
    }
    assert_eq!(damage_events(&events), 1);
    assert_eq!(state.economy().reputation(), 45);

    for _ in 0..2 {
        step::tick(&mut state, &InputSnapshot::empty(), 0.05, &mut events);
    }
    assert_eq!(damage_events(&events), 2);
    assert_eq!(state.economy().reputation(), 40);
}

#[test]
fn invulnerability_clears_once_expiry_is_observed() {
    let mut config = config_json(12);
    config["hazards"] = json!([{
        "position": { "x": 0.0, "y": 0.9, "z": 0.0 },
        "direction": { "x": 1.0, "y": 0.0, "z": 0.0 },
        "speed": 0.0
    }]);
    let mut state = state_from(config);
    run_tick(&mut state, InputSnapshot::empty());
    assert!(state.player().is_invulnerable());

    state.player.position = Vec3::new(50.0, 0.9, 50.0);
    let mut events = Vec::new();
    step::tick(&mut state, &InputSnapshot::empty(), 2.0, &mut events);
    assert!(!state.player().is_invulnerable());
    assert_eq!(damage_events(&events), 0);
}

#[test]
fn boss_unlocks_once_after_twelfth_completion() {
    let mut state = full_state();
    let mut events = Vec::new();
    let ids = standard_ids(12);
    for (index, id) in ids.iter().enumerate() {
        events.extend(resolve_with(&mut state, id, CORRECT));
        let boss_visible = state.boss().expect("boss").is_visible();
        assert_eq!(boss_visible, index == 11, "after completing {id}");
    }
    events.extend(idle_ticks(&mut state, 1000));

    assert_eq!(telemetry_named(&events, "boss_unlocked"), 1);
    assert!(state.boss().expect("boss").is_visible());
    assert!(!state.is_complete());
}

#[test]
fn closing_without_selection_discards_the_dialogue() {
    let mut state = full_state();
    let before = state.economy().clone();

    let mut events = open_dialogue(&mut state, "ministro");
    events.extend(run_tick(
        &mut state,
        InputSnapshot::empty().with_close_dialogue_pressed(true),
    ));
    assert_eq!(state.interaction, InteractionState::Closed);
    events.extend(run_tick(&mut state, InputSnapshot::empty()));

    assert_eq!(state.economy(), &before);
    assert!(!state.economy().is_completed(&npc_id("ministro")));
    assert_eq!(
        state.interaction,
        InteractionState::ProximityPrompt {
            npc_id: npc_id("ministro")
        }
    );
    assert!(events.contains(&SessionEvent::DialogueClosed {
        npc_id: npc_id("ministro"),
        resolved: false,
    }));
    assert_eq!(telemetry_named(&events, "challenge_resolved"), 0);
}

#[test]
fn boss_resolution_completes_the_session_once() {
    let mut state = full_state();
    complete_all_standard(&mut state);
    let reputation = state.economy().reputation();
    let budget = state.economy().budget();

    let mut events = resolve_with(&mut state, "presidente", CORRECT);
    events.extend(idle_ticks(&mut state, 100));

    assert_eq!(telemetry_named(&events, "session_complete"), 1);
    let completion = state.completion().expect("completion");
    assert_eq!(completion.reputation, (reputation + 10).min(100));
    assert_eq!(completion.budget, budget - 5);
    assert!(completion.elapsed_seconds > 0.0);
    assert!(events.iter().any(|event| matches!(
        event,
        SessionEvent::Telemetry(TelemetryEvent::SessionComplete { reputation: r, budget: b, .. })
            if *r == completion.reputation && *b == completion.budget
    )));
}

#[test]
fn wrong_boss_answer_does_not_complete() {
    let mut state = full_state();
    complete_all_standard(&mut state);

    let events = resolve_with(&mut state, "presidente", WRONG);
    assert_eq!(telemetry_named(&events, "session_complete"), 0);
    assert!(!state.is_complete());

    let events = resolve_with(&mut state, "presidente", CORRECT);
    assert_eq!(telemetry_named(&events, "session_complete"), 1);
}

#[test]
fn completion_is_inserted_at_most_once_per_npc() {
    let mut state = full_state();
    let option = state.npcs()[0].options[CORRECT].clone();
    let id = npc_id("ministro");
    let mut events = Vec::new();

    let first = apply(&mut state, &id, &option, &mut events);
    let second = apply(&mut state, &id, &option, &mut events);

    assert!(first.newly_completed);
    assert!(!second.newly_completed);
    assert_eq!(second.completed_count, 1);
    assert_eq!(telemetry_named(&events, "progress_updated"), 1);
    assert_eq!(telemetry_named(&events, "challenge_resolved"), 2);
}

#[test]
fn unknown_npc_is_never_completed() {
    let mut state = full_state();
    let option = state.npcs()[0].options[CORRECT].clone();
    let result = apply(&mut state, &npc_id("nobody"), &option, &mut Vec::new());
    assert!(!result.newly_completed);
    assert_eq!(state.economy().completed_count(), 0);
}

#[test]
fn boss_visibility_never_reverts() {
    let mut state = full_state();
    complete_all_standard(&mut state);
    assert!(state.boss().expect("boss").is_visible());

    let wrong = state.npcs()[0].options[WRONG].clone();
    let mut events = Vec::new();
    for id in standard_ids(12) {
        apply(&mut state, &npc_id(&id), &wrong, &mut events);
        assert!(state.boss().expect("boss").is_visible());
    }
    events.extend(idle_ticks(&mut state, 50));
    assert!(state.boss().expect("boss").is_visible());
    assert_eq!(telemetry_named(&events, "boss_unlocked"), 0);
}

#[test]
fn session_complete_requires_boss_as_final_subject() {
    let mut state = full_state();
    let ids = standard_ids(12);
    let mut events = Vec::new();
    let correct = state.npcs()[0].options[CORRECT].clone();

    for id in &ids[..11] {
        apply(&mut state, &npc_id(id), &correct, &mut events);
    }
    apply(&mut state, &npc_id("presidente"), &correct, &mut events);
    let last = apply(&mut state, &npc_id(&ids[11]), &correct, &mut events);

    assert_eq!(last.completed_count, 13);
    assert!(!last.session_complete);
    assert_eq!(telemetry_named(&events, "session_complete"), 0);
    assert!(!state.is_complete());
}

#[test]
fn walking_into_a_wall_reports_blocked_and_stays_outside() {
    let mut state = state_from(walled_config());
    let mut blocked = 0usize;
    for _ in 0..120 {
        let events = run_tick(
            &mut state,
            InputSnapshot::empty().with_movement_intent(Vec2::new(1.0, 0.0)),
        );
        blocked += events
            .iter()
            .filter(|event| matches!(event, SessionEvent::MovementBlocked))
            .count();
        assert!(!state.colliders().overlaps(&state.player().bounds()));
    }
    assert!(blocked > 0);
    assert!(state.player().position.x < 2.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scores_stay_in_range_under_arbitrary_sequences(
        ops in proptest::collection::vec(economy_op(), 1..200)
    ) {
        let mut state = full_state();
        let ids = state
            .npcs()
            .iter()
            .map(|npc| npc.id.clone())
            .collect::<Vec<_>>();
        let mut events = Vec::new();

        for op in ops {
            match op {
                EconomyOp::Damage(amount) => {
                    apply_damage(&mut state, amount, &mut events);
                }
                EconomyOp::Resolve { npc_index, correct, reputation_delta, budget_delta } => {
                    let option = DialogueOption {
                        text: "any".to_string(),
                        correct,
                        feedback: "any".to_string(),
                        reputation_delta,
                        budget_delta,
                    };
                    let result = apply(&mut state, &ids[npc_index % ids.len()], &option, &mut events);
                    prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&result.reputation));
                    prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&result.budget));
                }
            }
            prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&state.economy().reputation()));
            prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&state.economy().budget()));
        }
    }

    #[test]
    fn player_never_ends_a_tick_inside_a_collider(
        intents in proptest::collection::vec(walk_intent(), 1..40)
    ) {
        let mut state = state_from(walled_config());
        for intent in intents {
            for _ in 0..30 {
                run_tick(&mut state, InputSnapshot::empty().with_movement_intent(intent));
                prop_assert!(!state.colliders().overlaps(&state.player().bounds()));
            }
        }
    }
}

#[test]
fn nearest_npc_wins_and_ties_go_to_first_registered() {
    let mut config = config_json(2);
    config["npcs"][0]["position"] = json!({ "x": 2.0, "y": 0.0, "z": 0.0 });
    config["npcs"][1]["position"] = json!({ "x": -2.0, "y": 0.0, "z": 0.0 });
    let mut state = state_from(config);

    run_tick(&mut state, InputSnapshot::empty());
    assert_eq!(
        state.interaction,
        InteractionState::ProximityPrompt {
            npc_id: npc_id("ministro")
        }
    );

    state.player.position = Vec3::new(-1.0, 0.9, 0.0);
    run_tick(&mut state, InputSnapshot::empty());
    assert_eq!(
        state.interaction,
        InteractionState::ProximityPrompt {
            npc_id: npc_id("npc_1")
        }
    );
}

#[test]
fn prompt_uses_ground_distance_only() {
    let mut state = full_state();
    let npc_position = state.npcs()[0].position;
    state.player.position = Vec3::new(npc_position.x - 3.9, 40.0, npc_position.z);
    run_tick(&mut state, InputSnapshot::empty());
    assert_eq!(state.interaction.prompt_npc(), Some(&npc_id("ministro")));
}

#[test]
fn hidden_boss_is_never_prompted() {
    let mut state = full_state();
    teleport_next_to(&mut state, "presidente");
    run_tick(&mut state, InputSnapshot::empty().with_interact_pressed(true));
    assert_eq!(state.interaction, InteractionState::Idle);
}

#[test]
fn prompt_returns_to_idle_when_player_walks_away() {
    let mut state = full_state();
    teleport_next_to(&mut state, "ministro");
    run_tick(&mut state, InputSnapshot::empty());
    assert!(state.interaction.prompt_npc().is_some());

    state.player.position = Vec3::new(0.0, 0.9, 0.0);
    run_tick(&mut state, InputSnapshot::empty());
    assert_eq!(state.interaction, InteractionState::Idle);
}

#[test]
fn interact_is_ignored_while_another_dialogue_is_open() {
    let mut state = full_state();
    open_dialogue(&mut state, "ministro");

    teleport_next_to(&mut state, "npc_1");
    let events = run_tick(&mut state, InputSnapshot::empty().with_interact_pressed(true));

    assert!(events.is_empty());
    assert_eq!(state.active_dialogue_npc(), Some(&npc_id("ministro")));
}

#[test]
fn out_of_range_option_and_stray_requests_are_no_ops() {
    let mut state = full_state();
    let events = run_tick(
        &mut state,
        InputSnapshot::empty()
            .with_selected_option(Some(0))
            .with_close_dialogue_pressed(true),
    );
    assert!(events.is_empty());

    open_dialogue(&mut state, "ministro");
    let before = state.economy().clone();
    let events = run_tick(
        &mut state,
        InputSnapshot::empty().with_selected_option(Some(9)),
    );
    assert!(events.is_empty());
    assert_eq!(state.economy(), &before);
    assert!(state.interaction.is_dialogue_open());
}

#[test]
fn resolved_dialogue_ignores_a_second_selection() {
    let mut state = full_state();
    open_dialogue(&mut state, "ministro");
    run_tick(&mut state, InputSnapshot::empty().with_selected_option(Some(WRONG)));
    let after_first = state.economy().clone();

    let events = run_tick(&mut state, InputSnapshot::empty().with_selected_option(Some(CORRECT)));
    assert!(events.is_empty());
    assert_eq!(state.economy(), &after_first);
    assert_eq!(
        state.interaction,
        InteractionState::Resolved {
            npc_id: npc_id("ministro"),
            option_index: WRONG,
        }
    );
}

#[test]
fn wrong_answer_keeps_npc_eligible() {
    let mut state = full_state();
    let events = resolve_with(&mut state, "ministro", WRONG);

    assert_eq!(state.economy().reputation(), 40);
    assert_eq!(state.economy().completed_count(), 0);
    assert_eq!(telemetry_named(&events, "progress_updated"), 0);
    assert_eq!(state.interaction.prompt_npc(), Some(&npc_id("ministro")));
}

#[test]
fn completed_npc_drops_out_of_proximity_after_close() {
    let mut state = full_state();
    resolve_with(&mut state, "ministro", CORRECT);
    assert_eq!(state.interaction, InteractionState::Idle);
}

#[test]
fn movement_is_suspended_while_dialogue_is_open_but_hazards_still_hit() {
    let mut config = config_json(12);
    config["hazards"] = json!([{
        "position": { "x": 11.0, "y": 0.9, "z": 3.0 },
        "direction": { "x": 0.0, "y": 0.0, "z": -1.0 },
        "speed": 6.0
    }]);
    let mut state = state_from(config);
    open_dialogue(&mut state, "ministro");
    let position = state.player().position;

    let mut events = Vec::new();
    for _ in 0..60 {
        events.extend(run_tick(
            &mut state,
            InputSnapshot::empty().with_movement_intent(Vec2::new(1.0, 0.0)),
        ));
    }

    assert_eq!(state.player().position, position);
    assert!(damage_events(&events) >= 1);
    assert!(state.interaction.is_dialogue_open());
}

#[test]
fn step_returns_the_advanced_state_and_events() {
    let state = full_state();
    let outcome = step(
        state,
        &InputSnapshot::empty().with_movement_intent(Vec2::new(1.0, 0.0)),
        0.5,
    );

    assert!((outcome.state.player().position.x - 3.0).abs() < 0.0001);
    assert!((outcome.state.elapsed_seconds() - 0.5).abs() < 0.0001);
    assert!(outcome.events.is_empty());
}

#[test]
fn non_finite_dt_does_not_advance_the_clock() {
    let state = full_state();
    let outcome = step(state, &InputSnapshot::empty(), f32::NAN);
    assert_eq!(outcome.state.elapsed_seconds(), 0.0);
}

#[test]
fn independent_sessions_do_not_share_progress() {
    let mut first = full_state();
    let second = first.clone();
    resolve_with(&mut first, "ministro", CORRECT);

    assert_eq!(first.economy().completed_count(), 1);
    assert_eq!(second.economy().completed_count(), 0);
}

#[test]
fn snapshot_exposes_dialogue_and_progress() {
    let mut state = full_state();
    open_dialogue(&mut state, "ministro");
    run_tick(&mut state, InputSnapshot::empty().with_selected_option(Some(CORRECT)));

    let snapshot = state.snapshot();
    let dialogue = snapshot.dialogue.as_ref().expect("dialogue view");
    assert_eq!(dialogue.npc_id, npc_id("ministro"));
    assert_eq!(dialogue.options.len(), 2);
    assert_eq!(dialogue.feedback.as_deref(), Some("Good call."));
    assert_eq!(snapshot.completed_count, 1);
    assert_eq!(snapshot.total_npcs, 13);
    assert!(!snapshot.npcs.iter().find(|npc| npc.boss).expect("boss").visible);

    let value = serde_json::to_value(&snapshot).expect("serialize snapshot");
    assert_eq!(value["interaction"]["state"], "resolved");
    assert_eq!(value["active_dialogue_npc_id"], "ministro");
}

#[test]
fn session_forwards_telemetry_and_tracks_counts() {
    let mut state = full_state();
    teleport_next_to(&mut state, "ministro");
    let mut session = Session::new(state, RecordingTelemetry::default());

    session.advance(&InputSnapshot::empty().with_interact_pressed(true), DT);
    assert_eq!(session.last_tick_counts().dialogue_opened, 1);
    session.advance(
        &InputSnapshot::empty().with_selected_option(Some(CORRECT)),
        DT,
    );

    assert_eq!(session.last_tick_counts().telemetry, 2);
    assert_eq!(session.telemetry().count_named("challenge_resolved"), 1);
    assert_eq!(session.telemetry().count_named("progress_updated"), 1);
    assert_eq!(session.ticks(), 2);
}

/// Test driver that walks straight to the nearest eligible NPC and answers
/// correctly.
struct GreedyInput;

impl InputSource<Session<RecordingTelemetry>> for GreedyInput {
    fn snapshot_for_tick(&mut self, session: &Session<RecordingTelemetry>) -> InputSnapshot {
        let state = session.state();
        match state.interaction() {
            InteractionState::ProximityPrompt { .. } => {
                InputSnapshot::empty().with_interact_pressed(true)
            }
            InteractionState::DialogueOpen { npc_id } => {
                let index = state.npc(npc_id).and_then(NonPlayerEntity::correct_option_index);
                InputSnapshot::empty().with_selected_option(index)
            }
            InteractionState::Resolved { .. } => {
                InputSnapshot::empty().with_close_dialogue_pressed(true)
            }
            InteractionState::Closed => InputSnapshot::empty(),
            InteractionState::Idle => {
                let player = state.player().position;
                let target = state.eligible_npcs().min_by(|a, b| {
                    player
                        .ground_distance_sq(a.position)
                        .total_cmp(&player.ground_distance_sq(b.position))
                });
                match target {
                    Some(npc) => InputSnapshot::empty()
                        .with_movement_intent((npc.position - player).ground()),
                    None => InputSnapshot::empty().with_quit_requested(true),
                }
            }
        }
    }
}

#[test]
fn engine_loop_drives_session_to_completion() {
    let mut session = Session::new(full_state(), RecordingTelemetry::default());
    let config = LoopConfig {
        max_ticks: Some(20_000),
        ..LoopConfig::default()
    };

    let summary = run_headless(&config, &mut session, &mut GreedyInput);

    assert_eq!(summary.stop_reason, StopReason::SimulationFinished);
    assert!(session.state().is_complete());
    assert_eq!(session.telemetry().count_named("boss_unlocked"), 1);
    assert_eq!(session.telemetry().count_named("session_complete"), 1);
    assert_eq!(session.telemetry().count_named("progress_updated"), 13);
}
