use super::geometry::Vec2;

/// Per-tick input sampled from the host. Triggers are edge-style: they are
/// true only for the tick on which the host observed them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    quit_requested: bool,
    movement_intent: Vec2,
    interact_pressed: bool,
    close_dialogue_pressed: bool,
    selected_option: Option<usize>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_movement_intent(mut self, movement_intent: Vec2) -> Self {
        self.movement_intent = movement_intent;
        self
    }

    pub fn with_interact_pressed(mut self, interact_pressed: bool) -> Self {
        self.interact_pressed = interact_pressed;
        self
    }

    pub fn with_close_dialogue_pressed(mut self, close_dialogue_pressed: bool) -> Self {
        self.close_dialogue_pressed = close_dialogue_pressed;
        self
    }

    pub fn with_selected_option(mut self, selected_option: Option<usize>) -> Self {
        self.selected_option = selected_option;
        self
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn movement_intent(&self) -> Vec2 {
        self.movement_intent
    }

    pub fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }

    pub fn close_dialogue_pressed(&self) -> bool {
        self.close_dialogue_pressed
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }
}

/// Produces one input snapshot per simulation tick for a given simulation.
pub trait InputSource<S: ?Sized> {
    fn snapshot_for_tick(&mut self, simulation: &S) -> InputSnapshot;
}
