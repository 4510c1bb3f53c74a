/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    Rise,
    Fall,
}

impl Button {
    /// Buttons that drive keyboard camera movement
    pub const MOVEMENT: [Button; 6] = [
        Button::Forward,
        Button::Backward,
        Button::StrafeLeft,
        Button::StrafeRight,
        Button::Rise,
        Button::Fall,
    ];
}

/// Controller - answers which buttons are currently held
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Get all currently pressed buttons
    fn get_down_keys(&self) -> &[Button];

    /// Signed axis value from a pair of opposing buttons
    fn axis(&self, positive: Button, negative: Button) -> f32 {
        match (self.is_down(positive), self.is_down(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

/// Fixed set of held buttons, handy for scripted input and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldButtons {
    pressed: Vec<Button>,
}

impl HeldButtons {
    pub fn new(pressed: &[Button]) -> Self {
        let mut held = Self::default();
        for &button in pressed {
            held.press(button);
        }
        held
    }

    pub fn press(&mut self, button: Button) {
        if !self.pressed.contains(&button) {
            self.pressed.push(button);
        }
    }

    pub fn release(&mut self, button: Button) {
        self.pressed.retain(|&b| b != button);
    }
}

impl Controller for HeldButtons {
    fn is_down(&self, button: Button) -> bool {
        self.pressed.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.pressed
    }
}
