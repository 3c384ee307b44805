use crate::game::{Game, Step};
use crate::observation::{Observation, StateVariable};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// The pole has fallen once it leans further than this from vertical (radians).
pub const FALL_ANGLE: f32 = std::f32::consts::FRAC_PI_2;

/*
A cart sits on a track with a pole standing on it. Each step the player
nudges the cart left (`l`), right (`r`) or leaves it (`o`), and earns one
time step of score for as long as the pole stays up.

       |
      /
    __|__
===o=====o===
*/

/// Single-player balancing task. Only the first seat ever moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartPole {
    pub position: f32,
    pub velocity: f32,
    pub angle: f32,
    /// `None` draws a small random push in `[-0.005, 0.005)` at the start of every game.
    pub angular_velocity: Option<f32>,
    pub mass: f32,
    pub time_step: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartPoleState {
    pub position: f32,
    pub velocity: f32,
    pub angle: f32,
    pub angular_velocity: f32,
    pub fallen: bool,
    pub steps: usize,
}

impl Default for CartPole {
    fn default() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            angle: 0.0,
            angular_velocity: None,
            mass: 1.0,
            time_step: 0.1,
        }
    }
}

impl CartPole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = Some(angular_velocity);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    /// One explicit Euler step of the cart and pole under push `push` (-1, 0 or 1).
    pub fn advance(&self, s: &CartPoleState, push: f32) -> CartPoleState {
        let dt = self.time_step;
        let (sin, cos) = (s.angle.sin(), s.angle.cos());
        let angular_acceleration = -push / self.mass * cos + sin
            - 2.0 * sin.powi(3) / cos * s.angular_velocity.powi(2);
        let angle = s.angle + s.angular_velocity * dt;
        CartPoleState {
            position: s.position + s.velocity * dt,
            velocity: s.velocity + push * dt,
            angle,
            angular_velocity: s.angular_velocity + dt * angular_acceleration,
            fallen: angle.abs() > FALL_ANGLE,
            steps: s.steps + 1,
        }
    }
}

const TRACK: &str = "===o=====o===";

// from fallen left to fallen right
const POLES: [&str; 12] = [
    "             \n    __       \n    __\\__    ",
    "    _        \n     \\       \n    __\\__    ",
    "    \\        \n     \\       \n    __\\__    ",
    "     \\       \n      \\      \n    __|__    ",
    "     |       \n      \\      \n    __|__    ",
    "      \\      \n      |      \n    __|__    ",
    "      /      \n      |      \n    __|__    ",
    "       |     \n      /      \n    __|__    ",
    "       /     \n      /      \n    __|__    ",
    "        /    \n       /     \n    __/__    ",
    "        _    \n       /     \n    __/__    ",
    "             \n       __    \n    __/__    ",
];

impl CartPole {
    /// Draws the pole leaning by `state.angle` above the track, followed by
    /// the numbers in words.
    pub fn render(&self, state: &CartPoleState) -> String {
        let slot = ((state.angle / PI + 0.5) * POLES.len() as f32).floor();
        let slot = slot.max(0.0).min((POLES.len() - 1) as f32) as usize;
        let mut picture = format!(
            "{}\n{}\n\nThe cart is at position {:.2} travelling at speed {:.2},\n\
             the pole is at an angle {:.0} degrees and with\n\
             angular velocity {:.0} degrees per second.",
            POLES[slot],
            TRACK,
            state.position,
            state.velocity,
            state.angle.to_degrees(),
            state.angular_velocity.to_degrees(),
        );
        if state.fallen {
            picture.push_str("\nThe pole has fallen over!");
        }
        picture
    }
}

fn push(action: &str) -> f32 {
    match action {
        "l" => -1.0,
        "r" => 1.0,
        _ => 0.0,
    }
}

impl Game for CartPole {
    type State = CartPoleState;

    const NAME: &'static str = "cart-pole";

    fn initial_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::State {
        let angular_velocity = match self.angular_velocity {
            Some(w) => w,
            None => (rng.gen::<f32>() - 0.5) / 100.0,
        };
        CartPoleState {
            position: self.position,
            velocity: self.velocity,
            angle: self.angle,
            angular_velocity,
            fallen: self.angle.abs() > FALL_ANGLE,
            steps: 0,
        }
    }

    fn observe(&self, _seat: usize, s: &Self::State) -> Observation {
        Observation::new(
            vec!["l".into(), "r".into(), "o".into()],
            vec![
                StateVariable::continuous("position", s.position),
                StateVariable::continuous("velocity", s.velocity),
                StateVariable::continuous("angle", s.angle),
                StateVariable::continuous("ang_vel", s.angular_velocity),
                StateVariable::continuous("time_step", self.time_step),
                StateVariable::continuous("m", self.mass),
            ],
        )
        .with_picture(self.render(s))
    }

    fn step<R: Rng + ?Sized>(
        &self,
        state: &Self::State,
        _seat: usize,
        action: &str,
        _rng: &mut R,
    ) -> Step<Self::State> {
        let next = self.advance(state, push(action));
        Step {
            reward: if next.fallen { 0.0 } else { self.time_step },
            state: next,
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.fallen
    }

    fn next_player(&self, _state: &Self::State, _turn: usize, _num_players: usize) -> usize {
        0
    }

    fn summary(&self, state: &Self::State, scores: &[(String, f32)]) -> Option<String> {
        let (player, score) = scores.first()?;
        Some(format!(
            "The pole has fallen after {} steps. Player {} kept the pole up for {:.1} seconds!",
            state.steps, player, score
        ))
    }
}
