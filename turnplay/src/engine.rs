use crate::error::GameError;
use crate::game::Game;
use crate::observation::{ActionId, Observation, PlayerId, GAME_OVER};
use crate::players::Player;
use log::{debug, info, warn};
use rand::Rng;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Over,
}

/// One applied move.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRecord {
    pub turn: usize,
    pub player: PlayerId,
    pub action: ActionId,
    pub reward: f32,
}

struct Seat {
    player: Box<dyn Player>,
    score: f32,
}

/// Owns the game state, the players and their scores, and drives the turn loop.
///
/// `NotStarted --initialize--> Running --terminal state or conclude--> Over`
pub struct Engine<G: Game, R: Rng> {
    game: G,
    rng: R,
    seats: Vec<Seat>,
    state: Option<G::State>,
    phase: Phase,
    turn: usize,
    history: Vec<TurnRecord>,
    concluded: bool,
}

impl<G: Game, R: Rng> Engine<G, R> {
    pub fn new(game: G, rng: R) -> Self {
        Self {
            game,
            rng,
            seats: Vec::new(),
            state: None,
            phase: Phase::NotStarted,
            turn: 0,
            history: Vec::new(),
            concluded: false,
        }
    }

    pub fn initialize(&mut self, players: Vec<Box<dyn Player>>) -> Result<(), GameError> {
        if self.phase != Phase::NotStarted {
            return Err(GameError::Configuration("engine is already initialized".into()));
        }
        if players.is_empty() {
            return Err(GameError::Configuration("a game needs at least one player".into()));
        }
        let mut ids = HashSet::new();
        for player in players.iter() {
            if !ids.insert(player.id().to_string()) {
                return Err(GameError::Configuration(format!(
                    "duplicate player id {}",
                    player.id()
                )));
            }
        }

        let state = self.game.initial_state(&mut self.rng);
        self.phase = if self.game.is_terminal(&state) {
            Phase::Over
        } else {
            Phase::Running
        };
        self.state = Some(state);
        self.seats = players
            .into_iter()
            .map(|player| Seat { player, score: 0.0 })
            .collect();
        info!(
            "{} started with {}",
            G::NAME,
            self.seats
                .iter()
                .map(|s| s.player.id())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn state(&self) -> Option<&G::State> {
        self.state.as_ref()
    }

    /// Number of moves applied so far.
    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// Cumulative scores in seat order.
    pub fn scores(&self) -> Vec<(PlayerId, f32)> {
        self.seats
            .iter()
            .map(|s| (s.player.id().to_string(), s.score))
            .collect()
    }

    fn score_table(&self) -> BTreeMap<PlayerId, f32> {
        self.scores().into_iter().collect()
    }

    fn seat_of(&self, player_id: &str) -> Result<usize, GameError> {
        self.seats
            .iter()
            .position(|s| s.player.id() == player_id)
            .ok_or_else(|| GameError::UnknownPlayer {
                player: player_id.into(),
            })
    }

    fn current_state(&self) -> Result<&G::State, GameError> {
        self.state.as_ref().ok_or(GameError::NotStarted)
    }

    fn observe(&self, seat: usize) -> Result<Observation, GameError> {
        let state = self.current_state()?;
        let mut observation = self.game.observe(seat, state).with_scores(self.score_table());
        if self.is_over() {
            observation = observation.into_terminal();
        }
        observation.validate()?;
        Ok(observation)
    }

    /// What `player_id` sees right now. Once the game is over this is the
    /// final observation: final scores and only [`GAME_OVER`] left to play.
    pub fn get_observation(&self, player_id: &str) -> Result<Observation, GameError> {
        if self.phase == Phase::NotStarted {
            return Err(GameError::NotStarted);
        }
        let seat = self.seat_of(player_id)?;
        self.observe(seat)
    }

    fn next_seat(&self) -> Result<usize, GameError> {
        match self.phase {
            Phase::NotStarted => return Err(GameError::NotStarted),
            Phase::Over => return Err(GameError::GameOver),
            Phase::Running => {}
        }
        let seat = self
            .game
            .next_player(self.current_state()?, self.turn, self.seats.len());
        if seat >= self.seats.len() {
            return Err(GameError::Configuration(format!(
                "{} picked seat {} but only {} players are seated",
                G::NAME,
                seat,
                self.seats.len()
            )));
        }
        Ok(seat)
    }

    /// Id of the player to move.
    pub fn next_player(&self) -> Result<&str, GameError> {
        let seat = self.next_seat()?;
        Ok(self.seats[seat].player.id())
    }

    /// Advances the game one step with `action` played by `player_id`.
    /// Nothing changes when an error is returned.
    pub fn apply_move(&mut self, player_id: &str, action: &str) -> Result<TurnRecord, GameError> {
        let expected = self.next_seat()?;
        let seat = self.seat_of(player_id)?;
        if seat != expected {
            return Err(GameError::OutOfTurn {
                player: player_id.into(),
                expected: self.seats[expected].player.id().into(),
            });
        }
        if !self.observe(seat)?.is_legal(action) {
            return Err(GameError::IllegalMove {
                player: player_id.into(),
                action: action.into(),
            });
        }

        let state = self.state.as_ref().ok_or(GameError::NotStarted)?;
        let step = self.game.step(state, seat, action, &mut self.rng);
        let over = self.game.is_terminal(&step.state);
        self.state = Some(step.state);
        self.seats[seat].score += step.reward;

        let record = TurnRecord {
            turn: self.turn,
            player: player_id.into(),
            action: action.into(),
            reward: step.reward,
        };
        debug!(
            "turn {}: {} played {} for {}",
            record.turn, record.player, record.action, record.reward
        );
        self.history.push(record.clone());
        self.turn += 1;
        if over {
            self.phase = Phase::Over;
        }
        Ok(record)
    }

    /// Asks the player to move for an action and applies it.
    pub fn run_turn(&mut self) -> Result<TurnRecord, GameError> {
        let seat = self.next_seat()?;
        let observation = self.observe(seat)?;
        let action = self.seats[seat].player.select_move(&observation)?;
        let id = self.seats[seat].player.id().to_string();
        self.apply_move(&id, &action)
    }

    /// Ends the game and hands every player the terminal observation, once.
    /// A game still running (a turn cap was hit) is forced over.
    pub fn conclude(&mut self) -> Result<(), GameError> {
        if self.phase == Phase::NotStarted {
            return Err(GameError::NotStarted);
        }
        if self.concluded {
            return Ok(());
        }
        self.phase = Phase::Over;

        // every seat is signalled even when an earlier one fails
        let mut failure = None;
        for seat in 0..self.seats.len() {
            let reply = self
                .observe(seat)
                .and_then(|observation| self.seats[seat].player.select_move(&observation));
            match reply {
                Ok(reply) if reply != GAME_OVER => warn!(
                    "{} answered the end of the game with {}",
                    self.seats[seat].player.id(),
                    reply
                ),
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        "{} failed to take the end of the game: {}",
                        self.seats[seat].player.id(),
                        e
                    );
                    failure.get_or_insert(e);
                }
            }
        }
        self.concluded = true;

        let scores = self.scores();
        if let Some(line) = self.game.summary(self.current_state()?, &scores) {
            info!("{}", line);
        }
        info!(
            "{} over after {} turns: {}",
            G::NAME,
            self.turn,
            scores
                .iter()
                .map(|(id, score)| format!("{} {}", id, score))
                .collect::<Vec<_>>()
                .join(", ")
        );
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Runs turns until the game ends or `max_turns` moves have been played,
    /// then concludes. Returns the final scores.
    pub fn run_game(&mut self, max_turns: usize) -> Result<Vec<(PlayerId, f32)>, GameError> {
        if self.phase == Phase::NotStarted {
            return Err(GameError::NotStarted);
        }
        while !self.is_over() && self.turn < max_turns {
            self.run_turn()?;
        }
        self.conclude()?;
        Ok(self.scores())
    }

    /// Hands the players back, learned state included.
    pub fn into_players(self) -> Vec<Box<dyn Player>> {
        self.seats.into_iter().map(|s| s.player).collect()
    }
}
