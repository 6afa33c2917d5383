use error_chain::bail;
use log::{debug, info};
use rand::Rng;

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::expression::Expression;
use crate::maze::MazeDescriptor;
use crate::player::{MovementInput, Player, STEP_LENGTH};
use crate::units::Milliseconds;
use crate::world::{DynamicObjectKind, World, WorldBuilder, WorldPosition, TILE_WORLD_SIZE};

pub const TIME_FOR_ROOM: Milliseconds = Milliseconds(2000);
pub const INSTRUCTIONS_DURATION: Milliseconds = Milliseconds(4000);
pub const EXPRESSION_SOLVED_TIME_BONUS: Milliseconds = Milliseconds(5000);
pub const EXPRESSION_WRONG_TIME_HARM: Milliseconds = Milliseconds(1000);
pub const MAX_ANSWER_LENGTH: usize = 4;
/// Height of the player's eyes above the floor.
pub const EYE_HEIGHT: f32 = 2.5;

// Distance covered per autopilot step, and the lanes it tries either side of a tile's centre line.
const WALK_STEP: f32 = 0.5;
const WALK_LANES: [f32; 3] = [0.0, -1.5, 1.5];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionPhase {
    /// The opening countdown. The time budget does not tick and the player cannot move.
    Instructions,
    Exploring,
    SolvingExpression,
    Finished(SessionOutcome),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionOutcome {
    Escaped,
    GameOver,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InteractOutcome {
    /// Nothing to interact with where the player stands.
    Nothing,
    SolvingDoor(Expression),
    Escaped,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AnswerOutcome {
    DoorOpened,
    /// The answer was wrong and a fresh expression replaces the old one.
    Wrong(Expression),
}

#[derive(Copy, Clone, Debug)]
struct DoorChallenge {
    door: Cartesian2DCoordinate,
    expression: Expression,
}

/// One play through of a generated maze, without any rendering or input devices attached.
#[derive(Debug)]
pub struct DungeonSession<R: Rng> {
    rng: R,
    world: World,
    player: Player,
    time_remaining: Milliseconds,
    instructions_remaining: Milliseconds,
    phase: SessionPhase,
    challenge: Option<DoorChallenge>,
    entered_answer: String,
    doors_opened: usize,
}

impl<R: Rng> DungeonSession<R> {
    /// Builds the world for `descriptor` and places the player at its starting tile.
    pub fn new(descriptor: &MazeDescriptor, rng: R) -> Result<DungeonSession<R>> {
        let world = WorldBuilder::new().build(descriptor.maze())?;
        let mut start = WorldPosition::tile_centre(descriptor.starting_position());
        start.y = EYE_HEIGHT;
        let time_remaining = Milliseconds(descriptor.rooms_count().0 as i64 * TIME_FOR_ROOM.0);
        info!("session started: {} rooms, {} ms on the clock",
              descriptor.rooms_count().0,
              time_remaining.0);

        Ok(DungeonSession {
            rng,
            world,
            player: Player::new(start),
            time_remaining,
            instructions_remaining: INSTRUCTIONS_DURATION,
            phase: SessionPhase::Instructions,
            challenge: None,
            entered_answer: String::with_capacity(MAX_ANSWER_LENGTH),
            doors_opened: 0,
        })
    }

    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self.phase {
            SessionPhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    #[inline]
    pub fn time_remaining(&self) -> Milliseconds {
        self.time_remaining
    }

    #[inline]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player_tile(&self) -> Option<Cartesian2DCoordinate> {
        self.player.position().tile()
    }

    pub fn expression(&self) -> Option<Expression> {
        self.challenge.map(|challenge| challenge.expression)
    }

    #[inline]
    pub fn entered_answer(&self) -> &str {
        &self.entered_answer
    }

    #[inline]
    pub fn doors_opened(&self) -> usize {
        self.doors_opened
    }

    /// Advances the clocks by `dt` seconds and, while exploring, moves the player.
    pub fn update(&mut self, dt: f32, input: MovementInput) -> SessionPhase {
        self.tick(dt);
        if self.phase == SessionPhase::Exploring {
            self.player.update(input, dt, self.world.physics_world());
        }
        self.phase
    }

    pub fn rotate_player(&mut self, delta_azimuth: f32, delta_zenith: f32) {
        if self.phase == SessionPhase::Exploring {
            self.player.rotate(delta_azimuth, delta_zenith);
        }
    }

    fn tick(&mut self, dt: f32) {
        let elapsed = (dt * 1000.0) as i64;
        match self.phase {
            SessionPhase::Instructions => {
                self.instructions_remaining = Milliseconds(self.instructions_remaining.0 - elapsed);
                if self.instructions_remaining.0 <= 0 {
                    debug!("instructions over");
                    self.phase = SessionPhase::Exploring;
                }
            }
            SessionPhase::Exploring | SessionPhase::SolvingExpression => {
                self.time_remaining = Milliseconds(self.time_remaining.0 - elapsed);
                self.end_if_out_of_time();
            }
            SessionPhase::Finished(_) => {}
        }
    }

    fn end_if_out_of_time(&mut self) {
        if self.time_remaining.0 <= 0 {
            self.finish(SessionOutcome::GameOver);
        }
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        info!("session finished: {:?} with {} ms left and {} doors opened",
              outcome,
              self.time_remaining.0,
              self.doors_opened);
        self.phase = SessionPhase::Finished(outcome);
        self.challenge = None;
        self.entered_answer.clear();
    }

    fn ensure_running(&self) -> Result<()> {
        if let SessionPhase::Finished(_) = self.phase {
            bail!(ErrorKind::SessionOver);
        }
        Ok(())
    }

    fn ensure_solving(&self) -> Result<DoorChallenge> {
        self.ensure_running()?;
        match self.challenge {
            Some(challenge) => Ok(challenge),
            None => bail!(ErrorKind::NotSolvingExpression),
        }
    }

    /// Acts on the door or exit portal in the player's tile.
    pub fn interact(&mut self) -> Result<InteractOutcome> {
        self.ensure_running()?;
        if self.phase != SessionPhase::Exploring {
            return Ok(InteractOutcome::Nothing);
        }

        let object = match self.world.dynamic_object(self.player.position()) {
            Some(object) => (object.kind(), object.tile()),
            None => return Ok(InteractOutcome::Nothing),
        };
        match object {
            (DynamicObjectKind::Door, door) => {
                let expression = Expression::generate(&mut self.rng);
                debug!("solving door at {:?}: {}", door, expression);
                self.challenge = Some(DoorChallenge { door, expression });
                self.entered_answer.clear();
                self.phase = SessionPhase::SolvingExpression;
                Ok(InteractOutcome::SolvingDoor(expression))
            }
            (DynamicObjectKind::ExitPortal, _) => {
                self.finish(SessionOutcome::Escaped);
                Ok(InteractOutcome::Escaped)
            }
        }
    }

    /// Appends a digit, or a minus sign at the very start, to the answer. Returns false when the
    /// symbol was not accepted.
    pub fn enter_symbol(&mut self, symbol: char) -> Result<bool> {
        self.ensure_solving()?;
        let accepted = self.entered_answer.len() < MAX_ANSWER_LENGTH &&
                       (symbol.is_ascii_digit() || (symbol == '-' && self.entered_answer.is_empty()));
        if accepted {
            self.entered_answer.push(symbol);
        }
        Ok(accepted)
    }

    pub fn backspace(&mut self) -> Result<()> {
        self.ensure_solving()?;
        self.entered_answer.pop();
        Ok(())
    }

    /// Checks the entered answer. A correct answer removes the door for good and buys time, a wrong
    /// one costs time and swaps in a new expression. The entry is cleared either way.
    pub fn submit(&mut self) -> Result<AnswerOutcome> {
        let challenge = self.ensure_solving()?;
        if self.entered_answer.is_empty() {
            bail!(ErrorKind::EmptyAnswer);
        }
        let answer: i32 = self.entered_answer.parse()?;
        self.entered_answer.clear();

        if challenge.expression.is_result_correct(answer) {
            self.world.remove_dynamic_object(challenge.door);
            self.time_remaining = Milliseconds(self.time_remaining.0 + EXPRESSION_SOLVED_TIME_BONUS.0);
            self.challenge = None;
            self.doors_opened += 1;
            self.phase = SessionPhase::Exploring;
            info!("door at {:?} opened, {} ms left", challenge.door, self.time_remaining.0);
            Ok(AnswerOutcome::DoorOpened)
        } else {
            self.time_remaining = Milliseconds(self.time_remaining.0 - EXPRESSION_WRONG_TIME_HARM.0);
            let expression = Expression::generate(&mut self.rng);
            self.challenge = Some(DoorChallenge {
                door: challenge.door,
                expression,
            });
            debug!("wrong answer {}, next expression {}", answer, expression);
            self.end_if_out_of_time();
            Ok(AnswerOutcome::Wrong(expression))
        }
    }

    /// Types a whole answer and submits it. An answer too long for the entry is refused and
    /// leaves the entry empty.
    pub fn answer(&mut self, answer: i32) -> Result<AnswerOutcome> {
        self.ensure_solving()?;
        self.entered_answer.clear();
        for symbol in answer.to_string().chars() {
            if !self.enter_symbol(symbol)? {
                self.entered_answer.clear();
                bail!(ErrorKind::AnswerDoesNotFit(answer));
            }
        }
        self.submit()
    }

    /// Leaving the dungeon early counts as losing.
    pub fn give_up(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.finish(SessionOutcome::GameOver);
        Ok(())
    }

    /// Walks the player into an adjacent tile at normal speed, letting the clock run, the
    /// instructions countdown included. Several lanes either side of the centre line are tried
    /// so objects in the middle of a tile can be walked around. Returns whether the player ended
    /// up in `tile`; a closed door stops the player just inside the door's tile.
    pub fn walk_to_adjacent_tile(&mut self, tile: Cartesian2DCoordinate) -> Result<bool> {
        self.ensure_running()?;
        if self.phase == SessionPhase::Instructions {
            let remaining = self.instructions_remaining.0 as f32 / 1000.0;
            self.tick(remaining);
        }
        if self.phase != SessionPhase::Exploring {
            return Ok(false);
        }
        let current = match self.player_tile() {
            Some(current) if current.manhattan_distance(tile) == 1 => current,
            _ => return Ok(false),
        };

        let along_x = current.y == tile.y;
        let centre = WorldPosition::tile_centre(tile);
        for lane in WALK_LANES.iter() {
            let position = self.player.position();
            // Line up in the current tile, then head straight across.
            let (lane_start, lane_end) = if along_x {
                let z = centre.z + lane;
                (WorldPosition::new(position.x, position.y, z), WorldPosition::new(centre.x, position.y, z))
            } else {
                let x = centre.x + lane;
                (WorldPosition::new(x, position.y, position.z), WorldPosition::new(x, position.y, centre.z))
            };

            self.march_to(lane_start);
            self.march_to(lane_end);
            if self.outcome().is_some() {
                return Ok(false);
            }
            if self.player_tile() == Some(tile) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Autopilot along `path`, a walk of adjacent tiles starting at the player's tile, opening
    /// every closed door met on the way. Each door is answered wrongly `mistakes_per_door` times
    /// before the right answer goes in. Interacts at the end of the path, so a path ending on the
    /// exit portal escapes. Returns the outcome, or None if the player got stuck with the session
    /// still running.
    pub fn follow_path(&mut self,
                       path: &[Cartesian2DCoordinate],
                       mistakes_per_door: usize)
                       -> Result<Option<SessionOutcome>> {
        for &tile in path.iter().skip(1) {
            if self.walk_to_adjacent_tile(tile)? {
                continue;
            }
            if self.outcome().is_some() {
                return Ok(self.outcome());
            }

            let mut expression = match self.interact()? {
                InteractOutcome::SolvingDoor(expression) => expression,
                _ => return Ok(None),
            };
            for _ in 0..mistakes_per_door {
                if let AnswerOutcome::Wrong(next) = self.answer(expression.expected_result() + 1)? {
                    expression = next;
                }
                if self.outcome().is_some() {
                    return Ok(self.outcome());
                }
            }
            self.answer(expression.expected_result())?;
            if !self.walk_to_adjacent_tile(tile)? {
                return Ok(self.outcome());
            }
        }

        if self.outcome().is_none() {
            self.interact()?;
        }
        Ok(self.outcome())
    }

    fn march_to(&mut self, target: WorldPosition) {
        let max_steps = (2.0 * TILE_WORLD_SIZE / WALK_STEP) as usize + 1;
        for _ in 0..max_steps {
            let position = self.player.position();
            let (dx, dz) = (target.x - position.x, target.z - position.z);
            let distance = (dx * dx + dz * dz).sqrt();
            if distance < 1e-4 || self.phase != SessionPhase::Exploring {
                return;
            }

            let step = distance.min(WALK_STEP);
            let next = WorldPosition::new(position.x + dx / distance * step,
                                          position.y,
                                          position.z + dz / distance * step);
            self.tick(step / STEP_LENGTH);
            if self.phase != SessionPhase::Exploring ||
               !self.player.step_to(next, self.world.physics_world()) {
                return;
            }
        }
    }
}
