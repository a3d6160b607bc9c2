//! Game simulation - the fixed-step loop.
//!
//! Each tick first moves the level's kinematic platforms, then steps every
//! character against the updated collision world. Given the same inputs the
//! simulation produces the same positions on every run.

use serde::{Deserialize, Serialize};
use strider_physics::{CharacterConfig, ConfigError, WorldError};

use crate::character::{Character, EntityId};
use crate::input::PlayerInput;
use crate::level::{Level, SpawnPoint};

/// Game simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Character movement configuration.
    pub character: CharacterConfig,

    /// Mouse sensitivity.
    pub mouse_sensitivity: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            character: CharacterConfig::default(),
            mouse_sensitivity: 2.0,
        }
    }
}

impl SimulationConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

/// The main game simulation.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame/tick number.
    pub frame: u64,

    /// Simulation configuration.
    pub config: SimulationConfig,

    /// Current level.
    pub level: Level,

    /// All characters in the game.
    pub characters: Vec<Character>,

    /// Next entity ID to assign.
    next_entity_id: EntityId,
}

impl Simulation {
    /// Create a new simulation with the given configuration and level.
    pub fn new(config: SimulationConfig, level: Level) -> Self {
        Self {
            frame: 0,
            config,
            level,
            characters: Vec::new(),
            next_entity_id: 1,
        }
    }

    /// Create a simulation with default configuration and test arena.
    pub fn test() -> Self {
        Self::new(SimulationConfig::default(), Level::test_arena())
    }

    /// Add a character at the next spawn point.
    ///
    /// Returns the character's ID, or the configuration error that kept it
    /// from spawning.
    pub fn add_character(&mut self, name: &str) -> Result<EntityId, ConfigError> {
        let spawn = self
            .level
            .spawn_point(self.characters.len())
            .copied()
            .unwrap_or(SpawnPoint {
                position: glam::Vec3::ZERO,
                facing: 0.0,
            });

        let id = self.next_entity_id;
        let character = Character::spawn(id, name, &self.config.character, &spawn)?;
        self.next_entity_id += 1;
        self.characters.push(character);

        Ok(id)
    }

    /// Remove a character from the simulation.
    pub fn remove_character(&mut self, id: EntityId) {
        self.characters.retain(|c| c.id != id);
    }

    /// Get a character by ID.
    pub fn get_character(&self, id: EntityId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Get a mutable reference to a character by ID.
    pub fn get_character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Advance the simulation by one tick.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Inputs indexed by character position in `characters`;
    ///   missing entries count as no input
    pub fn tick(&mut self, inputs: &[PlayerInput]) -> Result<(), WorldError> {
        let delta_time = self.config.delta_time();

        self.level.advance(delta_time)?;

        for (i, character) in self.characters.iter_mut().enumerate() {
            let input = inputs.get(i).cloned().unwrap_or_default();
            character.tick(
                &self.level.collision,
                &input,
                self.config.mouse_sensitivity,
                delta_time,
            );
        }

        self.frame += 1;
        Ok(())
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }
}

// ============================================================================
// Tests
// ============================================================================
