//! Movement module dispatch.
//!
//! A character carries an ordered list of movement modules (ground, air,
//! ...). Each tick the first module whose [`MovementModule::should_run`]
//! returns true runs its physics; the rest are skipped. The capsule is then
//! synchronized so its velocity reflects what actually happened.

use glam::Vec3;

use super::air::AirModule;
use super::config::CharacterConfig;
use super::ground::{GroundModule, GroundResult};
use super::snapshot::{LocomotionSnapshot, SpeedBands};
use super::state::{LocomotionStates, MovementInput};
use crate::capsule::CharacterCapsule;
use crate::collision::{CollisionBackend, Pose};
use crate::error::ConfigError;

/// Everything a module may read or move during one tick.
pub struct ModuleContext<'a> {
    pub capsule: &'a mut CharacterCapsule,
    pub world: &'a dyn CollisionBackend,
    pub states: &'a LocomotionStates,
    pub input: &'a MovementInput,
    pub delta_time: f32,
}

/// One movement mode.
pub trait MovementModule {
    fn name(&self) -> &'static str;

    /// Whether this module takes the tick.
    fn should_run(&mut self, ctx: &mut ModuleContext<'_>) -> bool;

    /// Advance the capsule by one tick.
    fn run_physics(&mut self, ctx: &mut ModuleContext<'_>);

    /// Ground contact, for modules that track one.
    fn ground(&self) -> Option<&GroundResult> {
        None
    }
}

/// A capsule plus its movement modules and locomotion state.
pub struct CharacterMovement {
    capsule: CharacterCapsule,
    modules: Vec<Box<dyn MovementModule>>,
    states: LocomotionStates,
    bands: SpeedBands,
    snapshot: LocomotionSnapshot,
}

impl CharacterMovement {
    /// Build from a capsule and modules in priority order.
    pub fn new(
        capsule: CharacterCapsule,
        modules: Vec<Box<dyn MovementModule>>,
        bands: SpeedBands,
    ) -> Self {
        Self {
            capsule,
            modules,
            states: LocomotionStates::default(),
            bands,
            snapshot: LocomotionSnapshot::default(),
        }
    }

    /// Build the standard ground + air setup from configuration.
    ///
    /// Fails if the configuration does not validate.
    pub fn from_config(config: &CharacterConfig, pose: Pose) -> Result<Self, ConfigError> {
        config.validate()?;

        let capsule = CharacterCapsule::from_config(&config.capsule, pose);
        let modules: Vec<Box<dyn MovementModule>> = vec![
            Box::new(GroundModule::new(&config.ground)?),
            Box::new(AirModule::new(config.air.clone())),
        ];

        Ok(Self::new(capsule, modules, SpeedBands::from_config(&config.ground)))
    }

    /// Advance one physics tick. Returns the module that ran.
    ///
    /// Ticks with a non-positive or non-finite `delta_time` are skipped.
    pub fn tick(
        &mut self,
        world: &dyn CollisionBackend,
        input: &MovementInput,
        delta_time: f32,
    ) -> Option<&'static str> {
        if !(delta_time > 0.0 && delta_time.is_finite()) {
            log::trace!("skipping tick with dt={delta_time}");
            return None;
        }

        let mut ctx = ModuleContext {
            capsule: &mut self.capsule,
            world,
            states: &self.states,
            input,
            delta_time,
        };

        let mut active = None;
        for module in self.modules.iter_mut() {
            if module.should_run(&mut ctx) {
                module.run_physics(&mut ctx);
                active = Some(module.name());
                break;
            }
        }

        self.capsule.synchronize(delta_time);
        self.states.commit();

        let ground = self.modules.iter().find_map(|module| module.ground());
        self.snapshot = LocomotionSnapshot::capture(
            &self.capsule,
            &self.states,
            &self.bands,
            ground,
            active,
        );

        active
    }

    /// Turn the character by an Euler delta in radians.
    pub fn rotate(&mut self, euler: Vec3) {
        self.capsule.rotate(euler);
    }

    /// Place the capsule at `pose`, clearing its velocity.
    pub fn teleport(&mut self, pose: Pose) {
        let scale = self.capsule.scale();
        self.capsule.initialize(pose, scale);
    }

    #[inline]
    pub fn capsule(&self) -> &CharacterCapsule {
        &self.capsule
    }

    #[inline]
    pub fn states(&self) -> &LocomotionStates {
        &self.states
    }

    /// State commands; they take effect on the next tick.
    #[inline]
    pub fn states_mut(&mut self) -> &mut LocomotionStates {
        &mut self.states
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.capsule.velocity()
    }

    /// Snapshot published by the last tick.
    #[inline]
    pub fn snapshot(&self) -> &LocomotionSnapshot {
        &self.snapshot
    }

    /// Current ground contact, if a module tracks one.
    pub fn ground(&self) -> Option<&GroundResult> {
        self.modules.iter().find_map(|module| module.ground())
    }

    /// Names of the modules in priority order.
    pub fn module_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|module| module.name())
    }
}

impl std::fmt::Debug for CharacterMovement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterMovement")
            .field("capsule", &self.capsule)
            .field("modules", &self.module_names().collect::<Vec<_>>())
            .field("states", &self.states)
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
