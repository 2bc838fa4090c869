use tracing::{trace, warn};

use super::input::{InputEvent, InputProcessor, InputState};
use super::physics::PhysicsSystem;
use super::player_controller::PlayerController;
use crate::error::ControlError;
use crate::model::{Doodad, Scene};
use crate::utils::TickRate;

/// What one call to [`FrameLoopContext::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Frame delta after clamping.
    pub dt: f32,
    pub ticks: u32,
    /// Fixed ticks skipped because the frame hit `max_ticks_per_frame`.
    pub dropped_ticks: u32,
}

/// Main loop state: turns frame deltas into fixed ticks plus one frame update.
pub struct FrameLoopContext {
    pub scene: Scene,
    pub player: Doodad,
    pub controller: PlayerController,
    pub physics_system: PhysicsSystem,
    pub input_state: InputState,
    pub input_processor: InputProcessor,
    pub tick_rate: TickRate,
    pub max_frame_delta: f32,
    pub max_ticks_per_frame: u32,
    accumulator: f32,
}

impl FrameLoopContext {
    pub fn new(
        scene: Scene,
        player: Doodad,
        controller: PlayerController,
        physics_system: PhysicsSystem,
        tick_rate: TickRate,
    ) -> Self {
        Self {
            scene,
            player,
            controller,
            physics_system,
            input_state: InputState::new(),
            input_processor: InputProcessor::default(),
            tick_rate,
            max_frame_delta: 0.25,
            max_ticks_per_frame: 8,
            accumulator: 0.0,
        }
    }

    pub fn awaken(&mut self) {
        self.controller.awaken(&mut self.scene);
    }

    /// Feed one platform event. Rig toggles are handled here since they are
    /// frame-level, not tick-level.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if let InputEvent::KeyDown(key) = event {
            let repeat = self.input_state.is_key_pressed(&key.to_lowercase());
            if !repeat && self.input_processor.wants_to_toggle_rig(key) {
                self.controller.toggle_rig();
            }
        }
        self.input_state.process_event(event);
    }

    /// Run every fixed tick owed for `frame_dt` seconds, then one frame update.
    pub fn advance(&mut self, frame_dt: f32) -> Result<FrameStats, ControlError> {
        let dt = if frame_dt.is_finite() { frame_dt.clamp(0.0, self.max_frame_delta) } else { 0.0 };
        self.accumulator += dt;

        let tick_delta = self.tick_rate.tick_delta();
        let mut ticks = 0;
        while self.accumulator >= tick_delta && ticks < self.max_ticks_per_frame {
            let drive = self.input_processor.sample_drive(&mut self.input_state);
            self.controller.fixed_update(&drive, &mut self.player, self.tick_rate)?;
            self.physics_system.step(&mut self.player, tick_delta);
            self.accumulator -= tick_delta;
            ticks += 1;
        }

        let mut dropped_ticks = 0;
        if self.accumulator >= tick_delta {
            dropped_ticks = (self.accumulator / tick_delta) as u32;
            warn!(dropped_ticks, "frame owed more than {} ticks, dropping the rest", self.max_ticks_per_frame);
            self.accumulator %= tick_delta;
        }

        // Fixed ticks of this frame are all visible to the camera
        let look = self.input_processor.take_look(&mut self.input_state);
        self.controller.update(&look, &self.player)?;

        trace!(dt, ticks, "frame advanced");
        Ok(FrameStats { dt, ticks, dropped_ticks })
    }
}
