/// Fixed timestep driver for the physics world
///
/// Real or simulated frame time is accumulated and converted into a number
/// of fixed-size steps, so the simulation advances the same way no matter
/// how irregular the frames are.
use std::time::{Duration, Instant};

use crate::engine::physics::PhysicsError;

/// Default update rate (60 updates per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Maximum number of physics steps per frame to prevent spiral of death
pub const MAX_PHYSICS_STEPS: u32 = 5;

/// Fixed timestep accumulator
pub struct GameLoop {
    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    timestep: Duration,

    /// Time of last frame, only used by `begin_frame`
    last_frame_time: Instant,

    /// Whether updates are paused
    paused: bool,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,
}

impl GameLoop {
    /// Create a loop running at `FIXED_TIMESTEP`
    pub fn new() -> Self {
        Self::with_timestep(FIXED_TIMESTEP)
    }

    /// Create a loop with a custom step length in seconds.
    ///
    /// A timestep that is not finite and positive falls back to `FIXED_TIMESTEP`.
    pub fn with_timestep(timestep: f32) -> Self {
        match Self::try_with_timestep(timestep) {
            Ok(game_loop) => game_loop,
            Err(err) => {
                log::warn!("{}, using {}", err, FIXED_TIMESTEP);
                Self::from_duration(Duration::from_secs_f32(FIXED_TIMESTEP))
            }
        }
    }

    /// Create a loop with a custom step length in seconds, rejecting
    /// timesteps that are not finite and positive
    pub fn try_with_timestep(timestep: f32) -> Result<Self, PhysicsError> {
        if !(timestep.is_finite() && timestep > 0.0) {
            return Err(PhysicsError::InvalidTimestep(timestep));
        }
        let step = Duration::from_secs_f32(timestep);
        // shorter than a nanosecond
        if step.is_zero() {
            return Err(PhysicsError::InvalidTimestep(timestep));
        }
        Ok(Self::from_duration(step))
    }

    fn from_duration(timestep: Duration) -> Self {
        Self {
            accumulator: Duration::ZERO,
            timestep,
            last_frame_time: Instant::now(),
            paused: false,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Begin a new frame using the wall clock, returns the number of fixed updates to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Feed `frame_time` into the accumulator, returns the number of fixed updates to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        // If paused, don't accumulate time for updates
        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut updates = 0;
        while self.accumulator >= self.timestep && updates < MAX_PHYSICS_STEPS {
            self.accumulator -= self.timestep;
            updates += 1;
        }

        // Drop the backlog instead of carrying it into the next frames
        if updates == MAX_PHYSICS_STEPS && self.accumulator >= self.timestep {
            log::debug!(
                "Frame took {:?}, dropping {:?} of simulation time",
                frame_time,
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }

        self.update_count += updates as u64;
        updates
    }

    /// Get the fixed timestep for physics updates (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        self.timestep.as_secs_f32()
    }

    /// Get the interpolation alpha for smooth rendering between physics steps
    /// Alpha = accumulated_time / fixed_timestep
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.timestep.as_secs_f32()
    }

    /// Get total number of frames seen
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Simulated time covered by the executed updates
    pub fn simulated_time(&self) -> Duration {
        Duration::from_secs_f64(self.timestep.as_secs_f64() * self.update_count as f64)
    }

    /// Check if the loop is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            self.last_frame_time = Instant::now();
            log::info!("Simulation resumed");
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step_duration() -> Duration {
        Duration::from_secs_f32(FIXED_TIMESTEP)
    }

    #[test]
    fn test_game_loop_creation() {
        let game_loop = GameLoop::new();
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.update_count(), 0);
        assert!(!game_loop.is_paused());
        assert_relative_eq!(game_loop.fixed_timestep(), 1.0 / 60.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pause_resume() {
        let mut game_loop = GameLoop::new();

        game_loop.pause();
        assert!(game_loop.is_paused());

        game_loop.resume();
        assert!(!game_loop.is_paused());

        game_loop.toggle_pause();
        assert!(game_loop.is_paused());
        game_loop.toggle_pause();
        assert!(!game_loop.is_paused());
    }

    #[test]
    fn test_paused_no_updates() {
        let mut game_loop = GameLoop::new();
        game_loop.pause();

        assert_eq!(game_loop.advance(Duration::from_millis(50)), 0);
        assert_eq!(game_loop.frame_count(), 1);

        // time spent paused is not replayed
        game_loop.resume();
        assert_eq!(game_loop.advance(Duration::ZERO), 0);
    }

    #[test]
    fn test_update_accumulation() {
        let mut game_loop = GameLoop::new();

        // half a step: nothing yet
        assert_eq!(game_loop.advance(step_duration() / 2), 0);
        assert_relative_eq!(game_loop.alpha(), 0.5, epsilon = 1e-3);

        // the rest completes it
        assert_eq!(game_loop.advance(step_duration() - step_duration() / 2), 1);
        assert!(game_loop.alpha() < 0.01);

        assert_eq!(game_loop.advance(step_duration() * 3), 3);
        assert_eq!(game_loop.update_count(), 4);
        assert_relative_eq!(
            game_loop.simulated_time().as_secs_f64(),
            (step_duration() * 4).as_secs_f64(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_max_physics_steps_limit() {
        let mut game_loop = GameLoop::new();

        // 300ms would allow 18 updates
        let updates = game_loop.advance(Duration::from_millis(300));
        assert_eq!(updates, MAX_PHYSICS_STEPS);

        // backlog is dropped
        assert_eq!(game_loop.advance(Duration::ZERO), 0);
    }

    #[test]
    fn test_custom_timestep() {
        let mut game_loop = GameLoop::with_timestep(0.25);
        assert_eq!(game_loop.advance(Duration::from_secs(1)), 4);
        assert_relative_eq!(game_loop.alpha(), 0.0);
    }

    #[test]
    fn test_invalid_timestep_is_rejected() {
        for bad in [0.0, -0.5, f32::NAN, f32::INFINITY, 1.0e-12] {
            assert!(matches!(
                GameLoop::try_with_timestep(bad),
                Err(PhysicsError::InvalidTimestep(_))
            ));
        }

        // the infallible constructor falls back to the default step
        let mut game_loop = GameLoop::with_timestep(0.0);
        assert_relative_eq!(game_loop.fixed_timestep(), FIXED_TIMESTEP, epsilon = 1e-6);
        assert_eq!(game_loop.advance(Duration::ZERO), 0);
        assert_eq!(game_loop.alpha(), 0.0);

        assert!(GameLoop::try_with_timestep(0.25).is_ok());
    }

    #[test]
    fn test_simulated_time_past_u32_updates() {
        let mut game_loop = GameLoop::with_timestep(0.5);
        game_loop.update_count = u64::from(u32::MAX) + 2;
        let expected = (u64::from(u32::MAX) + 2) as f64 * 0.5;
        assert_relative_eq!(game_loop.simulated_time().as_secs_f64(), expected, epsilon = 1e-3);
    }

    #[test]
    fn test_wall_clock_frame() {
        let mut game_loop = GameLoop::new();
        let updates = game_loop.begin_frame();
        assert!(updates <= MAX_PHYSICS_STEPS);
        assert_eq!(game_loop.frame_count(), 1);
    }
}
