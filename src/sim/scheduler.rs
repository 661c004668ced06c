//! Cooperative fixed-interval loop around a [`World`]
//!
//! The host owns the event loop and calls [`SimulationLoop::poll`] whenever
//! it gets a chance (a frame callback, a sleep loop, a test). A tick runs only
//! while a schedule is installed and its due time has passed, so cancelling
//! the schedule is enough to guarantee no further ticks.

use std::cell::Cell;
use std::time::Instant;

use super::shape::{ShapeDef, ShapeError, ShapeId};
use super::world::{TickReport, World};
use crate::renderer::Surface;

/// Monotonic time source, in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock measured from loop creation
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Identifies one `start()`; a restart always gets a new id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleId(pub u64);

/// The single pending tick of a running loop
#[derive(Debug, Clone, Copy)]
struct ScheduledTick {
    id: ScheduleId,
    due: f64,
}

pub struct SimulationLoop<C: Clock = SystemClock> {
    world: World,
    clock: C,
    interval: f64,
    schedule: Option<ScheduledTick>,
    next_schedule: u64,
    last_update: f64,
}

impl SimulationLoop<SystemClock> {
    pub fn new(world: World) -> Self {
        Self::with_clock(world, SystemClock::new())
    }
}

impl<C: Clock> SimulationLoop<C> {
    pub fn with_clock(world: World, clock: C) -> Self {
        let interval = world.settings().tick_interval;
        let last_update = clock.now();
        Self {
            world,
            clock,
            interval,
            schedule: None,
            next_schedule: 1,
            last_update,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn state(&self) -> LoopState {
        if self.schedule.is_some() {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Id of the installed schedule, if running
    pub fn active_schedule(&self) -> Option<ScheduleId> {
        self.schedule.map(|s| s.id)
    }

    /// Install a fresh schedule, cancelling any existing one first
    pub fn start(&mut self) -> ScheduleId {
        self.stop();

        let now = self.clock.now();
        self.last_update = now;
        let id = ScheduleId(self.next_schedule);
        self.next_schedule += 1;
        self.schedule = Some(ScheduledTick {
            id,
            due: now + self.interval,
        });
        log::info!("Loop started (schedule {}, every {}s)", id.0, self.interval);
        id
    }

    /// Cancel the pending tick; calling this while stopped does nothing
    pub fn stop(&mut self) {
        if let Some(tick) = self.schedule.take() {
            log::info!("Loop stopped (schedule {})", tick.id.0);
        }
    }

    /// Run exactly one tick now, whatever the loop state
    pub fn single_step<S: Surface + ?Sized>(&mut self, dt: f32, surface: &mut S) -> TickReport {
        self.world.step(dt, surface)
    }

    /// Add a shape to the live world
    pub fn insert_shape(&mut self, def: ShapeDef) -> Result<ShapeId, ShapeError> {
        self.world.insert_shape(def)
    }

    /// Run the scheduled tick if it is due
    ///
    /// `dt` is the measured time since the previous tick. If the host fell
    /// behind by more than an interval the next due time is re-anchored to
    /// now instead of replaying the missed ticks.
    pub fn poll<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<TickReport> {
        let scheduled = self.schedule?;
        let now = self.clock.now();
        if now < scheduled.due {
            return None;
        }

        let dt = (now - self.last_update) as f32;
        let report = self.world.step(dt, surface);
        self.last_update = now;

        let mut due = scheduled.due + self.interval;
        if due <= now {
            due = now + self.interval;
        }
        self.schedule = Some(ScheduledTick { due, ..scheduled });
        Some(report)
    }

    /// Seconds until the next scheduled tick, if running
    pub fn time_until_due(&self) -> Option<f64> {
        self.schedule
            .map(|tick| (tick.due - self.clock.now()).max(0.0))
    }
}
