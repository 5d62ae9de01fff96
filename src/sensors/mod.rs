//! Passive sensors placed on the grid
//!
//! Sensors are agents (they occupy a cell) and map observers. They read
//! only the snapshot handed to them and never mutate the map.

pub mod camera;
pub mod hub;
pub mod motion;

pub use camera::ProximityCamera;
pub use hub::{SensorHub, SensorPlan};
pub use motion::MotionDetector;

use crate::core::types::Position;
use crate::entity::Agent;
use crate::identity::Identifier;
use crate::map::{MapObserver, Snapshot};

/// Identity shared by every sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorInfo {
    pub id: Identifier,
    pub position: Position,
    pub symbol: char,
}

/// What a sensor does with each snapshot
#[derive(Debug)]
pub enum Instrument {
    Camera(ProximityCamera),
    Motion(MotionDetector),
}

#[derive(Debug)]
pub struct Sensor {
    info: SensorInfo,
    instrument: Instrument,
}

impl Sensor {
    pub fn new(info: SensorInfo, instrument: Instrument) -> Self {
        Self { info, instrument }
    }

    pub fn info(&self) -> SensorInfo {
        self.info
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }
}

impl Agent for Sensor {
    fn symbol(&self) -> char {
        self.info.symbol
    }

    fn origin(&self) -> Position {
        self.info.position
    }
}

impl MapObserver for Sensor {
    fn movement_observed(&self, snapshot: &Snapshot) {
        match &self.instrument {
            Instrument::Camera(camera) => camera.observe(snapshot),
            Instrument::Motion(detector) => detector.observe(snapshot),
        }
    }
}
