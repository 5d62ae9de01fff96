//! Builds, places and subscribes the sensors of one simulation

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Position;
use crate::entity::Agent;
use crate::identity::{AllocatorFactory, AllocatorKind, IdentifierAllocator};
use crate::map::{Map, MapObserver};
use crate::render::colors::{ColorFilter, ALARM};
use crate::render::{LogBoard, Panel};
use crate::sensors::{MotionDetector, Instrument, ProximityCamera, Sensor, SensorInfo};

/// Allocator labels, one per sensor family
const CAMERA_LABEL: &str = "CP";
const MOTION_LABEL: &str = "DM";

/// Who the sensors watch and which cells they must leave free
#[derive(Debug, Clone, Default)]
pub struct SensorPlan {
    /// Agent the camera follows
    pub target: char,
    /// Agents the motion detector reports on
    pub tracked: Vec<char>,
    /// Agents that will be installed later, with their start cells; those
    /// cells stay free and the detector treats them as already seen there
    pub pending: Vec<(char, Position)>,
}

/// Owns every sensor and the allocators their identifiers came from
#[derive(Debug)]
pub struct SensorHub {
    sensors: Vec<Arc<Sensor>>,
    allocators: Vec<IdentifierAllocator>,
}

impl SensorHub {
    /// Place one proximity camera and one motion detector on distinct empty
    /// cells, install them on the map and subscribe them for good
    ///
    /// The camera draws on `camera_panel`; the detector logs to `board`.
    pub fn install<R: Rng + ?Sized>(
        map: &Map,
        factory: &mut AllocatorFactory,
        rng: &mut R,
        plan: SensorPlan,
        camera_panel: Arc<Panel>,
        board: Arc<LogBoard>,
        config: &SimulationConfig,
    ) -> Result<Self> {
        let mut camera_ids = factory.create(AllocatorKind::Random, CAMERA_LABEL);
        let mut motion_ids = factory.create(AllocatorKind::Random, MOTION_LABEL);

        let snapshot = map.snapshot();
        let mut taken: Vec<Position> = plan.pending.iter().map(|&(_, p)| p).collect();
        let camera_at = snapshot.random_inner_vacancy(rng, &taken)?;
        taken.push(camera_at);
        let motion_at = snapshot.random_inner_vacancy(rng, &taken)?;

        let mut filter = ColorFilter::new();
        filter.insert(ProximityCamera::SYMBOL, ALARM);

        let camera = Sensor::new(
            SensorInfo {
                id: camera_ids.take()?,
                position: camera_at,
                symbol: ProximityCamera::SYMBOL,
            },
            Instrument::Camera(ProximityCamera::new(
                plan.target,
                config.camera_range,
                Arc::new(filter),
                camera_panel,
            )),
        );
        let motion = Sensor::new(
            SensorInfo {
                id: motion_ids.take()?,
                position: motion_at,
                symbol: MotionDetector::SYMBOL,
            },
            Instrument::Motion(MotionDetector::new(
                motion_at,
                plan.tracked,
                config.motion_radius,
                config.motion_close,
                board,
                snapshot.agents().chain(plan.pending.iter().copied()),
            )),
        );

        map.install_all(&[&camera as &dyn Agent, &motion])?;
        let sensors = vec![Arc::new(camera), Arc::new(motion)];
        for sensor in &sensors {
            debug!(
                id = %sensor.info().id,
                symbol = %sensor.info().symbol,
                position = %sensor.info().position,
                "sensor installed"
            );
            map.subscribe(sensor.clone());
        }

        // First frame, so the camera panel is not blank until something moves
        let current = map.snapshot();
        for sensor in &sensors {
            if matches!(sensor.instrument(), Instrument::Camera(_)) {
                sensor.movement_observed(&current);
            }
        }

        Ok(Self {
            sensors,
            allocators: vec![camera_ids, motion_ids],
        })
    }

    pub fn sensors(&self) -> &[Arc<Sensor>] {
        &self.sensors
    }

    pub fn infos(&self) -> Vec<SensorInfo> {
        self.sensors.iter().map(|s| s.info()).collect()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.sensors.iter().map(|s| s.info().position).collect()
    }

    /// Live identifier count per allocator label
    pub fn allocations(&self) -> Vec<(&str, usize)> {
        self.allocators
            .iter()
            .map(|a| (a.label(), a.live_count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MoveIntent;
    use crate::entity::Obstacle;
    use crate::render::colors::HIGHLIGHT;
    use crossterm::style::Color;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hub(map: &Map, tracked: Vec<char>) -> (SensorHub, Arc<Panel>, Arc<LogBoard>) {
        let camera_panel = Arc::new(Panel::new(map.height(), map.width(), Position::new(0, 0), Color::Black));
        let log_panel = Arc::new(Panel::new(4, 40, Position::new(20, 0), Color::Black));
        let board = Arc::new(LogBoard::new(log_panel, 20));
        let mut factory = AllocatorFactory::seeded(11);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let hub = SensorHub::install(
            map,
            &mut factory,
            &mut rng,
            SensorPlan {
                target: 'R',
                tracked,
                pending: vec![('A', Position::new(1, 1))],
            },
            camera_panel.clone(),
            board.clone(),
            &SimulationConfig::default(),
        )
        .unwrap();
        assert_eq!(factory.statistics(), vec![(AllocatorKind::Random, 2)]);
        (hub, camera_panel, board)
    }

    #[test]
    fn test_sensors_occupy_distinct_cells() {
        let map = Map::open(6, 4);
        let (hub, _, _) = hub(&map, vec![]);

        let positions = hub.positions();
        assert_eq!(positions.len(), 2);
        assert_ne!(positions[0], positions[1]);
        assert!(!positions.contains(&Position::new(1, 1)), "pending cell");
        assert!(positions.iter().all(|&p| !map.is_on_boundary(p)));
        assert_eq!(map.position_of(ProximityCamera::SYMBOL), Some(positions[0]));
        assert_eq!(map.position_of(MotionDetector::SYMBOL), Some(positions[1]));
        assert_eq!(hub.allocations(), vec![("CP", 1), ("DM", 1)]);
    }

    #[test]
    fn test_camera_draws_first_frame_and_follows_moves() {
        let map = Map::open(8, 3);
        let avatar = Obstacle::new('R', Position::new(3, 1));
        map.install(&avatar).unwrap();
        let (_hub, panel, _) = hub(&map, vec!['R']);
        assert_eq!(panel.cell(1, 3).unwrap().glyph, 'R');

        let start = Position::new(3, 1);
        let intent = MoveIntent::DIRECTIONS
            .into_iter()
            .find(|&d| map.is_available(start.step(d)))
            .unwrap();
        map.apply(&avatar, intent).unwrap();

        let now = start.step(intent);
        let cell = panel.cell(now.y as usize, now.x as usize).unwrap();
        assert_eq!(cell.glyph, 'R');
        assert_eq!(cell.color, HIGHLIGHT);
        assert_eq!(panel.cell(1, 3).unwrap().glyph, ' ');
    }

    #[test]
    fn test_full_map_is_configuration_error() {
        let map = Map::open(1, 1);
        let board = Arc::new(LogBoard::new(
            Arc::new(Panel::new(1, 10, Position::new(0, 0), Color::Black)),
            10,
        ));
        let result = SensorHub::install(
            &map,
            &mut AllocatorFactory::new(),
            &mut ChaCha8Rng::seed_from_u64(0),
            SensorPlan::default(),
            Arc::new(Panel::new(1, 1, Position::new(0, 0), Color::Black)),
            board,
            &SimulationConfig::default(),
        );
        assert!(matches!(
            result,
            Err(crate::core::error::SimError::Configuration(_))
        ));
    }

    #[test]
    fn test_pending_agents_are_quiet_until_they_move() {
        let map = Map::open(6, 4);
        let a = Obstacle::new('A', Position::new(1, 1));
        let b = Obstacle::new('B', Position::new(4, 2));
        let board = Arc::new(LogBoard::new(
            Arc::new(Panel::new(4, 40, Position::new(0, 0), Color::Black)),
            20,
        ));
        let _hub = SensorHub::install(
            &map,
            &mut AllocatorFactory::seeded(5),
            &mut ChaCha8Rng::seed_from_u64(5),
            SensorPlan {
                target: 'R',
                tracked: vec!['A', 'B'],
                pending: vec![('A', a.origin()), ('B', b.origin())],
            },
            Arc::new(Panel::new(4, 6, Position::new(0, 0), Color::Black)),
            board.clone(),
            &SimulationConfig::default(),
        )
        .unwrap();

        map.install_all(&[&a as &dyn Agent, &b]).unwrap();
        assert!(board.entries("A").is_empty());
        assert!(board.entries("B").is_empty());

        let intent = MoveIntent::DIRECTIONS
            .into_iter()
            .find(|&d| map.is_available(a.origin().step(d)))
            .unwrap();
        map.apply(&a, intent).unwrap();
        assert_eq!(board.entries("A").len(), 1);
        assert!(board.entries("B").is_empty());
    }
}
