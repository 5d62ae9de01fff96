//! Composition root: wires the map, avatar, obstacles, sensors, panels and
//! screen together, then drives the avatar loop until the diagnostician
//! says stop

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Position;
use crate::director::{BrownianDirector, Director, DirectorKind};
use crate::entity::{Agent, Avatar};
use crate::identity::AllocatorFactory;
use crate::map::Map;
use crate::render::colors::{BACKGROUND, NOTICE};
use crate::render::{LogBoard, Panel, RenderSink, Screen};
use crate::sensors::{SensorHub, SensorPlan};
use crate::simulation::{Diagnostician, ObstacleMover, TerminationReason};

/// Columns between the map panel and the log board
const GUTTER: i32 = 2;

/// Keeps the avatar's random walk independent of the obstacles' draws
const AVATAR_SEED_OFFSET: u64 = 1;

pub struct Simulation {
    map: Arc<Map>,
    avatar: Arc<Avatar>,
    mover: ObstacleMover,
    sensors: SensorHub,
    diagnostician: Arc<Diagnostician>,
    screen: Arc<Screen>,
    menu: Arc<Panel>,
    board: Arc<LogBoard>,
}

impl Simulation {
    /// Build every component around `map`
    ///
    /// The avatar starts on the map's `R` cell, or on a random empty cell
    /// when the map has none. `seed` makes obstacle, sensor and identifier
    /// randomness reproducible.
    pub fn organize(
        map: Arc<Map>,
        kind: DirectorKind,
        sink: Box<dyn RenderSink>,
        config: &SimulationConfig,
        seed: Option<u64>,
    ) -> Result<Self> {
        config.validate()?;
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut factory = match seed {
            Some(seed) => AllocatorFactory::seeded(seed),
            None => AllocatorFactory::new(),
        };

        let (width, height) = (map.width(), map.height());
        let to_i32 = |n: usize| {
            i32::try_from(n).map_err(|_| SimError::Configuration(format!("map extent {} too large", n)))
        };
        let map_panel = Arc::new(Panel::new(height, width, Position::new(0, 0), BACKGROUND));
        let menu = Arc::new(Panel::new(
            config.menu_height,
            config.menu_width,
            Position::new(0, to_i32(height)?),
            BACKGROUND,
        ));
        let log_panel = Arc::new(Panel::new(
            height,
            config.log_width,
            Position::new(to_i32(width)? + GUTTER, 0),
            BACKGROUND,
        ));
        let board = Arc::new(LogBoard::new(log_panel.clone(), config.log_column_width()));

        let avatar = Arc::new(Avatar::new(
            Self::avatar_origin(&map, &mut rng)?,
            kind.create(Some(menu.clone()), seed.map(|s| s.wrapping_add(AVATAR_SEED_OFFSET))),
        ));
        if map.position_of(Avatar::SYMBOL).is_none() {
            map.install(&*avatar)?;
        }

        let obstacle_director: Arc<dyn Director> = match seed {
            Some(seed) => Arc::new(BrownianDirector::with_seed(seed)),
            None => Arc::new(BrownianDirector::new()),
        };
        let mover = ObstacleMover::new(
            map.clone(),
            config.obstacle_count,
            config.obstacle_interval(),
            obstacle_director,
            &mut rng,
        )?;

        let mut tracked = mover.symbols();
        tracked.push(Avatar::SYMBOL);
        let sensors = SensorHub::install(
            &map,
            &mut factory,
            &mut rng,
            SensorPlan {
                target: Avatar::SYMBOL,
                tracked,
                pending: mover
                    .obstacles()
                    .iter()
                    .map(|o| (o.symbol(), o.origin()))
                    .collect(),
            },
            map_panel.clone(),
            board.clone(),
            config,
        )?;

        let screen = Screen::attach(
            vec![map_panel, menu.clone(), log_panel],
            sink,
            config.refresh_interval(),
        );
        let diagnostician = Arc::new(Diagnostician::with_alarm(config.collision_limit, screen.clone()));
        avatar.subscribe(diagnostician.clone());

        map.subscribe(screen.clone());
        screen.start();

        mover.populate()?;
        info!(
            width,
            height,
            obstacles = mover.obstacles().len(),
            sensors = sensors.sensors().len(),
            "simulation organized"
        );

        Ok(Self {
            map,
            avatar,
            mover,
            sensors,
            diagnostician,
            screen,
            menu,
            board,
        })
    }

    fn avatar_origin(map: &Map, rng: &mut ChaCha8Rng) -> Result<Position> {
        match map.position_of(Avatar::SYMBOL) {
            Some(at) => Ok(at),
            None => map.snapshot().random_inner_vacancy(rng, &[]),
        }
    }

    /// Swap the avatar's director, e.g. for a scripted one
    pub fn associate(&self, director: Arc<dyn Director>) {
        self.avatar.associate(director);
    }

    /// Drive the avatar until a stop condition fires, then shut everything
    /// down and leave the stop explanation on the menu panel
    pub fn run(&self) -> Result<TerminationReason> {
        info!(at = %self.avatar.origin(), "simulation running");
        let outcome = self.drive();

        self.mover.terminate();
        self.menu.write(self.diagnostician.explain_stop(), NOTICE);
        self.screen.refresh();
        self.screen.stop();

        outcome?;
        let reason = self.diagnostician.reason();
        info!(?reason, collisions = self.diagnostician.collisions(), "simulation finished");
        Ok(reason)
    }

    fn drive(&self) -> Result<()> {
        while self.diagnostician.should_continue(&self.map, &self.avatar) {
            let intent = self.diagnostician.analyze(
                self.avatar.act(&self.map),
                &self.avatar,
                &self.map,
            );
            self.avatar.advance(&self.map, intent)?;
        }
        Ok(())
    }

    pub fn map(&self) -> &Arc<Map> {
        &self.map
    }

    pub fn avatar(&self) -> &Arc<Avatar> {
        &self.avatar
    }

    pub fn obstacles(&self) -> &ObstacleMover {
        &self.mover
    }

    pub fn sensors(&self) -> &SensorHub {
        &self.sensors
    }

    pub fn diagnostician(&self) -> &Arc<Diagnostician> {
        &self.diagnostician
    }

    pub fn screen(&self) -> &Arc<Screen> {
        &self.screen
    }

    pub fn menu(&self) -> &Arc<Panel> {
        &self.menu
    }

    pub fn log_board(&self) -> &Arc<LogBoard> {
        &self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::director::{InteractiveDirector, Key, ScriptedKeys};
    use crate::render::MemorySink;

    fn quick_config(obstacles: usize) -> SimulationConfig {
        SimulationConfig {
            obstacle_count: obstacles,
            obstacle_interval_ms: 2,
            refresh_interval_ms: 2,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_organize_lays_out_every_agent() {
        let map = Arc::new(Map::room(12, 8));
        let sim = Simulation::organize(
            map.clone(),
            DirectorKind::Brownian,
            Box::new(MemorySink::new()),
            &quick_config(3),
            Some(42),
        )
        .unwrap();

        assert!(map.position_of(Avatar::SYMBOL).is_some());
        assert!(map.position_of('x').is_some());
        assert!(map.position_of('m').is_some());
        for symbol in sim.obstacles().symbols() {
            assert!(map.position_of(symbol).is_some());
        }
        assert!(sim.screen().is_running());
        assert_eq!(sim.screen().panels().len(), 3);
        assert_eq!(sim.log_board().panel().origin(), Position::new(14, 0));
        assert_eq!(sim.menu().origin(), Position::new(0, 8));
    }

    #[test]
    fn test_scripted_quit_ends_run() {
        let map = Arc::new(Map::open(10, 10));
        let sink = MemorySink::new();
        let sim = Simulation::organize(
            map.clone(),
            DirectorKind::Brownian,
            Box::new(sink.clone()),
            &quick_config(2),
            Some(7),
        )
        .unwrap();
        sim.associate(Arc::new(InteractiveDirector::new(
            ScriptedKeys::new([Key::Char('q')]),
            Some(sim.menu().clone()),
        )));

        assert!(!map.is_on_boundary(sim.avatar().origin()));
        assert_eq!(sim.run().unwrap(), TerminationReason::VoluntaryQuit);
        assert_eq!(sim.menu().row_text(0).trim(), "Voluntary departure.");
        assert!(!sim.screen().is_running());
        assert!(sim.obstacles().is_terminated());
        assert!(sink.flush_count() >= 3);
    }

    #[test]
    fn test_invalid_config_rejected_before_wiring() {
        let map = Arc::new(Map::open(10, 10));
        let config = SimulationConfig {
            collision_limit: 0,
            ..SimulationConfig::default()
        };
        let result = Simulation::organize(
            map.clone(),
            DirectorKind::Brownian,
            Box::new(MemorySink::new()),
            &config,
            None,
        );
        assert!(matches!(result, Err(SimError::Configuration(_))));
        assert!(map.position_of(Avatar::SYMBOL).is_none());
    }
}
