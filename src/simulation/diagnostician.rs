//! Stop-condition state machine for the avatar loop
//!
//! Continue is the only non-terminal state. Once `should_continue` has
//! answered false it keeps answering false, whatever happens afterwards.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::core::types::MoveIntent;
use crate::entity::{Avatar, CollisionObserver};
use crate::map::Map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    Continue,
    VoluntaryQuit,
    CollisionMax,
    ExitedBounds,
}

impl TerminationReason {
    /// Operator-facing sentence for a stop
    pub fn explanation(self) -> &'static str {
        match self {
            TerminationReason::VoluntaryQuit => "Voluntary departure.",
            TerminationReason::CollisionMax => "Too many collisions: the avatar's health is at risk.",
            TerminationReason::ExitedBounds => "The avatar left the room.",
            TerminationReason::Continue => "Unknown stop reason.",
        }
    }
}

/// Sounded once per collision
pub trait Alarm: Send + Sync {
    fn sound(&self);
}

#[derive(Debug)]
struct State {
    collisions: u32,
    reason: TerminationReason,
    /// Latched once `should_continue` has returned false
    stopped: bool,
}

pub struct Diagnostician {
    limit: u32,
    alarm: Option<Arc<dyn Alarm>>,
    state: Mutex<State>,
}

impl std::fmt::Debug for Diagnostician {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostician")
            .field("limit", &self.limit)
            .field("alarm", &self.alarm.is_some())
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl Diagnostician {
    pub const DEFAULT_COLLISION_LIMIT: u32 = 5;

    /// A silent diagnostician
    pub fn new(limit: u32) -> Self {
        Self::build(limit, None)
    }

    /// Sound `alarm` on every collision
    pub fn with_alarm(limit: u32, alarm: Arc<dyn Alarm>) -> Self {
        Self::build(limit, Some(alarm))
    }

    fn build(limit: u32, alarm: Option<Arc<dyn Alarm>>) -> Self {
        Self {
            limit,
            alarm,
            state: Mutex::new(State {
                collisions: 0,
                reason: TerminationReason::Continue,
                stopped: false,
            }),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn collisions(&self) -> u32 {
        self.state.lock().collisions
    }

    pub fn reason(&self) -> TerminationReason {
        self.state.lock().reason
    }

    /// Count one collision and sound the alarm
    pub fn collision(&self) {
        {
            let mut state = self.state.lock();
            state.collisions = state.collisions.saturating_add(1);
            debug!(collisions = state.collisions, limit = self.limit, "collision");
            if !state.stopped
                && state.reason == TerminationReason::Continue
                && state.collisions >= self.limit
            {
                state.reason = TerminationReason::CollisionMax;
            }
        }
        if let Some(alarm) = &self.alarm {
            alarm.sound();
        }
    }

    /// Decide whether the loop may run another step
    ///
    /// Checked in order: collision limit, avatar on the boundary, pending
    /// quit. The boundary wins over a quit raised in the same step.
    pub fn should_continue(&self, map: &Map, avatar: &Avatar) -> bool {
        let mut state = self.state.lock();
        if state.stopped {
            return false;
        }

        if state.reason == TerminationReason::CollisionMax {
            state.stopped = true;
        } else if map.is_on_boundary(avatar.position(map)) {
            state.reason = TerminationReason::ExitedBounds;
            state.stopped = true;
        } else if state.reason == TerminationReason::VoluntaryQuit {
            state.stopped = true;
        }

        if state.stopped {
            info!(reason = ?state.reason, collisions = state.collisions, "simulation stopping");
        }
        !state.stopped
    }

    /// Pass `intent` through, noting a quit request
    pub fn analyze(&self, intent: MoveIntent, _avatar: &Avatar, _map: &Map) -> MoveIntent {
        if intent == MoveIntent::Quit {
            let mut state = self.state.lock();
            if !state.stopped && state.reason == TerminationReason::Continue {
                state.reason = TerminationReason::VoluntaryQuit;
            }
        }
        intent
    }

    pub fn explain_stop(&self) -> &'static str {
        self.reason().explanation()
    }
}

impl CollisionObserver for Diagnostician {
    fn collision_observed(&self, _avatar: &Avatar) {
        self.collision();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position;
    use crate::director::BrownianDirector;
    use crate::entity::Agent;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn world(at: Position) -> (Map, Avatar) {
        let map = Map::open(10, 10);
        let avatar = Avatar::new(at, Arc::new(BrownianDirector::with_seed(1)));
        map.install(&avatar).unwrap();
        (map, avatar)
    }

    #[test]
    fn test_collision_limit_stops_on_next_check() {
        let (map, avatar) = world(Position::new(5, 5));
        let diag = Diagnostician::new(5);
        for _ in 0..4 {
            diag.collision();
            assert!(diag.should_continue(&map, &avatar));
        }
        diag.collision();
        assert_eq!(diag.reason(), TerminationReason::CollisionMax);
        assert!(!diag.should_continue(&map, &avatar));
        assert_eq!(
            diag.explain_stop(),
            "Too many collisions: the avatar's health is at risk."
        );
    }

    #[test]
    fn test_boundary_beats_pending_quit() {
        let (map, avatar) = world(Position::new(0, 4));
        let diag = Diagnostician::new(5);
        diag.analyze(MoveIntent::Quit, &avatar, &map);
        assert_eq!(diag.reason(), TerminationReason::VoluntaryQuit);

        assert!(!diag.should_continue(&map, &avatar));
        assert_eq!(diag.reason(), TerminationReason::ExitedBounds);
        assert_eq!(diag.explain_stop(), "The avatar left the room.");
    }

    #[test]
    fn test_quit_takes_effect_on_next_check() {
        let (map, avatar) = world(Position::new(4, 4));
        let diag = Diagnostician::new(5);
        assert_eq!(
            diag.analyze(MoveIntent::Quit, &avatar, &map),
            MoveIntent::Quit
        );
        assert!(!diag.should_continue(&map, &avatar));
        assert_eq!(diag.explain_stop(), "Voluntary departure.");
    }

    #[test]
    fn test_analyze_passes_moves_through() {
        let (map, avatar) = world(Position::new(4, 4));
        let diag = Diagnostician::new(5);
        assert_eq!(diag.analyze(MoveIntent::Left, &avatar, &map), MoveIntent::Left);
        assert_eq!(diag.reason(), TerminationReason::Continue);
        assert_eq!(diag.explain_stop(), "Unknown stop reason.");
    }

    #[test]
    fn test_collision_observer_counts_refused_moves() {
        let map = Map::open(3, 3);
        let avatar = Avatar::new(Position::new(1, 1), Arc::new(BrownianDirector::with_seed(1)));
        map.install(&avatar).unwrap();
        let diag = Arc::new(Diagnostician::new(2));
        avatar.subscribe(diag.clone());

        map.install(&crate::entity::Obstacle::new('A', Position::new(1, 0)))
            .unwrap();
        avatar.advance(&map, MoveIntent::Up).unwrap();
        avatar.advance(&map, MoveIntent::Up).unwrap();
        assert_eq!(diag.collisions(), 2);
        assert_eq!(diag.reason(), TerminationReason::CollisionMax);
        assert_eq!(avatar.symbol(), 'R');
    }

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Alarm for Counter {
        fn sound(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_alarm_sounds_once_per_collision() {
        let (map, avatar) = world(Position::new(5, 5));
        let counter = Arc::new(Counter::default());
        let diag = Diagnostician::with_alarm(2, counter.clone());
        diag.collision();
        diag.collision();
        assert!(!diag.should_continue(&map, &avatar));
        diag.collision();
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
        assert_eq!(diag.collisions(), 3);
    }

    #[derive(Debug, Clone)]
    enum Event {
        Collision,
        Quit,
        Step,
        Check,
    }

    fn event() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::Collision),
            Just(Event::Quit),
            Just(Event::Step),
            Just(Event::Check),
        ]
    }

    proptest! {
        #[test]
        fn prop_stop_is_absorbing(events in prop::collection::vec(event(), 0..60)) {
            let (map, avatar) = world(Position::new(5, 5));
            let diag = Diagnostician::new(3);
            let mut stopped_with = None;

            for event in events {
                match event {
                    Event::Collision => diag.collision(),
                    Event::Quit => { diag.analyze(MoveIntent::Quit, &avatar, &map); }
                    Event::Step => { diag.analyze(MoveIntent::Right, &avatar, &map); }
                    Event::Check => {
                        let go = diag.should_continue(&map, &avatar);
                        match stopped_with {
                            Some(reason) => {
                                prop_assert!(!go);
                                prop_assert_eq!(diag.reason(), reason);
                            }
                            None if !go => stopped_with = Some(diag.reason()),
                            None => {}
                        }
                    }
                }
            }
        }
    }
}
