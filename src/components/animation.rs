//! Name-addressable sprite animation state machine.
//!
//! Each actor owns one [`AnimationMachine`]: a registry of [`AnimationState`]s
//! keyed by lower-cased name, plus the cursors of the state that is currently
//! playing. Physics asks for a state every tick through
//! [`AnimationMachine::set_state`]; the machine decides whether the request
//! is honored:
//!
//! - unknown names and the current name are ignored,
//! - a `locked` state refuses every request until it is [complete],
//! - a state's `incompatible` set refuses the names it lists.
//!
//! Listeners attached to a state run synchronously when it starts or reaches
//! its end. They cannot borrow the actor, so they talk back through a
//! [`ListenerOutput`]: request a follow-up state or raise a cue that the
//! owning actor kind consumes after the tick.
//!
//! [complete]: AnimationMachine::is_complete

use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::Component;
use glam::IVec2;
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Name accepted by [`AnimationMachine::set_state`] to clear the current state.
pub const NO_STATE: &str = "none";

/// Follow-up requests issued from a listener are applied at most this many
/// times in a row before the machine gives up on the chain.
const MAX_CHAIN: usize = 8;

/// What a listener asks the machine to do once it returns.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListenerOutput {
    /// State to request after the listener returns.
    pub next_state: Option<String>,
    /// Named cues forwarded to the owning actor kind.
    pub cues: SmallVec<[&'static str; 2]>,
}

impl ListenerOutput {
    pub fn chain(&mut self, name: impl Into<String>) {
        self.next_state = Some(name.into());
    }

    pub fn cue(&mut self, cue: &'static str) {
        self.cues.push(cue);
    }
}

/// Start/end listener. Captures only immutable data; effects go through the output.
pub type StateListener = Arc<dyn Fn(&mut ListenerOutput) + Send + Sync>;

/// Listener that only raises a cue.
pub fn cue_listener(cue: &'static str) -> StateListener {
    Arc::new(move |out: &mut ListenerOutput| out.cue(cue))
}

/// Listener that requests another state.
pub fn chain_listener(name: &'static str) -> StateListener {
    Arc::new(move |out: &mut ListenerOutput| out.chain(name))
}

/// Optional parameters of a registered state.
#[derive(Clone)]
pub struct StateConfig {
    pub millis_per_frame: u32,
    pub looping: bool,
    pub locked: bool,
    pub incompatible_with: Vec<String>,
    pub mirror: bool,
    pub on_start: Option<StateListener>,
    pub on_end: Option<StateListener>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            millis_per_frame: 80,
            looping: true,
            locked: false,
            incompatible_with: Vec::new(),
            mirror: false,
            on_start: None,
            on_end: None,
        }
    }
}

impl StateConfig {
    pub fn millis(mut self, millis_per_frame: u32) -> Self {
        self.millis_per_frame = millis_per_frame;
        self
    }

    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn mirrored(mut self) -> Self {
        self.mirror = true;
        self
    }

    pub fn incompatible_with(mut self, name: impl Into<String>) -> Self {
        self.incompatible_with.push(name.into());
        self
    }

    pub fn on_start(mut self, listener: StateListener) -> Self {
        self.on_start = Some(listener);
        self
    }

    pub fn on_end(mut self, listener: StateListener) -> Self {
        self.on_end = Some(listener);
        self
    }
}

/// One registered animation state.
#[derive(Clone)]
pub struct AnimationState {
    pub name: String,
    /// Sprite sheet key, resolved by the renderer.
    pub sheet: Arc<str>,
    /// First frame, in frame units on the sheet.
    pub start_frame: IVec2,
    /// Frame displacement applied on every advance.
    pub frame_step: IVec2,
    pub frame_size: IVec2,
    pub frame_count: u32,
    pub millis_per_frame: u32,
    pub looping: bool,
    pub locked: bool,
    pub incompatible: FxHashSet<String>,
    pub mirror: bool,
    pub on_start: Option<StateListener>,
    pub on_end: Option<StateListener>,
}

impl fmt::Debug for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationState")
            .field("name", &self.name)
            .field("sheet", &self.sheet)
            .field("start_frame", &self.start_frame)
            .field("frame_step", &self.frame_step)
            .field("frame_size", &self.frame_size)
            .field("frame_count", &self.frame_count)
            .field("millis_per_frame", &self.millis_per_frame)
            .field("looping", &self.looping)
            .field("locked", &self.locked)
            .field("incompatible", &self.incompatible)
            .field("mirror", &self.mirror)
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Source rectangle of the current frame on its sprite sheet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Per-actor animation registry and playback cursors.
#[derive(Component, Default)]
pub struct AnimationMachine {
    states: FxHashMap<String, AnimationState>,
    current: Option<String>,
    frame_index: u32,
    current_frame: IVec2,
    elapsed_ms: u32,
    millis_per_frame: u32,
    /// When set, [`advance`](Self::advance) does nothing.
    pub paused: bool,
    cues: Vec<&'static str>,
}

impl fmt::Debug for AnimationMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationMachine")
            .field("states", &self.states.len())
            .field("current", &self.current)
            .field("frame_index", &self.frame_index)
            .field("current_frame", &self.current_frame)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("paused", &self.paused)
            .finish()
    }
}

impl AnimationMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state. Re-registering a known name returns the stored entry untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &mut self,
        name: &str,
        sheet: impl Into<Arc<str>>,
        start_frame: IVec2,
        frame_step: IVec2,
        frame_size: IVec2,
        frame_count: u32,
        config: StateConfig,
    ) -> &mut AnimationState {
        let key = name.to_lowercase();
        self.states
            .entry(key.clone())
            .or_insert_with(|| AnimationState {
                name: key,
                sheet: sheet.into(),
                start_frame,
                frame_step,
                frame_size,
                frame_count,
                millis_per_frame: config.millis_per_frame,
                looping: config.looping,
                locked: config.locked,
                incompatible: config
                    .incompatible_with
                    .iter()
                    .map(|n| n.to_lowercase())
                    .collect(),
                mirror: config.mirror,
                on_start: config.on_start,
                on_end: config.on_end,
            })
    }

    pub fn state(&self, name: &str) -> Option<&AnimationState> {
        self.states.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(&name.to_lowercase())
    }

    pub fn current(&self) -> Option<&AnimationState> {
        self.current.as_ref().and_then(|key| self.states.get(key))
    }

    /// Name of the playing state, or `None`.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// True if the playing state is one of `names`.
    pub fn is_in_any(&self, names: &[&str]) -> bool {
        self.current
            .as_deref()
            .is_some_and(|current| names.contains(&current))
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Current frame coordinate on the sheet, in frame units.
    pub fn current_frame(&self) -> IVec2 {
        self.current_frame
    }

    /// True when nothing plays, or the state has run through its frames and
    /// its timer has reached the frame duration.
    pub fn is_complete(&self) -> bool {
        match self.current() {
            None => true,
            Some(state) => {
                self.frame_index >= state.frame_count && self.elapsed_ms >= self.millis_per_frame
            }
        }
    }

    /// Sheet-space rectangle of the frame to draw.
    pub fn frame_rect(&self) -> Option<FrameRect> {
        self.current().map(|state| {
            let origin = self.current_frame * state.frame_size;
            FrameRect {
                x: origin.x,
                y: origin.y,
                width: state.frame_size.x,
                height: state.frame_size.y,
            }
        })
    }

    pub fn sheet(&self) -> Option<&Arc<str>> {
        self.current().map(|state| &state.sheet)
    }

    pub fn mirror(&self) -> bool {
        self.current().is_some_and(|state| state.mirror)
    }

    /// Drain cues raised by listeners since the last call.
    pub fn take_cues(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.cues)
    }

    /// Stop playing anything.
    pub fn clear_state(&mut self) {
        self.current = None;
    }

    /// Request a state by name. Returns true if the machine switched.
    ///
    /// `"none"` clears the current state. Unknown names, the current name,
    /// and requests refused by a locked or incompatible current state are
    /// no-ops.
    pub fn set_state(&mut self, name: &str) -> bool {
        let switched = self.try_switch(name);
        if switched {
            self.fire_start();
        }
        switched
    }

    fn try_switch(&mut self, name: &str) -> bool {
        if name.eq_ignore_ascii_case(NO_STATE) {
            self.clear_state();
            return false;
        }

        let key = name.to_lowercase();
        let Some((start_frame, millis_per_frame)) = self
            .states
            .get(&key)
            .map(|next| (next.start_frame, next.millis_per_frame))
        else {
            return false;
        };
        if self.current.as_deref() == Some(key.as_str()) {
            return false;
        }

        if let Some(current) = self.current() {
            if current.locked && !self.is_complete() {
                debug!("'{}' is locked, rejected '{}'", current.name, key);
                return false;
            }
            if current.incompatible.contains(&key) {
                debug!("'{}' cannot transition to '{}'", current.name, key);
                return false;
            }
        }

        self.frame_index = 0;
        self.current_frame = start_frame;
        self.millis_per_frame = millis_per_frame;
        self.current = Some(key);
        true
    }

    fn fire_start(&mut self) {
        let listener = self.current().and_then(|state| state.on_start.clone());
        if let Some(listener) = listener {
            self.run_listener(&listener);
        }
    }

    /// Run a listener and apply what it asked for. Chained requests go
    /// through the normal transition rules.
    fn run_listener(&mut self, listener: &StateListener) {
        let mut pending = Some(Arc::clone(listener));
        let mut depth = 0;
        while let Some(listener) = pending.take() {
            let mut out = ListenerOutput::default();
            listener(&mut out);
            self.cues.extend(out.cues);

            let Some(next) = out.next_state else {
                break;
            };
            depth += 1;
            if depth > MAX_CHAIN {
                warn!("animation listener chain exceeded {MAX_CHAIN} steps at '{next}'");
                break;
            }
            if self.try_switch(&next) {
                pending = self.current().and_then(|state| state.on_start.clone());
            }
        }
    }

    /// Advance playback by `delta_ms` milliseconds.
    ///
    /// A locked state keeps its accumulated time, so it steps at most once per
    /// call. A finished one-shot state stays on its last frame until another
    /// state is set.
    pub fn advance(&mut self, delta_ms: u32) {
        if self.paused || self.current.is_none() {
            return;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);

        while self.elapsed_ms >= self.millis_per_frame {
            let Some(state) = self.current() else {
                return;
            };
            let key = state.name.clone();
            let locked = state.locked;
            let looping = state.looping;
            let frame_count = state.frame_count;
            let start_frame = state.start_frame;
            let frame_step = state.frame_step;
            let on_end = state.on_end.clone();
            let on_start = state.on_start.clone();

            if !locked {
                self.elapsed_ms -= self.millis_per_frame;
            }

            if self.frame_index >= frame_count {
                if let Some(listener) = on_end {
                    self.run_listener(&listener);
                    if self.current.as_deref() != Some(key.as_str()) {
                        // The end listener moved on to another state.
                        return;
                    }
                }
                if !looping {
                    return;
                }
                self.frame_index = 0;
                self.current_frame = start_frame;
                if let Some(listener) = on_start {
                    self.run_listener(&listener);
                    if self.current.as_deref() != Some(key.as_str()) {
                        return;
                    }
                }
            } else {
                self.current_frame += frame_step;
            }
            self.frame_index += 1;

            if locked || self.millis_per_frame == 0 {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sized() -> (IVec2, IVec2) {
        (IVec2::new(1, 0), IVec2::new(50, 50))
    }

    fn machine_with(name: &str, frames: u32, config: StateConfig) -> AnimationMachine {
        let mut machine = AnimationMachine::new();
        let (step, size) = sized();
        machine.register(name, "sheet", IVec2::ZERO, step, size, frames, config);
        machine
    }

    fn counter_listener(counter: &Arc<AtomicUsize>) -> StateListener {
        let counter = Arc::clone(counter);
        Arc::new(move |_out: &mut ListenerOutput| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut machine = AnimationMachine::new();
        let (step, size) = sized();
        machine.register("Walk", "a", IVec2::ZERO, step, size, 4, StateConfig::default());
        let again = machine.register(
            "walk",
            "b",
            IVec2::new(9, 9),
            step,
            size,
            1,
            StateConfig::default(),
        );
        assert_eq!(&*again.sheet, "a");
        assert_eq!(again.frame_count, 4);
        assert!(machine.contains("WALK"));
    }

    #[test]
    fn test_set_state_is_case_insensitive() {
        let mut machine = machine_with("idleLeft", 1, StateConfig::default());
        assert!(machine.set_state("IDLELEFT"));
        assert_eq!(machine.current_name(), Some("idleleft"));
    }

    #[test]
    fn test_unknown_state_is_noop() {
        let mut machine = machine_with("idle", 1, StateConfig::default());
        machine.set_state("idle");
        assert!(!machine.set_state("missing"));
        assert_eq!(machine.current_name(), Some("idle"));
    }

    #[test]
    fn test_none_clears_state() {
        let mut machine = machine_with("idle", 1, StateConfig::default());
        machine.set_state("idle");
        machine.set_state("none");
        assert!(machine.current().is_none());
        assert!(machine.is_complete());
        assert!(machine.frame_rect().is_none());
    }

    #[test]
    fn test_same_state_twice_keeps_cursors() {
        let mut machine = machine_with("walk", 4, StateConfig::default().millis(100));
        machine.set_state("walk");
        machine.advance(250);
        let (index, elapsed, frame) = (
            machine.frame_index(),
            machine.elapsed_ms(),
            machine.current_frame(),
        );
        assert!(!machine.set_state("walk"));
        assert!(!machine.set_state("Walk"));
        assert_eq!(machine.frame_index(), index);
        assert_eq!(machine.elapsed_ms(), elapsed);
        assert_eq!(machine.current_frame(), frame);
    }

    #[test]
    fn test_advance_steps_frames_and_rect() {
        let mut machine = machine_with("walk", 4, StateConfig::default().millis(100));
        machine.set_state("walk");
        machine.advance(99);
        assert_eq!(machine.frame_index(), 0);
        machine.advance(1);
        assert_eq!(machine.frame_index(), 1);
        assert_eq!(machine.current_frame(), IVec2::new(1, 0));
        machine.advance(200);
        assert_eq!(machine.frame_index(), 3);
        assert_eq!(
            machine.frame_rect(),
            Some(FrameRect {
                x: 150,
                y: 0,
                width: 50,
                height: 50
            })
        );
    }

    #[test]
    fn test_looping_state_wraps_and_fires_listeners() {
        let ends = Arc::new(AtomicUsize::new(0));
        let starts = Arc::new(AtomicUsize::new(0));
        let config = StateConfig::default()
            .millis(10)
            .on_end(counter_listener(&ends))
            .on_start(counter_listener(&starts));
        let mut machine = machine_with("spin", 2, config);
        machine.set_state("spin");
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        machine.advance(20);
        assert_eq!(machine.frame_index(), 2);
        assert_eq!(ends.load(Ordering::SeqCst), 0);

        machine.advance(10);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        assert_eq!(machine.current_frame(), IVec2::ZERO);
        assert_eq!(machine.frame_index(), 1);
    }

    #[test]
    fn test_one_shot_freezes_once_complete() {
        let mut machine = machine_with("death", 3, StateConfig::default().millis(10).once());
        machine.set_state("death");
        machine.advance(30);
        assert_eq!(machine.frame_index(), 3);
        let frame = machine.current_frame();

        for _ in 0..10 {
            machine.advance(50);
        }
        assert_eq!(machine.frame_index(), 3);
        assert_eq!(machine.current_frame(), frame);
        assert!(machine.is_complete());
    }

    #[test]
    fn test_locked_state_rejects_until_complete() {
        let mut machine = AnimationMachine::new();
        let (step, size) = sized();
        machine.register(
            "smashleft",
            "s",
            IVec2::ZERO,
            step,
            size,
            1,
            StateConfig::default().millis(350).once().locked(),
        );
        machine.register("idleleft", "s", IVec2::ZERO, step, size, 1, StateConfig::default());

        assert!(machine.set_state("smashleft"));
        machine.advance(200);
        assert!(!machine.is_complete());
        assert!(!machine.set_state("idleleft"));
        assert_eq!(machine.current_name(), Some("smashleft"));

        machine.advance(150);
        assert!(machine.is_complete());
        assert!(machine.set_state("idleleft"));
        assert_eq!(machine.current_name(), Some("idleleft"));
    }

    #[test]
    fn test_incompatible_transition_rejected() {
        let mut machine = AnimationMachine::new();
        let (step, size) = sized();
        machine.register(
            "flutterleft",
            "s",
            IVec2::ZERO,
            step,
            size,
            2,
            StateConfig::default().incompatible_with("jumpLeft"),
        );
        machine.register("jumpleft", "s", IVec2::ZERO, step, size, 1, StateConfig::default());
        machine.register("idleleft", "s", IVec2::ZERO, step, size, 1, StateConfig::default());

        machine.set_state("flutterleft");
        assert!(!machine.set_state("jumpleft"));
        assert!(machine.set_state("idleleft"));
    }

    #[test]
    fn test_end_listener_chains_into_next_state() {
        let mut machine = AnimationMachine::new();
        let (step, size) = sized();
        machine.register(
            "fallrighttransition",
            "s",
            IVec2::new(5, 0),
            IVec2::ZERO,
            size,
            1,
            StateConfig::default()
                .millis(100)
                .on_end(chain_listener("fallright")),
        );
        machine.register("fallright", "s", IVec2::new(4, 0), step, size, 1, StateConfig::default());

        machine.set_state("fallrighttransition");
        machine.advance(100);
        assert_eq!(machine.current_name(), Some("fallrighttransition"));
        machine.advance(100);
        assert_eq!(machine.current_name(), Some("fallright"));
        assert_eq!(machine.current_frame(), IVec2::new(4, 0));
        assert_eq!(machine.frame_index(), 0);
    }

    #[test]
    fn test_cues_are_collected_and_drained() {
        let config = StateConfig::default()
            .millis(25)
            .on_start(cue_listener("push"))
            .on_end(cue_listener("tick"));
        let mut machine = machine_with("pushleft", 1, config);
        machine.set_state("pushleft");
        machine.advance(50);
        assert_eq!(machine.take_cues(), vec!["push", "tick", "push"]);
        assert!(machine.take_cues().is_empty());
    }

    #[test]
    fn test_paused_machine_does_not_advance() {
        let mut machine = machine_with("walk", 4, StateConfig::default().millis(10));
        machine.set_state("walk");
        machine.paused = true;
        machine.advance(100);
        assert_eq!(machine.frame_index(), 0);
        assert_eq!(machine.elapsed_ms(), 0);
    }

    #[test]
    fn test_elapsed_time_carries_across_switch() {
        let mut machine = AnimationMachine::new();
        let (step, size) = sized();
        machine.register("a", "s", IVec2::ZERO, step, size, 4, StateConfig::default().millis(100));
        machine.register("b", "s", IVec2::ZERO, step, size, 4, StateConfig::default().millis(100));
        machine.set_state("a");
        machine.advance(60);
        machine.set_state("b");
        assert_eq!(machine.elapsed_ms(), 60);
        machine.advance(40);
        assert_eq!(machine.frame_index(), 1);
    }

    #[test]
    fn test_mirror_flag_follows_state() {
        let mut machine = AnimationMachine::new();
        let (step, size) = sized();
        machine.register("l", "s", IVec2::ZERO, step, size, 1, StateConfig::default().mirrored());
        machine.register("r", "s", IVec2::ZERO, step, size, 1, StateConfig::default());
        machine.set_state("l");
        assert!(machine.mirror());
        machine.set_state("r");
        assert!(!machine.mirror());
    }
}
