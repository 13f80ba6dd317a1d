//! Playback: a timer that walks the timeline and resolves each day.
//!
//! A [`PlaybackSession`] is a two-state machine:
//!
//! ```text
//!            start(speed)              tick (timer or manual)
//!  Stopped ───────────────► Playing ◄──────┐
//!     ▲                       │  │         │
//!     └──────── stop ─────────┘  └─────────┘
//! ```
//!
//! The session owns at most one timer task. `start` always tears down the
//! previous timer before spawning a new one, and dropping the session stops
//! it. Each tick advances a shared cursor (wrapping at the end of the
//! timeline), resolves positions for that date against the current
//! [`ReplayView`], and sends a [`PlaybackFrame`] down a channel.

use chrono::NaiveDate;
use orca_env::{EnvError, ReplayContext, SessionId, TaskHandle};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::resolver::PositionResolver;
use crate::timeline::{advance, TimelineIndex};
use crate::types::{PositionQuery, ResolvedPosition, SightingRecord};

/// Playback rate. Normal speed advances one day per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    Half,
    #[default]
    Normal,
    Double,
    Quadruple,
}

impl PlaybackSpeed {
    pub fn all() -> [PlaybackSpeed; 4] {
        [
            PlaybackSpeed::Half,
            PlaybackSpeed::Normal,
            PlaybackSpeed::Double,
            PlaybackSpeed::Quadruple,
        ]
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
        }
    }

    /// 1000 ms divided by the multiplier.
    pub fn tick_interval(&self) -> Duration {
        match self {
            PlaybackSpeed::Half => Duration::from_millis(2000),
            PlaybackSpeed::Normal => Duration::from_millis(1000),
            PlaybackSpeed::Double => Duration::from_millis(500),
            PlaybackSpeed::Quadruple => Duration::from_millis(250),
        }
    }
}

impl std::fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

impl std::str::FromStr for PlaybackSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches('x') {
            "0.5" | ".5" => Ok(PlaybackSpeed::Half),
            "1" | "1.0" => Ok(PlaybackSpeed::Normal),
            "2" | "2.0" => Ok(PlaybackSpeed::Double),
            "4" | "4.0" => Ok(PlaybackSpeed::Quadruple),
            _ => Err(format!("Unknown playback speed: {} (expected 0.5x, 1x, 2x or 4x)", s)),
        }
    }
}

/// Resolved positions for one timeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackFrame {
    pub index: usize,
    pub date: NaiveDate,
    pub positions: Vec<ResolvedPosition>,
}

/// An immutable snapshot of everything a frame depends on.
///
/// Refreshing the data means building a new view and swapping it in whole.
#[derive(Debug, Clone)]
pub struct ReplayView {
    sightings: Arc<[SightingRecord]>,
    timeline: TimelineIndex,
    selection: Vec<String>,
    resolver: PositionResolver,
}

impl ReplayView {
    pub fn new(
        sightings: impl Into<Arc<[SightingRecord]>>,
        selection: Vec<String>,
        resolver: PositionResolver,
    ) -> Self {
        let sightings = sightings.into();
        let timeline = TimelineIndex::from_sightings(&sightings);
        Self {
            sightings,
            timeline,
            selection,
            resolver,
        }
    }

    /// Same sightings and resolver, different selection.
    pub fn with_selection(&self, selection: Vec<String>) -> Self {
        Self {
            selection,
            ..self.clone()
        }
    }

    pub fn sightings(&self) -> &[SightingRecord] {
        &self.sightings
    }

    pub fn timeline(&self) -> &TimelineIndex {
        &self.timeline
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn query_for(&self, date: NaiveDate) -> PositionQuery {
        PositionQuery::new(date).with_selection(self.selection.iter().cloned())
    }

    /// Resolves the timeline entry at `index`.
    pub fn frame_at(&self, index: usize) -> Option<PlaybackFrame> {
        let date = self.timeline.get(index)?;
        let positions = self.resolver.resolve(&self.query_for(date), &self.sightings);
        Some(PlaybackFrame {
            index,
            date,
            positions,
        })
    }
}

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum PlaybackState {
    Stopped,
    Playing { speed: PlaybackSpeed },
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Playing { speed } => write!(f, "playing ({})", speed),
        }
    }
}

/// State shared between a session and its timer task.
#[derive(Debug)]
struct Shared {
    view: RwLock<Arc<ReplayView>>,
    cursor: AtomicUsize,
}

impl Shared {
    fn view(&self) -> Arc<ReplayView> {
        Arc::clone(&self.view.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Moves the cursor forward one step and resolves the new date.
    fn step(&self) -> Option<PlaybackFrame> {
        let view = self.view();
        let len = view.timeline().len();
        let prev = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| advance(i, len))
            .ok()?;
        view.frame_at(advance(prev, len)?)
    }
}

/// A single owned playback session.
pub struct PlaybackSession<C: ReplayContext> {
    id: SessionId,
    context: Arc<C>,
    shared: Arc<Shared>,
    frames: mpsc::Sender<PlaybackFrame>,
    state: PlaybackState,
    timer: Option<TaskHandle>,
}

impl<C: ReplayContext> PlaybackSession<C> {
    /// Creates a stopped session positioned at the start of the view's timeline.
    pub fn new(context: Arc<C>, view: ReplayView, frames: mpsc::Sender<PlaybackFrame>) -> Self {
        Self {
            id: SessionId::new(),
            context,
            shared: Arc::new(Shared {
                view: RwLock::new(Arc::new(view)),
                cursor: AtomicUsize::new(0),
            }),
            frames,
            state: PlaybackState::Stopped,
            timer: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True while a timer is scheduled and still running.
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
            && self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn cursor(&self) -> usize {
        self.shared.cursor.load(Ordering::SeqCst)
    }

    pub fn view(&self) -> Arc<ReplayView> {
        self.shared.view()
    }

    /// Moves the cursor, clamped to the timeline.
    pub fn seek(&self, index: usize) {
        let len = self.shared.view().timeline().len();
        self.shared
            .cursor
            .store(index.min(len.saturating_sub(1)), Ordering::SeqCst);
    }

    /// Moves the cursor to `date` (or the start when it is outside the timeline).
    pub fn seek_date(&self, date: NaiveDate) {
        let index = self.shared.view().timeline().position_of(date);
        self.seek(index);
    }

    /// The frame at the cursor, without advancing.
    pub fn current_frame(&self) -> Option<PlaybackFrame> {
        self.shared.view().frame_at(self.cursor())
    }

    /// Atomically swaps in a new snapshot. Safe while playing.
    pub fn replace_view(&self, view: ReplayView) {
        let len = view.timeline().len();
        {
            let mut guard = self.shared.view.write().unwrap_or_else(PoisonError::into_inner);
            *guard = Arc::new(view);
        }
        let clamped = self.cursor().min(len.saturating_sub(1));
        self.shared.cursor.store(clamped, Ordering::SeqCst);
        debug!(session = %self.id, days = len, "replaced playback view");
    }

    /// Starts (or restarts) the timer. Any previous timer is stopped first.
    pub fn start(&mut self, speed: PlaybackSpeed) {
        self.stop();

        let context = Arc::clone(&self.context);
        let shared = Arc::clone(&self.shared);
        let frames = self.frames.clone();
        let interval = speed.tick_interval();
        let id = self.id;

        let handle = self.context.spawn("playback-timer", async move {
            loop {
                context.sleep(interval).await;
                let Some(frame) = shared.step() else {
                    continue;
                };
                if let Err(e) = emit(&frames, frame).await {
                    debug!(session = %id, error = %e, "playback timer exiting");
                    break;
                }
            }
        });

        self.timer = Some(handle);
        self.state = PlaybackState::Playing { speed };
        info!(session = %self.id, %speed, cursor = self.cursor(), "playback started");
    }

    /// Stops the timer. No further frames are produced by it.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            info!(session = %self.id, cursor = self.cursor(), "playback stopped");
        }
        self.state = PlaybackState::Stopped;
    }

    /// Advances one step by hand and returns the frame.
    ///
    /// `None` when the timeline is empty.
    pub fn tick(&self) -> Option<PlaybackFrame> {
        self.shared.step()
    }
}

impl<C: ReplayContext> Drop for PlaybackSession<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn emit(frames: &mpsc::Sender<PlaybackFrame>, frame: PlaybackFrame) -> Result<(), EnvError> {
    frames
        .send(frame)
        .await
        .map_err(|_| EnvError::closed("playback frame receiver"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_env::TokioContext;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn view_for(years: &[i32]) -> ReplayView {
        let mut sightings = vec![
            SightingRecord::on_date("a", day(2023, 6, 1))
                .with_location(48.6, -123.2)
                .with_matrilines(["T18"]),
            SightingRecord::on_date("b", day(2023, 6, 5))
                .with_location(48.8, -123.6)
                .with_matrilines(["T18"]),
        ];
        for (i, y) in years.iter().enumerate() {
            sightings.push(SightingRecord::on_date(format!("y{}", i), day(*y, 1, 1)));
        }
        ReplayView::new(sightings, Vec::new(), PositionResolver::default())
    }

    fn session(view: ReplayView) -> (PlaybackSession<TokioContext>, mpsc::Receiver<PlaybackFrame>) {
        let (tx, rx) = mpsc::channel(64);
        (PlaybackSession::new(TokioContext::shared(), view, tx), rx)
    }

    fn drain(rx: &mut mpsc::Receiver<PlaybackFrame>) -> Vec<PlaybackFrame> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            out.push(frame);
        }
        out
    }

    #[test]
    fn test_speed_intervals_and_parsing() {
        assert_eq!(PlaybackSpeed::Quadruple.tick_interval(), Duration::from_millis(250));
        assert_eq!(PlaybackSpeed::Half.tick_interval(), Duration::from_millis(2000));
        for speed in PlaybackSpeed::all() {
            assert_eq!(speed.to_string().parse::<PlaybackSpeed>(), Ok(speed));
        }
        assert_eq!("4X".parse::<PlaybackSpeed>(), Ok(PlaybackSpeed::Quadruple));
        assert!("3x".parse::<PlaybackSpeed>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_arrive_on_schedule() {
        let (mut session, mut rx) = session(view_for(&[]));
        session.start(PlaybackSpeed::Quadruple);
        assert!(session.is_playing());

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(first.date, day(2023, 1, 2));
        assert_eq!(second.index, 2);
        assert_eq!(session.cursor(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarting_keeps_a_single_timer() {
        let (mut session, mut rx) = session(view_for(&[]));
        session.start(PlaybackSpeed::Quadruple);
        session.start(PlaybackSpeed::Quadruple);

        tokio::time::sleep(Duration::from_millis(1010)).await;
        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 4);
        let indices: Vec<_> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_the_timer() {
        let (mut session, mut rx) = session(view_for(&[]));
        session.start(PlaybackSpeed::Quadruple);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(drain(&mut rx).len(), 2);

        session.stop();
        assert_eq!(session.state(), PlaybackState::Stopped);
        assert!(!session.is_playing());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(session.cursor(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_session_stops_playback() {
        let (mut session, mut rx) = session(view_for(&[]));
        session.start(PlaybackSpeed::Double);
        drop(session);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_exits_when_receiver_is_gone() {
        let (mut session, rx) = session(view_for(&[]));
        session.start(PlaybackSpeed::Quadruple);
        drop(rx);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!session.is_playing());
        assert!(matches!(session.state(), PlaybackState::Playing { .. }));
    }

    #[test]
    fn test_tick_wraps_to_start() {
        let (session, _rx) = session(view_for(&[]));
        let len = session.view().timeline().len();
        session.seek(len + 10);
        assert_eq!(session.cursor(), len - 1);

        let frame = session.tick().unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(frame.date, day(2023, 1, 1));
    }

    #[test]
    fn test_tick_resolves_positions() {
        let (session, _rx) = session(view_for(&[]));
        session.seek_date(day(2023, 6, 2));

        let frame = session.tick().unwrap();
        assert_eq!(frame.date, day(2023, 6, 3));
        assert_eq!(frame.positions.len(), 1);
        assert!(!frame.positions[0].is_actual_sighting);

        let current = session.current_frame().unwrap();
        assert_eq!(current, frame);
    }

    #[test]
    fn test_empty_view_has_nothing_to_play() {
        let view = ReplayView::new(Vec::new(), Vec::new(), PositionResolver::default());
        let (session, _rx) = session(view);
        assert!(session.tick().is_none());
        assert!(session.current_frame().is_none());
        session.seek(5);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_replace_view_clamps_cursor() {
        let (session, _rx) = session(view_for(&[2022]));
        assert_eq!(session.view().timeline().len(), 365 + 365);
        session.seek(700);

        session.replace_view(view_for(&[]));
        assert_eq!(session.cursor(), 364);
        assert_eq!(session.view().timeline().len(), 365);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_view_while_playing() {
        let (mut session, mut rx) = session(view_for(&[2022]));
        session.seek(700);
        session.start(PlaybackSpeed::Quadruple);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let before: Vec<_> = drain(&mut rx).iter().map(|f| f.index).collect();
        assert_eq!(before, vec![701, 702]);

        let smaller = view_for(&[]);
        let timeline = smaller.timeline().clone();
        session.replace_view(smaller);
        assert!(session.is_playing());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let after = drain(&mut rx);
        assert_eq!(after.len(), 2);
        for frame in &after {
            assert!(frame.index < timeline.len());
            assert_eq!(Some(frame.date), timeline.get(frame.index));
        }
        // The clamped cursor sat on the last day, so playback wraps
        assert_eq!(after[0].index, 0);
        assert_eq!(after[0].date, day(2023, 1, 1));
    }

    #[test]
    fn test_selection_flows_into_frames() {
        let view = view_for(&[]).with_selection(vec!["T19".to_string()]);
        let (session, _rx) = session(view);
        session.seek_date(day(2023, 6, 1));
        let frame = session.current_frame().unwrap();
        assert!(frame.positions.is_empty());
    }
}
