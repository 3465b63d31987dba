//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - PhaseSequencer for the narrative
//! - Scene for rendering
//!
//! # Architecture
//!
//! The App is a thin client that:
//! 1. Converts terminal events to sequencer operations (hover, click, skip)
//! 2. Ticks the sequencer once per frame
//! 3. Applies the resulting StageMessages to its Scene
//! 4. Renders the star sky and the Scene

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use ratatui::{Frame, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use hydrant_conductor::{
    Clock, FollowScroll, Phase, PhaseSequencer, Scene, StageConfig, StageMessage, StarPreset,
    Target, Viewport,
};

use crate::theme;
use crate::widgets::stage::{chat_lines, StageLayout, StageView};
use crate::widgets::stars::StarSky;

/// Target ~30 FPS for the star sky and tweens
const FRAME: Duration = Duration::from_millis(33);

/// Rows scrolled per wheel notch
const WHEEL_ROWS: f32 = 3.0;

/// Every target the terminal draws
const MOUNTED: [Target; 17] = [
    Target::IntroGroup(0),
    Target::IntroGroup(1),
    Target::IntroGroup(2),
    Target::IntroGroup(3),
    Target::IntroGroup(4),
    Target::IntroGroup(5),
    Target::IntroLine,
    Target::IntroLayer,
    Target::Box,
    Target::Icon,
    Target::Hint,
    Target::RevealScreen,
    Target::AskButton,
    Target::ChatPanel,
    Target::UserBubble,
    Target::Thinking,
    Target::AiBubble,
];

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Time source shared with the sequencer
    clock: Arc<dyn Clock>,

    // === Stage Integration ===
    /// The narrative driver
    sequencer: PhaseSequencer,
    /// Messages from the sequencer
    messages: mpsc::UnboundedReceiver<StageMessage>,
    /// Phase observable
    phase: watch::Receiver<Phase>,
    /// Display state derived from StageMessages
    scene: Scene,

    // === UI State ===
    /// Chat follow-scroll
    scroll: FollowScroll,
    /// Last star preset picked with `p`
    preset: Option<StarPreset>,
    /// Terminal size
    size: (u16, u16),
}

impl App {
    /// Create the app for a terminal of `size` cells
    pub fn new(config: &StageConfig, clock: Arc<dyn Clock>, size: (u16, u16)) -> Self {
        let (tx, messages) = mpsc::unbounded_channel();
        let mut sequencer = PhaseSequencer::new(config, Arc::clone(&clock), tx);
        sequencer.resize(Viewport::new(f32::from(size.0), f32::from(size.1)));
        let phase = sequencer.subscribe();

        let mut app = Self {
            running: true,
            clock,
            sequencer,
            messages,
            phase,
            scene: Scene::with_targets(MOUNTED),
            scroll: FollowScroll::new(0.0),
            preset: None,
            size,
        };
        app.scroll.resize(f32::from(app.layout().chat_text().height));
        app
    }

    /// Begin the intro
    pub fn start(&mut self) {
        self.sequencer.start();
        self.process_stage_messages();
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut frames = tokio::time::interval(FRAME);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.start();
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events first so input stays responsive
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                // Frame tick - advance and render
                _ = frames.tick() => {
                    self.update();
                    terminal.draw(|frame| self.draw(frame))?;
                }
            }
        }

        self.sequencer.dispose();
        tracing::info!(phase = %self.sequencer.phase(), "Stage closed");
        Ok(())
    }

    /// Dispatch one terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(w, h) => self.handle_resize(w, h),
            _ => {}
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Advance the story
            KeyCode::Enter | KeyCode::Char(' ') => self.click(),
            KeyCode::Char('s') => self.sequencer.skip(),
            KeyCode::Char('h') => {
                let hovered = self.sequencer.is_hovered();
                self.sequencer.hover(!hovered);
            }
            KeyCode::Char('p') => self.cycle_preset(),

            // Chat scrolling
            KeyCode::Up => {
                self.scroll.scroll_by(-1.0);
            }
            KeyCode::Down => {
                self.scroll.scroll_by(1.0);
            }
            KeyCode::PageUp => {
                let page = f32::from(self.layout().chat_text().height);
                self.scroll.scroll_by(-page);
            }
            KeyCode::PageDown => {
                let page = f32::from(self.layout().chat_text().height);
                self.scroll.scroll_by(page);
            }
            _ => {}
        }
        self.process_stage_messages();
    }

    /// Handle mouse input
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let layout = self.layout();
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => {
                if self.sequencer.phase() == Phase::Breathing {
                    self.sequencer.hover(layout.hits_box(x, y));
                }
            }
            MouseEventKind::Down(MouseButton::Left) => match self.sequencer.phase() {
                Phase::Intro => self.sequencer.skip(),
                Phase::Breathing if layout.hits_box(x, y) => self.sequencer.trigger_expand(),
                Phase::Revealed if layout.hits_ask(x, y) => self.sequencer.trigger_ask(),
                _ => {}
            },
            MouseEventKind::ScrollUp => {
                self.scroll.scroll_by(-WHEEL_ROWS);
            }
            MouseEventKind::ScrollDown => {
                self.scroll.scroll_by(WHEEL_ROWS);
            }
            _ => {}
        }
        self.process_stage_messages();
    }

    /// Handle terminal resize
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.sequencer
            .resize(Viewport::new(f32::from(width), f32::from(height)));
        self.scroll
            .resize(f32::from(self.layout().chat_text().height));
    }

    /// Advance one frame
    pub fn update(&mut self) {
        self.sequencer.tick();
        self.process_stage_messages();

        if self.phase.has_changed().unwrap_or(false) {
            let phase = *self.phase.borrow_and_update();
            tracing::info!(%phase, "Stage phase");
        }

        let text = self.layout().chat_text();
        #[allow(clippy::cast_precision_loss)]
        let content = chat_lines(&self.scene, text.width).len() as f32;
        self.scroll.set_content(content);
        self.scroll
            .set_following(self.sequencer.phase() < Phase::ChatDone);
        self.scroll.update();
    }

    /// Render the UI
    pub fn draw(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let buf = frame.buffer_mut();
        buf.set_style(area, Style::default().bg(theme::NIGHT));

        let sprites = self.sequencer.sprites();
        StarSky::new(&sprites).render(area, buf);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let offset = self.scroll.offset().round() as usize;
        StageView::new(&self.scene, self.clock.now())
            .chat_offset(offset)
            .render(stage_area(area), buf);

        self.render_status(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        if area.height == 0 {
            return;
        }
        let preset = self.preset.map_or("custom", StarPreset::name);
        let status = format!(
            " {} | stars: {} | space: continue  s: skip  h: hover  p: stars  q: quit",
            self.sequencer.phase(),
            preset,
        );
        buf.set_stringn(
            area.x,
            area.y + area.height - 1,
            status,
            usize::from(area.width),
            Style::default().fg(theme::SILVER_DIM),
        );
    }

    /// Primary action for the current phase
    fn click(&mut self) {
        match self.sequencer.phase() {
            Phase::Intro => self.sequencer.skip(),
            Phase::Breathing => self.sequencer.trigger_expand(),
            Phase::Revealed => self.sequencer.trigger_ask(),
            _ => {}
        }
    }

    fn cycle_preset(&mut self) {
        let next = self.preset.map_or(StarPreset::ALL[0], StarPreset::next);
        self.preset = Some(next);
        self.sequencer.configure_stars(next.config());
        tracing::debug!(preset = %next, "Star preset selected");
    }

    /// Process all pending messages from the sequencer
    fn process_stage_messages(&mut self) {
        let now = self.clock.now();
        while let Ok(msg) = self.messages.try_recv() {
            self.scene.apply(&msg, now);
        }
    }

    fn layout(&self) -> StageLayout {
        let area = stage_area(Rect::new(0, 0, self.size.0, self.size.1));
        StageLayout::new(area, self.sequencer.current_scale(Target::Box).unwrap_or(1.0))
    }

    // === Accessors ===

    /// Is the app still running?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    /// Display state
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Chat scroll state
    #[must_use]
    pub fn scroll(&self) -> &FollowScroll {
        &self.scroll
    }

    /// The star preset picked last, if any
    #[must_use]
    pub fn preset(&self) -> Option<StarPreset> {
        self.preset
    }
}

/// Everything but the status row
fn stage_area(area: Rect) -> Rect {
    Rect {
        height: area.height.saturating_sub(1),
        ..area
    }
}
