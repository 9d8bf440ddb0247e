//! Frame lifecycle notifications
//!
//! The host render loop emits three notifications per frame: frame start,
//! before draw and after draw. The draw itself happens strictly between the
//! last two. Handlers are notified in registration order.

use std::cell::RefCell;
use std::rc::Rc;

/// Point in the frame a notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPhase {
    /// Start of the frame, before any update tick
    FrameStart,
    /// Scene is final; the renderer is about to read it
    BeforeDraw,
    /// The renderer is done reading the scene
    AfterDraw,
}

/// Receiver of frame lifecycle notifications
pub trait DrawPhaseHandler<S> {
    /// Handle a notification; runs synchronously inside the frame
    fn on_draw_phase(&mut self, phase: DrawPhase, scene: &mut S);
}

/// Shared handlers let the host keep registering roots between notifications
impl<S, H> DrawPhaseHandler<S> for Rc<RefCell<H>>
where
    H: DrawPhaseHandler<S>,
{
    fn on_draw_phase(&mut self, phase: DrawPhase, scene: &mut S) {
        self.borrow_mut().on_draw_phase(phase, scene);
    }
}

/// Handle returned by [`DrawLifecycle::add_handler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

/// Dispatcher the host render loop drives once per frame
pub struct DrawLifecycle<S> {
    handlers: Vec<(HandlerId, Box<dyn DrawPhaseHandler<S>>)>,
    next_id: usize,
    last_phase: Option<DrawPhase>,
}

impl<S> DrawLifecycle<S> {
    /// Create a dispatcher with no handlers
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
            last_phase: None,
        }
    }

    /// Register a handler; it is notified after every earlier handler
    pub fn add_handler(&mut self, handler: Box<dyn DrawPhaseHandler<S>>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    /// Unregister a handler, returning whether it was present
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Last phase emitted
    pub fn last_phase(&self) -> Option<DrawPhase> {
        self.last_phase
    }

    /// Notify every handler of `phase`
    pub fn emit(&mut self, phase: DrawPhase, scene: &mut S) {
        if phase == DrawPhase::AfterDraw && self.last_phase != Some(DrawPhase::BeforeDraw) {
            log::warn!("after-draw emitted without a preceding before-draw");
        }
        for (_, handler) in &mut self.handlers {
            handler.on_draw_phase(phase, scene);
        }
        self.last_phase = Some(phase);
    }

    /// Emit [`DrawPhase::FrameStart`]
    pub fn frame_start(&mut self, scene: &mut S) {
        self.emit(DrawPhase::FrameStart, scene);
    }

    /// Emit [`DrawPhase::BeforeDraw`]
    pub fn before_draw(&mut self, scene: &mut S) {
        self.emit(DrawPhase::BeforeDraw, scene);
    }

    /// Emit [`DrawPhase::AfterDraw`]
    pub fn after_draw(&mut self, scene: &mut S) {
        self.emit(DrawPhase::AfterDraw, scene);
    }
}

impl<S> Default for DrawLifecycle<S> {
    fn default() -> Self {
        Self::new()
    }
}
