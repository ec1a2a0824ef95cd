//! Visual state of a button block, driven by its interaction events.

use experience_core::{Button, ButtonState};

use crate::block::{BlockEvent, BlockLayout};
use crate::events::{EventEmitter, Subscription};

/// The four appearances a button can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateOfButton {
    Normal,
    Highlighted,
    Selected,
    Disabled,
}

/// A state to display, and how to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    pub state: StateOfButton,
    /// Animate the change rather than snapping to it
    pub animate: bool,
    /// The host should return to `Normal` once the transition finishes
    pub self_revert: bool,
}

impl DisplayState {
    /// What a newly attached observer sees.
    pub const INITIAL: DisplayState = DisplayState {
        state: StateOfButton::Normal,
        animate: false,
        self_revert: false,
    };

    /// The display state an interaction event leads to.
    pub fn after(event: &BlockEvent) -> DisplayState {
        let (state, self_revert) = match event {
            BlockEvent::Touched { .. } => (StateOfButton::Highlighted, false),
            BlockEvent::Released { .. } => (StateOfButton::Normal, false),
            BlockEvent::Clicked { .. } => (StateOfButton::Selected, true),
        };
        DisplayState {
            state,
            animate: true,
            self_revert,
        }
    }
}

/// Maps a button block's touch, release, and click events to display states.
///
/// The machine does not remember the last state. Every subscriber first
/// receives [`DisplayState::INITIAL`] and then one state per event.
pub struct ButtonStateMachine {
    button: Button,
    states: EventEmitter<DisplayState>,
    _block_subscription: Subscription,
}

impl ButtonStateMachine {
    /// Attach to a block. Returns `None` if the block is not a button.
    pub fn new(block: &BlockLayout) -> Option<Self> {
        let button = block.block().button_content()?.clone();
        Some(Self::attach(block, button))
    }

    /// Attach to `block`, styling it with `button`.
    pub fn attach(block: &BlockLayout, button: Button) -> Self {
        let states = EventEmitter::new();
        let forward = states.clone();
        let block_subscription = block.subscribe(move |event| {
            forward.emit(&DisplayState::after(event));
        });
        Self {
            button,
            states,
            _block_subscription: block_subscription,
        }
    }

    /// Observe display states, starting with [`DisplayState::INITIAL`]
    /// delivered before this returns.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&DisplayState) + Send + Sync + 'static,
    {
        handler(&DisplayState::INITIAL);
        self.states.subscribe(handler)
    }

    /// The appearance for any state, whether or not it is the live one.
    pub fn style_for(&self, state: StateOfButton) -> &ButtonState {
        match state {
            StateOfButton::Normal => &self.button.normal,
            StateOfButton::Highlighted => &self.button.highlighted,
            StateOfButton::Selected => &self.button.selected,
            StateOfButton::Disabled => &self.button.disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.button.enabled
    }

    /// `Normal`, or `Disabled` for a button that is switched off.
    pub fn resting_state(&self) -> StateOfButton {
        if self.is_enabled() {
            StateOfButton::Normal
        } else {
            StateOfButton::Disabled
        }
    }
}
