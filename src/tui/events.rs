use crate::core::book::BookRecord;

/// Events flowing through the Elm-architecture event loop.
///
/// Spawned network tasks only ever talk to the app through these; all
/// state mutation happens on the event-loop task.
#[derive(Debug)]
pub enum AppEvent {
    /// Periodic tick for animations (typing indicator, loader).
    Tick,
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// Book fetch resolved. Stale generations are discarded.
    BookLoaded {
        generation: u64,
        book: Box<BookRecord>,
    },
    /// Book fetch rejected. Stale generations are discarded.
    BookFailed { generation: u64, error: String },
    /// Chat turn resolved. Stale epochs are discarded.
    ChatReply { epoch: u64, text: String },
    /// Chat turn rejected. Stale epochs are discarded.
    ChatFailed { epoch: u64 },
    /// Request to quit the application.
    Quit,
}

/// Page-level loading state. Exactly one book record or error message is
/// live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    Loading,
    Success,
    Error,
}

impl LoadingState {
    pub fn label(self) -> &'static str {
        match self {
            LoadingState::Idle => "idle",
            LoadingState::Loading => "loading",
            LoadingState::Success => "ready",
            LoadingState::Error => "error",
        }
    }
}

/// Which panel has input focus on the success screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Page,
    Chat,
}

impl PanelFocus {
    pub fn label(self) -> &'static str {
        match self {
            PanelFocus::Page => "Page",
            PanelFocus::Chat => "Chat",
        }
    }

    pub fn toggle(self) -> PanelFocus {
        match self {
            PanelFocus::Page => PanelFocus::Chat,
            PanelFocus::Chat => PanelFocus::Page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_state_labels() {
        assert_eq!(LoadingState::Idle.label(), "idle");
        assert_eq!(LoadingState::Loading.label(), "loading");
        assert_eq!(LoadingState::Success.label(), "ready");
        assert_eq!(LoadingState::Error.label(), "error");
    }

    #[test]
    fn test_focus_toggle_roundtrip() {
        assert_eq!(PanelFocus::Page.toggle(), PanelFocus::Chat);
        assert_eq!(PanelFocus::Page.toggle().toggle(), PanelFocus::Page);
    }
}
