#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    ShowAndFocus,
    Hide,
    FocusExisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideReason {
    Hotkey,
    Escape,
    ActionInvoked,
}

/// Visibility of the launcher window as the core sees it. The window itself
/// is owned by the UI, which mirrors this state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayState {
    visible: bool,
    last_hide: Option<HideReason>,
}

impl OverlayState {
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn last_hide(&self) -> Option<HideReason> {
        self.last_hide
    }

    pub fn on_hotkey(&mut self, has_focus: bool) -> HotkeyAction {
        if !self.visible {
            self.visible = true;
            return HotkeyAction::ShowAndFocus;
        }

        if has_focus {
            self.hide(HideReason::Hotkey);
            return HotkeyAction::Hide;
        }

        HotkeyAction::FocusExisting
    }

    pub fn on_escape(&mut self) -> bool {
        if self.visible {
            self.hide(HideReason::Escape);
            return true;
        }
        false
    }

    /// Invoking an action always hides the window, even one the UI already
    /// considers hidden.
    pub fn on_action_invoked(&mut self) {
        self.hide(HideReason::ActionInvoked);
    }

    fn hide(&mut self, reason: HideReason) {
        self.visible = false;
        self.last_hide = Some(reason);
    }
}
