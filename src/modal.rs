use crate::target::RenderTarget;

/// How a modal was asked to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseButton,
    Overlay,
    Escape,
    /// The modal's own action finished (saved, deleted)
    Completed,
}

/// One dialog surface
///
/// Opening traps focus on the first focusable control; every close path goes
/// through `close`, which hides the dialog and hands focus back to whatever
/// opened it.
#[derive(Debug, Clone)]
pub struct Modal {
    element: &'static str,
    open: bool,
    invoker: Option<String>,
}

impl Modal {
    pub fn new(element: &'static str) -> Self {
        Modal {
            element,
            open: false,
            invoker: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open<R: RenderTarget>(
        &mut self,
        target: &mut R,
        invoker: Option<&str>,
        focusables: &[&str],
    ) {
        self.open = true;
        self.invoker = invoker.map(str::to_string);
        target.set_visible(self.element, true);
        if let Some(first) = focusables.first() {
            target.focus(first);
        }
    }

    /// Returns false when the modal was not open (nothing happened).
    pub fn close<R: RenderTarget>(&mut self, target: &mut R, reason: CloseReason) -> bool {
        if !self.open {
            return false;
        }
        log::debug!("closing {} ({:?})", self.element, reason);
        self.open = false;
        target.set_visible(self.element, false);
        if let Some(invoker) = self.invoker.take() {
            target.focus(&invoker);
        }
        true
    }
}
