use log::warn;

use crate::storage::Storage;
use crate::target::RenderTarget;

pub const COLLAPSED_KEY: &str = "sidebarCollapsed";

/// Narrower viewports use the drawer instead of the collapsed rail
pub const DESKTOP_MIN_WIDTH: u32 = 769;

const SIDEBAR: &str = "sidebar";
const OVERLAY: &str = "sidebar-overlay";
const MENU_BUTTON: &str = "mobile-menu-btn";
const CLOSE_BUTTON: &str = "sidebar-close-btn";

/// Persistent chrome around every page
///
/// Two independent states: the desktop collapse flag (durable, restored on
/// start-up) and the mobile drawer (session only).
pub struct SidebarShell<S: Storage> {
    storage: S,
    collapsed: bool,
    drawer_open: bool,
}

impl<S: Storage> SidebarShell<S> {
    /// Read the stored collapse flag once; it only applies on desktop widths.
    pub fn init(storage: S, viewport_width: u32) -> Self {
        let stored = storage.get(COLLAPSED_KEY).as_deref() == Some("true");
        SidebarShell {
            storage,
            collapsed: stored && viewport_width >= DESKTOP_MIN_WIDTH,
            drawer_open: false,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_open(&self) -> bool {
        self.drawer_open
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn collapse(&mut self) {
        self.collapsed = true;
        self.persist();
    }

    pub fn expand(&mut self) {
        self.collapsed = false;
        self.persist();
    }

    pub fn toggle_collapse(&mut self) {
        if self.collapsed {
            self.expand();
        } else {
            self.collapse();
        }
    }

    fn persist(&mut self) {
        let value = if self.collapsed { "true" } else { "false" };
        if let Err(e) = self.storage.set(COLLAPSED_KEY, value) {
            warn!("could not persist sidebar state: {}", e);
        }
    }

    pub fn open<R: RenderTarget>(&mut self, target: &mut R) {
        self.drawer_open = true;
        target.set_visible(SIDEBAR, true);
        target.set_visible(OVERLAY, true);
        target.focus(CLOSE_BUTTON);
    }

    pub fn close<R: RenderTarget>(&mut self, target: &mut R) {
        self.drawer_open = false;
        target.set_visible(SIDEBAR, false);
        target.set_visible(OVERLAY, false);
        target.focus(MENU_BUTTON);
    }

    pub fn toggle<R: RenderTarget>(&mut self, target: &mut R) {
        if self.drawer_open {
            self.close(target);
        } else {
            self.open(target);
        }
    }

    /// Escape closes an open drawer; other keys are ignored.
    pub fn handle_key<R: RenderTarget>(&mut self, target: &mut R, key: &str) {
        if key == "Escape" && self.drawer_open {
            self.close(target);
        }
    }

    /// Classes for the layout container.
    pub fn layout_classes(&self) -> &'static str {
        if self.collapsed {
            "app-layout sidebar-collapsed"
        } else {
            "app-layout"
        }
    }
}
