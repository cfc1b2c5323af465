//! Where rendered fragments and control state end up.

use log::warn;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

/// Sink for page output
///
/// Regions and controls are addressed by the element ids the pages use
/// (`groupsList`, `saveBtn`, ...).
pub trait RenderTarget {
    /// Replace the markup of a region.
    fn replace(&mut self, region: &str, html: &str);

    /// Show or hide an element (modal, dropdown, form section).
    fn set_visible(&mut self, element: &str, visible: bool);

    /// Disable a control while its request is in flight.
    fn set_busy(&mut self, control: &str, busy: bool);

    fn focus(&mut self, control: &str);

    /// Clear every input of a form.
    fn reset(&mut self, form: &str);
}

/// Keeps everything in memory; the headless rendition of a page.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    regions: HashMap<String, String>,
    writes: HashMap<String, usize>,
    visible: HashMap<String, bool>,
    busy: HashSet<String>,
    focused: Option<String>,
    resets: HashMap<String, usize>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, region: &str) -> Option<&str> {
        self.regions.get(region).map(String::as_str)
    }

    /// Region markup, empty when never written.
    pub fn html(&self, region: &str) -> &str {
        self.region(region).unwrap_or("")
    }

    /// How many times a region was replaced.
    pub fn writes(&self, region: &str) -> usize {
        self.writes.get(region).copied().unwrap_or(0)
    }

    pub fn is_visible(&self, element: &str) -> bool {
        self.visible.get(element).copied().unwrap_or(false)
    }

    pub fn is_busy(&self, control: &str) -> bool {
        self.busy.contains(control)
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn resets(&self, form: &str) -> usize {
        self.resets.get(form).copied().unwrap_or(0)
    }
}

impl RenderTarget for MemoryTarget {
    fn replace(&mut self, region: &str, html: &str) {
        self.regions.insert(region.to_string(), html.to_string());
        *self.writes.entry(region.to_string()).or_insert(0) += 1;
    }

    fn set_visible(&mut self, element: &str, visible: bool) {
        self.visible.insert(element.to_string(), visible);
    }

    fn set_busy(&mut self, control: &str, busy: bool) {
        if busy {
            self.busy.insert(control.to_string());
        } else {
            self.busy.remove(control);
        }
    }

    fn focus(&mut self, control: &str) {
        self.focused = Some(control.to_string());
    }

    fn reset(&mut self, form: &str) {
        *self.resets.entry(form.to_string()).or_insert(0) += 1;
    }
}

/// Writes each region to `<dir>/<region>.html`
///
/// Used by the headless runner; control state is only kept in memory.
pub struct DirectoryTarget {
    dir: PathBuf,
    state: MemoryTarget,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(DirectoryTarget {
            dir,
            state: MemoryTarget::new(),
        })
    }

    pub fn state(&self) -> &MemoryTarget {
        &self.state
    }
}

impl RenderTarget for DirectoryTarget {
    fn replace(&mut self, region: &str, html: &str) {
        let path = self.dir.join(format!("{}.html", region));
        if let Err(e) = fs::write(&path, html) {
            warn!("could not write {}: {}", path.display(), e);
        }
        self.state.replace(region, html);
    }

    fn set_visible(&mut self, element: &str, visible: bool) {
        self.state.set_visible(element, visible);
    }

    fn set_busy(&mut self, control: &str, busy: bool) {
        self.state.set_busy(control, busy);
    }

    fn focus(&mut self, control: &str) {
        self.state.focus(control);
    }

    fn reset(&mut self, form: &str) {
        self.state.reset(form);
    }
}
