// Container surfaces - the engine-owned render targets
//
// A Surface is the dashboard's stand-in for a DOM element: a small text
// buffer a template renders into. The lifecycle manager creates one per
// widget; the TUI reads them each frame. Templates receive `&mut Surface`
// for the duration of a render call only, so they cannot retain a handle
// past the call.

use std::sync::{Arc, Mutex};

/// Text contents of a single widget panel.
///
/// Templates replace the whole body on every render; there is no
/// incremental patching. The title/icon come from the owning application
/// reference and are set once at container creation.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    /// Panel title shown in the border (application name + widget id)
    pub title: String,

    /// Application icon prepended to the title
    pub icon: String,

    /// Body lines, one per terminal row
    lines: Vec<String>,
}

impl Surface {
    /// Replace the full body contents with new lines
    pub fn replace(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    /// Append a single line to the body
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Remove all body lines
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Current body lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Shared handle to a widget's surface with a stable per-widget id.
///
/// Clones are cheap and refer to the same surface. The engine is the only
/// writer; everything outside the engine (the TUI, tests) reads via
/// [`ContainerHandle::snapshot`].
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    id: String,
    surface: Arc<Mutex<Surface>>,
}

impl ContainerHandle {
    /// Create a container for the given widget id with a titled, empty surface
    pub fn new(id: impl Into<String>, title: impl Into<String>, icon: impl Into<String>) -> Self {
        let surface = Surface {
            title: title.into(),
            icon: icon.into(),
            lines: Vec::new(),
        };
        Self {
            id: id.into(),
            surface: Arc::new(Mutex::new(surface)),
        }
    }

    /// Stable widget id this container belongs to
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run `f` with exclusive access to the surface.
    ///
    /// The lock is held only for the duration of the closure; render calls
    /// are synchronous, so this never crosses an await point.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut Surface) -> R) -> R {
        let mut surface = self.surface.lock().unwrap();
        f(&mut surface)
    }

    /// Copy of the current surface contents (for the TUI draw pass and tests)
    pub fn snapshot(&self) -> Surface {
        self.surface.lock().unwrap().clone()
    }
}

/// The ordered set of containers the TUI draws each frame.
///
/// Owned by the lifecycle manager, shared read-only with the display loop.
pub type SharedContainers = Arc<Mutex<Vec<ContainerHandle>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_swaps_full_contents() {
        let container = ContainerHandle::new("a", "App / a", "*");
        container.with_surface(|s| s.replace(vec!["one".into(), "two".into()]));
        container.with_surface(|s| s.replace(vec!["three".into()]));

        let snapshot = container.snapshot();
        assert_eq!(snapshot.lines(), &["three".to_string()]);
    }

    #[test]
    fn clones_share_the_same_surface() {
        let container = ContainerHandle::new("a", "App / a", "*");
        let alias = container.clone();
        alias.with_surface(|s| s.push_line("written through alias"));

        assert_eq!(container.snapshot().lines().len(), 1);
    }
}
