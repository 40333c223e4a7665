//! All widget instances of one kind, backed by one directory
//!
//! Instances live in discovery order. Membership changes only through
//! `create`, `delete` and `refresh_all` dropping instances whose files
//! vanished.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::{WidgetConfig, store};
use crate::editor::protocol::EditorOutcome;
use crate::error::StoreResult;
use crate::kind::WidgetKind;
use crate::render::Renderer;
use crate::widget::{RefreshOutcome, WidgetInstance};
use crate::window::{FloatingWindow, WindowFactory, WindowId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanReport {
    pub loaded: usize,
    /// Files that could not be loaded
    pub skipped: Vec<PathBuf>,
}

pub struct WidgetCollection<W: FloatingWindow> {
    kind: WidgetKind,
    dir: PathBuf,
    renderer: Rc<dyn Renderer>,
    instances: Vec<WidgetInstance<W>>,
}

impl<W: FloatingWindow> WidgetCollection<W> {
    pub fn new(kind: WidgetKind, dir: PathBuf) -> Self {
        Self { kind, dir, renderer: kind.renderer(), instances: Vec::new() }
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[WidgetInstance<W>] {
        &self.instances
    }

    pub fn get(&self, path: &Path) -> Option<&WidgetInstance<W>> {
        self.instances.iter().find(|i| i.path() == path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut WidgetInstance<W>> {
        self.instances.iter_mut().find(|i| i.path() == path)
    }

    pub fn find_by_window(&mut self, id: WindowId) -> Option<&mut WidgetInstance<W>> {
        self.instances.iter_mut().find(|i| i.window_id() == id)
    }

    /// The instance currently being dragged, if any
    pub fn dragging(&mut self) -> Option<&mut WidgetInstance<W>> {
        self.instances.iter_mut().find(|i| i.is_dragging())
    }

    /// Seed the directory with one example widget on first run
    pub fn ensure_bootstrapped(&self) -> StoreResult<bool> {
        store::ensure_bootstrapped(&self.dir, self.kind.seed_content())
    }

    /// Load and show one instance per config file; bad files are skipped
    pub fn scan<F>(&mut self, factory: &F, now: Instant) -> StoreResult<ScanReport>
    where
        F: WindowFactory<Window = W>,
    {
        let mut report = ScanReport::default();

        for path in store::list_configs(&self.dir)? {
            if self.get(&path).is_some() {
                continue;
            }
            let config = match store::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!(error = %e, "Skipping widget config");
                    report.skipped.push(path);
                    continue;
                }
            };
            match WidgetInstance::new(factory, path.clone(), config, self.renderer.clone(), now) {
                Ok(instance) => {
                    self.instances.push(instance);
                    report.loaded += 1;
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to open widget window");
                    report.skipped.push(path);
                }
            }
        }

        info!(
            kind = self.kind.label(),
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Scanned widget directory"
        );
        Ok(report)
    }

    /// Write a default config under a fresh name and show it
    pub fn create<F>(&mut self, factory: &F, now: Instant) -> anyhow::Result<PathBuf>
    where
        F: WindowFactory<Window = W>,
    {
        let path = store::new_instance_path(&self.dir);
        let config = WidgetConfig::with_content(self.kind.new_content());
        store::save(&path, &config)?;

        let instance = WidgetInstance::new(factory, path.clone(), config, self.renderer.clone(), now)?;
        self.instances.push(instance);
        info!(kind = self.kind.label(), path = %path.display(), "Created widget");
        Ok(path)
    }

    /// Reload every instance; those whose file is gone are dropped
    pub fn refresh_all(&mut self) {
        let before = self.instances.len();
        self.instances.retain_mut(|instance| instance.refresh() == RefreshOutcome::Alive);
        info!(
            kind = self.kind.label(),
            live = self.instances.len(),
            closed = before - self.instances.len(),
            "Refreshed widgets"
        );
    }

    /// Delete one instance and its file. Returns whether an instance was
    /// removed; on a failed removal the instance is kept.
    pub fn delete(&mut self, path: &Path) -> StoreResult<bool> {
        let Some(index) = self.instances.iter().position(|i| i.path() == path) else {
            return Ok(false);
        };
        self.instances[index].delete()?;
        self.instances.remove(index);
        Ok(true)
    }

    pub fn tick(&mut self, now: Instant) {
        for instance in &mut self.instances {
            instance.tick(now);
        }
    }

    pub fn flush_all(&mut self) {
        for instance in &mut self.instances {
            instance.flush();
        }
    }

    /// Apply what the editor opened on `path` returned
    pub fn apply_outcome<F>(&mut self, path: &Path, outcome: EditorOutcome, factory: &F, now: Instant)
    where
        F: WindowFactory<Window = W>,
    {
        match outcome {
            EditorOutcome::Apply { content, style, draggable } => {
                let Some(instance) = self.get_mut(path) else {
                    warn!(path = %path.display(), "Edited widget no longer exists");
                    return;
                };
                instance.update_content(content);
                instance.set_style(style);
                instance.set_draggable(draggable);
                instance.flush();
            }
            EditorOutcome::NewWidget => {
                if let Err(e) = self.create(factory, now) {
                    error!(error = %e, "Failed to create widget");
                }
            }
            EditorOutcome::RefreshAll => self.refresh_all(),
            EditorOutcome::Delete => {
                if let Err(e) = self.delete(path) {
                    error!(path = %path.display(), error = %e, "Failed to delete widget, keeping it");
                }
            }
            EditorOutcome::ApplyLauncher { .. } => {
                warn!("Launch bar outcome delivered to a widget, ignoring");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::testing::{HeadlessFactory, HeadlessWindow};
    use std::fs;
    use tempfile::TempDir;

    fn collection(tmp: &TempDir, kind: WidgetKind) -> WidgetCollection<HeadlessWindow> {
        WidgetCollection::new(kind, tmp.path().join("note"))
    }

    #[test]
    fn test_first_run_seeds_once() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Html);

        assert!(widgets.ensure_bootstrapped().unwrap());
        assert!(!widgets.ensure_bootstrapped().unwrap());

        let report = widgets.scan(&HeadlessFactory, Instant::now()).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(widgets.instances()[0].config().content, "<h1>这是一个示例html小组件</h1>");
    }

    #[test]
    fn test_scan_skips_corrupt_files() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Markdown);
        let dir = widgets.dir().to_path_buf();
        fs::create_dir_all(&dir).unwrap();

        for name in ["a", "b", "c"] {
            store::save(&dir.join(format!("{name}.json")), &WidgetConfig::with_content(name)).unwrap();
        }
        fs::write(dir.join("d.json"), "not json").unwrap();
        fs::write(dir.join("e.json"), r#"{"position": {"x": 1, "y": 2}, "content": "!!!"}"#).unwrap();

        let report = widgets.scan(&HeadlessFactory, Instant::now()).unwrap();
        assert_eq!(report.loaded, 3);
        assert_eq!(report.skipped.len(), 2);
        let contents: Vec<&str> = widgets.instances().iter().map(|i| i.config().content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_create_appends_default_widget() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Markdown);
        widgets.ensure_bootstrapped().unwrap();
        widgets.scan(&HeadlessFactory, Instant::now()).unwrap();

        let path = widgets.create(&HeadlessFactory, Instant::now()).unwrap();
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets.instances()[1].path(), path);

        let stored = store::load(&path).unwrap();
        assert_eq!(stored.content, "F**k the rules——《海上钢琴师》");
        assert_eq!(stored.position, crate::types::Position::new(100, 100));
        assert!(stored.draggable);
    }

    #[test]
    fn test_refresh_all_drops_vanished_instances() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Html);
        let now = Instant::now();
        let first = widgets.create(&HeadlessFactory, now).unwrap();
        let second = widgets.create(&HeadlessFactory, now).unwrap();
        let third = widgets.create(&HeadlessFactory, now).unwrap();

        fs::remove_file(&second).unwrap();
        widgets.refresh_all();

        let paths: Vec<&Path> = widgets.instances().iter().map(|i| i.path()).collect();
        assert_eq!(paths, vec![first.as_path(), third.as_path()]);
    }

    #[test]
    fn test_delete_is_terminal() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Html);
        let path = widgets.create(&HeadlessFactory, Instant::now()).unwrap();

        assert!(widgets.delete(&path).unwrap());
        assert!(!path.exists());
        assert!(widgets.get(&path).is_none());
        assert!(widgets.is_empty());
        assert!(!widgets.delete(&path).unwrap());
    }

    #[test]
    fn test_failed_delete_keeps_instance() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Html);
        let now = Instant::now();
        let path = widgets.create(&HeadlessFactory, now).unwrap();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        widgets.apply_outcome(&path, EditorOutcome::Delete, &HeadlessFactory, now);
        assert!(widgets.delete(&path).is_err());
        assert!(widgets.get(&path).is_some());
        assert!(!widgets.is_empty());
    }

    #[test]
    fn test_apply_outcome_saves_edits() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Html);
        let now = Instant::now();
        let path = widgets.create(&HeadlessFactory, now).unwrap();

        let outcome = EditorOutcome::Apply {
            content: "<p>edited</p>".to_string(),
            style: "font-size: 20px".to_string(),
            draggable: false,
        };
        widgets.apply_outcome(&path, outcome, &HeadlessFactory, now);

        let stored = store::load(&path).unwrap();
        assert_eq!(stored.content, "<p>edited</p>");
        assert_eq!(stored.style, "font-size: 20px");
        assert!(!stored.draggable);
    }

    #[test]
    fn test_apply_outcome_new_and_delete() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Html);
        let now = Instant::now();
        let path = widgets.create(&HeadlessFactory, now).unwrap();

        widgets.apply_outcome(&path, EditorOutcome::NewWidget, &HeadlessFactory, now);
        assert_eq!(widgets.len(), 2);

        widgets.apply_outcome(&path, EditorOutcome::Delete, &HeadlessFactory, now);
        assert_eq!(widgets.len(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_find_by_window() {
        let tmp = TempDir::new().unwrap();
        let mut widgets = collection(&tmp, WidgetKind::Html);
        let path = widgets.create(&HeadlessFactory, Instant::now()).unwrap();
        let id = widgets.instances()[0].window_id();

        assert_eq!(widgets.find_by_window(id).map(|i| i.path().to_path_buf()), Some(path));
        assert!(widgets.find_by_window(id + 1000).is_none());
    }
}
