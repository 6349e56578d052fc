//! Editor inspector
//!
//! Components and the scene describe their editable state through the
//! [`Inspector`] trait, an immediate-mode seam: every call both draws a
//! widget and reports whether the user changed the value this frame. A GUI
//! backend implements it on top of its widget toolkit; [`RecordingInspector`]
//! renders to text for logs and tests.

use crate::foundation::math::Vec3;
use crate::physics::DebugDrawMode;
use crate::scene::{RenderFlags, Scene};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Immediate-mode widget sink
pub trait Inspector {
    /// Read-only line of text
    fn label(&mut self, text: &str);

    /// Editable scalar; returns true if the value changed
    fn drag_float(&mut self, label: &str, value: &mut f32) -> bool;

    /// Editable vector; returns true if the value changed
    fn drag_float3(&mut self, label: &str, value: &mut Vec3) -> bool;

    /// Editable flag; returns true if the value changed
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    /// Collapsible section header; returns true while expanded
    fn header(&mut self, label: &str) -> bool;
}

/// Text inspector
///
/// Every widget becomes one line in [`lines`](Self::lines). Checkboxes named
/// with [`click`](Self::click) flip on their next appearance, and headers
/// named with [`collapse`](Self::collapse) report collapsed.
#[derive(Debug, Default, Clone)]
pub struct RecordingInspector {
    lines: Vec<String>,
    pending_clicks: BTreeSet<String>,
    collapsed: BTreeSet<String>,
    depth: usize,
}

impl RecordingInspector {
    /// Empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the checkbox called `label` the next time it is drawn
    pub fn click(&mut self, label: impl Into<String>) -> &mut Self {
        self.pending_clicks.insert(label.into());
        self
    }

    /// Keep the header called `label` collapsed
    pub fn collapse(&mut self, label: impl Into<String>) -> &mut Self {
        self.collapsed.insert(label.into());
        self
    }

    /// Recorded lines in draw order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True if any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    /// Whole recording as one string
    pub fn text(&self) -> String {
        self.lines.iter().fold(String::new(), |mut out, line| {
            let _ = writeln!(out, "{line}");
            out
        })
    }

    /// Forget recorded lines, keeping scripted clicks and collapsed headers
    pub fn clear(&mut self) {
        self.lines.clear();
        self.depth = 0;
    }

    fn push(&mut self, line: String) {
        let indent = if self.depth == 0 { 0 } else { 2 };
        self.lines.push(format!("{:indent$}{line}", ""));
    }
}

impl Inspector for RecordingInspector {
    fn label(&mut self, text: &str) {
        self.push(text.to_string());
    }

    fn drag_float(&mut self, label: &str, value: &mut f32) -> bool {
        self.push(format!("{label}: {value:.3}"));
        false
    }

    fn drag_float3(&mut self, label: &str, value: &mut Vec3) -> bool {
        self.push(format!("{label}: ({:.3}, {:.3}, {:.3})", value.x, value.y, value.z));
        false
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        let clicked = self.pending_clicks.remove(label);
        if clicked {
            *value = !*value;
        }
        self.push(format!("[{}] {label}", if *value { "x" } else { " " }));
        clicked
    }

    fn header(&mut self, label: &str) -> bool {
        let open = !self.collapsed.contains(label);
        self.depth = 0;
        self.push(format!("{} {label}", if open { "v" } else { ">" }));
        self.depth = 1;
        open
    }
}

/// Render and physics debug toggles
pub struct DebugPanel;

impl DebugPanel {
    /// Draw the panel and write any toggled flag back to the scene
    pub fn render(scene: &mut Scene, ui: &mut dyn Inspector) {
        if ui.header("Physics Debug Draw") {
            let mut mode = scene.physics_debug_mode();
            let mut changed = false;
            for (flag, label) in DebugDrawMode::LABELED {
                let mut on = mode.contains(flag);
                if ui.checkbox(label, &mut on) {
                    mode.set(flag, on);
                    changed = true;
                }
            }
            if changed {
                log::debug!("Physics debug draw mode -> {mode:?}");
                scene.set_physics_debug_mode(mode);
            }
        }

        if ui.header("Rendering") {
            for (flag, label) in RenderFlags::LABELED {
                let mut on = scene.render_flags().contains(flag);
                if ui.checkbox(label, &mut on) {
                    log::debug!("{label} -> {on}");
                    scene.set_render_flag(flag, on);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_lists_widgets() {
        let mut ui = RecordingInspector::new();
        let mut speed = 1.5;
        let mut offset = Vec3::new(1.0, 2.0, 3.0);
        assert!(ui.header("Player"));
        assert!(!ui.drag_float("Speed", &mut speed));
        assert!(!ui.drag_float3("Offset", &mut offset));

        assert_eq!(
            ui.lines(),
            &["v Player", "  Speed: 1.500", "  Offset: (1.000, 2.000, 3.000)"]
        );
    }

    #[test]
    fn test_click_flips_once() {
        let mut ui = RecordingInspector::new();
        ui.click("Warm");
        let mut warm = false;
        assert!(ui.checkbox("Warm", &mut warm));
        assert!(warm);
        assert!(!ui.checkbox("Warm", &mut warm));
        assert!(warm);
    }

    #[test]
    fn test_debug_panel_applies_toggles() {
        let mut scene = Scene::new();
        let mut ui = RecordingInspector::new();
        ui.click("Wireframe").click("Cold");

        DebugPanel::render(&mut scene, &mut ui);

        assert_eq!(scene.physics_debug_mode(), DebugDrawMode::WIREFRAME);
        assert_eq!(scene.render_flags(), RenderFlags::COLD);
        assert!(ui.contains("[x] Wireframe"));
        assert!(ui.contains("[ ] Dumpster"));
    }

    #[test]
    fn test_collapsed_section_is_untouched() {
        let mut scene = Scene::new();
        let mut ui = RecordingInspector::new();
        ui.collapse("Rendering").click("Warm");

        DebugPanel::render(&mut scene, &mut ui);

        assert!(scene.render_flags().is_empty());
        assert!(!ui.contains("Warm"));
    }
}
