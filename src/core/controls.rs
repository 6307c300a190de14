//! Parameter controls: the interface between nodes and a presentation layer.
//!
//! Nodes render their adjustable state through [`ParameterUi`] and report
//! whether anything changed. The graph only consumes that boolean; how the
//! widgets look (immediate-mode sliders, a property panel, a test script) is
//! up to the implementation of this trait.

use std::collections::HashMap;
use std::ops::RangeInclusive;

/// How a float slider maps its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliderScale {
    #[default]
    Linear,
    Logarithmic,
}

/// Widget toolkit seen by [`TransformNode::render_parameter_controls`].
///
/// Every editing method takes the current value by `&mut` and returns `true`
/// when it modified it during this call.
///
/// [`TransformNode::render_parameter_controls`]: crate::core::node::TransformNode::render_parameter_controls
pub trait ParameterUi {
    /// Static text.
    fn label(&mut self, text: &str);

    /// Float slider clamped to `range`.
    fn slider_f32(
        &mut self,
        label: &str,
        value: &mut f32,
        range: RangeInclusive<f32>,
        scale: SliderScale,
    ) -> bool;

    /// Integer slider clamped to `range`.
    fn slider_i32(&mut self, label: &str, value: &mut i32, range: RangeInclusive<i32>) -> bool;

    /// Checkbox.
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    /// Radio button; returns `true` when clicked.
    fn radio_button(&mut self, label: &str, active: bool) -> bool;

    /// Push button; returns `true` when clicked.
    fn button(&mut self, label: &str) -> bool;

    /// Enter a nested label scope (node name, channel index...).
    fn push_scope(&mut self, scope: &str);

    /// Leave the innermost label scope.
    fn pop_scope(&mut self);
}

/// Headless UI that renders nothing and never changes anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUi;

impl ParameterUi for NoopUi {
    fn label(&mut self, _text: &str) {}

    fn slider_f32(
        &mut self,
        _label: &str,
        _value: &mut f32,
        _range: RangeInclusive<f32>,
        _scale: SliderScale,
    ) -> bool {
        false
    }

    fn slider_i32(&mut self, _label: &str, _value: &mut i32, _range: RangeInclusive<i32>) -> bool {
        false
    }

    fn checkbox(&mut self, _label: &str, _value: &mut bool) -> bool {
        false
    }

    fn radio_button(&mut self, _label: &str, _active: bool) -> bool {
        false
    }

    fn button(&mut self, _label: &str) -> bool {
        false
    }

    fn push_scope(&mut self, _scope: &str) {}

    fn pop_scope(&mut self) {}
}

/// A queued edit for [`ScriptedUi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEdit {
    /// Set a float slider.
    Float(f32),
    /// Set an integer slider.
    Int(i32),
    /// Set a checkbox.
    Bool(bool),
    /// Click a button or radio button.
    Click,
}

/// Headless UI driven by a script of edits.
///
/// Edits are addressed by the widget path, i.e. the enclosing scopes and the
/// widget label joined with `/` (for a node named `LUT G`, the slider
/// `power` is `"LUT G/power"`). An edit is consumed the first time its
/// widget is rendered; edits whose widget never shows up stay pending.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    edits: HashMap<String, ControlEdit>,
    scopes: Vec<String>,
    rendered: Vec<String>,
}

impl ScriptedUi {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an edit.
    pub fn with_edit(mut self, path: impl Into<String>, edit: ControlEdit) -> Self {
        self.queue(path, edit);
        self
    }

    /// Queue a float slider edit.
    pub fn set_f32(self, path: impl Into<String>, value: f32) -> Self {
        self.with_edit(path, ControlEdit::Float(value))
    }

    /// Queue an integer slider edit.
    pub fn set_i32(self, path: impl Into<String>, value: i32) -> Self {
        self.with_edit(path, ControlEdit::Int(value))
    }

    /// Queue a button or radio click.
    pub fn click(self, path: impl Into<String>) -> Self {
        self.with_edit(path, ControlEdit::Click)
    }

    /// Queue an edit on an existing script.
    pub fn queue(&mut self, path: impl Into<String>, edit: ControlEdit) {
        self.edits.insert(path.into(), edit);
    }

    /// Paths of every widget rendered so far, in render order.
    pub fn rendered(&self) -> &[String] {
        &self.rendered
    }

    /// Paths of edits that have not been applied yet.
    pub fn pending(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.edits.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Forget the render log.
    pub fn clear_rendered(&mut self) {
        self.rendered.clear();
    }

    fn path(&self, label: &str) -> String {
        let mut path = self.scopes.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(label);
        path
    }

    fn take(&mut self, label: &str) -> Option<ControlEdit> {
        let path = self.path(label);
        let edit = self.edits.remove(&path);
        self.rendered.push(path);
        edit
    }
}

impl ParameterUi for ScriptedUi {
    fn label(&mut self, _text: &str) {}

    fn slider_f32(
        &mut self,
        label: &str,
        value: &mut f32,
        range: RangeInclusive<f32>,
        _scale: SliderScale,
    ) -> bool {
        let new = match self.take(label) {
            Some(ControlEdit::Float(new)) => new,
            Some(ControlEdit::Int(new)) => new as f32,
            _ => return false,
        };
        let new = new.clamp(*range.start(), *range.end());
        let changed = new != *value;
        *value = new;
        changed
    }

    fn slider_i32(&mut self, label: &str, value: &mut i32, range: RangeInclusive<i32>) -> bool {
        match self.take(label) {
            Some(ControlEdit::Int(new)) => {
                let new = new.clamp(*range.start(), *range.end());
                let changed = new != *value;
                *value = new;
                changed
            }
            _ => false,
        }
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        match self.take(label) {
            Some(ControlEdit::Bool(new)) => {
                let changed = new != *value;
                *value = new;
                changed
            }
            Some(ControlEdit::Click) => {
                *value = !*value;
                true
            }
            _ => false,
        }
    }

    fn radio_button(&mut self, label: &str, _active: bool) -> bool {
        matches!(self.take(label), Some(ControlEdit::Click))
    }

    fn button(&mut self, label: &str) -> bool {
        matches!(self.take(label), Some(ControlEdit::Click))
    }

    fn push_scope(&mut self, scope: &str) {
        self.scopes.push(scope.to_string());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_slider_is_scoped_and_clamped() {
        let mut ui = ScriptedUi::new().set_f32("Blur/sigma_x", 40.0);
        let mut sigma = 3.0;

        // Unscoped widget with the same label is not addressed
        assert!(!ui.slider_f32("sigma_x", &mut sigma, 0.1..=15.0, SliderScale::Linear));
        assert_eq!(sigma, 3.0);

        ui.push_scope("Blur");
        assert!(ui.slider_f32("sigma_x", &mut sigma, 0.1..=15.0, SliderScale::Linear));
        ui.pop_scope();

        assert_eq!(sigma, 15.0);
        assert!(ui.pending().is_empty());
        assert_eq!(ui.rendered(), ["sigma_x", "Blur/sigma_x"]);
    }

    #[test]
    fn test_scripted_edit_to_same_value_is_not_a_change() {
        let mut ui = ScriptedUi::new().set_i32("t_lower", 100);
        let mut value = 100;

        assert!(!ui.slider_i32("t_lower", &mut value, 0..=255));
        assert!(ui.pending().is_empty());
    }

    #[test]
    fn test_scripted_clicks() {
        let mut ui = ScriptedUi::new().click("Reset").click("show");
        let mut show = false;

        assert!(ui.button("Reset"));
        assert!(!ui.button("Reset"));
        assert!(ui.checkbox("show", &mut show));
        assert!(show);
    }

    #[test]
    fn test_noop_ui_never_changes() {
        let mut ui = NoopUi;
        let mut value = 1.0;
        assert!(!ui.slider_f32("power", &mut value, 0.0..=10.0, SliderScale::Logarithmic));
        assert!(!ui.button("Reset"));
    }
}
