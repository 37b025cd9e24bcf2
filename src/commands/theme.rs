//! Manage the saved theme preference

use anyhow::Result;

use crate::theme::{Theme, ThemeController};
use crate::Blog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    /// Print the active theme
    Get,
    Toggle,
    Set(Theme),
    /// Forget the saved preference
    Reset,
}

/// Apply `action` and return the resulting active theme
pub fn apply(controller: &mut ThemeController, action: ThemeAction) -> Theme {
    match action {
        ThemeAction::Get => controller.current(),
        ThemeAction::Toggle => controller.toggle(),
        ThemeAction::Set(theme) => {
            controller.set(theme);
            theme
        }
        ThemeAction::Reset => controller.reset(),
    }
}

/// Run the theme command
pub fn run(blog: &Blog, action: ThemeAction) -> Result<()> {
    let mut controller = blog.theme_controller();
    let theme = apply(&mut controller, action);

    let source = if controller.saved().is_some() {
        "saved"
    } else {
        "system"
    };
    println!("{} ({})", theme, source);

    Ok(())
}
