mod central_panel;
mod style_toolbar;
mod tools_panel;

pub use central_panel::central_panel;
pub use style_toolbar::style_toolbar;
pub use tools_panel::tools_panel;
