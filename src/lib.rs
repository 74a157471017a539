// Export modules for use in tests
pub mod document;
pub mod event_source;
pub mod export_worker;
pub mod inputs;
pub mod main_app;
pub mod notification;
pub mod panic_handler;
pub mod settings;
pub mod theme;
pub mod viewer;
pub mod widget;
pub use widget::page_view;
// Test utilities - only available when test-utils feature is enabled or during tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main app components
pub use main_app::{App, AppAction, TerminalHost, run_app_with_event_source};
