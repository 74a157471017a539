pub mod help_popup;
pub mod page_panels;
pub mod page_view;
