//! Terminal front-ends: the customer widget and the staff console.

pub mod console;
pub mod formatter;
pub mod input;
pub mod runner;
pub mod widget;

pub use console::StaffConsole;
pub use formatter::MessageFormatter;
pub use runner::{run_customer_widget, run_staff_console};
pub use widget::CustomerWidget;
