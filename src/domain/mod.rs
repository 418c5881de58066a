pub mod bill;
pub mod lenient;
pub mod line_item;
pub mod types;
pub mod view;
