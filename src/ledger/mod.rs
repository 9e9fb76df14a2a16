pub mod amount;
pub mod entry;
pub mod pager;
