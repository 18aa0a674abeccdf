pub mod listing;
pub mod row;
