pub mod doses;
pub mod users;
pub mod vaccines;
