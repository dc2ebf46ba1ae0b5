pub mod ranking;
pub mod room;
pub mod team;
