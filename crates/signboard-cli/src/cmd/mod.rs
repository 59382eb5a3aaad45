pub mod pack;
pub mod push;
pub mod render;
pub mod serve;
pub mod show;
pub mod update;
