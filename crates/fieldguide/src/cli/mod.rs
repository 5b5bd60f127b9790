pub mod capture;
pub mod classify;
pub mod config;
pub mod interactive;
pub mod models;
pub mod permission;
pub mod pick;
pub mod present;
