//! 数据模型模块

pub mod auth;
pub mod location;
pub mod pet;
pub mod user;
