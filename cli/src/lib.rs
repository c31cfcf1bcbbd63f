//! medport-cli library - 暴露模块用于单元测试和集成测试

pub mod app;
pub mod commands;
