//! ossbridge MCP Server
//!
//! Model Context Protocol server that exposes the OSS/TOS upload, download
//! and credential tools to a host over stdio.

pub mod server;
pub mod tools;

pub use server::OssBridgeService;
