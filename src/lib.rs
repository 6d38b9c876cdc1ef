//! Agora Design System MCP Service
//!
//! This crate provides a Model Context Protocol (MCP) service for querying the
//! component catalog of the Agora design system. The catalog is published as a
//! link-indexed markdown document together with one markdown page per component,
//! and this service lets clients search it, read component code examples, and
//! browse usage guidelines through a small set of tools.
//!
//! # Features
//!
//! - Fetch and parse the published component index
//! - Resolve colloquial Spanish and English component names to catalog entries
//! - Cache the parsed catalog with a TTL and serve stale data on refresh failures
//! - Extract per-variant HTML and Nunjucks code examples from component pages
//! - MCP server implementation over SSE or stdio for remote access
//!
//! # Modules
//!
//! - [`cache`]: TTL cache holding the parsed catalog
//! - [`catalog`]: Index parsing and the in-memory catalog model
//! - [`docs_client`]: HTTP client for the documentation site
//! - [`mcp`]: MCP tools and protocol handling
//! - [`resolver`]: Alias and fuzzy name resolution
//! - [`server`]: SSE and stdio server entry points
//! - [`snippets`]: Code example extraction from component pages

pub mod cache;
pub mod catalog;
pub mod docs_client;
pub mod mcp;
pub mod resolver;
pub mod server;
pub mod snippets;
