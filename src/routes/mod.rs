//! Route groups, split by who may call them. Each group mounts its own gates, so a
//! handler is only reachable through the checks of the module that registers it.

/// Anonymous routes: health, sign-in and the read side of the public site.
pub mod public;

/// Any signed-in account: profile, settings reads and market-data features.
pub mod authenticated;

/// Content managers (admin, blogger): pages, posts, menus, directories, media.
pub mod cms;

/// Administrators: users, settings writes and market-data maintenance.
pub mod admin;
