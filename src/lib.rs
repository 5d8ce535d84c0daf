//! # Exercise Catalog
//!
//! Serves a read-only exercise dataset with lookup, fuzzy name search,
//! random sampling, and equipment/muscle recommendations.
//!
//! The dataset lives upstream (a JSON array at a URL) and changes rarely, so
//! it is cached in memory as an immutable snapshot and refreshed once it
//! outlives a TTL. After the first successful fetch, an upstream outage never
//! turns into a failed request: the stale snapshot is served instead.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ CatalogSource│──▶│ CatalogStore │──▶│ Arc<Snapshot> │
//! │  HTTP / file │   │  TTL + swap  │   └───────┬───────┘
//! └──────────────┘   └──────────────┘           │
//!                          ┌────────────────────┼──────────────┐
//!                          ▼                    ▼              ▼
//!                    ┌──────────┐        ┌───────────┐   ┌──────────┐
//!                    │  fuzzy   │──────▶ │  search   │   │  lookup  │
//!                    │ matcher  │        │ paginate  │   │ id/rand/ │
//!                    └──────────┘        └───────────┘   │ filter   │
//!                                              │         └──────────┘
//!                                              ▼              │
//!                                        ┌─────────────────────┐
//!                                        │   HTTP / CLI        │
//!                                        └─────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and env overrides |
//! | [`models`] | Exercise record and catalog snapshot |
//! | [`error`] | Catalog error kinds |
//! | [`source`] | Upstream dataset fetchers |
//! | [`store`] | Freshness-bounded snapshot cache |
//! | [`fuzzy`] | Ordered-subsequence name scoring |
//! | [`search`] | Paginated search envelope |
//! | [`lookup`] | By-id lookup, random sampling, recommendations |
//! | [`server`] | HTTP routes |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod error;
pub mod fuzzy;
pub mod logging;
pub mod lookup;
pub mod models;
pub mod search;
pub mod server;
pub mod source;
pub mod store;
