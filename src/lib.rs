/*!
# Course Portal Client

View-state reconciliation for the course management portal, built in Rust.

## Overview

Each portal page keeps an in-memory copy of one or more server-owned
collections (groups, submissions, resources, students) and re-renders its
list regions from that copy whenever the copy or the user's view state
(search term, sort column, view mode) changes. Mutations go to the backend
and the affected collection is re-fetched afterwards; the server's answer is
the only source of truth.

## Architecture

### Fetch Layer
- **api**: request model, the `Transport` seam and `ApiClient`
  (collection/record fetches, mutations, CSRF header, error mapping)
- **transport**: reqwest-backed `Transport`

### View Layer
- **listing**: view state, filtering and the three-way comparator
- **render**: handlebars fragments for every page region, escaped by default
- **target**: where fragments go (`RenderTarget`)

### Controllers
- **controller**: load states, snapshots and the shared page context
- **dashboard**: statistics, stage progress, submissions, group deletion,
  auto-refresh
- **resources**: per-course learning resources with modal editing and
  drag reordering
- **group_portal**: group browsing, roster search and group creation

### Services
- **toast** / **modal**: transient messages and focus-managed dialogs
- **sidebar** / **storage**: the layout shell and its persisted state
- **clock**: injectable time source and the refresh timer
- **bindings**: action name to action table for each page

## Usage

The `portal` binary runs the dashboard headlessly, writing every region to
`<output_dir>/<region>.html` and refreshing on the configured interval.
*/

pub mod api;
pub mod bindings;
pub mod clock;
pub mod config;
pub mod controller;
pub mod csrf;
pub mod dashboard;
pub mod error;
pub mod group_portal;
pub mod listing;
pub mod modal;
pub mod record;
pub mod render;
pub mod resources;
pub mod sidebar;
pub mod storage;
pub mod target;
pub mod toast;
pub mod transport;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, HttpMethod, Transport};
pub use config::Config;
pub use error::{PortalError, Result};
