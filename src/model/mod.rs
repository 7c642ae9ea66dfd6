// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: the node arena, explicit connections, and per-render snapshots.

pub mod connection;
pub mod diagram;
pub mod ids;
pub mod node;
pub mod snapshot;
pub mod validate;

pub use connection::{ConnectOptions, Connection};
pub use diagram::{Diagram, StructuralError};
pub use ids::{ConnectionId, Id, IdTag, NodeId};
pub use node::{Direction, Node, NodeOptions};
pub use snapshot::TreeSnapshot;
pub use validate::{Diagnostic, Endpoint};
