//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! The process-wide façade context: the local org's key and signet,
//! constructed once by [`start`](crate::facade::start) and threaded
//! explicitly into façade calls rather than held behind a `static`.

use std::sync::Arc;

use crate::artifact::{OrgKey, OrgSignet};

/// Read-only handle to the local organization's identity. `Clone` is
/// cheap (an `Arc` bump); safe to share across threads.
#[derive(Clone)]
pub struct PrimeContext {
    org_key: Arc<OrgKey>,
    org_signet: Arc<OrgSignet>,
}

impl PrimeContext {
    /// Derive and wrap a fresh context around an already-loaded org key.
    pub fn new(org_key: OrgKey) -> Result<Self, crate::error::ArtifactError> {
        let org_signet = org_key.to_signet()?;
        Ok(PrimeContext {
            org_key: Arc::new(org_key),
            org_signet: Arc::new(org_signet),
        })
    }

    pub fn org_key(&self) -> &OrgKey {
        &self.org_key
    }

    pub fn org_signet(&self) -> &OrgSignet {
        &self.org_signet
    }
}
