// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery, addon status writes, and deploy works.

pub mod crd;
pub mod status;
pub mod work;

pub use crd::wait_for_crds;
pub use status::{patch_addon_conditions, update_health_check_mode};
pub use work::{apply_work, build_deploy_work};
