//! Shared test utilities for probing, session and statistics tests
#![allow(dead_code)]

use std::sync::Arc;

use ::common::auth::{CapabilityProber, DEFAULT_TRIAL_TIMEOUT};
use ::common::storage::{ClientFactory, DataPlane, Principal};
use ::common::testkit::FakeCluster;

pub const ADMIN: (&str, &str) = ("minioadmin", "minioadmin-secret");
pub const OPERATOR: (&str, &str) = ("operator", "operator-secret");
pub const GUEST: (&str, &str) = ("guest", "guest-secret");

/// A cluster with one admin, one bucket-only operator and one identity
/// that may do nothing at all.
pub fn setup_cluster() -> FakeCluster {
    let cluster = FakeCluster::new();
    cluster.add_admin(ADMIN.0, ADMIN.1);
    cluster.add_bucket_user(OPERATOR.0, OPERATOR.1);
    cluster.add_user(GUEST.0, GUEST.1, false, false);
    cluster
}

pub fn principal((identity, secret): (&str, &str)) -> Principal {
    Principal::new(identity, secret)
}

pub fn prober(cluster: &FakeCluster) -> CapabilityProber {
    CapabilityProber::new(Arc::new(cluster.clone()), DEFAULT_TRIAL_TIMEOUT)
}

/// Data plane client of the cluster admin.
pub fn admin_data_plane(cluster: &FakeCluster) -> Arc<dyn DataPlane> {
    cluster.create_clients(&principal(ADMIN)).unwrap().data
}
