//! Helper layer for CloudFormation custom-resource handlers that provision
//! resources in the Spot (spotinst) cloud-orchestration service.
//!
//! An inbound CloudFormation event is fed to [`event::ConfigLocator`] and
//! [`auth::TokenClient`], usually both at once through
//! [`request::token_and_config`]. Located update configs are reconciled with
//! [`config::patch::synthesize_nulls`] so that removed fields reach the API
//! as explicit nulls instead of silently staying in place. Outgoing
//! Elastigroup configs may pass through [`group::normalize_group_config`],
//! and API responses come back through [`response::validate_response`].

use const_format::concatcp;

pub mod auth;
pub mod config;
pub mod event;
pub mod group;
pub mod request;
pub mod response;

/// User agent reported to the Spot API by every HTTP client this crate builds.
pub const USER_AGENT: &str = concatcp!("spotinst-cloud-formation/", env!("CARGO_PKG_VERSION"));
