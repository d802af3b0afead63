//! Generated from `proto/proposer.proto` with `tonic-build`, checked in so builds don't need
//! `protoc`.
#![allow(clippy::all)]
include!("./generated/proposer.rs");
