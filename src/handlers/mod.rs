//! HTTP handlers for compiled resource routes.

pub mod resource;
pub use resource::*;
