//! Inbound adapters. Only the REST layer exists today.

pub mod rest;
