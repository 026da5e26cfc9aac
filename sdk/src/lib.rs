// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Catapult SDK - Client Core
//!
//! The part of a Catapult client that has to be byte-exact and
//! order-exact: building transactions, encoding them to the node's binary
//! layout, signing and cosigning them, and following them through the
//! node's push channels until they confirm or fail.
//!
//! ## Architecture
//!
//! - **crypto**: Ed25519 key pairs under both signing schemas, hashing.
//! - **identity**: Network types, addresses, public and private accounts.
//! - **transaction**: Model, builders, binary codec, signing, cosigning.
//! - **listener**: Push-channel router and confirmation correlator.
//! - **config**: Protocol constants and listener settings.
//!
//! ## Pipeline
//!
//! ```text
//! builder ──► Transaction ──sign_with──► SignedTransaction ──► (announce)
//!                                                              │
//!            Listener::confirmed_with_hash(address, hash) ◄─────┘
//! ```
//!
//! Networking is the caller's business. The listener talks to the node
//! through a [`listener::ListenerTransport`]; announcing a payload is a
//! plain HTTP `PUT` this crate doesn't make.

pub mod config;
pub mod crypto;
pub mod identity;
pub mod listener;
pub mod transaction;
