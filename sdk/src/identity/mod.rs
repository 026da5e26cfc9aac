//! # Identity Module
//!
//! Who signs, and where they live:
//!
//! 1. **Network**: the one-byte network identifier and the signature
//!    scheme it implies.
//! 2. **Address**: base32, checksummed, derived from a public key. Also the
//!    namespace-alias form a transfer recipient may take.
//! 3. **Account**: a public key on a network ([`PublicAccount`]) or the full
//!    key pair ([`Account`]), which can sign.

pub mod account;
pub mod address;
pub mod network;

pub use account::{Account, PublicAccount};
pub use address::{Address, AddressError, UnresolvedAddress};
pub use network::NetworkType;
