//! # Secure-Gate Type Aliases
//!
//! Secret-bearing buffers used by the codec. Every type here zeroizes on drop
//! and only hands out its contents through `.expose_secret()` /
//! `.expose_secret_mut()`.
//!
//! - [`Credential`] - per-container key material, length fixed by the cipher id
//! - [`Iv16`] - 16-byte CBC initialization vector / chaining block
//! - [`Block16`] - one decrypted AES block held back for PKCS#7 stripping

use secure_gate::dynamic_alias;
use secure_gate::fixed_alias;

// ─────────────────────────────────────────────────────────────────────────────
// Generic secure stack buffer
// ─────────────────────────────────────────────────────────────────────────────
pub type SpanBuffer<const N: usize> = secure_gate::Fixed<[u8; N]>;

pub type Block16 = SpanBuffer<16>; // one AES block

// ─────────────────────────────────────────────────────────────────────────────
// Dynamic secrets
// ─────────────────────────────────────────────────────────────────────────────
dynamic_alias!(pub Credential, Vec<u8>);

// ─────────────────────────────────────────────────────────────────────────────
// Fixed-size secrets
// ─────────────────────────────────────────────────────────────────────────────
fixed_alias!(pub Iv16, 16); // fixed IV, running CBC chain block
