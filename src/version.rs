// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for private proposals

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-private-proposals-2025-10-20";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-10-20";

/// Envelope wire-format version byte
pub const ENVELOPE_VERSION: u8 = 1;

/// Cipher suite byte: X25519 + HKDF-SHA256 key wrap, AES-256-GCM content
pub const ENVELOPE_SUITE_X25519_HKDF_SHA256_A256GCM: u8 = 1;

/// Version tag inside serialized sessions
pub const SESSION_ENCODING_VERSION: u8 = 1;

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "signature-derived-session-keys",
    "eip712-session-request",
    "chain-scoped-keys",
    "deterministic-relayer-key",
    "canonical-rlp-transactions",
    "multi-recipient-envelopes",
    "x25519-hkdf-key-wrap",
    "aes-256-gcm",
    "session-serialization",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Private Proposals {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Full version info, printed by the CLI
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
        "envelopeVersion": ENVELOPE_VERSION,
        "envelopeSuite": ENVELOPE_SUITE_X25519_HKDF_SHA256_A256GCM,
        "sessionEncodingVersion": SESSION_ENCODING_VERSION,
    })
}
