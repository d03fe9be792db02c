// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the embedded ledger database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SEED_HMAC_KEY_ID` | Key identifier registered at startup | Unset (no key seeded) |
//! | `SEED_HMAC_SECRET` | Base64 shared secret for `SEED_HMAC_KEY_ID` | Unset |
//! | `VERIFICATION_DELAY_SECS` | Simulated KYC review delay | `60` |
//! | `SWEEP_INTERVAL_SECS` | Interval between stuck-verification sweeps | `60` |
//! | `STUCK_AFTER_SECS` | Age at which an in-progress verification counts as stuck | `300` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the ledger data directory path.
///
/// The embedded database file lives under this directory. The directory is
/// created on startup if it does not exist.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default ledger data directory.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// File name of the embedded ledger database inside the data directory.
pub const LEDGER_DB_FILE: &str = "ledger.redb";

/// Environment variable for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable naming the HMAC key id seeded into the credential
/// store at startup. Key issuance and rotation happen out of band; this is
/// how a deployment hands the server its shared secret.
pub const SEED_HMAC_KEY_ID_ENV: &str = "SEED_HMAC_KEY_ID";

/// Environment variable holding the base64-encoded shared secret for
/// [`SEED_HMAC_KEY_ID_ENV`].
pub const SEED_HMAC_SECRET_ENV: &str = "SEED_HMAC_SECRET";

/// Environment variable for the simulated KYC review delay, in seconds.
pub const VERIFICATION_DELAY_ENV: &str = "VERIFICATION_DELAY_SECS";

/// Default simulated KYC review delay, in seconds.
pub const DEFAULT_VERIFICATION_DELAY_SECS: u64 = 60;

/// Environment variable for the verification sweeper interval, in seconds.
pub const SWEEP_INTERVAL_ENV: &str = "SWEEP_INTERVAL_SECS";

/// Environment variable for the stuck-verification age threshold, in seconds.
pub const STUCK_AFTER_ENV: &str = "STUCK_AFTER_SECS";

/// Environment variable selecting the log output format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
