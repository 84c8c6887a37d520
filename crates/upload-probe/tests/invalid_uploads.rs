//! Files expected to be rejected report exactly the fixture's errors
//!
//! Run with:
//! ```bash
//! UPLOAD_PROBE_E2E=1 cargo test -p upload-probe --features browser --test invalid_uploads
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::process::ExitCode;
use upload_probe::Verdict;

fn main() -> ExitCode {
    common::run_partition(Verdict::Invalid)
}
