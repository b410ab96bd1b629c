//! Integration tests for drivemirror-drive
//!
//! Uses wiremock to simulate the Google Drive v3 API and verifies
//! listing, folder creation, uploads, downloads, and the error
//! classification of the DriveStore end to end.

mod common;

mod test_listing;
mod test_transfers;
