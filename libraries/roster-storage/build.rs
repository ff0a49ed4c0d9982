//! Build script for roster-storage.
//!
//! Rebuild when migrations change, since they are embedded at compile time.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
