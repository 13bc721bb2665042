//! The `fingerprint` command: show what the fingerprinter sees in files.

use std::fmt::Write;
use std::path::PathBuf;

use weave_fingerprint::Fingerprinter;

use super::{join, read_file, yes_no};
use crate::CommandError;

/// Fingerprint each file and describe the result.
pub fn fingerprint_files(paths: &[PathBuf]) -> Result<String, CommandError> {
    let fingerprinter = Fingerprinter::new();
    let mut out = String::new();
    for path in paths {
        let text = read_file(path)?;
        let fingerprint = fingerprinter.fingerprint(&text);
        writeln!(out, "{}", path.display())?;
        writeln!(out, "  declaration   {:016x}", fingerprint.declaration_hash)?;
        writeln!(out, "  body          {:016x}", fingerprint.body_hash)?;
        writeln!(out, "  text          {:016x}", fingerprint.text_hash)?;
        writeln!(
            out,
            "  compile-time  {}",
            yes_no(fingerprint.is_compile_time_code)
        )?;
        if !fingerprint.declared_types.is_empty() {
            writeln!(out, "  types         {}", join(&fingerprint.declared_types))?;
        }
        if !fingerprint.partial_types.is_empty() {
            writeln!(out, "  partial       {}", join(&fingerprint.partial_types))?;
        }
    }
    Ok(out)
}
