//! Console output: PTX on success, a message otherwise.
//!
//! Everything goes to the same stream so that `ptxgen a.ll > a.ptx` captures
//! the error text too; logging stays on stderr.

use std::fmt::Display;
use std::io::{self, Write};

/// Write the compiled PTX unchanged, followed by a newline.
pub fn emit<W: Write>(out: &mut W, ptx: &str) -> io::Result<()> {
    out.write_all(ptx.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Write a failure as `ERROR:` followed by the message and a blank line.
///
/// `anyhow::Error` renders its whole context chain with the alternate flag.
pub fn emit_error<W: Write, E: Display + ?Sized>(out: &mut W, err: &E) -> io::Result<()> {
    write!(out, "ERROR:\n{err:#}\n\n")?;
    out.flush()
}

pub fn emit_usage<W: Write, E: Display + ?Sized>(out: &mut W, err: &E) -> io::Result<()> {
    writeln!(out, "{err}")?;
    out.flush()
}
