//! Collection listing for `--list`.
//!
//! Prints each collection visible to the token so users can find the id to
//! import into.

use std::io::Write;

use crate::client::DocumentService;
use crate::models::Collection;

/// Fetch collections and print them to stdout.
pub fn list_collections(service: &dyn DocumentService) -> anyhow::Result<()> {
    let collections = service.list_collections()?;
    let mut stdout = std::io::stdout().lock();
    write_collections(&mut stdout, &collections)?;
    Ok(())
}

pub fn write_collections(out: &mut impl Write, collections: &[Collection]) -> std::io::Result<()> {
    writeln!(out, "Collections:")?;
    for col in collections {
        writeln!(
            out,
            "ID: {}, Name: {}, Description: {}",
            col.id,
            col.name,
            col.description.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}
