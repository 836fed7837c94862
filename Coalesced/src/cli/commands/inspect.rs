//! CLI commands for inspecting archives without unpacking them

use std::path::Path;

use crate::operations::CoalescedOperations;

/// Run the entry count heuristic and report the first entry
pub fn validate(source: &Path) -> anyhow::Result<()> {
    let info = CoalescedOperations::validate(source)?;

    println!("{}: looks like a Coalesced archive", source.display());
    println!("  Entries: {}", info.entry_count);
    match info.first_entry {
        Some(path) => println!("  First entry: {path}"),
        None => println!("  First entry: <unreadable>"),
    }
    Ok(())
}

/// List entry paths, optionally with section and record counts
pub fn list(source: &Path, detailed: bool) -> anyhow::Result<()> {
    let entries = CoalescedOperations::list(source)?;

    if detailed {
        println!("{:<60} {:>8} {:>8}", "Path", "Sections", "Records");
        println!("{}", "-".repeat(78));
        for entry in &entries {
            println!("{:<60} {:>8} {:>8}", entry.path, entry.sections, entry.records);
        }
        println!("{}", "-".repeat(78));
        let records: usize = entries.iter().map(|e| e.records).sum();
        println!("{} entries, {} records", entries.len(), records);
    } else {
        for entry in &entries {
            println!("{}", entry.path);
        }
    }
    Ok(())
}

/// Write the decoded entry tree as JSON
pub fn dump(source: &Path, destination: Option<&Path>) -> anyhow::Result<()> {
    let json = CoalescedOperations::dump_json(source)?;

    match destination {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
