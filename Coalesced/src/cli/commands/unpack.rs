//! CLI command for archive unpacking

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{LOOKING_GLASS, PACKAGE, print_done, print_step, simple_bar, update_bar};
use crate::error::Error;
use crate::operations::{CoalescedOperations, UnpackOptions};

pub fn execute(
    source: &Path,
    destination: Option<&Path>,
    flat: bool,
    progress: bool,
) -> anyhow::Result<()> {
    let start = Instant::now();

    print_step(1, 2, &LOOKING_GLASS, &format!("Validating {}...", source.display()));
    let info = match CoalescedOperations::validate(source) {
        Ok(info) => info,
        Err(e @ Error::NotCoalesced { .. }) => anyhow::bail!("Invalid Coalesced file: {e}"),
        Err(e) => return Err(e.into()),
    };

    print_step(
        2,
        2,
        &PACKAGE,
        &format!("Unpacking {} entries...", info.entry_count),
    );
    let options = UnpackOptions::new().with_create_subfolder(!flat);

    let result = if progress {
        let pb = simple_bar(u64::from(info.entry_count), "Unpacking");
        let result = CoalescedOperations::unpack_with_progress(
            source,
            destination,
            &options,
            &|p| update_bar(&pb, p),
        );
        if result.is_ok() {
            pb.finish_with_message("done");
        } else {
            pb.abandon();
        }
        result
    } else {
        CoalescedOperations::unpack_with_progress(source, destination, &options, &|_| {})
    };

    let result = match result {
        Ok(result) => result,
        Err(e @ Error::UnpackAborted { .. }) => {
            if let Some(offset) = e.offset() {
                eprintln!("Decoding failed at byte offset {offset} (0x{offset:X})");
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Unpacked {} files to {}",
        result.files.len(),
        result.output_dir.display()
    );
    print_done(start.elapsed());
    Ok(())
}
