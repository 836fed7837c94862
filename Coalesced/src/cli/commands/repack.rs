//! CLI command for archive repacking

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{DISK, print_done, print_step, simple_bar, update_bar};
use crate::formats::coalesced::PathConvention;
use crate::operations::{CoalescedOperations, RepackOptions};

pub fn execute(
    source: &Path,
    destination: Option<&Path>,
    bare_paths: bool,
    progress: bool,
) -> anyhow::Result<()> {
    if !source.is_dir() {
        anyhow::bail!("Source is not a directory: {}", source.display());
    }

    let start = Instant::now();
    let convention = if bare_paths {
        PathConvention::Bare
    } else {
        PathConvention::EngineRelative
    };
    let options = RepackOptions::new().with_path_convention(convention);

    print_step(1, 1, &DISK, &format!("Repacking {}...", source.display()));

    let result = if progress {
        let pb = simple_bar(0, "Repacking");
        let result =
            CoalescedOperations::repack_with_progress(source, destination, &options, &|p| {
                update_bar(&pb, p);
            });
        if result.is_ok() {
            pb.finish_with_message("done");
        } else {
            pb.abandon();
        }
        result?
    } else {
        CoalescedOperations::repack_with_progress(source, destination, &options, &|_| {})?
    };

    println!(
        "Repacked {} entries ({} records) into {}",
        result.entries,
        result.records,
        result.output_file.display()
    );
    print_done(start.elapsed());
    Ok(())
}
