/// This file contains the `main` program logic which replays a recorded
/// branch trace through a coverage map and reports which branches were
/// interesting

use branchmap::config::parse_args;
use branchmap::coverage::CoverageMap;
use branchmap::stats::Stats;
use branchmap::trace::load_trace;
use branchmap::{fatal, prompt, prompt_warn};

fn main() {
    // Parse the command line
    let config = parse_args().unwrap_or_else(|error| {
        fatal!(error);
    });

    // Load the branches to replay
    prompt!("Loading trace '{}'...", config.trace);
    let branches = load_trace(&config.trace, config.image_base).unwrap_or_else(|error| {
        fatal!(error);
    });
    prompt!("Trace contains {} branches", branches.len());

    if config.image_base != 0 {
        prompt!("Normalizing pcs against image base 0x{:X}", config.image_base);
    }

    // Create the map, this picks up whatever other processes committed
    let mut map = CoverageMap::new(&config.bitmap).unwrap_or_else(|error| {
        fatal!(error);
    });
    if map.path().is_empty() {
        prompt_warn!("No bitmap provided, nothing will be persisted");
    } else {
        prompt!("Bitmap path: '{}'", map.path());
    }

    prompt!(
        "Loaded {} edges and {} contexts",
        map.get_edge_count(),
        map.get_context_count()
    );

    let mut stats = Stats::new();
    stats.start_session();

    // Feed the branches in execution order
    for (i, branch) in branches.iter().enumerate() {
        let interesting = map.is_interesting_branch(branch.pc, branch.taken);
        stats.update(interesting);

        if interesting && config.verbose {
            prompt!(
                "#{} pc 0x{:X} {} is interesting",
                i,
                branch.pc,
                if branch.taken { "taken" } else { "not taken" }
            );
        }
    }

    stats.sample_map(&map);
    if config.stats {
        stats.print_stats();
    }

    prompt!(
        "Replay done, {}/{} branches interesting",
        stats.interesting,
        stats.branches
    );
}
