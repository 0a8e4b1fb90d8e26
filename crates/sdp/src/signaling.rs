use log::debug;

use crate::sections::{join_lines, split_lines};

const STRIPPED_PREFIXES: [&str; 2] = ["a=ssrc:", "a=msid"];

/// Removes SSRC attribute lines and every msid related line (including
/// `a=msid-semantic`) so the remote side negotiates without SSRC signaling.
/// SSRC group lines are left in place.
pub fn strip_ssrc_signaling(sdp: &str) -> String {
    let lines = split_lines(sdp);
    let kept = lines
        .iter()
        .filter(|line| !STRIPPED_PREFIXES.iter().any(|prefix| line.starts_with(prefix)))
        .collect::<Vec<_>>();

    debug!(target: "SDP", "Stripped {} SSRC signaling lines", lines.len() - kept.len());

    join_lines(kept)
}
