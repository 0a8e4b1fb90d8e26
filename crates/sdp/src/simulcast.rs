use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};

use log::debug;
use thiserror::Error;

use crate::line_parsers::{
    Attribute, GroupSemantics, MediaGroup, MediaID, MediaSSRC, MediaStreamID, Originator,
    SDPLine, SDPParseError, SSRCGroup, SessionTime, Setup, SourceAttribute,
};
use crate::rtp_parameters::RTPParameters;
use crate::sections::{join_lines, match_prefix, parse_attributes, split_lines, write_lines, Sections};
use crate::transport::{DTLSParameters, ICEParameters};

const MAX_SIMULCAST_LAYERS: usize = 3;

/// msid labels of the split media sections, lowest layer first.
const LAYER_LABELS: [&str; MAX_SIMULCAST_LAYERS] = ["low", "mid", "hi"];

const PLACEHOLDER_CNAME: &str = "something";

const DUMMY_SESSION_ID: &str = "8324701712193024513";

/// Header extensions that signal simulcast inside a single m-line.
const SIMULCAST_HEADER_EXTENSIONS: [&str; 3] = [
    "urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id",
    "urn:ietf:params:rtp-hdrext:sdes:repaired-rtp-stream-id",
    "urn:ietf:params:rtp-hdrext:sdes:mid",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulcastError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] SDPParseError),
    #[error("unsupported simulcast layer count {0}, expected 1, 2 or 3")]
    InvalidLayerCount(usize),
    #[error("SSRC arithmetic overflows for base SSRC {0}")]
    SSRCOverflow(u32),
}

/// Rewrites the first video section of an offer so that its single
/// video/RTX pair becomes `layers` pairs tied together by a SIM group.
///
/// Extra pairs take the next SSRCs above the base video SSRC: `+1/+2` for the
/// second layer and `+3/+4` for the third. Values already used in the document
/// are skipped, so a base pair of `1001/1002` yields `1003/1004` and
/// `1005/1006`. The offer's cname and msid are copied to every synthesized
/// SSRC.
pub fn munge_simulcast(sdp: &str, layers: usize) -> Result<String, SimulcastError> {
    if !(1..=MAX_SIMULCAST_LAYERS).contains(&layers) {
        return Err(SimulcastError::InvalidLayerCount(layers));
    }

    let mut sections = Sections::from(sdp);
    let video_index = sections
        .media
        .iter()
        .position(|section| section.starts_with("m=video "))
        .ok_or(SDPParseError::MissingVideoSection)?;
    let section = &sections.media[video_index];

    let (video_ssrc, rtx_ssrc) = match_prefix(section, "a=ssrc-group:FID ")
        .first()
        .map(|line| SSRCGroup::try_from(*line))
        .transpose()?
        .and_then(|group| group.fid_pair())
        .ok_or(SDPParseError::MissingFIDGroup)?;

    let source_attributes = match_prefix(section, "a=ssrc:")
        .into_iter()
        .map(MediaSSRC::try_from)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|ssrc| ssrc.ssrc == video_ssrc)
        .map(|ssrc| ssrc.source_attribute)
        .collect::<Vec<_>>();

    let cname = source_attributes
        .iter()
        .find_map(|attribute| match attribute {
            SourceAttribute::CName(cname) => Some(cname.clone()),
            _ => None,
        })
        .ok_or(SDPParseError::MissingCName(video_ssrc))?;
    let msid = source_attributes
        .iter()
        .find_map(|attribute| match attribute {
            SourceAttribute::MSID(msid) => Some(msid.clone()),
            _ => None,
        })
        .ok_or(SDPParseError::MissingMSID(video_ssrc))?;

    let mut used_ssrcs = match_prefix(sdp, "a=ssrc:")
        .into_iter()
        .map(MediaSSRC::try_from)
        .map(|ssrc| ssrc.map(|ssrc| ssrc.ssrc))
        .collect::<Result<HashSet<u32>, _>>()?;
    used_ssrcs.extend([video_ssrc, rtx_ssrc]);

    let mut cursor = video_ssrc;
    let mut layer_pairs = vec![(video_ssrc, rtx_ssrc)];
    for _ in 1..layers {
        let layer_video = next_free_ssrc(&mut cursor, &used_ssrcs, video_ssrc)?;
        let layer_rtx = next_free_ssrc(&mut cursor, &used_ssrcs, video_ssrc)?;
        layer_pairs.push((layer_video, layer_rtx));
    }

    let mut lines = split_lines(section)
        .into_iter()
        .filter(|line| !line.starts_with("a=ssrc:") && !line.starts_with("a=ssrc-group:"))
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    for (layer_video, layer_rtx) in &layer_pairs {
        for ssrc in [*layer_video, *layer_rtx] {
            lines.push(String::from(Attribute::MediaSSRC(MediaSSRC {
                ssrc,
                source_attribute: SourceAttribute::CName(cname.clone()),
            })));
            lines.push(String::from(Attribute::MediaSSRC(MediaSSRC {
                ssrc,
                source_attribute: SourceAttribute::MSID(msid.clone()),
            })));
        }
        lines.push(String::from(Attribute::SSRCGroup(SSRCGroup {
            semantics: GroupSemantics::FID,
            ssrcs: vec![*layer_video, *layer_rtx],
        })));
    }
    lines.push(String::from(Attribute::SSRCGroup(SSRCGroup {
        semantics: GroupSemantics::SIM,
        ssrcs: layer_pairs.iter().map(|(video, _)| *video).collect(),
    })));

    debug!(target: "SDP", "Munged {} simulcast layers from base SSRC {}", layers, video_ssrc);

    sections.media[video_index] = join_lines(lines);
    Ok(String::from(sections))
}

/// Rewrites a munged offer into a new document with one media section per
/// FID group, the representation used by browsers that model simulcast as
/// independent m-lines.
///
/// Every section gets the RTP description of the source section (minus the
/// header-extension based simulcast signaling), the shared fingerprint and ICE
/// credentials, its own mid, msid label and FID pair. Only the first section
/// carries the ICE candidates.
pub fn split_simulcast(sdp: &str) -> Result<String, SimulcastError> {
    let sections = Sections::from(sdp);
    let media = sections
        .media
        .first()
        .ok_or(SDPParseError::MissingMediaSection)?;

    let dtls = DTLSParameters::from_sections(media, &sections.session)?;
    let ice = ICEParameters::from_sections(media, &sections.session)?;
    let candidates = candidates(media)?;

    let mut rtp_parameters = RTPParameters::try_from(media.as_str())?;
    rtp_parameters.remove_header_extensions(&SIMULCAST_HEADER_EXTENSIONS);
    let rtp_description = String::from(rtp_parameters);

    let fid_pairs = parse_attributes(media)?
        .into_iter()
        .filter_map(|attr| match attr {
            Attribute::SSRCGroup(group) => group.fid_pair(),
            _ => None,
        })
        .collect::<Vec<_>>();

    if fid_pairs.is_empty() {
        return Err(SDPParseError::MissingFIDGroup.into());
    }
    if fid_pairs.len() > MAX_SIMULCAST_LAYERS {
        return Err(SimulcastError::InvalidLayerCount(fid_pairs.len()));
    }

    let media_ids = (0..fid_pairs.len())
        .map(|index| index.to_string())
        .collect::<Vec<_>>();
    let mut split_sdp = session_header(media_ids.clone());

    for (index, ((video_ssrc, rtx_ssrc), label)) in
        fid_pairs.into_iter().zip(LAYER_LABELS).enumerate()
    {
        let mut lines = vec![
            Attribute::Fingerprint(dtls.fingerprint.clone()),
            Attribute::ICEUsername(ice.username.clone()),
            Attribute::ICEPassword(ice.password.clone()),
            Attribute::Setup(Setup::ActivePassive),
            Attribute::MediaID(MediaID {
                id: media_ids[index].clone(),
            }),
            Attribute::MediaStreamID(MediaStreamID {
                stream_id: label.to_string(),
                track_id: Some(label.to_string()),
            }),
            placeholder_cname(video_ssrc),
            placeholder_cname(rtx_ssrc),
            Attribute::SSRCGroup(SSRCGroup {
                semantics: GroupSemantics::FID,
                ssrcs: vec![video_ssrc, rtx_ssrc],
            }),
        ];
        if index == 0 {
            lines.extend(candidates.iter().cloned());
        }

        split_sdp.push_str(&rtp_description);
        split_sdp.push_str(&write_lines(
            lines.into_iter().map(SDPLine::Attribute).collect(),
        ));
    }

    debug!(target: "SDP", "Split simulcast offer into {} media sections", media_ids.len());

    Ok(split_sdp)
}

/// Collapses a per-layer answer into a single media section bundled as `0`.
///
/// Only the first section's codecs, transport parameters and candidates are
/// kept. No SSRC or SSRC group lines are written.
pub fn merge_simulcast(sdp: &str) -> Result<String, SimulcastError> {
    let sections = Sections::from(sdp);
    let media = sections
        .media
        .first()
        .ok_or(SDPParseError::MissingMediaSection)?;

    let dtls = DTLSParameters::from_sections(media, &sections.session)?;
    let ice = ICEParameters::from_sections(media, &sections.session)?;
    let candidates = candidates(media)?;
    let setup = parse_attributes(media)?
        .into_iter()
        .find(|attr| matches!(attr, Attribute::Setup(_)));
    let rtp_parameters = RTPParameters::try_from(media.as_str())?;

    let mut lines = vec![
        Attribute::Fingerprint(dtls.fingerprint),
        Attribute::ICEUsername(ice.username),
        Attribute::ICEPassword(ice.password),
    ];
    lines.extend(setup);
    lines.push(Attribute::MediaID(MediaID { id: "0".to_string() }));
    lines.extend(candidates);

    debug!(target: "SDP", "Merged {} media sections into one", sections.media.len());

    let mut merged_sdp = session_header(vec!["0".to_string()]);
    merged_sdp.push_str(&String::from(rtp_parameters));
    merged_sdp.push_str(&write_lines(
        lines.into_iter().map(SDPLine::Attribute).collect(),
    ));
    Ok(merged_sdp)
}

fn session_header(bundle: Vec<String>) -> String {
    write_lines(vec![
        SDPLine::ProtocolVersion("0".to_string()),
        SDPLine::Originator(Originator {
            username: "-".to_string(),
            session_id: DUMMY_SESSION_ID.to_string(),
            session_version: "0".to_string(),
            ip_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }),
        SDPLine::SessionName("-".to_string()),
        SDPLine::SessionTime(SessionTime {
            start_time: 0,
            end_time: 0,
        }),
        SDPLine::Attribute(Attribute::MediaGroup(MediaGroup::Bundle(bundle))),
        SDPLine::Attribute(Attribute::MSIDSemantic("WMS *".to_string())),
    ])
}

fn next_free_ssrc(
    cursor: &mut u32,
    used_ssrcs: &HashSet<u32>,
    base_ssrc: u32,
) -> Result<u32, SimulcastError> {
    loop {
        *cursor = cursor
            .checked_add(1)
            .ok_or(SimulcastError::SSRCOverflow(base_ssrc))?;
        if !used_ssrcs.contains(cursor) {
            return Ok(*cursor);
        }
    }
}

fn candidates(media: &str) -> Result<Vec<Attribute>, SDPParseError> {
    Ok(parse_attributes(media)?
        .into_iter()
        .filter(|attr| matches!(attr, Attribute::Candidate(_)))
        .collect())
}

fn placeholder_cname(ssrc: u32) -> Attribute {
    Attribute::MediaSSRC(MediaSSRC {
        ssrc,
        source_attribute: SourceAttribute::CName(PLACEHOLDER_CNAME.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use crate::line_parsers::SDPParseError;
    use crate::simulcast::{munge_simulcast, SimulcastError};

    const MINIMAL_OFFER: &str = "v=0\r\n\
        o=- 1 2 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        t=0 0\r\n\
        m=video 9 UDP/TLS/RTP/SAVPF 96 97\r\n\
        a=mid:0\r\n\
        a=rtpmap:96 VP8/90000\r\n\
        a=rtpmap:97 rtx/90000\r\n\
        a=fmtp:97 apt=96\r\n\
        a=ssrc-group:FID 1001 1002\r\n\
        a=ssrc:1001 cname:abc\r\n\
        a=ssrc:1001 msid:stream track\r\n\
        a=ssrc:1002 cname:abc\r\n\
        a=ssrc:1002 msid:stream track\r\n";

    #[test]
    fn rejects_layer_count_out_of_range() {
        assert_eq!(
            munge_simulcast(MINIMAL_OFFER, 0),
            Err(SimulcastError::InvalidLayerCount(0))
        );
        assert_eq!(
            munge_simulcast(MINIMAL_OFFER, 4),
            Err(SimulcastError::InvalidLayerCount(4))
        );
    }

    #[test]
    fn rejects_ssrc_overflow() {
        let offer = MINIMAL_OFFER
            .replace("1001", &(u32::MAX - 1).to_string())
            .replace("1002", &u32::MAX.to_string());

        assert_eq!(
            munge_simulcast(&offer, 3),
            Err(SimulcastError::SSRCOverflow(u32::MAX - 1))
        );
    }

    #[test]
    fn requires_msid_of_base_ssrc() {
        let offer = MINIMAL_OFFER.replace("a=ssrc:1001 msid:stream track\r\n", "");

        assert_eq!(
            munge_simulcast(&offer, 2),
            Err(SimulcastError::MalformedInput(SDPParseError::MissingMSID(1001)))
        );
    }

    #[test]
    fn requires_video_section() {
        let offer = "v=0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=mid:0\r\n";

        assert_eq!(
            munge_simulcast(offer, 1),
            Err(SimulcastError::MalformedInput(SDPParseError::MissingVideoSection))
        );
    }
}
