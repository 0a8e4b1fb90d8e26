pub use crate::line_parsers::{
    Attribute, ExtMap, Feedback, Fingerprint, GroupSemantics, HashFunction, MediaSSRC,
    RTPMap, SDPParseError, SSRCGroup, SourceAttribute, FMTP,
};
pub use crate::rtp_parameters::{RTPCodec, RTPParameters};
pub use crate::sections::{match_prefix, split_lines, Sections};
pub use crate::signaling::strip_ssrc_signaling;
pub use crate::simulcast::{merge_simulcast, munge_simulcast, split_simulcast, SimulcastError};
pub use crate::transport::{DTLSParameters, ICEParameters};

mod line_parsers;
mod rtp_parameters;
mod sections;
mod signaling;
mod simulcast;
mod transport;
