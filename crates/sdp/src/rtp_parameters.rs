use std::net::{IpAddr, Ipv4Addr};

use crate::line_parsers::{
    Attribute, ConnectionData, ExtMap, Feedback, MediaDescription, MediaTransportProtocol,
    MediaType, RTCPAddress, RTPMap, SDPLine, SDPParseError, FMTP,
};
use crate::sections::{parse_attributes, split_lines, write_lines};

const DISCARD_PORT: u16 = 9;
const REJECTED_PORT: u16 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct RTPCodec {
    pub rtp_map: RTPMap,
    pub format_parameters: Option<FMTP>,
    pub feedback: Vec<Feedback>,
}

/// Codecs, header extensions and RTCP flags of one media section.
#[derive(Debug, Clone, PartialEq)]
pub struct RTPParameters {
    pub media_type: MediaType,
    pub codecs: Vec<RTPCodec>,
    pub header_extensions: Vec<ExtMap>,
    pub rtcp_mux: bool,
    pub rtcp_reduced_size: bool,
}

impl RTPParameters {
    pub fn remove_header_extensions(&mut self, uris: &[&str]) {
        self.header_extensions
            .retain(|extension| !uris.contains(&extension.uri.as_str()));
    }
}

impl TryFrom<&str> for RTPParameters {
    type Error = SDPParseError;

    fn try_from(section: &str) -> Result<Self, Self::Error> {
        let media_line = split_lines(section)
            .into_iter()
            .next()
            .ok_or(SDPParseError::MissingMediaSection)?;
        let media_description = MediaDescription::try_from(media_line)?;
        let attributes = parse_attributes(section)?;

        // Payload types without an rtpmap are not described and get dropped
        let codecs = media_description
            .media_format_description
            .iter()
            .filter_map(|payload_type| {
                let rtp_map = attributes.iter().find_map(|attr| match attr {
                    Attribute::RTPMap(rtp_map) if rtp_map.payload_number == *payload_type => {
                        Some(rtp_map.clone())
                    }
                    _ => None,
                })?;
                let format_parameters = attributes.iter().find_map(|attr| match attr {
                    Attribute::FMTP(fmtp) if fmtp.payload_number == *payload_type => {
                        Some(fmtp.clone())
                    }
                    _ => None,
                });
                let feedback = attributes
                    .iter()
                    .filter_map(|attr| match attr {
                        Attribute::Feedback(feedback)
                            if feedback.payload_type.is_none()
                                || feedback.payload_type == Some(*payload_type) =>
                        {
                            Some(Feedback {
                                payload_type: Some(*payload_type),
                                value: feedback.value.clone(),
                            })
                        }
                        _ => None,
                    })
                    .collect();

                Some(RTPCodec {
                    rtp_map,
                    format_parameters,
                    feedback,
                })
            })
            .collect();

        let header_extensions = attributes
            .iter()
            .filter_map(|attr| match attr {
                Attribute::ExtMap(extmap) => Some(extmap.clone()),
                _ => None,
            })
            .collect();

        Ok(RTPParameters {
            media_type: media_description.media_type,
            codecs,
            header_extensions,
            rtcp_mux: attributes.contains(&Attribute::RTCPMux),
            rtcp_reduced_size: attributes.contains(&Attribute::RTCPReducedSize),
        })
    }
}

impl From<RTPParameters> for String {
    fn from(value: RTPParameters) -> Self {
        let unspecified_address = ConnectionData {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let transport_port = if value.codecs.is_empty() {
            REJECTED_PORT
        } else {
            DISCARD_PORT
        };

        let mut lines = vec![
            SDPLine::MediaDescription(MediaDescription {
                media_type: value.media_type,
                transport_port,
                transport_protocol: MediaTransportProtocol::DtlsSrtp,
                media_format_description: value
                    .codecs
                    .iter()
                    .map(|codec| codec.rtp_map.payload_number)
                    .collect(),
            }),
            SDPLine::ConnectionData(unspecified_address.clone()),
            SDPLine::Attribute(Attribute::RTCP(RTCPAddress {
                port: DISCARD_PORT,
                connection_data: Some(unspecified_address),
            })),
        ];

        for codec in value.codecs {
            lines.push(SDPLine::Attribute(Attribute::RTPMap(codec.rtp_map)));
            if let Some(fmtp) = codec.format_parameters {
                lines.push(SDPLine::Attribute(Attribute::FMTP(fmtp)));
            }
            lines.extend(
                codec
                    .feedback
                    .into_iter()
                    .map(|feedback| SDPLine::Attribute(Attribute::Feedback(feedback))),
            );
        }

        lines.extend(
            value
                .header_extensions
                .into_iter()
                .map(|extmap| SDPLine::Attribute(Attribute::ExtMap(extmap))),
        );

        if value.rtcp_mux {
            lines.push(SDPLine::Attribute(Attribute::RTCPMux));
        }
        if value.rtcp_reduced_size {
            lines.push(SDPLine::Attribute(Attribute::RTCPReducedSize));
        }

        write_lines(lines)
    }
}

#[cfg(test)]
mod tests {
    use crate::line_parsers::MediaType;
    use crate::rtp_parameters::RTPParameters;

    const VIDEO_SECTION: &str = "m=video 9 UDP/TLS/RTP/SAVPF 96 97 0\r\n\
        c=IN IP4 0.0.0.0\r\n\
        a=rtcp:9 IN IP4 0.0.0.0\r\n\
        a=extmap:3 urn:ietf:params:rtp-hdrext:sdes:mid\r\n\
        a=extmap:4 urn:ietf:params:rtp-hdrext:toffset\r\n\
        a=mid:0\r\n\
        a=rtcp-mux\r\n\
        a=rtcp-rsize\r\n\
        a=rtpmap:96 VP8/90000\r\n\
        a=rtcp-fb:96 goog-remb\r\n\
        a=rtcp-fb:96 nack pli\r\n\
        a=rtpmap:97 rtx/90000\r\n\
        a=fmtp:97 apt=96\r\n\
        a=rtcp-fb:* ccm fir\r\n";

    #[test]
    fn parses_codecs_in_payload_order() {
        let parameters = RTPParameters::try_from(VIDEO_SECTION).expect("Should parse section");

        assert_eq!(parameters.media_type, MediaType::Video);
        assert_eq!(parameters.codecs.len(), 2, "Payload 0 has no rtpmap");
        assert_eq!(parameters.codecs[0].rtp_map.encoding_name, "VP8");
        assert_eq!(parameters.codecs[1].rtp_map.encoding_name, "rtx");
        assert_eq!(
            parameters.codecs[1]
                .format_parameters
                .as_ref()
                .map(|fmtp| fmtp.format_parameters.as_str()),
            Some("apt=96")
        );
        assert!(parameters.rtcp_mux);
        assert!(parameters.rtcp_reduced_size);
        assert_eq!(parameters.header_extensions.len(), 2);
    }

    #[test]
    fn applies_wildcard_feedback_to_every_codec() {
        let parameters = RTPParameters::try_from(VIDEO_SECTION).expect("Should parse section");

        let vp8_feedback = parameters.codecs[0]
            .feedback
            .iter()
            .map(|feedback| feedback.value.as_str())
            .collect::<Vec<_>>();
        assert_eq!(vp8_feedback, vec!["goog-remb", "nack pli", "ccm fir"]);
        assert_eq!(parameters.codecs[1].feedback.len(), 1);
    }

    #[test]
    fn writes_rtp_description() {
        let mut parameters = RTPParameters::try_from(VIDEO_SECTION).expect("Should parse section");
        parameters.remove_header_extensions(&["urn:ietf:params:rtp-hdrext:sdes:mid"]);

        let expected = "m=video 9 UDP/TLS/RTP/SAVPF 96 97\r\n\
            c=IN IP4 0.0.0.0\r\n\
            a=rtcp:9 IN IP4 0.0.0.0\r\n\
            a=rtpmap:96 VP8/90000\r\n\
            a=rtcp-fb:96 goog-remb\r\n\
            a=rtcp-fb:96 nack pli\r\n\
            a=rtcp-fb:96 ccm fir\r\n\
            a=rtpmap:97 rtx/90000\r\n\
            a=fmtp:97 apt=96\r\n\
            a=rtcp-fb:97 ccm fir\r\n\
            a=extmap:4 urn:ietf:params:rtp-hdrext:toffset\r\n\
            a=rtcp-mux\r\n\
            a=rtcp-rsize\r\n";

        assert_eq!(String::from(parameters), expected);
    }
}
