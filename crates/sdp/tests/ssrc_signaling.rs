mod ssrc_signaling {
    use sdp::{match_prefix, strip_ssrc_signaling};

    const CHROME_OFFER: &str = "v=0\r\n\
    o=- 5123843946720411 2 IN IP4 127.0.0.1\r\n\
    s=-\r\n\
    t=0 0\r\n\
    a=group:BUNDLE audio video\r\n\
    a=msid-semantic: WMS Kv0rP5JvVc\r\n\
    m=audio 9 UDP/TLS/RTP/SAVPF 111 103\r\n\
    c=IN IP4 0.0.0.0\r\n\
    a=mid:audio\r\n\
    a=sendrecv\r\n\
    a=rtcp-mux\r\n\
    a=rtpmap:111 opus/48000/2\r\n\
    a=rtpmap:103 ISAC/16000\r\n\
    a=ssrc:3565316532 cname:2BdEuxZ0mGbpQ4uS\r\n\
    a=ssrc:3565316532 msid:Kv0rP5JvVc 3e3e0e12-audio\r\n\
    m=video 9 UDP/TLS/RTP/SAVPF 100 101\r\n\
    c=IN IP4 0.0.0.0\r\n\
    a=mid:video\r\n\
    a=sendrecv\r\n\
    a=msid:Kv0rP5JvVc 3e3e0e12-video\r\n\
    a=rtcp-mux\r\n\
    a=rtpmap:100 H264/90000\r\n\
    a=fmtp:100 level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42e01f\r\n\
    a=rtpmap:101 rtx/90000\r\n\
    a=fmtp:101 apt=100\r\n\
    a=ssrc-group:FID 418205914 4239436893\r\n\
    a=ssrc:418205914 cname:2BdEuxZ0mGbpQ4uS\r\n\
    a=ssrc:4239436893 cname:2BdEuxZ0mGbpQ4uS\r\n";

    #[test]
    fn strips_ssrc_and_msid_lines() {
        let stripped = strip_ssrc_signaling(CHROME_OFFER);

        assert!(match_prefix(&stripped, "a=ssrc:").is_empty());
        assert!(match_prefix(&stripped, "a=msid").is_empty());
    }

    #[test]
    fn keeps_ssrc_groups_and_codecs() {
        let stripped = strip_ssrc_signaling(CHROME_OFFER);

        assert_eq!(
            match_prefix(&stripped, "a=ssrc-group:"),
            vec!["a=ssrc-group:FID 418205914 4239436893"]
        );

        let expected = CHROME_OFFER
            .lines()
            .filter(|line| !line.starts_with("a=ssrc:") && !line.starts_with("a=msid"))
            .map(|line| format!("{line}\r\n"))
            .collect::<String>();
        assert_eq!(stripped, expected);
    }

    #[test]
    fn leaves_unsignaled_document_unchanged() {
        let document = "v=0\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\na=mid:0\r\n";

        assert_eq!(strip_ssrc_signaling(document), document);
    }
}
