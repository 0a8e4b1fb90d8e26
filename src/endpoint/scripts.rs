//! Page scripts run through `execute/async`. Every script reports back with
//! `{result: ...}` or `{error: "..."}` through the WebDriver callback, which is
//! always the last argument.

pub const CREATE_PEER_CONNECTION: &str = r#"
const done = arguments[arguments.length - 1];
try {
    window.pc = new RTCPeerConnection(null);
    window.remoteStreams = {};
    window.pc.ontrack = (event) => {
        let streams = event.streams;
        if (streams.length === 0) {
            streams = event.track.kind === 'video' ? [new MediaStream([event.track])] : [];
        }
        streams.forEach((stream) => {
            if (window.remoteStreams[stream.id]) {
                return;
            }
            window.remoteStreams[stream.id] = stream;
            const video = document.createElement('video');
            video.autoplay = true;
            video.muted = true;
            video.srcObject = stream;
            document.body.appendChild(video);
        });
    };
    done({result: null});
} catch (err) {
    done({error: String(err)});
}
"#;

pub const GET_USER_MEDIA: &str = r#"
const constraints = arguments[0];
const done = arguments[arguments.length - 1];
navigator.mediaDevices.getUserMedia(constraints)
    .then((stream) => {
        window.localStream = stream;
        done({result: null});
    })
    .catch((err) => done({error: String(err)}));
"#;

pub const ADD_STREAM: &str = r#"
const done = arguments[arguments.length - 1];
try {
    const stream = window.localStream;
    stream.getTracks().forEach((track) => window.pc.addTrack(track, stream));
    done({result: null});
} catch (err) {
    done({error: String(err)});
}
"#;

pub const CREATE_OFFER: &str = r#"
const done = arguments[arguments.length - 1];
window.pc.createOffer()
    .then((offer) => done({result: {type: offer.type, sdp: offer.sdp}}))
    .catch((err) => done({error: String(err)}));
"#;

pub const CREATE_ANSWER: &str = r#"
const done = arguments[arguments.length - 1];
window.pc.createAnswer()
    .then((answer) => done({result: {type: answer.type, sdp: answer.sdp}}))
    .catch((err) => done({error: String(err)}));
"#;

pub const SET_LOCAL_DESCRIPTION: &str = r#"
const description = arguments[0];
const done = arguments[arguments.length - 1];
const pc = window.pc;
const gathered = new Promise((resolve) => {
    const check = () => {
        if (pc.iceGatheringState === 'complete') {
            pc.removeEventListener('icegatheringstatechange', check);
            resolve();
        }
    };
    pc.addEventListener('icegatheringstatechange', check);
});
pc.setLocalDescription(description)
    .then(() => pc.iceGatheringState === 'complete' ? null : gathered)
    .then(() => done({result: {type: pc.localDescription.type, sdp: pc.localDescription.sdp}}))
    .catch((err) => done({error: String(err)}));
"#;

pub const SET_REMOTE_DESCRIPTION: &str = r#"
const description = arguments[0];
const done = arguments[arguments.length - 1];
window.pc.setRemoteDescription(description)
    .then(() => done({result: null}))
    .catch((err) => done({error: String(err)}));
"#;

pub const WAIT_FOR_ICE_CONNECTION_STATE_CHANGE: &str = r#"
const done = arguments[arguments.length - 1];
const pc = window.pc;
const settled = ['connected', 'completed', 'failed'];
if (settled.includes(pc.iceConnectionState)) {
    done({result: pc.iceConnectionState});
} else {
    const listener = () => {
        if (settled.includes(pc.iceConnectionState)) {
            pc.removeEventListener('iceconnectionstatechange', listener);
            done({result: pc.iceConnectionState});
        }
    };
    pc.addEventListener('iceconnectionstatechange', listener);
}
"#;

pub const VIDEO_COUNT: &str = r#"
const done = arguments[arguments.length - 1];
done({result: document.querySelectorAll('video').length});
"#;

pub const VIDEOS_HAVE_ENOUGH_DATA: &str = r#"
const done = arguments[arguments.length - 1];
const videos = document.querySelectorAll('video');
let ready = 0;
for (let i = 0; i < videos.length; i++) {
    if (videos[i].readyState >= videos[i].HAVE_ENOUGH_DATA) {
        ready++;
    }
}
done({result: ready === videos.length});
"#;
