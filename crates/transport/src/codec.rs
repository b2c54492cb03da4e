//! Message model and the datagram codec
//!
//! On `tcp://` a message is a ZeroMQ multipart message. On `udp://` the same
//! two frames are packed into one datagram as `[flags: u8][len: u32 BE][bytes]`
//! per frame, where bit 0 of `flags` marks that another frame follows. Either
//! way a message is an optional topic frame followed by one payload frame.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, TransportError};

/// More frames follow in this message
pub const FLAG_MORE: u8 = 0x01;

/// Bytes of frame header
pub const HEADER_LEN: usize = 5;

/// Largest accepted frame body
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// One decoded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Topic, empty when the sender omitted the topic frame
    pub topic: String,
    /// Payload frame
    pub payload: Bytes,
}

impl Message {
    /// Payload as UTF-8, lossy
    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Build a message from its received frames
    ///
    /// One frame is an untopiced payload; two frames are topic then payload.
    pub fn from_frames(mut frames: Vec<Bytes>) -> Result<Self> {
        let payload = match frames.pop() {
            Some(payload) => payload,
            None => return Err(TransportError::codec("empty message")),
        };
        let topic = match frames.pop() {
            Some(topic) => String::from_utf8(topic.to_vec())
                .map_err(|e| TransportError::codec(format!("topic is not UTF-8: {e}")))?,
            None => String::new(),
        };
        if !frames.is_empty() {
            return Err(TransportError::codec("message has more than two frames"));
        }
        Ok(Self { topic, payload })
    }
}

fn put_frame(buf: &mut BytesMut, flags: u8, body: &[u8]) {
    buf.put_u8(flags);
    buf.put_u32(body.len() as u32);
    buf.put_slice(body);
}

/// Encode a message as one datagram; the topic frame is omitted when `topic` is empty
pub fn encode_message(topic: &str, payload: &[u8]) -> Result<Bytes> {
    for len in [topic.len(), payload.len()] {
        if len > MAX_FRAME_LEN {
            return Err(TransportError::FrameTooLarge {
                len,
                max: MAX_FRAME_LEN,
            });
        }
    }

    let topic_len = if topic.is_empty() {
        0
    } else {
        HEADER_LEN + topic.len()
    };
    let mut buf = BytesMut::with_capacity(topic_len + HEADER_LEN + payload.len());

    if !topic.is_empty() {
        put_frame(&mut buf, FLAG_MORE, topic.as_bytes());
    }
    put_frame(&mut buf, 0, payload);
    Ok(buf.freeze())
}

/// Decode a datagram that must hold exactly one complete message
pub fn decode_datagram(datagram: &[u8]) -> Result<Message> {
    let mut buf = Bytes::copy_from_slice(datagram);
    let mut frames = Vec::with_capacity(2);

    loop {
        if buf.remaining() < HEADER_LEN {
            return Err(TransportError::codec("truncated frame header"));
        }
        let flags = buf.get_u8();
        let len = buf.get_u32() as usize;
        if len > MAX_FRAME_LEN {
            return Err(TransportError::FrameTooLarge {
                len,
                max: MAX_FRAME_LEN,
            });
        }
        if buf.remaining() < len {
            return Err(TransportError::codec("truncated frame body"));
        }
        frames.push(buf.split_to(len));

        if flags & FLAG_MORE == 0 {
            break;
        }
        if frames.len() == 2 {
            return Err(TransportError::codec("message has more than two frames"));
        }
    }

    if buf.has_remaining() {
        return Err(TransportError::codec(format!(
            "{} trailing bytes after message",
            buf.remaining()
        )));
    }
    Message::from_frames(frames)
}
